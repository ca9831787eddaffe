//! # Rótulos e Tabela de Pesos
//!
//! O coração do modelo linear: uma tabela esparsa `feature → pesos por
//! rótulo` sobre um **vocabulário fechado** de rótulos, fixado na criação.
//!
//! ## Pontuação
//!
//! A pontuação de um rótulo é a soma dos pesos das features ativas naquela
//! posição. Features ausentes da tabela contribuem zero — nunca são erro.
//!
//! ## Desempate determinístico
//!
//! [`WeightTable::best_label`] devolve o candidato de maior pontuação; em
//! empate exato de pontuação vence o rótulo **lexicograficamente menor**
//! (ordem de bytes). O resultado não depende da ordem dos candidatos nem
//! da ordem de iteração de mapas internos.

use std::borrow::Borrow;
use std::collections::HashMap;
use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};
use crate::features::FeatureSet;

/// Rótulo de saída (tag POS como `NN`, ou classe IOB como `B`).
///
/// Newtype sobre `String` com ordem lexicográfica de bytes, usada como
/// critério de desempate do argmax.
#[derive(
    Debug, Clone, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize,
)]
#[serde(transparent)]
pub struct Label(String);

impl Label {
    pub fn new(value: impl Into<String>) -> Self {
        Self(value.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn as_bytes(&self) -> &[u8] {
        self.0.as_bytes()
    }
}

impl fmt::Display for Label {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for Label {
    fn from(value: &str) -> Self {
        Self(value.to_string())
    }
}

impl From<String> for Label {
    fn from(value: String) -> Self {
        Self(value)
    }
}

impl Borrow<str> for Label {
    fn borrow(&self) -> &str {
        &self.0
    }
}

impl AsRef<str> for Label {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl PartialEq<str> for Label {
    fn eq(&self, other: &str) -> bool {
        self.0 == other
    }
}

impl PartialEq<&str> for Label {
    fn eq(&self, other: &&str) -> bool {
        self.0 == *other
    }
}

/// Tabela esparsa de pesos por feature, com vocabulário fechado de rótulos.
///
/// Internamente cada feature mapeia para uma linha densa de `f64`, alinhada
/// com `labels`. Features nunca vistas simplesmente não têm linha.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WeightTable {
    labels: Vec<Label>,
    index: HashMap<Label, usize>,
    rows: HashMap<Vec<u8>, Vec<f64>>,
}

impl WeightTable {
    /// Cria uma tabela vazia sobre o vocabulário dado.
    ///
    /// O vocabulário precisa ser não-vazio e sem duplicatas; depois de
    /// criado, não muda mais.
    pub fn new(labels: Vec<Label>) -> Result<Self> {
        if labels.is_empty() {
            return Err(Error::model("vocabulário de rótulos vazio"));
        }
        let mut index = HashMap::with_capacity(labels.len());
        for (i, label) in labels.iter().enumerate() {
            if index.insert(label.clone(), i).is_some() {
                return Err(Error::model(format!(
                    "rótulo duplicado no vocabulário: {label}"
                )));
            }
        }
        Ok(Self {
            labels,
            index,
            rows: HashMap::new(),
        })
    }

    /// Cria uma tabela vazia sobre um vocabulário constante, escrito no
    /// próprio código. Infalível: duplicatas são ignoradas (vale a
    /// primeira ocorrência), então o resultado sempre satisfaz
    /// [`validate`](Self::validate).
    pub fn from_vocabulary(labels: &[&str]) -> Self {
        let mut vocab = Vec::with_capacity(labels.len());
        let mut index = HashMap::with_capacity(labels.len());
        for name in labels {
            if !index.contains_key(*name) {
                let label = Label::from(*name);
                index.insert(label.clone(), vocab.len());
                vocab.push(label);
            }
        }
        Self {
            labels: vocab,
            index,
            rows: HashMap::new(),
        }
    }

    /// Vocabulário de rótulos, na ordem de criação.
    pub fn labels(&self) -> &[Label] {
        &self.labels
    }

    pub fn contains_label(&self, label: &str) -> bool {
        self.index.contains_key(label)
    }

    /// Quantidade de features com linha na tabela.
    pub fn num_features(&self) -> usize {
        self.rows.len()
    }

    /// Define o peso de `(feature, rótulo)`.
    ///
    /// Rótulos fora do vocabulário são um erro de programação do construtor
    /// do modelo e viram no-op (com `debug_assert` em builds de teste).
    pub fn set(&mut self, feature: &[u8], label: &str, weight: f64) {
        let j = match self.index.get(label) {
            Some(&j) => j,
            None => {
                debug_assert!(false, "rótulo fora do vocabulário: {label}");
                return;
            }
        };
        let arity = self.labels.len();
        let row = self
            .rows
            .entry(feature.to_vec())
            .or_insert_with(|| vec![0.0; arity]);
        row[j] = weight;
    }

    /// Pontuação de um único rótulo para o conjunto de features.
    ///
    /// Rótulo fora do vocabulário pontua `0.0`.
    pub fn score(&self, features: &FeatureSet, label: &Label) -> f64 {
        let j = match self.index.get(label.as_str()) {
            Some(&j) => j,
            None => return 0.0,
        };
        let mut total = 0.0;
        for key in features.iter() {
            if let Some(row) = self.rows.get(key) {
                total += row[j];
            }
        }
        total
    }

    /// Pontuações de todos os rótulos do vocabulário, alinhadas com
    /// [`labels`](Self::labels).
    pub fn scores(&self, features: &FeatureSet) -> Vec<f64> {
        let mut totals = vec![0.0; self.labels.len()];
        for key in features.iter() {
            if let Some(row) = self.rows.get(key) {
                for (total, weight) in totals.iter_mut().zip(row) {
                    *total += weight;
                }
            }
        }
        totals
    }

    /// Argmax determinístico sobre os candidatos dados.
    ///
    /// Empate exato de pontuação: vence o rótulo lexicograficamente menor.
    /// Candidatos fora do vocabulário são ignorados; se nenhum candidato
    /// for pontuável, devolve o rótulo vazio.
    pub fn best_label(&self, features: &FeatureSet, candidates: &[Label]) -> Label {
        let totals = self.scores(features);
        let mut best_label = Label::default();
        let mut best_score = f64::NEG_INFINITY;
        for label in candidates {
            let j = match self.index.get(label.as_str()) {
                Some(&j) => j,
                None => continue,
            };
            let score = totals[j];
            if score > best_score || (score == best_score && *label < best_label) {
                best_score = score;
                best_label = label.clone();
            }
        }
        best_label
    }

    /// Verifica a integridade estrutural da tabela (índice consistente com
    /// o vocabulário, linhas com a aridade certa). Pensado para artefatos
    /// vindos de fora, onde os invariantes de construção não valem.
    pub fn validate(&self) -> Result<()> {
        if self.labels.is_empty() {
            return Err(Error::model("vocabulário de rótulos vazio"));
        }
        if self.index.len() != self.labels.len() {
            return Err(Error::model(
                "índice de rótulos inconsistente com o vocabulário",
            ));
        }
        for (i, label) in self.labels.iter().enumerate() {
            match self.index.get(label) {
                Some(&j) if j == i => {}
                _ => {
                    return Err(Error::model(format!(
                        "rótulo {label} fora de posição no índice"
                    )));
                }
            }
        }
        for (feature, row) in &self.rows {
            if row.len() != self.labels.len() {
                return Err(Error::model(format!(
                    "linha de pesos com aridade errada para a feature {:?}",
                    String::from_utf8_lossy(feature)
                )));
            }
        }
        Ok(())
    }
}
