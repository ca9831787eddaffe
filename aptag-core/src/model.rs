//! # Artefatos de Modelo
//!
//! Um modelo pronto para inferência tem três partes:
//!
//! 1. **Versão de formato** — artefatos de outra versão são rejeitados na
//!    carga, nunca reinterpretados;
//! 2. **Tabela de pesos** ([`WeightTable`]) sobre o vocabulário fechado de
//!    rótulos da tarefa;
//! 3. **Dicionário de tags** ([`TagDict`]) — exceções consultadas *antes*
//!    do modelo: chave normalizada → rótulo, decisão incondicional.
//!
//! ## Modelos embutidos
//!
//! Treinamento fica fora deste crate; os construtores `builtin()` montam
//! pesos heurísticos à mão, agrupados linguisticamente (sufixos, forma
//! ortográfica, transições de rótulo, identidade de palavras frequentes).
//! São suficientes para demonstração e para os cenários documentados —
//! não substituem um modelo treinado em corpus.
//!
//! Limitação conhecida do etiquetador embutido: palavra capitalizada fora
//! do dicionário vira `NNP`, inclusive em início de sentença.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};
use crate::features::{feature_key, flag_key};
use crate::weights::{Label, WeightTable};

/// Versão do formato de artefato aceita por esta biblioteca.
pub const MODEL_VERSION: u32 = 1;

/// Vocabulário POS do etiquetador: as 45 tags do Penn Treebank.
pub const POS_TAGS: [&str; 45] = [
    "#", "$", "''", ",", "-LRB-", "-RRB-", ".", ":", "CC", "CD", "DT", "EX",
    "FW", "IN", "JJ", "JJR", "JJS", "LS", "MD", "NN", "NNP", "NNPS", "NNS",
    "PDT", "POS", "PRP", "PRP$", "RB", "RBR", "RBS", "RP", "SYM", "TO", "UH",
    "VB", "VBD", "VBG", "VBN", "VBP", "VBZ", "WDT", "WP", "WP$", "WRB", "``",
];

/// Vocabulário IOB do chunker. Exatamente estes três, sempre.
pub const CHUNK_LABELS: [&str; 3] = ["B", "I", "O"];

/// Dicionário de exceções: chave **normalizada** → rótulo.
///
/// A consulta acontece antes de qualquer pontuação; um acerto decide o
/// rótulo incondicionalmente. Como as chaves são normalizadas, o
/// dicionário é insensível a caixa ASCII de graça.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct TagDict {
    entries: HashMap<Vec<u8>, Label>,
}

impl TagDict {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, key: impl Into<Vec<u8>>, label: impl Into<Label>) {
        self.entries.insert(key.into(), label.into());
    }

    /// Insere só se a chave ainda não existe — artefatos carregados podem
    /// preencher uma entrada antes da semeadura padrão.
    pub fn insert_if_absent(&mut self, key: impl Into<Vec<u8>>, label: impl Into<Label>) {
        self.entries.entry(key.into()).or_insert_with(|| label.into());
    }

    pub fn lookup(&self, key: &[u8]) -> Option<&Label> {
        self.entries.get(key)
    }

    pub fn values(&self) -> impl Iterator<Item = &Label> {
        self.entries.values()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// Artefato do etiquetador POS.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TaggerModel {
    pub version: u32,
    pub weights: WeightTable,
    pub tagdict: TagDict,
}

impl TaggerModel {
    /// Rejeita artefatos de outra versão ou estruturalmente quebrados.
    ///
    /// Os rótulos do dicionário *não* precisam pertencer ao vocabulário
    /// pontuado: `(`/`)`/`}` dos colchetes, por exemplo, só existem via
    /// dicionário.
    pub fn validate(&self) -> Result<()> {
        if self.version != MODEL_VERSION {
            return Err(Error::model(format!(
                "versão de artefato não suportada: {} (esperada {MODEL_VERSION})",
                self.version
            )));
        }
        self.weights.validate()
    }

    /// Modelo heurístico embutido para inglês.
    pub fn builtin() -> Self {
        let mut weights = WeightTable::from_vocabulary(&POS_TAGS);

        // --- FORMA ORTOGRÁFICA ---
        weights.set(&flag_key("bias"), "NN", 0.6);
        weights.set(&flag_key("has_upper"), "NNP", 2.5);

        // --- IDENTIDADE DE PALAVRAS FREQUENTES ---
        for (word, tag, weight) in [
            ("first", "JJ", 4.0),
            ("empty", "JJ", 4.0),
            ("old", "JJ", 3.0),
            ("nonexecutive", "JJ", 4.0),
            ("sentence", "NN", 3.0),
            ("token", "NN", 3.0),
            ("board", "NN", 3.0),
            ("director", "NN", 3.0),
            ("company", "NN", 3.0),
            ("market", "NN", 3.0),
            ("group", "NN", 3.0),
            ("line", "NN", 3.0),
            ("top", "NN", 3.0),
            ("years", "NNS", 3.0),
            ("join", "VB", 2.0),
        ] {
            weights.set(&feature_key("w0", word.as_bytes()), tag, weight);
        }

        // --- SUFIXOS ---
        weights.set(&feature_key("suf3", b"nce"), "NN", 2.0);
        weights.set(&feature_key("suf3", b"ion"), "NN", 1.5);
        weights.set(&feature_key("suf3", b"ing"), "VBG", 2.0);
        weights.set(&feature_key("suf3", b"ous"), "JJ", 1.5);
        for c in b'a'..=b'z' {
            weights.set(&feature_key("suf3", &[c, b'e', b'd']), "VBD", 1.2);
            weights.set(&feature_key("suf3", &[c, b'l', b'y']), "RB", 1.5);
        }

        // --- TRANSIÇÕES DE RÓTULO ---
        for (prev, tag, weight) in [
            ("DT", "NN", 1.0),
            ("JJ", "NN", 1.0),
            ("MD", "VB", 1.5),
            ("TO", "VB", 1.5),
        ] {
            weights.set(&feature_key("t-1", prev.as_bytes()), tag, weight);
        }

        // --- DICIONÁRIO: PALAVRAS DE BAIXA AMBIGUIDADE ---
        let mut tagdict = TagDict::new();
        for (tag, words) in [
            ("DT", &["the", "a", "an", "this", "these", "those"][..]),
            ("IN", &["of", "in", "on", "at", "by", "for", "with", "from", "as", "into"][..]),
            ("TO", &["to"][..]),
            ("CC", &["and", "or", "but", "plus"][..]),
            ("VBZ", &["is", "has"][..]),
            ("VBD", &["was", "were", "had"][..]),
            ("VBP", &["are", "have"][..]),
            ("VB", &["be"][..]),
            ("VBN", &["been"][..]),
            ("MD", &["will", "would", "can", "could", "should", "may", "must"][..]),
            ("RB", &["not"][..]),
        ] {
            for word in words {
                tagdict.insert(*word, tag);
            }
        }

        // --- DICIONÁRIO: PONTUAÇÃO ---
        for (word, tag) in [
            (".", "."),
            ("?", "."),
            ("!", "."),
            (",", ","),
            (":", ":"),
            (";", ":"),
            ("''", "''"),
            ("``", "``"),
            ("$", "$"),
            ("#", "#"),
        ] {
            tagdict.insert(word, tag);
        }

        Self {
            version: MODEL_VERSION,
            weights,
            tagdict,
        }
    }
}

/// Artefato do chunker NP.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChunkerModel {
    pub version: u32,
    pub weights: WeightTable,
    /// Exceções por palavra (chave normalizada → B/I/O). Pode forçar
    /// qualquer rótulo em qualquer posição, inclusive `I` depois de `O`.
    pub tagdict: TagDict,
}

impl ChunkerModel {
    /// Além da versão e da integridade da tabela, exige o vocabulário
    /// exatamente igual a {B, I, O} e exceções restritas a esses rótulos.
    pub fn validate(&self) -> Result<()> {
        if self.version != MODEL_VERSION {
            return Err(Error::model(format!(
                "versão de artefato não suportada: {} (esperada {MODEL_VERSION})",
                self.version
            )));
        }
        self.weights.validate()?;

        let vocab = self.weights.labels();
        let iob = vocab.len() == CHUNK_LABELS.len()
            && CHUNK_LABELS.iter().all(|l| self.weights.contains_label(l));
        if !iob {
            return Err(Error::model(
                "vocabulário do chunker precisa ser exatamente {B, I, O}",
            ));
        }
        for label in self.tagdict.values() {
            if !CHUNK_LABELS.contains(&label.as_str()) {
                return Err(Error::model(format!(
                    "exceção do chunker com rótulo fora de {{B, I, O}}: {label}"
                )));
            }
        }
        Ok(())
    }

    /// Modelo heurístico embutido: estrutura determinante/adjetivo/nome.
    pub fn builtin() -> Self {
        let mut weights = WeightTable::from_vocabulary(&CHUNK_LABELS);

        // --- LINHA DE BASE: FORA DE SINTAGMA ---
        weights.set(&flag_key("bias"), "O", 1.0);
        for tag in [
            "VB", "VBD", "VBG", "VBN", "VBP", "VBZ", "MD", "IN", "TO", "CC",
            "RB", "RP", ".", ",", ":", "''", "``", "$", "#",
        ] {
            weights.set(&feature_key("t0", tag.as_bytes()), "O", 2.0);
        }
        weights.set(&feature_key("t0", b"JJ"), "O", 1.5);

        // --- ABERTURA DE SINTAGMA ---
        weights.set(&feature_key("t0", b"DT"), "B", 3.0);
        weights.set(&feature_key("t0", b"CD"), "B", 2.0);
        for tag in ["NN", "NNS", "NNP", "NNPS"] {
            weights.set(&feature_key("t0", tag.as_bytes()), "B", 2.0);
        }

        // --- CONTINUAÇÃO DE SINTAGMA ---
        for prev in ["DT", "JJ", "NN", "NNS", "NNP", "NNPS", "CD", "PRP$"] {
            for cur in ["NN", "NNS", "NNP", "NNPS"] {
                weights.set(&pair_key("t-1t0", prev, cur), "I", 4.0);
            }
        }
        weights.set(&pair_key("t-1t0", "DT", "JJ"), "I", 4.0);
        weights.set(&pair_key("t-1t0", "JJ", "JJ"), "I", 3.5);
        weights.set(&pair_key("t-1t0", "PRP$", "JJ"), "I", 3.5);

        Self {
            version: MODEL_VERSION,
            weights,
            tagdict: TagDict::new(),
        }
    }
}

/// Chave `nome=a b`, no mesmo formato multi-valor da extração de features.
fn pair_key(name: &str, a: &str, b: &str) -> Vec<u8> {
    let mut value = a.as_bytes().to_vec();
    value.push(b' ');
    value.extend_from_slice(b.as_bytes());
    feature_key(name, &value)
}
