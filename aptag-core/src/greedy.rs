//! # Decodificação Gulosa
//!
//! Decodificador esquerda→direita compartilhado pelo etiquetador POS e pelo
//! chunker: em cada posição decide um rótulo e segue em frente, sem
//! retrocesso. O estado entre posições é só o par `(prev, prev2)` de
//! rótulos já emitidos — inicializado com as sentinelas `-START-` /
//! `-START2-` a cada sentença.
//!
//! A decisão em cada posição tem duas origens ([`Decision`]):
//!
//! - `Override`: veio de tabela de exceções (dicionário de tags), sem
//!   consultar o modelo;
//! - `Scored`: veio do argmax do modelo linear.
//!
//! Para o histórico tanto faz a origem: o rótulo entra igual.
//!
//! O processamento de documentos é paralelo por sentença (rayon), cada
//! sentença com seu próprio histórico, preservando a ordem de entrada.

use rayon::prelude::*;

use crate::token::{START, START2};
use crate::weights::Label;

/// Janela de histórico do decodificador: os dois últimos rótulos emitidos.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct History {
    prev: Label,
    prev2: Label,
}

impl History {
    /// Histórico de início de sentença, com as sentinelas.
    pub fn start() -> Self {
        Self {
            prev: Label::from(START),
            prev2: Label::from(START2),
        }
    }

    /// Desloca a janela: `prev` vira `prev2`, o novo rótulo vira `prev`.
    pub fn push(&mut self, label: Label) {
        self.prev2 = std::mem::replace(&mut self.prev, label);
    }

    pub fn prev(&self) -> &Label {
        &self.prev
    }

    pub fn prev2(&self) -> &Label {
        &self.prev2
    }
}

impl Default for History {
    fn default() -> Self {
        Self::start()
    }
}

/// Origem do rótulo decidido em uma posição.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Decision {
    /// Rótulo vindo do dicionário de exceções; o modelo nem foi consultado.
    Override(Label),
    /// Rótulo escolhido pelo argmax do modelo.
    Scored(Label),
}

impl Decision {
    pub fn into_label(self) -> Label {
        match self {
            Decision::Override(label) | Decision::Scored(label) => label,
        }
    }
}

/// Laço guloso: chama `step` para cada posição com o histórico corrente e
/// acumula os rótulos decididos. O rótulo de cada decisão entra no
/// histórico independente da origem.
pub fn decode<F>(len: usize, mut step: F) -> Vec<Label>
where
    F: FnMut(usize, &History) -> Decision,
{
    let mut history = History::start();
    let mut labels = Vec::with_capacity(len);
    for i in 0..len {
        let label = step(i, &history).into_label();
        history.push(label.clone());
        labels.push(label);
    }
    labels
}

/// Rotulador de sequências com processamento de documentos em paralelo.
///
/// Implementações só precisam rotular uma sentença; o documento inteiro sai
/// de graça, uma sentença por tarefa rayon, na ordem de entrada. Sentenças
/// são independentes entre si, então o resultado do lote é idêntico ao de
/// rotular uma a uma.
pub trait SequenceLabeler: Sync {
    type In: Sync;
    type Out: Send;

    fn label_sentence(&self, sentence: &[Self::In]) -> Vec<Self::Out>;

    fn label_document(&self, document: &[Vec<Self::In>]) -> Vec<Vec<Self::Out>> {
        document
            .par_iter()
            .map(|sentence| self.label_sentence(sentence))
            .collect()
    }
}
