//! # Erros do Motor
//!
//! Taxonomia mínima de erros do crate. Só há duas famílias de falha:
//!
//! - **Codificação**: conversão explícita de bytes para texto em uma fronteira
//!   da API (ex: [`crate::Token::as_str`]). Falha imediata, por chamada.
//! - **Modelo**: artefato de modelo inválido, corrompido ou de versão
//!   incompatível, detectado na construção do etiquetador/chunker.
//!
//! Inconsistências do decodificador (ex: um `I` sem `B` anterior vindo de um
//! override) **não** são erros: o montador de spans as recupera de forma
//! leniente. Entradas degeneradas (sentença vazia, token vazio) também não
//! são erros: produzem saída vazia ou passam adiante.

use thiserror::Error;

/// Alias de `Result` para as operações do crate.
pub type Result<T> = std::result::Result<T, Error>;

/// Erro das operações do crate.
#[derive(Error, Debug)]
#[non_exhaustive]
pub enum Error {
    /// Os bytes de um token não formam texto UTF-8 válido.
    #[error("sequência de bytes inválida para conversão em texto: {0}")]
    Encoding(#[from] std::str::Utf8Error),

    /// Artefato de modelo inválido (vocabulário, pesos ou versão).
    #[error("artefato de modelo inválido: {0}")]
    Model(String),
}

impl Error {
    /// Cria um erro de artefato de modelo.
    pub fn model(msg: impl Into<String>) -> Self {
        Error::Model(msg.into())
    }
}
