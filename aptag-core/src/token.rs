//! # Tokens como Bytes e Normalização
//!
//! O motor opera sobre **bytes crus**, não sobre `String`. Um [`Token`] é uma
//! sequência opaca de bytes: igualdade e hash são byte-a-byte, a sequência
//! vazia é um token válido e bytes que não formam UTF-8 atravessam o motor
//! intactos. A conversão para texto só acontece quando o chamador pede
//! ([`Token::as_str`]) e falha imediatamente com [`crate::Error::Encoding`]
//! se os bytes não forem UTF-8.
//!
//! ## Classes de Normalização
//!
//! A normalização colapsa formas superficiais em chaves canônicas antes da
//! extração de features e da consulta ao dicionário de overrides:
//!
//! | Entrada                          | Chave     | Efeito                       |
//! |----------------------------------|-----------|------------------------------|
//! | `""` (token vazio)               | `""`      | chave vazia explícita        |
//! | `(`, `[`, `{`                    | `!LRB`    | override de pontuação        |
//! | `)`, `]`                         | `!RRB`    | override de pontuação        |
//! | `}`                              | `!RCB`    | override de pontuação        |
//! | `-1`, `0.5`, `.5`, `1996` ...    | `!NUM`    | override de numeral          |
//! | `61-year-old` (hífen interno)    | `!HYPHEN` | colapso para features        |
//! | `61st`, `3rd` (começa com dígito)| `!DIGITS` | colapso para features        |
//! | demais                           | minúsculas ASCII | caso geral            |
//!
//! As três primeiras classes de override garantem rótulo determinístico
//! independente de contexto; as demais só afetam as chaves de feature.

use std::fmt;
use std::sync::OnceLock;

use regex::bytes::Regex;
use serde::{Deserialize, Serialize};

use crate::error::Result;

/// Sentinela de contexto: duas posições antes do início da sentença.
pub const START: &str = "-START-";
/// Sentinela de contexto: vizinho imediato à esquerda do primeiro token.
pub const START2: &str = "-START2-";
/// Sentinela de contexto: vizinho imediato à direita do último token.
pub const END: &str = "-END-";
/// Sentinela de contexto: duas posições após o fim da sentença.
pub const END2: &str = "-END2-";

/// Chave canônica para parênteses/colchetes/chaves de abertura.
pub const KEY_LRB: &[u8] = b"!LRB";
/// Chave canônica para parênteses/colchetes de fechamento.
pub const KEY_RRB: &[u8] = b"!RRB";
/// Chave canônica para chave de fechamento (`}`).
pub const KEY_RCB: &[u8] = b"!RCB";
/// Chave canônica para formas numéricas (`-1`, `0.5`, `.5`, ...).
pub const KEY_NUM: &[u8] = b"!NUM";

/// Um token: sequência opaca de bytes, possivelmente vazia.
///
/// O chamador é responsável por codificar texto em bytes (tipicamente UTF-8)
/// antes de entrar no motor. Internamente nada é decodificado: sufixos,
/// prefixos e minúsculas operam byte a byte.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Token(Vec<u8>);

impl Token {
    /// Cria um token a partir de qualquer fonte de bytes.
    pub fn new(bytes: impl Into<Vec<u8>>) -> Self {
        Token(bytes.into())
    }

    /// Os bytes do token.
    pub fn as_bytes(&self) -> &[u8] {
        &self.0
    }

    /// Converte para `&str`, falhando com [`crate::Error::Encoding`] se os
    /// bytes não forem UTF-8 válido. Esta é a única fronteira bytes→texto.
    pub fn as_str(&self) -> Result<&str> {
        Ok(std::str::from_utf8(&self.0)?)
    }

    /// Número de bytes.
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Verdadeiro para o token vazio (que é uma entrada legítima).
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl From<&str> for Token {
    fn from(s: &str) -> Self {
        Token(s.as_bytes().to_vec())
    }
}

impl From<String> for Token {
    fn from(s: String) -> Self {
        Token(s.into_bytes())
    }
}

impl From<&[u8]> for Token {
    fn from(b: &[u8]) -> Self {
        Token(b.to_vec())
    }
}

impl From<Vec<u8>> for Token {
    fn from(b: Vec<u8>) -> Self {
        Token(b)
    }
}

impl fmt::Display for Token {
    /// Exibição com perda: bytes inválidos viram U+FFFD. Para conversão
    /// estrita use [`Token::as_str`].
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", String::from_utf8_lossy(&self.0))
    }
}

/// Constrói uma sentença (lista de tokens) a partir de palavras já separadas.
///
/// Conveniência para exemplos e testes:
///
/// ```rust
/// use aptag_core::token::sentence;
///
/// let sent = sentence(&["The", "first", "sentence", "."]);
/// assert_eq!(sent.len(), 4);
/// ```
pub fn sentence(words: &[&str]) -> Vec<Token> {
    words.iter().map(|w| Token::from(*w)).collect()
}

/// Forma numérica: `-` opcional, dígitos ASCII, no máximo um `.`, ao menos
/// um dígito. Cobre inteiros, decimais, decimais sem dígito inicial e seus
/// negativos.
fn numeric_shape() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r"^-?(?:[0-9]+\.?[0-9]*|\.[0-9]+)$").expect("regex literal")
    })
}

/// Normaliza um token para sua chave canônica (ver tabela do módulo).
///
/// Total e determinística: nunca falha, nem para o token vazio. A saída é a
/// chave usada tanto nas features de contexto quanto na consulta ao
/// dicionário de overrides.
pub fn normalize(word: &Token) -> Vec<u8> {
    let bytes = word.as_bytes();

    if bytes.is_empty() {
        return Vec::new();
    }

    if bytes.len() == 1 {
        match bytes[0] {
            b'(' | b'[' | b'{' => return KEY_LRB.to_vec(),
            b')' | b']' => return KEY_RRB.to_vec(),
            b'}' => return KEY_RCB.to_vec(),
            _ => {}
        }
    }

    if numeric_shape().is_match(bytes) {
        return KEY_NUM.to_vec();
    }

    // Hífen interno (mas não inicial) colapsa a palavra inteira.
    if bytes.contains(&b'-') && bytes[0] != b'-' {
        return b"!HYPHEN".to_vec();
    }

    if bytes[0].is_ascii_digit() {
        return b"!DIGITS".to_vec();
    }

    bytes.iter().map(|b| b.to_ascii_lowercase()).collect()
}
