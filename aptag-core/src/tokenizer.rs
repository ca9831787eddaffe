//! # Tokenizador de Demonstração
//!
//! Divisor simples de texto em tokens para demonstrações e exemplos: corta
//! nas fronteiras de palavra Unicode (UAX-29), descarta espaços e mantém
//! pontuação como token próprio. O motor em si não depende dele — a
//! entrada contratual continua sendo tokens já prontos.

use unicode_segmentation::UnicodeSegmentation;

use crate::token::Token;

/// Divide texto cru em tokens.
///
/// ```
/// use aptag_core::tokenizer::tokenize;
///
/// let tokens = tokenize("The board, finally.");
/// let words: Vec<String> = tokens.iter().map(|t| t.to_string()).collect();
/// assert_eq!(words, ["The", "board", ",", "finally", "."]);
/// ```
pub fn tokenize(text: &str) -> Vec<Token> {
    text.split_word_bounds()
        .filter(|piece| !piece.trim().is_empty())
        .map(Token::from)
        .collect()
}
