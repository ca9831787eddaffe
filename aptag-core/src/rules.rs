//! # Regras de Documento
//!
//! Pós-processamento opcional sobre a saída IOB do chunker, olhando o
//! documento inteiro (as regras por sentença vivem no próprio chunker).
//!
//! ## Recombinação de sintagmas (`combine_np`)
//!
//! Nomes compostos do tipo "the top **of** the line" saem do chunker como
//! dois sintagmas separados por uma palavra de ligação. Quando a *mesma*
//! sequência aparece pelo menos duas vezes no documento, é quase certo que
//! se trata de um nome único; a regra então religa cada ocorrência,
//! reetiquetando a lacuna e o `B` do segundo sintagma como `I`.
//!
//! A varredura por sentença é uma máquina de quatro estágios:
//!
//! | estágio    | evento                  | efeito                        |
//! |------------|-------------------------|-------------------------------|
//! | `Idle`     | `B`                     | abre candidato                |
//! | `FirstNp`  | `I`                     | estende o primeiro sintagma   |
//! | `FirstNp`  | `B`                     | recomeça o candidato aqui     |
//! | `FirstNp`  | `O` de ligação          | entra na lacuna               |
//! | `FirstNp`  | outro `O`               | descarta                      |
//! | `Gap`      | `O` de ligação          | estende a lacuna              |
//! | `Gap`      | `B`                     | abre o segundo sintagma       |
//! | `Gap`      | outro `O`               | descarta                      |
//! | `Gap`      | `I`                     | ignorado (sem transição)      |
//! | `SecondNp` | `I`                     | estende o segundo sintagma    |
//! | `SecondNp` | outro / fim da sentença | emite o candidato             |
//!
//! Palavras de ligação: `the a in of an`, comparação ASCII sem caixa. A
//! chave do candidato é a sequência de tokens em minúsculas; ocorrências
//! contam no documento todo. Regra desligada por padrão — com ela ligada,
//! o resultado de uma sentença passa a depender das vizinhas.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::token::Token;
use crate::weights::Label;

/// Palavras de ligação aceitas na lacuna entre os dois sintagmas.
const COMBINE_STOPWORDS: [&[u8]; 5] = [b"the", b"a", b"in", b"of", b"an"];

/// Regras de documento do chunker. Todas desligadas por padrão.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChunkerRules {
    /// Religa sintagmas repetidos do tipo NP-ligação-NP.
    pub combine_np: bool,
}

impl ChunkerRules {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_combine_np(mut self, enabled: bool) -> Self {
        self.combine_np = enabled;
        self
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum CombineStage {
    Idle,
    FirstNp,
    Gap,
    SecondNp,
}

fn is_stopword(word: &Token) -> bool {
    COMBINE_STOPWORDS
        .iter()
        .any(|s| word.as_bytes().eq_ignore_ascii_case(s))
}

/// Aplica a recombinação de sintagmas no documento, reetiquetando em
/// lugar. Cada tripla é `(token, tag POS, rótulo IOB)`; só o rótulo IOB
/// muda.
pub fn combine_nps(sentences: &mut [Vec<(Token, Label, Label)>]) {
    // chave do candidato -> ocorrências (sentença, posições a reetiquetar)
    let mut occurrences: HashMap<Vec<Vec<u8>>, Vec<(usize, Vec<usize>)>> = HashMap::new();

    for (sid, sent) in sentences.iter().enumerate() {
        let mut stage = CombineStage::Idle;
        let mut words: Vec<Vec<u8>> = Vec::new();
        let mut relabel: Vec<usize> = Vec::new();

        for (i, (word, _tag, iob)) in sent.iter().enumerate() {
            let lower = word.as_bytes().to_ascii_lowercase();
            match stage {
                CombineStage::Idle => {
                    if *iob == "B" {
                        stage = CombineStage::FirstNp;
                        words = vec![lower];
                        relabel.clear();
                    }
                }
                CombineStage::FirstNp => {
                    if *iob == "I" {
                        words.push(lower);
                    } else if *iob == "B" {
                        words = vec![lower];
                        relabel.clear();
                    } else if is_stopword(word) {
                        stage = CombineStage::Gap;
                        words.push(lower);
                        relabel.push(i);
                    } else {
                        stage = CombineStage::Idle;
                        words.clear();
                        relabel.clear();
                    }
                }
                CombineStage::Gap => {
                    if *iob == "B" {
                        stage = CombineStage::SecondNp;
                        words.push(lower);
                        relabel.push(i);
                    } else if *iob == "O" {
                        if is_stopword(word) {
                            words.push(lower);
                            relabel.push(i);
                        } else {
                            stage = CombineStage::Idle;
                            words.clear();
                            relabel.clear();
                        }
                    }
                    // `I` solto dentro da lacuna: ignorado.
                }
                CombineStage::SecondNp => {
                    if *iob == "I" {
                        words.push(lower);
                    } else {
                        occurrences
                            .entry(std::mem::take(&mut words))
                            .or_default()
                            .push((sid, std::mem::take(&mut relabel)));
                        // O token corrente recomeça a máquina do zero.
                        if *iob == "B" {
                            stage = CombineStage::FirstNp;
                            words = vec![lower];
                        } else {
                            stage = CombineStage::Idle;
                        }
                    }
                }
            }
        }

        // Candidato aberto no fim da sentença também conta.
        if stage == CombineStage::SecondNp {
            occurrences.entry(words).or_default().push((sid, relabel));
        }
    }

    let inside = Label::from("I");
    for candidates in occurrences.into_values() {
        if candidates.len() < 2 {
            continue;
        }
        for (sid, positions) in candidates {
            for p in positions {
                sentences[sid][p].2 = inside.clone();
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn triple(word: &str, tag: &str, iob: &str) -> (Token, Label, Label) {
        (Token::from(word), Label::from(tag), Label::from(iob))
    }

    fn iob_labels(sent: &[(Token, Label, Label)]) -> Vec<&str> {
        sent.iter().map(|(_, _, c)| c.as_str()).collect()
    }

    fn top_of_the_line() -> Vec<(Token, Label, Label)> {
        vec![
            triple("the", "DT", "B"),
            triple("top", "NN", "I"),
            triple("of", "IN", "O"),
            triple("the", "DT", "B"),
            triple("line", "NN", "I"),
        ]
    }

    #[test]
    fn test_rules_default_off() {
        assert!(!ChunkerRules::default().combine_np);
        assert!(ChunkerRules::new().with_combine_np(true).combine_np);
    }

    #[test]
    fn test_rules_roundtrip_json() {
        let rules = ChunkerRules::new().with_combine_np(true);
        let json = serde_json::to_string(&rules).unwrap();
        let back: ChunkerRules = serde_json::from_str(&json).unwrap();
        assert_eq!(back, rules);
    }

    #[test]
    fn test_repeated_candidate_is_relinked() {
        let mut doc = vec![top_of_the_line(), top_of_the_line()];
        combine_nps(&mut doc);
        assert_eq!(iob_labels(&doc[0]), ["B", "I", "I", "I", "I"]);
        assert_eq!(iob_labels(&doc[1]), ["B", "I", "I", "I", "I"]);
    }

    #[test]
    fn test_single_occurrence_untouched() {
        let mut doc = vec![top_of_the_line()];
        combine_nps(&mut doc);
        assert_eq!(iob_labels(&doc[0]), ["B", "I", "O", "B", "I"]);
    }

    #[test]
    fn test_non_stopword_gap_discards() {
        let sent = vec![
            triple("the", "DT", "B"),
            triple("top", "NN", "I"),
            triple("near", "IN", "O"),
            triple("the", "DT", "B"),
            triple("line", "NN", "I"),
        ];
        let mut doc = vec![sent.clone(), sent];
        combine_nps(&mut doc);
        assert_eq!(iob_labels(&doc[0]), ["B", "I", "O", "B", "I"]);
        assert_eq!(iob_labels(&doc[1]), ["B", "I", "O", "B", "I"]);
    }

    #[test]
    fn test_second_b_restarts_candidate() {
        let mut sent = vec![triple("a", "DT", "B")];
        sent.extend(top_of_the_line());
        let mut doc = vec![sent.clone(), sent];
        combine_nps(&mut doc);
        // O "a" inicial fica de fora; o candidato recomeçou no segundo B.
        assert_eq!(iob_labels(&doc[0]), ["B", "B", "I", "I", "I", "I"]);
        assert_eq!(iob_labels(&doc[1]), ["B", "B", "I", "I", "I", "I"]);
    }

    #[test]
    fn test_completion_in_loop_and_at_eos_share_key() {
        let mut closed = top_of_the_line();
        closed.push(triple(".", ".", "O"));
        let mut doc = vec![closed, top_of_the_line()];
        combine_nps(&mut doc);
        assert_eq!(iob_labels(&doc[0]), ["B", "I", "I", "I", "I", "O"]);
        assert_eq!(iob_labels(&doc[1]), ["B", "I", "I", "I", "I"]);
    }

    #[test]
    fn test_candidate_key_ignores_ascii_case() {
        let shouted = vec![
            triple("The", "DT", "B"),
            triple("Top", "NN", "I"),
            triple("Of", "IN", "O"),
            triple("The", "DT", "B"),
            triple("Line", "NN", "I"),
        ];
        let mut doc = vec![shouted, top_of_the_line()];
        combine_nps(&mut doc);
        assert_eq!(iob_labels(&doc[0]), ["B", "I", "I", "I", "I"]);
        assert_eq!(iob_labels(&doc[1]), ["B", "I", "I", "I", "I"]);
    }

    #[test]
    fn test_stray_inside_in_gap_is_ignored() {
        let with_stray = vec![
            triple("the", "DT", "B"),
            triple("top", "NN", "I"),
            triple("of", "IN", "O"),
            triple("x", "NN", "I"),
            triple("the", "DT", "B"),
            triple("line", "NN", "I"),
        ];
        let mut doc = vec![with_stray, top_of_the_line()];
        combine_nps(&mut doc);
        // O "x" não entra na chave, então as duas ocorrências casam.
        assert_eq!(iob_labels(&doc[0]), ["B", "I", "I", "I", "I", "I"]);
        assert_eq!(iob_labels(&doc[1]), ["B", "I", "I", "I", "I"]);
    }
}
