//! # Chunker de Sintagmas Nominais
//!
//! Recebe a saída do etiquetador POS (pares token + tag) e decide um
//! rótulo IOB por posição, com o mesmo laço guloso em duas etapas do
//! etiquetador:
//!
//! 1. exceção por palavra no dicionário do artefato (chave normalizada) —
//!    pode forçar qualquer rótulo em qualquer lugar;
//! 2. senão, features sobre (palavras, tags POS) e argmax.
//!
//! Na etapa pontuada vale a restrição de candidatos IOB: logo após um `O`
//! emitido (ou no início da sentença) o rótulo `I` nem concorre — sintagma
//! não continua o que não começou. Exceções do dicionário furam a
//! restrição, e é daí que nasce o `I` pendente; o montador de sintagmas
//! ([`assemble_spans`]) recupera esses casos com tolerância em vez de
//! falhar.
//!
//! As regras de documento ([`ChunkerRules`]) atuam só nas operações de
//! lote (`*_many`): com `combine_np` ligada, o rótulo de uma sentença pode
//! depender das vizinhas, então a equivalência lote/avulso vale apenas na
//! configuração padrão.

use rayon::prelude::*;

use crate::error::Result;
use crate::features;
use crate::greedy::{decode, Decision, SequenceLabeler};
use crate::model::ChunkerModel;
use crate::rules::{self, ChunkerRules};
use crate::token::{Token, START};
use crate::weights::Label;

/// Chunker NP guloso. Imutável depois de construído, `Send + Sync`.
#[derive(Debug, Clone)]
pub struct NpChunker {
    model: ChunkerModel,
    rules: ChunkerRules,
}

impl NpChunker {
    /// Constrói a partir de um artefato validado, com as regras de
    /// documento desligadas.
    pub fn new(model: ChunkerModel) -> Result<Self> {
        model.validate()?;
        Ok(Self {
            model,
            rules: ChunkerRules::default(),
        })
    }

    /// Chunker com o modelo heurístico embutido.
    ///
    /// # Exemplo
    ///
    /// ```
    /// use aptag_core::chunker::NpChunker;
    /// use aptag_core::{Label, Token};
    ///
    /// let chunker = NpChunker::builtin();
    /// let tagged = vec![
    ///     (Token::from("the"), Label::from("DT")),
    ///     (Token::from("board"), Label::from("NN")),
    /// ];
    /// let spans = chunker.chunk_spans(&tagged);
    /// assert_eq!(spans.len(), 1);
    /// assert_eq!(spans[0].len(), 2);
    /// ```
    pub fn builtin() -> Self {
        Self {
            model: ChunkerModel::builtin(),
            rules: ChunkerRules::default(),
        }
    }

    /// Troca as regras de documento.
    pub fn with_rules(mut self, rules: ChunkerRules) -> Self {
        self.rules = rules;
        self
    }

    pub fn rules(&self) -> ChunkerRules {
        self.rules
    }

    /// Rótulos IOB de uma sentença etiquetada. Regras de documento não se
    /// aplicam aqui — uma sentença sozinha não forma documento.
    pub fn chunk_label(&self, sentence: &[(Token, Label)]) -> Vec<(Token, Label, Label)> {
        self.label_sentence(sentence)
    }

    /// Rótulos IOB de um documento, uma sentença por tarefa rayon, com as
    /// regras de documento aplicadas ao final quando ligadas.
    pub fn chunk_label_many(
        &self,
        sentences: &[Vec<(Token, Label)>],
    ) -> Vec<Vec<(Token, Label, Label)>> {
        self.label_document(sentences)
    }

    /// Sintagmas nominais de uma sentença etiquetada.
    pub fn chunk_spans(&self, sentence: &[(Token, Label)]) -> Vec<Vec<(Token, Label)>> {
        assemble_spans(&self.chunk_label(sentence))
    }

    /// Sintagmas nominais de um documento (regras de documento incluídas
    /// quando ligadas).
    pub fn chunk_spans_many(
        &self,
        sentences: &[Vec<(Token, Label)>],
    ) -> Vec<Vec<Vec<(Token, Label)>>> {
        self.chunk_label_many(sentences)
            .iter()
            .map(|labeled| assemble_spans(labeled))
            .collect()
    }
}

impl SequenceLabeler for NpChunker {
    type In = (Token, Label);
    type Out = (Token, Label, Label);

    fn label_sentence(&self, sentence: &[(Token, Label)]) -> Vec<(Token, Label, Label)> {
        let context = features::padded_context(sentence.iter().map(|(word, _)| word));
        let tag_context = features::padded_labels(sentence.iter().map(|(_, tag)| tag.as_str()));

        let vocab = self.model.weights.labels();
        let all: Vec<Label> = vocab.to_vec();
        let after_outside: Vec<Label> = vocab
            .iter()
            .filter(|label| **label != "I")
            .cloned()
            .collect();

        let labels = decode(sentence.len(), |i, history| {
            let key = &context[i + 2];
            if let Some(label) = self.model.tagdict.lookup(key) {
                return Decision::Override(label.clone());
            }
            let fs = features::chunk_features(i, &sentence[i].0, &context, &tag_context);
            // Início de sentença conta como "depois de O".
            let outside = *history.prev() == "O" || *history.prev() == START;
            let candidates = if outside { &after_outside } else { &all };
            Decision::Scored(self.model.weights.best_label(&fs, candidates))
        });

        sentence
            .iter()
            .cloned()
            .zip(labels)
            .map(|((word, tag), iob)| (word, tag, iob))
            .collect()
    }

    fn label_document(&self, document: &[Vec<Self::In>]) -> Vec<Vec<Self::Out>> {
        let mut labeled: Vec<Vec<(Token, Label, Label)>> = document
            .par_iter()
            .map(|sentence| self.label_sentence(sentence))
            .collect();
        if self.rules.combine_np {
            rules::combine_nps(&mut labeled);
        }
        labeled
    }
}

#[derive(Debug, PartialEq, Eq)]
enum SpanState {
    Outside,
    Inside,
}

/// Monta os sintagmas a partir dos rótulos IOB.
///
/// `O` fecha qualquer sintagma aberto; `B` fecha e abre outro; `I`
/// estende — e, se não houver sintagma aberto, abre um mesmo assim
/// (recuperação tolerante de `I` pendente, nunca erro). Fim de sentença
/// fecha o que estiver aberto.
pub fn assemble_spans(labeled: &[(Token, Label, Label)]) -> Vec<Vec<(Token, Label)>> {
    let mut spans = Vec::new();
    let mut current: Vec<(Token, Label)> = Vec::new();
    let mut state = SpanState::Outside;

    for (word, tag, iob) in labeled {
        match state {
            SpanState::Outside => {
                if *iob == "B" || *iob == "I" {
                    current.push((word.clone(), tag.clone()));
                    state = SpanState::Inside;
                }
            }
            SpanState::Inside => {
                if *iob == "B" {
                    spans.push(std::mem::take(&mut current));
                    current.push((word.clone(), tag.clone()));
                } else if *iob == "I" {
                    current.push((word.clone(), tag.clone()));
                } else {
                    spans.push(std::mem::take(&mut current));
                    state = SpanState::Outside;
                }
            }
        }
    }
    if state == SpanState::Inside {
        spans.push(current);
    }
    spans
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{TagDict, CHUNK_LABELS, MODEL_VERSION};
    use crate::weights::WeightTable;

    fn tagged(pairs: &[(&str, &str)]) -> Vec<(Token, Label)> {
        pairs
            .iter()
            .map(|(word, tag)| (Token::from(*word), Label::from(*tag)))
            .collect()
    }

    fn iob_labels(labeled: &[(Token, Label, Label)]) -> Vec<&str> {
        labeled.iter().map(|(_, _, iob)| iob.as_str()).collect()
    }

    fn triples(items: &[(&str, &str, &str)]) -> Vec<(Token, Label, Label)> {
        items
            .iter()
            .map(|(w, t, c)| (Token::from(*w), Label::from(*t), Label::from(*c)))
            .collect()
    }

    #[test]
    fn test_simple_noun_phrases() {
        let chunker = NpChunker::builtin();
        assert_eq!(
            iob_labels(&chunker.chunk_label(&tagged(&[("the", "DT"), ("board", "NN")]))),
            ["B", "I"]
        );
        assert_eq!(
            iob_labels(&chunker.chunk_label(&tagged(&[
                ("a", "DT"),
                ("nonexecutive", "JJ"),
                ("director", "NN"),
            ]))),
            ["B", "I", "I"]
        );
        assert_eq!(
            iob_labels(&chunker.chunk_label(&tagged(&[
                ("61", "CD"),
                ("years", "NNS"),
                ("old", "JJ"),
            ]))),
            ["B", "I", "O"]
        );
    }

    #[test]
    fn test_realistic_sentence() {
        let chunker = NpChunker::builtin();
        let sentence = tagged(&[
            ("Pierre", "NNP"),
            ("Vinken", "NNP"),
            ("will", "MD"),
            ("join", "VB"),
            ("the", "DT"),
            ("board", "NN"),
            ("as", "IN"),
            ("a", "DT"),
            ("nonexecutive", "JJ"),
            ("director", "NN"),
            (".", "."),
        ]);
        let labeled = chunker.chunk_label(&sentence);
        assert_eq!(
            iob_labels(&labeled),
            ["B", "I", "O", "O", "B", "I", "O", "B", "I", "I", "O"]
        );

        let spans = assemble_spans(&labeled);
        let texts: Vec<String> = spans
            .iter()
            .map(|span| {
                span.iter()
                    .map(|(word, _)| word.to_string())
                    .collect::<Vec<_>>()
                    .join(" ")
            })
            .collect();
        assert_eq!(texts, ["Pierre Vinken", "the board", "a nonexecutive director"]);
    }

    #[test]
    fn test_inside_never_scored_after_outside() {
        // Pesos que fariam I ganhar em qualquer posição, se concorresse.
        let mut weights = WeightTable::from_vocabulary(&CHUNK_LABELS);
        weights.set(b"bias", "I", 5.0);
        weights.set(b"bias", "B", 1.0);
        let mut tagdict = TagDict::new();
        tagdict.insert("stop", "O");
        let chunker = NpChunker::new(ChunkerModel {
            version: MODEL_VERSION,
            weights,
            tagdict,
        })
        .unwrap();

        let labeled = chunker.chunk_label(&tagged(&[
            ("x", "NN"),
            ("y", "NN"),
            ("stop", "NN"),
            ("z", "NN"),
        ]));
        // Início de sentença e pós-O escolhem B; no meio, I vence.
        assert_eq!(iob_labels(&labeled), ["B", "I", "O", "B"]);
    }

    #[test]
    fn test_override_forces_dangling_inside() {
        let mut tagdict = TagDict::new();
        tagdict.insert("gap", "O");
        tagdict.insert("tail", "I");
        let chunker = NpChunker::new(ChunkerModel {
            version: MODEL_VERSION,
            weights: WeightTable::from_vocabulary(&CHUNK_LABELS),
            tagdict,
        })
        .unwrap();

        let sentence = tagged(&[("gap", "NN"), ("tail", "NN")]);
        let labeled = chunker.chunk_label(&sentence);
        assert_eq!(iob_labels(&labeled), ["O", "I"]);

        // O I pendente vira sintagma, nunca erro.
        let spans = chunker.chunk_spans(&sentence);
        assert_eq!(spans.len(), 1);
        assert_eq!(spans[0][0].0, Token::from("tail"));
    }

    #[test]
    fn test_assemble_two_spans() {
        let labeled = triples(&[
            ("a", "DT", "B"),
            ("b", "NN", "I"),
            ("c", "VB", "O"),
            ("d", "DT", "B"),
            ("e", "NN", "I"),
            ("f", ".", "O"),
        ]);
        let spans = assemble_spans(&labeled);
        assert_eq!(spans.len(), 2);
        assert_eq!(spans[0].len(), 2);
        assert_eq!(spans[1].len(), 2);
    }

    #[test]
    fn test_assemble_all_outside() {
        let labeled = triples(&[("a", "VB", "O"), ("b", "VB", "O")]);
        assert!(assemble_spans(&labeled).is_empty());
    }

    #[test]
    fn test_assemble_dangling_inside_starts_span() {
        let labeled = triples(&[("a", "NN", "I"), ("b", "NN", "I"), ("c", "VB", "O")]);
        let spans = assemble_spans(&labeled);
        assert_eq!(spans.len(), 1);
        assert_eq!(spans[0].len(), 2);
    }

    #[test]
    fn test_assemble_adjacent_b_splits() {
        let labeled = triples(&[("a", "NN", "B"), ("b", "NN", "B")]);
        let spans = assemble_spans(&labeled);
        assert_eq!(spans.len(), 2);
    }

    #[test]
    fn test_assemble_open_span_closed_at_eos() {
        let labeled = triples(&[("a", "DT", "B"), ("b", "NN", "I")]);
        let spans = assemble_spans(&labeled);
        assert_eq!(spans.len(), 1);
        assert_eq!(spans[0].len(), 2);
    }

    #[test]
    fn test_empty_sentence() {
        let chunker = NpChunker::builtin();
        assert!(chunker.chunk_label(&[]).is_empty());
        assert!(chunker.chunk_spans(&[]).is_empty());
    }

    #[test]
    fn test_spans_plus_outside_reconstruct_sentence() {
        let chunker = NpChunker::builtin();
        let sentence = tagged(&[
            ("Pierre", "NNP"),
            ("Vinken", "NNP"),
            ("will", "MD"),
            ("join", "VB"),
            ("the", "DT"),
            ("board", "NN"),
            (".", "."),
        ]);
        let labeled = chunker.chunk_label(&sentence);
        let spans = chunker.chunk_spans(&sentence);

        // Intercalando os sintagmas com os tokens O nas posições
        // originais, a sentença volta inteira, na ordem.
        let mut from_spans = spans.iter().flat_map(|span| span.iter());
        let rebuilt: Vec<Token> = labeled
            .iter()
            .map(|(word, _, iob)| {
                if *iob == "O" {
                    word.clone()
                } else {
                    match from_spans.next() {
                        Some((word, _)) => word.clone(),
                        None => Token::default(),
                    }
                }
            })
            .collect();
        let original: Vec<Token> = sentence.iter().map(|(word, _)| word.clone()).collect();
        assert_eq!(rebuilt, original);
        assert!(from_spans.next().is_none());
    }

    #[test]
    fn test_batch_matches_single_by_default() {
        let chunker = NpChunker::builtin();
        let doc = vec![
            tagged(&[("the", "DT"), ("board", "NN")]),
            tagged(&[]),
            tagged(&[("61", "CD"), ("years", "NNS"), ("old", "JJ")]),
        ];
        let batch = chunker.chunk_label_many(&doc);
        for (got, sentence) in batch.iter().zip(&doc) {
            assert_eq!(*got, chunker.chunk_label(sentence));
        }
    }

    #[test]
    fn test_combine_rule_applies_only_in_batch() {
        let chunker =
            NpChunker::builtin().with_rules(ChunkerRules::new().with_combine_np(true));
        let sentence = tagged(&[
            ("the", "DT"),
            ("top", "NN"),
            ("of", "IN"),
            ("the", "DT"),
            ("line", "NN"),
        ]);

        // Avulso: sem regra de documento, mesmo ligada.
        assert_eq!(
            iob_labels(&chunker.chunk_label(&sentence)),
            ["B", "I", "O", "B", "I"]
        );

        // Em lote, as duas ocorrências religam a sequência inteira.
        let doc = vec![sentence.clone(), sentence];
        let batch = chunker.chunk_label_many(&doc);
        assert_eq!(iob_labels(&batch[0]), ["B", "I", "I", "I", "I"]);
        assert_eq!(iob_labels(&batch[1]), ["B", "I", "I", "I", "I"]);

        let spans = chunker.chunk_spans_many(&doc);
        assert_eq!(spans[0].len(), 1);
        assert_eq!(spans[0][0].len(), 5);
    }

    #[test]
    fn test_invalid_vocabulary_rejected() {
        let model = ChunkerModel {
            version: MODEL_VERSION,
            weights: WeightTable::from_vocabulary(&["B", "I"]),
            tagdict: TagDict::new(),
        };
        assert!(NpChunker::new(model).is_err());
    }
}
