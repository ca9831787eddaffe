//! # Etiquetador POS
//!
//! Etiquetagem gramatical gulosa em duas etapas por posição:
//!
//! ```text
//! token ──normaliza──► chave
//!                        │
//!              dicionário de tags?
//!               │ sim           │ não
//!               ▼               ▼
//!         Override(rótulo)   features + argmax ──► Scored(rótulo)
//!               └───────┬───────┘
//!                       ▼
//!             histórico (prev, prev2)
//! ```
//!
//! O dicionário vence incondicionalmente e pula a pontuação; nos dois
//! casos o rótulo emitido entra no histórico. A forma normalizada é
//! calculada uma vez por posição e serve tanto para a consulta ao
//! dicionário quanto para as features de contexto.
//!
//! Todo etiquetador construído garante as exceções padrão no dicionário
//! (inserção só-se-ausente, o artefato pode antecipá-las):
//!
//! | chave     | rótulo |
//! |-----------|--------|
//! | `!LRB`    | `(`    |
//! | `!RRB`    | `)`    |
//! | `!RCB`    | `}`    |
//! | `!NUM`    | `CD`   |
//!
//! É isso que torna colchetes e numerais determinísticos em qualquer
//! contexto, com qualquer artefato.

use crate::error::Result;
use crate::features;
use crate::greedy::{decode, Decision, SequenceLabeler};
use crate::model::{TagDict, TaggerModel};
use crate::token::{Token, KEY_LRB, KEY_NUM, KEY_RCB, KEY_RRB};
use crate::weights::Label;

/// Etiquetador POS guloso. Imutável depois de construído; pode ser
/// compartilhado entre threads à vontade (`Send + Sync`).
#[derive(Debug, Clone)]
pub struct PosTagger {
    model: TaggerModel,
}

impl PosTagger {
    /// Constrói a partir de um artefato, validando-o e semeando as
    /// exceções padrão. Artefato inválido é erro fatal aqui, não durante
    /// a etiquetagem.
    pub fn new(mut model: TaggerModel) -> Result<Self> {
        model.validate()?;
        seed_standard_overrides(&mut model.tagdict);
        Ok(Self { model })
    }

    /// Etiquetador com o modelo heurístico embutido.
    ///
    /// # Exemplo
    ///
    /// ```
    /// use aptag_core::tagger::PosTagger;
    /// use aptag_core::token::sentence;
    ///
    /// let tagger = PosTagger::builtin();
    /// let tagged = tagger.tag(&sentence(&["The", "first", "sentence", "."]));
    /// let tags: Vec<&str> = tagged.iter().map(|(_, t)| t.as_str()).collect();
    /// assert_eq!(tags, ["DT", "JJ", "NN", "."]);
    /// ```
    pub fn builtin() -> Self {
        let mut model = TaggerModel::builtin();
        seed_standard_overrides(&mut model.tagdict);
        Self { model }
    }

    /// Etiqueta uma sentença já tokenizada. Sentença vazia devolve vazio;
    /// tokens vazios participam como qualquer outro.
    pub fn tag(&self, sentence: &[Token]) -> Vec<(Token, Label)> {
        self.label_sentence(sentence)
    }

    /// Etiqueta um documento inteiro, uma sentença por tarefa rayon. A
    /// saída preserva a ordem e é elemento a elemento igual à de
    /// [`tag`](Self::tag).
    pub fn tag_many(&self, sentences: &[Vec<Token>]) -> Vec<Vec<(Token, Label)>> {
        self.label_document(sentences)
    }
}

impl SequenceLabeler for PosTagger {
    type In = Token;
    type Out = (Token, Label);

    fn label_sentence(&self, sentence: &[Token]) -> Vec<(Token, Label)> {
        let context = features::padded_context(sentence.iter());
        let labels = decode(sentence.len(), |i, history| {
            let key = &context[i + 2];
            if let Some(label) = self.model.tagdict.lookup(key) {
                return Decision::Override(label.clone());
            }
            let fs = features::pos_features(
                i,
                &sentence[i],
                &context,
                history.prev().as_str(),
                history.prev2().as_str(),
            );
            Decision::Scored(
                self.model
                    .weights
                    .best_label(&fs, self.model.weights.labels()),
            )
        });
        sentence.iter().cloned().zip(labels).collect()
    }
}

/// Garante as exceções de colchete e numeral em qualquer dicionário.
fn seed_standard_overrides(tagdict: &mut TagDict) {
    tagdict.insert_if_absent(KEY_LRB, "(");
    tagdict.insert_if_absent(KEY_RRB, ")");
    tagdict.insert_if_absent(KEY_RCB, "}");
    tagdict.insert_if_absent(KEY_NUM, "CD");
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::MODEL_VERSION;
    use crate::token::sentence;

    fn tags(tagged: &[(Token, Label)]) -> Vec<&str> {
        tagged.iter().map(|(_, t)| t.as_str()).collect()
    }

    #[test]
    fn test_documented_sentence() {
        let tagger = PosTagger::builtin();
        let tagged = tagger.tag(&sentence(&["The", "first", "sentence", "."]));
        assert_eq!(tags(&tagged), ["DT", "JJ", "NN", "."]);
    }

    #[test]
    fn test_same_input_same_output() {
        let tagger = PosTagger::builtin();
        let s = sentence(&["The", "first", "sentence", "."]);
        assert_eq!(tagger.tag(&s), tagger.tag(&s));
    }

    #[test]
    fn test_batch_matches_single() {
        let tagger = PosTagger::builtin();
        let doc = vec![
            sentence(&["The", "first", "sentence", "."]),
            sentence(&[]),
            sentence(&["This", "has", "an", "empty", "", "token", "."]),
        ];
        let batch = tagger.tag_many(&doc);
        assert_eq!(batch.len(), doc.len());
        for (got, s) in batch.iter().zip(&doc) {
            assert_eq!(*got, tagger.tag(s));
        }
    }

    #[test]
    fn test_empty_sentence() {
        let tagger = PosTagger::builtin();
        assert!(tagger.tag(&[]).is_empty());
    }

    #[test]
    fn test_interior_empty_token() {
        let tagger = PosTagger::builtin();
        let tagged = tagger.tag(&sentence(&["This", "has", "an", "empty", "", "token", "."]));
        assert_eq!(tags(&tagged), ["DT", "VBZ", "DT", "JJ", "NN", "NN", "."]);
    }

    #[test]
    fn test_brackets_are_deterministic() {
        let tagger = PosTagger::builtin();
        let tagged = tagger.tag(&sentence(&["(", "[", "{", ")", "]", "}"]));
        assert_eq!(tags(&tagged), ["(", "(", "(", ")", ")", "}"]);
    }

    #[test]
    fn test_numerals_are_deterministic() {
        let tagger = PosTagger::builtin();
        let words = ["-1", "1", "0", "0.5", ".5", "-0.5", "-.5", "1996"];
        let tagged = tagger.tag(&sentence(&words));
        assert_eq!(tags(&tagged), vec!["CD"; words.len()]);
    }

    #[test]
    fn test_dictionary_is_case_insensitive() {
        let tagger = PosTagger::builtin();
        let tagged = tagger.tag(&sentence(&["THE", "The", "the"]));
        assert_eq!(tags(&tagged), ["DT", "DT", "DT"]);
    }

    #[test]
    fn test_artifact_entry_preempts_seeding() {
        let mut model = TaggerModel::builtin();
        model.tagdict.insert(KEY_NUM, "NN");
        let tagger = PosTagger::new(model).unwrap();
        let tagged = tagger.tag(&sentence(&["1996"]));
        assert_eq!(tags(&tagged), ["NN"]);
    }

    #[test]
    fn test_invalid_artifact_rejected() {
        let mut model = TaggerModel::builtin();
        model.version = MODEL_VERSION + 1;
        assert!(PosTagger::new(model).is_err());
    }

    #[test]
    fn test_non_utf8_bytes_pass_through() {
        let tagger = PosTagger::builtin();
        let raw = Token::from(&[0xff_u8, 0xfe][..]);
        let tagged = tagger.tag(&[raw.clone()]);
        assert_eq!(tagged.len(), 1);
        assert_eq!(tagged[0].0, raw);
        assert!(tagged[0].0.as_str().is_err());
        assert_eq!(tagged[0].1, "NN");
    }

    #[test]
    fn test_unknown_capitalized_word() {
        let tagger = PosTagger::builtin();
        let tagged = tagger.tag(&sentence(&["Pierre", "Vinken"]));
        assert_eq!(tags(&tagged), ["NNP", "NNP"]);
    }
}
