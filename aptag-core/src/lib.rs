//! # aptag-core — Etiquetagem Gulosa de Sequências
//!
//! Motor de rotulagem de sequências baseado em features, com decodificação
//! gulosa esquerda→direita: um **etiquetador POS** (tags do Penn Treebank)
//! e um **chunker de sintagmas nominais** (rótulos IOB), os dois servidos
//! pelo mesmo laço de decisão em duas etapas — dicionário de exceções
//! primeiro, modelo linear depois.
//!
//! ## Arquitetura
//!
//! | módulo        | responsabilidade                                  |
//! |---------------|---------------------------------------------------|
//! | [`token`]     | tokens byte-exatos, normalização, sentinelas      |
//! | [`features`]  | templates de features do etiquetador e do chunker |
//! | [`weights`]   | rótulos, tabela de pesos, argmax determinístico   |
//! | [`greedy`]    | laço guloso, histórico, lote paralelo             |
//! | [`model`]     | artefatos, dicionário de tags, modelos embutidos  |
//! | [`tagger`]    | etiquetador POS                                   |
//! | [`chunker`]   | chunker NP e montagem de sintagmas                |
//! | [`rules`]     | regras de documento (recombinação de NPs)         |
//! | [`tokenizer`] | divisor de texto para demonstrações               |
//! | [`error`]     | taxonomia de erros                                |
//!
//! ## Exemplo
//!
//! ```
//! use aptag_core::token::sentence;
//! use aptag_core::{NpChunker, PosTagger};
//!
//! let tagger = PosTagger::builtin();
//! let chunker = NpChunker::builtin();
//!
//! let tagged = tagger.tag(&sentence(&["The", "first", "sentence", "."]));
//! let tags: Vec<&str> = tagged.iter().map(|(_, t)| t.as_str()).collect();
//! assert_eq!(tags, ["DT", "JJ", "NN", "."]);
//!
//! let spans = chunker.chunk_spans(&tagged);
//! assert_eq!(spans.len(), 1); // "The first sentence"
//! ```
//!
//! ## Garantias
//!
//! - Determinismo completo: mesma entrada, mesma saída, inclusive nos
//!   empates do argmax e no processamento em lote;
//! - lote é igual ao avulso, elemento a elemento, na configuração padrão
//!   (regras de documento desligadas);
//! - tokens são sequências de bytes: entrada fora de UTF-8 atravessa o
//!   motor intacta, e só a conversão explícita para texto pode falhar;
//! - entradas degeneradas (sentença vazia, token vazio) passam adiante em
//!   vez de virar erro.

pub mod chunker;
pub mod error;
pub mod features;
pub mod greedy;
pub mod model;
pub mod rules;
pub mod tagger;
pub mod token;
pub mod tokenizer;
pub mod weights;

pub use crate::chunker::{assemble_spans, NpChunker};
pub use crate::error::{Error, Result};
pub use crate::greedy::SequenceLabeler;
pub use crate::model::{
    ChunkerModel, TagDict, TaggerModel, CHUNK_LABELS, MODEL_VERSION, POS_TAGS,
};
pub use crate::rules::ChunkerRules;
pub use crate::tagger::PosTagger;
pub use crate::token::Token;
pub use crate::tokenizer::tokenize;
pub use crate::weights::{Label, WeightTable};
