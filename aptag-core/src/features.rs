//! # Extração de Features
//!
//! Cada posição da sentença vira um conjunto de chaves de feature que o
//! modelo linear pontua. As chaves são **bytes** no formato `nome=valor`
//! (valores múltiplos separados por espaço), ex: `suf3=ing`,
//! `t-1t-2=DT -START2-`. Flags binárias são só o nome, ex: `bias`.
//!
//! ## Conjuntos de templates
//!
//! ### Etiquetador POS ([`pos_features`])
//! - `bias` (sempre ativa), `w0` (forma normalizada atual)
//! - `pre1`/`suf3` (primeiro byte / últimos 3 bytes da palavra crua)
//! - `has_digit`, `has_upper`, `has_hyphen` (flags ortográficas)
//! - contexto normalizado `w-2 w-1 w1 w2` + sufixos dos vizinhos
//!   `suf3w-1`/`suf3w1`
//! - histórico de rótulos `t-1`, `t-2`, bigrama `t-1t-2` e a conjunção
//!   `t-1w0` (rótulo anterior × forma atual)
//!
//! ### Chunker NP ([`chunk_features`])
//! Unigrama/bigrama de palavras normalizadas, uni/bi/trigramas das tags POS
//! (`t-2t-1t0` etc.), primeira letra crua (`p`) e `bias`. Sem histórico IOB.
//!
//! Todos os templates são avaliados em toda chamada; o retorno tem semântica
//! de **conjunto** (chaves duplicadas colapsam). Tokens vazios são legítimos:
//! produzem valores vazios, nunca pânico.

use std::collections::HashSet;

use serde::{Deserialize, Serialize};

use crate::token::{self, Token, END, END2, START, START2};

/// Conjunto de chaves de feature ativas em uma posição.
///
/// O espaço de chaves é aberto (`w0=abacaxi`, `suf3=axi`, ...), mas cada
/// posição ativa só um punhado. Um `HashSet` de bytes dá a semântica de
/// conjunto exigida: inserir a mesma chave duas vezes não muda a pontuação.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FeatureSet {
    keys: HashSet<Vec<u8>>,
}

impl FeatureSet {
    pub fn new() -> Self {
        Self {
            keys: HashSet::new(),
        }
    }

    /// Insere uma chave já montada.
    pub fn insert(&mut self, key: Vec<u8>) {
        self.keys.insert(key);
    }

    /// Insere uma flag binária (a chave é só o nome).
    pub fn flag(&mut self, name: &str) {
        self.keys.insert(flag_key(name));
    }

    /// Insere `nome=valor`.
    pub fn kv(&mut self, name: &str, value: &[u8]) {
        self.keys.insert(feature_key(name, value));
    }

    /// Insere `nome=a b` (dois valores separados por espaço).
    pub fn kv2(&mut self, name: &str, a: &[u8], b: &[u8]) {
        let mut value = Vec::with_capacity(a.len() + 1 + b.len());
        value.extend_from_slice(a);
        value.push(b' ');
        value.extend_from_slice(b);
        self.keys.insert(feature_key(name, &value));
    }

    /// Insere `nome=a b c`.
    pub fn kv3(&mut self, name: &str, a: &[u8], b: &[u8], c: &[u8]) {
        let mut value = Vec::with_capacity(a.len() + b.len() + c.len() + 2);
        value.extend_from_slice(a);
        value.push(b' ');
        value.extend_from_slice(b);
        value.push(b' ');
        value.extend_from_slice(c);
        self.keys.insert(feature_key(name, &value));
    }

    pub fn contains(&self, key: &[u8]) -> bool {
        self.keys.contains(key)
    }

    pub fn len(&self) -> usize {
        self.keys.len()
    }

    pub fn is_empty(&self) -> bool {
        self.keys.is_empty()
    }

    /// Itera sobre as chaves ativas (ordem não especificada).
    pub fn iter(&self) -> std::collections::hash_set::Iter<'_, Vec<u8>> {
        self.keys.iter()
    }
}

/// Monta a chave `nome=valor`. Usada também pelo construtor do modelo
/// embutido, para que pesos e extração concordem byte a byte.
pub fn feature_key(name: &str, value: &[u8]) -> Vec<u8> {
    let mut key = Vec::with_capacity(name.len() + 1 + value.len());
    key.extend_from_slice(name.as_bytes());
    key.push(b'=');
    key.extend_from_slice(value);
    key
}

/// Monta a chave de uma flag binária (só o nome).
pub fn flag_key(name: &str) -> Vec<u8> {
    name.as_bytes().to_vec()
}

/// Contexto de palavras normalizado e acolchoado com sentinelas.
///
/// Layout: `[-START-, -START2-, w0.., -END-, -END2-]` — o vizinho imediato
/// à esquerda do primeiro token é `-START2-` e o imediato à direita do
/// último é `-END-`. A posição `i` da sentença corresponde ao índice `i + 2`.
pub fn padded_context<'a>(words: impl Iterator<Item = &'a Token>) -> Vec<Vec<u8>> {
    let mut context = vec![START.as_bytes().to_vec(), START2.as_bytes().to_vec()];
    for word in words {
        context.push(token::normalize(word));
    }
    context.push(END.as_bytes().to_vec());
    context.push(END2.as_bytes().to_vec());
    context
}

/// Contexto de rótulos (tags POS) acolchoado com as mesmas sentinelas.
pub fn padded_labels<'a>(labels: impl Iterator<Item = &'a str>) -> Vec<Vec<u8>> {
    let mut context = vec![START.as_bytes().to_vec(), START2.as_bytes().to_vec()];
    for label in labels {
        context.push(label.as_bytes().to_vec());
    }
    context.push(END.as_bytes().to_vec());
    context.push(END2.as_bytes().to_vec());
    context
}

/// Últimos `n` bytes (ou a fatia inteira, se menor).
fn last_n(bytes: &[u8], n: usize) -> &[u8] {
    if bytes.len() > n {
        &bytes[bytes.len() - n..]
    } else {
        bytes
    }
}

/// Primeiro byte como fatia (vazia para o token vazio).
fn first_1(bytes: &[u8]) -> &[u8] {
    &bytes[..1.min(bytes.len())]
}

/// Features do etiquetador POS para a posição `i`.
///
/// - `word` é o token **cru** (sufixo/prefixo/flags olham os bytes originais);
/// - `context` vem de [`padded_context`] (formas normalizadas);
/// - `prev`/`prev2` são os rótulos já emitidos (sentinelas no início).
pub fn pos_features(
    i: usize,
    word: &Token,
    context: &[Vec<u8>],
    prev: &str,
    prev2: &str,
) -> FeatureSet {
    let c = i + 2;
    let raw = word.as_bytes();
    let mut fs = FeatureSet::new();

    fs.flag("bias");

    // Palavra atual: forma crua e normalizada.
    fs.kv("suf3", last_n(raw, 3));
    fs.kv("pre1", first_1(raw));
    fs.kv("w0", &context[c]);

    if raw.iter().any(u8::is_ascii_digit) {
        fs.flag("has_digit");
    }
    if raw.iter().any(u8::is_ascii_uppercase) {
        fs.flag("has_upper");
    }
    if raw.contains(&b'-') {
        fs.flag("has_hyphen");
    }

    // Histórico de rótulos e conjunção com a forma atual.
    fs.kv("t-1", prev.as_bytes());
    fs.kv("t-2", prev2.as_bytes());
    fs.kv2("t-1t-2", prev.as_bytes(), prev2.as_bytes());
    fs.kv2("t-1w0", prev.as_bytes(), &context[c]);

    // Janela de contexto ±2 com sufixos dos vizinhos imediatos.
    fs.kv("w-1", &context[c - 1]);
    fs.kv("suf3w-1", last_n(&context[c - 1], 3));
    fs.kv("w-2", &context[c - 2]);
    fs.kv("w1", &context[c + 1]);
    fs.kv("suf3w1", last_n(&context[c + 1], 3));
    fs.kv("w2", &context[c + 2]);

    fs
}

/// Features do chunker NP para a posição `i`.
///
/// - `word` é o token cru (só a primeira letra entra crua, template `p`);
/// - `context` palavras normalizadas acolchoadas;
/// - `tag_context` tags POS acolchoadas ([`padded_labels`]).
pub fn chunk_features(
    i: usize,
    word: &Token,
    context: &[Vec<u8>],
    tag_context: &[Vec<u8>],
) -> FeatureSet {
    let c = i + 2;
    let mut fs = FeatureSet::new();

    fs.flag("bias");

    // Unigramas de palavras.
    fs.kv("w-2", &context[c - 2]);
    fs.kv("w-1", &context[c - 1]);
    fs.kv("w0", &context[c]);
    fs.kv("w1", &context[c + 1]);
    fs.kv("w2", &context[c + 2]);

    // Bigramas de palavras.
    fs.kv2("w-1w0", &context[c - 1], &context[c]);
    fs.kv2("w0w1", &context[c], &context[c + 1]);

    // Unigramas de tags.
    fs.kv("t-2", &tag_context[c - 2]);
    fs.kv("t-1", &tag_context[c - 1]);
    fs.kv("t0", &tag_context[c]);
    fs.kv("t1", &tag_context[c + 1]);
    fs.kv("t2", &tag_context[c + 2]);

    // Bigramas de tags.
    fs.kv2("t-2t-1", &tag_context[c - 2], &tag_context[c - 1]);
    fs.kv2("t-1t0", &tag_context[c - 1], &tag_context[c]);
    fs.kv2("t0t1", &tag_context[c], &tag_context[c + 1]);
    fs.kv2("t1t2", &tag_context[c + 1], &tag_context[c + 2]);

    // Trigramas de tags.
    fs.kv3(
        "t-2t-1t0",
        &tag_context[c - 2],
        &tag_context[c - 1],
        &tag_context[c],
    );
    fs.kv3(
        "t-1t0t1",
        &tag_context[c - 1],
        &tag_context[c],
        &tag_context[c + 1],
    );
    fs.kv3(
        "t0t1t2",
        &tag_context[c],
        &tag_context[c + 1],
        &tag_context[c + 2],
    );

    // Primeira letra crua da palavra.
    fs.kv("p", first_1(word.as_bytes()));

    fs
}
