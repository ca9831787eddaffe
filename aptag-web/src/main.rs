//! Servidor web Axum de demonstração do etiquetador POS e do chunker NP

use axum::{
    extract::State,
    http::StatusCode,
    response::{Html, IntoResponse, Json},
    routing::{get, post},
    Router,
};
use aptag_core::{assemble_spans, tokenize, NpChunker, PosTagger, Token};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use std::time::Instant;
use tower_http::cors::{Any, CorsLayer};
use tracing::info;

/// Estado compartilhado da aplicação. Os dois motores são imutáveis e
/// `Send + Sync`, então um `Arc` basta.
struct AppState {
    tagger: PosTagger,
    chunker: NpChunker,
}

/// Textos de demonstração (domínio, texto)
const DEMO_TEXTS: [(&str, &str); 4] = [
    (
        "clássico",
        "Pierre Vinken , 61 years old , will join the board as a nonexecutive director .",
    ),
    ("negócios", "The company will join the market ."),
    ("numerais", "The market was worth 0.5 in 1996 ."),
    ("colchetes", "The board ( the group ) will join ."),
];

#[derive(Deserialize)]
struct AnalyzeRequest {
    text: String,
}

#[derive(Serialize)]
struct TaggedTokenDto {
    word: String,
    tag: String,
}

#[derive(Serialize)]
struct TagResponse {
    tokens: Vec<TaggedTokenDto>,
    total_tokens: usize,
    processing_ms: u64,
}

#[derive(Serialize)]
struct ChunkedTokenDto {
    word: String,
    tag: String,
    chunk: String,
}

#[derive(Serialize)]
struct ChunkResponse {
    tokens: Vec<ChunkedTokenDto>,
    phrases: Vec<String>,
    total_tokens: usize,
    processing_ms: u64,
}

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt()
        .with_env_filter("info")
        .init();

    let state = Arc::new(AppState {
        tagger: PosTagger::builtin(),
        chunker: NpChunker::builtin(),
    });

    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    let app = Router::new()
        .route("/", get(index_handler))
        .route("/tag", post(tag_handler))
        .route("/chunk", post(chunk_handler))
        .route("/demo-texts", get(demo_texts_handler))
        .layer(cors)
        .with_state(state);

    let listener = tokio::net::TcpListener::bind("0.0.0.0:3000").await.unwrap();
    info!("🚀 Servidor de etiquetagem iniciado em http://localhost:3000");
    axum::serve(listener, app).await.unwrap();
}

/// Retorna a página principal HTML
async fn index_handler() -> impl IntoResponse {
    Html(include_str!("templates/index.html"))
}

/// Etiquetagem POS via HTTP POST
async fn tag_handler(
    State(state): State<Arc<AppState>>,
    Json(req): Json<AnalyzeRequest>,
) -> impl IntoResponse {
    if req.text.trim().is_empty() {
        return (
            StatusCode::BAD_REQUEST,
            Json(serde_json::json!({"error": "Texto vazio"})),
        )
            .into_response();
    }

    let started = Instant::now();
    let tagged = state.tagger.tag(&tokenize(&req.text));
    let tokens: Vec<TaggedTokenDto> = tagged
        .iter()
        .map(|(word, tag)| TaggedTokenDto {
            word: word_to_string(word),
            tag: tag.to_string(),
        })
        .collect();

    Json(TagResponse {
        total_tokens: tokens.len(),
        processing_ms: started.elapsed().as_millis() as u64,
        tokens,
    })
    .into_response()
}

/// Etiquetagem POS + chunking NP via HTTP POST
async fn chunk_handler(
    State(state): State<Arc<AppState>>,
    Json(req): Json<AnalyzeRequest>,
) -> impl IntoResponse {
    if req.text.trim().is_empty() {
        return (
            StatusCode::BAD_REQUEST,
            Json(serde_json::json!({"error": "Texto vazio"})),
        )
            .into_response();
    }

    let started = Instant::now();
    let tagged = state.tagger.tag(&tokenize(&req.text));
    let labeled = state.chunker.chunk_label(&tagged);

    let tokens: Vec<ChunkedTokenDto> = labeled
        .iter()
        .map(|(word, tag, chunk)| ChunkedTokenDto {
            word: word_to_string(word),
            tag: tag.to_string(),
            chunk: chunk.to_string(),
        })
        .collect();
    let phrases: Vec<String> = assemble_spans(&labeled)
        .iter()
        .map(|span| {
            span.iter()
                .map(|(word, _)| word_to_string(word))
                .collect::<Vec<_>>()
                .join(" ")
        })
        .collect();

    Json(ChunkResponse {
        total_tokens: tokens.len(),
        processing_ms: started.elapsed().as_millis() as u64,
        tokens,
        phrases,
    })
    .into_response()
}

/// Retorna textos de demonstração
async fn demo_texts_handler() -> impl IntoResponse {
    let texts: Vec<serde_json::Value> = DEMO_TEXTS
        .iter()
        .map(|(domain, text)| {
            serde_json::json!({
                "domain": domain,
                "text": text
            })
        })
        .collect();
    Json(texts)
}

/// Conversão token → texto na borda JSON. Os tokens aqui nascem de
/// `String`, então a falha de codificação é teórica; ainda assim o
/// caminho degrada para a forma lossy em vez de derrubar o handler.
fn word_to_string(token: &Token) -> String {
    match token.as_str() {
        Ok(s) => s.to_string(),
        Err(_) => token.to_string(),
    }
}
