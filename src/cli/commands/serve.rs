//! HTTP API server for the presentation UI and other clients.
//!
//! Provides JSON endpoints for command resolution, document ingestion,
//! content management, presentations and history.

use crate::auth::{bearer_token, IdentityVerifier, StaticTokenVerifier};
use crate::cli::commands::open_store;
use crate::cli::Output;
use crate::config::Settings;
use crate::embedding::OpenAIEmbedder;
use crate::error::PodiumError;
use crate::ingest::IngestPipeline;
use crate::resolver::{create_strategy, CommandResolver};
use crate::storage::LocalStorage;
use crate::store::{ContentItem, ContentStore, Presentation};
use axum::{
    extract::{Path, State},
    http::{header, HeaderMap, HeaderName, StatusCode},
    response::IntoResponse,
    routing::{get, post},
    Json, Router,
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tower_http::cors::{Any, CorsLayer};
use uuid::Uuid;

/// Shared application state.
struct AppState {
    store: Arc<dyn ContentStore>,
    resolver: CommandResolver,
    pipeline: IngestPipeline,
    verifier: Arc<dyn IdentityVerifier>,
}

/// Run the HTTP API server.
pub async fn run_serve(
    host: Option<String>,
    port: Option<u16>,
    settings: Settings,
) -> anyhow::Result<()> {
    let host = host.unwrap_or_else(|| settings.server.host.clone());
    let port = port.unwrap_or(settings.server.port);

    let store = open_store(&settings)?;
    let storage = Arc::new(LocalStorage::new(settings.storage_root())?);
    let embedder = Arc::new(OpenAIEmbedder::with_config(
        &settings.embedding.model,
        settings.embedding.dimensions as usize,
    ));

    let resolver = CommandResolver::new(store.clone(), create_strategy(&settings));
    let pipeline = IngestPipeline::new(
        store.clone(),
        storage,
        embedder,
        settings.ingestion.max_chunk_chars,
    );
    let verifier = Arc::new(StaticTokenVerifier::new(settings.auth.tokens.clone()));

    let state = Arc::new(AppState {
        store,
        resolver,
        pipeline,
        verifier,
    });

    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers([
            header::AUTHORIZATION,
            header::CONTENT_TYPE,
            HeaderName::from_static("x-client-info"),
            HeaderName::from_static("apikey"),
        ]);

    let app = Router::new()
        .route("/health", get(health))
        .route("/commands", post(resolve_command))
        .route("/documents/process", post(process_document))
        .route("/content", get(list_content).post(create_content))
        .route("/content/{id}", axum::routing::put(update_content).delete(delete_content))
        .route("/presentations", post(create_presentation))
        .route("/presentations/{id}/history", get(presentation_history))
        .route("/prompts", post(save_prompt))
        .layer(cors)
        .with_state(state);

    let addr = format!("{}:{}", host, port);
    let listener = tokio::net::TcpListener::bind(&addr).await?;

    Output::header("Podium API Server");
    println!();
    Output::success(&format!("Listening on http://{}", addr));
    println!();
    println!("Endpoints:");
    Output::kv("Health", "GET    /health");
    Output::kv("Resolve command", "POST   /commands");
    Output::kv("Process document", "POST   /documents/process");
    Output::kv("Content library", "GET    /content");
    Output::kv("Add content", "POST   /content");
    Output::kv("Update content", "PUT    /content/:id");
    Output::kv("Remove content", "DELETE /content/:id");
    Output::kv("New presentation", "POST   /presentations");
    Output::kv("History", "GET    /presentations/:id/history");
    Output::kv("Save prompt", "POST   /prompts");
    println!();
    Output::info("Press Ctrl+C to stop the server.");

    axum::serve(listener, app).await?;

    Ok(())
}

// === Request/Response Types ===

#[derive(Deserialize)]
struct CommandRequest {
    command: String,
    #[serde(default, rename = "presentationId")]
    presentation_id: Option<String>,
}

#[derive(Serialize)]
struct CommandResponse {
    success: bool,
    #[serde(rename = "aiResponse")]
    ai_response: String,
    suggestion: String,
    #[serde(rename = "selectedContent")]
    selected_content: Option<ContentItem>,
    #[serde(rename = "contentLibrary")]
    content_library: Vec<ContentItem>,
}

#[derive(Deserialize)]
struct ProcessRequest {
    #[serde(rename = "documentId")]
    document_id: String,
}

#[derive(Serialize)]
struct ProcessResponse {
    success: bool,
    message: String,
    #[serde(rename = "chunksProcessed")]
    chunks_processed: usize,
}

#[derive(Deserialize)]
struct CreateContentRequest {
    title: String,
    description: String,
    video_url: String,
    #[serde(default)]
    keywords: Vec<String>,
}

#[derive(Deserialize)]
struct CreatePresentationRequest {
    title: String,
    #[serde(default)]
    presenter_name: Option<String>,
    #[serde(default)]
    user_id: Option<String>,
}

#[derive(Deserialize)]
struct SavePromptRequest {
    prompt_text: String,
}

#[derive(Serialize)]
struct ErrorResponse {
    success: bool,
    error: String,
}

fn failure(error: impl ToString) -> axum::response::Response {
    (
        StatusCode::INTERNAL_SERVER_ERROR,
        Json(ErrorResponse {
            success: false,
            error: error.to_string(),
        }),
    )
        .into_response()
}

fn not_found(error: impl ToString) -> axum::response::Response {
    (
        StatusCode::NOT_FOUND,
        Json(ErrorResponse {
            success: false,
            error: error.to_string(),
        }),
    )
        .into_response()
}

// === Handlers ===

async fn health() -> impl IntoResponse {
    Json(serde_json::json!({ "status": "ok" }))
}

async fn resolve_command(
    State(state): State<Arc<AppState>>,
    Json(req): Json<CommandRequest>,
) -> impl IntoResponse {
    match state
        .resolver
        .handle(&req.command, req.presentation_id.as_deref())
        .await
    {
        Ok(outcome) => Json(CommandResponse {
            success: true,
            ai_response: outcome.ai_response,
            suggestion: outcome.suggestion,
            selected_content: outcome.selected_content,
            content_library: outcome.content_library,
        })
        .into_response(),
        Err(e) => failure(e),
    }
}

async fn process_document(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    Json(req): Json<ProcessRequest>,
) -> impl IntoResponse {
    let user_id = match verify_caller(&state, &headers).await {
        Ok(user_id) => user_id,
        Err(e) => return failure(e),
    };

    // A malformed id reads the same as a missing document
    let document_id = match Uuid::parse_str(&req.document_id) {
        Ok(id) => id,
        Err(_) => return failure(PodiumError::DocumentNotFound),
    };

    match state.pipeline.process(document_id, &user_id).await {
        Ok(report) => Json(ProcessResponse {
            success: true,
            message: "Document processed successfully".to_string(),
            chunks_processed: report.chunks_processed,
        })
        .into_response(),
        Err(e) => failure(e),
    }
}

async fn verify_caller(
    state: &AppState,
    headers: &HeaderMap,
) -> crate::error::Result<String> {
    let token = headers
        .get(header::AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .and_then(bearer_token)
        .ok_or(PodiumError::Unauthorized)?;

    state
        .verifier
        .verify(token)
        .await?
        .ok_or(PodiumError::Unauthorized)
}

async fn list_content(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    match state.store.list_content().await {
        Ok(items) => Json(items).into_response(),
        Err(e) => failure(e),
    }
}

async fn create_content(
    State(state): State<Arc<AppState>>,
    Json(req): Json<CreateContentRequest>,
) -> impl IntoResponse {
    let item = ContentItem::new(req.title, req.description, req.video_url, req.keywords);

    match state.store.insert_content(&item).await {
        Ok(()) => (StatusCode::CREATED, Json(item)).into_response(),
        Err(e) => failure(e),
    }
}

async fn update_content(
    State(state): State<Arc<AppState>>,
    Path(id): Path<Uuid>,
    Json(req): Json<CreateContentRequest>,
) -> impl IntoResponse {
    let existing = match state.store.get_content(id).await {
        Ok(Some(item)) => item,
        Ok(None) => return not_found(format!("Content not found: {}", id)),
        Err(e) => return failure(e),
    };

    let updated = ContentItem {
        title: req.title,
        description: req.description,
        video_url: req.video_url,
        keywords: req.keywords,
        updated_at: chrono::Utc::now(),
        ..existing
    };

    match state.store.update_content(&updated).await {
        Ok(true) => Json(updated).into_response(),
        Ok(false) => not_found(format!("Content not found: {}", id)),
        Err(e) => failure(e),
    }
}

async fn delete_content(
    State(state): State<Arc<AppState>>,
    Path(id): Path<Uuid>,
) -> impl IntoResponse {
    match state.store.delete_content(id).await {
        Ok(true) => Json(serde_json::json!({ "success": true })).into_response(),
        Ok(false) => not_found(format!("Content not found: {}", id)),
        Err(e) => failure(e),
    }
}

async fn create_presentation(
    State(state): State<Arc<AppState>>,
    Json(req): Json<CreatePresentationRequest>,
) -> impl IntoResponse {
    let presentation = Presentation::new(req.title, req.presenter_name, req.user_id);

    match state.store.insert_presentation(&presentation).await {
        Ok(()) => (StatusCode::CREATED, Json(presentation)).into_response(),
        Err(e) => failure(e),
    }
}

async fn presentation_history(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> impl IntoResponse {
    match state.store.history_for(&id).await {
        Ok(records) => Json(records).into_response(),
        Err(e) => failure(e),
    }
}

async fn save_prompt(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    Json(req): Json<SavePromptRequest>,
) -> impl IntoResponse {
    let user_id = match verify_caller(&state, &headers).await {
        Ok(user_id) => user_id,
        Err(e) => return failure(e),
    };

    match state.store.save_prompt(&user_id, &req.prompt_text).await {
        Ok(prompt) => (StatusCode::CREATED, Json(prompt)).into_response(),
        Err(e) => failure(e),
    }
}
