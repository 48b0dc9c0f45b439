use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Instant;

use axum::{
    Json, Router,
    extract::{DefaultBodyLimit, Multipart, State},
    http::{StatusCode, header},
    middleware::{self, Next},
    response::{IntoResponse, Response},
    routing::{get, post},
};
use serde::Serialize;
use tower_http::{
    cors::{Any, CorsLayer},
    trace::{DefaultMakeSpan, DefaultOnFailure, DefaultOnRequest, DefaultOnResponse, TraceLayer},
};
use tracing::Level;

use crate::{config, fonts, page, polaroid, store};

#[derive(Clone)]
pub struct AppState {
    pub cfg: Arc<config::Config>,
    pub store: Arc<store::CloudinaryStore>,
    pub font: Arc<fonts::CaptionFont>,
}

#[derive(Serialize)]
pub struct UploadOk {
    pub success: bool,
}

#[derive(Serialize)]
pub struct ErrorBody {
    pub error: String,
}

type ErrorResponse = (StatusCode, Json<ErrorBody>);

fn missing_file() -> ErrorResponse {
    (
        StatusCode::BAD_REQUEST,
        Json(ErrorBody {
            error: "Erro".to_string(),
        }),
    )
}

fn server_error(message: impl ToString) -> ErrorResponse {
    (
        StatusCode::INTERNAL_SERVER_ERROR,
        Json(ErrorBody {
            error: message.to_string(),
        }),
    )
}

// Logs all 4xx/5xx responses with method, URI, status and latency.
async fn log_error_responses(req: axum::extract::Request, next: Next) -> Response {
    let method = req.method().clone();
    let uri = req.uri().clone();
    let start = Instant::now();
    let res = next.run(req).await;
    let status = res.status();
    if status.is_server_error() {
        tracing::error!(%method, %uri, %status, elapsed_ms = start.elapsed().as_millis(), "http 5xx");
    } else if status.is_client_error() {
        tracing::warn!(%method, %uri, %status, elapsed_ms = start.elapsed().as_millis(), "http 4xx");
    }
    res
}

/// Gallery page. Listing failure deliberately degrades to an empty gallery
/// so the page always renders.
pub async fn index(State(state): State<AppState>) -> Response {
    let photos = match state.store.list_recent().await {
        Ok(photos) => photos,
        Err(e) => {
            tracing::warn!(error = %e, "gallery listing failed, rendering empty gallery");
            Vec::new()
        }
    };
    let html = page::render_gallery(&state.cfg.captions, &photos);
    (
        [(header::CONTENT_TYPE, "text/html; charset=utf-8")],
        html,
    )
        .into_response()
}

/// Accept a multipart `photo` field, compose the polaroid and push it to
/// the remote store under a timestamp-derived name.
pub async fn upload_photo(
    State(state): State<AppState>,
    mut multipart: Multipart,
) -> Result<Json<UploadOk>, ErrorResponse> {
    let mut data: Option<Vec<u8>> = None;
    while let Some(field) = multipart.next_field().await.map_err(|_| missing_file())? {
        let name = field.name().map(|s| s.to_string());
        if name.as_deref() == Some("photo") {
            data = Some(
                field
                    .bytes()
                    .await
                    .map_err(|_| missing_file())?
                    .to_vec(),
            );
            break;
        }
    }
    let data = data.ok_or_else(missing_file)?;

    let now = chrono::Local::now();
    let lines = polaroid::caption_lines(&state.cfg.captions, now.date_naive());
    let jpeg = polaroid::create_polaroid(&data, state.font.font(), &lines).map_err(|e| {
        tracing::error!(error = %e, "polaroid composition failed");
        server_error(&e)
    })?;

    let public_id = format!("bodas_{}", now.format("%Y%m%d_%H%M%S"));
    state.store.upload(&public_id, jpeg).await.map_err(|e| {
        tracing::error!(public_id = %public_id, error = %e, "cloudinary upload failed");
        server_error(&e)
    })?;
    Ok(Json(UploadOk { success: true }))
}

pub fn router(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    let trace = TraceLayer::new_for_http()
        .make_span_with(DefaultMakeSpan::new().level(Level::INFO))
        .on_request(DefaultOnRequest::new().level(Level::INFO))
        .on_response(DefaultOnResponse::new().level(Level::INFO))
        .on_failure(DefaultOnFailure::new().level(Level::ERROR));

    Router::new()
        .route("/", get(index))
        .route(
            "/upload",
            post(upload_photo).layer(DefaultBodyLimit::disable()),
        )
        .with_state(state)
        .layer(cors)
        .layer(trace)
        .layer(middleware::from_fn(log_error_responses))
}

pub async fn serve(app: Router, bind: &str) -> anyhow::Result<()> {
    let addr: SocketAddr = bind.parse()?;
    tracing::info!(addr = %addr, "starting http server");
    axum::serve(tokio::net::TcpListener::bind(addr).await?, app).await?;
    Ok(())
}
