//! HTTP routes for the cb2m server.

use std::sync::Arc;

use axum::{
    Router,
    extract::State,
    http::{Method, Uri, header},
    response::{IntoResponse, Json, Response},
    routing::get,
};
use cb2m_core::classify::Rejection;
use cb2m_core::{ArchiveBuilder, ArchiveOutcome, BuildContext, DescriptorTemplate, classify_revision};
use tower_http::trace::TraceLayer;

use crate::artifact::{ArtifactKind, ArtifactRoute};
use crate::error::{ServerError, ServerResult};
use crate::store::SnippetStore;

/// Content type of rendered descriptors.
pub const DESCRIPTOR_CONTENT_TYPE: &str = "application/xml";

/// Content type of built archives.
pub const ARCHIVE_CONTENT_TYPE: &str = "application/java-archive";

/// Application state shared across handlers.
pub struct AppState {
    /// Snippet lookup.
    pub store: Arc<dyn SnippetStore>,
    /// Descriptor template, rendered per request.
    pub template: DescriptorTemplate,
    /// Archive pipeline; owns the temp root and the toolchain.
    pub builder: ArchiveBuilder,
    /// Base URL used for `${revisionUrl}`.
    pub site_url: String,
}

/// Create the router with all routes.
///
/// Artifact paths are matched by the fallback handler since their grammar
/// is not expressible as an axum path pattern.
pub fn create_router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/health", get(health_handler))
        .fallback(artifact_handler)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// Health check handler.
async fn health_handler() -> Json<serde_json::Value> {
    Json(serde_json::json!({
        "status": "ok",
        "version": env!("CARGO_PKG_VERSION")
    }))
}

/// Serve a descriptor or an archive for an artifact path.
async fn artifact_handler(
    State(state): State<Arc<AppState>>,
    method: Method,
    uri: Uri,
) -> ServerResult<Response> {
    tracing::info!("Handling {} request for {}", method, uri.path());

    if method != Method::GET && method != Method::HEAD {
        return Err(ServerError::BadRequest(
            "Only GET and HEAD methods supported".to_string(),
        ));
    }

    let route = ArtifactRoute::parse(uri.path())
        .ok_or_else(|| ServerError::NotFound(format!("No such artifact: {}", uri.path())))?;

    state.store.ready().await;

    let not_found = || ServerError::NotFound(format!("No such snippet/revision: {}", route.coordinates()));
    let snippet = state
        .store
        .lookup_snippet(&route.snippet_id)
        .await
        .filter(|s| s.username == route.username)
        .ok_or_else(not_found)?;
    let revision = state
        .store
        .lookup_revision(&snippet, route.revision_id)
        .await
        .ok_or_else(not_found)?;

    match &route.kind {
        ArtifactKind::Descriptor => {
            let ctx = BuildContext::new(&snippet, &revision, &state.site_url);
            let body = state.template.render(&ctx);
            Ok(([(header::CONTENT_TYPE, DESCRIPTOR_CONTENT_TYPE)], body).into_response())
        }
        ArtifactKind::Archive => {
            let shape = classify_revision(&revision.language, &revision.code, &snippet.username)
                .map_err(|rejection| match rejection {
                    Rejection::UnsupportedLanguage { .. } => {
                        ServerError::BadRequest("Snippet must be written in Java".to_string())
                    }
                    other => ServerError::RejectedSource(other),
                })?;

            match state.builder.build(&snippet, &revision, &shape).await? {
                ArchiveOutcome::Built(bytes) => {
                    Ok(([(header::CONTENT_TYPE, ARCHIVE_CONTENT_TYPE)], bytes).into_response())
                }
                ArchiveOutcome::CompileFailed(result) => Err(ServerError::CompileFailed(result)),
            }
        }
        ArtifactKind::Other(ext) => Err(ServerError::NotFound(format!(
            "No artifact of type '{}' for {}",
            ext,
            route.coordinates()
        ))),
    }
}
