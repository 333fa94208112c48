//! services/api/src/web/mod.rs
//!
//! Assembles the axum router for the REST API and the Swagger UI.

pub mod rest;
pub mod state;

use crate::config::ConfigError;
use crate::web::rest::ApiDoc;
use crate::web::state::AppState;
use axum::http::{
    header::{ACCEPT, CONTENT_TYPE},
    HeaderValue, Method,
};
use axum::{routing::get, Router};
use std::sync::Arc;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

pub use rest::{get_conversation_handler, health_handler, list_conversations_handler, stats_handler};

/// Builds the complete application router: REST endpoints, request tracing and
/// the Swagger UI at `/docs`.
pub fn router(state: Arc<AppState>) -> Router {
    let api_router = Router::new()
        .route("/conversations", get(list_conversations_handler))
        .route("/conversations/{id}", get(get_conversation_handler))
        .route("/stats", get(stats_handler))
        .route("/health", get(health_handler))
        .with_state(state);

    Router::new()
        .merge(api_router)
        .merge(SwaggerUi::new("/docs").url("/api-docs/openapi.json", ApiDoc::openapi()))
        .layer(TraceLayer::new_for_http())
}

/// The API is read-only, so only GET is allowed cross-origin.
pub fn cors_layer(allow_origin: Option<&str>) -> Result<CorsLayer, ConfigError> {
    let cors = CorsLayer::new()
        .allow_methods([Method::GET, Method::OPTIONS])
        .allow_headers([ACCEPT, CONTENT_TYPE]);

    match allow_origin {
        Some(origin) => {
            let origin = origin.parse::<HeaderValue>().map_err(|e| {
                ConfigError::InvalidValue("CORS_ALLOW_ORIGIN".to_string(), e.to_string())
            })?;
            Ok(cors.allow_origin(origin))
        }
        None => Ok(cors.allow_origin(Any)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cors_accepts_a_single_origin() {
        assert!(cors_layer(Some("http://localhost:5173")).is_ok());
        assert!(cors_layer(None).is_ok());
    }

    #[test]
    fn cors_rejects_malformed_origin() {
        assert!(matches!(
            cors_layer(Some("bad\norigin")),
            Err(ConfigError::InvalidValue(..))
        ));
    }
}
