//! services/api/src/web/rest.rs
//!
//! Contains the Axum handlers for the REST API endpoints and the master
//! definition for the OpenAPI specification.

use crate::error::{ApiError, ErrorBody, ErrorDetail};
use crate::web::state::AppState;
use assistant_analytics_core::domain::{
    ContextChunk, Conversation, ConversationFilter, ConversationPreview, StatsSummary,
};
use axum::{
    extract::{Path, Query, State},
    response::{IntoResponse, Json, Response},
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use utoipa::{IntoParams, OpenApi, ToSchema};

//=========================================================================================
// OpenAPI Master Definition
//=========================================================================================

#[derive(OpenApi)]
#[openapi(
    info(title = "Assistant Analytics API"),
    paths(
        list_conversations_handler,
        get_conversation_handler,
        stats_handler,
        health_handler,
    ),
    components(
        schemas(
            ContextChunkResponse,
            ConversationPreviewResponse,
            ConversationResponse,
            StatsResponse,
            HealthResponse,
            ErrorBody,
            ErrorDetail,
        )
    ),
    tags(
        (name = "Conversations", description = "Read-only access to assistant conversations and satisfaction stats.")
    )
)]
pub struct ApiDoc;

//=========================================================================================
// API Response and Query Structs
//=========================================================================================

/// Query string accepted by `GET /conversations`.
///
/// Only the exact strings `true` and `false` are recognised; anything else is
/// treated as if the parameter were absent.
#[derive(Debug, Default, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct ListConversationsQuery {
    /// Keep only conversations where the model found an answer (`true`) or did not (`false`).
    pub success: Option<String>,
    /// Return full records instead of previews when `true`.
    pub full: Option<String>,
}

impl ListConversationsQuery {
    pub fn filter(&self) -> ConversationFilter {
        match parse_flag(self.success.as_deref()) {
            Some(success) => ConversationFilter::by_success(success),
            None => ConversationFilter::all(),
        }
    }

    pub fn wants_full(&self) -> bool {
        parse_flag(self.full.as_deref()) == Some(true)
    }
}

fn parse_flag(raw: Option<&str>) -> Option<bool> {
    match raw {
        Some("true") => Some(true),
        Some("false") => Some(false),
        _ => None,
    }
}

#[derive(Debug, Serialize, ToSchema)]
pub struct ContextChunkResponse {
    pub id: String,
    pub text: String,
}

impl From<ContextChunk> for ContextChunkResponse {
    fn from(chunk: ContextChunk) -> Self {
        Self {
            id: chunk.id,
            text: chunk.text,
        }
    }
}

/// A conversation without its context chunks and model response.
#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ConversationPreviewResponse {
    pub id: String,
    pub username: String,
    pub question: String,
    /// Whether the model found an answer in the documentation context.
    pub success: bool,
    /// Whether the answer satisfied the user; `null` when no feedback was given.
    pub feedback: Option<bool>,
}

impl From<ConversationPreview> for ConversationPreviewResponse {
    fn from(preview: ConversationPreview) -> Self {
        Self {
            id: preview.id,
            username: preview.username,
            question: preview.question,
            success: preview.success,
            feedback: preview.feedback,
        }
    }
}

/// A complete conversation record.
#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ConversationResponse {
    #[serde(flatten)]
    pub preview: ConversationPreviewResponse,
    pub context_chunks: Vec<ContextChunkResponse>,
    pub llm_response: String,
    pub avg_context_score: f64,
}

impl From<Conversation> for ConversationResponse {
    fn from(conversation: Conversation) -> Self {
        Self {
            preview: conversation.preview.into(),
            context_chunks: conversation
                .context_chunks
                .into_iter()
                .map(Into::into)
                .collect(),
            llm_response: conversation.llm_response,
            avg_context_score: conversation.avg_context_score,
        }
    }
}

/// User satisfaction statistics over all conversations.
#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct StatsResponse {
    pub total: u64,
    pub success_total: u64,
    pub failed_total: u64,
    /// Share of conversations the user marked as satisfying, rounded; 0 when there are none.
    pub success_percent: u32,
    /// Share of conversations the user marked as unsatisfying, rounded; 0 when there are none.
    pub failed_percent: u32,
}

impl From<StatsSummary> for StatsResponse {
    fn from(stats: StatsSummary) -> Self {
        Self {
            total: stats.total,
            success_total: stats.success_total,
            failed_total: stats.failed_total,
            success_percent: stats.success_percent,
            failed_percent: stats.failed_percent,
        }
    }
}

#[derive(Debug, Serialize, ToSchema)]
pub struct HealthResponse {
    pub status: String,
}

//=========================================================================================
// REST API Handlers
//=========================================================================================

/// List conversations, optionally filtered by the model's success flag.
///
/// Returns previews by default, or full records when `full=true`.
#[utoipa::path(
    get,
    path = "/conversations",
    tag = "Conversations",
    params(ListConversationsQuery),
    responses(
        (status = 200, description = "Conversation previews (full records when full=true)", body = [ConversationPreviewResponse]),
        (status = 500, description = "Internal server error", body = ErrorBody)
    )
)]
pub async fn list_conversations_handler(
    State(app_state): State<Arc<AppState>>,
    Query(query): Query<ListConversationsQuery>,
) -> Result<Response, ApiError> {
    let filter = query.filter();

    if query.wants_full() {
        let conversations = app_state.conversations.list_conversations(filter).await?;
        let body: Vec<ConversationResponse> = conversations.into_iter().map(Into::into).collect();
        return Ok(Json(body).into_response());
    }

    let previews = app_state.conversations.list_previews(filter).await?;
    let body: Vec<ConversationPreviewResponse> = previews.into_iter().map(Into::into).collect();
    Ok(Json(body).into_response())
}

/// Fetch one conversation with its context chunks and model response.
#[utoipa::path(
    get,
    path = "/conversations/{id}",
    tag = "Conversations",
    params(
        ("id" = String, Path, description = "The conversation's unique identifier.")
    ),
    responses(
        (status = 200, description = "The conversation", body = ConversationResponse),
        (status = 404, description = "No conversation with this id", body = ErrorBody),
        (status = 500, description = "Internal server error", body = ErrorBody)
    )
)]
pub async fn get_conversation_handler(
    State(app_state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> Result<Json<ConversationResponse>, ApiError> {
    let conversation = app_state.conversations.get_conversation(&id).await?;
    Ok(Json(conversation.into()))
}

/// Satisfaction statistics grouped by user feedback.
#[utoipa::path(
    get,
    path = "/stats",
    tag = "Conversations",
    responses(
        (status = 200, description = "Feedback statistics", body = StatsResponse),
        (status = 500, description = "Internal server error", body = ErrorBody)
    )
)]
pub async fn stats_handler(
    State(app_state): State<Arc<AppState>>,
) -> Result<Json<StatsResponse>, ApiError> {
    let stats = app_state.conversations.stats().await?;
    Ok(Json(stats.into()))
}

/// Liveness probe. Does not touch the database.
#[utoipa::path(
    get,
    path = "/health",
    responses(
        (status = 200, description = "Service is up", body = HealthResponse)
    )
)]
pub async fn health_handler() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok".to_string(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::web::router;
    use assistant_analytics_core::domain::FeedbackCount;
    use assistant_analytics_core::ports::{ConversationStore, PortError, PortResult};
    use assistant_analytics_core::ConversationService;
    use async_trait::async_trait;
    use axum::body::Body;
    use axum::http::{Request, StatusCode};
    use serde_json::{json, Value};
    use tower::ServiceExt;

    struct FakeStore {
        rows: Vec<Conversation>,
    }

    #[async_trait]
    impl ConversationStore for FakeStore {
        async fn list_previews(
            &self,
            filter: &ConversationFilter,
        ) -> PortResult<Vec<ConversationPreview>> {
            Ok(self
                .rows
                .iter()
                .filter(|c| filter.matches(&c.preview))
                .map(|c| c.preview.clone())
                .collect())
        }

        async fn list_conversations(
            &self,
            filter: &ConversationFilter,
        ) -> PortResult<Vec<Conversation>> {
            Ok(self
                .rows
                .iter()
                .filter(|c| filter.matches(&c.preview))
                .cloned()
                .collect())
        }

        async fn get_conversation(&self, id: &str) -> PortResult<Conversation> {
            self.rows
                .iter()
                .find(|c| c.id() == id)
                .cloned()
                .ok_or_else(|| PortError::NotFound(format!("Conversation {} not found", id)))
        }

        async fn feedback_counts(&self) -> PortResult<Vec<FeedbackCount>> {
            let count = |value: Option<bool>| {
                self.rows
                    .iter()
                    .filter(|c| c.preview.feedback == value)
                    .count() as u64
            };
            Ok([Some(true), Some(false), None]
                .into_iter()
                .map(|f| FeedbackCount::new(f, count(f)))
                .filter(|b| b.count > 0)
                .collect())
        }
    }

    struct BrokenStore;

    #[async_trait]
    impl ConversationStore for BrokenStore {
        async fn list_previews(&self, _: &ConversationFilter) -> PortResult<Vec<ConversationPreview>> {
            Err(PortError::Unexpected("pool timed out".into()))
        }
        async fn list_conversations(&self, _: &ConversationFilter) -> PortResult<Vec<Conversation>> {
            Err(PortError::Unexpected("pool timed out".into()))
        }
        async fn get_conversation(&self, _: &str) -> PortResult<Conversation> {
            Err(PortError::Unexpected("pool timed out".into()))
        }
        async fn feedback_counts(&self) -> PortResult<Vec<FeedbackCount>> {
            Err(PortError::Unexpected("pool timed out".into()))
        }
    }

    fn conversation(id: &str, user: &str, success: bool, feedback: Option<bool>) -> Conversation {
        Conversation::new(
            ConversationPreview::new(id, user, format!("question {}", id), success, feedback),
            vec![ContextChunk::new("kb-1", "Install with the setup wizard.")],
            format!("answer {}", id),
            0.5,
        )
    }

    fn app_with(store: Arc<dyn ConversationStore>) -> axum::Router {
        router(Arc::new(AppState {
            conversations: ConversationService::new(store),
        }))
    }

    fn app() -> axum::Router {
        app_with(Arc::new(FakeStore {
            rows: vec![
                conversation("c1", "alice", true, Some(true)),
                conversation("c2", "bob", true, Some(true)),
                conversation("c3", "carol", false, Some(false)),
                conversation("c4", "dave", false, None),
            ],
        }))
    }

    async fn get(app: axum::Router, uri: &str) -> (StatusCode, Value) {
        let req = Request::builder().uri(uri).body(Body::empty()).unwrap();
        let response = app.oneshot(req).await.unwrap();
        let status = response.status();
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        let body = if bytes.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&bytes).unwrap()
        };
        (status, body)
    }

    fn ids(body: &Value) -> Vec<&str> {
        body.as_array()
            .unwrap()
            .iter()
            .map(|v| v["id"].as_str().unwrap())
            .collect()
    }

    #[tokio::test]
    async fn lists_all_previews_without_filter() {
        let (status, body) = get(app(), "/conversations").await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(ids(&body), ["c1", "c2", "c3", "c4"]);
        assert_eq!(
            body[0],
            json!({
                "id": "c1",
                "username": "alice",
                "question": "question c1",
                "success": true,
                "feedback": true
            })
        );
    }

    #[tokio::test]
    async fn absent_feedback_serializes_as_null() {
        let (_, body) = get(app(), "/conversations").await;
        let dave = &body[3];
        assert!(dave.as_object().unwrap().contains_key("feedback"));
        assert_eq!(dave["feedback"], Value::Null);
    }

    #[tokio::test]
    async fn filters_by_success_flag() {
        let (status, body) = get(app(), "/conversations?success=true").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(ids(&body), ["c1", "c2"]);

        let (_, body) = get(app(), "/conversations?success=false").await;
        assert_eq!(ids(&body), ["c3", "c4"]);
    }

    #[tokio::test]
    async fn unrecognised_success_value_means_no_filter() {
        let (status, body) = get(app(), "/conversations?success=TRUE").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(ids(&body).len(), 4);

        let (_, body) = get(app(), "/conversations?success=").await;
        assert_eq!(ids(&body).len(), 4);
    }

    #[tokio::test]
    async fn full_listing_includes_detail_fields() {
        let (status, body) = get(app(), "/conversations?success=false&full=true").await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(ids(&body), ["c3", "c4"]);
        assert_eq!(body[0]["llmResponse"], "answer c3");
        assert_eq!(body[0]["avgContextScore"], 0.5);
        assert_eq!(body[0]["contextChunks"][0]["id"], "kb-1");
    }

    #[tokio::test]
    async fn gets_one_conversation_in_camel_case() {
        let (status, body) = get(app(), "/conversations/c3").await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(
            body,
            json!({
                "id": "c3",
                "username": "carol",
                "question": "question c3",
                "success": false,
                "feedback": false,
                "contextChunks": [{ "id": "kb-1", "text": "Install with the setup wizard." }],
                "llmResponse": "answer c3",
                "avgContextScore": 0.5
            })
        );
    }

    #[tokio::test]
    async fn missing_conversation_is_404() {
        let (status, body) = get(app(), "/conversations/unknown").await;

        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(body["error"]["code"], "NOT_FOUND");
    }

    #[tokio::test]
    async fn stats_reports_counts_and_percentages() {
        let (status, body) = get(app(), "/stats").await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(
            body,
            json!({
                "total": 4,
                "successTotal": 2,
                "failedTotal": 1,
                "successPercent": 50,
                "failedPercent": 25
            })
        );
    }

    #[tokio::test]
    async fn stats_on_empty_table_are_zero() {
        let (status, body) = get(app_with(Arc::new(FakeStore { rows: Vec::new() })), "/stats").await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["total"], 0);
        assert_eq!(body["successPercent"], 0);
        assert_eq!(body["failedPercent"], 0);
    }

    #[tokio::test]
    async fn store_failure_is_a_generic_500() {
        for uri in ["/conversations", "/conversations/c1", "/stats"] {
            let (status, body) = get(app_with(Arc::new(BrokenStore)), uri).await;
            assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR, "{}", uri);
            assert_eq!(body["error"]["code"], "INTERNAL_ERROR");
            assert!(!body.to_string().contains("pool timed out"));
        }
    }

    #[tokio::test]
    async fn health_does_not_touch_the_store() {
        let (status, body) = get(app_with(Arc::new(BrokenStore)), "/health").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["status"], "ok");
    }

    #[tokio::test]
    async fn openapi_document_is_served() {
        let (status, body) = get(app(), "/api-docs/openapi.json").await;
        assert_eq!(status, StatusCode::OK);
        assert!(body["paths"]["/conversations/{id}"].is_object());
        assert!(body["paths"]["/stats"].is_object());
    }
}
