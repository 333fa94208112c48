//! services/api/src/adapters/db.rs
//!
//! This module contains the database adapter, which is the concrete implementation
//! of the `ConversationStore` port from the `core` crate. It handles all reads
//! from the PostgreSQL `conversations` table using `sqlx`.

use assistant_analytics_core::domain::{
    ContextChunk, Conversation, ConversationFilter, ConversationPreview, FeedbackCount,
};
use assistant_analytics_core::ports::{ConversationStore, PortError, PortResult};
use async_trait::async_trait;
use serde::Deserialize;
use sqlx::types::Json;
use sqlx::{FromRow, PgPool, Postgres, QueryBuilder};
use tracing::debug;

// `id` is compared and returned as text so both uuid and text keys work.
const PREVIEW_COLUMNS: &str = "id::text AS id, user_name, question, success, feedback";

const FULL_COLUMNS: &str = "id::text AS id, user_name, question, llm_response, context_chunks, \
     success, feedback, avg_context_score::float8 AS avg_context_score";

//=========================================================================================
// The Main Adapter Struct
//=========================================================================================

/// A database adapter that implements the `ConversationStore` port.
#[derive(Clone)]
pub struct DbAdapter {
    pool: PgPool,
}

impl DbAdapter {
    /// Creates a new `DbAdapter`.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Issues a trivial statement so a bad connection fails at startup rather
    /// than on the first request.
    pub async fn ping(&self) -> Result<(), sqlx::Error> {
        sqlx::query("SELECT 1").execute(&self.pool).await?;
        Ok(())
    }
}

/// `SELECT <columns> FROM conversations`, narrowed by the filter when it is set.
fn filtered_select(columns: &str, filter: &ConversationFilter) -> QueryBuilder<'static, Postgres> {
    let mut query = QueryBuilder::new(format!("SELECT {} FROM conversations WHERE 1=1", columns));
    if let Some(success) = filter.success {
        query.push(" AND success = ").push_bind(success);
    }
    query
}

fn unexpected(e: sqlx::Error) -> PortError {
    PortError::Unexpected(e.to_string())
}

//=========================================================================================
// "Impure" Database Record Structs
//=========================================================================================

#[derive(Debug, Clone, Deserialize)]
struct ContextChunkRecord {
    id: String,
    text: String,
}
impl ContextChunkRecord {
    fn to_domain(self) -> ContextChunk {
        ContextChunk::new(self.id, self.text)
    }
}

#[derive(Debug, FromRow)]
struct PreviewRecord {
    id: String,
    user_name: String,
    question: String,
    success: bool,
    feedback: Option<bool>,
}
impl PreviewRecord {
    fn to_domain(self) -> ConversationPreview {
        ConversationPreview::new(
            self.id,
            self.user_name,
            self.question,
            self.success,
            self.feedback,
        )
    }
}

#[derive(Debug, FromRow)]
struct ConversationRecord {
    id: String,
    user_name: String,
    question: String,
    llm_response: String,
    context_chunks: Json<Vec<ContextChunkRecord>>,
    success: bool,
    feedback: Option<bool>,
    avg_context_score: f64,
}
impl ConversationRecord {
    fn to_domain(self) -> Conversation {
        let preview = ConversationPreview::new(
            self.id,
            self.user_name,
            self.question,
            self.success,
            self.feedback,
        );
        let chunks = self
            .context_chunks
            .0
            .into_iter()
            .map(ContextChunkRecord::to_domain)
            .collect();
        Conversation::new(preview, chunks, self.llm_response, self.avg_context_score)
    }
}

#[derive(Debug, FromRow)]
struct FeedbackCountRecord {
    feedback: Option<bool>,
    count: i64,
}
impl FeedbackCountRecord {
    fn to_domain(self) -> PortResult<FeedbackCount> {
        let count = u64::try_from(self.count).map_err(|_| {
            PortError::Unexpected(format!("Negative row count {} in feedback stats", self.count))
        })?;
        Ok(FeedbackCount::new(self.feedback, count))
    }
}

//=========================================================================================
// `ConversationStore` Trait Implementation
//=========================================================================================

#[async_trait]
impl ConversationStore for DbAdapter {
    async fn list_previews(
        &self,
        filter: &ConversationFilter,
    ) -> PortResult<Vec<ConversationPreview>> {
        let mut query = filtered_select(PREVIEW_COLUMNS, filter);
        let records = query
            .build_query_as::<PreviewRecord>()
            .fetch_all(&self.pool)
            .await
            .map_err(unexpected)?;

        debug!("Fetched {} conversation previews", records.len());
        Ok(records.into_iter().map(|r| r.to_domain()).collect())
    }

    async fn list_conversations(
        &self,
        filter: &ConversationFilter,
    ) -> PortResult<Vec<Conversation>> {
        let mut query = filtered_select(FULL_COLUMNS, filter);
        let records = query
            .build_query_as::<ConversationRecord>()
            .fetch_all(&self.pool)
            .await
            .map_err(unexpected)?;

        debug!("Fetched {} conversations", records.len());
        Ok(records.into_iter().map(|r| r.to_domain()).collect())
    }

    async fn get_conversation(&self, id: &str) -> PortResult<Conversation> {
        let sql = format!("SELECT {} FROM conversations WHERE id::text = $1", FULL_COLUMNS);
        let record = sqlx::query_as::<_, ConversationRecord>(&sql)
            .bind(id)
            .fetch_optional(&self.pool)
            .await
            .map_err(unexpected)?
            .ok_or_else(|| PortError::NotFound(format!("Conversation {} not found", id)))?;

        Ok(record.to_domain())
    }

    async fn feedback_counts(&self) -> PortResult<Vec<FeedbackCount>> {
        let records = sqlx::query_as::<_, FeedbackCountRecord>(
            "SELECT feedback, count(*) AS count FROM conversations GROUP BY feedback",
        )
        .fetch_all(&self.pool)
        .await
        .map_err(unexpected)?;

        records.into_iter().map(|r| r.to_domain()).collect()
    }
}
