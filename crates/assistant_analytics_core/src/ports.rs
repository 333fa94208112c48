//! crates/assistant_analytics_core/src/ports.rs
//!
//! Defines the service contracts (traits) for the application's core logic.
//! The store is the only boundary: the core never knows whether rows come from
//! PostgreSQL or from an in-memory fake.

use async_trait::async_trait;

use crate::domain::{Conversation, ConversationFilter, ConversationPreview, FeedbackCount};

//=========================================================================================
// Generic Port Error and Result Types
//=========================================================================================

/// A generic error type for all port operations.
/// This abstracts away the specific errors from external services (e.g., database, network).
#[derive(Debug, thiserror::Error)]
pub enum PortError {
    #[error("Item not found: {0}")]
    NotFound(String),
    #[error("An unexpected error occurred: {0}")]
    Unexpected(String),
}

/// A convenience type alias for `Result<T, PortError>`.
pub type PortResult<T> = Result<T, PortError>;

//=========================================================================================
// Service Ports (Traits)
//=========================================================================================

/// Read-only access to the `conversations` table. Every method issues exactly
/// one query.
#[async_trait]
pub trait ConversationStore: Send + Sync {
    async fn list_previews(&self, filter: &ConversationFilter)
        -> PortResult<Vec<ConversationPreview>>;

    async fn list_conversations(&self, filter: &ConversationFilter)
        -> PortResult<Vec<Conversation>>;

    /// Fails with `PortError::NotFound` when no row has this id.
    async fn get_conversation(&self, id: &str) -> PortResult<Conversation>;

    /// Row counts grouped by the nullable feedback column.
    async fn feedback_counts(&self) -> PortResult<Vec<FeedbackCount>>;
}
