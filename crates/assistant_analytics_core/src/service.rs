//! crates/assistant_analytics_core/src/service.rs
//!
//! The application service used by the HTTP layer. It owns no state of its
//! own: every call goes to the store.

use std::sync::Arc;

use crate::domain::{Conversation, ConversationFilter, ConversationPreview, StatsSummary};
use crate::ports::{ConversationStore, PortResult};
use crate::stats::summarize;

#[derive(Clone)]
pub struct ConversationService {
    store: Arc<dyn ConversationStore>,
}

impl ConversationService {
    /// Creates a new `ConversationService` over the given store.
    pub fn new(store: Arc<dyn ConversationStore>) -> Self {
        Self { store }
    }

    pub async fn list_previews(
        &self,
        filter: ConversationFilter,
    ) -> PortResult<Vec<ConversationPreview>> {
        self.store.list_previews(&filter).await
    }

    pub async fn list_conversations(
        &self,
        filter: ConversationFilter,
    ) -> PortResult<Vec<Conversation>> {
        self.store.list_conversations(&filter).await
    }

    pub async fn get_conversation(&self, id: &str) -> PortResult<Conversation> {
        self.store.get_conversation(id).await
    }

    pub async fn stats(&self) -> PortResult<StatsSummary> {
        let buckets = self.store.feedback_counts().await?;
        Ok(summarize(&buckets))
    }
}
