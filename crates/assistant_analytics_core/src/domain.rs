//! crates/assistant_analytics_core/src/domain.rs
//!
//! Defines the pure, core data structures for the application.
//! These structs are independent of any database or serialization format.

/// A fragment of source documentation handed to the model as retrieval context.
#[derive(Debug, Clone, PartialEq)]
pub struct ContextChunk {
    pub id: String,
    pub text: String,
}

impl ContextChunk {
    pub fn new(id: impl Into<String>, text: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            text: text.into(),
        }
    }
}

/// The light subset of a conversation used by list views.
#[derive(Debug, Clone, PartialEq)]
pub struct ConversationPreview {
    pub id: String,
    pub username: String,
    pub question: String,
    /// Whether the model located an answer in its context.
    pub success: bool,
    /// User satisfaction. `None` means the user gave no feedback.
    pub feedback: Option<bool>,
}

impl ConversationPreview {
    pub fn new(
        id: impl Into<String>,
        username: impl Into<String>,
        question: impl Into<String>,
        success: bool,
        feedback: Option<bool>,
    ) -> Self {
        Self {
            id: id.into(),
            username: username.into(),
            question: question.into(),
            success,
            feedback,
        }
    }
}

/// A complete question/answer exchange, including the heavy text fields.
#[derive(Debug, Clone, PartialEq)]
pub struct Conversation {
    pub preview: ConversationPreview,
    pub context_chunks: Vec<ContextChunk>,
    pub llm_response: String,
    pub avg_context_score: f64,
}

impl Conversation {
    pub fn new(
        preview: ConversationPreview,
        context_chunks: Vec<ContextChunk>,
        llm_response: impl Into<String>,
        avg_context_score: f64,
    ) -> Self {
        Self {
            preview,
            context_chunks,
            llm_response: llm_response.into(),
            avg_context_score,
        }
    }

    pub fn id(&self) -> &str {
        &self.preview.id
    }
}

/// Restricts a conversation listing. An unset `success` returns every row.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ConversationFilter {
    pub success: Option<bool>,
}

impl ConversationFilter {
    pub fn all() -> Self {
        Self { success: None }
    }

    pub fn by_success(success: bool) -> Self {
        Self {
            success: Some(success),
        }
    }

    /// Returns true if the given preview passes this filter.
    pub fn matches(&self, preview: &ConversationPreview) -> bool {
        self.success.map_or(true, |s| preview.success == s)
    }
}

/// One bucket of the `GROUP BY feedback` aggregation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FeedbackCount {
    pub feedback: Option<bool>,
    pub count: u64,
}

impl FeedbackCount {
    pub fn new(feedback: Option<bool>, count: u64) -> Self {
        Self { feedback, count }
    }
}

/// Satisfaction statistics, recomputed on every request.
///
/// `success_total + failed_total <= total`: conversations without feedback
/// only count toward `total`. Percentages are whole numbers; both are `0`
/// when there are no conversations at all.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct StatsSummary {
    pub total: u64,
    pub success_total: u64,
    pub failed_total: u64,
    pub success_percent: u32,
    pub failed_percent: u32,
}
