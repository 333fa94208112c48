pub mod domain;
pub mod ports;
pub mod service;
pub mod stats;

pub use domain::{
    ContextChunk, Conversation, ConversationFilter, ConversationPreview, FeedbackCount,
    StatsSummary,
};
pub use ports::{ConversationStore, PortError, PortResult};
pub use service::ConversationService;
pub use stats::summarize;
