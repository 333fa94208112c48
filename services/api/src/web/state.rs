//! services/api/src/web/state.rs
//!
//! Defines the application's shared state.

use assistant_analytics_core::ConversationService;

/// The shared application state, created once at startup and passed to all handlers.
#[derive(Clone)]
pub struct AppState {
    pub conversations: ConversationService,
}
