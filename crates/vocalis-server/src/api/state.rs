use std::sync::Arc;
use vocalis_core::AppCore;

/// Application state shared across all API handlers
pub type AppState = Arc<AppCore>;
