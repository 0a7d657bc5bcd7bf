//! HTTP API for the support chat service

mod handlers;
mod types;

pub use handlers::create_router;

use crate::runtime::WorkflowManager;
use std::sync::Arc;

/// Application state shared across handlers
#[derive(Clone)]
pub struct AppState {
    pub manager: Arc<WorkflowManager>,
}

impl AppState {
    pub fn new(manager: Arc<WorkflowManager>) -> Self {
        Self { manager }
    }
}
