//! Thread checkpoints
//!
//! A checkpoint holds everything needed to resume a thread: its message
//! history and the workflow cursor. The in-memory store lives for the life
//! of the process.

use crate::llm::Message;
use crate::runtime::CheckpointStore;
use crate::state_machine::WorkflowState;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use thiserror::Error;
use tokio::sync::RwLock;

/// Persisted snapshot of one thread
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Checkpoint {
    pub thread_id: i64,
    pub state: WorkflowState,
    pub messages: Vec<Message>,
    pub updated_at: DateTime<Utc>,
}

impl Checkpoint {
    /// Empty checkpoint for a thread seen for the first time
    pub fn new(thread_id: i64) -> Self {
        Self {
            thread_id,
            state: WorkflowState::Idle,
            messages: Vec::new(),
            updated_at: Utc::now(),
        }
    }
}

#[derive(Debug, Error)]
pub enum CheckpointError {
    #[cfg(test)]
    #[error("Checkpoint store unavailable: {0}")]
    Unavailable(String),
    #[error("Checkpoint for thread {thread_id} is stale")]
    Conflict { thread_id: i64 },
}

/// Process-local checkpoint store
#[derive(Default)]
pub struct MemoryCheckpointStore {
    threads: RwLock<HashMap<i64, Checkpoint>>,
}

impl MemoryCheckpointStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl CheckpointStore for MemoryCheckpointStore {
    async fn load(&self, thread_id: i64) -> Result<Option<Checkpoint>, CheckpointError> {
        Ok(self.threads.read().await.get(&thread_id).cloned())
    }

    async fn save(&self, checkpoint: &Checkpoint) -> Result<(), CheckpointError> {
        let mut threads = self.threads.write().await;
        if let Some(existing) = threads.get(&checkpoint.thread_id) {
            // History is append-only
            if existing.messages.len() > checkpoint.messages.len() {
                return Err(CheckpointError::Conflict {
                    thread_id: checkpoint.thread_id,
                });
            }
        }
        threads.insert(checkpoint.thread_id, checkpoint.clone());
        Ok(())
    }
}
