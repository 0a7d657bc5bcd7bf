//! API request and response types

use crate::checkpoint::Checkpoint;
use crate::llm::Message;
use crate::state_machine::WorkflowState;
use chrono::{DateTime, Local, Utc};
use serde::{Deserialize, Deserializer, Serialize};

/// Thread used when the client does not name one
pub const DEFAULT_THREAD_ID: i64 = 42;

/// Accepted message length, in characters
pub const MAX_MESSAGE_CHARS: usize = 4096;

fn default_thread_id() -> i64 {
    DEFAULT_THREAD_ID
}

/// An explicit `null` selects the default thread as well
fn thread_id_or_default<'de, D>(deserializer: D) -> Result<i64, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(Option::<i64>::deserialize(deserializer)?.unwrap_or(DEFAULT_THREAD_ID))
}

/// Request to send a chat message
#[derive(Debug, Deserialize)]
pub struct ChatRequest {
    pub message: String,
    #[serde(default = "default_thread_id", deserialize_with = "thread_id_or_default")]
    pub thread_id: i64,
}

impl ChatRequest {
    /// Check the message length bounds
    pub fn validate(&self) -> Result<(), String> {
        let chars = self.message.chars().count();
        if chars == 0 {
            return Err("message must contain at least 1 character".to_string());
        }
        if chars > MAX_MESSAGE_CHARS {
            return Err(format!(
                "message must contain at most {MAX_MESSAGE_CHARS} characters"
            ));
        }
        Ok(())
    }
}

/// Response for a chat message
#[derive(Debug, Serialize)]
pub struct ChatResponse {
    pub response: String,
    pub timestamp: DateTime<Local>,
}

#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
    pub timestamp: DateTime<Local>,
}

/// Stored view of a thread
#[derive(Debug, Serialize)]
pub struct ThreadResponse {
    pub thread_id: i64,
    pub state: WorkflowState,
    pub messages: Vec<Message>,
    pub updated_at: DateTime<Utc>,
}

impl From<Checkpoint> for ThreadResponse {
    fn from(cp: Checkpoint) -> Self {
        Self {
            thread_id: cp.thread_id,
            state: cp.state,
            messages: cp.messages,
            updated_at: cp.updated_at,
        }
    }
}

/// Error response
#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub detail: String,
}

impl ErrorResponse {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            detail: message.into(),
        }
    }
}
