//! Trait abstractions for runtime I/O
//!
//! These traits enable testing the executor with mock implementations.

use crate::checkpoint::{Checkpoint, CheckpointError};
use crate::llm::{LlmError, LlmRequest, LlmResponse, LlmService, Message, ToolCall, ToolDefinition};
use crate::tools::{ToolError, ToolSet};
use async_trait::async_trait;
use std::sync::Arc;

/// Model gateway bound to the tool set
#[async_trait]
pub trait LlmClient: Send + Sync {
    /// Produce the next ai turn for `messages` (preamble included)
    async fn invoke(&self, messages: &[Message]) -> Result<LlmResponse, LlmError>;

    /// Get the model ID
    fn model_id(&self) -> &str;
}

/// Dispatcher for tool calls
#[async_trait]
pub trait ToolExecutor: Send + Sync {
    async fn execute(&self, call: &ToolCall) -> Result<String, ToolError>;
}

/// Storage for thread checkpoints
#[async_trait]
pub trait CheckpointStore: Send + Sync {
    async fn load(&self, thread_id: i64) -> Result<Option<Checkpoint>, CheckpointError>;

    async fn save(&self, checkpoint: &Checkpoint) -> Result<(), CheckpointError>;
}

// ============================================================================
// Arc implementations for trait objects
// ============================================================================

#[async_trait]
impl<T: LlmClient + ?Sized> LlmClient for Arc<T> {
    async fn invoke(&self, messages: &[Message]) -> Result<LlmResponse, LlmError> {
        (**self).invoke(messages).await
    }

    fn model_id(&self) -> &str {
        (**self).model_id()
    }
}

#[async_trait]
impl<T: ToolExecutor + ?Sized> ToolExecutor for Arc<T> {
    async fn execute(&self, call: &ToolCall) -> Result<String, ToolError> {
        (**self).execute(call).await
    }
}

#[async_trait]
impl<T: CheckpointStore + ?Sized> CheckpointStore for Arc<T> {
    async fn load(&self, thread_id: i64) -> Result<Option<Checkpoint>, CheckpointError> {
        (**self).load(thread_id).await
    }

    async fn save(&self, checkpoint: &Checkpoint) -> Result<(), CheckpointError> {
        (**self).save(checkpoint).await
    }
}

// ============================================================================
// Production Adapters
// ============================================================================

/// Adapter binding an `LlmService` to a fixed set of tool schemas
pub struct BoundGateway {
    service: Arc<dyn LlmService>,
    tools: Vec<ToolDefinition>,
    max_tokens: Option<u32>,
}

impl BoundGateway {
    pub fn new(service: Arc<dyn LlmService>, tools: Vec<ToolDefinition>) -> Self {
        Self {
            service,
            tools,
            max_tokens: None,
        }
    }

    pub fn with_max_tokens(mut self, max_tokens: Option<u32>) -> Self {
        self.max_tokens = max_tokens;
        self
    }
}

#[async_trait]
impl LlmClient for BoundGateway {
    async fn invoke(&self, messages: &[Message]) -> Result<LlmResponse, LlmError> {
        let request = LlmRequest {
            messages: messages.to_vec(),
            tools: self.tools.clone(),
            max_tokens: self.max_tokens,
            temperature: Some(0.0),
        };
        self.service.complete(&request).await
    }

    fn model_id(&self) -> &str {
        self.service.model_id()
    }
}

#[async_trait]
impl ToolExecutor for ToolSet {
    async fn execute(&self, call: &ToolCall) -> Result<String, ToolError> {
        ToolSet::execute(self, call).await
    }
}
