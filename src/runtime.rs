//! Runtime for executing conversation workflows
//!
//! `WorkflowManager` owns the gateway, the tool set and the checkpoint store.
//! Each request loads a thread's checkpoint, drives one workflow run under
//! that thread's lock, and returns the reply.

mod executor;
mod recovery;
pub mod traits;


pub use executor::{RunOutcome, WorkflowRun};
pub use traits::*;

use crate::checkpoint::{Checkpoint, CheckpointError};
use crate::llm::LlmError;
use crate::state_machine::{Event, RunContext, TransitionError, WorkflowState};
use std::collections::HashMap;
use std::sync::Arc;
use thiserror::Error;
use tokio::sync::Mutex;

/// Failure of a workflow run
#[derive(Debug, Error)]
pub enum WorkflowError {
    #[error(transparent)]
    Transition(#[from] TransitionError),
    #[error("Model gateway failed: {0}")]
    Gateway(LlmError),
    #[error(transparent)]
    Checkpoint(#[from] CheckpointError),
    #[error("Agent exceeded {limit} steps without finishing")]
    StepLimit { limit: u32 },
}

/// Failure of a chat request
#[derive(Debug, Error)]
pub enum ChatError {
    #[error("No response generated from the model")]
    EmptyResponse,
    #[error(transparent)]
    Workflow(#[from] WorkflowError),
}

/// Reply to a chat message
#[derive(Debug, Clone)]
pub struct ChatReply {
    pub response: String,
    pub state: WorkflowState,
}

/// Entry point for running workflows on threads
pub struct WorkflowManager {
    llm: Arc<dyn LlmClient>,
    tools: Arc<dyn ToolExecutor>,
    store: Arc<dyn CheckpointStore>,
    max_agent_steps: u32,
    /// One lock per thread; a thread is mutated by one run at a time.
    /// Entries live as long as the process, like the in-memory checkpoints.
    locks: Mutex<HashMap<i64, Arc<Mutex<()>>>>,
}

impl WorkflowManager {
    pub fn new(
        llm: Arc<dyn LlmClient>,
        tools: Arc<dyn ToolExecutor>,
        store: Arc<dyn CheckpointStore>,
        max_agent_steps: u32,
    ) -> Self {
        Self {
            llm,
            tools,
            store,
            max_agent_steps: max_agent_steps.max(1),
            locks: Mutex::new(HashMap::new()),
        }
    }

    pub fn model_id(&self) -> &str {
        self.llm.model_id()
    }

    /// Append a human message to the thread and run until the workflow pauses
    pub async fn send_message(&self, thread_id: i64, text: String) -> Result<ChatReply, ChatError> {
        let lock = self.thread_lock(thread_id).await;
        let _guard = lock.lock().await;

        let checkpoint = self
            .load(thread_id)
            .await?
            .unwrap_or_else(|| Checkpoint::new(thread_id));
        let outcome = self.run(checkpoint, Event::UserMessage { text }).await?;

        let response = outcome.reply.ok_or(ChatError::EmptyResponse)?;
        Ok(ChatReply {
            response,
            state: outcome.checkpoint.state,
        })
    }

    /// Resume a thread with no new input. Returns `None` for unknown threads.
    pub async fn end_thread(&self, thread_id: i64) -> Result<Option<Checkpoint>, ChatError> {
        let lock = self.thread_lock(thread_id).await;
        let _guard = lock.lock().await;

        let Some(checkpoint) = self.load(thread_id).await? else {
            return Ok(None);
        };
        let outcome = self.run(checkpoint, Event::Resume).await?;
        Ok(Some(outcome.checkpoint))
    }

    /// Current checkpoint of a thread
    pub async fn thread(&self, thread_id: i64) -> Result<Option<Checkpoint>, ChatError> {
        Ok(self
            .store
            .load(thread_id)
            .await
            .map_err(WorkflowError::from)?)
    }

    async fn run(&self, checkpoint: Checkpoint, event: Event) -> Result<RunOutcome, WorkflowError> {
        let context = RunContext::new(checkpoint.thread_id, self.max_agent_steps);
        WorkflowRun::new(
            context,
            checkpoint,
            self.llm.as_ref(),
            self.tools.as_ref(),
            self.store.as_ref(),
        )
        .run(event)
        .await
    }

    async fn load(&self, thread_id: i64) -> Result<Option<Checkpoint>, WorkflowError> {
        let Some(mut checkpoint) = self.store.load(thread_id).await? else {
            return Ok(None);
        };

        // A run that died mid-node left a running cursor behind
        if checkpoint.state.is_running() {
            let closed = recovery::close_interrupted_turn(&mut checkpoint.messages);
            tracing::warn!(
                thread_id,
                state = checkpoint.state.label(),
                closed_tool_calls = closed,
                "Resetting interrupted run to ended"
            );
            checkpoint.state = WorkflowState::Ended;
        }
        Ok(Some(checkpoint))
    }

    async fn thread_lock(&self, thread_id: i64) -> Arc<Mutex<()>> {
        self.locks
            .lock()
            .await
            .entry(thread_id)
            .or_default()
            .clone()
    }
}
