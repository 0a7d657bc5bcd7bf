//! Workflow run executor
//!
//! Feeds events through the pure transition function and executes the
//! resulting effects until the run pauses or ends.

use super::traits::{CheckpointStore, LlmClient, ToolExecutor};
use super::WorkflowError;
use crate::checkpoint::Checkpoint;
use crate::llm::{LlmError, Message};
use crate::state_machine::{transition, Effect, Event, RunContext, ToolOutcome, WorkflowState};
use crate::system_prompt::build_system_prompt;
use chrono::{Local, Utc};

/// Result of a run that paused or ended cleanly
#[derive(Debug)]
pub struct RunOutcome {
    pub checkpoint: Checkpoint,
    /// Most recent non-empty ai content appended during this run
    pub reply: Option<String>,
}

/// One traversal of the workflow for a single request
pub struct WorkflowRun<'a> {
    context: RunContext,
    checkpoint: Checkpoint,
    llm: &'a dyn LlmClient,
    tools: &'a dyn ToolExecutor,
    store: &'a dyn CheckpointStore,
    /// History length when the run started
    run_start: usize,
    gateway_error: Option<LlmError>,
    step_limit: Option<u32>,
}

impl<'a> WorkflowRun<'a> {
    pub fn new(
        context: RunContext,
        checkpoint: Checkpoint,
        llm: &'a dyn LlmClient,
        tools: &'a dyn ToolExecutor,
        store: &'a dyn CheckpointStore,
    ) -> Self {
        let run_start = checkpoint.messages.len();
        Self {
            context,
            checkpoint,
            llm,
            tools,
            store,
            run_start,
            gateway_error: None,
            step_limit: None,
        }
    }

    pub async fn run(mut self, event: Event) -> Result<RunOutcome, WorkflowError> {
        let thread_id = self.context.thread_id;
        tracing::info!(thread_id, state = self.checkpoint.state.label(), "Starting workflow run");

        // Events are processed in a loop to handle chained effects
        let mut events = vec![event];
        while let Some(event) = events.pop() {
            let result = transition(
                &self.checkpoint.state,
                &self.context,
                &self.checkpoint.messages,
                event,
            )?;

            tracing::debug!(
                thread_id,
                from = self.checkpoint.state.label(),
                to = result.new_state.label(),
                node = ?result.new_state.node(),
                "Workflow transition"
            );
            self.checkpoint.state = result.new_state;

            for effect in result.effects {
                if let Some(generated) = self.execute_effect(effect).await? {
                    events.push(generated);
                }
            }
        }

        if let Some(error) = self.gateway_error {
            tracing::error!(thread_id, error = %error, "Workflow run failed at agent");
            return Err(WorkflowError::Gateway(error));
        }
        if let Some(limit) = self.step_limit {
            tracing::error!(thread_id, limit, "Workflow run hit step limit");
            return Err(WorkflowError::StepLimit { limit });
        }

        tracing::info!(
            thread_id,
            state = self.checkpoint.state.label(),
            messages = self.checkpoint.messages.len(),
            "Workflow run finished"
        );

        let reply = self
            .checkpoint
            .messages
            .iter()
            .skip(self.run_start)
            .rev()
            .filter(|msg| matches!(msg, Message::Ai { .. }))
            .map(Message::content)
            .find(|content| !content.trim().is_empty())
            .map(str::to_string);

        Ok(RunOutcome {
            checkpoint: self.checkpoint,
            reply,
        })
    }

    /// Execute an effect and optionally return a generated event
    async fn execute_effect(&mut self, effect: Effect) -> Result<Option<Event>, WorkflowError> {
        match effect {
            Effect::AppendMessages { messages } => {
                self.checkpoint.messages.extend(messages);
                Ok(None)
            }

            Effect::PersistCheckpoint => {
                self.checkpoint.updated_at = Utc::now();
                self.store.save(&self.checkpoint).await?;
                Ok(None)
            }

            Effect::RequestLlm => {
                let step = match self.checkpoint.state {
                    WorkflowState::Agent { step } => step,
                    _ => 0,
                };
                tracing::debug!(thread_id = self.context.thread_id, step, "Calling model gateway");

                // Preamble is rebuilt per call and never persisted
                let preamble = build_system_prompt(&Local::now().naive_local());
                let mut messages = Vec::with_capacity(self.checkpoint.messages.len() + 1);
                messages.push(Message::system(preamble));
                messages.extend(self.checkpoint.messages.iter().cloned());

                match self.llm.invoke(&messages).await {
                    Ok(response) => Ok(Some(Event::AgentReply {
                        content: response.content,
                        tool_calls: response.tool_calls,
                    })),
                    Err(e) => {
                        self.gateway_error = Some(e);
                        Ok(Some(Event::AgentFailed))
                    }
                }
            }

            Effect::ExecuteTools { calls } => {
                let mut outcomes = Vec::with_capacity(calls.len());
                for call in &calls {
                    tracing::info!(tool = %call.name, id = %call.id, "Executing tool");
                    let outcome = match self.tools.execute(call).await {
                        Ok(output) => ToolOutcome::Success {
                            call_id: call.id.clone(),
                            output,
                        },
                        Err(e) => {
                            tracing::warn!(tool = %call.name, id = %call.id, error = %e, "Tool failed");
                            ToolOutcome::Failure {
                                call_id: call.id.clone(),
                                error: format!("{e:?}"),
                            }
                        }
                    };
                    outcomes.push(outcome);
                }

                let failed = outcomes.iter().filter(|o| o.is_failure()).count();
                if failed > 0 {
                    tracing::warn!(
                        thread_id = self.context.thread_id,
                        failed,
                        total = outcomes.len(),
                        "Tool failures returned to the model as diagnostics"
                    );
                }
                Ok(Some(Event::ToolsComplete { outcomes }))
            }

            Effect::StepLimitReached { limit } => {
                self.step_limit = Some(limit);
                Ok(None)
            }
        }
    }
}
