//! Pure state transition function
//!
//! Given the same state, context, history and event it always produces the
//! same result, with no I/O. The runtime executes the returned effects.

use super::event::ToolOutcome;
use super::state::{
    route_after_agent, route_after_feedback, route_after_tools, Node, RunContext, ENTRY,
};
use super::{Effect, Event, WorkflowState};
use crate::llm::{Message, ToolCall};
use thiserror::Error;

/// Result of a state transition
#[derive(Debug)]
pub struct TransitionResult {
    pub new_state: WorkflowState,
    pub effects: Vec<Effect>,
}

impl TransitionResult {
    pub fn new(state: WorkflowState) -> Self {
        Self {
            new_state: state,
            effects: vec![],
        }
    }

    pub fn with_effect(mut self, effect: Effect) -> Self {
        self.effects.push(effect);
        self
    }
}

/// Errors that can occur during transition
#[derive(Debug, Error, PartialEq)]
pub enum TransitionError {
    #[error("A run is already in progress for this thread")]
    RunInProgress,
    #[error("Expected {expected} tool results, received {received}")]
    ToolResultCount { expected: usize, received: usize },
    #[error("No tool result for call {0}")]
    MissingToolResult(String),
    #[error("Invalid transition: {0}")]
    InvalidTransition(String),
}

/// Pure transition function
pub fn transition(
    state: &WorkflowState,
    context: &RunContext,
    history: &[Message],
    event: Event,
) -> Result<TransitionResult, TransitionError> {
    match (state, event) {
        // ============================================================
        // Run entry
        // ============================================================

        // A fresh thread, or a finished one, starts a new run at the entry node
        (WorkflowState::Idle | WorkflowState::Ended, Event::UserMessage { text }) => {
            enter(ENTRY, vec![Message::human(text)])
        }

        // Suspended before human_feedback: the new input is appended, then the
        // node's edge decides where the run continues
        (WorkflowState::AwaitingFeedback, Event::UserMessage { text }) => {
            let human = Message::human(text);
            let next = route_after_feedback(Some(&human));
            enter(next, vec![human])
        }

        (WorkflowState::AwaitingFeedback, Event::Resume) => {
            enter(route_after_feedback(history.last()), vec![])
        }

        // Nothing to resume
        (WorkflowState::Idle | WorkflowState::Ended, Event::Resume) => {
            Ok(TransitionResult::new(state.clone()))
        }

        (
            WorkflowState::Agent { .. } | WorkflowState::Tools { .. },
            Event::UserMessage { .. } | Event::Resume,
        ) => Err(TransitionError::RunInProgress),

        // ============================================================
        // agent node
        // ============================================================
        (WorkflowState::Agent { step }, Event::AgentReply {
            content,
            tool_calls,
        }) => {
            let reply = Message::ai(content, tool_calls.clone());
            match route_after_agent(&tool_calls) {
                Node::Tools => Ok(TransitionResult::new(WorkflowState::Tools {
                    step: *step,
                    pending: tool_calls.clone(),
                })
                .with_effect(Effect::append(reply))
                .with_effect(Effect::PersistCheckpoint)
                .with_effect(Effect::execute_tools(tool_calls))),
                _ => Ok(TransitionResult::new(WorkflowState::AwaitingFeedback)
                    .with_effect(Effect::append(reply))
                    .with_effect(Effect::PersistCheckpoint)),
            }
        }

        // Gateway failure ends the run; history so far is kept
        (WorkflowState::Agent { .. }, Event::AgentFailed) => {
            Ok(TransitionResult::new(WorkflowState::Ended).with_effect(Effect::PersistCheckpoint))
        }

        // ============================================================
        // tools node
        // ============================================================
        (WorkflowState::Tools { step, pending }, Event::ToolsComplete { outcomes }) => {
            let ordered = pair_outcomes(pending, outcomes)?;
            let messages = tool_messages(pending, ordered);

            debug_assert_eq!(route_after_tools(), Node::Agent);
            if *step >= context.max_agent_steps {
                return Ok(TransitionResult::new(WorkflowState::Ended)
                    .with_effect(Effect::AppendMessages { messages })
                    .with_effect(Effect::PersistCheckpoint)
                    .with_effect(Effect::StepLimitReached {
                        limit: context.max_agent_steps,
                    }));
            }

            Ok(TransitionResult::new(WorkflowState::Agent { step: step + 1 })
                .with_effect(Effect::AppendMessages { messages })
                .with_effect(Effect::PersistCheckpoint)
                .with_effect(Effect::RequestLlm))
        }

        // ============================================================
        // Invalid Transitions
        // ============================================================
        (state, event) => Err(TransitionError::InvalidTransition(format!(
            "No transition from {state:?} with event {event:?}"
        ))),
    }
}

/// Move a run onto `node` after appending `messages`
fn enter(node: Node, messages: Vec<Message>) -> Result<TransitionResult, TransitionError> {
    let appended = if messages.is_empty() {
        None
    } else {
        Some(Effect::AppendMessages { messages })
    };

    let result = match node {
        Node::Agent => TransitionResult::new(WorkflowState::Agent { step: 1 }),
        Node::End => TransitionResult::new(WorkflowState::Ended),
        Node::Tools | Node::HumanFeedback => {
            return Err(TransitionError::InvalidTransition(format!(
                "Runs cannot resume at {node}"
            )))
        }
    };

    let mut result = match appended {
        Some(effect) => result.with_effect(effect),
        None => result,
    }
    .with_effect(Effect::PersistCheckpoint);

    if node == Node::Agent {
        result = result.with_effect(Effect::RequestLlm);
    }
    Ok(result)
}

/// Pair outcomes to pending calls by identifier, in issue order
fn pair_outcomes(
    pending: &[ToolCall],
    outcomes: Vec<ToolOutcome>,
) -> Result<Vec<ToolOutcome>, TransitionError> {
    if outcomes.len() != pending.len() {
        return Err(TransitionError::ToolResultCount {
            expected: pending.len(),
            received: outcomes.len(),
        });
    }

    let mut remaining: Vec<Option<ToolOutcome>> = outcomes.into_iter().map(Some).collect();
    pending
        .iter()
        .map(|call| {
            remaining
                .iter_mut()
                .find(|slot| slot.as_ref().is_some_and(|o| o.call_id() == call.id))
                .and_then(Option::take)
                .ok_or_else(|| TransitionError::MissingToolResult(call.id.clone()))
        })
        .collect()
}

/// One tool message per pending call. A single failure turns every message
/// of the turn into a diagnostic.
fn tool_messages(pending: &[ToolCall], ordered: Vec<ToolOutcome>) -> Vec<Message> {
    let first_failure = ordered.iter().find_map(|o| match o {
        ToolOutcome::Failure { error, .. } => Some(error.clone()),
        ToolOutcome::Success { .. } => None,
    });

    match first_failure {
        Some(error) => pending
            .iter()
            .map(|call| Message::tool(call.id.clone(), tool_error_message(&error)))
            .collect(),
        None => ordered
            .into_iter()
            .map(|o| match o {
                ToolOutcome::Success { call_id, output } => Message::tool(call_id, output),
                ToolOutcome::Failure { call_id, error } => {
                    Message::tool(call_id, tool_error_message(&error))
                }
            })
            .collect(),
    }
}

/// Diagnostic handed back to the model in place of a tool result
pub fn tool_error_message(error: &str) -> String {
    format!("Error: {error}\n please fix your mistakes.")
}
