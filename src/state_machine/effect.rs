//! Effects produced by state transitions

use crate::llm::{Message, ToolCall};

/// Effects to be executed after state transition
#[derive(Debug, Clone, PartialEq)]
pub enum Effect {
    /// Append messages to the thread history
    AppendMessages { messages: Vec<Message> },

    /// Save messages and state to the checkpoint store
    PersistCheckpoint,

    /// Call the model gateway with preamble + history
    RequestLlm,

    /// Dispatch tool calls, in order
    ExecuteTools { calls: Vec<ToolCall> },

    /// The run hit its gateway-call cap
    StepLimitReached { limit: u32 },
}

impl Effect {
    pub fn append(message: Message) -> Self {
        Effect::AppendMessages {
            messages: vec![message],
        }
    }

    pub fn execute_tools(calls: Vec<ToolCall>) -> Self {
        Effect::ExecuteTools { calls }
    }
}
