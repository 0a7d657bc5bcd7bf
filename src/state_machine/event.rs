//! Events that drive the workflow

use crate::llm::ToolCall;

/// Events that trigger state transitions
#[derive(Debug, Clone)]
pub enum Event {
    // Caller events
    /// New human input for the thread
    UserMessage { text: String },
    /// Resume a suspended run without new input
    Resume,

    // Gateway events
    AgentReply {
        content: String,
        tool_calls: Vec<ToolCall>,
    },
    /// The gateway call failed; the run ends
    AgentFailed,

    // Tool events
    /// Every pending call of the turn was dispatched
    ToolsComplete { outcomes: Vec<ToolOutcome> },
}

/// Result of dispatching one tool call
#[derive(Debug, Clone, PartialEq)]
pub enum ToolOutcome {
    Success { call_id: String, output: String },
    /// `error` is the debug representation of the tool's error
    Failure { call_id: String, error: String },
}

impl ToolOutcome {
    pub fn call_id(&self) -> &str {
        match self {
            ToolOutcome::Success { call_id, .. } | ToolOutcome::Failure { call_id, .. } => call_id,
        }
    }

    pub fn is_failure(&self) -> bool {
        matches!(self, ToolOutcome::Failure { .. })
    }
}
