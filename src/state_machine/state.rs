//! Workflow state types and edge selection

use crate::llm::{Message, ToolCall};
use serde::{Deserialize, Serialize};
use std::fmt;

// ============================================================================
// Graph nodes
// ============================================================================

/// Named nodes of the conversation graph
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Node {
    Agent,
    Tools,
    HumanFeedback,
    End,
}

impl Node {
    pub fn as_str(self) -> &'static str {
        match self {
            Node::Agent => "agent",
            Node::Tools => "tools",
            Node::HumanFeedback => "human_feedback",
            Node::End => "end",
        }
    }
}

impl fmt::Display for Node {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Entry node of every run
pub const ENTRY: Node = Node::Agent;

/// Runs suspend before executing this node
pub const INTERRUPT_BEFORE: Node = Node::HumanFeedback;

/// Edge out of `agent`: tool calls go to `tools`, anything else to `human_feedback`
pub fn route_after_agent(tool_calls: &[ToolCall]) -> Node {
    if tool_calls.is_empty() {
        Node::HumanFeedback
    } else {
        Node::Tools
    }
}

/// Edge out of `tools` is unconditional
pub fn route_after_tools() -> Node {
    Node::Agent
}

/// Edge out of `human_feedback`, evaluated on the last message of the history
pub fn route_after_feedback(last: Option<&Message>) -> Node {
    match last {
        Some(msg) if msg.is_human() => Node::Agent,
        _ => Node::End,
    }
}

// ============================================================================
// Workflow State
// ============================================================================

/// Cursor of a thread's workflow, persisted alongside its messages
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum WorkflowState {
    /// Thread exists but no run has started
    #[default]
    Idle,

    /// Waiting on the model gateway
    Agent {
        /// Gateway calls made so far in this run, including the pending one
        step: u32,
    },

    /// Dispatching the tool calls of the last ai message
    Tools {
        step: u32,
        /// Calls still owed a tool message, in issue order
        pending: Vec<ToolCall>,
    },

    /// Suspended before `human_feedback`, waiting for external input
    AwaitingFeedback,

    /// Run reached `end`
    Ended,
}

impl WorkflowState {
    /// Graph node this state sits on, `None` before the first run
    pub fn node(&self) -> Option<Node> {
        match self {
            WorkflowState::Idle => None,
            WorkflowState::Agent { .. } => Some(Node::Agent),
            WorkflowState::Tools { .. } => Some(Node::Tools),
            WorkflowState::AwaitingFeedback => Some(INTERRUPT_BEFORE),
            WorkflowState::Ended => Some(Node::End),
        }
    }

    /// A run is executing a node right now
    pub fn is_running(&self) -> bool {
        matches!(self, WorkflowState::Agent { .. } | WorkflowState::Tools { .. })
    }

    /// Short label for logs and API output
    pub fn label(&self) -> &'static str {
        match self {
            WorkflowState::Idle => "idle",
            WorkflowState::Agent { .. } => "agent",
            WorkflowState::Tools { .. } => "tools",
            WorkflowState::AwaitingFeedback => "awaiting_feedback",
            WorkflowState::Ended => "ended",
        }
    }
}

/// Immutable configuration for a run
#[derive(Debug, Clone)]
pub struct RunContext {
    pub thread_id: i64,
    /// Upper bound on gateway calls per run
    pub max_agent_steps: u32,
}

impl RunContext {
    pub fn new(thread_id: i64, max_agent_steps: u32) -> Self {
        Self {
            thread_id,
            max_agent_steps,
        }
    }
}
