//! Conversation workflow state machine
//!
//! Implements the Elm Architecture pattern with pure state transitions.

mod effect;
pub mod event;
pub mod state;
pub(crate) mod transition;

#[cfg(test)]
mod proptests;

pub use effect::Effect;
pub use event::{Event, ToolOutcome};
pub use state::{RunContext, WorkflowState};
pub use transition::{transition, TransitionError};
