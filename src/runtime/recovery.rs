//! Recovery of threads whose run was interrupted
//!
//! A run can stop between persisting the `tools` cursor and appending the
//! tool results (client disconnect, process exit). The ai turn then carries
//! calls nobody answered, which the gateway rejects on every later request.

use crate::llm::Message;
use crate::state_machine::transition::tool_error_message;

/// Diagnostic recorded for a call whose dispatch never completed
pub const INTERRUPTED: &str = "Interrupted";

/// Answer every unanswered call of the last ai turn with a diagnostic.
/// Returns how many tool messages were appended.
pub fn close_interrupted_turn(messages: &mut Vec<Message>) -> usize {
    let Some(ai_index) = messages
        .iter()
        .rposition(|m| matches!(m, Message::Ai { .. }))
    else {
        return 0;
    };

    let answered: Vec<&str> = messages
        .iter()
        .skip(ai_index + 1)
        .filter_map(|m| match m {
            Message::Tool { tool_call_id, .. } => Some(tool_call_id.as_str()),
            _ => None,
        })
        .collect();

    let missing: Vec<Message> = messages[ai_index]
        .tool_calls()
        .iter()
        .filter(|call| !answered.contains(&call.id.as_str()))
        .map(|call| Message::tool(call.id.clone(), tool_error_message(INTERRUPTED)))
        .collect();

    let count = missing.len();
    messages.extend(missing);
    count
}
