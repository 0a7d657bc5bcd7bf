//! Property-based tests for the state machine
//!
//! These tests verify key invariants hold across all possible inputs.

use super::event::ToolOutcome;
use super::state::*;
use super::transition::*;
use super::*;
use crate::llm::{Message, ToolCall};
use proptest::prelude::*;
use serde_json::json;

// ============================================================================
// Test Helpers
// ============================================================================

fn test_context() -> RunContext {
    RunContext::new(42, 10)
}

/// Drive an event through the transition and apply its append effects to `history`
fn apply(
    state: &WorkflowState,
    history: &mut Vec<Message>,
    event: Event,
) -> Result<TransitionResult, TransitionError> {
    let result = transition(state, &test_context(), history, event)?;
    for effect in &result.effects {
        if let Effect::AppendMessages { messages } = effect {
            history.extend(messages.iter().cloned());
        }
    }
    Ok(result)
}

// ============================================================================
// Arbitrary Generators
// ============================================================================

fn arb_tool_name() -> impl Strategy<Value = &'static str> {
    prop_oneof![Just("retrieve_faq_info"), Just("web_search")]
}

/// Calls with distinct identifiers, as a single ai turn carries
fn arb_tool_calls(max: usize) -> impl Strategy<Value = Vec<ToolCall>> {
    proptest::collection::vec(arb_tool_name(), 1..=max).prop_map(|names| {
        names
            .into_iter()
            .enumerate()
            .map(|(i, name)| ToolCall::new(format!("call_{i}"), name, json!({"query": "q"})))
            .collect()
    })
}

fn arb_history() -> impl Strategy<Value = Vec<Message>> {
    proptest::collection::vec(
        prop_oneof![
            "[a-zA-Z ]{1,20}".prop_map(Message::human),
            "[a-zA-Z ]{1,20}".prop_map(|t| Message::ai(t, vec![])),
        ],
        0..6,
    )
}

fn arb_event() -> impl Strategy<Value = Event> {
    prop_oneof![
        "[a-zA-Z ]{1,30}".prop_map(|text| Event::UserMessage { text }),
        Just(Event::Resume),
        Just(Event::AgentFailed),
        "[a-zA-Z ]{0,30}".prop_map(|content| Event::AgentReply {
            content,
            tool_calls: vec![],
        }),
    ]
}

// ============================================================================
// Property Tests
// ============================================================================

proptest! {
    #![proptest_config(ProptestConfig::with_cases(500))]

    // Resuming a finished thread changes nothing
    #[test]
    fn prop_resume_on_ended_is_noop(history in arb_history()) {
        let result = transition(&WorkflowState::Ended, &test_context(), &history, Event::Resume)
            .unwrap();
        prop_assert_eq!(result.new_state, WorkflowState::Ended);
        prop_assert!(result.effects.is_empty());
    }

    // N tool calls yield exactly N tool messages, matched by id, for any dispatch order
    #[test]
    fn prop_every_tool_call_answered(
        calls in arb_tool_calls(4),
        order in any::<usize>(),
    ) {
        let mut outcomes: Vec<ToolOutcome> = calls
            .iter()
            .map(|c| ToolOutcome::Success {
                call_id: c.id.clone(),
                output: format!("out {}", c.id),
            })
            .collect();
        let len = outcomes.len();
        outcomes.rotate_left(order % len);

        let state = WorkflowState::Tools { step: 1, pending: calls.clone() };
        let mut history = vec![Message::ai("", calls.clone())];
        let result = apply(&state, &mut history, Event::ToolsComplete { outcomes }).unwrap();

        prop_assert_eq!(result.new_state, WorkflowState::Agent { step: 2 });
        let tool_messages: Vec<&Message> = history[1..].iter().collect();
        prop_assert_eq!(tool_messages.len(), calls.len());
        for (call, msg) in calls.iter().zip(tool_messages) {
            match msg {
                Message::Tool { tool_call_id, content } => {
                    prop_assert_eq!(tool_call_id, &call.id);
                    prop_assert_eq!(content, &format!("out {}", call.id));
                }
                other => prop_assert!(false, "Expected tool message, got {:?}", other),
            }
        }
    }

    // Any failing tool still reaches agent, with a diagnostic per call
    #[test]
    fn prop_tool_failure_never_aborts(
        calls in arb_tool_calls(4),
        failing in any::<prop::sample::Index>(),
    ) {
        let failed = failing.index(calls.len());
        let outcomes: Vec<ToolOutcome> = calls
            .iter()
            .enumerate()
            .map(|(i, c)| if i == failed {
                ToolOutcome::Failure { call_id: c.id.clone(), error: "boom".to_string() }
            } else {
                ToolOutcome::Success { call_id: c.id.clone(), output: "ok".to_string() }
            })
            .collect();

        let state = WorkflowState::Tools { step: 1, pending: calls.clone() };
        let mut history = vec![];
        let result = apply(&state, &mut history, Event::ToolsComplete { outcomes }).unwrap();

        prop_assert_eq!(result.new_state, WorkflowState::Agent { step: 2 });
        prop_assert!(result.effects.contains(&Effect::RequestLlm));
        prop_assert_eq!(history.len(), calls.len());
        for msg in &history {
            prop_assert_eq!(msg.content(), tool_error_message("boom"));
        }
    }

    // A reply without tool calls suspends and never requests the gateway again
    #[test]
    fn prop_feedback_always_suspends(content in "[a-zA-Z ]{0,30}", history in arb_history()) {
        let result = transition(
            &WorkflowState::Agent { step: 1 },
            &test_context(),
            &history,
            Event::AgentReply { content, tool_calls: vec![] },
        )
        .unwrap();
        prop_assert_eq!(result.new_state, WorkflowState::AwaitingFeedback);
        prop_assert!(!result.effects.contains(&Effect::RequestLlm));
    }

    // Request effects only appear alongside the state that awaits them
    #[test]
    fn prop_effects_match_state(events in proptest::collection::vec(arb_event(), 0..20)) {
        let mut state = WorkflowState::Idle;
        let mut history = vec![];

        for event in events {
            if let Ok(result) = apply(&state, &mut history, event) {
                if result.effects.contains(&Effect::RequestLlm) {
                    prop_assert!(
                        matches!(result.new_state, WorkflowState::Agent { .. }),
                        "RequestLlm outside agent: {:?}",
                        result.new_state
                    );
                }
                state = result.new_state;
            }
        }
    }

    // Step counter never passes the cap
    #[test]
    fn prop_step_limit_bounds_run(limit in 1u32..6, rounds in 1usize..12) {
        let ctx = RunContext::new(1, limit);
        let mut state = WorkflowState::Agent { step: 1 };
        let mut history = vec![];

        for round in 0..rounds {
            let call = ToolCall::new(format!("c{round}"), "web_search", json!({"query": "q"}));
            let reply = Event::AgentReply { content: String::new(), tool_calls: vec![call.clone()] };
            let Ok(result) = transition(&state, &ctx, &history, reply) else { break };
            state = result.new_state;

            let done = Event::ToolsComplete {
                outcomes: vec![ToolOutcome::Success { call_id: call.id, output: "x".to_string() }],
            };
            let result = transition(&state, &ctx, &history, done).unwrap();
            state = result.new_state;
            history.push(Message::tool("x", "x"));

            if let WorkflowState::Agent { step } = state {
                prop_assert!(step <= limit);
            }
        }

        if rounds >= usize::try_from(limit).unwrap_or(usize::MAX) {
            prop_assert_eq!(state, WorkflowState::Ended);
        }
    }
}
