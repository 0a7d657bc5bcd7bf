//! Property-based tests for the `OpenAI` translation layer
//!
//! - Tool calls survive the trip to the wire format and back
//! - Tool calls with empty names are dropped
//! - Unparseable arguments become an empty object
//! - Assistant turns are never sent without content or tool calls

use super::{
    OpenAIChoice, OpenAIFunctionCall, OpenAIMessage, OpenAIResponse, OpenAIService, OpenAIToolCall,
};
use crate::llm::{Message, ToolCall};
use proptest::prelude::*;
use serde_json::{json, Value};

// ============================================================================
// Strategies
// ============================================================================

/// Small JSON object, as tool arguments always are
fn arb_args() -> impl Strategy<Value = Value> {
    proptest::collection::hash_map("[a-z_]{1,10}", "[a-zA-Z0-9 ]{0,30}", 0..4).prop_map(|m| {
        Value::Object(m.into_iter().map(|(k, v)| (k, Value::String(v))).collect())
    })
}

fn arb_tool_calls() -> impl Strategy<Value = Vec<ToolCall>> {
    proptest::collection::vec(("[a-z0-9_]{5,20}", "[a-z_]{3,20}", arb_args()), 0..4).prop_map(
        |calls| {
            calls
                .into_iter()
                .map(|(id, name, args)| ToolCall::new(id, name, args))
                .collect()
        },
    )
}

fn response_with(message: OpenAIMessage) -> OpenAIResponse {
    OpenAIResponse {
        choices: vec![OpenAIChoice { message }],
        usage: None,
    }
}

fn wire_call(id: &str, name: &str, arguments: &str) -> OpenAIToolCall {
    OpenAIToolCall {
        id: id.to_string(),
        r#type: "function".to_string(),
        function: OpenAIFunctionCall {
            name: name.to_string(),
            arguments: arguments.to_string(),
        },
    }
}

// ============================================================================
// Properties
// ============================================================================

proptest! {
    #[test]
    fn prop_ai_turn_survives_wire_format(
        content in "[a-zA-Z0-9 .,!?]{0,80}",
        calls in arb_tool_calls(),
    ) {
        let wire = OpenAIService::translate_message(&Message::ai(content.clone(), calls.clone()));
        let back = OpenAIService::normalize_response(response_with(wire)).unwrap();

        prop_assert_eq!(back.content, content);
        prop_assert_eq!(back.tool_calls, calls);
    }

    #[test]
    fn prop_assistant_turn_never_empty(
        content in "[a-zA-Z ]{0,20}",
        calls in arb_tool_calls(),
    ) {
        let wire = OpenAIService::translate_message(&Message::ai(content, calls));
        prop_assert_eq!(wire.role.as_str(), "assistant");
        prop_assert!(wire.content.is_some() || wire.tool_calls.is_some());
    }

    #[test]
    fn prop_empty_tool_names_dropped(
        named in proptest::collection::vec("[a-z_]{3,12}", 0..3),
        unnamed in 0usize..3,
    ) {
        let mut wire_calls: Vec<OpenAIToolCall> = named
            .iter()
            .enumerate()
            .map(|(i, name)| wire_call(&format!("call_{i}"), name, "{}"))
            .collect();
        wire_calls.extend((0..unnamed).map(|i| wire_call(&format!("anon_{i}"), "", "{}")));

        let message = OpenAIMessage {
            role: "assistant".to_string(),
            content: None,
            tool_calls: Some(wire_calls),
            tool_call_id: None,
        };
        let resp = OpenAIService::normalize_response(response_with(message)).unwrap();

        prop_assert_eq!(resp.tool_calls.len(), named.len());
        prop_assert!(resp.tool_calls.iter().all(|c| !c.name.is_empty()));
    }

    #[test]
    fn prop_bad_arguments_become_empty_object(garbage in "[a-z{\\[ ]{1,20}") {
        prop_assume!(serde_json::from_str::<Value>(&garbage).is_err());

        let message = OpenAIMessage {
            role: "assistant".to_string(),
            content: None,
            tool_calls: Some(vec![wire_call("call_1", "web_search", &garbage)]),
            tool_call_id: None,
        };
        let resp = OpenAIService::normalize_response(response_with(message)).unwrap();
        prop_assert_eq!(&resp.tool_calls[0].args, &json!({}));
    }
}
