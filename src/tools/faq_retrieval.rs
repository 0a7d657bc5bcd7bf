//! FAQ retrieval tool - answers questions about HappyAI from the indexed FAQ

use super::{Tool, ToolError};
use crate::retrieval::{format_documents, Retriever};
use async_trait::async_trait;
use serde::Deserialize;
use serde_json::{json, Value};
use std::sync::Arc;

const TOOL_NAME: &str = "retrieve_faq_info";
const NO_RESULTS: &str = "No relevant information found.";

pub struct FaqRetrievalTool {
    retriever: Option<Arc<dyn Retriever>>,
}

#[derive(Debug, Deserialize)]
struct FaqInput {
    question: String,
}

impl FaqRetrievalTool {
    pub fn new(retriever: Option<Arc<dyn Retriever>>) -> Self {
        Self { retriever }
    }
}

#[async_trait]
impl Tool for FaqRetrievalTool {
    fn name(&self) -> &'static str {
        TOOL_NAME
    }

    fn description(&self) -> String {
        "Retrieves information about the HappyAI platform from relevant documents. Use this tool to answer queries about HappyAI, such as: \"What are HappyAI's main services?\", \"How long has HappyAI been operating?\", \"What is HappyAI's expertise?\"".to_string()
    }

    fn input_schema(&self) -> Value {
        json!({
            "type": "object",
            "required": ["question"],
            "properties": {
                "question": {
                    "type": "string",
                    "description": "The query about HappyAI to look up"
                }
            }
        })
    }

    async fn run(&self, input: Value) -> Result<String, ToolError> {
        let input: FaqInput =
            serde_json::from_value(input).map_err(|e| ToolError::invalid_arguments(TOOL_NAME, e))?;

        let retriever = self.retriever.as_ref().ok_or_else(|| ToolError::NotConfigured {
            tool: TOOL_NAME.to_string(),
            setting: "PINECONE_API_KEY/PINECONE_INDEX_HOST".to_string(),
        })?;

        let docs = retriever
            .retrieve(&input.question)
            .await
            .map_err(|e| ToolError::request_failed(TOOL_NAME, e))?;

        tracing::debug!(
            matches = docs.len(),
            ids = ?docs.iter().map(|d| d.id.as_str()).collect::<Vec<_>>(),
            top_score = docs.first().map(|d| d.score),
            "FAQ documents retrieved"
        );

        let text = format_documents(&docs);
        if text.is_empty() {
            Ok(NO_RESULTS.to_string())
        } else {
            Ok(text)
        }
    }
}
