//! Tools bound to the support agent
//!
//! Each tool takes structured JSON arguments and returns text. Failures are
//! returned as `ToolError`; the workflow turns them into diagnostics for the
//! model instead of failing the request.

mod faq_retrieval;
mod web_search;

pub use faq_retrieval::FaqRetrievalTool;
pub use web_search::WebSearchTool;

use crate::config::AppConfig;
use crate::llm::{ToolCall, ToolDefinition};
use crate::retrieval::PineconeRetriever;
use async_trait::async_trait;
use reqwest::Client;
use serde_json::Value;
use std::sync::Arc;
use thiserror::Error;

/// Error raised by a tool invocation
#[derive(Debug, Clone, Error)]
pub enum ToolError {
    #[error("Invalid arguments for {tool}: {message}")]
    InvalidArguments { tool: String, message: String },
    #[error("Unknown tool: {0}")]
    UnknownTool(String),
    #[error("{tool} is not configured (missing {setting})")]
    NotConfigured { tool: String, setting: String },
    #[error("{tool} request failed: {message}")]
    RequestFailed { tool: String, message: String },
}

impl ToolError {
    pub fn invalid_arguments(tool: &str, err: impl std::fmt::Display) -> Self {
        Self::InvalidArguments {
            tool: tool.to_string(),
            message: err.to_string(),
        }
    }

    pub fn request_failed(tool: &str, err: impl std::fmt::Display) -> Self {
        Self::RequestFailed {
            tool: tool.to_string(),
            message: err.to_string(),
        }
    }
}

/// Trait for tools that can be executed by the agent
#[async_trait]
pub trait Tool: Send + Sync {
    /// Tool name
    fn name(&self) -> &str;

    /// Tool description for LLM
    fn description(&self) -> String;

    /// JSON schema for tool input
    fn input_schema(&self) -> Value;

    /// Execute the tool
    async fn run(&self, input: Value) -> Result<String, ToolError>;
}

/// Collection of tools available to the agent
///
/// Built once at startup and shared by every run.
pub struct ToolSet {
    tools: Vec<Arc<dyn Tool>>,
}

impl ToolSet {
    pub fn new(tools: Vec<Arc<dyn Tool>>) -> Self {
        Self { tools }
    }

    /// Web search plus FAQ retrieval, wired from configuration
    pub fn standard(config: &AppConfig, client: &Client) -> Self {
        if config.tavily_api_key.is_none() {
            tracing::warn!("TAVILY_API_KEY not set; web_search calls will fail");
        }

        let retriever = match (
            &config.openai_api_key,
            &config.pinecone_api_key,
            &config.pinecone_index_host,
        ) {
            (Some(openai_key), Some(pinecone_key), Some(host)) => {
                let retriever: Arc<dyn crate::retrieval::Retriever> =
                    Arc::new(PineconeRetriever::new(
                        client.clone(),
                        openai_key.clone(),
                        &config.openai_base_url,
                        config.embedding_model.clone(),
                        pinecone_key.clone(),
                        host,
                        config.retrieval_top_k,
                    ));
                Some(retriever)
            }
            _ => {
                tracing::warn!(
                    "FAQ retrieval not configured (OPENAI_API_KEY, PINECONE_API_KEY, PINECONE_INDEX_HOST); retrieve_faq_info calls will fail"
                );
                None
            }
        };

        Self::new(vec![
            Arc::new(WebSearchTool::new(
                client.clone(),
                config.tavily_api_key.clone(),
                config.search_max_results,
            )),
            Arc::new(FaqRetrievalTool::new(retriever)),
        ])
    }

    /// Get all tool definitions for LLM
    pub fn definitions(&self) -> Vec<ToolDefinition> {
        self.tools
            .iter()
            .map(|t| ToolDefinition {
                name: t.name().to_string(),
                description: t.description(),
                input_schema: t.input_schema(),
            })
            .collect()
    }

    /// Execute a requested call against the named tool
    pub async fn execute(&self, call: &ToolCall) -> Result<String, ToolError> {
        let tool = self
            .tools
            .iter()
            .find(|t| t.name() == call.name)
            .ok_or_else(|| ToolError::UnknownTool(call.name.clone()))?;
        tool.run(call.args.clone()).await
    }
}
