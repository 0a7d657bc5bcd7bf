//! Web search tool backed by the Tavily search API

use super::{Tool, ToolError};
use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};

const TAVILY_ENDPOINT: &str = "https://api.tavily.com/search";
const TOOL_NAME: &str = "web_search";

pub struct WebSearchTool {
    client: Client,
    api_key: Option<String>,
    max_results: u32,
    endpoint: String,
}

#[derive(Debug, Deserialize)]
struct WebSearchInput {
    query: String,
}

impl WebSearchTool {
    pub fn new(client: Client, api_key: Option<String>, max_results: u32) -> Self {
        Self {
            client,
            api_key,
            max_results,
            endpoint: TAVILY_ENDPOINT.to_string(),
        }
    }
}

#[async_trait]
impl Tool for WebSearchTool {
    fn name(&self) -> &'static str {
        TOOL_NAME
    }

    fn description(&self) -> String {
        "A search engine optimized for comprehensive, accurate, and trusted results. Useful for answering questions about current events or public information about HappyAI that is not covered by the FAQ. Input should be a search query.".to_string()
    }

    fn input_schema(&self) -> Value {
        json!({
            "type": "object",
            "required": ["query"],
            "properties": {
                "query": {
                    "type": "string",
                    "description": "Search query to look up"
                }
            }
        })
    }

    async fn run(&self, input: Value) -> Result<String, ToolError> {
        let input: WebSearchInput =
            serde_json::from_value(input).map_err(|e| ToolError::invalid_arguments(TOOL_NAME, e))?;

        let api_key = self.api_key.as_deref().ok_or_else(|| ToolError::NotConfigured {
            tool: TOOL_NAME.to_string(),
            setting: "TAVILY_API_KEY".to_string(),
        })?;

        let response = self
            .client
            .post(&self.endpoint)
            .json(&TavilyRequest {
                api_key,
                query: &input.query,
                max_results: self.max_results,
            })
            .send()
            .await
            .map_err(|e| ToolError::request_failed(TOOL_NAME, e))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(ToolError::request_failed(
                TOOL_NAME,
                format!("HTTP {status}: {body}"),
            ));
        }

        let parsed: TavilyResponse = response
            .json()
            .await
            .map_err(|e| ToolError::request_failed(TOOL_NAME, e))?;

        tracing::debug!(query = %input.query, results = parsed.results.len(), "Web search completed");
        Ok(format_results(&parsed))
    }
}

/// Render results as a JSON list of `{url, content}` objects
fn format_results(response: &TavilyResponse) -> String {
    let results: Vec<Value> = response
        .results
        .iter()
        .map(|r| json!({ "url": r.url, "content": r.content }))
        .collect();
    Value::Array(results).to_string()
}

#[derive(Debug, Serialize)]
struct TavilyRequest<'a> {
    api_key: &'a str,
    query: &'a str,
    max_results: u32,
}

#[derive(Debug, Deserialize)]
struct TavilyResponse {
    #[serde(default)]
    results: Vec<TavilyResult>,
}

#[derive(Debug, Deserialize)]
struct TavilyResult {
    url: String,
    #[serde(default)]
    content: String,
}
