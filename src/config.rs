//! Process configuration, read once from the environment at startup

use crate::llm::openai::DEFAULT_BASE_URL;

pub const DEFAULT_PORT: u16 = 8000;
pub const DEFAULT_MODEL: &str = "gpt-4o-mini";
pub const DEFAULT_EMBEDDING_MODEL: &str = "text-embedding-3-small";
pub const DEFAULT_MAX_AGENT_STEPS: u32 = 10;
pub const DEFAULT_SEARCH_MAX_RESULTS: u32 = 2;
pub const DEFAULT_RETRIEVAL_TOP_K: u32 = 1;

/// Everything the service needs to build its gateway, tools and server
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub port: u16,
    pub openai_api_key: Option<String>,
    pub openai_base_url: String,
    pub model: String,
    pub max_tokens: Option<u32>,
    pub max_agent_steps: u32,
    pub tavily_api_key: Option<String>,
    pub search_max_results: u32,
    pub pinecone_api_key: Option<String>,
    pub pinecone_index_host: Option<String>,
    pub embedding_model: String,
    pub retrieval_top_k: u32,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            port: DEFAULT_PORT,
            openai_api_key: None,
            openai_base_url: DEFAULT_BASE_URL.to_string(),
            model: DEFAULT_MODEL.to_string(),
            max_tokens: None,
            max_agent_steps: DEFAULT_MAX_AGENT_STEPS,
            tavily_api_key: None,
            search_max_results: DEFAULT_SEARCH_MAX_RESULTS,
            pinecone_api_key: None,
            pinecone_index_host: None,
            embedding_model: DEFAULT_EMBEDDING_MODEL.to_string(),
            retrieval_top_k: DEFAULT_RETRIEVAL_TOP_K,
        }
    }
}

impl AppConfig {
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build from an arbitrary key lookup; empty values count as unset
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());
        let parse_or = |key: &str, default: u32| {
            get(key).and_then(|v| v.parse().ok()).unwrap_or(default)
        };
        let defaults = Self::default();

        Self {
            port: get("SUPPORT_PORT")
                .and_then(|p| p.parse().ok())
                .unwrap_or(DEFAULT_PORT),
            openai_api_key: get("OPENAI_API_KEY"),
            openai_base_url: get("OPENAI_BASE_URL").unwrap_or(defaults.openai_base_url),
            model: get("SUPPORT_MODEL").unwrap_or(defaults.model),
            max_tokens: get("SUPPORT_MAX_TOKENS").and_then(|v| v.parse().ok()),
            max_agent_steps: parse_or("SUPPORT_MAX_AGENT_STEPS", DEFAULT_MAX_AGENT_STEPS).max(1),
            tavily_api_key: get("TAVILY_API_KEY"),
            search_max_results: parse_or("SUPPORT_SEARCH_MAX_RESULTS", DEFAULT_SEARCH_MAX_RESULTS),
            pinecone_api_key: get("PINECONE_API_KEY"),
            pinecone_index_host: get("PINECONE_INDEX_HOST"),
            embedding_model: get("SUPPORT_EMBEDDING_MODEL").unwrap_or(defaults.embedding_model),
            retrieval_top_k: parse_or("SUPPORT_RETRIEVAL_TOP_K", DEFAULT_RETRIEVAL_TOP_K).max(1),
        }
    }

    /// FAQ retrieval needs embeddings and an index
    pub fn retrieval_configured(&self) -> bool {
        self.openai_api_key.is_some()
            && self.pinecone_api_key.is_some()
            && self.pinecone_index_host.is_some()
    }
}
