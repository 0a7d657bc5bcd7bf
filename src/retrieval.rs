//! Vector-similarity lookup over the FAQ index
//!
//! The index itself (documents, embeddings, upserts) is owned by Pinecone;
//! this client only embeds a query and reads back the closest passages.

use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum RetrievalError {
    #[error("Embedding request failed: {0}")]
    Embedding(String),
    #[error("Index query failed: {0}")]
    Query(String),
    #[error("Unexpected response: {0}")]
    BadResponse(String),
}

/// A passage returned by the index
#[derive(Debug, Clone, PartialEq)]
pub struct Document {
    pub id: String,
    pub text: String,
    pub score: f32,
}

/// Similarity search over the FAQ documents
#[async_trait]
pub trait Retriever: Send + Sync {
    async fn retrieve(&self, query: &str) -> Result<Vec<Document>, RetrievalError>;
}

/// OpenAI embeddings + Pinecone query
pub struct PineconeRetriever {
    client: Client,
    openai_api_key: String,
    embeddings_url: String,
    embedding_model: String,
    pinecone_api_key: String,
    query_url: String,
    top_k: u32,
}

impl PineconeRetriever {
    pub fn new(
        client: Client,
        openai_api_key: String,
        openai_base_url: &str,
        embedding_model: String,
        pinecone_api_key: String,
        index_host: &str,
        top_k: u32,
    ) -> Self {
        Self {
            client,
            openai_api_key,
            embeddings_url: format!("{}/embeddings", openai_base_url.trim_end_matches('/')),
            embedding_model,
            pinecone_api_key,
            query_url: query_url(index_host),
            top_k,
        }
    }

    async fn embed(&self, query: &str) -> Result<Vec<f32>, RetrievalError> {
        let response = self
            .client
            .post(&self.embeddings_url)
            .bearer_auth(&self.openai_api_key)
            .json(&EmbeddingRequest {
                model: &self.embedding_model,
                input: query,
            })
            .send()
            .await
            .map_err(|e| RetrievalError::Embedding(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(RetrievalError::Embedding(format!("HTTP {status}: {body}")));
        }

        let parsed: EmbeddingResponse = response
            .json()
            .await
            .map_err(|e| RetrievalError::BadResponse(e.to_string()))?;

        parsed
            .data
            .into_iter()
            .next()
            .map(|d| d.embedding)
            .ok_or_else(|| RetrievalError::BadResponse("no embedding returned".to_string()))
    }
}

#[async_trait]
impl Retriever for PineconeRetriever {
    async fn retrieve(&self, query: &str) -> Result<Vec<Document>, RetrievalError> {
        let vector = self.embed(query).await?;

        let response = self
            .client
            .post(&self.query_url)
            .header("Api-Key", &self.pinecone_api_key)
            .json(&QueryRequest {
                vector,
                top_k: self.top_k,
                include_metadata: true,
            })
            .send()
            .await
            .map_err(|e| RetrievalError::Query(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(RetrievalError::Query(format!("HTTP {status}: {body}")));
        }

        let parsed: QueryResponse = response
            .json()
            .await
            .map_err(|e| RetrievalError::BadResponse(e.to_string()))?;

        tracing::debug!(matches = parsed.matches.len(), "FAQ index queried");
        Ok(parsed.into_documents())
    }
}

fn query_url(index_host: &str) -> String {
    let host = index_host.trim_end_matches('/');
    if host.starts_with("http://") || host.starts_with("https://") {
        format!("{host}/query")
    } else {
        format!("https://{host}/query")
    }
}

/// Join passages the way they are handed to the model
pub fn format_documents(docs: &[Document]) -> String {
    docs.iter()
        .map(|d| d.text.trim())
        .filter(|t| !t.is_empty())
        .collect::<Vec<_>>()
        .join("\n\n")
}

// ============================================================================
// Wire types
// ============================================================================

#[derive(Debug, Serialize)]
struct EmbeddingRequest<'a> {
    model: &'a str,
    input: &'a str,
}

#[derive(Debug, Deserialize)]
struct EmbeddingResponse {
    data: Vec<EmbeddingData>,
}

#[derive(Debug, Deserialize)]
struct EmbeddingData {
    embedding: Vec<f32>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct QueryRequest {
    vector: Vec<f32>,
    top_k: u32,
    include_metadata: bool,
}

#[derive(Debug, Deserialize)]
struct QueryResponse {
    #[serde(default)]
    matches: Vec<QueryMatch>,
}

#[derive(Debug, Deserialize)]
struct QueryMatch {
    id: String,
    #[serde(default)]
    score: f32,
    #[serde(default)]
    metadata: Option<Value>,
}

impl QueryResponse {
    fn into_documents(self) -> Vec<Document> {
        self.matches
            .into_iter()
            .filter_map(|m| {
                let text = m.metadata.as_ref()?.get("text")?.as_str()?.to_string();
                Some(Document {
                    id: m.id,
                    text,
                    score: m.score,
                })
            })
            .collect()
    }
}
