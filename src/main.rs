//! HappyAI support chat service
//!
//! Routes customer messages through a tool-augmented agent workflow
//! (agent, tools, human feedback) and returns the generated reply.

mod api;
mod checkpoint;
mod config;
mod llm;
mod retrieval;
mod runtime;
mod state_machine;
mod system_prompt;
mod tools;

use api::{create_router, AppState};
use checkpoint::MemoryCheckpointStore;
use config::AppConfig;
use llm::{LlmService, LoggingService, OpenAIService};
use runtime::{BoundGateway, WorkflowManager};
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;
use tools::ToolSet;
use tower::ServiceBuilder;
use tower_http::{
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Initialize logging
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "happyai_support=info,tower_http=debug".into()),
        )
        .with(
            tracing_subscriber::fmt::layer()
                .json()
                .with_current_span(false)
                .with_span_list(false),
        )
        .init();

    let config = AppConfig::from_env();

    // Model gateway
    let api_key = config.openai_api_key.clone().unwrap_or_else(|| {
        tracing::warn!("OPENAI_API_KEY not set; chat requests will fail");
        String::new()
    });
    let openai = OpenAIService::new(api_key, config.model.clone(), &config.openai_base_url)?;
    let service: Arc<dyn LlmService> = Arc::new(LoggingService::new(Arc::new(openai)));

    // Tools share one HTTP client
    let http = reqwest::Client::builder()
        .timeout(Duration::from_secs(30))
        .build()?;
    let tool_set = Arc::new(ToolSet::standard(&config, &http));

    let gateway = BoundGateway::new(service, tool_set.definitions())
        .with_max_tokens(config.max_tokens);

    let tool_names: Vec<String> = tool_set.definitions().into_iter().map(|t| t.name).collect();
    let manager = WorkflowManager::new(
        Arc::new(gateway),
        tool_set,
        Arc::new(MemoryCheckpointStore::new()),
        config.max_agent_steps,
    );

    tracing::info!(
        model = %manager.model_id(),
        tools = ?tool_names,
        max_agent_steps = config.max_agent_steps,
        faq_retrieval = config.retrieval_configured(),
        "Support agent initialized"
    );

    let state = AppState::new(Arc::new(manager));

    // Create router
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    let app = create_router(state).layer(
        ServiceBuilder::new()
            .layer(TraceLayer::new_for_http())
            .layer(cors),
    );

    // Start server
    let addr = SocketAddr::from(([0, 0, 0, 0], config.port));
    tracing::info!("HappyAI support server listening on {}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
