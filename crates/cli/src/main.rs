//! PolicyLens entry point.
//!
//! This binary is the composition root for the entire system. Responsibilities:
//!
//! 1. **Parse configuration**: flags and environment variables via `clap`,
//!    mapped into the typed configs owned by each crate and validated before
//!    anything starts.
//! 2. **Wire observability**: `tracing-subscriber` with an `EnvFilter`, a JSON
//!    (or pretty) formatter and, when an endpoint is given, an OpenTelemetry
//!    OTLP exporter. All spans and events from every crate in the workspace
//!    flow through these layers.
//! 3. **Construct infrastructure**: the `OpenAiClient`, the in-memory counter
//!    cache and the tracing observer, injected into `PolicyAnalyzer` and the
//!    HTTP `AppState`.
//! 4. **Serve** until Ctrl+C or SIGTERM.

mod args;
mod telemetry;

use std::sync::Arc;

use anyhow::Context;
use clap::Parser;

use analyzer::{PolicyAnalyzer, TracingObserver};
use listener::{AppState, MemoryCounterCache};
use llm::OpenAiClient;

use crate::args::Args;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = Args::parse();
    let _telemetry = telemetry::init(args.log_format, args.otlp_endpoint.as_deref())?;

    let client_config = args.client_config()?;
    client_config
        .validate(args.invocation_deadline())
        .context("invalid LLM client configuration")?;
    let model_config = args.model_config()?;
    let server_config = args.server_config()?;
    server_config
        .validate()
        .context("invalid server configuration")?;

    if server_config.demo_password().is_none() {
        tracing::warn!("No demo password configured; /analyze is open to every caller");
    }
    if server_config.rate_limit().is_none() {
        tracing::warn!("Rate limiting is disabled");
    }
    tracing::info!(
        model = model_config.model(),
        endpoint = client_config.endpoint(),
        "Configured LLM provider"
    );

    let provider = OpenAiClient::new(client_config, model_config)
        .context("failed to construct LLM client")?;
    let analyzer = PolicyAnalyzer::new(Arc::new(provider), Arc::new(TracingObserver));
    let state = AppState::new(
        analyzer,
        Arc::new(MemoryCounterCache::new()),
        server_config,
    );

    let socket = tokio::net::TcpListener::bind(args.bind)
        .await
        .with_context(|| format!("failed to bind {}", args.bind))?;
    listener::serve(socket, state)
        .await
        .context("HTTP server terminated with an error")?;

    tracing::info!("PolicyLens stopped");
    Ok(())
}
