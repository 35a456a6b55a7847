//! Relay server entry point.
//!
//! Run with: cargo run -p iframe-canvas-relay -- --port 3001

use anyhow::Context;
use clap::Parser;
use log::info;

use iframe_canvas_relay::config::RelayConfig;
use iframe_canvas_relay::router::build_router;
use iframe_canvas_relay::state::AppState;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
	env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info"))
		.format_timestamp_millis()
		.init();

	let config = RelayConfig::parse();
	let state = AppState::new(&config).context("failed to build upstream HTTP client")?;
	let app = build_router(state);

	let addr = config.addr();
	let listener = tokio::net::TcpListener::bind(addr)
		.await
		.with_context(|| format!("failed to bind {}", addr))?;
	info!("Proxy server running on http://{}", addr);
	info!("Try accessing http://localhost:{}/test in your browser", addr.port());
	info!("CORS enabled for all origins");

	axum::serve(listener, app).await?;

	Ok(())
}
