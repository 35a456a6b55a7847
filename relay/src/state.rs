//! Shared application state for the relay.

use std::sync::Arc;

use reqwest::Client;

use crate::config::RelayConfig;

/// State injected into every handler. Holds no per-request data.
#[derive(Clone)]
pub struct AppState {
	/// Outbound HTTP client, reused for its connection pool
	pub client: Client,
}

impl AppState {
	/// Build the outbound client from the relay settings.
	pub fn new(config: &RelayConfig) -> reqwest::Result<Self> {
		let mut builder = Client::builder();
		if let Some(timeout) = config.timeout() {
			builder = builder.timeout(timeout);
		}
		Ok(Self {
			client: builder.build()?,
		})
	}
}

/// Handle shared between handlers.
pub type SharedState = Arc<AppState>;
