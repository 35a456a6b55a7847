//! Relay error type.
//!
//! Every failure is reported to the caller the same way: `500` with a JSON
//! body `{"error": "<message>"}`.

use axum::Json;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use log::error;
use serde_json::json;
use thiserror::Error;

/// Result alias for relay handlers.
pub type Result<T> = std::result::Result<T, RelayError>;

/// Failure while serving a proxy request.
#[derive(Debug, Error)]
pub enum RelayError {
	/// The `url` query parameter was absent or blank.
	#[error("URL parameter is required")]
	MissingUrl,

	/// The `url` parameter is not an absolute URL.
	#[error("Invalid URL {url}: {source}")]
	InvalidUrl {
		/// The rejected value
		url: String,
		/// Parser error
		source: url::ParseError,
	},

	/// The upstream request could not be sent or its body not read.
	#[error("{0}")]
	Upstream(#[from] reqwest::Error),

	/// The upstream answered with a non-success status.
	#[error("Upstream {url} responded with {status}")]
	Status {
		/// Requested URL
		url: String,
		/// Status the upstream returned
		status: reqwest::StatusCode,
	},
}

impl IntoResponse for RelayError {
	fn into_response(self) -> Response {
		error!("Proxy error: {}", self);
		(
			StatusCode::INTERNAL_SERVER_ERROR,
			Json(json!({ "error": self.to_string() })),
		)
			.into_response()
	}
}
