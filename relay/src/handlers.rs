//! Route handlers.

use axum::extract::{RawQuery, State};
use axum::http::StatusCode;
use axum::http::header::{
	ACCESS_CONTROL_ALLOW_ORIGIN, CONTENT_SECURITY_POLICY, CONTENT_TYPE, X_FRAME_OPTIONS,
};
use axum::response::IntoResponse;
use log::{debug, info};
use url::{Url, form_urlencoded};

use crate::error::{RelayError, Result};
use crate::state::SharedState;

/// Body returned by `GET /test`.
pub const TEST_MESSAGE: &str = "Proxy server is working!";

/// Header overrides that make a fetched page frameable from any origin.
pub const FRAME_HEADERS: [(axum::http::HeaderName, &str); 4] = [
	(CONTENT_TYPE, "text/html"),
	(ACCESS_CONTROL_ALLOW_ORIGIN, "*"),
	(X_FRAME_OPTIONS, "ALLOWALL"),
	(CONTENT_SECURITY_POLICY, "frame-ancestors 'self' *"),
];

/// `GET /test`
pub async fn test_route() -> impl IntoResponse {
	info!("Test route hit");
	(StatusCode::OK, [(CONTENT_TYPE, "text/plain")], TEST_MESSAGE)
}

/// `GET /proxy?url=<target>`
///
/// Issues a single GET to `target` and hands its body back with the
/// framing restrictions lifted. No retries; a non-success upstream status is
/// treated as a failure.
pub async fn proxy(
	State(state): State<SharedState>,
	RawQuery(query): RawQuery,
) -> Result<impl IntoResponse> {
	let target = target_param(query.as_deref()).ok_or(RelayError::MissingUrl)?;
	info!("Proxy request for {}", target);

	let url = Url::parse(&target).map_err(|source| RelayError::InvalidUrl {
		url: target.clone(),
		source,
	})?;

	let response = state.client.get(url).send().await?;
	let status = response.status();
	debug!("Upstream {} responded with {}", target, status);
	if !status.is_success() {
		return Err(RelayError::Status {
			url: target,
			status,
		});
	}

	let body = response.text().await?;
	info!("Relaying {} bytes from {}", body.len(), target);

	Ok((FRAME_HEADERS, body))
}

/// Pull a non-blank `url` value out of a raw query string.
fn target_param(query: Option<&str>) -> Option<String> {
	form_urlencoded::parse(query?.as_bytes())
		.find(|(key, _)| key == "url")
		.map(|(_, value)| value.trim().to_owned())
		.filter(|value| !value.is_empty())
}
