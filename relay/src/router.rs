//! Axum router for the relay.

use std::sync::Arc;

use axum::Router;
use axum::http::header::{ACCESS_CONTROL_ALLOW_HEADERS, ACCESS_CONTROL_ALLOW_METHODS, CONTENT_TYPE};
use axum::http::{HeaderValue, Method};
use axum::routing::get;
use tower_http::cors::{Any, CorsLayer};
use tower_http::set_header::SetResponseHeaderLayer;

use crate::handlers::{proxy, test_route};
use crate::state::{AppState, SharedState};

/// CORS policy applied to every route: any origin, the common verbs, and
/// `Content-Type` as a request header.
pub fn cors_layer() -> CorsLayer {
	CorsLayer::new()
		.allow_origin(Any)
		.allow_methods([
			Method::GET,
			Method::HEAD,
			Method::PUT,
			Method::PATCH,
			Method::POST,
			Method::DELETE,
		])
		.allow_headers([CONTENT_TYPE])
}

/// Methods advertised by the CORS policy.
pub const ALLOWED_METHODS: &str = "GET,HEAD,PUT,PATCH,POST,DELETE";

/// Build the relay router.
pub fn build_router(state: AppState) -> Router {
	let shared: SharedState = Arc::new(state);

	Router::new()
		.route("/test", get(test_route))
		.route("/proxy", get(proxy))
		.layer(cors_layer())
		// the CORS layer only answers these on preflight
		.layer(SetResponseHeaderLayer::if_not_present(
			ACCESS_CONTROL_ALLOW_METHODS,
			HeaderValue::from_static(ALLOWED_METHODS),
		))
		.layer(SetResponseHeaderLayer::if_not_present(
			ACCESS_CONTROL_ALLOW_HEADERS,
			HeaderValue::from_static("Content-Type"),
		))
		.with_state(shared)
}

#[cfg(test)]
mod tests {
	use std::net::SocketAddr;

	use axum::body::{Body, to_bytes};
	use axum::http::{Request, StatusCode, header};
	use axum::response::Response;
	use serde_json::Value;
	use tower::ServiceExt;
	use url::form_urlencoded;

	use super::*;
	use crate::config::RelayConfig;
	use crate::handlers::TEST_MESSAGE;

	const PAGE: &str = "<html><body><h1>upstream page</h1></body></html>";

	fn app() -> Router {
		build_router(AppState::new(&RelayConfig::default()).unwrap())
	}

	/// Local stand-in for a remote site, with framing headers the relay must drop.
	async fn spawn_upstream() -> SocketAddr {
		let upstream = Router::new()
			.route(
				"/page",
				get(|| async {
					(
						[
							(header::X_FRAME_OPTIONS, "DENY"),
							(header::CONTENT_SECURITY_POLICY, "frame-ancestors 'none'"),
						],
						PAGE,
					)
				}),
			)
			.route(
				"/missing",
				get(|| async { (StatusCode::NOT_FOUND, "no such page") }),
			);
		let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
		let addr = listener.local_addr().unwrap();
		tokio::spawn(async move {
			axum::serve(listener, upstream).await.unwrap();
		});
		addr
	}

	fn proxy_uri(target: &str) -> String {
		let encoded: String = form_urlencoded::byte_serialize(target.as_bytes()).collect();
		format!("/proxy?url={}", encoded)
	}

	async fn get_path(app: Router, uri: &str) -> Response {
		app.oneshot(Request::builder().uri(uri).body(Body::empty()).unwrap())
			.await
			.unwrap()
	}

	async fn body_text(response: Response) -> String {
		let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
		String::from_utf8(bytes.to_vec()).unwrap()
	}

	async fn error_message(response: Response) -> String {
		let json: Value = serde_json::from_str(&body_text(response).await).unwrap();
		json["error"].as_str().unwrap().to_owned()
	}

	#[tokio::test]
	async fn test_route_answers() {
		let response = get_path(app(), "/test").await;
		assert_eq!(response.status(), StatusCode::OK);
		assert_eq!(body_text(response).await, TEST_MESSAGE);
	}

	#[tokio::test]
	async fn proxy_without_url_is_500() {
		let response = get_path(app(), "/proxy").await;
		assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
		assert_eq!(error_message(response).await, "URL parameter is required");

		let response = get_path(app(), "/proxy?url=").await;
		assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
	}

	#[tokio::test]
	async fn proxy_relays_body_with_frame_headers() {
		let addr = spawn_upstream().await;
		let response = get_path(app(), &proxy_uri(&format!("http://{}/page", addr))).await;

		assert_eq!(response.status(), StatusCode::OK);
		let headers = response.headers();
		assert_eq!(headers[header::CONTENT_TYPE], "text/html");
		assert_eq!(headers[header::ACCESS_CONTROL_ALLOW_ORIGIN], "*");
		assert_eq!(headers[header::X_FRAME_OPTIONS], "ALLOWALL");
		assert_eq!(
			headers[header::CONTENT_SECURITY_POLICY],
			"frame-ancestors 'self' *"
		);
		assert_eq!(body_text(response).await, PAGE);
	}

	#[tokio::test]
	async fn upstream_error_status_is_500() {
		let addr = spawn_upstream().await;
		let response = get_path(app(), &proxy_uri(&format!("http://{}/missing", addr))).await;

		assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
		assert!(error_message(response).await.contains("404"));
	}

	#[tokio::test]
	async fn unreachable_upstream_is_500() {
		let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
		let addr = listener.local_addr().unwrap();
		drop(listener);

		let response = get_path(app(), &proxy_uri(&format!("http://{}/", addr))).await;
		assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
		assert!(!error_message(response).await.is_empty());
	}

	#[tokio::test]
	async fn relative_url_is_500() {
		let response = get_path(app(), &proxy_uri("example.com/page")).await;
		assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
		assert!(error_message(response).await.starts_with("Invalid URL"));
	}

	#[tokio::test]
	async fn cors_headers_on_every_route() {
		let response = app()
			.oneshot(
				Request::builder()
					.uri("/test")
					.header(header::ORIGIN, "http://localhost:8080")
					.body(Body::empty())
					.unwrap(),
			)
			.await
			.unwrap();
		assert_eq!(response.headers()[header::ACCESS_CONTROL_ALLOW_ORIGIN], "*");
	}

	#[tokio::test]
	async fn cors_methods_and_headers_on_plain_responses() {
		let response = get_path(app(), "/proxy").await;
		assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
		let headers = response.headers();
		assert_eq!(headers[header::ACCESS_CONTROL_ALLOW_ORIGIN], "*");
		assert_eq!(headers[header::ACCESS_CONTROL_ALLOW_METHODS], ALLOWED_METHODS);
		assert_eq!(headers[header::ACCESS_CONTROL_ALLOW_HEADERS], "Content-Type");
	}

	#[tokio::test]
	async fn preflight_allows_content_type() {
		let response = app()
			.oneshot(
				Request::builder()
					.method(Method::OPTIONS)
					.uri("/proxy")
					.header(header::ORIGIN, "http://localhost:8080")
					.header(header::ACCESS_CONTROL_REQUEST_METHOD, "GET")
					.header(header::ACCESS_CONTROL_REQUEST_HEADERS, "content-type")
					.body(Body::empty())
					.unwrap(),
			)
			.await
			.unwrap();
		assert!(response.status().is_success());
		let allowed = response.headers()[header::ACCESS_CONTROL_ALLOW_METHODS]
			.to_str()
			.unwrap()
			.to_owned();
		assert!(allowed.contains("GET"));
		assert!(allowed.contains("DELETE"));
		assert_eq!(
			response.headers()[header::ACCESS_CONTROL_ALLOW_HEADERS],
			"content-type"
		);
	}
}
