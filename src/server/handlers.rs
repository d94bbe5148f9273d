use std::sync::Arc;

use axum::body::Bytes;
use axum::extract::State;
use axum::http::{header, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::Json;
use tracing::error;

use crate::protocol::{ErrorResponse, HealthResponse};
use crate::server::proxy::join_upstream_url;
use crate::upstream::Upstream;

/// Shared application state.
pub struct AppState {
    pub upstream: Arc<dyn Upstream>,
    pub http_client: reqwest::Client,
}

/// Health check handler.
pub async fn health(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    Json(HealthResponse {
        status: "ok".to_string(),
        upstream: Some(state.upstream.name().to_string()),
    })
}

/// CORS preflight. Succeeds unconditionally, even with no key configured.
pub async fn preflight() -> StatusCode {
    StatusCode::OK
}

/// Fallback for methods other than POST/OPTIONS on the relay route.
pub async fn method_not_allowed() -> Response {
    write_error(StatusCode::METHOD_NOT_ALLOWED, "Method not allowed")
}

/// Relay the inbound JSON body to the upstream completion endpoint,
/// injecting the credential and version headers. Exactly one outbound
/// call per inbound request; no retries.
pub async fn forward(State(state): State<Arc<AppState>>, body: Bytes) -> Response {
    let upstream = &state.upstream;

    // Checked before any network I/O so an unset key never leaves the process.
    if !upstream.has_credential() {
        error!(upstream = upstream.name(), "API key not configured");
        return write_error(StatusCode::INTERNAL_SERVER_ERROR, "API key not configured");
    }

    let upstream_url = match join_upstream_url(upstream.base_url(), upstream.completion_path()) {
        Ok(url) => url,
        Err(e) => {
            error!(
                upstream = upstream.name(),
                base_url = upstream.base_url(),
                error = %e,
                "failed to build upstream URL"
            );
            return write_error(StatusCode::INTERNAL_SERVER_ERROR, "internal error");
        }
    };

    let req_builder = state
        .http_client
        .post(&upstream_url)
        .header(header::CONTENT_TYPE, "application/json")
        .body(body);

    let mut proxy_req = match req_builder.build() {
        Ok(r) => r,
        Err(e) => {
            error!(upstream = upstream.name(), error = %e, "failed to create relay request");
            return write_error(StatusCode::INTERNAL_SERVER_ERROR, "internal error");
        }
    };

    upstream.authorize_request(proxy_req.headers_mut());

    let resp = match state.http_client.execute(proxy_req).await {
        Ok(resp) => resp,
        Err(e) => {
            error!(
                upstream = upstream.name(),
                url = upstream_url,
                error = %e,
                "upstream request failed"
            );
            return write_error(StatusCode::INTERNAL_SERVER_ERROR, "upstream request unavailable");
        }
    };

    let status = resp.status();
    if !status.is_success() {
        let detail = resp.text().await.unwrap_or_default();
        error!(
            upstream = upstream.name(),
            status = status.as_u16(),
            body = %detail,
            "upstream returned an error"
        );
        return write_error(
            StatusCode::INTERNAL_SERVER_ERROR,
            &format!("upstream error: {}", status.as_u16()),
        );
    }

    // Relay the upstream body verbatim.
    match resp.bytes().await {
        Ok(bytes) => ([(header::CONTENT_TYPE, "application/json")], bytes).into_response(),
        Err(e) => {
            error!(upstream = upstream.name(), error = %e, "failed to read upstream response");
            write_error(StatusCode::INTERNAL_SERVER_ERROR, "upstream request unavailable")
        }
    }
}

fn write_error(status: StatusCode, message: &str) -> Response {
    (
        status,
        Json(ErrorResponse {
            error: message.to_string(),
        }),
    )
        .into_response()
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;

    use axum::body::{to_bytes, Body};
    use axum::http::{header, Method, Request, StatusCode};
    use axum::Router;
    use tokio::net::TcpListener;
    use tower::ServiceExt;

    use crate::server::build_router;
    use crate::upstream::{Anthropic, AnthropicConfig};

    struct FakeUpstream {
        base_url: String,
        hits: Arc<AtomicUsize>,
    }

    /// Throwaway upstream on a random port that answers every completion
    /// request with a fixed status and body, counting the hits.
    async fn start_fake_upstream(status: StatusCode, body: &'static str) -> FakeUpstream {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        let hits = Arc::new(AtomicUsize::new(0));

        let counter = hits.clone();
        let app = Router::new().route(
            "/v1/messages",
            axum::routing::post(move || {
                let counter = counter.clone();
                async move {
                    counter.fetch_add(1, Ordering::SeqCst);
                    (status, body)
                }
            }),
        );

        tokio::spawn(async move {
            axum::serve(listener, app).await.ok();
        });

        FakeUpstream {
            base_url: format!("http://{addr}"),
            hits,
        }
    }

    fn relay_app(base_url: &str, api_key: Option<&str>, cors_enabled: bool) -> Router {
        let upstream = Arc::new(Anthropic::new(AnthropicConfig {
            base_url: Some(base_url.to_string()),
            api_key: api_key.map(Into::into),
        }));
        build_router(upstream, reqwest::Client::new(), cors_enabled)
    }

    fn post_request(body: &str) -> Request<Body> {
        Request::builder()
            .method(Method::POST)
            .uri("/api/complete")
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(body.to_string()))
            .unwrap()
    }

    async fn body_json(response: axum::response::Response) -> serde_json::Value {
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        serde_json::from_slice(&bytes).unwrap()
    }

    #[tokio::test]
    async fn test_options_ok_without_key() {
        let app = relay_app("http://127.0.0.1:9", None, true);

        let request = Request::builder()
            .method(Method::OPTIONS)
            .uri("/api/complete")
            .body(Body::empty())
            .unwrap();
        let response = app.oneshot(request).await.unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        assert!(bytes.is_empty());
    }

    #[tokio::test]
    async fn test_missing_key_returns_500_without_upstream_call() {
        let upstream = start_fake_upstream(StatusCode::OK, "{}").await;
        let app = relay_app(&upstream.base_url, None, true);

        let response = app.oneshot(post_request("{}")).await.unwrap();

        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
        let json = body_json(response).await;
        assert_eq!(json["error"], "API key not configured");
        assert_eq!(upstream.hits.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_relays_upstream_body_verbatim() {
        let upstream = start_fake_upstream(StatusCode::OK, r#"{"x":1}"#).await;
        let app = relay_app(&upstream.base_url, Some("sk-test"), true);

        let response = app.oneshot(post_request(r#"{"messages":[]}"#)).await.unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        assert_eq!(&bytes[..], br#"{"x":1}"#);
        assert_eq!(upstream.hits.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_upstream_error_status_becomes_500() {
        let upstream = start_fake_upstream(StatusCode::SERVICE_UNAVAILABLE, "overloaded").await;
        let app = relay_app(&upstream.base_url, Some("sk-test"), true);

        let response = app.oneshot(post_request("{}")).await.unwrap();

        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
        let json = body_json(response).await;
        assert_eq!(json["error"], "upstream error: 503");
    }

    #[tokio::test]
    async fn test_unreachable_upstream_becomes_500() {
        // Port 9 (discard) refuses connections on loopback.
        let app = relay_app("http://127.0.0.1:9", Some("sk-test"), true);

        let response = app.oneshot(post_request("{}")).await.unwrap();

        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
        let json = body_json(response).await;
        assert_eq!(json["error"], "upstream request unavailable");
    }

    #[tokio::test]
    async fn test_other_method_is_405() {
        let app = relay_app("http://127.0.0.1:9", Some("sk-test"), true);

        let request = Request::builder()
            .method(Method::GET)
            .uri("/api/complete")
            .body(Body::empty())
            .unwrap();
        let response = app.oneshot(request).await.unwrap();

        assert_eq!(response.status(), StatusCode::METHOD_NOT_ALLOWED);
        let json = body_json(response).await;
        assert_eq!(json["error"], "Method not allowed");
    }

    #[tokio::test]
    async fn test_cors_headers_follow_config() {
        let with_cors = relay_app("http://127.0.0.1:9", None, true);
        let response = with_cors
            .oneshot(
                Request::builder()
                    .method(Method::OPTIONS)
                    .uri("/api/complete")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(
            response.headers().get("Access-Control-Allow-Origin").unwrap(),
            "*"
        );

        let without_cors = relay_app("http://127.0.0.1:9", None, false);
        let response = without_cors
            .oneshot(
                Request::builder()
                    .method(Method::OPTIONS)
                    .uri("/api/complete")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();
        assert!(response.headers().get("Access-Control-Allow-Origin").is_none());
    }

    #[tokio::test]
    async fn test_health_reports_upstream() {
        let app = relay_app("http://127.0.0.1:9", None, true);

        let request = Request::builder()
            .uri("/health")
            .body(Body::empty())
            .unwrap();
        let response = app.oneshot(request).await.unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        let json = body_json(response).await;
        assert_eq!(json["status"], "ok");
        assert_eq!(json["upstream"], "anthropic");
    }
}
