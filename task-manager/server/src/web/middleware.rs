use axum::extract::Request;
use axum::http::header;
use axum::middleware::Next;
use axum::response::{IntoResponse, Redirect, Response};

/// Header set by reverse proxies to the scheme the client used.
const FORWARDED_PROTO: &str = "x-forwarded-proto";

/// Redirects requests that reached the proxy over plain HTTP to their HTTPS URL.
///
/// Requests without `X-Forwarded-Proto: http` or without a `Host` header pass through.
pub async fn https_redirect_middleware(request: Request, next: Next) -> Response {
    let forwarded_over_http = request
        .headers()
        .get(FORWARDED_PROTO)
        .and_then(|value| value.to_str().ok())
        .is_some_and(|proto| proto.eq_ignore_ascii_case("http"));
    if !forwarded_over_http {
        return next.run(request).await;
    }

    let Some(host) = request
        .headers()
        .get(header::HOST)
        .and_then(|value| value.to_str().ok())
    else {
        return next.run(request).await;
    };

    let path_and_query = request
        .uri()
        .path_and_query()
        .map(|path_and_query| path_and_query.as_str())
        .unwrap_or("/");
    let location = format!("https://{}{}", host, path_and_query);
    tracing::debug!("Redirecting plain HTTP request to {}", location);
    Redirect::permanent(&location).into_response()
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::Router;
    use axum::body::Body;
    use axum::http::{Request, StatusCode};
    use axum::middleware::from_fn;
    use tower::ServiceExt;

    fn app() -> Router {
        Router::new()
            .route("/test", axum::routing::get(|| async { "test response" }))
            .layer(from_fn(https_redirect_middleware))
    }

    #[tokio::test]
    async fn can_redirect_forwarded_http_request() {
        let response = app()
            .oneshot(
                Request::builder()
                    .uri("/test?page=2")
                    .header("host", "tasks.example.com")
                    .header("x-forwarded-proto", "http")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::PERMANENT_REDIRECT);
        assert_eq!(
            response.headers().get("location"),
            Some(&axum::http::HeaderValue::from_static(
                "https://tasks.example.com/test?page=2"
            ))
        );
    }

    #[tokio::test]
    async fn can_pass_through_forwarded_https_request() {
        let response = app()
            .oneshot(
                Request::builder()
                    .uri("/test")
                    .header("host", "tasks.example.com")
                    .header("x-forwarded-proto", "https")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
    }

    #[tokio::test]
    async fn can_pass_through_request_without_forwarding_headers() {
        let response = app()
            .oneshot(
                Request::builder()
                    .uri("/test")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        let body = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        assert_eq!(&body[..], b"test response");
    }
}
