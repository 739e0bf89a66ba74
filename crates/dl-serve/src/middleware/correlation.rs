use axum::body::Body;
use axum::http::{HeaderMap, HeaderValue, Request};
use axum::middleware::Next;
use axum::response::Response;
use tracing::Instrument;
use ulid::Ulid;

pub const HEADER_NAME: &str = "x-correlation-id";

const MAX_LEN: usize = 128;

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct CorrelationId(pub String);

impl CorrelationId {
    /// Reuses the caller's id when it is short printable ASCII, otherwise
    /// mints a fresh one.
    pub fn from_headers(headers: &HeaderMap) -> Self {
        headers
            .get(HEADER_NAME)
            .and_then(|value| value.to_str().ok())
            .map(str::trim)
            .filter(|value| {
                !value.is_empty()
                    && value.len() <= MAX_LEN
                    && value.bytes().all(|byte| byte.is_ascii_graphic())
            })
            .map_or_else(Self::generate, |value| Self(value.to_string()))
    }

    pub fn generate() -> Self {
        Self(format!("corr_{}", Ulid::new()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

/// Tags the request with a correlation id, runs it inside a span carrying
/// that id, and echoes the id on the response.
pub async fn correlation_middleware(mut request: Request<Body>, next: Next) -> Response {
    let correlation = CorrelationId::from_headers(request.headers());
    let span = tracing::info_span!(
        "request",
        correlation_id = %correlation.as_str(),
        method = %request.method(),
        path = %request.uri().path()
    );
    request.extensions_mut().insert(correlation.clone());

    let mut response = next.run(request).instrument(span).await;
    if let Ok(value) = HeaderValue::from_str(correlation.as_str()) {
        response.headers_mut().insert(HEADER_NAME, value);
    }
    response
}

#[cfg(test)]
mod tests {
    use super::*;

    fn headers(value: &str) -> HeaderMap {
        let mut headers = HeaderMap::new();
        headers.insert(HEADER_NAME, HeaderValue::from_str(value).unwrap());
        headers
    }

    #[test]
    fn keeps_supplied_id() {
        let id = CorrelationId::from_headers(&headers("  req-42 "));
        assert_eq!(id.as_str(), "req-42");
    }

    #[test]
    fn mints_id_when_missing_or_unusable() {
        assert!(CorrelationId::from_headers(&HeaderMap::new())
            .as_str()
            .starts_with("corr_"));
        assert!(CorrelationId::from_headers(&headers("has space"))
            .as_str()
            .starts_with("corr_"));
        let long = "x".repeat(MAX_LEN + 1);
        assert!(CorrelationId::from_headers(&headers(&long))
            .as_str()
            .starts_with("corr_"));
    }
}
