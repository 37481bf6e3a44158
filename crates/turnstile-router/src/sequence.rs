//! Sources of counter values.
//!
//! A `SequenceSource` hands out the pre-increment value of a durable named
//! counter. The router is written against this trait so that it can run in
//! the same process as the counter actor or talk to it over HTTP.

use async_trait::async_trait;
use bytes::Bytes;
use http_body_util::{BodyExt, Empty};
use percent_encoding::{NON_ALPHANUMERIC, utf8_percent_encode};
use serde::Deserialize;
use tracing::debug;

use turnstile_state::CounterHandle;

use crate::error::CoordinationError;

/// Increment-and-fetch against a named durable counter.
#[async_trait]
pub trait SequenceSource: Send + Sync {
    /// Value before the increment. Distinct for every successful call.
    async fn next_value(&self, name: &str) -> Result<u64, CoordinationError>;
}

// ── Local ──────────────────────────────────────────────────────────

/// Counter actor running in this process.
#[derive(Clone)]
pub struct LocalSequence {
    handle: CounterHandle,
}

impl LocalSequence {
    pub fn new(handle: CounterHandle) -> Self {
        Self { handle }
    }
}

#[async_trait]
impl SequenceSource for LocalSequence {
    async fn next_value(&self, name: &str) -> Result<u64, CoordinationError> {
        Ok(self.handle.increment_and_fetch(name).await?)
    }
}

// ── Remote ─────────────────────────────────────────────────────────

/// Body of `POST /internal/counters/{name}/increment`.
#[derive(Debug, Deserialize)]
struct CounterValue {
    value: u64,
}

/// Counter service reached over plain HTTP/1.1.
#[derive(Debug, Clone)]
pub struct RemoteSequence {
    /// `host:port` to connect to.
    address: String,
    /// Path prefix from the configured base URL, without trailing slash.
    base_path: String,
}

impl RemoteSequence {
    /// Parse a base URL such as `http://10.0.0.5:9400`.
    pub fn new(base_url: &str) -> Result<Self, CoordinationError> {
        let uri: http::Uri = base_url
            .parse()
            .map_err(|e| CoordinationError::InvalidEndpoint(format!("{base_url}: {e}")))?;
        if uri.scheme_str() != Some("http") {
            return Err(CoordinationError::InvalidEndpoint(format!(
                "{base_url}: only http:// is supported"
            )));
        }
        let authority = uri
            .authority()
            .ok_or_else(|| CoordinationError::InvalidEndpoint(format!("{base_url}: missing host")))?;
        let address = format!("{}:{}", authority.host(), authority.port_u16().unwrap_or(80));
        let base_path = uri.path().trim_end_matches('/').to_string();
        Ok(Self { address, base_path })
    }

    pub fn address(&self) -> &str {
        &self.address
    }

    fn increment_path(&self, name: &str) -> String {
        format!(
            "{}/internal/counters/{}/increment",
            self.base_path,
            utf8_percent_encode(name, NON_ALPHANUMERIC)
        )
    }
}

#[async_trait]
impl SequenceSource for RemoteSequence {
    async fn next_value(&self, name: &str) -> Result<u64, CoordinationError> {
        let path = self.increment_path(name);

        let stream = tokio::net::TcpStream::connect(&self.address)
            .await
            .map_err(|e| CoordinationError::Unreachable(format!("{}: {e}", self.address)))?;

        let io = hyper_util::rt::TokioIo::new(stream);
        let (mut sender, conn) = hyper::client::conn::http1::handshake(io)
            .await
            .map_err(|e| CoordinationError::Unreachable(format!("handshake: {e}")))?;

        // Drive the connection in the background.
        tokio::spawn(async move {
            let _ = conn.await;
        });

        let req = http::Request::builder()
            .method(http::Method::POST)
            .uri(&path)
            .header(http::header::HOST, &self.address)
            .header(http::header::USER_AGENT, "turnstile-router/0.1")
            .body(Empty::<Bytes>::new())
            .map_err(|e| CoordinationError::InvalidEndpoint(e.to_string()))?;

        let resp = sender
            .send_request(req)
            .await
            .map_err(|e| CoordinationError::Unreachable(format!("request: {e}")))?;

        let status = resp.status();
        if !status.is_success() {
            debug!(%status, %path, "counter store non-2xx");
            return Err(CoordinationError::Status(status.as_u16()));
        }

        let body = resp
            .into_body()
            .collect()
            .await
            .map_err(|e| CoordinationError::Unreachable(format!("body: {e}")))?
            .to_bytes();
        let parsed: CounterValue = serde_json::from_slice(&body)
            .map_err(|e| CoordinationError::InvalidResponse(e.to_string()))?;
        Ok(parsed.value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::Json;
    use axum::Router;
    use axum::extract::Path;
    use axum::http::StatusCode;
    use axum::routing::post;
    use turnstile_state::{CounterActor, CounterStore};

    #[tokio::test]
    async fn local_sequence_counts_up() {
        let (handle, _task) = CounterActor::spawn(CounterStore::open_in_memory().unwrap());
        let seq = LocalSequence::new(handle);
        assert_eq!(seq.next_value("global").await.unwrap(), 0);
        assert_eq!(seq.next_value("global").await.unwrap(), 1);
        assert_eq!(seq.next_value("other").await.unwrap(), 0);
    }

    #[test]
    fn remote_parses_base_url() {
        let seq = RemoteSequence::new("http://10.0.0.5:9400/").unwrap();
        assert_eq!(seq.address(), "10.0.0.5:9400");
        assert_eq!(
            seq.increment_path("global"),
            "/internal/counters/global/increment"
        );

        let seq = RemoteSequence::new("http://counter.internal/prefix").unwrap();
        assert_eq!(seq.address(), "counter.internal:80");
        assert_eq!(
            seq.increment_path("a b"),
            "/prefix/internal/counters/a%20b/increment"
        );
    }

    #[test]
    fn remote_rejects_unsupported_urls() {
        assert!(matches!(
            RemoteSequence::new("https://counter.internal"),
            Err(CoordinationError::InvalidEndpoint(_))
        ));
        assert!(RemoteSequence::new("/just/a/path").is_err());
        assert!(RemoteSequence::new("not a url").is_err());
    }

    async fn serve(router: Router) -> String {
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, router).await.unwrap();
        });
        format!("http://{addr}")
    }

    #[tokio::test]
    async fn remote_reads_value_from_counter_service() {
        let router = Router::new().route(
            "/internal/counters/{name}/increment",
            post(|Path(name): Path<String>| async move {
                assert_eq!(name, "global");
                Json(serde_json::json!({ "value": 41 }))
            }),
        );
        let base = serve(router).await;

        let seq = RemoteSequence::new(&base).unwrap();
        assert_eq!(seq.next_value("global").await.unwrap(), 41);
    }

    #[tokio::test]
    async fn remote_maps_server_error_to_status() {
        let router = Router::new().route(
            "/internal/counters/{name}/increment",
            post(|| async { StatusCode::SERVICE_UNAVAILABLE }),
        );
        let base = serve(router).await;

        let seq = RemoteSequence::new(&base).unwrap();
        assert!(matches!(
            seq.next_value("global").await,
            Err(CoordinationError::Status(503))
        ));
    }

    #[tokio::test]
    async fn remote_rejects_malformed_body() {
        let router = Router::new().route(
            "/internal/counters/{name}/increment",
            post(|| async { "not json" }),
        );
        let base = serve(router).await;

        let seq = RemoteSequence::new(&base).unwrap();
        assert!(matches!(
            seq.next_value("global").await,
            Err(CoordinationError::InvalidResponse(_))
        ));
    }

    #[tokio::test]
    async fn remote_unreachable_when_nothing_listens() {
        // Bind then drop to obtain a port with no listener.
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        drop(listener);

        let seq = RemoteSequence::new(&format!("http://{addr}")).unwrap();
        assert!(matches!(
            seq.next_value("global").await,
            Err(CoordinationError::Unreachable(_))
        ));
    }
}
