//! HTTP plumbing shared by every backend client.
//!
//! Requests are built as JSON requests, sent through an injected
//! [`HttpClient`], and reported on a [`SharedEventBroadcaster`]. Helpers
//! return plain `String` errors so each client can fold them into the
//! [`PlaylistError`](crate::PlaylistError) variant of its own operation.

use crate::types::{ClientEvent, ClientEventReceiver, RequestInfo, SharedEventBroadcaster};
use http_client::{HttpClient, Request, Response};
use http_types::{Method, Url};
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::sync::Arc;
use std::time::Instant;

const USER_AGENT: &str = concat!("playlist-client/", env!("CARGO_PKG_VERSION"));

/// Shared handle to an HTTP implementation.
pub type SharedHttpClient = Arc<dyn HttpClient + Send + Sync>;

/// An HTTP client paired with the broadcaster its requests are reported on.
#[derive(Clone)]
pub struct HttpTransport {
    client: SharedHttpClient,
    broadcaster: Arc<SharedEventBroadcaster>,
}

impl HttpTransport {
    pub fn new(client: SharedHttpClient) -> Self {
        Self::with_broadcaster(client, Arc::new(SharedEventBroadcaster::new()))
    }

    pub fn with_broadcaster(
        client: SharedHttpClient,
        broadcaster: Arc<SharedEventBroadcaster>,
    ) -> Self {
        Self {
            client,
            broadcaster,
        }
    }

    pub fn broadcaster(&self) -> &Arc<SharedEventBroadcaster> {
        &self.broadcaster
    }

    pub fn subscribe(&self) -> ClientEventReceiver {
        self.broadcaster.subscribe()
    }

    /// Send a request, reporting its start and its outcome as events.
    ///
    /// Any response counts as completed, whatever its status; only
    /// transport failures are reported as errors.
    pub async fn send(&self, request: Request) -> Result<Response, String> {
        let request_info =
            RequestInfo::from_url_and_method(request.url(), &request.method().to_string());
        let request_start = Instant::now();

        log::debug!("Sending {}", request_info.short_description());
        self.broadcaster.broadcast_event(ClientEvent::RequestStarted {
            request: request_info.clone(),
        });

        match self.client.send(request).await {
            Ok(response) => {
                let status_code: u16 = response.status().into();
                log::debug!(
                    "{} answered {}",
                    request_info.short_description(),
                    status_code
                );
                self.broadcaster
                    .broadcast_event(ClientEvent::RequestCompleted {
                        request: request_info,
                        status_code,
                        duration_ms: request_start.elapsed().as_millis() as u64,
                    });
                Ok(response)
            }
            Err(e) => {
                log::warn!("{} failed: {}", request_info.short_description(), e);
                self.broadcaster.broadcast_event(ClientEvent::RequestFailed {
                    request: request_info,
                    error: e.to_string(),
                    duration_ms: request_start.elapsed().as_millis() as u64,
                });
                Err(e.to_string())
            }
        }
    }
}

impl std::fmt::Debug for HttpTransport {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HttpTransport")
            .field("broadcaster", &self.broadcaster)
            .finish_non_exhaustive()
    }
}

pub fn parse_url(url: &str) -> Result<Url, String> {
    url.parse::<Url>()
        .map_err(|e| format!("invalid URL '{url}': {e}"))
}

/// Add the headers every request carries.
pub fn add_common_headers(request: &mut Request) {
    let _ = request.insert_header("User-Agent", USER_AGENT);
    let _ = request.insert_header("Accept", "application/json");
}

/// Add a bearer token for authenticated backends.
pub fn add_bearer_token(request: &mut Request, token: &str) {
    let _ = request.insert_header("Authorization", format!("Bearer {token}").as_str());
}

/// Build a request without a body.
pub fn empty_request(method: Method, url: &str) -> Result<Request, String> {
    let mut request = Request::new(method, parse_url(url)?);
    add_common_headers(&mut request);
    Ok(request)
}

/// Build a request carrying `body` as JSON.
pub fn json_request<T: Serialize + ?Sized>(
    method: Method,
    url: &str,
    body: &T,
) -> Result<Request, String> {
    let mut request = empty_request(method, url)?;
    let payload =
        serde_json::to_string(body).map_err(|e| format!("failed to encode request body: {e}"))?;
    let _ = request.insert_header("Content-Type", "application/json");
    request.set_body(payload);
    Ok(request)
}

pub async fn read_body(response: &mut Response) -> Result<String, String> {
    response
        .body_string()
        .await
        .map_err(|e| format!("failed to read response body: {e}"))
}

pub async fn read_json<T: DeserializeOwned>(response: &mut Response) -> Result<T, String> {
    let body = read_body(response).await?;
    serde_json::from_str(&body).map_err(|e| format!("unexpected response body: {e}"))
}

/// Fail unless the response carries a 2xx status.
pub fn require_success(response: &Response) -> Result<(), String> {
    if response.status().is_success() {
        Ok(())
    } else {
        Err(format!("server answered {}", response.status()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_json_request_sets_body_and_headers() {
        let fields = crate::TrackFields::new("A", "B", "C");
        let request = json_request(Method::Post, "https://example.com/api/playlist", &fields)
            .unwrap();

        assert_eq!(request.method(), Method::Post);
        assert_eq!(
            request.header("Content-Type").map(|v| v.last().as_str()),
            Some("application/json")
        );
        assert_eq!(
            request.header("Accept").map(|v| v.last().as_str()),
            Some("application/json")
        );
    }

    #[test]
    fn test_invalid_url_is_reported() {
        let err = empty_request(Method::Get, "not a url").unwrap_err();
        assert!(err.contains("not a url"));
    }

    #[test]
    fn test_bearer_token_header() {
        let mut request = empty_request(Method::Get, "https://example.com/doc").unwrap();
        add_bearer_token(&mut request, "tok");
        assert_eq!(
            request.header("Authorization").map(|v| v.last().as_str()),
            Some("Bearer tok")
        );
    }
}
