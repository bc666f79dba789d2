use crate::http::{self, HttpTransport, SharedHttpClient};
use crate::types::{ClientEvent, ClientEventReceiver, EntryId, SharedEventBroadcaster, TrackEntry, TrackFields};
use crate::{PlaylistError, Result};
use async_trait::async_trait;
use http_types::Method;
use std::sync::Arc;

/// Trait for the playlist REST resource that can be mocked for testing.
///
/// Each method is one request. Write operations succeed purely on the HTTP
/// status class; their response bodies are never read.
///
/// # Mocking Support
///
/// When the `mock` feature is enabled, this crate provides
/// `MockPlaylistApiClient` that implements this trait using `mockall`.
#[cfg_attr(any(test, feature = "mock"), mockall::automock)]
#[async_trait(?Send)]
pub trait PlaylistApiClient {
    /// `GET {base}`: the whole collection.
    async fn list_entries(&self) -> Result<Vec<TrackEntry>>;

    /// `POST {base}`
    async fn create_entry(&self, fields: &TrackFields) -> Result<()>;

    /// `PUT {base}/{id}`
    async fn update_entry(&self, id: &EntryId, fields: &TrackFields) -> Result<()>;

    /// `DELETE {base}/{id}`
    async fn delete_entry(&self, id: &EntryId) -> Result<()>;
}

/// HTTP implementation of [`PlaylistApiClient`].
///
/// ```rust,no_run
/// use playlist_client::{PlaylistApiClient, PlaylistApiClientImpl, TrackFields};
/// use std::sync::Arc;
///
/// # tokio_test::block_on(async {
/// let http = Arc::new(http_client::native::NativeClient::new());
/// let client = PlaylistApiClientImpl::new(http, "https://webapptech.site/apiplaylist/api/playlist");
///
/// client.create_entry(&TrackFields::new("Aquarela", "Toquinho", "Ariola")).await?;
/// for entry in client.list_entries().await? {
///     println!("{} - {}", entry.performer, entry.title);
/// }
/// # Ok::<(), playlist_client::PlaylistError>(())
/// # });
/// ```
#[derive(Clone, Debug)]
pub struct PlaylistApiClientImpl {
    transport: HttpTransport,
    base_url: String,
}

impl PlaylistApiClientImpl {
    pub fn new(client: SharedHttpClient, base_url: &str) -> Self {
        Self::with_transport(HttpTransport::new(client), base_url)
    }

    /// Create a client whose events go to an existing broadcaster.
    pub fn with_shared_broadcaster(
        client: SharedHttpClient,
        base_url: &str,
        broadcaster: Arc<SharedEventBroadcaster>,
    ) -> Self {
        Self::with_transport(HttpTransport::with_broadcaster(client, broadcaster), base_url)
    }

    pub fn with_transport(transport: HttpTransport, base_url: &str) -> Self {
        Self {
            transport,
            base_url: base_url.trim_end_matches('/').to_string(),
        }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub fn broadcaster(&self) -> &Arc<SharedEventBroadcaster> {
        self.transport.broadcaster()
    }

    pub fn subscribe(&self) -> ClientEventReceiver {
        self.transport.subscribe()
    }

    pub fn latest_event(&self) -> Option<ClientEvent> {
        self.transport.broadcaster().latest_event()
    }

    pub fn entry_url(&self, id: &EntryId) -> String {
        format!("{}/{}", self.base_url, urlencoding::encode(id.as_str()))
    }
}

#[async_trait(?Send)]
impl PlaylistApiClient for PlaylistApiClientImpl {
    async fn list_entries(&self) -> Result<Vec<TrackEntry>> {
        let request = http::empty_request(Method::Get, &self.base_url).map_err(PlaylistError::Fetch)?;
        let mut response = self.transport.send(request).await.map_err(PlaylistError::Fetch)?;
        http::require_success(&response).map_err(PlaylistError::Fetch)?;

        let entries: Vec<TrackEntry> = http::read_json(&mut response)
            .await
            .map_err(PlaylistError::Fetch)?;
        log::debug!("Fetched {} playlist entries", entries.len());
        Ok(entries)
    }

    async fn create_entry(&self, fields: &TrackFields) -> Result<()> {
        let request = http::json_request(Method::Post, &self.base_url, fields)
            .map_err(PlaylistError::Submit)?;
        let response = self.transport.send(request).await.map_err(PlaylistError::Submit)?;
        http::require_success(&response).map_err(PlaylistError::Submit)
    }

    async fn update_entry(&self, id: &EntryId, fields: &TrackFields) -> Result<()> {
        let request = http::json_request(Method::Put, &self.entry_url(id), fields)
            .map_err(PlaylistError::Submit)?;
        let response = self.transport.send(request).await.map_err(PlaylistError::Submit)?;
        http::require_success(&response).map_err(PlaylistError::Submit)
    }

    async fn delete_entry(&self, id: &EntryId) -> Result<()> {
        let request = http::empty_request(Method::Delete, &self.entry_url(id))
            .map_err(PlaylistError::Delete)?;
        let response = self.transport.send(request).await.map_err(PlaylistError::Delete)?;
        http::require_success(&response).map_err(PlaylistError::Delete)
    }
}
