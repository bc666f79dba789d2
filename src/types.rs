//! Data types shared across the playlist client.
//!
//! This module contains the playlist entry model, the profile and session
//! types exchanged with the account backends, the crate error type, and the
//! event broadcasting used to observe HTTP activity.

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Deserializer, Serialize};
use std::fmt;
use thiserror::Error;
use tokio::sync::{broadcast, watch};

// ================================================================================================
// PLAYLIST ENTRIES
// ================================================================================================

/// Opaque identifier assigned to a playlist entry by the playlist API.
///
/// The API currently hands out numeric ids, but nothing in the client relies
/// on that: ids are kept as text and only ever echoed back in request paths.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(transparent)]
pub struct EntryId(String);

impl EntryId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for EntryId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for EntryId {
    fn from(id: &str) -> Self {
        Self::new(id)
    }
}

impl From<u64> for EntryId {
    fn from(id: u64) -> Self {
        Self(id.to_string())
    }
}

impl<'de> Deserialize<'de> for EntryId {
    fn deserialize<D>(deserializer: D) -> std::result::Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        #[derive(Deserialize)]
        #[serde(untagged)]
        enum RawId {
            Text(String),
            Number(serde_json::Number),
        }

        Ok(match RawId::deserialize(deserializer)? {
            RawId::Text(text) => EntryId(text),
            RawId::Number(number) => EntryId(number.to_string()),
        })
    }
}

/// A playlist entry as stored by the playlist API.
///
/// # Examples
///
/// ```rust
/// use playlist_client::TrackEntry;
///
/// let entry: TrackEntry = serde_json::from_str(
///     r#"{"id": 7, "nm_musica": "Aquarela", "artista": "Toquinho", "gravadora": "Ariola"}"#,
/// ).unwrap();
///
/// assert_eq!(entry.id.as_str(), "7");
/// assert_eq!(entry.title, "Aquarela");
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct TrackEntry {
    /// Server-assigned identifier
    pub id: EntryId,
    /// Song title
    #[serde(rename = "nm_musica")]
    pub title: String,
    /// Performing artist
    #[serde(rename = "artista")]
    pub performer: String,
    /// Record label / publisher
    #[serde(rename = "gravadora")]
    pub label: String,
}

impl TrackEntry {
    /// The editable fields of this entry.
    pub fn fields(&self) -> TrackFields {
        TrackFields {
            title: self.title.clone(),
            performer: self.performer.clone(),
            label: self.label.clone(),
        }
    }
}

/// One of the three editable fields of a playlist entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TrackField {
    Title,
    Performer,
    Label,
}

impl TrackField {
    pub const ALL: [TrackField; 3] = [TrackField::Title, TrackField::Performer, TrackField::Label];

    /// Field name used in the playlist API payloads.
    pub fn wire_name(self) -> &'static str {
        match self {
            TrackField::Title => "nm_musica",
            TrackField::Performer => "artista",
            TrackField::Label => "gravadora",
        }
    }
}

impl fmt::Display for TrackField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            TrackField::Title => "title",
            TrackField::Performer => "performer",
            TrackField::Label => "label",
        };
        f.write_str(name)
    }
}

/// The submission payload for creating or updating an entry.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct TrackFields {
    #[serde(rename = "nm_musica")]
    pub title: String,
    #[serde(rename = "artista")]
    pub performer: String,
    #[serde(rename = "gravadora")]
    pub label: String,
}

impl TrackFields {
    pub fn new(title: &str, performer: &str, label: &str) -> Self {
        Self {
            title: title.to_string(),
            performer: performer.to_string(),
            label: label.to_string(),
        }
    }

    pub fn get(&self, field: TrackField) -> &str {
        match field {
            TrackField::Title => &self.title,
            TrackField::Performer => &self.performer,
            TrackField::Label => &self.label,
        }
    }

    pub fn set(&mut self, field: TrackField, value: impl Into<String>) {
        let slot = match field {
            TrackField::Title => &mut self.title,
            TrackField::Performer => &mut self.performer,
            TrackField::Label => &mut self.label,
        };
        *slot = value.into();
    }

    /// Fields that are still empty.
    pub fn missing_fields(&self) -> Vec<TrackField> {
        TrackField::ALL
            .into_iter()
            .filter(|field| self.get(*field).is_empty())
            .collect()
    }

    /// Presence check run before any create or update request.
    pub fn validate(&self) -> std::result::Result<(), PlaylistError> {
        let missing = self.missing_fields();
        if missing.is_empty() {
            return Ok(());
        }
        let names: Vec<String> = missing.iter().map(ToString::to_string).collect();
        Err(PlaylistError::Validation(format!(
            "missing required fields: {}",
            names.join(", ")
        )))
    }
}

// ================================================================================================
// ACCOUNTS AND PROFILES
// ================================================================================================

/// Authenticated identity returned by the identity provider.
///
/// Sessions are plain data: they can be serialized, saved with
/// [`SessionPersistence`](crate::SessionPersistence) and handed back to
/// [`IdentityProvider::restore_session`](crate::IdentityProvider::restore_session).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuthSession {
    /// Stable unique user id, also the key of the user's profile document
    pub uid: String,
    /// E-mail address used to sign in
    pub email: String,
    /// Bearer token for the document store
    pub id_token: String,
    /// Long-lived token issued next to the id token. It is stored but never
    /// exchanged: once `expires_at` passes the user has to sign in again.
    pub refresh_token: String,
    /// When `id_token` stops being accepted
    pub expires_at: DateTime<Utc>,
}

impl AuthSession {
    /// Build a session expiring `expires_in_seconds` from now.
    ///
    /// Lifetimes beyond what a timestamp can hold saturate at the far end of
    /// the representable range; use [`AuthSession::try_new`] to reject them.
    pub fn new(
        uid: String,
        email: String,
        id_token: String,
        refresh_token: String,
        expires_in_seconds: i64,
    ) -> Self {
        let expires_at = expiry_after(expires_in_seconds).unwrap_or(if expires_in_seconds < 0 {
            DateTime::<Utc>::MIN_UTC
        } else {
            DateTime::<Utc>::MAX_UTC
        });
        Self {
            uid,
            email,
            id_token,
            refresh_token,
            expires_at,
        }
    }

    /// Like [`AuthSession::new`], but `None` when the expiry cannot be represented.
    pub fn try_new(
        uid: String,
        email: String,
        id_token: String,
        refresh_token: String,
        expires_in_seconds: i64,
    ) -> Option<Self> {
        let expires_at = expiry_after(expires_in_seconds)?;
        Some(Self {
            uid,
            email,
            id_token,
            refresh_token,
            expires_at,
        })
    }

    pub fn is_expired(&self) -> bool {
        Utc::now() >= self.expires_at
    }

    /// Basic sanity check; does not guarantee the provider still accepts the token.
    pub fn is_valid(&self) -> bool {
        !self.uid.is_empty() && !self.id_token.is_empty() && !self.is_expired()
    }

    pub fn to_json(&self) -> std::result::Result<String, serde_json::Error> {
        serde_json::to_string(self)
    }

    pub fn from_json(json: &str) -> std::result::Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }
}

fn expiry_after(seconds: i64) -> Option<DateTime<Utc>> {
    Utc::now().checked_add_signed(Duration::try_seconds(seconds)?)
}

/// Per-user profile document.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserProfile {
    pub name: String,
    pub bio: String,
    /// Secure URL of the uploaded profile picture
    pub photo: Option<String>,
}

/// Partial profile update; only the fields that are set get written.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ProfilePatch {
    pub name: Option<String>,
    pub bio: Option<String>,
    pub photo: Option<String>,
}

impl ProfilePatch {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_name(mut self, name: &str) -> Self {
        self.name = Some(name.to_string());
        self
    }

    pub fn with_bio(mut self, bio: &str) -> Self {
        self.bio = Some(bio.to_string());
        self
    }

    pub fn with_photo(mut self, photo_url: &str) -> Self {
        self.photo = Some(photo_url.to_string());
        self
    }

    pub fn is_empty(&self) -> bool {
        self.name.is_none() && self.bio.is_none() && self.photo.is_none()
    }

    /// Document field paths touched by this patch, in a stable order.
    pub fn field_paths(&self) -> Vec<&'static str> {
        let mut paths = Vec::new();
        if self.name.is_some() {
            paths.push("name");
        }
        if self.bio.is_some() {
            paths.push("bio");
        }
        if self.photo.is_some() {
            paths.push("photo");
        }
        paths
    }

    /// Apply this patch to a local copy of the profile.
    pub fn apply_to(&self, profile: &mut UserProfile) {
        if let Some(name) = &self.name {
            profile.name = name.clone();
        }
        if let Some(bio) = &self.bio {
            profile.bio = bio.clone();
        }
        if let Some(photo) = &self.photo {
            profile.photo = Some(photo.clone());
        }
    }
}

// ================================================================================================
// ERROR TYPES
// ================================================================================================

/// Error types for playlist client operations.
///
/// Transport failures, unexpected HTTP statuses and undecodable bodies are
/// all folded into the variant of the operation that hit them; the client
/// never retries on its own.
///
/// ```rust,no_run
/// use playlist_client::{PlaylistApiClientImpl, PlaylistError, PlaylistScreen};
/// use std::sync::Arc;
///
/// #[tokio::main]
/// async fn main() {
///     let http = Arc::new(http_client::native::NativeClient::new());
///     let client = PlaylistApiClientImpl::new(http, "https://example.com/api/playlist");
///     let mut screen = PlaylistScreen::new(client);
///
///     match screen.fetch_all().await {
///         Ok(entries) => println!("{} songs", entries.len()),
///         Err(e @ PlaylistError::Fetch(_)) => eprintln!("{}", e.notice()),
///         Err(e) => eprintln!("Other error: {e}"),
///     }
/// }
/// ```
#[derive(Error, Debug)]
pub enum PlaylistError {
    /// A required field was empty; no request was sent.
    #[error("Validation failed: {0}")]
    Validation(String),

    /// Listing the playlist failed.
    #[error("Failed to load playlist: {0}")]
    Fetch(String),

    /// Creating or updating an entry was rejected or never reached the API.
    #[error("Failed to submit entry: {0}")]
    Submit(String),

    /// Deleting an entry was rejected or never reached the API.
    #[error("Failed to delete entry: {0}")]
    Delete(String),

    /// Sign-in, sign-up or password reset was rejected, or no user is signed in.
    #[error("Authentication failed: {0}")]
    Auth(String),

    /// The media host rejected the image or answered without a URL.
    #[error("Image upload failed: {0}")]
    Upload(String),

    /// Reading or writing the profile document failed.
    #[error("Profile store error: {0}")]
    Store(String),

    /// Saving or loading a persisted session failed.
    #[error("Session error: {0}")]
    Session(String),

    /// Configuration is missing or malformed.
    #[error("Configuration error: {0}")]
    Config(String),

    /// File system I/O errors.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl PlaylistError {
    /// Generic message suitable for showing to an end user.
    pub fn notice(&self) -> &'static str {
        match self {
            PlaylistError::Validation(_) => "Please fill in all required fields.",
            PlaylistError::Fetch(_) => "Could not load the songs.",
            PlaylistError::Submit(_) => "Could not save the song.",
            PlaylistError::Delete(_) => "Could not delete the song.",
            PlaylistError::Auth(_) => "Could not sign in. Check your credentials.",
            PlaylistError::Upload(_) => "Could not upload the image.",
            PlaylistError::Store(_) => "Could not update your profile.",
            PlaylistError::Session(_) => "Your saved session could not be used.",
            PlaylistError::Config(_) => "The application is not configured correctly.",
            PlaylistError::Io(_) => "Something went wrong.",
        }
    }
}

// ================================================================================================
// EVENT SYSTEM
// ================================================================================================

/// Query parameters whose values never leave the process in events or logs.
const REDACTED_PARAMS: &[&str] = &["key"];

/// Request information for client events
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct RequestInfo {
    /// The HTTP method (GET, POST, etc.)
    pub method: String,
    /// Host the request was sent to
    pub host: String,
    /// Path without query parameters
    pub path: String,
    /// Query parameters as key-value pairs, with credentials redacted
    pub query_params: Vec<(String, String)>,
}

impl RequestInfo {
    pub fn from_url_and_method(url: &http_types::Url, method: &str) -> Self {
        let query_params = url
            .query_pairs()
            .map(|(key, value)| {
                let value = if REDACTED_PARAMS.contains(&key.as_ref()) {
                    "[redacted]".to_string()
                } else {
                    value.into_owned()
                };
                (key.into_owned(), value)
            })
            .collect();

        Self {
            method: method.to_string(),
            host: url.host_str().unwrap_or_default().to_string(),
            path: url.path().to_string(),
            query_params,
        }
    }

    /// Get a short description of the request for logging
    pub fn short_description(&self) -> String {
        let mut desc = format!("{} {}", self.method, self.path);
        if !self.query_params.is_empty() {
            let params: Vec<String> = self
                .query_params
                .iter()
                .map(|(k, v)| format!("{k}={v}"))
                .collect();
            if params.len() <= 2 {
                desc.push_str(&format!("?{}", params.join("&")));
            } else {
                desc.push_str(&format!("?{}...", params[0]));
            }
        }
        desc
    }
}

/// Event type to describe internal client activity
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub enum ClientEvent {
    /// Request started
    RequestStarted {
        /// Request details
        request: RequestInfo,
    },
    /// A response arrived, whatever its status
    RequestCompleted {
        /// Request details
        request: RequestInfo,
        /// HTTP status code
        status_code: u16,
        /// Duration of the request in milliseconds
        duration_ms: u64,
    },
    /// The transport failed before any response arrived
    RequestFailed {
        /// Request details
        request: RequestInfo,
        /// Transport error message
        error: String,
        /// Duration of the request in milliseconds
        duration_ms: u64,
    },
    /// The playlist screen started or stopped loading the working set
    CatalogLoading {
        /// Whether a full fetch is in flight
        loading: bool,
    },
    /// The playlist screen replaced its working set
    WorkingSetReplaced {
        /// Number of entries now held
        entries: usize,
    },
}

/// Type alias for the broadcast receiver
pub type ClientEventReceiver = broadcast::Receiver<ClientEvent>;

/// Type alias for the watch receiver
pub type ClientEventWatcher = watch::Receiver<Option<ClientEvent>>;

/// Shared event broadcasting state that persists across client clones
#[derive(Clone)]
pub struct SharedEventBroadcaster {
    event_tx: broadcast::Sender<ClientEvent>,
    last_event_tx: watch::Sender<Option<ClientEvent>>,
}

impl SharedEventBroadcaster {
    /// Create a new shared event broadcaster
    pub fn new() -> Self {
        let (event_tx, _) = broadcast::channel(100);
        let (last_event_tx, _) = watch::channel(None);

        Self {
            event_tx,
            last_event_tx,
        }
    }

    /// Broadcast an event to all subscribers
    pub fn broadcast_event(&self, event: ClientEvent) {
        let _ = self.event_tx.send(event.clone());
        self.last_event_tx.send_replace(Some(event));
    }

    /// Subscribe to events
    pub fn subscribe(&self) -> ClientEventReceiver {
        self.event_tx.subscribe()
    }

    /// Watch the most recent event
    pub fn watch(&self) -> ClientEventWatcher {
        self.last_event_tx.subscribe()
    }

    /// Get the latest event
    pub fn latest_event(&self) -> Option<ClientEvent> {
        self.last_event_tx.borrow().clone()
    }
}

impl Default for SharedEventBroadcaster {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for SharedEventBroadcaster {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SharedEventBroadcaster")
            .field("subscribers", &self.event_tx.receiver_count())
            .finish()
    }
}

// ================================================================================================
// TESTS
// ================================================================================================
