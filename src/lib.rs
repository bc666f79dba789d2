pub mod account;
pub mod auth;
pub mod catalog;
pub mod config;
pub mod form;
pub mod http;
pub mod profile;
pub mod screen;
pub mod services;
pub mod session_persistence;
pub mod types;
pub mod upload;

pub use account::{login, register, request_password_reset, LoginForm, ProfileScreen, RegistrationForm};
pub use auth::{FirebaseAuthClient, IdentityProvider};
pub use catalog::{PlaylistApiClient, PlaylistApiClientImpl};
pub use config::{AppConfig, FirebaseConfig, MediaConfig};
pub use form::{EditState, FormBuffer};
pub use profile::{DocumentStore, FirestoreClient};
pub use screen::{DeleteChoice, DeletePrompt, MutationOutcome, PlaylistScreen};
pub use services::{AppProfileScreen, AppServices};
pub use session_persistence::SessionPersistence;
pub use types::{
    AuthSession, ClientEvent, ClientEventReceiver, EntryId, PlaylistError, ProfilePatch,
    RequestInfo, SharedEventBroadcaster, TrackEntry, TrackField, TrackFields, UserProfile,
};
pub use upload::{CloudinaryUploader, MediaUploader};

#[cfg(feature = "mock")]
pub use auth::MockIdentityProvider;
#[cfg(feature = "mock")]
pub use catalog::MockPlaylistApiClient;
#[cfg(feature = "mock")]
pub use profile::MockDocumentStore;
#[cfg(feature = "mock")]
pub use upload::MockMediaUploader;

pub type Result<T> = std::result::Result<T, PlaylistError>;
