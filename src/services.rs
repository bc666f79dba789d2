//! # Service handle
//!
//! [`AppServices`] is built once at startup and owns every backend client.
//! All of them send through the same HTTP implementation and report on the
//! same event broadcaster, so one subscriber sees every request the
//! application makes. Screens are handed clones of the clients they need.

use crate::account::{self, LoginForm, ProfileScreen, RegistrationForm};
use crate::auth::{FirebaseAuthClient, IdentityProvider};
use crate::catalog::PlaylistApiClientImpl;
use crate::config::AppConfig;
use crate::http::{HttpTransport, SharedHttpClient};
use crate::profile::FirestoreClient;
use crate::screen::PlaylistScreen;
use crate::types::{AuthSession, ClientEventReceiver, SharedEventBroadcaster};
use crate::upload::CloudinaryUploader;
use crate::Result;
use std::sync::Arc;

/// The profile screen as wired by [`AppServices`].
pub type AppProfileScreen = ProfileScreen<FirebaseAuthClient, FirestoreClient, CloudinaryUploader>;

#[derive(Clone, Debug)]
pub struct AppServices {
    config: AppConfig,
    broadcaster: Arc<SharedEventBroadcaster>,
    catalog: PlaylistApiClientImpl,
    auth: FirebaseAuthClient,
    store: FirestoreClient,
    uploader: CloudinaryUploader,
}

impl AppServices {
    /// Validate `config` and build every client on top of `http`.
    pub fn start(config: AppConfig, http: SharedHttpClient) -> Result<Self> {
        config.validate()?;

        let broadcaster = Arc::new(SharedEventBroadcaster::new());
        let transport = HttpTransport::with_broadcaster(http, broadcaster.clone());

        let catalog = PlaylistApiClientImpl::with_transport(transport.clone(), &config.api_url);
        let auth = FirebaseAuthClient::with_base_url(
            transport.clone(),
            &config.firebase.auth_base_url,
            &config.firebase.api_key,
        );
        let store = FirestoreClient::with_base_url(
            transport.clone(),
            &config.firebase.firestore_base_url,
            &config.firebase.project_id,
        );
        let uploader = CloudinaryUploader::with_base_url(
            transport,
            &config.media.base_url,
            &config.media.cloud_name,
            &config.media.upload_preset,
        );

        if config.firebase.api_key.is_empty() {
            log::warn!("No identity provider API key configured; account features will fail");
        }
        log::info!("Services started against {}", config.api_url);

        Ok(Self {
            config,
            broadcaster,
            catalog,
            auth,
            store,
            uploader,
        })
    }

    pub fn config(&self) -> &AppConfig {
        &self.config
    }

    pub fn catalog(&self) -> &PlaylistApiClientImpl {
        &self.catalog
    }

    pub fn auth(&self) -> &FirebaseAuthClient {
        &self.auth
    }

    pub fn store(&self) -> &FirestoreClient {
        &self.store
    }

    pub fn uploader(&self) -> &CloudinaryUploader {
        &self.uploader
    }

    pub fn broadcaster(&self) -> &Arc<SharedEventBroadcaster> {
        &self.broadcaster
    }

    /// Subscribe to every request event and catalog state change.
    pub fn subscribe(&self) -> ClientEventReceiver {
        self.broadcaster.subscribe()
    }

    pub fn playlist_screen(&self) -> PlaylistScreen<PlaylistApiClientImpl> {
        PlaylistScreen::with_broadcaster(self.catalog.clone(), self.broadcaster.clone())
    }

    pub fn profile_screen(&self) -> AppProfileScreen {
        ProfileScreen::new(
            self.auth.clone(),
            self.store.clone(),
            self.uploader.clone(),
        )
    }

    pub async fn login(&self, form: &LoginForm) -> Result<AuthSession> {
        account::login(&self.auth, form).await
    }

    pub async fn register(&self, form: &RegistrationForm) -> Result<AuthSession> {
        account::register(&self.auth, &self.store, &self.uploader, form).await
    }

    pub async fn request_password_reset(&self, email: &str) -> Result<()> {
        account::request_password_reset(&self.auth, email).await
    }

    pub fn current_user(&self) -> Option<AuthSession> {
        self.auth.current_user()
    }

    /// Install a saved session; expired sessions are ignored.
    pub fn restore_session(&self, session: AuthSession) -> bool {
        if !session.is_valid() {
            log::debug!("Ignoring expired or incomplete session for {}", session.email);
            return false;
        }
        self.auth.restore_session(session);
        true
    }

    pub fn sign_out(&self) {
        self.auth.sign_out();
    }

    /// Hold the splash screen for the configured delay.
    pub async fn splash(&self) {
        tokio::time::sleep(self.config.splash_delay).await;
    }

    /// Sign out and drop every client.
    pub fn shutdown(self) {
        self.sign_out();
        log::info!("Services shut down");
    }
}
