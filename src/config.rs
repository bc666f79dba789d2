use crate::{PlaylistError, Result};
use std::time::Duration;

pub const DEFAULT_API_URL: &str = "https://webapptech.site/apiplaylist/api/playlist";
pub const DEFAULT_FIREBASE_PROJECT_ID: &str = "playlist-61bf3";
pub const DEFAULT_CLOUD_NAME: &str = "dqzebwdjf";
pub const DEFAULT_UPLOAD_PRESET: &str = "preset_publico";
pub const DEFAULT_SPLASH_DELAY: Duration = Duration::from_secs(4);

/// Identity provider and document store settings
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FirebaseConfig {
    /// Web API key; there is no default and sign-in fails until one is set
    pub api_key: String,
    pub project_id: String,
    pub auth_base_url: String,
    pub firestore_base_url: String,
}

impl Default for FirebaseConfig {
    fn default() -> Self {
        Self {
            api_key: String::new(),
            project_id: DEFAULT_FIREBASE_PROJECT_ID.to_string(),
            auth_base_url: crate::auth::DEFAULT_AUTH_BASE_URL.to_string(),
            firestore_base_url: crate::profile::DEFAULT_STORE_BASE_URL.to_string(),
        }
    }
}

/// Image host settings
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MediaConfig {
    pub cloud_name: String,
    pub upload_preset: String,
    pub base_url: String,
}

impl Default for MediaConfig {
    fn default() -> Self {
        Self {
            cloud_name: DEFAULT_CLOUD_NAME.to_string(),
            upload_preset: DEFAULT_UPLOAD_PRESET.to_string(),
            base_url: crate::upload::DEFAULT_MEDIA_BASE_URL.to_string(),
        }
    }
}

/// Everything [`AppServices`](crate::AppServices) needs to reach the backends.
///
/// Defaults point at the deployed backends. Any of them can be overridden
/// from `PLAYLIST_*` environment variables with [`AppConfig::from_env`] or
/// with the builder methods.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AppConfig {
    /// Base URL of the playlist REST resource
    pub api_url: String,
    pub firebase: FirebaseConfig,
    pub media: MediaConfig,
    /// How long the splash screen stays up
    pub splash_delay: Duration,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            api_url: DEFAULT_API_URL.to_string(),
            firebase: FirebaseConfig::default(),
            media: MediaConfig::default(),
            splash_delay: DEFAULT_SPLASH_DELAY,
        }
    }
}

impl AppConfig {
    pub fn new() -> Self {
        Self::default()
    }

    /// Defaults overridden by the process environment.
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Defaults overridden by whatever `lookup` returns for each
    /// `PLAYLIST_*` variable. Empty values are ignored.
    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).filter(|value| !value.trim().is_empty());
        let mut config = Self::default();

        if let Some(url) = get("PLAYLIST_API_URL") {
            config.api_url = url;
        }
        if let Some(key) = get("PLAYLIST_FIREBASE_API_KEY") {
            config.firebase.api_key = key;
        }
        if let Some(project) = get("PLAYLIST_FIREBASE_PROJECT_ID") {
            config.firebase.project_id = project;
        }
        if let Some(cloud) = get("PLAYLIST_CLOUDINARY_CLOUD_NAME") {
            config.media.cloud_name = cloud;
        }
        if let Some(preset) = get("PLAYLIST_CLOUDINARY_UPLOAD_PRESET") {
            config.media.upload_preset = preset;
        }

        config
    }

    pub fn with_api_url(mut self, url: &str) -> Self {
        self.api_url = url.to_string();
        self
    }

    pub fn with_firebase_api_key(mut self, api_key: &str) -> Self {
        self.firebase.api_key = api_key.to_string();
        self
    }

    pub fn with_firebase_project(mut self, project_id: &str) -> Self {
        self.firebase.project_id = project_id.to_string();
        self
    }

    /// Point the identity and document store clients somewhere else (tests, emulators).
    pub fn with_firebase_base_urls(mut self, auth_base_url: &str, firestore_base_url: &str) -> Self {
        self.firebase.auth_base_url = auth_base_url.to_string();
        self.firebase.firestore_base_url = firestore_base_url.to_string();
        self
    }

    pub fn with_media(mut self, cloud_name: &str, upload_preset: &str) -> Self {
        self.media.cloud_name = cloud_name.to_string();
        self.media.upload_preset = upload_preset.to_string();
        self
    }

    pub fn with_media_base_url(mut self, base_url: &str) -> Self {
        self.media.base_url = base_url.to_string();
        self
    }

    pub fn with_splash_delay(mut self, delay: Duration) -> Self {
        self.splash_delay = delay;
        self
    }

    /// Check that every base URL parses and the media settings are present.
    ///
    /// A missing API key is not an error here; only the identity calls need it.
    pub fn validate(&self) -> Result<()> {
        for (name, url) in [
            ("api_url", &self.api_url),
            ("firebase.auth_base_url", &self.firebase.auth_base_url),
            ("firebase.firestore_base_url", &self.firebase.firestore_base_url),
            ("media.base_url", &self.media.base_url),
        ] {
            http_types::Url::parse(url)
                .map_err(|e| PlaylistError::Config(format!("invalid {name} '{url}': {e}")))?;
        }

        if self.firebase.project_id.is_empty() {
            return Err(PlaylistError::Config("firebase.project_id is empty".to_string()));
        }
        if self.media.cloud_name.is_empty() || self.media.upload_preset.is_empty() {
            return Err(PlaylistError::Config(
                "media cloud name and upload preset are required".to_string(),
            ));
        }
        Ok(())
    }
}
