use crate::types::AuthSession;
use crate::{PlaylistError, Result};
use std::fs;
use std::path::{Path, PathBuf};

const APP_DIR: &str = "playlist-client";
const SESSION_FILE: &str = "session.json";

/// Saves the signed-in session between runs of the command-line client.
///
/// Sessions live in the platform data directory, e.g.
/// `~/.local/share/playlist-client/session.json`. Only one session is kept.
pub struct SessionPersistence;

impl SessionPersistence {
    /// Path of the session file inside the platform data directory.
    pub fn session_path() -> Result<PathBuf> {
        let data_dir = dirs::data_dir()
            .ok_or_else(|| PlaylistError::Session("Cannot determine data directory".to_string()))?;
        Ok(data_dir.join(APP_DIR).join(SESSION_FILE))
    }

    pub fn save_session(session: &AuthSession) -> Result<()> {
        Self::save_session_to(&Self::session_path()?, session)
    }

    /// Load the saved session; errors when none exists or it cannot be parsed.
    pub fn load_session() -> Result<AuthSession> {
        Self::load_session_from(&Self::session_path()?)
    }

    pub fn session_exists() -> bool {
        match Self::session_path() {
            Ok(path) => path.exists(),
            Err(_) => false,
        }
    }

    pub fn remove_session() -> Result<()> {
        Self::remove_session_at(&Self::session_path()?)
    }

    pub fn save_session_to(path: &Path, session: &AuthSession) -> Result<()> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).map_err(|e| {
                PlaylistError::Session(format!("Failed to create session directory: {e}"))
            })?;
        }

        let json = session
            .to_json()
            .map_err(|e| PlaylistError::Session(format!("Failed to serialize session: {e}")))?;
        fs::write(path, json)
            .map_err(|e| PlaylistError::Session(format!("Failed to write session file: {e}")))?;

        log::debug!("Session saved to: {}", path.display());
        Ok(())
    }

    pub fn load_session_from(path: &Path) -> Result<AuthSession> {
        if !path.exists() {
            return Err(PlaylistError::Session("No saved session found".to_string()));
        }

        let json = fs::read_to_string(path)
            .map_err(|e| PlaylistError::Session(format!("Failed to read session file: {e}")))?;
        let session = AuthSession::from_json(&json)
            .map_err(|e| PlaylistError::Session(format!("Failed to parse session JSON: {e}")))?;

        log::debug!("Session loaded from: {}", path.display());
        Ok(session)
    }

    pub fn remove_session_at(path: &Path) -> Result<()> {
        if path.exists() {
            fs::remove_file(path).map_err(|e| {
                PlaylistError::Session(format!("Failed to remove session file: {e}"))
            })?;
            log::debug!("Session removed from: {}", path.display());
        }
        Ok(())
    }
}
