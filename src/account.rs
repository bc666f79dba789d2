//! # Account flows
//!
//! Login, password reset, registration and the profile screen. Each flow
//! runs its presence checks before touching the network and returns typed
//! errors; showing them is left to the caller.

use crate::auth::IdentityProvider;
use crate::profile::DocumentStore;
use crate::types::{AuthSession, PlaylistError, ProfilePatch, UserProfile};
use crate::upload::MediaUploader;
use crate::Result;

fn require_present(fields: &[(&str, &str)]) -> Result<()> {
    let missing: Vec<&str> = fields
        .iter()
        .filter(|(_, value)| value.is_empty())
        .map(|(name, _)| *name)
        .collect();

    if missing.is_empty() {
        Ok(())
    } else {
        Err(PlaylistError::Validation(format!(
            "missing required fields: {}",
            missing.join(", ")
        )))
    }
}

// ================================================================================================
// LOGIN AND PASSWORD RESET
// ================================================================================================

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LoginForm {
    pub email: String,
    pub password: String,
}

impl LoginForm {
    pub fn new(email: &str, password: &str) -> Self {
        Self {
            email: email.to_string(),
            password: password.to_string(),
        }
    }

    pub fn validate(&self) -> Result<()> {
        require_present(&[("email", &self.email), ("password", &self.password)])
    }
}

/// Sign in with the credentials in `form`.
pub async fn login<A>(auth: &A, form: &LoginForm) -> Result<AuthSession>
where
    A: IdentityProvider + ?Sized,
{
    form.validate()?;
    let session = auth.sign_in(&form.email, &form.password).await?;
    log::info!("Signed in as {}", session.email);
    Ok(session)
}

/// Ask the identity provider to e-mail a reset link to `email`.
pub async fn request_password_reset<A>(auth: &A, email: &str) -> Result<()>
where
    A: IdentityProvider + ?Sized,
{
    require_present(&[("email", email)])?;
    auth.send_password_reset(email).await
}

// ================================================================================================
// REGISTRATION
// ================================================================================================

/// Everything the registration screen collects.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RegistrationForm {
    pub email: String,
    pub password: String,
    pub name: String,
    /// Optional, free text
    pub bio: String,
    /// Optional profile picture, raw image bytes
    pub photo: Option<Vec<u8>>,
}

impl RegistrationForm {
    pub fn new(email: &str, password: &str, name: &str) -> Self {
        Self {
            email: email.to_string(),
            password: password.to_string(),
            name: name.to_string(),
            ..Default::default()
        }
    }

    pub fn with_bio(mut self, bio: &str) -> Self {
        self.bio = bio.to_string();
        self
    }

    pub fn with_photo(mut self, photo: Vec<u8>) -> Self {
        self.photo = Some(photo);
        self
    }

    pub fn validate(&self) -> Result<()> {
        require_present(&[
            ("email", &self.email),
            ("password", &self.password),
            ("name", &self.name),
        ])
    }
}

/// Create an account and its profile document.
///
/// The photo, when given, is uploaded before the account exists so that a
/// rejected image leaves no half-registered user behind.
pub async fn register<A, S, U>(
    auth: &A,
    store: &S,
    uploader: &U,
    form: &RegistrationForm,
) -> Result<AuthSession>
where
    A: IdentityProvider + ?Sized,
    S: DocumentStore + ?Sized,
    U: MediaUploader + ?Sized,
{
    form.validate()?;

    let photo = match &form.photo {
        Some(image) => Some(uploader.upload_image(image).await?),
        None => None,
    };

    let session = auth.sign_up(&form.email, &form.password).await?;
    let profile = UserProfile {
        name: form.name.clone(),
        bio: form.bio.clone(),
        photo,
    };
    store.set_profile(&session, &profile).await?;

    log::info!("Registered {} (uid {})", session.email, session.uid);
    Ok(session)
}

// ================================================================================================
// PROFILE SCREEN
// ================================================================================================

/// State behind the profile screen.
///
/// Holds the last loaded profile plus name/bio drafts while editing.
pub struct ProfileScreen<A, S, U> {
    auth: A,
    store: S,
    uploader: U,
    profile: Option<UserProfile>,
    editing: bool,
    draft_name: String,
    draft_bio: String,
}

impl<A, S, U> ProfileScreen<A, S, U>
where
    A: IdentityProvider,
    S: DocumentStore,
    U: MediaUploader,
{
    pub fn new(auth: A, store: S, uploader: U) -> Self {
        Self {
            auth,
            store,
            uploader,
            profile: None,
            editing: false,
            draft_name: String::new(),
            draft_bio: String::new(),
        }
    }

    /// The loaded profile; `None` means "user not found".
    pub fn profile(&self) -> Option<&UserProfile> {
        self.profile.as_ref()
    }

    pub fn is_editing(&self) -> bool {
        self.editing
    }

    pub fn draft_name(&self) -> &str {
        &self.draft_name
    }

    pub fn draft_bio(&self) -> &str {
        &self.draft_bio
    }

    pub fn set_draft_name(&mut self, name: impl Into<String>) {
        self.draft_name = name.into();
    }

    pub fn set_draft_bio(&mut self, bio: impl Into<String>) {
        self.draft_bio = bio.into();
    }

    /// Load the signed-in user's profile document.
    ///
    /// Without a signed-in user, or without a document, the screen ends up in
    /// the "user not found" state.
    pub async fn load(&mut self) -> Result<Option<&UserProfile>> {
        let Some(session) = self.auth.current_user() else {
            log::debug!("No signed-in user, nothing to load");
            self.profile = None;
            return Ok(None);
        };

        self.profile = self.store.get_profile(&session).await?;
        if let Some(profile) = &self.profile {
            self.draft_name = profile.name.clone();
            self.draft_bio = profile.bio.clone();
        }
        Ok(self.profile.as_ref())
    }

    pub fn begin_edit(&mut self) {
        if let Some(profile) = &self.profile {
            self.draft_name = profile.name.clone();
            self.draft_bio = profile.bio.clone();
        }
        self.editing = true;
    }

    pub fn cancel_edit(&mut self) {
        self.editing = false;
    }

    /// Merge the name and bio drafts into the profile document.
    pub async fn save(&mut self) -> Result<&UserProfile> {
        let session = self.require_user()?;
        let patch = ProfilePatch::new()
            .with_name(&self.draft_name)
            .with_bio(&self.draft_bio);

        self.store.update_profile(&session, &patch).await?;
        self.editing = false;
        Ok(self.apply_locally(&patch))
    }

    /// Upload a new profile picture and point the profile document at it.
    pub async fn replace_photo(&mut self, image: &[u8]) -> Result<&UserProfile> {
        let session = self.require_user()?;
        let url = self.uploader.upload_image(image).await?;
        let patch = ProfilePatch::new().with_photo(&url);

        self.store.update_profile(&session, &patch).await?;
        Ok(self.apply_locally(&patch))
    }

    fn require_user(&self) -> Result<AuthSession> {
        self.auth
            .current_user()
            .ok_or_else(|| PlaylistError::Auth("no user is signed in".to_string()))
    }

    fn apply_locally(&mut self, patch: &ProfilePatch) -> &UserProfile {
        let profile = self.profile.get_or_insert_with(UserProfile::default);
        patch.apply_to(profile);
        profile
    }
}
