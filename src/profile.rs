use crate::http::{self, HttpTransport, SharedHttpClient};
use crate::types::{AuthSession, ProfilePatch, SharedEventBroadcaster, UserProfile};
use crate::{PlaylistError, Result};
use async_trait::async_trait;
use http_types::{Method, StatusCode};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::sync::Arc;

pub const DEFAULT_STORE_BASE_URL: &str = "https://firestore.googleapis.com/v1";

/// Collection holding one profile document per user, keyed by uid.
const PROFILE_COLLECTION: &str = "users";

/// Trait for the per-user profile document store that can be mocked for testing.
#[cfg_attr(any(test, feature = "mock"), mockall::automock)]
#[async_trait(?Send)]
pub trait DocumentStore {
    /// Read the profile of `session`'s user; `None` when no document exists.
    async fn get_profile(&self, session: &AuthSession) -> Result<Option<UserProfile>>;

    /// Write the whole profile document, creating it when missing.
    async fn set_profile(&self, session: &AuthSession, profile: &UserProfile) -> Result<()>;

    /// Merge the set fields of `patch` into an existing profile document.
    async fn update_profile(&self, session: &AuthSession, patch: &ProfilePatch) -> Result<()>;
}

/// A Firestore value restricted to the two kinds profiles use.
///
/// Serializes as `{"stringValue": "..."}` or `{"nullValue": null}`; any other
/// value kind reads back as neither.
#[derive(Debug, Default, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct FieldValue {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    string_value: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    null_value: Option<()>,
}

impl FieldValue {
    fn string(value: &str) -> Self {
        Self {
            string_value: Some(value.to_string()),
            null_value: None,
        }
    }

    fn null() -> Self {
        Self {
            string_value: None,
            null_value: Some(()),
        }
    }

    fn optional(value: Option<&str>) -> Self {
        value.map_or_else(Self::null, Self::string)
    }
}

#[derive(Debug, Default, Serialize, Deserialize)]
struct Document {
    #[serde(default)]
    fields: BTreeMap<String, FieldValue>,
}

impl Document {
    fn from_profile(profile: &UserProfile) -> Self {
        let mut fields = BTreeMap::new();
        fields.insert("name".to_string(), FieldValue::string(&profile.name));
        fields.insert("bio".to_string(), FieldValue::string(&profile.bio));
        fields.insert(
            "photo".to_string(),
            FieldValue::optional(profile.photo.as_deref()),
        );
        Self { fields }
    }

    fn from_patch(patch: &ProfilePatch) -> Self {
        let mut fields = BTreeMap::new();
        if let Some(name) = &patch.name {
            fields.insert("name".to_string(), FieldValue::string(name));
        }
        if let Some(bio) = &patch.bio {
            fields.insert("bio".to_string(), FieldValue::string(bio));
        }
        if let Some(photo) = &patch.photo {
            fields.insert("photo".to_string(), FieldValue::string(photo));
        }
        Self { fields }
    }

    fn text(&self, field: &str) -> Option<String> {
        self.fields
            .get(field)
            .and_then(|value| value.string_value.clone())
    }

    fn into_profile(self) -> UserProfile {
        UserProfile {
            name: self.text("name").unwrap_or_default(),
            bio: self.text("bio").unwrap_or_default(),
            photo: self.text("photo").filter(|url| !url.is_empty()),
        }
    }
}

/// [`DocumentStore`] backed by the Firestore REST API.
#[derive(Clone, Debug)]
pub struct FirestoreClient {
    transport: HttpTransport,
    base_url: String,
    project_id: String,
}

impl FirestoreClient {
    pub fn new(client: SharedHttpClient, project_id: &str) -> Self {
        Self::with_base_url(HttpTransport::new(client), DEFAULT_STORE_BASE_URL, project_id)
    }

    pub fn with_shared_broadcaster(
        client: SharedHttpClient,
        project_id: &str,
        broadcaster: Arc<SharedEventBroadcaster>,
    ) -> Self {
        Self::with_base_url(
            HttpTransport::with_broadcaster(client, broadcaster),
            DEFAULT_STORE_BASE_URL,
            project_id,
        )
    }

    pub fn with_base_url(transport: HttpTransport, base_url: &str, project_id: &str) -> Self {
        Self {
            transport,
            base_url: base_url.trim_end_matches('/').to_string(),
            project_id: project_id.to_string(),
        }
    }

    /// URL of the profile document for `uid`.
    pub fn document_url(&self, uid: &str) -> String {
        format!(
            "{}/projects/{}/databases/(default)/documents/{}/{}",
            self.base_url,
            urlencoding::encode(&self.project_id),
            PROFILE_COLLECTION,
            urlencoding::encode(uid)
        )
    }

    async fn write(&self, session: &AuthSession, url: &str, document: &Document) -> Result<()> {
        let mut request =
            http::json_request(Method::Patch, url, document).map_err(PlaylistError::Store)?;
        http::add_bearer_token(&mut request, &session.id_token);

        let response = self.transport.send(request).await.map_err(PlaylistError::Store)?;
        http::require_success(&response).map_err(PlaylistError::Store)
    }
}

#[async_trait(?Send)]
impl DocumentStore for FirestoreClient {
    async fn get_profile(&self, session: &AuthSession) -> Result<Option<UserProfile>> {
        let mut request = http::empty_request(Method::Get, &self.document_url(&session.uid))
            .map_err(PlaylistError::Store)?;
        http::add_bearer_token(&mut request, &session.id_token);

        let mut response = self.transport.send(request).await.map_err(PlaylistError::Store)?;
        if response.status() == StatusCode::NotFound {
            log::debug!("No profile document for uid {}", session.uid);
            return Ok(None);
        }
        http::require_success(&response).map_err(PlaylistError::Store)?;

        let document: Document = http::read_json(&mut response)
            .await
            .map_err(PlaylistError::Store)?;
        Ok(Some(document.into_profile()))
    }

    async fn set_profile(&self, session: &AuthSession, profile: &UserProfile) -> Result<()> {
        let url = self.document_url(&session.uid);
        self.write(session, &url, &Document::from_profile(profile)).await?;
        log::debug!("Profile document written for uid {}", session.uid);
        Ok(())
    }

    async fn update_profile(&self, session: &AuthSession, patch: &ProfilePatch) -> Result<()> {
        if patch.is_empty() {
            return Ok(());
        }

        let mask: Vec<String> = patch
            .field_paths()
            .into_iter()
            .map(|path| format!("updateMask.fieldPaths={path}"))
            .collect();
        let url = format!(
            "{}?{}&currentDocument.exists=true",
            self.document_url(&session.uid),
            mask.join("&")
        );

        self.write(session, &url, &Document::from_patch(patch)).await?;
        log::debug!(
            "Profile fields {:?} updated for uid {}",
            patch.field_paths(),
            session.uid
        );
        Ok(())
    }
}
