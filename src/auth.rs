use crate::http::{self, HttpTransport, SharedHttpClient};
use crate::types::{AuthSession, SharedEventBroadcaster};
use crate::{PlaylistError, Result};
use async_trait::async_trait;
use http_client::Response;
use http_types::Method;
use serde::{Deserialize, Serialize};
use std::sync::{Arc, RwLock};

pub const DEFAULT_AUTH_BASE_URL: &str = "https://identitytoolkit.googleapis.com/v1";

/// Trait for the identity provider that can be mocked for testing.
///
/// Implementations remember the session of the last successful sign-in or
/// sign-up as the "current user".
#[cfg_attr(any(test, feature = "mock"), mockall::automock)]
#[async_trait(?Send)]
pub trait IdentityProvider {
    /// Sign in with e-mail and password.
    async fn sign_in(&self, email: &str, password: &str) -> Result<AuthSession>;

    /// Create a new account and sign it in.
    async fn sign_up(&self, email: &str, password: &str) -> Result<AuthSession>;

    /// Ask the provider to e-mail a password reset link.
    async fn send_password_reset(&self, email: &str) -> Result<()>;

    /// The signed-in user, if any.
    fn current_user(&self) -> Option<AuthSession>;

    /// Install a previously saved session as the current user.
    fn restore_session(&self, session: AuthSession);

    /// Forget the current user.
    fn sign_out(&self);
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct CredentialsRequest<'a> {
    email: &'a str,
    password: &'a str,
    return_secure_token: bool,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct PasswordResetRequest<'a> {
    request_type: &'static str,
    email: &'a str,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct AccountResponse {
    id_token: String,
    email: String,
    refresh_token: String,
    expires_in: String,
    local_id: String,
}

#[derive(Deserialize)]
struct ProviderErrorBody {
    error: ProviderError,
}

#[derive(Deserialize)]
struct ProviderError {
    message: String,
}

/// [`IdentityProvider`] backed by the Firebase Identity Toolkit REST API.
#[derive(Clone, Debug)]
pub struct FirebaseAuthClient {
    transport: HttpTransport,
    base_url: String,
    api_key: String,
    current: Arc<RwLock<Option<AuthSession>>>,
}

impl FirebaseAuthClient {
    pub fn new(client: SharedHttpClient, api_key: &str) -> Self {
        Self::with_base_url(
            HttpTransport::new(client),
            DEFAULT_AUTH_BASE_URL,
            api_key,
        )
    }

    pub fn with_shared_broadcaster(
        client: SharedHttpClient,
        api_key: &str,
        broadcaster: Arc<SharedEventBroadcaster>,
    ) -> Self {
        Self::with_base_url(
            HttpTransport::with_broadcaster(client, broadcaster),
            DEFAULT_AUTH_BASE_URL,
            api_key,
        )
    }

    /// Useful for testing or for pointing at the auth emulator.
    pub fn with_base_url(transport: HttpTransport, base_url: &str, api_key: &str) -> Self {
        Self {
            transport,
            base_url: base_url.trim_end_matches('/').to_string(),
            api_key: api_key.to_string(),
            current: Arc::new(RwLock::new(None)),
        }
    }

    fn endpoint(&self, action: &str) -> Result<String> {
        if self.api_key.is_empty() {
            return Err(PlaylistError::Config(
                "identity provider API key is not set".to_string(),
            ));
        }
        Ok(format!(
            "{}/accounts:{}?key={}",
            self.base_url,
            action,
            urlencoding::encode(&self.api_key)
        ))
    }

    async fn post<T: Serialize + ?Sized>(&self, action: &str, body: &T) -> Result<Response> {
        let url = self.endpoint(action)?;
        let request = http::json_request(Method::Post, &url, body).map_err(PlaylistError::Auth)?;
        let mut response = self.transport.send(request).await.map_err(PlaylistError::Auth)?;

        if !response.status().is_success() {
            let body = http::read_body(&mut response).await.unwrap_or_default();
            let reason = serde_json::from_str::<ProviderErrorBody>(&body)
                .map(|parsed| parsed.error.message)
                .unwrap_or_else(|_| format!("server answered {}", response.status()));
            log::debug!("accounts:{action} rejected: {reason}");
            return Err(PlaylistError::Auth(reason));
        }

        Ok(response)
    }

    async fn authenticate(&self, action: &str, email: &str, password: &str) -> Result<AuthSession> {
        let body = CredentialsRequest {
            email,
            password,
            return_secure_token: true,
        };
        let mut response = self.post(action, &body).await?;
        let account: AccountResponse = http::read_json(&mut response)
            .await
            .map_err(PlaylistError::Auth)?;

        let expires_in = account.expires_in.parse::<i64>().map_err(|e| {
            PlaylistError::Auth(format!("invalid expiresIn '{}': {e}", account.expires_in))
        })?;
        let session = AuthSession::try_new(
            account.local_id,
            account.email,
            account.id_token,
            account.refresh_token,
            expires_in,
        )
        .ok_or_else(|| {
            PlaylistError::Auth(format!("invalid expiresIn '{}': out of range", account.expires_in))
        })?;

        log::debug!("accounts:{action} succeeded for uid {}", session.uid);
        self.restore_session(session.clone());
        Ok(session)
    }
}

#[async_trait(?Send)]
impl IdentityProvider for FirebaseAuthClient {
    async fn sign_in(&self, email: &str, password: &str) -> Result<AuthSession> {
        self.authenticate("signInWithPassword", email, password).await
    }

    async fn sign_up(&self, email: &str, password: &str) -> Result<AuthSession> {
        self.authenticate("signUp", email, password).await
    }

    async fn send_password_reset(&self, email: &str) -> Result<()> {
        let body = PasswordResetRequest {
            request_type: "PASSWORD_RESET",
            email,
        };
        self.post("sendOobCode", &body).await?;
        log::debug!("Password reset e-mail requested");
        Ok(())
    }

    fn current_user(&self) -> Option<AuthSession> {
        match self.current.read() {
            Ok(guard) => guard.clone(),
            Err(poisoned) => poisoned.into_inner().clone(),
        }
    }

    fn restore_session(&self, session: AuthSession) {
        match self.current.write() {
            Ok(mut guard) => *guard = Some(session),
            Err(poisoned) => *poisoned.into_inner() = Some(session),
        }
    }

    fn sign_out(&self) {
        match self.current.write() {
            Ok(mut guard) => *guard = None,
            Err(poisoned) => *poisoned.into_inner() = None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_endpoint_requires_api_key() {
        let client = FirebaseAuthClient::with_base_url(
            HttpTransport::new(Arc::new(http_client_stub::Unreachable)),
            DEFAULT_AUTH_BASE_URL,
            "",
        );
        assert!(matches!(
            client.endpoint("signUp"),
            Err(PlaylistError::Config(_))
        ));
    }

    #[test]
    fn test_endpoint_includes_action_and_key() {
        let client = FirebaseAuthClient::with_base_url(
            HttpTransport::new(Arc::new(http_client_stub::Unreachable)),
            "https://auth.test/v1/",
            "k 1",
        );
        assert_eq!(
            client.endpoint("signInWithPassword").unwrap(),
            "https://auth.test/v1/accounts:signInWithPassword?key=k%201"
        );
    }

    #[test]
    fn test_sign_out_clears_current_user() {
        let client = FirebaseAuthClient::with_base_url(
            HttpTransport::new(Arc::new(http_client_stub::Unreachable)),
            DEFAULT_AUTH_BASE_URL,
            "key",
        );
        client.restore_session(AuthSession::new(
            "uid".to_string(),
            "a@b.c".to_string(),
            "tok".to_string(),
            "ref".to_string(),
            60,
        ));
        assert_eq!(client.current_user().map(|s| s.uid), Some("uid".to_string()));

        // Clones share the slot.
        let other = client.clone();
        other.sign_out();
        assert!(client.current_user().is_none());
    }

    mod http_client_stub {
        use http_client::{HttpClient, Request, Response};
        use http_types::{Error, StatusCode};

        #[derive(Debug)]
        pub struct Unreachable;

        #[async_trait::async_trait]
        impl HttpClient for Unreachable {
            async fn send(&self, _req: Request) -> Result<Response, Error> {
                Err(Error::from_str(StatusCode::ServiceUnavailable, "unreachable"))
            }
        }
    }
}
