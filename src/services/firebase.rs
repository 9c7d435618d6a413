use std::time::Duration;

use reqwest::Client;
use serde::Deserialize;
use serde_json::json;

const IDENTITY_BASE: &str = "https://identitytoolkit.googleapis.com/v1";
const REQUEST_TIMEOUT: Duration = Duration::from_secs(15);

#[derive(Debug, thiserror::Error)]
pub enum AuthError {
    #[error("Invalid email or password.")]
    InvalidCredentials,

    /// The provider rejected the request (EMAIL_EXISTS, WEAK_PASSWORD, ...).
    #[error("{0}")]
    Rejected(String),

    #[error("FIREBASE_API_KEY is missing in .env")]
    MissingKey,

    #[error("identity provider request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("identity provider error: {0}")]
    Upstream(String),
}

/// Result of verifying an ID token with the provider.
#[derive(Debug, Clone)]
pub struct VerifiedToken {
    pub uid: String,
    pub email: Option<String>,
    pub name: Option<String>,
}

/// Client for the external identity provider (Firebase identitytoolkit REST
/// surface). All password handling and token verification is delegated here;
/// construct it once at startup and share the handle.
#[derive(Clone)]
pub struct FirebaseClient {
    http: Client,
    api_key: String,
}

impl FirebaseClient {
    pub fn new(api_key: String) -> Self {
        let http = Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .build()
            .expect("failed to build http client");

        Self { http, api_key }
    }

    fn has_key(&self) -> bool {
        !self.api_key.trim().is_empty()
    }

    fn endpoint(&self, action: &str) -> String {
        format!("{IDENTITY_BASE}/accounts:{action}?key={}", self.api_key)
    }

    /// Create a new account, returning the provider-issued user id.
    pub async fn sign_up(&self, email: &str, password: &str) -> Result<String, AuthError> {
        if !self.has_key() {
            return Err(AuthError::MissingKey);
        }

        let res = self
            .http
            .post(self.endpoint("signUp"))
            .json(&json!({
                "email": email,
                "password": password,
                "returnSecureToken": true,
            }))
            .send()
            .await?;

        if !res.status().is_success() {
            return Err(rejection(res).await);
        }

        let body = res.json::<SignUpResponse>().await?;
        Ok(body.local_id)
    }

    /// Exchange email + password for an ID token.
    pub async fn sign_in(&self, email: &str, password: &str) -> Result<String, AuthError> {
        if !self.has_key() {
            return Err(AuthError::MissingKey);
        }

        let res = self
            .http
            .post(self.endpoint("signInWithPassword"))
            .json(&json!({
                "email": email,
                "password": password,
                "returnSecureToken": true,
            }))
            .send()
            .await?;

        if !res.status().is_success() {
            // Wrong password and unknown email both land here.
            return Err(AuthError::InvalidCredentials);
        }

        let body = res.json::<TokenResponse>().await?;
        Ok(body.id_token)
    }

    /// Exchange a Google ID token for a provider ID token (federated login).
    pub async fn sign_in_with_google(&self, google_id_token: &str) -> Result<String, AuthError> {
        if !self.has_key() {
            return Err(AuthError::MissingKey);
        }

        let res = self
            .http
            .post(self.endpoint("signInWithIdp"))
            .json(&json!({
                "postBody": format!("id_token={google_id_token}&providerId=google.com"),
                "requestUri": "http://localhost",
                "returnSecureToken": true,
                "returnIdpCredential": true,
            }))
            .send()
            .await?;

        if !res.status().is_success() {
            return Err(AuthError::InvalidCredentials);
        }

        let body = res.json::<TokenResponse>().await?;
        Ok(body.id_token)
    }

    /// Verify an ID token and return the identity it belongs to.
    pub async fn verify_token(&self, id_token: &str) -> Result<VerifiedToken, AuthError> {
        if !self.has_key() {
            return Err(AuthError::MissingKey);
        }

        let res = self
            .http
            .post(self.endpoint("lookup"))
            .json(&json!({ "idToken": id_token }))
            .send()
            .await?;

        if !res.status().is_success() {
            return Err(AuthError::InvalidCredentials);
        }

        let body = res.json::<LookupResponse>().await?;
        let user = body
            .users
            .into_iter()
            .next()
            .ok_or(AuthError::InvalidCredentials)?;

        Ok(VerifiedToken {
            uid: user.local_id,
            email: user.email,
            name: user.display_name,
        })
    }

    /// Set a new password for the account the token belongs to.
    pub async fn change_password(
        &self,
        id_token: &str,
        new_password: &str,
    ) -> Result<(), AuthError> {
        if !self.has_key() {
            return Err(AuthError::MissingKey);
        }

        let res = self
            .http
            .post(self.endpoint("update"))
            .json(&json!({
                "idToken": id_token,
                "password": new_password,
                "returnSecureToken": true,
            }))
            .send()
            .await?;

        if !res.status().is_success() {
            return Err(rejection(res).await);
        }

        Ok(())
    }

    /// Ask the provider to send its password-reset email.
    pub async fn send_password_reset(&self, email: &str) -> Result<(), AuthError> {
        if !self.has_key() {
            return Err(AuthError::MissingKey);
        }

        let res = self
            .http
            .post(self.endpoint("sendOobCode"))
            .json(&json!({
                "requestType": "PASSWORD_RESET",
                "email": email,
            }))
            .send()
            .await?;

        if !res.status().is_success() {
            return Err(rejection(res).await);
        }

        Ok(())
    }
}

/// Pull the provider's error code (e.g. "EMAIL_EXISTS") out of a non-2xx
/// response so callers can surface it.
async fn rejection(res: reqwest::Response) -> AuthError {
    let status = res.status();
    let body = res.text().await.unwrap_or_default();

    if let Ok(err) = serde_json::from_str::<ErrorEnvelope>(&body) {
        if !err.error.message.is_empty() {
            return AuthError::Rejected(err.error.message);
        }
    }
    AuthError::Upstream(format!("identity request failed: {status} {body}"))
}

#[derive(Debug, Deserialize)]
struct SignUpResponse {
    #[serde(rename = "localId")]
    local_id: String,
}

#[derive(Debug, Deserialize)]
struct TokenResponse {
    #[serde(rename = "idToken")]
    id_token: String,
}

#[derive(Debug, Deserialize)]
struct LookupResponse {
    #[serde(default)]
    users: Vec<LookupUser>,
}

#[derive(Debug, Deserialize)]
struct LookupUser {
    #[serde(rename = "localId")]
    local_id: String,
    email: Option<String>,
    #[serde(rename = "displayName")]
    display_name: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ErrorEnvelope {
    error: ErrorBody,
}

#[derive(Debug, Deserialize)]
struct ErrorBody {
    #[serde(default)]
    message: String,
}
