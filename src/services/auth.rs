//! Auth service client: health, login, register, current user.

use reqwest::header::{HeaderValue, AUTHORIZATION};
use serde::{Deserialize, Serialize};
use tracing::{debug, instrument};

use crate::client::{Dispatcher, RequestOptions};
use crate::error::{Result, ServiceError};
use crate::routing::ServiceKind;

/// Auth service health payload.
#[derive(Debug, Clone, Deserialize)]
pub struct AuthHealth {
    /// Reported status, "UP" when healthy.
    pub status: String,
    /// Service name as reported by the backend.
    pub service: String,
    /// Server timestamp, epoch milliseconds.
    pub timestamp: i64,
}

/// Login request body.
#[derive(Debug, Clone, Serialize)]
pub struct LoginRequest {
    /// Account username.
    pub username: String,
    /// Account password.
    pub password: String,
}

/// Authenticated user as returned by the auth service.
#[derive(Debug, Clone, Deserialize)]
pub struct UserInfo {
    /// User identifier.
    pub id: u64,
    /// Username.
    pub username: String,
    /// Email, present on the current-user endpoint only.
    #[serde(default)]
    pub email: Option<String>,
    /// Role, e.g. "ADMIN".
    pub role: String,
}

/// Login response.
///
/// The upstream service answers HTTP 200 for bad credentials too; failure
/// is signalled by `success: false` plus a message.
#[derive(Debug, Clone, Deserialize)]
pub struct LoginResponse {
    /// Whether authentication succeeded.
    pub success: bool,
    /// Bearer token, present on success.
    #[serde(default)]
    pub token: Option<String>,
    /// The authenticated user, present on success.
    #[serde(default)]
    pub user: Option<UserInfo>,
    /// Failure detail, present on rejection.
    #[serde(default)]
    pub message: Option<String>,
}

/// Registration request body.
#[derive(Debug, Clone, Serialize)]
pub struct RegisterRequest {
    /// Desired username.
    pub username: String,
    /// Contact email.
    pub email: String,
}

/// Registration response.
#[derive(Debug, Clone, Deserialize)]
pub struct RegisterResponse {
    /// Whether registration succeeded.
    pub success: bool,
    /// Human-readable outcome.
    #[serde(default)]
    pub message: Option<String>,
    /// Assigned user identifier.
    #[serde(rename = "userId", default)]
    pub user_id: Option<u64>,
}

/// Current-user response.
#[derive(Debug, Clone, Deserialize)]
pub struct CurrentUserResponse {
    /// Whether the token was accepted.
    pub success: bool,
    /// The user the token belongs to, present on success.
    #[serde(default)]
    pub user: Option<UserInfo>,
    /// Failure detail, present on rejection.
    #[serde(default)]
    pub message: Option<String>,
}

/// Typed client for the auth service.
#[derive(Debug, Clone)]
pub struct AuthClient {
    dispatcher: Dispatcher,
}

impl AuthClient {
    /// Wrap a dispatcher.
    pub fn new(dispatcher: Dispatcher) -> Self {
        Self { dispatcher }
    }

    /// Probe the auth service health endpoint.
    #[instrument(skip(self))]
    pub async fn health(&self) -> Result<AuthHealth> {
        let endpoint = "/api/auth/health";
        let response = self.dispatcher.get(endpoint).await?;

        if !response.status().is_success() {
            return Err(ServiceError::UnexpectedStatus {
                service: ServiceKind::Auth,
                status: response.status().as_u16(),
                endpoint: endpoint.to_string(),
            }
            .into());
        }

        decode(response, endpoint).await
    }

    /// Authenticate with username and password.
    #[instrument(skip(self, password))]
    pub async fn login(&self, username: &str, password: &str) -> Result<LoginResponse> {
        let endpoint = "/api/auth/login";
        let body = LoginRequest {
            username: username.to_string(),
            password: password.to_string(),
        };

        let response = self
            .dispatcher
            .request(endpoint, RequestOptions::post().json(&body)?)
            .await?;

        let login: LoginResponse = decode(response, endpoint).await?;
        debug!(success = login.success, "login attempt completed");
        Ok(login)
    }

    /// Register a new account.
    #[instrument(skip(self))]
    pub async fn register(&self, username: &str, email: &str) -> Result<RegisterResponse> {
        let endpoint = "/api/auth/register";
        let body = RegisterRequest {
            username: username.to_string(),
            email: email.to_string(),
        };

        let response = self
            .dispatcher
            .request(endpoint, RequestOptions::post().json(&body)?)
            .await?;

        decode(response, endpoint).await
    }

    /// Fetch the user a bearer token belongs to.
    #[instrument(skip(self, token))]
    pub async fn current_user(&self, token: &str) -> Result<CurrentUserResponse> {
        let endpoint = "/api/auth/user";
        let bearer = HeaderValue::from_str(&format!("Bearer {token}")).map_err(|e| {
            ServiceError::InvalidRequest {
                service: ServiceKind::Auth,
                endpoint: endpoint.to_string(),
                reason: format!("invalid bearer token: {e}"),
            }
        })?;

        let response = self
            .dispatcher
            .request(endpoint, RequestOptions::new().header(AUTHORIZATION, bearer))
            .await?;

        decode(response, endpoint).await
    }
}

async fn decode<T: serde::de::DeserializeOwned>(
    response: reqwest::Response,
    endpoint: &str,
) -> Result<T> {
    response.json().await.map_err(|e| {
        ServiceError::Decode {
            service: ServiceKind::Auth,
            endpoint: endpoint.to_string(),
            reason: e.to_string(),
        }
        .into()
    })
}
