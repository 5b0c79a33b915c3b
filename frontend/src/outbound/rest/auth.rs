//! [`AuthGateway`] over the backend's `/auth` endpoints.

use async_trait::async_trait;
use serde::Serialize;
use tracing::{info, warn};

use crate::domain::ports::{ApiError, AuthGateway};
use crate::domain::{AuthGrant, LoginCredentials, Registration, Role};

use super::client::RestClient;

#[derive(Serialize)]
struct LoginRequest<'a> {
    username: &'a str,
    password: &'a str,
}

#[derive(Serialize)]
struct RegisterRequest<'a> {
    username: &'a str,
    password: &'a str,
    email: &'a str,
    role: Role,
    #[serde(skip_serializing_if = "Option::is_none")]
    first_name: Option<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    last_name: Option<&'a str>,
}

impl<'a> From<&'a Registration> for RegisterRequest<'a> {
    fn from(value: &'a Registration) -> Self {
        Self {
            username: value.credentials().username(),
            password: value.credentials().password(),
            email: value.email(),
            role: value.role(),
            first_name: value.first_name(),
            last_name: value.last_name(),
        }
    }
}

/// Authentication gateway backed by [`RestClient`].
#[derive(Debug, Clone)]
pub struct HttpAuthGateway {
    client: RestClient,
}

impl HttpAuthGateway {
    /// Gateway sending through `client`.
    #[must_use]
    pub const fn new(client: RestClient) -> Self {
        Self { client }
    }
}

#[async_trait]
impl AuthGateway for HttpAuthGateway {
    async fn login(&self, credentials: &LoginCredentials) -> Result<AuthGrant, ApiError> {
        let request = LoginRequest {
            username: credentials.username(),
            password: credentials.password(),
        };
        let result: Result<AuthGrant, ApiError> = self.client.post("/auth/login", &request).await;
        match &result {
            Ok(grant) => info!(
                username = %grant.identity.username(),
                role = %grant.identity.role(),
                "login accepted"
            ),
            Err(error) => warn!(username = credentials.username(), %error, "login rejected"),
        }
        result
    }

    async fn register(&self, registration: &Registration) -> Result<AuthGrant, ApiError> {
        let request = RegisterRequest::from(registration);
        let result: Result<AuthGrant, ApiError> =
            self.client.post("/auth/register", &request).await;
        if let Err(error) = &result {
            warn!(username = request.username, %error, "registration rejected");
        }
        result
    }
}
