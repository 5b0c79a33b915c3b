//! Driven port for the backend's authentication endpoints.
//!
//! The application context calls this port to exchange credentials for an
//! [`AuthGrant`] without knowing the HTTP details, which keeps login flows
//! testable with a mock.

use async_trait::async_trait;

use crate::domain::{AuthGrant, DomainError, LoginCredentials, Registration};

use super::define_port_error;

define_port_error! {
    /// Failures of calls to the REST backend.
    pub enum ApiError {
        /// The backend could not be reached or the connection failed.
        Transport { message: String } => "backend transport failed: {message}",
        /// The request or the backend timed out.
        Timeout { message: String } => "backend timed out: {message}",
        /// The backend rejected the credentials or the session token.
        Unauthorized { message: String } => "backend rejected credentials: {message}",
        /// The session is valid but lacks permission.
        Forbidden { message: String } => "backend refused access: {message}",
        /// The addressed record does not exist.
        NotFound { message: String } => "backend record not found: {message}",
        /// The backend rejected the payload.
        InvalidRequest { message: String } => "backend rejected request: {message}",
        /// The backend failed while handling the request.
        Backend { message: String } => "backend failed: {message}",
        /// The response body did not have the expected shape.
        Decode { message: String } => "backend response malformed: {message}",
    }
}

impl From<ApiError> for DomainError {
    fn from(value: ApiError) -> Self {
        match value {
            ApiError::Unauthorized { message } => Self::unauthorized(message),
            ApiError::Forbidden { message } => Self::forbidden(message),
            ApiError::NotFound { message } => Self::not_found(message),
            ApiError::InvalidRequest { message } => Self::invalid_request(message),
            ApiError::Timeout { message } => Self::timeout(message),
            ApiError::Transport { message } | ApiError::Backend { message } => {
                Self::unavailable(message)
            }
            ApiError::Decode { message } => Self::internal(message),
        }
    }
}

/// Port for exchanging credentials for a session grant.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait AuthGateway: Send + Sync {
    /// `POST /auth/login`.
    async fn login(&self, credentials: &LoginCredentials) -> Result<AuthGrant, ApiError>;

    /// `POST /auth/register`.
    async fn register(&self, registration: &Registration) -> Result<AuthGrant, ApiError>;
}

#[cfg(test)]
mod tests {
    //! Regression coverage for inline error mapping.
    use super::*;
    use crate::domain::ErrorCode;
    use rstest::rstest;

    #[rstest]
    #[case(ApiError::unauthorized("invalid credentials"), ErrorCode::Unauthorized)]
    #[case(ApiError::forbidden("admins only"), ErrorCode::Forbidden)]
    #[case(ApiError::not_found("no such doctor"), ErrorCode::NotFound)]
    #[case(ApiError::invalid_request("name required"), ErrorCode::InvalidRequest)]
    #[case(ApiError::timeout("30s elapsed"), ErrorCode::Timeout)]
    #[case(ApiError::transport("connection refused"), ErrorCode::Unavailable)]
    #[case(ApiError::backend("status 500"), ErrorCode::Unavailable)]
    #[case(ApiError::decode("missing field"), ErrorCode::InternalError)]
    fn maps_to_inline_error_codes(#[case] error: ApiError, #[case] expected: ErrorCode) {
        assert_eq!(DomainError::from(error).code(), expected);
    }

    #[rstest]
    fn keeps_server_message_for_display() {
        let inline = DomainError::from(ApiError::invalid_request("department name taken"));
        assert_eq!(inline.inline_message(), "department name taken");
    }
}
