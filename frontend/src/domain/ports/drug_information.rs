//! Port for the public drug information API.

use async_trait::async_trait;

use crate::domain::DomainError;
use crate::domain::drugs::{DrugLabel, DrugProduct, DrugQueryError};

use super::define_port_error;

define_port_error! {
    /// Errors raised by drug information adapters.
    pub enum DrugSourceError {
        /// The search input was rejected before or by the API.
        InvalidRequest { message: String } => "invalid drug lookup: {message}",
        /// The API could not be reached.
        Transport { message: String } => "drug API transport failed: {message}",
        /// The API did not answer in time.
        Timeout { message: String } => "drug API timed out: {message}",
        /// The API key exceeded its quota.
        RateLimited { message: String } => "drug API rate limited: {message}",
        /// The response did not have the expected shape.
        Decode { message: String } => "drug API response malformed: {message}",
    }
}

impl From<DrugQueryError> for DrugSourceError {
    fn from(value: DrugQueryError) -> Self {
        Self::invalid_request(value.to_string())
    }
}

impl From<DrugSourceError> for DomainError {
    fn from(value: DrugSourceError) -> Self {
        match value {
            DrugSourceError::InvalidRequest { message } => Self::invalid_request(message),
            DrugSourceError::Timeout { message } => Self::timeout(message),
            DrugSourceError::Transport { message } | DrugSourceError::RateLimited { message } => {
                Self::unavailable(message)
            }
            DrugSourceError::Decode { message } => Self::internal(message),
        }
    }
}

/// Port for drug product and label lookups.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait DrugInformationSource: Send + Sync {
    /// Products whose generic or brand name matches `name`.
    async fn search_by_name(
        &self,
        name: &str,
        limit: u32,
    ) -> Result<Vec<DrugProduct>, DrugSourceError>;

    /// Label for one product code, if published.
    async fn details(&self, ndc: &str) -> Result<Option<DrugLabel>, DrugSourceError>;

    /// Labels whose interaction section mentions every name.
    async fn interactions(&self, names: &[String]) -> Result<Vec<DrugLabel>, DrugSourceError>;

    /// Labels for brand `name` that list adverse reactions.
    async fn adverse_effects(&self, name: &str) -> Result<Vec<DrugLabel>, DrugSourceError>;
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::ErrorCode;

    #[test]
    fn query_errors_become_invalid_requests() {
        let err = DrugSourceError::from(DrugQueryError::EmptyTerm);
        assert!(matches!(err, DrugSourceError::InvalidRequest { .. }));
        assert_eq!(DomainError::from(err).code(), ErrorCode::InvalidRequest);
    }

    #[test]
    fn rate_limits_surface_as_unavailable() {
        let inline = DomainError::from(DrugSourceError::rate_limited("quota exhausted"));
        assert_eq!(inline.code(), ErrorCode::Unavailable);
        assert_eq!(inline.inline_message(), "quota exhausted");
    }
}
