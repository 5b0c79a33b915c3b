//! Mapping from HTTP failures to [`ApiError`].

use reqwest::StatusCode;

use crate::domain::ports::ApiError;
use crate::outbound::preview::status_with_preview;

use super::dto::ErrorBody;

pub(super) fn map_transport_error(error: &reqwest::Error) -> ApiError {
    if error.is_timeout() {
        ApiError::timeout(error.to_string())
    } else if error.is_decode() {
        ApiError::decode(error.to_string())
    } else {
        ApiError::transport(error.to_string())
    }
}

/// Map a non-success status, preferring the server's own message.
pub(super) fn map_status_error(status: StatusCode, body: &[u8]) -> ApiError {
    let message = ErrorBody::parse(body).unwrap_or_else(|| status_with_preview(status, body));

    match status {
        StatusCode::UNAUTHORIZED => ApiError::unauthorized(message),
        StatusCode::FORBIDDEN => ApiError::forbidden(message),
        StatusCode::NOT_FOUND => ApiError::not_found(message),
        StatusCode::REQUEST_TIMEOUT | StatusCode::GATEWAY_TIMEOUT => ApiError::timeout(message),
        _ if status.is_client_error() => ApiError::invalid_request(message),
        _ => ApiError::backend(message),
    }
}
