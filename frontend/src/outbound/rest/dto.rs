//! Body shapes accepted from the REST backend.
//!
//! Endpoints are inconsistent: some wrap payloads in `{data, message,
//! status}`, some paginate, and some return the bare value. Each DTO accepts
//! every shape and unwraps to the payload.

use pagination::{PageRequest, Paginated, paginate};
use serde::Deserialize;
use serde::de::DeserializeOwned;

use crate::domain::records::ApiEnvelope;

/// Single value, enveloped or bare.
#[derive(Debug, Deserialize)]
#[serde(untagged, bound = "T: DeserializeOwned")]
pub(super) enum ItemBody<T> {
    Envelope(ApiEnvelope<T>),
    Bare(T),
}

impl<T> ItemBody<T> {
    pub(super) fn into_inner(self) -> T {
        match self {
            Self::Envelope(envelope) => envelope.data,
            Self::Bare(value) => value,
        }
    }
}

/// Collection, paginated, enveloped or bare.
#[derive(Debug, Deserialize)]
#[serde(untagged, bound = "T: DeserializeOwned")]
pub(super) enum ListBody<T> {
    Paginated(Paginated<T>),
    Envelope(ApiEnvelope<Vec<T>>),
    Bare(Vec<T>),
}

impl<T> ListBody<T> {
    pub(super) fn into_vec(self) -> Vec<T> {
        match self {
            Self::Paginated(page) => page.data,
            Self::Envelope(envelope) => envelope.data,
            Self::Bare(items) => items,
        }
    }

    /// Page metadata from the backend, or a local slice of an unpaginated
    /// collection.
    pub(super) fn into_page(self, request: PageRequest) -> Paginated<T> {
        match self {
            Self::Paginated(page) => page,
            Self::Envelope(envelope) => paginate(envelope.data, request),
            Self::Bare(items) => paginate(items, request),
        }
    }
}

/// Error body; the backend uses either `message` or `error`.
#[derive(Debug, Default, Deserialize)]
pub(super) struct ErrorBody {
    #[serde(default)]
    message: Option<String>,
    #[serde(default)]
    error: Option<String>,
}

impl ErrorBody {
    pub(super) fn parse(body: &[u8]) -> Option<String> {
        let decoded: Self = serde_json::from_slice(body).ok()?;
        decoded
            .message
            .or(decoded.error)
            .map(|text| text.trim().to_owned())
            .filter(|text| !text.is_empty())
    }
}

#[cfg(test)]
mod tests {
    //! Regression coverage for body shape tolerance.
    use super::*;
    use crate::domain::records::Department;
    use rstest::rstest;

    #[rstest]
    #[case::bare(r#"[{"id":1,"name":"ER"}]"#)]
    #[case::enveloped(r#"{"data":[{"id":1,"name":"ER"}],"status":200}"#)]
    #[case::paginated(
        r#"{"data":[{"id":1,"name":"ER"}],"total":1,"page":1,"per_page":10,"total_pages":1}"#
    )]
    fn lists_decode_from_every_shape(#[case] body: &str) {
        let decoded: ListBody<Department> = serde_json::from_str(body).expect("list decodes");
        let items = decoded.into_vec();
        assert_eq!(items.len(), 1);
        assert_eq!(items.first().map(|d| d.name.as_str()), Some("ER"));
    }

    #[rstest]
    fn unpaginated_lists_are_sliced_locally() {
        let body = serde_json::to_string(
            &(1..=12)
                .map(|id| serde_json::json!({"id": id, "name": format!("D{id}")}))
                .collect::<Vec<_>>(),
        )
        .expect("encode");
        let decoded: ListBody<Department> = serde_json::from_str(&body).expect("decode");
        let page = decoded.into_page(PageRequest::new(2, 10).expect("request"));
        assert_eq!(page.data.len(), 2);
        assert_eq!(page.total, 12);
        assert_eq!(page.total_pages, 2);
    }

    #[rstest]
    #[case::bare(r#"{"id":"D1","name":"ER"}"#)]
    #[case::enveloped(r#"{"data":{"id":"D1","name":"ER"},"message":"ok"}"#)]
    fn items_decode_from_both_shapes(#[case] body: &str) {
        let decoded: ItemBody<Department> = serde_json::from_str(body).expect("item decodes");
        assert_eq!(decoded.into_inner().name, "ER");
    }

    #[rstest]
    #[case(br#"{"message":"Invalid credentials"}"#.as_slice(), Some("Invalid credentials"))]
    #[case(br#"{"error":"Forbidden"}"#.as_slice(), Some("Forbidden"))]
    #[case(br#"{"message":"  "}"#.as_slice(), None)]
    #[case(b"<html>".as_slice(), None)]
    fn error_bodies_yield_server_message(#[case] body: &[u8], #[case] expected: Option<&str>) {
        assert_eq!(ErrorBody::parse(body).as_deref(), expected);
    }
}
