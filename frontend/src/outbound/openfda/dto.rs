//! DTOs for decoding openFDA responses.

use serde::Deserialize;
use serde::de::DeserializeOwned;

/// `{meta, results}` wrapper shared by every openFDA endpoint.
#[derive(Debug, Deserialize)]
#[serde(bound = "T: DeserializeOwned")]
pub(super) struct ResultsDto<T> {
    #[serde(default)]
    pub(super) meta: Option<MetaDto>,
    #[serde(default = "Vec::new")]
    pub(super) results: Vec<T>,
}

#[derive(Debug, Deserialize)]
pub(super) struct MetaDto {
    #[serde(default)]
    pub(super) results: Option<ResultCountsDto>,
}

#[derive(Debug, Deserialize)]
pub(super) struct ResultCountsDto {
    #[serde(default)]
    pub(super) total: u64,
}

impl<T> ResultsDto<T> {
    /// Total matches reported by the API, if any.
    pub(super) fn total(&self) -> Option<u64> {
        self.meta
            .as_ref()
            .and_then(|meta| meta.results.as_ref())
            .map(|counts| counts.total)
    }
}

/// `{"error": {"code", "message"}}` body.
#[derive(Debug, Deserialize)]
pub(super) struct ErrorDto {
    pub(super) error: ErrorDetailDto,
}

#[derive(Debug, Deserialize)]
pub(super) struct ErrorDetailDto {
    #[serde(default)]
    pub(super) code: Option<String>,
    #[serde(default)]
    pub(super) message: Option<String>,
}

impl ErrorDto {
    pub(super) fn parse(body: &[u8]) -> Option<ErrorDetailDto> {
        serde_json::from_slice::<Self>(body)
            .ok()
            .map(|decoded| decoded.error)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::drugs::DrugProduct;

    #[test]
    fn decodes_results_and_total() {
        let body = r#"{
            "meta": {"results": {"skip": 0, "limit": 1, "total": 42}},
            "results": [{"product_ndc": "0363-0218", "brand_name": "Aspirin"}]
        }"#;
        let decoded: ResultsDto<DrugProduct> = serde_json::from_str(body).expect("decodes");
        assert_eq!(decoded.total(), Some(42));
        assert_eq!(decoded.results.len(), 1);
    }

    #[test]
    fn missing_results_decode_as_empty() {
        let decoded: ResultsDto<DrugProduct> =
            serde_json::from_str(r#"{"meta": {}}"#).expect("decodes");
        assert!(decoded.results.is_empty());
        assert_eq!(decoded.total(), None);
    }

    #[test]
    fn parses_error_detail() {
        let body = br#"{"error":{"code":"NOT_FOUND","message":"No matches found!"}}"#;
        let detail = ErrorDto::parse(body).expect("error body");
        assert_eq!(detail.code.as_deref(), Some("NOT_FOUND"));
        assert_eq!(detail.message.as_deref(), Some("No matches found!"));
    }
}
