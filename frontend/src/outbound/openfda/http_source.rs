//! Reqwest-backed drug information adapter for the openFDA API.
//!
//! This adapter owns transport details only: query building, the optional
//! API key, timeout and HTTP error mapping, and JSON decoding into domain
//! drug types.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::{Client, StatusCode, Url};
use serde::de::DeserializeOwned;
use tracing::debug;

use super::dto::{ErrorDto, ResultsDto};
use crate::domain::drugs::{
    DrugLabel, DrugProduct, MAX_SEARCH_LIMIT, adverse_effects_search_expression,
    interaction_search_expression, name_search_expression, product_search_expression,
};
use crate::domain::ports::{DrugInformationSource, DrugSourceError};
use crate::outbound::preview::status_with_preview;

/// Drug information source that queries `{base}/ndc.json` and
/// `{base}/label.json`.
#[derive(Debug, Clone)]
pub struct OpenFdaHttpSource {
    client: Client,
    base: String,
    api_key: Option<String>,
}

impl OpenFdaHttpSource {
    /// Build an adapter using a reqwest client with an explicit request
    /// timeout. A blank `api_key` is treated as absent.
    ///
    /// # Errors
    ///
    /// Returns an error when the reqwest client cannot be constructed.
    pub fn new(
        base: &Url,
        api_key: Option<String>,
        timeout: Duration,
    ) -> Result<Self, reqwest::Error> {
        let client = Client::builder().timeout(timeout).build()?;
        Ok(Self {
            client,
            base: base.as_str().trim_end_matches('/').to_owned(),
            api_key: api_key.filter(|key| !key.trim().is_empty()),
        })
    }

    async fn query<T: DeserializeOwned>(
        &self,
        endpoint: &str,
        search: &str,
        limit: Option<u32>,
    ) -> Result<Vec<T>, DrugSourceError> {
        let url = format!("{}/{endpoint}", self.base);
        let mut params: Vec<(&str, String)> = vec![("search", search.to_owned())];
        if let Some(limit) = limit {
            params.push(("limit", limit.to_string()));
        }
        if let Some(key) = &self.api_key {
            params.push(("api_key", key.clone()));
        }
        debug!(endpoint, search, "drug API request");

        let response = self
            .client
            .get(url)
            .header(reqwest::header::ACCEPT, "application/json")
            .query(&params)
            .send()
            .await
            .map_err(|err| map_transport_error(&err))?;
        let status = response.status();
        let body = response
            .bytes()
            .await
            .map_err(|err| map_transport_error(&err))?;

        if status == StatusCode::NOT_FOUND {
            // openFDA answers "no matches" with 404.
            debug!(endpoint, search, "drug API found no matches");
            return Ok(Vec::new());
        }
        if !status.is_success() {
            return Err(map_status_error(status, body.as_ref()));
        }
        parse_results(body.as_ref())
    }
}

#[async_trait]
impl DrugInformationSource for OpenFdaHttpSource {
    async fn search_by_name(
        &self,
        name: &str,
        limit: u32,
    ) -> Result<Vec<DrugProduct>, DrugSourceError> {
        let search = name_search_expression(name)?;
        self.query("ndc.json", &search, Some(limit.clamp(1, MAX_SEARCH_LIMIT)))
            .await
    }

    async fn details(&self, ndc: &str) -> Result<Option<DrugLabel>, DrugSourceError> {
        let search = product_search_expression(ndc)?;
        let labels: Vec<DrugLabel> = self.query("label.json", &search, Some(1)).await?;
        Ok(labels.into_iter().next())
    }

    async fn interactions(&self, names: &[String]) -> Result<Vec<DrugLabel>, DrugSourceError> {
        let search = interaction_search_expression(names)?;
        self.query("label.json", &search, None).await
    }

    async fn adverse_effects(&self, name: &str) -> Result<Vec<DrugLabel>, DrugSourceError> {
        let search = adverse_effects_search_expression(name)?;
        self.query("label.json", &search, None).await
    }
}

fn parse_results<T: DeserializeOwned>(body: &[u8]) -> Result<Vec<T>, DrugSourceError> {
    let decoded: ResultsDto<T> = serde_json::from_slice(body).map_err(|error| {
        DrugSourceError::decode(format!("invalid drug API JSON payload: {error}"))
    })?;
    debug!(total = decoded.total(), returned = decoded.results.len(), "drug API results");
    Ok(decoded.results)
}

fn map_transport_error(error: &reqwest::Error) -> DrugSourceError {
    if error.is_timeout() {
        DrugSourceError::timeout(error.to_string())
    } else {
        DrugSourceError::transport(error.to_string())
    }
}

fn map_status_error(status: StatusCode, body: &[u8]) -> DrugSourceError {
    let detail = ErrorDto::parse(body);
    if let Some(code) = detail.as_ref().and_then(|found| found.code.as_deref()) {
        debug!(status = status.as_u16(), code, "drug API error code");
    }
    let message = match detail.and_then(|found| found.message) {
        Some(text) => format!("status {}: {text}", status.as_u16()),
        None => status_with_preview(status, body),
    };

    match status {
        StatusCode::TOO_MANY_REQUESTS => DrugSourceError::rate_limited(message),
        StatusCode::REQUEST_TIMEOUT | StatusCode::GATEWAY_TIMEOUT => {
            DrugSourceError::timeout(message)
        }
        _ if status.is_client_error() => DrugSourceError::invalid_request(message),
        _ => DrugSourceError::transport(message),
    }
}

#[cfg(test)]
mod tests {
    //! Regression coverage for non-network openFDA mapping helpers.
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case::rate_limited(
        StatusCode::TOO_MANY_REQUESTS,
        DrugSourceError::rate_limited("status 429: slow down")
    )]
    #[case::bad_request(
        StatusCode::BAD_REQUEST,
        DrugSourceError::invalid_request("status 400: slow down")
    )]
    #[case::gateway_timeout(
        StatusCode::GATEWAY_TIMEOUT,
        DrugSourceError::timeout("status 504: slow down")
    )]
    #[case::server_error(
        StatusCode::INTERNAL_SERVER_ERROR,
        DrugSourceError::transport("status 500: slow down")
    )]
    fn maps_statuses(#[case] status: StatusCode, #[case] expected: DrugSourceError) {
        let body = br#"{"error":{"code":"X","message":"slow down"}}"#;
        assert_eq!(map_status_error(status, body), expected);
    }

    #[rstest]
    fn non_json_errors_fall_back_to_a_preview() {
        let body = b"<html>\n  too   many </html>";
        assert_eq!(
            map_status_error(StatusCode::TOO_MANY_REQUESTS, body),
            DrugSourceError::rate_limited("status 429: <html> too many </html>")
        );
    }

    #[rstest]
    fn parses_labels() {
        let body = br#"{"results":[{"effective_time":"20240101","warnings":["Do not exceed"]}]}"#;
        let labels: Vec<DrugLabel> = parse_results(body).expect("labels");
        assert_eq!(labels.len(), 1);
        assert_eq!(
            labels.first().and_then(|l| l.effective_time.as_deref()),
            Some("20240101")
        );
    }

    #[rstest]
    fn malformed_payloads_are_decode_errors() {
        let err = parse_results::<DrugProduct>(b"not json").expect_err("decode fails");
        assert!(matches!(err, DrugSourceError::Decode { .. }));
    }

    #[rstest]
    fn blank_api_keys_are_dropped() {
        let base = Url::parse("https://api.fda.gov/drug/").expect("url");
        let source = OpenFdaHttpSource::new(&base, Some("  ".into()), Duration::from_secs(1))
            .expect("source");
        assert!(source.api_key.is_none());
        assert_eq!(source.base, "https://api.fda.gov/drug");
    }

    #[rstest]
    #[tokio::test]
    async fn blank_names_fail_before_any_request() {
        let base = Url::parse("http://127.0.0.1:9").expect("url");
        let source =
            OpenFdaHttpSource::new(&base, None, Duration::from_millis(50)).expect("source");
        let err = source.search_by_name("  ", 5).await.expect_err("blank name");
        assert!(matches!(err, DrugSourceError::InvalidRequest { .. }));
    }
}
