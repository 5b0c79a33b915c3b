//! Reqwest client for the hospital REST backend.
//!
//! The client owns transport details only: URL building, the bearer header,
//! timeouts, status mapping and body decoding. It reads the session store on
//! every request and never writes it.

use std::time::Duration;

use reqwest::{Client, Method, RequestBuilder, Url};
use serde::Serialize;
use serde::de::DeserializeOwned;
use tracing::debug;

use crate::domain::SessionStore;
use crate::domain::ports::ApiError;

use super::dto::{ItemBody, ListBody};
use super::errors::{map_status_error, map_transport_error};

/// HTTP client bound to one API base URL and one session store.
#[derive(Debug, Clone)]
pub struct RestClient {
    client: Client,
    base: String,
    session: SessionStore,
}

impl RestClient {
    /// Build a client with an explicit request timeout.
    ///
    /// # Errors
    ///
    /// Returns an error when the reqwest client cannot be constructed.
    pub fn new(
        base: &Url,
        timeout: Duration,
        session: SessionStore,
    ) -> Result<Self, reqwest::Error> {
        let client = Client::builder().timeout(timeout).build()?;
        Ok(Self {
            client,
            base: base.as_str().trim_end_matches('/').to_owned(),
            session,
        })
    }

    /// Session store consulted for the bearer token.
    #[must_use]
    pub const fn session(&self) -> &SessionStore {
        &self.session
    }

    /// Absolute URL for an API path such as `/users/7`.
    ///
    /// # Errors
    ///
    /// Returns [`ApiError::InvalidRequest`] when the result is not a URL.
    pub fn url(&self, path: &str) -> Result<Url, ApiError> {
        let joined = format!("{}/{}", self.base, path.trim_start_matches('/'));
        Url::parse(&joined).map_err(|err| ApiError::invalid_request(format!("{joined}: {err}")))
    }

    fn request(&self, method: Method, path: &str) -> Result<RequestBuilder, ApiError> {
        let url = self.url(path)?;
        debug!(%method, path, "backend request");
        let builder = self
            .client
            .request(method, url)
            .header(reqwest::header::ACCEPT, "application/json");
        Ok(match self.session.token() {
            Some(token) => builder.bearer_auth(token.expose()),
            None => builder,
        })
    }

    async fn send(builder: RequestBuilder) -> Result<Vec<u8>, ApiError> {
        let response = builder.send().await.map_err(|err| map_transport_error(&err))?;
        let status = response.status();
        let body = response.bytes().await.map_err(|err| map_transport_error(&err))?;
        if !status.is_success() {
            debug!(status = status.as_u16(), "backend request failed");
            return Err(map_status_error(status, body.as_ref()));
        }
        Ok(body.to_vec())
    }

    async fn send_json<T: DeserializeOwned>(builder: RequestBuilder) -> Result<T, ApiError> {
        let body = Self::send(builder).await?;
        serde_json::from_slice(&body)
            .map_err(|err| ApiError::decode(format!("invalid backend JSON payload: {err}")))
    }

    /// `GET path`, unwrapping an optional `{data}` envelope.
    ///
    /// # Errors
    ///
    /// Returns [`ApiError`] for transport, status or decode failures.
    pub async fn get<T: DeserializeOwned>(&self, path: &str) -> Result<T, ApiError> {
        let body: ItemBody<T> = Self::send_json(self.request(Method::GET, path)?).await?;
        Ok(body.into_inner())
    }

    /// `GET path?query` returning a collection in any list shape.
    ///
    /// # Errors
    ///
    /// Returns [`ApiError`] for transport, status or decode failures.
    pub async fn get_list<T, Q>(&self, path: &str, query: &Q) -> Result<Vec<T>, ApiError>
    where
        T: DeserializeOwned,
        Q: Serialize + ?Sized + Sync,
    {
        let body: ListBody<T> = self.fetch_list(path, query).await?;
        Ok(body.into_vec())
    }

    pub(super) async fn fetch_list<T, Q>(
        &self,
        path: &str,
        query: &Q,
    ) -> Result<ListBody<T>, ApiError>
    where
        T: DeserializeOwned,
        Q: Serialize + ?Sized + Sync,
    {
        Self::send_json(self.request(Method::GET, path)?.query(query)).await
    }

    /// `POST path` with a JSON body.
    ///
    /// # Errors
    ///
    /// Returns [`ApiError`] for transport, status or decode failures.
    pub async fn post<B, T>(&self, path: &str, body: &B) -> Result<T, ApiError>
    where
        B: Serialize + ?Sized + Sync,
        T: DeserializeOwned,
    {
        let decoded: ItemBody<T> =
            Self::send_json(self.request(Method::POST, path)?.json(body)).await?;
        Ok(decoded.into_inner())
    }

    /// `PUT path` with a JSON body.
    ///
    /// # Errors
    ///
    /// Returns [`ApiError`] for transport, status or decode failures.
    pub async fn put<B, T>(&self, path: &str, body: &B) -> Result<T, ApiError>
    where
        B: Serialize + ?Sized + Sync,
        T: DeserializeOwned,
    {
        let decoded: ItemBody<T> =
            Self::send_json(self.request(Method::PUT, path)?.json(body)).await?;
        Ok(decoded.into_inner())
    }

    /// `DELETE path`; any response body is ignored.
    ///
    /// # Errors
    ///
    /// Returns [`ApiError`] for transport or status failures.
    pub async fn delete(&self, path: &str) -> Result<(), ApiError> {
        Self::send(self.request(Method::DELETE, path)?).await?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    use crate::domain::ports::InMemorySessionStorage;
    use rstest::rstest;

    fn client(base: &str) -> RestClient {
        let session = SessionStore::rehydrate(Arc::new(InMemorySessionStorage::default()));
        let base = Url::parse(base).expect("base url");
        RestClient::new(&base, Duration::from_secs(1), session).expect("client")
    }

    #[rstest]
    #[case("http://localhost:5000/api", "/users", "http://localhost:5000/api/users")]
    #[case("http://localhost:5000/api/", "users/7", "http://localhost:5000/api/users/7")]
    #[case("http://h/api", "/doctors/3/availabilities", "http://h/api/doctors/3/availabilities")]
    fn urls_keep_the_base_path(#[case] base: &str, #[case] path: &str, #[case] expected: &str) {
        assert_eq!(client(base).url(path).expect("url").as_str(), expected);
    }
}
