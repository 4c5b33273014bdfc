use crate::{session::SessionStore, Error, Result};
use backoffice_types::Envelope;
use reqwest::{header::CONTENT_TYPE, Client as ReqwestClient, Method};
use serde::{de::DeserializeOwned, Serialize};
use std::{sync::Arc, time::Duration};
use tracing::{debug, warn};
use url::Url;

/// Base URL used when neither configuration nor environment provide one.
pub const DEFAULT_API_URL: &str = "http://localhost:8080/api/v1";

/// Environment variable overriding the base URL.
pub const API_URL_ENV: &str = "BACKOFFICE_API_URL";

/// Timeout for connections and requests
pub const TIMEOUT: Duration = Duration::from_secs(30);

/// JSON-over-HTTP client for the backoffice backend.
///
/// Every request carries `Content-Type: application/json` and, when the
/// session store holds one, a bearer token. Responses are decoded into an
/// [Envelope]. Non-2xx statuses and transport failures are returned as
/// errors without retrying.
#[derive(Clone)]
pub struct HttpClient {
    base_url: String,
    http_client: ReqwestClient,
    session: Arc<dyn SessionStore>,
}

impl HttpClient {
    /// Create a new client
    pub fn new(base_url: &str, session: Arc<dyn SessionStore>) -> Result<Self> {
        Self::with_timeout(base_url, session, TIMEOUT)
    }

    pub fn with_timeout(
        base_url: &str,
        session: Arc<dyn SessionStore>,
        timeout: Duration,
    ) -> Result<Self> {
        let parsed = Url::parse(base_url)?;
        match parsed.scheme() {
            "http" | "https" => {}
            scheme => return Err(Error::InvalidScheme(scheme.to_string())),
        }

        let http_client = ReqwestClient::builder()
            .timeout(timeout)
            .pool_idle_timeout(Duration::from_secs(60))
            .tcp_keepalive(Duration::from_secs(30))
            .build()?;

        Ok(Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            http_client,
            session,
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub fn session(&self) -> &Arc<dyn SessionStore> {
        &self.session
    }

    /// Joins `endpoint` onto the base URL, keeping any base path (e.g. `/api/v1`).
    pub fn url(&self, endpoint: &str) -> Result<Url> {
        Ok(Url::parse(&format!("{}{}", self.base_url, endpoint))?)
    }

    pub async fn get<T: DeserializeOwned>(&self, endpoint: &str) -> Result<Envelope<T>> {
        self.request::<T, ()>(Method::GET, endpoint, None).await
    }

    pub async fn post<T, B>(&self, endpoint: &str, body: Option<&B>) -> Result<Envelope<T>>
    where
        T: DeserializeOwned,
        B: Serialize + ?Sized,
    {
        self.request(Method::POST, endpoint, body).await
    }

    /// POST without a request body.
    pub async fn post_empty<T: DeserializeOwned>(&self, endpoint: &str) -> Result<Envelope<T>> {
        self.request::<T, ()>(Method::POST, endpoint, None).await
    }

    pub async fn put<T, B>(&self, endpoint: &str, body: Option<&B>) -> Result<Envelope<T>>
    where
        T: DeserializeOwned,
        B: Serialize + ?Sized,
    {
        self.request(Method::PUT, endpoint, body).await
    }

    pub async fn delete<T: DeserializeOwned>(&self, endpoint: &str) -> Result<Envelope<T>> {
        self.request::<T, ()>(Method::DELETE, endpoint, None).await
    }

    async fn request<T, B>(
        &self,
        method: Method,
        endpoint: &str,
        body: Option<&B>,
    ) -> Result<Envelope<T>>
    where
        T: DeserializeOwned,
        B: Serialize + ?Sized,
    {
        let url = self.url(endpoint)?;
        let mut request = self
            .http_client
            .request(method.clone(), url.clone())
            .header(CONTENT_TYPE, "application/json");
        if let Some(token) = self.session.token() {
            request = request.bearer_auth(token);
        }
        if let Some(body) = body {
            request = request.body(serde_json::to_vec(body)?);
        }
        debug!(%method, %url, "Sending API request");

        let response = request.send().await.map_err(|err| {
            warn!(%method, %url, ?err, "API request failed");
            Error::Reqwest(err)
        })?;
        let status = response.status();
        if !status.is_success() {
            warn!(%method, %url, %status, "API request failed");
            return Err(Error::Failed(status));
        }

        response.json::<Envelope<T>>().await.map_err(|err| {
            warn!(%method, %url, ?err, "Failed to decode API response");
            Error::Reqwest(err)
        })
    }
}
