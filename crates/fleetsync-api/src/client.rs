// Hand-crafted async HTTP client for the device administration graph API.
//
// Two parallel surfaces: stable (`v1.0`) and preview (`beta`), identical
// paging semantics. Auth: bearer token per request -- callers acquire
// tokens scoped to each operation, so the client never caches one.

use reqwest::StatusCode;
use secrecy::{ExposeSecret, SecretString};
use serde::Serialize;
use serde::de::DeserializeOwned;
use serde_json::Value;
use tracing::debug;
use url::Url;

use crate::Error;
use crate::transport::TransportConfig;

/// Continuation-link field on paged responses.
const NEXT_LINK: &str = "@odata.nextLink";

/// Which API surface a call targets.
///
/// The surfaces expose overlapping but not identical resource shapes;
/// the path prefix is the only difference the client cares about.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ApiSurface {
    /// The stable surface (`v1.0`).
    Stable,
    /// The preview surface (`beta`) -- richer shapes, weaker guarantees.
    Preview,
}

impl ApiSurface {
    pub fn path_prefix(self) -> &'static str {
        match self {
            Self::Stable => "v1.0",
            Self::Preview => "beta",
        }
    }
}

/// Async client for the administration graph API.
///
/// Issues authenticated JSON calls and transparently follows
/// continuation links to assemble full result sets. No caching, no
/// retries -- higher layers own both concerns.
pub struct GraphClient {
    http: reqwest::Client,
    base_url: Url,
}

impl GraphClient {
    // ── Constructors ─────────────────────────────────────────────────

    /// Build from a base URL and transport config.
    pub fn new(base_url: &str, transport: &TransportConfig) -> Result<Self, Error> {
        let http = transport.build_client()?;
        Self::from_reqwest(base_url, http)
    }

    /// Wrap an existing `reqwest::Client`.
    pub fn from_reqwest(base_url: &str, http: reqwest::Client) -> Result<Self, Error> {
        let base_url = Self::normalize_base_url(base_url)?;
        Ok(Self { http, base_url })
    }

    /// Ensure the base URL ends with `/` so relative joins behave.
    fn normalize_base_url(raw: &str) -> Result<Url, Error> {
        let mut url = Url::parse(raw)?;
        let path = url.path().trim_end_matches('/').to_owned();
        url.set_path(&format!("{path}/"));
        Ok(url)
    }

    // ── URL builder ──────────────────────────────────────────────────

    /// Join a surface prefix and a relative path (which may carry query
    /// options) onto the base URL.
    pub fn endpoint_url(&self, surface: ApiSurface, path: &str) -> Result<Url, Error> {
        let path = path.trim_start_matches('/');
        let joined = self
            .base_url
            .join(&format!("{}/{path}", surface.path_prefix()))?;
        Ok(joined)
    }

    // ── HTTP verbs ───────────────────────────────────────────────────

    pub async fn get<T: DeserializeOwned>(
        &self,
        surface: ApiSurface,
        path: &str,
        token: &SecretString,
    ) -> Result<T, Error> {
        let url = self.endpoint_url(surface, path)?;
        debug!("GET {url}");

        let resp = self
            .http
            .get(url)
            .bearer_auth(token.expose_secret())
            .send()
            .await?;
        Self::handle_response(resp).await
    }

    pub async fn post<T: DeserializeOwned, B: Serialize + Sync>(
        &self,
        surface: ApiSurface,
        path: &str,
        token: &SecretString,
        body: &B,
    ) -> Result<T, Error> {
        let url = self.endpoint_url(surface, path)?;
        debug!("POST {url}");

        let resp = self
            .http
            .post(url)
            .bearer_auth(token.expose_secret())
            .json(body)
            .send()
            .await?;
        Self::handle_response(resp).await
    }

    pub async fn post_no_response<B: Serialize + Sync>(
        &self,
        surface: ApiSurface,
        path: &str,
        token: &SecretString,
        body: &B,
    ) -> Result<(), Error> {
        let url = self.endpoint_url(surface, path)?;
        debug!("POST {url}");

        let resp = self
            .http
            .post(url)
            .bearer_auth(token.expose_secret())
            .json(body)
            .send()
            .await?;
        Self::handle_empty(resp).await
    }

    pub async fn delete(
        &self,
        surface: ApiSurface,
        path: &str,
        token: &SecretString,
    ) -> Result<(), Error> {
        let url = self.endpoint_url(surface, path)?;
        debug!("DELETE {url}");

        let resp = self
            .http
            .delete(url)
            .bearer_auth(token.expose_secret())
            .send()
            .await?;
        Self::handle_empty(resp).await
    }

    // ── Response handling ────────────────────────────────────────────

    async fn handle_response<T: DeserializeOwned>(resp: reqwest::Response) -> Result<T, Error> {
        let status = resp.status();
        if status.is_success() {
            let body = resp.text().await?;
            serde_json::from_str(&body).map_err(|e| {
                let preview = &body[..body.len().min(200)];
                Error::Deserialization {
                    message: format!("{e} (body preview: {preview:?})"),
                    body,
                }
            })
        } else {
            Err(Self::parse_error(status, resp).await)
        }
    }

    async fn handle_empty(resp: reqwest::Response) -> Result<(), Error> {
        let status = resp.status();
        if status.is_success() {
            Ok(())
        } else {
            Err(Self::parse_error(status, resp).await)
        }
    }

    /// Build an [`Error::Api`] carrying the response body verbatim.
    ///
    /// Non-JSON bodies are wrapped as a JSON string -- downstream
    /// classification inspects the payload and must never lose it.
    async fn parse_error(status: StatusCode, resp: reqwest::Response) -> Error {
        let raw = resp.text().await.unwrap_or_default();
        let payload =
            serde_json::from_str::<Value>(&raw).unwrap_or_else(|_| Value::String(raw));
        Error::Api {
            status: status.as_u16(),
            payload,
        }
    }

    // ── Pagination ───────────────────────────────────────────────────

    /// Fetch every page of a collection endpoint, following the
    /// server-supplied continuation link until none is returned.
    ///
    /// Accepts the three body shapes the remote produces: an envelope
    /// with a `value` array (the common case), a bare array, or a
    /// single object (treated as a one-element result). There is no
    /// bound on page count -- callers bound result size with `$select`
    /// and `$filter` query options on the endpoint itself.
    pub async fn get_all<T: DeserializeOwned>(
        &self,
        surface: ApiSurface,
        path: &str,
        token: &SecretString,
    ) -> Result<Vec<T>, Error> {
        let mut all = Vec::new();
        let mut next: Option<Url> = Some(self.endpoint_url(surface, path)?);
        let mut pages = 0_u32;

        while let Some(url) = next.take() {
            debug!(page = pages, "GET {url}");
            let resp = self
                .http
                .get(url)
                .bearer_auth(token.expose_secret())
                .send()
                .await?;

            let status = resp.status();
            if !status.is_success() {
                return Err(Self::parse_error(status, resp).await);
            }

            let body = resp.text().await?;
            let page: Value = serde_json::from_str(&body).map_err(|e| {
                let preview = &body[..body.len().min(200)];
                Error::Deserialization {
                    message: format!("{e} (body preview: {preview:?})"),
                    body: body.clone(),
                }
            })?;

            next = page
                .get(NEXT_LINK)
                .and_then(Value::as_str)
                .map(Url::parse)
                .transpose()?;

            let items = match page {
                Value::Object(mut map) => match map.remove("value") {
                    Some(Value::Array(items)) => items,
                    Some(other) => vec![other],
                    None => vec![Value::Object(map)],
                },
                Value::Array(items) => items,
                other => vec![other],
            };

            for item in items {
                all.push(serde_json::from_value(item).map_err(|e| Error::Deserialization {
                    message: format!("page {pages}: {e}"),
                    body: body.clone(),
                })?);
            }
            pages += 1;
        }

        if pages > 1 {
            debug!(pages, total = all.len(), "assembled multi-page result");
        }
        Ok(all)
    }
}
