// Firefly API HTTP client
//
// Wraps `reqwest::Client` with Firefly URL construction, API-key injection,
// and envelope checking. Endpoint groups (devices, packets, applications,
// device classes) are inherent methods in sibling files so this module stays
// focused on transport mechanics.

mod applications;
mod device_classes;
mod devices;
mod packets;

use reqwest::{Method, StatusCode};
use secrecy::{ExposeSecret, SecretString};
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};
use url::Url;

use crate::error::Error;
use crate::models::ApiResponse;
use crate::query::QueryParams;
use crate::transport::TransportConfig;

/// Query parameter carrying the API key on every request.
const AUTH_PARAM: &str = "auth";

const BODY_PREVIEW_CHARS: usize = 200;

/// Just the `error` key of any response body.
#[derive(Deserialize)]
struct ErrorProbe {
    #[serde(default)]
    error: Option<String>,
}

// ── Client ───────────────────────────────────────────────────────────

/// Async client for the Firefly device-management API.
///
/// Holds no mutable state; share it freely across tasks. Each method makes
/// exactly one HTTP round trip, with no retries or caching.
#[derive(Debug, Clone)]
pub struct FireflyClient {
    http: reqwest::Client,
    base_url: Url,
    api_key: Option<SecretString>,
}

impl FireflyClient {
    // ── Constructors ─────────────────────────────────────────────────

    /// Build from a base URL (e.g. `https://api.fireflyiot.com/api/v1/`),
    /// an API key, and transport settings.
    pub fn from_api_key(
        base_url: &str,
        api_key: SecretString,
        transport: &TransportConfig,
    ) -> Result<Self, Error> {
        let http = transport.build_client()?;
        let base_url = Self::normalize_base_url(base_url)?;
        Ok(Self {
            http,
            base_url,
            api_key: Some(api_key),
        })
    }

    /// Wrap an existing `reqwest::Client`. No API key is attached unless
    /// one is added with [`with_api_key`](Self::with_api_key).
    pub fn from_reqwest(base_url: &str, http: reqwest::Client) -> Result<Self, Error> {
        let base_url = Self::normalize_base_url(base_url)?;
        Ok(Self {
            http,
            base_url,
            api_key: None,
        })
    }

    pub fn with_api_key(mut self, api_key: SecretString) -> Self {
        self.api_key = Some(api_key);
        self
    }

    /// The normalized base URL (always ends with `/`).
    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    fn normalize_base_url(raw: &str) -> Result<Url, Error> {
        let mut url = Url::parse(raw)?;
        if url.cannot_be_a_base() {
            return Err(Error::InvalidBaseUrl(raw.to_owned()));
        }

        let path = url.path().trim_end_matches('/').to_owned();
        url.set_path(&format!("{path}/"));
        url.set_query(None);
        url.set_fragment(None);

        Ok(url)
    }

    // ── URL builder ──────────────────────────────────────────────────

    /// Append path segments to the base URL, percent-encoding each one.
    pub(crate) fn url(&self, segments: &[&str]) -> Result<Url, Error> {
        let mut url = self.base_url.clone();
        url.path_segments_mut()
            .map_err(|()| Error::InvalidBaseUrl(self.base_url.to_string()))?
            .pop_if_empty()
            .extend(segments);
        Ok(url)
    }

    fn request(&self, method: Method, url: Url) -> reqwest::RequestBuilder {
        let builder = self.http.request(method, url);
        match &self.api_key {
            Some(key) => builder.query(&[(AUTH_PARAM, key.expose_secret())]),
            None => builder,
        }
    }

    // ── HTTP verbs ───────────────────────────────────────────────────

    pub(crate) async fn get<T: ApiResponse>(&self, url: Url) -> Result<T::Payload, Error> {
        debug!("GET {url}");

        let resp = self.request(Method::GET, url).send().await?;
        Self::handle_response::<T>(resp).await
    }

    pub(crate) async fn get_with_params<T: ApiResponse, P: QueryParams + Sync>(
        &self,
        mut url: Url,
        params: &P,
    ) -> Result<T::Payload, Error> {
        let query = params.to_query_string();
        if !query.is_empty() {
            url.set_query(Some(&query));
        }
        debug!("GET {url}");

        let resp = self.request(Method::GET, url).send().await?;
        Self::handle_response::<T>(resp).await
    }

    pub(crate) async fn post<T: ApiResponse, B: Serialize + Sync>(
        &self,
        url: Url,
        body: &B,
    ) -> Result<T::Payload, Error> {
        debug!("POST {url}");

        let resp = self.request(Method::POST, url).json(body).send().await?;
        Self::handle_response::<T>(resp).await
    }

    pub(crate) async fn put<T: ApiResponse, B: Serialize + Sync>(
        &self,
        url: Url,
        body: &B,
    ) -> Result<T::Payload, Error> {
        debug!("PUT {url}");

        let resp = self.request(Method::PUT, url).json(body).send().await?;
        Self::handle_response::<T>(resp).await
    }

    /// DELETE expecting no content. A 2xx with an empty body is success.
    pub(crate) async fn delete(&self, url: Url) -> Result<(), Error> {
        debug!("DELETE {url}");

        let resp = self.request(Method::DELETE, url).send().await?;
        let status = resp.status();
        if !status.is_success() {
            return Err(Self::parse_error(status, resp).await);
        }

        let body = resp.text().await?;
        if body.trim().is_empty() {
            return Ok(());
        }
        if let Some(message) = api_error(&body) {
            warn!(reason = %message, "Firefly API rejected delete");
            return Err(Error::Api { message });
        }
        Err(Error::UnexpectedBody {
            status: status.as_u16(),
            body,
        })
    }

    // ── Response handling ────────────────────────────────────────────

    async fn handle_response<T: ApiResponse>(resp: reqwest::Response) -> Result<T::Payload, Error> {
        let status = resp.status();
        if !status.is_success() {
            return Err(Self::parse_error(status, resp).await);
        }

        let endpoint = resp.url().path().to_owned();
        let body = resp.text().await?;
        decode_envelope::<T>(&endpoint, body)
    }

    async fn parse_error(status: StatusCode, resp: reqwest::Response) -> Error {
        if status == StatusCode::UNAUTHORIZED {
            return Error::InvalidApiKey;
        }

        let raw = resp.text().await.unwrap_or_default();
        let message = api_error(&raw).unwrap_or_else(|| {
            if raw.trim().is_empty() {
                status.to_string()
            } else {
                raw
            }
        });

        if status == StatusCode::NOT_FOUND {
            Error::NotFound { message }
        } else {
            Error::Status {
                status: status.as_u16(),
                message,
            }
        }
    }
}

/// Decode a 2xx body into its envelope and unwrap the payload.
///
/// A non-empty `error` string takes precedence over everything else, even
/// when the rest of the body would not have decoded.
pub(crate) fn decode_envelope<T: ApiResponse>(
    endpoint: &str,
    body: String,
) -> Result<T::Payload, Error> {
    let envelope = match serde_json::from_str::<T>(&body) {
        Ok(envelope) => envelope,
        Err(e) => {
            if let Some(message) = api_error(&body) {
                warn!(endpoint, reason = %message, "Firefly API returned an error");
                return Err(Error::Api { message });
            }
            let preview: String = body.chars().take(BODY_PREVIEW_CHARS).collect();
            return Err(Error::Deserialization {
                endpoint: endpoint.to_owned(),
                message: format!("{e} (body preview: {preview:?})"),
                body,
            });
        }
    };

    if let Some(message) = envelope.error().filter(|m| !m.is_empty()).map(str::to_owned) {
        warn!(endpoint, reason = %message, "Firefly API returned an error");
        return Err(Error::Api { message });
    }
    Ok(envelope.into_payload())
}

fn api_error(body: &str) -> Option<String> {
    serde_json::from_str::<ErrorProbe>(body)
        .ok()
        .and_then(|probe| probe.error)
        .filter(|m| !m.is_empty())
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]

    use super::*;
    use crate::models::{DeviceListResponse, DeviceResponse};

    fn client(base: &str) -> FireflyClient {
        FireflyClient::from_reqwest(base, reqwest::Client::new()).unwrap()
    }

    #[test]
    fn base_url_gains_trailing_slash() {
        assert_eq!(
            client("https://api.fireflyiot.com/api/v1").base_url().as_str(),
            "https://api.fireflyiot.com/api/v1/"
        );
        assert_eq!(
            client("https://api.fireflyiot.com/api/v1/?auth=x").base_url().as_str(),
            "https://api.fireflyiot.com/api/v1/"
        );
    }

    #[test]
    fn non_hierarchical_base_is_rejected() {
        let result = FireflyClient::from_reqwest("mailto:ops@example.com", reqwest::Client::new());
        assert!(matches!(result, Err(Error::InvalidBaseUrl(_))));
    }

    #[test]
    fn segments_are_appended_and_escaped() {
        let c = client("https://api.fireflyiot.com/api/v1/");
        assert_eq!(
            c.url(&["devices", "eui", "0004a30b001a2b3c", "packets"]).unwrap().as_str(),
            "https://api.fireflyiot.com/api/v1/devices/eui/0004a30b001a2b3c/packets"
        );
        assert_eq!(
            c.url(&["devices", "eui", "a/b?c"]).unwrap().as_str(),
            "https://api.fireflyiot.com/api/v1/devices/eui/a%2Fb%3Fc"
        );
    }

    #[test]
    fn error_field_on_success_status_is_api_error() {
        let body = r#"{"error":"not found"}"#;
        let result = decode_envelope::<DeviceResponse>("/devices/eui/x", body.into());
        match result {
            Err(Error::Api { message }) => assert_eq!(message, "not found"),
            other => panic!("expected Api error, got: {other:?}"),
        }
    }

    #[test]
    fn error_field_wins_over_malformed_payload() {
        let body = r#"{"error":"invalid eui","device":{"created_at":"garbage"}}"#;
        let result = decode_envelope::<DeviceResponse>("/devices", body.into());
        assert!(matches!(result, Err(Error::Api { ref message }) if message == "invalid eui"));
    }

    #[test]
    fn empty_error_string_is_not_an_error() {
        let body = r#"{"error":"","devices":[]}"#;
        let devices = decode_envelope::<DeviceListResponse>("/devices", body.into()).unwrap();
        assert!(devices.is_empty());
    }

    #[test]
    fn malformed_body_is_decode_error_with_context() {
        let result = decode_envelope::<DeviceListResponse>("/devices", "<html>oops</html>".into());
        match result {
            Err(err @ Error::Deserialization { .. }) => {
                assert!(err.is_decode());
                assert!(err.to_string().contains("/devices"));
            }
            other => panic!("expected Deserialization error, got: {other:?}"),
        }
    }
}
