//! HTTP client for the call report time series service.

use std::fmt;
use std::time::Duration;

use url::Url;

use crate::{
    types::{MetricSample, Series},
    Error,
};

/// Production endpoint of the public data distribution service.
pub const DEFAULT_BASE_URL: &str = "https://ffieccdr.azure-api.us/public";

/// Request timeout for a single time series call.
const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

const USER_AGENT: &str = concat!("bankloans/", env!("CARGO_PKG_VERSION"));

/// Web service credential pair.
///
/// The token is never printed; `Debug` redacts it.
#[derive(Clone)]
pub struct Credentials {
    pub username: String,
    pub token: String,
}

impl Credentials {
    pub fn new(username: impl Into<String>, token: impl Into<String>) -> Self {
        Self {
            username: username.into(),
            token: token.into(),
        }
    }
}

impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credentials")
            .field("username", &self.username)
            .field("token", &"<redacted>")
            .finish()
    }
}

/// Client for the call report service.
///
/// Holds one `reqwest::Client` for its whole lifetime, so every request in a
/// run reuses the same connection pool.
pub struct Client {
    http: reqwest::Client,
    credentials: Credentials,
    base_api_url: String,
}

impl Client {
    /// Creates a client pointing at the production service.
    pub fn new(credentials: Credentials) -> Result<Self, Error> {
        Self::with_base_url(DEFAULT_BASE_URL, credentials)
    }

    /// Creates a client with a custom base URL. Used for testing with wiremock.
    pub fn with_base_url(base_url: &str, credentials: Credentials) -> Result<Self, Error> {
        let http = reqwest::Client::builder()
            .user_agent(USER_AGENT)
            .timeout(REQUEST_TIMEOUT)
            .build()
            .map_err(|e| {
                tracing::error!("Failed to build HTTP client: {}", e);
                Error::RequestFailed
            })?;
        Ok(Self {
            http,
            credentials,
            base_api_url: base_url.trim_end_matches('/').to_string(),
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_api_url
    }

    fn get_url(&self, path: &str, params: &[(&str, &str)]) -> Result<Url, Error> {
        let mut url = Url::parse(format!("{}{}", &self.base_api_url, path).as_str())
            .map_err(|e| {
                tracing::error!("Invalid URL constructed: {}", e);
                Error::InvalidUrl(e.to_string())
            })?;
        if !params.is_empty() {
            url.query_pairs_mut().extend_pairs(params);
        }
        Ok(url)
    }

    /// Fetches every reported item for one institution and reporting period.
    ///
    /// `reporting_period` is passed through untouched (e.g. `6/30/2024`).
    pub async fn collect_data(
        &self,
        rssd_id: u64,
        reporting_period: &str,
        series: Series,
    ) -> Result<Vec<MetricSample>, Error> {
        let rssd = rssd_id.to_string();
        let url = self.get_url(
            "/RetrieveTimeSeries",
            &[
                ("rssd_id", rssd.as_str()),
                ("reporting_period", reporting_period),
                ("series", series.as_str()),
            ],
        )?;

        tracing::debug!("GET {} (rssd {})", url.path(), rssd_id);
        let resp = self
            .http
            .get(url)
            .header("accept", "application/json")
            .header("UserID", &self.credentials.username)
            .header(
                "Authentication",
                format!("Bearer {}", self.credentials.token),
            )
            .send()
            .await
            .map_err(|e| {
                tracing::error!("Failed to get time series: {}", e);
                Error::RequestFailed
            })?;

        let status = resp.status();
        let body = resp.text().await.map_err(|e| {
            tracing::error!("Failed to read response body: {}", e);
            Error::RequestFailed
        })?;

        if status == reqwest::StatusCode::UNAUTHORIZED || status == reqwest::StatusCode::FORBIDDEN
        {
            tracing::error!("Credentials rejected with status {}", status);
            return Err(Error::Unauthorized {
                status: status.as_u16(),
            });
        }

        if !status.is_success() {
            let snippet = truncate_body(&body);
            tracing::error!("Request failed with status {}: {}", status, snippet);
            return Err(Error::HttpStatus {
                status: status.as_u16(),
                body: snippet,
            });
        }

        serde_json::from_str::<Vec<MetricSample>>(&body).map_err(|e| {
            let snippet = truncate_body(&body);
            tracing::error!("Failed to parse time series: {} | body: {}", e, snippet);
            Error::ParseFailed(e.to_string())
        })
    }
}

fn truncate_body(body: &str) -> String {
    const MAX: usize = 2000;
    if body.len() <= MAX {
        body.to_string()
    } else {
        let mut end = MAX;
        while !body.is_char_boundary(end) {
            end -= 1;
        }
        format!("{}...[truncated]", &body[..end])
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn truncate_short_body_unchanged() {
        assert_eq!(truncate_body("oops"), "oops");
    }

    #[test]
    fn truncate_long_body() {
        let body = "x".repeat(2500);
        let out = truncate_body(&body);
        assert!(out.ends_with("...[truncated]"));
        assert_eq!(out.len(), 2000 + "...[truncated]".len());
    }

    #[test]
    fn credentials_debug_redacts_token() {
        let creds = Credentials::new("analyst", "s3cret");
        let dbg = format!("{:?}", creds);
        assert!(dbg.contains("analyst"));
        assert!(!dbg.contains("s3cret"));
    }

    #[test]
    fn base_url_trailing_slash_trimmed() {
        let client =
            Client::with_base_url("http://localhost:1234/", Credentials::new("u", "t")).unwrap();
        assert_eq!(client.base_url(), "http://localhost:1234");
        let url = client
            .get_url("/RetrieveTimeSeries", &[("rssd_id", "1"), ("series", "call")])
            .unwrap();
        assert_eq!(
            url.as_str(),
            "http://localhost:1234/RetrieveTimeSeries?rssd_id=1&series=call"
        );
    }
}
