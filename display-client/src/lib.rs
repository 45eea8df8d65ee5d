//! Private HTTP client for the BetterDisplay control server
//!
//! The control server exposes every monitor feature through two plain GET
//! endpoints with query-string parameters and plain-text bodies:
//!
//! ```text
//! GET {base}/get?feature=<volume|brightness|mute>&name=<device>
//! GET {base}/get?feature=ddc&vcp=inputSelect&name=<device>
//! GET {base}/set?feature=<volume|brightness|mute>&name=<device>&value=<v>
//! GET {base}/set?vcp=inputSelect&name=<device>&ddc=<code>
//! ```
//!
//! This crate only builds those requests and returns the raw [`Reply`].
//! Interpreting status codes and bodies is left to the state layer.

mod error;

pub use error::{ClientError, Result};

use std::fmt;
use std::time::Duration;

use url::Url;

/// A readable and writable monitor attribute
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Feature {
    Volume,
    Brightness,
    Mute,
    /// DDC/CI input select (VCP code `inputSelect`)
    InputSource,
}

impl Feature {
    /// All features, in the order a refresh reads them
    pub const ALL: [Feature; 4] = [
        Feature::Volume,
        Feature::Brightness,
        Feature::Mute,
        Feature::InputSource,
    ];

    /// Name used in logs and in the `feature=` parameter
    pub fn as_str(&self) -> &'static str {
        match self {
            Feature::Volume => "volume",
            Feature::Brightness => "brightness",
            Feature::Mute => "mute",
            Feature::InputSource => "inputSelect",
        }
    }
}

impl fmt::Display for Feature {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Status and body of a control server response
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Reply {
    pub status: u16,
    pub body: String,
}

impl Reply {
    /// Only HTTP 200 counts as success; the body is not inspected
    pub fn is_ok(&self) -> bool {
        self.status == 200
    }
}

/// Client configuration
#[derive(Debug, Clone)]
pub struct ClientConfig {
    /// Upper bound for establishing a TCP connection
    /// Default: 5 seconds
    pub connect_timeout: Duration,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            connect_timeout: Duration::from_secs(5),
        }
    }
}

/// A minimal client for one control server
///
/// Connections are not pooled: every call opens and tears down its own
/// connection, matching the low call volume of a polling integration.
#[derive(Debug, Clone)]
pub struct DisplayClient {
    http: reqwest::Client,
    base_url: String,
}

impl DisplayClient {
    /// Create a client with default configuration
    pub fn new(base_url: &str) -> Result<Self> {
        Self::with_config(base_url, ClientConfig::default())
    }

    /// Create a client with explicit configuration
    ///
    /// The base URL must be an absolute http(s) URL; a trailing slash is
    /// removed.
    pub fn with_config(base_url: &str, config: ClientConfig) -> Result<Self> {
        let base_url = normalize_base_url(base_url)?;

        let http = reqwest::Client::builder()
            .pool_max_idle_per_host(0)
            .connect_timeout(config.connect_timeout)
            .build()
            .map_err(|e| ClientError::Transport(e.to_string()))?;

        Ok(Self { http, base_url })
    }

    /// The normalized base URL (no trailing slash)
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Read a feature of a device
    pub async fn read(&self, device: &str, feature: Feature) -> Result<Reply> {
        let url = self.read_url(device, feature)?;
        self.send(url).await
    }

    /// Write a feature of a device
    pub async fn write(&self, device: &str, feature: Feature, value: &str) -> Result<Reply> {
        let url = self.write_url(device, feature, value)?;
        self.send(url).await
    }

    /// Build the URL for reading `feature`
    pub fn read_url(&self, device: &str, feature: Feature) -> Result<Url> {
        let mut url = self.endpoint("get")?;
        {
            let mut query = url.query_pairs_mut();
            match feature {
                Feature::InputSource => {
                    query
                        .append_pair("feature", "ddc")
                        .append_pair("vcp", "inputSelect")
                        .append_pair("name", device);
                }
                other => {
                    query
                        .append_pair("feature", other.as_str())
                        .append_pair("name", device);
                }
            }
        }
        Ok(url)
    }

    /// Build the URL for writing `value` to `feature`
    pub fn write_url(&self, device: &str, feature: Feature, value: &str) -> Result<Url> {
        let mut url = self.endpoint("set")?;
        {
            let mut query = url.query_pairs_mut();
            match feature {
                Feature::InputSource => {
                    query
                        .append_pair("vcp", "inputSelect")
                        .append_pair("name", device)
                        .append_pair("ddc", value);
                }
                other => {
                    query
                        .append_pair("feature", other.as_str())
                        .append_pair("name", device)
                        .append_pair("value", value);
                }
            }
        }
        Ok(url)
    }

    fn endpoint(&self, path: &str) -> Result<Url> {
        let raw = format!("{}/{}", self.base_url, path);
        Url::parse(&raw).map_err(|e| ClientError::InvalidUrl {
            url: raw,
            reason: e.to_string(),
        })
    }

    async fn send(&self, url: Url) -> Result<Reply> {
        tracing::debug!("GET {}", url);

        let response = self.http.get(url).send().await?;
        let status = response.status().as_u16();
        let body = response
            .text()
            .await
            .map_err(|e| ClientError::Body(e.to_string()))?;

        Ok(Reply { status, body })
    }
}

/// Validate a control server URL and strip surrounding whitespace and trailing slashes
pub fn normalize_base_url(base_url: &str) -> Result<String> {
    let trimmed = base_url.trim().trim_end_matches('/');
    let invalid = |reason: String| ClientError::InvalidUrl {
        url: base_url.to_string(),
        reason,
    };

    let parsed = Url::parse(trimmed).map_err(|e| invalid(e.to_string()))?;
    if parsed.cannot_be_a_base() || !matches!(parsed.scheme(), "http" | "https") {
        return Err(invalid("expected an http(s) URL".to_string()));
    }

    Ok(trimmed.to_string())
}
