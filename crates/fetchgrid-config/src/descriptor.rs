//! The immutable description of one probed endpoint.

use std::collections::HashMap;

use url::Url;

use crate::error::{ConfigError, ConfigResult};

/// Method used when a record does not name one.
pub const DEFAULT_METHOD: &str = "GET";

/// One HTTP endpoint to probe every cycle.
///
/// Built once at startup from a validated [`EndpointRecord`](crate::EndpointRecord).
/// The hostname is derived from the URL at construction and never changes;
/// descriptors that share a hostname share an availability bucket.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EndpointDescriptor {
    name: String,
    url: Url,
    method: Option<String>,
    headers: HashMap<String, String>,
    body: Option<String>,
    hostname: String,
}

impl EndpointDescriptor {
    /// Create a descriptor with no method override, headers, or body.
    pub fn new(name: &str, url: &str) -> ConfigResult<Self> {
        Self::for_entry(0, name, url)
    }

    /// Validate `name` and `url` of the `index`-th document entry.
    pub(crate) fn for_entry(index: usize, name: &str, url: &str) -> ConfigResult<Self> {
        let name = name.trim();
        if name.is_empty() {
            return Err(ConfigError::MissingName { index });
        }
        if url.trim().is_empty() {
            return Err(ConfigError::MissingUrl {
                index,
                name: name.to_string(),
            });
        }

        let (url, hostname) = parse_http_url(name, url)?;
        Ok(Self {
            name: name.to_string(),
            url,
            method: None,
            headers: HashMap::new(),
            body: None,
            hostname,
        })
    }

    /// Override the HTTP method. An empty string keeps the default.
    pub fn with_method(mut self, method: &str) -> Self {
        let method = method.trim();
        self.method = (!method.is_empty()).then(|| method.to_string());
        self
    }

    /// Attach one request header.
    pub fn with_header(mut self, name: &str, value: &str) -> Self {
        self.headers.insert(name.to_string(), value.to_string());
        self
    }

    /// Attach every header in `headers`.
    pub fn with_headers(mut self, headers: HashMap<String, String>) -> Self {
        self.headers.extend(headers);
        self
    }

    /// Set the request payload, sent verbatim.
    pub fn with_body(mut self, body: &str) -> Self {
        self.body = Some(body.to_string());
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn url(&self) -> &Url {
        &self.url
    }

    /// Host component of the URL, without port. This is the aggregation key.
    pub fn hostname(&self) -> &str {
        &self.hostname
    }

    /// The configured method, or `GET` when none was given.
    pub fn effective_method(&self) -> &str {
        self.method.as_deref().unwrap_or(DEFAULT_METHOD)
    }

    pub fn headers(&self) -> &HashMap<String, String> {
        &self.headers
    }

    pub fn body(&self) -> Option<&str> {
        self.body.as_deref()
    }
}

/// Parse an absolute http(s) URL and extract its hostname.
pub(crate) fn parse_http_url(name: &str, raw: &str) -> ConfigResult<(Url, String)> {
    let invalid = |reason: String| ConfigError::InvalidUrl {
        name: name.to_string(),
        url: raw.to_string(),
        reason,
    };

    let url = Url::parse(raw.trim()).map_err(|e| invalid(e.to_string()))?;

    match url.scheme() {
        "http" | "https" => {}
        other => return Err(invalid(format!("unsupported scheme {other:?}"))),
    }

    let host = url
        .host_str()
        .map(|h| h.trim_start_matches('[').trim_end_matches(']'))
        .filter(|h| !h.is_empty())
        .ok_or_else(|| invalid("no hostname".to_string()))?
        .to_string();

    Ok((url, host))
}
