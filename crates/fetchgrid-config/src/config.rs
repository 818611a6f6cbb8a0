//! YAML endpoint document parser.
//!
//! The document is a sequence of records:
//!
//! ```yaml
//! - name: fetch index page
//!   url: https://example.com/
//! - name: post some json
//!   url: https://example.com/body
//!   method: POST
//!   headers:
//!     content-type: application/json
//!   body: '{"foo":"bar"}'
//! ```

use std::collections::HashMap;
use std::path::Path;

use serde::Deserialize;

use crate::descriptor::EndpointDescriptor;
use crate::error::{ConfigError, ConfigResult};

/// One raw entry of the endpoint document, before validation.
///
/// `name` and `url` default to empty so that a missing field surfaces as
/// a validation error naming the entry instead of a parser error.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct EndpointRecord {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub url: String,
    #[serde(default)]
    pub method: Option<String>,
    #[serde(default)]
    pub headers: Option<HashMap<String, String>>,
    #[serde(default)]
    pub body: Option<String>,
}

impl EndpointRecord {
    /// Check required fields and derive the descriptor for entry `index`.
    pub fn validate(self, index: usize) -> ConfigResult<EndpointDescriptor> {
        let mut descriptor = EndpointDescriptor::for_entry(index, &self.name, &self.url)?;
        if let Some(method) = self.method {
            descriptor = descriptor.with_method(&method);
        }
        if let Some(headers) = self.headers {
            descriptor = descriptor.with_headers(headers);
        }
        if let Some(body) = self.body {
            descriptor = descriptor.with_body(&body);
        }
        Ok(descriptor)
    }
}

/// Parse and validate an endpoint document.
///
/// Fails on the first invalid entry; nothing is returned for a document
/// with any bad record.
pub fn parse_endpoints(content: &str) -> ConfigResult<Vec<EndpointDescriptor>> {
    if content.trim().is_empty() {
        return Ok(Vec::new());
    }

    let records: Option<Vec<EndpointRecord>> =
        serde_yaml::from_str(content).map_err(|e| ConfigError::Parse(e.to_string()))?;

    records
        .unwrap_or_default()
        .into_iter()
        .enumerate()
        .map(|(index, record)| record.validate(index))
        .collect()
}

/// Read, parse, and validate the endpoint document at `path`.
pub fn load_endpoints(path: &Path) -> ConfigResult<Vec<EndpointDescriptor>> {
    let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
        path: path.to_path_buf(),
        source,
    })?;
    parse_endpoints(&content)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    const SAMPLE: &str = r#"
- headers:
    user-agent: fetch-synthetic-monitor
  method: GET
  name: fetch index page
  url: https://fetch.com/
- name: fetch careers page
  url: https://fetch.com/careers
- body: '{"foo":"bar"}'
  headers:
    content-type: application/json
  method: POST
  name: fetch some fake post endpoint
  url: https://fetch.com/some/post/endpoint
- name: fetch rewards index page
  url: https://www.fetchrewards.com/
"#;

    #[test]
    fn parse_sample_document() {
        let endpoints = parse_endpoints(SAMPLE).unwrap();
        assert_eq!(endpoints.len(), 4);

        assert_eq!(endpoints[0].name(), "fetch index page");
        assert_eq!(
            endpoints[0].headers().get("user-agent").map(String::as_str),
            Some("fetch-synthetic-monitor")
        );
        assert_eq!(endpoints[1].effective_method(), "GET");
        assert!(endpoints[1].headers().is_empty());
        assert_eq!(endpoints[1].body(), None);

        assert_eq!(endpoints[2].effective_method(), "POST");
        assert_eq!(endpoints[2].body(), Some(r#"{"foo":"bar"}"#));

        assert_eq!(endpoints[0].hostname(), "fetch.com");
        assert_eq!(endpoints[2].hostname(), "fetch.com");
        assert_eq!(endpoints[3].hostname(), "www.fetchrewards.com");
    }

    #[test]
    fn missing_name_is_fatal() {
        let err = parse_endpoints("- url: http://localhost/\n").unwrap_err();
        assert!(matches!(err, ConfigError::MissingName { index: 0 }));
    }

    #[test]
    fn missing_url_names_the_entry() {
        let doc = "- name: ok\n  url: http://localhost/\n- name: broken\n";
        match parse_endpoints(doc).unwrap_err() {
            ConfigError::MissingUrl { index, name } => {
                assert_eq!(index, 1);
                assert_eq!(name, "broken");
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn unparsable_url_is_fatal() {
        let err = parse_endpoints("- name: bad\n  url: 'http://'\n").unwrap_err();
        assert!(matches!(err, ConfigError::InvalidUrl { .. }));
    }

    #[test]
    fn wrong_shape_is_parse_error() {
        let err = parse_endpoints("name: not-a-list\nurl: http://localhost/\n").unwrap_err();
        assert!(matches!(err, ConfigError::Parse(_)));
    }

    #[test]
    fn empty_document_has_no_endpoints() {
        assert!(parse_endpoints("").unwrap().is_empty());
    }

    #[test]
    fn unknown_fields_are_ignored() {
        let doc = "- name: home\n  url: http://localhost/\n  retries: 3\n";
        assert_eq!(parse_endpoints(doc).unwrap().len(), 1);
    }

    #[test]
    fn load_from_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(SAMPLE.as_bytes()).unwrap();

        let endpoints = load_endpoints(file.path()).unwrap();
        assert_eq!(endpoints.len(), 4);
    }

    #[test]
    fn bundled_example_loads() {
        let path = Path::new(env!("CARGO_MANIFEST_DIR")).join("../../config/endpoints.example.yaml");
        let endpoints = load_endpoints(&path).unwrap();
        assert_eq!(endpoints.len(), 4);
        assert_eq!(endpoints[2].effective_method(), "POST");
    }

    #[test]
    fn load_missing_file_is_read_error() {
        let dir = tempfile::tempdir().unwrap();
        let err = load_endpoints(&dir.path().join("absent.yaml")).unwrap_err();
        assert!(matches!(err, ConfigError::Read { .. }));
    }
}
