//! fetchgrid-config — endpoint descriptors for the fetchgrid poller.
//!
//! Parses the YAML endpoint document into validated, immutable
//! [`EndpointDescriptor`]s. Every record is checked before the poller
//! starts, so a bad entry stops the process before any request is sent.

pub mod config;
pub mod descriptor;
pub mod error;

pub use config::{load_endpoints, parse_endpoints, EndpointRecord};
pub use descriptor::{EndpointDescriptor, DEFAULT_METHOD};
pub use error::{ConfigError, ConfigResult};
