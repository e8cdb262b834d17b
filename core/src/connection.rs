//! Connection settings and the URL builder.
//!
//! # Design
//! `Connection` is immutable once built and is shared read-only by every
//! request issued through a client. It derives serde so applications can embed
//! it in their own configuration files; missing fields fall back to a local
//! single-node server (`http://localhost:8983`).

use std::fmt;
use std::path::PathBuf;

use serde::{Deserialize, Serialize};
use url::form_urlencoded;

use crate::params::Params;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Scheme {
    #[default]
    Http,
    Https,
}

impl fmt::Display for Scheme {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Scheme::Http => f.write_str("http"),
            Scheme::Https => f.write_str("https"),
        }
    }
}

/// Trust material used by the HTTP transport.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct TlsConfig {
    /// PEM bundle whose certificates are added as trust roots.
    pub ca_certs: Option<PathBuf>,
    /// When false, invalid server certificates are accepted.
    pub verify_certs: bool,
}

impl Default for TlsConfig {
    fn default() -> Self {
        Self {
            ca_certs: None,
            verify_certs: true,
        }
    }
}

fn default_host() -> String {
    "localhost".to_string()
}

fn default_port() -> u16 {
    8983
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Connection {
    #[serde(default)]
    pub scheme: Scheme,
    #[serde(default = "default_host")]
    pub host: String,
    #[serde(default = "default_port")]
    pub port: u16,
    /// Path in front of `/solr`, e.g. when the server sits behind a proxy.
    #[serde(default)]
    pub prefix: String,
    #[serde(default)]
    pub tls: TlsConfig,
}

impl Default for Connection {
    fn default() -> Self {
        Self {
            scheme: Scheme::default(),
            host: default_host(),
            port: default_port(),
            prefix: String::new(),
            tls: TlsConfig::default(),
        }
    }
}

impl Connection {
    pub fn new(host: impl Into<String>, port: u16) -> Self {
        Self {
            host: host.into(),
            port,
            ..Self::default()
        }
    }

    pub fn with_scheme(mut self, scheme: Scheme) -> Self {
        self.scheme = scheme;
        self
    }

    pub fn with_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.prefix = prefix.into();
        self
    }

    pub fn with_tls(mut self, tls: TlsConfig) -> Self {
        self.tls = tls;
        self
    }

    /// `scheme://host:port[/prefix]`, never with a trailing slash.
    pub fn base_url(&self) -> String {
        let prefix = self.prefix.trim_matches('/');
        if prefix.is_empty() {
            format!("{}://{}:{}", self.scheme, self.host, self.port)
        } else {
            format!("{}://{}:{}/{prefix}", self.scheme, self.host, self.port)
        }
    }

    /// Join `segments` onto the base URL and append the encoded `params`.
    ///
    /// Each segment is percent-encoded, so names holding `?`, `#`, `%` or `/`
    /// stay inside their own path segment. Empty segments are dropped, and
    /// `?` only appears when there is at least one parameter. With neither,
    /// the base URL comes back unchanged.
    pub fn url(&self, segments: &[&str], params: &Params) -> String {
        let mut url = self.base_url();
        for segment in segments.iter().map(|s| s.trim_matches('/')) {
            if segment.is_empty() {
                continue;
            }
            url.push('/');
            url.push_str(&encode_segment(segment));
        }
        if !params.is_empty() {
            url.push('?');
            url.push_str(&params.encode());
        }
        url
    }
}

/// Percent-encodes one path segment. The form serializer writes spaces as
/// `+`, which only means space in a query string.
fn encode_segment(segment: &str) -> String {
    form_urlencoded::byte_serialize(segment.as_bytes())
        .collect::<String>()
        .replace('+', "%20")
}
