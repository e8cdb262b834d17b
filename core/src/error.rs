//! Error types for the Solr client.
//!
//! # Design
//! Only failures the client itself can observe get a variant. Responses the
//! server sends back, 4xx and 5xx included, are not errors here: they are
//! returned to the caller as an ordinary `HttpResponse`.

use std::path::PathBuf;

/// Errors returned by `SolrApi` constructors and `SolrClient` calls.
#[derive(Debug, thiserror::Error)]
pub enum SolrError {
    /// A caller-supplied option is outside the domain the server accepts.
    /// Raised before any network I/O.
    #[error("configuration error: {0}")]
    Configuration(String),

    /// The request payload could not be serialized to JSON.
    #[error("serialization failed: {0}")]
    Serialization(#[from] serde_json::Error),

    /// The CA bundle named in the TLS configuration could not be read.
    #[error("failed to read CA bundle {}: {source}", path.display())]
    CaBundle {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Connection, TLS or I/O failure reported by the HTTP stack.
    #[error("transport error: {0}")]
    Transport(#[from] reqwest::Error),
}

pub type Result<T> = std::result::Result<T, SolrError>;
