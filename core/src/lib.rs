//! Asynchronous client for the Solr admin and indexing REST API.
//!
//! # Overview
//! Covers core administration, configsets, collections, the schema API,
//! JSON indexing and querying. Each operation builds a URL and optional JSON
//! body, issues exactly one HTTP call and returns the raw response. The
//! client never retries and never interprets the body; callers pick JSON or
//! XML through `wt` and decode it themselves.
//!
//! # Design
//! - `SolrApi` is stateless: it holds only the `Connection` and turns each
//!   server action into an `HttpRequest` value without touching the network.
//! - `Transport` is the single I/O seam. `ReqwestTransport` is the production
//!   implementation; tests plug in fakes or the in-memory mock server.
//! - `SolrClient` is the async facade: one `async fn` per action, one round
//!   trip per call.
//! - Invalid enum options (router name, response format) fail with
//!   `SolrError::Configuration` before any request exists.

pub mod api;
pub mod client;
pub mod connection;
pub mod error;
pub mod http;
pub mod options;
pub mod params;
pub mod transport;

pub use api::{
    AddDocumentOptions, AddDocumentsOptions, CopyFieldOptions, CreateCollectionOptions,
    CreateConfigSetOptions, CreateCoreOptions, CreateShardOptions, FieldAttributes, Query, Router,
    SolrApi, SplitShardOptions, UnloadCoreOptions,
};
pub use client::SolrClient;
pub use connection::{Connection, Scheme, TlsConfig};
pub use error::{Result, SolrError};
pub use http::{HttpMethod, HttpRequest, HttpResponse};
pub use options::{OutputOptions, ResponseFormat};
pub use params::{ParamValue, Params};
pub use transport::{ReqwestTransport, Transport};
