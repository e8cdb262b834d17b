//! Stateless request builders for the Solr REST API.
//!
//! # Design
//! `SolrApi` holds only the `Connection` and carries no mutable state between
//! calls. Every server action has a `build_*` method that turns identifiers
//! and an options struct into an `HttpRequest`. Nothing here performs I/O;
//! `SolrClient` pairs these builders with a `Transport`.
//!
//! The builders are grouped by API area, one `impl SolrApi` block per module.

mod collections;
mod configsets;
mod cores;
mod documents;
mod schema;

pub use collections::{CreateCollectionOptions, CreateShardOptions, Router, SplitShardOptions};
pub use configsets::CreateConfigSetOptions;
pub use cores::{CreateCoreOptions, UnloadCoreOptions};
pub use documents::{AddDocumentOptions, AddDocumentsOptions, Query};
pub use schema::{CopyFieldOptions, FieldAttributes};

use crate::connection::Connection;
use crate::http::HttpRequest;
use crate::params::Params;

const SOLR: &str = "solr";
const ADMIN: &str = "admin";

/// Admin endpoints under `/solr/admin`.
#[derive(Debug, Clone, Copy)]
enum AdminApi {
    Cores,
    Collections,
    Configs,
}

impl AdminApi {
    fn segment(self) -> &'static str {
        match self {
            AdminApi::Cores => "cores",
            AdminApi::Collections => "collections",
            AdminApi::Configs => "configs",
        }
    }
}

/// Synchronous, stateless request builder for one Solr server.
#[derive(Debug, Clone, Default)]
pub struct SolrApi {
    connection: Connection,
}

impl SolrApi {
    pub fn new(connection: Connection) -> Self {
        Self { connection }
    }

    pub fn connection(&self) -> &Connection {
        &self.connection
    }

    fn admin_url(&self, api: AdminApi, params: &Params) -> String {
        self.connection.url(&[SOLR, ADMIN, api.segment()], params)
    }

    /// `/solr/{collection}/{path...}`.
    fn collection_url(&self, collection: &str, path: &[&str], params: &Params) -> String {
        let mut segments = Vec::with_capacity(path.len() + 2);
        segments.push(SOLR);
        segments.push(collection);
        segments.extend_from_slice(path);
        self.connection.url(&segments, params)
    }

    /// A request whose action and arguments all travel in the query string.
    fn admin_get(&self, api: AdminApi, params: &Params) -> HttpRequest {
        HttpRequest::new(self.admin_url(api, params))
    }

    fn admin_post(&self, api: AdminApi, params: &Params) -> HttpRequest {
        HttpRequest::post(self.admin_url(api, params))
    }

    fn post_json<T: serde::Serialize + ?Sized>(
        &self,
        url: String,
        body: &T,
    ) -> crate::Result<HttpRequest> {
        Ok(HttpRequest::post_json(url, serde_json::to_string(body)?))
    }
}

/// `Params` seeded with the admin `action`.
fn action(name: &str) -> Params {
    let mut params = Params::new();
    params.push("action", name);
    params
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::http::HttpMethod;

    #[test]
    fn admin_url_uses_solr_admin_prefix() {
        let api = SolrApi::default();
        let req = api.admin_get(AdminApi::Configs, &action("LIST"));
        assert_eq!(req.method, HttpMethod::Get);
        assert_eq!(req.url, "http://localhost:8983/solr/admin/configs?action=LIST");
    }

    #[test]
    fn collection_url_skips_missing_segments() {
        let api = SolrApi::default();
        let url = api.collection_url("foo", &["schema", "fields", ""], &Params::new());
        assert_eq!(url, "http://localhost:8983/solr/foo/schema/fields");
    }
}
