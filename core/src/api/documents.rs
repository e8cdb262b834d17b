//! Querying and JSON indexing (`/solr/{collection}/query`, `/update`).

use serde::{Deserialize, Serialize};
use serde_json::{json, Value};

use super::SolrApi;
use crate::http::HttpRequest;
use crate::options::OutputOptions;
use crate::params::{ParamValue, Params};
use crate::Result;

const UPDATE: &str = "update";

/// Parameters for the `/query` handler.
///
/// The common parameters are typed; anything else goes through
/// [`Query::param`] and is sent after them in insertion order.
#[derive(Debug, Clone, PartialEq)]
pub struct Query {
    q: String,
    filters: Vec<String>,
    fields: Option<String>,
    sort: Option<String>,
    start: Option<u32>,
    rows: Option<u32>,
    extra: Params,
    output: OutputOptions,
}

impl Query {
    pub fn new(q: impl Into<String>) -> Self {
        Self {
            q: q.into(),
            filters: Vec::new(),
            fields: None,
            sort: None,
            start: None,
            rows: None,
            extra: Params::new(),
            output: OutputOptions::default(),
        }
    }

    /// Matches every document.
    pub fn all() -> Self {
        Self::new("*:*")
    }

    /// Adds an `fq`; may be called repeatedly.
    pub fn filter(mut self, fq: impl Into<String>) -> Self {
        self.filters.push(fq.into());
        self
    }

    pub fn fields(mut self, fl: impl Into<String>) -> Self {
        self.fields = Some(fl.into());
        self
    }

    pub fn sort(mut self, sort: impl Into<String>) -> Self {
        self.sort = Some(sort.into());
        self
    }

    pub fn start(mut self, start: u32) -> Self {
        self.start = Some(start);
        self
    }

    pub fn rows(mut self, rows: u32) -> Self {
        self.rows = Some(rows);
        self
    }

    pub fn param(mut self, key: impl Into<String>, value: impl Into<ParamValue>) -> Self {
        self.extra.push(key, value);
        self
    }

    pub fn output(mut self, output: OutputOptions) -> Self {
        self.output = output;
        self
    }

    fn to_params(&self) -> Params {
        let mut params = Params::new();
        params.push("q", self.q.as_str());
        for fq in &self.filters {
            params.push("fq", fq.as_str());
        }
        params
            .push_opt("fl", self.fields.as_deref())
            .push_opt("sort", self.sort.as_deref())
            .push_opt("start", self.start)
            .push_opt("rows", self.rows);
        for (key, value) in self.extra.iter() {
            params.push(key, value);
        }
        self.output.apply_unset(&mut params);
        params
    }
}

/// Options of a single-document `add` command.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AddDocumentOptions {
    pub boost: f64,
    /// Milliseconds until the server commits the document.
    pub commit_within: u32,
    pub overwrite: bool,
    pub output: OutputOptions,
}

impl Default for AddDocumentOptions {
    fn default() -> Self {
        Self {
            boost: 1.0,
            commit_within: 1000,
            overwrite: true,
            output: OutputOptions::default(),
        }
    }
}

/// Options of a bulk add; the array body has no room for them, so they go
/// in the query string.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct AddDocumentsOptions {
    pub commit_within: Option<u32>,
    pub output: OutputOptions,
}

impl SolrApi {
    fn update_url(&self, collection: &str, params: &Params) -> String {
        self.collection_url(collection, &[UPDATE], params)
    }

    pub fn build_query(&self, collection: &str, query: &Query) -> HttpRequest {
        HttpRequest::new(self.collection_url(collection, &["query"], &query.to_params()))
    }

    /// `{"add": {"boost", "commitWithin", "doc", "overwrite"}}`.
    pub fn build_add_document(
        &self,
        collection: &str,
        doc: &Value,
        options: &AddDocumentOptions,
    ) -> Result<HttpRequest> {
        let body = json!({
            "add": {
                "boost": options.boost,
                "commitWithin": options.commit_within,
                "doc": doc,
                "overwrite": options.overwrite,
            }
        });
        self.post_json(self.update_url(collection, &options.output.to_params()), &body)
    }

    /// Posts `docs` as a bare JSON array.
    pub fn build_add_documents(
        &self,
        collection: &str,
        docs: &[Value],
        options: &AddDocumentsOptions,
    ) -> Result<HttpRequest> {
        let mut params = Params::new();
        params.push_opt("commitWithin", options.commit_within);
        options.output.apply(&mut params);
        self.post_json(self.update_url(collection, &params), docs)
    }

    /// Posts `body` to the update handler unchanged.
    pub fn build_update_json(&self, collection: &str, body: &Value, output: OutputOptions) -> Result<HttpRequest> {
        self.post_json(self.update_url(collection, &output.to_params()), body)
    }

    /// `{"delete": [ids...]}`.
    pub fn build_delete_documents(&self, collection: &str, ids: &[&str], output: OutputOptions) -> Result<HttpRequest> {
        let body = json!({ "delete": ids });
        self.post_json(self.update_url(collection, &output.to_params()), &body)
    }

    pub fn build_delete_by_query(&self, collection: &str, query: &str, output: OutputOptions) -> Result<HttpRequest> {
        let body = json!({ "delete": { "query": query } });
        self.post_json(self.update_url(collection, &output.to_params()), &body)
    }

    pub fn build_commit(&self, collection: &str, output: OutputOptions) -> Result<HttpRequest> {
        let body = json!({ "commit": {} });
        self.post_json(self.update_url(collection, &output.to_params()), &body)
    }
}
