//! Collections API (`/solr/admin/collections`).
//!
//! Every action is a POST whose arguments travel in the query string.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use tracing::warn;

use super::{action, AdminApi, SolrApi};
use crate::error::SolrError;
use crate::http::HttpRequest;
use crate::options::OutputOptions;

/// Document router of a collection.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub enum Router {
    /// Hash-based routing over `numShards` shards.
    #[default]
    CompositeId,
    /// Shards are named explicitly and documents say where they go.
    Implicit,
}

impl Router {
    pub fn as_str(&self) -> &'static str {
        match self {
            Router::CompositeId => "compositeId",
            Router::Implicit => "implicit",
        }
    }
}

impl fmt::Display for Router {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Router {
    type Err = SolrError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "compositeId" => Ok(Router::CompositeId),
            "implicit" => Ok(Router::Implicit),
            other => Err(SolrError::Configuration(format!(
                "invalid router name '{other}', expected 'compositeId' or 'implicit'"
            ))),
        }
    }
}

impl TryFrom<String> for Router {
    type Error = SolrError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<Router> for String {
    fn from(router: Router) -> Self {
        router.as_str().to_string()
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CreateCollectionOptions {
    pub router: Router,
    /// Comma-separated shard names. When present, `numShards` is their count.
    pub shards: Option<String>,
    /// Used when `shards` is absent.
    pub num_shards: Option<u32>,
    pub shards_per_node: u32,
    pub replication_factor: u32,
    pub config_name: Option<String>,
    pub router_field: Option<String>,
    pub output: OutputOptions,
}

impl Default for CreateCollectionOptions {
    fn default() -> Self {
        Self {
            router: Router::default(),
            shards: None,
            num_shards: None,
            shards_per_node: 1,
            replication_factor: 1,
            config_name: None,
            router_field: None,
            output: OutputOptions::default(),
        }
    }
}

impl CreateCollectionOptions {
    /// Set the router from its server-side name.
    pub fn with_router_name(mut self, name: &str) -> Result<Self, SolrError> {
        self.router = name.parse()?;
        Ok(self)
    }

    /// Shard count sent as `numShards`. An explicit shard list takes
    /// precedence over `num_shards`.
    pub fn shard_count(&self) -> u32 {
        let listed = self
            .shards
            .as_deref()
            .map(|shards| shards.split(',').filter(|s| !s.trim().is_empty()).count() as u32)
            .filter(|&n| n > 0);
        match (listed, self.num_shards) {
            (Some(listed), Some(explicit)) if listed != explicit => {
                warn!(
                    listed,
                    explicit, "numShards disagrees with the shard list; using the shard list"
                );
                listed
            }
            (Some(listed), _) => listed,
            (None, Some(explicit)) => explicit,
            (None, None) => 1,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SplitShardOptions {
    /// Comma-separated hash ranges, e.g. `0-1f4,1f5-3e8`.
    pub ranges: Option<String>,
    pub split_key: Option<String>,
    pub output: OutputOptions,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CreateShardOptions {
    pub create_node_set: Option<String>,
    pub output: OutputOptions,
}

impl SolrApi {
    pub fn build_create_collection(&self, name: &str, options: &CreateCollectionOptions) -> HttpRequest {
        let mut params = action("CREATE");
        params
            .push("name", name)
            .push("router.name", options.router.as_str())
            .push("numShards", options.shard_count())
            .push_opt("shards", options.shards.as_deref())
            .push("replicationFactor", options.replication_factor)
            .push("maxShardsPerNode", options.shards_per_node)
            .push_opt("collection.configName", options.config_name.as_deref())
            .push_opt("router.field", options.router_field.as_deref());
        options.output.apply(&mut params);
        self.admin_post(AdminApi::Collections, &params)
    }

    pub fn build_delete_collection(&self, name: &str, output: OutputOptions) -> HttpRequest {
        let mut params = action("DELETE");
        params.push("name", name);
        output.apply(&mut params);
        self.admin_post(AdminApi::Collections, &params)
    }

    pub fn build_reload_collection(&self, name: &str, output: OutputOptions) -> HttpRequest {
        let mut params = action("RELOAD");
        params.push("name", name);
        output.apply(&mut params);
        self.admin_post(AdminApi::Collections, &params)
    }

    pub fn build_split_shard(&self, collection: &str, shard: &str, options: &SplitShardOptions) -> HttpRequest {
        let mut params = action("SPLITSHARD");
        params
            .push("collection", collection)
            .push("shard", shard)
            .push_opt("ranges", options.ranges.as_deref())
            .push_opt("split.key", options.split_key.as_deref());
        options.output.apply(&mut params);
        self.admin_post(AdminApi::Collections, &params)
    }

    /// Only valid for collections using the implicit router.
    pub fn build_create_shard(&self, collection: &str, shard: &str, options: &CreateShardOptions) -> HttpRequest {
        let mut params = action("CREATESHARD");
        params
            .push("collection", collection)
            .push("shard", shard)
            .push_opt("createNodeSet", options.create_node_set.as_deref());
        options.output.apply(&mut params);
        self.admin_post(AdminApi::Collections, &params)
    }

    pub fn build_delete_shard(&self, collection: &str, shard: &str, output: OutputOptions) -> HttpRequest {
        let mut params = action("DELETESHARD");
        params.push("collection", collection).push("shard", shard);
        output.apply(&mut params);
        self.admin_post(AdminApi::Collections, &params)
    }

    pub fn build_create_alias(&self, name: &str, collections: &[&str], output: OutputOptions) -> HttpRequest {
        let mut params = action("CREATEALIAS");
        params.push("name", name).push("collections", collections.join(","));
        output.apply(&mut params);
        self.admin_post(AdminApi::Collections, &params)
    }

    pub fn build_delete_alias(&self, name: &str, output: OutputOptions) -> HttpRequest {
        let mut params = action("DELETEALIAS");
        params.push("name", name);
        output.apply(&mut params);
        self.admin_post(AdminApi::Collections, &params)
    }

    pub fn build_delete_replica(
        &self,
        collection: &str,
        shard: &str,
        replica: &str,
        output: OutputOptions,
    ) -> HttpRequest {
        let mut params = action("DELETEREPLICA");
        params
            .push("collection", collection)
            .push("shard", shard)
            .push("replica", replica);
        output.apply(&mut params);
        self.admin_post(AdminApi::Collections, &params)
    }
}
