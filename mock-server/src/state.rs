//! In-memory model of a Solr node: cores, collections, aliases, configsets.

use std::collections::{BTreeMap, BTreeSet};

use serde_json::{json, Map, Value};

pub const DEFAULT_CONFIGSET: &str = "_default";

/// One schema definition, keyed by name within its section.
pub type Definition = Map<String, Value>;

#[derive(Debug, Clone, PartialEq)]
pub struct CopyField {
    pub source: String,
    pub dest: String,
    pub max_chars: Option<u64>,
}

#[derive(Debug, Clone)]
pub struct Schema {
    pub name: String,
    pub version: f64,
    pub unique_key: String,
    pub default_operator: String,
    pub fields: BTreeMap<String, Definition>,
    pub dynamic_fields: BTreeMap<String, Definition>,
    pub field_types: BTreeMap<String, Definition>,
    pub copy_fields: Vec<CopyField>,
}

fn definitions(items: Value) -> BTreeMap<String, Definition> {
    let mut out = BTreeMap::new();
    if let Value::Array(items) = items {
        for item in items {
            if let Value::Object(def) = item {
                if let Some(name) = def.get("name").and_then(Value::as_str) {
                    out.insert(name.to_string(), def.clone());
                }
            }
        }
    }
    out
}

impl Default for Schema {
    fn default() -> Self {
        Self {
            name: "default-config".to_string(),
            version: 1.6,
            unique_key: "id".to_string(),
            default_operator: "OR".to_string(),
            fields: definitions(json!([
                {"name": "id", "type": "string", "indexed": true, "stored": true, "required": true, "multiValued": false},
                {"name": "_version_", "type": "plong", "indexed": false, "stored": false},
                {"name": "_text_", "type": "text_general", "indexed": true, "stored": false, "multiValued": true},
            ])),
            dynamic_fields: definitions(json!([
                {"name": "*_s", "type": "string", "indexed": true, "stored": true},
                {"name": "*_i", "type": "pint", "indexed": true, "stored": true},
                {"name": "*_t", "type": "text_general", "indexed": true, "stored": true},
            ])),
            field_types: definitions(json!([
                {"name": "string", "class": "solr.StrField", "sortMissingLast": true},
                {"name": "plong", "class": "solr.LongPointField", "docValues": true},
                {"name": "pint", "class": "solr.IntPointField", "docValues": true},
                {"name": "boolean", "class": "solr.BoolField", "sortMissingLast": true},
                {"name": "text_general", "class": "solr.TextField", "positionIncrementGap": "100"},
            ])),
            copy_fields: Vec::new(),
        }
    }
}

impl Schema {
    pub fn copy_fields_json(&self) -> Value {
        Value::Array(
            self.copy_fields
                .iter()
                .map(|cf| {
                    let mut obj = json!({"source": cf.source, "dest": cf.dest});
                    if let Some(max) = cf.max_chars {
                        obj["maxChars"] = json!(max);
                    }
                    obj
                })
                .collect(),
        )
    }

    pub fn to_json(&self) -> Value {
        fn list(defs: &BTreeMap<String, Definition>) -> Value {
            Value::Array(defs.values().cloned().map(Value::Object).collect())
        }
        json!({
            "name": self.name,
            "version": self.version,
            "uniqueKey": self.unique_key,
            "fieldTypes": list(&self.field_types),
            "fields": list(&self.fields),
            "dynamicFields": list(&self.dynamic_fields),
            "copyFields": self.copy_fields_json(),
        })
    }
}

/// Documents plus schema; shared by cores and collections.
#[derive(Debug, Clone, Default)]
pub struct Index {
    pub docs: BTreeMap<String, Value>,
    pub schema: Schema,
    next_version: u64,
}

impl Index {
    /// Stores `doc` under its `id`, stamping `_version_`.
    pub fn put(&mut self, id: String, mut doc: Map<String, Value>) {
        self.next_version += 1;
        doc.insert("_version_".to_string(), json!(self.next_version));
        self.docs.insert(id, Value::Object(doc));
    }
}

#[derive(Debug, Clone)]
pub struct Core {
    pub instance_dir: String,
    pub config_set: Option<String>,
    pub index: Index,
}

#[derive(Debug, Clone)]
pub struct Collection {
    pub router: String,
    pub replication_factor: u32,
    pub config_name: String,
    /// Shard name to replica names.
    pub shards: BTreeMap<String, Vec<String>>,
    pub index: Index,
    next_replica: u32,
}

impl Collection {
    pub fn new(router: &str, replication_factor: u32, config_name: &str, shard_names: &[String]) -> Self {
        let mut collection = Self {
            router: router.to_string(),
            replication_factor,
            config_name: config_name.to_string(),
            shards: BTreeMap::new(),
            index: Index::default(),
            next_replica: 0,
        };
        for shard in shard_names {
            collection.add_shard(shard);
        }
        collection
    }

    pub fn add_shard(&mut self, shard: &str) {
        let replicas = (0..self.replication_factor.max(1))
            .map(|_| {
                self.next_replica += 1;
                format!("core_node{}", self.next_replica)
            })
            .collect();
        self.shards.insert(shard.to_string(), replicas);
    }
}

#[derive(Debug, Clone)]
pub struct SolrState {
    pub cores: BTreeMap<String, Core>,
    pub collections: BTreeMap<String, Collection>,
    pub aliases: BTreeMap<String, Vec<String>>,
    pub configsets: BTreeSet<String>,
}

impl Default for SolrState {
    fn default() -> Self {
        Self {
            cores: BTreeMap::new(),
            collections: BTreeMap::new(),
            aliases: BTreeMap::new(),
            configsets: BTreeSet::from([DEFAULT_CONFIGSET.to_string()]),
        }
    }
}

impl SolrState {
    /// Resolves a request path name: core, then collection, then alias (to
    /// its first collection).
    pub fn index(&self, name: &str) -> Option<&Index> {
        if let Some(core) = self.cores.get(name) {
            return Some(&core.index);
        }
        let target = self.resolve_collection(name)?;
        self.collections.get(&target).map(|c| &c.index)
    }

    pub fn index_mut(&mut self, name: &str) -> Option<&mut Index> {
        if self.cores.contains_key(name) {
            return self.cores.get_mut(name).map(|c| &mut c.index);
        }
        let target = self.resolve_collection(name)?;
        self.collections.get_mut(&target).map(|c| &mut c.index)
    }

    fn resolve_collection(&self, name: &str) -> Option<String> {
        if self.collections.contains_key(name) {
            return Some(name.to_string());
        }
        self.aliases.get(name).and_then(|targets| targets.first().cloned())
    }
}
