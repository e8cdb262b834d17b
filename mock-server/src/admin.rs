//! `/solr/admin/{cores,collections,configs}` action handlers.

use serde_json::{json, Map, Value};
use tracing::debug;

use crate::response::{Failure, Outcome, SolrParams};
use crate::state::{Collection, Core, Index, SolrState, DEFAULT_CONFIGSET};

fn unsupported(action: &str) -> Failure {
    Failure::bad_request(format!("Unsupported operation: {action}"))
}

pub fn cores(state: &mut SolrState, params: &SolrParams) -> Outcome {
    let action = params.get("action").unwrap_or("STATUS").to_ascii_uppercase();
    debug!(%action, "core admin");
    match action.as_str() {
        "STATUS" => {
            let mut status = Map::new();
            match params.get("core") {
                Some(name) => {
                    let entry = state.cores.get(name).map(|core| describe(name, core));
                    status.insert(name.to_string(), entry.unwrap_or_else(|| json!({})));
                }
                None => {
                    for (name, core) in &state.cores {
                        status.insert(name.clone(), describe(name, core));
                    }
                }
            }
            Ok(json!({"initFailures": {}, "status": status}))
        }
        "CREATE" => {
            let name = params.require("name")?;
            if state.cores.contains_key(name) {
                return Err(Failure::server_error(format!("Core with name '{name}' already exists.")));
            }
            let config_set = params.get("configSet").map(str::to_string);
            if let Some(set) = &config_set {
                if !state.configsets.contains(set) {
                    return Err(Failure::bad_request(format!("Could not load configuration from directory {set}")));
                }
            }
            let core = Core {
                instance_dir: params.get("instanceDir").unwrap_or(name).to_string(),
                config_set,
                index: Index::default(),
            };
            state.cores.insert(name.to_string(), core);
            Ok(json!({"core": name}))
        }
        "RELOAD" => {
            let core = params.require("core")?;
            existing_core(state, core)?;
            Ok(json!({}))
        }
        "RENAME" => {
            let core = params.require("core")?;
            let other = params.require("other")?;
            if state.cores.contains_key(other) {
                return Err(Failure::bad_request(format!("Core with name '{other}' already exists.")));
            }
            let moved = state
                .cores
                .remove(core)
                .ok_or_else(|| missing_core(core))?;
            state.cores.insert(other.to_string(), moved);
            Ok(json!({}))
        }
        "SWAP" => {
            let core = params.require("core")?;
            let other = params.require("other")?;
            existing_core(state, core)?;
            existing_core(state, other)?;
            if core != other {
                let a = state.cores.remove(core).ok_or_else(|| missing_core(core))?;
                let b = state.cores.remove(other).ok_or_else(|| missing_core(other))?;
                state.cores.insert(core.to_string(), b);
                state.cores.insert(other.to_string(), a);
            }
            Ok(json!({}))
        }
        "UNLOAD" => {
            let core = params.require("core")?;
            state
                .cores
                .remove(core)
                .ok_or_else(|| Failure::bad_request(format!("Cannot unload non-existent core [{core}]")))?;
            Ok(json!({}))
        }
        other => Err(unsupported(other)),
    }
}

fn describe(name: &str, core: &Core) -> Value {
    json!({
        "name": name,
        "instanceDir": core.instance_dir,
        "config": core.config_set,
        "index": {"numDocs": core.index.docs.len()},
    })
}

fn missing_core(core: &str) -> Failure {
    Failure::bad_request(format!("No such core: {core}"))
}

fn existing_core<'a>(state: &'a SolrState, core: &str) -> Result<&'a Core, Failure> {
    state.cores.get(core).ok_or_else(|| missing_core(core))
}

fn missing_collection(name: &str) -> Failure {
    Failure::bad_request(format!("Could not find collection : {name}"))
}

fn collection_mut<'a>(state: &'a mut SolrState, name: &str) -> Result<&'a mut Collection, Failure> {
    state.collections.get_mut(name).ok_or_else(|| missing_collection(name))
}

fn split_list(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
        .collect()
}

pub fn collections(state: &mut SolrState, params: &SolrParams) -> Outcome {
    let action = params.require("action")?.to_ascii_uppercase();
    debug!(%action, "collections admin");
    match action.as_str() {
        "CREATE" => create_collection(state, params),
        "DELETE" => {
            let name = params.require("name")?;
            state.collections.remove(name).ok_or_else(|| missing_collection(name))?;
            for targets in state.aliases.values_mut() {
                targets.retain(|t| t != name);
            }
            state.aliases.retain(|_, targets| !targets.is_empty());
            Ok(json!({"success": {}}))
        }
        "RELOAD" => {
            let name = params.require("name")?;
            collection_mut(state, name)?;
            Ok(json!({"success": {}}))
        }
        "SPLITSHARD" => {
            let collection = collection_mut(state, params.require("collection")?)?;
            let shard = params.require("shard")?;
            if !collection.shards.contains_key(shard) {
                return Err(Failure::bad_request(format!("Shard {shard} not found")));
            }
            for half in 0..2 {
                collection.add_shard(&format!("{shard}_{half}"));
            }
            Ok(json!({"success": {}}))
        }
        "CREATESHARD" => {
            let collection = collection_mut(state, params.require("collection")?)?;
            let shard = params.require("shard")?;
            if collection.router != "implicit" {
                return Err(Failure::bad_request("shards can be added only to 'implicit' collections"));
            }
            if collection.shards.contains_key(shard) {
                return Err(Failure::bad_request(format!("Shard {shard} already exists")));
            }
            collection.add_shard(shard);
            Ok(json!({"success": {}}))
        }
        "DELETESHARD" => {
            let collection = collection_mut(state, params.require("collection")?)?;
            let shard = params.require("shard")?;
            collection
                .shards
                .remove(shard)
                .ok_or_else(|| Failure::bad_request(format!("No shard with name {shard} exists")))?;
            Ok(json!({"success": {}}))
        }
        "CREATEALIAS" => {
            let name = params.require("name")?;
            let targets = split_list(params.require("collections")?);
            if let Some(missing) = targets.iter().find(|t| !state.collections.contains_key(*t)) {
                return Err(Failure::bad_request(format!(
                    "Can't create collection alias for collections='{missing}', '{missing}' is not an existing collection or alias"
                )));
            }
            state.aliases.insert(name.to_string(), targets);
            Ok(json!({}))
        }
        "DELETEALIAS" => {
            let name = params.require("name")?;
            state.aliases.remove(name);
            Ok(json!({}))
        }
        "DELETEREPLICA" => {
            let collection = collection_mut(state, params.require("collection")?)?;
            let shard = params.require("shard")?;
            let replica = params.require("replica")?;
            let replicas = collection
                .shards
                .get_mut(shard)
                .ok_or_else(|| Failure::bad_request(format!("Invalid shard name : {shard}")))?;
            let before = replicas.len();
            replicas.retain(|r| r != replica);
            if replicas.len() == before {
                return Err(Failure::bad_request(format!(
                    "Invalid replica : {replica} in shard/collection : {shard}"
                )));
            }
            Ok(json!({"success": {}}))
        }
        other => Err(unsupported(other)),
    }
}

fn create_collection(state: &mut SolrState, params: &SolrParams) -> Outcome {
    let name = params.require("name")?;
    if state.collections.contains_key(name) {
        return Err(Failure::bad_request(format!("collection already exists: {name}")));
    }
    let router = params.get("router.name").unwrap_or("compositeId");
    let shard_names = match router {
        "compositeId" => {
            let count: u32 = params.parse_or("numShards", 0)?;
            if count == 0 {
                return Err(Failure::bad_request(
                    "numShards is a required param (when using CompositeId router).",
                ));
            }
            (1..=count).map(|n| format!("shard{n}")).collect::<Vec<_>>()
        }
        "implicit" => {
            let shards = split_list(params.get("shards").unwrap_or_default());
            if shards.is_empty() {
                return Err(Failure::bad_request("shards is a required param when using implicit router"));
            }
            shards
        }
        other => return Err(Failure::bad_request(format!("Unknown router: {other}"))),
    };
    let replication_factor: u32 = params.parse_or("replicationFactor", 1)?;
    let config_name = params.get("collection.configName").unwrap_or(DEFAULT_CONFIGSET);
    if !state.configsets.contains(config_name) {
        return Err(Failure::bad_request(format!(
            "Can not find the specified config set: {config_name}"
        )));
    }

    let collection = Collection::new(router, replication_factor, config_name, &shard_names);
    let mut success = Map::new();
    for (shard, replicas) in &collection.shards {
        for (n, _) in replicas.iter().enumerate() {
            let core = format!("{name}_{shard}_replica_n{}", n + 1);
            success.insert(core.clone(), json!({"responseHeader": {"status": 0}, "core": core}));
        }
    }
    state.collections.insert(name.to_string(), collection);
    Ok(json!({"success": Value::Object(success)}))
}

pub fn configs(state: &mut SolrState, params: &SolrParams) -> Outcome {
    let action = params.require("action")?.to_ascii_uppercase();
    debug!(%action, "configset admin");
    match action.as_str() {
        "CREATE" => {
            let name = params.require("name")?;
            if state.configsets.contains(name) {
                return Err(Failure::bad_request(format!("ConfigSet already exists: {name}")));
            }
            let base = params.get("baseConfigSet").unwrap_or(DEFAULT_CONFIGSET);
            if !state.configsets.contains(base) {
                return Err(Failure::bad_request(format!("Base ConfigSet does not exist: {base}")));
            }
            state.configsets.insert(name.to_string());
            Ok(json!({}))
        }
        "DELETE" => {
            let name = params.require("name")?;
            if let Some((collection, _)) = state.collections.iter().find(|(_, c)| c.config_name == name) {
                return Err(Failure::bad_request(format!(
                    "Can not delete ConfigSet as it is currently being used by collection [{collection}]"
                )));
            }
            if !state.configsets.remove(name) {
                return Err(Failure::bad_request(format!("ConfigSet does not exist to delete: {name}")));
            }
            Ok(json!({}))
        }
        "LIST" => Ok(json!({"configSets": state.configsets.iter().collect::<Vec<_>>()})),
        other => Err(unsupported(other)),
    }
}
