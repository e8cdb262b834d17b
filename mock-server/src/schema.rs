//! Schema API: reads under `/schema/...` and JSON command posts.

use std::collections::BTreeMap;

use serde_json::{json, Value};

use crate::documents::not_found;
use crate::response::{Failure, Outcome};
use crate::state::{CopyField, Definition, Schema, SolrState};

/// `GET /solr/{name}/schema[/{path}]`. An empty `path` returns the whole
/// schema.
pub fn read(state: &SolrState, name: &str, path: &str) -> Outcome {
    let schema = &state.index(name).ok_or_else(|| not_found(name))?.schema;
    let segments: Vec<&str> = path.split('/').filter(|s| !s.is_empty()).collect();

    match segments.as_slice() {
        [] => Ok(json!({"schema": schema.to_json()})),
        ["fields"] => Ok(json!({"fields": list(&schema.fields)})),
        ["fields", field] => one(&schema.fields, "field", field),
        ["dynamicfields"] => Ok(json!({"dynamicFields": list(&schema.dynamic_fields)})),
        ["dynamicfields", field] => one(&schema.dynamic_fields, "dynamicField", field),
        ["fieldtypes"] => Ok(json!({"fieldTypes": list(&schema.field_types)})),
        ["fieldtypes", field_type] => one(&schema.field_types, "fieldType", field_type),
        ["copyfields"] => Ok(json!({"copyFields": schema.copy_fields_json()})),
        ["name"] => Ok(json!({"name": schema.name})),
        ["version"] => Ok(json!({"version": schema.version})),
        ["uniquekey"] => Ok(json!({"uniqueKey": schema.unique_key})),
        ["similarity"] => Ok(json!({"similarity": {"class": "org.apache.solr.search.similarities.SchemaSimilarityFactory"}})),
        ["solrqueryparser", "defaultoperator"] => Ok(json!({"defaultOperator": schema.default_operator})),
        _ => Err(Failure::not_found(format!("Unknown schema path: /schema/{path}"))),
    }
}

fn list(defs: &BTreeMap<String, Definition>) -> Value {
    Value::Array(defs.values().cloned().map(Value::Object).collect())
}

fn one(defs: &BTreeMap<String, Definition>, key: &str, name: &str) -> Outcome {
    let def = defs
        .get(name)
        .ok_or_else(|| Failure::not_found(format!("No such path /schema/{key}s/{name}")))?;
    let mut out = serde_json::Map::new();
    out.insert(key.to_string(), Value::Object(def.clone()));
    Ok(Value::Object(out))
}

/// `POST /solr/{name}/schema`. Commands apply in order; the first failure
/// aborts and leaves the schema untouched.
pub fn command(state: &mut SolrState, name: &str, body: &[u8]) -> Outcome {
    let payload: Value = serde_json::from_slice(body)
        .map_err(|e| Failure::bad_request(format!("Cannot parse provided JSON: {e}")))?;
    let Value::Object(commands) = payload else {
        return Err(Failure::bad_request("Schema commands must be a JSON object"));
    };
    let index = state.index_mut(name).ok_or_else(|| not_found(name))?;

    let mut schema = index.schema.clone();
    for (command, arg) in commands {
        let items = match arg {
            Value::Array(items) => items,
            other => vec![other],
        };
        for item in items {
            let Value::Object(def) = item else {
                return Err(Failure::bad_request(format!("{command} expects an object")));
            };
            apply(&mut schema, &command, def)?;
        }
    }
    index.schema = schema;
    Ok(json!({}))
}

fn apply(schema: &mut Schema, command: &str, def: Definition) -> Result<(), Failure> {
    match command {
        "add-field" => add(&mut schema.fields, "Field", def, "type"),
        "replace-field" => replace(&mut schema.fields, "Field", def, "type"),
        "delete-field" => {
            let name = def_name(&def)?;
            if schema.copy_fields.iter().any(|cf| cf.source == name || cf.dest == name) {
                return Err(Failure::bad_request(format!(
                    "Can't delete field '{name}' because it's referred to by at least one copy field directive."
                )));
            }
            remove(&mut schema.fields, "field", &name)
        }
        "add-dynamic-field" => add(&mut schema.dynamic_fields, "Dynamic field", def, "type"),
        "replace-dynamic-field" => replace(&mut schema.dynamic_fields, "Dynamic field", def, "type"),
        "delete-dynamic-field" => remove(&mut schema.dynamic_fields, "dynamic field", &def_name(&def)?),
        "add-field-type" => add(&mut schema.field_types, "Field type", def, "class"),
        "replace-field-type" => replace(&mut schema.field_types, "Field type", def, "class"),
        "delete-field-type" => {
            let name = def_name(&def)?;
            let in_use = schema
                .fields
                .values()
                .chain(schema.dynamic_fields.values())
                .any(|f| f.get("type").and_then(Value::as_str) == Some(name.as_str()));
            if in_use {
                return Err(Failure::bad_request(format!("Can't delete '{name}' because it's the field type of fields")));
            }
            remove(&mut schema.field_types, "field type", &name)
        }
        "add-copy-field" => {
            let (source, dests) = copy_target(&def)?;
            if !schema.fields.contains_key(&source) && !schema.dynamic_fields.contains_key(&source) {
                return Err(Failure::bad_request(format!("copyField source :'{source}' is not a glob and doesn't match any explicit field or dynamicField.")));
            }
            let max_chars = def.get("maxChars").and_then(Value::as_u64);
            for dest in dests {
                schema.copy_fields.push(CopyField {
                    source: source.clone(),
                    dest,
                    max_chars,
                });
            }
            Ok(())
        }
        "delete-copy-field" => {
            let (source, dests) = copy_target(&def)?;
            for dest in dests {
                let before = schema.copy_fields.len();
                schema.copy_fields.retain(|cf| !(cf.source == source && cf.dest == dest));
                if schema.copy_fields.len() == before {
                    return Err(Failure::bad_request(format!("Copy field directive not found: '{source}' -> '{dest}'")));
                }
            }
            Ok(())
        }
        other => Err(Failure::bad_request(format!("Unknown schema command: {other}"))),
    }
}

fn def_name(def: &Definition) -> Result<String, Failure> {
    def.get("name")
        .and_then(Value::as_str)
        .map(str::to_string)
        .ok_or_else(|| Failure::bad_request("Missing 'name' attribute"))
}

fn add(defs: &mut BTreeMap<String, Definition>, label: &str, def: Definition, required: &str) -> Result<(), Failure> {
    let name = def_name(&def)?;
    if !def.contains_key(required) {
        return Err(Failure::bad_request(format!("{label} '{name}' is missing '{required}'")));
    }
    if defs.contains_key(&name) {
        return Err(Failure::bad_request(format!("{label} '{name}' already exists.")));
    }
    defs.insert(name, def);
    Ok(())
}

fn replace(defs: &mut BTreeMap<String, Definition>, label: &str, def: Definition, required: &str) -> Result<(), Failure> {
    let name = def_name(&def)?;
    if !def.contains_key(required) {
        return Err(Failure::bad_request(format!("{label} '{name}' is missing '{required}'")));
    }
    if !defs.contains_key(&name) {
        return Err(Failure::bad_request(format!("The {} '{name}' is not present in this schema, and so cannot be replaced.", label.to_lowercase())));
    }
    defs.insert(name, def);
    Ok(())
}

fn remove(defs: &mut BTreeMap<String, Definition>, label: &str, name: &str) -> Result<(), Failure> {
    defs.remove(name)
        .map(|_| ())
        .ok_or_else(|| Failure::bad_request(format!("The {label} '{name}' is not present in this schema, and so cannot be deleted.")))
}

fn copy_target(def: &Definition) -> Result<(String, Vec<String>), Failure> {
    let source = def
        .get("source")
        .and_then(Value::as_str)
        .ok_or_else(|| Failure::bad_request("Missing 'source' attribute"))?
        .to_string();
    let dests = match def.get("dest") {
        Some(Value::String(dest)) => vec![dest.clone()],
        Some(Value::Array(items)) => items.iter().filter_map(Value::as_str).map(str::to_string).collect(),
        _ => Vec::new(),
    };
    if dests.is_empty() {
        return Err(Failure::bad_request("Missing 'dest' attribute"));
    }
    Ok((source, dests))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::state::{Core, Index};

    fn state() -> SolrState {
        let mut state = SolrState::default();
        state.cores.insert(
            "c".into(),
            Core {
                instance_dir: "c".into(),
                config_set: None,
                index: Index::default(),
            },
        );
        state
    }

    #[test]
    fn reads_sections_and_single_entries() {
        let state = state();
        assert_eq!(read(&state, "c", "uniquekey").unwrap()["uniqueKey"], "id");
        assert_eq!(read(&state, "c", "fields/id").unwrap()["field"]["type"], "string");
        assert_eq!(read(&state, "c", "solrqueryparser/defaultoperator").unwrap()["defaultOperator"], "OR");
        assert!(read(&state, "c", "").unwrap()["schema"]["fields"].is_array());
        assert_eq!(read(&state, "c", "fields/nope").unwrap_err().status.as_u16(), 404);
        assert_eq!(read(&state, "missing", "").unwrap_err().status.as_u16(), 404);
    }

    #[test]
    fn add_replace_delete_field() {
        let mut state = state();
        command(&mut state, "c", br#"{"add-field":{"name":"title","type":"text_general","stored":true}}"#).unwrap();
        assert_eq!(read(&state, "c", "fields/title").unwrap()["field"]["stored"], true);

        command(&mut state, "c", br#"{"replace-field":{"name":"title","type":"string"}}"#).unwrap();
        let field = read(&state, "c", "fields/title").unwrap();
        assert_eq!(field["field"], json!({"name": "title", "type": "string"}));

        command(&mut state, "c", br#"{"delete-field":{"name":"title"}}"#).unwrap();
        assert!(read(&state, "c", "fields/title").is_err());
    }

    #[test]
    fn duplicate_add_fails_without_partial_apply() {
        let mut state = state();
        let err = command(
            &mut state,
            "c",
            br#"{"add-field":[{"name":"a","type":"string"},{"name":"id","type":"string"}]}"#,
        )
        .unwrap_err();
        assert_eq!(err.msg, "Field 'id' already exists.");
        assert!(read(&state, "c", "fields/a").is_err());
    }

    #[test]
    fn field_types_need_class_and_guard_usage() {
        let mut state = state();
        let err = command(&mut state, "c", br#"{"add-field-type":{"name":"t","type":"solr.TextField"}}"#).unwrap_err();
        assert_eq!(err.msg, "Field type 't' is missing 'class'");
        let err = command(&mut state, "c", br#"{"delete-field-type":{"name":"string"}}"#).unwrap_err();
        assert_eq!(err.status.as_u16(), 400);
    }

    #[test]
    fn copy_fields_accept_one_or_many_dests() {
        let mut state = state();
        command(&mut state, "c", br#"{"add-field":{"name":"title","type":"string"}}"#).unwrap();
        command(
            &mut state,
            "c",
            br#"{"add-copy-field":{"source":"title","dest":["_text_","id"],"maxChars":64}}"#,
        )
        .unwrap();
        let copy = read(&state, "c", "copyfields").unwrap();
        assert_eq!(copy["copyFields"][1], json!({"source": "title", "dest": "id", "maxChars": 64}));

        assert!(command(&mut state, "c", br#"{"delete-field":{"name":"title"}}"#).is_err());
        command(&mut state, "c", br#"{"delete-copy-field":{"source":"title","dest":["_text_","id"]}}"#).unwrap();
        assert_eq!(read(&state, "c", "copyfields").unwrap()["copyFields"], json!([]));
    }

    #[test]
    fn unknown_command_is_rejected() {
        let mut state = state();
        let err = command(&mut state, "c", br#"{"drop-everything":{}}"#).unwrap_err();
        assert_eq!(err.msg, "Unknown schema command: drop-everything");
    }
}
