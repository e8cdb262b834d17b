//! `/update` and `/query` for cores, collections and aliases.

use serde_json::{json, Map, Value};
use uuid::Uuid;

use crate::response::{Failure, Outcome, SolrParams};
use crate::state::{Index, SolrState};

pub fn not_found(name: &str) -> Failure {
    Failure::not_found(format!("Collection or core not found: {name}"))
}

fn doc_id(doc: &Map<String, Value>) -> Option<String> {
    match doc.get("id")? {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    }
}

fn add(index: &mut Index, doc: Value) -> Result<(), Failure> {
    let Value::Object(mut doc) = doc else {
        return Err(Failure::bad_request("Expected a JSON object for a document"));
    };
    let id = match doc_id(&doc) {
        Some(id) => id,
        None => {
            let id = Uuid::new_v4().to_string();
            doc.insert("id".to_string(), Value::String(id.clone()));
            id
        }
    };
    index.put(id, doc);
    Ok(())
}

fn delete(index: &mut Index, target: &Value) -> Result<(), Failure> {
    match target {
        Value::String(id) => {
            index.docs.remove(id);
        }
        Value::Number(n) => {
            index.docs.remove(&n.to_string());
        }
        Value::Array(items) => {
            for item in items {
                delete(index, item)?;
            }
        }
        Value::Object(command) => {
            if let Some(id) = command.get("id") {
                delete(index, id)?;
            } else if let Some(q) = command.get("query").and_then(Value::as_str) {
                index.docs.retain(|_, doc| !matches(doc, q));
            } else {
                return Err(Failure::bad_request("delete requires an id or a query"));
            }
        }
        _ => return Err(Failure::bad_request("Invalid delete command")),
    }
    Ok(())
}

/// Applies a JSON update: a bare array of documents, or an object of
/// `add`/`delete`/`commit` commands.
pub fn update(state: &mut SolrState, name: &str, body: &[u8]) -> Outcome {
    let payload: Value = serde_json::from_slice(body)
        .map_err(|e| Failure::bad_request(format!("Cannot parse provided JSON: {e}")))?;
    let index = state.index_mut(name).ok_or_else(|| not_found(name))?;

    match payload {
        Value::Array(docs) => {
            for doc in docs {
                add(index, doc)?;
            }
        }
        Value::Object(commands) => {
            for (command, arg) in commands {
                match command.as_str() {
                    "add" => {
                        let doc = match arg {
                            Value::Object(mut envelope) if envelope.contains_key("doc") => {
                                envelope.remove("doc").unwrap_or(Value::Null)
                            }
                            other => other,
                        };
                        add(index, doc)?;
                    }
                    "delete" => delete(index, &arg)?,
                    "commit" | "optimize" | "rollback" => {}
                    other => {
                        return Err(Failure::bad_request(format!("Unknown command '{other}'")));
                    }
                }
            }
        }
        _ => return Err(Failure::bad_request("Expected a JSON array or object")),
    }
    Ok(json!({}))
}

fn tokens(raw: &str) -> impl Iterator<Item = String> + '_ {
    raw.split(|c: char| !c.is_alphanumeric())
        .filter(|t| !t.is_empty())
        .map(str::to_lowercase)
}

fn value_matches(value: &Value, term: &str) -> bool {
    match value {
        Value::Array(items) => items.iter().any(|v| value_matches(v, term)),
        Value::String(s) => {
            let lower = s.to_lowercase();
            lower == term || tokens(s).any(|t| t == term) || (term.contains(' ') && lower.contains(term))
        }
        Value::Number(n) => n.to_string() == term,
        Value::Bool(b) => b.to_string() == term,
        _ => false,
    }
}

/// Minimal query syntax: `*:*`, `field:term`, `field:*` and bare terms.
pub fn matches(doc: &Value, q: &str) -> bool {
    let q = q.trim();
    if q.is_empty() || q == "*:*" || q == "*" {
        return true;
    }
    let Value::Object(fields) = doc else {
        return false;
    };
    match q.split_once(':') {
        Some((field, term)) => {
            let term = term.trim().trim_matches('"').to_lowercase();
            match fields.get(field) {
                Some(_) if term == "*" => true,
                Some(value) => value_matches(value, &term),
                None => false,
            }
        }
        None => {
            let term = q.trim_matches('"').to_lowercase();
            fields.values().any(|v| value_matches(v, &term))
        }
    }
}

fn project(doc: &Value, fl: Option<&str>) -> Value {
    let (Some(fl), Value::Object(fields)) = (fl, doc) else {
        return doc.clone();
    };
    let wanted: Vec<&str> = fl.split(',').map(str::trim).filter(|f| !f.is_empty()).collect();
    if wanted.contains(&"*") {
        return doc.clone();
    }
    let kept: Map<String, Value> = fields
        .iter()
        .filter(|(k, _)| wanted.contains(&k.as_str()))
        .map(|(k, v)| (k.clone(), v.clone()))
        .collect();
    Value::Object(kept)
}

pub fn query(state: &SolrState, name: &str, params: &SolrParams) -> Outcome {
    let index = state.index(name).ok_or_else(|| not_found(name))?;
    let q = params.get("q").unwrap_or("*:*");
    let start: usize = params.parse_or("start", 0)?;
    let rows: usize = params.parse_or("rows", 10)?;
    let filters: Vec<&str> = params.get_all("fq").collect();

    let hits: Vec<&Value> = index
        .docs
        .values()
        .filter(|doc| matches(doc, q) && filters.iter().all(|fq| matches(doc, fq)))
        .collect();
    let docs: Vec<Value> = hits
        .iter()
        .skip(start)
        .take(rows)
        .map(|doc| project(doc, params.get("fl")))
        .collect();

    Ok(json!({
        "response": {
            "numFound": hits.len(),
            "start": start,
            "numFoundExact": true,
            "docs": docs,
        }
    }))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::state::Core;

    fn state_with_core(name: &str) -> SolrState {
        let mut state = SolrState::default();
        state.cores.insert(
            name.to_string(),
            Core {
                instance_dir: name.to_string(),
                config_set: None,
                index: Index::default(),
            },
        );
        state
    }

    fn params(pairs: &[(&str, &str)]) -> SolrParams {
        SolrParams(pairs.iter().map(|(k, v)| (k.to_string(), v.to_string())).collect())
    }

    #[test]
    fn bare_array_and_envelope_both_add() {
        let mut state = state_with_core("c");
        update(&mut state, "c", br#"[{"id":"1"},{"id":2}]"#).unwrap();
        update(&mut state, "c", br#"{"add":{"doc":{"id":"3"},"boost":1.0}}"#).unwrap();
        let ids: Vec<&String> = state.index("c").unwrap().docs.keys().collect();
        assert_eq!(ids, vec!["1", "2", "3"]);
    }

    #[test]
    fn documents_without_id_get_uuid() {
        let mut state = state_with_core("c");
        update(&mut state, "c", br#"[{"title":"x"}]"#).unwrap();
        let index = state.index("c").unwrap();
        let (id, doc) = index.docs.iter().next().unwrap();
        assert!(Uuid::parse_str(id).is_ok());
        assert_eq!(doc["id"], id.as_str());
    }

    #[test]
    fn delete_forms() {
        let mut state = state_with_core("c");
        update(&mut state, "c", br#"[{"id":"1","t":"a"},{"id":"2","t":"b"},{"id":"3","t":"b"},{"id":"4"}]"#).unwrap();
        update(&mut state, "c", br#"{"delete":["1"]}"#).unwrap();
        update(&mut state, "c", br#"{"delete":{"query":"t:b"}}"#).unwrap();
        update(&mut state, "c", br#"{"delete":"4"}"#).unwrap();
        assert!(state.index("c").unwrap().docs.is_empty());
    }

    #[test]
    fn invalid_json_and_unknown_command() {
        let mut state = state_with_core("c");
        assert_eq!(update(&mut state, "c", b"{nope").unwrap_err().status.as_u16(), 400);
        let err = update(&mut state, "c", br#"{"explode":{}}"#).unwrap_err();
        assert_eq!(err.msg, "Unknown command 'explode'");
        assert_eq!(update(&mut state, "missing", b"[]").unwrap_err().status.as_u16(), 404);
    }

    #[test]
    fn term_matching() {
        let doc = json!({"id": "123", "Title": "A tale of two documents", "tags": ["x", "Y"]});
        assert!(matches(&doc, "*:*"));
        assert!(matches(&doc, "Title:tale"));
        assert!(!matches(&doc, "title_missing:*"));
        assert!(matches(&doc, "Title:*"));
        assert!(matches(&doc, "tags:y"));
        assert!(matches(&doc, "\"two documents\""));
        assert!(matches(&doc, "id:123"));
        assert!(!matches(&doc, "Title:times"));
    }

    #[test]
    fn query_pages_and_projects() {
        let mut state = state_with_core("c");
        update(
            &mut state,
            "c",
            br#"[{"id":"1","t":"best of times"},{"id":"2","t":"worst of times"},{"id":"3","t":"other"}]"#,
        )
        .unwrap();
        let out = query(&state, "c", &params(&[("q", "t:times"), ("rows", "1"), ("fl", "id")])).unwrap();
        assert_eq!(out["response"]["numFound"], 2);
        assert_eq!(out["response"]["docs"], json!([{"id": "1"}]));

        let filtered = query(&state, "c", &params(&[("q", "t:times"), ("fq", "t:worst")])).unwrap();
        assert_eq!(filtered["response"]["numFound"], 1);
    }
}
