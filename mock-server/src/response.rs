//! Request parameters and Solr-shaped replies (`wt=json|xml`, `indent`).

use axum::{
    http::{header, StatusCode},
    response::{IntoResponse, Response},
};
use serde::Deserialize;
use serde_json::{json, Map, Value};

/// Query-string pairs in arrival order; keys may repeat (`fq`).
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(transparent)]
pub struct SolrParams(pub Vec<(String, String)>);

impl SolrParams {
    pub fn get(&self, key: &str) -> Option<&str> {
        self.0.iter().find(|(k, _)| k == key).map(|(_, v)| v.as_str())
    }

    pub fn get_all<'a>(&'a self, key: &'a str) -> impl Iterator<Item = &'a str> + 'a {
        self.0.iter().filter(move |(k, _)| k == key).map(|(_, v)| v.as_str())
    }

    pub fn require(&self, key: &str) -> Result<&str, Failure> {
        self.get(key)
            .filter(|v| !v.is_empty())
            .ok_or_else(|| Failure::bad_request(format!("Missing required parameter: {key}")))
    }

    pub fn parse_or<T: std::str::FromStr>(&self, key: &str, default: T) -> Result<T, Failure> {
        match self.get(key) {
            None => Ok(default),
            Some(raw) => raw
                .parse()
                .map_err(|_| Failure::bad_request(format!("Invalid value for {key}: {raw}"))),
        }
    }

    fn wants_xml(&self) -> bool {
        self.get("wt") == Some("xml")
    }

    fn indent(&self) -> bool {
        matches!(self.get("indent"), Some("on" | "true"))
    }
}

/// An error the server reports inside a Solr error envelope.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Failure {
    pub status: StatusCode,
    pub msg: String,
}

impl Failure {
    pub fn new(status: StatusCode, msg: impl Into<String>) -> Self {
        Self {
            status,
            msg: msg.into(),
        }
    }

    pub fn bad_request(msg: impl Into<String>) -> Self {
        Self::new(StatusCode::BAD_REQUEST, msg)
    }

    pub fn not_found(msg: impl Into<String>) -> Self {
        Self::new(StatusCode::NOT_FOUND, msg)
    }

    pub fn server_error(msg: impl Into<String>) -> Self {
        Self::new(StatusCode::INTERNAL_SERVER_ERROR, msg)
    }
}

pub type Outcome = Result<Value, Failure>;

/// Wrap `outcome` with a `responseHeader` and render it in the requested
/// writer format.
pub fn render(params: &SolrParams, outcome: Outcome) -> Response {
    let (status, payload) = match outcome {
        Ok(payload) => (StatusCode::OK, with_header(0, payload)),
        Err(failure) => {
            let code = failure.status.as_u16();
            let payload = json!({"error": {"msg": failure.msg, "code": code}});
            (failure.status, with_header(code, payload))
        }
    };

    if params.wants_xml() {
        let body = to_xml(&payload, params.indent());
        return (status, [(header::CONTENT_TYPE, "application/xml; charset=UTF-8")], body).into_response();
    }

    let body = if params.indent() {
        serde_json::to_string_pretty(&payload)
    } else {
        serde_json::to_string(&payload)
    }
    .unwrap_or_default();
    (status, [(header::CONTENT_TYPE, "application/json; charset=UTF-8")], body).into_response()
}

fn with_header(status: u16, payload: Value) -> Value {
    let mut out = Map::new();
    out.insert("responseHeader".to_string(), json!({"status": status, "QTime": 0}));
    if let Value::Object(fields) = payload {
        out.extend(fields);
    }
    Value::Object(out)
}

fn escape(raw: &str) -> String {
    raw.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
}

/// Solr's XML response writer layout: `lst` for objects, `arr` for arrays,
/// typed leaf elements for scalars.
fn to_xml(payload: &Value, indent: bool) -> String {
    let mut out = String::from("<?xml version=\"1.0\" encoding=\"UTF-8\"?>\n<response>");
    if let Value::Object(fields) = payload {
        for (key, value) in fields {
            write_xml(&mut out, Some(key), value, 1, indent);
        }
    }
    if indent {
        out.push('\n');
    }
    out.push_str("</response>\n");
    out
}

fn write_xml(out: &mut String, name: Option<&str>, value: &Value, depth: usize, indent: bool) {
    if indent {
        out.push('\n');
        out.push_str(&"  ".repeat(depth));
    }
    let attr = name
        .map(|n| format!(" name=\"{}\"", escape(n)))
        .unwrap_or_default();
    match value {
        Value::Null => out.push_str(&format!("<null{attr}/>")),
        Value::Bool(b) => out.push_str(&format!("<bool{attr}>{b}</bool>")),
        Value::Number(n) if n.is_f64() => out.push_str(&format!("<double{attr}>{n}</double>")),
        Value::Number(n) => out.push_str(&format!("<long{attr}>{n}</long>")),
        Value::String(s) => out.push_str(&format!("<str{attr}>{}</str>", escape(s))),
        Value::Array(items) => {
            out.push_str(&format!("<arr{attr}>"));
            for item in items {
                write_xml(out, None, item, depth + 1, indent);
            }
            close(out, "arr", depth, indent);
        }
        Value::Object(fields) => {
            out.push_str(&format!("<lst{attr}>"));
            for (key, item) in fields {
                write_xml(out, Some(key), item, depth + 1, indent);
            }
            close(out, "lst", depth, indent);
        }
    }
}

fn close(out: &mut String, tag: &str, depth: usize, indent: bool) {
    if indent {
        out.push('\n');
        out.push_str(&"  ".repeat(depth));
    }
    out.push_str(&format!("</{tag}>"));
}

#[cfg(test)]
mod tests {
    use super::*;

    fn params(pairs: &[(&str, &str)]) -> SolrParams {
        SolrParams(pairs.iter().map(|(k, v)| (k.to_string(), v.to_string())).collect())
    }

    #[test]
    fn repeated_keys_are_kept() {
        let p = params(&[("fq", "a:1"), ("q", "*:*"), ("fq", "b:2")]);
        assert_eq!(p.get_all("fq").collect::<Vec<_>>(), vec!["a:1", "b:2"]);
        assert_eq!(p.get("q"), Some("*:*"));
    }

    #[test]
    fn require_rejects_missing_and_empty() {
        let p = params(&[("name", "")]);
        let err = p.require("name").unwrap_err();
        assert_eq!(err.status, StatusCode::BAD_REQUEST);
        assert_eq!(err.msg, "Missing required parameter: name");
    }

    #[test]
    fn parse_or_defaults_and_validates() {
        let p = params(&[("rows", "5"), ("start", "x")]);
        assert_eq!(p.parse_or("rows", 10usize).unwrap(), 5);
        assert_eq!(p.parse_or("missing", 10usize).unwrap(), 10);
        assert!(p.parse_or("start", 0usize).is_err());
    }

    #[test]
    fn xml_uses_typed_elements() {
        let xml = to_xml(
            &json!({"responseHeader": {"status": 0}, "name": "a<b", "ok": true, "list": [1, 2.5]}),
            false,
        );
        assert!(xml.starts_with("<?xml"));
        assert!(xml.contains("<lst name=\"responseHeader\"><long name=\"status\">0</long></lst>"));
        assert!(xml.contains("<str name=\"name\">a&lt;b</str>"));
        assert!(xml.contains("<bool name=\"ok\">true</bool>"));
        assert!(xml.contains("<arr name=\"list\"><long>1</long><double>2.5</double></arr>"));
        assert!(xml.trim_end().ends_with("</response>"));
    }
}
