//! Schema API (`/solr/{collection}/schema`).
//!
//! Reads are plain GETs. Mutations POST a one-key JSON envelope named after
//! the schema command, e.g. `{"add-field": {"name": .., "type": ..}}`.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use super::SolrApi;
use crate::http::HttpRequest;
use crate::options::OutputOptions;
use crate::Result;

/// Free-form attributes merged into a schema command, e.g. `stored`,
/// `indexed`, `multiValued`, analyzers for field types.
pub type FieldAttributes = Map<String, Value>;

const SCHEMA: &str = "schema";

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CopyFieldOptions {
    /// Only honoured by `add-copy-field`.
    pub max_chars: Option<u32>,
    pub output: OutputOptions,
}

/// Caller attributes first, then the base attributes on top so the
/// identifying keys can't be overridden.
fn envelope(command: &str, base: FieldAttributes, extra: &FieldAttributes) -> Value {
    let mut attributes = extra.clone();
    attributes.extend(base);
    let mut body = Map::with_capacity(1);
    body.insert(command.to_string(), Value::Object(attributes));
    Value::Object(body)
}

fn named(name: &str) -> FieldAttributes {
    let mut base = Map::new();
    base.insert("name".to_string(), Value::from(name));
    base
}

fn named_with(name: &str, key: &str, value: &str) -> FieldAttributes {
    let mut base = named(name);
    base.insert(key.to_string(), Value::from(value));
    base
}

/// One destination is sent as a string, several as an array.
fn copy_dest(dest: &[&str]) -> Value {
    match dest {
        [single] => Value::from(*single),
        many => Value::from(many.to_vec()),
    }
}

impl SolrApi {
    fn schema_read(&self, collection: &str, path: &[&str], output: OutputOptions) -> HttpRequest {
        let mut segments = vec![SCHEMA];
        segments.extend_from_slice(path);
        HttpRequest::new(self.collection_url(collection, &segments, &output.to_params()))
    }

    fn schema_command(&self, collection: &str, body: &Value, output: OutputOptions) -> Result<HttpRequest> {
        let url = self.collection_url(collection, &[SCHEMA], &output.to_params());
        self.post_json(url, body)
    }

    /// The whole schema.
    pub fn build_schema(&self, collection: &str, output: OutputOptions) -> HttpRequest {
        self.schema_read(collection, &[], output)
    }

    pub fn build_schema_fields(
        &self,
        collection: &str,
        field: Option<&str>,
        output: OutputOptions,
    ) -> HttpRequest {
        self.schema_read(collection, &["fields", field.unwrap_or_default()], output)
    }

    pub fn build_schema_dynamic_fields(
        &self,
        collection: &str,
        field: Option<&str>,
        output: OutputOptions,
    ) -> HttpRequest {
        self.schema_read(collection, &["dynamicfields", field.unwrap_or_default()], output)
    }

    pub fn build_schema_field_types(
        &self,
        collection: &str,
        field_type: Option<&str>,
        output: OutputOptions,
    ) -> HttpRequest {
        self.schema_read(collection, &["fieldtypes", field_type.unwrap_or_default()], output)
    }

    pub fn build_schema_copy_fields(&self, collection: &str, output: OutputOptions) -> HttpRequest {
        self.schema_read(collection, &["copyfields"], output)
    }

    pub fn build_schema_name(&self, collection: &str, output: OutputOptions) -> HttpRequest {
        self.schema_read(collection, &["name"], output)
    }

    pub fn build_schema_version(&self, collection: &str, output: OutputOptions) -> HttpRequest {
        self.schema_read(collection, &["version"], output)
    }

    pub fn build_schema_unique_key(&self, collection: &str, output: OutputOptions) -> HttpRequest {
        self.schema_read(collection, &["uniquekey"], output)
    }

    pub fn build_schema_similarity(&self, collection: &str, output: OutputOptions) -> HttpRequest {
        self.schema_read(collection, &["similarity"], output)
    }

    pub fn build_schema_default_operator(&self, collection: &str, output: OutputOptions) -> HttpRequest {
        self.schema_read(collection, &["solrqueryparser", "defaultoperator"], output)
    }

    pub fn build_add_field(
        &self,
        collection: &str,
        name: &str,
        field_type: &str,
        attributes: &FieldAttributes,
        output: OutputOptions,
    ) -> Result<HttpRequest> {
        let body = envelope("add-field", named_with(name, "type", field_type), attributes);
        self.schema_command(collection, &body, output)
    }

    pub fn build_delete_field(&self, collection: &str, name: &str, output: OutputOptions) -> Result<HttpRequest> {
        let body = envelope("delete-field", named(name), &Map::new());
        self.schema_command(collection, &body, output)
    }

    /// Replaces the whole definition; attributes not given revert to the
    /// field type's defaults on the server.
    pub fn build_replace_field(
        &self,
        collection: &str,
        name: &str,
        field_type: &str,
        attributes: &FieldAttributes,
        output: OutputOptions,
    ) -> Result<HttpRequest> {
        let body = envelope("replace-field", named_with(name, "type", field_type), attributes);
        self.schema_command(collection, &body, output)
    }

    pub fn build_add_dynamic_field(
        &self,
        collection: &str,
        name: &str,
        field_type: &str,
        attributes: &FieldAttributes,
        output: OutputOptions,
    ) -> Result<HttpRequest> {
        let body = envelope("add-dynamic-field", named_with(name, "type", field_type), attributes);
        self.schema_command(collection, &body, output)
    }

    pub fn build_delete_dynamic_field(
        &self,
        collection: &str,
        name: &str,
        output: OutputOptions,
    ) -> Result<HttpRequest> {
        let body = envelope("delete-dynamic-field", named(name), &Map::new());
        self.schema_command(collection, &body, output)
    }

    pub fn build_replace_dynamic_field(
        &self,
        collection: &str,
        name: &str,
        field_type: &str,
        attributes: &FieldAttributes,
        output: OutputOptions,
    ) -> Result<HttpRequest> {
        let body = envelope("replace-dynamic-field", named_with(name, "type", field_type), attributes);
        self.schema_command(collection, &body, output)
    }

    /// `class` is the implementing Java class, e.g. `solr.TextField`.
    pub fn build_add_field_type(
        &self,
        collection: &str,
        name: &str,
        class: &str,
        attributes: &FieldAttributes,
        output: OutputOptions,
    ) -> Result<HttpRequest> {
        let body = envelope("add-field-type", named_with(name, "class", class), attributes);
        self.schema_command(collection, &body, output)
    }

    pub fn build_delete_field_type(
        &self,
        collection: &str,
        name: &str,
        output: OutputOptions,
    ) -> Result<HttpRequest> {
        let body = envelope("delete-field-type", named(name), &Map::new());
        self.schema_command(collection, &body, output)
    }

    pub fn build_replace_field_type(
        &self,
        collection: &str,
        name: &str,
        class: &str,
        attributes: &FieldAttributes,
        output: OutputOptions,
    ) -> Result<HttpRequest> {
        let body = envelope("replace-field-type", named_with(name, "class", class), attributes);
        self.schema_command(collection, &body, output)
    }

    pub fn build_add_copy_field(
        &self,
        collection: &str,
        source: &str,
        dest: &[&str],
        options: &CopyFieldOptions,
    ) -> Result<HttpRequest> {
        let mut base = Map::new();
        base.insert("source".to_string(), Value::from(source));
        base.insert("dest".to_string(), copy_dest(dest));
        if let Some(max_chars) = options.max_chars {
            base.insert("maxChars".to_string(), Value::from(max_chars));
        }
        let body = envelope("add-copy-field", base, &Map::new());
        self.schema_command(collection, &body, options.output)
    }

    pub fn build_delete_copy_field(
        &self,
        collection: &str,
        source: &str,
        dest: &[&str],
        output: OutputOptions,
    ) -> Result<HttpRequest> {
        let mut base = Map::new();
        base.insert("source".to_string(), Value::from(source));
        base.insert("dest".to_string(), copy_dest(dest));
        let body = envelope("delete-copy-field", base, &Map::new());
        self.schema_command(collection, &body, output)
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;
    use crate::http::HttpMethod;

    const BASE: &str = "http://localhost:8983/solr/foo/schema";

    fn api() -> SolrApi {
        SolrApi::default()
    }

    fn body(req: &HttpRequest) -> Value {
        serde_json::from_str(req.body.as_deref().unwrap()).unwrap()
    }

    fn attrs(value: Value) -> FieldAttributes {
        match value {
            Value::Object(map) => map,
            _ => panic!("attributes must be an object"),
        }
    }

    #[test]
    fn field_names_with_reserved_characters_stay_in_the_path() {
        let req = api().build_schema_fields("foo", Some("a?b"), OutputOptions::default());
        assert_eq!(req.url, format!("{BASE}/fields/a%3Fb?wt=json&indent=off"));
    }

    #[test]
    fn read_paths() {
        let api = api();
        let out = OutputOptions::default();
        let cases = [
            (api.build_schema("foo", out), BASE.to_string()),
            (api.build_schema_fields("foo", None, out), format!("{BASE}/fields")),
            (api.build_schema_fields("foo", Some("title"), out), format!("{BASE}/fields/title")),
            (api.build_schema_dynamic_fields("foo", Some("*_s"), out), format!("{BASE}/dynamicfields/*_s")),
            (api.build_schema_field_types("foo", None, out), format!("{BASE}/fieldtypes")),
            (api.build_schema_copy_fields("foo", out), format!("{BASE}/copyfields")),
            (api.build_schema_name("foo", out), format!("{BASE}/name")),
            (api.build_schema_version("foo", out), format!("{BASE}/version")),
            (api.build_schema_unique_key("foo", out), format!("{BASE}/uniquekey")),
            (api.build_schema_similarity("foo", out), format!("{BASE}/similarity")),
            (
                api.build_schema_default_operator("foo", out),
                format!("{BASE}/solrqueryparser/defaultoperator"),
            ),
        ];
        for (req, path) in cases {
            assert_eq!(req.method, HttpMethod::Get);
            assert_eq!(req.url, format!("{path}?wt=json&indent=off"));
            assert!(req.body.is_none());
        }
    }

    #[test]
    fn add_field_merges_attributes() {
        let extra = attrs(json!({"stored": true, "multiValued": false}));
        let req = api()
            .build_add_field("foo", "title", "text_general", &extra, OutputOptions::default())
            .unwrap();
        assert_eq!(req.method, HttpMethod::Post);
        assert_eq!(req.url, format!("{BASE}?wt=json&indent=off"));
        assert_eq!(
            req.headers,
            vec![("content-type".to_string(), "application/json".to_string())]
        );
        assert_eq!(
            body(&req),
            json!({"add-field": {"name": "title", "type": "text_general", "stored": true, "multiValued": false}})
        );
    }

    #[test]
    fn base_attributes_win_over_extras() {
        let extra = attrs(json!({"name": "other", "type": "string", "indexed": false}));
        let req = api()
            .build_replace_field("foo", "title", "text_en", &extra, OutputOptions::default())
            .unwrap();
        assert_eq!(
            body(&req),
            json!({"replace-field": {"name": "title", "type": "text_en", "indexed": false}})
        );
    }

    #[test]
    fn delete_commands_only_carry_name() {
        let out = OutputOptions::default();
        let api = api();
        assert_eq!(
            body(&api.build_delete_field("foo", "title", out).unwrap()),
            json!({"delete-field": {"name": "title"}})
        );
        assert_eq!(
            body(&api.build_delete_dynamic_field("foo", "*_s", out).unwrap()),
            json!({"delete-dynamic-field": {"name": "*_s"}})
        );
        assert_eq!(
            body(&api.build_delete_field_type("foo", "text_en", out).unwrap()),
            json!({"delete-field-type": {"name": "text_en"}})
        );
    }

    #[test]
    fn dynamic_field_envelopes() {
        let out = OutputOptions::default();
        let api = api();
        let add = api
            .build_add_dynamic_field("foo", "*_txt", "text_general", &Map::new(), out)
            .unwrap();
        assert_eq!(body(&add), json!({"add-dynamic-field": {"name": "*_txt", "type": "text_general"}}));

        let replace = api
            .build_replace_dynamic_field("foo", "*_txt", "string", &attrs(json!({"stored": false})), out)
            .unwrap();
        assert_eq!(
            body(&replace),
            json!({"replace-dynamic-field": {"name": "*_txt", "type": "string", "stored": false}})
        );
    }

    #[test]
    fn field_type_envelopes_use_class() {
        let extra = attrs(json!({"positionIncrementGap": "100"}));
        let out = OutputOptions::default();
        let add = api()
            .build_add_field_type("foo", "text_en", "solr.TextField", &extra, out)
            .unwrap();
        assert_eq!(
            body(&add),
            json!({"add-field-type": {"name": "text_en", "class": "solr.TextField", "positionIncrementGap": "100"}})
        );

        let replace = api()
            .build_replace_field_type("foo", "text_en", "solr.TextField", &Map::new(), out)
            .unwrap();
        assert_eq!(
            body(&replace),
            json!({"replace-field-type": {"name": "text_en", "class": "solr.TextField"}})
        );
    }

    #[test]
    fn copy_field_dest_shapes() {
        let api = api();
        let single = api
            .build_add_copy_field("foo", "title", &["_text_"], &CopyFieldOptions::default())
            .unwrap();
        assert_eq!(body(&single), json!({"add-copy-field": {"source": "title", "dest": "_text_"}}));

        let options = CopyFieldOptions {
            max_chars: Some(256),
            ..Default::default()
        };
        let many = api
            .build_add_copy_field("foo", "title", &["a_s", "b_s"], &options)
            .unwrap();
        assert_eq!(
            body(&many),
            json!({"add-copy-field": {"source": "title", "dest": ["a_s", "b_s"], "maxChars": 256}})
        );

        let delete = api
            .build_delete_copy_field("foo", "title", &["_text_"], OutputOptions::default())
            .unwrap();
        assert_eq!(body(&delete), json!({"delete-copy-field": {"source": "title", "dest": "_text_"}}));
    }
}
