//! Asynchronous Solr client.
//!
//! # Design
//! `SolrClient` pairs the pure `SolrApi` builders with a `Transport`. Each
//! method builds one request and awaits exactly one `Transport::execute`; the
//! raw `HttpResponse` is returned whatever its status. Concurrent calls share
//! nothing but the read-only connection and the transport's pool, so there is
//! no ordering between them.

use serde_json::Value;
use tracing::debug;

use crate::api::{
    AddDocumentOptions, AddDocumentsOptions, CopyFieldOptions, CreateCollectionOptions,
    CreateConfigSetOptions, CreateCoreOptions, CreateShardOptions, FieldAttributes, Query,
    SolrApi, SplitShardOptions, UnloadCoreOptions,
};
use crate::connection::Connection;
use crate::error::Result;
use crate::http::{HttpRequest, HttpResponse};
use crate::options::OutputOptions;
use crate::transport::{ReqwestTransport, Transport};

pub struct SolrClient<T = ReqwestTransport> {
    api: SolrApi,
    transport: T,
}

impl SolrClient<ReqwestTransport> {
    /// Client over `reqwest`, trusting the connection's TLS settings.
    pub fn new(connection: Connection) -> Result<Self> {
        let transport = ReqwestTransport::new(&connection.tls)?;
        Ok(Self::with_transport(connection, transport))
    }
}

impl<T: Transport> SolrClient<T> {
    pub fn with_transport(connection: Connection, transport: T) -> Self {
        Self {
            api: SolrApi::new(connection),
            transport,
        }
    }

    /// The request builders, for callers that want to inspect or batch
    /// requests before sending them.
    pub fn api(&self) -> &SolrApi {
        &self.api
    }

    pub fn transport(&self) -> &T {
        &self.transport
    }

    /// Send one request and return the response as received.
    pub async fn execute(&self, request: HttpRequest) -> Result<HttpResponse> {
        debug!(method = %request.method, url = %request.url, "sending Solr request");
        let response = self.transport.execute(request).await?;
        debug!(status = response.status, bytes = response.body.len(), "Solr response received");
        Ok(response)
    }

    pub async fn core_status(&self, core: Option<&str>, output: OutputOptions) -> Result<HttpResponse> {
        self.execute(self.api.build_core_status(core, output)).await
    }

    pub async fn core_create(&self, name: &str, options: &CreateCoreOptions) -> Result<HttpResponse> {
        self.execute(self.api.build_core_create(name, options)).await
    }

    pub async fn core_reload(&self, core: &str, output: OutputOptions) -> Result<HttpResponse> {
        self.execute(self.api.build_core_reload(core, output)).await
    }

    pub async fn core_rename(&self, core: &str, other: &str, output: OutputOptions) -> Result<HttpResponse> {
        self.execute(self.api.build_core_rename(core, other, output)).await
    }

    pub async fn core_swap(&self, core: &str, other: &str, output: OutputOptions) -> Result<HttpResponse> {
        self.execute(self.api.build_core_swap(core, other, output)).await
    }

    pub async fn core_unload(&self, core: &str, options: &UnloadCoreOptions) -> Result<HttpResponse> {
        self.execute(self.api.build_core_unload(core, options)).await
    }

    pub async fn configset_create(
        &self,
        name: &str,
        base_configset: &str,
        options: &CreateConfigSetOptions,
    ) -> Result<HttpResponse> {
        self.execute(self.api.build_configset_create(name, base_configset, options))
            .await
    }

    pub async fn configset_delete(&self, name: &str, output: OutputOptions) -> Result<HttpResponse> {
        self.execute(self.api.build_configset_delete(name, output)).await
    }

    pub async fn configset_list(&self, output: OutputOptions) -> Result<HttpResponse> {
        self.execute(self.api.build_configset_list(output)).await
    }

    pub async fn schema(&self, collection: &str, output: OutputOptions) -> Result<HttpResponse> {
        self.execute(self.api.build_schema(collection, output)).await
    }

    pub async fn schema_fields(
        &self,
        collection: &str,
        field: Option<&str>,
        output: OutputOptions,
    ) -> Result<HttpResponse> {
        self.execute(self.api.build_schema_fields(collection, field, output)).await
    }

    pub async fn schema_dynamic_fields(
        &self,
        collection: &str,
        field: Option<&str>,
        output: OutputOptions,
    ) -> Result<HttpResponse> {
        self.execute(self.api.build_schema_dynamic_fields(collection, field, output))
            .await
    }

    pub async fn schema_field_types(
        &self,
        collection: &str,
        field_type: Option<&str>,
        output: OutputOptions,
    ) -> Result<HttpResponse> {
        self.execute(self.api.build_schema_field_types(collection, field_type, output))
            .await
    }

    pub async fn schema_copy_fields(&self, collection: &str, output: OutputOptions) -> Result<HttpResponse> {
        self.execute(self.api.build_schema_copy_fields(collection, output)).await
    }

    pub async fn schema_name(&self, collection: &str, output: OutputOptions) -> Result<HttpResponse> {
        self.execute(self.api.build_schema_name(collection, output)).await
    }

    pub async fn schema_version(&self, collection: &str, output: OutputOptions) -> Result<HttpResponse> {
        self.execute(self.api.build_schema_version(collection, output)).await
    }

    pub async fn schema_unique_key(&self, collection: &str, output: OutputOptions) -> Result<HttpResponse> {
        self.execute(self.api.build_schema_unique_key(collection, output)).await
    }

    pub async fn schema_similarity(&self, collection: &str, output: OutputOptions) -> Result<HttpResponse> {
        self.execute(self.api.build_schema_similarity(collection, output)).await
    }

    pub async fn schema_default_operator(
        &self,
        collection: &str,
        output: OutputOptions,
    ) -> Result<HttpResponse> {
        self.execute(self.api.build_schema_default_operator(collection, output))
            .await
    }

    pub async fn add_field(
        &self,
        collection: &str,
        name: &str,
        field_type: &str,
        attributes: &FieldAttributes,
        output: OutputOptions,
    ) -> Result<HttpResponse> {
        let request = self
            .api
            .build_add_field(collection, name, field_type, attributes, output)?;
        self.execute(request).await
    }

    pub async fn delete_field(&self, collection: &str, name: &str, output: OutputOptions) -> Result<HttpResponse> {
        let request = self.api.build_delete_field(collection, name, output)?;
        self.execute(request).await
    }

    pub async fn replace_field(
        &self,
        collection: &str,
        name: &str,
        field_type: &str,
        attributes: &FieldAttributes,
        output: OutputOptions,
    ) -> Result<HttpResponse> {
        let request = self
            .api
            .build_replace_field(collection, name, field_type, attributes, output)?;
        self.execute(request).await
    }

    pub async fn add_dynamic_field(
        &self,
        collection: &str,
        name: &str,
        field_type: &str,
        attributes: &FieldAttributes,
        output: OutputOptions,
    ) -> Result<HttpResponse> {
        let request = self
            .api
            .build_add_dynamic_field(collection, name, field_type, attributes, output)?;
        self.execute(request).await
    }

    pub async fn delete_dynamic_field(
        &self,
        collection: &str,
        name: &str,
        output: OutputOptions,
    ) -> Result<HttpResponse> {
        let request = self.api.build_delete_dynamic_field(collection, name, output)?;
        self.execute(request).await
    }

    pub async fn replace_dynamic_field(
        &self,
        collection: &str,
        name: &str,
        field_type: &str,
        attributes: &FieldAttributes,
        output: OutputOptions,
    ) -> Result<HttpResponse> {
        let request = self
            .api
            .build_replace_dynamic_field(collection, name, field_type, attributes, output)?;
        self.execute(request).await
    }

    pub async fn add_field_type(
        &self,
        collection: &str,
        name: &str,
        class: &str,
        attributes: &FieldAttributes,
        output: OutputOptions,
    ) -> Result<HttpResponse> {
        let request = self
            .api
            .build_add_field_type(collection, name, class, attributes, output)?;
        self.execute(request).await
    }

    pub async fn delete_field_type(
        &self,
        collection: &str,
        name: &str,
        output: OutputOptions,
    ) -> Result<HttpResponse> {
        let request = self.api.build_delete_field_type(collection, name, output)?;
        self.execute(request).await
    }

    pub async fn replace_field_type(
        &self,
        collection: &str,
        name: &str,
        class: &str,
        attributes: &FieldAttributes,
        output: OutputOptions,
    ) -> Result<HttpResponse> {
        let request = self
            .api
            .build_replace_field_type(collection, name, class, attributes, output)?;
        self.execute(request).await
    }

    pub async fn add_copy_field(
        &self,
        collection: &str,
        source: &str,
        dest: &[&str],
        options: &CopyFieldOptions,
    ) -> Result<HttpResponse> {
        let request = self.api.build_add_copy_field(collection, source, dest, options)?;
        self.execute(request).await
    }

    pub async fn delete_copy_field(
        &self,
        collection: &str,
        source: &str,
        dest: &[&str],
        output: OutputOptions,
    ) -> Result<HttpResponse> {
        let request = self.api.build_delete_copy_field(collection, source, dest, output)?;
        self.execute(request).await
    }

    pub async fn create_collection(
        &self,
        name: &str,
        options: &CreateCollectionOptions,
    ) -> Result<HttpResponse> {
        self.execute(self.api.build_create_collection(name, options)).await
    }

    pub async fn delete_collection(&self, name: &str, output: OutputOptions) -> Result<HttpResponse> {
        self.execute(self.api.build_delete_collection(name, output)).await
    }

    pub async fn reload_collection(&self, name: &str, output: OutputOptions) -> Result<HttpResponse> {
        self.execute(self.api.build_reload_collection(name, output)).await
    }

    pub async fn split_shard(
        &self,
        collection: &str,
        shard: &str,
        options: &SplitShardOptions,
    ) -> Result<HttpResponse> {
        self.execute(self.api.build_split_shard(collection, shard, options)).await
    }

    pub async fn create_shard(
        &self,
        collection: &str,
        shard: &str,
        options: &CreateShardOptions,
    ) -> Result<HttpResponse> {
        self.execute(self.api.build_create_shard(collection, shard, options)).await
    }

    pub async fn delete_shard(&self, collection: &str, shard: &str, output: OutputOptions) -> Result<HttpResponse> {
        self.execute(self.api.build_delete_shard(collection, shard, output)).await
    }

    pub async fn create_alias(
        &self,
        name: &str,
        collections: &[&str],
        output: OutputOptions,
    ) -> Result<HttpResponse> {
        self.execute(self.api.build_create_alias(name, collections, output)).await
    }

    pub async fn delete_alias(&self, name: &str, output: OutputOptions) -> Result<HttpResponse> {
        self.execute(self.api.build_delete_alias(name, output)).await
    }

    pub async fn delete_replica(
        &self,
        collection: &str,
        shard: &str,
        replica: &str,
        output: OutputOptions,
    ) -> Result<HttpResponse> {
        self.execute(self.api.build_delete_replica(collection, shard, replica, output))
            .await
    }

    pub async fn query(&self, collection: &str, query: &Query) -> Result<HttpResponse> {
        self.execute(self.api.build_query(collection, query)).await
    }

    pub async fn add_document(
        &self,
        collection: &str,
        doc: &Value,
        options: &AddDocumentOptions,
    ) -> Result<HttpResponse> {
        let request = self.api.build_add_document(collection, doc, options)?;
        self.execute(request).await
    }

    pub async fn add_documents(
        &self,
        collection: &str,
        docs: &[Value],
        options: &AddDocumentsOptions,
    ) -> Result<HttpResponse> {
        let request = self.api.build_add_documents(collection, docs, options)?;
        self.execute(request).await
    }

    pub async fn update_json(&self, collection: &str, body: &Value, output: OutputOptions) -> Result<HttpResponse> {
        let request = self.api.build_update_json(collection, body, output)?;
        self.execute(request).await
    }

    pub async fn delete_documents(
        &self,
        collection: &str,
        ids: &[&str],
        output: OutputOptions,
    ) -> Result<HttpResponse> {
        let request = self.api.build_delete_documents(collection, ids, output)?;
        self.execute(request).await
    }

    pub async fn delete_by_query(&self, collection: &str, query: &str, output: OutputOptions) -> Result<HttpResponse> {
        let request = self.api.build_delete_by_query(collection, query, output)?;
        self.execute(request).await
    }

    pub async fn commit(&self, collection: &str, output: OutputOptions) -> Result<HttpResponse> {
        let request = self.api.build_commit(collection, output)?;
        self.execute(request).await
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Mutex;

    use async_trait::async_trait;
    use serde_json::json;

    use super::*;
    use crate::error::SolrError;
    use crate::http::HttpMethod;

    /// Records every request and answers with a canned response.
    struct RecordingTransport {
        sent: Mutex<Vec<HttpRequest>>,
        status: u16,
        body: &'static str,
    }

    impl RecordingTransport {
        fn answering(status: u16, body: &'static str) -> Self {
            Self {
                sent: Mutex::new(Vec::new()),
                status,
                body,
            }
        }

        fn sent(&self) -> Vec<HttpRequest> {
            self.sent.lock().unwrap().clone()
        }
    }

    #[async_trait]
    impl Transport for RecordingTransport {
        async fn execute(&self, request: HttpRequest) -> Result<HttpResponse> {
            self.sent.lock().unwrap().push(request);
            Ok(HttpResponse {
                status: self.status,
                headers: Vec::new(),
                body: self.body.to_string(),
            })
        }
    }

    fn client(status: u16, body: &'static str) -> SolrClient<RecordingTransport> {
        SolrClient::with_transport(Connection::default(), RecordingTransport::answering(status, body))
    }

    #[tokio::test]
    async fn one_call_sends_one_request() {
        let client = client(200, r#"{"responseHeader":{"status":0}}"#);
        let response = client.core_create("test", &CreateCoreOptions::default()).await.unwrap();
        assert_eq!(response.status, 200);

        let sent = client.transport().sent();
        assert_eq!(sent.len(), 1);
        assert_eq!(sent[0].method, HttpMethod::Post);
        assert_eq!(
            sent[0].url,
            "http://localhost:8983/solr/admin/cores?action=CREATE&name=test&wt=json&indent=off"
        );
    }

    #[tokio::test]
    async fn server_errors_are_returned_as_responses() {
        let body = r#"{"error":{"msg":"Could not find collection : foo","code":400}}"#;
        let client = client(400, body);
        let response = client
            .delete_collection("foo", OutputOptions::default())
            .await
            .unwrap();
        assert_eq!(response.status, 400);
        assert_eq!(response.body, body);
        assert!(!response.is_success());
    }

    #[tokio::test]
    async fn invalid_router_never_reaches_transport() {
        let client = client(200, "{}");
        let result: Result<HttpResponse> = async {
            let options = CreateCollectionOptions::default().with_router_name("plain")?;
            client.create_collection("foo", &options).await
        }
        .await;
        assert!(matches!(result, Err(SolrError::Configuration(_))));
        assert!(client.transport().sent().is_empty());
    }

    #[tokio::test]
    async fn bodies_are_forwarded_to_transport() {
        let client = client(200, "{}");
        let docs = vec![json!({"id": "123"}), json!({"id": "456"})];
        client
            .add_documents("foo", &docs, &AddDocumentsOptions::default())
            .await
            .unwrap();
        client
            .delete_documents("foo", &["123"], OutputOptions::default())
            .await
            .unwrap();

        let sent = client.transport().sent();
        assert_eq!(sent.len(), 2);
        assert_eq!(sent[0].body.as_deref(), Some(r#"[{"id":"123"},{"id":"456"}]"#));
        assert_eq!(sent[1].body.as_deref(), Some(r#"{"delete":["123"]}"#));
    }

    #[tokio::test]
    async fn concurrent_calls_are_independent() {
        let client = client(200, "{}");
        let out = OutputOptions::default();
        let everything = Query::all();
        let (a, b, c) = tokio::join!(
            client.core_status(Some("a"), out),
            client.schema("foo", out),
            client.query("foo", &everything),
        );
        assert!(a.is_ok() && b.is_ok() && c.is_ok());
        assert_eq!(client.transport().sent().len(), 3);
    }
}
