//! In-memory stand-in for a Solr node, enough to drive the client end to end.
//!
//! State lives in one `SolrState` behind a `RwLock`. Every handler renders a
//! Solr envelope (`responseHeader`, plus `error` on failure) in JSON or, with
//! `wt=xml`, in Solr's XML writer layout.

use std::sync::Arc;

use axum::{
    body::Bytes,
    extract::{Path, Query, State},
    response::Response,
    routing::get,
    Router,
};
use tokio::{net::TcpListener, sync::RwLock};
use tracing::debug;

pub mod admin;
pub mod documents;
pub mod response;
pub mod schema;
pub mod state;

pub use response::{Failure, SolrParams};
pub use state::SolrState;

use response::render;

pub type Db = Arc<RwLock<SolrState>>;

pub fn app() -> Router {
    let db: Db = Arc::new(RwLock::new(SolrState::default()));
    Router::new()
        .route("/solr/admin/cores", get(cores).post(cores))
        .route("/solr/admin/collections", get(collections).post(collections))
        .route("/solr/admin/configs", get(configs).post(configs))
        .route("/solr/{name}/update", axum::routing::post(update))
        .route("/solr/{name}/query", get(query).post(query))
        .route("/solr/{name}/select", get(query))
        .route("/solr/{name}/schema", get(schema_root).post(schema_command))
        .route("/solr/{name}/schema/{*path}", get(schema_path))
        .with_state(db)
}

pub async fn run(listener: TcpListener) -> Result<(), std::io::Error> {
    axum::serve(listener, app()).await
}

async fn cores(State(db): State<Db>, Query(params): Query<SolrParams>) -> Response {
    let outcome = admin::cores(&mut *db.write().await, &params);
    render(&params, outcome)
}

async fn collections(State(db): State<Db>, Query(params): Query<SolrParams>) -> Response {
    let outcome = admin::collections(&mut *db.write().await, &params);
    render(&params, outcome)
}

async fn configs(State(db): State<Db>, Query(params): Query<SolrParams>) -> Response {
    let outcome = admin::configs(&mut *db.write().await, &params);
    render(&params, outcome)
}

async fn update(
    State(db): State<Db>,
    Path(name): Path<String>,
    Query(params): Query<SolrParams>,
    body: Bytes,
) -> Response {
    debug!(%name, bytes = body.len(), "update");
    let outcome = documents::update(&mut *db.write().await, &name, &body);
    render(&params, outcome)
}

async fn query(
    State(db): State<Db>,
    Path(name): Path<String>,
    Query(params): Query<SolrParams>,
) -> Response {
    debug!(%name, q = params.get("q").unwrap_or("*:*"), "query");
    let outcome = documents::query(&*db.read().await, &name, &params);
    render(&params, outcome)
}

async fn schema_root(
    State(db): State<Db>,
    Path(name): Path<String>,
    Query(params): Query<SolrParams>,
) -> Response {
    let outcome = schema::read(&*db.read().await, &name, "");
    render(&params, outcome)
}

async fn schema_path(
    State(db): State<Db>,
    Path((name, path)): Path<(String, String)>,
    Query(params): Query<SolrParams>,
) -> Response {
    let outcome = schema::read(&*db.read().await, &name, &path);
    render(&params, outcome)
}

async fn schema_command(
    State(db): State<Db>,
    Path(name): Path<String>,
    Query(params): Query<SolrParams>,
    body: Bytes,
) -> Response {
    debug!(%name, "schema command");
    let outcome = schema::command(&mut *db.write().await, &name, &body);
    render(&params, outcome)
}
