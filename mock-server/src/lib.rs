//! In-memory JSON API used by the client integration tests.
//!
//! Routes:
//! - `POST /echo` returns the JSON body unchanged and reflects the request's
//!   content type in `x-request-content-type`.
//! - `/items` and `/items/{id}` form a small camelCase CRUD resource.
//! - `/status/{code}` answers every method with the given status.
//! - `GET /slow` replies after [`SLOW_DELAY`].
//! - `GET /text` replies with a non-JSON body.

use std::{collections::HashMap, sync::Arc, time::Duration};

use axum::{
    extract::{Path, State},
    http::{header, HeaderMap, StatusCode},
    response::IntoResponse,
    routing::{any, get, post},
    Json, Router,
};
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use tokio::{net::TcpListener, sync::RwLock};
use uuid::Uuid;

pub const SLOW_DELAY: Duration = Duration::from_secs(10);
pub const ECHO_CONTENT_TYPE_HEADER: &str = "x-request-content-type";

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Item {
    pub id: Uuid,
    pub display_name: String,
    #[serde(default)]
    pub tags: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub note: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewItem {
    pub display_name: String,
    #[serde(default)]
    pub tags: Vec<String>,
    pub note: Option<String>,
}

pub type Db = Arc<RwLock<HashMap<Uuid, Item>>>;

pub fn app() -> Router {
    let db: Db = Arc::new(RwLock::new(HashMap::new()));
    Router::new()
        .route("/echo", post(echo))
        .route("/items", get(list_items).post(create_item))
        .route("/items/{id}", get(get_item).delete(delete_item))
        .route("/status/{code}", any(status))
        .route("/slow", get(slow))
        .route("/text", get(text))
        .with_state(db)
}

pub async fn run(listener: TcpListener) -> Result<(), std::io::Error> {
    axum::serve(listener, app()).await
}

async fn echo(headers: HeaderMap, Json(body): Json<Value>) -> impl IntoResponse {
    let content_type = headers
        .get(header::CONTENT_TYPE)
        .and_then(|v| v.to_str().ok())
        .unwrap_or_default()
        .to_string();
    ([(ECHO_CONTENT_TYPE_HEADER, content_type)], Json(body))
}

async fn list_items(State(db): State<Db>) -> Json<Vec<Item>> {
    let items = db.read().await;
    Json(items.values().cloned().collect())
}

async fn create_item(
    State(db): State<Db>,
    Json(input): Json<NewItem>,
) -> impl IntoResponse {
    let item = Item {
        id: Uuid::new_v4(),
        display_name: input.display_name,
        tags: input.tags,
        note: input.note,
    };
    tracing::debug!(id = %item.id, "item created");
    db.write().await.insert(item.id, item.clone());
    let location = format!("/items/{}", item.id);
    (StatusCode::CREATED, [(header::LOCATION, location)], Json(item))
}

async fn get_item(
    State(db): State<Db>,
    Path(id): Path<Uuid>,
) -> Result<Json<Item>, StatusCode> {
    let items = db.read().await;
    items.get(&id).cloned().map(Json).ok_or(StatusCode::NOT_FOUND)
}

async fn delete_item(
    State(db): State<Db>,
    Path(id): Path<Uuid>,
) -> Result<Json<Item>, StatusCode> {
    let mut items = db.write().await;
    items.remove(&id).map(Json).ok_or(StatusCode::NOT_FOUND)
}

async fn status(Path(code): Path<u16>) -> Result<impl IntoResponse, StatusCode> {
    let status = StatusCode::from_u16(code).map_err(|_| StatusCode::BAD_REQUEST)?;
    Ok((status, Json(json!({ "status": code }))))
}

async fn slow() -> Json<Value> {
    tokio::time::sleep(SLOW_DELAY).await;
    Json(json!({ "slow": true }))
}

async fn text() -> &'static str {
    "plain text"
}
