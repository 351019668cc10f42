use std::sync::{
    atomic::{AtomicU64, Ordering},
    Arc,
};

use axum::{
    body::Bytes,
    extract::{Path, State},
    http::{header, HeaderMap, HeaderValue, Method, StatusCode},
    response::{IntoResponse, Response},
    routing::{any, get, post},
    Json, Router,
};
use serde::{Deserialize, Serialize};
use serde_json::json;
use tokio::net::TcpListener;

/// Id handed to the first item created on a fresh server.
pub const FIRST_ITEM_ID: u64 = 7;

#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
pub struct Item {
    pub id: u64,
    pub name: String,
    /// Value of the request's `X-Trace` header, if any.
    pub trace: Option<String>,
    /// Value of the request's `Content-Type` header, if any.
    pub content_type: Option<String>,
}

#[derive(Deserialize)]
pub struct CreateItem {
    pub name: String,
}

pub type Ids = Arc<AtomicU64>;

pub fn app() -> Router {
    let ids: Ids = Arc::new(AtomicU64::new(FIRST_ITEM_ID));
    Router::new()
        .route("/items", post(create_item))
        .route("/echo", any(echo))
        .route("/bytes/{n}", get(repeat_bytes))
        .route("/status/{code}", get(status))
        .with_state(ids)
}

pub async fn run(listener: TcpListener) -> Result<(), std::io::Error> {
    axum::serve(listener, app()).await
}

fn header_string(headers: &HeaderMap, name: &str) -> Option<String> {
    headers
        .get(name)
        .and_then(|v| v.to_str().ok())
        .map(str::to_string)
}

async fn create_item(
    State(ids): State<Ids>,
    headers: HeaderMap,
    Json(input): Json<CreateItem>,
) -> Json<Item> {
    let item = Item {
        id: ids.fetch_add(1, Ordering::SeqCst),
        name: input.name,
        trace: header_string(&headers, "x-trace"),
        content_type: header_string(&headers, header::CONTENT_TYPE.as_str()),
    };
    log::debug!("created item {}", item.id);
    Json(item)
}

/// Reflect the request body, method and content type back to the caller.
async fn echo(method: Method, headers: HeaderMap, body: Bytes) -> Response {
    let mut response = body.into_response();
    let out = response.headers_mut();
    if let Ok(value) = HeaderValue::from_str(method.as_str()) {
        out.insert("x-echo-method", value);
    }
    if let Some(value) = headers.get(header::CONTENT_TYPE) {
        out.insert("x-echo-content-type", value.clone());
    }
    response
}

async fn repeat_bytes(Path(n): Path<usize>) -> Vec<u8> {
    vec![b'a'; n]
}

async fn status(Path(code): Path<u16>) -> Result<(StatusCode, Json<serde_json::Value>), StatusCode> {
    let status = StatusCode::from_u16(code).map_err(|_| StatusCode::BAD_REQUEST)?;
    Ok((status, Json(json!({ "status": code }))))
}
