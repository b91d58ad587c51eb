use std::{collections::HashMap, sync::Arc, time::Duration};

use axum::{
    body::Bytes,
    extract::{Multipart, Path, Query, State},
    http::{header, HeaderMap, Method, StatusCode, Uri},
    response::IntoResponse,
    routing::{any, get, post},
    Json, Router,
};
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use tokio::{net::TcpListener, sync::RwLock};

pub const PAGE_SIZE: usize = 10;

#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
pub struct Item {
    pub id: u64,
    pub title: String,
}

#[derive(Deserialize)]
pub struct CreateItem {
    pub title: String,
}

#[derive(Deserialize)]
pub struct Page {
    #[serde(default = "first_page")]
    pub page: usize,
}

fn first_page() -> usize {
    1
}

#[derive(Deserialize)]
pub struct Delay {
    #[serde(default)]
    pub ms: u64,
}

/// Summary of one multipart field received by `/api/upload`.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
pub struct UploadedField {
    pub name: String,
    pub file_name: Option<String>,
    pub content_type: Option<String>,
    pub size: usize,
}

pub type Db = Arc<RwLock<Vec<Item>>>;

pub fn app() -> Router {
    let db: Db = Arc::new(RwLock::new(Vec::new()));
    Router::new()
        .route("/api/items", get(list_items).post(create_item))
        .route("/api/echo", any(echo))
        .route("/api/upload", post(upload))
        .route("/api/download/{name}", get(download))
        .route("/api/download-empty", get(download_empty))
        .route("/api/status/{code}", get(status))
        .route("/api/slow", get(slow))
        .with_state(db)
}

pub async fn run(listener: TcpListener) -> Result<(), std::io::Error> {
    axum::serve(listener, app()).await
}

async fn list_items(State(db): State<Db>, Query(page): Query<Page>) -> Json<Value> {
    let items = db.read().await;
    let start = page.page.saturating_sub(1) * PAGE_SIZE;
    let slice: Vec<Item> = items.iter().skip(start).take(PAGE_SIZE).cloned().collect();
    Json(json!({ "page": page.page, "total": items.len(), "items": slice }))
}

async fn create_item(
    State(db): State<Db>,
    Json(input): Json<CreateItem>,
) -> (StatusCode, Json<Item>) {
    let mut items = db.write().await;
    let item = Item {
        id: items.len() as u64 + 1,
        title: input.title,
    };
    items.push(item.clone());
    (StatusCode::CREATED, Json(item))
}

async fn echo(method: Method, uri: Uri, headers: HeaderMap, body: Bytes) -> Json<Value> {
    let mut header_map: HashMap<String, Vec<String>> = HashMap::new();
    for (name, value) in &headers {
        header_map
            .entry(name.as_str().to_string())
            .or_default()
            .push(String::from_utf8_lossy(value.as_bytes()).into_owned());
    }
    Json(json!({
        "method": method.as_str(),
        "query": uri.query(),
        "headers": header_map,
        "body": String::from_utf8_lossy(&body),
    }))
}

async fn upload(headers: HeaderMap, mut multipart: Multipart) -> Result<Json<Value>, StatusCode> {
    let mut fields = Vec::new();
    while let Some(field) = multipart.next_field().await.map_err(|_| StatusCode::BAD_REQUEST)? {
        let name = field.name().unwrap_or_default().to_string();
        let file_name = field.file_name().map(str::to_string);
        let content_type = field.content_type().map(str::to_string);
        let data = field.bytes().await.map_err(|_| StatusCode::BAD_REQUEST)?;
        fields.push(UploadedField {
            name,
            file_name,
            content_type,
            size: data.len(),
        });
    }
    let cookie = headers
        .get(header::COOKIE)
        .and_then(|v| v.to_str().ok())
        .map(str::to_string);
    Ok(Json(json!({ "fields": fields, "cookie": cookie })))
}

pub const DOWNLOAD_BODY: &str = "id,title\n1,alpha\n2,beta\n";

async fn download(Path(name): Path<String>) -> impl IntoResponse {
    (
        [
            (header::CONTENT_TYPE, "text/csv".to_string()),
            (header::CONTENT_DISPOSITION, format!("attachment; filename=\"{name}\"")),
        ],
        DOWNLOAD_BODY,
    )
}

async fn download_empty() -> impl IntoResponse {
    (
        [(header::CONTENT_DISPOSITION, "attachment; filename=\"empty.bin\"")],
        Bytes::new(),
    )
}

async fn status(Path(code): Path<u16>) -> Result<Json<Value>, StatusCode> {
    let status = StatusCode::from_u16(code).map_err(|_| StatusCode::BAD_REQUEST)?;
    if status.is_success() {
        return Ok(Json(json!({ "status": code })));
    }
    Err(status)
}

async fn slow(Query(delay): Query<Delay>) -> Json<Value> {
    tokio::time::sleep(Duration::from_millis(delay.ms)).await;
    Json(json!({ "slept": delay.ms }))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn item_serializes_to_json() {
        let item = Item {
            id: 1,
            title: "Test".to_string(),
        };
        let json = serde_json::to_value(&item).unwrap();
        assert_eq!(json["id"], 1);
        assert_eq!(json["title"], "Test");
    }

    #[test]
    fn page_defaults_to_first() {
        let page: Page = serde_json::from_str("{}").unwrap();
        assert_eq!(page.page, 1);
    }

    #[test]
    fn create_item_rejects_missing_title() {
        let result: Result<CreateItem, _> = serde_json::from_str(r#"{"name":"x"}"#);
        assert!(result.is_err());
    }
}
