//! In-process stand-ins for the search engine and the OAuth provider.
#![allow(dead_code)]

use axum::{
    Json, Router,
    extract::{Path, Request, State},
    http::StatusCode,
    middleware::{self, Next},
    response::{IntoResponse, Response},
    routing::{get, post, put},
};
use database::elasticsearch::{EsConfig, EsConnection};
use domain_items::models::{Description, Picture};
use domain_items::{EsDocumentClient, EsItemRepository, Item};
use serde_json::{Map, Value, json};
use std::collections::{BTreeMap, HashMap};
use std::sync::{Arc, Mutex};
use std::time::Duration;

type Indices = HashMap<String, BTreeMap<String, Value>>;

#[derive(Default)]
struct EngineState {
    indices: Mutex<Indices>,
    delay: Mutex<Duration>,
    gateway_down: Mutex<bool>,
    log: Mutex<Vec<String>>,
}

/// Minimal single-node engine speaking the REST subset the item client uses.
pub struct FakeEngine {
    pub url: String,
    state: Arc<EngineState>,
}

impl FakeEngine {
    pub async fn start() -> Self {
        let state = Arc::new(EngineState::default());

        let app = Router::new()
            .route("/", get(cluster_info))
            .route("/_cluster/health", get(cluster_health))
            .route("/{index}", put(create_index).head(index_exists))
            .route("/{index}/_create/{id}", put(create_doc))
            .route("/{index}/_doc/{id}", get(get_doc).delete(delete_doc))
            .route("/{index}/_update/{id}", post(update_doc))
            .route("/{index}/_search", post(search))
            .layer(middleware::from_fn_with_state(state.clone(), delay_and_log))
            .with_state(state.clone());

        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move { axum::serve(listener, app).await.unwrap() });

        Self {
            url: format!("http://{}", addr),
            state,
        }
    }

    /// Hold every response for `delay`.
    pub fn set_delay(&self, delay: Duration) {
        *self.state.delay.lock().unwrap() = delay;
    }

    /// Answer every request like a proxy whose upstream is gone: 502 with an HTML body.
    pub fn set_gateway_down(&self, down: bool) {
        *self.state.gateway_down.lock().unwrap() = down;
    }

    pub fn create_index(&self, index: &str) {
        self.state
            .indices
            .lock()
            .unwrap()
            .entry(index.to_string())
            .or_default();
    }

    pub fn has_index(&self, index: &str) -> bool {
        self.state.indices.lock().unwrap().contains_key(index)
    }

    /// Stored body of `id`, bypassing the HTTP surface.
    pub fn stored(&self, index: &str, id: &str) -> Option<Value> {
        self.state
            .indices
            .lock()
            .unwrap()
            .get(index)
            .and_then(|docs| docs.get(id).cloned())
    }

    pub fn put_raw(&self, index: &str, id: &str, source: Value) {
        self.state
            .indices
            .lock()
            .unwrap()
            .entry(index.to_string())
            .or_default()
            .insert(id.to_string(), source);
    }

    /// `METHOD path?query` of every request served so far.
    pub fn requests(&self) -> Vec<String> {
        self.state.log.lock().unwrap().clone()
    }

    pub fn connection(&self, point: Duration, search: Duration) -> EsConnection {
        let config = EsConfig::new([self.url.as_str()]).with_timeouts(point, search);
        EsConnection::new(&config).unwrap()
    }

    pub fn client(&self) -> EsDocumentClient {
        EsDocumentClient::new(self.connection(Duration::from_secs(2), Duration::from_secs(5)))
    }

    pub fn repository(&self) -> EsItemRepository {
        EsItemRepository::new(self.client())
    }
}

async fn delay_and_log(
    State(state): State<Arc<EngineState>>,
    request: Request,
    next: Next,
) -> Response {
    let line = match request.uri().query() {
        Some(q) => format!("{} {}?{}", request.method(), request.uri().path(), q),
        None => format!("{} {}", request.method(), request.uri().path()),
    };
    state.log.lock().unwrap().push(line);

    let delay = *state.delay.lock().unwrap();
    if !delay.is_zero() {
        tokio::time::sleep(delay).await;
    }
    if *state.gateway_down.lock().unwrap() {
        return (
            StatusCode::BAD_GATEWAY,
            [(axum::http::header::CONTENT_TYPE, "text/html")],
            "<html><body>502 Bad Gateway</body></html>",
        )
            .into_response();
    }
    next.run(request).await
}

fn engine_error(status: StatusCode, kind: &str, reason: String) -> Response {
    (
        status,
        Json(json!({
            "error": {"type": kind, "reason": reason},
            "status": status.as_u16()
        })),
    )
        .into_response()
}

fn index_not_found(index: &str) -> Response {
    engine_error(
        StatusCode::NOT_FOUND,
        "index_not_found_exception",
        format!("no such index [{}]", index),
    )
}

async fn cluster_info() -> Json<Value> {
    Json(json!({
        "name": "fake-node",
        "cluster_name": "fake-cluster",
        "version": {"number": "8.13.0"}
    }))
}

async fn cluster_health() -> Json<Value> {
    Json(json!({"cluster_name": "fake-cluster", "status": "green"}))
}

async fn index_exists(State(state): State<Arc<EngineState>>, Path(index): Path<String>) -> StatusCode {
    if state.indices.lock().unwrap().contains_key(&index) {
        StatusCode::OK
    } else {
        StatusCode::NOT_FOUND
    }
}

async fn create_index(
    State(state): State<Arc<EngineState>>,
    Path(index): Path<String>,
    Json(_definition): Json<Value>,
) -> Response {
    let mut indices = state.indices.lock().unwrap();
    if indices.contains_key(&index) {
        return engine_error(
            StatusCode::BAD_REQUEST,
            "resource_already_exists_exception",
            format!("index [{}] already exists", index),
        );
    }
    indices.insert(index.clone(), BTreeMap::new());
    Json(json!({"acknowledged": true, "index": index})).into_response()
}

async fn create_doc(
    State(state): State<Arc<EngineState>>,
    Path((index, id)): Path<(String, String)>,
    Json(source): Json<Value>,
) -> Response {
    let mut indices = state.indices.lock().unwrap();
    let docs = indices.entry(index.clone()).or_default();
    if docs.contains_key(&id) {
        return engine_error(
            StatusCode::CONFLICT,
            "version_conflict_engine_exception",
            format!("[{}]: version conflict, document already exists", id),
        );
    }
    docs.insert(id.clone(), source);
    (
        StatusCode::CREATED,
        Json(json!({"_index": index, "_id": id, "result": "created"})),
    )
        .into_response()
}

async fn get_doc(
    State(state): State<Arc<EngineState>>,
    Path((index, id)): Path<(String, String)>,
) -> Response {
    let indices = state.indices.lock().unwrap();
    let Some(docs) = indices.get(&index) else {
        return index_not_found(&index);
    };
    match docs.get(&id) {
        Some(source) => Json(json!({
            "_index": index, "_id": id, "found": true, "_source": source
        }))
        .into_response(),
        None => (
            StatusCode::NOT_FOUND,
            Json(json!({"_index": index, "_id": id, "found": false})),
        )
            .into_response(),
    }
}

async fn delete_doc(
    State(state): State<Arc<EngineState>>,
    Path((index, id)): Path<(String, String)>,
) -> Response {
    let mut indices = state.indices.lock().unwrap();
    let Some(docs) = indices.get_mut(&index) else {
        return index_not_found(&index);
    };
    match docs.remove(&id) {
        Some(_) => Json(json!({"_id": id, "result": "deleted"})).into_response(),
        None => (
            StatusCode::NOT_FOUND,
            Json(json!({"_id": id, "result": "not_found"})),
        )
            .into_response(),
    }
}

async fn update_doc(
    State(state): State<Arc<EngineState>>,
    Path((index, id)): Path<(String, String)>,
    Json(body): Json<Value>,
) -> Response {
    let mut indices = state.indices.lock().unwrap();
    let Some(docs) = indices.get_mut(&index) else {
        return index_not_found(&index);
    };
    let Some(stored) = docs.get_mut(&id) else {
        return engine_error(
            StatusCode::NOT_FOUND,
            "document_missing_exception",
            format!("[{}]: document missing", id),
        );
    };
    merge(stored, body.get("doc").cloned().unwrap_or(Value::Null));
    Json(json!({"_id": id, "result": "updated"})).into_response()
}

async fn search(
    State(state): State<Arc<EngineState>>,
    Path(index): Path<String>,
    Json(body): Json<Value>,
) -> Response {
    let indices = state.indices.lock().unwrap();
    let Some(docs) = indices.get(&index) else {
        return index_not_found(&index);
    };
    let query = body.get("query").cloned().unwrap_or_else(|| json!({"bool": {}}));
    let from = body.get("from").and_then(Value::as_u64).unwrap_or(0) as usize;
    let size = body.get("size").and_then(Value::as_u64).unwrap_or(10) as usize;

    let hits: Vec<Value> = docs
        .iter()
        .filter(|(_, source)| matches(&query, source))
        .skip(from)
        .take(size)
        .map(|(id, source)| json!({"_index": index, "_id": id, "_source": source}))
        .collect();

    Json(json!({"hits": {"total": {"value": hits.len()}, "hits": hits}})).into_response()
}

/// Recursive object merge; arrays and scalars are replaced.
fn merge(target: &mut Value, patch: Value) {
    match (target, patch) {
        (Value::Object(target), Value::Object(patch)) => {
            for (key, value) in patch {
                merge(target.entry(key).or_insert(Value::Null), value);
            }
        }
        (target, patch) => *target = patch,
    }
}

fn lookup<'a>(source: &'a Value, dotted: &str) -> Option<&'a Value> {
    dotted.split('.').try_fold(source, |value, key| value.get(key))
}

fn single_entry(clause: &Value) -> Option<(&String, &Value)> {
    clause.as_object().and_then(|m| m.iter().next())
}

fn matches(query: &Value, source: &Value) -> bool {
    let Some((kind, body)) = single_entry(query) else {
        return true;
    };
    match kind.as_str() {
        "bool" => ["must", "filter"].iter().all(|key| {
            body.get(*key)
                .and_then(Value::as_array)
                .is_none_or(|clauses| clauses.iter().all(|c| matches(c, source)))
        }),
        "multi_match" => {
            let text = body["query"].as_str().unwrap_or_default().to_lowercase();
            let fields = body["fields"].as_array().cloned().unwrap_or_default();
            text.split_whitespace().any(|word| {
                fields.iter().filter_map(Value::as_str).any(|field| {
                    lookup(source, field)
                        .and_then(Value::as_str)
                        .is_some_and(|v| v.to_lowercase().contains(word))
                })
            })
        }
        "range" => {
            let Some((field, bounds)) = single_entry(body) else {
                return true;
            };
            let Some(value) = lookup(source, field).and_then(Value::as_f64) else {
                return false;
            };
            bounds.get("gte").and_then(Value::as_f64).is_none_or(|b| value >= b)
                && bounds.get("lte").and_then(Value::as_f64).is_none_or(|b| value <= b)
        }
        "term" => {
            let Some((field, expected)) = single_entry(body) else {
                return true;
            };
            match (lookup(source, field), expected) {
                (Some(Value::Number(a)), Value::Number(b)) => a.as_f64() == b.as_f64(),
                (Some(actual), expected) => actual == expected,
                (None, _) => false,
            }
        }
        _ => true,
    }
}

/// Token provider answering `GET /oauth/access_token/{token}`.
///
/// `good-token` belongs to client 99; every other token is unknown.
pub async fn spawn_oauth_provider() -> String {
    let app = Router::new().route(
        "/oauth/access_token/{token}",
        get(|Path(token): Path<String>| async move {
            if token == "good-token" {
                Json(json!({
                    "access_token": token,
                    "user_id": 1,
                    "client_id": 99,
                    "expires": 4102444800i64
                }))
                .into_response()
            } else {
                StatusCode::NOT_FOUND.into_response()
            }
        }),
    );

    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move { axum::serve(listener, app).await.unwrap() });
    format!("http://{}", addr)
}

pub fn sample_item(id: &str) -> Item {
    Item {
        id: id.to_string(),
        seller: 7,
        title: "Go in Action".to_string(),
        description: Description {
            plain_text: "Concurrency in practice".to_string(),
            html: "<p>Concurrency in practice</p>".to_string(),
        },
        pictures: vec![Picture {
            id: 1,
            url: "https://img.example/1.png".to_string(),
        }],
        video: None,
        price: 19.99,
        available_quantity: 3,
        sold_quantity: 0,
        status: "active".to_string(),
        date_created: None,
    }
}

pub fn object(value: Value) -> Map<String, Value> {
    match value {
        Value::Object(map) => map,
        other => panic!("expected object, got {}", other),
    }
}
