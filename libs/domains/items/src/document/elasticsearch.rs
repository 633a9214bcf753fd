//! Elasticsearch REST implementation of [`DocumentClient`].

use async_trait::async_trait;
use database::elasticsearch::{EsConnection, Method, StatusCode};
use observability::{DocumentMetrics, Outcome};
use reqwest::{RequestBuilder, Response};
use serde::Deserialize;
use serde_json::{Value, json};
use std::future::Future;
use std::time::{Duration, Instant};
use tracing::{debug, instrument, warn};
use urlencoding::encode;

use super::{ClientError, Document, DocumentClient, FetchedDocument, IndexStatus, SearchHit};
use crate::context::RequestContext;
use crate::query::SearchRequest;

/// Document client over an [`EsConnection`].
///
/// Point operations (index, get, delete, update) run under the connection's
/// point timeout; search and index management under its search timeout.
/// Both are capped by the request deadline.
#[derive(Clone, Debug)]
pub struct EsDocumentClient {
    conn: EsConnection,
}

#[derive(Deserialize)]
struct GetEnvelope {
    #[serde(rename = "_id")]
    id: String,
    #[serde(default)]
    found: bool,
    #[serde(rename = "_source")]
    source: Option<Document>,
}

#[derive(Deserialize)]
struct SearchEnvelope {
    hits: HitsEnvelope,
}

#[derive(Deserialize)]
struct HitsEnvelope {
    hits: Vec<HitEnvelope>,
}

#[derive(Deserialize)]
struct HitEnvelope {
    #[serde(rename = "_id")]
    id: String,
    #[serde(rename = "_source", default)]
    source: Document,
}

/// Metric outcome of a successful call.
trait CallOutcome {
    fn outcome(&self) -> Outcome;
}

impl CallOutcome for () {
    fn outcome(&self) -> Outcome {
        Outcome::Ok
    }
}

impl CallOutcome for bool {
    fn outcome(&self) -> Outcome {
        if *self { Outcome::Ok } else { Outcome::NotFound }
    }
}

impl CallOutcome for Option<FetchedDocument> {
    fn outcome(&self) -> Outcome {
        if self.is_some() { Outcome::Ok } else { Outcome::NotFound }
    }
}

impl CallOutcome for Vec<SearchHit> {
    fn outcome(&self) -> Outcome {
        Outcome::Ok
    }
}

impl CallOutcome for IndexStatus {
    fn outcome(&self) -> Outcome {
        Outcome::Ok
    }
}

impl EsDocumentClient {
    pub fn new(conn: EsConnection) -> Self {
        Self { conn }
    }

    pub fn connection(&self) -> &EsConnection {
        &self.conn
    }

    /// Request for a write, with the configured refresh policy attached.
    fn write(&self, method: Method, path: &str) -> RequestBuilder {
        let builder = self.conn.request(method, path);
        match self.conn.refresh() {
            Some(policy) => builder.query(&[("refresh", policy.to_string())]),
            None => builder,
        }
    }

    /// Run one engine call under its budget and record the outcome.
    async fn run<T, F>(
        &self,
        ctx: &RequestContext,
        operation: &'static str,
        collection: &str,
        class_timeout: Duration,
        call: F,
    ) -> Result<T, ClientError>
    where
        T: CallOutcome,
        F: Future<Output = Result<T, ClientError>>,
    {
        let budget = ctx.bounded(class_timeout);
        let start = Instant::now();

        let result = if budget.is_zero() {
            Err(ClientError::Timeout {
                operation,
                after: Duration::ZERO,
            })
        } else {
            match tokio::time::timeout(budget, call).await {
                Ok(Err(ClientError::Transport(e))) if e.is_timeout() => Err(ClientError::Timeout {
                    operation,
                    after: budget,
                }),
                Ok(result) => result,
                Err(_) => Err(ClientError::Timeout {
                    operation,
                    after: budget,
                }),
            }
        };

        let outcome = match &result {
            Ok(value) => value.outcome(),
            Err(ClientError::Timeout { .. }) => Outcome::Timeout,
            Err(ClientError::Conflict { .. }) => Outcome::Conflict,
            Err(_) => Outcome::Error,
        };
        DocumentMetrics::record(operation, collection, outcome, start.elapsed());

        if let Err(e) = &result {
            warn!(operation, collection, error = %e, "Document operation failed");
        }
        result
    }
}

async fn send(builder: RequestBuilder) -> Result<Response, ClientError> {
    builder.send().await.map_err(ClientError::Transport)
}

/// Body of a non-success response. Text that is not JSON (a proxy error page)
/// is kept verbatim as a string so it still reads as a status error.
async fn error_body(response: Response) -> Result<Value, ClientError> {
    let bytes = response.bytes().await.map_err(ClientError::Transport)?;
    if bytes.is_empty() {
        return Ok(Value::Null);
    }
    Ok(serde_json::from_slice(&bytes)
        .unwrap_or_else(|_| Value::String(String::from_utf8_lossy(&bytes).into_owned())))
}

async fn decode<T: serde::de::DeserializeOwned>(response: Response) -> Result<T, ClientError> {
    let bytes = response.bytes().await.map_err(ClientError::Transport)?;
    serde_json::from_slice(&bytes).map_err(|e| ClientError::Decode(e.to_string()))
}

/// `error.type` of an engine error body, if any.
fn error_type(body: &Value) -> Option<&str> {
    body.get("error")?.get("type")?.as_str()
}

fn status_error(status: StatusCode, body: &Value) -> ClientError {
    let (kind, reason) = match body.get("error") {
        Some(Value::Object(err)) => (
            err.get("type").and_then(Value::as_str).unwrap_or("unknown"),
            err.get("reason")
                .and_then(Value::as_str)
                .map(str::to_string)
                .unwrap_or_default(),
        ),
        Some(Value::String(reason)) => ("unknown", reason.clone()),
        _ => match body {
            Value::String(raw) => ("unknown", raw.clone()),
            Value::Null => ("unknown", String::new()),
            other => ("unknown", other.to_string()),
        },
    };
    ClientError::Status {
        status: status.as_u16(),
        kind: kind.to_string(),
        reason,
    }
}

async fn unexpected(response: Response) -> ClientError {
    let status = response.status();
    match error_body(response).await {
        Ok(body) => status_error(status, &body),
        Err(e) => e,
    }
}

#[async_trait]
impl DocumentClient for EsDocumentClient {
    #[instrument(level = "debug", skip(self, ctx, document))]
    async fn index(
        &self,
        ctx: &RequestContext,
        collection: &str,
        id: &str,
        document: Document,
    ) -> Result<(), ClientError> {
        let path = format!("{}/_create/{}", collection, encode(id));
        let request = self.write(Method::PUT, &path).json(&document);

        self.run(ctx, "index", collection, self.conn.point_timeout(), async move {
            let response = send(request).await?;
            match response.status() {
                status if status.is_success() => Ok(()),
                StatusCode::CONFLICT => Err(ClientError::Conflict { id: id.to_string() }),
                _ => Err(unexpected(response).await),
            }
        })
        .await
    }

    #[instrument(level = "debug", skip(self, ctx))]
    async fn get(
        &self,
        ctx: &RequestContext,
        collection: &str,
        id: &str,
    ) -> Result<Option<FetchedDocument>, ClientError> {
        let path = format!("{}/_doc/{}", collection, encode(id));
        let request = self.conn.request(Method::GET, &path);

        self.run(ctx, "get", collection, self.conn.point_timeout(), async move {
            let response = send(request).await?;
            match response.status() {
                status if status.is_success() => {
                    let envelope: GetEnvelope = decode(response).await?;
                    if !envelope.found {
                        return Ok(None);
                    }
                    let source = envelope.source.ok_or_else(|| {
                        ClientError::Decode(format!("document {} has no _source", envelope.id))
                    })?;
                    Ok(Some(FetchedDocument {
                        id: envelope.id,
                        source,
                    }))
                }
                StatusCode::NOT_FOUND => {
                    let body = error_body(response).await?;
                    // A missing index also answers 404, with an error body instead of `found`.
                    if body.get("found") == Some(&Value::Bool(false)) {
                        debug!(id, "Document not found");
                        Ok(None)
                    } else {
                        Err(status_error(StatusCode::NOT_FOUND, &body))
                    }
                }
                _ => Err(unexpected(response).await),
            }
        })
        .await
    }

    #[instrument(level = "debug", skip(self, ctx, request))]
    async fn search(
        &self,
        ctx: &RequestContext,
        collection: &str,
        request: &SearchRequest,
    ) -> Result<Vec<SearchHit>, ClientError> {
        let path = format!("{}/_search", collection);
        let http_request = self.conn.request(Method::POST, &path).json(request);

        self.run(ctx, "search", collection, self.conn.search_timeout(), async move {
            let response = send(http_request).await?;
            if !response.status().is_success() {
                return Err(unexpected(response).await);
            }
            let envelope: SearchEnvelope = decode(response).await?;
            Ok(envelope
                .hits
                .hits
                .into_iter()
                .map(|hit| SearchHit {
                    id: hit.id,
                    source: hit.source,
                })
                .collect())
        })
        .await
    }

    #[instrument(level = "debug", skip(self, ctx))]
    async fn delete(
        &self,
        ctx: &RequestContext,
        collection: &str,
        id: &str,
    ) -> Result<bool, ClientError> {
        let path = format!("{}/_doc/{}", collection, encode(id));
        let request = self.write(Method::DELETE, &path);

        self.run(ctx, "delete", collection, self.conn.point_timeout(), async move {
            let response = send(request).await?;
            match response.status() {
                status if status.is_success() => Ok(true),
                StatusCode::NOT_FOUND => {
                    let body = error_body(response).await?;
                    if body.get("result").and_then(Value::as_str) == Some("not_found") {
                        Ok(false)
                    } else {
                        Err(status_error(StatusCode::NOT_FOUND, &body))
                    }
                }
                _ => Err(unexpected(response).await),
            }
        })
        .await
    }

    #[instrument(level = "debug", skip(self, ctx, partial))]
    async fn update(
        &self,
        ctx: &RequestContext,
        collection: &str,
        id: &str,
        partial: Document,
    ) -> Result<bool, ClientError> {
        let path = format!("{}/_update/{}", collection, encode(id));
        let request = self
            .write(Method::POST, &path)
            .json(&json!({ "doc": partial }));

        self.run(ctx, "update", collection, self.conn.point_timeout(), async move {
            let response = send(request).await?;
            match response.status() {
                status if status.is_success() => Ok(true),
                StatusCode::NOT_FOUND => {
                    let body = error_body(response).await?;
                    // Only the engine's own JSON 404 means the document is absent.
                    if body.is_object() && error_type(&body) != Some("index_not_found_exception") {
                        Ok(false)
                    } else {
                        Err(status_error(StatusCode::NOT_FOUND, &body))
                    }
                }
                _ => Err(unexpected(response).await),
            }
        })
        .await
    }

    #[instrument(level = "debug", skip(self, ctx, definition))]
    async fn ensure_index(
        &self,
        ctx: &RequestContext,
        collection: &str,
        definition: &Value,
    ) -> Result<IndexStatus, ClientError> {
        let exists = self.conn.request(Method::HEAD, collection);
        let create = self.conn.request(Method::PUT, collection).json(definition);

        self.run(ctx, "ensure_index", collection, self.conn.search_timeout(), async move {
            let response = send(exists).await?;
            match response.status() {
                status if status.is_success() => return Ok(IndexStatus::AlreadyExists),
                StatusCode::NOT_FOUND => {}
                status => return Err(status_error(status, &Value::Null)),
            }

            let response = send(create).await?;
            if response.status().is_success() {
                return Ok(IndexStatus::Created);
            }
            let status = response.status();
            let body = error_body(response).await?;
            // Another instance created it between HEAD and PUT.
            if error_type(&body) == Some("resource_already_exists_exception") {
                Ok(IndexStatus::AlreadyExists)
            } else {
                Err(status_error(status, &body))
            }
        })
        .await
    }
}
