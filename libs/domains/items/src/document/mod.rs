//! Document store contract.
//!
//! The only layer that speaks the engine's protocol. Outcomes are reported
//! raw: "no such document" is a value (`None` / `false`), never an error,
//! and translation into domain errors happens in the repository.

pub mod elasticsearch;

use async_trait::async_trait;
use serde_json::{Map, Value};
use std::time::Duration;
use thiserror::Error;

use crate::context::RequestContext;
use crate::query::SearchRequest;

pub use elasticsearch::EsDocumentClient;

/// Structured document body exchanged with the engine.
pub type Document = Map<String, Value>;

/// A document read by id.
#[derive(Debug, Clone, PartialEq)]
pub struct FetchedDocument {
    /// Id as reported by the engine
    pub id: String,
    pub source: Document,
}

/// One search hit.
#[derive(Debug, Clone, PartialEq)]
pub struct SearchHit {
    pub id: String,
    pub source: Document,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IndexStatus {
    Created,
    AlreadyExists,
}

#[derive(Debug, Error)]
pub enum ClientError {
    /// The call's budget (class timeout capped by the request deadline) ran out
    #[error("{operation} timed out after {after:?}")]
    Timeout {
        operation: &'static str,
        after: Duration,
    },

    /// Create-only insert hit an existing id
    #[error("document {id} already exists")]
    Conflict { id: String },

    /// Engine answered with an error status
    #[error("engine answered {status} ({kind}): {reason}")]
    Status {
        status: u16,
        kind: String,
        reason: String,
    },

    #[error("transport error: {0}")]
    Transport(#[source] reqwest::Error),

    /// Response envelope did not have the expected shape
    #[error("malformed engine response: {0}")]
    Decode(String),

    #[error("failed to encode request body: {0}")]
    Encode(#[from] serde_json::Error),
}

impl ClientError {
    pub fn is_timeout(&self) -> bool {
        matches!(self, ClientError::Timeout { .. })
    }
}

/// Per-collection document operations.
///
/// Every call runs under the caller's [`RequestContext`] and its own
/// call-class timeout; calls are independent and never retried here.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait DocumentClient: Send + Sync {
    /// Insert a new document. Fails with [`ClientError::Conflict`] if `id`
    /// exists; never overwrites.
    async fn index(
        &self,
        ctx: &RequestContext,
        collection: &str,
        id: &str,
        document: Document,
    ) -> Result<(), ClientError>;

    /// `Ok(None)` is the canonical "no such id" outcome.
    async fn get(
        &self,
        ctx: &RequestContext,
        collection: &str,
        id: &str,
    ) -> Result<Option<FetchedDocument>, ClientError>;

    async fn search(
        &self,
        ctx: &RequestContext,
        collection: &str,
        request: &SearchRequest,
    ) -> Result<Vec<SearchHit>, ClientError>;

    /// `Ok(false)` when the id was absent.
    async fn delete(
        &self,
        ctx: &RequestContext,
        collection: &str,
        id: &str,
    ) -> Result<bool, ClientError>;

    /// Merge `partial` into the stored document. `Ok(false)` when the target
    /// is missing; nothing is created in that case.
    async fn update(
        &self,
        ctx: &RequestContext,
        collection: &str,
        id: &str,
        partial: Document,
    ) -> Result<bool, ClientError>;

    /// Create `collection` with `definition` (settings + mappings) unless it exists.
    async fn ensure_index(
        &self,
        ctx: &RequestContext,
        collection: &str,
        definition: &Value,
    ) -> Result<IndexStatus, ClientError>;
}
