//! Items Domain
//!
//! Catalog items stored as documents in Elasticsearch.
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────┐
//! │  Handlers   │  ← HTTP endpoints
//! └──────┬──────┘
//!        │
//! ┌──────▼──────┐
//! │   Service   │  ← Use-case sequencing (create, patch-then-refetch)
//! └──────┬──────┘
//!        │
//! ┌──────▼──────┐
//! │ Repository  │  ← Item <-> document mapping, domain error kinds
//! └──────┬──────┘
//!        │
//! ┌──────▼──────┐     ┌───────────────┐
//! │  Document   │ ◄── │ Query builder │
//! │   client    │     └───────────────┘
//! └─────────────┘  ← Elasticsearch REST API
//! ```
//!
//! # Usage
//!
//! ```rust,no_run
//! use axum_helpers::{OAuthClient, OAuthConfig};
//! use domain_items::{EsDocumentClient, EsItemRepository, ItemService, handlers};
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let conn = database::elasticsearch::connect("http://localhost:9200").await?;
//! let repository = EsItemRepository::new(EsDocumentClient::new(conn));
//! let service = ItemService::new(repository);
//!
//! let oauth = OAuthClient::new(&OAuthConfig::new("http://localhost:8080"))?;
//! let router = handlers::router(service, oauth);
//! # Ok(())
//! # }
//! ```

pub mod context;
pub mod document;
pub mod elasticsearch;
pub mod error;
pub mod handlers;
pub mod models;
pub mod query;
pub mod repository;
pub mod schema;
pub mod service;

// Re-export commonly used types
pub use context::{REQUEST_TIMEOUT_HEADER, RequestContext};
pub use document::{ClientError, DocumentClient, EsDocumentClient, IndexStatus};
pub use elasticsearch::EsItemRepository;
pub use error::{ItemError, ItemResult};
pub use handlers::ApiDoc;
pub use models::{EsQuery, Field, Item, PartialUpdateItem};
pub use repository::ItemRepository;
pub use schema::{ITEMS_INDEX, item_index_definition};
pub use service::ItemService;
