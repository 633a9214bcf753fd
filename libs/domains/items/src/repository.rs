use async_trait::async_trait;

use crate::context::RequestContext;
use crate::document::IndexStatus;
use crate::error::ItemResult;
use crate::models::{EsQuery, Item, PartialUpdateItem};

/// Repository trait for Item persistence
///
/// Maps items to stored documents and engine outcomes to [`ItemError`](crate::ItemError).
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait ItemRepository: Send + Sync {
    /// Insert a new item under its own id; an existing id is an error.
    async fn save(&self, ctx: &RequestContext, item: &Item) -> ItemResult<()>;

    async fn fetch_by_id(&self, ctx: &RequestContext, id: &str) -> ItemResult<Item>;

    /// All-or-nothing: one unreadable hit fails the whole search.
    async fn search(&self, ctx: &RequestContext, query: &EsQuery) -> ItemResult<Vec<Item>>;

    async fn remove(&self, ctx: &RequestContext, id: &str) -> ItemResult<()>;

    /// Overwrite every field of an existing item.
    async fn replace_whole(&self, ctx: &RequestContext, item: &Item) -> ItemResult<()>;

    /// Overwrite only the fields present in `patch`.
    async fn patch_fields(
        &self,
        ctx: &RequestContext,
        patch: &PartialUpdateItem,
        id: &str,
    ) -> ItemResult<()>;

    /// Create the backing collection if it does not exist yet.
    async fn ensure_index(&self, ctx: &RequestContext) -> ItemResult<IndexStatus>;
}
