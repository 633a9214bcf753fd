//! Item Service - use-case orchestration over the repository

use chrono::Utc;
use std::sync::Arc;
use tracing::{info, instrument};
use uuid::Uuid;

use crate::context::RequestContext;
use crate::document::IndexStatus;
use crate::error::ItemResult;
use crate::models::{EsQuery, Item, PartialUpdateItem};
use crate::repository::ItemRepository;

/// Item service: one repository call per use case, except patch which
/// re-reads the item after writing.
pub struct ItemService<R: ItemRepository> {
    repository: Arc<R>,
}

impl<R: ItemRepository> ItemService<R> {
    /// Create a new ItemService with the given repository
    pub fn new(repository: R) -> Self {
        Self {
            repository: Arc::new(repository),
        }
    }

    /// Create an item owned by `seller`.
    ///
    /// Any seller in `item` is replaced. A blank id gets a fresh UUIDv7 and a
    /// missing `date_created` is stamped with the current time. Returns the
    /// item as written.
    #[instrument(skip(self, ctx, item))]
    pub async fn create_item(
        &self,
        ctx: &RequestContext,
        seller: i64,
        mut item: Item,
    ) -> ItemResult<Item> {
        item.seller = seller;
        item.id = item.id.trim().to_string();
        if item.id.is_empty() {
            item.id = Uuid::now_v7().to_string();
        }
        if item.date_created.is_none() {
            item.date_created = Some(Utc::now());
        }

        self.repository.save(ctx, &item).await?;
        info!(item_id = %item.id, "Item created");
        Ok(item)
    }

    #[instrument(skip(self, ctx))]
    pub async fn get_item(&self, ctx: &RequestContext, id: &str) -> ItemResult<Item> {
        self.repository.fetch_by_id(ctx, id).await
    }

    #[instrument(skip(self, ctx))]
    pub async fn search_items(
        &self,
        ctx: &RequestContext,
        query: &EsQuery,
    ) -> ItemResult<Vec<Item>> {
        self.repository.search(ctx, query).await
    }

    #[instrument(skip(self, ctx))]
    pub async fn delete_item(&self, ctx: &RequestContext, id: &str) -> ItemResult<()> {
        self.repository.remove(ctx, id).await
    }

    /// Overwrite the item stored under `id`; `id` wins over any id in the body.
    #[instrument(skip(self, ctx, item))]
    pub async fn replace_item(
        &self,
        ctx: &RequestContext,
        id: &str,
        mut item: Item,
    ) -> ItemResult<Item> {
        item.id = id.to_string();
        self.repository.replace_whole(ctx, &item).await?;
        Ok(item)
    }

    /// Apply `patch` and return the full current item.
    #[instrument(skip(self, ctx, patch))]
    pub async fn patch_item(
        &self,
        ctx: &RequestContext,
        id: &str,
        patch: &PartialUpdateItem,
    ) -> ItemResult<Item> {
        self.repository.patch_fields(ctx, patch, id).await?;
        self.repository.fetch_by_id(ctx, id).await
    }

    /// Create the items index when absent.
    #[instrument(skip(self, ctx))]
    pub async fn ensure_index(&self, ctx: &RequestContext) -> ItemResult<IndexStatus> {
        self.repository.ensure_index(ctx).await
    }
}

impl<R: ItemRepository> Clone for ItemService<R> {
    fn clone(&self) -> Self {
        Self {
            repository: Arc::clone(&self.repository),
        }
    }
}
