//! Document-store implementation of ItemRepository

use async_trait::async_trait;
use tracing::{debug, instrument};

use crate::context::RequestContext;
use crate::document::{DocumentClient, EsDocumentClient, IndexStatus};
use crate::error::{ItemError, ItemResult};
use crate::models::{EsQuery, Item, PartialUpdateItem};
use crate::query::SearchRequest;
use crate::repository::ItemRepository;
use crate::schema::{ITEMS_INDEX, item_index_definition};

/// ItemRepository over any [`DocumentClient`], Elasticsearch by default.
pub struct EsItemRepository<C: DocumentClient = EsDocumentClient> {
    client: C,
    collection: String,
}

impl<C: DocumentClient> EsItemRepository<C> {
    /// Repository over the [`ITEMS_INDEX`] collection.
    ///
    /// # Example
    /// ```ignore
    /// let conn = database::elasticsearch::connect("http://localhost:9200").await?;
    /// let repo = EsItemRepository::new(EsDocumentClient::new(conn));
    /// ```
    pub fn new(client: C) -> Self {
        Self::with_collection(client, ITEMS_INDEX)
    }

    pub fn with_collection(client: C, collection: &str) -> Self {
        Self {
            client,
            collection: collection.to_string(),
        }
    }

    pub fn client(&self) -> &C {
        &self.client
    }

    pub fn collection(&self) -> &str {
        &self.collection
    }
}

fn encode_failure(operation: &'static str, err: serde_json::Error) -> ItemError {
    ItemError::from_client(operation, err.into())
}

#[async_trait]
impl<C: DocumentClient> ItemRepository for EsItemRepository<C> {
    #[instrument(skip(self, ctx, item), fields(item_id = %item.id))]
    async fn save(&self, ctx: &RequestContext, item: &Item) -> ItemResult<()> {
        let document = item.to_document().map_err(|e| encode_failure("save", e))?;
        self.client
            .index(ctx, &self.collection, &item.id, document)
            .await
            .map_err(|e| ItemError::from_client("save", e))
    }

    #[instrument(skip(self, ctx))]
    async fn fetch_by_id(&self, ctx: &RequestContext, id: &str) -> ItemResult<Item> {
        let fetched = self
            .client
            .get(ctx, &self.collection, id)
            .await
            .map_err(|e| ItemError::from_client("fetch", e))?
            .ok_or_else(|| ItemError::NotFound(id.to_string()))?;

        Item::from_document(&fetched.id, fetched.source)
            .map_err(|e| ItemError::Parse(format!("document {}: {}", fetched.id, e)))
    }

    #[instrument(skip(self, ctx))]
    async fn search(&self, ctx: &RequestContext, query: &EsQuery) -> ItemResult<Vec<Item>> {
        let request = SearchRequest::from(query);
        let hits = self
            .client
            .search(ctx, &self.collection, &request)
            .await
            .map_err(|e| ItemError::from_client("search", e))?;

        debug!(hits = hits.len(), "Search returned");
        hits.into_iter()
            .map(|hit| {
                Item::from_document(&hit.id, hit.source)
                    .map_err(|e| ItemError::Parse(format!("hit {}: {}", hit.id, e)))
            })
            .collect()
    }

    #[instrument(skip(self, ctx))]
    async fn remove(&self, ctx: &RequestContext, id: &str) -> ItemResult<()> {
        let existed = self
            .client
            .delete(ctx, &self.collection, id)
            .await
            .map_err(|e| ItemError::from_client("remove", e))?;

        if existed {
            Ok(())
        } else {
            Err(ItemError::NotFound(id.to_string()))
        }
    }

    #[instrument(skip(self, ctx, item), fields(item_id = %item.id))]
    async fn replace_whole(&self, ctx: &RequestContext, item: &Item) -> ItemResult<()> {
        let document = item
            .to_document()
            .map_err(|e| encode_failure("replace", e))?;
        let existed = self
            .client
            .update(ctx, &self.collection, &item.id, document)
            .await
            .map_err(|e| ItemError::from_client("replace", e))?;

        if existed {
            Ok(())
        } else {
            Err(ItemError::NotFound(item.id.clone()))
        }
    }

    #[instrument(skip(self, ctx, patch))]
    async fn patch_fields(
        &self,
        ctx: &RequestContext,
        patch: &PartialUpdateItem,
        id: &str,
    ) -> ItemResult<()> {
        let document = patch.to_document().map_err(|e| encode_failure("patch", e))?;
        let existed = self
            .client
            .update(ctx, &self.collection, id, document)
            .await
            .map_err(|e| ItemError::from_client("patch", e))?;

        if existed {
            Ok(())
        } else {
            Err(ItemError::NotFound(id.to_string()))
        }
    }

    #[instrument(skip(self, ctx))]
    async fn ensure_index(&self, ctx: &RequestContext) -> ItemResult<IndexStatus> {
        self.client
            .ensure_index(ctx, &self.collection, &item_index_definition())
            .await
            .map_err(|e| ItemError::from_client("ensure_index", e))
    }
}
