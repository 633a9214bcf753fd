use axum::{
    Json, Router,
    extract::State,
    http::StatusCode,
    middleware,
    response::IntoResponse,
    routing::{get, post},
};
use axum_helpers::{
    CallerIdentity, IdPath, OAuthClient, ValidatedJson,
    errors::responses::{
        BadRequestIdResponse, BadRequestValidationResponse, InternalServerErrorResponse,
        NotFoundResponse, RequestTimeoutResponse, ServiceUnavailableResponse,
        UnauthorizedResponse,
    },
    oauth_middleware,
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use utoipa::{OpenApi, ToSchema};

use crate::context::RequestContext;
use crate::error::ItemResult;
use crate::models::{
    Description, EsQuery, Item, PartialDescription, PartialPicture, PartialUpdateItem, Picture,
};
use crate::repository::ItemRepository;
use crate::service::ItemService;

/// Body returned by a successful delete.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct DeleteResponse {
    #[schema(example = "deleted")]
    pub status: String,
}

/// OpenAPI documentation for Items API
#[derive(OpenApi)]
#[openapi(
    paths(
        create_item,
        get_item,
        search_items,
        delete_item,
        replace_item,
        patch_item,
    ),
    components(
        schemas(
            Item,
            Description,
            Picture,
            PartialUpdateItem,
            PartialDescription,
            PartialPicture,
            EsQuery,
            DeleteResponse
        ),
        responses(
            NotFoundResponse,
            BadRequestValidationResponse,
            BadRequestIdResponse,
            UnauthorizedResponse,
            RequestTimeoutResponse,
            ServiceUnavailableResponse,
            InternalServerErrorResponse
        )
    ),
    tags(
        (name = "Items", description = "Catalog items stored in Elasticsearch")
    )
)]
pub struct ApiDoc;

/// Create the items router with all HTTP endpoints.
///
/// Only create resolves the caller, so reads and writes by id keep working
/// while the identity provider is down.
pub fn router<R: ItemRepository + 'static>(service: ItemService<R>, oauth: OAuthClient) -> Router {
    let shared_service = Arc::new(service);

    Router::new()
        .route(
            "/",
            post(create_item)
                .route_layer(middleware::from_fn_with_state(oauth, oauth_middleware)),
        )
        .route("/search", post(search_items))
        .route(
            "/{id}",
            get(get_item)
                .put(replace_item)
                .patch(patch_item)
                .delete(delete_item),
        )
        .with_state(shared_service)
}

/// Create a new item owned by the calling client
#[utoipa::path(
    post,
    path = "",
    tag = "Items",
    request_body = Item,
    params(
        ("access_token" = Option<String>, Query, description = "OAuth access token"),
        ("x-request-timeout-ms" = Option<u64>, Header, description = "Request deadline in milliseconds")
    ),
    responses(
        (status = 201, description = "Item created", body = Item),
        (status = 400, response = BadRequestValidationResponse),
        (status = 401, response = UnauthorizedResponse),
        (status = 408, response = RequestTimeoutResponse),
        (status = 500, response = InternalServerErrorResponse),
        (status = 503, response = ServiceUnavailableResponse)
    )
)]
async fn create_item<R: ItemRepository>(
    State(service): State<Arc<ItemService<R>>>,
    caller: CallerIdentity,
    ctx: RequestContext,
    ValidatedJson(input): ValidatedJson<Item>,
) -> ItemResult<impl IntoResponse> {
    let item = service.create_item(&ctx, caller.client_id, input).await?;
    Ok((StatusCode::CREATED, Json(item)))
}

/// Get an item by ID
#[utoipa::path(
    get,
    path = "/{id}",
    tag = "Items",
    params(
        ("id" = String, Path, description = "Item ID")
    ),
    responses(
        (status = 200, description = "Item found", body = Item),
        (status = 400, response = BadRequestIdResponse),
        (status = 404, response = NotFoundResponse),
        (status = 408, response = RequestTimeoutResponse),
        (status = 500, response = InternalServerErrorResponse)
    )
)]
async fn get_item<R: ItemRepository>(
    State(service): State<Arc<ItemService<R>>>,
    ctx: RequestContext,
    IdPath(id): IdPath,
) -> ItemResult<Json<Item>> {
    let item = service.get_item(&ctx, &id).await?;
    Ok(Json(item))
}

/// Search items
#[utoipa::path(
    post,
    path = "/search",
    tag = "Items",
    request_body = EsQuery,
    responses(
        (status = 200, description = "Matching items", body = Vec<Item>),
        (status = 400, response = BadRequestValidationResponse),
        (status = 408, response = RequestTimeoutResponse),
        (status = 500, response = InternalServerErrorResponse)
    )
)]
async fn search_items<R: ItemRepository>(
    State(service): State<Arc<ItemService<R>>>,
    ctx: RequestContext,
    ValidatedJson(query): ValidatedJson<EsQuery>,
) -> ItemResult<Json<Vec<Item>>> {
    let items = service.search_items(&ctx, &query).await?;
    Ok(Json(items))
}

/// Delete an item
#[utoipa::path(
    delete,
    path = "/{id}",
    tag = "Items",
    params(
        ("id" = String, Path, description = "Item ID")
    ),
    responses(
        (status = 200, description = "Item deleted", body = DeleteResponse),
        (status = 400, response = BadRequestIdResponse),
        (status = 404, response = NotFoundResponse),
        (status = 408, response = RequestTimeoutResponse),
        (status = 500, response = InternalServerErrorResponse)
    )
)]
async fn delete_item<R: ItemRepository>(
    State(service): State<Arc<ItemService<R>>>,
    ctx: RequestContext,
    IdPath(id): IdPath,
) -> ItemResult<Json<DeleteResponse>> {
    service.delete_item(&ctx, &id).await?;
    Ok(Json(DeleteResponse {
        status: "deleted".to_string(),
    }))
}

/// Replace every field of an item
#[utoipa::path(
    put,
    path = "/{id}",
    tag = "Items",
    params(
        ("id" = String, Path, description = "Item ID; overrides any id in the body")
    ),
    request_body = Item,
    responses(
        (status = 200, description = "Item replaced", body = Item),
        (status = 400, response = BadRequestValidationResponse),
        (status = 404, response = NotFoundResponse),
        (status = 408, response = RequestTimeoutResponse),
        (status = 500, response = InternalServerErrorResponse)
    )
)]
async fn replace_item<R: ItemRepository>(
    State(service): State<Arc<ItemService<R>>>,
    ctx: RequestContext,
    IdPath(id): IdPath,
    ValidatedJson(input): ValidatedJson<Item>,
) -> ItemResult<Json<Item>> {
    let item = service.replace_item(&ctx, &id, input).await?;
    Ok(Json(item))
}

/// Update only the supplied fields of an item
#[utoipa::path(
    patch,
    path = "/{id}",
    tag = "Items",
    params(
        ("id" = String, Path, description = "Item ID")
    ),
    request_body = PartialUpdateItem,
    responses(
        (status = 200, description = "Current item after the update", body = Item),
        (status = 400, response = BadRequestValidationResponse),
        (status = 404, response = NotFoundResponse),
        (status = 408, response = RequestTimeoutResponse),
        (status = 500, response = InternalServerErrorResponse)
    )
)]
async fn patch_item<R: ItemRepository>(
    State(service): State<Arc<ItemService<R>>>,
    ctx: RequestContext,
    IdPath(id): IdPath,
    ValidatedJson(patch): ValidatedJson<PartialUpdateItem>,
) -> ItemResult<Json<Item>> {
    let item = service.patch_item(&ctx, &id, &patch).await?;
    Ok(Json(item))
}
