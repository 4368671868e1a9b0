//! Marketplace handlers.
//!
//! ```text
//! POST   /api/v1/marketplace
//! GET    /api/v1/marketplace
//! GET    /api/v1/marketplace/my-listings
//! GET    /api/v1/marketplace/{id}
//! PUT    /api/v1/marketplace/{id}
//! DELETE /api/v1/marketplace/{id}
//! ```

use actix_web::{HttpResponse, delete, get, post, put, web};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::domain::{
    Error, ItemStatus, ItemWithSeller, ListingPatch, MarketplaceItem, NewListing,
};
use crate::inbound::http::ApiResult;
use crate::inbound::http::bookings::OwnerDto;
use crate::inbound::http::session::SessionContext;
use crate::inbound::http::state::HttpState;
use crate::inbound::http::validation::{parse_status, require_field};

/// Listing creation request body.
#[derive(Debug, Deserialize, Serialize, utoipa::ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CreateListingDto {
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub price: Option<i64>,
    #[serde(default)]
    pub category: Option<String>,
    #[serde(default)]
    pub condition: Option<String>,
    #[serde(default)]
    pub image_url: Option<String>,
}

/// Listing update request body; absent fields stay unchanged.
#[derive(Debug, Deserialize, Serialize, utoipa::ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UpdateListingDto {
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub price: Option<i64>,
    #[serde(default)]
    pub category: Option<String>,
    #[serde(default)]
    pub condition: Option<String>,
    #[serde(default)]
    pub image_url: Option<String>,
    #[serde(default)]
    pub status: Option<String>,
}

/// Listing representation returned to clients.
#[derive(Debug, Serialize, Deserialize, utoipa::ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ListingDto {
    pub id: Uuid,
    pub title: String,
    pub description: String,
    pub price: i64,
    pub category: String,
    pub condition: String,
    pub image_url: String,
    pub status: ItemStatus,
    pub created_at: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub seller: Option<OwnerDto>,
}

impl From<MarketplaceItem> for ListingDto {
    fn from(item: MarketplaceItem) -> Self {
        Self {
            id: item.id,
            title: item.title,
            description: item.description,
            price: item.price,
            category: item.category,
            condition: item.condition,
            image_url: item.image_url,
            status: item.status,
            created_at: item.created_at.to_rfc3339(),
            seller: None,
        }
    }
}

impl From<ItemWithSeller> for ListingDto {
    fn from(joined: ItemWithSeller) -> Self {
        let mut dto = Self::from(joined.item);
        dto.seller = Some(OwnerDto {
            name: joined.seller_name,
            login_id: joined.seller_login_id.into(),
        });
        dto
    }
}

/// Resident lists an item for sale.
#[utoipa::path(
    post,
    path = "/api/v1/marketplace",
    request_body = CreateListingDto,
    responses(
        (status = 201, description = "Listing created", body = ListingDto),
        (status = 400, description = "Invalid request", body = crate::inbound::http::error::ApiError)
    ),
    tags = ["marketplace"],
    operation_id = "createListing"
)]
#[post("/marketplace")]
pub async fn create_listing(
    state: web::Data<HttpState>,
    session: SessionContext,
    payload: web::Json<CreateListingDto>,
) -> ApiResult<HttpResponse> {
    let seller = session.require_resident()?;
    let payload = payload.into_inner();

    let title = require_field("title", payload.title.as_deref())?;
    let description = require_field("description", payload.description.as_deref())?;
    let price = payload
        .price
        .ok_or_else(|| Error::invalid_request("price is required"))?;
    let category = require_field("category", payload.category.as_deref())?;
    let condition = require_field("condition", payload.condition.as_deref())?;

    let item = state
        .marketplace
        .create(
            seller,
            NewListing {
                title: title.to_owned(),
                description: description.to_owned(),
                price,
                category: category.to_owned(),
                condition: condition.to_owned(),
                image_url: payload.image_url,
            },
        )
        .await?;
    Ok(HttpResponse::Created().json(ListingDto::from(item)))
}

/// All `Available` listings.
#[utoipa::path(
    get,
    path = "/api/v1/marketplace",
    responses((status = 200, description = "Listings", body = [ListingDto])),
    tags = ["marketplace"],
    operation_id = "listAvailable"
)]
#[get("/marketplace")]
pub async fn list_available(
    state: web::Data<HttpState>,
    session: SessionContext,
) -> ApiResult<web::Json<Vec<ListingDto>>> {
    session.require_principal()?;
    let items = state.marketplace.list_available().await?;
    Ok(web::Json(items.into_iter().map(Into::into).collect()))
}

/// The caller's own listings, any status.
#[utoipa::path(
    get,
    path = "/api/v1/marketplace/my-listings",
    responses((status = 200, description = "Listings", body = [ListingDto])),
    tags = ["marketplace"],
    operation_id = "myListings"
)]
#[get("/marketplace/my-listings")]
pub async fn my_listings(
    state: web::Data<HttpState>,
    session: SessionContext,
) -> ApiResult<web::Json<Vec<ListingDto>>> {
    let seller = session.require_resident()?;
    let items = state.marketplace.my_listings(seller).await?;
    Ok(web::Json(items.into_iter().map(Into::into).collect()))
}

/// Fetch one listing.
#[utoipa::path(
    get,
    path = "/api/v1/marketplace/{id}",
    responses(
        (status = 200, description = "Listing", body = ListingDto),
        (status = 400, description = "Malformed id", body = crate::inbound::http::error::ApiError),
        (status = 404, description = "Unknown listing", body = crate::inbound::http::error::ApiError)
    ),
    tags = ["marketplace"],
    operation_id = "getListing"
)]
#[get("/marketplace/{id}")]
pub async fn get_listing(
    state: web::Data<HttpState>,
    session: SessionContext,
    path: web::Path<Uuid>,
) -> ApiResult<web::Json<ListingDto>> {
    session.require_principal()?;
    let item = state.marketplace.get(path.into_inner()).await?;
    Ok(web::Json(item.into()))
}

/// Seller updates their listing (mark sold, edit fields).
#[utoipa::path(
    put,
    path = "/api/v1/marketplace/{id}",
    request_body = UpdateListingDto,
    responses(
        (status = 200, description = "Updated listing", body = ListingDto),
        (status = 400, description = "Invalid request", body = crate::inbound::http::error::ApiError),
        (status = 401, description = "Not the seller", body = crate::inbound::http::error::ApiError),
        (status = 404, description = "Unknown listing", body = crate::inbound::http::error::ApiError)
    ),
    tags = ["marketplace"],
    operation_id = "updateListing"
)]
#[put("/marketplace/{id}")]
pub async fn update_listing(
    state: web::Data<HttpState>,
    session: SessionContext,
    path: web::Path<Uuid>,
    payload: web::Json<UpdateListingDto>,
) -> ApiResult<web::Json<ListingDto>> {
    let caller = session.require_resident()?;
    let payload = payload.into_inner();

    let status = payload
        .status
        .as_deref()
        .map(|raw| parse_status::<ItemStatus>("status", raw))
        .transpose()?;
    let patch = ListingPatch {
        title: payload.title,
        description: payload.description,
        price: payload.price,
        category: payload.category,
        condition: payload.condition,
        image_url: payload.image_url,
        status,
    };
    let item = state
        .marketplace
        .update(path.into_inner(), caller, patch)
        .await?;
    Ok(web::Json(item.into()))
}

/// Seller removes their listing.
#[utoipa::path(
    delete,
    path = "/api/v1/marketplace/{id}",
    responses(
        (status = 200, description = "Listing removed"),
        (status = 401, description = "Not the seller", body = crate::inbound::http::error::ApiError),
        (status = 404, description = "Unknown listing", body = crate::inbound::http::error::ApiError)
    ),
    tags = ["marketplace"],
    operation_id = "deleteListing"
)]
#[delete("/marketplace/{id}")]
pub async fn delete_listing(
    state: web::Data<HttpState>,
    session: SessionContext,
    path: web::Path<Uuid>,
) -> ApiResult<HttpResponse> {
    let caller = session.require_resident()?;
    let id = path.into_inner();
    state.marketplace.delete(id, caller).await?;
    Ok(HttpResponse::Ok().json(serde_json::json!({ "id": id })))
}
