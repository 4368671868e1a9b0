//! Marketplace rules: seller-only mutation, availability listing.

use std::sync::Arc;

use mockable::Clock;
use uuid::Uuid;

use super::error::Error;
use super::marketplace::{
    ItemWithSeller, ListingPatch, ListingValidationError, MarketplaceItem,
};
use super::ports::MarketplaceRepository;
use super::principal::ResidentId;

/// Input for a new listing.
#[derive(Debug, Clone)]
pub struct NewListing {
    pub title: String,
    pub description: String,
    pub price: i64,
    pub category: String,
    pub condition: String,
    pub image_url: Option<String>,
}

/// Marketplace service.
#[derive(Clone)]
pub struct MarketplaceService {
    items: Arc<dyn MarketplaceRepository>,
    clock: Arc<dyn Clock>,
}

impl MarketplaceService {
    /// Create a new service.
    pub fn new(items: Arc<dyn MarketplaceRepository>, clock: Arc<dyn Clock>) -> Self {
        Self { items, clock }
    }

    /// Resident lists an item for sale.
    pub async fn create(
        &self,
        seller: ResidentId,
        listing: NewListing,
    ) -> Result<MarketplaceItem, Error> {
        let item = MarketplaceItem::create(
            seller,
            &listing.title,
            &listing.description,
            listing.price,
            &listing.category,
            &listing.condition,
            listing.image_url.as_deref(),
            self.clock.utc(),
        )
        .map_err(map_validation_error)?;
        self.items.insert(&item).await?;
        Ok(item)
    }

    /// Available listings with seller display fields, newest first.
    pub async fn list_available(&self) -> Result<Vec<ItemWithSeller>, Error> {
        Ok(self.items.list_available().await?)
    }

    /// The caller's own listings regardless of status.
    pub async fn my_listings(&self, seller: ResidentId) -> Result<Vec<MarketplaceItem>, Error> {
        Ok(self.items.list_for_seller(seller).await?)
    }

    /// Fetch one listing with seller display fields.
    pub async fn get(&self, id: Uuid) -> Result<ItemWithSeller, Error> {
        self.items
            .find_with_seller(id)
            .await?
            .ok_or_else(|| Error::not_found("item not found"))
    }

    /// Seller-only partial update.
    pub async fn update(
        &self,
        id: Uuid,
        caller: ResidentId,
        patch: ListingPatch,
    ) -> Result<MarketplaceItem, Error> {
        let mut item = self
            .items
            .find(id)
            .await?
            .ok_or_else(|| Error::not_found("item not found"))?;
        if item.seller_id != caller {
            return Err(Error::unauthorized("only the seller may edit this item"));
        }
        item.apply(patch, self.clock.utc())
            .map_err(map_validation_error)?;
        self.items.update(&item).await?;
        Ok(item)
    }

    /// Seller-only removal.
    pub async fn delete(&self, id: Uuid, caller: ResidentId) -> Result<(), Error> {
        let item = self
            .items
            .find(id)
            .await?
            .ok_or_else(|| Error::not_found("item not found"))?;
        if item.seller_id != caller {
            return Err(Error::unauthorized("only the seller may remove this item"));
        }
        self.items.delete(id).await?;
        Ok(())
    }
}

fn map_validation_error(err: ListingValidationError) -> Error {
    Error::invalid_request(err.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::ErrorCode;
    use crate::domain::marketplace::ItemStatus;
    use crate::domain::memory::MemoryStore;
    use chrono::{DateTime, TimeZone, Utc};
    use mockable::MockClock;
    use rstest::rstest;

    fn fixture_now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2026, 6, 10, 8, 0, 0)
            .single()
            .expect("valid fixture instant")
    }

    fn service() -> MarketplaceService {
        let mut clock = MockClock::new();
        clock.expect_utc().returning(fixture_now);
        MarketplaceService::new(Arc::new(MemoryStore::new()), Arc::new(clock))
    }

    fn listing() -> NewListing {
        NewListing {
            title: "Bookshelf".into(),
            description: "Solid wood, five shelves".into(),
            price: 1500,
            category: "Furniture".into(),
            condition: "Good".into(),
            image_url: None,
        }
    }

    #[rstest]
    #[actix_web::test]
    async fn only_the_seller_may_edit_or_delete() {
        let service = service();
        let seller = ResidentId::random();
        let item = service.create(seller, listing()).await.expect("create");

        let stranger = ResidentId::random();
        let err = service
            .update(item.id, stranger, ListingPatch::default())
            .await
            .expect_err("stranger edit");
        assert_eq!(err.code(), ErrorCode::Unauthorized);

        let err = service
            .delete(item.id, stranger)
            .await
            .expect_err("stranger delete");
        assert_eq!(err.code(), ErrorCode::Unauthorized);

        service.delete(item.id, seller).await.expect("seller delete");
    }

    #[rstest]
    #[actix_web::test]
    async fn sold_items_leave_the_available_listing() {
        let service = service();
        let seller = ResidentId::random();
        let item = service.create(seller, listing()).await.expect("create");
        assert_eq!(service.list_available().await.expect("list").len(), 1);

        service
            .update(
                item.id,
                seller,
                ListingPatch {
                    status: Some(ItemStatus::Sold),
                    ..ListingPatch::default()
                },
            )
            .await
            .expect("mark sold");

        assert!(service.list_available().await.expect("list").is_empty());
        // Still visible to the seller.
        assert_eq!(service.my_listings(seller).await.expect("mine").len(), 1);
    }

    #[rstest]
    #[actix_web::test]
    async fn create_rejects_invalid_listings() {
        let service = service();
        let mut bad = listing();
        bad.price = -5;
        let err = service
            .create(ResidentId::random(), bad)
            .await
            .expect_err("negative price");
        assert_eq!(err.code(), ErrorCode::InvalidRequest);
    }
}
