//! Resident-to-resident marketplace listings.

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

use super::account::LoginId;
use super::booking::UnknownStatus;
use super::principal::ResidentId;

/// Listing availability states.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub enum ItemStatus {
    Available,
    Sold,
    Reserved,
}

impl ItemStatus {
    /// Canonical string form as persisted and serialised.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Available => "Available",
            Self::Sold => "Sold",
            Self::Reserved => "Reserved",
        }
    }
}

impl fmt::Display for ItemStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ItemStatus {
    type Err = UnknownStatus;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "Available" => Ok(Self::Available),
            "Sold" => Ok(Self::Sold),
            "Reserved" => Ok(Self::Reserved),
            other => Err(UnknownStatus(other.to_owned())),
        }
    }
}

/// Validation errors for listings.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ListingValidationError {
    #[error("title must not be empty")]
    EmptyTitle,
    #[error("description must not be empty")]
    EmptyDescription,
    #[error("price must not be negative")]
    NegativePrice,
}

/// A second-hand item offered by a resident.
#[derive(Debug, Clone, PartialEq)]
pub struct MarketplaceItem {
    pub id: Uuid,
    pub seller_id: ResidentId,
    pub title: String,
    pub description: String,
    /// Asking price in whole currency units; never negative.
    pub price: i64,
    pub category: String,
    pub condition: String,
    pub image_url: String,
    pub status: ItemStatus,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl MarketplaceItem {
    /// Validate and build a new `Available` listing.
    #[expect(clippy::too_many_arguments, reason = "flat constructor mirrors the create payload")]
    pub fn create(
        seller_id: ResidentId,
        title: &str,
        description: &str,
        price: i64,
        category: &str,
        condition: &str,
        image_url: Option<&str>,
        now: DateTime<Utc>,
    ) -> Result<Self, ListingValidationError> {
        let title = title.trim();
        if title.is_empty() {
            return Err(ListingValidationError::EmptyTitle);
        }
        let description = description.trim();
        if description.is_empty() {
            return Err(ListingValidationError::EmptyDescription);
        }
        if price < 0 {
            return Err(ListingValidationError::NegativePrice);
        }
        Ok(Self {
            id: Uuid::new_v4(),
            seller_id,
            title: title.to_owned(),
            description: description.to_owned(),
            price,
            category: category.trim().to_owned(),
            condition: condition.trim().to_owned(),
            image_url: image_url.unwrap_or_default().to_owned(),
            status: ItemStatus::Available,
            created_at: now,
            updated_at: now,
        })
    }

    /// Apply a seller edit; untouched fields keep their values.
    pub fn apply(&mut self, patch: ListingPatch, now: DateTime<Utc>) -> Result<(), ListingValidationError> {
        if let Some(title) = patch.title {
            let title = title.trim().to_owned();
            if title.is_empty() {
                return Err(ListingValidationError::EmptyTitle);
            }
            self.title = title;
        }
        if let Some(description) = patch.description {
            let description = description.trim().to_owned();
            if description.is_empty() {
                return Err(ListingValidationError::EmptyDescription);
            }
            self.description = description;
        }
        if let Some(price) = patch.price {
            if price < 0 {
                return Err(ListingValidationError::NegativePrice);
            }
            self.price = price;
        }
        if let Some(category) = patch.category {
            self.category = category.trim().to_owned();
        }
        if let Some(condition) = patch.condition {
            self.condition = condition.trim().to_owned();
        }
        if let Some(image_url) = patch.image_url {
            self.image_url = image_url;
        }
        if let Some(status) = patch.status {
            self.status = status;
        }
        self.updated_at = now;
        Ok(())
    }
}

/// Partial update submitted by the seller.
#[derive(Debug, Clone, Default)]
pub struct ListingPatch {
    pub title: Option<String>,
    pub description: Option<String>,
    pub price: Option<i64>,
    pub category: Option<String>,
    pub condition: Option<String>,
    pub image_url: Option<String>,
    pub status: Option<ItemStatus>,
}

/// Listing joined with the seller's display fields.
#[derive(Debug, Clone, PartialEq)]
pub struct ItemWithSeller {
    pub item: MarketplaceItem,
    pub seller_name: String,
    pub seller_login_id: LoginId,
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    fn fixture_item() -> MarketplaceItem {
        MarketplaceItem::create(
            ResidentId::random(),
            "Bookshelf",
            "Solid wood, five shelves",
            1500,
            "Furniture",
            "Good",
            None,
            Utc::now(),
        )
        .expect("valid listing")
    }

    #[rstest]
    fn create_rejects_negative_price() {
        let err = MarketplaceItem::create(
            ResidentId::random(),
            "Bookshelf",
            "desc",
            -1,
            "Furniture",
            "Good",
            None,
            Utc::now(),
        )
        .expect_err("negative price");
        assert_eq!(err, ListingValidationError::NegativePrice);
    }

    #[rstest]
    fn patch_updates_only_provided_fields() {
        let mut item = fixture_item();
        let before = item.clone();
        item.apply(
            ListingPatch {
                price: Some(1200),
                status: Some(ItemStatus::Reserved),
                ..ListingPatch::default()
            },
            Utc::now(),
        )
        .expect("valid patch");
        assert_eq!(item.price, 1200);
        assert_eq!(item.status, ItemStatus::Reserved);
        assert_eq!(item.title, before.title);
        assert_eq!(item.description, before.description);
    }

    #[rstest]
    fn patch_rejects_blank_title() {
        let mut item = fixture_item();
        let err = item
            .apply(
                ListingPatch {
                    title: Some("   ".into()),
                    ..ListingPatch::default()
                },
                Utc::now(),
            )
            .expect_err("blank title");
        assert_eq!(err, ListingValidationError::EmptyTitle);
    }
}
