//! PostgreSQL-backed `MarketplaceRepository` implementation using Diesel.

use async_trait::async_trait;
use diesel::prelude::*;
use diesel_async::RunQueryDsl;
use uuid::Uuid;

use crate::domain::account::LoginId;
use crate::domain::marketplace::{ItemWithSeller, MarketplaceItem};
use crate::domain::ports::{MarketplaceRepository, StoreError};
use crate::domain::principal::ResidentId;

use super::models::MarketplaceItemRow;
use super::pool::DbPool;
use super::schema::{marketplace_items, residents};
use super::{map_diesel_error, map_pool_error};

fn joined_to_item(
    (row, seller_name, seller_login_id): (MarketplaceItemRow, String, String),
) -> Result<ItemWithSeller, StoreError> {
    Ok(ItemWithSeller {
        item: row.into(),
        seller_name,
        seller_login_id: LoginId::new(seller_login_id)
            .map_err(|err| StoreError::query(format!("corrupt login id: {err}")))?,
    })
}

/// Diesel-backed implementation of the `MarketplaceRepository` port.
#[derive(Clone)]
pub struct DieselMarketplaceRepository {
    pool: DbPool,
}

impl DieselMarketplaceRepository {
    /// Create a new repository with the given connection pool.
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl MarketplaceRepository for DieselMarketplaceRepository {
    async fn insert(&self, item: &MarketplaceItem) -> Result<(), StoreError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        diesel::insert_into(marketplace_items::table)
            .values(MarketplaceItemRow::from(item))
            .execute(&mut conn)
            .await
            .map(|_| ())
            .map_err(map_diesel_error)
    }

    async fn find(&self, id: Uuid) -> Result<Option<MarketplaceItem>, StoreError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let row: Option<MarketplaceItemRow> = marketplace_items::table
            .find(id)
            .select(MarketplaceItemRow::as_select())
            .first(&mut conn)
            .await
            .optional()
            .map_err(map_diesel_error)?;
        Ok(row.map(Into::into))
    }

    async fn update(&self, item: &MarketplaceItem) -> Result<(), StoreError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        diesel::update(marketplace_items::table.find(item.id))
            .set(MarketplaceItemRow::from(item))
            .execute(&mut conn)
            .await
            .map(|_| ())
            .map_err(map_diesel_error)
    }

    async fn delete(&self, id: Uuid) -> Result<bool, StoreError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let deleted = diesel::delete(marketplace_items::table.find(id))
            .execute(&mut conn)
            .await
            .map_err(map_diesel_error)?;
        Ok(deleted > 0)
    }

    async fn list_available(&self) -> Result<Vec<ItemWithSeller>, StoreError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let rows: Vec<(MarketplaceItemRow, String, String)> = marketplace_items::table
            .inner_join(residents::table)
            .filter(marketplace_items::status.eq("Available"))
            .order(marketplace_items::created_at.desc())
            .select((
                MarketplaceItemRow::as_select(),
                residents::name,
                residents::login_id,
            ))
            .load(&mut conn)
            .await
            .map_err(map_diesel_error)?;
        rows.into_iter().map(joined_to_item).collect()
    }

    async fn list_for_seller(
        &self,
        seller_id: ResidentId,
    ) -> Result<Vec<MarketplaceItem>, StoreError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let rows: Vec<MarketplaceItemRow> = marketplace_items::table
            .filter(marketplace_items::seller_id.eq(seller_id.as_uuid()))
            .order(marketplace_items::created_at.desc())
            .select(MarketplaceItemRow::as_select())
            .load(&mut conn)
            .await
            .map_err(map_diesel_error)?;
        Ok(rows.into_iter().map(Into::into).collect())
    }

    async fn find_with_seller(&self, id: Uuid) -> Result<Option<ItemWithSeller>, StoreError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let row: Option<(MarketplaceItemRow, String, String)> = marketplace_items::table
            .inner_join(residents::table)
            .filter(marketplace_items::id.eq(id))
            .select((
                MarketplaceItemRow::as_select(),
                residents::name,
                residents::login_id,
            ))
            .first(&mut conn)
            .await
            .optional()
            .map_err(map_diesel_error)?;
        row.map(joined_to_item).transpose()
    }
}
