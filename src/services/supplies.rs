use rust_decimal::Decimal;
use sea_orm::{
    ColumnTrait, DatabaseConnection, EntityTrait, PaginatorTrait, QueryFilter, QueryOrder,
};
use std::sync::Arc;
use tracing::instrument;
use uuid::Uuid;

use crate::{
    entities::supply_item::{self, Entity as SupplyItem},
    errors::ServiceError,
};

/// Read-side lookups over supply items. All writes to `quantity_on_hand` go
/// through the stock register; this service only reads.
#[derive(Clone)]
pub struct SupplyService {
    db: Arc<DatabaseConnection>,
    minimum_floor: Decimal,
}

impl SupplyService {
    pub fn new(db: Arc<DatabaseConnection>, minimum_floor: Decimal) -> Self {
        Self { db, minimum_floor }
    }

    /// Fetches an active supply item.
    #[instrument(skip(self))]
    pub async fn get_supply(&self, supply_item_id: Uuid) -> Result<supply_item::Model, ServiceError> {
        SupplyItem::find_by_id(supply_item_id)
            .filter(supply_item::Column::DeletedAt.is_null())
            .one(&*self.db)
            .await
            .map_err(ServiceError::db_error)?
            .ok_or_else(|| {
                ServiceError::NotFound(format!("Supply item {} not found", supply_item_id))
            })
    }

    /// Lists active supply items alphabetically.
    #[instrument(skip(self))]
    pub async fn list_supplies(
        &self,
        page: u64,
        limit: u64,
    ) -> Result<(Vec<supply_item::Model>, u64), ServiceError> {
        let paginator = SupplyItem::find()
            .filter(supply_item::Column::DeletedAt.is_null())
            .order_by_asc(supply_item::Column::Name)
            .paginate(&*self.db, limit.max(1));

        let total = paginator.num_items().await.map_err(ServiceError::db_error)?;
        let items = paginator
            .fetch_page(page.saturating_sub(1))
            .await
            .map_err(ServiceError::db_error)?;
        Ok((items, total))
    }

    /// Active supply items whose quantity-on-hand is at or below the minimum
    /// floor. These are exactly the items no further consumption can draw
    /// from.
    #[instrument(skip(self))]
    pub async fn low_stock(&self) -> Result<Vec<supply_item::Model>, ServiceError> {
        SupplyItem::find()
            .filter(supply_item::Column::DeletedAt.is_null())
            .filter(supply_item::Column::QuantityOnHand.lte(self.minimum_floor))
            .order_by_asc(supply_item::Column::QuantityOnHand)
            .all(&*self.db)
            .await
            .map_err(ServiceError::db_error)
    }
}
