use chrono::Utc;
use rust_decimal::Decimal;
use sea_orm::sea_query::{Alias, Expr, ExprTrait};
use sea_orm::{ColumnTrait, ConnectionTrait, EntityTrait, QueryFilter};
use tracing::debug;
use uuid::Uuid;

use crate::{
    entities::supply_item::{self, Entity as SupplyItem},
    errors::ServiceError,
};

/// Stock register over `supply_items.quantity_on_hand`.
///
/// Adjustments run on the caller's connection, so when the caller passes a
/// transaction, the adjustment commits or rolls back with it. The floor and
/// below-zero checks live in the UPDATE's WHERE clause, which makes them
/// atomic with the write: two concurrent debits cannot both pass against a
/// stale read.
#[derive(Debug, Clone)]
pub struct StockService {
    minimum_floor: Decimal,
}

impl StockService {
    pub fn new(minimum_floor: Decimal) -> Self {
        Self { minimum_floor }
    }

    pub fn minimum_floor(&self) -> Decimal {
        self.minimum_floor
    }

    /// Applies `delta` to a supply item's quantity-on-hand and returns the new
    /// quantity.
    ///
    /// With `enforce_floor` the result may not drop below the configured
    /// minimum floor (consumption); without it the result may cross the floor
    /// but never below zero (purchase credits and reversals).
    pub async fn adjust<C: ConnectionTrait>(
        &self,
        conn: &C,
        supply_item_id: Uuid,
        delta: Decimal,
        enforce_floor: bool,
    ) -> Result<Decimal, ServiceError> {
        let min = if enforce_floor {
            self.minimum_floor
        } else {
            Decimal::ZERO
        };

        let result = SupplyItem::update_many()
            .col_expr(
                supply_item::Column::QuantityOnHand,
                Expr::col(supply_item::Column::QuantityOnHand).add(delta),
            )
            .col_expr(
                supply_item::Column::UpdatedAt,
                Expr::value(Utc::now()),
            )
            .filter(supply_item::Column::Id.eq(supply_item_id))
            .filter(supply_item::Column::DeletedAt.is_null())
            // Decimal parameters bind as TEXT on SQLite, and SQLite orders
            // every number below every text value, so the comparison must
            // force both bindings numeric or the guard never matches.
            .filter(
                Expr::col(supply_item::Column::QuantityOnHand)
                    .add(Expr::val(delta).cast_as(Alias::new("NUMERIC")))
                    .gte(Expr::val(min).cast_as(Alias::new("NUMERIC"))),
            )
            .exec(conn)
            .await
            .map_err(ServiceError::db_error)?;

        if result.rows_affected == 0 {
            return Err(self.rejection(conn, supply_item_id, delta, min).await?);
        }

        let updated = self.current(conn, supply_item_id).await?;
        debug!(
            %supply_item_id,
            %delta,
            new_quantity = %updated,
            "Stock adjusted"
        );
        Ok(updated)
    }

    /// Reads the current quantity-on-hand of an active supply item.
    pub async fn current<C: ConnectionTrait>(
        &self,
        conn: &C,
        supply_item_id: Uuid,
    ) -> Result<Decimal, ServiceError> {
        let item = SupplyItem::find_by_id(supply_item_id)
            .filter(supply_item::Column::DeletedAt.is_null())
            .one(conn)
            .await
            .map_err(ServiceError::db_error)?
            .ok_or_else(|| {
                ServiceError::NotFound(format!("Supply item {} not found", supply_item_id))
            })?;
        Ok(item.quantity_on_hand)
    }

    /// Resolves why a conditional adjustment matched no row: missing item,
    /// below-zero result, or a floor breach.
    async fn rejection<C: ConnectionTrait>(
        &self,
        conn: &C,
        supply_item_id: Uuid,
        delta: Decimal,
        min: Decimal,
    ) -> Result<ServiceError, ServiceError> {
        let item = SupplyItem::find_by_id(supply_item_id)
            .one(conn)
            .await
            .map_err(ServiceError::db_error)?;

        let current = match item {
            Some(ref item) if item.deleted_at.is_none() => item.quantity_on_hand,
            _ => {
                return Ok(ServiceError::NotFound(format!(
                    "Supply item {} not found",
                    supply_item_id
                )))
            }
        };

        if current + delta < Decimal::ZERO {
            Ok(ServiceError::NegativeStock(format!(
                "supply item {}: current {}, adjustment {}",
                supply_item_id, current, delta
            )))
        } else {
            Ok(ServiceError::InsufficientStock(format!(
                "supply item {}: available {}, requested {}, minimum floor {}",
                supply_item_id,
                current - min,
                -delta,
                min
            )))
        }
    }
}
