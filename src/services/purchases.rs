use chrono::{NaiveDate, Utc};
use rust_decimal::Decimal;
use sea_orm::{
    ActiveModelTrait, ActiveValue::Set, ColumnTrait, DatabaseConnection, EntityTrait, PaginatorTrait,
    QueryFilter, QueryOrder, TransactionError, TransactionTrait,
};
use serde::Serialize;
use std::sync::Arc;
use tracing::{info, instrument};
use uuid::Uuid;

use crate::{
    entities::{
        purchase::{self, Entity as Purchase},
        purchase_line::{self, Entity as PurchaseLine},
        supplier::{self, Entity as Supplier},
        supply_item::{self, Entity as SupplyItem},
    },
    errors::ServiceError,
    events::{Event, EventSender},
    services::{
        document_number::{DocumentSequence, SequenceKind},
        map_constraint_err,
        stock::StockService,
        totals,
    },
};

#[derive(Debug, Clone)]
pub struct NewPurchaseLine {
    pub supply_item_id: Uuid,
    pub unit_price: Decimal,
    pub quantity: Decimal,
}

#[derive(Debug, Clone)]
pub struct NewPurchase {
    pub supplier_id: Uuid,
    pub purchase_date: NaiveDate,
    pub notes: Option<String>,
    pub lines: Vec<NewPurchaseLine>,
}

/// A purchase with its active lines and the derived total. The total is
/// computed on every read; no stored column exists to drift from the lines.
#[derive(Debug, Clone, Serialize)]
pub struct PurchaseDetails {
    pub purchase: purchase::Model,
    pub lines: Vec<purchase_line::Model>,
    pub total: Decimal,
}

/// Records purchases (header + lines + stock credits in one transaction) and
/// reverses them (inverse debits + soft-delete in one transaction).
#[derive(Clone)]
pub struct PurchaseService {
    db: Arc<DatabaseConnection>,
    stock: StockService,
    sequence: Arc<dyn DocumentSequence>,
    event_sender: Option<EventSender>,
}

impl PurchaseService {
    pub fn new(
        db: Arc<DatabaseConnection>,
        stock: StockService,
        sequence: Arc<dyn DocumentSequence>,
        event_sender: Option<EventSender>,
    ) -> Self {
        Self {
            db,
            stock,
            sequence,
            event_sender,
        }
    }

    /// Records a purchase atomically: header insert, line inserts and one
    /// stock credit per line all commit together or not at all.
    #[instrument(skip(self, request), fields(supplier_id = %request.supplier_id))]
    pub async fn record_purchase(
        &self,
        request: NewPurchase,
    ) -> Result<PurchaseDetails, ServiceError> {
        self.validate_lines(&request.lines)?;
        self.ensure_supplier_active(request.supplier_id).await?;
        for line in &request.lines {
            self.ensure_supply_active(line.supply_item_id).await?;
        }

        let document_number = self.sequence.next(SequenceKind::Purchase).await;
        let purchase_id = Uuid::new_v4();

        let stock = self.stock.clone();
        let lines = request.lines.clone();
        let doc = document_number.clone();
        let adjustments = self
            .db
            .transaction::<_, Vec<(Uuid, Decimal, Decimal)>, ServiceError>(move |txn| {
                Box::pin(async move {
                    let now = Utc::now();
                    let header = purchase::ActiveModel {
                        id: Set(purchase_id),
                        document_number: Set(doc),
                        supplier_id: Set(request.supplier_id),
                        purchase_date: Set(request.purchase_date),
                        notes: Set(request.notes),
                        deleted_at: Set(None),
                        created_at: Set(now),
                        updated_at: Set(now),
                    };
                    header.insert(txn).await.map_err(map_constraint_err)?;

                    let mut adjustments = Vec::with_capacity(lines.len());
                    for line in lines {
                        let row = purchase_line::ActiveModel {
                            id: Set(Uuid::new_v4()),
                            purchase_id: Set(purchase_id),
                            supply_item_id: Set(line.supply_item_id),
                            unit_price: Set(line.unit_price),
                            quantity: Set(line.quantity),
                            deleted_at: Set(None),
                            created_at: Set(now),
                        };
                        row.insert(txn).await.map_err(map_constraint_err)?;

                        let new_quantity = stock
                            .adjust(txn, line.supply_item_id, line.quantity, false)
                            .await?;
                        adjustments.push((line.supply_item_id, line.quantity, new_quantity));
                    }

                    Ok(adjustments)
                })
            })
            .await
            .map_err(unwrap_txn_err)?;

        if let Some(sender) = &self.event_sender {
            sender
                .send_or_log(Event::PurchaseRecorded {
                    purchase_id,
                    document_number: document_number.clone(),
                })
                .await;
            for (supply_item_id, delta, new_quantity) in adjustments {
                sender
                    .send_or_log(Event::StockAdjusted {
                        supply_item_id,
                        delta,
                        new_quantity,
                    })
                    .await;
            }
        }

        info!(%purchase_id, %document_number, "Purchase recorded");
        self.get_purchase(purchase_id).await
    }

    /// Fetches an active purchase with its active lines and derived total.
    #[instrument(skip(self))]
    pub async fn get_purchase(&self, purchase_id: Uuid) -> Result<PurchaseDetails, ServiceError> {
        let db = &*self.db;

        let header = Purchase::find_by_id(purchase_id)
            .filter(purchase::Column::DeletedAt.is_null())
            .one(db)
            .await
            .map_err(ServiceError::db_error)?
            .ok_or_else(|| {
                ServiceError::NotFound(format!("Purchase {} not found", purchase_id))
            })?;

        let lines = PurchaseLine::find()
            .filter(purchase_line::Column::PurchaseId.eq(purchase_id))
            .filter(purchase_line::Column::DeletedAt.is_null())
            .order_by_asc(purchase_line::Column::CreatedAt)
            .all(db)
            .await
            .map_err(ServiceError::db_error)?;

        let total = totals::purchase_total(&lines);
        Ok(PurchaseDetails {
            purchase: header,
            lines,
            total,
        })
    }

    /// Lists active purchases with derived totals, newest first.
    #[instrument(skip(self))]
    pub async fn list_purchases(
        &self,
        page: u64,
        limit: u64,
    ) -> Result<(Vec<PurchaseDetails>, u64), ServiceError> {
        let db = &*self.db;

        let paginator = Purchase::find()
            .filter(purchase::Column::DeletedAt.is_null())
            .order_by_desc(purchase::Column::CreatedAt)
            .paginate(db, limit.max(1));

        let total = paginator.num_items().await.map_err(ServiceError::db_error)?;
        let headers = paginator
            .fetch_page(page.saturating_sub(1))
            .await
            .map_err(ServiceError::db_error)?;

        let mut details = Vec::with_capacity(headers.len());
        for header in headers {
            let lines = PurchaseLine::find()
                .filter(purchase_line::Column::PurchaseId.eq(header.id))
                .filter(purchase_line::Column::DeletedAt.is_null())
                .all(db)
                .await
                .map_err(ServiceError::db_error)?;
            let line_total = totals::purchase_total(&lines);
            details.push(PurchaseDetails {
                purchase: header,
                lines,
                total: line_total,
            });
        }

        Ok((details, total))
    }

    /// Reverses a purchase: debits back each active line's quantity and marks
    /// the lines and header deleted, atomically. The floor is not enforced
    /// (a voided credit was never truly available) but stock still may not
    /// fall below zero. Reversing an already-reversed purchase is NotFound
    /// and leaves stock untouched.
    #[instrument(skip(self))]
    pub async fn reverse_purchase(&self, purchase_id: Uuid) -> Result<(), ServiceError> {
        let stock = self.stock.clone();
        self.db
            .transaction::<_, (), ServiceError>(move |txn| {
                Box::pin(async move {
                    let header = Purchase::find_by_id(purchase_id)
                        .filter(purchase::Column::DeletedAt.is_null())
                        .one(txn)
                        .await
                        .map_err(ServiceError::db_error)?
                        .ok_or_else(|| {
                            ServiceError::NotFound(format!(
                                "Purchase {} not found",
                                purchase_id
                            ))
                        })?;

                    let lines = PurchaseLine::find()
                        .filter(purchase_line::Column::PurchaseId.eq(purchase_id))
                        .filter(purchase_line::Column::DeletedAt.is_null())
                        .all(txn)
                        .await
                        .map_err(ServiceError::db_error)?;

                    let now = Utc::now();
                    for line in &lines {
                        stock
                            .adjust(txn, line.supply_item_id, -line.quantity, false)
                            .await?;

                        let mut active: purchase_line::ActiveModel = line.clone().into();
                        active.deleted_at = Set(Some(now));
                        active.update(txn).await.map_err(ServiceError::db_error)?;
                    }

                    let mut active_header: purchase::ActiveModel = header.into();
                    active_header.deleted_at = Set(Some(now));
                    active_header.updated_at = Set(now);
                    active_header
                        .update(txn)
                        .await
                        .map_err(ServiceError::db_error)?;

                    Ok(())
                })
            })
            .await
            .map_err(unwrap_txn_err)?;

        if let Some(sender) = &self.event_sender {
            sender
                .send_or_log(Event::PurchaseReversed { purchase_id })
                .await;
        }

        info!(%purchase_id, "Purchase reversed");
        Ok(())
    }

    /// Fail-fast validation before anything is persisted: all per-line
    /// failures are collected and reported together.
    fn validate_lines(&self, lines: &[NewPurchaseLine]) -> Result<(), ServiceError> {
        if lines.is_empty() {
            return Err(ServiceError::ValidationError(
                "a purchase requires at least one line item".to_string(),
            ));
        }

        let mut problems = Vec::new();
        for (idx, line) in lines.iter().enumerate() {
            if line.unit_price <= Decimal::ZERO {
                problems.push(format!("line {}: unit price must be positive", idx + 1));
            }
            if line.quantity <= Decimal::ZERO {
                problems.push(format!("line {}: quantity must be positive", idx + 1));
            }
        }
        if !problems.is_empty() {
            return Err(ServiceError::ValidationError(problems.join("; ")));
        }

        for (idx, line) in lines.iter().enumerate() {
            if lines[..idx]
                .iter()
                .any(|other| other.supply_item_id == line.supply_item_id)
            {
                return Err(ServiceError::Conflict(format!(
                    "duplicate line item for supply {}",
                    line.supply_item_id
                )));
            }
        }

        Ok(())
    }

    async fn ensure_supplier_active(&self, supplier_id: Uuid) -> Result<(), ServiceError> {
        let exists = Supplier::find_by_id(supplier_id)
            .filter(supplier::Column::DeletedAt.is_null())
            .one(&*self.db)
            .await
            .map_err(ServiceError::db_error)?
            .is_some();
        if exists {
            Ok(())
        } else {
            Err(ServiceError::NotFound(format!(
                "Supplier {} not found",
                supplier_id
            )))
        }
    }

    async fn ensure_supply_active(&self, supply_item_id: Uuid) -> Result<(), ServiceError> {
        let exists = SupplyItem::find_by_id(supply_item_id)
            .filter(supply_item::Column::DeletedAt.is_null())
            .one(&*self.db)
            .await
            .map_err(ServiceError::db_error)?
            .is_some();
        if exists {
            Ok(())
        } else {
            Err(ServiceError::NotFound(format!(
                "Supply item {} not found",
                supply_item_id
            )))
        }
    }
}

pub(crate) fn unwrap_txn_err(e: TransactionError<ServiceError>) -> ServiceError {
    match e {
        TransactionError::Connection(db_err) => ServiceError::db_error(db_err),
        TransactionError::Transaction(service_err) => service_err,
    }
}
