use chrono::{NaiveDate, Utc};
use rust_decimal::Decimal;
use sea_orm::{
    ActiveModelTrait, ActiveValue::Set, ColumnTrait, DatabaseConnection, EntityTrait, PaginatorTrait,
    QueryFilter, QueryOrder, TransactionTrait,
};
use serde::Serialize;
use std::fmt;
use std::str::FromStr;
use std::sync::Arc;
use tracing::{info, instrument};
use utoipa::ToSchema;
use uuid::Uuid;

use crate::{
    entities::{
        animal::{self, Entity as Animal},
        consumption_event::{self, Entity as ConsumptionEvent},
        consumption_line::{self, Entity as ConsumptionLine},
        supply_item::{self, Entity as SupplyItem},
    },
    errors::ServiceError,
    events::{Event, EventSender},
    services::{
        document_number::{DocumentSequence, SequenceKind},
        map_constraint_err,
        purchases::unwrap_txn_err,
        stock::StockService,
    },
};

/// The two kinds of stock-consuming events a farm records against an animal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum EventType {
    Health,
    Feeding,
}

impl EventType {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Health => "health",
            Self::Feeding => "feeding",
        }
    }

    pub fn sequence_kind(&self) -> SequenceKind {
        match self {
            Self::Health => SequenceKind::HealthEvent,
            Self::Feeding => SequenceKind::FeedingEvent,
        }
    }
}

impl FromStr for EventType {
    type Err = ServiceError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "health" => Ok(Self::Health),
            "feeding" => Ok(Self::Feeding),
            other => Err(ServiceError::ValidationError(format!(
                "unknown event type '{}' (expected 'health' or 'feeding')",
                other
            ))),
        }
    }
}

impl fmt::Display for EventType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Event lifecycle. Status is metadata only: changing it never touches stock.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum EventStatus {
    Pending,
    Completed,
}

impl EventStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::Completed => "completed",
        }
    }
}

impl FromStr for EventStatus {
    type Err = ServiceError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "pending" => Ok(Self::Pending),
            "completed" => Ok(Self::Completed),
            other => Err(ServiceError::ValidationError(format!(
                "unknown status '{}' (expected 'pending' or 'completed')",
                other
            ))),
        }
    }
}

impl fmt::Display for EventStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone)]
pub struct NewConsumptionLine {
    pub supply_item_id: Uuid,
    pub quantity: i32,
}

#[derive(Debug, Clone)]
pub struct NewConsumption {
    pub event_type: EventType,
    pub animal_id: Uuid,
    pub event_date: NaiveDate,
    pub notes: Option<String>,
    pub lines: Vec<NewConsumptionLine>,
}

#[derive(Debug, Clone, Serialize)]
pub struct ConsumptionDetails {
    pub event: consumption_event::Model,
    pub lines: Vec<consumption_line::Model>,
}

/// Records consumption events (header + lines + floor-checked stock debits in
/// one transaction), reverses them with compensating credits, and applies
/// status-only edits.
#[derive(Clone)]
pub struct ConsumptionService {
    db: Arc<DatabaseConnection>,
    stock: StockService,
    sequence: Arc<dyn DocumentSequence>,
    event_sender: Option<EventSender>,
}

impl ConsumptionService {
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

    /// Records a consumption event atomically. Each line debits stock under
    /// the minimum-floor check inside the same transaction as the inserts, so
    /// one short line rolls everything back and no partial debits survive.
    #[instrument(skip(self, request), fields(animal_id = %request.animal_id, event_type = %request.event_type))]
    pub async fn record_consumption(
        &self,
        request: NewConsumption,
    ) -> Result<ConsumptionDetails, ServiceError> {
        self.validate_lines(&request.lines)?;
        self.ensure_animal_active(request.animal_id).await?;
        self.precheck_headroom(&request.lines).await?;

        let document_number = self.sequence.next(request.event_type.sequence_kind()).await;
        let event_id = Uuid::new_v4();

        let stock = self.stock.clone();
        let lines = request.lines.clone();
        let doc = document_number.clone();
        let adjustments = self
            .db
            .transaction::<_, Vec<(Uuid, Decimal, Decimal)>, ServiceError>(move |txn| {
                Box::pin(async move {
                    let now = Utc::now();
                    let header = consumption_event::ActiveModel {
                        id: Set(event_id),
                        document_number: Set(doc),
                        event_type: Set(request.event_type.as_str().to_string()),
                        animal_id: Set(request.animal_id),
                        event_date: Set(request.event_date),
                        status: Set(EventStatus::Pending.as_str().to_string()),
                        notes: Set(request.notes),
                        deleted_at: Set(None),
                        created_at: Set(now),
                        updated_at: Set(now),
                    };
                    header.insert(txn).await.map_err(map_constraint_err)?;

                    let mut adjustments = Vec::with_capacity(lines.len());
                    for line in lines {
                        let row = consumption_line::ActiveModel {
                            id: Set(Uuid::new_v4()),
                            event_id: Set(event_id),
                            supply_item_id: Set(line.supply_item_id),
                            quantity: Set(line.quantity),
                            deleted_at: Set(None),
                            created_at: Set(now),
                        };
                        row.insert(txn).await.map_err(map_constraint_err)?;

                        let delta = -Decimal::from(line.quantity);
                        let new_quantity = stock
                            .adjust(txn, line.supply_item_id, delta, true)
                            .await?;
                        adjustments.push((line.supply_item_id, delta, new_quantity));
                    }

                    Ok(adjustments)
                })
            })
            .await
            .map_err(unwrap_txn_err)?;

        if let Some(sender) = &self.event_sender {
            sender
                .send_or_log(Event::ConsumptionRecorded {
                    event_id,
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

        info!(%event_id, %document_number, "Consumption event recorded");
        self.get_event(event_id).await
    }

    /// Fetches an active consumption event with its active lines.
    #[instrument(skip(self))]
    pub async fn get_event(&self, event_id: Uuid) -> Result<ConsumptionDetails, ServiceError> {
        let db = &*self.db;

        let header = ConsumptionEvent::find_by_id(event_id)
            .filter(consumption_event::Column::DeletedAt.is_null())
            .one(db)
            .await
            .map_err(ServiceError::db_error)?
            .ok_or_else(|| {
                ServiceError::NotFound(format!("Consumption event {} not found", event_id))
            })?;

        let lines = ConsumptionLine::find()
            .filter(consumption_line::Column::EventId.eq(event_id))
            .filter(consumption_line::Column::DeletedAt.is_null())
            .order_by_asc(consumption_line::Column::CreatedAt)
            .all(db)
            .await
            .map_err(ServiceError::db_error)?;

        Ok(ConsumptionDetails {
            event: header,
            lines,
        })
    }

    /// Lists active consumption events, optionally filtered by type, newest
    /// first.
    #[instrument(skip(self))]
    pub async fn list_events(
        &self,
        event_type: Option<EventType>,
        page: u64,
        limit: u64,
    ) -> Result<(Vec<ConsumptionDetails>, u64), ServiceError> {
        let db = &*self.db;

        let mut query = ConsumptionEvent::find()
            .filter(consumption_event::Column::DeletedAt.is_null())
            .order_by_desc(consumption_event::Column::CreatedAt);
        if let Some(kind) = event_type {
            query = query.filter(consumption_event::Column::EventType.eq(kind.as_str()));
        }

        let paginator = query.paginate(db, limit.max(1));
        let total = paginator.num_items().await.map_err(ServiceError::db_error)?;
        let headers = paginator
            .fetch_page(page.saturating_sub(1))
            .await
            .map_err(ServiceError::db_error)?;

        let mut details = Vec::with_capacity(headers.len());
        for header in headers {
            let lines = ConsumptionLine::find()
                .filter(consumption_line::Column::EventId.eq(header.id))
                .filter(consumption_line::Column::DeletedAt.is_null())
                .all(db)
                .await
                .map_err(ServiceError::db_error)?;
            details.push(ConsumptionDetails {
                event: header,
                lines,
            });
        }

        Ok((details, total))
    }

    /// Reverses a consumption event: credits back each active line's quantity
    /// and marks the lines and header deleted, atomically. The credits are
    /// unconditional additions, so a reversal can never fail a stock check;
    /// reversing an already-reversed event is NotFound and leaves stock
    /// untouched.
    #[instrument(skip(self))]
    pub async fn reverse_consumption(&self, event_id: Uuid) -> Result<(), ServiceError> {
        let stock = self.stock.clone();
        self.db
            .transaction::<_, (), ServiceError>(move |txn| {
                Box::pin(async move {
                    let header = ConsumptionEvent::find_by_id(event_id)
                        .filter(consumption_event::Column::DeletedAt.is_null())
                        .one(txn)
                        .await
                        .map_err(ServiceError::db_error)?
                        .ok_or_else(|| {
                            ServiceError::NotFound(format!(
                                "Consumption event {} not found",
                                event_id
                            ))
                        })?;

                    let lines = ConsumptionLine::find()
                        .filter(consumption_line::Column::EventId.eq(event_id))
                        .filter(consumption_line::Column::DeletedAt.is_null())
                        .all(txn)
                        .await
                        .map_err(ServiceError::db_error)?;

                    let now = Utc::now();
                    for line in &lines {
                        stock
                            .adjust(txn, line.supply_item_id, Decimal::from(line.quantity), false)
                            .await?;

                        let mut active: consumption_line::ActiveModel = line.clone().into();
                        active.deleted_at = Set(Some(now));
                        active.update(txn).await.map_err(ServiceError::db_error)?;
                    }

                    let mut active_header: consumption_event::ActiveModel = header.into();
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
                .send_or_log(Event::ConsumptionReversed { event_id })
                .await;
        }

        info!(%event_id, "Consumption event reversed");
        Ok(())
    }

    /// Changes an event's status. This is the only post-creation edit
    /// supported; line items and stock are untouched.
    #[instrument(skip(self))]
    pub async fn update_status(
        &self,
        event_id: Uuid,
        status: EventStatus,
    ) -> Result<consumption_event::Model, ServiceError> {
        let db = &*self.db;

        let header = ConsumptionEvent::find_by_id(event_id)
            .filter(consumption_event::Column::DeletedAt.is_null())
            .one(db)
            .await
            .map_err(ServiceError::db_error)?
            .ok_or_else(|| {
                ServiceError::NotFound(format!("Consumption event {} not found", event_id))
            })?;

        let old_status = header.status.clone();
        let mut active: consumption_event::ActiveModel = header.into();
        active.status = Set(status.as_str().to_string());
        active.updated_at = Set(Utc::now());
        let updated = active.update(db).await.map_err(ServiceError::db_error)?;

        if old_status != updated.status {
            if let Some(sender) = &self.event_sender {
                sender
                    .send_or_log(Event::ConsumptionStatusChanged {
                        event_id,
                        old_status,
                        new_status: updated.status.clone(),
                    })
                    .await;
            }
        }

        Ok(updated)
    }

    fn validate_lines(&self, lines: &[NewConsumptionLine]) -> Result<(), ServiceError> {
        if lines.is_empty() {
            return Err(ServiceError::ValidationError(
                "a consumption event requires at least one line item".to_string(),
            ));
        }

        let mut problems = Vec::new();
        for (idx, line) in lines.iter().enumerate() {
            if line.quantity <= 0 {
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

    /// Pre-transaction headroom check so a multi-line request fails before any
    /// write when one line is clearly short. Advisory only: the conditional
    /// UPDATE inside the transaction remains the authoritative check.
    async fn precheck_headroom(&self, lines: &[NewConsumptionLine]) -> Result<(), ServiceError> {
        let db = &*self.db;
        let floor = self.stock.minimum_floor();

        let mut shortfalls = Vec::new();
        for line in lines {
            let item = SupplyItem::find_by_id(line.supply_item_id)
                .filter(supply_item::Column::DeletedAt.is_null())
                .one(db)
                .await
                .map_err(ServiceError::db_error)?
                .ok_or_else(|| {
                    ServiceError::NotFound(format!(
                        "Supply item {} not found",
                        line.supply_item_id
                    ))
                })?;

            let available = item.quantity_on_hand - floor;
            let requested = Decimal::from(line.quantity);
            if requested > available {
                shortfalls.push(format!(
                    "{}: available {}, requested {}, minimum floor {}",
                    item.name, available, requested, floor
                ));
            }
        }

        if shortfalls.is_empty() {
            Ok(())
        } else {
            Err(ServiceError::InsufficientStock(shortfalls.join("; ")))
        }
    }

    async fn ensure_animal_active(&self, animal_id: Uuid) -> Result<(), ServiceError> {
        let exists = Animal::find_by_id(animal_id)
            .filter(animal::Column::DeletedAt.is_null())
            .one(&*self.db)
            .await
            .map_err(ServiceError::db_error)?
            .is_some();
        if exists {
            Ok(())
        } else {
            Err(ServiceError::NotFound(format!(
                "Animal {} not found",
                animal_id
            )))
        }
    }
}
