// Each integration test binary compiles its own copy of this module and uses
// a different subset of the helpers.
#![allow(dead_code)]

use std::sync::Arc;
use std::time::Duration;

use chrono::Utc;
use finca_api::{
    db::{self, DbConfig},
    entities::{animal, supplier, supply_item},
    events::EventSender,
    services::{
        consumption::ConsumptionService,
        document_number::{CountingSequence, DocumentSequence},
        purchases::PurchaseService,
        stock::StockService,
    },
};
use rust_decimal::Decimal;
use sea_orm::{ActiveModelTrait, ActiveValue::Set, DatabaseConnection};
use tokio::sync::mpsc;
use uuid::Uuid;

pub const TEST_FLOOR: u32 = 10;

/// Fresh in-memory SQLite database with all migrations applied.
///
/// The pool is pinned to a single connection: every pooled connection to
/// `sqlite::memory:` is its own separate database.
pub async fn setup_db() -> Arc<DatabaseConnection> {
    let cfg = DbConfig {
        url: "sqlite::memory:".to_string(),
        max_connections: 1,
        min_connections: 1,
        connect_timeout: Duration::from_secs(5),
        idle_timeout: Duration::from_secs(60),
        acquire_timeout: Duration::from_secs(5),
    };
    let pool = db::establish_connection_with_config(&cfg)
        .await
        .expect("db connect");
    db::run_migrations(&pool).await.expect("migrations");
    Arc::new(pool)
}

pub fn stock_service() -> StockService {
    StockService::new(Decimal::from(TEST_FLOOR))
}

pub fn purchase_service(db: Arc<DatabaseConnection>) -> PurchaseService {
    let sequence: Arc<dyn DocumentSequence> = Arc::new(CountingSequence::new(db.clone()));
    PurchaseService::new(db, stock_service(), sequence, Some(event_sender()))
}

pub fn consumption_service(db: Arc<DatabaseConnection>) -> ConsumptionService {
    let sequence: Arc<dyn DocumentSequence> = Arc::new(CountingSequence::new(db.clone()));
    ConsumptionService::new(db, stock_service(), sequence, Some(event_sender()))
}

/// Event channel whose receiver is simply dropped; send_or_log tolerates it.
fn event_sender() -> EventSender {
    let (tx, rx) = mpsc::channel(64);
    drop(rx);
    EventSender::new(tx)
}

pub async fn seed_supplier(db: &DatabaseConnection, name: &str) -> Uuid {
    let id = Uuid::new_v4();
    let now = Utc::now();
    supplier::ActiveModel {
        id: Set(id),
        name: Set(name.to_string()),
        contact: Set(None),
        deleted_at: Set(None),
        created_at: Set(now),
        updated_at: Set(now),
    }
    .insert(db)
    .await
    .expect("seed supplier");
    id
}

pub async fn seed_animal(db: &DatabaseConnection, tag: &str) -> Uuid {
    let id = Uuid::new_v4();
    let now = Utc::now();
    animal::ActiveModel {
        id: Set(id),
        tag: Set(tag.to_string()),
        name: Set(None),
        deleted_at: Set(None),
        created_at: Set(now),
        updated_at: Set(now),
    }
    .insert(db)
    .await
    .expect("seed animal");
    id
}

pub async fn seed_supply(db: &DatabaseConnection, name: &str, quantity: Decimal) -> Uuid {
    let id = Uuid::new_v4();
    let now = Utc::now();
    supply_item::ActiveModel {
        id: Set(id),
        name: Set(name.to_string()),
        category: Set("feed".to_string()),
        unit: Set("kg".to_string()),
        quantity_on_hand: Set(quantity),
        deleted_at: Set(None),
        created_at: Set(now),
        updated_at: Set(now),
    }
    .insert(db)
    .await
    .expect("seed supply");
    id
}

/// Marks a supply item soft-deleted without going through a service.
pub async fn soft_delete_supply(db: &DatabaseConnection, supply_id: Uuid) {
    use sea_orm::EntityTrait;
    let item = supply_item::Entity::find_by_id(supply_id)
        .one(db)
        .await
        .expect("find supply")
        .expect("supply exists");
    let mut active: supply_item::ActiveModel = item.into();
    active.deleted_at = Set(Some(Utc::now()));
    active.update(db).await.expect("soft delete supply");
}
