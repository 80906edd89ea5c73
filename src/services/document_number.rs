use async_trait::async_trait;
use chrono::Utc;
use sea_orm::{ColumnTrait, DatabaseConnection, EntityTrait, PaginatorTrait, QueryFilter};
use std::sync::Arc;
use tracing::warn;

use crate::entities::{consumption_event, purchase};

/// Which human-readable document sequence to draw from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SequenceKind {
    Purchase,
    HealthEvent,
    FeedingEvent,
}

impl SequenceKind {
    pub fn prefix(&self) -> &'static str {
        match self {
            Self::Purchase => "COMPRA",
            Self::HealthEvent => "SANIDAD",
            Self::FeedingEvent => "ALIMENTO",
        }
    }
}

/// Produces the next document number for a sequence.
///
/// The trait exists so the count-based strategy below can be swapped for an
/// atomic database sequence without touching any caller.
#[async_trait]
pub trait DocumentSequence: Send + Sync {
    async fn next(&self, kind: SequenceKind) -> String;
}

/// Count-based generator: `PREFIX-NNNN` from the number of non-deleted rows.
///
/// Not collision-safe: two concurrent requests may read the same count and
/// produce the same number, and a reversal frees its number for reuse. No
/// database constraint enforces uniqueness; callers wanting a hard guarantee
/// swap in an atomic sequence behind the trait. When counting fails outright,
/// a timestamp-suffixed number is produced so record creation stays live.
pub struct CountingSequence {
    db: Arc<DatabaseConnection>,
}

impl CountingSequence {
    pub fn new(db: Arc<DatabaseConnection>) -> Self {
        Self { db }
    }

    async fn count(&self, kind: SequenceKind) -> Result<u64, sea_orm::DbErr> {
        let db = &*self.db;
        match kind {
            SequenceKind::Purchase => {
                purchase::Entity::find()
                    .filter(purchase::Column::DeletedAt.is_null())
                    .count(db)
                    .await
            }
            SequenceKind::HealthEvent => {
                consumption_event::Entity::find()
                    .filter(consumption_event::Column::EventType.eq("health"))
                    .filter(consumption_event::Column::DeletedAt.is_null())
                    .count(db)
                    .await
            }
            SequenceKind::FeedingEvent => {
                consumption_event::Entity::find()
                    .filter(consumption_event::Column::EventType.eq("feeding"))
                    .filter(consumption_event::Column::DeletedAt.is_null())
                    .count(db)
                    .await
            }
        }
    }
}

#[async_trait]
impl DocumentSequence for CountingSequence {
    async fn next(&self, kind: SequenceKind) -> String {
        match self.count(kind).await {
            Ok(count) => format_document_number(kind.prefix(), count),
            Err(e) => {
                warn!(
                    prefix = kind.prefix(),
                    "Sequence count failed ({}); falling back to timestamp suffix", e
                );
                fallback_document_number(kind.prefix())
            }
        }
    }
}

/// `PREFIX-NNNN` where NNNN is the existing count plus one, zero-padded.
pub fn format_document_number(prefix: &str, existing: u64) -> String {
    format!("{}-{:04}", prefix, existing + 1)
}

/// Liveness fallback: last four digits of the current epoch millis.
pub fn fallback_document_number(prefix: &str) -> String {
    let millis = Utc::now().timestamp_millis();
    format!("{}-{:04}", prefix, millis.rem_euclid(10_000))
}
