use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use tokio::sync::mpsc;
use tracing::{info, warn};
use uuid::Uuid;

/// Events emitted after committed ledger operations. Consumers are
/// best-effort; a full channel never fails the originating request.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum Event {
    PurchaseRecorded {
        purchase_id: Uuid,
        document_number: String,
    },
    PurchaseReversed {
        purchase_id: Uuid,
    },
    ConsumptionRecorded {
        event_id: Uuid,
        document_number: String,
    },
    ConsumptionReversed {
        event_id: Uuid,
    },
    ConsumptionStatusChanged {
        event_id: Uuid,
        old_status: String,
        new_status: String,
    },
    StockAdjusted {
        supply_item_id: Uuid,
        delta: Decimal,
        new_quantity: Decimal,
    },
}

#[derive(Debug, Clone)]
pub struct EventSender {
    sender: mpsc::Sender<Event>,
}

impl EventSender {
    /// Creates a new EventSender
    pub fn new(sender: mpsc::Sender<Event>) -> Self {
        Self { sender }
    }

    /// Sends an event asynchronously
    pub async fn send(&self, event: Event) -> Result<(), String> {
        self.sender
            .send(event)
            .await
            .map_err(|e| format!("Failed to send event: {}", e))
    }

    /// Sends an event, logging instead of failing when the channel is closed.
    pub async fn send_or_log(&self, event: Event) {
        if let Err(e) = self.send(event.clone()).await {
            warn!(?event, "Event delivery failed: {}", e);
        }
    }
}

/// Consumes events from the channel and logs them. Downstream integrations
/// (reporting, notifications) hang off this loop.
pub async fn process_events(mut receiver: mpsc::Receiver<Event>) {
    while let Some(event) = receiver.recv().await {
        match &event {
            Event::PurchaseRecorded {
                purchase_id,
                document_number,
            } => info!(%purchase_id, %document_number, "Purchase recorded"),
            Event::PurchaseReversed { purchase_id } => {
                info!(%purchase_id, "Purchase reversed")
            }
            Event::ConsumptionRecorded {
                event_id,
                document_number,
            } => info!(%event_id, %document_number, "Consumption event recorded"),
            Event::ConsumptionReversed { event_id } => {
                info!(%event_id, "Consumption event reversed")
            }
            Event::ConsumptionStatusChanged {
                event_id,
                old_status,
                new_status,
            } => info!(%event_id, %old_status, %new_status, "Event status changed"),
            Event::StockAdjusted {
                supply_item_id,
                delta,
                new_quantity,
            } => info!(%supply_item_id, %delta, %new_quantity, "Stock adjusted"),
        }
    }
    info!("Event channel closed; processor exiting");
}
