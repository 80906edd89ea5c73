pub mod common;
pub mod consumption;
pub mod purchases;
pub mod supplies;

use std::sync::Arc;

use sea_orm::DatabaseConnection;

use crate::{
    config::AppConfig,
    events::EventSender,
    services::{
        consumption::ConsumptionService,
        document_number::{CountingSequence, DocumentSequence},
        purchases::PurchaseService,
        stock::StockService,
        supplies::SupplyService,
    },
};

// Re-export AppState so handler modules can import it as crate::handlers::AppState
pub use crate::AppState;

/// Services layer that encapsulates business logic used by HTTP handlers
#[derive(Clone)]
pub struct AppServices {
    pub purchases: Arc<PurchaseService>,
    pub consumption: Arc<ConsumptionService>,
    pub supplies: Arc<SupplyService>,
}

impl AppServices {
    /// Wires the service graph: one shared stock register and one document
    /// sequence, both used by the purchase and consumption services.
    pub fn new(
        db: Arc<DatabaseConnection>,
        config: &AppConfig,
        event_sender: Option<EventSender>,
    ) -> Self {
        let stock = StockService::new(config.stock_minimum_floor);
        let sequence: Arc<dyn DocumentSequence> = Arc::new(CountingSequence::new(db.clone()));

        let purchases = Arc::new(PurchaseService::new(
            db.clone(),
            stock.clone(),
            sequence.clone(),
            event_sender.clone(),
        ));
        let consumption = Arc::new(ConsumptionService::new(
            db.clone(),
            stock.clone(),
            sequence,
            event_sender,
        ));
        let supplies = Arc::new(SupplyService::new(db, config.stock_minimum_floor));

        Self {
            purchases,
            consumption,
            supplies,
        }
    }
}
