pub mod animal;
pub mod consumption_event;
pub mod consumption_line;
pub mod purchase;
pub mod purchase_line;
pub mod supplier;
pub mod supply_item;
