use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// A stock-debiting event against one animal: a health treatment or a
/// feeding. Only the `status` field may change after creation; line items
/// and stock are immutable until the event is reversed.
#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "consumption_events")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    pub document_number: String,
    pub event_type: String,
    pub animal_id: Uuid,
    pub event_date: Date,
    pub status: String,
    pub notes: Option<String>,
    pub deleted_at: Option<DateTimeUtc>,
    pub created_at: DateTimeUtc,
    pub updated_at: DateTimeUtc,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::animal::Entity",
        from = "Column::AnimalId",
        to = "super::animal::Column::Id"
    )]
    Animal,
    #[sea_orm(has_many = "super::consumption_line::Entity")]
    Lines,
}

impl Related<super::animal::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Animal.def()
    }
}

impl Related<super::consumption_line::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Lines.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
