use sea_orm_migration::prelude::*;

pub struct Migrator;

#[async_trait::async_trait]
impl MigratorTrait for Migrator {
    fn migrations() -> Vec<Box<dyn MigrationTrait>> {
        vec![
            Box::new(m20260301_000001_create_reference_tables::Migration),
            Box::new(m20260301_000002_create_purchase_tables::Migration),
            Box::new(m20260301_000003_create_consumption_tables::Migration),
        ]
    }
}

// Migration implementations

mod m20260301_000001_create_reference_tables {

    use sea_orm_migration::prelude::*;

    pub struct Migration;

    impl MigrationName for Migration {
        fn name(&self) -> &str {
            "m20260301_000001_create_reference_tables"
        }
    }

    #[async_trait::async_trait]
    impl MigrationTrait for Migration {
        async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
            manager
                .create_table(
                    Table::create()
                        .table(Suppliers::Table)
                        .if_not_exists()
                        .col(
                            ColumnDef::new(Suppliers::Id)
                                .uuid()
                                .primary_key()
                                .not_null(),
                        )
                        .col(ColumnDef::new(Suppliers::Name).string().not_null())
                        .col(ColumnDef::new(Suppliers::Contact).string().null())
                        .col(ColumnDef::new(Suppliers::DeletedAt).timestamp().null())
                        .col(ColumnDef::new(Suppliers::CreatedAt).timestamp().not_null())
                        .col(ColumnDef::new(Suppliers::UpdatedAt).timestamp().not_null())
                        .to_owned(),
                )
                .await?;

            manager
                .create_table(
                    Table::create()
                        .table(SupplyItems::Table)
                        .if_not_exists()
                        .col(
                            ColumnDef::new(SupplyItems::Id)
                                .uuid()
                                .primary_key()
                                .not_null(),
                        )
                        .col(ColumnDef::new(SupplyItems::Name).string().not_null())
                        .col(ColumnDef::new(SupplyItems::Category).string().not_null())
                        .col(ColumnDef::new(SupplyItems::Unit).string().not_null())
                        .col(
                            ColumnDef::new(SupplyItems::QuantityOnHand)
                                .decimal()
                                .not_null()
                                .default(0),
                        )
                        .col(ColumnDef::new(SupplyItems::DeletedAt).timestamp().null())
                        .col(
                            ColumnDef::new(SupplyItems::CreatedAt)
                                .timestamp()
                                .not_null(),
                        )
                        .col(
                            ColumnDef::new(SupplyItems::UpdatedAt)
                                .timestamp()
                                .not_null(),
                        )
                        .to_owned(),
                )
                .await?;

            manager
                .create_table(
                    Table::create()
                        .table(Animals::Table)
                        .if_not_exists()
                        .col(ColumnDef::new(Animals::Id).uuid().primary_key().not_null())
                        .col(ColumnDef::new(Animals::Tag).string().not_null())
                        .col(ColumnDef::new(Animals::Name).string().null())
                        .col(ColumnDef::new(Animals::DeletedAt).timestamp().null())
                        .col(ColumnDef::new(Animals::CreatedAt).timestamp().not_null())
                        .col(ColumnDef::new(Animals::UpdatedAt).timestamp().not_null())
                        .to_owned(),
                )
                .await?;

            manager
                .create_index(
                    Index::create()
                        .if_not_exists()
                        .name("idx_supply_items_name")
                        .table(SupplyItems::Table)
                        .col(SupplyItems::Name)
                        .to_owned(),
                )
                .await?;

            Ok(())
        }

        async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
            manager
                .drop_table(Table::drop().table(Animals::Table).to_owned())
                .await?;
            manager
                .drop_table(Table::drop().table(SupplyItems::Table).to_owned())
                .await?;
            manager
                .drop_table(Table::drop().table(Suppliers::Table).to_owned())
                .await
        }
    }

    #[derive(Iden)]
    pub enum Suppliers {
        Table,
        Id,
        Name,
        Contact,
        DeletedAt,
        CreatedAt,
        UpdatedAt,
    }

    #[derive(Iden)]
    pub enum SupplyItems {
        Table,
        Id,
        Name,
        Category,
        Unit,
        QuantityOnHand,
        DeletedAt,
        CreatedAt,
        UpdatedAt,
    }

    #[derive(Iden)]
    pub enum Animals {
        Table,
        Id,
        Tag,
        Name,
        DeletedAt,
        CreatedAt,
        UpdatedAt,
    }
}

mod m20260301_000002_create_purchase_tables {

    use sea_orm_migration::prelude::*;

    pub struct Migration;

    impl MigrationName for Migration {
        fn name(&self) -> &str {
            "m20260301_000002_create_purchase_tables"
        }
    }

    #[async_trait::async_trait]
    impl MigrationTrait for Migration {
        async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
            manager
                .create_table(
                    Table::create()
                        .table(Purchases::Table)
                        .if_not_exists()
                        .col(
                            ColumnDef::new(Purchases::Id)
                                .uuid()
                                .primary_key()
                                .not_null(),
                        )
                        .col(
                            ColumnDef::new(Purchases::DocumentNumber)
                                .string()
                                .not_null(),
                        )
                        .col(ColumnDef::new(Purchases::SupplierId).uuid().not_null())
                        .col(ColumnDef::new(Purchases::PurchaseDate).date().not_null())
                        .col(ColumnDef::new(Purchases::Notes).string().null())
                        .col(ColumnDef::new(Purchases::DeletedAt).timestamp().null())
                        .col(ColumnDef::new(Purchases::CreatedAt).timestamp().not_null())
                        .col(ColumnDef::new(Purchases::UpdatedAt).timestamp().not_null())
                        .to_owned(),
                )
                .await?;

            manager
                .create_table(
                    Table::create()
                        .table(PurchaseLines::Table)
                        .if_not_exists()
                        .col(
                            ColumnDef::new(PurchaseLines::Id)
                                .uuid()
                                .primary_key()
                                .not_null(),
                        )
                        .col(ColumnDef::new(PurchaseLines::PurchaseId).uuid().not_null())
                        .col(
                            ColumnDef::new(PurchaseLines::SupplyItemId)
                                .uuid()
                                .not_null(),
                        )
                        .col(
                            ColumnDef::new(PurchaseLines::UnitPrice)
                                .decimal()
                                .not_null(),
                        )
                        .col(
                            ColumnDef::new(PurchaseLines::Quantity)
                                .decimal()
                                .not_null(),
                        )
                        .col(ColumnDef::new(PurchaseLines::DeletedAt).timestamp().null())
                        .col(
                            ColumnDef::new(PurchaseLines::CreatedAt)
                                .timestamp()
                                .not_null(),
                        )
                        .foreign_key(
                            ForeignKey::create()
                                .name("fk_purchase_lines_purchase")
                                .from(PurchaseLines::Table, PurchaseLines::PurchaseId)
                                .to(Purchases::Table, Purchases::Id),
                        )
                        .to_owned(),
                )
                .await?;

            // Lookup index only. The count-based generator reuses the numbers
            // of reversed purchases, so uniqueness is not enforced here; see
            // the document number service.
            manager
                .create_index(
                    Index::create()
                        .if_not_exists()
                        .name("idx_purchases_document_number")
                        .table(Purchases::Table)
                        .col(Purchases::DocumentNumber)
                        .to_owned(),
                )
                .await?;

            // One line per supply item within a purchase.
            manager
                .create_index(
                    Index::create()
                        .if_not_exists()
                        .name("idx_purchase_lines_purchase_supply")
                        .table(PurchaseLines::Table)
                        .col(PurchaseLines::PurchaseId)
                        .col(PurchaseLines::SupplyItemId)
                        .unique()
                        .to_owned(),
                )
                .await?;

            manager
                .create_index(
                    Index::create()
                        .if_not_exists()
                        .name("idx_purchases_supplier_id")
                        .table(Purchases::Table)
                        .col(Purchases::SupplierId)
                        .to_owned(),
                )
                .await?;

            Ok(())
        }

        async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
            manager
                .drop_table(Table::drop().table(PurchaseLines::Table).to_owned())
                .await?;
            manager
                .drop_table(Table::drop().table(Purchases::Table).to_owned())
                .await
        }
    }

    #[derive(Iden)]
    pub enum Purchases {
        Table,
        Id,
        DocumentNumber,
        SupplierId,
        PurchaseDate,
        Notes,
        DeletedAt,
        CreatedAt,
        UpdatedAt,
    }

    #[derive(Iden)]
    pub enum PurchaseLines {
        Table,
        Id,
        PurchaseId,
        SupplyItemId,
        UnitPrice,
        Quantity,
        DeletedAt,
        CreatedAt,
    }
}

mod m20260301_000003_create_consumption_tables {

    use sea_orm_migration::prelude::*;

    pub struct Migration;

    impl MigrationName for Migration {
        fn name(&self) -> &str {
            "m20260301_000003_create_consumption_tables"
        }
    }

    #[async_trait::async_trait]
    impl MigrationTrait for Migration {
        async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
            manager
                .create_table(
                    Table::create()
                        .table(ConsumptionEvents::Table)
                        .if_not_exists()
                        .col(
                            ColumnDef::new(ConsumptionEvents::Id)
                                .uuid()
                                .primary_key()
                                .not_null(),
                        )
                        .col(
                            ColumnDef::new(ConsumptionEvents::DocumentNumber)
                                .string()
                                .not_null(),
                        )
                        .col(
                            ColumnDef::new(ConsumptionEvents::EventType)
                                .string()
                                .not_null(),
                        )
                        .col(
                            ColumnDef::new(ConsumptionEvents::AnimalId)
                                .uuid()
                                .not_null(),
                        )
                        .col(
                            ColumnDef::new(ConsumptionEvents::EventDate)
                                .date()
                                .not_null(),
                        )
                        .col(
                            ColumnDef::new(ConsumptionEvents::Status)
                                .string()
                                .not_null(),
                        )
                        .col(ColumnDef::new(ConsumptionEvents::Notes).string().null())
                        .col(
                            ColumnDef::new(ConsumptionEvents::DeletedAt)
                                .timestamp()
                                .null(),
                        )
                        .col(
                            ColumnDef::new(ConsumptionEvents::CreatedAt)
                                .timestamp()
                                .not_null(),
                        )
                        .col(
                            ColumnDef::new(ConsumptionEvents::UpdatedAt)
                                .timestamp()
                                .not_null(),
                        )
                        .to_owned(),
                )
                .await?;

            manager
                .create_table(
                    Table::create()
                        .table(ConsumptionLines::Table)
                        .if_not_exists()
                        .col(
                            ColumnDef::new(ConsumptionLines::Id)
                                .uuid()
                                .primary_key()
                                .not_null(),
                        )
                        .col(ColumnDef::new(ConsumptionLines::EventId).uuid().not_null())
                        .col(
                            ColumnDef::new(ConsumptionLines::SupplyItemId)
                                .uuid()
                                .not_null(),
                        )
                        .col(
                            ColumnDef::new(ConsumptionLines::Quantity)
                                .integer()
                                .not_null(),
                        )
                        .col(
                            ColumnDef::new(ConsumptionLines::DeletedAt)
                                .timestamp()
                                .null(),
                        )
                        .col(
                            ColumnDef::new(ConsumptionLines::CreatedAt)
                                .timestamp()
                                .not_null(),
                        )
                        .foreign_key(
                            ForeignKey::create()
                                .name("fk_consumption_lines_event")
                                .from(ConsumptionLines::Table, ConsumptionLines::EventId)
                                .to(ConsumptionEvents::Table, ConsumptionEvents::Id),
                        )
                        .to_owned(),
                )
                .await?;

            manager
                .create_index(
                    Index::create()
                        .if_not_exists()
                        .name("idx_consumption_events_document_number")
                        .table(ConsumptionEvents::Table)
                        .col(ConsumptionEvents::DocumentNumber)
                        .to_owned(),
                )
                .await?;

            manager
                .create_index(
                    Index::create()
                        .if_not_exists()
                        .name("idx_consumption_lines_event_supply")
                        .table(ConsumptionLines::Table)
                        .col(ConsumptionLines::EventId)
                        .col(ConsumptionLines::SupplyItemId)
                        .unique()
                        .to_owned(),
                )
                .await?;

            manager
                .create_index(
                    Index::create()
                        .if_not_exists()
                        .name("idx_consumption_events_animal_id")
                        .table(ConsumptionEvents::Table)
                        .col(ConsumptionEvents::AnimalId)
                        .to_owned(),
                )
                .await?;

            Ok(())
        }

        async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
            manager
                .drop_table(Table::drop().table(ConsumptionLines::Table).to_owned())
                .await?;
            manager
                .drop_table(Table::drop().table(ConsumptionEvents::Table).to_owned())
                .await
        }
    }

    #[derive(Iden)]
    pub enum ConsumptionEvents {
        Table,
        Id,
        DocumentNumber,
        EventType,
        AnimalId,
        EventDate,
        Status,
        Notes,
        DeletedAt,
        CreatedAt,
        UpdatedAt,
    }

    #[derive(Iden)]
    pub enum ConsumptionLines {
        Table,
        Id,
        EventId,
        SupplyItemId,
        Quantity,
        DeletedAt,
        CreatedAt,
    }
}
