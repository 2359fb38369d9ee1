use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(Deals::Table)
                    .if_not_exists()
                    .col(ColumnDef::new(Deals::Id).uuid().not_null().primary_key())
                    .col(
                        ColumnDef::new(Deals::DealUniqueId)
                            .string_len(100)
                            .not_null(),
                    )
                    .col(ColumnDef::new(Deals::FromCurrency).string_len(3).not_null())
                    .col(ColumnDef::new(Deals::ToCurrency).string_len(3).not_null())
                    .col(
                        ColumnDef::new(Deals::DealTimestamp)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(Deals::Amount)
                            .decimal_len(20, 6)
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(Deals::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null()
                            .default(Expr::current_timestamp()),
                    )
                    .to_owned(),
            )
            .await?;

        // Source of truth for duplicate detection; the importer maps
        // violations of this index to a duplicate outcome.
        manager
            .create_index(
                Index::create()
                    .name("uq_deals_deal_unique_id")
                    .table(Deals::Table)
                    .col(Deals::DealUniqueId)
                    .unique()
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_deals_created_at")
                    .table(Deals::Table)
                    .col(Deals::CreatedAt)
                    .to_owned(),
            )
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(Deals::Table).to_owned())
            .await
    }
}

#[derive(Iden)]
enum Deals {
    Table,
    Id,
    DealUniqueId,
    FromCurrency,
    ToCurrency,
    DealTimestamp,
    Amount,
    CreatedAt,
}
