//! Migration to create the property_views table.
//!
//! One row per recorded visitor view; rows are removed with their property.

use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(PropertyViews::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(PropertyViews::Id)
                            .uuid()
                            .not_null()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(PropertyViews::Ip).string_len(250).not_null())
                    .col(ColumnDef::new(PropertyViews::PropertyId).uuid().not_null())
                    .col(
                        ColumnDef::new(PropertyViews::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null()
                            .default(Expr::current_timestamp()),
                    )
                    .col(
                        ColumnDef::new(PropertyViews::UpdatedAt)
                            .timestamp_with_time_zone()
                            .not_null()
                            .default(Expr::current_timestamp()),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_property_views_property_id")
                            .from(PropertyViews::Table, PropertyViews::PropertyId)
                            .to(Properties::Table, Properties::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        // Lookup for the (property, visitor) dedup check
        manager
            .create_index(
                Index::create()
                    .name("idx_property_views_property_ip")
                    .table(PropertyViews::Table)
                    .col(PropertyViews::PropertyId)
                    .col(PropertyViews::Ip)
                    .to_owned(),
            )
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_index(
                Index::drop()
                    .name("idx_property_views_property_ip")
                    .to_owned(),
            )
            .await?;

        manager
            .drop_table(Table::drop().table(PropertyViews::Table).to_owned())
            .await
    }
}

#[derive(DeriveIden)]
enum PropertyViews {
    Table,
    Id,
    Ip,
    PropertyId,
    CreatedAt,
    UpdatedAt,
}

#[derive(DeriveIden)]
enum Properties {
    Table,
    Id,
}
