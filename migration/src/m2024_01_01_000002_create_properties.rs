//! Migration to create the properties table.
//!
//! Listings reference their owning user with `NO ACTION` on delete, so a user
//! that still owns listings cannot be removed. Slug and ref code are unique.

use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(Properties::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(Properties::Id)
                            .uuid()
                            .not_null()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(Properties::UserId).uuid().not_null())
                    .col(ColumnDef::new(Properties::Title).string_len(250).not_null())
                    .col(ColumnDef::new(Properties::Slug).string_len(50).not_null())
                    .col(ColumnDef::new(Properties::RefCode).string_len(255).not_null())
                    .col(
                        ColumnDef::new(Properties::Description)
                            .text()
                            .not_null()
                            .default(""),
                    )
                    .col(
                        ColumnDef::new(Properties::Country)
                            .string_len(2)
                            .not_null()
                            .default("RU"),
                    )
                    .col(
                        ColumnDef::new(Properties::City)
                            .string_len(180)
                            .not_null()
                            .default("Moscow"),
                    )
                    .col(
                        ColumnDef::new(Properties::PostalCode)
                            .string_len(100)
                            .not_null()
                            .default("140000"),
                    )
                    .col(
                        ColumnDef::new(Properties::StreetAddress)
                            .string_len(180)
                            .not_null()
                            .default("Tverskaya"),
                    )
                    .col(
                        ColumnDef::new(Properties::PropertyNumber)
                            .integer()
                            .not_null()
                            .default(11),
                    )
                    .col(
                        ColumnDef::new(Properties::Price)
                            .decimal_len(8, 2)
                            .not_null()
                            .default(0),
                    )
                    .col(
                        ColumnDef::new(Properties::Tax)
                            .decimal_len(6, 2)
                            .not_null()
                            .default(0.13),
                    )
                    .col(
                        ColumnDef::new(Properties::PlotArea)
                            .decimal_len(8, 2)
                            .not_null()
                            .default(0),
                    )
                    .col(
                        ColumnDef::new(Properties::TotalFloors)
                            .integer()
                            .not_null()
                            .default(0),
                    )
                    .col(
                        ColumnDef::new(Properties::Bedrooms)
                            .integer()
                            .not_null()
                            .default(1),
                    )
                    .col(
                        ColumnDef::new(Properties::Bathrooms)
                            .decimal_len(4, 2)
                            .not_null()
                            .default(1.0),
                    )
                    .col(
                        ColumnDef::new(Properties::AdvertType)
                            .string_len(50)
                            .not_null()
                            .default("For Sale"),
                    )
                    .col(
                        ColumnDef::new(Properties::PropertyType)
                            .string_len(50)
                            .not_null()
                            .default("Other"),
                    )
                    .col(ColumnDef::new(Properties::CoverPhoto).text().null())
                    .col(ColumnDef::new(Properties::Photo1).text().null())
                    .col(ColumnDef::new(Properties::Photo2).text().null())
                    .col(ColumnDef::new(Properties::Photo3).text().null())
                    .col(ColumnDef::new(Properties::Photo4).text().null())
                    .col(
                        ColumnDef::new(Properties::PublishedStatus)
                            .boolean()
                            .not_null()
                            .default(false),
                    )
                    .col(
                        ColumnDef::new(Properties::Views)
                            .integer()
                            .not_null()
                            .default(0),
                    )
                    .col(
                        ColumnDef::new(Properties::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null()
                            .default(Expr::current_timestamp()),
                    )
                    .col(
                        ColumnDef::new(Properties::UpdatedAt)
                            .timestamp_with_time_zone()
                            .not_null()
                            .default(Expr::current_timestamp()),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_properties_user_id")
                            .from(Properties::Table, Properties::UserId)
                            .to(Users::Table, Users::Id)
                            .on_delete(ForeignKeyAction::NoAction),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_properties_slug")
                    .table(Properties::Table)
                    .col(Properties::Slug)
                    .unique()
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_properties_ref_code")
                    .table(Properties::Table)
                    .col(Properties::RefCode)
                    .unique()
                    .to_owned(),
            )
            .await?;

        // Published listing queries filter on this column
        manager
            .create_index(
                Index::create()
                    .name("idx_properties_published_status")
                    .table(Properties::Table)
                    .col(Properties::PublishedStatus)
                    .to_owned(),
            )
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        for name in [
            "idx_properties_published_status",
            "idx_properties_ref_code",
            "idx_properties_slug",
        ] {
            manager
                .drop_index(Index::drop().name(name).to_owned())
                .await?;
        }

        manager
            .drop_table(Table::drop().table(Properties::Table).to_owned())
            .await
    }
}

#[derive(DeriveIden)]
enum Properties {
    Table,
    Id,
    UserId,
    Title,
    Slug,
    RefCode,
    Description,
    Country,
    City,
    PostalCode,
    StreetAddress,
    PropertyNumber,
    Price,
    Tax,
    PlotArea,
    TotalFloors,
    Bedrooms,
    Bathrooms,
    AdvertType,
    PropertyType,
    CoverPhoto,
    Photo1,
    Photo2,
    Photo3,
    Photo4,
    PublishedStatus,
    Views,
    CreatedAt,
    UpdatedAt,
}

#[derive(DeriveIden)]
enum Users {
    Table,
    Id,
}
