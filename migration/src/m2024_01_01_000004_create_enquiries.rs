//! Migration to create the enquiries table.

use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(Enquiries::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(Enquiries::Id)
                            .uuid()
                            .not_null()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(Enquiries::Name).string_len(100).not_null())
                    .col(ColumnDef::new(Enquiries::Number).string_len(100).null())
                    .col(
                        ColumnDef::new(Enquiries::PhoneNumber)
                            .string_len(30)
                            .not_null(),
                    )
                    .col(ColumnDef::new(Enquiries::Email).string_len(254).null())
                    .col(
                        ColumnDef::new(Enquiries::Subject)
                            .string_len(100)
                            .not_null()
                            .default(""),
                    )
                    .col(ColumnDef::new(Enquiries::Message).text().not_null())
                    .col(
                        ColumnDef::new(Enquiries::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null()
                            .default(Expr::current_timestamp()),
                    )
                    .col(
                        ColumnDef::new(Enquiries::UpdatedAt)
                            .timestamp_with_time_zone()
                            .not_null()
                            .default(Expr::current_timestamp()),
                    )
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(Enquiries::Table).to_owned())
            .await
    }
}

#[derive(DeriveIden)]
enum Enquiries {
    Table,
    Id,
    Name,
    Number,
    PhoneNumber,
    Email,
    Subject,
    Message,
    CreatedAt,
    UpdatedAt,
}
