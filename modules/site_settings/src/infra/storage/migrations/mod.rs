//! Database migrations for site settings

use sea_orm_migration::prelude::*;

pub struct Migrator;

#[async_trait::async_trait]
impl MigratorTrait for Migrator {
    fn migrations() -> Vec<Box<dyn MigrationTrait>> {
        vec![Box::new(m20261016_000001_create_site_settings::Migration)]
    }
}

mod m20261016_000001_create_site_settings {
    use super::*;

    #[derive(DeriveMigrationName)]
    pub struct Migration;

    #[async_trait::async_trait]
    impl MigrationTrait for Migration {
        async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
            manager
                .create_table(
                    Table::create()
                        .table(SiteSettings::Table)
                        .if_not_exists()
                        .col(
                            ColumnDef::new(SiteSettings::Key)
                                .string()
                                .not_null()
                                .primary_key(),
                        )
                        .col(
                            ColumnDef::new(SiteSettings::Revision)
                                .big_integer()
                                .not_null()
                                .default(0),
                        )
                        .col(ColumnDef::new(SiteSettings::Data).text().not_null())
                        .col(
                            ColumnDef::new(SiteSettings::CreatedAt)
                                .timestamp_with_time_zone()
                                .not_null()
                                .default(Expr::current_timestamp()),
                        )
                        .col(
                            ColumnDef::new(SiteSettings::UpdatedAt)
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
                .drop_table(Table::drop().table(SiteSettings::Table).to_owned())
                .await
        }
    }

    #[derive(DeriveIden)]
    enum SiteSettings {
        Table,
        Key,
        Revision,
        Data,
        CreatedAt,
        UpdatedAt,
    }
}
