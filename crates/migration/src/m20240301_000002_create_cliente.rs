//! Create `cliente` table with an optional FK to `region`.
//!
//! `foto` holds the logical photo name under the upload root.
use sea_orm_migration::{prelude::*, schema::*};

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(Cliente::Table)
                    .if_not_exists()
                    .col(pk_auto(Cliente::Id))
                    .col(string_len(Cliente::Nombre, 64).not_null())
                    .col(string_len(Cliente::Apellido, 128).not_null())
                    .col(string_len(Cliente::Email, 255).unique_key().not_null())
                    .col(date(Cliente::CreateAt).not_null())
                    .col(ColumnDef::new(Cliente::Foto).string_len(255).null())
                    .col(ColumnDef::new(Cliente::RegionId).integer().null())
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_cliente_region")
                            .from(Cliente::Table, Cliente::RegionId)
                            .to(Region::Table, Region::Id)
                            .on_delete(ForeignKeyAction::SetNull)
                            .on_update(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager.drop_table(Table::drop().table(Cliente::Table).to_owned()).await
    }
}

#[derive(DeriveIden)]
enum Cliente { Table, Id, Nombre, Apellido, Email, CreateAt, Foto, RegionId }

#[derive(DeriveIden)]
enum Region { Table, Id }
