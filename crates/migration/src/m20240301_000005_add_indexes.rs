use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        // Cliente: index on region_id
        manager
            .create_index(
                Index::create()
                    .if_not_exists()
                    .name("idx_cliente_region")
                    .table(Cliente::Table)
                    .col(Cliente::RegionId)
                    .to_owned(),
            )
            .await?;

        // Cliente: lookups by apellido for listing/sorting
        manager
            .create_index(
                Index::create()
                    .if_not_exists()
                    .name("idx_cliente_apellido")
                    .table(Cliente::Table)
                    .col(Cliente::Apellido)
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_index(Index::drop().name("idx_cliente_apellido").table(Cliente::Table).to_owned())
            .await?;
        manager
            .drop_index(Index::drop().name("idx_cliente_region").table(Cliente::Table).to_owned())
            .await
    }
}

#[derive(DeriveIden)]
enum Cliente { Table, RegionId, Apellido }
