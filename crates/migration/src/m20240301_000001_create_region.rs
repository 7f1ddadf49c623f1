//! Create `region` table and seed the fixed list of regions.
//!
//! Regions are read-only reference data; the API never writes them.
use sea_orm_migration::{prelude::*, schema::*};

const REGIONES: [&str; 8] = [
    "Sudamérica",
    "Centroamérica",
    "Norteamérica",
    "Europa",
    "Asia",
    "África",
    "Oceanía",
    "Antártida",
];

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(Region::Table)
                    .if_not_exists()
                    .col(pk_auto(Region::Id))
                    .col(string_len(Region::Nombre, 64).not_null())
                    .to_owned(),
            )
            .await?;

        let mut seed = Query::insert();
        seed.into_table(Region::Table).columns([Region::Nombre]);
        for nombre in REGIONES {
            seed.values([nombre.into()])
                .map_err(|e| DbErr::Custom(e.to_string()))?;
        }
        manager.exec_stmt(seed).await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager.drop_table(Table::drop().table(Region::Table).to_owned()).await
    }
}

#[derive(DeriveIden)]
enum Region { Table, Id, Nombre }
