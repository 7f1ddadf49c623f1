//! Create `producto` catalog and seed it.
use sea_orm_migration::{prelude::*, schema::*};

const PRODUCTOS: [(&str, f64); 7] = [
    ("Panasonic Pantalla LCD", 259990.0),
    ("Sony Camara digital DSC-W320B", 123490.0),
    ("Apple iPod shuffle", 1499990.0),
    ("Sony Notebook Z110", 37990.0),
    ("Hewlett Packard Multifuncional F2280", 69990.0),
    ("Bianchi Bicicleta Aro 26", 69990.0),
    ("Mica Comoda 5 Cajones", 299990.0),
];

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(Producto::Table)
                    .if_not_exists()
                    .col(pk_auto(Producto::Id))
                    .col(string_len(Producto::Nombre, 255).not_null())
                    .col(double(Producto::Precio).not_null())
                    .col(date(Producto::CreateAt).not_null())
                    .to_owned(),
            )
            .await?;

        let mut seed = Query::insert();
        seed.into_table(Producto::Table)
            .columns([Producto::Nombre, Producto::Precio, Producto::CreateAt]);
        for (nombre, precio) in PRODUCTOS {
            seed.values([nombre.into(), precio.into(), Expr::current_date().into()])
                .map_err(|e| DbErr::Custom(e.to_string()))?;
        }
        manager.exec_stmt(seed).await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager.drop_table(Table::drop().table(Producto::Table).to_owned()).await
    }
}

#[derive(DeriveIden)]
enum Producto { Table, Id, Nombre, Precio, CreateAt }
