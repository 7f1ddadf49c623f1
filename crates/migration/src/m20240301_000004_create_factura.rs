//! Create `factura` (belongs to a cliente) and its `item_factura` lines.
//!
//! Deleting a cliente removes its facturas; deleting a factura removes its items.
//! Productos referenced by an item cannot be deleted.
use sea_orm_migration::{prelude::*, schema::*};

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(Factura::Table)
                    .if_not_exists()
                    .col(pk_auto(Factura::Id))
                    .col(string_len(Factura::Descripcion, 255).not_null())
                    .col(ColumnDef::new(Factura::Observacion).string_len(255).null())
                    .col(date(Factura::CreateAt).not_null())
                    .col(integer(Factura::ClienteId).not_null())
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_factura_cliente")
                            .from(Factura::Table, Factura::ClienteId)
                            .to(Cliente::Table, Cliente::Id)
                            .on_delete(ForeignKeyAction::Cascade)
                            .on_update(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(ItemFactura::Table)
                    .if_not_exists()
                    .col(pk_auto(ItemFactura::Id))
                    .col(integer(ItemFactura::Cantidad).not_null())
                    .col(integer(ItemFactura::FacturaId).not_null())
                    .col(integer(ItemFactura::ProductoId).not_null())
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_item_factura_factura")
                            .from(ItemFactura::Table, ItemFactura::FacturaId)
                            .to(Factura::Table, Factura::Id)
                            .on_delete(ForeignKeyAction::Cascade)
                            .on_update(ForeignKeyAction::Cascade),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_item_factura_producto")
                            .from(ItemFactura::Table, ItemFactura::ProductoId)
                            .to(Producto::Table, Producto::Id)
                            .on_delete(ForeignKeyAction::Restrict)
                            .on_update(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager.drop_table(Table::drop().table(ItemFactura::Table).to_owned()).await?;
        manager.drop_table(Table::drop().table(Factura::Table).to_owned()).await
    }
}

#[derive(DeriveIden)]
enum Factura { Table, Id, Descripcion, Observacion, CreateAt, ClienteId }

#[derive(DeriveIden)]
enum ItemFactura { Table, Id, Cantidad, FacturaId, ProductoId }

#[derive(DeriveIden)]
enum Cliente { Table, Id }

#[derive(DeriveIden)]
enum Producto { Table, Id }
