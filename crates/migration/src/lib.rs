//! Migrator registering entity-specific migrations in dependency order.
//! Indexes are applied last.
pub use sea_orm_migration::prelude::*;

mod m20240301_000001_create_region;
mod m20240301_000002_create_cliente;
mod m20240301_000003_create_producto;
mod m20240301_000004_create_factura;
mod m20240301_000005_add_indexes;

pub struct Migrator;

#[async_trait::async_trait]
impl MigratorTrait for Migrator {
    fn migrations() -> Vec<Box<dyn MigrationTrait>> {
        vec![
            Box::new(m20240301_000001_create_region::Migration),
            Box::new(m20240301_000002_create_cliente::Migration),
            Box::new(m20240301_000003_create_producto::Migration),
            Box::new(m20240301_000004_create_factura::Migration),
            // Indexes should always be applied last
            Box::new(m20240301_000005_add_indexes::Migration),
        ]
    }
}
