use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

use crate::{factura, producto};

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "item_factura")]
#[serde(rename_all = "camelCase")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,
    pub cantidad: i32,
    pub factura_id: i32,
    pub producto_id: i32,
}

#[derive(Copy, Clone, Debug, EnumIter)]
pub enum Relation {
    Factura,
    Producto,
}

impl RelationTrait for Relation {
    fn def(&self) -> RelationDef {
        match self {
            Relation::Factura => Entity::belongs_to(factura::Entity)
                .from(Column::FacturaId)
                .to(factura::Column::Id)
                .into(),
            Relation::Producto => Entity::belongs_to(producto::Entity)
                .from(Column::ProductoId)
                .to(producto::Column::Id)
                .into(),
        }
    }
}

impl Related<factura::Entity> for Entity {
    fn to() -> RelationDef { Relation::Factura.def() }
}

impl Related<producto::Entity> for Entity {
    fn to() -> RelationDef { Relation::Producto.def() }
}

impl ActiveModelBehavior for ActiveModel {}
