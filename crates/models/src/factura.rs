//! Facturas and their line items.
//!
//! Writes take any `ConnectionTrait` so callers can run them inside a transaction.
use sea_orm::{entity::prelude::*, ConnectionTrait, QueryOrder, Set};
use serde::{Deserialize, Serialize};

use crate::cliente::{self, field_error};
use crate::{errors, item_factura, producto};

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "factura")]
#[serde(rename_all = "camelCase")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,
    pub descripcion: String,
    pub observacion: Option<String>,
    pub create_at: Date,
    pub cliente_id: i32,
}

#[derive(Copy, Clone, Debug, EnumIter)]
pub enum Relation {
    Cliente,
    Items,
}

impl RelationTrait for Relation {
    fn def(&self) -> RelationDef {
        match self {
            Relation::Cliente => Entity::belongs_to(cliente::Entity)
                .from(Column::ClienteId)
                .to(cliente::Column::Id)
                .into(),
            Relation::Items => Entity::has_many(item_factura::Entity).into(),
        }
    }
}

impl Related<cliente::Entity> for Entity {
    fn to() -> RelationDef { Relation::Cliente.def() }
}

impl Related<item_factura::Entity> for Entity {
    fn to() -> RelationDef { Relation::Items.def() }
}

impl ActiveModelBehavior for ActiveModel {}

/// `{"id": ..}` reference inside a request body; other keys are ignored.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct IdRef {
    pub id: i32,
}

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ItemForm {
    #[serde(default)]
    pub cantidad: Option<i32>,
    #[serde(default)]
    pub producto: Option<IdRef>,
}

/// Request body for creating a factura. `createAt` is assigned on insert.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FacturaForm {
    #[serde(default)]
    pub descripcion: Option<String>,
    #[serde(default)]
    pub observacion: Option<String>,
    #[serde(default)]
    pub cliente: Option<IdRef>,
    #[serde(default)]
    pub items: Vec<ItemForm>,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ItemFields {
    pub producto_id: i32,
    pub cantidad: i32,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct FacturaFields {
    pub descripcion: String,
    pub observacion: Option<String>,
    pub create_at: Date,
    pub cliente_id: i32,
    pub items: Vec<ItemFields>,
}

impl FacturaForm {
    pub fn validate(&self, create_at: Date) -> Result<FacturaFields, errors::ModelError> {
        let mut errs = Vec::new();

        let descripcion = self.descripcion.as_deref().map(str::trim).unwrap_or_default();
        if descripcion.is_empty() {
            errs.push(field_error("descripcion", "no puede estar vacio"));
        }
        if self.cliente.is_none() {
            errs.push(field_error("cliente", "no puede estar vacio"));
        }
        if self.items.is_empty() {
            errs.push(field_error("items", "no puede estar vacio"));
        }

        let mut items = Vec::with_capacity(self.items.len());
        for (i, item) in self.items.iter().enumerate() {
            let cantidad = match item.cantidad {
                Some(c) if c > 0 => Some(c),
                Some(_) => { errs.push(field_error(&format!("items[{}].cantidad", i), "debe ser mayor que 0")); None }
                None => { errs.push(field_error(&format!("items[{}].cantidad", i), "no puede estar vacio")); None }
            };
            if item.producto.is_none() {
                errs.push(field_error(&format!("items[{}].producto", i), "no puede estar vacio"));
            }
            if let (Some(cantidad), Some(p)) = (cantidad, item.producto.as_ref()) {
                items.push(ItemFields { producto_id: p.id, cantidad });
            }
        }

        match (errs.is_empty(), self.cliente.as_ref()) {
            (true, Some(c)) => Ok(FacturaFields {
                descripcion: descripcion.to_string(),
                observacion: self
                    .observacion
                    .as_deref()
                    .map(str::trim)
                    .filter(|o| !o.is_empty())
                    .map(str::to_string),
                create_at,
                cliente_id: c.id,
                items,
            }),
            _ => Err(errors::ModelError::InvalidFields(errs)),
        }
    }
}

/// Line as returned over HTTP; `importe` is `cantidad * precio`.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ItemFacturaDto {
    pub id: i32,
    pub cantidad: i32,
    pub producto: producto::Model,
    pub importe: f64,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FacturaDto {
    pub id: i32,
    pub descripcion: String,
    pub observacion: Option<String>,
    pub create_at: Date,
    pub cliente_id: i32,
    pub items: Vec<ItemFacturaDto>,
    pub total: f64,
}

impl FacturaDto {
    pub fn from_parts(f: Model, lines: Vec<(item_factura::Model, producto::Model)>) -> Self {
        let items: Vec<ItemFacturaDto> = lines
            .into_iter()
            .map(|(item, producto)| ItemFacturaDto {
                id: item.id,
                cantidad: item.cantidad,
                importe: f64::from(item.cantidad) * producto.precio,
                producto,
            })
            .collect();
        let total = items.iter().map(|i| i.importe).sum();
        Self {
            id: f.id,
            descripcion: f.descripcion,
            observacion: f.observacion,
            create_at: f.create_at,
            cliente_id: f.cliente_id,
            items,
            total,
        }
    }
}

fn db_err(e: DbErr) -> errors::ModelError {
    errors::ModelError::Db(e.to_string())
}

/// Insert the factura row and one row per item.
pub async fn create_with_items<C: ConnectionTrait>(
    db: &C,
    fields: FacturaFields,
) -> Result<(Model, Vec<item_factura::Model>), errors::ModelError> {
    let factura = ActiveModel {
        descripcion: Set(fields.descripcion),
        observacion: Set(fields.observacion),
        create_at: Set(fields.create_at),
        cliente_id: Set(fields.cliente_id),
        ..Default::default()
    }
    .insert(db)
    .await
    .map_err(db_err)?;

    let mut items = Vec::with_capacity(fields.items.len());
    for item in fields.items {
        let am = item_factura::ActiveModel {
            cantidad: Set(item.cantidad),
            factura_id: Set(factura.id),
            producto_id: Set(item.producto_id),
            ..Default::default()
        };
        items.push(am.insert(db).await.map_err(db_err)?);
    }
    Ok((factura, items))
}

pub async fn find_by_id<C: ConnectionTrait>(db: &C, id: i32) -> Result<Option<Model>, errors::ModelError> {
    Entity::find_by_id(id).one(db).await.map_err(db_err)
}

pub async fn find_by_cliente<C: ConnectionTrait>(db: &C, cliente_id: i32) -> Result<Vec<Model>, errors::ModelError> {
    Entity::find()
        .filter(Column::ClienteId.eq(cliente_id))
        .order_by_asc(Column::Id)
        .all(db)
        .await
        .map_err(db_err)
}

/// Items of a factura joined with their producto, in insertion order.
pub async fn items_with_producto<C: ConnectionTrait>(
    db: &C,
    factura_id: i32,
) -> Result<Vec<(item_factura::Model, producto::Model)>, errors::ModelError> {
    let rows = item_factura::Entity::find()
        .filter(item_factura::Column::FacturaId.eq(factura_id))
        .find_also_related(producto::Entity)
        .order_by_asc(item_factura::Column::Id)
        .all(db)
        .await
        .map_err(db_err)?;
    rows.into_iter()
        .map(|(item, producto)| match producto {
            Some(p) => Ok((item, p)),
            None => Err(errors::ModelError::Db(format!("producto {} no existe", item.producto_id))),
        })
        .collect()
}

/// Delete the items then the factura. Returns whether the factura existed.
pub async fn delete_with_items<C: ConnectionTrait>(db: &C, id: i32) -> Result<bool, errors::ModelError> {
    item_factura::Entity::delete_many()
        .filter(item_factura::Column::FacturaId.eq(id))
        .exec(db)
        .await
        .map_err(db_err)?;
    let res = Entity::delete_by_id(id).exec(db).await.map_err(db_err)?;
    Ok(res.rows_affected > 0)
}
