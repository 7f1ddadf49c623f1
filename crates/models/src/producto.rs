use sea_orm::{
    entity::prelude::*,
    sea_query::{Expr, Func, LikeExpr},
    DatabaseConnection, QueryOrder,
};
use serde::{Deserialize, Serialize};

use crate::{errors, item_factura};

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "producto")]
#[serde(rename_all = "camelCase")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,
    pub nombre: String,
    pub precio: f64,
    pub create_at: Date,
}

#[derive(Copy, Clone, Debug, EnumIter)]
pub enum Relation {
    ItemFactura,
}

impl RelationTrait for Relation {
    fn def(&self) -> RelationDef {
        match self { Relation::ItemFactura => Entity::has_many(item_factura::Entity).into() }
    }
}

impl Related<item_factura::Entity> for Entity {
    fn to() -> RelationDef { Relation::ItemFactura.def() }
}

impl ActiveModelBehavior for ActiveModel {}

fn db_err(e: DbErr) -> errors::ModelError {
    errors::ModelError::Db(e.to_string())
}

/// `%` and `_` in user input match literally.
fn escape_like(term: &str) -> String {
    let mut out = String::with_capacity(term.len());
    for c in term.chars() {
        if matches!(c, '%' | '_' | '\\') {
            out.push('\\');
        }
        out.push(c);
    }
    out
}

pub async fn find_by_id(db: &DatabaseConnection, id: i32) -> Result<Option<Model>, errors::ModelError> {
    Entity::find_by_id(id).one(db).await.map_err(db_err)
}

/// `nombre LIKE %term%`; case sensitivity follows the database collation.
pub async fn find_by_nombre(db: &DatabaseConnection, term: &str) -> Result<Vec<Model>, errors::ModelError> {
    let pattern = format!("%{}%", escape_like(term));
    Entity::find()
        .filter(Expr::col(Column::Nombre).like(LikeExpr::new(pattern).escape('\\')))
        .order_by_asc(Column::Id)
        .all(db)
        .await
        .map_err(db_err)
}

/// Case-insensitive match anywhere in `nombre`.
pub async fn find_by_nombre_containing_ignore_case(
    db: &DatabaseConnection,
    term: &str,
) -> Result<Vec<Model>, errors::ModelError> {
    lower_like(db, format!("%{}%", escape_like(&term.to_lowercase()))).await
}

/// Case-insensitive prefix match on `nombre`.
pub async fn find_by_nombre_starting_with_ignore_case(
    db: &DatabaseConnection,
    term: &str,
) -> Result<Vec<Model>, errors::ModelError> {
    lower_like(db, format!("{}%", escape_like(&term.to_lowercase()))).await
}

async fn lower_like(db: &DatabaseConnection, pattern: String) -> Result<Vec<Model>, errors::ModelError> {
    Entity::find()
        .filter(Expr::expr(Func::lower(Expr::col(Column::Nombre))).like(LikeExpr::new(pattern).escape('\\')))
        .order_by_asc(Column::Id)
        .all(db)
        .await
        .map_err(db_err)
}
