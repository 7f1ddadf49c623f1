use sea_orm::{entity::prelude::*, DatabaseConnection, QueryOrder};
use serde::{Deserialize, Serialize};

use crate::{cliente, errors};

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "region")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,
    pub nombre: String,
}

#[derive(Copy, Clone, Debug, EnumIter)]
pub enum Relation {
    Cliente,
}

impl RelationTrait for Relation {
    fn def(&self) -> RelationDef {
        match self { Relation::Cliente => Entity::has_many(cliente::Entity).into() }
    }
}

impl Related<cliente::Entity> for Entity {
    fn to() -> RelationDef { Relation::Cliente.def() }
}

impl ActiveModelBehavior for ActiveModel {}

/// All regions ordered by id.
pub async fn find_all(db: &DatabaseConnection) -> Result<Vec<Model>, errors::ModelError> {
    Entity::find()
        .order_by_asc(Column::Id)
        .all(db)
        .await
        .map_err(|e| errors::ModelError::Db(e.to_string()))
}

pub async fn find_by_id(db: &DatabaseConnection, id: i32) -> Result<Option<Model>, errors::ModelError> {
    Entity::find_by_id(id)
        .one(db)
        .await
        .map_err(|e| errors::ModelError::Db(e.to_string()))
}
