use sea_orm::{
    entity::prelude::*, ActiveValue::Unchanged, DatabaseConnection, PaginatorTrait, QueryOrder, Set,
};
use serde::{Deserialize, Serialize};

use crate::{errors, region};

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "cliente")]
#[serde(rename_all = "camelCase")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,
    pub nombre: String,
    pub apellido: String,
    #[sea_orm(unique)]
    pub email: String,
    pub create_at: Date,
    pub foto: Option<String>,
    pub region_id: Option<i32>,
}

#[derive(Copy, Clone, Debug, EnumIter)]
pub enum Relation {
    Region,
}

impl RelationTrait for Relation {
    fn def(&self) -> RelationDef {
        match self {
            Relation::Region => Entity::belongs_to(region::Entity)
                .from(Column::RegionId)
                .to(region::Column::Id)
                .into(),
        }
    }
}

impl Related<region::Entity> for Entity {
    fn to() -> RelationDef { Relation::Region.def() }
}

impl ActiveModelBehavior for ActiveModel {}

/// Cliente as exposed over HTTP: the region is embedded instead of its id.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ClienteDto {
    pub id: i32,
    pub nombre: String,
    pub apellido: String,
    pub email: String,
    pub create_at: Date,
    pub foto: Option<String>,
    pub region: Option<region::Model>,
}

impl ClienteDto {
    pub fn from_parts(m: Model, region: Option<region::Model>) -> Self {
        Self {
            id: m.id,
            nombre: m.nombre,
            apellido: m.apellido,
            email: m.email,
            create_at: m.create_at,
            foto: m.foto,
            region,
        }
    }

    /// Back to the persisted shape; the region collapses to its id.
    pub fn into_model(self) -> Model {
        Model {
            id: self.id,
            nombre: self.nombre,
            apellido: self.apellido,
            email: self.email,
            create_at: self.create_at,
            foto: self.foto,
            region_id: self.region.map(|r| r.id),
        }
    }
}

/// Reference to a region inside a request body; only `id` is used.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct RegionRef {
    pub id: i32,
    #[serde(default)]
    pub nombre: Option<String>,
}

/// Request body for create/update. Every field is optional so that missing
/// values become field errors instead of deserialization failures.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ClienteForm {
    #[serde(default)]
    pub nombre: Option<String>,
    #[serde(default)]
    pub apellido: Option<String>,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub create_at: Option<Date>,
    #[serde(default)]
    pub region: Option<RegionRef>,
}

/// Validated, trimmed values ready to persist.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ClienteFields {
    pub nombre: String,
    pub apellido: String,
    pub email: String,
    pub create_at: Date,
    pub region_id: Option<i32>,
}

pub const NOMBRE_MIN: usize = 4;
pub const NOMBRE_MAX: usize = 12;

pub fn field_error(field: &str, message: &str) -> String {
    format!("El campo '{}' {}", field, message)
}

pub fn validate_email(email: &str) -> bool {
    if email.chars().any(char::is_whitespace) { return false; }
    let Some((local, domain)) = email.split_once('@') else { return false; };
    if local.is_empty() || domain.contains('@') { return false; }
    domain.contains('.')
        && !domain.starts_with('.')
        && !domain.ends_with('.')
        && !domain.contains("..")
}

impl ClienteForm {
    /// Collect every failed constraint; an empty list means the form is valid.
    pub fn validate(&self) -> Result<ClienteFields, errors::ModelError> {
        let mut errs = Vec::new();

        let nombre = self.nombre.as_deref().map(str::trim).unwrap_or_default();
        if nombre.is_empty() {
            errs.push(field_error("nombre", "no puede estar vacio"));
        } else if !(NOMBRE_MIN..=NOMBRE_MAX).contains(&nombre.chars().count()) {
            errs.push(field_error(
                "nombre",
                &format!("el tamaño tiene que estar entre {} y {}", NOMBRE_MIN, NOMBRE_MAX),
            ));
        }

        let apellido = self.apellido.as_deref().map(str::trim).unwrap_or_default();
        if apellido.is_empty() {
            errs.push(field_error("apellido", "no puede estar vacio"));
        }

        let email = self.email.as_deref().map(str::trim).unwrap_or_default();
        if email.is_empty() {
            errs.push(field_error("email", "no puede estar vacio"));
        } else if !validate_email(email) {
            errs.push(field_error("email", "no es una dirección de correo bien formada"));
        }

        if self.create_at.is_none() {
            errs.push(field_error("createAt", "no puede estar vacio"));
        }

        match (errs.is_empty(), self.create_at) {
            (true, Some(create_at)) => Ok(ClienteFields {
                nombre: nombre.to_string(),
                apellido: apellido.to_string(),
                email: email.to_string(),
                create_at,
                region_id: self.region.as_ref().map(|r| r.id),
            }),
            _ => Err(errors::ModelError::InvalidFields(errs)),
        }
    }
}

fn db_err(e: DbErr) -> errors::ModelError {
    errors::ModelError::Db(e.to_string())
}

pub async fn create(db: &DatabaseConnection, fields: ClienteFields) -> Result<Model, errors::ModelError> {
    let am = ActiveModel {
        nombre: Set(fields.nombre),
        apellido: Set(fields.apellido),
        email: Set(fields.email),
        create_at: Set(fields.create_at),
        foto: Set(None),
        region_id: Set(fields.region_id),
        ..Default::default()
    };
    am.insert(db).await.map_err(db_err)
}

/// Write every column of `m` back to its row.
pub async fn save(db: &DatabaseConnection, m: Model) -> Result<Model, errors::ModelError> {
    let am = ActiveModel {
        id: Unchanged(m.id),
        nombre: Set(m.nombre),
        apellido: Set(m.apellido),
        email: Set(m.email),
        create_at: Set(m.create_at),
        foto: Set(m.foto),
        region_id: Set(m.region_id),
    };
    am.update(db).await.map_err(db_err)
}

pub async fn find_by_id_with_region(
    db: &DatabaseConnection,
    id: i32,
) -> Result<Option<(Model, Option<region::Model>)>, errors::ModelError> {
    Entity::find_by_id(id)
        .find_also_related(region::Entity)
        .one(db)
        .await
        .map_err(db_err)
}

pub async fn find_all_with_region(
    db: &DatabaseConnection,
) -> Result<Vec<(Model, Option<region::Model>)>, errors::ModelError> {
    Entity::find()
        .find_also_related(region::Entity)
        .order_by_asc(Column::Id)
        .all(db)
        .await
        .map_err(db_err)
}

/// One zero-based page plus `(total_items, total_pages)`.
pub async fn find_page_with_region(
    db: &DatabaseConnection,
    page_idx: u64,
    per_page: u64,
) -> Result<(Vec<(Model, Option<region::Model>)>, u64, u64), errors::ModelError> {
    let paginator = Entity::find()
        .find_also_related(region::Entity)
        .order_by_asc(Column::Id)
        .paginate(db, per_page);
    let totals = paginator.num_items_and_pages().await.map_err(db_err)?;
    let rows = paginator.fetch_page(page_idx).await.map_err(db_err)?;
    Ok((rows, totals.number_of_items, totals.number_of_pages))
}

pub async fn hard_delete(db: &DatabaseConnection, id: i32) -> Result<bool, errors::ModelError> {
    let res = Entity::delete_by_id(id).exec(db).await.map_err(db_err)?;
    Ok(res.rows_affected > 0)
}
