use std::collections::HashSet;
use std::str::FromStr;

use chrono::Local;
use sea_orm::{DatabaseConnection, TransactionTrait};
use tracing::{info, instrument};

use common::metrics::record_operation;
use models::cliente::{self, field_error};
use models::factura::{self, FacturaDto, FacturaForm};
use models::producto;

use crate::errors::ServiceError;

/// How `filtrar_productos` matches the term against `nombre`.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum FiltroProducto {
    /// `LIKE %term%` with the database's own case rules
    Like,
    #[default]
    Contiene,
    Empieza,
}

impl FromStr for FiltroProducto {
    type Err = ServiceError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "like" => Ok(Self::Like),
            "contiene" => Ok(Self::Contiene),
            "empieza" => Ok(Self::Empieza),
            other => Err(ServiceError::Invalid(vec![field_error(
                "modo",
                &format!("debe ser like, contiene o empieza (recibido: {})", other),
            )])),
        }
    }
}

fn factura_not_found(id: i32) -> ServiceError {
    ServiceError::NotFound(format!("La factura ID: {} no existe en la base de datos!", id))
}

async fn to_dto(db: &DatabaseConnection, f: factura::Model) -> Result<FacturaDto, ServiceError> {
    let lines = factura::items_with_producto(db, f.id).await?;
    Ok(FacturaDto::from_parts(f, lines))
}

pub async fn get_factura(db: &DatabaseConnection, id: i32) -> Result<FacturaDto, ServiceError> {
    let f = factura::find_by_id(db, id).await?.ok_or_else(|| factura_not_found(id))?;
    to_dto(db, f).await
}

/// Facturas of one cliente; 404 when the cliente does not exist.
pub async fn facturas_de_cliente(db: &DatabaseConnection, cliente_id: i32) -> Result<Vec<FacturaDto>, ServiceError> {
    if cliente::find_by_id_with_region(db, cliente_id).await?.is_none() {
        return Err(ServiceError::cliente_not_found(cliente_id));
    }
    let mut out = Vec::new();
    for f in factura::find_by_cliente(db, cliente_id).await? {
        out.push(to_dto(db, f).await?);
    }
    Ok(out)
}

/// Validate, check references, then insert the factura and its items in one transaction.
#[instrument(skip(db, form))]
pub async fn create_factura(db: &DatabaseConnection, form: &FacturaForm) -> Result<FacturaDto, ServiceError> {
    let res = create_inner(db, form).await;
    record_operation("factura_create", res.is_ok());
    res
}

async fn create_inner(db: &DatabaseConnection, form: &FacturaForm) -> Result<FacturaDto, ServiceError> {
    let fields = form.validate(Local::now().date_naive())?;

    let mut errs = Vec::new();
    if cliente::find_by_id_with_region(db, fields.cliente_id).await?.is_none() {
        errs.push(field_error("cliente", &format!("no existe (ID: {})", fields.cliente_id)));
    }
    let mut vistos = HashSet::new();
    for (i, item) in fields.items.iter().enumerate() {
        if vistos.insert(item.producto_id) && producto::find_by_id(db, item.producto_id).await?.is_none() {
            errs.push(field_error(
                &format!("items[{}].producto", i),
                &format!("no existe (ID: {})", item.producto_id),
            ));
        }
    }
    if !errs.is_empty() {
        return Err(ServiceError::Invalid(errs));
    }

    let txn = db.begin().await.map_err(|e| ServiceError::Db(e.to_string()))?;
    let (created, _) = factura::create_with_items(&txn, fields).await?;
    txn.commit().await.map_err(|e| ServiceError::Db(e.to_string()))?;
    info!(id = created.id, cliente_id = created.cliente_id, "factura created");
    to_dto(db, created).await
}

#[instrument(skip(db))]
pub async fn delete_factura(db: &DatabaseConnection, id: i32) -> Result<(), ServiceError> {
    let res = delete_inner(db, id).await;
    record_operation("factura_delete", res.is_ok());
    res
}

async fn delete_inner(db: &DatabaseConnection, id: i32) -> Result<(), ServiceError> {
    let txn = db.begin().await.map_err(|e| ServiceError::Db(e.to_string()))?;
    let existed = factura::delete_with_items(&txn, id).await?;
    if !existed {
        txn.rollback().await.map_err(|e| ServiceError::Db(e.to_string()))?;
        return Err(factura_not_found(id));
    }
    txn.commit().await.map_err(|e| ServiceError::Db(e.to_string()))?;
    info!(id, "factura deleted");
    Ok(())
}

/// Productos whose `nombre` matches `term`; an empty term matches nothing.
pub async fn filtrar_productos(
    db: &DatabaseConnection,
    term: &str,
    modo: FiltroProducto,
) -> Result<Vec<producto::Model>, ServiceError> {
    let term = term.trim();
    if term.is_empty() {
        return Ok(Vec::new());
    }
    let found = match modo {
        FiltroProducto::Like => producto::find_by_nombre(db, term).await?,
        FiltroProducto::Contiene => producto::find_by_nombre_containing_ignore_case(db, term).await?,
        FiltroProducto::Empieza => producto::find_by_nombre_starting_with_ignore_case(db, term).await?,
    };
    Ok(found)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::get_db;
    use chrono::NaiveDate;
    use models::factura::{IdRef, ItemForm};

    async fn cliente_id(db: &DatabaseConnection) -> anyhow::Result<i32> {
        let c = cliente::create(
            db,
            cliente::ClienteFields {
                nombre: "Sofía".into(),
                apellido: "Reyes".into(),
                email: "sofia@example.com".into(),
                create_at: NaiveDate::from_ymd_opt(2019, 7, 1).unwrap(),
                region_id: None,
            },
        )
        .await?;
        Ok(c.id)
    }

    fn form(cliente: i32, items: &[(i32, i32)]) -> FacturaForm {
        FacturaForm {
            descripcion: Some("Factura de prueba".into()),
            observacion: Some("pago contado".into()),
            cliente: Some(IdRef { id: cliente }),
            items: items
                .iter()
                .map(|(p, c)| ItemForm { cantidad: Some(*c), producto: Some(IdRef { id: *p }) })
                .collect(),
        }
    }

    #[tokio::test]
    async fn create_get_and_delete_factura() -> anyhow::Result<()> {
        let db = get_db().await?;
        let cid = cliente_id(&db).await?;

        let created = create_factura(&db, &form(cid, &[(6, 2), (7, 1)])).await?;
        assert_eq!(created.items.len(), 2);
        assert_eq!(created.total, 2.0 * 69990.0 + 299990.0);
        assert_eq!(created.create_at, Local::now().date_naive());

        assert_eq!(get_factura(&db, created.id).await?, created);
        assert_eq!(facturas_de_cliente(&db, cid).await?.len(), 1);

        delete_factura(&db, created.id).await?;
        assert!(matches!(get_factura(&db, created.id).await, Err(ServiceError::NotFound(_))));
        assert!(matches!(delete_factura(&db, created.id).await, Err(ServiceError::NotFound(_))));
        Ok(())
    }

    #[tokio::test]
    async fn unknown_references_are_field_errors() -> anyhow::Result<()> {
        let db = get_db().await?;
        match create_factura(&db, &form(42, &[(1, 1), (500, 1)])).await {
            Err(ServiceError::Invalid(errs)) => {
                assert_eq!(errs, vec![
                    "El campo 'cliente' no existe (ID: 42)".to_string(),
                    "El campo 'items[1].producto' no existe (ID: 500)".to_string(),
                ]);
            }
            other => panic!("unexpected: {:?}", other),
        }
        assert!(matches!(facturas_de_cliente(&db, 42).await, Err(ServiceError::NotFound(_))));
        Ok(())
    }

    #[tokio::test]
    async fn filtrar_productos_by_mode() -> anyhow::Result<()> {
        let db = get_db().await?;
        assert_eq!(filtrar_productos(&db, "sony", FiltroProducto::Contiene).await?.len(), 2);
        assert_eq!(filtrar_productos(&db, "mica", FiltroProducto::Empieza).await?.len(), 1);
        assert!(filtrar_productos(&db, "cajones", FiltroProducto::Empieza).await?.is_empty());
        assert_eq!(filtrar_productos(&db, "Notebook", FiltroProducto::Like).await?.len(), 1);
        assert!(filtrar_productos(&db, "   ", FiltroProducto::Contiene).await?.is_empty());
        Ok(())
    }

    #[test]
    fn filtro_parses_case_insensitively() {
        assert_eq!("EMPIEZA".parse::<FiltroProducto>().unwrap(), FiltroProducto::Empieza);
        assert!(matches!("regex".parse::<FiltroProducto>(), Err(ServiceError::Invalid(_))));
    }
}
