use async_trait::async_trait;
use sea_orm::DatabaseConnection;

use models::cliente::{self, ClienteDto, ClienteFields};
use models::region;

use crate::errors::ServiceError;
use crate::pagination::{Page, Pagination};

/// 页码过大（偏移量超出 BIGINT）时的字段错误
pub(crate) fn page_out_of_range(page: Pagination) -> ServiceError {
    ServiceError::Invalid(vec![cliente::field_error(
        "page",
        &format!("fuera de rango: {}", page.page),
    )])
}

/// Persistence of clientes plus read-only access to regions.
#[async_trait]
pub trait ClienteRepository: Send + Sync {
    async fn find_all(&self) -> Result<Vec<ClienteDto>, ServiceError>;
    async fn find_page(&self, page: Pagination) -> Result<Page<ClienteDto>, ServiceError>;
    async fn find_by_id(&self, id: i32) -> Result<Option<ClienteDto>, ServiceError>;
    async fn insert(&self, fields: ClienteFields) -> Result<ClienteDto, ServiceError>;
    async fn update(&self, cliente: cliente::Model) -> Result<ClienteDto, ServiceError>;
    async fn delete(&self, id: i32) -> Result<bool, ServiceError>;

    async fn find_all_regiones(&self) -> Result<Vec<region::Model>, ServiceError>;
    async fn find_region(&self, id: i32) -> Result<Option<region::Model>, ServiceError>;
}

/// SeaORM-backed repository implementation.
#[derive(Clone)]
pub struct SeaOrmClienteRepository {
    pub db: DatabaseConnection,
}

impl SeaOrmClienteRepository {
    pub fn new(db: DatabaseConnection) -> Self { Self { db } }

    async fn with_region(&self, m: cliente::Model) -> Result<ClienteDto, ServiceError> {
        let region = match m.region_id {
            Some(rid) => region::find_by_id(&self.db, rid).await?,
            None => None,
        };
        Ok(ClienteDto::from_parts(m, region))
    }
}

#[async_trait]
impl ClienteRepository for SeaOrmClienteRepository {
    async fn find_all(&self) -> Result<Vec<ClienteDto>, ServiceError> {
        let rows = cliente::find_all_with_region(&self.db).await?;
        Ok(rows.into_iter().map(|(c, r)| ClienteDto::from_parts(c, r)).collect())
    }

    async fn find_page(&self, page: Pagination) -> Result<Page<ClienteDto>, ServiceError> {
        let (page_idx, per_page) = page.normalize();
        if page.offset().is_none() {
            return Err(page_out_of_range(page));
        }
        let (rows, items, pages) = cliente::find_page_with_region(&self.db, page_idx, per_page).await?;
        let content = rows.into_iter().map(|(c, r)| ClienteDto::from_parts(c, r)).collect();
        Ok(Page::new(content, page, items, pages))
    }

    async fn find_by_id(&self, id: i32) -> Result<Option<ClienteDto>, ServiceError> {
        let found = cliente::find_by_id_with_region(&self.db, id).await?;
        Ok(found.map(|(c, r)| ClienteDto::from_parts(c, r)))
    }

    async fn insert(&self, fields: ClienteFields) -> Result<ClienteDto, ServiceError> {
        let created = cliente::create(&self.db, fields).await?;
        self.with_region(created).await
    }

    async fn update(&self, c: cliente::Model) -> Result<ClienteDto, ServiceError> {
        let saved = cliente::save(&self.db, c).await?;
        self.with_region(saved).await
    }

    async fn delete(&self, id: i32) -> Result<bool, ServiceError> {
        Ok(cliente::hard_delete(&self.db, id).await?)
    }

    async fn find_all_regiones(&self) -> Result<Vec<region::Model>, ServiceError> {
        Ok(region::find_all(&self.db).await?)
    }

    async fn find_region(&self, id: i32) -> Result<Option<region::Model>, ServiceError> {
        Ok(region::find_by_id(&self.db, id).await?)
    }
}

/// Simple in-memory repository for unit tests of the orchestration layer
pub mod mock {
    use super::*;
    use std::collections::BTreeMap;
    use std::sync::atomic::{AtomicBool, Ordering};
    use std::sync::Mutex;

    pub struct InMemoryClienteRepository {
        clientes: Mutex<BTreeMap<i32, cliente::Model>>,
        regiones: Vec<region::Model>,
        /// When set, every write fails like a lost database connection.
        pub fail_writes: AtomicBool,
    }

    impl Default for InMemoryClienteRepository {
        fn default() -> Self {
            let regiones = ["Sudamérica", "Europa"]
                .iter()
                .enumerate()
                .map(|(i, n)| region::Model { id: i as i32 + 1, nombre: n.to_string() })
                .collect();
            Self { clientes: Mutex::new(BTreeMap::new()), regiones, fail_writes: AtomicBool::new(false) }
        }
    }

    impl InMemoryClienteRepository {
        fn dto(&self, m: cliente::Model) -> ClienteDto {
            let region = m.region_id.and_then(|rid| self.regiones.iter().find(|r| r.id == rid).cloned());
            ClienteDto::from_parts(m, region)
        }

        fn check_writes(&self) -> Result<(), ServiceError> {
            if self.fail_writes.load(Ordering::SeqCst) {
                return Err(ServiceError::Db("connection reset".into()));
            }
            Ok(())
        }

        pub fn set_fail_writes(&self, fail: bool) {
            self.fail_writes.store(fail, Ordering::SeqCst);
        }
    }

    #[async_trait]
    impl ClienteRepository for InMemoryClienteRepository {
        async fn find_all(&self) -> Result<Vec<ClienteDto>, ServiceError> {
            let rows: Vec<_> = self.clientes.lock().unwrap().values().cloned().collect();
            Ok(rows.into_iter().map(|m| self.dto(m)).collect())
        }

        async fn find_page(&self, page: Pagination) -> Result<Page<ClienteDto>, ServiceError> {
            let (_, per) = page.normalize();
            let offset = page.offset().ok_or_else(|| page_out_of_range(page))?;
            let all = self.find_all().await?;
            let total = all.len() as u64;
            let pages = total.div_ceil(per);
            let skip = usize::try_from(offset).unwrap_or(usize::MAX);
            let content = all.into_iter().skip(skip).take(per as usize).collect();
            Ok(Page::new(content, page, total, pages))
        }

        async fn find_by_id(&self, id: i32) -> Result<Option<ClienteDto>, ServiceError> {
            let found = self.clientes.lock().unwrap().get(&id).cloned();
            Ok(found.map(|m| self.dto(m)))
        }

        async fn insert(&self, fields: ClienteFields) -> Result<ClienteDto, ServiceError> {
            self.check_writes()?;
            let mut map = self.clientes.lock().unwrap();
            if map.values().any(|c| c.email == fields.email) {
                return Err(ServiceError::Db("UNIQUE constraint failed: cliente.email".into()));
            }
            let id = map.keys().next_back().copied().unwrap_or(0) + 1;
            let m = cliente::Model {
                id,
                nombre: fields.nombre,
                apellido: fields.apellido,
                email: fields.email,
                create_at: fields.create_at,
                foto: None,
                region_id: fields.region_id,
            };
            map.insert(id, m.clone());
            drop(map);
            Ok(self.dto(m))
        }

        async fn update(&self, c: cliente::Model) -> Result<ClienteDto, ServiceError> {
            self.check_writes()?;
            let mut map = self.clientes.lock().unwrap();
            if !map.contains_key(&c.id) {
                return Err(ServiceError::Db("None of the records are updated".into()));
            }
            map.insert(c.id, c.clone());
            drop(map);
            Ok(self.dto(c))
        }

        async fn delete(&self, id: i32) -> Result<bool, ServiceError> {
            self.check_writes()?;
            Ok(self.clientes.lock().unwrap().remove(&id).is_some())
        }

        async fn find_all_regiones(&self) -> Result<Vec<region::Model>, ServiceError> {
            Ok(self.regiones.clone())
        }

        async fn find_region(&self, id: i32) -> Result<Option<region::Model>, ServiceError> {
            Ok(self.regiones.iter().find(|r| r.id == id).cloned())
        }
    }
}
