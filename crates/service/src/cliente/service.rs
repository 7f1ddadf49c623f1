use std::sync::Arc;

use tracing::{info, instrument, warn};

use common::metrics::record_operation;
use models::cliente::{field_error, ClienteDto, ClienteFields, ClienteForm};
use models::region;

use crate::cliente::repository::ClienteRepository;
use crate::errors::ServiceError;
use crate::pagination::{Page, Pagination};
use crate::upload::{LoadedPhoto, UploadFileService};

/// Fixed page size of `GET /api/clientes/page/{page}`.
pub const PAGE_SIZE: u64 = 4;

/// Result of deleting a cliente. The record is gone in every case; the photo
/// cleanup is best-effort.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeleteReport {
    pub foto_eliminada: bool,
    /// Set when the photo existed but could not be removed.
    pub foto_error: Option<String>,
}

/// Application service for clientes: validation, persistence and photo files.
pub struct ClienteService<R: ClienteRepository> {
    repo: Arc<R>,
    uploads: Arc<dyn UploadFileService>,
}

impl<R: ClienteRepository> Clone for ClienteService<R> {
    fn clone(&self) -> Self {
        Self { repo: Arc::clone(&self.repo), uploads: Arc::clone(&self.uploads) }
    }
}

impl<R: ClienteRepository> ClienteService<R> {
    pub fn new(repo: Arc<R>, uploads: Arc<dyn UploadFileService>) -> Self {
        Self { repo, uploads }
    }

    pub async fn list(&self) -> Result<Vec<ClienteDto>, ServiceError> {
        self.repo.find_all().await
    }

    pub async fn page(&self, page: u64) -> Result<Page<ClienteDto>, ServiceError> {
        self.repo.find_page(Pagination::new(page, PAGE_SIZE)).await
    }

    pub async fn get(&self, id: i32) -> Result<Option<ClienteDto>, ServiceError> {
        self.repo.find_by_id(id).await
    }

    pub async fn regiones(&self) -> Result<Vec<region::Model>, ServiceError> {
        self.repo.find_all_regiones().await
    }

    /// Validate the form and check that a referenced region exists.
    async fn validated(&self, form: &ClienteForm) -> Result<ClienteFields, ServiceError> {
        let fields = form.validate()?;
        if let Some(rid) = fields.region_id {
            if self.repo.find_region(rid).await?.is_none() {
                return Err(ServiceError::Invalid(vec![field_error(
                    "region",
                    &format!("no existe (ID: {})", rid),
                )]));
            }
        }
        Ok(fields)
    }

    #[instrument(skip(self, form))]
    pub async fn create(&self, form: &ClienteForm) -> Result<ClienteDto, ServiceError> {
        let res = match self.validated(form).await {
            Ok(fields) => self.repo.insert(fields).await,
            Err(e) => Err(e),
        };
        record_operation("create", res.is_ok());
        let created = res?;
        info!(id = created.id, "cliente created");
        Ok(created)
    }

    /// Overlay the mutable fields of `form` onto cliente `id`; `foto` is kept.
    #[instrument(skip(self, form))]
    pub async fn update(&self, id: i32, form: &ClienteForm) -> Result<ClienteDto, ServiceError> {
        let res = self.update_inner(id, form).await;
        record_operation("update", res.is_ok());
        res
    }

    async fn update_inner(&self, id: i32, form: &ClienteForm) -> Result<ClienteDto, ServiceError> {
        let fields = self.validated(form).await?;
        let actual = self
            .repo
            .find_by_id(id)
            .await?
            .ok_or_else(|| ServiceError::cliente_not_found(id))?;

        let mut model = actual.into_model();
        model.nombre = fields.nombre;
        model.apellido = fields.apellido;
        model.email = fields.email;
        model.create_at = fields.create_at;
        model.region_id = fields.region_id;

        let updated = self.repo.update(model).await?;
        info!(id, "cliente updated");
        Ok(updated)
    }

    /// Delete the cliente's photo (best-effort), then the record.
    #[instrument(skip(self))]
    pub async fn delete(&self, id: i32) -> Result<DeleteReport, ServiceError> {
        let res = self.delete_inner(id).await;
        record_operation("delete", res.is_ok());
        res
    }

    async fn delete_inner(&self, id: i32) -> Result<DeleteReport, ServiceError> {
        let cliente = self
            .repo
            .find_by_id(id)
            .await?
            .ok_or_else(|| ServiceError::cliente_not_found(id))?;

        let report = match self.uploads.delete(cliente.foto.as_deref()).await {
            Ok(foto_eliminada) => DeleteReport { foto_eliminada, foto_error: None },
            Err(e) => {
                warn!(id, foto = ?cliente.foto, error = %e, "photo cleanup failed; deleting record anyway");
                DeleteReport { foto_eliminada: false, foto_error: Some(e.to_string()) }
            }
        };

        if !self.repo.delete(id).await? {
            return Err(ServiceError::cliente_not_found(id));
        }
        info!(id, foto_eliminada = report.foto_eliminada, "cliente deleted");
        Ok(report)
    }

    /// Store a new photo for cliente `id` and drop the previous one.
    /// Returns the updated cliente and the generated file name.
    #[instrument(skip(self, data), fields(bytes = data.len()))]
    pub async fn upload_photo(
        &self,
        id: i32,
        data: &[u8],
        original_filename: &str,
    ) -> Result<(ClienteDto, String), ServiceError> {
        let res = self.upload_photo_inner(id, data, original_filename).await;
        record_operation("upload", res.is_ok());
        res
    }

    async fn upload_photo_inner(
        &self,
        id: i32,
        data: &[u8],
        original_filename: &str,
    ) -> Result<(ClienteDto, String), ServiceError> {
        if data.is_empty() {
            return Err(ServiceError::Validation("El archivo 'archivo' está vacío".into()));
        }
        let cliente = self
            .repo
            .find_by_id(id)
            .await?
            .ok_or_else(|| ServiceError::cliente_not_found(id))?;

        let mut content = data;
        let nombre = self.uploads.store(&mut content, original_filename).await?;

        let anterior = cliente.foto.clone();
        let mut model = cliente.into_model();
        model.foto = Some(nombre.clone());
        let updated = match self.repo.update(model).await {
            Ok(c) => c,
            Err(e) => {
                // the row still points at the previous photo; drop the new file
                if let Err(cleanup) = self.uploads.delete(Some(nombre.as_str())).await {
                    warn!(id, foto = %nombre, error = %cleanup, "could not remove unreferenced upload");
                }
                return Err(e);
            }
        };

        if let Err(e) = self.uploads.delete(anterior.as_deref()).await {
            warn!(id, foto = ?anterior, error = %e, "previous photo could not be deleted");
        }
        info!(id, foto = %nombre, "cliente photo replaced");
        Ok((updated, nombre))
    }

    pub async fn load_photo(&self, nombre_foto: &str) -> Result<LoadedPhoto, ServiceError> {
        Ok(self.uploads.load(nombre_foto).await?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cliente::repository::mock::InMemoryClienteRepository;
    use crate::cliente::repository::SeaOrmClienteRepository;
    use crate::test_support::{get_db, temp_uploads};
    use crate::upload::StorageError;
    use chrono::NaiveDate;
    use models::cliente::RegionRef;

    fn form(nombre: &str, email: &str) -> ClienteForm {
        ClienteForm {
            nombre: Some(nombre.into()),
            apellido: Some("Guzmán".into()),
            email: Some(email.into()),
            create_at: NaiveDate::from_ymd_opt(2018, 1, 2),
            region: Some(RegionRef { id: 1, nombre: None }),
        }
    }

    fn mock_service(uploads: Arc<dyn UploadFileService>) -> (Arc<InMemoryClienteRepository>, ClienteService<InMemoryClienteRepository>) {
        let repo = Arc::new(InMemoryClienteRepository::default());
        (Arc::clone(&repo), ClienteService::new(repo, uploads))
    }

    #[tokio::test]
    async fn create_rejects_empty_nombre_with_field_message() -> anyhow::Result<()> {
        let (_tmp, uploads) = temp_uploads().await?;
        let (_repo, svc) = mock_service(uploads);
        let err = svc.create(&form("", "a@b.co")).await.unwrap_err();
        match err {
            ServiceError::Invalid(errs) => assert!(errs.iter().any(|e| e.contains("nombre"))),
            other => panic!("unexpected {:?}", other),
        }
        assert!(svc.list().await?.is_empty());
        Ok(())
    }

    #[tokio::test]
    async fn create_rejects_unknown_region() -> anyhow::Result<()> {
        let (_tmp, uploads) = temp_uploads().await?;
        let (_repo, svc) = mock_service(uploads);
        let mut f = form("Andrés", "a@b.co");
        f.region = Some(RegionRef { id: 77, nombre: None });
        match svc.create(&f).await {
            Err(ServiceError::Invalid(errs)) => assert!(errs[0].contains("'region'")),
            other => panic!("unexpected {:?}", other),
        }
        Ok(())
    }

    #[tokio::test]
    async fn get_missing_is_none_and_update_missing_is_not_found() -> anyhow::Result<()> {
        let (_tmp, uploads) = temp_uploads().await?;
        let (_repo, svc) = mock_service(uploads);
        assert!(svc.get(999).await?.is_none());
        match svc.update(999, &form("Andrés", "a@b.co")).await {
            Err(ServiceError::NotFound(msg)) => assert!(msg.contains("999")),
            other => panic!("unexpected {:?}", other),
        }
        Ok(())
    }

    #[tokio::test]
    async fn update_overlays_fields_and_keeps_photo() -> anyhow::Result<()> {
        let (_tmp, uploads) = temp_uploads().await?;
        let (_repo, svc) = mock_service(uploads);
        let c = svc.create(&form("Andrés", "a@b.co")).await?;
        let (with_photo, nombre) = svc.upload_photo(c.id, b"img", "yo.png").await?;

        let mut f = form("Roberto", "r@b.co");
        f.region = Some(RegionRef { id: 2, nombre: None });
        let updated = svc.update(with_photo.id, &f).await?;
        assert_eq!(updated.nombre, "Roberto");
        assert_eq!(updated.email, "r@b.co");
        assert_eq!(updated.region.map(|r| r.nombre), Some("Europa".to_string()));
        assert_eq!(updated.foto, Some(nombre));
        Ok(())
    }

    #[tokio::test]
    async fn upload_replaces_previous_photo() -> anyhow::Result<()> {
        let (_tmp, uploads) = temp_uploads().await?;
        let (_repo, svc) = mock_service(Arc::clone(&uploads));
        let c = svc.create(&form("Andrés", "a@b.co")).await?;

        let (_, first) = svc.upload_photo(c.id, b"one", "My Pic.png").await?;
        assert!(first.ends_with("_MyPic.png"));
        let (updated, second) = svc.upload_photo(c.id, b"two", "My Pic.png").await?;
        assert_ne!(first, second);
        assert_eq!(updated.foto.as_deref(), Some(second.as_str()));
        assert!(tokio::fs::metadata(uploads.resolve_path(&first)).await.is_err());
        assert_eq!(tokio::fs::read(uploads.resolve_path(&second)).await?, b"two");
        Ok(())
    }

    #[tokio::test]
    async fn upload_rejects_empty_file_and_unknown_cliente() -> anyhow::Result<()> {
        let (_tmp, uploads) = temp_uploads().await?;
        let (_repo, svc) = mock_service(uploads);
        assert!(matches!(svc.upload_photo(1, b"", "a.png").await, Err(ServiceError::Validation(_))));
        assert!(matches!(svc.upload_photo(42, b"x", "a.png").await, Err(ServiceError::NotFound(_))));
        Ok(())
    }

    #[tokio::test]
    async fn upload_removes_new_file_when_persisting_fails() -> anyhow::Result<()> {
        let (_tmp, uploads) = temp_uploads().await?;
        let (repo, svc) = mock_service(Arc::clone(&uploads));
        let c = svc.create(&form("Andrés", "a@b.co")).await?;
        let (_, kept) = svc.upload_photo(c.id, b"one", "keep.png").await?;

        repo.set_fail_writes(true);
        assert!(matches!(svc.upload_photo(c.id, b"two", "lost.png").await, Err(ServiceError::Db(_))));
        repo.set_fail_writes(false);

        // previous photo untouched, no orphan left behind
        assert!(tokio::fs::metadata(uploads.resolve_path(&kept)).await.is_ok());
        let mut entries = tokio::fs::read_dir(uploads_root(&uploads, &kept)).await?;
        let mut count = 0;
        while entries.next_entry().await?.is_some() { count += 1; }
        assert_eq!(count, 1);
        Ok(())
    }

    fn uploads_root(uploads: &Arc<dyn UploadFileService>, any_name: &str) -> std::path::PathBuf {
        uploads.resolve_path(any_name).parent().unwrap().to_path_buf()
    }

    #[tokio::test]
    async fn delete_removes_record_and_photo() -> anyhow::Result<()> {
        let (_tmp, uploads) = temp_uploads().await?;
        let (_repo, svc) = mock_service(Arc::clone(&uploads));
        let c = svc.create(&form("Andrés", "a@b.co")).await?;
        let (_, foto) = svc.upload_photo(c.id, b"img", "yo.png").await?;

        let report = svc.delete(c.id).await?;
        assert_eq!(report, DeleteReport { foto_eliminada: true, foto_error: None });
        assert!(svc.get(c.id).await?.is_none());
        assert!(tokio::fs::metadata(uploads.resolve_path(&foto)).await.is_err());

        assert!(matches!(svc.delete(c.id).await, Err(ServiceError::NotFound(_))));
        Ok(())
    }

    #[tokio::test]
    async fn delete_without_photo_reports_nothing_removed() -> anyhow::Result<()> {
        let (_tmp, uploads) = temp_uploads().await?;
        let (_repo, svc) = mock_service(uploads);
        let c = svc.create(&form("Andrés", "a@b.co")).await?;
        let report = svc.delete(c.id).await?;
        assert!(!report.foto_eliminada);
        assert!(report.foto_error.is_none());
        Ok(())
    }

    #[tokio::test]
    async fn load_photo_falls_back_for_unknown_name() -> anyhow::Result<()> {
        let (_tmp, uploads) = temp_uploads().await?;
        let (_repo, svc) = mock_service(uploads);
        assert!(svc.load_photo("nada.png").await?.is_fallback());
        Ok(())
    }

    /// Stores and loads through a real directory but cannot remove anything.
    struct UndeletableUploads(Arc<dyn UploadFileService>);

    #[async_trait::async_trait]
    impl UploadFileService for UndeletableUploads {
        fn resolve_path(&self, logical_name: &str) -> std::path::PathBuf {
            self.0.resolve_path(logical_name)
        }

        async fn load(&self, logical_name: &str) -> Result<LoadedPhoto, StorageError> {
            self.0.load(logical_name).await
        }

        async fn store(
            &self,
            content: &mut (dyn tokio::io::AsyncRead + Unpin + Send),
            original_filename: &str,
        ) -> Result<String, StorageError> {
            self.0.store(content, original_filename).await
        }

        async fn delete(&self, logical_name: Option<&str>) -> Result<bool, StorageError> {
            match logical_name {
                Some(n) if !n.is_empty() => Err(StorageError::Io(std::io::Error::new(
                    std::io::ErrorKind::PermissionDenied,
                    "read-only volume",
                ))),
                _ => Ok(false),
            }
        }
    }

    #[tokio::test]
    async fn delete_removes_record_even_when_photo_cannot_be_removed() -> anyhow::Result<()> {
        let (_tmp, inner) = temp_uploads().await?;
        let (_repo, svc) = mock_service(Arc::new(UndeletableUploads(Arc::clone(&inner))));

        let c = svc.create(&form("Andrés", "andres@example.com")).await?;
        let (_, nombre) = svc.upload_photo(c.id, b"png-bytes", "foto.png").await?;

        let report = svc.delete(c.id).await?;
        assert!(!report.foto_eliminada);
        assert!(report.foto_error.as_deref().is_some_and(|e| e.contains("read-only volume")));
        assert!(svc.get(c.id).await?.is_none());
        // the file is still on disk
        assert!(inner.resolve_path(&nombre).exists());
        Ok(())
    }

    #[tokio::test]
    async fn page_uses_fixed_size() -> anyhow::Result<()> {
        let (_tmp, uploads) = temp_uploads().await?;
        let (_repo, svc) = mock_service(uploads);
        for i in 0..6 {
            svc.create(&form(&format!("Persona{}", i), &format!("p{}@b.co", i))).await?;
        }
        let p0 = svc.page(0).await?;
        assert_eq!(p0.size, PAGE_SIZE);
        assert_eq!(p0.content.len(), 4);
        assert_eq!(svc.page(1).await?.content.len(), 2);

        let past_end = svc.page(1_000).await?;
        assert!(past_end.empty && past_end.last);
        assert!(matches!(svc.page(u64::MAX).await, Err(ServiceError::Invalid(_))));
        Ok(())
    }

    #[tokio::test]
    async fn full_flow_against_sqlite() -> anyhow::Result<()> {
        let (_tmp, uploads) = temp_uploads().await?;
        let repo = Arc::new(SeaOrmClienteRepository::new(get_db().await?));
        let svc = ClienteService::new(repo, Arc::clone(&uploads));

        let c = svc.create(&form("Andrés", "andres@example.com")).await?;
        assert_eq!(c.region.as_ref().map(|r| r.id), Some(1));

        let dup = svc.create(&form("Otro", "andres@example.com")).await;
        assert!(matches!(dup, Err(ServiceError::Db(_))));

        let (updated, foto) = svc.upload_photo(c.id, b"img", "foto perfil.jpg").await?;
        assert!(foto.ends_with("_fotoperfil.jpg"));
        assert_eq!(svc.get(c.id).await?.and_then(|x| x.foto), updated.foto);

        svc.delete(c.id).await?;
        assert!(svc.get(c.id).await?.is_none());
        assert!(tokio::fs::metadata(uploads.resolve_path(&foto)).await.is_err());
        assert_eq!(svc.regiones().await?.len(), 8);
        Ok(())
    }
}
