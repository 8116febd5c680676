// src/services/vendor_service.rs

use std::sync::Arc;

use chrono::Utc;
use sqlx::PgPool;
use uuid::Uuid;

use crate::{
    common::{
        codes::{CodeGenerator, CodeKind},
        error::AppError,
        storage::{gst_certificate_path, validate_pdf_upload, DocumentStore},
    },
    db::VendorRepository,
    models::{
        party::{CreatePartyPayload, UpdatePartyPayload},
        vendor::Vendor,
    },
};

#[derive(Clone)]
pub struct VendorService {
    repo: VendorRepository,
    codes: CodeGenerator,
    documents: Arc<dyn DocumentStore>,
    max_upload_bytes: usize,
    pool: PgPool,
}

impl VendorService {
    pub fn new(
        repo: VendorRepository,
        codes: CodeGenerator,
        documents: Arc<dyn DocumentStore>,
        max_upload_bytes: usize,
        pool: PgPool,
    ) -> Self {
        Self { repo, codes, documents, max_upload_bytes, pool }
    }

    pub async fn list_vendors(&self) -> Result<Vec<Vendor>, AppError> {
        self.repo.list_vendors().await
    }

    pub async fn get_vendor(&self, id: Uuid) -> Result<Vendor, AppError> {
        self.repo.find_vendor(id).await?.ok_or(AppError::NotFound("vendor"))
    }

    pub async fn create_vendor(&self, payload: &CreatePartyPayload) -> Result<Vendor, AppError> {
        // O código e o INSERT precisam da mesma transação (o lock vale até o commit)
        let mut tx = self.pool.begin().await?;

        let code = self
            .codes
            .next_code(&mut tx, CodeKind::Vendor, Utc::now().date_naive())
            .await?;
        let vendor = self.repo.create_vendor(&mut *tx, &code, payload).await?;

        tx.commit().await?;
        tracing::info!("🏭 Fornecedor {} criado ({})", vendor.vendor_code, vendor.name);
        Ok(vendor)
    }

    pub async fn update_vendor(&self, id: Uuid, changes: &UpdatePartyPayload) -> Result<Vendor, AppError> {
        self.repo
            .update_vendor(&self.pool, id, changes)
            .await?
            .ok_or(AppError::NotFound("vendor"))
    }

    pub async fn delete_vendor(&self, id: Uuid) -> Result<(), AppError> {
        if !self.repo.delete_vendor(&self.pool, id).await? {
            return Err(AppError::NotFound("vendor"));
        }
        Ok(())
    }

    // --- Certificado GST ---

    pub async fn upload_gst_certificate(
        &self,
        id: Uuid,
        content_type: Option<&str>,
        bytes: &[u8],
    ) -> Result<Vendor, AppError> {
        validate_pdf_upload(content_type, bytes, self.max_upload_bytes)?;

        // Grava o caminho primeiro (sem commit): registro inexistente não deixa arquivo no disco
        let path = gst_certificate_path("vendors", id);
        let mut tx = self.pool.begin().await?;
        let vendor = self
            .repo
            .set_gst_certificate(&mut *tx, id, &path)
            .await?
            .ok_or(AppError::NotFound("vendor"))?;

        self.documents.save(&path, bytes).await?;
        if let Err(e) = tx.commit().await {
            tracing::error!("Commit do certificado GST falhou; arquivo órfão em {}", path);
            return Err(e.into());
        }
        Ok(vendor)
    }

    pub async fn download_gst_certificate(&self, id: Uuid) -> Result<Vec<u8>, AppError> {
        let vendor = self.get_vendor(id).await?;
        let path = vendor
            .gst_certificate_path
            .ok_or(AppError::GstCertificateMissing)?;
        self.documents.load(&path).await
    }
}

#[cfg(test)]
mod tests {
    use async_trait::async_trait;

    use super::*;
    use crate::common::{storage::LocalDocumentStore, test_support::seed_vendor};

    const PDF: &[u8] = b"%PDF-1.4 certificado";

    // Store que sempre falha ao gravar
    struct BrokenStore;

    #[async_trait]
    impl DocumentStore for BrokenStore {
        async fn save(&self, _relative_path: &str, _bytes: &[u8]) -> Result<(), AppError> {
            Err(std::io::Error::other("disco cheio").into())
        }

        async fn load(&self, _relative_path: &str) -> Result<Vec<u8>, AppError> {
            Err(AppError::NotFound("document"))
        }
    }

    fn service(pool: &PgPool, documents: Arc<dyn DocumentStore>) -> VendorService {
        VendorService::new(VendorRepository::new(pool.clone()), CodeGenerator::new("ENPL"), documents, 1024, pool.clone())
    }

    #[sqlx::test(migrations = "./migrations")]
    async fn certificate_upload_and_download(pool: PgPool) {
        let dir = tempfile::tempdir().unwrap();
        let vendors = service(&pool, Arc::new(LocalDocumentStore::new(dir.path())));
        let vendor_id = seed_vendor(&pool).await;

        assert!(matches!(
            vendors.download_gst_certificate(vendor_id).await,
            Err(AppError::GstCertificateMissing)
        ));

        let vendor = vendors.upload_gst_certificate(vendor_id, Some("application/pdf"), PDF).await.unwrap();
        assert_eq!(vendor.gst_certificate_path, Some(gst_certificate_path("vendors", vendor_id)));
        assert_eq!(vendors.download_gst_certificate(vendor_id).await.unwrap(), PDF);
    }

    #[sqlx::test(migrations = "./migrations")]
    async fn failed_save_does_not_record_the_path(pool: PgPool) {
        let vendors = service(&pool, Arc::new(BrokenStore));
        let vendor_id = seed_vendor(&pool).await;

        let err = vendors
            .upload_gst_certificate(vendor_id, Some("application/pdf"), PDF)
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::IoError(_)));
        assert_eq!(vendors.get_vendor(vendor_id).await.unwrap().gst_certificate_path, None);
    }

    #[sqlx::test(migrations = "./migrations")]
    async fn unknown_vendor_leaves_no_file(pool: PgPool) {
        let dir = tempfile::tempdir().unwrap();
        let vendors = service(&pool, Arc::new(LocalDocumentStore::new(dir.path())));
        let missing = Uuid::new_v4();

        let err = vendors
            .upload_gst_certificate(missing, Some("application/pdf"), PDF)
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::NotFound("vendor")));
        assert!(!dir.path().join(gst_certificate_path("vendors", missing)).exists());
    }
}
