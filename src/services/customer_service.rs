// src/services/customer_service.rs

use std::sync::Arc;

use chrono::Utc;
use sqlx::{PgConnection, PgPool};
use uuid::Uuid;

use crate::{
    common::{
        codes::{CodeGenerator, CodeKind},
        error::AppError,
        storage::{gst_certificate_path, validate_pdf_upload, DocumentStore},
    },
    db::CustomerRepository,
    models::{
        customer::{CreateSitePayload, Customer, Site, UpdateSitePayload},
        party::{CreatePartyPayload, UpdatePartyPayload},
    },
};

#[derive(Clone)]
pub struct CustomerService {
    repo: CustomerRepository,
    codes: CodeGenerator,
    documents: Arc<dyn DocumentStore>,
    max_upload_bytes: usize,
    pool: PgPool,
}

impl CustomerService {
    pub fn new(
        repo: CustomerRepository,
        codes: CodeGenerator,
        documents: Arc<dyn DocumentStore>,
        max_upload_bytes: usize,
        pool: PgPool,
    ) -> Self {
        Self { repo, codes, documents, max_upload_bytes, pool }
    }

    // =========================================================================
    //  CLIENTES
    // =========================================================================

    pub async fn list_customers(&self) -> Result<Vec<Customer>, AppError> {
        self.repo.list_customers().await
    }

    pub async fn get_customer(&self, id: Uuid) -> Result<Customer, AppError> {
        self.repo.find_customer(id).await?.ok_or(AppError::NotFound("customer"))
    }

    pub async fn create_customer(&self, payload: &CreatePartyPayload) -> Result<Customer, AppError> {
        let mut tx = self.pool.begin().await?;

        let code = self
            .codes
            .next_code(&mut tx, CodeKind::Customer, Utc::now().date_naive())
            .await?;
        let customer = self.repo.create_customer(&mut *tx, &code, payload).await?;

        tx.commit().await?;
        tracing::info!("🏥 Cliente {} criado ({})", customer.customer_code, customer.name);
        Ok(customer)
    }

    pub async fn update_customer(&self, id: Uuid, changes: &UpdatePartyPayload) -> Result<Customer, AppError> {
        self.repo
            .update_customer(&self.pool, id, changes)
            .await?
            .ok_or(AppError::NotFound("customer"))
    }

    /// Remove o cliente e os sites dele. Tickets, contratos e entregas seguram o cliente.
    pub async fn delete_customer(&self, id: Uuid) -> Result<(), AppError> {
        let mut tx = self.pool.begin().await?;

        if self.repo.count_customer_references(&mut *tx, id).await? > 0 {
            tracing::warn!("Exclusão do cliente {} recusada: ainda referenciado", id);
            return Err(AppError::ResourceInUse("customer"));
        }

        self.repo.delete_sites_of(&mut *tx, id).await?;
        if !self.repo.delete_customer(&mut *tx, id).await? {
            return Err(AppError::NotFound("customer"));
        }

        tx.commit().await?;
        Ok(())
    }

    pub async fn upload_gst_certificate(
        &self,
        id: Uuid,
        content_type: Option<&str>,
        bytes: &[u8],
    ) -> Result<Customer, AppError> {
        validate_pdf_upload(content_type, bytes, self.max_upload_bytes)?;

        // Grava o caminho primeiro (sem commit): registro inexistente não deixa arquivo no disco
        let path = gst_certificate_path("customers", id);
        let mut tx = self.pool.begin().await?;
        let customer = self
            .repo
            .set_gst_certificate(&mut *tx, id, &path)
            .await?
            .ok_or(AppError::NotFound("customer"))?;

        self.documents.save(&path, bytes).await?;
        if let Err(e) = tx.commit().await {
            tracing::error!("Commit do certificado GST falhou; arquivo órfão em {}", path);
            return Err(e.into());
        }
        Ok(customer)
    }

    pub async fn download_gst_certificate(&self, id: Uuid) -> Result<Vec<u8>, AppError> {
        let customer = self.get_customer(id).await?;
        let path = customer
            .gst_certificate_path
            .ok_or(AppError::GstCertificateMissing)?;
        self.documents.load(&path).await
    }

    // =========================================================================
    //  SITES
    // =========================================================================

    pub async fn list_sites(&self, customer_id: Option<Uuid>) -> Result<Vec<Site>, AppError> {
        self.repo.list_sites(customer_id).await
    }

    pub async fn list_customer_sites(&self, customer_id: Uuid) -> Result<Vec<Site>, AppError> {
        self.get_customer(customer_id).await?;
        self.repo.list_sites(Some(customer_id)).await
    }

    pub async fn get_site(&self, id: Uuid) -> Result<Site, AppError> {
        self.repo
            .find_site(&self.pool, id)
            .await?
            .ok_or(AppError::NotFound("site"))
    }

    pub async fn create_site(&self, payload: &CreateSitePayload) -> Result<Site, AppError> {
        self.get_customer(payload.customer_id).await?;

        let mut tx = self.pool.begin().await?;
        let code = self
            .codes
            .next_code(&mut tx, CodeKind::Site, Utc::now().date_naive())
            .await?;
        let site = self.repo.create_site(&mut *tx, &code, payload).await?;
        tx.commit().await?;

        Ok(site)
    }

    pub async fn update_site(&self, id: Uuid, changes: &UpdateSitePayload) -> Result<Site, AppError> {
        self.repo
            .update_site(&self.pool, id, changes)
            .await?
            .ok_or(AppError::NotFound("site"))
    }

    pub async fn delete_site(&self, id: Uuid) -> Result<(), AppError> {
        if !self.repo.delete_site(&self.pool, id).await? {
            return Err(AppError::NotFound("site"));
        }
        Ok(())
    }
}

/// O site (quando informado) precisa ser do cliente. Usado por entregas, contratos e tickets.
pub async fn ensure_site_of_customer(
    repo: &CustomerRepository,
    conn: &mut PgConnection,
    site_id: Option<Uuid>,
    customer_id: Uuid,
) -> Result<(), AppError> {
    let Some(site_id) = site_id else {
        return Ok(());
    };
    let site = repo
        .find_site(conn, site_id)
        .await?
        .ok_or(AppError::NotFound("site"))?;
    if site.customer_id != customer_id {
        return Err(AppError::BusinessRule("site_customer_mismatch"));
    }
    Ok(())
}
