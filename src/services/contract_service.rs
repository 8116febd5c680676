// src/services/contract_service.rs

use chrono::Utc;
use sqlx::{PgConnection, PgPool};
use uuid::Uuid;

use crate::{
    common::{
        codes::{CodeGenerator, CodeKind},
        error::AppError,
    },
    db::{ContractRepository, CustomerRepository, InventoryRepository},
    models::contract::{
        ContractQuery, CreateContractPayload, ServiceContract, ServiceContractDetail, UpdateContractPayload,
    },
    services::customer_service::ensure_site_of_customer,
};

#[derive(Clone)]
pub struct ContractService {
    contract_repo: ContractRepository,
    inventory_repo: InventoryRepository,
    customer_repo: CustomerRepository,
    codes: CodeGenerator,
    pool: PgPool,
}

impl ContractService {
    pub fn new(
        contract_repo: ContractRepository,
        inventory_repo: InventoryRepository,
        customer_repo: CustomerRepository,
        codes: CodeGenerator,
        pool: PgPool,
    ) -> Self {
        Self { contract_repo, inventory_repo, customer_repo, codes, pool }
    }

    pub async fn list_contracts(&self, query: &ContractQuery) -> Result<Vec<ServiceContract>, AppError> {
        let active_on = match query.active {
            Some(true) => Some(Utc::now().date_naive()),
            _ => None,
        };
        self.contract_repo.list_contracts(query.customer_id, active_on).await
    }

    pub async fn get_contract(&self, id: Uuid) -> Result<ServiceContractDetail, AppError> {
        let mut conn = self.pool.acquire().await?;
        let header = self
            .contract_repo
            .find_contract(&mut *conn, id)
            .await?
            .ok_or(AppError::NotFound("contract"))?;
        self.detail(&mut conn, header).await
    }

    pub async fn create_contract(&self, payload: &CreateContractPayload) -> Result<ServiceContractDetail, AppError> {
        let mut tx = self.pool.begin().await?;

        ensure_site_of_customer(&self.customer_repo, &mut tx, payload.site_id, payload.customer_id).await?;

        let contract_no = self
            .codes
            .next_code(&mut tx, CodeKind::ServiceContract, Utc::now().date_naive())
            .await?;
        let header = self.contract_repo.create_contract(&mut *tx, &contract_no, payload).await?;

        self.cover_serials(&mut tx, header.id, &payload.serial_numbers).await?;
        let detail = self.detail(&mut tx, header).await?;

        tx.commit().await?;
        tracing::info!(
            "📝 Contrato {} criado cobrindo {} serial(is)",
            detail.header.contract_no,
            detail.items.len()
        );
        Ok(detail)
    }

    pub async fn update_contract(
        &self,
        id: Uuid,
        changes: &UpdateContractPayload,
    ) -> Result<ServiceContractDetail, AppError> {
        let mut tx = self.pool.begin().await?;

        let current = self
            .contract_repo
            .find_contract(&mut *tx, id)
            .await?
            .ok_or(AppError::NotFound("contract"))?;
        ensure_site_of_customer(&self.customer_repo, &mut tx, changes.site_id, current.customer_id).await?;

        let header = self
            .contract_repo
            .update_contract(&mut *tx, id, changes)
            .await?
            .ok_or(AppError::NotFound("contract"))?;

        // Lista nova substitui a cobertura inteira
        if let Some(serials) = &changes.serial_numbers {
            self.contract_repo.clear_coverage(&mut *tx, id).await?;
            self.cover_serials(&mut tx, id, serials).await?;
        }

        let detail = self.detail(&mut tx, header).await?;
        tx.commit().await?;
        Ok(detail)
    }

    pub async fn delete_contract(&self, id: Uuid) -> Result<(), AppError> {
        let mut tx = self.pool.begin().await?;

        self.contract_repo.clear_coverage(&mut *tx, id).await?;
        if !self.contract_repo.delete_contract(&mut *tx, id).await? {
            return Err(AppError::NotFound("contract"));
        }

        tx.commit().await?;
        Ok(())
    }

    async fn cover_serials(
        &self,
        conn: &mut PgConnection,
        contract_id: Uuid,
        serial_numbers: &[String],
    ) -> Result<(), AppError> {
        let mut serials: Vec<String> = serial_numbers
            .iter()
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty())
            .collect();
        serials.sort();
        serials.dedup();
        if serials.is_empty() {
            return Ok(());
        }

        let items = self.inventory_repo.find_items_by_serials(&mut *conn, &serials).await?;
        if let Some(missing) = serials
            .iter()
            .find(|s| !items.iter().any(|i| &i.serial_number == *s))
        {
            return Err(AppError::SerialNotFound(missing.clone()));
        }

        let ids: Vec<Uuid> = items.iter().map(|i| i.id).collect();
        self.contract_repo.add_coverage(&mut *conn, contract_id, &ids).await?;
        Ok(())
    }

    async fn detail(
        &self,
        conn: &mut PgConnection,
        header: ServiceContract,
    ) -> Result<ServiceContractDetail, AppError> {
        let ids = self.contract_repo.covered_item_ids(&mut *conn, header.id).await?;
        let items = self.inventory_repo.find_stock_by_ids(&mut *conn, &ids).await?;
        Ok(ServiceContractDetail {
            is_active: header.is_active_on(Utc::now().date_naive()),
            header,
            items,
        })
    }
}
