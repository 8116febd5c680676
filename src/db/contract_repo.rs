// src/db/contract_repo.rs

use chrono::NaiveDate;
use sqlx::{Executor, PgPool, Postgres};
use uuid::Uuid;

use crate::{
    common::error::AppError,
    models::contract::{CreateContractPayload, ServiceContract, UpdateContractPayload},
};

#[derive(Clone)]
pub struct ContractRepository {
    pool: PgPool,
}

impl ContractRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// `active_on`: quando presente, só contratos vigentes nessa data.
    pub async fn list_contracts(
        &self,
        customer_id: Option<Uuid>,
        active_on: Option<NaiveDate>,
    ) -> Result<Vec<ServiceContract>, AppError> {
        let contracts = sqlx::query_as::<_, ServiceContract>(
            r#"
            SELECT * FROM service_contracts
            WHERE ($1::uuid IS NULL OR customer_id = $1)
              AND ($2::date IS NULL OR $2 BETWEEN start_date AND end_date)
            ORDER BY end_date ASC
            "#,
        )
        .bind(customer_id)
        .bind(active_on)
        .fetch_all(&self.pool)
        .await?;
        Ok(contracts)
    }

    pub async fn find_contract<'e, E>(&self, executor: E, id: Uuid) -> Result<Option<ServiceContract>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let contract = sqlx::query_as::<_, ServiceContract>("SELECT * FROM service_contracts WHERE id = $1")
            .bind(id)
            .fetch_optional(executor)
            .await?;
        Ok(contract)
    }

    pub async fn create_contract<'e, E>(
        &self,
        executor: E,
        contract_no: &str,
        payload: &CreateContractPayload,
    ) -> Result<ServiceContract, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let contract = sqlx::query_as::<_, ServiceContract>(
            r#"
            INSERT INTO service_contracts (
                contract_no, customer_id, site_id, contract_type, start_date, end_date,
                contract_value, visit_frequency_months, notes
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9)
            RETURNING *
            "#,
        )
        .bind(contract_no)
        .bind(payload.customer_id)
        .bind(payload.site_id)
        .bind(payload.contract_type)
        .bind(payload.start_date)
        .bind(payload.end_date)
        .bind(payload.contract_value)
        .bind(payload.visit_frequency_months)
        .bind(payload.notes.as_deref())
        .fetch_one(executor)
        .await?;
        Ok(contract)
    }

    pub async fn update_contract<'e, E>(
        &self,
        executor: E,
        id: Uuid,
        changes: &UpdateContractPayload,
    ) -> Result<Option<ServiceContract>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let contract = sqlx::query_as::<_, ServiceContract>(
            r#"
            UPDATE service_contracts SET
                site_id = COALESCE($2, site_id),
                contract_type = COALESCE($3, contract_type),
                start_date = COALESCE($4, start_date),
                end_date = COALESCE($5, end_date),
                contract_value = COALESCE($6, contract_value),
                visit_frequency_months = COALESCE($7, visit_frequency_months),
                notes = COALESCE($8, notes),
                updated_at = NOW()
            WHERE id = $1
            RETURNING *
            "#,
        )
        .bind(id)
        .bind(changes.site_id)
        .bind(changes.contract_type)
        .bind(changes.start_date)
        .bind(changes.end_date)
        .bind(changes.contract_value)
        .bind(changes.visit_frequency_months)
        .bind(changes.notes.as_deref())
        .fetch_optional(executor)
        .await
        .map_err(|e| {
            // Datas parciais que invertem o período caem no CHECK do banco
            if let sqlx::Error::Database(db_err) = &e {
                if db_err.constraint() == Some("service_contracts_period_check") {
                    return AppError::BusinessRule("contract_period_invalid");
                }
            }
            e.into()
        })?;
        Ok(contract)
    }

    pub async fn delete_contract<'e, E>(&self, executor: E, id: Uuid) -> Result<bool, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let result = sqlx::query("DELETE FROM service_contracts WHERE id = $1")
            .bind(id)
            .execute(executor)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    // =========================================================================
    //  SERIAIS COBERTOS
    // =========================================================================

    pub async fn add_coverage<'e, E>(
        &self,
        executor: E,
        contract_id: Uuid,
        product_inventory_ids: &[Uuid],
    ) -> Result<u64, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let result = sqlx::query(
            r#"
            INSERT INTO contract_inventory (contract_id, product_inventory_id)
            SELECT $1, UNNEST($2::uuid[])
            ON CONFLICT (contract_id, product_inventory_id) DO NOTHING
            "#,
        )
        .bind(contract_id)
        .bind(product_inventory_ids)
        .execute(executor)
        .await?;
        Ok(result.rows_affected())
    }

    pub async fn covered_item_ids<'e, E>(&self, executor: E, contract_id: Uuid) -> Result<Vec<Uuid>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let ids = sqlx::query_scalar::<_, Uuid>(
            "SELECT product_inventory_id FROM contract_inventory WHERE contract_id = $1",
        )
        .bind(contract_id)
        .fetch_all(executor)
        .await?;
        Ok(ids)
    }

    pub async fn clear_coverage<'e, E>(&self, executor: E, contract_id: Uuid) -> Result<u64, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let result = sqlx::query("DELETE FROM contract_inventory WHERE contract_id = $1")
            .bind(contract_id)
            .execute(executor)
            .await?;
        Ok(result.rows_affected())
    }
}
