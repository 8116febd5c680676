// src/db/payment_repo.rs

use chrono::NaiveDate;
use rust_decimal::Decimal;
use sqlx::{Executor, PgPool, Postgres};
use uuid::Uuid;

use crate::{
    common::error::AppError,
    models::payment::{CreatePaymentPayload, PaymentMode, VendorPayment},
};

#[derive(Clone)]
pub struct PaymentRepository {
    pool: PgPool,
}

impl PaymentRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub async fn list_payments(
        &self,
        vendor_id: Option<Uuid>,
        inventory_id: Option<Uuid>,
    ) -> Result<Vec<VendorPayment>, AppError> {
        let payments = sqlx::query_as::<_, VendorPayment>(
            r#"
            SELECT * FROM vendor_payments
            WHERE ($1::uuid IS NULL OR vendor_id = $1)
              AND ($2::uuid IS NULL OR inventory_id = $2)
            ORDER BY payment_date DESC, created_at DESC
            "#,
        )
        .bind(vendor_id)
        .bind(inventory_id)
        .fetch_all(&self.pool)
        .await?;
        Ok(payments)
    }

    pub async fn find_payment<'e, E>(&self, executor: E, id: Uuid) -> Result<Option<VendorPayment>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let payment = sqlx::query_as::<_, VendorPayment>("SELECT * FROM vendor_payments WHERE id = $1")
            .bind(id)
            .fetch_optional(executor)
            .await?;
        Ok(payment)
    }

    /// Soma dos pagamentos da nota, ignorando `except` (o pagamento sendo editado/excluído).
    pub async fn total_paid<'e, E>(
        &self,
        executor: E,
        inventory_id: Uuid,
        except: Option<Uuid>,
    ) -> Result<Decimal, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let total = sqlx::query_scalar::<_, Decimal>(
            r#"
            SELECT COALESCE(SUM(amount_paid), 0) FROM vendor_payments
            WHERE inventory_id = $1 AND ($2::uuid IS NULL OR id <> $2)
            "#,
        )
        .bind(inventory_id)
        .bind(except)
        .fetch_one(executor)
        .await?;
        Ok(total)
    }

    pub async fn create_payment<'e, E>(
        &self,
        executor: E,
        payload: &CreatePaymentPayload,
        due_amount: Decimal,
    ) -> Result<VendorPayment, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let payment = sqlx::query_as::<_, VendorPayment>(
            r#"
            INSERT INTO vendor_payments (
                vendor_id, inventory_id, payment_date, amount_paid, payment_mode,
                reference_no, remarks, due_amount
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
            RETURNING *
            "#,
        )
        .bind(payload.vendor_id)
        .bind(payload.inventory_id)
        .bind(payload.payment_date)
        .bind(payload.amount_paid)
        .bind(payload.payment_mode)
        .bind(payload.reference_no.as_deref())
        .bind(payload.remarks.as_deref())
        .bind(due_amount)
        .fetch_one(executor)
        .await?;
        Ok(payment)
    }

    #[allow(clippy::too_many_arguments)]
    pub async fn update_payment<'e, E>(
        &self,
        executor: E,
        id: Uuid,
        payment_date: NaiveDate,
        amount_paid: Decimal,
        payment_mode: PaymentMode,
        reference_no: Option<&str>,
        remarks: Option<&str>,
        due_amount: Decimal,
    ) -> Result<VendorPayment, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let payment = sqlx::query_as::<_, VendorPayment>(
            r#"
            UPDATE vendor_payments SET
                payment_date = $2,
                amount_paid = $3,
                payment_mode = $4,
                reference_no = $5,
                remarks = $6,
                due_amount = $7,
                updated_at = NOW()
            WHERE id = $1
            RETURNING *
            "#,
        )
        .bind(id)
        .bind(payment_date)
        .bind(amount_paid)
        .bind(payment_mode)
        .bind(reference_no)
        .bind(remarks)
        .bind(due_amount)
        .fetch_one(executor)
        .await?;
        Ok(payment)
    }

    pub async fn delete_payment<'e, E>(&self, executor: E, id: Uuid) -> Result<bool, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let result = sqlx::query("DELETE FROM vendor_payments WHERE id = $1")
            .bind(id)
            .execute(executor)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    pub async fn delete_payments_of<'e, E>(&self, executor: E, inventory_id: Uuid) -> Result<u64, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let result = sqlx::query("DELETE FROM vendor_payments WHERE inventory_id = $1")
            .bind(inventory_id)
            .execute(executor)
            .await?;
        Ok(result.rows_affected())
    }
}
