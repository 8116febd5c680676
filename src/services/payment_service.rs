// src/services/payment_service.rs

use rust_decimal::Decimal;
use sqlx::{PgConnection, PgPool};
use uuid::Uuid;

use crate::{
    common::error::AppError,
    db::{InventoryRepository, PaymentRepository},
    models::{
        inventory::Inventory,
        payment::{reconcile, CreatePaymentPayload, PaymentQuery, Reconciliation, UpdatePaymentPayload, VendorPayment},
    },
};

#[derive(Clone)]
pub struct PaymentService {
    payment_repo: PaymentRepository,
    inventory_repo: InventoryRepository,
    pool: PgPool,
}

impl PaymentService {
    pub fn new(payment_repo: PaymentRepository, inventory_repo: InventoryRepository, pool: PgPool) -> Self {
        Self { payment_repo, inventory_repo, pool }
    }

    pub async fn list_payments(&self, query: &PaymentQuery) -> Result<Vec<VendorPayment>, AppError> {
        self.payment_repo.list_payments(query.vendor_id, query.inventory_id).await
    }

    pub async fn get_payment(&self, id: Uuid) -> Result<VendorPayment, AppError> {
        self.payment_repo
            .find_payment(&self.pool, id)
            .await?
            .ok_or(AppError::NotFound("payment"))
    }

    /// Lança o pagamento e atualiza saldo e status da nota na mesma transação.
    pub async fn create_payment(&self, payload: &CreatePaymentPayload) -> Result<VendorPayment, AppError> {
        let mut tx = self.pool.begin().await?;

        let invoice = self.lock_invoice(&mut tx, payload.inventory_id).await?;
        if invoice.vendor_id != payload.vendor_id {
            return Err(AppError::VendorMismatch);
        }

        let others = self.payment_repo.total_paid(&mut *tx, invoice.id, None).await?;
        let outcome = settle(invoice.invoice_gross_amount, others, payload.amount_paid)?;

        let payment = self
            .payment_repo
            .create_payment(&mut *tx, payload, outcome.due_amount)
            .await?;
        self.inventory_repo
            .set_reconciliation(&mut *tx, invoice.id, outcome.due_amount, outcome.payment_status)
            .await?;

        tx.commit().await?;
        tracing::info!(
            "💰 Pagamento de {} na nota {} (saldo {})",
            payment.amount_paid,
            invoice.purchase_invoice_no,
            outcome.due_amount
        );
        Ok(payment)
    }

    pub async fn update_payment(&self, id: Uuid, changes: &UpdatePaymentPayload) -> Result<VendorPayment, AppError> {
        let mut tx = self.pool.begin().await?;

        let current = self
            .payment_repo
            .find_payment(&mut *tx, id)
            .await?
            .ok_or(AppError::NotFound("payment"))?;
        let invoice = self.lock_invoice(&mut tx, current.inventory_id).await?;

        let amount = changes.amount_paid.unwrap_or(current.amount_paid);
        let others = self.payment_repo.total_paid(&mut *tx, invoice.id, Some(id)).await?;
        let outcome = settle(invoice.invoice_gross_amount, others, amount)?;

        let payment = self
            .payment_repo
            .update_payment(
                &mut *tx,
                id,
                changes.payment_date.unwrap_or(current.payment_date),
                amount,
                changes.payment_mode.unwrap_or(current.payment_mode),
                changes.reference_no.as_deref().or(current.reference_no.as_deref()),
                changes.remarks.as_deref().or(current.remarks.as_deref()),
                outcome.due_amount,
            )
            .await?;
        self.inventory_repo
            .set_reconciliation(&mut *tx, invoice.id, outcome.due_amount, outcome.payment_status)
            .await?;

        tx.commit().await?;
        Ok(payment)
    }

    /// Exclui o pagamento e devolve o valor ao saldo da nota.
    pub async fn delete_payment(&self, id: Uuid) -> Result<(), AppError> {
        let mut tx = self.pool.begin().await?;

        let current = self
            .payment_repo
            .find_payment(&mut *tx, id)
            .await?
            .ok_or(AppError::NotFound("payment"))?;
        let invoice = self.lock_invoice(&mut tx, current.inventory_id).await?;

        self.payment_repo.delete_payment(&mut *tx, id).await?;
        let paid = self.payment_repo.total_paid(&mut *tx, invoice.id, None).await?;
        let outcome = settle(invoice.invoice_gross_amount, paid, Decimal::ZERO)?;
        self.inventory_repo
            .set_reconciliation(&mut *tx, invoice.id, outcome.due_amount, outcome.payment_status)
            .await?;

        tx.commit().await?;
        Ok(())
    }

    // Trava a nota: pagamentos concorrentes na mesma nota ficam em fila
    async fn lock_invoice(&self, conn: &mut PgConnection, inventory_id: Uuid) -> Result<Inventory, AppError> {
        self.inventory_repo
            .lock_invoice(conn, inventory_id)
            .await?
            .ok_or(AppError::NotFound("inventory"))
    }
}

/// Saldo depois de somar `amount` aos `others` já pagos.
fn settle(gross: Decimal, others: Decimal, amount: Decimal) -> Result<Reconciliation, AppError> {
    reconcile(gross, others + amount).ok_or(AppError::PaymentExceedsDue { due: gross - others })
}

#[cfg(test)]
mod tests {
    use chrono::NaiveDate;

    use super::*;
    use crate::{
        common::test_support::{seed_invoice, seed_vendor},
        models::{inventory::PaymentStatus, payment::PaymentMode},
    };

    #[test]
    fn payment_within_due_is_accepted() {
        let r = settle(Decimal::new(1000, 0), Decimal::new(400, 0), Decimal::new(600, 0)).unwrap();
        assert_eq!(r.due_amount, Decimal::ZERO);
        assert_eq!(r.payment_status, PaymentStatus::Paid);
    }

    #[test]
    fn payment_above_due_reports_remaining_due() {
        match settle(Decimal::new(1000, 0), Decimal::new(400, 0), Decimal::new(601, 0)) {
            Err(AppError::PaymentExceedsDue { due }) => assert_eq!(due, Decimal::new(600, 0)),
            other => panic!("esperava PaymentExceedsDue, veio {other:?}"),
        }
    }

    fn service(pool: &PgPool) -> PaymentService {
        PaymentService::new(PaymentRepository::new(pool.clone()), InventoryRepository::new(pool.clone()), pool.clone())
    }

    fn payment(vendor_id: Uuid, inventory_id: Uuid, amount: i64) -> CreatePaymentPayload {
        CreatePaymentPayload {
            vendor_id,
            inventory_id,
            payment_date: NaiveDate::from_ymd_opt(2025, 2, 1).unwrap(),
            amount_paid: Decimal::new(amount, 0),
            payment_mode: PaymentMode::Neft,
            reference_no: None,
            remarks: None,
        }
    }

    async fn invoice_balance(pool: &PgPool, inventory_id: Uuid) -> (Decimal, PaymentStatus) {
        sqlx::query_as("SELECT due_amount, payment_status FROM inventory WHERE id = $1")
            .bind(inventory_id)
            .fetch_one(pool)
            .await
            .unwrap()
    }

    #[sqlx::test(migrations = "./migrations")]
    async fn payments_keep_the_invoice_balance(pool: PgPool) {
        let vendor_id = seed_vendor(&pool).await;
        let invoice_id = seed_invoice(&pool, vendor_id, Decimal::new(1000, 0)).await;
        let payments = service(&pool);

        let first = payments.create_payment(&payment(vendor_id, invoice_id, 400)).await.unwrap();
        assert_eq!(first.due_amount, Decimal::new(600, 0));
        assert_eq!(invoice_balance(&pool, invoice_id).await, (Decimal::new(600, 0), PaymentStatus::Partial));

        let second = payments.create_payment(&payment(vendor_id, invoice_id, 600)).await.unwrap();
        assert_eq!(invoice_balance(&pool, invoice_id).await, (Decimal::ZERO, PaymentStatus::Paid));

        // Reduzir o primeiro pagamento reabre o saldo
        let changes = UpdatePaymentPayload { amount_paid: Some(Decimal::new(100, 0)), ..Default::default() };
        payments.update_payment(first.id, &changes).await.unwrap();
        assert_eq!(invoice_balance(&pool, invoice_id).await, (Decimal::new(300, 0), PaymentStatus::Partial));

        payments.delete_payment(second.id).await.unwrap();
        assert_eq!(invoice_balance(&pool, invoice_id).await, (Decimal::new(900, 0), PaymentStatus::Partial));

        payments.delete_payment(first.id).await.unwrap();
        assert_eq!(invoice_balance(&pool, invoice_id).await, (Decimal::new(1000, 0), PaymentStatus::Unpaid));
    }

    #[sqlx::test(migrations = "./migrations")]
    async fn overpayment_leaves_the_invoice_untouched(pool: PgPool) {
        let vendor_id = seed_vendor(&pool).await;
        let invoice_id = seed_invoice(&pool, vendor_id, Decimal::new(1000, 0)).await;
        let payments = service(&pool);

        let first = payments.create_payment(&payment(vendor_id, invoice_id, 700)).await.unwrap();
        match payments.create_payment(&payment(vendor_id, invoice_id, 301)).await {
            Err(AppError::PaymentExceedsDue { due }) => assert_eq!(due, Decimal::new(300, 0)),
            other => panic!("esperava PaymentExceedsDue, veio {other:?}"),
        }

        let changes = UpdatePaymentPayload { amount_paid: Some(Decimal::new(1001, 0)), ..Default::default() };
        assert!(matches!(
            payments.update_payment(first.id, &changes).await,
            Err(AppError::PaymentExceedsDue { .. })
        ));
        assert_eq!(invoice_balance(&pool, invoice_id).await, (Decimal::new(300, 0), PaymentStatus::Partial));
    }

    #[sqlx::test(migrations = "./migrations")]
    async fn payment_must_match_the_invoice_vendor(pool: PgPool) {
        let vendor_id = seed_vendor(&pool).await;
        let other_vendor = seed_vendor(&pool).await;
        let invoice_id = seed_invoice(&pool, vendor_id, Decimal::new(1000, 0)).await;

        assert!(matches!(
            service(&pool).create_payment(&payment(other_vendor, invoice_id, 100)).await,
            Err(AppError::VendorMismatch)
        ));
    }
}
