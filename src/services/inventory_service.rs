// src/services/inventory_service.rs

use sqlx::{PgConnection, PgPool};
use uuid::Uuid;

use crate::{
    common::error::AppError,
    db::{InventoryRepository, PaymentRepository},
    models::{
        inventory::{
            due_date_for, CreateInventoryPayload, Inventory, InventoryDetail, InventoryLinePayload,
            InventoryQuery, PaymentStatus, StockItem, StockQuery, UpdateInventoryPayload,
        },
        payment::reconcile,
    },
};

#[derive(Clone)]
pub struct InventoryService {
    inventory_repo: InventoryRepository,
    payment_repo: PaymentRepository,
    pool: PgPool,
}

impl InventoryService {
    pub fn new(inventory_repo: InventoryRepository, payment_repo: PaymentRepository, pool: PgPool) -> Self {
        Self { inventory_repo, payment_repo, pool }
    }

    // --- LISTAGEM / DETALHE ---

    pub async fn list_invoices(&self, query: &InventoryQuery) -> Result<Vec<Inventory>, AppError> {
        self.inventory_repo
            .list_invoices(query.vendor_id, query.payment_status)
            .await
    }

    pub async fn get_invoice(&self, id: Uuid) -> Result<InventoryDetail, AppError> {
        let header = self
            .inventory_repo
            .find_invoice(&self.pool, id)
            .await?
            .ok_or(AppError::NotFound("inventory"))?;
        let items = self.inventory_repo.list_lines(&self.pool, id).await?;
        Ok(InventoryDetail { header, items })
    }

    // --- CREATE (cabeçalho + seriais na mesma transação) ---
    pub async fn create_invoice(&self, payload: &CreateInventoryPayload) -> Result<InventoryDetail, AppError> {
        let mut tx = self.pool.begin().await?;

        let due_date = due_date_for(payload.purchase_date, payload.credit_terms_days);
        let gross = payload.invoice_gross_amount;

        let header = self
            .inventory_repo
            .create_invoice(
                &mut *tx,
                payload.vendor_id,
                payload.purchase_invoice_no.trim(),
                payload.purchase_date,
                payload.credit_terms_days,
                due_date,
                gross,
                PaymentStatus::from_amounts(gross, gross),
            )
            .await?;

        let items = self.insert_lines(&mut tx, header.id, &payload.items).await?;

        tx.commit().await?;
        tracing::info!(
            "📦 Nota {} registrada com {} serial(is)",
            header.purchase_invoice_no,
            items.len()
        );
        Ok(InventoryDetail { header, items })
    }

    // --- UPDATE (mudar o bruto refaz a conciliação) ---
    pub async fn update_invoice(
        &self,
        id: Uuid,
        changes: &UpdateInventoryPayload,
    ) -> Result<InventoryDetail, AppError> {
        let mut tx = self.pool.begin().await?;

        let current = self
            .inventory_repo
            .lock_invoice(&mut *tx, id)
            .await?
            .ok_or(AppError::NotFound("inventory"))?;

        let purchase_date = changes.purchase_date.unwrap_or(current.purchase_date);
        let credit_terms_days = changes.credit_terms_days.unwrap_or(current.credit_terms_days);
        let gross = changes.invoice_gross_amount.unwrap_or(current.invoice_gross_amount);
        let invoice_no = changes
            .purchase_invoice_no
            .as_deref()
            .map(str::trim)
            .unwrap_or(&current.purchase_invoice_no)
            .to_string();

        let mut header = self
            .inventory_repo
            .update_invoice_header(
                &mut *tx,
                id,
                &invoice_no,
                purchase_date,
                credit_terms_days,
                due_date_for(purchase_date, credit_terms_days),
                gross,
            )
            .await?;

        if gross != current.invoice_gross_amount {
            let paid = self.payment_repo.total_paid(&mut *tx, id, None).await?;
            let outcome = reconcile(gross, paid).ok_or(AppError::GrossBelowPaid { paid })?;
            header = self
                .inventory_repo
                .set_reconciliation(&mut *tx, id, outcome.due_amount, outcome.payment_status)
                .await?;
        }

        self.insert_lines(&mut tx, id, &changes.new_items).await?;
        let items = self.inventory_repo.list_lines(&mut *tx, id).await?;

        tx.commit().await?;
        Ok(InventoryDetail { header, items })
    }

    // --- DELETE (linhas e pagamentos juntos) ---
    pub async fn delete_invoice(&self, id: Uuid) -> Result<(), AppError> {
        let mut tx = self.pool.begin().await?;

        self.inventory_repo
            .lock_invoice(&mut *tx, id)
            .await?
            .ok_or(AppError::NotFound("inventory"))?;

        if self.inventory_repo.count_committed_lines(&mut *tx, id).await? > 0 {
            tracing::warn!("Exclusão da nota {} recusada: seriais já movimentados", id);
            return Err(AppError::Conflict("inventory_items_locked"));
        }

        self.payment_repo.delete_payments_of(&mut *tx, id).await?;
        self.inventory_repo.delete_lines_of(&mut *tx, id).await?;
        self.inventory_repo.delete_invoice(&mut *tx, id).await?;

        tx.commit().await?;
        Ok(())
    }

    // --- ESTOQUE ---

    pub async fn list_stock(&self, query: &StockQuery) -> Result<Vec<StockItem>, AppError> {
        self.inventory_repo.list_stock(query.status, query.product_id).await
    }

    pub async fn find_by_serial(&self, serial_number: &str) -> Result<StockItem, AppError> {
        let serial = serial_number.trim();
        self.inventory_repo
            .find_stock_by_serial(serial)
            .await?
            .ok_or_else(|| AppError::SerialNotFound(serial.to_string()))
    }

    async fn insert_lines(
        &self,
        conn: &mut PgConnection,
        inventory_id: Uuid,
        lines: &[InventoryLinePayload],
    ) -> Result<Vec<crate::models::inventory::ProductInventory>, AppError> {
        let mut items = Vec::with_capacity(lines.len());
        for line in lines {
            items.push(self.inventory_repo.insert_line(&mut *conn, inventory_id, line).await?);
        }
        Ok(items)
    }
}
