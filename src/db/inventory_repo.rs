// src/db/inventory_repo.rs

use chrono::NaiveDate;
use rust_decimal::Decimal;
use sqlx::{Executor, PgPool, Postgres};
use uuid::Uuid;

use crate::{
    common::{db_utils::in_use_on_fk, error::AppError},
    models::inventory::{
        Inventory, InventoryLinePayload, InventoryStatus, PaymentStatus, ProductInventory, StockItem,
    },
};

// Serial + produto + nota. Usado em todas as consultas de estoque.
const STOCK_ITEM_SELECT: &str = r#"
    SELECT
        pi.*,
        p.part_number,
        p.name AS product_name,
        i.vendor_id,
        i.purchase_invoice_no
    FROM product_inventory pi
    JOIN products p ON p.id = pi.product_id
    JOIN inventory i ON i.id = pi.inventory_id
"#;

#[derive(Clone)]
pub struct InventoryRepository {
    pool: PgPool,
}

impl InventoryRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    // =========================================================================
    //  NOTAS DE COMPRA (cabeçalho)
    // =========================================================================

    pub async fn list_invoices(
        &self,
        vendor_id: Option<Uuid>,
        payment_status: Option<PaymentStatus>,
    ) -> Result<Vec<Inventory>, AppError> {
        let invoices = sqlx::query_as::<_, Inventory>(
            r#"
            SELECT * FROM inventory
            WHERE ($1::uuid IS NULL OR vendor_id = $1)
              AND ($2::payment_status IS NULL OR payment_status = $2)
            ORDER BY purchase_date DESC, created_at DESC
            "#,
        )
        .bind(vendor_id)
        .bind(payment_status)
        .fetch_all(&self.pool)
        .await?;
        Ok(invoices)
    }

    pub async fn find_invoice<'e, E>(&self, executor: E, id: Uuid) -> Result<Option<Inventory>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let invoice = sqlx::query_as::<_, Inventory>("SELECT * FROM inventory WHERE id = $1")
            .bind(id)
            .fetch_optional(executor)
            .await?;
        Ok(invoice)
    }

    /// Trava a linha da nota até o fim da transação (reconciliação de saldo).
    pub async fn lock_invoice<'e, E>(&self, executor: E, id: Uuid) -> Result<Option<Inventory>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let invoice = sqlx::query_as::<_, Inventory>("SELECT * FROM inventory WHERE id = $1 FOR UPDATE")
            .bind(id)
            .fetch_optional(executor)
            .await?;
        Ok(invoice)
    }

    #[allow(clippy::too_many_arguments)]
    pub async fn create_invoice<'e, E>(
        &self,
        executor: E,
        vendor_id: Uuid,
        purchase_invoice_no: &str,
        purchase_date: NaiveDate,
        credit_terms_days: i32,
        due_date: NaiveDate,
        invoice_gross_amount: Decimal,
        payment_status: PaymentStatus,
    ) -> Result<Inventory, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        // Nota nova: nada pago ainda, saldo = bruto
        let invoice = sqlx::query_as::<_, Inventory>(
            r#"
            INSERT INTO inventory (
                vendor_id, purchase_invoice_no, purchase_date, credit_terms_days,
                due_date, invoice_gross_amount, due_amount, payment_status
            )
            VALUES ($1, $2, $3, $4, $5, $6, $6, $7)
            RETURNING *
            "#,
        )
        .bind(vendor_id)
        .bind(purchase_invoice_no)
        .bind(purchase_date)
        .bind(credit_terms_days)
        .bind(due_date)
        .bind(invoice_gross_amount)
        .bind(payment_status)
        .fetch_one(executor)
        .await?;
        Ok(invoice)
    }

    #[allow(clippy::too_many_arguments)]
    pub async fn update_invoice_header<'e, E>(
        &self,
        executor: E,
        id: Uuid,
        purchase_invoice_no: &str,
        purchase_date: NaiveDate,
        credit_terms_days: i32,
        due_date: NaiveDate,
        invoice_gross_amount: Decimal,
    ) -> Result<Inventory, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let invoice = sqlx::query_as::<_, Inventory>(
            r#"
            UPDATE inventory SET
                purchase_invoice_no = $2,
                purchase_date = $3,
                credit_terms_days = $4,
                due_date = $5,
                invoice_gross_amount = $6,
                updated_at = NOW()
            WHERE id = $1
            RETURNING *
            "#,
        )
        .bind(id)
        .bind(purchase_invoice_no)
        .bind(purchase_date)
        .bind(credit_terms_days)
        .bind(due_date)
        .bind(invoice_gross_amount)
        .fetch_one(executor)
        .await?;
        Ok(invoice)
    }

    pub async fn set_reconciliation<'e, E>(
        &self,
        executor: E,
        id: Uuid,
        due_amount: Decimal,
        payment_status: PaymentStatus,
    ) -> Result<Inventory, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let invoice = sqlx::query_as::<_, Inventory>(
            r#"
            UPDATE inventory SET due_amount = $2, payment_status = $3, updated_at = NOW()
            WHERE id = $1
            RETURNING *
            "#,
        )
        .bind(id)
        .bind(due_amount)
        .bind(payment_status)
        .fetch_one(executor)
        .await?;
        Ok(invoice)
    }

    pub async fn delete_invoice<'e, E>(&self, executor: E, id: Uuid) -> Result<bool, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let result = sqlx::query("DELETE FROM inventory WHERE id = $1")
            .bind(id)
            .execute(executor)
            .await
            .map_err(in_use_on_fk("inventory"))?;
        Ok(result.rows_affected() > 0)
    }

    // =========================================================================
    //  LINHAS (seriais)
    // =========================================================================

    pub async fn insert_line<'e, E>(
        &self,
        executor: E,
        inventory_id: Uuid,
        line: &InventoryLinePayload,
    ) -> Result<ProductInventory, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let item = sqlx::query_as::<_, ProductInventory>(
            r#"
            INSERT INTO product_inventory (
                inventory_id, product_id, serial_number, mac_address, purchase_rate, warranty_months
            )
            VALUES ($1, $2, $3, $4, $5, $6)
            RETURNING *
            "#,
        )
        .bind(inventory_id)
        .bind(line.product_id)
        .bind(line.serial_number.trim())
        .bind(line.mac_address.as_deref())
        .bind(line.purchase_rate)
        .bind(line.warranty_months)
        .fetch_one(executor)
        .await?;
        Ok(item)
    }

    pub async fn list_lines<'e, E>(&self, executor: E, inventory_id: Uuid) -> Result<Vec<ProductInventory>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let items = sqlx::query_as::<_, ProductInventory>(
            "SELECT * FROM product_inventory WHERE inventory_id = $1 ORDER BY serial_number ASC",
        )
        .bind(inventory_id)
        .fetch_all(executor)
        .await?;
        Ok(items)
    }

    /// Linhas da nota que já saíram numa entrega ou estão em algum contrato.
    pub async fn count_committed_lines<'e, E>(&self, executor: E, inventory_id: Uuid) -> Result<i64, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let count = sqlx::query_scalar::<_, i64>(
            r#"
            SELECT COUNT(*) FROM product_inventory pi
            WHERE pi.inventory_id = $1
              AND (
                EXISTS (SELECT 1 FROM material_delivery_items mdi WHERE mdi.product_inventory_id = pi.id)
                OR EXISTS (SELECT 1 FROM contract_inventory ci WHERE ci.product_inventory_id = pi.id)
              )
            "#,
        )
        .bind(inventory_id)
        .fetch_one(executor)
        .await?;
        Ok(count)
    }

    pub async fn delete_lines_of<'e, E>(&self, executor: E, inventory_id: Uuid) -> Result<u64, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let result = sqlx::query("DELETE FROM product_inventory WHERE inventory_id = $1")
            .bind(inventory_id)
            .execute(executor)
            .await
            .map_err(in_use_on_fk("product_inventory"))?;
        Ok(result.rows_affected())
    }

    // =========================================================================
    //  CONSULTAS DE ESTOQUE
    // =========================================================================

    pub async fn list_stock(
        &self,
        status: Option<InventoryStatus>,
        product_id: Option<Uuid>,
    ) -> Result<Vec<StockItem>, AppError> {
        let sql = format!(
            "{STOCK_ITEM_SELECT}
            WHERE ($1::inventory_status IS NULL OR pi.status = $1)
              AND ($2::uuid IS NULL OR pi.product_id = $2)
            ORDER BY p.name ASC, pi.serial_number ASC"
        );
        let items = sqlx::query_as::<_, StockItem>(&sql)
            .bind(status)
            .bind(product_id)
            .fetch_all(&self.pool)
            .await?;
        Ok(items)
    }

    pub async fn find_stock_by_serial(&self, serial_number: &str) -> Result<Option<StockItem>, AppError> {
        let sql = format!("{STOCK_ITEM_SELECT} WHERE pi.serial_number = $1");
        let item = sqlx::query_as::<_, StockItem>(&sql)
            .bind(serial_number)
            .fetch_optional(&self.pool)
            .await?;
        Ok(item)
    }

    pub async fn find_stock_by_ids<'e, E>(&self, executor: E, ids: &[Uuid]) -> Result<Vec<StockItem>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let sql = format!("{STOCK_ITEM_SELECT} WHERE pi.id = ANY($1) ORDER BY pi.serial_number ASC");
        let items = sqlx::query_as::<_, StockItem>(&sql)
            .bind(ids)
            .fetch_all(executor)
            .await?;
        Ok(items)
    }

    /// Trava os seriais pedidos (entregas mudam o status deles).
    pub async fn lock_items_by_serials<'e, E>(
        &self,
        executor: E,
        serials: &[String],
    ) -> Result<Vec<ProductInventory>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let items = sqlx::query_as::<_, ProductInventory>(
            "SELECT * FROM product_inventory WHERE serial_number = ANY($1) ORDER BY id FOR UPDATE",
        )
        .bind(serials)
        .fetch_all(executor)
        .await?;
        Ok(items)
    }

    pub async fn lock_items_by_ids<'e, E>(&self, executor: E, ids: &[Uuid]) -> Result<Vec<ProductInventory>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let items = sqlx::query_as::<_, ProductInventory>(
            "SELECT * FROM product_inventory WHERE id = ANY($1) ORDER BY id FOR UPDATE",
        )
        .bind(ids)
        .fetch_all(executor)
        .await?;
        Ok(items)
    }

    pub async fn find_items_by_serials<'e, E>(
        &self,
        executor: E,
        serials: &[String],
    ) -> Result<Vec<ProductInventory>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let items = sqlx::query_as::<_, ProductInventory>(
            "SELECT * FROM product_inventory WHERE serial_number = ANY($1)",
        )
        .bind(serials)
        .fetch_all(executor)
        .await?;
        Ok(items)
    }

    pub async fn set_item_status<'e, E>(
        &self,
        executor: E,
        id: Uuid,
        status: InventoryStatus,
    ) -> Result<(), AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        sqlx::query("UPDATE product_inventory SET status = $2, updated_at = NOW() WHERE id = $1")
            .bind(id)
            .bind(status)
            .execute(executor)
            .await?;
        Ok(())
    }
}
