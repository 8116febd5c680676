// src/common/test_support.rs

// Cadastros mínimos para os testes com banco (#[sqlx::test])

use rust_decimal::Decimal;
use sqlx::PgPool;
use uuid::Uuid;

use crate::models::inventory::InventoryStatus;

// Códigos fora do padrão ENPL-* para não interferir na numeração sequencial
fn fixture_code(kind: &str) -> String {
    format!("FX-{}-{}", kind, Uuid::new_v4().simple())
}

pub async fn seed_vendor(pool: &PgPool) -> Uuid {
    sqlx::query_scalar("INSERT INTO vendors (vendor_code, name) VALUES ($1, 'Fornecedor Teste') RETURNING id")
        .bind(fixture_code("VEN"))
        .fetch_one(pool)
        .await
        .unwrap()
}

pub async fn seed_customer(pool: &PgPool) -> Uuid {
    sqlx::query_scalar("INSERT INTO customers (customer_code, name) VALUES ($1, 'Cliente Teste') RETURNING id")
        .bind(fixture_code("CUS"))
        .fetch_one(pool)
        .await
        .unwrap()
}

/// Nota de compra sem pagamentos: saldo igual ao valor bruto.
pub async fn seed_invoice(pool: &PgPool, vendor_id: Uuid, gross: Decimal) -> Uuid {
    sqlx::query_scalar(
        r#"
        INSERT INTO inventory
            (vendor_id, purchase_invoice_no, purchase_date, due_date, invoice_gross_amount, due_amount)
        VALUES ($1, $2, DATE '2025-01-20', DATE '2025-02-19', $3, $3)
        RETURNING id
        "#,
    )
    .bind(vendor_id)
    .bind(fixture_code("INV"))
    .bind(gross)
    .fetch_one(pool)
    .await
    .unwrap()
}

/// Serial em estoque, com produto e categoria próprios.
pub async fn seed_serial(pool: &PgPool, inventory_id: Uuid, serial: &str) -> Uuid {
    let category_id: Uuid = sqlx::query_scalar("INSERT INTO categories (name) VALUES ($1) RETURNING id")
        .bind(fixture_code("CAT"))
        .fetch_one(pool)
        .await
        .unwrap();
    let product_id: Uuid = sqlx::query_scalar(
        "INSERT INTO products (part_number, name, category_id) VALUES ($1, 'Switch 24p', $2) RETURNING id",
    )
    .bind(fixture_code("PN"))
    .bind(category_id)
    .fetch_one(pool)
    .await
    .unwrap();

    sqlx::query_scalar(
        r#"
        INSERT INTO product_inventory (inventory_id, product_id, serial_number, purchase_rate)
        VALUES ($1, $2, $3, 100)
        RETURNING id
        "#,
    )
    .bind(inventory_id)
    .bind(product_id)
    .bind(serial)
    .fetch_one(pool)
    .await
    .unwrap()
}

pub async fn serial_status(pool: &PgPool, serial: &str) -> InventoryStatus {
    sqlx::query_scalar("SELECT status FROM product_inventory WHERE serial_number = $1")
        .bind(serial)
        .fetch_one(pool)
        .await
        .unwrap()
}
