// src/db/delivery_repo.rs

use sqlx::{Executor, PgPool, Postgres};
use uuid::Uuid;

use crate::{
    common::error::AppError,
    models::{
        delivery::{CreateDeliveryPayload, DeliveryType, MaterialDelivery, MaterialDeliveryItem, UpdateDeliveryPayload},
        inventory::InventoryStatus,
    },
};

#[derive(Clone)]
pub struct DeliveryRepository {
    pool: PgPool,
}

impl DeliveryRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub async fn list_deliveries(
        &self,
        delivery_type: Option<DeliveryType>,
        customer_id: Option<Uuid>,
    ) -> Result<Vec<MaterialDelivery>, AppError> {
        let deliveries = sqlx::query_as::<_, MaterialDelivery>(
            r#"
            SELECT * FROM material_deliveries
            WHERE ($1::delivery_type IS NULL OR delivery_type = $1)
              AND ($2::uuid IS NULL OR customer_id = $2)
            ORDER BY delivery_date DESC, created_at DESC
            "#,
        )
        .bind(delivery_type)
        .bind(customer_id)
        .fetch_all(&self.pool)
        .await?;
        Ok(deliveries)
    }

    pub async fn find_delivery<'e, E>(&self, executor: E, id: Uuid) -> Result<Option<MaterialDelivery>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let delivery = sqlx::query_as::<_, MaterialDelivery>("SELECT * FROM material_deliveries WHERE id = $1")
            .bind(id)
            .fetch_optional(executor)
            .await?;
        Ok(delivery)
    }

    pub async fn create_delivery<'e, E>(
        &self,
        executor: E,
        challan_no: &str,
        payload: &CreateDeliveryPayload,
    ) -> Result<MaterialDelivery, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let delivery = sqlx::query_as::<_, MaterialDelivery>(
            r#"
            INSERT INTO material_deliveries (
                challan_no, delivery_type, customer_id, site_id, vendor_id,
                reference_no, delivery_date, notes
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
            RETURNING *
            "#,
        )
        .bind(challan_no)
        .bind(payload.delivery_type)
        .bind(payload.customer_id)
        .bind(payload.site_id)
        .bind(payload.vendor_id)
        .bind(payload.reference_no.as_deref())
        .bind(payload.delivery_date)
        .bind(payload.notes.as_deref())
        .fetch_one(executor)
        .await?;
        Ok(delivery)
    }

    pub async fn update_delivery<'e, E>(
        &self,
        executor: E,
        id: Uuid,
        changes: &UpdateDeliveryPayload,
    ) -> Result<Option<MaterialDelivery>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let delivery = sqlx::query_as::<_, MaterialDelivery>(
            r#"
            UPDATE material_deliveries SET
                reference_no = COALESCE($2, reference_no),
                delivery_date = COALESCE($3, delivery_date),
                notes = COALESCE($4, notes),
                updated_at = NOW()
            WHERE id = $1
            RETURNING *
            "#,
        )
        .bind(id)
        .bind(changes.reference_no.as_deref())
        .bind(changes.delivery_date)
        .bind(changes.notes.as_deref())
        .fetch_optional(executor)
        .await?;
        Ok(delivery)
    }

    pub async fn delete_delivery<'e, E>(&self, executor: E, id: Uuid) -> Result<bool, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let result = sqlx::query("DELETE FROM material_deliveries WHERE id = $1")
            .bind(id)
            .execute(executor)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    // =========================================================================
    //  ITENS
    // =========================================================================

    pub async fn insert_item<'e, E>(
        &self,
        executor: E,
        delivery_id: Uuid,
        product_inventory_id: Uuid,
        previous_status: InventoryStatus,
    ) -> Result<MaterialDeliveryItem, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let item = sqlx::query_as::<_, MaterialDeliveryItem>(
            r#"
            INSERT INTO material_delivery_items (delivery_id, product_inventory_id, previous_status)
            VALUES ($1, $2, $3)
            RETURNING *
            "#,
        )
        .bind(delivery_id)
        .bind(product_inventory_id)
        .bind(previous_status)
        .fetch_one(executor)
        .await?;
        Ok(item)
    }

    pub async fn list_items<'e, E>(&self, executor: E, delivery_id: Uuid) -> Result<Vec<MaterialDeliveryItem>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let items = sqlx::query_as::<_, MaterialDeliveryItem>(
            "SELECT * FROM material_delivery_items WHERE delivery_id = $1 ORDER BY created_at ASC",
        )
        .bind(delivery_id)
        .fetch_all(executor)
        .await?;
        Ok(items)
    }

    /// Serial desta entrega que aparece em outra entrega registrada depois dela.
    pub async fn find_redelivered_serial<'e, E>(&self, executor: E, delivery_id: Uuid) -> Result<Option<String>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let serial = sqlx::query_scalar::<_, String>(
            r#"
            SELECT pi.serial_number
            FROM material_delivery_items mine
            JOIN material_delivery_items later
              ON later.product_inventory_id = mine.product_inventory_id
             AND later.delivery_id <> mine.delivery_id
             AND later.created_at >= mine.created_at
            JOIN product_inventory pi ON pi.id = mine.product_inventory_id
            WHERE mine.delivery_id = $1
            ORDER BY later.created_at ASC
            LIMIT 1
            "#,
        )
        .bind(delivery_id)
        .fetch_optional(executor)
        .await?;
        Ok(serial)
    }

    pub async fn delete_items_of<'e, E>(&self, executor: E, delivery_id: Uuid) -> Result<u64, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let result = sqlx::query("DELETE FROM material_delivery_items WHERE delivery_id = $1")
            .bind(delivery_id)
            .execute(executor)
            .await?;
        Ok(result.rows_affected())
    }
}
