// src/db/vendor_repo.rs

use sqlx::{Executor, PgPool, Postgres};
use uuid::Uuid;

use crate::{
    common::{db_utils::in_use_on_fk, error::AppError},
    models::{
        party::{CreatePartyPayload, UpdatePartyPayload},
        vendor::Vendor,
    },
};

#[derive(Clone)]
pub struct VendorRepository {
    pool: PgPool,
}

impl VendorRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub async fn list_vendors(&self) -> Result<Vec<Vendor>, AppError> {
        let vendors = sqlx::query_as::<_, Vendor>("SELECT * FROM vendors ORDER BY name ASC")
            .fetch_all(&self.pool)
            .await?;
        Ok(vendors)
    }

    pub async fn find_vendor(&self, id: Uuid) -> Result<Option<Vendor>, AppError> {
        let vendor = sqlx::query_as::<_, Vendor>("SELECT * FROM vendors WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(vendor)
    }

    pub async fn create_vendor<'e, E>(
        &self,
        executor: E,
        vendor_code: &str,
        payload: &CreatePartyPayload,
    ) -> Result<Vendor, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let c = &payload.contact;
        let vendor = sqlx::query_as::<_, Vendor>(
            r#"
            INSERT INTO vendors (
                vendor_code, name, gst_no, address, city, state, pincode,
                contact_person, email, phone
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10)
            RETURNING *
            "#,
        )
        .bind(vendor_code)
        .bind(&payload.name)
        .bind(payload.gst_no.as_deref())
        .bind(c.address.as_deref())
        .bind(c.city.as_deref())
        .bind(c.state.as_deref())
        .bind(c.pincode.as_deref())
        .bind(c.contact_person.as_deref())
        .bind(c.email.as_deref())
        .bind(c.phone.as_deref())
        .fetch_one(executor)
        .await?;
        Ok(vendor)
    }

    pub async fn update_vendor<'e, E>(
        &self,
        executor: E,
        id: Uuid,
        changes: &UpdatePartyPayload,
    ) -> Result<Option<Vendor>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let c = &changes.contact;
        let vendor = sqlx::query_as::<_, Vendor>(
            r#"
            UPDATE vendors SET
                name = COALESCE($2, name),
                gst_no = COALESCE($3, gst_no),
                address = COALESCE($4, address),
                city = COALESCE($5, city),
                state = COALESCE($6, state),
                pincode = COALESCE($7, pincode),
                contact_person = COALESCE($8, contact_person),
                email = COALESCE($9, email),
                phone = COALESCE($10, phone),
                updated_at = NOW()
            WHERE id = $1
            RETURNING *
            "#,
        )
        .bind(id)
        .bind(changes.name.as_deref())
        .bind(changes.gst_no.as_deref())
        .bind(c.address.as_deref())
        .bind(c.city.as_deref())
        .bind(c.state.as_deref())
        .bind(c.pincode.as_deref())
        .bind(c.contact_person.as_deref())
        .bind(c.email.as_deref())
        .bind(c.phone.as_deref())
        .fetch_optional(executor)
        .await?;
        Ok(vendor)
    }

    pub async fn set_gst_certificate<'e, E>(
        &self,
        executor: E,
        id: Uuid,
        path: &str,
    ) -> Result<Option<Vendor>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let vendor = sqlx::query_as::<_, Vendor>(
            "UPDATE vendors SET gst_certificate_path = $2, updated_at = NOW() WHERE id = $1 RETURNING *",
        )
        .bind(id)
        .bind(path)
        .fetch_optional(executor)
        .await?;
        Ok(vendor)
    }

    // Notas e pagamentos seguram o fornecedor via FK
    pub async fn delete_vendor<'e, E>(&self, executor: E, id: Uuid) -> Result<bool, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let result = sqlx::query("DELETE FROM vendors WHERE id = $1")
            .bind(id)
            .execute(executor)
            .await
            .map_err(in_use_on_fk("vendor"))?;
        Ok(result.rows_affected() > 0)
    }
}
