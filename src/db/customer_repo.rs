// src/db/customer_repo.rs

use sqlx::{Executor, PgPool, Postgres};
use uuid::Uuid;

use crate::{
    common::{db_utils::in_use_on_fk, error::AppError},
    models::{
        customer::{CreateSitePayload, Customer, Site, UpdateSitePayload},
        party::{CreatePartyPayload, UpdatePartyPayload},
    },
};

#[derive(Clone)]
pub struct CustomerRepository {
    pool: PgPool,
}

impl CustomerRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    // =========================================================================
    //  CLIENTES
    // =========================================================================

    pub async fn list_customers(&self) -> Result<Vec<Customer>, AppError> {
        let customers = sqlx::query_as::<_, Customer>("SELECT * FROM customers ORDER BY name ASC")
            .fetch_all(&self.pool)
            .await?;
        Ok(customers)
    }

    pub async fn find_customer(&self, id: Uuid) -> Result<Option<Customer>, AppError> {
        let customer = sqlx::query_as::<_, Customer>("SELECT * FROM customers WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(customer)
    }

    pub async fn create_customer<'e, E>(
        &self,
        executor: E,
        customer_code: &str,
        payload: &CreatePartyPayload,
    ) -> Result<Customer, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let c = &payload.contact;
        let customer = sqlx::query_as::<_, Customer>(
            r#"
            INSERT INTO customers (
                customer_code, name, gst_no, address, city, state, pincode,
                contact_person, email, phone
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10)
            RETURNING *
            "#,
        )
        .bind(customer_code)
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
        Ok(customer)
    }

    pub async fn update_customer<'e, E>(
        &self,
        executor: E,
        id: Uuid,
        changes: &UpdatePartyPayload,
    ) -> Result<Option<Customer>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let c = &changes.contact;
        let customer = sqlx::query_as::<_, Customer>(
            r#"
            UPDATE customers SET
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
        Ok(customer)
    }

    pub async fn set_gst_certificate<'e, E>(
        &self,
        executor: E,
        id: Uuid,
        path: &str,
    ) -> Result<Option<Customer>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let customer = sqlx::query_as::<_, Customer>(
            "UPDATE customers SET gst_certificate_path = $2, updated_at = NOW() WHERE id = $1 RETURNING *",
        )
        .bind(id)
        .bind(path)
        .fetch_optional(executor)
        .await?;
        Ok(customer)
    }

    /// Tickets, contratos e entregas que ainda apontam para o cliente.
    pub async fn count_customer_references<'e, E>(&self, executor: E, id: Uuid) -> Result<i64, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let count = sqlx::query_scalar::<_, i64>(
            r#"
            SELECT
                (SELECT COUNT(*) FROM tickets WHERE customer_id = $1)
              + (SELECT COUNT(*) FROM service_contracts WHERE customer_id = $1)
              + (SELECT COUNT(*) FROM material_deliveries WHERE customer_id = $1)
            "#,
        )
        .bind(id)
        .fetch_one(executor)
        .await?;
        Ok(count)
    }

    pub async fn delete_customer<'e, E>(&self, executor: E, id: Uuid) -> Result<bool, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let result = sqlx::query("DELETE FROM customers WHERE id = $1")
            .bind(id)
            .execute(executor)
            .await
            .map_err(in_use_on_fk("customer"))?;
        Ok(result.rows_affected() > 0)
    }

    // =========================================================================
    //  SITES
    // =========================================================================

    pub async fn list_sites(&self, customer_id: Option<Uuid>) -> Result<Vec<Site>, AppError> {
        let sites = sqlx::query_as::<_, Site>(
            r#"
            SELECT * FROM sites
            WHERE ($1::uuid IS NULL OR customer_id = $1)
            ORDER BY name ASC
            "#,
        )
        .bind(customer_id)
        .fetch_all(&self.pool)
        .await?;
        Ok(sites)
    }

    pub async fn find_site<'e, E>(&self, executor: E, id: Uuid) -> Result<Option<Site>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let site = sqlx::query_as::<_, Site>("SELECT * FROM sites WHERE id = $1")
            .bind(id)
            .fetch_optional(executor)
            .await?;
        Ok(site)
    }

    pub async fn create_site<'e, E>(
        &self,
        executor: E,
        site_code: &str,
        payload: &CreateSitePayload,
    ) -> Result<Site, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let c = &payload.contact;
        let site = sqlx::query_as::<_, Site>(
            r#"
            INSERT INTO sites (
                site_code, customer_id, name, address, city, state, pincode,
                contact_person, email, phone
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10)
            RETURNING *
            "#,
        )
        .bind(site_code)
        .bind(payload.customer_id)
        .bind(&payload.name)
        .bind(c.address.as_deref())
        .bind(c.city.as_deref())
        .bind(c.state.as_deref())
        .bind(c.pincode.as_deref())
        .bind(c.contact_person.as_deref())
        .bind(c.email.as_deref())
        .bind(c.phone.as_deref())
        .fetch_one(executor)
        .await?;
        Ok(site)
    }

    pub async fn update_site<'e, E>(
        &self,
        executor: E,
        id: Uuid,
        changes: &UpdateSitePayload,
    ) -> Result<Option<Site>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let c = &changes.contact;
        let site = sqlx::query_as::<_, Site>(
            r#"
            UPDATE sites SET
                name = COALESCE($2, name),
                address = COALESCE($3, address),
                city = COALESCE($4, city),
                state = COALESCE($5, state),
                pincode = COALESCE($6, pincode),
                contact_person = COALESCE($7, contact_person),
                email = COALESCE($8, email),
                phone = COALESCE($9, phone),
                updated_at = NOW()
            WHERE id = $1
            RETURNING *
            "#,
        )
        .bind(id)
        .bind(changes.name.as_deref())
        .bind(c.address.as_deref())
        .bind(c.city.as_deref())
        .bind(c.state.as_deref())
        .bind(c.pincode.as_deref())
        .bind(c.contact_person.as_deref())
        .bind(c.email.as_deref())
        .bind(c.phone.as_deref())
        .fetch_optional(executor)
        .await?;
        Ok(site)
    }

    pub async fn delete_sites_of<'e, E>(&self, executor: E, customer_id: Uuid) -> Result<u64, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let result = sqlx::query("DELETE FROM sites WHERE customer_id = $1")
            .bind(customer_id)
            .execute(executor)
            .await
            .map_err(in_use_on_fk("site"))?;
        Ok(result.rows_affected())
    }

    pub async fn delete_site<'e, E>(&self, executor: E, id: Uuid) -> Result<bool, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let result = sqlx::query("DELETE FROM sites WHERE id = $1")
            .bind(id)
            .execute(executor)
            .await
            .map_err(in_use_on_fk("site"))?;
        Ok(result.rows_affected() > 0)
    }
}
