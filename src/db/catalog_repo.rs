// src/db/catalog_repo.rs

use sqlx::{Executor, PgPool, Postgres};
use uuid::Uuid;

use crate::{
    common::{db_utils::in_use_on_fk, error::AppError},
    models::catalog::{Category, CreateProductPayload, Product, SubCategory, UpdateProductPayload},
};

#[derive(Clone)]
pub struct CatalogRepository {
    pool: PgPool,
}

impl CatalogRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    // =========================================================================
    //  CATEGORIAS
    // =========================================================================

    pub async fn list_categories(&self) -> Result<Vec<Category>, AppError> {
        let categories = sqlx::query_as::<_, Category>("SELECT * FROM categories ORDER BY name ASC")
            .fetch_all(&self.pool)
            .await?;
        Ok(categories)
    }

    pub async fn find_category(&self, id: Uuid) -> Result<Option<Category>, AppError> {
        let category = sqlx::query_as::<_, Category>("SELECT * FROM categories WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(category)
    }

    pub async fn create_category<'e, E>(&self, executor: E, name: &str) -> Result<Category, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let category = sqlx::query_as::<_, Category>("INSERT INTO categories (name) VALUES ($1) RETURNING *")
            .bind(name)
            .fetch_one(executor)
            .await?;
        Ok(category)
    }

    pub async fn update_category<'e, E>(
        &self,
        executor: E,
        id: Uuid,
        name: &str,
    ) -> Result<Option<Category>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let category = sqlx::query_as::<_, Category>(
            "UPDATE categories SET name = $2, updated_at = NOW() WHERE id = $1 RETURNING *",
        )
        .bind(id)
        .bind(name)
        .fetch_optional(executor)
        .await?;
        Ok(category)
    }

    pub async fn count_products_in_category<'e, E>(&self, executor: E, category_id: Uuid) -> Result<i64, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let count = sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM products WHERE category_id = $1")
            .bind(category_id)
            .fetch_one(executor)
            .await?;
        Ok(count)
    }

    pub async fn delete_sub_categories_of<'e, E>(&self, executor: E, category_id: Uuid) -> Result<u64, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let result = sqlx::query("DELETE FROM sub_categories WHERE category_id = $1")
            .bind(category_id)
            .execute(executor)
            .await
            .map_err(in_use_on_fk("sub_category"))?;
        Ok(result.rows_affected())
    }

    pub async fn delete_category<'e, E>(&self, executor: E, id: Uuid) -> Result<bool, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let result = sqlx::query("DELETE FROM categories WHERE id = $1")
            .bind(id)
            .execute(executor)
            .await
            .map_err(in_use_on_fk("category"))?;
        Ok(result.rows_affected() > 0)
    }

    // =========================================================================
    //  SUBCATEGORIAS
    // =========================================================================

    pub async fn list_sub_categories(&self, category_id: Uuid) -> Result<Vec<SubCategory>, AppError> {
        let subs = sqlx::query_as::<_, SubCategory>(
            "SELECT * FROM sub_categories WHERE category_id = $1 ORDER BY name ASC",
        )
        .bind(category_id)
        .fetch_all(&self.pool)
        .await?;
        Ok(subs)
    }

    pub async fn find_sub_category(&self, id: Uuid) -> Result<Option<SubCategory>, AppError> {
        let sub = sqlx::query_as::<_, SubCategory>("SELECT * FROM sub_categories WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(sub)
    }

    pub async fn create_sub_category<'e, E>(
        &self,
        executor: E,
        category_id: Uuid,
        name: &str,
    ) -> Result<SubCategory, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let sub = sqlx::query_as::<_, SubCategory>(
            "INSERT INTO sub_categories (category_id, name) VALUES ($1, $2) RETURNING *",
        )
        .bind(category_id)
        .bind(name)
        .fetch_one(executor)
        .await?;
        Ok(sub)
    }

    pub async fn update_sub_category<'e, E>(
        &self,
        executor: E,
        id: Uuid,
        name: &str,
    ) -> Result<Option<SubCategory>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let sub = sqlx::query_as::<_, SubCategory>(
            "UPDATE sub_categories SET name = $2, updated_at = NOW() WHERE id = $1 RETURNING *",
        )
        .bind(id)
        .bind(name)
        .fetch_optional(executor)
        .await?;
        Ok(sub)
    }

    pub async fn delete_sub_category<'e, E>(&self, executor: E, id: Uuid) -> Result<bool, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let result = sqlx::query("DELETE FROM sub_categories WHERE id = $1")
            .bind(id)
            .execute(executor)
            .await
            .map_err(in_use_on_fk("sub_category"))?;
        Ok(result.rows_affected() > 0)
    }

    // =========================================================================
    //  PRODUTOS
    // =========================================================================

    pub async fn list_products(&self, category_id: Option<Uuid>) -> Result<Vec<Product>, AppError> {
        let products = sqlx::query_as::<_, Product>(
            r#"
            SELECT * FROM products
            WHERE ($1::uuid IS NULL OR category_id = $1)
            ORDER BY name ASC
            "#,
        )
        .bind(category_id)
        .fetch_all(&self.pool)
        .await?;
        Ok(products)
    }

    pub async fn find_product(&self, id: Uuid) -> Result<Option<Product>, AppError> {
        let product = sqlx::query_as::<_, Product>("SELECT * FROM products WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(product)
    }

    pub async fn create_product<'e, E>(
        &self,
        executor: E,
        payload: &CreateProductPayload,
    ) -> Result<Product, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let product = sqlx::query_as::<_, Product>(
            r#"
            INSERT INTO products (
                part_number, name, category_id, sub_category_id, make, model,
                hsn_code, unit, gst_rate, description
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7, COALESCE($8, 'NOS'), COALESCE($9, 18), $10)
            RETURNING *
            "#,
        )
        .bind(&payload.part_number)
        .bind(&payload.name)
        .bind(payload.category_id)
        .bind(payload.sub_category_id)
        .bind(payload.make.as_deref())
        .bind(payload.model.as_deref())
        .bind(payload.hsn_code.as_deref())
        .bind(payload.unit.as_deref())
        .bind(payload.gst_rate)
        .bind(payload.description.as_deref())
        .fetch_one(executor)
        .await?;
        Ok(product)
    }

    pub async fn update_product<'e, E>(
        &self,
        executor: E,
        id: Uuid,
        changes: &UpdateProductPayload,
    ) -> Result<Option<Product>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let product = sqlx::query_as::<_, Product>(
            r#"
            UPDATE products SET
                part_number = COALESCE($2, part_number),
                name = COALESCE($3, name),
                category_id = COALESCE($4, category_id),
                sub_category_id = COALESCE($5, sub_category_id),
                make = COALESCE($6, make),
                model = COALESCE($7, model),
                hsn_code = COALESCE($8, hsn_code),
                unit = COALESCE($9, unit),
                gst_rate = COALESCE($10, gst_rate),
                description = COALESCE($11, description),
                updated_at = NOW()
            WHERE id = $1
            RETURNING *
            "#,
        )
        .bind(id)
        .bind(changes.part_number.as_deref())
        .bind(changes.name.as_deref())
        .bind(changes.category_id)
        .bind(changes.sub_category_id)
        .bind(changes.make.as_deref())
        .bind(changes.model.as_deref())
        .bind(changes.hsn_code.as_deref())
        .bind(changes.unit.as_deref())
        .bind(changes.gst_rate)
        .bind(changes.description.as_deref())
        .fetch_optional(executor)
        .await?;
        Ok(product)
    }

    pub async fn delete_product<'e, E>(&self, executor: E, id: Uuid) -> Result<bool, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let result = sqlx::query("DELETE FROM products WHERE id = $1")
            .bind(id)
            .execute(executor)
            .await
            .map_err(in_use_on_fk("product"))?;
        Ok(result.rows_affected() > 0)
    }
}
