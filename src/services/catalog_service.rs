// src/services/catalog_service.rs

use sqlx::PgPool;
use uuid::Uuid;

use crate::{
    common::error::AppError,
    db::CatalogRepository,
    models::catalog::{Category, CreateProductPayload, Product, SubCategory, UpdateProductPayload},
};

#[derive(Clone)]
pub struct CatalogService {
    repo: CatalogRepository,
    pool: PgPool,
}

impl CatalogService {
    pub fn new(repo: CatalogRepository, pool: PgPool) -> Self {
        Self { repo, pool }
    }

    // --- CATEGORIAS ---

    pub async fn list_categories(&self) -> Result<Vec<Category>, AppError> {
        self.repo.list_categories().await
    }

    pub async fn get_category(&self, id: Uuid) -> Result<Category, AppError> {
        self.repo.find_category(id).await?.ok_or(AppError::NotFound("category"))
    }

    pub async fn create_category(&self, name: &str) -> Result<Category, AppError> {
        self.repo.create_category(&self.pool, name.trim()).await
    }

    pub async fn update_category(&self, id: Uuid, name: &str) -> Result<Category, AppError> {
        self.repo
            .update_category(&self.pool, id, name.trim())
            .await?
            .ok_or(AppError::NotFound("category"))
    }

    /// Apaga a categoria e as subcategorias dela. Recusa se ainda houver produtos.
    pub async fn delete_category(&self, id: Uuid) -> Result<(), AppError> {
        let mut tx = self.pool.begin().await?;

        if self.repo.count_products_in_category(&mut *tx, id).await? > 0 {
            return Err(AppError::ResourceInUse("category"));
        }

        self.repo.delete_sub_categories_of(&mut *tx, id).await?;
        if !self.repo.delete_category(&mut *tx, id).await? {
            return Err(AppError::NotFound("category"));
        }

        tx.commit().await?;
        Ok(())
    }

    // --- SUBCATEGORIAS ---

    pub async fn list_sub_categories(&self, category_id: Uuid) -> Result<Vec<SubCategory>, AppError> {
        self.get_category(category_id).await?;
        self.repo.list_sub_categories(category_id).await
    }

    pub async fn create_sub_category(&self, category_id: Uuid, name: &str) -> Result<SubCategory, AppError> {
        self.get_category(category_id).await?;
        self.repo.create_sub_category(&self.pool, category_id, name.trim()).await
    }

    pub async fn update_sub_category(&self, id: Uuid, name: &str) -> Result<SubCategory, AppError> {
        self.repo
            .update_sub_category(&self.pool, id, name.trim())
            .await?
            .ok_or(AppError::NotFound("sub_category"))
    }

    pub async fn delete_sub_category(&self, id: Uuid) -> Result<(), AppError> {
        if !self.repo.delete_sub_category(&self.pool, id).await? {
            return Err(AppError::NotFound("sub_category"));
        }
        Ok(())
    }

    // --- PRODUTOS ---

    pub async fn list_products(&self, category_id: Option<Uuid>) -> Result<Vec<Product>, AppError> {
        self.repo.list_products(category_id).await
    }

    pub async fn get_product(&self, id: Uuid) -> Result<Product, AppError> {
        self.repo.find_product(id).await?.ok_or(AppError::NotFound("product"))
    }

    pub async fn create_product(&self, payload: &CreateProductPayload) -> Result<Product, AppError> {
        self.check_sub_category(payload.category_id, payload.sub_category_id).await?;
        self.repo.create_product(&self.pool, payload).await
    }

    pub async fn update_product(&self, id: Uuid, changes: &UpdateProductPayload) -> Result<Product, AppError> {
        if changes.category_id.is_some() || changes.sub_category_id.is_some() {
            let current = self.get_product(id).await?;
            let category_id = changes.category_id.unwrap_or(current.category_id);
            let sub_category_id = changes.sub_category_id.or(current.sub_category_id);
            self.check_sub_category(category_id, sub_category_id).await?;
        }

        self.repo
            .update_product(&self.pool, id, changes)
            .await?
            .ok_or(AppError::NotFound("product"))
    }

    pub async fn delete_product(&self, id: Uuid) -> Result<(), AppError> {
        if !self.repo.delete_product(&self.pool, id).await? {
            return Err(AppError::NotFound("product"));
        }
        Ok(())
    }

    // A subcategoria, quando informada, tem que ser da mesma categoria
    async fn check_sub_category(&self, category_id: Uuid, sub_category_id: Option<Uuid>) -> Result<(), AppError> {
        let Some(sub_id) = sub_category_id else {
            return Ok(());
        };
        let sub = self
            .repo
            .find_sub_category(sub_id)
            .await?
            .ok_or(AppError::NotFound("sub_category"))?;

        if sub.category_id != category_id {
            return Err(AppError::BusinessRule("sub_category_mismatch"));
        }
        Ok(())
    }
}
