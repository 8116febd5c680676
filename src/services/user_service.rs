// src/services/user_service.rs

use sqlx::PgPool;
use uuid::Uuid;

use crate::{
    common::error::AppError,
    db::UserRepository,
    models::auth::{CreateUserPayload, Department, UpdateUserPayload, User, UserRole},
    services::auth::hash_password,
};

#[derive(Clone)]
pub struct UserService {
    repo: UserRepository,
    pool: PgPool,
}

impl UserService {
    pub fn new(repo: UserRepository, pool: PgPool) -> Self {
        Self { repo, pool }
    }

    // =========================================================================
    //  USUÁRIOS
    // =========================================================================

    pub async fn list_users(&self) -> Result<Vec<User>, AppError> {
        self.repo.list_users().await
    }

    pub async fn get_user(&self, id: Uuid) -> Result<User, AppError> {
        self.repo.find_by_id(id).await?.ok_or(AppError::UserNotFound)
    }

    pub async fn create_user(&self, payload: &CreateUserPayload) -> Result<User, AppError> {
        if payload.role == UserRole::Customer && payload.customer_id.is_none() {
            return Err(AppError::BusinessRule("customer_user_requires_customer"));
        }

        let password_hash = hash_password(&payload.password).await?;
        let user = self
            .repo
            .create_user(
                &self.pool,
                payload.name.trim(),
                payload.email.trim(),
                &password_hash,
                payload.role,
                payload.department_id,
                payload.customer_id,
            )
            .await?;

        tracing::info!("👤 Usuário criado: {} ({:?})", user.email, user.role);
        Ok(user)
    }

    pub async fn update_user(&self, id: Uuid, changes: &UpdateUserPayload) -> Result<User, AppError> {
        let password_hash = match changes.password.as_deref() {
            Some(password) => Some(hash_password(password).await?),
            None => None,
        };

        // O CHECK do banco barra CUSTOMER sem cliente (virou BusinessRule no repo)
        self.repo
            .update_user(&self.pool, id, changes, password_hash.as_deref())
            .await?
            .ok_or(AppError::UserNotFound)
    }

    pub async fn delete_user(&self, id: Uuid, acting_user: &User) -> Result<(), AppError> {
        // Admin não se exclui (ficaria sem ninguém para gerenciar o sistema)
        if id == acting_user.id {
            return Err(AppError::Forbidden);
        }
        if !self.repo.delete_user(&self.pool, id).await? {
            return Err(AppError::UserNotFound);
        }
        Ok(())
    }

    // =========================================================================
    //  DEPARTAMENTOS
    // =========================================================================

    pub async fn list_departments(&self) -> Result<Vec<Department>, AppError> {
        self.repo.list_departments().await
    }

    pub async fn get_department(&self, id: Uuid) -> Result<Department, AppError> {
        self.repo
            .find_department(id)
            .await?
            .ok_or(AppError::NotFound("department"))
    }

    pub async fn create_department(&self, name: &str) -> Result<Department, AppError> {
        self.repo.create_department(&self.pool, name.trim()).await
    }

    pub async fn update_department(&self, id: Uuid, name: &str) -> Result<Department, AppError> {
        self.repo
            .update_department(&self.pool, id, name.trim())
            .await?
            .ok_or(AppError::NotFound("department"))
    }

    pub async fn delete_department(&self, id: Uuid) -> Result<(), AppError> {
        if !self.repo.delete_department(&self.pool, id).await? {
            return Err(AppError::NotFound("department"));
        }
        Ok(())
    }
}
