// src/db/user_repo.rs

use sqlx::{Executor, PgPool, Postgres};
use uuid::Uuid;

use crate::{
    common::{db_utils::in_use_on_fk, error::AppError},
    models::auth::{Department, UpdateUserPayload, User, UserRole},
};

// Mapeia as chaves únicas de users para os erros de negócio
fn map_user_write_error(e: sqlx::Error) -> AppError {
    if let sqlx::Error::Database(db_err) = &e {
        if db_err.is_unique_violation() {
            return match db_err.constraint() {
                Some("users_email_key") => AppError::EmailAlreadyExists,
                Some(other) => AppError::UniqueConstraintViolation(other.to_string()),
                None => AppError::UniqueConstraintViolation("users".to_string()),
            };
        }
        if db_err.constraint() == Some("users_customer_role_check") {
            return AppError::BusinessRule("customer_user_requires_customer");
        }
    }
    e.into()
}

// O repositório de usuários e departamentos
#[derive(Clone)]
pub struct UserRepository {
    pool: PgPool,
}

impl UserRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    // =========================================================================
    //  USUÁRIOS
    // =========================================================================

    pub async fn find_by_email(&self, email: &str) -> Result<Option<User>, AppError> {
        let user = sqlx::query_as::<_, User>("SELECT * FROM users WHERE lower(email) = lower($1)")
            .bind(email)
            .fetch_optional(&self.pool)
            .await?;
        Ok(user)
    }

    pub async fn find_by_id(&self, id: Uuid) -> Result<Option<User>, AppError> {
        let user = sqlx::query_as::<_, User>("SELECT * FROM users WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(user)
    }

    pub async fn list_users(&self) -> Result<Vec<User>, AppError> {
        let users = sqlx::query_as::<_, User>("SELECT * FROM users ORDER BY name ASC")
            .fetch_all(&self.pool)
            .await?;
        Ok(users)
    }

    pub async fn count_users(&self) -> Result<i64, AppError> {
        let count = sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM users")
            .fetch_one(&self.pool)
            .await?;
        Ok(count)
    }

    #[allow(clippy::too_many_arguments)]
    pub async fn create_user<'e, E>(
        &self,
        executor: E,
        name: &str,
        email: &str,
        password_hash: &str,
        role: UserRole,
        department_id: Option<Uuid>,
        customer_id: Option<Uuid>,
    ) -> Result<User, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        sqlx::query_as::<_, User>(
            r#"
            INSERT INTO users (name, email, password_hash, role, department_id, customer_id)
            VALUES ($1, $2, $3, $4, $5, $6)
            RETURNING *
            "#,
        )
        .bind(name)
        .bind(email)
        .bind(password_hash)
        .bind(role)
        .bind(department_id)
        .bind(customer_id)
        .fetch_one(executor)
        .await
        .map_err(map_user_write_error)
    }

    /// Update parcial: só o que veio no payload muda.
    pub async fn update_user<'e, E>(
        &self,
        executor: E,
        id: Uuid,
        changes: &UpdateUserPayload,
        password_hash: Option<&str>,
    ) -> Result<Option<User>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        sqlx::query_as::<_, User>(
            r#"
            UPDATE users SET
                name = COALESCE($2, name),
                email = COALESCE($3, email),
                password_hash = COALESCE($4, password_hash),
                role = COALESCE($5, role),
                department_id = COALESCE($6, department_id),
                customer_id = COALESCE($7, customer_id),
                is_active = COALESCE($8, is_active),
                updated_at = NOW()
            WHERE id = $1
            RETURNING *
            "#,
        )
        .bind(id)
        .bind(changes.name.as_deref())
        .bind(changes.email.as_deref())
        .bind(password_hash)
        .bind(changes.role)
        .bind(changes.department_id)
        .bind(changes.customer_id)
        .bind(changes.is_active)
        .fetch_optional(executor)
        .await
        .map_err(map_user_write_error)
    }

    pub async fn delete_user<'e, E>(&self, executor: E, id: Uuid) -> Result<bool, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let result = sqlx::query("DELETE FROM users WHERE id = $1")
            .bind(id)
            .execute(executor)
            .await
            .map_err(in_use_on_fk("user"))?;
        Ok(result.rows_affected() > 0)
    }

    // =========================================================================
    //  DEPARTAMENTOS
    // =========================================================================

    pub async fn list_departments(&self) -> Result<Vec<Department>, AppError> {
        let departments = sqlx::query_as::<_, Department>("SELECT * FROM departments ORDER BY name ASC")
            .fetch_all(&self.pool)
            .await?;
        Ok(departments)
    }

    pub async fn find_department(&self, id: Uuid) -> Result<Option<Department>, AppError> {
        let department = sqlx::query_as::<_, Department>("SELECT * FROM departments WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(department)
    }

    pub async fn create_department<'e, E>(&self, executor: E, name: &str) -> Result<Department, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let department = sqlx::query_as::<_, Department>(
            "INSERT INTO departments (name) VALUES ($1) RETURNING *",
        )
        .bind(name)
        .fetch_one(executor)
        .await?;
        Ok(department)
    }

    pub async fn update_department<'e, E>(
        &self,
        executor: E,
        id: Uuid,
        name: &str,
    ) -> Result<Option<Department>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let department = sqlx::query_as::<_, Department>(
            "UPDATE departments SET name = $2, updated_at = NOW() WHERE id = $1 RETURNING *",
        )
        .bind(id)
        .bind(name)
        .fetch_optional(executor)
        .await?;
        Ok(department)
    }

    pub async fn delete_department<'e, E>(&self, executor: E, id: Uuid) -> Result<bool, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let result = sqlx::query("DELETE FROM departments WHERE id = $1")
            .bind(id)
            .execute(executor)
            .await
            .map_err(in_use_on_fk("department"))?;
        Ok(result.rows_affected() > 0)
    }
}
