// src/models/auth.rs

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;
use validator::Validate;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type, ToSchema)]
#[sqlx(type_name = "user_role", rename_all = "SCREAMING_SNAKE_CASE")]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum UserRole {
    Admin,
    Staff,
    Customer, // Usuário do portal do cliente (só enxerga os próprios tickets)
}

impl UserRole {
    /// Equipe interna (Admin ou Staff).
    pub fn is_staff(self) -> bool {
        matches!(self, UserRole::Admin | UserRole::Staff)
    }
}

// Representa um usuário vindo do banco de dados
#[derive(Debug, Clone, Serialize, sqlx::FromRow, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct User {
    pub id: Uuid,
    #[schema(example = "Ravi Kumar")]
    pub name: String,
    #[schema(example = "ravi@enpl.in")]
    pub email: String,

    #[serde(skip_serializing)] // IMPORTANTE para segurança
    #[schema(ignore)]
    pub password_hash: String,

    pub role: UserRole,
    pub department_id: Option<Uuid>,
    pub customer_id: Option<Uuid>,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, sqlx::FromRow, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Department {
    pub id: Uuid,
    #[schema(example = "Service")]
    pub name: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

// Dados para login
#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct LoginUserPayload {
    #[validate(email(message = "invalid_email"))]
    #[schema(example = "admin@enpl.in")]
    pub email: String,
    #[validate(length(min = 6, message = "password_too_short"))]
    pub password: String,
}

// Resposta de autenticação com o token
#[derive(Debug, Serialize, ToSchema)]
pub struct AuthResponse {
    pub token: String,
}

// Estrutura de dados ("claims") dentro do JWT
#[derive(Debug, Serialize, Deserialize)]
pub struct Claims {
    pub sub: Uuid,      // Subject (ID do usuário)
    pub role: UserRole, // Só informativo: a autorização relê o usuário do banco
    pub exp: usize,     // Expiration time (quando o token expira)
    pub iat: usize,     // Issued At (quando o token foi criado)
}

// --- Gestão de usuários (admin) ---
#[derive(Debug, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CreateUserPayload {
    #[validate(length(min = 1, message = "name_required"))]
    pub name: String,
    #[validate(email(message = "invalid_email"))]
    pub email: String,
    #[validate(length(min = 6, message = "password_too_short"))]
    pub password: String,
    pub role: UserRole,
    pub department_id: Option<Uuid>,
    // Obrigatório quando role = CUSTOMER
    pub customer_id: Option<Uuid>,
}

#[derive(Debug, Default, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UpdateUserPayload {
    #[validate(length(min = 1, message = "name_required"))]
    pub name: Option<String>,
    #[validate(email(message = "invalid_email"))]
    pub email: Option<String>,
    #[validate(length(min = 6, message = "password_too_short"))]
    pub password: Option<String>,
    pub role: Option<UserRole>,
    pub department_id: Option<Uuid>,
    pub customer_id: Option<Uuid>,
    pub is_active: Option<bool>,
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct DepartmentPayload {
    #[validate(length(min = 1, max = 100, message = "name_required"))]
    #[schema(example = "Service")]
    pub name: String,
}
