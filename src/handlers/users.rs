// src/handlers/users.rs

use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
    Json,
};
use uuid::Uuid;
use validator::Validate;

use crate::{
    common::error::{ApiError, AppError},
    config::AppState,
    middleware::{
        auth::AuthenticatedUser,
        i18n::Locale,
        rbac::{AdminOnly, RequireRole},
    },
    models::auth::{CreateUserPayload, Department, DepartmentPayload, UpdateUserPayload, User},
};

// =========================================================================
//  USUÁRIOS
// =========================================================================

#[utoipa::path(
    get,
    path = "/api/users",
    tag = "Users",
    responses(
        (status = 200, description = "Lista de usuários", body = Vec<User>),
        (status = 403, description = "Só administradores")
    ),
    security(("api_jwt" = []))
)]
pub async fn list_users(
    State(app_state): State<AppState>,
    locale: Locale,
    _guard: RequireRole<AdminOnly>,
) -> Result<impl IntoResponse, ApiError> {
    let users = app_state
        .user_service
        .list_users()
        .await
        .map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;

    Ok((StatusCode::OK, Json(users)))
}

#[utoipa::path(
    get,
    path = "/api/users/{id}",
    tag = "Users",
    params(("id" = Uuid, Path, description = "ID do usuário")),
    responses(
        (status = 200, description = "Usuário", body = User),
        (status = 404, description = "Usuário não encontrado")
    ),
    security(("api_jwt" = []))
)]
pub async fn get_user(
    State(app_state): State<AppState>,
    locale: Locale,
    _guard: RequireRole<AdminOnly>,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, ApiError> {
    let user = app_state
        .user_service
        .get_user(id)
        .await
        .map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;

    Ok((StatusCode::OK, Json(user)))
}

#[utoipa::path(
    post,
    path = "/api/users",
    tag = "Users",
    request_body = CreateUserPayload,
    responses(
        (status = 201, description = "Usuário criado", body = User),
        (status = 400, description = "Payload inválido"),
        (status = 409, description = "E-mail já existe")
    ),
    security(("api_jwt" = []))
)]
pub async fn create_user(
    State(app_state): State<AppState>,
    locale: Locale,
    _guard: RequireRole<AdminOnly>,
    Json(payload): Json<CreateUserPayload>,
) -> Result<impl IntoResponse, ApiError> {
    payload
        .validate()
        .map_err(|e| AppError::ValidationError(e).to_api_error(&locale, &app_state.i18n_store))?;

    let user = app_state
        .user_service
        .create_user(&payload)
        .await
        .map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;

    Ok((StatusCode::CREATED, Json(user)))
}

#[utoipa::path(
    put,
    path = "/api/users/{id}",
    tag = "Users",
    request_body = UpdateUserPayload,
    params(("id" = Uuid, Path, description = "ID do usuário")),
    responses(
        (status = 200, description = "Usuário atualizado", body = User),
        (status = 404, description = "Usuário não encontrado")
    ),
    security(("api_jwt" = []))
)]
pub async fn update_user(
    State(app_state): State<AppState>,
    locale: Locale,
    _guard: RequireRole<AdminOnly>,
    Path(id): Path<Uuid>,
    Json(payload): Json<UpdateUserPayload>,
) -> Result<impl IntoResponse, ApiError> {
    payload
        .validate()
        .map_err(|e| AppError::ValidationError(e).to_api_error(&locale, &app_state.i18n_store))?;

    let user = app_state
        .user_service
        .update_user(id, &payload)
        .await
        .map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;

    Ok((StatusCode::OK, Json(user)))
}

#[utoipa::path(
    delete,
    path = "/api/users/{id}",
    tag = "Users",
    params(("id" = Uuid, Path, description = "ID do usuário")),
    responses(
        (status = 204, description = "Usuário excluído"),
        (status = 403, description = "Não é possível excluir a si mesmo"),
        (status = 404, description = "Usuário não encontrado")
    ),
    security(("api_jwt" = []))
)]
pub async fn delete_user(
    State(app_state): State<AppState>,
    locale: Locale,
    _guard: RequireRole<AdminOnly>,
    AuthenticatedUser(acting_user): AuthenticatedUser,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, ApiError> {
    app_state
        .user_service
        .delete_user(id, &acting_user)
        .await
        .map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;

    Ok(StatusCode::NO_CONTENT)
}

// =========================================================================
//  DEPARTAMENTOS
// =========================================================================

#[utoipa::path(
    get,
    path = "/api/departments",
    tag = "Users",
    responses((status = 200, description = "Departamentos", body = Vec<Department>)),
    security(("api_jwt" = []))
)]
pub async fn list_departments(
    State(app_state): State<AppState>,
    locale: Locale,
    _guard: RequireRole<AdminOnly>,
) -> Result<impl IntoResponse, ApiError> {
    let departments = app_state
        .user_service
        .list_departments()
        .await
        .map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;

    Ok((StatusCode::OK, Json(departments)))
}

#[utoipa::path(
    get,
    path = "/api/departments/{id}",
    tag = "Users",
    params(("id" = Uuid, Path, description = "ID do departamento")),
    responses(
        (status = 200, description = "Departamento", body = Department),
        (status = 404, description = "Departamento não encontrado")
    ),
    security(("api_jwt" = []))
)]
pub async fn get_department(
    State(app_state): State<AppState>,
    locale: Locale,
    _guard: RequireRole<AdminOnly>,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, ApiError> {
    let department = app_state
        .user_service
        .get_department(id)
        .await
        .map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;

    Ok((StatusCode::OK, Json(department)))
}

#[utoipa::path(
    post,
    path = "/api/departments",
    tag = "Users",
    request_body = DepartmentPayload,
    responses(
        (status = 201, description = "Departamento criado", body = Department),
        (status = 409, description = "Nome já existe")
    ),
    security(("api_jwt" = []))
)]
pub async fn create_department(
    State(app_state): State<AppState>,
    locale: Locale,
    _guard: RequireRole<AdminOnly>,
    Json(payload): Json<DepartmentPayload>,
) -> Result<impl IntoResponse, ApiError> {
    payload
        .validate()
        .map_err(|e| AppError::ValidationError(e).to_api_error(&locale, &app_state.i18n_store))?;

    let department = app_state
        .user_service
        .create_department(payload.name.trim())
        .await
        .map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;

    Ok((StatusCode::CREATED, Json(department)))
}

#[utoipa::path(
    put,
    path = "/api/departments/{id}",
    tag = "Users",
    request_body = DepartmentPayload,
    params(("id" = Uuid, Path, description = "ID do departamento")),
    responses(
        (status = 200, description = "Departamento atualizado", body = Department),
        (status = 404, description = "Departamento não encontrado")
    ),
    security(("api_jwt" = []))
)]
pub async fn update_department(
    State(app_state): State<AppState>,
    locale: Locale,
    _guard: RequireRole<AdminOnly>,
    Path(id): Path<Uuid>,
    Json(payload): Json<DepartmentPayload>,
) -> Result<impl IntoResponse, ApiError> {
    payload
        .validate()
        .map_err(|e| AppError::ValidationError(e).to_api_error(&locale, &app_state.i18n_store))?;

    let department = app_state
        .user_service
        .update_department(id, payload.name.trim())
        .await
        .map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;

    Ok((StatusCode::OK, Json(department)))
}

#[utoipa::path(
    delete,
    path = "/api/departments/{id}",
    tag = "Users",
    params(("id" = Uuid, Path, description = "ID do departamento")),
    responses(
        (status = 204, description = "Departamento excluído"),
        (status = 409, description = "Departamento em uso")
    ),
    security(("api_jwt" = []))
)]
pub async fn delete_department(
    State(app_state): State<AppState>,
    locale: Locale,
    _guard: RequireRole<AdminOnly>,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, ApiError> {
    app_state
        .user_service
        .delete_department(id)
        .await
        .map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;

    Ok(StatusCode::NO_CONTENT)
}
