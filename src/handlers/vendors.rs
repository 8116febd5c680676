// src/handlers/vendors.rs

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
        i18n::Locale,
        rbac::{RequireRole, StaffOnly},
    },
    models::{
        party::{CreatePartyPayload, UpdatePartyPayload},
        vendor::Vendor,
    },
};

#[utoipa::path(
    get,
    path = "/api/vendors",
    tag = "Vendors",
    responses((status = 200, description = "Fornecedores", body = Vec<Vendor>)),
    security(("api_jwt" = []))
)]
pub async fn list_vendors(
    State(app_state): State<AppState>,
    locale: Locale,
    _guard: RequireRole<StaffOnly>,
) -> Result<impl IntoResponse, ApiError> {
    let vendors = app_state
        .vendor_service
        .list_vendors()
        .await
        .map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;

    Ok((StatusCode::OK, Json(vendors)))
}

#[utoipa::path(
    get,
    path = "/api/vendors/{id}",
    tag = "Vendors",
    params(("id" = Uuid, Path, description = "ID do fornecedor")),
    responses(
        (status = 200, description = "Fornecedor", body = Vendor),
        (status = 404, description = "Fornecedor não encontrado")
    ),
    security(("api_jwt" = []))
)]
pub async fn get_vendor(
    State(app_state): State<AppState>,
    locale: Locale,
    _guard: RequireRole<StaffOnly>,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, ApiError> {
    let vendor = app_state
        .vendor_service
        .get_vendor(id)
        .await
        .map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;

    Ok((StatusCode::OK, Json(vendor)))
}

// O código (ENPL-VEN-MMYY-NNNNN) é gerado no servidor
#[utoipa::path(
    post,
    path = "/api/vendors",
    tag = "Vendors",
    request_body = CreatePartyPayload,
    responses(
        (status = 201, description = "Fornecedor criado", body = Vendor),
        (status = 400, description = "Payload inválido (GSTIN, e-mail, PIN)")
    ),
    security(("api_jwt" = []))
)]
pub async fn create_vendor(
    State(app_state): State<AppState>,
    locale: Locale,
    _guard: RequireRole<StaffOnly>,
    Json(payload): Json<CreatePartyPayload>,
) -> Result<impl IntoResponse, ApiError> {
    payload
        .validate()
        .map_err(|e| AppError::ValidationError(e).to_api_error(&locale, &app_state.i18n_store))?;

    let vendor = app_state
        .vendor_service
        .create_vendor(&payload)
        .await
        .map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;

    Ok((StatusCode::CREATED, Json(vendor)))
}

#[utoipa::path(
    put,
    path = "/api/vendors/{id}",
    tag = "Vendors",
    request_body = UpdatePartyPayload,
    params(("id" = Uuid, Path, description = "ID do fornecedor")),
    responses(
        (status = 200, description = "Fornecedor atualizado", body = Vendor),
        (status = 404, description = "Fornecedor não encontrado")
    ),
    security(("api_jwt" = []))
)]
pub async fn update_vendor(
    State(app_state): State<AppState>,
    locale: Locale,
    _guard: RequireRole<StaffOnly>,
    Path(id): Path<Uuid>,
    Json(payload): Json<UpdatePartyPayload>,
) -> Result<impl IntoResponse, ApiError> {
    payload
        .validate()
        .map_err(|e| AppError::ValidationError(e).to_api_error(&locale, &app_state.i18n_store))?;

    let vendor = app_state
        .vendor_service
        .update_vendor(id, &payload)
        .await
        .map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;

    Ok((StatusCode::OK, Json(vendor)))
}

#[utoipa::path(
    delete,
    path = "/api/vendors/{id}",
    tag = "Vendors",
    params(("id" = Uuid, Path, description = "ID do fornecedor")),
    responses(
        (status = 204, description = "Fornecedor excluído"),
        (status = 409, description = "Fornecedor com notas ou pagamentos")
    ),
    security(("api_jwt" = []))
)]
pub async fn delete_vendor(
    State(app_state): State<AppState>,
    locale: Locale,
    _guard: RequireRole<StaffOnly>,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, ApiError> {
    app_state
        .vendor_service
        .delete_vendor(id)
        .await
        .map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;

    Ok(StatusCode::NO_CONTENT)
}
