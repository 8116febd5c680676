// src/handlers/contracts.rs

use axum::{
    extract::{Path, Query, State},
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
    models::contract::{
        ContractQuery, CreateContractPayload, ServiceContract, ServiceContractDetail, UpdateContractPayload,
    },
};

#[utoipa::path(
    get,
    path = "/api/contracts",
    tag = "Contracts",
    params(ContractQuery),
    responses((status = 200, description = "Contratos de serviço", body = Vec<ServiceContract>)),
    security(("api_jwt" = []))
)]
pub async fn list_contracts(
    State(app_state): State<AppState>,
    locale: Locale,
    _guard: RequireRole<StaffOnly>,
    Query(query): Query<ContractQuery>,
) -> Result<impl IntoResponse, ApiError> {
    let contracts = app_state
        .contract_service
        .list_contracts(&query)
        .await
        .map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;

    Ok((StatusCode::OK, Json(contracts)))
}

#[utoipa::path(
    get,
    path = "/api/contracts/{id}",
    tag = "Contracts",
    params(("id" = Uuid, Path, description = "ID do contrato")),
    responses(
        (status = 200, description = "Contrato com seriais cobertos", body = ServiceContractDetail),
        (status = 404, description = "Contrato não encontrado")
    ),
    security(("api_jwt" = []))
)]
pub async fn get_contract(
    State(app_state): State<AppState>,
    locale: Locale,
    _guard: RequireRole<StaffOnly>,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, ApiError> {
    let detail = app_state
        .contract_service
        .get_contract(id)
        .await
        .map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;

    Ok((StatusCode::OK, Json(detail)))
}

#[utoipa::path(
    post,
    path = "/api/contracts",
    tag = "Contracts",
    request_body = CreateContractPayload,
    responses(
        (status = 201, description = "Contrato criado", body = ServiceContractDetail),
        (status = 400, description = "Período inválido ou site de outro cliente"),
        (status = 404, description = "Serial não encontrado")
    ),
    security(("api_jwt" = []))
)]
pub async fn create_contract(
    State(app_state): State<AppState>,
    locale: Locale,
    _guard: RequireRole<StaffOnly>,
    Json(payload): Json<CreateContractPayload>,
) -> Result<impl IntoResponse, ApiError> {
    payload
        .validate()
        .map_err(|e| AppError::ValidationError(e).to_api_error(&locale, &app_state.i18n_store))?;

    let detail = app_state
        .contract_service
        .create_contract(&payload)
        .await
        .map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;

    Ok((StatusCode::CREATED, Json(detail)))
}

#[utoipa::path(
    put,
    path = "/api/contracts/{id}",
    tag = "Contracts",
    request_body = UpdateContractPayload,
    params(("id" = Uuid, Path, description = "ID do contrato")),
    responses(
        (status = 200, description = "Contrato atualizado", body = ServiceContractDetail),
        (status = 400, description = "Período inválido"),
        (status = 404, description = "Contrato não encontrado")
    ),
    security(("api_jwt" = []))
)]
pub async fn update_contract(
    State(app_state): State<AppState>,
    locale: Locale,
    _guard: RequireRole<StaffOnly>,
    Path(id): Path<Uuid>,
    Json(payload): Json<UpdateContractPayload>,
) -> Result<impl IntoResponse, ApiError> {
    payload
        .validate()
        .map_err(|e| AppError::ValidationError(e).to_api_error(&locale, &app_state.i18n_store))?;

    let detail = app_state
        .contract_service
        .update_contract(id, &payload)
        .await
        .map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;

    Ok((StatusCode::OK, Json(detail)))
}

#[utoipa::path(
    delete,
    path = "/api/contracts/{id}",
    tag = "Contracts",
    params(("id" = Uuid, Path, description = "ID do contrato")),
    responses(
        (status = 204, description = "Contrato excluído"),
        (status = 404, description = "Contrato não encontrado")
    ),
    security(("api_jwt" = []))
)]
pub async fn delete_contract(
    State(app_state): State<AppState>,
    locale: Locale,
    _guard: RequireRole<StaffOnly>,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, ApiError> {
    app_state
        .contract_service
        .delete_contract(id)
        .await
        .map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;

    Ok(StatusCode::NO_CONTENT)
}
