// src/handlers/inventory.rs

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::IntoResponse,
    Json,
};
use uuid::Uuid;
use validator::Validate;

// Importa os nossos extratores e erros
use crate::{
    common::error::{ApiError, AppError},
    config::AppState,
    middleware::{
        i18n::Locale,                  // O extrator de Idioma
        rbac::{RequireRole, StaffOnly}, // Guardião de papel
    },
    models::inventory::{
        CreateInventoryPayload, Inventory, InventoryDetail, InventoryQuery, StockItem, StockQuery,
        UpdateInventoryPayload,
    },
};

// ---
// NOTAS DE COMPRA
// ---

#[utoipa::path(
    get,
    path = "/api/inventory",
    tag = "Inventory",
    params(InventoryQuery),
    responses((status = 200, description = "Notas de compra", body = Vec<Inventory>)),
    security(("api_jwt" = []))
)]
pub async fn list_invoices(
    State(app_state): State<AppState>,
    locale: Locale,
    _guard: RequireRole<StaffOnly>,
    Query(query): Query<InventoryQuery>,
) -> Result<impl IntoResponse, ApiError> {
    let invoices = app_state
        .inventory_service
        .list_invoices(&query)
        .await
        .map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;

    Ok((StatusCode::OK, Json(invoices)))
}

#[utoipa::path(
    get,
    path = "/api/inventory/{id}",
    tag = "Inventory",
    params(("id" = Uuid, Path, description = "ID da nota")),
    responses(
        (status = 200, description = "Nota com os seriais", body = InventoryDetail),
        (status = 404, description = "Nota não encontrada")
    ),
    security(("api_jwt" = []))
)]
pub async fn get_invoice(
    State(app_state): State<AppState>,
    locale: Locale,
    _guard: RequireRole<StaffOnly>,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, ApiError> {
    let detail = app_state
        .inventory_service
        .get_invoice(id)
        .await
        .map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;

    Ok((StatusCode::OK, Json(detail)))
}

// Cabeçalho + seriais numa transação só; vencimento e status calculados no servidor
#[utoipa::path(
    post,
    path = "/api/inventory",
    tag = "Inventory",
    request_body = CreateInventoryPayload,
    responses(
        (status = 201, description = "Nota registrada", body = InventoryDetail),
        (status = 400, description = "Payload inválido"),
        (status = 409, description = "Serial ou número de nota duplicado")
    ),
    security(("api_jwt" = []))
)]
pub async fn create_invoice(
    State(app_state): State<AppState>,
    locale: Locale,
    _guard: RequireRole<StaffOnly>,
    Json(payload): Json<CreateInventoryPayload>,
) -> Result<impl IntoResponse, ApiError> {
    payload
        .validate()
        .map_err(|e| AppError::ValidationError(e).to_api_error(&locale, &app_state.i18n_store))?;

    let detail = app_state
        .inventory_service
        .create_invoice(&payload)
        .await
        .map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;

    Ok((StatusCode::CREATED, Json(detail)))
}

#[utoipa::path(
    put,
    path = "/api/inventory/{id}",
    tag = "Inventory",
    request_body = UpdateInventoryPayload,
    params(("id" = Uuid, Path, description = "ID da nota")),
    responses(
        (status = 200, description = "Nota atualizada", body = InventoryDetail),
        (status = 400, description = "Valor bruto menor que o já pago"),
        (status = 404, description = "Nota não encontrada")
    ),
    security(("api_jwt" = []))
)]
pub async fn update_invoice(
    State(app_state): State<AppState>,
    locale: Locale,
    _guard: RequireRole<StaffOnly>,
    Path(id): Path<Uuid>,
    Json(payload): Json<UpdateInventoryPayload>,
) -> Result<impl IntoResponse, ApiError> {
    payload
        .validate()
        .map_err(|e| AppError::ValidationError(e).to_api_error(&locale, &app_state.i18n_store))?;

    let detail = app_state
        .inventory_service
        .update_invoice(id, &payload)
        .await
        .map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;

    Ok((StatusCode::OK, Json(detail)))
}

#[utoipa::path(
    delete,
    path = "/api/inventory/{id}",
    tag = "Inventory",
    params(("id" = Uuid, Path, description = "ID da nota")),
    responses(
        (status = 204, description = "Nota, seriais e pagamentos excluídos"),
        (status = 409, description = "Seriais já entregues ou em contrato")
    ),
    security(("api_jwt" = []))
)]
pub async fn delete_invoice(
    State(app_state): State<AppState>,
    locale: Locale,
    _guard: RequireRole<StaffOnly>,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, ApiError> {
    app_state
        .inventory_service
        .delete_invoice(id)
        .await
        .map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;

    Ok(StatusCode::NO_CONTENT)
}

// ---
// ESTOQUE (SERIAIS)
// ---

#[utoipa::path(
    get,
    path = "/api/inventory/items",
    tag = "Inventory",
    params(StockQuery),
    responses((status = 200, description = "Seriais com produto e nota", body = Vec<StockItem>)),
    security(("api_jwt" = []))
)]
pub async fn list_stock(
    State(app_state): State<AppState>,
    locale: Locale,
    _guard: RequireRole<StaffOnly>,
    Query(query): Query<StockQuery>,
) -> Result<impl IntoResponse, ApiError> {
    let items = app_state
        .inventory_service
        .list_stock(&query)
        .await
        .map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;

    Ok((StatusCode::OK, Json(items)))
}

#[utoipa::path(
    get,
    path = "/api/inventory/serial/{serial}",
    tag = "Inventory",
    params(("serial" = String, Path, description = "Número de série")),
    responses(
        (status = 200, description = "Serial encontrado", body = StockItem),
        (status = 404, description = "Serial não encontrado")
    ),
    security(("api_jwt" = []))
)]
pub async fn find_by_serial(
    State(app_state): State<AppState>,
    locale: Locale,
    _guard: RequireRole<StaffOnly>,
    Path(serial): Path<String>,
) -> Result<impl IntoResponse, ApiError> {
    let item = app_state
        .inventory_service
        .find_by_serial(&serial)
        .await
        .map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;

    Ok((StatusCode::OK, Json(item)))
}
