// src/handlers/deliveries.rs

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
    models::delivery::{
        CreateDeliveryPayload, DeliveryQuery, MaterialDelivery, MaterialDeliveryDetail, UpdateDeliveryPayload,
    },
};

#[utoipa::path(
    get,
    path = "/api/deliveries",
    tag = "Deliveries",
    params(DeliveryQuery),
    responses((status = 200, description = "Entregas (challans)", body = Vec<MaterialDelivery>)),
    security(("api_jwt" = []))
)]
pub async fn list_deliveries(
    State(app_state): State<AppState>,
    locale: Locale,
    _guard: RequireRole<StaffOnly>,
    Query(query): Query<DeliveryQuery>,
) -> Result<impl IntoResponse, ApiError> {
    let deliveries = app_state
        .delivery_service
        .list_deliveries(&query)
        .await
        .map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;

    Ok((StatusCode::OK, Json(deliveries)))
}

#[utoipa::path(
    get,
    path = "/api/deliveries/{id}",
    tag = "Deliveries",
    params(("id" = Uuid, Path, description = "ID da entrega")),
    responses(
        (status = 200, description = "Entrega com itens", body = MaterialDeliveryDetail),
        (status = 404, description = "Entrega não encontrada")
    ),
    security(("api_jwt" = []))
)]
pub async fn get_delivery(
    State(app_state): State<AppState>,
    locale: Locale,
    _guard: RequireRole<StaffOnly>,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, ApiError> {
    let detail = app_state
        .delivery_service
        .get_delivery(id)
        .await
        .map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;

    Ok((StatusCode::OK, Json(detail)))
}

// Cada serial muda para o status do tipo de entrega (SALE -> SOLD, DEMO -> ON_DEMO...)
#[utoipa::path(
    post,
    path = "/api/deliveries",
    tag = "Deliveries",
    request_body = CreateDeliveryPayload,
    responses(
        (status = 201, description = "Entrega registrada", body = MaterialDeliveryDetail),
        (status = 400, description = "Cliente/fornecedor ausente ou serial repetido"),
        (status = 404, description = "Serial não encontrado"),
        (status = 409, description = "Serial indisponível")
    ),
    security(("api_jwt" = []))
)]
pub async fn create_delivery(
    State(app_state): State<AppState>,
    locale: Locale,
    _guard: RequireRole<StaffOnly>,
    Json(payload): Json<CreateDeliveryPayload>,
) -> Result<impl IntoResponse, ApiError> {
    payload
        .validate()
        .map_err(|e| AppError::ValidationError(e).to_api_error(&locale, &app_state.i18n_store))?;

    let detail = app_state
        .delivery_service
        .create_delivery(&payload)
        .await
        .map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;

    Ok((StatusCode::CREATED, Json(detail)))
}

#[utoipa::path(
    put,
    path = "/api/deliveries/{id}",
    tag = "Deliveries",
    request_body = UpdateDeliveryPayload,
    params(("id" = Uuid, Path, description = "ID da entrega")),
    responses(
        (status = 200, description = "Cabeçalho atualizado", body = MaterialDelivery),
        (status = 404, description = "Entrega não encontrada")
    ),
    security(("api_jwt" = []))
)]
pub async fn update_delivery(
    State(app_state): State<AppState>,
    locale: Locale,
    _guard: RequireRole<StaffOnly>,
    Path(id): Path<Uuid>,
    Json(payload): Json<UpdateDeliveryPayload>,
) -> Result<impl IntoResponse, ApiError> {
    payload
        .validate()
        .map_err(|e| AppError::ValidationError(e).to_api_error(&locale, &app_state.i18n_store))?;

    let delivery = app_state
        .delivery_service
        .update_delivery(id, &payload)
        .await
        .map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;

    Ok((StatusCode::OK, Json(delivery)))
}

#[utoipa::path(
    delete,
    path = "/api/deliveries/{id}",
    tag = "Deliveries",
    params(("id" = Uuid, Path, description = "ID da entrega")),
    responses(
        (status = 204, description = "Entrega desfeita, seriais restaurados"),
        (status = 409, description = "Serial movimentado depois da entrega")
    ),
    security(("api_jwt" = []))
)]
pub async fn delete_delivery(
    State(app_state): State<AppState>,
    locale: Locale,
    _guard: RequireRole<StaffOnly>,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, ApiError> {
    app_state
        .delivery_service
        .delete_delivery(id)
        .await
        .map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;

    Ok(StatusCode::NO_CONTENT)
}
