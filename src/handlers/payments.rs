// src/handlers/payments.rs

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
    models::payment::{CreatePaymentPayload, PaymentQuery, UpdatePaymentPayload, VendorPayment},
};

#[utoipa::path(
    get,
    path = "/api/vendor-payments",
    tag = "Payments",
    params(PaymentQuery),
    responses((status = 200, description = "Pagamentos a fornecedores", body = Vec<VendorPayment>)),
    security(("api_jwt" = []))
)]
pub async fn list_payments(
    State(app_state): State<AppState>,
    locale: Locale,
    _guard: RequireRole<StaffOnly>,
    Query(query): Query<PaymentQuery>,
) -> Result<impl IntoResponse, ApiError> {
    let payments = app_state
        .payment_service
        .list_payments(&query)
        .await
        .map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;

    Ok((StatusCode::OK, Json(payments)))
}

#[utoipa::path(
    get,
    path = "/api/vendor-payments/{id}",
    tag = "Payments",
    params(("id" = Uuid, Path, description = "ID do pagamento")),
    responses(
        (status = 200, description = "Pagamento", body = VendorPayment),
        (status = 404, description = "Pagamento não encontrado")
    ),
    security(("api_jwt" = []))
)]
pub async fn get_payment(
    State(app_state): State<AppState>,
    locale: Locale,
    _guard: RequireRole<StaffOnly>,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, ApiError> {
    let payment = app_state
        .payment_service
        .get_payment(id)
        .await
        .map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;

    Ok((StatusCode::OK, Json(payment)))
}

// Saldo e status da nota são recalculados na mesma transação
#[utoipa::path(
    post,
    path = "/api/vendor-payments",
    tag = "Payments",
    request_body = CreatePaymentPayload,
    responses(
        (status = 201, description = "Pagamento lançado", body = VendorPayment),
        (status = 400, description = "Excede o saldo ou fornecedor diferente da nota"),
        (status = 404, description = "Nota não encontrada")
    ),
    security(("api_jwt" = []))
)]
pub async fn create_payment(
    State(app_state): State<AppState>,
    locale: Locale,
    _guard: RequireRole<StaffOnly>,
    Json(payload): Json<CreatePaymentPayload>,
) -> Result<impl IntoResponse, ApiError> {
    payload
        .validate()
        .map_err(|e| AppError::ValidationError(e).to_api_error(&locale, &app_state.i18n_store))?;

    let payment = app_state
        .payment_service
        .create_payment(&payload)
        .await
        .map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;

    Ok((StatusCode::CREATED, Json(payment)))
}

#[utoipa::path(
    put,
    path = "/api/vendor-payments/{id}",
    tag = "Payments",
    request_body = UpdatePaymentPayload,
    params(("id" = Uuid, Path, description = "ID do pagamento")),
    responses(
        (status = 200, description = "Pagamento atualizado", body = VendorPayment),
        (status = 400, description = "Excede o saldo"),
        (status = 404, description = "Pagamento não encontrado")
    ),
    security(("api_jwt" = []))
)]
pub async fn update_payment(
    State(app_state): State<AppState>,
    locale: Locale,
    _guard: RequireRole<StaffOnly>,
    Path(id): Path<Uuid>,
    Json(payload): Json<UpdatePaymentPayload>,
) -> Result<impl IntoResponse, ApiError> {
    payload
        .validate()
        .map_err(|e| AppError::ValidationError(e).to_api_error(&locale, &app_state.i18n_store))?;

    let payment = app_state
        .payment_service
        .update_payment(id, &payload)
        .await
        .map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;

    Ok((StatusCode::OK, Json(payment)))
}

#[utoipa::path(
    delete,
    path = "/api/vendor-payments/{id}",
    tag = "Payments",
    params(("id" = Uuid, Path, description = "ID do pagamento")),
    responses(
        (status = 204, description = "Pagamento excluído, saldo da nota restaurado"),
        (status = 404, description = "Pagamento não encontrado")
    ),
    security(("api_jwt" = []))
)]
pub async fn delete_payment(
    State(app_state): State<AppState>,
    locale: Locale,
    _guard: RequireRole<StaffOnly>,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, ApiError> {
    app_state
        .payment_service
        .delete_payment(id)
        .await
        .map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;

    Ok(StatusCode::NO_CONTENT)
}
