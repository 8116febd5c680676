// src/handlers/customers.rs

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
    models::{
        customer::{CreateSitePayload, Customer, Site, SiteQuery, UpdateSitePayload},
        party::{CreatePartyPayload, UpdatePartyPayload},
    },
};

// =========================================================================
//  CLIENTES
// =========================================================================

#[utoipa::path(
    get,
    path = "/api/customers",
    tag = "Customers",
    responses((status = 200, description = "Clientes", body = Vec<Customer>)),
    security(("api_jwt" = []))
)]
pub async fn list_customers(
    State(app_state): State<AppState>,
    locale: Locale,
    _guard: RequireRole<StaffOnly>,
) -> Result<impl IntoResponse, ApiError> {
    let customers = app_state
        .customer_service
        .list_customers()
        .await
        .map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;

    Ok((StatusCode::OK, Json(customers)))
}

#[utoipa::path(
    get,
    path = "/api/customers/{id}",
    tag = "Customers",
    params(("id" = Uuid, Path, description = "ID do cliente")),
    responses(
        (status = 200, description = "Cliente", body = Customer),
        (status = 404, description = "Cliente não encontrado")
    ),
    security(("api_jwt" = []))
)]
pub async fn get_customer(
    State(app_state): State<AppState>,
    locale: Locale,
    _guard: RequireRole<StaffOnly>,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, ApiError> {
    let customer = app_state
        .customer_service
        .get_customer(id)
        .await
        .map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;

    Ok((StatusCode::OK, Json(customer)))
}

#[utoipa::path(
    post,
    path = "/api/customers",
    tag = "Customers",
    request_body = CreatePartyPayload,
    responses(
        (status = 201, description = "Cliente criado", body = Customer),
        (status = 400, description = "Payload inválido (GSTIN, e-mail, PIN)")
    ),
    security(("api_jwt" = []))
)]
pub async fn create_customer(
    State(app_state): State<AppState>,
    locale: Locale,
    _guard: RequireRole<StaffOnly>,
    Json(payload): Json<CreatePartyPayload>,
) -> Result<impl IntoResponse, ApiError> {
    payload
        .validate()
        .map_err(|e| AppError::ValidationError(e).to_api_error(&locale, &app_state.i18n_store))?;

    let customer = app_state
        .customer_service
        .create_customer(&payload)
        .await
        .map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;

    Ok((StatusCode::CREATED, Json(customer)))
}

#[utoipa::path(
    put,
    path = "/api/customers/{id}",
    tag = "Customers",
    request_body = UpdatePartyPayload,
    params(("id" = Uuid, Path, description = "ID do cliente")),
    responses(
        (status = 200, description = "Cliente atualizado", body = Customer),
        (status = 404, description = "Cliente não encontrado")
    ),
    security(("api_jwt" = []))
)]
pub async fn update_customer(
    State(app_state): State<AppState>,
    locale: Locale,
    _guard: RequireRole<StaffOnly>,
    Path(id): Path<Uuid>,
    Json(payload): Json<UpdatePartyPayload>,
) -> Result<impl IntoResponse, ApiError> {
    payload
        .validate()
        .map_err(|e| AppError::ValidationError(e).to_api_error(&locale, &app_state.i18n_store))?;

    let customer = app_state
        .customer_service
        .update_customer(id, &payload)
        .await
        .map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;

    Ok((StatusCode::OK, Json(customer)))
}

// Os sites do cliente vão junto; tickets, contratos ou entregas bloqueiam
#[utoipa::path(
    delete,
    path = "/api/customers/{id}",
    tag = "Customers",
    params(("id" = Uuid, Path, description = "ID do cliente")),
    responses(
        (status = 204, description = "Cliente e sites excluídos"),
        (status = 409, description = "Cliente com tickets, contratos ou entregas")
    ),
    security(("api_jwt" = []))
)]
pub async fn delete_customer(
    State(app_state): State<AppState>,
    locale: Locale,
    _guard: RequireRole<StaffOnly>,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, ApiError> {
    app_state
        .customer_service
        .delete_customer(id)
        .await
        .map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;

    Ok(StatusCode::NO_CONTENT)
}

#[utoipa::path(
    get,
    path = "/api/customers/{id}/sites",
    tag = "Customers",
    params(("id" = Uuid, Path, description = "ID do cliente")),
    responses(
        (status = 200, description = "Sites do cliente", body = Vec<Site>),
        (status = 404, description = "Cliente não encontrado")
    ),
    security(("api_jwt" = []))
)]
pub async fn list_customer_sites(
    State(app_state): State<AppState>,
    locale: Locale,
    _guard: RequireRole<StaffOnly>,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, ApiError> {
    let sites = app_state
        .customer_service
        .list_customer_sites(id)
        .await
        .map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;

    Ok((StatusCode::OK, Json(sites)))
}

// =========================================================================
//  SITES
// =========================================================================

#[utoipa::path(
    get,
    path = "/api/sites",
    tag = "Sites",
    params(SiteQuery),
    responses((status = 200, description = "Sites", body = Vec<Site>)),
    security(("api_jwt" = []))
)]
pub async fn list_sites(
    State(app_state): State<AppState>,
    locale: Locale,
    _guard: RequireRole<StaffOnly>,
    Query(query): Query<SiteQuery>,
) -> Result<impl IntoResponse, ApiError> {
    let sites = app_state
        .customer_service
        .list_sites(query.customer_id)
        .await
        .map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;

    Ok((StatusCode::OK, Json(sites)))
}

#[utoipa::path(
    get,
    path = "/api/sites/{id}",
    tag = "Sites",
    params(("id" = Uuid, Path, description = "ID do site")),
    responses(
        (status = 200, description = "Site", body = Site),
        (status = 404, description = "Site não encontrado")
    ),
    security(("api_jwt" = []))
)]
pub async fn get_site(
    State(app_state): State<AppState>,
    locale: Locale,
    _guard: RequireRole<StaffOnly>,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, ApiError> {
    let site = app_state
        .customer_service
        .get_site(id)
        .await
        .map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;

    Ok((StatusCode::OK, Json(site)))
}

#[utoipa::path(
    post,
    path = "/api/sites",
    tag = "Sites",
    request_body = CreateSitePayload,
    responses(
        (status = 201, description = "Site criado", body = Site),
        (status = 404, description = "Cliente não encontrado")
    ),
    security(("api_jwt" = []))
)]
pub async fn create_site(
    State(app_state): State<AppState>,
    locale: Locale,
    _guard: RequireRole<StaffOnly>,
    Json(payload): Json<CreateSitePayload>,
) -> Result<impl IntoResponse, ApiError> {
    payload
        .validate()
        .map_err(|e| AppError::ValidationError(e).to_api_error(&locale, &app_state.i18n_store))?;

    let site = app_state
        .customer_service
        .create_site(&payload)
        .await
        .map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;

    Ok((StatusCode::CREATED, Json(site)))
}

#[utoipa::path(
    put,
    path = "/api/sites/{id}",
    tag = "Sites",
    request_body = UpdateSitePayload,
    params(("id" = Uuid, Path, description = "ID do site")),
    responses(
        (status = 200, description = "Site atualizado", body = Site),
        (status = 404, description = "Site não encontrado")
    ),
    security(("api_jwt" = []))
)]
pub async fn update_site(
    State(app_state): State<AppState>,
    locale: Locale,
    _guard: RequireRole<StaffOnly>,
    Path(id): Path<Uuid>,
    Json(payload): Json<UpdateSitePayload>,
) -> Result<impl IntoResponse, ApiError> {
    payload
        .validate()
        .map_err(|e| AppError::ValidationError(e).to_api_error(&locale, &app_state.i18n_store))?;

    let site = app_state
        .customer_service
        .update_site(id, &payload)
        .await
        .map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;

    Ok((StatusCode::OK, Json(site)))
}

#[utoipa::path(
    delete,
    path = "/api/sites/{id}",
    tag = "Sites",
    params(("id" = Uuid, Path, description = "ID do site")),
    responses(
        (status = 204, description = "Site excluído"),
        (status = 409, description = "Site em uso")
    ),
    security(("api_jwt" = []))
)]
pub async fn delete_site(
    State(app_state): State<AppState>,
    locale: Locale,
    _guard: RequireRole<StaffOnly>,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, ApiError> {
    app_state
        .customer_service
        .delete_site(id)
        .await
        .map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;

    Ok(StatusCode::NO_CONTENT)
}
