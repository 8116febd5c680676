// src/handlers/dashboard.rs

use axum::{
    extract::State,
    http::StatusCode,
    response::IntoResponse,
    Json,
};

use crate::{
    common::error::ApiError,
    config::AppState,
    middleware::{
        i18n::Locale,
        rbac::{RequireRole, StaffOnly},
    },
    // Importamos os models para referenciar no Swagger
    models::dashboard::{DashboardCounts, TicketStatusCount},
};

// GET /api/dashboard/counts
#[utoipa::path(
    get,
    path = "/api/dashboard/counts",
    tag = "Dashboard",
    responses(
        (status = 200, description = "Contadores dos cards do painel", body = DashboardCounts),
        (status = 401, description = "Não autorizado"),
        (status = 403, description = "Só a equipe")
    ),
    security(("api_jwt" = []))
)]
pub async fn get_counts(
    State(app_state): State<AppState>,
    locale: Locale,
    _guard: RequireRole<StaffOnly>,
) -> Result<impl IntoResponse, ApiError> {
    let counts = app_state
        .dashboard_service
        .get_counts()
        .await
        .map_err(|app_err| app_err.to_api_error(&locale, &app_state.i18n_store))?;

    Ok((StatusCode::OK, Json(counts)))
}

// GET /api/dashboard/tickets-by-status
#[utoipa::path(
    get,
    path = "/api/dashboard/tickets-by-status",
    tag = "Dashboard",
    responses(
        (status = 200, description = "Quantidade de tickets por status", body = Vec<TicketStatusCount>),
        (status = 401, description = "Não autorizado")
    ),
    security(("api_jwt" = []))
)]
pub async fn get_tickets_by_status(
    State(app_state): State<AppState>,
    locale: Locale,
    _guard: RequireRole<StaffOnly>,
) -> Result<impl IntoResponse, ApiError> {
    let chart = app_state
        .dashboard_service
        .tickets_by_status()
        .await
        .map_err(|app_err| app_err.to_api_error(&locale, &app_state.i18n_store))?;

    Ok((StatusCode::OK, Json(chart)))
}
