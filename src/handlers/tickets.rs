// src/handlers/tickets.rs

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
        auth::AuthenticatedUser,
        i18n::Locale,
        rbac::{RequireRole, StaffOnly},
    },
    models::ticket::{
        CreateTicketPayload, Message, MessagePayload, MessageResponse, Ticket, TicketQuery, TicketStatusPayload,
        UpdateTicketPayload,
    },
};

// Qualquer usuário autenticado; CUSTOMER só enxerga o próprio cliente
#[utoipa::path(
    get,
    path = "/api/tickets",
    tag = "Tickets",
    params(TicketQuery),
    responses((status = 200, description = "Tickets visíveis ao usuário", body = Vec<Ticket>)),
    security(("api_jwt" = []))
)]
pub async fn list_tickets(
    State(app_state): State<AppState>,
    locale: Locale,
    AuthenticatedUser(user): AuthenticatedUser,
    Query(query): Query<TicketQuery>,
) -> Result<impl IntoResponse, ApiError> {
    let tickets = app_state
        .ticket_service
        .list_tickets(&user, &query)
        .await
        .map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;

    Ok((StatusCode::OK, Json(tickets)))
}

#[utoipa::path(
    get,
    path = "/api/tickets/{id}",
    tag = "Tickets",
    params(("id" = Uuid, Path, description = "ID do ticket")),
    responses(
        (status = 200, description = "Ticket", body = Ticket),
        (status = 404, description = "Ticket não encontrado")
    ),
    security(("api_jwt" = []))
)]
pub async fn get_ticket(
    State(app_state): State<AppState>,
    locale: Locale,
    AuthenticatedUser(user): AuthenticatedUser,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, ApiError> {
    let ticket = app_state
        .ticket_service
        .get_ticket(&user, id)
        .await
        .map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;

    Ok((StatusCode::OK, Json(ticket)))
}

#[utoipa::path(
    post,
    path = "/api/tickets",
    tag = "Tickets",
    request_body = CreateTicketPayload,
    responses(
        (status = 201, description = "Ticket aberto", body = Ticket),
        (status = 400, description = "Cliente ausente ou site de outro cliente")
    ),
    security(("api_jwt" = []))
)]
pub async fn create_ticket(
    State(app_state): State<AppState>,
    locale: Locale,
    AuthenticatedUser(user): AuthenticatedUser,
    Json(payload): Json<CreateTicketPayload>,
) -> Result<impl IntoResponse, ApiError> {
    payload
        .validate()
        .map_err(|e| AppError::ValidationError(e).to_api_error(&locale, &app_state.i18n_store))?;

    let ticket = app_state
        .ticket_service
        .create_ticket(&user, &payload)
        .await
        .map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;

    Ok((StatusCode::CREATED, Json(ticket)))
}

#[utoipa::path(
    put,
    path = "/api/tickets/{id}",
    tag = "Tickets",
    request_body = UpdateTicketPayload,
    params(("id" = Uuid, Path, description = "ID do ticket")),
    responses(
        (status = 200, description = "Ticket atualizado", body = Ticket),
        (status = 403, description = "Cliente tentando atribuir técnico"),
        (status = 404, description = "Ticket não encontrado")
    ),
    security(("api_jwt" = []))
)]
pub async fn update_ticket(
    State(app_state): State<AppState>,
    locale: Locale,
    AuthenticatedUser(user): AuthenticatedUser,
    Path(id): Path<Uuid>,
    Json(payload): Json<UpdateTicketPayload>,
) -> Result<impl IntoResponse, ApiError> {
    payload
        .validate()
        .map_err(|e| AppError::ValidationError(e).to_api_error(&locale, &app_state.i18n_store))?;

    let ticket = app_state
        .ticket_service
        .update_ticket(&user, id, &payload)
        .await
        .map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;

    Ok((StatusCode::OK, Json(ticket)))
}

#[utoipa::path(
    patch,
    path = "/api/tickets/{id}/status",
    tag = "Tickets",
    request_body = TicketStatusPayload,
    params(("id" = Uuid, Path, description = "ID do ticket")),
    responses(
        (status = 200, description = "Status alterado", body = Ticket),
        (status = 409, description = "Transição não permitida")
    ),
    security(("api_jwt" = []))
)]
pub async fn change_status(
    State(app_state): State<AppState>,
    locale: Locale,
    _guard: RequireRole<StaffOnly>,
    Path(id): Path<Uuid>,
    Json(payload): Json<TicketStatusPayload>,
) -> Result<impl IntoResponse, ApiError> {
    let ticket = app_state
        .ticket_service
        .change_status(id, payload.status)
        .await
        .map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;

    Ok((StatusCode::OK, Json(ticket)))
}

#[utoipa::path(
    delete,
    path = "/api/tickets/{id}",
    tag = "Tickets",
    params(("id" = Uuid, Path, description = "ID do ticket")),
    responses(
        (status = 204, description = "Ticket e mensagens excluídos"),
        (status = 403, description = "Só a equipe exclui tickets")
    ),
    security(("api_jwt" = []))
)]
pub async fn delete_ticket(
    State(app_state): State<AppState>,
    locale: Locale,
    _guard: RequireRole<StaffOnly>,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, ApiError> {
    app_state
        .ticket_service
        .delete_ticket(id)
        .await
        .map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;

    Ok(StatusCode::NO_CONTENT)
}

// ---
// MENSAGENS
// ---

#[utoipa::path(
    get,
    path = "/api/tickets/{id}/messages",
    tag = "Tickets",
    params(("id" = Uuid, Path, description = "ID do ticket")),
    responses(
        (status = 200, description = "Conversa do ticket", body = Vec<Message>),
        (status = 404, description = "Ticket não encontrado")
    ),
    security(("api_jwt" = []))
)]
pub async fn list_messages(
    State(app_state): State<AppState>,
    locale: Locale,
    AuthenticatedUser(user): AuthenticatedUser,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, ApiError> {
    let messages = app_state
        .ticket_service
        .list_messages(&user, id)
        .await
        .map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;

    Ok((StatusCode::OK, Json(messages)))
}

// A resposta traz o status do ticket depois da mensagem (pode ter mudado)
#[utoipa::path(
    post,
    path = "/api/tickets/{id}/messages",
    tag = "Tickets",
    request_body = MessagePayload,
    params(("id" = Uuid, Path, description = "ID do ticket")),
    responses(
        (status = 201, description = "Mensagem enviada", body = MessageResponse),
        (status = 409, description = "Ticket fechado")
    ),
    security(("api_jwt" = []))
)]
pub async fn add_message(
    State(app_state): State<AppState>,
    locale: Locale,
    AuthenticatedUser(user): AuthenticatedUser,
    Path(id): Path<Uuid>,
    Json(payload): Json<MessagePayload>,
) -> Result<impl IntoResponse, ApiError> {
    payload
        .validate()
        .map_err(|e| AppError::ValidationError(e).to_api_error(&locale, &app_state.i18n_store))?;

    let response = app_state
        .ticket_service
        .add_message(&user, id, &payload.body)
        .await
        .map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;

    Ok((StatusCode::CREATED, Json(response)))
}
