// src/handlers/auth.rs

use axum::{extract::State, Json};
use validator::Validate;

use crate::{
    common::error::{ApiError, AppError},
    config::AppState,
    middleware::{auth::AuthenticatedUser, i18n::Locale},
    models::auth::{AuthResponse, LoginUserPayload, User},
};

// Handler de login
#[utoipa::path(
    post,
    path = "/api/auth/login",
    tag = "Auth",
    request_body = LoginUserPayload,
    responses(
        (status = 200, description = "Token JWT", body = AuthResponse),
        (status = 400, description = "Payload inválido"),
        (status = 401, description = "Credenciais inválidas"),
        (status = 403, description = "Usuário inativo")
    )
)]
pub async fn login(
    State(app_state): State<AppState>,
    locale: Locale,
    Json(payload): Json<LoginUserPayload>,
) -> Result<Json<AuthResponse>, ApiError> {
    payload
        .validate()
        .map_err(|e| AppError::ValidationError(e).to_api_error(&locale, &app_state.i18n_store))?;

    let token = app_state
        .auth_service
        .login_user(&payload.email, &payload.password)
        .await
        .map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;

    Ok(Json(AuthResponse { token }))
}

// Handler da rota protegida /me
#[utoipa::path(
    get,
    path = "/api/users/me",
    tag = "Users",
    responses(
        (status = 200, description = "Usuário autenticado", body = User),
        (status = 401, description = "Não autorizado")
    ),
    security(("api_jwt" = []))
)]
pub async fn get_me(AuthenticatedUser(user): AuthenticatedUser) -> Json<User> {
    Json(user)
}
