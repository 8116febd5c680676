// src/middleware/auth.rs

use axum::{
    extract::{FromRequestParts, Request, State},
    http::request::Parts,
    middleware::Next,
    response::Response,
    RequestExt,
};
use axum_extra::{
    headers::{authorization::Bearer, Authorization},
    TypedHeader,
};

use crate::{
    common::error::{ApiError, AppError},
    config::AppState,
    middleware::i18n::Locale,
    models::auth::User,
};

// O middleware em si: valida o Bearer e pendura o usuário na requisição
pub async fn auth_guard(
    State(app_state): State<AppState>,
    locale: Locale,
    mut request: Request,
    next: Next,
) -> Result<Response, ApiError> {
    let to_api = |e: AppError| e.to_api_error(&locale, &app_state.i18n_store);

    let TypedHeader(Authorization(bearer)) = request
        .extract_parts::<TypedHeader<Authorization<Bearer>>>()
        .await
        .map_err(|_| to_api(AppError::InvalidToken))?;

    let user = app_state
        .auth_service
        .validate_token(bearer.token())
        .await
        .map_err(to_api)?;

    // Insere o usuário nos "extensions" da requisição
    request.extensions_mut().insert(user);
    Ok(next.run(request).await)
}

// Extrator para obter o usuário autenticado diretamente nos handlers
#[derive(Debug, Clone)]
pub struct AuthenticatedUser(pub User);

impl<S> FromRequestParts<S> for AuthenticatedUser
where
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        parts
            .extensions
            .get::<User>()
            .cloned()
            .map(AuthenticatedUser)
            .ok_or(AppError::InvalidToken)
    }
}
