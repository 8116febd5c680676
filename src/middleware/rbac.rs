// src/middleware/rbac.rs

use std::marker::PhantomData;

use axum::{
    extract::{FromRef, FromRequestParts},
    http::request::Parts,
};

use crate::{
    common::error::{ApiError, AppError},
    config::AppState,
    middleware::i18n::Locale,
    models::auth::{User, UserRole},
};

/// 1. O Trait que define quem pode passar
pub trait RoleRequirement: Send + Sync + 'static {
    fn allows(role: UserRole) -> bool;
}

/// 2. O Extractor (Guardião). Depende do `auth_guard` ter rodado antes.
pub struct RequireRole<T>(pub PhantomData<T>);

impl<T, S> FromRequestParts<S> for RequireRole<T>
where
    T: RoleRequirement,
    S: Send + Sync,
    AppState: FromRef<S>,
{
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let app_state = AppState::from_ref(state);
        let Ok(locale) = Locale::from_request_parts(parts, state).await;

        let error = match parts.extensions.get::<User>() {
            None => AppError::InvalidToken,
            Some(user) if T::allows(user.role) => return Ok(RequireRole(PhantomData)),
            Some(_) => AppError::Forbidden,
        };

        Err(error.to_api_error(&locale, &app_state.i18n_store))
    }
}

// ---
// PAPÉIS (TIPOS)
// ---

/// Equipe interna: Admin ou Staff.
pub struct StaffOnly;
impl RoleRequirement for StaffOnly {
    fn allows(role: UserRole) -> bool {
        role.is_staff()
    }
}

pub struct AdminOnly;
impl RoleRequirement for AdminOnly {
    fn allows(role: UserRole) -> bool {
        role == UserRole::Admin
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn staff_requirement_accepts_internal_roles() {
        assert!(StaffOnly::allows(UserRole::Admin));
        assert!(StaffOnly::allows(UserRole::Staff));
        assert!(!StaffOnly::allows(UserRole::Customer));
    }

    #[test]
    fn admin_requirement_is_strict() {
        assert!(AdminOnly::allows(UserRole::Admin));
        assert!(!AdminOnly::allows(UserRole::Staff));
    }
}
