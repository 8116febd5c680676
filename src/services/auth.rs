// src/services/auth.rs

use bcrypt::{hash, verify};
use chrono::{DateTime, Duration, Utc};
use jsonwebtoken::{decode, encode, DecodingKey, EncodingKey, Header, Validation};
use sqlx::PgPool;

use crate::{
    common::error::AppError,
    db::UserRepository,
    models::auth::{Claims, User, UserRole},
};

/// Hash bcrypt fora do runtime (é CPU pura).
pub async fn hash_password(password: &str) -> Result<String, AppError> {
    let password = password.to_owned();
    let hashed = tokio::task::spawn_blocking(move || hash(&password, bcrypt::DEFAULT_COST))
        .await
        .map_err(|e| anyhow::anyhow!("Falha na task de hashing: {}", e))??;
    Ok(hashed)
}

async fn verify_password(password: &str, password_hash: &str) -> Result<bool, AppError> {
    let password = password.to_owned();
    let password_hash = password_hash.to_owned();
    let valid = tokio::task::spawn_blocking(move || verify(&password, &password_hash))
        .await
        .map_err(|e| anyhow::anyhow!("Falha na task de verificação de senha: {}", e))??;
    Ok(valid)
}

pub fn encode_token(
    secret: &str,
    user: &User,
    ttl_hours: i64,
    now: DateTime<Utc>,
) -> Result<String, AppError> {
    let expires_at = now + Duration::hours(ttl_hours);
    let claims = Claims {
        sub: user.id,
        role: user.role,
        exp: expires_at.timestamp() as usize,
        iat: now.timestamp() as usize,
    };

    Ok(encode(
        &Header::default(),
        &claims,
        &EncodingKey::from_secret(secret.as_ref()),
    )?)
}

pub fn decode_token(secret: &str, token: &str) -> Result<Claims, AppError> {
    let token_data = decode::<Claims>(
        token,
        &DecodingKey::from_secret(secret.as_ref()),
        &Validation::default(),
    )
    .map_err(|_| AppError::InvalidToken)?;
    Ok(token_data.claims)
}

#[derive(Clone)]
pub struct AuthService {
    user_repo: UserRepository,
    jwt_secret: String,
    jwt_ttl_hours: i64,
    pool: PgPool,
}

impl AuthService {
    pub fn new(user_repo: UserRepository, jwt_secret: String, jwt_ttl_hours: i64, pool: PgPool) -> Self {
        Self { user_repo, jwt_secret, jwt_ttl_hours, pool }
    }

    pub async fn login_user(&self, email: &str, password: &str) -> Result<String, AppError> {
        let user = self
            .user_repo
            .find_by_email(email)
            .await?
            .ok_or(AppError::InvalidCredentials)?;

        if !verify_password(password, &user.password_hash).await? {
            tracing::warn!("Tentativa de login com senha inválida para {}", email);
            return Err(AppError::InvalidCredentials);
        }

        if !user.is_active {
            return Err(AppError::InactiveUser);
        }

        tracing::info!("🔑 Login de {} ({:?})", user.email, user.role);
        encode_token(&self.jwt_secret, &user, self.jwt_ttl_hours, Utc::now())
    }

    /// Valida o token e relê o usuário (papel e status atuais, não os do token).
    pub async fn validate_token(&self, token: &str) -> Result<User, AppError> {
        let claims = decode_token(&self.jwt_secret, token)?;

        let user = self
            .user_repo
            .find_by_id(claims.sub)
            .await?
            .ok_or(AppError::InvalidToken)?;

        if !user.is_active {
            return Err(AppError::InactiveUser);
        }
        Ok(user)
    }

    /// Cria o primeiro admin quando a tabela de usuários está vazia.
    pub async fn bootstrap_admin(&self, email: &str, password: &str) -> Result<Option<User>, AppError> {
        if self.user_repo.count_users().await? > 0 {
            return Ok(None);
        }

        let password_hash = hash_password(password).await?;
        let admin = self
            .user_repo
            .create_user(&self.pool, "Administrator", email, &password_hash, UserRole::Admin, None, None)
            .await?;

        tracing::info!("👤 Usuário admin inicial criado: {}", admin.email);
        Ok(Some(admin))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use uuid::Uuid;

    fn user(role: UserRole) -> User {
        User {
            id: Uuid::new_v4(),
            name: "Ravi".into(),
            email: "ravi@enpl.in".into(),
            password_hash: String::new(),
            role,
            department_id: None,
            customer_id: None,
            is_active: true,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    #[test]
    fn token_round_trip_keeps_subject_and_role() {
        let u = user(UserRole::Staff);
        let token = encode_token("segredo", &u, 1, Utc::now()).unwrap();
        let claims = decode_token("segredo", &token).unwrap();

        assert_eq!(claims.sub, u.id);
        assert_eq!(claims.role, UserRole::Staff);
        assert_eq!(claims.exp - claims.iat, 3600);
    }

    #[test]
    fn token_signed_with_another_secret_is_rejected() {
        let token = encode_token("segredo", &user(UserRole::Admin), 1, Utc::now()).unwrap();
        assert!(matches!(decode_token("outro", &token), Err(AppError::InvalidToken)));
    }

    #[test]
    fn expired_token_is_rejected() {
        let issued = Utc::now() - Duration::hours(5);
        let token = encode_token("segredo", &user(UserRole::Admin), 1, issued).unwrap();
        assert!(matches!(decode_token("segredo", &token), Err(AppError::InvalidToken)));
    }

    #[test]
    fn garbage_is_rejected() {
        assert!(matches!(decode_token("segredo", "abc.def.ghi"), Err(AppError::InvalidToken)));
    }

    #[tokio::test]
    async fn password_hash_verifies() {
        let hashed = hash_password("segredo123").await.unwrap();
        assert!(verify_password("segredo123", &hashed).await.unwrap());
        assert!(!verify_password("errada", &hashed).await.unwrap());
    }
}
