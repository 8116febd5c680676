// src/common/error.rs

use std::{collections::HashMap, sync::LazyLock};

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use rust_decimal::Decimal;
use serde_json::{json, Value};
use thiserror::Error;

use crate::{
    common::{db_utils::{classify_db_error, DbErrorKind}, i18n::I18nStore},
    middleware::i18n::Locale,
};

// Nosso tipo de erro interno. Os serviços e repositórios só conhecem este tipo;
// a conversão para HTTP (com tradução) acontece em `to_api_error`.
#[derive(Debug, Error)]
pub enum AppError {
    #[error("Erro de validação")]
    ValidationError(#[from] validator::ValidationErrors),

    #[error("E-mail já existe")]
    EmailAlreadyExists,

    #[error("Credenciais inválidas")]
    InvalidCredentials,

    #[error("Token inválido")]
    InvalidToken,

    #[error("Usuário inativo")]
    InactiveUser,

    #[error("Usuário não encontrado")]
    UserNotFound,

    #[error("Acesso negado")]
    Forbidden,

    #[error("Registro não encontrado: {0}")]
    NotFound(&'static str),

    #[error("Valor duplicado: {0}")]
    UniqueConstraintViolation(String),

    #[error("Registro em uso: {0}")]
    ResourceInUse(&'static str),

    #[error("Pagamento excede o saldo devedor ({due})")]
    PaymentExceedsDue { due: Decimal },

    #[error("Fornecedor do pagamento difere do fornecedor da nota")]
    VendorMismatch,

    #[error("Valor bruto menor que o total já pago ({paid})")]
    GrossBelowPaid { paid: Decimal },

    #[error("Transição de status inválida: {from} -> {to}")]
    InvalidStatusTransition { from: String, to: String },

    #[error("Ticket fechado")]
    TicketClosed,

    #[error("Serial {serial} indisponível ({status})")]
    SerialUnavailable { serial: String, status: String },

    #[error("Serial não encontrado: {0}")]
    SerialNotFound(String),

    #[error("Serial {0} movimentado depois da entrega")]
    DeliveryItemMoved(String),

    // Conflito de estado (409); a chave é a mensagem no I18nStore
    #[error("Conflito: {0}")]
    Conflict(&'static str),

    // O &'static str é a chave da mensagem no I18nStore
    #[error("Regra de negócio violada: {0}")]
    BusinessRule(&'static str),

    #[error("Certificado GST ainda não enviado")]
    GstCertificateMissing,

    #[error("Arquivo inválido: {0}")]
    InvalidUpload(&'static str),

    #[error("Arquivo maior que o limite de {limit} bytes")]
    UploadTooLarge { limit: usize },

    #[error("Erro de banco de dados: {0}")]
    DatabaseError(#[from] sqlx::Error),

    #[error("Erro de I/O: {0}")]
    IoError(#[from] std::io::Error),

    // `anyhow::Error` é ótimo para capturar o contexto do erro.
    #[error("Erro interno do servidor: {0}")]
    InternalServerError(#[from] anyhow::Error),

    #[error("Erro de Bcrypt: {0}")]
    BcryptError(#[from] bcrypt::BcryptError),

    #[error("Erro de JWT: {0}")]
    JwtError(#[from] jsonwebtoken::errors::Error),
}

// O erro que vai para o cliente: status + mensagem traduzida (+ detalhes opcionais).
#[derive(Debug)]
pub struct ApiError {
    pub status: StatusCode,
    pub error: String,
    pub details: Option<Value>,
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let body = match self.details {
            Some(details) => json!({ "error": self.error, "details": details }),
            None => json!({ "error": self.error }),
        };
        (self.status, Json(body)).into_response()
    }
}

type MessageParams = Vec<(&'static str, String)>;

impl AppError {
    /// Status HTTP + chave da mensagem + parâmetros para interpolação.
    fn classify(&self) -> (StatusCode, &'static str, MessageParams) {
        match self {
            AppError::ValidationError(_) => (StatusCode::BAD_REQUEST, "validation_failed", vec![]),
            AppError::EmailAlreadyExists => (StatusCode::CONFLICT, "email_already_exists", vec![]),
            AppError::InvalidCredentials => (StatusCode::UNAUTHORIZED, "invalid_credentials", vec![]),
            AppError::InvalidToken => (StatusCode::UNAUTHORIZED, "invalid_token", vec![]),
            AppError::InactiveUser => (StatusCode::FORBIDDEN, "inactive_user", vec![]),
            AppError::UserNotFound => (StatusCode::NOT_FOUND, "user_not_found", vec![]),
            AppError::Forbidden => (StatusCode::FORBIDDEN, "forbidden", vec![]),
            AppError::NotFound(entity) => (
                StatusCode::NOT_FOUND,
                "not_found",
                vec![("entity", format!("entity.{entity}"))],
            ),
            AppError::UniqueConstraintViolation(field) => (
                StatusCode::CONFLICT,
                "duplicate_value",
                vec![("field", field.clone())],
            ),
            AppError::ResourceInUse(entity) => (
                StatusCode::CONFLICT,
                "resource_in_use",
                vec![("entity", format!("entity.{entity}"))],
            ),
            AppError::PaymentExceedsDue { due } => (
                StatusCode::BAD_REQUEST,
                "payment_exceeds_due",
                vec![("due", due.to_string())],
            ),
            AppError::VendorMismatch => (StatusCode::BAD_REQUEST, "vendor_mismatch", vec![]),
            AppError::GrossBelowPaid { paid } => (
                StatusCode::BAD_REQUEST,
                "gross_below_paid",
                vec![("paid", paid.to_string())],
            ),
            AppError::InvalidStatusTransition { from, to } => (
                StatusCode::CONFLICT,
                "invalid_status_transition",
                vec![("from", from.clone()), ("to", to.clone())],
            ),
            AppError::TicketClosed => (StatusCode::CONFLICT, "ticket_closed", vec![]),
            AppError::SerialUnavailable { serial, status } => (
                StatusCode::CONFLICT,
                "serial_unavailable",
                vec![("serial", serial.clone()), ("status", status.clone())],
            ),
            AppError::SerialNotFound(serial) => (
                StatusCode::NOT_FOUND,
                "serial_not_found",
                vec![("serial", serial.clone())],
            ),
            AppError::DeliveryItemMoved(serial) => (
                StatusCode::CONFLICT,
                "delivery_items_moved",
                vec![("serial", serial.clone())],
            ),
            AppError::Conflict(key) => (StatusCode::CONFLICT, *key, vec![]),
            AppError::BusinessRule(key) => (StatusCode::BAD_REQUEST, *key, vec![]),
            AppError::InvalidUpload(key) => (StatusCode::BAD_REQUEST, *key, vec![]),
            AppError::GstCertificateMissing => (StatusCode::NOT_FOUND, "gst_certificate_missing", vec![]),
            AppError::UploadTooLarge { limit } => (
                StatusCode::PAYLOAD_TOO_LARGE,
                "upload_too_large",
                vec![("limit", limit.to_string())],
            ),
            AppError::DatabaseError(e) => match classify_db_error(e) {
                DbErrorKind::NotFound => (
                    StatusCode::NOT_FOUND,
                    "not_found",
                    vec![("entity", "entity.record".to_string())],
                ),
                DbErrorKind::UniqueViolation(constraint) => (
                    StatusCode::CONFLICT,
                    "duplicate_value",
                    vec![("field", constraint)],
                ),
                DbErrorKind::ForeignKeyViolation(_) => (
                    StatusCode::CONFLICT,
                    "invalid_reference",
                    vec![],
                ),
                DbErrorKind::Other => (StatusCode::INTERNAL_SERVER_ERROR, "internal_error", vec![]),
            },
            // Todos os outros erros viram 500.
            AppError::IoError(_)
            | AppError::InternalServerError(_)
            | AppError::BcryptError(_)
            | AppError::JwtError(_) => (StatusCode::INTERNAL_SERVER_ERROR, "internal_error", vec![]),
        }
    }

    /// Converte o erro interno na resposta HTTP, já traduzida para o idioma do cliente.
    pub fn to_api_error(&self, locale: &Locale, store: &I18nStore) -> ApiError {
        let (status, key, params) = self.classify();

        if status == StatusCode::INTERNAL_SERVER_ERROR {
            // O detalhe fica só no log; o cliente recebe a mensagem genérica.
            tracing::error!("Erro Interno do Servidor: {}", self);
        }

        // Parâmetros que começam com "entity." também são chaves de tradução
        let params: Vec<(&str, String)> = params
            .into_iter()
            .map(|(name, value)| {
                if value.starts_with("entity.") {
                    (name, store.translate(&locale.0, &value, &[]))
                } else {
                    (name, value)
                }
            })
            .collect();

        let details = match self {
            AppError::ValidationError(errors) => Some(validation_details(errors)),
            _ => None,
        };

        ApiError {
            status,
            error: store.translate(&locale.0, key, &params),
            details,
        }
    }
}

// Retornar todos os detalhes da validação: campo -> mensagens (ou códigos).
fn validation_details(errors: &validator::ValidationErrors) -> Value {
    let mut details: HashMap<String, Vec<String>> = HashMap::new();
    for (field, field_errors) in errors.field_errors() {
        let messages: Vec<String> = field_errors
            .iter()
            .map(|e| {
                e.message
                    .as_ref()
                    .map(|m| m.to_string())
                    .unwrap_or_else(|| e.code.to_string())
            })
            .collect();
        details.insert(field.to_string(), messages);
    }
    json!(details)
}

static DEFAULT_STORE: LazyLock<I18nStore> = LazyLock::new(I18nStore::new);

// Usado quando não há extrator de idioma à mão (ex: rejeições de middleware).
impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        self.to_api_error(&Locale::default(), &DEFAULT_STORE).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use validator::{ValidationError, ValidationErrors};

    fn en() -> Locale {
        Locale("en".to_string())
    }

    #[test]
    fn maps_business_errors_to_status_codes() {
        let store = I18nStore::new();
        let cases = [
            (AppError::InvalidToken, StatusCode::UNAUTHORIZED),
            (AppError::Forbidden, StatusCode::FORBIDDEN),
            (AppError::NotFound("customer"), StatusCode::NOT_FOUND),
            (AppError::ResourceInUse("vendor"), StatusCode::CONFLICT),
            (AppError::TicketClosed, StatusCode::CONFLICT),
            (AppError::VendorMismatch, StatusCode::BAD_REQUEST),
            (AppError::UploadTooLarge { limit: 10 }, StatusCode::PAYLOAD_TOO_LARGE),
            (AppError::DatabaseError(sqlx::Error::RowNotFound), StatusCode::NOT_FOUND),
            (AppError::DatabaseError(sqlx::Error::PoolTimedOut), StatusCode::INTERNAL_SERVER_ERROR),
        ];

        for (err, expected) in cases {
            assert_eq!(err.to_api_error(&en(), &store).status, expected, "{err:?}");
        }
    }

    #[test]
    fn not_found_message_names_the_entity() {
        let store = I18nStore::new();
        let api = AppError::NotFound("customer").to_api_error(&en(), &store);
        assert_eq!(api.error, "Customer not found.");

        let api = AppError::NotFound("customer").to_api_error(&Locale("pt".into()), &store);
        assert_eq!(api.error, "Cliente não encontrado(a).");
    }

    #[test]
    fn missing_gst_certificate_has_its_own_message() {
        let store = I18nStore::new();
        let api = AppError::GstCertificateMissing.to_api_error(&en(), &store);
        assert_eq!(api.status, StatusCode::NOT_FOUND);
        assert_eq!(api.error, "No GST certificate has been uploaded yet.");
    }

    #[test]
    fn payment_error_carries_the_due_amount() {
        let store = I18nStore::new();
        let api = AppError::PaymentExceedsDue { due: Decimal::new(25050, 2) }
            .to_api_error(&en(), &store);
        assert_eq!(api.status, StatusCode::BAD_REQUEST);
        assert!(api.error.contains("250.50"), "{}", api.error);
    }

    #[test]
    fn validation_errors_expose_field_details() {
        let mut errors = ValidationErrors::new();
        let mut err = ValidationError::new("email");
        err.message = Some("invalid_email".into());
        errors.add("email", err);

        let api = AppError::ValidationError(errors).to_api_error(&en(), &I18nStore::new());
        assert_eq!(api.status, StatusCode::BAD_REQUEST);
        let details = api.details.expect("details");
        assert_eq!(details["email"][0], "invalid_email");
    }

    #[test]
    fn internal_errors_hide_the_cause() {
        let api = AppError::InternalServerError(anyhow::anyhow!("segredo"))
            .to_api_error(&en(), &I18nStore::new());
        assert_eq!(api.status, StatusCode::INTERNAL_SERVER_ERROR);
        assert!(!api.error.contains("segredo"));
    }
}
