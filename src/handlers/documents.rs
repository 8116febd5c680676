// src/handlers/documents.rs

use axum::{
    extract::{multipart::MultipartError, Multipart, Path, State},
    http::{header, StatusCode},
    response::{IntoResponse, Response},
    Json,
};
use uuid::Uuid;

use crate::{
    common::error::{ApiError, AppError},
    config::AppState,
    middleware::{
        i18n::Locale,
        rbac::{RequireRole, StaffOnly},
    },
    models::{customer::Customer, vendor::Vendor},
};

/// Formulário multipart com o PDF no campo `file`.
#[allow(dead_code)]
#[derive(utoipa::ToSchema)]
pub struct GstCertificateUpload {
    #[schema(value_type = String, format = Binary)]
    pub file: Vec<u8>,
}

// Lê o campo "file" do multipart: (content-type, bytes)
async fn read_file_field(
    mut multipart: Multipart,
    max_bytes: usize,
) -> Result<(Option<String>, Vec<u8>), AppError> {
    let upload_error = |e: MultipartError| {
        if e.status() == StatusCode::PAYLOAD_TOO_LARGE {
            AppError::UploadTooLarge { limit: max_bytes }
        } else {
            tracing::warn!("Multipart inválido: {}", e);
            AppError::InvalidUpload("upload_missing_file")
        }
    };

    while let Some(field) = multipart.next_field().await.map_err(upload_error)? {
        if field.name() != Some("file") {
            continue;
        }
        let content_type = field.content_type().map(str::to_string);
        let bytes = field.bytes().await.map_err(upload_error)?;
        return Ok((content_type, bytes.to_vec()));
    }

    Err(AppError::InvalidUpload("upload_missing_file"))
}

fn pdf_response(bytes: Vec<u8>, file_name: &str) -> Response {
    let headers = [
        (header::CONTENT_TYPE, "application/pdf".to_string()),
        (header::CONTENT_DISPOSITION, format!("inline; filename=\"{file_name}\"")),
    ];
    (headers, bytes).into_response()
}

// ---
// FORNECEDORES
// ---

#[utoipa::path(
    post,
    path = "/api/vendors/{id}/gst-certificate",
    tag = "Vendors",
    request_body(content = GstCertificateUpload, content_type = "multipart/form-data"),
    params(("id" = Uuid, Path, description = "ID do fornecedor")),
    responses(
        (status = 200, description = "Certificado salvo", body = Vendor),
        (status = 400, description = "Arquivo ausente ou não é PDF"),
        (status = 404, description = "Fornecedor não encontrado"),
        (status = 413, description = "Arquivo acima do limite")
    ),
    security(("api_jwt" = []))
)]
pub async fn upload_vendor_gst(
    State(app_state): State<AppState>,
    locale: Locale,
    _guard: RequireRole<StaffOnly>,
    Path(id): Path<Uuid>,
    multipart: Multipart,
) -> Result<impl IntoResponse, ApiError> {
    let to_api = |e: AppError| e.to_api_error(&locale, &app_state.i18n_store);

    let (content_type, bytes) = read_file_field(multipart, app_state.config.max_upload_bytes)
        .await
        .map_err(to_api)?;

    let vendor = app_state
        .vendor_service
        .upload_gst_certificate(id, content_type.as_deref(), &bytes)
        .await
        .map_err(to_api)?;

    Ok((StatusCode::OK, Json(vendor)))
}

#[utoipa::path(
    get,
    path = "/api/vendors/{id}/gst-certificate",
    tag = "Vendors",
    params(("id" = Uuid, Path, description = "ID do fornecedor")),
    responses(
        (status = 200, description = "PDF do certificado (application/pdf)"),
        (status = 404, description = "Fornecedor ou documento não encontrado")
    ),
    security(("api_jwt" = []))
)]
pub async fn download_vendor_gst(
    State(app_state): State<AppState>,
    locale: Locale,
    _guard: RequireRole<StaffOnly>,
    Path(id): Path<Uuid>,
) -> Result<Response, ApiError> {
    let bytes = app_state
        .vendor_service
        .download_gst_certificate(id)
        .await
        .map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;

    Ok(pdf_response(bytes, &format!("gst_vendor_{id}.pdf")))
}

// ---
// CLIENTES
// ---

#[utoipa::path(
    post,
    path = "/api/customers/{id}/gst-certificate",
    tag = "Customers",
    request_body(content = GstCertificateUpload, content_type = "multipart/form-data"),
    params(("id" = Uuid, Path, description = "ID do cliente")),
    responses(
        (status = 200, description = "Certificado salvo", body = Customer),
        (status = 400, description = "Arquivo ausente ou não é PDF"),
        (status = 404, description = "Cliente não encontrado"),
        (status = 413, description = "Arquivo acima do limite")
    ),
    security(("api_jwt" = []))
)]
pub async fn upload_customer_gst(
    State(app_state): State<AppState>,
    locale: Locale,
    _guard: RequireRole<StaffOnly>,
    Path(id): Path<Uuid>,
    multipart: Multipart,
) -> Result<impl IntoResponse, ApiError> {
    let to_api = |e: AppError| e.to_api_error(&locale, &app_state.i18n_store);

    let (content_type, bytes) = read_file_field(multipart, app_state.config.max_upload_bytes)
        .await
        .map_err(to_api)?;

    let customer = app_state
        .customer_service
        .upload_gst_certificate(id, content_type.as_deref(), &bytes)
        .await
        .map_err(to_api)?;

    Ok((StatusCode::OK, Json(customer)))
}

#[utoipa::path(
    get,
    path = "/api/customers/{id}/gst-certificate",
    tag = "Customers",
    params(("id" = Uuid, Path, description = "ID do cliente")),
    responses(
        (status = 200, description = "PDF do certificado (application/pdf)"),
        (status = 404, description = "Cliente ou documento não encontrado")
    ),
    security(("api_jwt" = []))
)]
pub async fn download_customer_gst(
    State(app_state): State<AppState>,
    locale: Locale,
    _guard: RequireRole<StaffOnly>,
    Path(id): Path<Uuid>,
) -> Result<Response, ApiError> {
    let bytes = app_state
        .customer_service
        .download_gst_certificate(id)
        .await
        .map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;

    Ok(pdf_response(bytes, &format!("gst_customer_{id}.pdf")))
}
