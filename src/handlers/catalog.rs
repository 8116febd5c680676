// src/handlers/catalog.rs

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
    models::catalog::{
        Category, CreateProductPayload, NamePayload, Product, ProductQuery, SubCategory, UpdateProductPayload,
    },
};

// ---
// CATEGORIAS
// ---

#[utoipa::path(
    get,
    path = "/api/categories",
    tag = "Catalog",
    responses((status = 200, description = "Categorias", body = Vec<Category>)),
    security(("api_jwt" = []))
)]
pub async fn list_categories(
    State(app_state): State<AppState>,
    locale: Locale,
    _guard: RequireRole<StaffOnly>,
) -> Result<impl IntoResponse, ApiError> {
    let categories = app_state
        .catalog_service
        .list_categories()
        .await
        .map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;

    Ok((StatusCode::OK, Json(categories)))
}

#[utoipa::path(
    get,
    path = "/api/categories/{id}",
    tag = "Catalog",
    params(("id" = Uuid, Path, description = "ID da categoria")),
    responses(
        (status = 200, description = "Categoria", body = Category),
        (status = 404, description = "Categoria não encontrada")
    ),
    security(("api_jwt" = []))
)]
pub async fn get_category(
    State(app_state): State<AppState>,
    locale: Locale,
    _guard: RequireRole<StaffOnly>,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, ApiError> {
    let category = app_state
        .catalog_service
        .get_category(id)
        .await
        .map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;

    Ok((StatusCode::OK, Json(category)))
}

#[utoipa::path(
    post,
    path = "/api/categories",
    tag = "Catalog",
    request_body = NamePayload,
    responses(
        (status = 201, description = "Categoria criada", body = Category),
        (status = 409, description = "Nome já existe")
    ),
    security(("api_jwt" = []))
)]
pub async fn create_category(
    State(app_state): State<AppState>,
    locale: Locale,
    _guard: RequireRole<StaffOnly>,
    Json(payload): Json<NamePayload>,
) -> Result<impl IntoResponse, ApiError> {
    payload
        .validate()
        .map_err(|e| AppError::ValidationError(e).to_api_error(&locale, &app_state.i18n_store))?;

    let category = app_state
        .catalog_service
        .create_category(payload.name.trim())
        .await
        .map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;

    Ok((StatusCode::CREATED, Json(category)))
}

#[utoipa::path(
    put,
    path = "/api/categories/{id}",
    tag = "Catalog",
    request_body = NamePayload,
    params(("id" = Uuid, Path, description = "ID da categoria")),
    responses(
        (status = 200, description = "Categoria atualizada", body = Category),
        (status = 404, description = "Categoria não encontrada")
    ),
    security(("api_jwt" = []))
)]
pub async fn update_category(
    State(app_state): State<AppState>,
    locale: Locale,
    _guard: RequireRole<StaffOnly>,
    Path(id): Path<Uuid>,
    Json(payload): Json<NamePayload>,
) -> Result<impl IntoResponse, ApiError> {
    payload
        .validate()
        .map_err(|e| AppError::ValidationError(e).to_api_error(&locale, &app_state.i18n_store))?;

    let category = app_state
        .catalog_service
        .update_category(id, payload.name.trim())
        .await
        .map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;

    Ok((StatusCode::OK, Json(category)))
}

#[utoipa::path(
    delete,
    path = "/api/categories/{id}",
    tag = "Catalog",
    params(("id" = Uuid, Path, description = "ID da categoria")),
    responses(
        (status = 204, description = "Categoria e subcategorias excluídas"),
        (status = 409, description = "Categoria com produtos")
    ),
    security(("api_jwt" = []))
)]
pub async fn delete_category(
    State(app_state): State<AppState>,
    locale: Locale,
    _guard: RequireRole<StaffOnly>,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, ApiError> {
    app_state
        .catalog_service
        .delete_category(id)
        .await
        .map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;

    Ok(StatusCode::NO_CONTENT)
}

// ---
// SUBCATEGORIAS
// ---

#[utoipa::path(
    get,
    path = "/api/categories/{id}/subcategories",
    tag = "Catalog",
    params(("id" = Uuid, Path, description = "ID da categoria")),
    responses((status = 200, description = "Subcategorias da categoria", body = Vec<SubCategory>)),
    security(("api_jwt" = []))
)]
pub async fn list_sub_categories(
    State(app_state): State<AppState>,
    locale: Locale,
    _guard: RequireRole<StaffOnly>,
    Path(category_id): Path<Uuid>,
) -> Result<impl IntoResponse, ApiError> {
    let sub_categories = app_state
        .catalog_service
        .list_sub_categories(category_id)
        .await
        .map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;

    Ok((StatusCode::OK, Json(sub_categories)))
}

#[utoipa::path(
    post,
    path = "/api/categories/{id}/subcategories",
    tag = "Catalog",
    request_body = NamePayload,
    params(("id" = Uuid, Path, description = "ID da categoria")),
    responses(
        (status = 201, description = "Subcategoria criada", body = SubCategory),
        (status = 404, description = "Categoria não encontrada")
    ),
    security(("api_jwt" = []))
)]
pub async fn create_sub_category(
    State(app_state): State<AppState>,
    locale: Locale,
    _guard: RequireRole<StaffOnly>,
    Path(category_id): Path<Uuid>,
    Json(payload): Json<NamePayload>,
) -> Result<impl IntoResponse, ApiError> {
    payload
        .validate()
        .map_err(|e| AppError::ValidationError(e).to_api_error(&locale, &app_state.i18n_store))?;

    let sub_category = app_state
        .catalog_service
        .create_sub_category(category_id, payload.name.trim())
        .await
        .map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;

    Ok((StatusCode::CREATED, Json(sub_category)))
}

#[utoipa::path(
    put,
    path = "/api/subcategories/{id}",
    tag = "Catalog",
    request_body = NamePayload,
    params(("id" = Uuid, Path, description = "ID da subcategoria")),
    responses(
        (status = 200, description = "Subcategoria atualizada", body = SubCategory),
        (status = 404, description = "Subcategoria não encontrada")
    ),
    security(("api_jwt" = []))
)]
pub async fn update_sub_category(
    State(app_state): State<AppState>,
    locale: Locale,
    _guard: RequireRole<StaffOnly>,
    Path(id): Path<Uuid>,
    Json(payload): Json<NamePayload>,
) -> Result<impl IntoResponse, ApiError> {
    payload
        .validate()
        .map_err(|e| AppError::ValidationError(e).to_api_error(&locale, &app_state.i18n_store))?;

    let sub_category = app_state
        .catalog_service
        .update_sub_category(id, payload.name.trim())
        .await
        .map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;

    Ok((StatusCode::OK, Json(sub_category)))
}

#[utoipa::path(
    delete,
    path = "/api/subcategories/{id}",
    tag = "Catalog",
    params(("id" = Uuid, Path, description = "ID da subcategoria")),
    responses(
        (status = 204, description = "Subcategoria excluída"),
        (status = 409, description = "Subcategoria em uso")
    ),
    security(("api_jwt" = []))
)]
pub async fn delete_sub_category(
    State(app_state): State<AppState>,
    locale: Locale,
    _guard: RequireRole<StaffOnly>,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, ApiError> {
    app_state
        .catalog_service
        .delete_sub_category(id)
        .await
        .map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;

    Ok(StatusCode::NO_CONTENT)
}

// ---
// PRODUTOS
// ---

#[utoipa::path(
    get,
    path = "/api/products",
    tag = "Catalog",
    params(ProductQuery),
    responses((status = 200, description = "Produtos", body = Vec<Product>)),
    security(("api_jwt" = []))
)]
pub async fn list_products(
    State(app_state): State<AppState>,
    locale: Locale,
    _guard: RequireRole<StaffOnly>,
    Query(query): Query<ProductQuery>,
) -> Result<impl IntoResponse, ApiError> {
    let products = app_state
        .catalog_service
        .list_products(query.category_id)
        .await
        .map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;

    Ok((StatusCode::OK, Json(products)))
}

#[utoipa::path(
    get,
    path = "/api/products/{id}",
    tag = "Catalog",
    params(("id" = Uuid, Path, description = "ID do produto")),
    responses(
        (status = 200, description = "Produto", body = Product),
        (status = 404, description = "Produto não encontrado")
    ),
    security(("api_jwt" = []))
)]
pub async fn get_product(
    State(app_state): State<AppState>,
    locale: Locale,
    _guard: RequireRole<StaffOnly>,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, ApiError> {
    let product = app_state
        .catalog_service
        .get_product(id)
        .await
        .map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;

    Ok((StatusCode::OK, Json(product)))
}

#[utoipa::path(
    post,
    path = "/api/products",
    tag = "Catalog",
    request_body = CreateProductPayload,
    responses(
        (status = 201, description = "Produto criado", body = Product),
        (status = 400, description = "Subcategoria de outra categoria"),
        (status = 409, description = "Part number já existe")
    ),
    security(("api_jwt" = []))
)]
pub async fn create_product(
    State(app_state): State<AppState>,
    locale: Locale,
    _guard: RequireRole<StaffOnly>,
    Json(payload): Json<CreateProductPayload>,
) -> Result<impl IntoResponse, ApiError> {
    payload
        .validate()
        .map_err(|e| AppError::ValidationError(e).to_api_error(&locale, &app_state.i18n_store))?;

    let product = app_state
        .catalog_service
        .create_product(&payload)
        .await
        .map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;

    Ok((StatusCode::CREATED, Json(product)))
}

#[utoipa::path(
    put,
    path = "/api/products/{id}",
    tag = "Catalog",
    request_body = UpdateProductPayload,
    params(("id" = Uuid, Path, description = "ID do produto")),
    responses(
        (status = 200, description = "Produto atualizado", body = Product),
        (status = 404, description = "Produto não encontrado")
    ),
    security(("api_jwt" = []))
)]
pub async fn update_product(
    State(app_state): State<AppState>,
    locale: Locale,
    _guard: RequireRole<StaffOnly>,
    Path(id): Path<Uuid>,
    Json(payload): Json<UpdateProductPayload>,
) -> Result<impl IntoResponse, ApiError> {
    payload
        .validate()
        .map_err(|e| AppError::ValidationError(e).to_api_error(&locale, &app_state.i18n_store))?;

    let product = app_state
        .catalog_service
        .update_product(id, &payload)
        .await
        .map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;

    Ok((StatusCode::OK, Json(product)))
}

#[utoipa::path(
    delete,
    path = "/api/products/{id}",
    tag = "Catalog",
    params(("id" = Uuid, Path, description = "ID do produto")),
    responses(
        (status = 204, description = "Produto excluído"),
        (status = 409, description = "Produto com seriais em estoque")
    ),
    security(("api_jwt" = []))
)]
pub async fn delete_product(
    State(app_state): State<AppState>,
    locale: Locale,
    _guard: RequireRole<StaffOnly>,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, ApiError> {
    app_state
        .catalog_service
        .delete_product(id)
        .await
        .map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;

    Ok(StatusCode::NO_CONTENT)
}
