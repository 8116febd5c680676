// src/models/catalog.rs

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::{IntoParams, ToSchema};
use uuid::Uuid;
use validator::Validate;

use crate::common::validation::validate_not_negative;

// --- 1. Categorias ---
#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Category {
    pub id: Uuid,
    #[schema(example = "Networking")]
    pub name: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

// --- 2. Subcategorias (sempre filhas de uma categoria) ---
#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct SubCategory {
    pub id: Uuid,
    pub category_id: Uuid,
    #[schema(example = "Switches")]
    pub name: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

// --- 3. Produtos (catálogo, sem estoque) ---
#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Product {
    pub id: Uuid,
    #[schema(example = "C9200L-24T-4G-E")]
    pub part_number: String,
    #[schema(example = "Catalyst 9200L 24-port")]
    pub name: String,
    pub category_id: Uuid,
    pub sub_category_id: Option<Uuid>,
    #[schema(example = "Cisco")]
    pub make: Option<String>,
    pub model: Option<String>,
    #[schema(example = "85176990")]
    pub hsn_code: Option<String>,
    #[schema(example = "NOS")]
    pub unit: String,
    #[schema(example = "18.00")]
    pub gst_rate: Decimal,
    pub description: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

// ---
// Payloads
// ---

// Serve para categoria e subcategoria (só o nome muda)
#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct NamePayload {
    #[validate(length(min = 1, max = 120, message = "name_required"))]
    #[schema(example = "Networking")]
    pub name: String,
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CreateProductPayload {
    #[validate(length(min = 1, max = 80, message = "part_number_required"))]
    pub part_number: String,
    #[validate(length(min = 1, message = "name_required"))]
    pub name: String,
    pub category_id: Uuid,
    pub sub_category_id: Option<Uuid>,
    pub make: Option<String>,
    pub model: Option<String>,
    pub hsn_code: Option<String>,
    // Padrão "NOS" (numbers)
    pub unit: Option<String>,
    #[validate(custom(function = "validate_not_negative"))]
    pub gst_rate: Option<Decimal>,
    pub description: Option<String>,
}

#[derive(Debug, Default, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UpdateProductPayload {
    #[validate(length(min = 1, max = 80, message = "part_number_required"))]
    pub part_number: Option<String>,
    #[validate(length(min = 1, message = "name_required"))]
    pub name: Option<String>,
    pub category_id: Option<Uuid>,
    pub sub_category_id: Option<Uuid>,
    pub make: Option<String>,
    pub model: Option<String>,
    pub hsn_code: Option<String>,
    pub unit: Option<String>,
    #[validate(custom(function = "validate_not_negative"))]
    pub gst_rate: Option<Decimal>,
    pub description: Option<String>,
}

#[derive(Debug, Default, Deserialize, IntoParams)]
#[serde(rename_all = "camelCase")]
#[into_params(parameter_in = Query)]
pub struct ProductQuery {
    pub category_id: Option<Uuid>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn product_payload_rejects_negative_gst_rate() {
        let payload = CreateProductPayload {
            part_number: "C9200L-24T-4G-E".into(),
            name: "Catalyst".into(),
            category_id: Uuid::new_v4(),
            sub_category_id: None,
            make: None,
            model: None,
            hsn_code: None,
            unit: None,
            gst_rate: Some(Decimal::new(-18, 0)),
            description: None,
        };
        let errors = payload.validate().unwrap_err();
        assert!(errors.field_errors().contains_key("gst_rate"));
    }

    #[test]
    fn empty_update_is_valid() {
        assert!(UpdateProductPayload::default().validate().is_ok());
    }
}
