// src/models/vendor.rs

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::ToSchema;
use uuid::Uuid;

#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Vendor {
    pub id: Uuid,
    #[schema(example = "ENPL-VEN-0125-00001")]
    pub vendor_code: String,
    #[schema(example = "Redington India Ltd")]
    pub name: String,
    #[schema(example = "33AABCR1234F1Z5")]
    pub gst_no: Option<String>,
    // Caminho relativo do PDF; o download é feito via /api/vendors/{id}/gst-certificate
    pub gst_certificate_path: Option<String>,
    pub address: Option<String>,
    pub city: Option<String>,
    pub state: Option<String>,
    pub pincode: Option<String>,
    pub contact_person: Option<String>,
    pub email: Option<String>,
    pub phone: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}
