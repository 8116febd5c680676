// src/models/customer.rs

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::{IntoParams, ToSchema};
use uuid::Uuid;
use validator::Validate;

use crate::models::party::ContactFields;

#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Customer {
    pub id: Uuid,
    #[schema(example = "ENPL-CUS-0125-00001")]
    pub customer_code: String,
    #[schema(example = "Apollo Hospitals")]
    pub name: String,
    #[schema(example = "33AAACA1234B1Z2")]
    pub gst_no: Option<String>,
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

// Local de instalação/atendimento de um cliente
#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Site {
    pub id: Uuid,
    #[schema(example = "ENPL-SITE-0125-00001")]
    pub site_code: String,
    pub customer_id: Uuid,
    #[schema(example = "Greams Road Campus")]
    pub name: String,
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

#[derive(Debug, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CreateSitePayload {
    pub customer_id: Uuid,
    #[validate(length(min = 1, max = 200, message = "name_required"))]
    pub name: String,
    #[serde(flatten)]
    #[validate(nested)]
    pub contact: ContactFields,
}

// O cliente dono do site não muda depois de criado
#[derive(Debug, Default, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UpdateSitePayload {
    #[validate(length(min = 1, max = 200, message = "name_required"))]
    pub name: Option<String>,
    #[serde(flatten)]
    #[validate(nested)]
    pub contact: ContactFields,
}

#[derive(Debug, Default, Deserialize, IntoParams)]
#[serde(rename_all = "camelCase")]
#[into_params(parameter_in = Query)]
pub struct SiteQuery {
    pub customer_id: Option<Uuid>,
}
