// src/models/party.rs
//
// Campos cadastrais comuns a fornecedores, clientes e sites.

use serde::Deserialize;
use utoipa::ToSchema;
use validator::Validate;

use crate::common::validation::validate_gst_no;

#[derive(Debug, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CreatePartyPayload {
    #[validate(length(min = 1, max = 200, message = "name_required"))]
    #[schema(example = "Apollo Hospitals")]
    pub name: String,
    #[validate(custom(function = "validate_gst_no"))]
    #[schema(example = "33AAACA1234B1Z2")]
    pub gst_no: Option<String>,
    #[serde(flatten)]
    #[validate(nested)]
    pub contact: ContactFields,
}

#[derive(Debug, Default, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UpdatePartyPayload {
    #[validate(length(min = 1, max = 200, message = "name_required"))]
    pub name: Option<String>,
    #[validate(custom(function = "validate_gst_no"))]
    pub gst_no: Option<String>,
    #[serde(flatten)]
    #[validate(nested)]
    pub contact: ContactFields,
}

// Endereço + contato. Tudo opcional; no update, ausente = mantém.
#[derive(Debug, Default, Clone, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ContactFields {
    pub address: Option<String>,
    pub city: Option<String>,
    pub state: Option<String>,
    #[validate(length(equal = 6, message = "invalid_pincode"))]
    #[schema(example = "600006")]
    pub pincode: Option<String>,
    pub contact_person: Option<String>,
    #[validate(email(message = "invalid_email"))]
    pub email: Option<String>,
    #[validate(length(min = 6, max = 20, message = "invalid_phone"))]
    pub phone: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn contact_fields_are_read_from_the_top_level() {
        let payload: CreatePartyPayload = serde_json::from_value(json!({
            "name": "Apollo",
            "gstNo": "33AAACA1234B1Z2",
            "city": "Chennai",
            "contactPerson": "Priya"
        }))
        .unwrap();

        assert_eq!(payload.contact.city.as_deref(), Some("Chennai"));
        assert_eq!(payload.contact.contact_person.as_deref(), Some("Priya"));
        assert!(payload.validate().is_ok());
    }

    #[test]
    fn rejects_bad_gst_and_email() {
        let payload: CreatePartyPayload = serde_json::from_value(json!({
            "name": "Apollo",
            "gstNo": "123",
            "email": "not-an-email"
        }))
        .unwrap();

        let errors = payload.validate().unwrap_err();
        assert!(errors.field_errors().contains_key("gst_no"));
        // email fica dentro do bloco de contato
        assert!(errors.errors().contains_key("contact"));
    }
}
