// src/models/inventory.rs

use chrono::{DateTime, Days, NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::{IntoParams, ToSchema};
use uuid::Uuid;
use validator::Validate;

use crate::common::validation::{validate_not_blank, validate_not_negative};

// --- Status de cada serial no estoque ---
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type, ToSchema)]
#[sqlx(type_name = "inventory_status", rename_all = "SCREAMING_SNAKE_CASE")] // Banco
#[serde(rename_all = "SCREAMING_SNAKE_CASE")] // JSON
pub enum InventoryStatus {
    InStock,          // Vira "IN_STOCK"
    Sold,             // Vira "SOLD"
    OnDemo,
    Rented,
    Replaced,
    InService,
    ReturnedToVendor, // Vira "RETURNED_TO_VENDOR"
}

impl InventoryStatus {
    pub fn as_str(self) -> &'static str {
        match self {
            InventoryStatus::InStock => "IN_STOCK",
            InventoryStatus::Sold => "SOLD",
            InventoryStatus::OnDemo => "ON_DEMO",
            InventoryStatus::Rented => "RENTED",
            InventoryStatus::Replaced => "REPLACED",
            InventoryStatus::InService => "IN_SERVICE",
            InventoryStatus::ReturnedToVendor => "RETURNED_TO_VENDOR",
        }
    }
}

// --- Situação de pagamento da nota de compra ---
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type, ToSchema)]
#[sqlx(type_name = "payment_status", rename_all = "SCREAMING_SNAKE_CASE")]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum PaymentStatus {
    Unpaid,
    Partial,
    Paid,
}

impl PaymentStatus {
    /// Deriva a situação a partir do valor bruto e do saldo devedor.
    pub fn from_amounts(gross: Decimal, due: Decimal) -> Self {
        if due <= Decimal::ZERO {
            PaymentStatus::Paid
        } else if due >= gross {
            PaymentStatus::Unpaid
        } else {
            PaymentStatus::Partial
        }
    }
}

/// Vencimento = data da compra + prazo em dias.
pub fn due_date_for(purchase_date: NaiveDate, credit_terms_days: i32) -> NaiveDate {
    let days = Days::new(credit_terms_days.max(0) as u64);
    purchase_date.checked_add_days(days).unwrap_or(NaiveDate::MAX)
}

// --- Nota de compra (cabeçalho) ---
#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Inventory {
    pub id: Uuid,
    pub vendor_id: Uuid,
    #[schema(example = "RIL/24-25/01873")]
    pub purchase_invoice_no: String,
    pub purchase_date: NaiveDate,
    #[schema(example = 30)]
    pub credit_terms_days: i32,
    // purchase_date + credit_terms_days
    pub due_date: NaiveDate,
    #[schema(example = "118000.00")]
    pub invoice_gross_amount: Decimal,
    // Recalculado a cada pagamento
    #[schema(example = "18000.00")]
    pub due_amount: Decimal,
    pub payment_status: PaymentStatus,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

// --- Linha da nota: um serial de um produto ---
#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ProductInventory {
    pub id: Uuid,
    pub inventory_id: Uuid,
    pub product_id: Uuid,
    #[schema(example = "FOC2422X0AB")]
    pub serial_number: String,
    pub mac_address: Option<String>,
    #[schema(example = "50000.00")]
    pub purchase_rate: Decimal,
    #[schema(example = 12)]
    pub warranty_months: i32,
    pub status: InventoryStatus,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

// Serial + dados do produto e da nota (listagens e busca por serial)
#[derive(Debug, Clone, Serialize, FromRow, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct StockItem {
    #[serde(flatten)]
    #[sqlx(flatten)]
    pub item: ProductInventory,
    pub part_number: String,
    pub product_name: String,
    pub vendor_id: Uuid,
    pub purchase_invoice_no: String,
}

// Nota completa: cabeçalho + linhas
#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct InventoryDetail {
    #[serde(flatten)]
    pub header: Inventory,
    pub items: Vec<ProductInventory>,
}

// ---
// Payloads
// ---

#[derive(Debug, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct InventoryLinePayload {
    pub product_id: Uuid,
    #[validate(length(min = 1, max = 100, message = "serial_required"), custom(function = "validate_not_blank"))]
    pub serial_number: String,
    pub mac_address: Option<String>,
    #[validate(custom(function = "validate_not_negative"))]
    pub purchase_rate: Decimal,
    #[validate(range(min = 0, max = 240, message = "invalid_warranty"))]
    #[serde(default)]
    pub warranty_months: i32,
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CreateInventoryPayload {
    pub vendor_id: Uuid,
    #[validate(length(min = 1, max = 100, message = "invoice_no_required"), custom(function = "validate_not_blank"))]
    pub purchase_invoice_no: String,
    pub purchase_date: NaiveDate,
    #[validate(range(min = 0, max = 365, message = "invalid_credit_terms"))]
    #[serde(default)]
    pub credit_terms_days: i32,
    #[validate(custom(function = "validate_not_negative"))]
    pub invoice_gross_amount: Decimal,
    #[validate(nested)]
    #[serde(default)]
    pub items: Vec<InventoryLinePayload>,
}

// Cabeçalho parcial + linhas novas (as existentes não são editadas aqui)
#[derive(Debug, Default, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UpdateInventoryPayload {
    #[validate(length(min = 1, max = 100, message = "invoice_no_required"), custom(function = "validate_not_blank"))]
    pub purchase_invoice_no: Option<String>,
    pub purchase_date: Option<NaiveDate>,
    #[validate(range(min = 0, max = 365, message = "invalid_credit_terms"))]
    pub credit_terms_days: Option<i32>,
    #[validate(custom(function = "validate_not_negative"))]
    pub invoice_gross_amount: Option<Decimal>,
    #[validate(nested)]
    #[serde(default)]
    pub new_items: Vec<InventoryLinePayload>,
}

#[derive(Debug, Default, Deserialize, IntoParams)]
#[serde(rename_all = "camelCase")]
#[into_params(parameter_in = Query)]
pub struct InventoryQuery {
    pub vendor_id: Option<Uuid>,
    pub payment_status: Option<PaymentStatus>,
}

#[derive(Debug, Default, Deserialize, IntoParams)]
#[serde(rename_all = "camelCase")]
#[into_params(parameter_in = Query)]
pub struct StockQuery {
    pub status: Option<InventoryStatus>,
    pub product_id: Option<Uuid>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn due_date_adds_the_credit_terms() {
        let purchase = NaiveDate::from_ymd_opt(2025, 1, 20).unwrap();
        assert_eq!(due_date_for(purchase, 30), NaiveDate::from_ymd_opt(2025, 2, 19).unwrap());
        assert_eq!(due_date_for(purchase, 0), purchase);
    }

    #[test]
    fn invoice_lines_are_validated() {
        let payload: CreateInventoryPayload = serde_json::from_value(serde_json::json!({
            "vendorId": Uuid::new_v4(),
            "purchaseInvoiceNo": "INV-1",
            "purchaseDate": "2025-01-20",
            "invoiceGrossAmount": 1000.0,
            "items": [{ "productId": Uuid::new_v4(), "serialNumber": "", "purchaseRate": 10.0 }]
        }))
        .unwrap();

        assert_eq!(payload.credit_terms_days, 0);
        assert!(payload.validate().is_err());
    }

    #[test]
    fn blank_invoice_number_is_rejected() {
        let payload: CreateInventoryPayload = serde_json::from_value(serde_json::json!({
            "vendorId": Uuid::new_v4(),
            "purchaseInvoiceNo": "   ",
            "purchaseDate": "2025-01-20",
            "invoiceGrossAmount": 1000.0,
            "items": [{ "productId": Uuid::new_v4(), "serialNumber": "SN-1", "purchaseRate": 10.0 }]
        }))
        .unwrap();

        let errors = payload.validate().unwrap_err();
        assert!(errors.field_errors().contains_key("purchase_invoice_no"));
    }

    #[test]
    fn payment_status_follows_the_due_amount() {
        let gross = Decimal::new(1000, 0);
        assert_eq!(PaymentStatus::from_amounts(gross, gross), PaymentStatus::Unpaid);
        assert_eq!(PaymentStatus::from_amounts(gross, Decimal::new(1, 0)), PaymentStatus::Partial);
        assert_eq!(PaymentStatus::from_amounts(gross, Decimal::ZERO), PaymentStatus::Paid);
    }

    #[test]
    fn zero_value_invoice_is_paid() {
        assert_eq!(PaymentStatus::from_amounts(Decimal::ZERO, Decimal::ZERO), PaymentStatus::Paid);
    }

    #[test]
    fn status_serializes_in_screaming_case() {
        let json = serde_json::to_string(&InventoryStatus::ReturnedToVendor).unwrap();
        assert_eq!(json, "\"RETURNED_TO_VENDOR\"");
        assert_eq!(InventoryStatus::ReturnedToVendor.as_str(), "RETURNED_TO_VENDOR");
    }
}
