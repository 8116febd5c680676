// src/models/payment.rs

use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::{IntoParams, ToSchema};
use uuid::Uuid;
use validator::Validate;

use crate::{common::validation::validate_positive, models::inventory::PaymentStatus};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type, ToSchema)]
#[sqlx(type_name = "payment_mode", rename_all = "SCREAMING_SNAKE_CASE")]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum PaymentMode {
    Cash,
    Cheque,
    Neft,
    Rtgs,
    Upi,
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct VendorPayment {
    pub id: Uuid,
    pub vendor_id: Uuid,
    // Nota de compra (inventory) que está sendo paga
    pub inventory_id: Uuid,
    pub payment_date: NaiveDate,
    #[schema(example = "50000.00")]
    pub amount_paid: Decimal,
    pub payment_mode: PaymentMode,
    #[schema(example = "UTR0042211")]
    pub reference_no: Option<String>,
    pub remarks: Option<String>,
    // Saldo da nota logo depois deste pagamento
    #[schema(example = "68000.00")]
    pub due_amount: Decimal,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Saldo da nota depois de somar todos os pagamentos.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Reconciliation {
    pub due_amount: Decimal,
    pub payment_status: PaymentStatus,
}

/// `None` quando o total pago passa do valor bruto.
pub fn reconcile(gross: Decimal, total_paid: Decimal) -> Option<Reconciliation> {
    let due_amount = gross - total_paid;
    if due_amount < Decimal::ZERO {
        return None;
    }
    Some(Reconciliation {
        due_amount,
        payment_status: PaymentStatus::from_amounts(gross, due_amount),
    })
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CreatePaymentPayload {
    pub vendor_id: Uuid,
    pub inventory_id: Uuid,
    pub payment_date: NaiveDate,
    #[validate(custom(function = "validate_positive"))]
    pub amount_paid: Decimal,
    pub payment_mode: PaymentMode,
    pub reference_no: Option<String>,
    pub remarks: Option<String>,
}

// Fornecedor e nota não mudam; para isso exclua e lance de novo
#[derive(Debug, Default, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UpdatePaymentPayload {
    pub payment_date: Option<NaiveDate>,
    #[validate(custom(function = "validate_positive"))]
    pub amount_paid: Option<Decimal>,
    pub payment_mode: Option<PaymentMode>,
    pub reference_no: Option<String>,
    pub remarks: Option<String>,
}

#[derive(Debug, Default, Deserialize, IntoParams)]
#[serde(rename_all = "camelCase")]
#[into_params(parameter_in = Query)]
pub struct PaymentQuery {
    pub vendor_id: Option<Uuid>,
    pub inventory_id: Option<Uuid>,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn money(cents: i64) -> Decimal {
        Decimal::new(cents, 2)
    }

    #[test]
    fn due_is_gross_minus_paid() {
        let r = reconcile(money(100_000), money(25_050)).unwrap();
        assert_eq!(r.due_amount, money(74_950));
        assert_eq!(r.payment_status, PaymentStatus::Partial);
    }

    #[test]
    fn nothing_paid_is_unpaid_and_exact_payment_is_paid() {
        assert_eq!(reconcile(money(500), Decimal::ZERO).unwrap().payment_status, PaymentStatus::Unpaid);

        let paid = reconcile(money(500), money(500)).unwrap();
        assert_eq!(paid.due_amount, Decimal::ZERO);
        assert_eq!(paid.payment_status, PaymentStatus::Paid);
    }

    #[test]
    fn overpayment_is_rejected() {
        assert_eq!(reconcile(money(500), money(501)), None);
    }

    #[test]
    fn amount_must_be_positive() {
        let payload = CreatePaymentPayload {
            vendor_id: Uuid::new_v4(),
            inventory_id: Uuid::new_v4(),
            payment_date: NaiveDate::from_ymd_opt(2025, 2, 1).unwrap(),
            amount_paid: Decimal::ZERO,
            payment_mode: PaymentMode::Neft,
            reference_no: None,
            remarks: None,
        };
        assert!(payload.validate().is_err());
    }
}
