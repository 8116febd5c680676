// src/models/contract.rs

use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::{IntoParams, ToSchema};
use uuid::Uuid;
use validator::{Validate, ValidationError};

use crate::{common::validation::validate_not_negative, models::inventory::StockItem};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type, ToSchema)]
#[sqlx(type_name = "contract_type", rename_all = "SCREAMING_SNAKE_CASE")]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ContractType {
    Amc,      // Annual Maintenance Contract
    Camc,     // Comprehensive AMC (inclui peças)
    Warranty, // Garantia estendida
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ServiceContract {
    pub id: Uuid,
    #[schema(example = "ENPL-SC-0125-00001")]
    pub contract_no: String,
    pub customer_id: Uuid,
    pub site_id: Option<Uuid>,
    pub contract_type: ContractType,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    #[schema(example = "45000.00")]
    pub contract_value: Decimal,
    #[schema(example = 3)]
    pub visit_frequency_months: Option<i32>,
    pub notes: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl ServiceContract {
    /// Vigente na data (início e fim inclusivos).
    pub fn is_active_on(&self, date: NaiveDate) -> bool {
        self.start_date <= date && date <= self.end_date
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ContractInventory {
    pub id: Uuid,
    pub contract_id: Uuid,
    pub product_inventory_id: Uuid,
    pub created_at: DateTime<Utc>,
}

// Contrato + seriais cobertos
#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ServiceContractDetail {
    #[serde(flatten)]
    pub header: ServiceContract,
    pub is_active: bool,
    pub items: Vec<StockItem>,
}

fn check_period(start: NaiveDate, end: NaiveDate) -> Result<(), ValidationError> {
    if end < start {
        let mut err = ValidationError::new("period");
        err.message = Some("end_before_start".into());
        return Err(err);
    }
    Ok(())
}

fn validate_create_period(p: &CreateContractPayload) -> Result<(), ValidationError> {
    check_period(p.start_date, p.end_date)
}

// No update só dá para checar quando as duas datas vêm juntas; o resto o banco barra
fn validate_update_period(p: &UpdateContractPayload) -> Result<(), ValidationError> {
    match (p.start_date, p.end_date) {
        (Some(start), Some(end)) => check_period(start, end),
        _ => Ok(()),
    }
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
#[validate(schema(function = "validate_create_period"))]
pub struct CreateContractPayload {
    pub customer_id: Uuid,
    pub site_id: Option<Uuid>,
    pub contract_type: ContractType,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    #[validate(custom(function = "validate_not_negative"))]
    #[serde(default)]
    pub contract_value: Decimal,
    #[validate(range(min = 1, max = 12, message = "invalid_visit_frequency"))]
    pub visit_frequency_months: Option<i32>,
    pub notes: Option<String>,
    // Seriais cobertos pelo contrato
    #[serde(default)]
    pub serial_numbers: Vec<String>,
}

#[derive(Debug, Default, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
#[validate(schema(function = "validate_update_period"))]
pub struct UpdateContractPayload {
    pub site_id: Option<Uuid>,
    pub contract_type: Option<ContractType>,
    pub start_date: Option<NaiveDate>,
    pub end_date: Option<NaiveDate>,
    #[validate(custom(function = "validate_not_negative"))]
    pub contract_value: Option<Decimal>,
    #[validate(range(min = 1, max = 12, message = "invalid_visit_frequency"))]
    pub visit_frequency_months: Option<i32>,
    pub notes: Option<String>,
    // Quando presente, substitui a lista de seriais cobertos
    pub serial_numbers: Option<Vec<String>>,
}

#[derive(Debug, Default, Deserialize, IntoParams)]
#[serde(rename_all = "camelCase")]
#[into_params(parameter_in = Query)]
pub struct ContractQuery {
    pub customer_id: Option<Uuid>,
    // true = só os vigentes hoje
    pub active: Option<bool>,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn contract(start: NaiveDate, end: NaiveDate) -> ServiceContract {
        ServiceContract {
            id: Uuid::new_v4(),
            contract_no: "ENPL-SC-0125-00001".into(),
            customer_id: Uuid::new_v4(),
            site_id: None,
            contract_type: ContractType::Amc,
            start_date: start,
            end_date: end,
            contract_value: Decimal::ZERO,
            visit_frequency_months: None,
            notes: None,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    #[test]
    fn active_period_is_inclusive() {
        let start = NaiveDate::from_ymd_opt(2025, 1, 1).unwrap();
        let end = NaiveDate::from_ymd_opt(2025, 12, 31).unwrap();
        let c = contract(start, end);

        assert!(c.is_active_on(start));
        assert!(c.is_active_on(end));
        assert!(!c.is_active_on(end.succ_opt().unwrap()));
        assert!(!c.is_active_on(start.pred_opt().unwrap()));
    }

    #[test]
    fn rejects_contract_ending_before_it_starts() {
        let payload = CreateContractPayload {
            customer_id: Uuid::new_v4(),
            site_id: None,
            contract_type: ContractType::Camc,
            start_date: NaiveDate::from_ymd_opt(2025, 6, 1).unwrap(),
            end_date: NaiveDate::from_ymd_opt(2025, 5, 31).unwrap(),
            contract_value: Decimal::new(1000, 0),
            visit_frequency_months: Some(3),
            notes: None,
            serial_numbers: vec![],
        };
        assert!(payload.validate().is_err());

        let same_day = CreateContractPayload {
            end_date: payload.start_date,
            ..payload
        };
        assert!(same_day.validate().is_ok());
    }

    #[test]
    fn partial_update_skips_period_check() {
        let payload = UpdateContractPayload {
            end_date: NaiveDate::from_ymd_opt(2020, 1, 1),
            ..Default::default()
        };
        assert!(payload.validate().is_ok());
    }
}
