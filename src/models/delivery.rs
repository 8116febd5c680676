// src/models/delivery.rs

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::{IntoParams, ToSchema};
use uuid::Uuid;
use validator::Validate;

use crate::models::inventory::InventoryStatus;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type, ToSchema)]
#[sqlx(type_name = "delivery_type", rename_all = "SCREAMING_SNAKE_CASE")]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum DeliveryType {
    Sale,
    Demo,
    Rental,
    Replacement,
    Service,
    PurchaseReturn, // Devolução ao fornecedor
    StockReturn,    // Material voltando do cliente para o estoque
}

impl DeliveryType {
    pub const ALL: [DeliveryType; 7] = [
        DeliveryType::Sale,
        DeliveryType::Demo,
        DeliveryType::Rental,
        DeliveryType::Replacement,
        DeliveryType::Service,
        DeliveryType::PurchaseReturn,
        DeliveryType::StockReturn,
    ];

    /// Status que cada serial assume depois da entrega.
    pub fn resulting_status(self) -> InventoryStatus {
        match self {
            DeliveryType::Sale => InventoryStatus::Sold,
            DeliveryType::Demo => InventoryStatus::OnDemo,
            DeliveryType::Rental => InventoryStatus::Rented,
            DeliveryType::Replacement => InventoryStatus::Replaced,
            DeliveryType::Service => InventoryStatus::InService,
            DeliveryType::PurchaseReturn => InventoryStatus::ReturnedToVendor,
            DeliveryType::StockReturn => InventoryStatus::InStock,
        }
    }

    /// Só a devolução de compra vai para um fornecedor; o resto é para cliente.
    pub fn requires_vendor(self) -> bool {
        self == DeliveryType::PurchaseReturn
    }

    /// O serial pode sair neste tipo de entrega estando no status atual?
    pub fn accepts_source(self, current: InventoryStatus) -> bool {
        match self {
            DeliveryType::StockReturn => current != InventoryStatus::InStock,
            _ => current == InventoryStatus::InStock,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct MaterialDelivery {
    pub id: Uuid,
    #[schema(example = "ENPL-DC-0125-00001")]
    pub challan_no: String,
    pub delivery_type: DeliveryType,
    pub customer_id: Option<Uuid>,
    pub site_id: Option<Uuid>,
    pub vendor_id: Option<Uuid>,
    #[schema(example = "PO-4471")]
    pub reference_no: Option<String>,
    pub delivery_date: NaiveDate,
    pub notes: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct MaterialDeliveryItem {
    pub id: Uuid,
    pub delivery_id: Uuid,
    pub product_inventory_id: Uuid,
    // Status do serial antes da entrega (restaurado se a entrega for excluída)
    pub previous_status: InventoryStatus,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct MaterialDeliveryDetail {
    #[serde(flatten)]
    pub header: MaterialDelivery,
    pub items: Vec<MaterialDeliveryItem>,
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CreateDeliveryPayload {
    pub delivery_type: DeliveryType,
    pub customer_id: Option<Uuid>,
    pub site_id: Option<Uuid>,
    pub vendor_id: Option<Uuid>,
    pub reference_no: Option<String>,
    pub delivery_date: NaiveDate,
    pub notes: Option<String>,
    #[validate(length(min = 1, message = "items_required"))]
    #[schema(example = json!(["FOC2422X0AB", "FOC2422X0AC"]))]
    pub serial_numbers: Vec<String>,
}

// Só o cabeçalho; os itens de uma entrega não mudam (exclua e refaça)
#[derive(Debug, Default, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UpdateDeliveryPayload {
    pub reference_no: Option<String>,
    pub delivery_date: Option<NaiveDate>,
    pub notes: Option<String>,
}

#[derive(Debug, Default, Deserialize, IntoParams)]
#[serde(rename_all = "camelCase")]
#[into_params(parameter_in = Query)]
pub struct DeliveryQuery {
    pub delivery_type: Option<DeliveryType>,
    pub customer_id: Option<Uuid>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn maps_every_delivery_type_to_a_status() {
        let expected = [
            (DeliveryType::Sale, InventoryStatus::Sold),
            (DeliveryType::Demo, InventoryStatus::OnDemo),
            (DeliveryType::Rental, InventoryStatus::Rented),
            (DeliveryType::Replacement, InventoryStatus::Replaced),
            (DeliveryType::Service, InventoryStatus::InService),
            (DeliveryType::PurchaseReturn, InventoryStatus::ReturnedToVendor),
            (DeliveryType::StockReturn, InventoryStatus::InStock),
        ];
        for (kind, status) in expected {
            assert_eq!(kind.resulting_status(), status, "{kind:?}");
        }
    }

    #[test]
    fn outgoing_deliveries_need_stock() {
        for kind in DeliveryType::ALL.into_iter().filter(|k| *k != DeliveryType::StockReturn) {
            assert!(kind.accepts_source(InventoryStatus::InStock), "{kind:?}");
            assert!(!kind.accepts_source(InventoryStatus::Sold), "{kind:?}");
        }
    }

    #[test]
    fn stock_return_needs_material_outside() {
        assert!(DeliveryType::StockReturn.accepts_source(InventoryStatus::OnDemo));
        assert!(DeliveryType::StockReturn.accepts_source(InventoryStatus::InService));
        assert!(!DeliveryType::StockReturn.accepts_source(InventoryStatus::InStock));
    }

    #[test]
    fn only_purchase_return_goes_to_a_vendor() {
        let vendor_types: Vec<_> = DeliveryType::ALL.into_iter().filter(|k| k.requires_vendor()).collect();
        assert_eq!(vendor_types, vec![DeliveryType::PurchaseReturn]);
    }
}
