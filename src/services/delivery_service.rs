// src/services/delivery_service.rs

use std::collections::{HashMap, HashSet};

use chrono::Utc;
use sqlx::PgPool;
use uuid::Uuid;

use crate::{
    common::{
        codes::{CodeGenerator, CodeKind},
        error::AppError,
    },
    db::{CustomerRepository, DeliveryRepository, InventoryRepository},
    models::delivery::{
        CreateDeliveryPayload, DeliveryQuery, MaterialDelivery, MaterialDeliveryDetail, UpdateDeliveryPayload,
    },
    services::customer_service::ensure_site_of_customer,
};

#[derive(Clone)]
pub struct DeliveryService {
    delivery_repo: DeliveryRepository,
    inventory_repo: InventoryRepository,
    customer_repo: CustomerRepository,
    codes: CodeGenerator,
    pool: PgPool,
}

impl DeliveryService {
    pub fn new(
        delivery_repo: DeliveryRepository,
        inventory_repo: InventoryRepository,
        customer_repo: CustomerRepository,
        codes: CodeGenerator,
        pool: PgPool,
    ) -> Self {
        Self { delivery_repo, inventory_repo, customer_repo, codes, pool }
    }

    pub async fn list_deliveries(&self, query: &DeliveryQuery) -> Result<Vec<MaterialDelivery>, AppError> {
        self.delivery_repo
            .list_deliveries(query.delivery_type, query.customer_id)
            .await
    }

    pub async fn get_delivery(&self, id: Uuid) -> Result<MaterialDeliveryDetail, AppError> {
        let header = self
            .delivery_repo
            .find_delivery(&self.pool, id)
            .await?
            .ok_or(AppError::NotFound("delivery"))?;
        let items = self.delivery_repo.list_items(&self.pool, id).await?;
        Ok(MaterialDeliveryDetail { header, items })
    }

    /// Registra a entrega e move cada serial para o status do tipo de entrega.
    pub async fn create_delivery(&self, payload: &CreateDeliveryPayload) -> Result<MaterialDeliveryDetail, AppError> {
        check_counterparty(payload)?;
        let serials = normalize_serials(&payload.serial_numbers)?;

        let mut tx = self.pool.begin().await?;

        if let Some(customer_id) = payload.customer_id {
            ensure_site_of_customer(&self.customer_repo, &mut tx, payload.site_id, customer_id).await?;
        }

        // Trava os seriais antes de olhar o status: duas entregas do mesmo serial não passam juntas
        let locked = self.inventory_repo.lock_items_by_serials(&mut *tx, &serials).await?;
        let by_serial: HashMap<&str, _> = locked.iter().map(|i| (i.serial_number.as_str(), i)).collect();

        for serial in &serials {
            let item = by_serial
                .get(serial.as_str())
                .ok_or_else(|| AppError::SerialNotFound(serial.clone()))?;
            if !payload.delivery_type.accepts_source(item.status) {
                return Err(AppError::SerialUnavailable {
                    serial: serial.clone(),
                    status: item.status.as_str().to_string(),
                });
            }
        }

        let challan_no = self
            .codes
            .next_code(&mut tx, CodeKind::DeliveryChallan, Utc::now().date_naive())
            .await?;
        let header = self.delivery_repo.create_delivery(&mut *tx, &challan_no, payload).await?;

        let next_status = payload.delivery_type.resulting_status();
        let mut items = Vec::with_capacity(locked.len());
        for item in &locked {
            items.push(
                self.delivery_repo
                    .insert_item(&mut *tx, header.id, item.id, item.status)
                    .await?,
            );
            self.inventory_repo.set_item_status(&mut *tx, item.id, next_status).await?;
        }

        tx.commit().await?;
        tracing::info!(
            "🚚 Entrega {} ({:?}) registrada com {} serial(is)",
            header.challan_no,
            header.delivery_type,
            items.len()
        );
        Ok(MaterialDeliveryDetail { header, items })
    }

    pub async fn update_delivery(
        &self,
        id: Uuid,
        changes: &UpdateDeliveryPayload,
    ) -> Result<MaterialDelivery, AppError> {
        self.delivery_repo
            .update_delivery(&self.pool, id, changes)
            .await?
            .ok_or(AppError::NotFound("delivery"))
    }

    /// Desfaz a entrega: cada serial volta ao status que tinha antes dela.
    pub async fn delete_delivery(&self, id: Uuid) -> Result<(), AppError> {
        let mut tx = self.pool.begin().await?;

        let delivery = self
            .delivery_repo
            .find_delivery(&mut *tx, id)
            .await?
            .ok_or(AppError::NotFound("delivery"))?;
        let items = self.delivery_repo.list_items(&mut *tx, id).await?;

        let ids: Vec<Uuid> = items.iter().map(|i| i.product_inventory_id).collect();
        let current = self.inventory_repo.lock_items_by_ids(&mut *tx, &ids).await?;

        // Serial que passou por outra entrega depois desta não pode voltar atrás,
        // mesmo que o status atual coincida com o desta entrega (ex: SALE -> STOCK_RETURN -> SALE)
        if let Some(serial) = self.delivery_repo.find_redelivered_serial(&mut *tx, id).await? {
            return Err(AppError::DeliveryItemMoved(serial));
        }
        let delivered_status = delivery.delivery_type.resulting_status();
        if let Some(moved) = current.iter().find(|i| i.status != delivered_status) {
            return Err(AppError::DeliveryItemMoved(moved.serial_number.clone()));
        }

        for item in &items {
            self.inventory_repo
                .set_item_status(&mut *tx, item.product_inventory_id, item.previous_status)
                .await?;
        }
        self.delivery_repo.delete_items_of(&mut *tx, id).await?;
        self.delivery_repo.delete_delivery(&mut *tx, id).await?;

        tx.commit().await?;
        tracing::info!("Entrega {} excluída; {} serial(is) restaurado(s)", delivery.challan_no, items.len());
        Ok(())
    }
}

/// Devolução de compra vai para fornecedor; os outros tipos vão para cliente.
fn check_counterparty(payload: &CreateDeliveryPayload) -> Result<(), AppError> {
    if payload.delivery_type.requires_vendor() {
        if payload.vendor_id.is_none() {
            return Err(AppError::BusinessRule("delivery_vendor_required"));
        }
    } else if payload.customer_id.is_none() {
        return Err(AppError::BusinessRule("delivery_customer_required"));
    }
    Ok(())
}

/// Remove espaços e recusa serial repetido.
fn normalize_serials(serials: &[String]) -> Result<Vec<String>, AppError> {
    let mut seen = HashSet::with_capacity(serials.len());
    let mut out = Vec::with_capacity(serials.len());
    for serial in serials {
        let serial = serial.trim();
        if serial.is_empty() {
            continue;
        }
        if !seen.insert(serial) {
            return Err(AppError::BusinessRule("delivery_duplicate_item"));
        }
        out.push(serial.to_string());
    }
    if out.is_empty() {
        return Err(AppError::BusinessRule("delivery_items_required"));
    }
    Ok(out)
}

#[cfg(test)]
mod tests {
    use chrono::NaiveDate;
    use rust_decimal::Decimal;

    use super::*;
    use crate::{
        common::test_support::{seed_customer, seed_invoice, seed_serial, seed_vendor, serial_status},
        models::{delivery::DeliveryType, inventory::InventoryStatus},
    };

    fn payload(delivery_type: DeliveryType) -> CreateDeliveryPayload {
        CreateDeliveryPayload {
            delivery_type,
            customer_id: None,
            site_id: None,
            vendor_id: None,
            reference_no: None,
            delivery_date: NaiveDate::from_ymd_opt(2025, 3, 10).unwrap(),
            notes: None,
            serial_numbers: vec!["SN1".into()],
        }
    }

    #[test]
    fn purchase_return_requires_vendor() {
        let mut p = payload(DeliveryType::PurchaseReturn);
        p.customer_id = Some(Uuid::new_v4());
        assert!(matches!(
            check_counterparty(&p),
            Err(AppError::BusinessRule("delivery_vendor_required"))
        ));

        p.vendor_id = Some(Uuid::new_v4());
        assert!(check_counterparty(&p).is_ok());
    }

    #[test]
    fn customer_deliveries_require_customer() {
        for kind in DeliveryType::ALL.into_iter().filter(|k| !k.requires_vendor()) {
            let mut p = payload(kind);
            p.vendor_id = Some(Uuid::new_v4());
            assert!(
                matches!(check_counterparty(&p), Err(AppError::BusinessRule("delivery_customer_required"))),
                "{kind:?}"
            );

            p.customer_id = Some(Uuid::new_v4());
            assert!(check_counterparty(&p).is_ok(), "{kind:?}");
        }
    }

    #[test]
    fn serials_are_trimmed_and_blank_ones_dropped() {
        let serials = vec![" SN1 ".to_string(), "".to_string(), "SN2".to_string()];
        assert_eq!(normalize_serials(&serials).unwrap(), vec!["SN1", "SN2"]);
    }

    #[test]
    fn duplicate_serial_is_rejected() {
        let serials = vec!["SN1".to_string(), "SN1 ".to_string()];
        assert!(matches!(
            normalize_serials(&serials),
            Err(AppError::BusinessRule("delivery_duplicate_item"))
        ));
    }

    #[test]
    fn only_blank_serials_is_an_empty_delivery() {
        let serials = vec!["  ".to_string()];
        assert!(matches!(
            normalize_serials(&serials),
            Err(AppError::BusinessRule("delivery_items_required"))
        ));
    }

    fn service(pool: &PgPool) -> DeliveryService {
        DeliveryService::new(
            DeliveryRepository::new(pool.clone()),
            InventoryRepository::new(pool.clone()),
            CustomerRepository::new(pool.clone()),
            CodeGenerator::new("ENPL"),
            pool.clone(),
        )
    }

    fn to_customer(delivery_type: DeliveryType, customer_id: Uuid) -> CreateDeliveryPayload {
        let mut p = payload(delivery_type);
        p.customer_id = Some(customer_id);
        p
    }

    async fn seed_stock(pool: &PgPool, serials: &[&str]) -> Uuid {
        let vendor_id = seed_vendor(pool).await;
        let invoice_id = seed_invoice(pool, vendor_id, Decimal::new(1000, 0)).await;
        for serial in serials {
            seed_serial(pool, invoice_id, serial).await;
        }
        seed_customer(pool).await
    }

    #[sqlx::test(migrations = "./migrations")]
    async fn deleting_a_delivery_restores_previous_status(pool: PgPool) {
        let customer_id = seed_stock(&pool, &["SN1"]).await;
        let deliveries = service(&pool);

        let sale = deliveries.create_delivery(&to_customer(DeliveryType::Sale, customer_id)).await.unwrap();
        assert!(sale.header.challan_no.starts_with("ENPL-DC-"));
        assert_eq!(sale.items.len(), 1);
        assert_eq!(sale.items[0].previous_status, InventoryStatus::InStock);
        assert_eq!(serial_status(&pool, "SN1").await, InventoryStatus::Sold);

        deliveries.delete_delivery(sale.header.id).await.unwrap();
        assert_eq!(serial_status(&pool, "SN1").await, InventoryStatus::InStock);
        assert!(matches!(
            deliveries.get_delivery(sale.header.id).await,
            Err(AppError::NotFound("delivery"))
        ));
    }

    #[sqlx::test(migrations = "./migrations")]
    async fn serial_already_delivered_is_unavailable(pool: PgPool) {
        let customer_id = seed_stock(&pool, &["SN1"]).await;
        let deliveries = service(&pool);

        deliveries.create_delivery(&to_customer(DeliveryType::Demo, customer_id)).await.unwrap();
        match deliveries.create_delivery(&to_customer(DeliveryType::Sale, customer_id)).await {
            Err(AppError::SerialUnavailable { serial, .. }) => assert_eq!(serial, "SN1"),
            other => panic!("esperava SerialUnavailable, veio {other:?}"),
        }
    }

    #[sqlx::test(migrations = "./migrations")]
    async fn older_delivery_cannot_be_undone_after_redelivery(pool: PgPool) {
        let customer_id = seed_stock(&pool, &["SN1"]).await;
        let deliveries = service(&pool);

        // Venda, devolução ao estoque e nova venda: o status volta a ser SOLD
        let first_sale = deliveries.create_delivery(&to_customer(DeliveryType::Sale, customer_id)).await.unwrap();
        deliveries.create_delivery(&to_customer(DeliveryType::StockReturn, customer_id)).await.unwrap();
        let second_sale = deliveries.create_delivery(&to_customer(DeliveryType::Sale, customer_id)).await.unwrap();
        assert_eq!(serial_status(&pool, "SN1").await, InventoryStatus::Sold);

        match deliveries.delete_delivery(first_sale.header.id).await {
            Err(AppError::DeliveryItemMoved(serial)) => assert_eq!(serial, "SN1"),
            other => panic!("esperava DeliveryItemMoved, veio {other:?}"),
        }
        assert_eq!(serial_status(&pool, "SN1").await, InventoryStatus::Sold);
        assert!(deliveries.get_delivery(first_sale.header.id).await.is_ok());

        // A entrega mais recente continua podendo ser desfeita
        deliveries.delete_delivery(second_sale.header.id).await.unwrap();
        assert_eq!(serial_status(&pool, "SN1").await, InventoryStatus::InStock);
    }
}
