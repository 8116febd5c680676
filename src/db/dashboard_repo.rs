// src/db/dashboard_repo.rs

use chrono::NaiveDate;
use sqlx::PgPool;

use crate::{
    common::error::AppError,
    models::dashboard::{DashboardCounts, TicketStatusCount},
};

#[derive(Clone)]
pub struct DashboardRepository {
    pool: PgPool,
}

impl DashboardRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    // 1. Contadores (uma consulta só: snapshot consistente)
    pub async fn get_counts(&self, today: NaiveDate) -> Result<DashboardCounts, AppError> {
        let counts = sqlx::query_as::<_, DashboardCounts>(
            r#"
            SELECT
                (SELECT COUNT(*) FROM customers) AS customers,
                (SELECT COUNT(*) FROM vendors) AS vendors,
                (SELECT COUNT(*) FROM sites) AS sites,
                (SELECT COUNT(*) FROM products) AS products,
                (SELECT COUNT(*) FROM product_inventory WHERE status = 'IN_STOCK') AS in_stock_items,
                (SELECT COUNT(*) FROM tickets
                    WHERE status IN ('OPEN', 'IN_PROGRESS', 'ON_HOLD')) AS pending_tickets,
                (SELECT COUNT(*) FROM service_contracts
                    WHERE $1 BETWEEN start_date AND end_date) AS active_contracts,
                (SELECT COUNT(*) FROM inventory WHERE due_amount > 0) AS unpaid_invoices,
                (SELECT COALESCE(SUM(due_amount), 0) FROM inventory WHERE due_amount > 0) AS total_due
            "#,
        )
        .bind(today)
        .fetch_one(&self.pool)
        .await?;
        Ok(counts)
    }

    // 2. Tickets por status (só os status que têm ticket)
    pub async fn tickets_by_status(&self) -> Result<Vec<TicketStatusCount>, AppError> {
        let rows = sqlx::query_as::<_, TicketStatusCount>(
            r#"
            SELECT status, COUNT(*) AS count
            FROM tickets
            GROUP BY status
            ORDER BY status
            "#,
        )
        .fetch_all(&self.pool)
        .await?;
        Ok(rows)
    }
}
