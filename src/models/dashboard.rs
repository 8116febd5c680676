// src/models/dashboard.rs

use rust_decimal::Decimal;
use serde::Serialize;
use sqlx::FromRow;
use utoipa::ToSchema;

use crate::models::ticket::TicketStatus;

// 1. Contadores dos widgets (os cards do topo)
#[derive(Debug, Serialize, FromRow, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct DashboardCounts {
    pub customers: i64,
    pub vendors: i64,
    pub sites: i64,
    pub products: i64,
    pub in_stock_items: i64,   // Seriais com status IN_STOCK
    pub pending_tickets: i64,  // OPEN, IN_PROGRESS ou ON_HOLD
    pub active_contracts: i64, // Vigentes hoje
    pub unpaid_invoices: i64,  // Notas com saldo devedor > 0
    pub total_due: Decimal,    // Soma dos saldos devedores
}

// 2. Tickets por status (gráfico de pizza)
#[derive(Debug, Serialize, FromRow, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct TicketStatusCount {
    pub status: TicketStatus,
    pub count: i64,
}
