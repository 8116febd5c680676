// src/services/dashboard_service.rs

use chrono::Utc;

use crate::{
    common::error::AppError,
    db::DashboardRepository,
    models::dashboard::{DashboardCounts, TicketStatusCount},
};

#[derive(Clone)]
pub struct DashboardService {
    repo: DashboardRepository,
}

impl DashboardService {
    pub fn new(repo: DashboardRepository) -> Self {
        Self { repo }
    }

    pub async fn get_counts(&self) -> Result<DashboardCounts, AppError> {
        self.repo.get_counts(Utc::now().date_naive()).await
    }

    pub async fn tickets_by_status(&self) -> Result<Vec<TicketStatusCount>, AppError> {
        self.repo.tickets_by_status().await
    }
}
