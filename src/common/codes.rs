// src/common/codes.rs

use chrono::NaiveDate;
use sqlx::PgConnection;

use crate::common::{db_utils::advisory_xact_lock, error::AppError};

/// Tipos de documento que recebem código sequencial (ex: ENPL-CUS-0125-00001).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CodeKind {
    Customer,
    Vendor,
    Site,
    Ticket,
    ServiceContract,
    DeliveryChallan,
}

impl CodeKind {
    pub fn segment(self) -> &'static str {
        match self {
            CodeKind::Customer => "CUS",
            CodeKind::Vendor => "VEN",
            CodeKind::Site => "SITE",
            CodeKind::Ticket => "TKT",
            CodeKind::ServiceContract => "SC",
            CodeKind::DeliveryChallan => "DC",
        }
    }

    // Tabela e coluna onde o código fica gravado
    fn storage(self) -> (&'static str, &'static str) {
        match self {
            CodeKind::Customer => ("customers", "customer_code"),
            CodeKind::Vendor => ("vendors", "vendor_code"),
            CodeKind::Site => ("sites", "site_code"),
            CodeKind::Ticket => ("tickets", "ticket_no"),
            CodeKind::ServiceContract => ("service_contracts", "contract_no"),
            CodeKind::DeliveryChallan => ("material_deliveries", "challan_no"),
        }
    }
}

/// "ENPL-CUS-0125-": tudo menos o número sequencial.
pub fn code_prefix(prefix: &str, kind: CodeKind, date: NaiveDate) -> String {
    format!("{}-{}-{}-", prefix, kind.segment(), date.format("%m%y"))
}

pub fn format_code(prefix: &str, kind: CodeKind, date: NaiveDate, seq: i64) -> String {
    format!("{}{:05}", code_prefix(prefix, kind, date), seq)
}

#[derive(Debug, Clone)]
pub struct CodeGenerator {
    prefix: String,
}

impl CodeGenerator {
    pub fn new(prefix: impl Into<String>) -> Self {
        Self { prefix: prefix.into() }
    }

    /// Próximo código do mês. Precisa rodar dentro da transação que vai gravar o registro:
    /// o lock consultivo segura concorrentes com o mesmo prefixo até o commit.
    pub async fn next_code(
        &self,
        conn: &mut PgConnection,
        kind: CodeKind,
        date: NaiveDate,
    ) -> Result<String, AppError> {
        let prefix = code_prefix(&self.prefix, kind, date);
        advisory_xact_lock(&mut *conn, &prefix).await?;

        // Usamos o maior sufixo (e não o COUNT) para não repetir código depois de um DELETE.
        let (table, column) = kind.storage();
        let sql = format!(
            "SELECT COALESCE(MAX(CAST(SUBSTRING({column} FROM $2) AS BIGINT)), 0) \
             FROM {table} WHERE {column} LIKE $1"
        );

        let last: i64 = sqlx::query_scalar(&sql)
            .bind(format!("{prefix}%"))
            .bind(prefix.len() as i32 + 1)
            .fetch_one(&mut *conn)
            .await?;

        Ok(format_code(&self.prefix, kind, date, last + 1))
    }
}

#[cfg(test)]
mod tests {
    use sqlx::PgPool;

    use super::*;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn formats_customer_code() {
        let code = format_code("ENPL", CodeKind::Customer, date(2025, 1, 17), 1);
        assert_eq!(code, "ENPL-CUS-0125-00001");
    }

    #[test]
    fn every_kind_has_its_segment() {
        let d = date(2024, 11, 3);
        assert_eq!(format_code("ENPL", CodeKind::Vendor, d, 12), "ENPL-VEN-1124-00012");
        assert_eq!(format_code("ENPL", CodeKind::Site, d, 7), "ENPL-SITE-1124-00007");
        assert_eq!(format_code("ENPL", CodeKind::Ticket, d, 300), "ENPL-TKT-1124-00300");
        assert_eq!(format_code("ENPL", CodeKind::ServiceContract, d, 1), "ENPL-SC-1124-00001");
        assert_eq!(format_code("ENPL", CodeKind::DeliveryChallan, d, 45), "ENPL-DC-1124-00045");
    }

    #[test]
    fn prefix_changes_with_the_month() {
        let jan = code_prefix("ENPL", CodeKind::Ticket, date(2025, 1, 31));
        let feb = code_prefix("ENPL", CodeKind::Ticket, date(2025, 2, 1));
        assert_ne!(jan, feb);
        assert_eq!(feb, "ENPL-TKT-0225-");
    }

    #[test]
    fn sequence_wider_than_padding_is_kept() {
        let code = format_code("ENPL", CodeKind::Customer, date(2025, 6, 1), 123_456);
        assert_eq!(code, "ENPL-CUS-0625-123456");
    }

    #[test]
    fn custom_prefix_is_used() {
        let code = format_code("ACME", CodeKind::Vendor, date(2025, 6, 1), 2);
        assert_eq!(code, "ACME-VEN-0625-00002");
    }

    // Gera o próximo código de cliente e grava um cliente com ele
    async fn create_customer(pool: &PgPool, codes: &CodeGenerator, day: NaiveDate) -> String {
        let mut tx = pool.begin().await.unwrap();
        let code = codes.next_code(&mut tx, CodeKind::Customer, day).await.unwrap();
        sqlx::query("INSERT INTO customers (customer_code, name) VALUES ($1, 'Cliente')")
            .bind(&code)
            .execute(&mut *tx)
            .await
            .unwrap();
        tx.commit().await.unwrap();
        code
    }

    #[sqlx::test(migrations = "./migrations")]
    async fn sequence_grows_within_the_month(pool: PgPool) {
        let codes = CodeGenerator::new("ENPL");

        assert_eq!(create_customer(&pool, &codes, date(2025, 1, 5)).await, "ENPL-CUS-0125-00001");
        assert_eq!(create_customer(&pool, &codes, date(2025, 1, 28)).await, "ENPL-CUS-0125-00002");
    }

    #[sqlx::test(migrations = "./migrations")]
    async fn sequence_restarts_in_a_new_month(pool: PgPool) {
        let codes = CodeGenerator::new("ENPL");

        create_customer(&pool, &codes, date(2025, 1, 5)).await;
        create_customer(&pool, &codes, date(2025, 1, 6)).await;
        assert_eq!(create_customer(&pool, &codes, date(2025, 2, 1)).await, "ENPL-CUS-0225-00001");
    }

    #[sqlx::test(migrations = "./migrations")]
    async fn deleted_record_does_not_free_a_code(pool: PgPool) {
        let codes = CodeGenerator::new("ENPL");

        let first = create_customer(&pool, &codes, date(2025, 3, 1)).await;
        create_customer(&pool, &codes, date(2025, 3, 2)).await;
        sqlx::query("DELETE FROM customers WHERE customer_code = $1")
            .bind(&first)
            .execute(&pool)
            .await
            .unwrap();

        assert_eq!(create_customer(&pool, &codes, date(2025, 3, 3)).await, "ENPL-CUS-0325-00003");
    }

    #[sqlx::test(migrations = "./migrations")]
    async fn kinds_have_independent_sequences(pool: PgPool) {
        let codes = CodeGenerator::new("ENPL");
        create_customer(&pool, &codes, date(2025, 4, 1)).await;

        let mut tx = pool.begin().await.unwrap();
        let vendor_code = codes.next_code(&mut tx, CodeKind::Vendor, date(2025, 4, 1)).await.unwrap();
        assert_eq!(vendor_code, "ENPL-VEN-0425-00001");
    }
}
