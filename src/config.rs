// src/config.rs

use std::{env, net::SocketAddr, path::PathBuf, sync::Arc, time::Duration};

use anyhow::Context;
use sqlx::{postgres::PgPoolOptions, PgPool};

use crate::{
    common::{
        codes::CodeGenerator,
        i18n::I18nStore,
        storage::{DocumentStore, LocalDocumentStore},
    },
    db::{
        CatalogRepository, ContractRepository, CustomerRepository, DashboardRepository, DeliveryRepository,
        InventoryRepository, PaymentRepository, TicketRepository, UserRepository, VendorRepository,
    },
    services::{
        auth::AuthService, catalog_service::CatalogService, contract_service::ContractService,
        customer_service::CustomerService, dashboard_service::DashboardService, delivery_service::DeliveryService,
        inventory_service::InventoryService, payment_service::PaymentService, ticket_service::TicketService,
        user_service::UserService, vendor_service::VendorService,
    },
};

const DEFAULT_MAX_UPLOAD_BYTES: usize = 5 * 1024 * 1024;

/// Configuração lida do ambiente (e do `.env`, carregado no main).
#[derive(Debug, Clone)]
pub struct Config {
    pub database_url: String,
    pub jwt_secret: String,
    pub server_addr: SocketAddr,
    pub db_max_connections: u32,
    pub jwt_ttl_hours: i64,
    pub upload_dir: PathBuf,
    pub max_upload_bytes: usize,
    pub code_prefix: String,
    pub cors_origin: Option<String>,
    // Primeiro admin, criado só se a tabela de usuários estiver vazia
    pub admin_email: Option<String>,
    pub admin_password: Option<String>,
}

impl Config {
    pub fn from_env() -> anyhow::Result<Self> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Mesma leitura do `from_env`, mas com a fonte das variáveis injetada (testes).
    pub fn from_lookup<F>(lookup: F) -> anyhow::Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());
        let required = |key: &str| get(key).with_context(|| format!("{key} deve ser definida"));

        Ok(Self {
            database_url: required("DATABASE_URL")?,
            jwt_secret: required("JWT_SECRET")?,
            server_addr: parse_or(get("SERVER_ADDR"), "SERVER_ADDR", SocketAddr::from(([0, 0, 0, 0], 3000)))?,
            db_max_connections: parse_or(get("DB_MAX_CONNECTIONS"), "DB_MAX_CONNECTIONS", 5)?,
            jwt_ttl_hours: parse_or(get("JWT_TTL_HOURS"), "JWT_TTL_HOURS", 168)?,
            upload_dir: get("UPLOAD_DIR").map(PathBuf::from).unwrap_or_else(|| PathBuf::from("./uploads")),
            max_upload_bytes: parse_or(get("MAX_UPLOAD_BYTES"), "MAX_UPLOAD_BYTES", DEFAULT_MAX_UPLOAD_BYTES)?,
            code_prefix: get("CODE_PREFIX").unwrap_or_else(|| "ENPL".to_string()),
            cors_origin: get("CORS_ORIGIN"),
            admin_email: get("ADMIN_EMAIL"),
            admin_password: get("ADMIN_PASSWORD"),
        })
    }
}

fn parse_or<T>(raw: Option<String>, key: &str, default: T) -> anyhow::Result<T>
where
    T: std::str::FromStr,
    T::Err: std::error::Error + Send + Sync + 'static,
{
    match raw {
        Some(value) => value
            .trim()
            .parse()
            .with_context(|| format!("{key} inválida: {value}")),
        None => Ok(default),
    }
}

#[derive(Clone)]
pub struct AppState {
    pub db_pool: PgPool,
    pub config: Arc<Config>,
    pub i18n_store: Arc<I18nStore>,

    pub auth_service: AuthService,
    pub user_service: UserService,
    pub catalog_service: CatalogService,
    pub vendor_service: VendorService,
    pub customer_service: CustomerService,
    pub inventory_service: InventoryService,
    pub delivery_service: DeliveryService,
    pub contract_service: ContractService,
    pub ticket_service: TicketService,
    pub payment_service: PaymentService,
    pub dashboard_service: DashboardService,
}

impl AppState {
    pub async fn new(config: Config) -> anyhow::Result<Self> {
        // Conecta ao banco de dados, usando '?' para propagar erros
        let db_pool = PgPoolOptions::new()
            .max_connections(config.db_max_connections)
            .acquire_timeout(Duration::from_secs(3))
            .connect(&config.database_url)
            .await
            .context("Falha ao conectar ao banco de dados")?;

        tracing::info!("✅ Conexão com o banco de dados estabelecida com sucesso!");

        let documents: Arc<dyn DocumentStore> = Arc::new(LocalDocumentStore::new(config.upload_dir.clone()));
        Ok(Self::build(config, db_pool, documents))
    }

    /// Monta o gráfico de dependências sobre um pool já criado.
    pub fn build(config: Config, db_pool: PgPool, documents: Arc<dyn DocumentStore>) -> Self {
        let codes = CodeGenerator::new(config.code_prefix.clone());
        let max_upload = config.max_upload_bytes;

        let user_repo = UserRepository::new(db_pool.clone());
        let customer_repo = CustomerRepository::new(db_pool.clone());
        let inventory_repo = InventoryRepository::new(db_pool.clone());
        let payment_repo = PaymentRepository::new(db_pool.clone());

        let auth_service = AuthService::new(
            user_repo.clone(),
            config.jwt_secret.clone(),
            config.jwt_ttl_hours,
            db_pool.clone(),
        );
        let user_service = UserService::new(user_repo, db_pool.clone());
        let catalog_service = CatalogService::new(CatalogRepository::new(db_pool.clone()), db_pool.clone());
        let vendor_service = VendorService::new(
            VendorRepository::new(db_pool.clone()),
            codes.clone(),
            documents.clone(),
            max_upload,
            db_pool.clone(),
        );
        let customer_service = CustomerService::new(
            customer_repo.clone(),
            codes.clone(),
            documents,
            max_upload,
            db_pool.clone(),
        );
        let inventory_service = InventoryService::new(inventory_repo.clone(), payment_repo.clone(), db_pool.clone());
        let delivery_service = DeliveryService::new(
            DeliveryRepository::new(db_pool.clone()),
            inventory_repo.clone(),
            customer_repo.clone(),
            codes.clone(),
            db_pool.clone(),
        );
        let contract_service = ContractService::new(
            ContractRepository::new(db_pool.clone()),
            inventory_repo.clone(),
            customer_repo.clone(),
            codes.clone(),
            db_pool.clone(),
        );
        let ticket_service = TicketService::new(
            TicketRepository::new(db_pool.clone()),
            customer_repo,
            codes,
            db_pool.clone(),
        );
        let payment_service = PaymentService::new(payment_repo, inventory_repo, db_pool.clone());
        let dashboard_service = DashboardService::new(DashboardRepository::new(db_pool.clone()));

        Self {
            db_pool,
            config: Arc::new(config),
            i18n_store: Arc::new(I18nStore::new()),
            auth_service,
            user_service,
            catalog_service,
            vendor_service,
            customer_service,
            inventory_service,
            delivery_service,
            contract_service,
            ticket_service,
            payment_service,
            dashboard_service,
        }
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use super::*;

    fn lookup(vars: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = vars.iter().map(|(k, v)| (k.to_string(), v.to_string())).collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn applies_defaults() {
        let config = Config::from_lookup(lookup(&[
            ("DATABASE_URL", "postgres://localhost/enpl"),
            ("JWT_SECRET", "segredo"),
        ]))
        .unwrap();

        assert_eq!(config.server_addr.to_string(), "0.0.0.0:3000");
        assert_eq!(config.db_max_connections, 5);
        assert_eq!(config.jwt_ttl_hours, 168);
        assert_eq!(config.upload_dir, PathBuf::from("./uploads"));
        assert_eq!(config.max_upload_bytes, 5 * 1024 * 1024);
        assert_eq!(config.code_prefix, "ENPL");
        assert!(config.cors_origin.is_none());
        assert!(config.admin_email.is_none());
    }

    #[test]
    fn reads_overrides() {
        let config = Config::from_lookup(lookup(&[
            ("DATABASE_URL", "postgres://db/enpl"),
            ("JWT_SECRET", "s"),
            ("SERVER_ADDR", "127.0.0.1:8080"),
            ("JWT_TTL_HOURS", "12"),
            ("MAX_UPLOAD_BYTES", "1024"),
            ("CODE_PREFIX", "ACME"),
        ]))
        .unwrap();

        assert_eq!(config.server_addr.port(), 8080);
        assert_eq!(config.jwt_ttl_hours, 12);
        assert_eq!(config.max_upload_bytes, 1024);
        assert_eq!(config.code_prefix, "ACME");
    }

    #[test]
    fn missing_required_keys_fail() {
        let err = Config::from_lookup(lookup(&[("DATABASE_URL", "postgres://db/enpl")])).unwrap_err();
        assert!(err.to_string().contains("JWT_SECRET"));

        // Vazio conta como ausente
        assert!(Config::from_lookup(lookup(&[("DATABASE_URL", " "), ("JWT_SECRET", "s")])).is_err());
    }

    #[test]
    fn invalid_number_fails() {
        let result = Config::from_lookup(lookup(&[
            ("DATABASE_URL", "postgres://db/enpl"),
            ("JWT_SECRET", "s"),
            ("DB_MAX_CONNECTIONS", "muitas"),
        ]));
        assert!(result.is_err());
    }
}
