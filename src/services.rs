pub mod auth;
pub mod catalog_service;
pub mod contract_service;
pub mod customer_service;
pub mod dashboard_service;
pub mod delivery_service;
pub mod inventory_service;
pub mod payment_service;
pub mod ticket_service;
pub mod user_service;
pub mod vendor_service;
