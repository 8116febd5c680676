pub mod catalog_repo;
pub use catalog_repo::CatalogRepository;
pub mod contract_repo;
pub use contract_repo::ContractRepository;
pub mod customer_repo;
pub use customer_repo::CustomerRepository;
pub mod dashboard_repo;
pub use dashboard_repo::DashboardRepository;
pub mod delivery_repo;
pub use delivery_repo::DeliveryRepository;
pub mod inventory_repo;
pub use inventory_repo::InventoryRepository;
pub mod payment_repo;
pub use payment_repo::PaymentRepository;
pub mod ticket_repo;
pub use ticket_repo::TicketRepository;
pub mod user_repo;
pub use user_repo::UserRepository;
pub mod vendor_repo;
pub use vendor_repo::VendorRepository;
