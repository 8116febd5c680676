// src/docs.rs

use utoipa::OpenApi;
use utoipa::openapi::security::{Http, HttpAuthScheme, SecurityScheme};
use crate::handlers;
use crate::models;

#[derive(OpenApi)]
#[openapi(
    paths(
        // --- Auth ---
        handlers::auth::login,

        // --- Users ---
        handlers::auth::get_me,
        handlers::users::list_users,
        handlers::users::get_user,
        handlers::users::create_user,
        handlers::users::update_user,
        handlers::users::delete_user,
        handlers::users::list_departments,
        handlers::users::get_department,
        handlers::users::create_department,
        handlers::users::update_department,
        handlers::users::delete_department,

        // --- Catalog ---
        handlers::catalog::list_categories,
        handlers::catalog::get_category,
        handlers::catalog::create_category,
        handlers::catalog::update_category,
        handlers::catalog::delete_category,
        handlers::catalog::list_sub_categories,
        handlers::catalog::create_sub_category,
        handlers::catalog::update_sub_category,
        handlers::catalog::delete_sub_category,
        handlers::catalog::list_products,
        handlers::catalog::get_product,
        handlers::catalog::create_product,
        handlers::catalog::update_product,
        handlers::catalog::delete_product,

        // --- Vendors ---
        handlers::vendors::list_vendors,
        handlers::vendors::get_vendor,
        handlers::vendors::create_vendor,
        handlers::vendors::update_vendor,
        handlers::vendors::delete_vendor,
        handlers::documents::upload_vendor_gst,
        handlers::documents::download_vendor_gst,

        // --- Customers / Sites ---
        handlers::customers::list_customers,
        handlers::customers::get_customer,
        handlers::customers::create_customer,
        handlers::customers::update_customer,
        handlers::customers::delete_customer,
        handlers::customers::list_customer_sites,
        handlers::documents::upload_customer_gst,
        handlers::documents::download_customer_gst,
        handlers::customers::list_sites,
        handlers::customers::get_site,
        handlers::customers::create_site,
        handlers::customers::update_site,
        handlers::customers::delete_site,

        // --- INVENTORY ---
        handlers::inventory::list_invoices,
        handlers::inventory::get_invoice,
        handlers::inventory::create_invoice,
        handlers::inventory::update_invoice,
        handlers::inventory::delete_invoice,
        handlers::inventory::list_stock,
        handlers::inventory::find_by_serial,

        // --- Deliveries ---
        handlers::deliveries::list_deliveries,
        handlers::deliveries::get_delivery,
        handlers::deliveries::create_delivery,
        handlers::deliveries::update_delivery,
        handlers::deliveries::delete_delivery,

        // --- Contracts ---
        handlers::contracts::list_contracts,
        handlers::contracts::get_contract,
        handlers::contracts::create_contract,
        handlers::contracts::update_contract,
        handlers::contracts::delete_contract,

        // --- Tickets ---
        handlers::tickets::list_tickets,
        handlers::tickets::get_ticket,
        handlers::tickets::create_ticket,
        handlers::tickets::update_ticket,
        handlers::tickets::change_status,
        handlers::tickets::delete_ticket,
        handlers::tickets::list_messages,
        handlers::tickets::add_message,

        // --- Payments ---
        handlers::payments::list_payments,
        handlers::payments::get_payment,
        handlers::payments::create_payment,
        handlers::payments::update_payment,
        handlers::payments::delete_payment,

        // --- Dashboard ---
        handlers::dashboard::get_counts,
        handlers::dashboard::get_tickets_by_status,
    ),
    components(
        schemas(
            // --- Auth ---
            models::auth::UserRole,
            models::auth::User,
            models::auth::Department,
            models::auth::LoginUserPayload,
            models::auth::AuthResponse,
            models::auth::CreateUserPayload,
            models::auth::UpdateUserPayload,
            models::auth::DepartmentPayload,

            // --- Catalog ---
            models::catalog::Category,
            models::catalog::SubCategory,
            models::catalog::Product,
            models::catalog::NamePayload,
            models::catalog::CreateProductPayload,
            models::catalog::UpdateProductPayload,

            // --- Vendors / Customers ---
            models::party::ContactFields,
            models::party::CreatePartyPayload,
            models::party::UpdatePartyPayload,
            models::vendor::Vendor,
            models::customer::Customer,
            models::customer::Site,
            models::customer::CreateSitePayload,
            models::customer::UpdateSitePayload,
            handlers::documents::GstCertificateUpload,

            // --- Inventory ---
            models::inventory::InventoryStatus,
            models::inventory::PaymentStatus,
            models::inventory::Inventory,
            models::inventory::ProductInventory,
            models::inventory::StockItem,
            models::inventory::InventoryDetail,
            models::inventory::InventoryLinePayload,
            models::inventory::CreateInventoryPayload,
            models::inventory::UpdateInventoryPayload,

            // --- Deliveries ---
            models::delivery::DeliveryType,
            models::delivery::MaterialDelivery,
            models::delivery::MaterialDeliveryItem,
            models::delivery::MaterialDeliveryDetail,
            models::delivery::CreateDeliveryPayload,
            models::delivery::UpdateDeliveryPayload,

            // --- Contracts ---
            models::contract::ContractType,
            models::contract::ServiceContract,
            models::contract::ContractInventory,
            models::contract::ServiceContractDetail,
            models::contract::CreateContractPayload,
            models::contract::UpdateContractPayload,

            // --- Tickets ---
            models::ticket::TicketStatus,
            models::ticket::TicketPriority,
            models::ticket::Ticket,
            models::ticket::Message,
            models::ticket::MessageResponse,
            models::ticket::CreateTicketPayload,
            models::ticket::UpdateTicketPayload,
            models::ticket::TicketStatusPayload,
            models::ticket::MessagePayload,

            // --- Payments ---
            models::payment::PaymentMode,
            models::payment::VendorPayment,
            models::payment::CreatePaymentPayload,
            models::payment::UpdatePaymentPayload,

            // --- DASHBOARD ---
            models::dashboard::DashboardCounts,
            models::dashboard::TicketStatusCount,
        )
    ),
    tags(
        (name = "Auth", description = "Login e emissão de JWT"),
        (name = "Users", description = "Usuários, papéis e departamentos"),
        (name = "Catalog", description = "Categorias, subcategorias e produtos"),
        (name = "Vendors", description = "Fornecedores e certificados GST"),
        (name = "Customers", description = "Clientes e certificados GST"),
        (name = "Sites", description = "Locais de instalação dos clientes"),
        (name = "Inventory", description = "Notas de compra e seriais em estoque"),
        (name = "Deliveries", description = "Entregas de material (challans)"),
        (name = "Contracts", description = "Contratos de serviço"),
        (name = "Tickets", description = "Chamados de suporte e mensagens"),
        (name = "Payments", description = "Pagamentos a fornecedores"),
        (name = "Dashboard", description = "Indicadores do painel")
    ),
    modifiers(&SecurityAddon)
)]
pub struct ApiDoc;

struct SecurityAddon;

impl utoipa::Modify for SecurityAddon {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        let components = openapi.components.get_or_insert_with(Default::default);
        components.add_security_scheme(
            "api_jwt",
            SecurityScheme::Http(
                Http::new(HttpAuthScheme::Bearer)
            ),
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn documents_every_route_group() {
        let doc = ApiDoc::openapi();
        let paths = &doc.paths.paths;

        for path in [
            "/api/auth/login",
            "/api/inventory/{id}",
            "/api/deliveries",
            "/api/tickets/{id}/messages",
            "/api/vendor-payments/{id}",
            "/api/vendors/{id}/gst-certificate",
            "/api/dashboard/counts",
        ] {
            assert!(paths.contains_key(path), "rota ausente no OpenAPI: {path}");
        }
    }

    #[test]
    fn registers_bearer_scheme() {
        let doc = ApiDoc::openapi();
        let components = doc.components.expect("components");
        assert!(components.security_schemes.contains_key("api_jwt"));
    }
}
