// src/common/i18n.rs

use std::collections::HashMap;

pub const DEFAULT_LANG: &str = "en";

// Catálogos embutidos: (chave, mensagem). Placeholders no formato {nome}.
const EN: &[(&str, &str)] = &[
    ("validation_failed", "One or more fields are invalid."),
    ("email_already_exists", "This e-mail is already in use."),
    ("invalid_credentials", "Invalid e-mail or password."),
    ("invalid_token", "Invalid or missing authentication token."),
    ("inactive_user", "This user account is inactive."),
    ("user_not_found", "User not found."),
    ("forbidden", "You do not have permission to perform this action."),
    ("not_found", "{entity} not found."),
    ("duplicate_value", "A record with the same value already exists ({field})."),
    ("resource_in_use", "{entity} is still referenced by other records."),
    ("invalid_reference", "The request references a record that does not exist."),
    ("payment_exceeds_due", "The payment exceeds the amount due ({due})."),
    ("vendor_mismatch", "The payment vendor does not match the invoice vendor."),
    ("gross_below_paid", "The invoice amount cannot be lower than the amount already paid ({paid})."),
    ("invalid_status_transition", "Cannot change ticket status from {from} to {to}."),
    ("ticket_closed", "This ticket is closed and does not accept new messages."),
    ("serial_unavailable", "Serial {serial} is not available for this delivery (current status: {status})."),
    ("delivery_customer_required", "This delivery type requires a customer."),
    ("delivery_vendor_required", "A purchase return requires a vendor."),
    ("delivery_items_required", "A delivery needs at least one item."),
    ("delivery_duplicate_item", "The same serial was listed more than once."),
    ("delivery_items_moved", "Serial {serial} has moved since this delivery; it cannot be undone."),
    ("site_customer_mismatch", "The site does not belong to the selected customer."),
    ("customer_user_requires_customer", "Customer users must be linked to a customer."),
    ("sub_category_mismatch", "The sub-category does not belong to the selected category."),
    ("ticket_customer_required", "Select the customer this ticket belongs to."),
    ("serial_not_found", "Serial {serial} was not found in stock."),
    ("inventory_items_locked", "Items of this invoice were already delivered or are under contract."),
    ("gst_certificate_missing", "No GST certificate has been uploaded yet."),
    ("contract_period_invalid", "The contract end date cannot be before its start date."),
    ("upload_missing_file", "The 'file' field is required."),
    ("upload_not_pdf", "Only PDF files are accepted."),
    ("upload_too_large", "The file exceeds the limit of {limit} bytes."),
    ("internal_error", "An unexpected error occurred."),
    ("entity.record", "Record"),
    ("entity.user", "User"),
    ("entity.department", "Department"),
    ("entity.category", "Category"),
    ("entity.sub_category", "Sub-category"),
    ("entity.product", "Product"),
    ("entity.vendor", "Vendor"),
    ("entity.customer", "Customer"),
    ("entity.site", "Site"),
    ("entity.inventory", "Purchase invoice"),
    ("entity.product_inventory", "Inventory item"),
    ("entity.delivery", "Material delivery"),
    ("entity.contract", "Service contract"),
    ("entity.ticket", "Ticket"),
    ("entity.payment", "Vendor payment"),
    ("entity.document", "Document"),
];

const PT: &[(&str, &str)] = &[
    ("validation_failed", "Um ou mais campos são inválidos."),
    ("email_already_exists", "Este e-mail já está em uso."),
    ("invalid_credentials", "E-mail ou senha inválidos."),
    ("invalid_token", "Token de autenticação inválido ou ausente."),
    ("inactive_user", "Este usuário está inativo."),
    ("user_not_found", "Usuário não encontrado."),
    ("forbidden", "Você não tem permissão para realizar esta ação."),
    ("not_found", "{entity} não encontrado(a)."),
    ("duplicate_value", "Já existe um registro com o mesmo valor ({field})."),
    ("resource_in_use", "{entity} ainda é referenciado(a) por outros registros."),
    ("invalid_reference", "A requisição referencia um registro inexistente."),
    ("payment_exceeds_due", "O pagamento excede o saldo devedor ({due})."),
    ("vendor_mismatch", "O fornecedor do pagamento difere do fornecedor da nota."),
    ("gross_below_paid", "O valor da nota não pode ser menor que o total já pago ({paid})."),
    ("invalid_status_transition", "Não é possível mudar o status do ticket de {from} para {to}."),
    ("ticket_closed", "Este ticket está fechado e não aceita novas mensagens."),
    ("serial_unavailable", "O serial {serial} não está disponível para esta entrega (status atual: {status})."),
    ("delivery_customer_required", "Este tipo de entrega exige um cliente."),
    ("delivery_vendor_required", "Uma devolução de compra exige um fornecedor."),
    ("delivery_items_required", "A entrega precisa de pelo menos um item."),
    ("delivery_duplicate_item", "O mesmo serial foi informado mais de uma vez."),
    ("delivery_items_moved", "O serial {serial} já foi movimentado depois desta entrega; ela não pode ser desfeita."),
    ("site_customer_mismatch", "O local não pertence ao cliente selecionado."),
    ("customer_user_requires_customer", "Usuários do tipo cliente precisam estar vinculados a um cliente."),
    ("sub_category_mismatch", "A subcategoria não pertence à categoria selecionada."),
    ("ticket_customer_required", "Informe o cliente deste ticket."),
    ("serial_not_found", "O serial {serial} não foi encontrado no estoque."),
    ("inventory_items_locked", "Itens desta nota já foram entregues ou estão em contrato."),
    ("gst_certificate_missing", "Nenhum certificado GST foi enviado ainda."),
    ("contract_period_invalid", "A data final do contrato não pode ser anterior à inicial."),
    ("upload_missing_file", "O campo 'file' é obrigatório."),
    ("upload_not_pdf", "Somente arquivos PDF são aceitos."),
    ("upload_too_large", "O arquivo excede o limite de {limit} bytes."),
    ("internal_error", "Ocorreu um erro inesperado."),
    ("entity.record", "Registro"),
    ("entity.user", "Usuário"),
    ("entity.department", "Departamento"),
    ("entity.category", "Categoria"),
    ("entity.sub_category", "Subcategoria"),
    ("entity.product", "Produto"),
    ("entity.vendor", "Fornecedor"),
    ("entity.customer", "Cliente"),
    ("entity.site", "Local"),
    ("entity.inventory", "Nota de compra"),
    ("entity.product_inventory", "Item de estoque"),
    ("entity.delivery", "Entrega de material"),
    ("entity.contract", "Contrato de serviço"),
    ("entity.ticket", "Ticket"),
    ("entity.payment", "Pagamento"),
    ("entity.document", "Documento"),
];

/// Mensagens traduzidas por idioma. Fallback: inglês, depois a própria chave.
#[derive(Debug, Clone)]
pub struct I18nStore {
    catalogs: HashMap<&'static str, HashMap<&'static str, &'static str>>,
}

impl Default for I18nStore {
    fn default() -> Self {
        Self::new()
    }
}

impl I18nStore {
    pub fn new() -> Self {
        let mut catalogs = HashMap::new();
        catalogs.insert("en", EN.iter().copied().collect());
        catalogs.insert("pt", PT.iter().copied().collect());
        Self { catalogs }
    }

    pub fn translate(&self, lang: &str, key: &str, params: &[(&str, String)]) -> String {
        let template = self
            .lookup(lang, key)
            .or_else(|| self.lookup(DEFAULT_LANG, key))
            .unwrap_or(key);

        params.iter().fold(template.to_string(), |msg, (name, value)| {
            msg.replace(&format!("{{{name}}}"), value)
        })
    }

    fn lookup(&self, lang: &str, key: &str) -> Option<&'static str> {
        self.catalogs.get(lang).and_then(|c| c.get(key)).copied()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn interpolates_parameters() {
        let store = I18nStore::new();
        let msg = store.translate("en", "upload_too_large", &[("limit", "1024".to_string())]);
        assert_eq!(msg, "The file exceeds the limit of 1024 bytes.");
    }

    #[test]
    fn unknown_language_falls_back_to_english() {
        let store = I18nStore::new();
        assert_eq!(store.translate("de", "ticket_closed", &[]), store.translate("en", "ticket_closed", &[]));
    }

    #[test]
    fn unknown_key_is_returned_as_is() {
        assert_eq!(I18nStore::new().translate("pt", "nao_existe", &[]), "nao_existe");
    }

    #[test]
    fn catalogs_have_the_same_keys() {
        let store = I18nStore::new();
        let en = &store.catalogs["en"];
        let pt = &store.catalogs["pt"];
        for key in en.keys() {
            assert!(pt.contains_key(key), "faltando em pt: {key}");
        }
        assert_eq!(en.len(), pt.len());
    }
}
