// src/services/ticket_service.rs

use chrono::Utc;
use sqlx::PgPool;
use uuid::Uuid;

use crate::{
    common::{
        codes::{CodeGenerator, CodeKind},
        error::AppError,
    },
    db::{CustomerRepository, TicketRepository},
    models::{
        auth::User,
        ticket::{
            CreateTicketPayload, Message, MessageResponse, Ticket, TicketQuery, TicketStatus, UpdateTicketPayload,
        },
    },
    services::customer_service::ensure_site_of_customer,
};

#[derive(Clone)]
pub struct TicketService {
    ticket_repo: TicketRepository,
    customer_repo: CustomerRepository,
    codes: CodeGenerator,
    pool: PgPool,
}

impl TicketService {
    pub fn new(
        ticket_repo: TicketRepository,
        customer_repo: CustomerRepository,
        codes: CodeGenerator,
        pool: PgPool,
    ) -> Self {
        Self { ticket_repo, customer_repo, codes, pool }
    }

    /// Usuário CUSTOMER só lista os tickets do próprio cliente.
    pub async fn list_tickets(&self, user: &User, query: &TicketQuery) -> Result<Vec<Ticket>, AppError> {
        let customer_id = customer_scope(user)?.or(query.customer_id);
        self.ticket_repo.list_tickets(query.status, customer_id).await
    }

    pub async fn get_ticket(&self, user: &User, id: Uuid) -> Result<Ticket, AppError> {
        let ticket = self
            .ticket_repo
            .find_ticket(&self.pool, id)
            .await?
            .ok_or(AppError::NotFound("ticket"))?;
        ensure_visible(user, &ticket)?;
        Ok(ticket)
    }

    pub async fn create_ticket(&self, user: &User, payload: &CreateTicketPayload) -> Result<Ticket, AppError> {
        let customer_id = ticket_customer(user, payload.customer_id)?;

        let mut tx = self.pool.begin().await?;

        ensure_site_of_customer(&self.customer_repo, &mut tx, payload.site_id, customer_id).await?;

        let ticket_no = self
            .codes
            .next_code(&mut tx, CodeKind::Ticket, Utc::now().date_naive())
            .await?;
        let ticket = self
            .ticket_repo
            .create_ticket(&mut *tx, &ticket_no, customer_id, user.id, payload)
            .await?;

        tx.commit().await?;
        tracing::info!("🎫 Ticket {} aberto por {}", ticket.ticket_no, user.email);
        Ok(ticket)
    }

    pub async fn update_ticket(
        &self,
        user: &User,
        id: Uuid,
        changes: &UpdateTicketPayload,
    ) -> Result<Ticket, AppError> {
        if changes.assigned_to.is_some() && !user.role.is_staff() {
            return Err(AppError::Forbidden);
        }

        let mut tx = self.pool.begin().await?;

        let current = self
            .ticket_repo
            .lock_ticket(&mut *tx, id)
            .await?
            .ok_or(AppError::NotFound("ticket"))?;
        ensure_visible(user, &current)?;
        ensure_site_of_customer(&self.customer_repo, &mut tx, changes.site_id, current.customer_id).await?;

        let ticket = self
            .ticket_repo
            .update_ticket(&mut *tx, id, changes)
            .await?
            .ok_or(AppError::NotFound("ticket"))?;

        tx.commit().await?;
        Ok(ticket)
    }

    /// Mudança manual de status (só a equipe chega aqui).
    pub async fn change_status(&self, id: Uuid, next: TicketStatus) -> Result<Ticket, AppError> {
        let mut tx = self.pool.begin().await?;

        let current = self
            .ticket_repo
            .lock_ticket(&mut *tx, id)
            .await?
            .ok_or(AppError::NotFound("ticket"))?;

        if current.status == next {
            return Ok(current);
        }
        if !current.status.can_change_to(next) {
            return Err(AppError::InvalidStatusTransition {
                from: current.status.as_str().to_string(),
                to: next.as_str().to_string(),
            });
        }

        let ticket = self.ticket_repo.set_status(&mut *tx, id, next).await?;
        tx.commit().await?;

        tracing::info!("Ticket {}: {} -> {}", ticket.ticket_no, current.status.as_str(), next.as_str());
        Ok(ticket)
    }

    pub async fn delete_ticket(&self, id: Uuid) -> Result<(), AppError> {
        let mut tx = self.pool.begin().await?;

        self.ticket_repo.delete_messages_of(&mut *tx, id).await?;
        if !self.ticket_repo.delete_ticket(&mut *tx, id).await? {
            return Err(AppError::NotFound("ticket"));
        }

        tx.commit().await?;
        Ok(())
    }

    // =========================================================================
    //  MENSAGENS
    // =========================================================================

    pub async fn list_messages(&self, user: &User, ticket_id: Uuid) -> Result<Vec<Message>, AppError> {
        self.get_ticket(user, ticket_id).await?;
        self.ticket_repo.list_messages(ticket_id).await
    }

    /// Grava a mensagem e aplica a transição automática de status pela resposta.
    pub async fn add_message(&self, user: &User, ticket_id: Uuid, body: &str) -> Result<MessageResponse, AppError> {
        let mut tx = self.pool.begin().await?;

        let ticket = self
            .ticket_repo
            .lock_ticket(&mut *tx, ticket_id)
            .await?
            .ok_or(AppError::NotFound("ticket"))?;
        ensure_visible(user, &ticket)?;

        let next = ticket.status.after_reply(user.role).ok_or(AppError::TicketClosed)?;

        let message = self
            .ticket_repo
            .insert_message(&mut *tx, ticket_id, user.id, body.trim())
            .await?;
        if next != ticket.status {
            self.ticket_repo.set_status(&mut *tx, ticket_id, next).await?;
        }

        tx.commit().await?;
        Ok(MessageResponse { message, ticket_status: next })
    }
}

/// `None` = sem restrição (equipe); `Some(id)` = só o cliente do usuário.
fn customer_scope(user: &User) -> Result<Option<Uuid>, AppError> {
    if user.role.is_staff() {
        return Ok(None);
    }
    user.customer_id.map(Some).ok_or(AppError::Forbidden)
}

// Ticket de outro cliente aparece como inexistente
fn ensure_visible(user: &User, ticket: &Ticket) -> Result<(), AppError> {
    match customer_scope(user)? {
        Some(customer_id) if customer_id != ticket.customer_id => Err(AppError::NotFound("ticket")),
        _ => Ok(()),
    }
}

fn ticket_customer(user: &User, requested: Option<Uuid>) -> Result<Uuid, AppError> {
    match customer_scope(user)? {
        Some(own) => Ok(own),
        None => requested.ok_or(AppError::BusinessRule("ticket_customer_required")),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{auth::UserRole, ticket::TicketPriority};

    fn user(role: UserRole, customer_id: Option<Uuid>) -> User {
        User {
            id: Uuid::new_v4(),
            name: "Asha".into(),
            email: "asha@example.com".into(),
            password_hash: String::new(),
            role,
            department_id: None,
            customer_id,
            is_active: true,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    fn ticket(customer_id: Uuid) -> Ticket {
        Ticket {
            id: Uuid::new_v4(),
            ticket_no: "ENPL-TKT-0325-00001".into(),
            customer_id,
            site_id: None,
            title: "Link down".into(),
            description: "No connectivity".into(),
            priority: TicketPriority::High,
            status: TicketStatus::Open,
            assigned_to: None,
            created_by: Uuid::new_v4(),
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    #[test]
    fn staff_sees_every_customer() {
        let staff = user(UserRole::Staff, None);
        assert_eq!(customer_scope(&staff).unwrap(), None);
        assert!(ensure_visible(&staff, &ticket(Uuid::new_v4())).is_ok());
    }

    #[test]
    fn customer_only_sees_own_tickets() {
        let own = Uuid::new_v4();
        let portal = user(UserRole::Customer, Some(own));

        assert!(ensure_visible(&portal, &ticket(own)).is_ok());
        assert!(matches!(
            ensure_visible(&portal, &ticket(Uuid::new_v4())),
            Err(AppError::NotFound("ticket"))
        ));
    }

    #[test]
    fn customer_user_without_customer_is_forbidden() {
        let orphan = user(UserRole::Customer, None);
        assert!(matches!(customer_scope(&orphan), Err(AppError::Forbidden)));
    }

    #[test]
    fn ticket_customer_comes_from_user_or_payload() {
        let own = Uuid::new_v4();
        let portal = user(UserRole::Customer, Some(own));
        // O cliente não consegue abrir ticket em nome de outro
        assert_eq!(ticket_customer(&portal, Some(Uuid::new_v4())).unwrap(), own);

        let staff = user(UserRole::Admin, None);
        let target = Uuid::new_v4();
        assert_eq!(ticket_customer(&staff, Some(target)).unwrap(), target);
        assert!(matches!(
            ticket_customer(&staff, None),
            Err(AppError::BusinessRule("ticket_customer_required"))
        ));
    }
}
