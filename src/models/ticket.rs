// src/models/ticket.rs

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::{IntoParams, ToSchema};
use uuid::Uuid;
use validator::Validate;

use crate::common::validation::validate_not_blank;
use crate::models::auth::UserRole;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type, ToSchema)]
#[sqlx(type_name = "ticket_status", rename_all = "SCREAMING_SNAKE_CASE")]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum TicketStatus {
    Open,
    InProgress,
    OnHold, // Aguardando retorno do cliente
    Resolved,
    Closed,
}

impl TicketStatus {
    pub const ALL: [TicketStatus; 5] = [
        TicketStatus::Open,
        TicketStatus::InProgress,
        TicketStatus::OnHold,
        TicketStatus::Resolved,
        TicketStatus::Closed,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            TicketStatus::Open => "OPEN",
            TicketStatus::InProgress => "IN_PROGRESS",
            TicketStatus::OnHold => "ON_HOLD",
            TicketStatus::Resolved => "RESOLVED",
            TicketStatus::Closed => "CLOSED",
        }
    }

    /// Ainda na fila de atendimento.
    pub fn is_pending(self) -> bool {
        matches!(self, TicketStatus::Open | TicketStatus::InProgress | TicketStatus::OnHold)
    }

    /// Novo status depois de uma mensagem de `sender`.
    /// `None` = ticket fechado, mensagem recusada.
    pub fn after_reply(self, sender: UserRole) -> Option<TicketStatus> {
        if self == TicketStatus::Closed {
            return None;
        }

        let next = if sender.is_staff() {
            match self {
                TicketStatus::Open => TicketStatus::InProgress,
                other => other,
            }
        } else {
            match self {
                TicketStatus::Resolved => TicketStatus::Open, // Reaberto pelo cliente
                TicketStatus::OnHold => TicketStatus::InProgress,
                other => other,
            }
        };

        Some(next)
    }

    /// Mudança manual de status. Fechado só volta para aberto.
    pub fn can_change_to(self, next: TicketStatus) -> bool {
        match self {
            TicketStatus::Closed => matches!(next, TicketStatus::Closed | TicketStatus::Open),
            _ => true,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type, ToSchema)]
#[sqlx(type_name = "ticket_priority", rename_all = "SCREAMING_SNAKE_CASE")]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum TicketPriority {
    Low,
    Medium,
    High,
    Critical,
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Ticket {
    pub id: Uuid,
    #[schema(example = "ENPL-TKT-0125-00001")]
    pub ticket_no: String,
    pub customer_id: Uuid,
    pub site_id: Option<Uuid>,
    #[schema(example = "Core switch down")]
    pub title: String,
    pub description: String,
    pub priority: TicketPriority,
    pub status: TicketStatus,
    pub assigned_to: Option<Uuid>,
    pub created_by: Uuid,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Message {
    pub id: Uuid,
    pub ticket_id: Uuid,
    pub sender_id: Uuid,
    pub body: String,
    pub created_at: DateTime<Utc>,
}

// Resposta do POST de mensagem: a mensagem + o status do ticket depois dela
#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct MessageResponse {
    pub message: Message,
    pub ticket_status: TicketStatus,
}

// ---
// Payloads
// ---

#[derive(Debug, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CreateTicketPayload {
    // Obrigatório para a equipe; usuários CUSTOMER abrem sempre no próprio cliente
    pub customer_id: Option<Uuid>,
    pub site_id: Option<Uuid>,
    #[validate(length(min = 1, max = 200, message = "title_required"), custom(function = "validate_not_blank"))]
    pub title: String,
    #[validate(length(min = 1, message = "description_required"), custom(function = "validate_not_blank"))]
    pub description: String,
    pub priority: Option<TicketPriority>,
}

#[derive(Debug, Default, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UpdateTicketPayload {
    #[validate(length(min = 1, max = 200, message = "title_required"), custom(function = "validate_not_blank"))]
    pub title: Option<String>,
    #[validate(length(min = 1, message = "description_required"), custom(function = "validate_not_blank"))]
    pub description: Option<String>,
    pub priority: Option<TicketPriority>,
    pub site_id: Option<Uuid>,
    // Só a equipe pode atribuir
    pub assigned_to: Option<Uuid>,
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct TicketStatusPayload {
    pub status: TicketStatus,
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct MessagePayload {
    #[validate(length(min = 1, max = 10000, message = "body_required"), custom(function = "validate_not_blank"))]
    #[schema(example = "Switch reiniciado, aguardando confirmação.")]
    pub body: String,
}

#[derive(Debug, Default, Deserialize, IntoParams)]
#[serde(rename_all = "camelCase")]
#[into_params(parameter_in = Query)]
pub struct TicketQuery {
    pub status: Option<TicketStatus>,
    pub customer_id: Option<Uuid>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn staff_reply_starts_work_on_open_ticket() {
        assert_eq!(TicketStatus::Open.after_reply(UserRole::Staff), Some(TicketStatus::InProgress));
        assert_eq!(TicketStatus::Open.after_reply(UserRole::Admin), Some(TicketStatus::InProgress));
    }

    #[test]
    fn staff_reply_keeps_other_states() {
        for status in [TicketStatus::InProgress, TicketStatus::OnHold, TicketStatus::Resolved] {
            assert_eq!(status.after_reply(UserRole::Staff), Some(status));
        }
    }

    #[test]
    fn customer_reply_reopens_resolved_ticket() {
        assert_eq!(TicketStatus::Resolved.after_reply(UserRole::Customer), Some(TicketStatus::Open));
    }

    #[test]
    fn customer_reply_resumes_ticket_on_hold() {
        assert_eq!(TicketStatus::OnHold.after_reply(UserRole::Customer), Some(TicketStatus::InProgress));
        assert_eq!(TicketStatus::Open.after_reply(UserRole::Customer), Some(TicketStatus::Open));
        assert_eq!(TicketStatus::InProgress.after_reply(UserRole::Customer), Some(TicketStatus::InProgress));
    }

    #[test]
    fn closed_ticket_rejects_replies() {
        assert_eq!(TicketStatus::Closed.after_reply(UserRole::Customer), None);
        assert_eq!(TicketStatus::Closed.after_reply(UserRole::Admin), None);
    }

    #[test]
    fn closed_ticket_only_reopens() {
        for next in TicketStatus::ALL {
            let allowed = TicketStatus::Closed.can_change_to(next);
            assert_eq!(allowed, matches!(next, TicketStatus::Open | TicketStatus::Closed), "{next:?}");
        }
        assert!(TicketStatus::Open.can_change_to(TicketStatus::Closed));
        assert!(TicketStatus::Resolved.can_change_to(TicketStatus::InProgress));
    }

    #[test]
    fn whitespace_only_text_is_rejected() {
        let message = MessagePayload { body: "   \n ".to_string() };
        assert!(message.validate().is_err());
        assert!(MessagePayload { body: " oi ".to_string() }.validate().is_ok());

        let update = UpdateTicketPayload { title: Some("  ".to_string()), ..Default::default() };
        assert!(update.validate().is_err());
    }

    #[test]
    fn pending_states() {
        let pending: Vec<_> = TicketStatus::ALL.into_iter().filter(|s| s.is_pending()).collect();
        assert_eq!(pending, vec![TicketStatus::Open, TicketStatus::InProgress, TicketStatus::OnHold]);
    }
}
