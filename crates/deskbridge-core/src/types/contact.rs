use serde::{Deserialize, Serialize};

use super::ids::{ContactId, TicketId};

/// Chat-platform coordinates of a contact and, when known, the conversation at hand.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatIds {
    pub account_id: i64,
    pub contact_id: i64,
    pub conversation_id: Option<i64>,
}

/// Identifying fields used to look up or create a contact card.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewContact {
    pub name: Option<String>,
    pub phone: Option<String>,
    pub telegram: Option<String>,
    pub whatsapp: Option<String>,
    pub identifier: Option<String>,
}

/// A contact card as stored in the record store.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Contact {
    pub id: ContactId,
    pub name: Option<String>,
    pub phone: Option<String>,
    pub telegram: Option<String>,
    pub whatsapp: Option<String>,
    pub identifier: Option<String>,
    pub chat_account_id: Option<i64>,
    pub chat_contact_id: Option<i64>,
    /// Linked tickets in creation order; the last one is the current ticket.
    pub ticket_refs: Vec<TicketId>,
}

impl Contact {
    /// ## Summary
    /// Builds a freshly created card from its record id and the fields it was created with.
    #[must_use]
    pub fn from_new(id: ContactId, fields: NewContact) -> Self {
        Self {
            id,
            name: fields.name,
            phone: fields.phone,
            telegram: fields.telegram,
            whatsapp: fields.whatsapp,
            identifier: fields.identifier,
            chat_account_id: None,
            chat_contact_id: None,
            ticket_refs: Vec::new(),
        }
    }

    /// Most recently linked ticket, if any.
    #[must_use]
    pub fn latest_ticket(&self) -> Option<&TicketId> {
        self.ticket_refs.last()
    }
}
