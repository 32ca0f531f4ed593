use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::error::CoreError;

use super::ids::{ChannelId, ContactId, OperatorId, TicketId};

/// Lifecycle of a ticket. Ordering follows the only allowed direction of travel.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum TicketStatus {
    New,
    InProgress,
    Resolved,
}

impl TicketStatus {
    /// Label of the single-select option in the tickets table.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::New => "New",
            Self::InProgress => "In progress",
            Self::Resolved => "Resolved",
        }
    }

    /// Whether a ticket in this status may be moved to `next`.
    #[must_use]
    pub fn can_advance_to(self, next: Self) -> bool {
        next > self
    }
}

impl std::fmt::Display for TicketStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for TicketStatus {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "New" => Ok(Self::New),
            "In progress" => Ok(Self::InProgress),
            "Resolved" => Ok(Self::Resolved),
            other => Err(CoreError::InvalidInput(format!(
                "unknown ticket status: {other}"
            ))),
        }
    }
}

/// Fields written when a ticket row is created.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewTicket {
    pub created_on: NaiveDate,
    pub contacts: Vec<ContactId>,
    pub status: TicketStatus,
    /// Human-readable label for the contact when the linked card has no usable name.
    pub fallback_name: Option<String>,
}

/// A ticket row as stored in the record store.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Ticket {
    pub id: TicketId,
    pub created_on: NaiveDate,
    pub contacts: Vec<ContactId>,
    pub status: TicketStatus,
    pub assignee: Option<OperatorId>,
    pub channel: Option<ChannelId>,
    pub fallback_name: Option<String>,
}

impl Ticket {
    #[must_use]
    pub fn from_new(id: TicketId, fields: NewTicket) -> Self {
        Self {
            id,
            created_on: fields.created_on,
            contacts: fields.contacts,
            status: fields.status,
            assignee: None,
            channel: None,
            fallback_name: fields.fallback_name,
        }
    }
}
