use async_trait::async_trait;

use deskbridge_core::types::{
    ChannelId, ChatIds, Contact, ContactId, NewContact, NewTicket, OperatorId, Ticket, TicketId,
    TicketStatus,
};

use crate::error::StoreResult;

/// Tabular backend holding contacts, tickets, and the channel/operator vocabularies.
///
/// Implementations own their concurrency discipline; callers issue one call at a
/// time per flow and never hold results across flows.
#[async_trait]
pub trait RecordStore: Send + Sync {
    /// Short name used when the chat platform links back to this store.
    fn name(&self) -> &'static str;

    /// Every contact card in insertion order. Only the first page is returned.
    async fn list_contacts(&self) -> StoreResult<Vec<Contact>>;

    async fn create_contact(&self, fields: &NewContact) -> StoreResult<Contact>;

    async fn get_contact(&self, id: &ContactId) -> StoreResult<Contact>;

    /// Records the chat-platform account and contact ids on the card.
    async fn link_contact_external_ids(&self, id: &ContactId, ids: &ChatIds) -> StoreResult<()>;

    /// Operator-facing link to a contact card.
    fn contact_url(&self, id: &ContactId) -> String;

    /// Inverse of [`RecordStore::contact_url`].
    fn contact_id_from_url(&self, url: &str) -> Option<ContactId> {
        url.trim_end_matches('/')
            .rsplit('/')
            .next()
            .filter(|segment| !segment.is_empty() && !segment.contains(':'))
            .map(ContactId::from)
    }

    /// Creates a ticket row; linked contacts gain the new ticket in their reference list.
    async fn create_ticket(&self, fields: &NewTicket) -> StoreResult<Ticket>;

    async fn get_ticket(&self, id: &TicketId) -> StoreResult<Ticket>;

    /// Operator-facing link to a ticket.
    fn ticket_url(&self, ticket: &Ticket) -> String;

    async fn get_ticket_channel(&self, id: &TicketId) -> StoreResult<Option<ChannelId>>;

    async fn update_ticket_channel(&self, id: &TicketId, channel: &ChannelId) -> StoreResult<()>;

    async fn update_ticket_assignee(&self, id: &TicketId, operator: &OperatorId)
    -> StoreResult<()>;

    async fn update_ticket_status(&self, id: &TicketId, status: TicketStatus) -> StoreResult<()>;

    /// Looks up a channel row by its canonical name.
    async fn resolve_channel_id(&self, name: &str) -> StoreResult<Option<ChannelId>>;

    /// Looks up an operator row by display name.
    async fn resolve_operator_id(&self, name: &str) -> StoreResult<Option<OperatorId>>;
}
