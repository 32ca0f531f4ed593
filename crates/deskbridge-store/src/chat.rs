use async_trait::async_trait;

use deskbridge_core::types::ChatIds;

use crate::error::StoreResult;

/// Chat-platform calls made by the sync: contact back-links and private notes.
#[async_trait]
pub trait ChatPlatform: Send + Sync {
    /// Stores the record-store URL of the contact card on the chat-platform contact
    /// and marks the contact as linked.
    async fn set_contact_external_url(&self, ids: &ChatIds, url: &str) -> StoreResult<()>;

    /// Reads back the URL written by [`ChatPlatform::set_contact_external_url`].
    async fn get_contact_external_url(&self, ids: &ChatIds) -> StoreResult<Option<String>>;

    /// Posts an operator-only note pointing at the contact card and ticket.
    async fn send_private_note(
        &self,
        contact_url: &str,
        ticket_url: &str,
        ids: &ChatIds,
    ) -> StoreResult<()>;
}

/// Text of the private note posted after a ticket is opened.
#[must_use]
pub fn note_content(contact_url: &str, ticket_url: &str) -> String {
    format!("Contact card: {contact_url}\nTicket: {ticket_url}")
}
