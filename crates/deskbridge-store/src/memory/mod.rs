//! Process-local backends used for dry runs and tests.
//!
//! Both keep every write in memory and journal each call, so a run can be
//! inspected afterwards without touching Airtable or Chatwoot.

use std::collections::HashMap;
use std::sync::{Mutex, MutexGuard};

use async_trait::async_trait;

use deskbridge_core::types::{
    ChannelId, ChatIds, Contact, ContactId, NewContact, NewTicket, OperatorId, Ticket, TicketId,
    TicketStatus,
};

use crate::chat::ChatPlatform;
use crate::error::{StoreError, StoreResult};
use crate::record::RecordStore;

/// Record-store calls, in the order they were issued.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum StoreOp {
    ListContacts,
    CreateContact,
    GetContact,
    LinkContact,
    CreateTicket,
    GetTicket,
    GetTicketChannel,
    UpdateTicketChannel,
    UpdateTicketAssignee,
    UpdateTicketStatus,
    ResolveChannel,
    ResolveOperator,
}

#[derive(Debug, Default)]
struct MemoryState {
    contacts: Vec<Contact>,
    tickets: Vec<Ticket>,
    channels: Vec<(ChannelId, String)>,
    operators: Vec<(OperatorId, String)>,
    journal: Vec<StoreOp>,
}

/// Locks a mutex and recovers from poisoning.
fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    match mutex.lock() {
        Ok(guard) => guard,
        Err(poisoned) => {
            mutex.clear_poison();
            poisoned.into_inner()
        }
    }
}

fn new_record_id() -> String {
    format!("rec{}", uuid::Uuid::new_v4().simple())
}

/// In-memory [`RecordStore`]. Contacts and tickets keep insertion order.
#[derive(Debug, Default)]
pub struct InMemoryRecordStore {
    state: Mutex<MemoryState>,
}

impl InMemoryRecordStore {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds channel vocabulary rows, one per canonical name.
    #[must_use]
    pub fn with_channels<I, S>(self, names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        {
            let mut state = lock(&self.state);
            for name in names {
                state.channels.push((ChannelId::new(new_record_id()), name.into()));
            }
        }
        self
    }

    /// Adds operator vocabulary rows, one per display name.
    #[must_use]
    pub fn with_operators<I, S>(self, names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        {
            let mut state = lock(&self.state);
            for name in names {
                state.operators.push((OperatorId::new(new_record_id()), name.into()));
            }
        }
        self
    }

    /// Inserts a contact without journaling the call.
    pub fn seed_contact(&self, fields: NewContact) -> Contact {
        let contact = Contact::from_new(ContactId::new(new_record_id()), fields);
        lock(&self.state).contacts.push(contact.clone());
        contact
    }

    /// Inserts a ticket without journaling the call; linked contacts gain the reference.
    pub fn seed_ticket(&self, fields: NewTicket) -> Ticket {
        let mut state = lock(&self.state);
        insert_ticket(&mut state, fields)
    }

    #[must_use]
    pub fn contacts(&self) -> Vec<Contact> {
        lock(&self.state).contacts.clone()
    }

    #[must_use]
    pub fn tickets(&self) -> Vec<Ticket> {
        lock(&self.state).tickets.clone()
    }

    #[must_use]
    pub fn ticket(&self, id: &TicketId) -> Option<Ticket> {
        lock(&self.state).tickets.iter().find(|t| &t.id == id).cloned()
    }

    #[must_use]
    pub fn channel_id(&self, name: &str) -> Option<ChannelId> {
        lock(&self.state)
            .channels
            .iter()
            .find(|(_, n)| n == name)
            .map(|(id, _)| id.clone())
    }

    #[must_use]
    pub fn operator_id(&self, name: &str) -> Option<OperatorId> {
        lock(&self.state)
            .operators
            .iter()
            .find(|(_, n)| n == name)
            .map(|(id, _)| id.clone())
    }

    #[must_use]
    pub fn journal(&self) -> Vec<StoreOp> {
        lock(&self.state).journal.clone()
    }

    /// Number of journaled calls of the given kind.
    #[must_use]
    pub fn count(&self, op: StoreOp) -> usize {
        lock(&self.state).journal.iter().filter(|o| **o == op).count()
    }

    fn record(&self, op: StoreOp) -> MutexGuard<'_, MemoryState> {
        let mut state = lock(&self.state);
        state.journal.push(op);
        state
    }
}

fn insert_ticket(state: &mut MemoryState, fields: NewTicket) -> Ticket {
    let ticket = Ticket::from_new(TicketId::new(new_record_id()), fields);
    for contact in &mut state.contacts {
        if ticket.contacts.contains(&contact.id) {
            contact.ticket_refs.push(ticket.id.clone());
        }
    }
    state.tickets.push(ticket.clone());
    ticket
}

fn ticket_mut<'a>(state: &'a mut MemoryState, id: &TicketId) -> StoreResult<&'a mut Ticket> {
    state
        .tickets
        .iter_mut()
        .find(|t| &t.id == id)
        .ok_or_else(|| StoreError::NotFound(format!("ticket {id}")))
}

#[async_trait]
impl RecordStore for InMemoryRecordStore {
    fn name(&self) -> &'static str {
        "memory"
    }

    async fn list_contacts(&self) -> StoreResult<Vec<Contact>> {
        Ok(self.record(StoreOp::ListContacts).contacts.clone())
    }

    async fn create_contact(&self, fields: &NewContact) -> StoreResult<Contact> {
        let mut state = self.record(StoreOp::CreateContact);
        let contact = Contact::from_new(ContactId::new(new_record_id()), fields.clone());
        state.contacts.push(contact.clone());
        tracing::debug!(contact_id = %contact.id, "Contact stored in memory");
        Ok(contact)
    }

    async fn get_contact(&self, id: &ContactId) -> StoreResult<Contact> {
        self.record(StoreOp::GetContact)
            .contacts
            .iter()
            .find(|c| &c.id == id)
            .cloned()
            .ok_or_else(|| StoreError::NotFound(format!("contact {id}")))
    }

    async fn link_contact_external_ids(&self, id: &ContactId, ids: &ChatIds) -> StoreResult<()> {
        let mut state = self.record(StoreOp::LinkContact);
        let contact = state
            .contacts
            .iter_mut()
            .find(|c| &c.id == id)
            .ok_or_else(|| StoreError::NotFound(format!("contact {id}")))?;
        contact.chat_account_id = Some(ids.account_id);
        contact.chat_contact_id = Some(ids.contact_id);
        Ok(())
    }

    fn contact_url(&self, id: &ContactId) -> String {
        format!("memory://contacts/{id}")
    }

    async fn create_ticket(&self, fields: &NewTicket) -> StoreResult<Ticket> {
        let mut state = self.record(StoreOp::CreateTicket);
        let ticket = insert_ticket(&mut state, fields.clone());
        tracing::debug!(ticket_id = %ticket.id, "Ticket stored in memory");
        Ok(ticket)
    }

    async fn get_ticket(&self, id: &TicketId) -> StoreResult<Ticket> {
        let mut state = self.record(StoreOp::GetTicket);
        Ok(ticket_mut(&mut state, id)?.clone())
    }

    fn ticket_url(&self, ticket: &Ticket) -> String {
        format!("memory://tickets/{}", ticket.id)
    }

    async fn get_ticket_channel(&self, id: &TicketId) -> StoreResult<Option<ChannelId>> {
        let mut state = self.record(StoreOp::GetTicketChannel);
        Ok(ticket_mut(&mut state, id)?.channel.clone())
    }

    async fn update_ticket_channel(&self, id: &TicketId, channel: &ChannelId) -> StoreResult<()> {
        let mut state = self.record(StoreOp::UpdateTicketChannel);
        ticket_mut(&mut state, id)?.channel = Some(channel.clone());
        Ok(())
    }

    async fn update_ticket_assignee(
        &self,
        id: &TicketId,
        operator: &OperatorId,
    ) -> StoreResult<()> {
        let mut state = self.record(StoreOp::UpdateTicketAssignee);
        ticket_mut(&mut state, id)?.assignee = Some(operator.clone());
        Ok(())
    }

    async fn update_ticket_status(&self, id: &TicketId, status: TicketStatus) -> StoreResult<()> {
        let mut state = self.record(StoreOp::UpdateTicketStatus);
        ticket_mut(&mut state, id)?.status = status;
        Ok(())
    }

    async fn resolve_channel_id(&self, name: &str) -> StoreResult<Option<ChannelId>> {
        Ok(self
            .record(StoreOp::ResolveChannel)
            .channels
            .iter()
            .find(|(_, n)| n == name)
            .map(|(id, _)| id.clone()))
    }

    async fn resolve_operator_id(&self, name: &str) -> StoreResult<Option<OperatorId>> {
        Ok(self
            .record(StoreOp::ResolveOperator)
            .operators
            .iter()
            .find(|(_, n)| n == name)
            .map(|(id, _)| id.clone()))
    }
}

/// A note posted through [`InMemoryChatPlatform`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PrivateNote {
    pub ids: ChatIds,
    pub contact_url: String,
    pub ticket_url: String,
}

#[derive(Debug, Default)]
struct ChatState {
    links: HashMap<(i64, i64), String>,
    notes: Vec<PrivateNote>,
}

/// In-memory [`ChatPlatform`] keyed by `(account_id, contact_id)`.
#[derive(Debug, Default)]
pub struct InMemoryChatPlatform {
    state: Mutex<ChatState>,
}

impl InMemoryChatPlatform {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn notes(&self) -> Vec<PrivateNote> {
        lock(&self.state).notes.clone()
    }

    #[must_use]
    pub fn external_url(&self, account_id: i64, contact_id: i64) -> Option<String> {
        lock(&self.state).links.get(&(account_id, contact_id)).cloned()
    }
}

#[async_trait]
impl ChatPlatform for InMemoryChatPlatform {
    async fn set_contact_external_url(&self, ids: &ChatIds, url: &str) -> StoreResult<()> {
        lock(&self.state)
            .links
            .insert((ids.account_id, ids.contact_id), url.to_string());
        Ok(())
    }

    async fn get_contact_external_url(&self, ids: &ChatIds) -> StoreResult<Option<String>> {
        Ok(self.external_url(ids.account_id, ids.contact_id))
    }

    async fn send_private_note(
        &self,
        contact_url: &str,
        ticket_url: &str,
        ids: &ChatIds,
    ) -> StoreResult<()> {
        tracing::info!(contact_url, ticket_url, "Private note (in memory)");
        lock(&self.state).notes.push(PrivateNote {
            ids: *ids,
            contact_url: contact_url.to_string(),
            ticket_url: ticket_url.to_string(),
        });
        Ok(())
    }
}
