//! Shared fixtures for the service unit tests.

use std::collections::HashSet;
use std::sync::Arc;

use async_trait::async_trait;
use serde_json::{Value, json};
use tokio::sync::Barrier;

use deskbridge_core::config::AssigneePolicy;
use deskbridge_core::types::{
    ChannelId, ChatIds, Contact, ContactId, NewContact, NewTicket, OperatorId, Ticket, TicketId,
    TicketStatus,
};
use deskbridge_store::error::{StoreError, StoreResult};
use deskbridge_store::memory::{InMemoryChatPlatform, InMemoryRecordStore, StoreOp};
use deskbridge_store::{ChatPlatform, RecordStore};

use crate::lifecycle::SyncOptions;

pub const ACCOUNT_ID: i64 = 7;
pub const LINK_ATTRIBUTE: &str = "airtable";

pub fn options(assignee_policy: AssigneePolicy) -> SyncOptions {
    SyncOptions {
        timezone: chrono_tz::Asia::Tbilisi,
        assignee_policy,
        link_attribute: LINK_ATTRIBUTE.to_string(),
    }
}

pub fn memory_store() -> Arc<InMemoryRecordStore> {
    Arc::new(
        InMemoryRecordStore::new()
            .with_channels(["Telegram", "WhatsApp", "Website"])
            .with_operators(["Nino", "Giorgi"]),
    )
}

pub fn contact_created_body(contact_id: i64, phone: Option<&str>, name: &str) -> Value {
    json!({
        "event": "contact_created",
        "id": contact_id,
        "name": name,
        "phone_number": phone,
        "identifier": null,
        "additional_attributes": {},
        "account": { "id": ACCOUNT_ID, "name": "Support" }
    })
}

pub fn message_updated_body(
    direction: &str,
    sender: &str,
    channel: &str,
    contact_id: i64,
    contact_url: Option<&str>,
) -> Value {
    json!({
        "event": "message_updated",
        "id": 501,
        "content": "Hello",
        "message_type": direction,
        "sender": { "id": 12, "name": sender, "type": "user" },
        "account": { "id": ACCOUNT_ID },
        "conversation": {
            "id": 90,
            "channel": channel,
            "meta": {
                "sender": {
                    "id": contact_id,
                    "custom_attributes": contact_url
                        .map(|url| json!({ LINK_ATTRIBUTE: url }))
                        .unwrap_or_else(|| json!({}))
                }
            }
        }
    })
}

pub fn status_changed_body(status: &str, contact_id: i64, contact_url: Option<&str>) -> Value {
    json!({
        "event": "conversation_status_changed",
        "id": 90,
        "status": status,
        "channel": "Channel::Telegram",
        "messages": [{ "id": 600, "account_id": ACCOUNT_ID }],
        "meta": {
            "sender": {
                "id": contact_id,
                "custom_attributes": contact_url
                    .map(|url| json!({ LINK_ATTRIBUTE: url }))
                    .unwrap_or_else(|| json!({}))
            }
        }
    })
}

pub fn chat_ids(contact_id: i64) -> ChatIds {
    ChatIds {
        account_id: ACCOUNT_ID,
        contact_id,
        conversation_id: None,
    }
}

/// Seeds a contact with one `New` ticket and returns both.
pub fn seed_contact_with_ticket(store: &InMemoryRecordStore, phone: &str) -> (Contact, Ticket) {
    let contact = store.seed_contact(NewContact {
        phone: Some(phone.to_string()),
        whatsapp: Some(phone.to_string()),
        ..NewContact::default()
    });
    let ticket = store.seed_ticket(NewTicket {
        created_on: chrono::NaiveDate::from_ymd_opt(2024, 1, 15).unwrap_or_default(),
        contacts: vec![contact.id.clone()],
        status: TicketStatus::New,
        fallback_name: Some(phone.to_string()),
    });
    (contact, ticket)
}

/// Record store wrapper that fails selected calls and can hold `list_contacts`
/// at a barrier until every concurrent flow has listed.
pub struct FaultyStore {
    pub inner: Arc<InMemoryRecordStore>,
    failing: HashSet<StoreOp>,
    list_gate: Option<Arc<Barrier>>,
}

impl FaultyStore {
    pub fn new(inner: Arc<InMemoryRecordStore>) -> Self {
        Self {
            inner,
            failing: HashSet::new(),
            list_gate: None,
        }
    }

    pub fn failing(mut self, op: StoreOp) -> Self {
        self.failing.insert(op);
        self
    }

    pub fn with_list_gate(mut self, flows: usize) -> Self {
        self.list_gate = Some(Arc::new(Barrier::new(flows)));
        self
    }

    fn check(&self, op: StoreOp) -> StoreResult<()> {
        if self.failing.contains(&op) {
            return Err(StoreError::Status {
                service: "faulty",
                status: 503,
                body: format!("{op:?} unavailable"),
            });
        }
        Ok(())
    }
}

#[async_trait]
impl RecordStore for FaultyStore {
    fn name(&self) -> &'static str {
        "faulty"
    }

    async fn list_contacts(&self) -> StoreResult<Vec<Contact>> {
        self.check(StoreOp::ListContacts)?;
        let contacts = self.inner.list_contacts().await?;
        if let Some(gate) = &self.list_gate {
            gate.wait().await;
        }
        Ok(contacts)
    }

    async fn create_contact(&self, fields: &NewContact) -> StoreResult<Contact> {
        self.check(StoreOp::CreateContact)?;
        self.inner.create_contact(fields).await
    }

    async fn get_contact(&self, id: &ContactId) -> StoreResult<Contact> {
        self.check(StoreOp::GetContact)?;
        self.inner.get_contact(id).await
    }

    async fn link_contact_external_ids(&self, id: &ContactId, ids: &ChatIds) -> StoreResult<()> {
        self.check(StoreOp::LinkContact)?;
        self.inner.link_contact_external_ids(id, ids).await
    }

    fn contact_url(&self, id: &ContactId) -> String {
        self.inner.contact_url(id)
    }

    async fn create_ticket(&self, fields: &NewTicket) -> StoreResult<Ticket> {
        self.check(StoreOp::CreateTicket)?;
        self.inner.create_ticket(fields).await
    }

    async fn get_ticket(&self, id: &TicketId) -> StoreResult<Ticket> {
        self.check(StoreOp::GetTicket)?;
        self.inner.get_ticket(id).await
    }

    fn ticket_url(&self, ticket: &Ticket) -> String {
        self.inner.ticket_url(ticket)
    }

    async fn get_ticket_channel(&self, id: &TicketId) -> StoreResult<Option<ChannelId>> {
        self.check(StoreOp::GetTicketChannel)?;
        self.inner.get_ticket_channel(id).await
    }

    async fn update_ticket_channel(&self, id: &TicketId, channel: &ChannelId) -> StoreResult<()> {
        self.check(StoreOp::UpdateTicketChannel)?;
        self.inner.update_ticket_channel(id, channel).await
    }

    async fn update_ticket_assignee(
        &self,
        id: &TicketId,
        operator: &OperatorId,
    ) -> StoreResult<()> {
        self.check(StoreOp::UpdateTicketAssignee)?;
        self.inner.update_ticket_assignee(id, operator).await
    }

    async fn update_ticket_status(&self, id: &TicketId, status: TicketStatus) -> StoreResult<()> {
        self.check(StoreOp::UpdateTicketStatus)?;
        self.inner.update_ticket_status(id, status).await
    }

    async fn resolve_channel_id(&self, name: &str) -> StoreResult<Option<ChannelId>> {
        self.check(StoreOp::ResolveChannel)?;
        self.inner.resolve_channel_id(name).await
    }

    async fn resolve_operator_id(&self, name: &str) -> StoreResult<Option<OperatorId>> {
        self.check(StoreOp::ResolveOperator)?;
        self.inner.resolve_operator_id(name).await
    }
}

pub fn chat() -> Arc<InMemoryChatPlatform> {
    Arc::new(InMemoryChatPlatform::new())
}

pub fn as_chat(chat: &Arc<InMemoryChatPlatform>) -> Arc<dyn ChatPlatform> {
    chat.clone()
}

pub fn as_store(store: &Arc<InMemoryRecordStore>) -> Arc<dyn RecordStore> {
    store.clone()
}
