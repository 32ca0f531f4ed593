//! Dispatch of validated webhook events to their sync flows.

use std::sync::Arc;

use serde_json::Value;

use deskbridge_core::types::{ChatIds, Contact};
use deskbridge_store::{ChatPlatform, RecordStore};

use crate::contact::ContactResolver;
use crate::error::ServiceResult;
use crate::event::{
    ContactCreated, ConversationStatus, ConversationStatusChanged, MessageUpdated, WebhookEvent,
};
use crate::lifecycle::{SyncOptions, TicketLifecycle};

/// Top-level entry point: one call per webhook delivery.
#[derive(Clone)]
pub struct EventRouter {
    store: Arc<dyn RecordStore>,
    chat: Arc<dyn ChatPlatform>,
    resolver: ContactResolver,
    lifecycle: TicketLifecycle,
}

impl EventRouter {
    #[must_use]
    pub fn new(
        store: Arc<dyn RecordStore>,
        chat: Arc<dyn ChatPlatform>,
        options: SyncOptions,
    ) -> Self {
        Self {
            resolver: ContactResolver::new(store.clone()),
            lifecycle: TicketLifecycle::new(store.clone(), chat.clone(), options),
            store,
            chat,
        }
    }

    #[must_use]
    pub fn lifecycle(&self) -> &TicketLifecycle {
        &self.lifecycle
    }

    /// ## Summary
    /// Validates a raw webhook body and runs the matching flow.
    ///
    /// ## Errors
    /// Only validation fails the delivery; see [`WebhookEvent::from_json`].
    pub async fn handle_json(&self, body: &Value) -> ServiceResult<()> {
        match WebhookEvent::from_json(body)? {
            Some(event) => self.handle(&event).await,
            None => tracing::debug!("Webhook without event tag ignored"),
        }
        Ok(())
    }

    /// ## Summary
    /// Runs the flow for `event`.
    ///
    /// Every step is best effort: a failed record store or chat platform call
    /// is logged and the steps that depend on its result are skipped.
    #[tracing::instrument(skip_all, fields(event = %event.kind()))]
    pub async fn handle(&self, event: &WebhookEvent) {
        match event {
            WebhookEvent::ContactCreated(created) => self.on_contact_created(created).await,
            WebhookEvent::MessageUpdated(message) => self.on_message_updated(message).await,
            WebhookEvent::ConversationStatusChanged(changed) => {
                self.on_status_changed(changed).await;
            }
            WebhookEvent::Ignored { reason, .. } => {
                tracing::debug!(%reason, "Event needs no sync");
            }
        }
    }

    async fn on_contact_created(&self, created: &ContactCreated) {
        let fields = created.contact_fields();
        let ids = created.chat_ids();

        let Some(contact) = self.resolver.resolve_or_create(&fields).await else {
            tracing::warn!(chat_contact_id = ids.contact_id, "No contact card; flow aborted");
            return;
        };

        self.link_contact(&contact, &ids).await;

        let Some(ticket) = self.lifecycle.create_ticket(&contact.id, &fields).await else {
            return;
        };

        let contact_url = match self.chat.get_contact_external_url(&ids).await {
            Ok(Some(url)) => url,
            Ok(None) => self.store.contact_url(&contact.id),
            Err(e) => {
                tracing::warn!(error = %e, "Failed to read contact link back");
                self.store.contact_url(&contact.id)
            }
        };
        self.lifecycle.notify(&contact_url, &ticket, &ids).await;
    }

    /// Cross-links the contact card and the chat-platform contact. Both halves are best effort.
    async fn link_contact(&self, contact: &Contact, ids: &ChatIds) {
        if let Err(e) = self.store.link_contact_external_ids(&contact.id, ids).await {
            tracing::warn!(error = %e, contact_id = %contact.id, "Failed to store chat ids on contact");
        }

        let url = self.store.contact_url(&contact.id);
        if let Err(e) = self.chat.set_contact_external_url(ids, &url).await {
            tracing::warn!(error = %e, contact_id = %contact.id, "Failed to link chat contact");
        }
    }

    async fn on_message_updated(&self, message: &MessageUpdated) {
        let ids = message.chat_ids();
        let ticket_id = match self
            .lifecycle
            .current_ticket(&message.conversation.meta.sender, &ids)
            .await
        {
            Ok(ticket_id) => ticket_id,
            Err(e) => {
                tracing::warn!(error = %e, "No ticket for conversation; sync skipped");
                return;
            }
        };

        match message.sender_name() {
            Some(sender) => {
                if let Err(e) = self.lifecycle.update_assignee(&ticket_id, &sender).await {
                    tracing::warn!(error = %e, "Assignee sync failed");
                }
            }
            None => tracing::debug!("Outgoing message without sender name"),
        }

        if let Err(e) = self
            .lifecycle
            .update_source(&ticket_id, message.conversation.channel.as_deref())
            .await
        {
            tracing::warn!(error = %e, "Channel sync failed");
        }
    }

    async fn on_status_changed(&self, changed: &ConversationStatusChanged) {
        let outcome = match changed.status {
            ConversationStatus::Resolved => self.lifecycle.resolve_ticket(changed).await.map(drop),
            ConversationStatus::Open => self.lifecycle.reopen_conversation(changed).await.map(drop),
            ref other => {
                tracing::debug!(%other, "Status change ignored");
                Ok(())
            }
        };
        if let Err(e) = outcome {
            tracing::error!(error = %e, status = %changed.status, "Status sync failed");
        }
    }
}
