//! Ticket creation and the mutations driven by conversation events.

use std::sync::Arc;

use chrono::{DateTime, NaiveDate, Utc};
use chrono_tz::Tz;

use deskbridge_core::config::{AssigneePolicy, Settings};
use deskbridge_core::types::{
    Channel, ChatIds, Contact, ContactId, NewContact, NewTicket, OperatorId, Ticket, TicketId,
    TicketStatus,
};
use deskbridge_store::{ChatPlatform, RecordStore};

use crate::channel::map_channel;
use crate::error::{ServiceError, ServiceResult};
use crate::event::{ContactRef, ConversationStatusChanged};
use crate::operator::OperatorDirectory;

/// Runtime knobs for the sync flows.
#[derive(Debug, Clone)]
pub struct SyncOptions {
    /// Zone whose civil date stamps new tickets.
    pub timezone: Tz,
    pub assignee_policy: AssigneePolicy,
    /// Chat-platform contact attribute holding the contact card URL.
    pub link_attribute: String,
}

impl SyncOptions {
    #[must_use]
    pub fn from_settings(settings: &Settings) -> Self {
        Self {
            timezone: settings.sync.timezone,
            assignee_policy: settings.sync.assignee_policy,
            link_attribute: settings.chatwoot.link_attribute.clone(),
        }
    }
}

/// Civil date of `now` in `tz`.
#[must_use]
pub fn creation_date(now: DateTime<Utc>, tz: Tz) -> NaiveDate {
    now.with_timezone(&tz).date_naive()
}

/// Label for a ticket whose contact may have no usable name: phone, then
/// identifier, then display name.
#[must_use]
pub fn fallback_name(fields: &NewContact) -> Option<String> {
    fields
        .phone
        .clone()
        .or_else(|| fields.identifier.clone())
        .or_else(|| fields.name.clone())
}

/// Result of [`TicketLifecycle::update_assignee`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AssigneeUpdate {
    Assigned(OperatorId),
    /// The policy kept the current assignee of a ticket in this status.
    Kept(TicketStatus),
}

/// Result of [`TicketLifecycle::update_source`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SourceUpdate {
    /// The ticket already had a channel; nothing was written.
    AlreadySet,
    /// The raw channel has no canonical mapping or no row in the channels table.
    Unmapped,
    Set(Channel),
}

/// Creates tickets and applies status, assignee, and channel changes.
#[derive(Clone)]
pub struct TicketLifecycle {
    store: Arc<dyn RecordStore>,
    chat: Arc<dyn ChatPlatform>,
    directory: OperatorDirectory,
    options: SyncOptions,
}

impl TicketLifecycle {
    #[must_use]
    pub fn new(
        store: Arc<dyn RecordStore>,
        chat: Arc<dyn ChatPlatform>,
        options: SyncOptions,
    ) -> Self {
        Self {
            directory: OperatorDirectory::new(store.clone()),
            store,
            chat,
            options,
        }
    }

    #[must_use]
    pub fn options(&self) -> &SyncOptions {
        &self.options
    }

    async fn open_ticket(
        &self,
        contact_id: &ContactId,
        fields: &NewContact,
    ) -> ServiceResult<Ticket> {
        let new_ticket = NewTicket {
            created_on: creation_date(Utc::now(), self.options.timezone),
            contacts: vec![contact_id.clone()],
            status: TicketStatus::New,
            fallback_name: fallback_name(fields),
        };
        let ticket = self.store.create_ticket(&new_ticket).await?;
        tracing::info!(ticket_id = %ticket.id, created_on = %ticket.created_on, "Ticket created");
        Ok(ticket)
    }

    /// ## Summary
    /// Creates a `New` ticket linked to `contact_id`, dated in the configured zone.
    ///
    /// Failures are logged and yield `None`.
    #[tracing::instrument(skip(self, fields), fields(contact_id = %contact_id))]
    pub async fn create_ticket(
        &self,
        contact_id: &ContactId,
        fields: &NewContact,
    ) -> Option<Ticket> {
        match self.open_ticket(contact_id, fields).await {
            Ok(ticket) => Some(ticket),
            Err(e) => {
                tracing::error!(error = %e, "Failed to create ticket");
                None
            }
        }
    }

    /// ## Summary
    /// Assigns the ticket to the operator named `sender_name`.
    ///
    /// Under [`AssigneePolicy::OnlyNew`] tickets that have left `New` keep
    /// their assignee.
    ///
    /// ## Errors
    /// Fails if the operator cannot be resolved or a record store call fails.
    #[tracing::instrument(skip(self), fields(ticket_id = %ticket_id))]
    pub async fn update_assignee(
        &self,
        ticket_id: &TicketId,
        sender_name: &str,
    ) -> ServiceResult<AssigneeUpdate> {
        if self.options.assignee_policy == AssigneePolicy::OnlyNew {
            let ticket = self.store.get_ticket(ticket_id).await?;
            if ticket.status != TicketStatus::New {
                tracing::debug!(status = %ticket.status, "Assignee kept by policy");
                return Ok(AssigneeUpdate::Kept(ticket.status));
            }
        }

        let operator = self.directory.resolve_operator(sender_name).await?;
        self.store
            .update_ticket_assignee(ticket_id, &operator)
            .await?;
        tracing::debug!(operator_id = %operator, "Assignee updated");
        Ok(AssigneeUpdate::Assigned(operator))
    }

    /// ## Summary
    /// Sets the ticket's channel from the raw chat-platform identifier, once.
    ///
    /// ## Errors
    /// Fails only if a record store call fails.
    #[tracing::instrument(skip(self), fields(ticket_id = %ticket_id))]
    pub async fn update_source(
        &self,
        ticket_id: &TicketId,
        raw_channel: Option<&str>,
    ) -> ServiceResult<SourceUpdate> {
        if self.store.get_ticket_channel(ticket_id).await?.is_some() {
            return Ok(SourceUpdate::AlreadySet);
        }

        let Some(channel) = raw_channel.and_then(map_channel) else {
            return Ok(SourceUpdate::Unmapped);
        };

        let Some(channel_id) = self.store.resolve_channel_id(channel.as_str()).await? else {
            tracing::warn!(%channel, "Channel has no row in the channels table");
            return Ok(SourceUpdate::Unmapped);
        };

        self.store
            .update_ticket_channel(ticket_id, &channel_id)
            .await?;
        tracing::debug!(%channel, "Channel set");
        Ok(SourceUpdate::Set(channel))
    }

    /// ## Summary
    /// Loads the contact card linked to a chat-platform contact.
    ///
    /// The card URL is read from the contact's custom attributes in the payload
    /// when present, otherwise fetched from the chat platform.
    ///
    /// ## Errors
    /// - `ServiceError::Resolution` if the contact is not linked or the URL does
    ///   not name a record.
    /// - `ServiceError::ExternalService` if a lookup fails.
    pub async fn contact_card(&self, sender: &ContactRef, ids: &ChatIds) -> ServiceResult<Contact> {
        let url = match sender.external_url(&self.options.link_attribute) {
            Some(url) => url,
            None => self
                .chat
                .get_contact_external_url(ids)
                .await?
                .ok_or_else(|| {
                    ServiceError::Resolution(format!(
                        "chat contact {} has no linked contact card",
                        ids.contact_id
                    ))
                })?,
        };

        let contact_id = self.store.contact_id_from_url(&url).ok_or_else(|| {
            ServiceError::Resolution(format!("cannot derive a contact id from '{url}'"))
        })?;

        Ok(self.store.get_contact(&contact_id).await?)
    }

    /// ## Summary
    /// Most recent ticket of the contact behind `sender`.
    ///
    /// ## Errors
    /// `ServiceError::Resolution` if the contact has no tickets, plus the errors
    /// of [`TicketLifecycle::contact_card`].
    pub async fn current_ticket(&self, sender: &ContactRef, ids: &ChatIds) -> ServiceResult<TicketId> {
        let card = self.contact_card(sender, ids).await?;
        card.latest_ticket().cloned().ok_or_else(|| {
            ServiceError::Resolution(format!("contact {} has no linked tickets", card.id))
        })
    }

    /// ## Summary
    /// Marks the contact's most recent ticket `Resolved`.
    ///
    /// A ticket that is already resolved is left as is.
    ///
    /// ## Errors
    /// Fails if the ticket cannot be found or a record store call fails.
    #[tracing::instrument(skip(self, payload), fields(conversation_id = payload.id))]
    pub async fn resolve_ticket(
        &self,
        payload: &ConversationStatusChanged,
    ) -> ServiceResult<TicketId> {
        let ids = payload.chat_ids()?;
        let ticket_id = self.current_ticket(&payload.meta.sender, &ids).await?;
        let ticket = self.store.get_ticket(&ticket_id).await?;

        if !ticket.status.can_advance_to(TicketStatus::Resolved) {
            tracing::debug!(ticket_id = %ticket_id, status = %ticket.status, "Ticket already resolved");
            return Ok(ticket_id);
        }

        self.store
            .update_ticket_status(&ticket_id, TicketStatus::Resolved)
            .await?;
        tracing::info!(ticket_id = %ticket_id, "Ticket resolved");
        Ok(ticket_id)
    }

    /// ## Summary
    /// Opens a new `New` ticket for the contact of a reopened conversation.
    ///
    /// The previous ticket is not touched. A private note linking the contact
    /// card and the new ticket is posted afterwards on a best-effort basis.
    ///
    /// ## Errors
    /// Fails if the contact cannot be resolved or the ticket cannot be created.
    #[tracing::instrument(skip(self, payload), fields(conversation_id = payload.id))]
    pub async fn reopen_conversation(
        &self,
        payload: &ConversationStatusChanged,
    ) -> ServiceResult<Ticket> {
        let ids = payload.chat_ids()?;
        let card = self.contact_card(&payload.meta.sender, &ids).await?;

        let fields = NewContact {
            name: card.name.clone(),
            phone: card.phone.clone(),
            identifier: card.identifier.clone(),
            ..NewContact::default()
        };
        let ticket = self.open_ticket(&card.id, &fields).await?;

        let contact_url = self.store.contact_url(&card.id);
        self.notify(&contact_url, &ticket, &ids).await;
        Ok(ticket)
    }

    /// Posts the private note for a newly opened ticket. Failures are logged.
    pub async fn notify(&self, contact_url: &str, ticket: &Ticket, ids: &ChatIds) {
        let ticket_url = self.store.ticket_url(ticket);
        if let Err(e) = self
            .chat
            .send_private_note(contact_url, &ticket_url, ids)
            .await
        {
            tracing::warn!(error = %e, ticket_id = %ticket.id, "Failed to send private note");
        }
    }
}
