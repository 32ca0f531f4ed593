//! Typed webhook events.
//!
//! Parsing happens in steps so that the failure modes stay distinct: the
//! `event` tag is checked against the supported set first
//! (`UnsupportedEvent`). Update events then have their discriminator
//! (`message_type` or `status`) read on its own, and only deliveries that
//! lead to sync work are decoded into the full schema (`MalformedPayload`).

use serde::Deserialize;
use serde::de::DeserializeOwned;
use serde_json::{Map, Value};

use deskbridge_core::types::{ChatIds, NewContact};

use crate::error::{ServiceError, ServiceResult};

/// The webhook tags this service acts on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EventKind {
    ContactCreated,
    MessageUpdated,
    ConversationStatusChanged,
}

impl EventKind {
    /// Canonical tag as sent by the chat platform.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::ContactCreated => "contact_created",
            Self::MessageUpdated => "message_updated",
            Self::ConversationStatusChanged => "conversation_status_changed",
        }
    }

    /// Accepts both `contact_created` and `contact-created` spellings.
    #[must_use]
    pub fn from_tag(tag: &str) -> Option<Self> {
        match tag.trim().replace('-', "_").as_str() {
            "contact_created" => Some(Self::ContactCreated),
            "message_updated" => Some(Self::MessageUpdated),
            "conversation_status_changed" => Some(Self::ConversationStatusChanged),
            _ => None,
        }
    }
}

impl std::fmt::Display for EventKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Trims and drops blank strings so that empty fields never take part in matching.
fn present(value: Option<&str>) -> Option<String> {
    value
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
}

#[derive(Debug, Clone, Deserialize)]
pub struct AccountRef {
    pub id: i64,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct AdditionalAttributes {
    /// Telegram handle for contacts that arrived through a Telegram inbox.
    pub username: Option<String>,
}

/// Payload of `contact_created`.
#[derive(Debug, Clone, Deserialize)]
pub struct ContactCreated {
    pub id: i64,
    pub account: AccountRef,
    pub name: Option<String>,
    pub phone_number: Option<String>,
    pub identifier: Option<String>,
    #[serde(default)]
    pub additional_attributes: AdditionalAttributes,
}

impl ContactCreated {
    /// Identifying fields for contact resolution.
    ///
    /// The WhatsApp handle mirrors the phone number: the platform does not send
    /// a separate WhatsApp id on this hook.
    #[must_use]
    pub fn contact_fields(&self) -> NewContact {
        let phone = present(self.phone_number.as_deref());
        NewContact {
            name: present(self.name.as_deref()),
            whatsapp: phone.clone(),
            phone,
            telegram: present(self.additional_attributes.username.as_deref()),
            identifier: present(self.identifier.as_deref()),
        }
    }

    #[must_use]
    pub fn chat_ids(&self) -> ChatIds {
        ChatIds {
            account_id: self.account.id,
            contact_id: self.id,
            conversation_id: None,
        }
    }
}

/// Chat-platform contact as embedded in conversation metadata.
#[derive(Debug, Clone, Deserialize)]
pub struct ContactRef {
    pub id: i64,
    #[serde(default)]
    pub custom_attributes: Map<String, Value>,
}

impl ContactRef {
    /// Record-store URL stored under `attribute`, if the contact is already linked.
    #[must_use]
    pub fn external_url(&self, attribute: &str) -> Option<String> {
        self.custom_attributes
            .get(attribute)
            .and_then(Value::as_str)
            .map(str::trim)
            .filter(|url| !url.is_empty())
            .map(str::to_string)
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct ConversationMeta {
    pub sender: ContactRef,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MessageDirection {
    Incoming,
    Outgoing,
    #[serde(other)]
    Other,
}

#[derive(Debug, Clone, Deserialize)]
pub struct MessageSender {
    pub name: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct MessageConversation {
    pub id: i64,
    pub channel: Option<String>,
    pub meta: ConversationMeta,
}

/// Payload of `message_updated`.
#[derive(Debug, Clone, Deserialize)]
pub struct MessageUpdated {
    pub account: AccountRef,
    pub message_type: MessageDirection,
    pub sender: Option<MessageSender>,
    pub conversation: MessageConversation,
}

impl MessageUpdated {
    /// Display name of the operator who sent the message.
    #[must_use]
    pub fn sender_name(&self) -> Option<String> {
        self.sender.as_ref().and_then(|s| present(s.name.as_deref()))
    }

    #[must_use]
    pub fn chat_ids(&self) -> ChatIds {
        ChatIds {
            account_id: self.account.id,
            contact_id: self.conversation.meta.sender.id,
            conversation_id: Some(self.conversation.id),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct MessageAccount {
    pub account_id: i64,
}

/// Conversation status values carried by `conversation_status_changed`.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ConversationStatus {
    Open,
    Resolved,
    Pending,
    Snoozed,
    #[serde(untagged)]
    Other(String),
}

/// Payload of `conversation_status_changed`.
#[derive(Debug, Clone, Deserialize)]
pub struct ConversationStatusChanged {
    /// Conversation id.
    pub id: i64,
    pub status: ConversationStatus,
    pub channel: Option<String>,
    #[serde(default)]
    pub messages: Vec<MessageAccount>,
    pub account: Option<AccountRef>,
    pub meta: ConversationMeta,
}

impl ConversationStatusChanged {
    /// Account id, taken from the first message and falling back to the top-level account.
    #[must_use]
    pub fn account_id(&self) -> Option<i64> {
        self.messages
            .first()
            .map(|m| m.account_id)
            .or_else(|| self.account.as_ref().map(|a| a.id))
    }

    /// ## Summary
    /// Chat-platform coordinates of the conversation's contact.
    ///
    /// ## Errors
    /// Returns `ServiceError::Resolution` if no account id is present in the payload.
    pub fn chat_ids(&self) -> ServiceResult<ChatIds> {
        let account_id = self.account_id().ok_or_else(|| {
            ServiceError::Resolution(format!("conversation {} carries no account id", self.id))
        })?;
        Ok(ChatIds {
            account_id,
            contact_id: self.meta.sender.id,
            conversation_id: Some(self.id),
        })
    }
}

impl ConversationStatus {
    /// Statuses that drive a ticket change.
    #[must_use]
    pub const fn is_actionable(&self) -> bool {
        matches!(self, Self::Open | Self::Resolved)
    }

    #[must_use]
    pub fn as_str(&self) -> &str {
        match self {
            Self::Open => "open",
            Self::Resolved => "resolved",
            Self::Pending => "pending",
            Self::Snoozed => "snoozed",
            Self::Other(raw) => raw.as_str(),
        }
    }
}

impl std::fmt::Display for ConversationStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Discriminator of `message_updated`, read before the full payload.
#[derive(Debug, Deserialize)]
struct MessageHeader {
    message_type: MessageDirection,
}

/// Discriminator of `conversation_status_changed`, read before the full payload.
#[derive(Debug, Deserialize)]
struct StatusHeader {
    status: ConversationStatus,
}

/// A validated webhook delivery.
#[derive(Debug, Clone)]
pub enum WebhookEvent {
    ContactCreated(ContactCreated),
    /// An outgoing message.
    MessageUpdated(MessageUpdated),
    /// A change to `open` or `resolved`.
    ConversationStatusChanged(ConversationStatusChanged),
    /// A supported delivery that needs no sync work, such as an incoming
    /// message or an archived conversation. Only its discriminator was checked.
    Ignored { kind: EventKind, reason: String },
}

impl WebhookEvent {
    #[must_use]
    pub const fn kind(&self) -> EventKind {
        match self {
            Self::ContactCreated(_) => EventKind::ContactCreated,
            Self::MessageUpdated(_) => EventKind::MessageUpdated,
            Self::ConversationStatusChanged(_) => EventKind::ConversationStatusChanged,
            Self::Ignored { kind, .. } => *kind,
        }
    }

    /// ## Summary
    /// Validates a raw webhook body.
    ///
    /// Returns `Ok(None)` when the `event` tag is absent or empty; such deliveries
    /// are accepted and ignored.
    ///
    /// ## Errors
    /// - `ServiceError::UnsupportedEvent` carrying the tag if it is not one this service handles.
    /// - `ServiceError::MalformedPayload` if the body is not an object, the tag is not a
    ///   string, the discriminator of an update event is missing, or an event that
    ///   leads to sync work lacks the fields its flow needs.
    pub fn from_json(body: &Value) -> ServiceResult<Option<Self>> {
        let Some(object) = body.as_object() else {
            return Err(ServiceError::MalformedPayload(
                "webhook body must be a JSON object".to_string(),
            ));
        };

        let tag = match object.get("event") {
            None | Some(Value::Null) => return Ok(None),
            Some(Value::String(tag)) if tag.trim().is_empty() => return Ok(None),
            Some(Value::String(tag)) => tag,
            Some(other) => {
                return Err(ServiceError::MalformedPayload(format!(
                    "event tag must be a string, got {other}"
                )));
            }
        };

        let kind = EventKind::from_tag(tag)
            .ok_or_else(|| ServiceError::UnsupportedEvent(tag.clone()))?;

        let event = match kind {
            EventKind::ContactCreated => Self::ContactCreated(decode(kind, body)?),
            EventKind::MessageUpdated => {
                let header: MessageHeader = decode(kind, body)?;
                if header.message_type == MessageDirection::Outgoing {
                    Self::MessageUpdated(decode(kind, body)?)
                } else {
                    Self::Ignored {
                        kind,
                        reason: format!("{:?} message", header.message_type).to_lowercase(),
                    }
                }
            }
            EventKind::ConversationStatusChanged => {
                let header: StatusHeader = decode(kind, body)?;
                if header.status.is_actionable() {
                    Self::ConversationStatusChanged(decode(kind, body)?)
                } else {
                    Self::Ignored {
                        kind,
                        reason: format!("status {}", header.status),
                    }
                }
            }
        };

        Ok(Some(event))
    }
}

fn decode<T: DeserializeOwned>(kind: EventKind, body: &Value) -> ServiceResult<T> {
    T::deserialize(body).map_err(|e| ServiceError::MalformedPayload(format!("{kind}: {e}")))
}
