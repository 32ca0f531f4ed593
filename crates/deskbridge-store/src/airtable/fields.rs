//! Column names of the Airtable base and conversions between rows and domain records.

use chrono::NaiveDate;
use serde::Deserialize;
use serde_json::{Map, Value, json};

use deskbridge_core::types::{
    ChannelId, Contact, ContactId, NewContact, NewTicket, OperatorId, Ticket, TicketId,
    TicketStatus,
};

use crate::error::{StoreError, StoreResult};

pub mod contact {
    pub const NAME: &str = "Name";
    pub const PHONE: &str = "Phone";
    pub const TELEGRAM: &str = "Telegram";
    pub const WHATSAPP: &str = "WhatsApp";
    pub const IDENTIFIER: &str = "Identifier";
    pub const CHAT_ACCOUNT_ID: &str = "Chatwoot Account ID";
    pub const CHAT_CONTACT_ID: &str = "Chatwoot Contact ID";
    pub const TICKETS: &str = "Tickets";
}

pub mod ticket {
    pub const DATE: &str = "Date";
    pub const CONTACTS: &str = "Contacts";
    pub const STATUS: &str = "Status";
    pub const ASSIGNEE: &str = "Assignee";
    pub const CHANNEL: &str = "Channel";
    pub const FALLBACK_NAME: &str = "Contact Name";
}

/// Display-name column of the channel and operator vocabulary tables.
pub const VOCABULARY_NAME: &str = "Name";

pub const DATE_FORMAT: &str = "%Y-%m-%d";

/// A single row as returned by the REST API.
#[derive(Debug, Clone, Deserialize)]
pub struct AirtableRecord {
    pub id: String,
    #[serde(default)]
    pub fields: Map<String, Value>,
}

/// One page of a list request.
#[derive(Debug, Clone, Deserialize)]
pub struct RecordPage {
    pub records: Vec<AirtableRecord>,
    pub offset: Option<String>,
}

fn text(fields: &Map<String, Value>, key: &str) -> Option<String> {
    match fields.get(key)? {
        Value::String(s) if !s.trim().is_empty() => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    }
}

fn number(fields: &Map<String, Value>, key: &str) -> Option<i64> {
    match fields.get(key)? {
        Value::Number(n) => n.as_i64(),
        Value::String(s) => s.trim().parse().ok(),
        _ => None,
    }
}

/// Linked-record columns hold an array of record ids.
fn links(fields: &Map<String, Value>, key: &str) -> Vec<String> {
    fields
        .get(key)
        .and_then(Value::as_array)
        .map(|ids| {
            ids.iter()
                .filter_map(Value::as_str)
                .map(str::to_string)
                .collect()
        })
        .unwrap_or_default()
}

fn first_link(fields: &Map<String, Value>, key: &str) -> Option<String> {
    links(fields, key).into_iter().next()
}

#[must_use]
pub fn decode_contact(record: AirtableRecord) -> Contact {
    let fields = &record.fields;
    Contact {
        name: text(fields, contact::NAME),
        phone: text(fields, contact::PHONE),
        telegram: text(fields, contact::TELEGRAM),
        whatsapp: text(fields, contact::WHATSAPP),
        identifier: text(fields, contact::IDENTIFIER),
        chat_account_id: number(fields, contact::CHAT_ACCOUNT_ID),
        chat_contact_id: number(fields, contact::CHAT_CONTACT_ID),
        ticket_refs: links(fields, contact::TICKETS)
            .into_iter()
            .map(TicketId::from)
            .collect(),
        id: ContactId::from(record.id),
    }
}

/// ## Summary
/// Converts a tickets-table row into a [`Ticket`].
///
/// ## Errors
/// Returns `StoreError::MalformedRecord` if the date or status column is missing or unparseable.
pub fn decode_ticket(record: AirtableRecord) -> StoreResult<Ticket> {
    let fields = &record.fields;
    let malformed = |reason: String| StoreError::MalformedRecord {
        id: record.id.clone(),
        reason,
    };

    let created_on = text(fields, ticket::DATE)
        .ok_or_else(|| malformed(format!("missing {}", ticket::DATE)))
        .and_then(|raw| {
            NaiveDate::parse_from_str(&raw, DATE_FORMAT)
                .map_err(|e| malformed(format!("bad {} {raw:?}: {e}", ticket::DATE)))
        })?;

    let status = text(fields, ticket::STATUS)
        .ok_or_else(|| malformed(format!("missing {}", ticket::STATUS)))
        .and_then(|raw| raw.parse::<TicketStatus>().map_err(|e| malformed(e.to_string())))?;

    Ok(Ticket {
        created_on,
        status,
        contacts: links(fields, ticket::CONTACTS)
            .into_iter()
            .map(ContactId::from)
            .collect(),
        assignee: first_link(fields, ticket::ASSIGNEE).map(OperatorId::from),
        channel: first_link(fields, ticket::CHANNEL).map(ChannelId::from),
        fallback_name: text(fields, ticket::FALLBACK_NAME),
        id: TicketId::from(record.id.clone()),
    })
}

/// Column values for a new contact row; absent fields are left out entirely.
#[must_use]
pub fn encode_new_contact(fields: &NewContact) -> Value {
    let mut out = Map::new();
    let columns = [
        (contact::NAME, &fields.name),
        (contact::PHONE, &fields.phone),
        (contact::TELEGRAM, &fields.telegram),
        (contact::WHATSAPP, &fields.whatsapp),
        (contact::IDENTIFIER, &fields.identifier),
    ];
    for (column, value) in columns {
        if let Some(value) = value {
            out.insert(column.to_string(), Value::String(value.clone()));
        }
    }
    Value::Object(out)
}

#[must_use]
pub fn encode_new_ticket(fields: &NewTicket) -> Value {
    let mut out = Map::new();
    out.insert(
        ticket::DATE.to_string(),
        json!(fields.created_on.format(DATE_FORMAT).to_string()),
    );
    out.insert(
        ticket::CONTACTS.to_string(),
        json!(
            fields
                .contacts
                .iter()
                .map(ContactId::as_str)
                .collect::<Vec<_>>()
        ),
    );
    out.insert(ticket::STATUS.to_string(), json!(fields.status.as_str()));
    if let Some(name) = &fields.fallback_name {
        out.insert(ticket::FALLBACK_NAME.to_string(), json!(name));
    }
    Value::Object(out)
}

/// Builds a `fields` object from column/value pairs.
#[must_use]
pub fn columns<const N: usize>(pairs: [(&str, Value); N]) -> Value {
    Value::Object(
        pairs
            .into_iter()
            .map(|(column, value)| (column.to_string(), value))
            .collect(),
    )
}

/// Escapes a value for use inside a single-quoted formula string literal.
#[must_use]
pub fn formula_literal(value: &str) -> String {
    format!("'{}'", value.replace('\\', "\\\\").replace('\'', "\\'"))
}
