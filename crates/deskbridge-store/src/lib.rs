//! Clients for the two external systems the sync talks to: the record store
//! holding contacts and tickets, and the chat platform emitting webhooks.

pub mod airtable;
pub mod chat;
pub mod chatwoot;
pub mod error;
pub mod memory;
pub mod record;

mod http;

pub use chat::ChatPlatform;
pub use record::RecordStore;
