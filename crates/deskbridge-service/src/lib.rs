//! Event-driven synchronization from chat-platform webhooks into the record store.
//!
//! [`router::EventRouter`] is the entry point; it composes contact resolution,
//! ticket lifecycle management, and the channel/operator lookups.

pub mod channel;
pub mod contact;
pub mod error;
pub mod event;
pub mod lifecycle;
pub mod operator;
pub mod router;

#[cfg(test)]
pub(crate) mod test_support;

pub use router::EventRouter;
