//! HTTP surface of the webhook sync: salvo routes, depot handlers, and startup wiring.

pub mod app;
pub mod config;
pub mod error;
pub mod sync_handler;
