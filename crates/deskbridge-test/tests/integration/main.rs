#![allow(clippy::unused_async)]
//! Integration tests for the webhook endpoint.
//!
//! Requests go through the full salvo router against the in-memory record
//! store and chat platform, so each test can inspect every write.

mod helpers;
mod webhooks;
