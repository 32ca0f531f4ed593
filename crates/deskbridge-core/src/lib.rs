//! Shared configuration, errors, and domain types for the deskbridge workspace.

pub mod config;
pub mod constants;
pub mod error;
pub mod types;
