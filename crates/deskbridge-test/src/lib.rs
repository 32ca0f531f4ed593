//! Deskbridge webhook sync - integration test support.
//!
//! This crate re-exports the workspace crates so integration tests can use
//! `deskbridge_test::` paths.

pub mod component {
    pub use deskbridge_core::{constants, types};
    pub use deskbridge_service::{
        EventRouter, channel, contact, event, lifecycle, operator, router,
    };

    // Errors from every layer under one path
    pub mod error {
        pub use deskbridge_core::error::*;
        pub use deskbridge_service::error::*;
        pub use deskbridge_store::error::*;
    }

    pub mod store {
        pub use deskbridge_store::*;
    }

    // Re-export config from both core and app
    pub mod config {
        pub use deskbridge_app::config::ConfigHandler;
        pub use deskbridge_core::config::*;
    }
}

// Re-export top-level modules for convenience
pub mod app {
    pub use deskbridge_app::*;

    pub mod api {
        pub use deskbridge_app::app::api::*;
    }
}
