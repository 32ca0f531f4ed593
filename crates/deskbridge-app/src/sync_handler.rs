use std::sync::Arc;

use salvo::async_trait;

use deskbridge_core::config::{Backend, Settings};
use deskbridge_core::error::CoreError;
use deskbridge_service::EventRouter;
use deskbridge_service::lifecycle::SyncOptions;
use deskbridge_store::airtable::AirtableStore;
use deskbridge_store::chatwoot::ChatwootClient;
use deskbridge_store::memory::{InMemoryChatPlatform, InMemoryRecordStore};
use deskbridge_store::{ChatPlatform, RecordStore};

use crate::error::AppResult;

/// Canonical channel rows seeded into the dry-run record store.
const MEMORY_CHANNELS: [&str; 7] = [
    "Telegram",
    "WhatsApp",
    "Instagram",
    "Facebook",
    "Email",
    "Website",
    "SMS",
];

/// Dry-run record store holding the canonical channels and the configured operators.
fn memory_store(settings: &Settings) -> InMemoryRecordStore {
    let operators = &settings.sync.memory_operators;
    if operators.is_empty() {
        tracing::warn!(
            "sync.memory_operators is empty; assignee sync cannot resolve any operator in dry runs"
        );
    }
    InMemoryRecordStore::new()
        .with_channels(MEMORY_CHANNELS)
        .with_operators(operators.iter().cloned())
}

/// ## Summary
/// Builds the event router over the backend selected in `settings`.
///
/// ## Errors
/// Returns an error if the HTTP client cannot be built.
pub fn build_event_router(settings: &Settings) -> anyhow::Result<EventRouter> {
    let (store, chat): (Arc<dyn RecordStore>, Arc<dyn ChatPlatform>) = match settings.sync.backend
    {
        Backend::Airtable => {
            let http = reqwest::Client::builder()
                .user_agent(concat!("deskbridge/", env!("CARGO_PKG_VERSION")))
                .build()?;
            (
                Arc::new(AirtableStore::new(http.clone(), settings.airtable.clone())),
                Arc::new(ChatwootClient::new(http, settings.chatwoot.clone())),
            )
        }
        Backend::Memory => {
            tracing::warn!("Using the in-memory backend; nothing is written to Airtable or Chatwoot");
            (
                Arc::new(memory_store(settings)),
                Arc::new(InMemoryChatPlatform::new()),
            )
        }
    };

    tracing::info!(store = store.name(), "Record store selected");
    Ok(EventRouter::new(store, chat, SyncOptions::from_settings(settings)))
}

pub struct EventRouterHandler {
    pub router: Arc<EventRouter>,
}

#[async_trait]
impl salvo::Handler for EventRouterHandler {
    #[tracing::instrument(skip(self, _req, depot, _res, _ctrl))]
    async fn handle(
        &self,
        _req: &mut salvo::Request,
        depot: &mut salvo::Depot,
        _res: &mut salvo::Response,
        _ctrl: &mut salvo::FlowCtrl,
    ) {
        depot.inject(self.router.clone());
    }
}

/// ## Summary
/// Retrieves the event router from the depot.
///
/// ## Errors
/// Returns an error if the event router is not found in the depot.
pub fn get_event_router_from_depot(depot: &salvo::Depot) -> AppResult<Arc<EventRouter>> {
    depot
        .obtain::<Arc<EventRouter>>()
        .cloned()
        .map_err(|_err| CoreError::InvariantViolation("Event router not found in depot").into())
}
