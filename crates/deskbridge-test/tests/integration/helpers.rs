#![allow(clippy::expect_used, dead_code)]
//! Test helpers for integration tests.
//!
//! Provides utilities for:
//! - Building a salvo service over fresh in-memory backends (one per test)
//! - Posting webhook bodies
//! - Asserting on responses and record store state

use std::sync::Arc;

use salvo::http::{ReqBody, StatusCode};
use salvo::prelude::*;
use salvo::test::{ResponseExt, TestClient};
use serde_json::{Value, json};

use deskbridge_test::app::sync_handler::EventRouterHandler;
use deskbridge_test::component::EventRouter;
use deskbridge_test::component::config::{AssigneePolicy, SyncConfig};
use deskbridge_test::component::constants::CHATWOOT_WEBHOOK_PATH;
use deskbridge_test::component::lifecycle::SyncOptions;
use deskbridge_test::component::store::RecordStore;
use deskbridge_test::component::store::memory::{InMemoryChatPlatform, InMemoryRecordStore};

pub const ACCOUNT_ID: i64 = 7;
pub const LINK_ATTRIBUTE: &str = "airtable";

/// Salvo service plus handles on the backends it writes to.
pub struct TestApp {
    pub service: Service,
    pub store: Arc<InMemoryRecordStore>,
    pub chat: Arc<InMemoryChatPlatform>,
}

impl TestApp {
    /// Creates an app over empty backends with the default channel and operator vocabulary.
    #[must_use]
    pub fn new() -> Self {
        Self::with_policy(AssigneePolicy::Always)
    }

    #[must_use]
    pub fn with_policy(assignee_policy: AssigneePolicy) -> Self {
        let store = Arc::new(
            InMemoryRecordStore::new()
                .with_channels(["Telegram", "WhatsApp", "Website", "SMS"])
                .with_operators(["Nino", "Giorgi"]),
        );
        let chat = Arc::new(InMemoryChatPlatform::new());
        let options = SyncOptions {
            timezone: SyncConfig::default().timezone,
            assignee_policy,
            link_attribute: LINK_ATTRIBUTE.to_string(),
        };
        let router = EventRouter::new(store.clone(), chat.clone(), options);

        let service = Service::new(
            Router::new()
                .hoop(EventRouterHandler {
                    router: Arc::new(router),
                })
                .push(deskbridge_test::app::api::routes()),
        );

        Self {
            service,
            store,
            chat,
        }
    }

    /// Posts `body` to the Chatwoot webhook route.
    pub async fn post_webhook(&self, body: &Value) -> TestResponse {
        let url = format!("http://127.0.0.1:5800{CHATWOOT_WEBHOOK_PATH}");
        let response = TestClient::post(url).json(body).send(&self.service).await;
        TestResponse::read(response).await
    }

    /// Posts a raw, possibly invalid, JSON body.
    pub async fn post_raw(&self, raw: &str) -> TestResponse {
        let url = format!("http://127.0.0.1:5800{CHATWOOT_WEBHOOK_PATH}");
        let response = TestClient::post(url)
            .add_header("content-type", "application/json", true)
            .body(ReqBody::Once(raw.as_bytes().to_vec().into()))
            .send(&self.service)
            .await;
        TestResponse::read(response).await
    }

    /// Record store URL of the only contact card.
    #[must_use]
    pub fn single_contact_url(&self) -> String {
        let contacts = self.store.contacts();
        assert_eq!(contacts.len(), 1, "expected exactly one contact card");
        self.store.contact_url(&contacts[0].id)
    }
}

/// Represents an HTTP test response for assertions.
pub struct TestResponse {
    pub status: StatusCode,
    pub body: String,
}

impl TestResponse {
    async fn read(mut response: Response) -> Self {
        let status = response
            .status_code
            .unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
        let body = response.take_string().await.unwrap_or_default();
        Self { status, body }
    }

    /// Asserts that the response status matches the expected code.
    #[must_use]
    pub fn assert_status(self, expected: StatusCode) -> Self {
        assert_eq!(
            self.status, expected,
            "Expected status {expected} but got {}: {}",
            self.status, self.body
        );
        self
    }

    /// Asserts that the response body contains the expected substring.
    #[must_use]
    pub fn assert_body_contains(self, expected: &str) -> Self {
        assert!(
            self.body.contains(expected),
            "Expected body to contain '{expected}' but got:\n{}",
            self.body
        );
        self
    }
}

/// `contact_created` delivery as Chatwoot sends it.
#[must_use]
pub fn contact_created(contact_id: i64, name: &str, phone: Option<&str>) -> Value {
    json!({
        "event": "contact_created",
        "id": contact_id,
        "name": name,
        "phone_number": phone,
        "email": null,
        "identifier": null,
        "additional_attributes": {},
        "custom_attributes": {},
        "account": { "id": ACCOUNT_ID, "name": "Support" }
    })
}

/// `message_updated` delivery for a conversation whose contact is linked to `contact_url`.
#[must_use]
pub fn message_updated(direction: &str, sender: &str, channel: &str, contact_url: &str) -> Value {
    json!({
        "event": "message_updated",
        "id": 501,
        "content": "Hello",
        "message_type": direction,
        "private": false,
        "sender": { "id": 12, "name": sender, "type": "user" },
        "account": { "id": ACCOUNT_ID, "name": "Support" },
        "conversation": {
            "id": 90,
            "channel": channel,
            "status": "open",
            "meta": {
                "sender": { "id": 3, "custom_attributes": { LINK_ATTRIBUTE: contact_url } }
            }
        }
    })
}

/// `conversation_status_changed` delivery for a conversation whose contact is linked to `contact_url`.
#[must_use]
pub fn status_changed(status: &str, contact_url: &str) -> Value {
    json!({
        "event": "conversation_status_changed",
        "id": 90,
        "status": status,
        "channel": "Channel::Telegram",
        "messages": [{ "id": 600, "account_id": ACCOUNT_ID }],
        "meta": {
            "sender": { "id": 3, "custom_attributes": { LINK_ATTRIBUTE: contact_url } }
        }
    })
}
