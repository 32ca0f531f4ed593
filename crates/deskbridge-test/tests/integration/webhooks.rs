#![allow(clippy::expect_used)]
//! End-to-end webhook flows over the HTTP route.

use salvo::http::StatusCode;
use serde_json::json;

use deskbridge_test::component::config::AssigneePolicy;
use deskbridge_test::component::store::memory::StoreOp;
use deskbridge_test::component::types::TicketStatus;

use super::helpers::{
    ACCOUNT_ID, TestApp, contact_created, message_updated, status_changed,
};

#[test_log::test(tokio::test)]
async fn unsupported_event_answers_not_implemented() {
    let app = TestApp::new();

    let _ = app
        .post_webhook(&json!({ "event": "contact_updated", "id": 3 }))
        .await
        .assert_status(StatusCode::NOT_IMPLEMENTED)
        .assert_body_contains("contact_updated");

    assert!(app.store.journal().is_empty());
}

#[test_log::test(tokio::test)]
async fn malformed_payload_answers_bad_request() {
    let app = TestApp::new();

    let _ = app
        .post_webhook(&json!({ "event": "message_updated", "message_type": "outgoing" }))
        .await
        .assert_status(StatusCode::BAD_REQUEST)
        .assert_body_contains("message_updated");

    let _ = app
        .post_raw("{ not json")
        .await
        .assert_status(StatusCode::BAD_REQUEST);
}

#[test_log::test(tokio::test)]
async fn empty_event_tag_is_accepted_as_noop() {
    let app = TestApp::new();

    let _ = app
        .post_webhook(&json!({ "event": "" }))
        .await
        .assert_status(StatusCode::OK);

    assert!(app.store.journal().is_empty());
}

#[test_log::test(tokio::test)]
async fn contact_created_opens_ticket_and_posts_note() {
    let app = TestApp::new();

    let _ = app
        .post_webhook(&contact_created(3, "Ana", Some("+995500000")))
        .await
        .assert_status(StatusCode::OK);

    assert_eq!(app.store.count(StoreOp::CreateContact), 1);
    assert_eq!(app.store.count(StoreOp::CreateTicket), 1);

    let tickets = app.store.tickets();
    assert_eq!(tickets[0].status, TicketStatus::New);
    assert_eq!(tickets[0].fallback_name.as_deref(), Some("+995500000"));

    let url = app.single_contact_url();
    assert_eq!(app.chat.external_url(ACCOUNT_ID, 3), Some(url.clone()));
    let notes = app.chat.notes();
    assert_eq!(notes.len(), 1);
    assert_eq!(notes[0].contact_url, url);
}

#[test_log::test(tokio::test)]
async fn repeated_contact_created_reuses_contact() {
    let app = TestApp::new();

    for _ in 0..2 {
        let _ = app
            .post_webhook(&contact_created(3, "Ana", Some("+995500000")))
            .await
            .assert_status(StatusCode::OK);
    }

    assert_eq!(app.store.count(StoreOp::CreateContact), 1);
    assert_eq!(app.store.tickets().len(), 2);
}

#[test_log::test(tokio::test)]
async fn contacts_without_identifying_fields_are_not_merged() {
    let app = TestApp::new();

    let _ = app
        .post_webhook(&contact_created(3, "Ana", None))
        .await
        .assert_status(StatusCode::OK);
    let _ = app
        .post_webhook(&contact_created(4, "Levan", None))
        .await
        .assert_status(StatusCode::OK);

    assert_eq!(app.store.contacts().len(), 2);
}

#[test_log::test(tokio::test)]
async fn outgoing_message_syncs_assignee_and_channel_once() {
    let app = TestApp::new();
    let _ = app
        .post_webhook(&contact_created(3, "Ana", Some("+995500000")))
        .await
        .assert_status(StatusCode::OK);
    let url = app.single_contact_url();

    let _ = app
        .post_webhook(&message_updated("outgoing", "Nino", "Channel::Telegram", &url))
        .await
        .assert_status(StatusCode::OK);
    let _ = app
        .post_webhook(&message_updated("outgoing", "Giorgi", "Channel::Whatsapp", &url))
        .await
        .assert_status(StatusCode::OK);

    let ticket = &app.store.tickets()[0];
    assert_eq!(ticket.assignee, app.store.operator_id("Giorgi"));
    assert_eq!(ticket.channel, app.store.channel_id("Telegram"));
    assert_eq!(app.store.count(StoreOp::UpdateTicketChannel), 1);
}

#[test_log::test(tokio::test)]
async fn incoming_message_changes_nothing() {
    let app = TestApp::new();
    let _ = app
        .post_webhook(&contact_created(3, "Ana", Some("+995500000")))
        .await
        .assert_status(StatusCode::OK);
    let url = app.single_contact_url();
    let before = app.store.journal().len();

    let _ = app
        .post_webhook(&message_updated("incoming", "Ana", "Channel::Telegram", &url))
        .await
        .assert_status(StatusCode::OK);

    assert_eq!(app.store.journal().len(), before);
}

#[test_log::test(tokio::test)]
async fn only_new_policy_keeps_assignee_after_resolve() {
    let app = TestApp::with_policy(AssigneePolicy::OnlyNew);
    let _ = app
        .post_webhook(&contact_created(3, "Ana", Some("+995500000")))
        .await
        .assert_status(StatusCode::OK);
    let url = app.single_contact_url();

    let _ = app
        .post_webhook(&message_updated("outgoing", "Nino", "Channel::Telegram", &url))
        .await
        .assert_status(StatusCode::OK);
    let _ = app
        .post_webhook(&status_changed("resolved", &url))
        .await
        .assert_status(StatusCode::OK);
    let _ = app
        .post_webhook(&message_updated("outgoing", "Giorgi", "Channel::Telegram", &url))
        .await
        .assert_status(StatusCode::OK);

    let ticket = &app.store.tickets()[0];
    assert_eq!(ticket.status, TicketStatus::Resolved);
    assert_eq!(ticket.assignee, app.store.operator_id("Nino"));
}

#[test_log::test(tokio::test)]
async fn resolve_then_reopen_tracks_two_tickets() {
    let app = TestApp::new();
    let _ = app
        .post_webhook(&contact_created(3, "Ana", Some("+995500000")))
        .await
        .assert_status(StatusCode::OK);
    let url = app.single_contact_url();

    let _ = app
        .post_webhook(&status_changed("resolved", &url))
        .await
        .assert_status(StatusCode::OK);
    let _ = app
        .post_webhook(&status_changed("open", &url))
        .await
        .assert_status(StatusCode::OK);

    let tickets = app.store.tickets();
    assert_eq!(tickets.len(), 2);
    assert_eq!(tickets[0].status, TicketStatus::Resolved);
    assert_eq!(tickets[1].status, TicketStatus::New);
    assert_eq!(tickets[0].contacts, tickets[1].contacts);
    assert_ne!(tickets[0].id, tickets[1].id);

    // One note for the first ticket, one for the reopened one.
    assert_eq!(app.chat.notes().len(), 2);
}

#[test_log::test(tokio::test)]
async fn archived_status_is_noop() {
    let app = TestApp::new();
    let _ = app
        .post_webhook(&contact_created(3, "Ana", Some("+995500000")))
        .await
        .assert_status(StatusCode::OK);
    let url = app.single_contact_url();
    let before = app.store.journal().len();

    let _ = app
        .post_webhook(&status_changed("archived", &url))
        .await
        .assert_status(StatusCode::OK);

    assert_eq!(app.store.journal().len(), before);
    assert_eq!(app.store.tickets()[0].status, TicketStatus::New);
}

#[test_log::test(tokio::test)]
async fn resolving_unlinked_contact_is_logged_and_accepted() {
    let app = TestApp::new();

    let _ = app
        .post_webhook(&status_changed("resolved", "memory://contacts/recMissing"))
        .await
        .assert_status(StatusCode::OK)
        .assert_body_contains("ok");

    assert_eq!(app.store.count(StoreOp::UpdateTicketStatus), 0);
}

#[test_log::test(tokio::test)]
async fn bare_update_events_without_sync_work_are_accepted() {
    let app = TestApp::new();

    for body in [
        json!({ "event": "message-updated", "message_type": "incoming" }),
        json!({ "event": "conversation-status-changed", "status": "archived" }),
    ] {
        let _ = app
            .post_webhook(&body)
            .await
            .assert_status(StatusCode::OK);
    }

    assert!(app.store.journal().is_empty());
}
