//! Chat-platform channel identifiers to canonical [`Channel`] values.
//!
//! Chatwoot reports the inbox type as a class name such as `Channel::Telegram`.
//! Lookup strips the `Channel::` prefix and compares case-insensitively, after
//! rewriting known malformed literals through [`LEGACY_LITERALS`].

use deskbridge_core::types::Channel;

const CHANNEL_PREFIX: &str = "Channel::";

/// Literals seen in older payloads, rewritten before lookup.
const LEGACY_LITERALS: &[(&str, &str)] = &[
    ("Channel:Telegram", "Channel::Telegram"),
    ("Channel:Whatsapp", "Channel::Whatsapp"),
];

/// Inbox types the channels table has no row for.
const UNSUPPORTED: &[&str] = &["api", "line"];

fn lookup(name: &str) -> Option<Channel> {
    let channel = match name.to_ascii_lowercase().as_str() {
        "telegram" => Channel::Telegram,
        "whatsapp" => Channel::WhatsApp,
        "instagram" => Channel::Instagram,
        "facebookpage" | "facebook" => Channel::Facebook,
        "email" => Channel::Email,
        "webwidget" | "website" => Channel::Website,
        "sms" | "twiliosms" => Channel::Sms,
        _ => return None,
    };
    Some(channel)
}

/// ## Summary
/// Maps a raw channel identifier to its canonical channel.
///
/// Returns `None` for blank input, explicitly unsupported inbox types, and
/// anything not in the table. Unknown values are logged at `warn` so new inbox
/// types show up in the logs instead of silently losing the channel.
#[must_use]
pub fn map_channel(raw: &str) -> Option<Channel> {
    let raw = raw.trim();
    if raw.is_empty() {
        return None;
    }

    let migrated = LEGACY_LITERALS
        .iter()
        .copied()
        .find(|(legacy, _)| *legacy == raw)
        .map_or(raw, |(legacy, current)| {
            tracing::debug!(legacy, current, "Rewriting legacy channel literal");
            current
        });
    let name = migrated.strip_prefix(CHANNEL_PREFIX).unwrap_or(migrated);

    if UNSUPPORTED.iter().any(|u| name.eq_ignore_ascii_case(u)) {
        tracing::debug!(raw, "Channel is not tracked in the record store");
        return None;
    }

    let channel = lookup(name);
    if channel.is_none() {
        tracing::warn!(raw, "Unmapped channel identifier");
    }
    channel
}
