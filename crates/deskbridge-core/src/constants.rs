/// Route component constants shared across crates
pub const API_ROUTE_COMPONENT: &str = "api";
pub const API_ROUTE_PREFIX: &str = const_str::concat!("/", API_ROUTE_COMPONENT);

pub const WEBHOOK_ROUTE_COMPONENT: &str = "webhooks";
pub const WEBHOOK_ROUTE_PREFIX: &str =
    const_str::concat!(API_ROUTE_PREFIX, "/", WEBHOOK_ROUTE_COMPONENT);

pub const CHATWOOT_ROUTE_COMPONENT: &str = "chatwoot";
pub const CHATWOOT_WEBHOOK_PATH: &str =
    const_str::concat!(WEBHOOK_ROUTE_PREFIX, "/", CHATWOOT_ROUTE_COMPONENT);

/// Timezone used to stamp ticket creation dates when none is configured.
pub const DEFAULT_TIMEZONE: &str = "Asia/Tbilisi";

/// Name under which the record store is referenced in chat-platform contact attributes.
pub const DEFAULT_LINK_ATTRIBUTE: &str = "airtable";
