use serde::{Deserialize, Serialize};

/// Canonical messaging transports tracked in the channels table.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Channel {
    Telegram,
    WhatsApp,
    Instagram,
    Facebook,
    Email,
    Website,
    Sms,
}

impl Channel {
    /// Name of the matching row in the channels table.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Telegram => "Telegram",
            Self::WhatsApp => "WhatsApp",
            Self::Instagram => "Instagram",
            Self::Facebook => "Facebook",
            Self::Email => "Email",
            Self::Website => "Website",
            Self::Sms => "SMS",
        }
    }
}

impl std::fmt::Display for Channel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}
