//! Find-or-create for contact cards.
//!
//! Lookup is a scan over the full contact list followed by a create when nothing
//! matches. The two calls are not atomic: two deliveries for the same person
//! that both list before either creates will both create.

use std::sync::Arc;

use deskbridge_core::types::{Contact, NewContact};
use deskbridge_store::RecordStore;

/// Identifying fields in match priority order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MatchKey {
    Phone,
    Telegram,
    WhatsApp,
    Identifier,
}

impl MatchKey {
    pub const PRIORITY: [Self; 4] = [Self::Phone, Self::Telegram, Self::WhatsApp, Self::Identifier];

    fn of_contact(self, contact: &Contact) -> Option<&str> {
        match self {
            Self::Phone => contact.phone.as_deref(),
            Self::Telegram => contact.telegram.as_deref(),
            Self::WhatsApp => contact.whatsapp.as_deref(),
            Self::Identifier => contact.identifier.as_deref(),
        }
    }

    fn of_fields(self, fields: &NewContact) -> Option<&str> {
        match self {
            Self::Phone => fields.phone.as_deref(),
            Self::Telegram => fields.telegram.as_deref(),
            Self::WhatsApp => fields.whatsapp.as_deref(),
            Self::Identifier => fields.identifier.as_deref(),
        }
    }
}

fn non_blank(value: Option<&str>) -> Option<&str> {
    value.map(str::trim).filter(|v| !v.is_empty())
}

/// ## Summary
/// Returns the contact addressed by the first identifying field that matches.
///
/// Keys are tried in [`MatchKey::PRIORITY`] order and, for each key, contacts
/// in list order. Blank or missing values on either side never match.
///
/// This is not "first record with any matching field": a phone match on a
/// later record wins over a telegram match on an earlier one.
#[must_use]
pub fn find_match<'a>(contacts: &'a [Contact], fields: &NewContact) -> Option<(&'a Contact, MatchKey)> {
    MatchKey::PRIORITY.into_iter().find_map(|key| {
        let wanted = non_blank(key.of_fields(fields))?;
        contacts
            .iter()
            .find(|c| non_blank(key.of_contact(c)) == Some(wanted))
            .map(|c| (c, key))
    })
}

/// Resolves webhook contact fields to a contact card.
#[derive(Clone)]
pub struct ContactResolver {
    store: Arc<dyn RecordStore>,
}

impl ContactResolver {
    #[must_use]
    pub fn new(store: Arc<dyn RecordStore>) -> Self {
        Self { store }
    }

    /// ## Summary
    /// Returns the existing card matching `fields`, or creates one.
    ///
    /// Record-store failures are logged and yield `None`. A failed listing does
    /// not fall through to creation, since that would mint a duplicate for every
    /// known contact while the store is unreachable.
    #[tracing::instrument(skip(self, fields))]
    pub async fn resolve_or_create(&self, fields: &NewContact) -> Option<Contact> {
        let contacts = match self.store.list_contacts().await {
            Ok(contacts) => contacts,
            Err(e) => {
                tracing::error!(error = %e, "Failed to list contacts");
                return None;
            }
        };

        if let Some((contact, key)) = find_match(&contacts, fields) {
            tracing::debug!(contact_id = %contact.id, ?key, "Matched existing contact");
            return Some(contact.clone());
        }

        match self.store.create_contact(fields).await {
            Ok(contact) => {
                tracing::info!(contact_id = %contact.id, "Created contact");
                Some(contact)
            }
            Err(e) => {
                tracing::error!(error = %e, "Failed to create contact");
                None
            }
        }
    }
}
