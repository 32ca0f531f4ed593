//! Chatwoot REST implementation of [`ChatPlatform`].

use async_trait::async_trait;
use serde::Deserialize;
use serde_json::{Map, Value, json};

use deskbridge_core::config::ChatwootConfig;
use deskbridge_core::types::ChatIds;

use crate::chat::{ChatPlatform, note_content};
use crate::error::{StoreError, StoreResult};
use crate::http::{join_segments, send_json};

const SERVICE: &str = "chatwoot";
const TOKEN_HEADER: &str = "api_access_token";

#[derive(Debug, Deserialize)]
struct Envelope<T> {
    payload: T,
}

#[derive(Debug, Deserialize)]
struct ContactPayload {
    #[serde(default)]
    custom_attributes: Map<String, Value>,
}

#[derive(Debug, Deserialize)]
struct ConversationSummary {
    id: i64,
}

/// Chat platform client for a Chatwoot installation.
pub struct ChatwootClient {
    http: reqwest::Client,
    config: ChatwootConfig,
}

impl ChatwootClient {
    #[must_use]
    pub fn new(http: reqwest::Client, config: ChatwootConfig) -> Self {
        Self { http, config }
    }

    fn account_url<I, S>(&self, account_id: i64, rest: I) -> StoreResult<reqwest::Url>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let account = account_id.to_string();
        let prefix = ["api", "v1", "accounts", account.as_str()]
            .into_iter()
            .map(str::to_string);
        join_segments(
            &self.config.url,
            prefix.chain(rest.into_iter().map(|s| s.as_ref().to_string())),
        )
    }

    fn contact_url(&self, ids: &ChatIds) -> StoreResult<reqwest::Url> {
        let contact_id = ids.contact_id.to_string();
        self.account_url(ids.account_id, ["contacts", contact_id.as_str()])
    }

    /// Conversation the note belongs to: the one in `ids`, else the contact's most recent one.
    async fn conversation_for(&self, ids: &ChatIds) -> StoreResult<i64> {
        if let Some(id) = ids.conversation_id {
            return Ok(id);
        }

        let contact_id = ids.contact_id.to_string();
        let url = self.account_url(
            ids.account_id,
            ["contacts", contact_id.as_str(), "conversations"],
        )?;
        let conversations: Envelope<Vec<ConversationSummary>> = send_json(
            SERVICE,
            self.http.get(url).header(TOKEN_HEADER, &self.config.token),
        )
        .await?;

        conversations
            .payload
            .first()
            .map(|c| c.id)
            .ok_or_else(|| {
                StoreError::NotFound(format!("conversation for contact {}", ids.contact_id))
            })
    }
}

#[async_trait]
impl ChatPlatform for ChatwootClient {
    #[tracing::instrument(skip(self), fields(account_id = ids.account_id, contact_id = ids.contact_id))]
    async fn set_contact_external_url(&self, ids: &ChatIds, url: &str) -> StoreResult<()> {
        let attribute = &self.config.link_attribute;
        let mut attributes = Map::new();
        attributes.insert(attribute.clone(), json!(url));
        attributes.insert(format!("{attribute}_linked"), json!(true));

        let _: Value = send_json(
            SERVICE,
            self.http
                .put(self.contact_url(ids)?)
                .header(TOKEN_HEADER, &self.config.token)
                .json(&json!({ "custom_attributes": attributes })),
        )
        .await?;
        Ok(())
    }

    #[tracing::instrument(skip(self), fields(account_id = ids.account_id, contact_id = ids.contact_id))]
    async fn get_contact_external_url(&self, ids: &ChatIds) -> StoreResult<Option<String>> {
        let contact: Envelope<ContactPayload> = send_json(
            SERVICE,
            self.http
                .get(self.contact_url(ids)?)
                .header(TOKEN_HEADER, &self.config.token),
        )
        .await?;

        Ok(contact
            .payload
            .custom_attributes
            .get(&self.config.link_attribute)
            .and_then(Value::as_str)
            .filter(|url| !url.is_empty())
            .map(str::to_string))
    }

    #[tracing::instrument(skip(self, contact_url, ticket_url), fields(account_id = ids.account_id))]
    async fn send_private_note(
        &self,
        contact_url: &str,
        ticket_url: &str,
        ids: &ChatIds,
    ) -> StoreResult<()> {
        let conversation_id = self.conversation_for(ids).await?;
        let conversation = conversation_id.to_string();
        let url = self.account_url(
            ids.account_id,
            ["conversations", conversation.as_str(), "messages"],
        )?;

        let _: Value = send_json(
            SERVICE,
            self.http
                .post(url)
                .header(TOKEN_HEADER, &self.config.token)
                .json(&json!({
                    "content": note_content(contact_url, ticket_url),
                    "message_type": "outgoing",
                    "private": true,
                })),
        )
        .await?;

        tracing::debug!(conversation_id, "Private note posted");
        Ok(())
    }
}
