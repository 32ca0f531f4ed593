//! Airtable REST implementation of [`RecordStore`].

pub mod fields;

use async_trait::async_trait;
use serde_json::json;

use deskbridge_core::config::AirtableConfig;
use deskbridge_core::types::{
    ChannelId, ChatIds, Contact, ContactId, NewContact, NewTicket, OperatorId, Ticket, TicketId,
    TicketStatus,
};

use crate::error::StoreResult;
use crate::http::{join_segments, send_json};
use crate::record::RecordStore;

use fields::{AirtableRecord, RecordPage};

const SERVICE: &str = "airtable";

/// Record store backed by an Airtable base.
pub struct AirtableStore {
    http: reqwest::Client,
    config: AirtableConfig,
}

impl AirtableStore {
    #[must_use]
    pub fn new(http: reqwest::Client, config: AirtableConfig) -> Self {
        Self { http, config }
    }

    fn table_url(&self, table: &str) -> StoreResult<reqwest::Url> {
        join_segments(&self.config.api_url, [self.config.base_id.as_str(), table])
    }

    fn record_url(&self, table: &str, id: &str) -> StoreResult<reqwest::Url> {
        join_segments(&self.config.api_url, [self.config.base_id.as_str(), table, id])
    }

    fn web_url(&self, table: &str, id: &str) -> String {
        format!(
            "{}/{}/{}/{}",
            self.config.web_url.trim_end_matches('/'),
            self.config.base_id,
            table,
            id
        )
    }

    async fn fetch(&self, table: &str, id: &str) -> StoreResult<AirtableRecord> {
        let url = self.record_url(table, id)?;
        send_json(
            SERVICE,
            self.http.get(url).bearer_auth(&self.config.token),
        )
        .await
    }

    async fn create(&self, table: &str, fields: serde_json::Value) -> StoreResult<AirtableRecord> {
        let url = self.table_url(table)?;
        send_json(
            SERVICE,
            self.http
                .post(url)
                .bearer_auth(&self.config.token)
                .json(&json!({ "fields": fields, "typecast": true })),
        )
        .await
    }

    async fn patch(
        &self,
        table: &str,
        id: &str,
        fields: serde_json::Value,
    ) -> StoreResult<AirtableRecord> {
        let url = self.record_url(table, id)?;
        send_json(
            SERVICE,
            self.http
                .patch(url)
                .bearer_auth(&self.config.token)
                .json(&json!({ "fields": fields, "typecast": true })),
        )
        .await
    }

    /// First page of `table`, optionally narrowed by a formula.
    async fn list(
        &self,
        table: &str,
        formula: Option<&str>,
        max_records: Option<u32>,
    ) -> StoreResult<RecordPage> {
        let mut url = self.table_url(table)?;
        {
            let mut query = url.query_pairs_mut();
            if let Some(formula) = formula {
                query.append_pair("filterByFormula", formula);
            }
            if let Some(max) = max_records {
                query.append_pair("maxRecords", &max.to_string());
            }
        }

        let page: RecordPage = send_json(
            SERVICE,
            self.http.get(url).bearer_auth(&self.config.token),
        )
        .await?;

        if page.offset.is_some() {
            tracing::warn!(
                table,
                returned = page.records.len(),
                "More records available than one page; remaining pages are not read"
            );
        }

        Ok(page)
    }

    async fn find_by_name(&self, table: &str, name: &str) -> StoreResult<Option<String>> {
        let formula = format!(
            "{{{}}} = {}",
            fields::VOCABULARY_NAME,
            fields::formula_literal(name)
        );
        let page = self.list(table, Some(&formula), Some(1)).await?;
        Ok(page.records.into_iter().next().map(|record| record.id))
    }
}

#[async_trait]
impl RecordStore for AirtableStore {
    fn name(&self) -> &'static str {
        SERVICE
    }

    #[tracing::instrument(skip(self))]
    async fn list_contacts(&self) -> StoreResult<Vec<Contact>> {
        let page = self.list(&self.config.contacts_table, None, None).await?;
        Ok(page.records.into_iter().map(fields::decode_contact).collect())
    }

    #[tracing::instrument(skip(self, new_contact))]
    async fn create_contact(&self, new_contact: &NewContact) -> StoreResult<Contact> {
        let record = self
            .create(
                &self.config.contacts_table,
                fields::encode_new_contact(new_contact),
            )
            .await?;
        Ok(fields::decode_contact(record))
    }

    #[tracing::instrument(skip(self), fields(contact_id = %id))]
    async fn get_contact(&self, id: &ContactId) -> StoreResult<Contact> {
        let record = self.fetch(&self.config.contacts_table, id.as_str()).await?;
        Ok(fields::decode_contact(record))
    }

    #[tracing::instrument(skip(self), fields(contact_id = %id))]
    async fn link_contact_external_ids(&self, id: &ContactId, ids: &ChatIds) -> StoreResult<()> {
        self.patch(
            &self.config.contacts_table,
            id.as_str(),
            fields::columns([
                (fields::contact::CHAT_ACCOUNT_ID, json!(ids.account_id)),
                (fields::contact::CHAT_CONTACT_ID, json!(ids.contact_id)),
            ]),
        )
        .await?;
        Ok(())
    }

    fn contact_url(&self, id: &ContactId) -> String {
        self.web_url(&self.config.contacts_table, id.as_str())
    }

    #[tracing::instrument(skip(self, new_ticket), fields(created_on = %new_ticket.created_on))]
    async fn create_ticket(&self, new_ticket: &NewTicket) -> StoreResult<Ticket> {
        let record = self
            .create(&self.config.tickets_table, fields::encode_new_ticket(new_ticket))
            .await?;
        fields::decode_ticket(record)
    }

    #[tracing::instrument(skip(self), fields(ticket_id = %id))]
    async fn get_ticket(&self, id: &TicketId) -> StoreResult<Ticket> {
        let record = self.fetch(&self.config.tickets_table, id.as_str()).await?;
        fields::decode_ticket(record)
    }

    fn ticket_url(&self, ticket: &Ticket) -> String {
        self.web_url(&self.config.tickets_table, ticket.id.as_str())
    }

    async fn get_ticket_channel(&self, id: &TicketId) -> StoreResult<Option<ChannelId>> {
        Ok(self.get_ticket(id).await?.channel)
    }

    #[tracing::instrument(skip(self), fields(ticket_id = %id, channel_id = %channel))]
    async fn update_ticket_channel(&self, id: &TicketId, channel: &ChannelId) -> StoreResult<()> {
        self.patch(
            &self.config.tickets_table,
            id.as_str(),
            fields::columns([(fields::ticket::CHANNEL, json!([channel.as_str()]))]),
        )
        .await?;
        Ok(())
    }

    #[tracing::instrument(skip(self), fields(ticket_id = %id, operator_id = %operator))]
    async fn update_ticket_assignee(
        &self,
        id: &TicketId,
        operator: &OperatorId,
    ) -> StoreResult<()> {
        self.patch(
            &self.config.tickets_table,
            id.as_str(),
            fields::columns([(fields::ticket::ASSIGNEE, json!([operator.as_str()]))]),
        )
        .await?;
        Ok(())
    }

    #[tracing::instrument(skip(self), fields(ticket_id = %id, status = %status))]
    async fn update_ticket_status(&self, id: &TicketId, status: TicketStatus) -> StoreResult<()> {
        self.patch(
            &self.config.tickets_table,
            id.as_str(),
            fields::columns([(fields::ticket::STATUS, json!(status.as_str()))]),
        )
        .await?;
        Ok(())
    }

    async fn resolve_channel_id(&self, name: &str) -> StoreResult<Option<ChannelId>> {
        Ok(self
            .find_by_name(&self.config.channels_table, name)
            .await?
            .map(ChannelId::from))
    }

    async fn resolve_operator_id(&self, name: &str) -> StoreResult<Option<OperatorId>> {
        Ok(self
            .find_by_name(&self.config.operators_table, name)
            .await?
            .map(OperatorId::from))
    }
}
