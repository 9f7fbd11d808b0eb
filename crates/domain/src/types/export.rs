//! Flattened export record
//!
//! An [`ExportRecord`] is the union of every field any action group can
//! populate. The four fields every record carries are required up front by
//! [`ExportRecord::builder`]; the rest are opt-in per action group. Once
//! built, a record exposes accessors only.

use chrono::{DateTime, Utc};

use super::activity::ActionKind;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExportRecord {
    action: ActionKind,
    sender_entity: String,
    recipient_id: Option<String>,
    sender_id: Option<String>,
    sender_name: Option<String>,
    receiver_nickname: Option<String>,
    recipient_entity: Option<String>,
    customer_number: Option<String>,
    expire_date: Option<DateTime<Utc>>,
    sender_customer_number: String,
    activity_time: DateTime<Utc>,
}

impl ExportRecord {
    /// Start a record with the fields every action group populates.
    pub fn builder(
        action: ActionKind,
        sender_entity: impl Into<String>,
        sender_customer_number: impl Into<String>,
        activity_time: DateTime<Utc>,
    ) -> ExportRecordBuilder {
        ExportRecordBuilder {
            record: Self {
                action,
                sender_entity: sender_entity.into(),
                recipient_id: None,
                sender_id: None,
                sender_name: None,
                receiver_nickname: None,
                recipient_entity: None,
                customer_number: None,
                expire_date: None,
                sender_customer_number: sender_customer_number.into(),
                activity_time,
            },
        }
    }

    pub fn action(&self) -> &ActionKind {
        &self.action
    }

    pub fn sender_entity(&self) -> &str {
        &self.sender_entity
    }

    pub fn recipient_id(&self) -> Option<&str> {
        self.recipient_id.as_deref()
    }

    pub fn sender_id(&self) -> Option<&str> {
        self.sender_id.as_deref()
    }

    pub fn sender_name(&self) -> Option<&str> {
        self.sender_name.as_deref()
    }

    pub fn receiver_nickname(&self) -> Option<&str> {
        self.receiver_nickname.as_deref()
    }

    pub fn recipient_entity(&self) -> Option<&str> {
        self.recipient_entity.as_deref()
    }

    pub fn customer_number(&self) -> Option<&str> {
        self.customer_number.as_deref()
    }

    pub fn expire_date(&self) -> Option<DateTime<Utc>> {
        self.expire_date
    }

    pub fn sender_customer_number(&self) -> &str {
        &self.sender_customer_number
    }

    pub fn activity_time(&self) -> DateTime<Utc> {
        self.activity_time
    }
}

/// Consuming builder; the only way to populate optional fields.
#[derive(Debug, Clone)]
#[must_use]
pub struct ExportRecordBuilder {
    record: ExportRecord,
}

impl ExportRecordBuilder {
    pub fn recipient_id(mut self, value: impl Into<String>) -> Self {
        self.record.recipient_id = Some(value.into());
        self
    }

    pub fn sender_id(mut self, value: impl Into<String>) -> Self {
        self.record.sender_id = Some(value.into());
        self
    }

    pub fn sender_name(mut self, value: impl Into<String>) -> Self {
        self.record.sender_name = Some(value.into());
        self
    }

    pub fn receiver_nickname(mut self, value: impl Into<String>) -> Self {
        self.record.receiver_nickname = Some(value.into());
        self
    }

    pub fn recipient_entity(mut self, value: impl Into<String>) -> Self {
        self.record.recipient_entity = Some(value.into());
        self
    }

    pub fn customer_number(mut self, value: impl Into<String>) -> Self {
        self.record.customer_number = Some(value.into());
        self
    }

    pub fn expire_date(mut self, value: DateTime<Utc>) -> Self {
        self.record.expire_date = Some(value);
        self
    }

    pub fn build(self) -> ExportRecord {
        self.record
    }
}
