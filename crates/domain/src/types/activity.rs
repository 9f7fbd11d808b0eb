//! Source entities consumed by the export
//!
//! These mirror the persisted activity-log aggregate: an [`ActivityLog`]
//! points at a [`Recipient`], which may carry an [`Invitation`]. Both
//! relationships are optional because the data layer does not guarantee
//! them; projections decide whether an absent relationship is fatal.

use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Business event recorded by an activity log.
///
/// The set is open-ended: labels outside the four exported kinds are kept
/// verbatim in [`ActionKind::Other`] so they can be written through.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum ActionKind {
    Request,
    Link,
    Reject,
    Expire,
    Other(String),
}

impl ActionKind {
    /// Parse a stored action label. Never fails; unknown labels become
    /// `Other` with the trimmed label preserved.
    pub fn parse(label: &str) -> Self {
        let trimmed = label.trim();
        match trimmed.to_ascii_uppercase().as_str() {
            "REQUEST" => Self::Request,
            "LINK" => Self::Link,
            "REJECT" => Self::Reject,
            "EXPIRE" => Self::Expire,
            _ => Self::Other(trimmed.to_string()),
        }
    }

    pub fn as_str(&self) -> &str {
        match self {
            Self::Request => "REQUEST",
            Self::Link => "LINK",
            Self::Reject => "REJECT",
            Self::Expire => "EXPIRE",
            Self::Other(label) => label,
        }
    }
}

impl fmt::Display for ActionKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl From<String> for ActionKind {
    fn from(value: String) -> Self {
        Self::parse(&value)
    }
}

impl From<&str> for ActionKind {
    fn from(value: &str) -> Self {
        Self::parse(value)
    }
}

impl From<ActionKind> for String {
    fn from(value: ActionKind) -> Self {
        match value {
            ActionKind::Other(label) => label,
            known => known.as_str().to_string(),
        }
    }
}

/// Invitation attached to a recipient; only its expiry matters here.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Invitation {
    pub expiry_date: DateTime<Utc>,
}

/// The counterparty of an activity, with both sides' entity codes.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Recipient {
    pub id: String,
    pub customer_number: String,
    pub sender_customer_number: String,
    pub nickname: String,
    pub sender_name: String,
    pub sender_country_code: String,
    pub sender_group_member: String,
    pub recipient_country_code: String,
    pub recipient_group_member: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub invitation: Option<Invitation>,
}

impl Recipient {
    /// Composite sender entity code: country code followed by group member.
    pub fn sender_entity(&self) -> String {
        format!("{}{}", self.sender_country_code, self.sender_group_member)
    }

    /// Composite recipient entity code: country code followed by group member.
    pub fn recipient_entity(&self) -> String {
        format!("{}{}", self.recipient_country_code, self.recipient_group_member)
    }
}

/// One accumulated activity awaiting export.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ActivityLog {
    pub id: i64,
    pub action: ActionKind,
    pub sender_id: String,
    pub activity_time: DateTime<Utc>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub recipient: Option<Recipient>,
}
