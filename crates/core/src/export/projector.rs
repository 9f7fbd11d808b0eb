//! Per-action-group projectors
//!
//! Each projector flattens an [`ActivityLog`] into an [`ExportRecord`] with
//! the field set its action group exposes to the BI consumer:
//!
//! | group       | extra fields                                        |
//! |-------------|-----------------------------------------------------|
//! | request     | sender id, sender name, receiver nickname           |
//! | link/reject | recipient entity, customer number                   |
//! | expiry      | expire date (from the recipient's invitation)       |
//! | other       | none                                                |
//!
//! All groups carry action, sender entity, recipient id, sender customer
//! number and activity time. A missing recipient, or a missing invitation
//! for expiry, is a `NullReference` error; nothing is defaulted.

use activity_export_domain::{
    ActivityLog, ExportError, ExportRecord, ExportRecordBuilder, Recipient, Result,
};
use tracing::debug;

use super::classifier::classify;

/// Classify `log` and run the matching projector.
///
/// # Errors
/// Returns `ExportError::NullReference` when the projector's required
/// relationship is absent.
pub fn project(log: &ActivityLog) -> Result<ExportRecord> {
    let strategy = classify(&log.action);
    debug!(
        log_id = log.id,
        action = %log.action,
        strategy = strategy.name(),
        "Projecting activity log"
    );
    strategy.project(log)
}

pub fn project_request(log: &ActivityLog) -> Result<ExportRecord> {
    let recipient = recipient_of(log)?;

    Ok(common_fields(log, recipient)
        .sender_id(log.sender_id.as_str())
        .sender_name(recipient.sender_name.as_str())
        .receiver_nickname(recipient.nickname.as_str())
        .build())
}

/// Shared by LINK and REJECT; only the action value differs.
pub fn project_link_reject(log: &ActivityLog) -> Result<ExportRecord> {
    let recipient = recipient_of(log)?;

    Ok(common_fields(log, recipient)
        .recipient_entity(recipient.recipient_entity())
        .customer_number(recipient.customer_number.as_str())
        .build())
}

pub fn project_expiry(log: &ActivityLog) -> Result<ExportRecord> {
    let recipient = recipient_of(log)?;
    let invitation = recipient.invitation.as_ref().ok_or_else(|| {
        ExportError::NullReference(format!(
            "recipient {} of activity log {} has no invitation",
            recipient.id, log.id
        ))
    })?;

    Ok(common_fields(log, recipient).expire_date(invitation.expiry_date).build())
}

pub fn project_other(log: &ActivityLog) -> Result<ExportRecord> {
    let recipient = recipient_of(log)?;
    Ok(common_fields(log, recipient).build())
}

fn recipient_of(log: &ActivityLog) -> Result<&Recipient> {
    let recipient = log.recipient.as_ref().ok_or_else(|| {
        ExportError::NullReference(format!("activity log {} has no recipient", log.id))
    })?;
    debug!(log_id = log.id, recipient_id = %recipient.id, "Retrieved recipient");
    Ok(recipient)
}

fn common_fields(log: &ActivityLog, recipient: &Recipient) -> ExportRecordBuilder {
    ExportRecord::builder(
        log.action.clone(),
        recipient.sender_entity(),
        recipient.sender_customer_number.as_str(),
        log.activity_time,
    )
    .recipient_id(recipient.id.as_str())
}
