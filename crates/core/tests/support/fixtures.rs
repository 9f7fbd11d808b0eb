//! Activity-log builders used across integration tests.

use activity_export_domain::{ActionKind, ActivityLog, Invitation, Recipient};
use chrono::{DateTime, TimeZone, Utc};

pub fn timestamp(day: u32, hour: u32) -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2024, 3, day, hour, 0, 0).unwrap()
}

/// The recipient from the REQUEST scenario: GB01, R1, Alice → Bob, C100.
pub fn recipient() -> Recipient {
    Recipient {
        id: "R1".into(),
        customer_number: "C200".into(),
        sender_customer_number: "C100".into(),
        nickname: "Bob".into(),
        sender_name: "Alice".into(),
        sender_country_code: "GB".into(),
        sender_group_member: "01".into(),
        recipient_country_code: "FR".into(),
        recipient_group_member: "03".into(),
        invitation: Some(Invitation { expiry_date: timestamp(15, 0) }),
    }
}

pub fn activity(id: i64, action: &str) -> ActivityLog {
    ActivityLog {
        id,
        action: ActionKind::parse(action),
        sender_id: "S1".into(),
        activity_time: timestamp(1, 9),
        recipient: Some(recipient()),
    }
}

pub fn without_recipient(mut log: ActivityLog) -> ActivityLog {
    log.recipient = None;
    log
}

pub fn without_invitation(mut log: ActivityLog) -> ActivityLog {
    if let Some(recipient) = log.recipient.as_mut() {
        recipient.invitation = None;
    }
    log
}
