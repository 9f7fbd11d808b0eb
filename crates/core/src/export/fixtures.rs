//! Shared activity-log fixtures for unit tests.

use activity_export_domain::{ActionKind, ActivityLog, Invitation, Recipient};
use chrono::{DateTime, TimeZone, Utc};

pub(crate) fn at(hour: u32) -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2024, 3, 1, hour, 30, 0).unwrap()
}

pub(crate) fn recipient() -> Recipient {
    Recipient {
        id: "R1".into(),
        customer_number: "C200".into(),
        sender_customer_number: "C100".into(),
        nickname: "Bob".into(),
        sender_name: "Alice".into(),
        sender_country_code: "GB".into(),
        sender_group_member: "01".into(),
        recipient_country_code: "HK".into(),
        recipient_group_member: "07".into(),
        invitation: Some(Invitation { expiry_date: at(23) }),
    }
}

pub(crate) fn log(id: i64, action: ActionKind) -> ActivityLog {
    ActivityLog {
        id,
        action,
        sender_id: "S1".into(),
        activity_time: at(9),
        recipient: Some(recipient()),
    }
}
