use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use strum::{AsRefStr, Display, EnumString};
use utoipa::ToSchema;

#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema, Display, EnumString, AsRefStr,
)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
#[strum(serialize_all = "SCREAMING_SNAKE_CASE")]
pub enum NotificationKind {
    CorrectionApproved,
    CorrectionRejected,
    MissedPunch,
    ShiftExpiry,
}

/// Append-only log entry. The service only ever inserts and lists these;
/// delivery to the employee belongs to a downstream consumer.
#[derive(Debug, Clone, Serialize, sqlx::FromRow, ToSchema)]
#[schema(
    example = json!({
        "id": 9,
        "type": "MISSED_PUNCH",
        "employee_id": 1000,
        "message": "You forgot to clock out today",
        "created_at": "2026-03-02T18:00:00Z"
    })
)]
pub struct NotificationLog {
    #[schema(example = 9)]
    pub id: u64,

    #[serde(rename = "type")]
    #[schema(example = "MISSED_PUNCH")]
    pub kind: String,

    #[schema(example = 1000, nullable = true)]
    pub employee_id: Option<u64>,

    #[schema(example = "You forgot to clock out today")]
    pub message: String,

    #[schema(example = "2026-03-02T18:00:00Z", value_type = String, format = "date-time", nullable = true)]
    pub created_at: Option<DateTime<Utc>>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn kinds_render_their_log_names() {
        assert_eq!(NotificationKind::CorrectionApproved.to_string(), "CORRECTION_APPROVED");
        assert_eq!(NotificationKind::MissedPunch.to_string(), "MISSED_PUNCH");
        assert_eq!(NotificationKind::ShiftExpiry.to_string(), "SHIFT_EXPIRY");
    }
}
