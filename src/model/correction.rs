use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use sqlx::types::Json;
use strum::{AsRefStr, Display, EnumString};
use utoipa::ToSchema;

use super::attendance::Punch;

#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema, Display, EnumString, AsRefStr,
)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
#[strum(serialize_all = "SCREAMING_SNAKE_CASE")]
pub enum CorrectionStatus {
    Submitted,
    Approved,
    Rejected,
}

#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema, Display, EnumString, AsRefStr,
)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
#[strum(serialize_all = "SCREAMING_SNAKE_CASE")]
pub enum ReviewAction {
    Approve,
    Reject,
}

impl CorrectionStatus {
    /// The only legal review transition. A request moves out of SUBMITTED
    /// exactly once; terminal states never move again.
    pub fn review(self, action: ReviewAction) -> Option<CorrectionStatus> {
        if self != CorrectionStatus::Submitted {
            return None;
        }
        Some(match action {
            ReviewAction::Approve => CorrectionStatus::Approved,
            ReviewAction::Reject => CorrectionStatus::Rejected,
        })
    }
}

/// An employee-initiated proposal to replace a day's punches. Holds a weak
/// reference to the attendance record (resolved by a separate read, never a
/// join). Reviewed exactly once: SUBMITTED -> APPROVED | REJECTED.
#[derive(Debug, Clone, Serialize, sqlx::FromRow, ToSchema)]
#[schema(
    example = json!({
        "id": 12,
        "employee_id": 1000,
        "attendance_record_id": 1,
        "date": "2026-03-02",
        "requested_punches": [
            { "type": "IN", "time": "2026-03-02T09:05:00Z" },
            { "type": "OUT", "time": "2026-03-02T17:35:00Z" }
        ],
        "reason": "Badge reader was down",
        "status": "SUBMITTED"
    })
)]
pub struct CorrectionRequest {
    #[schema(example = 12)]
    pub id: u64,

    #[schema(example = 1000)]
    pub employee_id: u64,

    #[schema(example = 1, nullable = true)]
    pub attendance_record_id: Option<u64>,

    #[schema(example = "2026-03-02", value_type = String, format = "date")]
    pub date: NaiveDate,

    #[schema(value_type = Vec<Punch>)]
    pub requested_punches: Json<Vec<Punch>>,

    #[schema(example = "Badge reader was down")]
    pub reason: String,

    #[schema(example = "SUBMITTED")]
    pub status: String,

    #[schema(example = 7, nullable = true)]
    pub reviewed_by: Option<u64>,

    #[schema(example = "Confirmed with reception", nullable = true)]
    pub review_comment: Option<String>,

    #[schema(example = "2026-03-03T10:00:00Z", value_type = String, format = "date-time", nullable = true)]
    pub reviewed_at: Option<DateTime<Utc>>,

    #[schema(example = "2026-03-02T18:00:00Z", value_type = String, format = "date-time", nullable = true)]
    pub created_at: Option<DateTime<Utc>>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn status_round_trips_through_strings() {
        assert_eq!(CorrectionStatus::Submitted.to_string(), "SUBMITTED");
        assert_eq!(
            "APPROVED".parse::<CorrectionStatus>().unwrap(),
            CorrectionStatus::Approved
        );
    }

    #[test]
    fn review_action_parses_wire_values() {
        let approve: ReviewAction = serde_json::from_str(r#""APPROVE""#).unwrap();
        assert_eq!(approve, ReviewAction::Approve);
        let reject: ReviewAction = serde_json::from_str(r#""REJECT""#).unwrap();
        assert_eq!(reject, ReviewAction::Reject);
    }

    #[test]
    fn review_moves_out_of_submitted_exactly_once() {
        assert_eq!(
            CorrectionStatus::Submitted.review(ReviewAction::Approve),
            Some(CorrectionStatus::Approved)
        );
        assert_eq!(
            CorrectionStatus::Submitted.review(ReviewAction::Reject),
            Some(CorrectionStatus::Rejected)
        );
        assert_eq!(CorrectionStatus::Approved.review(ReviewAction::Reject), None);
        assert_eq!(CorrectionStatus::Rejected.review(ReviewAction::Approve), None);
    }
}
