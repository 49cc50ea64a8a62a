use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use strum::{AsRefStr, Display, EnumString};
use utoipa::ToSchema;

#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema, Display, EnumString, AsRefStr,
)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
#[strum(serialize_all = "SCREAMING_SNAKE_CASE")]
pub enum ShiftAssignmentStatus {
    Pending,
    Approved,
    Rejected,
    Cancelled,
}

/// A shift assignment targets an employee, a department or a position (at
/// least one). Only APPROVED assignments are considered by the expiry sweep.
#[derive(Debug, Clone, Serialize, sqlx::FromRow, ToSchema)]
#[schema(
    example = json!({
        "id": 3,
        "employee_id": 1000,
        "department_id": null,
        "position_id": null,
        "shift_type_id": 2,
        "start_date": "2026-01-01",
        "end_date": "2026-03-31",
        "status": "APPROVED"
    })
)]
pub struct ShiftAssignment {
    #[schema(example = 3)]
    pub id: u64,

    #[schema(example = 1000, nullable = true)]
    pub employee_id: Option<u64>,

    #[schema(example = 10, nullable = true)]
    pub department_id: Option<u64>,

    #[schema(example = 4, nullable = true)]
    pub position_id: Option<u64>,

    #[schema(example = 2, nullable = true)]
    pub shift_type_id: Option<u64>,

    #[schema(example = "2026-01-01", value_type = String, format = "date")]
    pub start_date: NaiveDate,

    #[schema(example = "2026-03-31", value_type = String, format = "date", nullable = true)]
    pub end_date: Option<NaiveDate>,

    #[schema(example = "APPROVED")]
    pub status: String,
}
