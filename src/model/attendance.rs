use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use sqlx::types::Json;
use strum::{AsRefStr, Display, EnumString};
use utoipa::ToSchema;

#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema, Display, EnumString, AsRefStr,
)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
#[strum(serialize_all = "SCREAMING_SNAKE_CASE")]
pub enum PunchType {
    In,
    Out,
}

/// A single timestamped clock action. Stored as a JSON array element in the
/// `punches` column, in insertion order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct Punch {
    #[serde(rename = "type")]
    #[schema(example = "IN")]
    pub punch_type: PunchType,

    #[schema(example = "2026-03-02T09:00:00Z", value_type = String, format = "date-time")]
    pub time: DateTime<Utc>,

    #[serde(skip_serializing_if = "Option::is_none")]
    #[schema(example = "Main office", nullable = true)]
    pub location: Option<String>,
}

#[derive(Debug, Clone, Serialize, sqlx::FromRow, ToSchema)]
#[schema(
    example = json!({
        "id": 1,
        "employee_id": 1000,
        "date": "2026-03-02",
        "punches": [
            { "type": "IN", "time": "2026-03-02T09:00:00Z" },
            { "type": "OUT", "time": "2026-03-02T17:30:00Z" }
        ],
        "total_work_minutes": 510,
        "has_missed_punch": false,
        "finalised_for_payroll": false
    })
)]
pub struct AttendanceRecord {
    #[schema(example = 1)]
    pub id: u64,

    #[schema(example = 1000)]
    pub employee_id: u64,

    #[schema(example = "2026-03-02", value_type = String, format = "date")]
    pub date: NaiveDate,

    #[schema(value_type = Vec<Punch>)]
    pub punches: Json<Vec<Punch>>,

    #[schema(example = 510)]
    pub total_work_minutes: i32,

    #[schema(example = false)]
    pub has_missed_punch: bool,

    #[schema(example = false)]
    pub finalised_for_payroll: bool,

    #[schema(example = 7, nullable = true)]
    pub corrected_by: Option<u64>,

    #[schema(example = "Forgot badge", nullable = true)]
    pub correction_reason: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn punch_wire_format_uses_type_key() {
        let punch = Punch {
            punch_type: PunchType::In,
            time: "2026-03-02T09:00:00Z".parse().unwrap(),
            location: None,
        };

        let json = serde_json::to_value(&punch).unwrap();
        assert_eq!(json["type"], "IN");
        assert!(json.get("location").is_none());
    }

    #[test]
    fn punch_deserializes_without_location() {
        let punch: Punch =
            serde_json::from_str(r#"{"type":"OUT","time":"2026-03-02T17:30:00Z"}"#).unwrap();
        assert_eq!(punch.punch_type, PunchType::Out);
        assert_eq!(punch.location, None);
    }

    #[test]
    fn punch_type_round_trips_through_strings() {
        assert_eq!(PunchType::In.to_string(), "IN");
        assert_eq!("OUT".parse::<PunchType>().unwrap(), PunchType::Out);
    }
}
