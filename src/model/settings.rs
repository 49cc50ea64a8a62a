use serde::{Deserialize, Serialize};
use strum::{AsRefStr, Display, EnumString};
use utoipa::ToSchema;

/// Key under which the punch policy lives in the `settings` table.
pub const PUNCH_POLICY_KEY: &str = "PUNCH_POLICY";

/// How repeated same-direction clock actions within one day are merged.
/// MULTIPLE keeps every punch; FIRST_LAST keeps the first clock-in and
/// treats repeated clock-outs as amendments to the single terminal OUT.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema, Display, EnumString, AsRefStr,
)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
#[strum(serialize_all = "SCREAMING_SNAKE_CASE")]
pub enum PunchPolicy {
    Multiple,
    FirstLast,
}

impl Default for PunchPolicy {
    fn default() -> Self {
        PunchPolicy::Multiple
    }
}

impl PunchPolicy {
    /// Human-readable text stored alongside the policy value.
    pub fn description(&self) -> &'static str {
        match self {
            PunchPolicy::Multiple => "Multiple punches allowed per day",
            PunchPolicy::FirstLast => "Only first clock-in and last clock-out count",
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow, ToSchema)]
#[schema(
    example = json!({
        "key": "PUNCH_POLICY",
        "value": "MULTIPLE",
        "description": "Multiple punches allowed per day"
    })
)]
pub struct Setting {
    #[serde(rename = "key")]
    #[schema(example = "PUNCH_POLICY")]
    pub setting_key: String,

    #[schema(example = "MULTIPLE")]
    pub value: String,

    #[schema(example = "Multiple punches allowed per day", nullable = true)]
    pub description: Option<String>,
}

impl Setting {
    /// The response served when no PUNCH_POLICY row exists yet.
    pub fn default_punch_policy() -> Self {
        Setting {
            setting_key: PUNCH_POLICY_KEY.to_string(),
            value: PunchPolicy::Multiple.to_string(),
            description: Some("Default punch policy".to_string()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn policy_round_trips_through_strings() {
        assert_eq!(PunchPolicy::Multiple.to_string(), "MULTIPLE");
        assert_eq!(PunchPolicy::FirstLast.to_string(), "FIRST_LAST");
        assert_eq!("FIRST_LAST".parse::<PunchPolicy>().unwrap(), PunchPolicy::FirstLast);
    }

    #[test]
    fn absent_policy_defaults_to_multiple() {
        assert_eq!(PunchPolicy::default(), PunchPolicy::Multiple);
        let setting = Setting::default_punch_policy();
        assert_eq!(setting.value, "MULTIPLE");
        assert_eq!(setting.description.as_deref(), Some("Default punch policy"));
    }

    #[test]
    fn descriptions_match_policy_values() {
        assert_eq!(
            PunchPolicy::Multiple.description(),
            "Multiple punches allowed per day"
        );
        assert_eq!(
            PunchPolicy::FirstLast.description(),
            "Only first clock-in and last clock-out count"
        );
    }
}
