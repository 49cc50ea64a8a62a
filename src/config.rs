use dotenvy::dotenv;
use std::env;

#[derive(Clone)]
pub struct Config {
    pub database_url: String,
    pub jwt_secret: String,
    pub server_addr: String,
    pub access_token_ttl: usize,
    pub refresh_token_ttl: usize,

    // Rate limiting
    pub rate_login_per_min: u32,
    pub rate_register_per_min: u32,
    pub rate_refresh_per_min: u32,
    pub rate_protected_per_min: u32,

    pub api_prefix: String,

    // Punch policy lookups are read-mostly; cached this long.
    pub policy_cache_ttl_secs: u64,

    // Daily sweep triggers, server clock, "HH:MM".
    pub missed_punch_sweep_at: (u32, u32),
    pub shift_expiry_sweep_at: (u32, u32),
    pub shift_expiry_window_days: u32,
}

impl Config {
    pub fn from_env() -> Self {
        dotenv().ok();

        Self {
            server_addr: env::var("SERVER_ADDR").expect("SERVER_ADDR must be set"),
            database_url: env::var("DATABASE_URL").expect("DATABASE_URL must be set"),
            jwt_secret: env::var("JWT_SECRET").expect("JWT_SECRET must be set"),
            access_token_ttl: env::var("ACCESS_TOKEN_TTL")
                .unwrap_or_else(|_| "900".to_string()) // default 15 min
                .parse()
                .unwrap(),
            refresh_token_ttl: env::var("REFRESH_TOKEN_TTL")
                .unwrap_or_else(|_| "604800".to_string()) // default 7 days
                .parse()
                .unwrap(),

            rate_login_per_min: env::var("RATE_LOGIN_PER_MIN")
                .unwrap_or_else(|_| "60".to_string())
                .parse()
                .unwrap(),
            rate_register_per_min: env::var("RATE_REGISTER_PER_MIN")
                .unwrap_or_else(|_| "30".to_string())
                .parse()
                .unwrap(),
            rate_refresh_per_min: env::var("RATE_REFRESH_PER_MIN")
                .unwrap_or_else(|_| "30".to_string())
                .parse()
                .unwrap(),
            rate_protected_per_min: env::var("RATE_PROTECTED_PER_MIN")
                .unwrap_or_else(|_| "1000".to_string())
                .parse()
                .unwrap(),

            api_prefix: env::var("API_PREFIX").unwrap_or_else(|_| "/api/v1".to_string()),

            policy_cache_ttl_secs: env::var("POLICY_CACHE_TTL_SECS")
                .unwrap_or_else(|_| "10".to_string())
                .parse()
                .unwrap(),

            missed_punch_sweep_at: parse_time_of_day(
                &env::var("MISSED_PUNCH_SWEEP_AT").unwrap_or_else(|_| "18:00".to_string()),
            )
            .expect("MISSED_PUNCH_SWEEP_AT must be HH:MM"),
            shift_expiry_sweep_at: parse_time_of_day(
                &env::var("SHIFT_EXPIRY_SWEEP_AT").unwrap_or_else(|_| "08:00".to_string()),
            )
            .expect("SHIFT_EXPIRY_SWEEP_AT must be HH:MM"),
            shift_expiry_window_days: env::var("SHIFT_EXPIRY_WINDOW_DAYS")
                .unwrap_or_else(|_| "7".to_string())
                .parse()
                .unwrap(),
        }
    }
}

fn parse_time_of_day(s: &str) -> Option<(u32, u32)> {
    let (h, m) = s.split_once(':')?;
    let hour: u32 = h.parse().ok()?;
    let minute: u32 = m.parse().ok()?;
    if hour > 23 || minute > 59 {
        return None;
    }
    Some((hour, minute))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_sweep_trigger_times() {
        assert_eq!(parse_time_of_day("18:00"), Some((18, 0)));
        assert_eq!(parse_time_of_day("08:30"), Some((8, 30)));
        assert_eq!(parse_time_of_day("0:5"), Some((0, 5)));
    }

    #[test]
    fn rejects_out_of_range_and_garbage() {
        assert_eq!(parse_time_of_day("24:00"), None);
        assert_eq!(parse_time_of_day("12:60"), None);
        assert_eq!(parse_time_of_day("noon"), None);
        assert_eq!(parse_time_of_day("12"), None);
    }
}
