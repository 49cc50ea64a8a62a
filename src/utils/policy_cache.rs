use moka::future::Cache;
use once_cell::sync::OnceCell;
use sqlx::MySqlPool;
use std::time::Duration;

use crate::error::ApiResult;
use crate::model::settings::{PUNCH_POLICY_KEY, PunchPolicy};

/// Policy reads happen on every clock action; the row almost never changes.
/// Entries expire after the configured TTL, and updates invalidate eagerly,
/// so a clock-in/clock-out pair never straddles a stale policy for longer
/// than the TTL.
static POLICY_CACHE: OnceCell<Cache<String, PunchPolicy>> = OnceCell::new();

const DEFAULT_TTL_SECS: u64 = 10;

fn build(ttl_secs: u64) -> Cache<String, PunchPolicy> {
    Cache::builder()
        .max_capacity(1)
        .time_to_live(Duration::from_secs(ttl_secs))
        .build()
}

/// Called once at startup with the configured TTL. Later calls are no-ops.
pub fn init(ttl_secs: u64) {
    let _ = POLICY_CACHE.set(build(ttl_secs));
}

fn cache() -> &'static Cache<String, PunchPolicy> {
    POLICY_CACHE.get_or_init(|| build(DEFAULT_TTL_SECS))
}

fn parse_stored(value: Option<&str>) -> PunchPolicy {
    value.and_then(|v| v.parse().ok()).unwrap_or_default()
}

/// The active punch policy, via cache. A missing or unparseable settings
/// row falls back to MULTIPLE.
pub async fn current(pool: &MySqlPool) -> ApiResult<PunchPolicy> {
    if let Some(policy) = cache().get(PUNCH_POLICY_KEY).await {
        return Ok(policy);
    }

    let stored: Option<String> =
        sqlx::query_scalar::<_, String>("SELECT value FROM settings WHERE setting_key = ?")
            .bind(PUNCH_POLICY_KEY)
            .fetch_optional(pool)
            .await?;

    let policy = parse_stored(stored.as_deref());
    cache().insert(PUNCH_POLICY_KEY.to_string(), policy).await;

    Ok(policy)
}

/// Drops the cached entry so the next read sees a freshly written policy.
pub async fn invalidate() {
    cache().invalidate(PUNCH_POLICY_KEY).await;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_row_defaults_to_multiple() {
        assert_eq!(parse_stored(None), PunchPolicy::Multiple);
    }

    #[test]
    fn stored_values_parse() {
        assert_eq!(parse_stored(Some("FIRST_LAST")), PunchPolicy::FirstLast);
        assert_eq!(parse_stored(Some("MULTIPLE")), PunchPolicy::Multiple);
    }

    #[test]
    fn garbage_row_defaults_to_multiple() {
        assert_eq!(parse_stored(Some("first_last")), PunchPolicy::Multiple);
        assert_eq!(parse_stored(Some("")), PunchPolicy::Multiple);
    }
}
