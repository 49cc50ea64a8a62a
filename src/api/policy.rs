use actix_web::{HttpResponse, web};
use serde::Deserialize;
use sqlx::MySqlPool;
use tracing::info;
use utoipa::ToSchema;

use crate::auth::auth::AuthUser;
use crate::error::ApiError;
use crate::model::settings::{PUNCH_POLICY_KEY, PunchPolicy, Setting};
use crate::utils::policy_cache;

#[derive(Deserialize, ToSchema)]
pub struct UpdatePunchPolicy {
    #[schema(example = "FIRST_LAST")]
    pub policy: PunchPolicy,
}

/// Current punch policy
#[utoipa::path(
    get,
    path = "/api/v1/settings/punch-policy",
    responses(
        (status = 200, description = "The stored policy, or the MULTIPLE default when unset", body = Setting)
    ),
    security(("bearer_auth" = [])),
    tag = "Settings"
)]
pub async fn get_punch_policy(
    _auth: AuthUser,
    pool: web::Data<MySqlPool>,
) -> Result<HttpResponse, ApiError> {
    let setting = sqlx::query_as::<_, Setting>(
        "SELECT setting_key, value, description FROM settings WHERE setting_key = ?",
    )
    .bind(PUNCH_POLICY_KEY)
    .fetch_optional(pool.get_ref())
    .await?
    .unwrap_or_else(Setting::default_punch_policy);

    Ok(HttpResponse::Ok().json(setting))
}

/// Change the punch policy
///
/// Takes effect for punches recorded after the policy cache entry expires.
#[utoipa::path(
    put,
    path = "/api/v1/settings/punch-policy",
    request_body = UpdatePunchPolicy,
    responses(
        (status = 200, description = "The stored policy after the update", body = Setting),
        (status = 403, description = "HR/Admin only")
    ),
    security(("bearer_auth" = [])),
    tag = "Settings"
)]
pub async fn update_punch_policy(
    auth: AuthUser,
    pool: web::Data<MySqlPool>,
    payload: web::Json<UpdatePunchPolicy>,
) -> Result<HttpResponse, ApiError> {
    auth.require_hr_or_admin()?;

    let policy = payload.into_inner().policy;

    sqlx::query(
        r#"
        INSERT INTO settings (setting_key, value, description)
        VALUES (?, ?, ?)
        ON DUPLICATE KEY UPDATE value = VALUES(value), description = VALUES(description)
        "#,
    )
    .bind(PUNCH_POLICY_KEY)
    .bind(policy.as_ref())
    .bind(policy.description())
    .execute(pool.get_ref())
    .await?;

    policy_cache::invalidate().await;

    info!(policy = %policy, changed_by = auth.user_id, "Punch policy updated");

    Ok(HttpResponse::Ok().json(Setting {
        setting_key: PUNCH_POLICY_KEY.to_string(),
        value: policy.to_string(),
        description: Some(policy.description().to_string()),
    }))
}
