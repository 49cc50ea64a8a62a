use actix_web::{HttpResponse, web};
use chrono::Utc;
use serde::Deserialize;
use sqlx::MySqlPool;
use tracing::debug;
use utoipa::IntoParams;

use crate::auth::auth::AuthUser;
use crate::error::{ApiError, ApiResult};
use crate::model::notification::{NotificationKind, NotificationLog};

/// Append one entry to the notification log. The log is write-only for the
/// attendance core; delivery is someone else's job.
pub(crate) async fn record(
    pool: &MySqlPool,
    kind: NotificationKind,
    employee_id: Option<u64>,
    message: &str,
) -> ApiResult<()> {
    sqlx::query(
        r#"
        INSERT INTO notification_log (kind, employee_id, message, created_at)
        VALUES (?, ?, ?, ?)
        "#,
    )
    .bind(kind.as_ref())
    .bind(employee_id)
    .bind(message)
    .bind(Utc::now())
    .execute(pool)
    .await?;

    Ok(())
}

#[derive(Debug, Deserialize, IntoParams)]
pub struct NotificationQuery {
    pub page: Option<u32>,
    pub per_page: Option<u32>,
    pub employee_id: Option<u64>,
    /// CORRECTION_APPROVED, CORRECTION_REJECTED, MISSED_PUNCH or SHIFT_EXPIRY
    pub kind: Option<String>,
}

/// List notification log entries
#[utoipa::path(
    get,
    path = "/api/v1/notifications",
    params(NotificationQuery),
    responses(
        (status = 200, description = "Notification log entries, newest first", body = [NotificationLog])
    ),
    security(("bearer_auth" = [])),
    tag = "Notifications"
)]
pub async fn list_notifications(
    auth: AuthUser,
    pool: web::Data<MySqlPool>,
    query: web::Query<NotificationQuery>,
) -> Result<HttpResponse, ApiError> {
    // Employees see their own entries; staff can browse everyone's.
    let employee_filter = if auth.is_employee() {
        Some(auth.employee_id.ok_or_else(|| {
            ApiError::InvalidRequest("No employee record linked to this account".to_string())
        })?)
    } else {
        query.employee_id
    };

    let kind_filter = match query.kind.as_deref() {
        Some(raw) => Some(
            raw.parse::<NotificationKind>()
                .map_err(|_| ApiError::InvalidRequest(format!("Unknown notification kind: {raw}")))?,
        ),
        None => None,
    };

    let page = query.page.unwrap_or(1).max(1);
    let per_page = query.per_page.unwrap_or(20).clamp(1, 100);
    let offset = (page - 1) * per_page;

    let mut conditions = Vec::new();
    let mut bindings: Vec<String> = Vec::new();

    if let Some(employee_id) = employee_filter {
        conditions.push("employee_id = ?");
        bindings.push(employee_id.to_string());
    }

    if let Some(kind) = &kind_filter {
        conditions.push("kind = ?");
        bindings.push(kind.as_ref().to_string());
    }

    let where_clause = if conditions.is_empty() {
        "".to_string()
    } else {
        format!("WHERE {}", conditions.join(" AND "))
    };

    let sql = format!(
        "SELECT * FROM notification_log {} ORDER BY id DESC LIMIT ? OFFSET ?",
        where_clause
    );
    debug!(sql = %sql, "Fetching notifications");

    let mut data_query = sqlx::query_as::<_, NotificationLog>(&sql);
    for b in &bindings {
        data_query = data_query.bind(b);
    }
    data_query = data_query.bind(per_page as i64).bind(offset as i64);

    let entries = data_query.fetch_all(pool.get_ref()).await?;

    Ok(HttpResponse::Ok().json(entries))
}
