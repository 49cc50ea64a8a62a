use actix_web::{HttpResponse, web};
use chrono::{NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use sqlx::MySqlPool;
use tracing::{debug, info};
use utoipa::{IntoParams, ToSchema};

use crate::api::attendance::{find_or_create_record, persist_record};
use crate::api::notification;
use crate::auth::auth::AuthUser;
use crate::clock;
use crate::error::ApiError;
use crate::model::attendance::Punch;
use crate::model::correction::{CorrectionRequest, CorrectionStatus, ReviewAction};
use crate::model::notification::NotificationKind;
use crate::utils::employee_cache;

#[derive(Deserialize, ToSchema)]
pub struct CreateCorrectionRequest {
    /// Omitted for plain employees; staff must name the employee.
    #[schema(example = 42)]
    pub employee_id: Option<u64>,

    #[schema(example = "2026-03-02", value_type = String, format = "date")]
    pub date: NaiveDate,

    pub requested_punches: Vec<Punch>,

    #[schema(example = "Badge reader was down")]
    pub reason: String,

    /// Existing record this request targets, if any. Submitting against it
    /// clears its payroll finalisation.
    #[schema(example = 1)]
    pub attendance_record_id: Option<u64>,
}

#[derive(Deserialize, ToSchema)]
pub struct ReviewCorrection {
    #[schema(example = "APPROVE")]
    pub action: ReviewAction,

    #[schema(example = "Confirmed with reception")]
    pub comment: Option<String>,
}

#[derive(Debug, Deserialize, IntoParams)]
pub struct CorrectionQuery {
    pub page: Option<u32>,
    pub per_page: Option<u32>,
    pub employee_id: Option<u64>,
    /// SUBMITTED, APPROVED or REJECTED
    pub status: Option<String>,
}

#[derive(Serialize, ToSchema)]
pub struct CorrectionEntry {
    #[serde(flatten)]
    pub request: CorrectionRequest,
    #[schema(example = "John Doe (EMP-001)")]
    pub employee_name: String,
}

#[derive(Serialize, ToSchema)]
pub struct CorrectionListResponse {
    pub data: Vec<CorrectionEntry>,
    #[schema(example = 1)]
    pub page: u32,
    #[schema(example = 20)]
    pub per_page: u32,
    #[schema(example = 3)]
    pub total: i64,
}

async fn fetch_request(pool: &MySqlPool, id: u64) -> Result<CorrectionRequest, ApiError> {
    sqlx::query_as::<_, CorrectionRequest>("SELECT * FROM correction_requests WHERE id = ?")
        .bind(id)
        .fetch_optional(pool)
        .await?
        .ok_or_else(|| ApiError::not_found(format!("Correction request with ID {id}")))
}

async fn enrich(pool: &MySqlPool, requests: Vec<CorrectionRequest>) -> Vec<CorrectionEntry> {
    let mut entries = Vec::with_capacity(requests.len());
    for request in requests {
        let employee_name = employee_cache::display_name(pool, request.employee_id).await;
        entries.push(CorrectionEntry {
            request,
            employee_name,
        });
    }
    entries
}

/// Submit a correction request
#[utoipa::path(
    post,
    path = "/api/v1/corrections",
    request_body = CreateCorrectionRequest,
    responses(
        (status = 201, description = "Request created in SUBMITTED state", body = CorrectionRequest),
        (status = 400, description = "Invalid request"),
        (status = 403, description = "Forbidden")
    ),
    security(("bearer_auth" = [])),
    tag = "Corrections"
)]
pub async fn create_correction_request(
    auth: AuthUser,
    pool: web::Data<MySqlPool>,
    payload: web::Json<CreateCorrectionRequest>,
) -> Result<HttpResponse, ApiError> {
    let payload = payload.into_inner();
    let employee_id = auth.acting_employee_id(payload.employee_id)?;

    if payload.requested_punches.is_empty() {
        return Err(ApiError::InvalidRequest(
            "requested_punches must not be empty".to_string(),
        ));
    }

    let result = sqlx::query(
        r#"
        INSERT INTO correction_requests
            (employee_id, attendance_record_id, date, requested_punches, reason, status, created_at)
        VALUES (?, ?, ?, ?, ?, ?, ?)
        "#,
    )
    .bind(employee_id)
    .bind(payload.attendance_record_id)
    .bind(payload.date)
    .bind(sqlx::types::Json(&payload.requested_punches))
    .bind(&payload.reason)
    .bind(CorrectionStatus::Submitted.as_ref())
    .bind(Utc::now())
    .execute(pool.get_ref())
    .await?;

    // A fresh request invalidates the targeted record's finalisation.
    // Nonexistent ids are a silent no-op, mirroring the weak reference.
    if let Some(record_id) = payload.attendance_record_id {
        sqlx::query("UPDATE attendance_records SET finalised_for_payroll = FALSE WHERE id = ?")
            .bind(record_id)
            .execute(pool.get_ref())
            .await?;
    }

    let request = fetch_request(pool.get_ref(), result.last_insert_id()).await?;

    info!(
        request_id = request.id,
        employee_id,
        date = %payload.date,
        "Correction request submitted"
    );

    Ok(HttpResponse::Created().json(request))
}

/// List correction requests
#[utoipa::path(
    get,
    path = "/api/v1/corrections",
    params(CorrectionQuery),
    responses(
        (status = 200, description = "Paginated correction requests, newest first", body = CorrectionListResponse)
    ),
    security(("bearer_auth" = [])),
    tag = "Corrections"
)]
pub async fn list_correction_requests(
    auth: AuthUser,
    pool: web::Data<MySqlPool>,
    query: web::Query<CorrectionQuery>,
) -> Result<HttpResponse, ApiError> {
    auth.require_reviewer()?;

    let status_filter = match query.status.as_deref() {
        Some(raw) => Some(
            raw.parse::<CorrectionStatus>()
                .map_err(|_| ApiError::InvalidRequest(format!("Unknown status: {raw}")))?,
        ),
        None => None,
    };

    let page = query.page.unwrap_or(1).max(1);
    let per_page = query.per_page.unwrap_or(20).clamp(1, 100);
    let offset = (page - 1) * per_page;

    let mut conditions = Vec::new();
    let mut bindings: Vec<String> = Vec::new();

    if let Some(employee_id) = query.employee_id {
        conditions.push("employee_id = ?");
        bindings.push(employee_id.to_string());
    }

    if let Some(status) = &status_filter {
        conditions.push("status = ?");
        bindings.push(status.as_ref().to_string());
    }

    let where_clause = if conditions.is_empty() {
        "".to_string()
    } else {
        format!("WHERE {}", conditions.join(" AND "))
    };

    let count_sql = format!(
        "SELECT COUNT(*) as total FROM correction_requests {}",
        where_clause
    );
    debug!(sql = %count_sql, "Counting correction requests");

    let mut count_query = sqlx::query_scalar::<_, i64>(&count_sql);
    for b in &bindings {
        count_query = count_query.bind(b);
    }
    let total = count_query.fetch_one(pool.get_ref()).await?;

    let data_sql = format!(
        "SELECT * FROM correction_requests {} ORDER BY created_at DESC, id DESC LIMIT ? OFFSET ?",
        where_clause
    );

    let mut data_query = sqlx::query_as::<_, CorrectionRequest>(&data_sql);
    for b in &bindings {
        data_query = data_query.bind(b);
    }
    data_query = data_query.bind(per_page as i64).bind(offset as i64);

    let requests = data_query.fetch_all(pool.get_ref()).await?;
    let data = enrich(pool.get_ref(), requests).await;

    Ok(HttpResponse::Ok().json(CorrectionListResponse {
        data,
        page,
        per_page,
        total,
    }))
}

/// Requests still waiting for review
#[utoipa::path(
    get,
    path = "/api/v1/corrections/pending",
    responses(
        (status = 200, description = "SUBMITTED requests, newest first", body = [CorrectionEntry])
    ),
    security(("bearer_auth" = [])),
    tag = "Corrections"
)]
pub async fn pending_correction_requests(
    auth: AuthUser,
    pool: web::Data<MySqlPool>,
) -> Result<HttpResponse, ApiError> {
    auth.require_reviewer()?;

    let requests = sqlx::query_as::<_, CorrectionRequest>(
        "SELECT * FROM correction_requests WHERE status = ? ORDER BY created_at DESC, id DESC",
    )
    .bind(CorrectionStatus::Submitted.as_ref())
    .fetch_all(pool.get_ref())
    .await?;

    let entries = enrich(pool.get_ref(), requests).await;

    Ok(HttpResponse::Ok().json(entries))
}

/// My correction requests
#[utoipa::path(
    get,
    path = "/api/v1/corrections/me",
    responses(
        (status = 200, description = "The caller's requests, newest first", body = [CorrectionRequest]),
        (status = 400, description = "No employee record linked")
    ),
    security(("bearer_auth" = [])),
    tag = "Corrections"
)]
pub async fn my_correction_requests(
    auth: AuthUser,
    pool: web::Data<MySqlPool>,
) -> Result<HttpResponse, ApiError> {
    let employee_id = auth.employee_id.ok_or_else(|| {
        ApiError::InvalidRequest("No employee record linked to this account".to_string())
    })?;

    let requests = sqlx::query_as::<_, CorrectionRequest>(
        "SELECT * FROM correction_requests WHERE employee_id = ? ORDER BY created_at DESC, id DESC",
    )
    .bind(employee_id)
    .fetch_all(pool.get_ref())
    .await?;

    Ok(HttpResponse::Ok().json(requests))
}

/// Get one correction request
#[utoipa::path(
    get,
    path = "/api/v1/corrections/{request_id}",
    params(("request_id" = u64, Path, description = "Correction request ID")),
    responses(
        (status = 200, description = "Correction request", body = CorrectionEntry),
        (status = 404, description = "Not found", body = Object, example = json!({
            "message": "Correction request with ID 12 not found"
        }))
    ),
    security(("bearer_auth" = [])),
    tag = "Corrections"
)]
pub async fn get_correction_request(
    auth: AuthUser,
    pool: web::Data<MySqlPool>,
    path: web::Path<u64>,
) -> Result<HttpResponse, ApiError> {
    let request = fetch_request(pool.get_ref(), path.into_inner()).await?;
    auth.require_self_or_staff(request.employee_id)?;

    let employee_name = employee_cache::display_name(pool.get_ref(), request.employee_id).await;

    Ok(HttpResponse::Ok().json(CorrectionEntry {
        request,
        employee_name,
    }))
}

/// Review a correction request
///
/// A request leaves SUBMITTED exactly once. Approval overwrites the day's
/// attendance record with the requested punches and finalises it for
/// payroll; rejection leaves the record untouched. Both outcomes append a
/// notification for the employee.
#[utoipa::path(
    put,
    path = "/api/v1/corrections/{request_id}/review",
    params(("request_id" = u64, Path, description = "Correction request ID")),
    request_body = ReviewCorrection,
    responses(
        (status = 200, description = "Reviewed request", body = CorrectionRequest),
        (status = 400, description = "Already reviewed", body = Object, example = json!({
            "message": "This request has already been reviewed"
        })),
        (status = 404, description = "Not found")
    ),
    security(("bearer_auth" = [])),
    tag = "Corrections"
)]
pub async fn review_correction_request(
    auth: AuthUser,
    pool: web::Data<MySqlPool>,
    path: web::Path<u64>,
    payload: web::Json<ReviewCorrection>,
) -> Result<HttpResponse, ApiError> {
    auth.require_reviewer()?;

    let request_id = path.into_inner();
    let payload = payload.into_inner();

    let mut request = fetch_request(pool.get_ref(), request_id).await?;

    let status = request
        .status
        .parse::<CorrectionStatus>()
        .ok()
        .and_then(|current| current.review(payload.action))
        .ok_or(ApiError::AlreadyReviewed)?;
    let reviewed_at = Utc::now();

    sqlx::query(
        r#"
        UPDATE correction_requests
        SET status = ?, reviewed_by = ?, review_comment = ?, reviewed_at = ?
        WHERE id = ?
        "#,
    )
    .bind(status.as_ref())
    .bind(auth.user_id)
    .bind(&payload.comment)
    .bind(reviewed_at)
    .bind(request_id)
    .execute(pool.get_ref())
    .await?;

    request.status = status.as_ref().to_string();
    request.reviewed_by = Some(auth.user_id);
    request.review_comment = payload.comment.clone();
    request.reviewed_at = Some(reviewed_at);

    match payload.action {
        ReviewAction::Approve => {
            let mut record =
                find_or_create_record(pool.get_ref(), request.employee_id, request.date).await?;

            clock::apply_correction(
                &mut record,
                request.requested_punches.0.clone(),
                auth.user_id,
                format!("Approved correction request: {}", request.reason),
            );
            persist_record(pool.get_ref(), &record).await?;

            notification::record(
                pool.get_ref(),
                NotificationKind::CorrectionApproved,
                Some(request.employee_id),
                "Your attendance correction request has been approved",
            )
            .await?;
        }
        ReviewAction::Reject => {
            let message = format!(
                "Your attendance correction request has been rejected. Reason: {}",
                payload.comment.as_deref().unwrap_or("No reason provided")
            );
            notification::record(
                pool.get_ref(),
                NotificationKind::CorrectionRejected,
                Some(request.employee_id),
                &message,
            )
            .await?;
        }
    }

    info!(
        request_id,
        reviewer = auth.user_id,
        action = %payload.action,
        "Correction request reviewed"
    );

    Ok(HttpResponse::Ok().json(request))
}
