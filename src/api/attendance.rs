use actix_web::{HttpResponse, web};
use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use sqlx::MySqlPool;
use tracing::{debug, info};
use utoipa::{IntoParams, ToSchema};

use crate::auth::auth::AuthUser;
use crate::clock;
use crate::error::{ApiError, ApiResult};
use crate::model::attendance::{AttendanceRecord, Punch};
use crate::utils::{employee_cache, policy_cache};

#[derive(Deserialize, ToSchema)]
pub struct ClockRequest {
    /// Omitted for plain employees (their own record is implied); staff
    /// must name the employee they are punching for.
    #[schema(example = 42)]
    pub employee_id: Option<u64>,

    /// Punch time; defaults to now.
    #[schema(example = "2025-06-02T09:00:00Z", value_type = String, format = "date-time")]
    pub time: Option<DateTime<Utc>>,

    #[schema(example = "HQ lobby")]
    pub location: Option<String>,
}

#[derive(Serialize, ToSchema)]
pub struct ClockResponse {
    #[schema(example = "Clock-in successful")]
    pub message: String,
    pub record: AttendanceRecord,
}

#[derive(Deserialize, ToSchema)]
pub struct ManualCorrection {
    pub punches: Vec<Punch>,
    #[schema(example = "Badge reader was down")]
    pub reason: String,
    /// Defaults to the authenticated user.
    pub corrected_by: Option<u64>,
}

#[derive(Debug, Deserialize, IntoParams)]
pub struct AttendanceQuery {
    pub page: Option<u32>,
    pub per_page: Option<u32>,
    pub employee_id: Option<u64>,
    pub date_from: Option<NaiveDate>,
    pub date_to: Option<NaiveDate>,
    pub has_missed_punch: Option<bool>,
}

#[derive(Serialize, ToSchema)]
pub struct AttendanceEntry {
    #[serde(flatten)]
    pub record: AttendanceRecord,
    #[schema(example = "John Doe (EMP-001)")]
    pub employee_name: String,
}

#[derive(Serialize, ToSchema)]
pub struct AttendanceListResponse {
    pub data: Vec<AttendanceEntry>,
    #[schema(example = 1)]
    pub page: u32,
    #[schema(example = 20)]
    pub per_page: u32,
    #[schema(example = 57)]
    pub total: i64,
}

/// Upsert keyed on UNIQUE(employee_id, date): at most one record per
/// employee per day, racing calls converge on the same row.
pub(crate) async fn find_or_create_record(
    pool: &MySqlPool,
    employee_id: u64,
    date: NaiveDate,
) -> ApiResult<AttendanceRecord> {
    sqlx::query(
        r#"
        INSERT INTO attendance_records
            (employee_id, date, punches, total_work_minutes, has_missed_punch, finalised_for_payroll)
        VALUES (?, ?, JSON_ARRAY(), 0, FALSE, FALSE)
        ON DUPLICATE KEY UPDATE id = id
        "#,
    )
    .bind(employee_id)
    .bind(date)
    .execute(pool)
    .await?;

    let record = sqlx::query_as::<_, AttendanceRecord>(
        "SELECT * FROM attendance_records WHERE employee_id = ? AND date = ?",
    )
    .bind(employee_id)
    .bind(date)
    .fetch_one(pool)
    .await?;

    Ok(record)
}

pub(crate) async fn persist_record(pool: &MySqlPool, record: &AttendanceRecord) -> ApiResult<()> {
    sqlx::query(
        r#"
        UPDATE attendance_records
        SET punches = ?, total_work_minutes = ?, has_missed_punch = ?,
            finalised_for_payroll = ?, corrected_by = ?, correction_reason = ?
        WHERE id = ?
        "#,
    )
    .bind(&record.punches)
    .bind(record.total_work_minutes)
    .bind(record.has_missed_punch)
    .bind(record.finalised_for_payroll)
    .bind(record.corrected_by)
    .bind(&record.correction_reason)
    .bind(record.id)
    .execute(pool)
    .await?;

    Ok(())
}

pub(crate) async fn find_record(
    pool: &MySqlPool,
    employee_id: u64,
    date: NaiveDate,
) -> ApiResult<Option<AttendanceRecord>> {
    let record = sqlx::query_as::<_, AttendanceRecord>(
        "SELECT * FROM attendance_records WHERE employee_id = ? AND date = ?",
    )
    .bind(employee_id)
    .bind(date)
    .fetch_optional(pool)
    .await?;

    Ok(record)
}

/// Clock in
#[utoipa::path(
    post,
    path = "/api/v1/attendance/clock-in",
    request_body = ClockRequest,
    responses(
        (status = 200, description = "Punch recorded (or no-op under FIRST_LAST)", body = ClockResponse),
        (status = 401, description = "Unauthorized"),
        (status = 403, description = "Forbidden")
    ),
    security(("bearer_auth" = [])),
    tag = "Attendance"
)]
pub async fn clock_in(
    auth: AuthUser,
    pool: web::Data<MySqlPool>,
    payload: web::Json<ClockRequest>,
) -> Result<HttpResponse, ApiError> {
    let payload = payload.into_inner();
    let employee_id = auth.acting_employee_id(payload.employee_id)?;

    let now = Utc::now();
    let today = clock::day_key(now);
    let punch_time = payload.time.unwrap_or(now);

    let policy = policy_cache::current(pool.get_ref()).await?;
    let mut record = find_or_create_record(pool.get_ref(), employee_id, today).await?;

    let outcome = clock::apply_clock_in(&mut record, policy, punch_time, payload.location);
    if outcome == clock::ClockIn::Recorded {
        persist_record(pool.get_ref(), &record).await?;
    }

    info!(employee_id, date = %today, outcome = ?outcome, "Clock-in");

    Ok(HttpResponse::Ok().json(ClockResponse {
        message: outcome.message().to_string(),
        record,
    }))
}

/// Clock out
#[utoipa::path(
    post,
    path = "/api/v1/attendance/clock-out",
    request_body = ClockRequest,
    responses(
        (status = 200, description = "Punch recorded or amended", body = ClockResponse),
        (status = 400, description = "No clock-in today", body = Object, example = json!({
            "message": "No clock-in record found for today. Please clock in first."
        })),
        (status = 401, description = "Unauthorized"),
        (status = 403, description = "Forbidden")
    ),
    security(("bearer_auth" = [])),
    tag = "Attendance"
)]
pub async fn clock_out(
    auth: AuthUser,
    pool: web::Data<MySqlPool>,
    payload: web::Json<ClockRequest>,
) -> Result<HttpResponse, ApiError> {
    let payload = payload.into_inner();
    let employee_id = auth.acting_employee_id(payload.employee_id)?;

    let now = Utc::now();
    let today = clock::day_key(now);
    let punch_time = payload.time.unwrap_or(now);

    let policy = policy_cache::current(pool.get_ref()).await?;

    let mut record = find_record(pool.get_ref(), employee_id, today)
        .await?
        .ok_or(ApiError::NoActiveClockIn)?;

    let outcome = clock::apply_clock_out(&mut record, policy, punch_time, payload.location);
    persist_record(pool.get_ref(), &record).await?;

    info!(
        employee_id,
        date = %today,
        outcome = ?outcome,
        total_work_minutes = record.total_work_minutes,
        "Clock-out"
    );

    Ok(HttpResponse::Ok().json(ClockResponse {
        message: outcome.message().to_string(),
        record,
    }))
}

/// List attendance records
#[utoipa::path(
    get,
    path = "/api/v1/attendance",
    params(AttendanceQuery),
    responses(
        (status = 200, description = "Paginated attendance records, newest day first", body = AttendanceListResponse)
    ),
    security(("bearer_auth" = [])),
    tag = "Attendance"
)]
pub async fn list_attendance(
    auth: AuthUser,
    pool: web::Data<MySqlPool>,
    query: web::Query<AttendanceQuery>,
) -> Result<HttpResponse, ApiError> {
    auth.require_hr_or_admin()?;

    let page = query.page.unwrap_or(1).max(1);
    let per_page = query.per_page.unwrap_or(20).clamp(1, 100);
    let offset = (page - 1) * per_page;

    let mut conditions = Vec::new();
    let mut bindings: Vec<String> = Vec::new();

    if let Some(employee_id) = query.employee_id {
        conditions.push("employee_id = ?");
        bindings.push(employee_id.to_string());
    }

    if let Some(date_from) = query.date_from {
        conditions.push("date >= ?");
        bindings.push(date_from.to_string());
    }

    if let Some(date_to) = query.date_to {
        conditions.push("date <= ?");
        bindings.push(date_to.to_string());
    }

    if let Some(missed) = query.has_missed_punch {
        conditions.push("has_missed_punch = ?");
        bindings.push(i64::from(missed).to_string());
    }

    let where_clause = if conditions.is_empty() {
        "".to_string()
    } else {
        format!("WHERE {}", conditions.join(" AND "))
    };

    let count_sql = format!(
        "SELECT COUNT(*) as total FROM attendance_records {}",
        where_clause
    );
    debug!(sql = %count_sql, bindings = ?bindings, "Counting attendance records");

    let mut count_query = sqlx::query_scalar::<_, i64>(&count_sql);
    for b in &bindings {
        count_query = count_query.bind(b);
    }
    let total = count_query.fetch_one(pool.get_ref()).await?;

    let data_sql = format!(
        "SELECT * FROM attendance_records {} ORDER BY date DESC, id DESC LIMIT ? OFFSET ?",
        where_clause
    );
    debug!(sql = %data_sql, page, per_page, "Fetching attendance records");

    let mut data_query = sqlx::query_as::<_, AttendanceRecord>(&data_sql);
    for b in &bindings {
        data_query = data_query.bind(b);
    }
    data_query = data_query.bind(per_page as i64).bind(offset as i64);

    let records = data_query.fetch_all(pool.get_ref()).await?;

    let mut data = Vec::with_capacity(records.len());
    for record in records {
        let employee_name = employee_cache::display_name(pool.get_ref(), record.employee_id).await;
        data.push(AttendanceEntry {
            record,
            employee_name,
        });
    }

    Ok(HttpResponse::Ok().json(AttendanceListResponse {
        data,
        page,
        per_page,
        total,
    }))
}

/// Get one attendance record
#[utoipa::path(
    get,
    path = "/api/v1/attendance/{record_id}",
    params(("record_id" = u64, Path, description = "Attendance record ID")),
    responses(
        (status = 200, description = "Attendance record", body = AttendanceEntry),
        (status = 404, description = "Not found", body = Object, example = json!({
            "message": "Attendance record with ID 17 not found"
        }))
    ),
    security(("bearer_auth" = [])),
    tag = "Attendance"
)]
pub async fn get_attendance(
    auth: AuthUser,
    pool: web::Data<MySqlPool>,
    path: web::Path<u64>,
) -> Result<HttpResponse, ApiError> {
    let record_id = path.into_inner();

    let record = sqlx::query_as::<_, AttendanceRecord>(
        "SELECT * FROM attendance_records WHERE id = ?",
    )
    .bind(record_id)
    .fetch_optional(pool.get_ref())
    .await?
    .ok_or_else(|| ApiError::not_found(format!("Attendance record with ID {record_id}")))?;

    auth.require_self_or_staff(record.employee_id)?;

    let employee_name = employee_cache::display_name(pool.get_ref(), record.employee_id).await;

    Ok(HttpResponse::Ok().json(AttendanceEntry {
        record,
        employee_name,
    }))
}

/// Attendance history for one employee
#[utoipa::path(
    get,
    path = "/api/v1/attendance/employee/{employee_id}",
    params(("employee_id" = u64, Path, description = "Employee ID")),
    responses(
        (status = 200, description = "Records for the employee, newest day first", body = [AttendanceRecord]),
        (status = 403, description = "Forbidden")
    ),
    security(("bearer_auth" = [])),
    tag = "Attendance"
)]
pub async fn attendance_by_employee(
    auth: AuthUser,
    pool: web::Data<MySqlPool>,
    path: web::Path<u64>,
) -> Result<HttpResponse, ApiError> {
    let employee_id = path.into_inner();
    auth.require_self_or_staff(employee_id)?;

    let records = sqlx::query_as::<_, AttendanceRecord>(
        "SELECT * FROM attendance_records WHERE employee_id = ? ORDER BY date DESC",
    )
    .bind(employee_id)
    .fetch_all(pool.get_ref())
    .await?;

    Ok(HttpResponse::Ok().json(records))
}

/// My record for today
#[utoipa::path(
    get,
    path = "/api/v1/attendance/me/today",
    responses(
        (status = 200, description = "Today's record for the caller, or null", body = AttendanceRecord),
        (status = 400, description = "No employee record linked")
    ),
    security(("bearer_auth" = [])),
    tag = "Attendance"
)]
pub async fn my_attendance_today(
    auth: AuthUser,
    pool: web::Data<MySqlPool>,
) -> Result<HttpResponse, ApiError> {
    let employee_id = auth.employee_id.ok_or_else(|| {
        ApiError::InvalidRequest("No employee record linked to this account".to_string())
    })?;

    let today = clock::day_key(Utc::now());
    let record = find_record(pool.get_ref(), employee_id, today).await?;

    Ok(HttpResponse::Ok().json(record))
}

/// Manual correction, bypassing the request workflow
#[utoipa::path(
    put,
    path = "/api/v1/attendance/{record_id}/correct",
    params(("record_id" = u64, Path, description = "Attendance record ID")),
    request_body = ManualCorrection,
    responses(
        (status = 200, description = "Punches replaced and record finalised", body = ClockResponse),
        (status = 404, description = "Not found")
    ),
    security(("bearer_auth" = [])),
    tag = "Attendance"
)]
pub async fn correct_attendance(
    auth: AuthUser,
    pool: web::Data<MySqlPool>,
    path: web::Path<u64>,
    payload: web::Json<ManualCorrection>,
) -> Result<HttpResponse, ApiError> {
    auth.require_hr_or_admin()?;

    let record_id = path.into_inner();
    let payload = payload.into_inner();

    let mut record = sqlx::query_as::<_, AttendanceRecord>(
        "SELECT * FROM attendance_records WHERE id = ?",
    )
    .bind(record_id)
    .fetch_optional(pool.get_ref())
    .await?
    .ok_or_else(|| ApiError::not_found(format!("Attendance record with ID {record_id}")))?;

    let corrected_by = payload.corrected_by.unwrap_or(auth.user_id);
    clock::apply_correction(&mut record, payload.punches, corrected_by, payload.reason);
    persist_record(pool.get_ref(), &record).await?;

    info!(record_id, corrected_by, "Attendance manually corrected");

    Ok(HttpResponse::Ok().json(ClockResponse {
        message: "Attendance corrected successfully".to_string(),
        record,
    }))
}
