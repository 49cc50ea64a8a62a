use actix_web::{HttpResponse, web};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use serde_json::json;
use sqlx::MySqlPool;
use tracing::info;
use utoipa::{IntoParams, ToSchema};

use crate::auth::auth::AuthUser;
use crate::error::ApiError;
use crate::model::shift::{ShiftAssignment, ShiftAssignmentStatus};
use crate::utils::employee_cache;

#[derive(Deserialize, ToSchema)]
pub struct CreateShiftAssignment {
    #[schema(example = 1000)]
    pub employee_id: Option<u64>,

    #[schema(example = 10)]
    pub department_id: Option<u64>,

    #[schema(example = 4)]
    pub position_id: Option<u64>,

    #[schema(example = 2)]
    pub shift_type_id: Option<u64>,

    #[schema(example = "2026-01-01", value_type = String, format = "date")]
    pub start_date: NaiveDate,

    #[schema(example = "2026-03-31", value_type = String, format = "date")]
    pub end_date: Option<NaiveDate>,

    /// Defaults to PENDING.
    #[schema(example = "APPROVED")]
    pub status: Option<ShiftAssignmentStatus>,
}

/// Partial update; absent fields keep their stored values.
#[derive(Deserialize, ToSchema)]
pub struct UpdateShiftAssignment {
    pub employee_id: Option<u64>,
    pub department_id: Option<u64>,
    pub position_id: Option<u64>,
    pub shift_type_id: Option<u64>,

    #[schema(value_type = String, format = "date")]
    pub start_date: Option<NaiveDate>,

    #[schema(value_type = String, format = "date")]
    pub end_date: Option<NaiveDate>,

    pub status: Option<ShiftAssignmentStatus>,
}

#[derive(Deserialize, ToSchema)]
pub struct UpdateShiftStatus {
    #[schema(example = "APPROVED")]
    pub status: ShiftAssignmentStatus,
}

#[derive(Debug, Deserialize, IntoParams)]
pub struct ShiftQuery {
    pub employee_id: Option<u64>,
    pub department_id: Option<u64>,
    /// PENDING, APPROVED, REJECTED or CANCELLED
    pub status: Option<String>,
}

#[derive(Serialize, ToSchema)]
pub struct ShiftEntry {
    #[serde(flatten)]
    pub assignment: ShiftAssignment,

    /// Present only for employee-targeted assignments.
    #[serde(skip_serializing_if = "Option::is_none")]
    #[schema(example = "John Doe (EMP-001)")]
    pub employee_name: Option<String>,
}

async fn fetch_shift(pool: &MySqlPool, id: u64) -> Result<ShiftAssignment, ApiError> {
    sqlx::query_as::<_, ShiftAssignment>("SELECT * FROM shift_assignments WHERE id = ?")
        .bind(id)
        .fetch_optional(pool)
        .await?
        .ok_or_else(|| ApiError::not_found(format!("Shift assignment with ID {id}")))
}

async fn enrich(pool: &MySqlPool, assignments: Vec<ShiftAssignment>) -> Vec<ShiftEntry> {
    let mut entries = Vec::with_capacity(assignments.len());
    for assignment in assignments {
        let employee_name = match assignment.employee_id {
            Some(employee_id) => Some(employee_cache::display_name(pool, employee_id).await),
            None => None,
        };
        entries.push(ShiftEntry {
            assignment,
            employee_name,
        });
    }
    entries
}

/// Assign a shift
#[utoipa::path(
    post,
    path = "/api/v1/shifts",
    request_body = CreateShiftAssignment,
    responses(
        (status = 201, description = "Assignment created", body = ShiftAssignment),
        (status = 400, description = "No assignment target given"),
        (status = 403, description = "HR/Admin only")
    ),
    security(("bearer_auth" = [])),
    tag = "Shifts"
)]
pub async fn assign_shift(
    auth: AuthUser,
    pool: web::Data<MySqlPool>,
    payload: web::Json<CreateShiftAssignment>,
) -> Result<HttpResponse, ApiError> {
    auth.require_hr_or_admin()?;

    let payload = payload.into_inner();

    if payload.employee_id.is_none()
        && payload.department_id.is_none()
        && payload.position_id.is_none()
    {
        return Err(ApiError::InvalidRequest(
            "At least one of employee_id, department_id, or position_id must be provided"
                .to_string(),
        ));
    }

    let status = payload.status.unwrap_or(ShiftAssignmentStatus::Pending);

    let result = sqlx::query(
        r#"
        INSERT INTO shift_assignments
            (employee_id, department_id, position_id, shift_type_id, start_date, end_date, status)
        VALUES (?, ?, ?, ?, ?, ?, ?)
        "#,
    )
    .bind(payload.employee_id)
    .bind(payload.department_id)
    .bind(payload.position_id)
    .bind(payload.shift_type_id)
    .bind(payload.start_date)
    .bind(payload.end_date)
    .bind(status.as_ref())
    .execute(pool.get_ref())
    .await?;

    let assignment = fetch_shift(pool.get_ref(), result.last_insert_id()).await?;

    info!(
        assignment_id = assignment.id,
        status = %status,
        "Shift assigned"
    );

    Ok(HttpResponse::Created().json(assignment))
}

/// List shift assignments
#[utoipa::path(
    get,
    path = "/api/v1/shifts",
    params(ShiftQuery),
    responses(
        (status = 200, description = "Assignments matching the filters, newest first", body = [ShiftEntry])
    ),
    security(("bearer_auth" = [])),
    tag = "Shifts"
)]
pub async fn list_shifts(
    auth: AuthUser,
    pool: web::Data<MySqlPool>,
    query: web::Query<ShiftQuery>,
) -> Result<HttpResponse, ApiError> {
    auth.require_hr_or_admin()?;

    let status_filter = match query.status.as_deref() {
        Some(raw) => Some(
            raw.parse::<ShiftAssignmentStatus>()
                .map_err(|_| ApiError::InvalidRequest(format!("Unknown status: {raw}")))?,
        ),
        None => None,
    };

    let mut conditions = Vec::new();
    let mut bindings: Vec<String> = Vec::new();

    if let Some(employee_id) = query.employee_id {
        conditions.push("employee_id = ?");
        bindings.push(employee_id.to_string());
    }

    if let Some(department_id) = query.department_id {
        conditions.push("department_id = ?");
        bindings.push(department_id.to_string());
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

    let sql = format!(
        "SELECT * FROM shift_assignments {} ORDER BY start_date DESC, id DESC",
        where_clause
    );

    let mut data_query = sqlx::query_as::<_, ShiftAssignment>(&sql);
    for b in &bindings {
        data_query = data_query.bind(b);
    }

    let assignments = data_query.fetch_all(pool.get_ref()).await?;
    let entries = enrich(pool.get_ref(), assignments).await;

    Ok(HttpResponse::Ok().json(entries))
}

/// Get one shift assignment
#[utoipa::path(
    get,
    path = "/api/v1/shifts/{assignment_id}",
    params(("assignment_id" = u64, Path, description = "Shift assignment ID")),
    responses(
        (status = 200, description = "Shift assignment", body = ShiftEntry),
        (status = 404, description = "Not found", body = Object, example = json!({
            "message": "Shift assignment with ID 7 not found"
        }))
    ),
    security(("bearer_auth" = [])),
    tag = "Shifts"
)]
pub async fn get_shift(
    auth: AuthUser,
    pool: web::Data<MySqlPool>,
    path: web::Path<u64>,
) -> Result<HttpResponse, ApiError> {
    let assignment = fetch_shift(pool.get_ref(), path.into_inner()).await?;

    match assignment.employee_id {
        Some(employee_id) => auth.require_self_or_staff(employee_id)?,
        None => auth.require_hr_or_admin()?,
    }

    let employee_name = match assignment.employee_id {
        Some(employee_id) => {
            Some(employee_cache::display_name(pool.get_ref(), employee_id).await)
        }
        None => None,
    };

    Ok(HttpResponse::Ok().json(ShiftEntry {
        assignment,
        employee_name,
    }))
}

/// Shift assignments for one employee
#[utoipa::path(
    get,
    path = "/api/v1/shifts/employee/{employee_id}",
    params(("employee_id" = u64, Path, description = "Employee ID")),
    responses(
        (status = 200, description = "The employee's assignments, newest first", body = [ShiftAssignment]),
        (status = 403, description = "Forbidden")
    ),
    security(("bearer_auth" = [])),
    tag = "Shifts"
)]
pub async fn shifts_by_employee(
    auth: AuthUser,
    pool: web::Data<MySqlPool>,
    path: web::Path<u64>,
) -> Result<HttpResponse, ApiError> {
    let employee_id = path.into_inner();
    auth.require_self_or_staff(employee_id)?;

    let assignments = sqlx::query_as::<_, ShiftAssignment>(
        "SELECT * FROM shift_assignments WHERE employee_id = ? ORDER BY start_date DESC, id DESC",
    )
    .bind(employee_id)
    .fetch_all(pool.get_ref())
    .await?;

    Ok(HttpResponse::Ok().json(assignments))
}

/// Update a shift assignment
#[utoipa::path(
    put,
    path = "/api/v1/shifts/{assignment_id}",
    params(("assignment_id" = u64, Path, description = "Shift assignment ID")),
    request_body = UpdateShiftAssignment,
    responses(
        (status = 200, description = "Updated assignment", body = ShiftAssignment),
        (status = 404, description = "Not found")
    ),
    security(("bearer_auth" = [])),
    tag = "Shifts"
)]
pub async fn update_shift(
    auth: AuthUser,
    pool: web::Data<MySqlPool>,
    path: web::Path<u64>,
    payload: web::Json<UpdateShiftAssignment>,
) -> Result<HttpResponse, ApiError> {
    auth.require_hr_or_admin()?;

    let assignment_id = path.into_inner();
    let payload = payload.into_inner();

    let mut assignment = fetch_shift(pool.get_ref(), assignment_id).await?;

    assignment.employee_id = payload.employee_id.or(assignment.employee_id);
    assignment.department_id = payload.department_id.or(assignment.department_id);
    assignment.position_id = payload.position_id.or(assignment.position_id);
    assignment.shift_type_id = payload.shift_type_id.or(assignment.shift_type_id);
    assignment.start_date = payload.start_date.unwrap_or(assignment.start_date);
    assignment.end_date = payload.end_date.or(assignment.end_date);
    if let Some(status) = payload.status {
        assignment.status = status.as_ref().to_string();
    }

    sqlx::query(
        r#"
        UPDATE shift_assignments
        SET employee_id = ?, department_id = ?, position_id = ?, shift_type_id = ?,
            start_date = ?, end_date = ?, status = ?
        WHERE id = ?
        "#,
    )
    .bind(assignment.employee_id)
    .bind(assignment.department_id)
    .bind(assignment.position_id)
    .bind(assignment.shift_type_id)
    .bind(assignment.start_date)
    .bind(assignment.end_date)
    .bind(&assignment.status)
    .bind(assignment_id)
    .execute(pool.get_ref())
    .await?;

    info!(assignment_id, "Shift assignment updated");

    Ok(HttpResponse::Ok().json(assignment))
}

/// Change a shift assignment's status
#[utoipa::path(
    put,
    path = "/api/v1/shifts/{assignment_id}/status",
    params(("assignment_id" = u64, Path, description = "Shift assignment ID")),
    request_body = UpdateShiftStatus,
    responses(
        (status = 200, description = "Updated assignment", body = ShiftAssignment),
        (status = 404, description = "Not found")
    ),
    security(("bearer_auth" = [])),
    tag = "Shifts"
)]
pub async fn update_shift_status(
    auth: AuthUser,
    pool: web::Data<MySqlPool>,
    path: web::Path<u64>,
    payload: web::Json<UpdateShiftStatus>,
) -> Result<HttpResponse, ApiError> {
    auth.require_hr_or_admin()?;

    let assignment_id = path.into_inner();
    let status = payload.into_inner().status;

    let mut assignment = fetch_shift(pool.get_ref(), assignment_id).await?;

    sqlx::query("UPDATE shift_assignments SET status = ? WHERE id = ?")
        .bind(status.as_ref())
        .bind(assignment_id)
        .execute(pool.get_ref())
        .await?;

    assignment.status = status.as_ref().to_string();

    info!(assignment_id, status = %status, "Shift assignment status changed");

    Ok(HttpResponse::Ok().json(assignment))
}

/// Delete a shift assignment
#[utoipa::path(
    delete,
    path = "/api/v1/shifts/{assignment_id}",
    params(("assignment_id" = u64, Path, description = "Shift assignment ID")),
    responses(
        (status = 200, description = "Deleted", body = Object, example = json!({
            "message": "Shift assignment deleted successfully"
        })),
        (status = 404, description = "Not found")
    ),
    security(("bearer_auth" = [])),
    tag = "Shifts"
)]
pub async fn delete_shift(
    auth: AuthUser,
    pool: web::Data<MySqlPool>,
    path: web::Path<u64>,
) -> Result<HttpResponse, ApiError> {
    auth.require_hr_or_admin()?;

    let assignment_id = path.into_inner();

    let result = sqlx::query("DELETE FROM shift_assignments WHERE id = ?")
        .bind(assignment_id)
        .execute(pool.get_ref())
        .await?;

    if result.rows_affected() == 0 {
        return Err(ApiError::not_found(format!(
            "Shift assignment with ID {assignment_id}"
        )));
    }

    info!(assignment_id, "Shift assignment deleted");

    Ok(HttpResponse::Ok().json(json!({
        "message": "Shift assignment deleted successfully"
    })))
}
