use crate::api::attendance::{
    AttendanceEntry, AttendanceListResponse, ClockRequest, ClockResponse, ManualCorrection,
};
use crate::api::correction::{
    CorrectionEntry, CorrectionListResponse, CreateCorrectionRequest, ReviewCorrection,
};
use crate::api::policy::UpdatePunchPolicy;
use crate::api::shift::{
    CreateShiftAssignment, ShiftEntry, UpdateShiftAssignment, UpdateShiftStatus,
};
use crate::model::attendance::{AttendanceRecord, Punch, PunchType};
use crate::model::correction::{CorrectionRequest, CorrectionStatus, ReviewAction};
use crate::model::notification::{NotificationKind, NotificationLog};
use crate::model::settings::{PunchPolicy, Setting};
use crate::model::shift::{ShiftAssignment, ShiftAssignmentStatus};
use utoipa::Modify;
use utoipa::openapi::security::{HttpAuthScheme, HttpBuilder, SecurityScheme};
use utoipa::{OpenApi, openapi};

#[derive(OpenApi)]
#[openapi(
    info(
        title = "Timekeeper API",
        version = "1.0.0",
        description = r#"
## Time & Attendance Service

This API powers a **time and attendance** service covering the daily punch
clock, correction workflows and shift assignment windows.

### 🔹 Key Features
- **Punch Clock**
  - Clock in / clock out under a MULTIPLE or FIRST_LAST punch policy
  - Worked minutes computed from paired punches
- **Attendance Records**
  - One record per employee per day, with pagination and filters
  - Manual corrections by HR with a full audit trail
- **Correction Requests**
  - Employees request fixes; HR/managers approve or reject
  - Approval rewrites the day's punches and finalises it for payroll
- **Shift Assignments**
  - Assign shifts to employees, departments or positions
  - Daily sweep warns about assignments expiring within a week
- **Notifications**
  - Missed punch, correction outcome and shift expiry feeds

### 🔐 Security
Most endpoints are protected using **JWT Bearer authentication**.
Only authorized roles such as **Admin** or **HR** can access sensitive operations.

### 📦 Response Format
- JSON-based RESTful responses
- Pagination supported for list endpoints

---
Built with **Rust**, **Actix Web**, **SQLx**, and **Utoipa**.
"#,
    ),
    paths(
        crate::api::attendance::clock_in,
        crate::api::attendance::clock_out,
        crate::api::attendance::list_attendance,
        crate::api::attendance::get_attendance,
        crate::api::attendance::attendance_by_employee,
        crate::api::attendance::my_attendance_today,
        crate::api::attendance::correct_attendance,

        crate::api::correction::create_correction_request,
        crate::api::correction::list_correction_requests,
        crate::api::correction::pending_correction_requests,
        crate::api::correction::my_correction_requests,
        crate::api::correction::get_correction_request,
        crate::api::correction::review_correction_request,

        crate::api::policy::get_punch_policy,
        crate::api::policy::update_punch_policy,

        crate::api::shift::assign_shift,
        crate::api::shift::list_shifts,
        crate::api::shift::get_shift,
        crate::api::shift::shifts_by_employee,
        crate::api::shift::update_shift,
        crate::api::shift::update_shift_status,
        crate::api::shift::delete_shift,

        crate::api::notification::list_notifications
    ),
    components(
        schemas(
            PunchType,
            Punch,
            AttendanceRecord,
            ClockRequest,
            ClockResponse,
            ManualCorrection,
            AttendanceEntry,
            AttendanceListResponse,
            CorrectionStatus,
            ReviewAction,
            CorrectionRequest,
            CreateCorrectionRequest,
            ReviewCorrection,
            CorrectionEntry,
            CorrectionListResponse,
            PunchPolicy,
            Setting,
            UpdatePunchPolicy,
            ShiftAssignmentStatus,
            ShiftAssignment,
            CreateShiftAssignment,
            UpdateShiftAssignment,
            UpdateShiftStatus,
            ShiftEntry,
            NotificationKind,
            NotificationLog
        )
    ),
    modifiers(&SecurityAddon),
    tags(
        (name = "Attendance", description = "Punch clock and attendance record APIs"),
        (name = "Corrections", description = "Attendance correction request APIs"),
        (name = "Settings", description = "Punch policy configuration APIs"),
        (name = "Shifts", description = "Shift assignment APIs"),
        (name = "Notifications", description = "Notification feed APIs"),
    )
)]
pub struct ApiDoc;

struct SecurityAddon;

impl Modify for SecurityAddon {
    fn modify(&self, openapi: &mut openapi::OpenApi) {
        if let Some(components) = openapi.components.as_mut() {
            components.add_security_scheme(
                "bearer_auth",
                SecurityScheme::Http(
                    HttpBuilder::new()
                        .scheme(HttpAuthScheme::Bearer)
                        .bearer_format("JWT")
                        .build(),
                ),
            );
        }
    }
}
