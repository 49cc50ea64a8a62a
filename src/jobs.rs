//! Daily background sweeps: flagging records left open at end of day and
//! warning about shift assignments that are about to lapse.

use std::time::Duration;

use actix_web::rt::time::sleep;
use anyhow::Result;
use chrono::{NaiveDate, NaiveDateTime, Timelike, Utc};
use sqlx::MySqlPool;
use tracing::{error, info};

use crate::api::notification;
use crate::clock;
use crate::model::attendance::AttendanceRecord;
use crate::model::notification::NotificationKind;
use crate::model::shift::{ShiftAssignment, ShiftAssignmentStatus};
use crate::utils::employee_cache::{self, UNKNOWN_EMPLOYEE};

/// Seconds from `now` until the next wall-clock occurrence of HH:MM.
/// If that time has already passed today (or is exactly now), the run is
/// scheduled for tomorrow.
fn seconds_until(now: NaiveDateTime, hour: u32, minute: u32) -> u64 {
    let target = u64::from(hour.min(23)) * 3600 + u64::from(minute.min(59)) * 60;
    let current = u64::from(now.hour()) * 3600
        + u64::from(now.minute()) * 60
        + u64::from(now.second());

    if target > current {
        target - current
    } else {
        86_400 - current + target
    }
}

/// Same rendering as JavaScript's Date.toDateString(), kept for
/// compatibility with consumers of the notification feed.
fn expiry_date_text(date: NaiveDate) -> String {
    date.format("%a %b %d %Y").to_string()
}

/// Flag today's records whose time-ordered last punch is a clock-in and
/// notify the affected employees. Returns the number of records flagged.
pub async fn flag_missed_punches(pool: &MySqlPool) -> Result<usize> {
    let today = clock::day_key(Utc::now());

    let records =
        sqlx::query_as::<_, AttendanceRecord>("SELECT * FROM attendance_records WHERE date = ?")
            .bind(today)
            .fetch_all(pool)
            .await?;

    let mut flagged = 0usize;

    for record in records {
        if !clock::has_unmatched_clock_in(&record.punches) {
            continue;
        }

        sqlx::query("UPDATE attendance_records SET has_missed_punch = TRUE WHERE id = ?")
            .bind(record.id)
            .execute(pool)
            .await?;

        notification::record(
            pool,
            NotificationKind::MissedPunch,
            Some(record.employee_id),
            "You forgot to clock out today",
        )
        .await?;

        flagged += 1;
    }

    info!("Missed punch check completed: {} employees flagged", flagged);

    Ok(flagged)
}

/// Notify about APPROVED shift assignments ending within the window.
/// Returns the number of expiring assignments found.
pub async fn notify_expiring_shifts(pool: &MySqlPool, window_days: u32) -> Result<usize> {
    let today = clock::day_key(Utc::now());

    let expiring = sqlx::query_as::<_, ShiftAssignment>(
        r#"
        SELECT * FROM shift_assignments
        WHERE status = ? AND end_date BETWEEN ? AND DATE_ADD(?, INTERVAL ? DAY)
        "#,
    )
    .bind(ShiftAssignmentStatus::Approved.as_ref())
    .bind(today)
    .bind(today)
    .bind(window_days)
    .fetch_all(pool)
    .await?;

    let count = expiring.len();

    for assignment in expiring {
        let Some(end_date) = assignment.end_date else {
            continue;
        };

        let employee_name = match assignment.employee_id {
            Some(employee_id) => employee_cache::display_name(pool, employee_id).await,
            None => UNKNOWN_EMPLOYEE.to_string(),
        };

        let message = format!(
            "Shift for employee {} expires on {}",
            employee_name,
            expiry_date_text(end_date)
        );

        // Feed-wide announcement rather than a personal one, so no
        // employee_id is attached.
        notification::record(pool, NotificationKind::ShiftExpiry, None, &message).await?;
    }

    info!(
        "Checked for expiring shifts: {} shifts expiring in the next {} days",
        count, window_days
    );

    Ok(count)
}

/// Background loop that runs the missed punch sweep once a day at HH:MM.
pub async fn run_missed_punch_sweep(pool: MySqlPool, at: (u32, u32)) {
    info!(
        "Starting missed punch sweep task, scheduled daily at {:02}:{:02}",
        at.0, at.1
    );

    loop {
        let wait = seconds_until(Utc::now().naive_utc(), at.0, at.1);
        sleep(Duration::from_secs(wait)).await;

        if let Err(e) = flag_missed_punches(&pool).await {
            error!("Missed punch sweep failed: {}", e);
        }
    }
}

/// Background loop that runs the shift expiry sweep once a day at HH:MM.
pub async fn run_shift_expiry_sweep(pool: MySqlPool, at: (u32, u32), window_days: u32) {
    info!(
        "Starting shift expiry sweep task, scheduled daily at {:02}:{:02}",
        at.0, at.1
    );

    loop {
        let wait = seconds_until(Utc::now().naive_utc(), at.0, at.1);
        sleep(Duration::from_secs(wait)).await;

        if let Err(e) = notify_expiring_shifts(&pool, window_days).await {
            error!("Shift expiry sweep failed: {}", e);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn at(h: u32, m: u32, s: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2026, 3, 2)
            .unwrap()
            .and_hms_opt(h, m, s)
            .unwrap()
    }

    #[test]
    fn waits_until_later_today() {
        assert_eq!(seconds_until(at(17, 0, 0), 18, 0), 3600);
        assert_eq!(seconds_until(at(17, 59, 30), 18, 0), 30);
    }

    #[test]
    fn rolls_over_to_tomorrow_when_passed() {
        // 23:30 -> 08:00 next day: 30 min + 8 h
        assert_eq!(seconds_until(at(23, 30, 0), 8, 0), 30 * 60 + 8 * 3600);
        // exactly on the mark waits a full day
        assert_eq!(seconds_until(at(18, 0, 0), 18, 0), 86_400);
    }

    #[test]
    fn renders_dates_like_js_to_date_string() {
        let date = NaiveDate::from_ymd_opt(2026, 3, 31).unwrap();
        assert_eq!(expiry_date_text(date), "Tue Mar 31 2026");
    }
}
