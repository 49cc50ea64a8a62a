use anyhow::Result;
use futures_util::StreamExt;
use moka::future::Cache;
use once_cell::sync::Lazy;
use sqlx::MySqlPool;
use std::time::Duration;

use crate::model::employee::Employee;

pub const UNKNOWN_EMPLOYEE: &str = "Unknown Employee";

/// employee_id -> "First Last (EMP-001)", used when lists and
/// notifications need a human-readable name instead of a bare id.
static EMPLOYEE_NAME_CACHE: Lazy<Cache<u64, String>> = Lazy::new(|| {
    Cache::builder()
        .max_capacity(100_000)
        .time_to_live(Duration::from_secs(3600)) // names change rarely
        .build()
});

/// Display name for an employee, served from cache with a DB fallback.
/// Unknown ids and lookup failures degrade to a placeholder rather than
/// failing the caller.
pub async fn display_name(pool: &MySqlPool, employee_id: u64) -> String {
    if let Some(name) = EMPLOYEE_NAME_CACHE.get(&employee_id).await {
        return name;
    }

    let row = sqlx::query_as::<_, Employee>(
        r#"
        SELECT id, employee_code, first_name, last_name, email,
               department_id, position_id, hire_date, status
        FROM employees
        WHERE id = ?
        "#,
    )
    .bind(employee_id)
    .fetch_optional(pool)
    .await;

    match row {
        Ok(Some(employee)) => {
            let name = employee.display_name();
            EMPLOYEE_NAME_CACHE.insert(employee_id, name.clone()).await;
            name
        }
        Ok(None) => UNKNOWN_EMPLOYEE.to_string(),
        Err(e) => {
            log::warn!("Employee name lookup failed for {}: {}", employee_id, e);
            UNKNOWN_EMPLOYEE.to_string()
        }
    }
}

async fn batch_insert(entries: &[(u64, String)]) {
    let futures: Vec<_> = entries
        .iter()
        .map(|(id, name)| EMPLOYEE_NAME_CACHE.insert(*id, name.clone()))
        .collect();

    futures::future::join_all(futures).await;
}

/// Preload active employees into the name cache (batched).
pub async fn warmup_employee_cache(pool: &MySqlPool, batch_size: usize) -> Result<()> {
    let mut stream = sqlx::query_as::<_, Employee>(
        r#"
        SELECT id, employee_code, first_name, last_name, email,
               department_id, position_id, hire_date, status
        FROM employees
        WHERE status = 'active'
        "#,
    )
    .fetch(pool);

    let mut batch = Vec::with_capacity(batch_size);
    let mut total_count = 0usize;

    while let Some(row) = stream.next().await {
        let employee = row?;
        batch.push((employee.id, employee.display_name()));
        total_count += 1;

        if batch.len() >= batch_size {
            batch_insert(&batch).await;
            batch.clear();
        }
    }

    if !batch.is_empty() {
        batch_insert(&batch).await;
    }

    log::info!(
        "Employee name cache warmup complete: {} active employees",
        total_count
    );

    Ok(())
}
