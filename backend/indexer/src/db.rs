//! Database layer: migrations, the append-only event log, the ledger
//! snapshot projection and cursor management.
//!
//! Each newly inserted event is folded into `projects` / `pool` inside the
//! same transaction, so the snapshot always reflects exactly the events in
//! the log and satisfies
//!
//! ```text
//! pool.balance == pool.reserve + Σ (contributions − allocated)
//! ```

use std::str::FromStr;

use sqlx::sqlite::{SqliteConnectOptions, SqlitePoolOptions};
use sqlx::{Sqlite, SqlitePool, Transaction};
use tracing::{info, warn};

use crate::errors::{IndexerError, Result};
use crate::events::{parse_amount, CcDaoEvent, EventKind, EventRecord, PoolRecord, ProjectRecord};

/// Establish a SQLite connection pool and run pending migrations.
pub async fn init_pool(database_url: &str) -> Result<SqlitePool> {
    let url = if database_url.starts_with("sqlite:") {
        database_url.to_string()
    } else {
        format!("sqlite:{database_url}")
    };
    let options = SqliteConnectOptions::from_str(&url)?.create_if_missing(true);
    connect(options, 5).await
}

async fn connect(options: SqliteConnectOptions, max_connections: u32) -> Result<SqlitePool> {
    let pool = SqlitePoolOptions::new()
        .max_connections(max_connections)
        .connect_with(options)
        .await?;

    sqlx::migrate!("./migrations").run(&pool).await?;
    info!("Database migrations applied successfully");
    Ok(pool)
}

// ─────────────────────────────────────────────────────────
// Cursor helpers
// ─────────────────────────────────────────────────────────

/// Read the last-seen ledger; `0` when nothing has been indexed yet.
pub async fn get_last_ledger(pool: &SqlitePool) -> Result<i64> {
    let row: Option<(i64,)> = sqlx::query_as("SELECT last_ledger FROM indexer_cursor WHERE id = 1")
        .fetch_optional(pool)
        .await?;
    Ok(row.map(|(v,)| v).unwrap_or(0))
}

/// Persist the last-seen ledger and the pagination cursor.
pub async fn save_cursor(
    pool: &SqlitePool,
    last_ledger: i64,
    last_cursor: Option<&str>,
) -> Result<()> {
    sqlx::query("UPDATE indexer_cursor SET last_ledger = ?1, last_cursor = ?2 WHERE id = 1")
        .bind(last_ledger)
        .bind(last_cursor)
        .execute(pool)
        .await?;
    Ok(())
}

/// Read back the raw cursor string (used to resume pagination mid-ledger).
pub async fn get_cursor_string(pool: &SqlitePool) -> Result<Option<String>> {
    let row: Option<(Option<String>,)> =
        sqlx::query_as("SELECT last_cursor FROM indexer_cursor WHERE id = 1")
            .fetch_optional(pool)
            .await?;
    Ok(row.and_then(|(v,)| v))
}

// ─────────────────────────────────────────────────────────
// Event writes
// ─────────────────────────────────────────────────────────

/// Persist a batch of decoded events and fold the new ones into the snapshot.
///
/// Events whose `event_id` is already stored are skipped, so replaying a
/// page is harmless. An event missing the amount or project the snapshot
/// needs is stored as `unknown` and left out of the snapshot, so one bad
/// event never blocks the rest of the page. Returns the number of newly
/// stored events.
pub async fn insert_events(pool: &SqlitePool, events: &[CcDaoEvent]) -> Result<usize> {
    let mut tx = pool.begin().await?;
    let mut count = 0usize;

    for ev in events {
        let kind = match ev.check_snapshot_fields() {
            Ok(()) => ev.kind,
            Err(e) => {
                warn!("Storing event {} as unknown: {e}", ev.event_id);
                EventKind::Unknown
            }
        };

        let rows_affected = sqlx::query(
            r#"
            INSERT OR IGNORE INTO events
                (event_id, event_type, project_id, actor, amount, ledger, timestamp,
                 contract_id, tx_hash)
            VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9)
            "#,
        )
        .bind(&ev.event_id)
        .bind(kind.as_str())
        .bind(&ev.project_id)
        .bind(&ev.actor)
        .bind(&ev.amount)
        .bind(ev.ledger)
        .bind(ev.timestamp)
        .bind(&ev.contract_id)
        .bind(&ev.tx_hash)
        .execute(&mut *tx)
        .await?
        .rows_affected();

        if rows_affected == 1 {
            apply_to_snapshot(&mut tx, kind, ev).await?;
            count += 1;
        }
    }

    tx.commit().await?;
    Ok(count)
}

async fn apply_to_snapshot(
    tx: &mut Transaction<'_, Sqlite>,
    kind: EventKind,
    ev: &CcDaoEvent,
) -> Result<()> {
    match kind {
        EventKind::ProjectRegistered => {
            let target = ev.amount_value()?;
            sqlx::query(
                r#"
                INSERT INTO projects (project_id, target, registered_ledger)
                VALUES (?1, ?2, ?3)
                ON CONFLICT (project_id) DO UPDATE
                    SET target = excluded.target,
                        registered_ledger = excluded.registered_ledger
                "#,
            )
            .bind(ev.project()?)
            .bind(target.to_string())
            .bind(ev.ledger)
            .execute(&mut **tx)
            .await?;
        }
        EventKind::FundsReceived => {
            let amount = ev.amount_value()?;
            adjust_pool(tx, amount, amount, ev.ledger).await?;
        }
        EventKind::ProjectCredited => {
            let amount = ev.amount_value()?;
            adjust_project(tx, ev, amount, 0).await?;
            adjust_pool(tx, 0, -amount, ev.ledger).await?;
        }
        EventKind::Allocation => {
            let amount = ev.amount_value()?;
            adjust_project(tx, ev, 0, amount).await?;
            adjust_pool(tx, -amount, 0, ev.ledger).await?;
        }
        EventKind::Unknown => {}
    }
    Ok(())
}

async fn adjust_pool(
    tx: &mut Transaction<'_, Sqlite>,
    balance_delta: i128,
    reserve_delta: i128,
    ledger: i64,
) -> Result<()> {
    let (balance, reserve): (String, String) =
        sqlx::query_as("SELECT balance, reserve FROM pool WHERE id = 1")
            .fetch_one(&mut **tx)
            .await?;

    let balance = checked_add(&balance, balance_delta)?;
    let reserve = checked_add(&reserve, reserve_delta)?;

    sqlx::query(
        "UPDATE pool SET balance = ?1, reserve = ?2, last_ledger = MAX(last_ledger, ?3) WHERE id = 1",
    )
    .bind(balance)
    .bind(reserve)
    .bind(ledger)
    .execute(&mut **tx)
    .await?;
    Ok(())
}

async fn adjust_project(
    tx: &mut Transaction<'_, Sqlite>,
    ev: &CcDaoEvent,
    contributions_delta: i128,
    allocated_delta: i128,
) -> Result<()> {
    let project_id = ev.project()?;
    let row: Option<(String, String)> =
        sqlx::query_as("SELECT contributions, allocated FROM projects WHERE project_id = ?1")
            .bind(project_id)
            .fetch_optional(&mut **tx)
            .await?;

    // Indexing may start after the registration ledger; keep the counters
    // anyway with an unknown (zero) target.
    let (contributions, allocated) = match row {
        Some(row) => row,
        None => {
            warn!("{} for unindexed project {project_id}", ev.kind.as_str());
            sqlx::query("INSERT INTO projects (project_id, target) VALUES (?1, '0')")
                .bind(project_id)
                .execute(&mut **tx)
                .await?;
            ("0".to_string(), "0".to_string())
        }
    };

    sqlx::query("UPDATE projects SET contributions = ?1, allocated = ?2 WHERE project_id = ?3")
        .bind(checked_add(&contributions, contributions_delta)?)
        .bind(checked_add(&allocated, allocated_delta)?)
        .bind(project_id)
        .execute(&mut **tx)
        .await?;
    Ok(())
}

fn checked_add(current: &str, delta: i128) -> Result<String> {
    parse_amount(current)?
        .checked_add(delta)
        .map(|v| v.to_string())
        .ok_or_else(|| IndexerError::Amount(format!("{current} + {delta} overflows")))
}

// ─────────────────────────────────────────────────────────
// Event reads
// ─────────────────────────────────────────────────────────

/// Fetch all events for a given project, ordered by ledger ascending.
pub async fn get_events_for_project(
    pool: &SqlitePool,
    project_id: &str,
) -> Result<Vec<EventRecord>> {
    let rows = sqlx::query_as::<_, EventRecord>(
        r#"
        SELECT id, event_id, event_type, project_id, actor, amount, ledger, timestamp,
               contract_id, tx_hash, created_at
        FROM   events
        WHERE  project_id = ?1
        ORDER  BY ledger ASC, id ASC
        "#,
    )
    .bind(project_id)
    .fetch_all(pool)
    .await?;
    Ok(rows)
}

/// Fetch all events, ordered by ledger ascending.
pub async fn get_all_events(pool: &SqlitePool) -> Result<Vec<EventRecord>> {
    let rows = sqlx::query_as::<_, EventRecord>(
        r#"
        SELECT id, event_id, event_type, project_id, actor, amount, ledger, timestamp,
               contract_id, tx_hash, created_at
        FROM   events
        ORDER  BY ledger ASC, id ASC
        "#,
    )
    .fetch_all(pool)
    .await?;
    Ok(rows)
}

// ─────────────────────────────────────────────────────────
// Snapshot reads
// ─────────────────────────────────────────────────────────

pub async fn get_projects(pool: &SqlitePool) -> Result<Vec<ProjectRecord>> {
    let rows = sqlx::query_as::<_, ProjectRecord>(
        r#"
        SELECT project_id, target, contributions, allocated, registered_ledger
        FROM   projects
        ORDER  BY registered_ledger ASC, project_id ASC
        "#,
    )
    .fetch_all(pool)
    .await?;
    Ok(rows)
}

pub async fn get_project(pool: &SqlitePool, project_id: &str) -> Result<ProjectRecord> {
    sqlx::query_as::<_, ProjectRecord>(
        r#"
        SELECT project_id, target, contributions, allocated, registered_ledger
        FROM   projects
        WHERE  project_id = ?1
        "#,
    )
    .bind(project_id)
    .fetch_optional(pool)
    .await?
    .ok_or_else(|| IndexerError::NotFound(format!("project {project_id}")))
}

pub async fn get_pool(pool: &SqlitePool) -> Result<PoolRecord> {
    let row = sqlx::query_as::<_, PoolRecord>(
        "SELECT balance, reserve, last_ledger FROM pool WHERE id = 1",
    )
    .fetch_one(pool)
    .await?;
    Ok(row)
}
