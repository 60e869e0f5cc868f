//! Long-running background task that polls the Soroban RPC and writes
//! decoded CcDAO events to the database.

use std::sync::Arc;
use std::time::Duration;

use reqwest::Client;
use sqlx::SqlitePool;
use tokio_util::sync::CancellationToken;
use tracing::{error, info, warn};

use crate::config::Config;
use crate::db;
use crate::errors::Result;
use crate::rpc;

pub struct IndexerState {
    pub pool: SqlitePool,
    pub config: Config,
    pub client: Client,
}

/// Poll until `shutdown` is cancelled.
pub async fn run(state: Arc<IndexerState>, shutdown: CancellationToken) {
    info!("Indexer starting — contract: {}", state.config.contract_id);

    let last_ledger = match db::get_last_ledger(&state.pool).await {
        Ok(ledger) => ledger,
        Err(e) => {
            error!("Failed to read last indexed ledger: {e}");
            0
        }
    };
    let mut cursor = match db::get_cursor_string(&state.pool).await {
        Ok(cursor) => cursor,
        Err(e) => {
            error!("Failed to read saved cursor: {e}");
            None
        }
    };
    let mut current_ledger = resume_ledger(last_ledger, state.config.start_ledger);

    info!("Resuming from ledger {current_ledger}");

    loop {
        let polled = tokio::select! {
            _ = shutdown.cancelled() => break,
            polled = poll_once(&state, current_ledger, cursor.as_deref()) => polled,
        };

        match polled {
            Ok((next_ledger, next_cursor)) => {
                current_ledger = next_ledger;
                cursor = next_cursor;
            }
            Err(e) => error!("Indexer poll error: {e}"),
        }

        tokio::select! {
            _ = shutdown.cancelled() => break,
            _ = tokio::time::sleep(Duration::from_secs(state.config.poll_interval_secs)) => {}
        }
    }

    info!("Indexer stopped at ledger {current_ledger}");
}

/// The ledger to resume from: the stored one when it is a usable ledger
/// number, otherwise the configured start.
fn resume_ledger(last_ledger: i64, start_ledger: u32) -> u32 {
    match u32::try_from(last_ledger) {
        Ok(0) => start_ledger,
        Ok(ledger) => ledger,
        Err(_) => {
            warn!("Stored ledger {last_ledger} is out of range; starting from {start_ledger}");
            start_ledger
        }
    }
}

/// Perform a single poll iteration.
///
/// Returns `(next_start_ledger, next_cursor)`.
async fn poll_once(
    state: &IndexerState,
    start_ledger: u32,
    cursor: Option<&str>,
) -> Result<(u32, Option<String>)> {
    let config = &state.config;
    let page = rpc::fetch_events(
        &state.client,
        &config.rpc_url,
        &config.contract_id,
        start_ledger,
        cursor,
        config.events_per_page,
    )
    .await?;

    if !page.events.is_empty() {
        let decoded = rpc::decode_events(&page.events, &config.contract_id);
        let inserted = db::insert_events(&state.pool, &decoded).await?;
        info!(
            "Polled {} raw events → {} new records stored",
            page.events.len(),
            inserted
        );
    }

    // The cursor carries pagination; the ledger only matters when it is absent.
    let next_ledger = page
        .latest_ledger
        .and_then(|l| u32::try_from(l).ok())
        .map_or(start_ledger, |l| l.max(start_ledger));

    db::save_cursor(&state.pool, i64::from(next_ledger), page.cursor.as_deref()).await?;

    Ok((next_ledger, page.cursor))
}
