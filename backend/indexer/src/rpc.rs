//! Soroban RPC client: polls `getEvents` and decodes CcDAO events.
//!
//! ## Resilience
//!
//! * Transport errors, HTTP 429 and soft JSON-RPC errors are retried with
//!   exponential back-off from [`INITIAL_BACKOFF_SECS`] up to [`MAX_BACKOFF_SECS`].
//! * `-32600` (invalid request) and `-32601` (unknown method) are returned
//!   immediately; retrying them cannot succeed.

use std::time::Duration;

use base64::{engine::general_purpose::STANDARD, Engine as _};
use reqwest::Client;
use serde::Deserialize;
use serde_json::{json, Value};
use tracing::{debug, warn};

use crate::errors::{IndexerError, Result};
use crate::events::{CcDaoEvent, EventKind};

const MAX_BACKOFF_SECS: u64 = 60;
const INITIAL_BACKOFF_SECS: u64 = 2;

/// `ScValType::SCV_SYMBOL` discriminant in Stellar XDR.
const SCV_SYMBOL: u32 = 15;

// ─────────────────────────────────────────────────────────
// JSON-RPC response shapes
// ─────────────────────────────────────────────────────────

#[derive(Debug, Deserialize)]
pub struct RpcResponse {
    pub result: Option<EventsResult>,
    pub error: Option<RpcError>,
}

#[derive(Debug, Deserialize)]
pub struct RpcError {
    pub code: i64,
    pub message: String,
}

impl RpcError {
    fn is_hard(&self) -> bool {
        self.code == -32600 || self.code == -32601
    }
}

#[derive(Debug, Deserialize)]
pub struct EventsResult {
    pub events: Vec<RawEvent>,
    pub cursor: Option<String>,
    #[serde(rename = "latestLedger")]
    pub latest_ledger: Option<u64>,
}

#[derive(Debug, Deserialize, Clone)]
#[serde(rename_all = "camelCase")]
pub struct RawEvent {
    pub topic: Vec<String>,
    pub value: Value,
    pub contract_id: Option<String>,
    pub tx_hash: Option<String>,
    pub id: Option<String>,
    pub ledger: Option<u64>,
    pub ledger_closed_at: Option<String>,
    pub in_successful_contract_call: Option<bool>,
}

/// One page of `getEvents`.
#[derive(Debug)]
pub struct EventPage {
    pub events: Vec<RawEvent>,
    pub cursor: Option<String>,
    pub latest_ledger: Option<u64>,
}

struct Backoff {
    secs: u64,
}

impl Backoff {
    fn new() -> Self {
        Self {
            secs: INITIAL_BACKOFF_SECS,
        }
    }

    async fn wait(&mut self, reason: &str) {
        warn!("{reason} (will retry in {}s)", self.secs);
        tokio::time::sleep(Duration::from_secs(self.secs)).await;
        self.secs = (self.secs * 2).min(MAX_BACKOFF_SECS);
    }
}

// ─────────────────────────────────────────────────────────
// Public API
// ─────────────────────────────────────────────────────────

/// Fetch a page of events from the RPC.
///
/// * `start_ledger` — the ledger to scan from (inclusive); ignored when a cursor is given.
/// * `cursor`       — opaque pagination cursor from a previous page.
/// * `limit`        — maximum number of events to return.
pub async fn fetch_events(
    client: &Client,
    rpc_url: &str,
    contract_id: &str,
    start_ledger: u32,
    cursor: Option<&str>,
    limit: u32,
) -> Result<EventPage> {
    let mut backoff = Backoff::new();
    let request = json!({
        "jsonrpc": "2.0",
        "id": 1,
        "method": "getEvents",
        "params": build_params(contract_id, start_ledger, cursor, limit),
    });

    loop {
        let resp = match client.post(rpc_url).json(&request).send().await {
            Ok(resp) => resp,
            Err(e) => {
                backoff.wait(&format!("RPC request failed: {e}")).await;
                continue;
            }
        };

        if resp.status() == reqwest::StatusCode::TOO_MANY_REQUESTS {
            backoff.wait("Rate-limited by RPC").await;
            continue;
        }

        let body: RpcResponse = resp.json().await?;

        if let Some(err) = body.error {
            if err.is_hard() {
                return Err(IndexerError::EventParse(format!(
                    "RPC hard error {}: {}",
                    err.code, err.message
                )));
            }
            backoff
                .wait(&format!("RPC soft error {} {}", err.code, err.message))
                .await;
            continue;
        }

        let result = body.result.ok_or_else(|| {
            IndexerError::EventParse("Empty result from getEvents".to_string())
        })?;

        debug!(
            "Fetched {} events (latest_ledger={:?})",
            result.events.len(),
            result.latest_ledger
        );

        return Ok(EventPage {
            events: result.events,
            cursor: result.cursor,
            latest_ledger: result.latest_ledger,
        });
    }
}

fn build_params(contract_id: &str, start_ledger: u32, cursor: Option<&str>, limit: u32) -> Value {
    let mut params = json!({
        "filters": [
            {
                "type": "contract",
                "contractIds": [contract_id]
            }
        ],
        "pagination": {
            "limit": limit
        }
    });

    match cursor {
        Some(cur) => params["pagination"]["cursor"] = json!(cur),
        None => params["startLedger"] = json!(start_ledger),
    }

    params
}

// ─────────────────────────────────────────────────────────
// Event decoding
// ─────────────────────────────────────────────────────────

/// Decode raw RPC events, dropping events from failed invocations.
pub fn decode_events(raw: &[RawEvent], contract_id: &str) -> Vec<CcDaoEvent> {
    raw.iter()
        .filter(|e| e.in_successful_contract_call != Some(false))
        .filter_map(|e| decode_single(e, contract_id))
        .collect()
}

fn decode_single(raw: &RawEvent, contract_id: &str) -> Option<CcDaoEvent> {
    let kind = EventKind::from_topic(&extract_symbol(raw.topic.first()?));

    let ledger = raw.ledger.unwrap_or(0) as i64;
    let timestamp = raw
        .ledger_closed_at
        .as_deref()
        .and_then(parse_iso_to_unix)
        .unwrap_or(0);

    let key = raw.topic.get(1).map(|t| extract_scalar(t));
    let (project_id, actor) = match kind {
        EventKind::FundsReceived => (None, extract_field(&raw.value, &["depositor"]).or(key)),
        k if k.is_project_keyed() => (extract_field(&raw.value, &["project_id"]).or(key), None),
        _ => (key, None),
    };
    let amount = match kind {
        EventKind::ProjectRegistered => extract_field(&raw.value, &["target"]),
        EventKind::Unknown => None,
        _ => extract_field(&raw.value, &["amount"]),
    };

    let tx_hash = normalize_tx_hash(raw.tx_hash.as_deref());
    // Content key for RPCs that omit `id`; identical events in one tx collapse.
    let event_id = raw.id.clone().unwrap_or_else(|| {
        format!(
            "{ledger}-{}-{}-{}-{}",
            tx_hash.as_deref().unwrap_or("notx"),
            kind.as_str(),
            project_id.as_deref().or(actor.as_deref()).unwrap_or("-"),
            amount.as_deref().unwrap_or("-"),
        )
    });

    Some(CcDaoEvent {
        event_id,
        kind,
        project_id,
        actor,
        amount,
        ledger,
        timestamp,
        contract_id: raw
            .contract_id
            .clone()
            .unwrap_or_else(|| contract_id.to_string()),
        tx_hash,
    })
}

/// Read a string or number field out of the decoded event payload.
fn extract_field(value: &Value, keys: &[&str]) -> Option<String> {
    keys.iter().find_map(|key| match value.get(key)? {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        Value::Object(_) => value.get(key)?.get("value").and_then(scalar_to_string),
        _ => None,
    })
}

fn scalar_to_string(v: &Value) -> Option<String> {
    match v {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    }
}

/// Extract the event name from the leading topic.
///
/// Accepts `{"type":"symbol","value":"allocation"}`, a base64 XDR `ScVal`
/// symbol, or the bare symbol string.
fn extract_symbol(raw: &str) -> String {
    if let Ok(v) = serde_json::from_str::<Value>(raw) {
        if let Some(s) = v.get("value").and_then(|x| x.as_str()) {
            return s.to_string();
        }
    }
    if let Some(symbol) = decode_xdr_symbol(raw) {
        return symbol;
    }
    raw.to_string()
}

fn decode_xdr_symbol(raw: &str) -> Option<String> {
    let bytes = STANDARD.decode(raw.trim()).ok()?;
    let discriminant = u32::from_be_bytes(bytes.get(0..4)?.try_into().ok()?);
    if discriminant != SCV_SYMBOL {
        return None;
    }
    let len = u32::from_be_bytes(bytes.get(4..8)?.try_into().ok()?) as usize;
    let body = bytes.get(8..8 + len)?;
    String::from_utf8(body.to_vec()).ok()
}

/// Extract an address or number from a non-leading topic.
fn extract_scalar(raw: &str) -> String {
    if let Ok(v) = serde_json::from_str::<Value>(raw) {
        if let Some(s) = v.get("value").and_then(scalar_to_string) {
            return s;
        }
    }
    raw.to_string()
}

/// Lowercase hex, kept only if it is a 32-byte hash.
fn normalize_tx_hash(raw: Option<&str>) -> Option<String> {
    let lower = raw?.trim().to_ascii_lowercase();
    match hex::decode(&lower) {
        Ok(bytes) if bytes.len() == 32 => Some(lower),
        _ => None,
    }
}

fn parse_iso_to_unix(s: &str) -> Option<i64> {
    chrono::DateTime::parse_from_rfc3339(s)
        .ok()
        .map(|dt| dt.timestamp())
}

// ─────────────────────────────────────────────────────────
// Unit tests
// ─────────────────────────────────────────────────────────
