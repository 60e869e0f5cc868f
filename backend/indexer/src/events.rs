//! Event and snapshot types for the CcDAO contract.
//!
//! [`EventKind`] mirrors the topics published by `contracts/ccdao/src/events.rs`.
//! [`ProjectRecord`] and [`PoolRecord`] are the snapshot projection built from
//! those events.

use serde::{Deserialize, Serialize};

use crate::errors::{IndexerError, Result};

/// All recognised event kinds from the CcDAO contract.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EventKind {
    /// `project_registered`: a project and its target.
    ProjectRegistered,
    /// `funds_received`: a pool-level deposit.
    FundsReceived,
    /// `project_credited`: reserve attributed to a project.
    ProjectCredited,
    /// `allocation`: funds released to a project.
    Allocation,
    Unknown,
}

impl EventKind {
    /// Parse the leading topic symbol into an [`EventKind`].
    pub fn from_topic(topic: &str) -> Self {
        match topic {
            "project_registered" => Self::ProjectRegistered,
            "funds_received" => Self::FundsReceived,
            "project_credited" => Self::ProjectCredited,
            "allocation" => Self::Allocation,
            _ => Self::Unknown,
        }
    }

    /// Identifier stored in the `event_type` column; equal to the topic.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::ProjectRegistered => "project_registered",
            Self::FundsReceived => "funds_received",
            Self::ProjectCredited => "project_credited",
            Self::Allocation => "allocation",
            Self::Unknown => "unknown",
        }
    }

    /// Whether the second topic is a project address (as opposed to a depositor).
    pub fn is_project_keyed(&self) -> bool {
        matches!(
            self,
            Self::ProjectRegistered | Self::ProjectCredited | Self::Allocation
        )
    }
}

/// A decoded event, ready to be stored.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CcDaoEvent {
    /// RPC event id; the idempotency key.
    pub event_id: String,
    pub kind: EventKind,
    pub project_id: Option<String>,
    /// Depositor for `funds_received`.
    pub actor: Option<String>,
    /// Target for `project_registered`, amount otherwise. Decimal i128.
    pub amount: Option<String>,
    pub ledger: i64,
    pub timestamp: i64,
    pub contract_id: String,
    pub tx_hash: Option<String>,
}

impl CcDaoEvent {
    pub fn amount_value(&self) -> Result<i128> {
        let raw = self.amount.as_deref().ok_or_else(|| {
            IndexerError::Amount(format!(
                "{} event {} has no amount",
                self.kind.as_str(),
                self.event_id
            ))
        })?;
        parse_amount(raw)
    }

    /// Confirm the fields the snapshot projection needs are present and
    /// parse. `Unknown` events need none.
    pub fn check_snapshot_fields(&self) -> Result<()> {
        if self.kind == EventKind::Unknown {
            return Ok(());
        }
        self.amount_value()?;
        if self.kind.is_project_keyed() {
            self.project()?;
        }
        Ok(())
    }

    pub fn project(&self) -> Result<&str> {
        self.project_id.as_deref().ok_or_else(|| {
            IndexerError::EventParse(format!(
                "{} event {} has no project id",
                self.kind.as_str(),
                self.event_id
            ))
        })
    }
}

/// An event row as stored in / read from the database.
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct EventRecord {
    pub id: i64,
    pub event_id: String,
    pub event_type: String,
    pub project_id: Option<String>,
    pub actor: Option<String>,
    pub amount: Option<String>,
    pub ledger: i64,
    pub timestamp: i64,
    pub contract_id: String,
    pub tx_hash: Option<String>,
    pub created_at: i64,
}

/// Per-project snapshot row.
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct ProjectRecord {
    pub project_id: String,
    pub target: String,
    pub contributions: String,
    pub allocated: String,
    pub registered_ledger: i64,
}

impl ProjectRecord {
    /// `contributions - allocated`.
    pub fn outstanding(&self) -> Result<i128> {
        let contributions = parse_amount(&self.contributions)?;
        let allocated = parse_amount(&self.allocated)?;
        Ok(contributions - allocated)
    }
}

/// Aggregate pool snapshot row.
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct PoolRecord {
    pub balance: String,
    pub reserve: String,
    pub last_ledger: i64,
}

pub fn parse_amount(raw: &str) -> Result<i128> {
    raw.trim()
        .parse::<i128>()
        .map_err(|e| IndexerError::Amount(format!("{raw:?}: {e}")))
}
