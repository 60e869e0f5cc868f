//! # Types
//!
//! Shared data structures used across all modules of the CcDAO contract.
//!
//! ## Config / State split
//!
//! A `Project` is stored as two separate ledger entries:
//!
//! - [`ProjectConfig`] — written once at registration; never mutated.
//! - [`ProjectState`] — written on every credit and every allocation.
//!
//! The public API exposes the reconstructed [`Project`] struct.
//!
//! ## Per-project lifecycle
//!
//! ```text
//! Unregistered ──register──► Registered(target)
//!                              │  contributions == allocated
//!                              ▼          ▲
//!                   credit     │          │ allocate
//!                              ▼          │
//!                              contributions > allocated
//! ```
//!
//! There is no terminal state: a project stays allocatable as long as new
//! contributions keep arriving.

use soroban_sdk::{contracttype, Address, String};

use crate::pricer::BondingCurve;

/// Deployment-time configuration, fixed by the constructor.
#[contracttype]
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct DaoConfig {
    /// Human-readable DAO name.
    pub name: String,
    /// Sole account allowed to register projects.
    pub admin: Address,
    /// Asset contract whose units are pooled and released.
    pub token: Address,
    /// Pricing curve used to size every allocation.
    pub curve: BondingCurve,
}

/// Immutable project configuration, written once at registration.
#[contracttype]
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct ProjectConfig {
    pub id: Address,
    pub target: i128,
}

/// Mutable project counters.
#[contracttype]
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct ProjectState {
    pub contributions: i128,
    pub allocated: i128,
}

impl ProjectState {
    pub fn outstanding(&self) -> i128 {
        self.contributions - self.allocated
    }
}

/// Full representation of a funding project.
///
/// Reconstructed from the split `ProjectConfig` + `ProjectState` entries.
#[contracttype]
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct Project {
    /// Project address; also the recipient of every allocation.
    pub id: Address,
    /// Declared funding target. Aspirational: contributions may exceed it.
    pub target: i128,
    /// Cumulative amount attributed to the project.
    pub contributions: i128,
    /// Cumulative amount released to the project.
    pub allocated: i128,
}

impl Project {
    /// Contributions not yet released.
    pub fn outstanding(&self) -> i128 {
        self.contributions - self.allocated
    }

    /// How far contributions still sit below the target (never negative).
    pub fn shortfall(&self) -> i128 {
        if self.contributions >= self.target {
            0
        } else {
            self.target - self.contributions
        }
    }
}
