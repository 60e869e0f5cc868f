//! # Storage
//!
//! Typed helpers over the two Soroban storage tiers used by CcDAO.
//!
//! ## Instance storage (contract-lifetime TTL)
//!
//! | Key           | Type           | Description                               |
//! |---------------|----------------|-------------------------------------------|
//! | `Config`       | `DaoConfig` | Name, admin, token and curve; set by constructor |
//! | `PoolBalance`  | `i128`      | Aggregate pool balance                            |
//! | `Reserve`      | `i128`      | Part of the pool not attributed yet               |
//! | `Attributed`   | `i128`      | Σ (contributions − allocated) over all projects   |
//! | `ProjectCount` | `u32`       | Number of registered projects                     |
//!
//! Instance TTL is bumped by **7 days** whenever it falls below 1 day remaining.
//!
//! ## Persistent storage (per-entry TTL)
//!
//! | Key                  | Type            | Description                 |
//! |----------------------|-----------------|-----------------------------|
//! | `ProjConfig(addr)`   | `ProjectConfig` | Immutable target            |
//! | `ProjState(addr)`    | `ProjectState`  | Contribution/allocation     |
//! | `ProjectAt(index)`   | `Address`       | Registration-order index    |
//!
//! Every entry point touches a constant number of entries; the project index
//! is only read page by page through [`project_page`].
//!
//! Persistent TTL is bumped by **30 days** whenever it falls below 7 days remaining.

use soroban_sdk::{contracttype, Address, Env, Vec};

use crate::types::{DaoConfig, Project, ProjectConfig, ProjectState};

// ── TTL Constants ────────────────────────────────────────────────────

/// Approximate ledgers per day (~5 seconds per ledger).
const DAY_IN_LEDGERS: u32 = 17_280;

const INSTANCE_BUMP_AMOUNT: u32 = 7 * DAY_IN_LEDGERS;
const INSTANCE_LIFETIME_THRESHOLD: u32 = DAY_IN_LEDGERS;

const PERSISTENT_BUMP_AMOUNT: u32 = 30 * DAY_IN_LEDGERS;
const PERSISTENT_LIFETIME_THRESHOLD: u32 = 7 * DAY_IN_LEDGERS;

/// Largest page returned by [`project_page`].
pub const MAX_PAGE: u32 = 50;

// ── Storage Keys ─────────────────────────────────────────────────────

#[contracttype]
#[derive(Clone, Debug, Eq, PartialEq)]
pub enum DataKey {
    /// Deployment configuration (Instance).
    Config,
    /// Aggregate pool balance (Instance).
    PoolBalance,
    /// Unattributed share of the pool (Instance).
    Reserve,
    /// Running sum of project outstanding balances (Instance).
    Attributed,
    /// Number of registered projects (Instance).
    ProjectCount,
    /// Project registered at a given position (Persistent).
    ProjectAt(u32),
    /// Immutable project configuration (Persistent).
    ProjConfig(Address),
    /// Mutable project counters (Persistent).
    ProjState(Address),
}

// ── Instance Storage Helpers ─────────────────────────────────────────

fn bump_instance(env: &Env) {
    env.storage()
        .instance()
        .extend_ttl(INSTANCE_LIFETIME_THRESHOLD, INSTANCE_BUMP_AMOUNT);
}

/// Write the deployment configuration and zero every pool scalar.
pub fn init(env: &Env, config: &DaoConfig) {
    let instance = env.storage().instance();
    instance.set(&DataKey::Config, config);
    instance.set(&DataKey::PoolBalance, &0i128);
    instance.set(&DataKey::Reserve, &0i128);
    instance.set(&DataKey::Attributed, &0i128);
    instance.set(&DataKey::ProjectCount, &0u32);
    bump_instance(env);
}

/// Panics if the constructor never ran, which the host makes impossible.
pub fn load_config(env: &Env) -> DaoConfig {
    bump_instance(env);
    env.storage()
        .instance()
        .get(&DataKey::Config)
        .expect("config not set")
}

pub fn get_pool_balance(env: &Env) -> i128 {
    env.storage()
        .instance()
        .get(&DataKey::PoolBalance)
        .unwrap_or(0)
}

pub fn set_pool_balance(env: &Env, balance: i128) {
    env.storage()
        .instance()
        .set(&DataKey::PoolBalance, &balance);
    bump_instance(env);
}

pub fn get_reserve(env: &Env) -> i128 {
    env.storage().instance().get(&DataKey::Reserve).unwrap_or(0)
}

pub fn set_reserve(env: &Env, reserve: i128) {
    env.storage().instance().set(&DataKey::Reserve, &reserve);
    bump_instance(env);
}

pub fn get_attributed(env: &Env) -> i128 {
    env.storage()
        .instance()
        .get(&DataKey::Attributed)
        .unwrap_or(0)
}

pub fn set_attributed(env: &Env, attributed: i128) {
    env.storage()
        .instance()
        .set(&DataKey::Attributed, &attributed);
    bump_instance(env);
}

pub fn project_count(env: &Env) -> u32 {
    env.storage()
        .instance()
        .get(&DataKey::ProjectCount)
        .unwrap_or(0)
}

/// Project addresses at positions `start..start + limit`, clamped to
/// [`MAX_PAGE`] entries and to the number of registered projects.
pub fn project_page(env: &Env, start: u32, limit: u32) -> Vec<Address> {
    let end = start
        .saturating_add(limit.min(MAX_PAGE))
        .min(project_count(env));
    let mut page = Vec::new(env);
    for index in start..end {
        let key = DataKey::ProjectAt(index);
        if let Some(id) = env.storage().persistent().get::<_, Address>(&key) {
            bump_persistent(env, &key);
            page.push_back(id);
        }
    }
    page
}

// ── Persistent Storage Helpers ───────────────────────────────────────

fn bump_persistent(env: &Env, key: &DataKey) {
    env.storage()
        .persistent()
        .extend_ttl(key, PERSISTENT_LIFETIME_THRESHOLD, PERSISTENT_BUMP_AMOUNT);
}

pub fn has_project(env: &Env, id: &Address) -> bool {
    env.storage()
        .persistent()
        .has(&DataKey::ProjConfig(id.clone()))
}

/// Store config and zeroed state for a new project and append it to the index.
pub fn save_new_project(env: &Env, project: &Project) {
    let config_key = DataKey::ProjConfig(project.id.clone());
    let state_key = DataKey::ProjState(project.id.clone());

    let config = ProjectConfig {
        id: project.id.clone(),
        target: project.target,
    };
    let state = ProjectState {
        contributions: project.contributions,
        allocated: project.allocated,
    };

    env.storage().persistent().set(&config_key, &config);
    env.storage().persistent().set(&state_key, &state);
    bump_persistent(env, &config_key);
    bump_persistent(env, &state_key);

    let index = project_count(env);
    let index_key = DataKey::ProjectAt(index);
    env.storage().persistent().set(&index_key, &project.id);
    bump_persistent(env, &index_key);

    env.storage()
        .instance()
        .set(&DataKey::ProjectCount, &(index + 1));
    bump_instance(env);
}

/// Load the full `Project` by combining config and state.
pub fn load_project(env: &Env, id: &Address) -> Option<Project> {
    let config = load_project_config(env, id)?;
    let state = load_project_state(env, id)?;
    Some(Project {
        id: config.id,
        target: config.target,
        contributions: state.contributions,
        allocated: state.allocated,
    })
}

pub fn load_project_config(env: &Env, id: &Address) -> Option<ProjectConfig> {
    let key = DataKey::ProjConfig(id.clone());
    let config: ProjectConfig = env.storage().persistent().get(&key)?;
    bump_persistent(env, &key);
    Some(config)
}

pub fn load_project_state(env: &Env, id: &Address) -> Option<ProjectState> {
    let key = DataKey::ProjState(id.clone());
    let state: ProjectState = env.storage().persistent().get(&key)?;
    bump_persistent(env, &key);
    Some(state)
}

/// Save only the mutable counters (credits and allocations).
pub fn save_project_state(env: &Env, id: &Address, state: &ProjectState) {
    let key = DataKey::ProjState(id.clone());
    env.storage().persistent().set(&key, state);
    bump_persistent(env, &key);
}
