//! # CcDAO Contract
//!
//! A crowdfunding registry: contributors deposit into a shared pool,
//! projects register against a funding target, and the pool releases funds
//! to projects in amounts sized by a bonding curve.
//!
//! | Phase        | Entry Point(s)                                   |
//! |--------------|--------------------------------------------------|
//! | Bootstrap    | `__constructor(name, admin, token, curve)`       |
//! | Registration | [`CcDao::add_project`]                           |
//! | Funding      | [`CcDao::contribute`], [`CcDao::contribute_to`]  |
//! | Release      | [`CcDao::allocate`]                              |
//! | Queries      | `get_project`, `aggregate_balance`, `reserve_balance`, `attributed_balance`, `project_count`, `project_ids`, `price_for`, `quote`, `curve`, `admin`, `dao_name`, `pool_token` |
//!
//! ## Architecture
//!
//! Pricing lives in [`pricer`], project records in [`registry`], balances
//! in [`ledger`]. This file only sequences those modules, moves tokens and
//! publishes the allocation event. Every mutating entry point ends with
//! [`ledger::assert_conserved`].
//!
//! Only the admin fixed at deployment may register projects: `allocate` pays
//! a project from the shared reserve up to its declared target, so
//! registration is what decides who can receive pooled funds.

#![no_std]

use soroban_sdk::{
    contract, contracterror, contractimpl, panic_with_error, token, Address, Env, String, Vec,
};

mod events;
mod ledger;
mod pricer;
mod registry;
mod storage;
mod types;

#[cfg(test)]
mod invariants;
#[cfg(test)]
mod test_events;

pub use events::{Allocation, FundsReceived, ProjectCredited, ProjectRegistered};
pub use pricer::{BondingCurve, PRICE_SCALE};
pub use types::{DaoConfig, Project};

#[contracterror]
#[derive(Copy, Clone, Debug, Eq, PartialEq, PartialOrd, Ord)]
#[repr(u32)]
pub enum Error {
    InvalidTarget                     = 1,
    DuplicateProject                  = 2,
    UnknownProject                    = 3,
    InsufficientPoolFunds             = 4,
    InsufficientProjectAllocationRoom = 5,
    InvalidAmount                     = 6,
    InvalidCurve                      = 7,
}

#[contract]
pub struct CcDao;

#[contractimpl]
impl CcDao {
    /// Fix the DAO name, the registering admin, the pooled token and the
    /// pricing curve.
    pub fn __constructor(
        env: Env,
        name: String,
        admin: Address,
        token: Address,
        curve: BondingCurve,
    ) {
        if !curve.is_valid() {
            panic_with_error!(&env, Error::InvalidCurve);
        }
        storage::init(
            &env,
            &DaoConfig {
                name,
                admin,
                token,
                curve,
            },
        );
    }

    // ─────────────────────────────────────────────────────────
    // Registration
    // ─────────────────────────────────────────────────────────

    /// Register `project_id` with a funding `target`. Requires the admin's
    /// authorisation.
    pub fn add_project(env: Env, project_id: Address, target: i128) -> Result<Project, Error> {
        storage::load_config(&env).admin.require_auth();
        let project = registry::register(&env, &project_id, target)?;
        ledger::assert_conserved(&env);
        Ok(project)
    }

    // ─────────────────────────────────────────────────────────
    // Funding
    // ─────────────────────────────────────────────────────────

    /// Pool-level deposit. Returns the new aggregate balance.
    ///
    /// The funds are not attributed to any project until an allocation
    /// matches a project against its target.
    pub fn contribute(env: Env, depositor: Address, amount: i128) -> Result<i128, Error> {
        depositor.require_auth();
        ledger::require_positive(amount)?;

        let config = storage::load_config(&env);
        token::Client::new(&env, &config.token).transfer(
            &depositor,
            &env.current_contract_address(),
            &amount,
        );

        let balance = ledger::deposit(&env, &depositor, amount)?;
        ledger::assert_conserved(&env);
        Ok(balance)
    }

    /// Deposit and attribute the whole amount to one project.
    pub fn contribute_to(
        env: Env,
        depositor: Address,
        project_id: Address,
        amount: i128,
    ) -> Result<Project, Error> {
        depositor.require_auth();
        registry::lookup(&env, &project_id)?;
        ledger::require_positive(amount)?;

        let config = storage::load_config(&env);
        token::Client::new(&env, &config.token).transfer(
            &depositor,
            &env.current_contract_address(),
            &amount,
        );

        ledger::deposit(&env, &depositor, amount)?;
        let project = ledger::credit_project(&env, &project_id, amount)?;
        ledger::assert_conserved(&env);
        Ok(project)
    }

    // ─────────────────────────────────────────────────────────
    // Release
    // ─────────────────────────────────────────────────────────

    /// Release the curve-priced share of a project's outstanding balance.
    ///
    /// Reserve funds are first credited to the project up to its target.
    /// Returns the amount paid to `project_id`; zero means there was nothing
    /// to release and nothing changed.
    pub fn allocate(env: Env, project_id: Address) -> Result<i128, Error> {
        let project = registry::lookup(&env, &project_id)?;
        let config = storage::load_config(&env);

        let project = ledger::fund_toward_target(&env, project)?;
        let amount = config.curve.allocation_amount(&project);
        if amount > 0 {
            ledger::release(&env, &project_id, amount)?;
            token::Client::new(&env, &config.token).transfer(
                &env.current_contract_address(),
                &project_id,
                &amount,
            );
            events::allocation(&env, &project_id, amount);
        }

        ledger::assert_conserved(&env);
        Ok(amount)
    }

    // ─────────────────────────────────────────────────────────
    // Queries
    // ─────────────────────────────────────────────────────────

    pub fn get_project(env: Env, project_id: Address) -> Result<Project, Error> {
        registry::lookup(&env, &project_id)
    }

    pub fn aggregate_balance(env: Env) -> i128 {
        storage::get_pool_balance(&env)
    }

    /// Part of the pool not yet attributed to any project.
    pub fn reserve_balance(env: Env) -> i128 {
        storage::get_reserve(&env)
    }

    /// Sum of every project's outstanding balance.
    pub fn attributed_balance(env: Env) -> i128 {
        storage::get_attributed(&env)
    }

    pub fn project_count(env: Env) -> u32 {
        storage::project_count(&env)
    }

    /// Registered projects in registration order, `limit` at a time from
    /// position `start`. Pages hold at most 50 addresses.
    pub fn project_ids(env: Env, start: u32, limit: u32) -> Vec<Address> {
        storage::project_page(&env, start, limit)
    }

    pub fn price_for(env: Env, cumulative_input: i128) -> i128 {
        storage::load_config(&env).curve.price_for(cumulative_input)
    }

    /// The amount `allocate(project_id)` would release right now.
    pub fn quote(env: Env, project_id: Address) -> Result<i128, Error> {
        let mut project = registry::lookup(&env, &project_id)?;
        let config = storage::load_config(&env);

        project.contributions += project.shortfall().min(storage::get_reserve(&env));
        Ok(config.curve.allocation_amount(&project))
    }

    pub fn curve(env: Env) -> BondingCurve {
        storage::load_config(&env).curve
    }

    pub fn admin(env: Env) -> Address {
        storage::load_config(&env).admin
    }

    pub fn dao_name(env: Env) -> String {
        storage::load_config(&env).name
    }

    pub fn pool_token(env: Env) -> Address {
        storage::load_config(&env).token
    }
}
