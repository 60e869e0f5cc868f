//! # Fund Ledger
//!
//! Owns the aggregate pool balance, the unattributed reserve and every
//! project's counters. The conservation identity
//!
//! ```text
//! pool_balance == reserve + attributed
//! attributed   == Σ (contributions − allocated)
//! ```
//!
//! holds after every public operation. `attributed` is a running scalar
//! moved by [`credit_project`] and [`release`] in step with the project
//! counters, so checking the identity never walks the project index.
//!
//! Each function checks all of its preconditions before the first write,
//! so an `Err` never leaves a partial update behind.

use soroban_sdk::{Address, Env};

use crate::events;
use crate::registry;
use crate::storage;
use crate::types::{Project, ProjectState};
use crate::Error;

pub fn require_positive(amount: i128) -> Result<(), Error> {
    if amount <= 0 {
        return Err(Error::InvalidAmount);
    }
    Ok(())
}

/// Add `amount` to the pool as unattributed reserve. Returns the new pool balance.
pub fn deposit(env: &Env, depositor: &Address, amount: i128) -> Result<i128, Error> {
    require_positive(amount)?;

    let balance = storage::get_pool_balance(env)
        .checked_add(amount)
        .ok_or(Error::InvalidAmount)?;
    let reserve = storage::get_reserve(env)
        .checked_add(amount)
        .ok_or(Error::InvalidAmount)?;

    storage::set_pool_balance(env, balance);
    storage::set_reserve(env, reserve);

    events::funds_received(env, depositor, amount);
    Ok(balance)
}

/// Attribute `amount` of the reserve to a project's contributions.
pub fn credit_project(env: &Env, project_id: &Address, amount: i128) -> Result<Project, Error> {
    let mut state = storage::load_project_state(env, project_id).ok_or(Error::UnknownProject)?;
    require_positive(amount)?;

    let reserve = storage::get_reserve(env);
    if amount > reserve {
        return Err(Error::InsufficientPoolFunds);
    }
    state.contributions = state
        .contributions
        .checked_add(amount)
        .ok_or(Error::InvalidAmount)?;
    let attributed = storage::get_attributed(env)
        .checked_add(amount)
        .ok_or(Error::InvalidAmount)?;
    assert_counters(&state);

    storage::set_reserve(env, reserve - amount);
    storage::set_attributed(env, attributed);
    storage::save_project_state(env, project_id, &state);

    events::project_credited(env, project_id, amount);
    registry::lookup(env, project_id)
}

/// Credit the project from the reserve up to its target, if it is short.
///
/// Returns the project as it stands afterwards.
pub fn fund_toward_target(env: &Env, project: Project) -> Result<Project, Error> {
    let credit = project.shortfall().min(storage::get_reserve(env));
    if credit <= 0 {
        return Ok(project);
    }
    credit_project(env, &project.id, credit)
}

/// Move `amount` of a project's outstanding balance out of the pool.
pub fn release(env: &Env, project_id: &Address, amount: i128) -> Result<Project, Error> {
    require_positive(amount)?;
    let mut state = storage::load_project_state(env, project_id).ok_or(Error::UnknownProject)?;

    let balance = storage::get_pool_balance(env);
    if amount > balance {
        return Err(Error::InsufficientPoolFunds);
    }
    if amount > state.outstanding() {
        return Err(Error::InsufficientProjectAllocationRoom);
    }
    state.allocated += amount;
    assert_counters(&state);

    storage::set_pool_balance(env, balance - amount);
    storage::set_attributed(env, storage::get_attributed(env) - amount);
    storage::save_project_state(env, project_id, &state);

    registry::lookup(env, project_id)
}

/// Check the conservation identity over the pool scalars.
///
/// A mismatch is a defect in this contract, never a caller error, so it
/// aborts the invocation instead of returning an `Error`.
pub fn assert_conserved(env: &Env) {
    let balance = storage::get_pool_balance(env);
    let reserve = storage::get_reserve(env);
    let attributed = storage::get_attributed(env);
    if reserve < 0 || attributed < 0 || balance != reserve + attributed {
        panic!("pool balance does not match reserve plus outstanding project balances");
    }
}

fn assert_counters(state: &ProjectState) {
    if state.allocated < 0 || state.allocated > state.contributions {
        panic!("project allocated outside [0, contributions]");
    }
}

#[cfg(test)]
mod tests {
    use soroban_sdk::{testutils::Address as _, Address, Env, String};

    use super::*;
    use crate::{BondingCurve, CcDao};

    type Snapshot = (i128, i128, i128, Option<ProjectState>);

    fn setup() -> (Env, Address) {
        let env = Env::default();
        let curve = BondingCurve {
            base_rate: 5_000,
            slope: 10,
        };
        let contract_id = env.register(
            CcDao,
            (
                String::from_str(&env, "Rhizome"),
                Address::generate(&env),
                Address::generate(&env),
                curve,
            ),
        );
        (env, contract_id)
    }

    fn snapshot(env: &Env, project_id: &Address) -> Snapshot {
        (
            storage::get_pool_balance(env),
            storage::get_reserve(env),
            storage::get_attributed(env),
            storage::load_project_state(env, project_id),
        )
    }

    /// A project holding `credited` out of a pool of `deposited`.
    fn funded_project(env: &Env, deposited: i128, credited: i128) -> Address {
        let project_id = Address::generate(env);
        let depositor = Address::generate(env);
        registry::register(env, &project_id, 1_000).unwrap();
        deposit(env, &depositor, deposited).unwrap();
        if credited > 0 {
            credit_project(env, &project_id, credited).unwrap();
        }
        project_id
    }

    #[test]
    fn credit_unknown_project_changes_nothing() {
        let (env, contract_id) = setup();
        env.as_contract(&contract_id, || {
            funded_project(&env, 500, 0);
            let stranger = Address::generate(&env);
            let before = snapshot(&env, &stranger);

            assert_eq!(
                credit_project(&env, &stranger, 10),
                Err(Error::UnknownProject)
            );
            assert_eq!(snapshot(&env, &stranger), before);
        });
    }

    #[test]
    fn credit_beyond_reserve_changes_nothing() {
        let (env, contract_id) = setup();
        env.as_contract(&contract_id, || {
            let project_id = funded_project(&env, 500, 200);
            let before = snapshot(&env, &project_id);

            assert_eq!(
                credit_project(&env, &project_id, 301),
                Err(Error::InsufficientPoolFunds)
            );
            assert_eq!(
                credit_project(&env, &project_id, 0),
                Err(Error::InvalidAmount)
            );
            assert_eq!(snapshot(&env, &project_id), before);

            credit_project(&env, &project_id, 300).unwrap();
            assert_eq!(storage::get_reserve(&env), 0);
            assert_eq!(storage::get_attributed(&env), 500);
            assert_conserved(&env);
        });
    }

    #[test]
    fn release_beyond_outstanding_changes_nothing() {
        let (env, contract_id) = setup();
        env.as_contract(&contract_id, || {
            let project_id = funded_project(&env, 1_000, 100);
            release(&env, &project_id, 40).unwrap();
            let before = snapshot(&env, &project_id);

            assert_eq!(
                release(&env, &project_id, 61),
                Err(Error::InsufficientProjectAllocationRoom)
            );
            assert_eq!(snapshot(&env, &project_id), before);

            release(&env, &project_id, 60).unwrap();
            assert_eq!(storage::get_attributed(&env), 0);
            assert_eq!(storage::get_pool_balance(&env), 900);
            assert_conserved(&env);
        });
    }

    #[test]
    fn release_beyond_pool_balance_changes_nothing() {
        let (env, contract_id) = setup();
        env.as_contract(&contract_id, || {
            let project_id = funded_project(&env, 100, 100);
            // Pool short of what the project is owed.
            storage::set_pool_balance(&env, 50);
            let before = snapshot(&env, &project_id);

            assert_eq!(
                release(&env, &project_id, 80),
                Err(Error::InsufficientPoolFunds)
            );
            assert_eq!(snapshot(&env, &project_id), before);
        });
    }

    #[test]
    fn release_unknown_project_and_bad_amount() {
        let (env, contract_id) = setup();
        env.as_contract(&contract_id, || {
            let project_id = funded_project(&env, 100, 100);
            let stranger = Address::generate(&env);
            let before = snapshot(&env, &project_id);

            assert_eq!(release(&env, &stranger, 10), Err(Error::UnknownProject));
            assert_eq!(release(&env, &project_id, 0), Err(Error::InvalidAmount));
            assert_eq!(release(&env, &project_id, -1), Err(Error::InvalidAmount));
            assert_eq!(snapshot(&env, &project_id), before);
        });
    }

    #[test]
    fn fund_toward_target_stops_at_target() {
        let (env, contract_id) = setup();
        env.as_contract(&contract_id, || {
            let project_id = funded_project(&env, 5_000, 0);
            let project = registry::lookup(&env, &project_id).unwrap();

            let project = fund_toward_target(&env, project).unwrap();
            assert_eq!(project.contributions, 1_000);
            assert_eq!(storage::get_reserve(&env), 4_000);

            let again = fund_toward_target(&env, project.clone()).unwrap();
            assert_eq!(again, project);
            assert_conserved(&env);
        });
    }
}
