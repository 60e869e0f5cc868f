//! # Events
//!
//! Every successful state change publishes exactly one event per effect,
//! in the same invocation that applies it:
//!
//! | Topic                              | Data                |
//! |------------------------------------|---------------------|
//! | `("project_registered", project)`  | [`ProjectRegistered`] |
//! | `("funds_received", depositor)`    | [`FundsReceived`]   |
//! | `("project_credited", project)`    | [`ProjectCredited`] |
//! | `("allocation", project)`          | [`Allocation`]      |
//!
//! The off-chain indexer keys on the leading symbol, so these names are part
//! of the public interface.

use soroban_sdk::{contracttype, Address, Env, Symbol};

pub const PROJECT_REGISTERED: &str = "project_registered";
pub const FUNDS_RECEIVED: &str = "funds_received";
pub const PROJECT_CREDITED: &str = "project_credited";
pub const ALLOCATION: &str = "allocation";

#[contracttype]
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct ProjectRegistered {
    pub project_id: Address,
    pub target: i128,
}

#[contracttype]
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct FundsReceived {
    pub depositor: Address,
    pub amount: i128,
}

/// Part of the pool reserve attributed to a project.
#[contracttype]
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct ProjectCredited {
    pub project_id: Address,
    pub amount: i128,
}

#[contracttype]
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct Allocation {
    pub project_id: Address,
    pub amount: i128,
}

pub fn project_registered(env: &Env, project_id: &Address, target: i128) {
    env.events().publish(
        (Symbol::new(env, PROJECT_REGISTERED), project_id.clone()),
        ProjectRegistered {
            project_id: project_id.clone(),
            target,
        },
    );
}

pub fn funds_received(env: &Env, depositor: &Address, amount: i128) {
    env.events().publish(
        (Symbol::new(env, FUNDS_RECEIVED), depositor.clone()),
        FundsReceived {
            depositor: depositor.clone(),
            amount,
        },
    );
}

pub fn project_credited(env: &Env, project_id: &Address, amount: i128) {
    env.events().publish(
        (Symbol::new(env, PROJECT_CREDITED), project_id.clone()),
        ProjectCredited {
            project_id: project_id.clone(),
            amount,
        },
    );
}

pub fn allocation(env: &Env, project_id: &Address, amount: i128) {
    env.events().publish(
        (Symbol::new(env, ALLOCATION), project_id.clone()),
        Allocation {
            project_id: project_id.clone(),
            amount,
        },
    );
}
