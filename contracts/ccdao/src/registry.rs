//! # Project Registry
//!
//! One-shot registration of funding recipients. Targets are immutable once
//! set and projects are never removed.

use soroban_sdk::{Address, Env};

use crate::events;
use crate::storage;
use crate::types::Project;
use crate::Error;

/// Register `project_id` with a positive funding `target`.
pub fn register(env: &Env, project_id: &Address, target: i128) -> Result<Project, Error> {
    if target <= 0 {
        return Err(Error::InvalidTarget);
    }
    if storage::has_project(env, project_id) {
        return Err(Error::DuplicateProject);
    }

    let project = Project {
        id: project_id.clone(),
        target,
        contributions: 0,
        allocated: 0,
    };
    storage::save_new_project(env, &project);

    events::project_registered(env, project_id, target);
    Ok(project)
}

pub fn lookup(env: &Env, project_id: &Address) -> Result<Project, Error> {
    storage::load_project(env, project_id).ok_or(Error::UnknownProject)
}
