#![allow(dead_code)]

extern crate std;

use soroban_sdk::{token, Address};

use crate::{CcDaoClient, Project};

const PAGE: u32 = 50;

/// Every registered project address, walking the paged index.
pub fn all_project_ids(client: &CcDaoClient) -> std::vec::Vec<Address> {
    let count = client.project_count();
    let mut ids = std::vec::Vec::new();
    while (ids.len() as u32) < count {
        let page = client.project_ids(&(ids.len() as u32), &PAGE);
        assert!(!page.is_empty(), "project index has a gap");
        ids.extend(page.iter());
    }
    ids
}

/// INV-1: pool balance equals the unattributed reserve plus every project's
/// outstanding balance, and the running attributed total matches the
/// per-project sum.
pub fn assert_conserved(client: &CcDaoClient) {
    let outstanding: i128 = all_project_ids(client)
        .iter()
        .map(|id| client.get_project(id).outstanding())
        .sum();
    let reserve = client.reserve_balance();
    let balance = client.aggregate_balance();
    assert!(reserve >= 0, "INV-1 violated: negative reserve ({})", reserve);
    assert_eq!(
        client.attributed_balance(),
        outstanding,
        "INV-1 violated: attributed total drifted from project counters"
    );
    assert_eq!(
        balance,
        reserve + outstanding,
        "INV-1 violated: pool {} != reserve {} + outstanding {}",
        balance,
        reserve,
        outstanding
    );
}

/// INV-2: the contract's token holdings back the recorded pool balance exactly.
pub fn assert_pool_backed(client: &CcDaoClient, token: &token::Client) {
    assert_eq!(
        token.balance(&client.address),
        client.aggregate_balance(),
        "INV-2 violated: token holdings differ from pool balance"
    );
}

/// INV-3: per-project counters stay ordered: 0 <= allocated <= contributions.
pub fn assert_project_counters(project: &Project) {
    assert!(project.target > 0, "INV-3 violated: non-positive target");
    assert!(
        project.allocated >= 0 && project.allocated <= project.contributions,
        "INV-3 violated: allocated {} outside [0, {}]",
        project.allocated,
        project.contributions
    );
}

/// INV-4: registration fields never change.
pub fn assert_target_immutable(original: &Project, current: &Project) {
    assert_eq!(original.id, current.id, "INV-4 violated: project id changed");
    assert_eq!(
        original.target, current.target,
        "INV-4 violated: project target changed"
    );
}

/// INV-5: an allocation moves exactly `released` from outstanding to
/// allocated and never more than was outstanding.
pub fn assert_release_bounded(before: &Project, after: &Project, released: i128) {
    assert!(released >= 0, "INV-5 violated: negative release");
    assert_eq!(
        after.allocated,
        before.allocated + released,
        "INV-5 violated: allocated did not grow by the released amount"
    );
    assert!(
        released <= after.contributions - before.allocated,
        "INV-5 violated: released {} exceeds outstanding {}",
        released,
        after.contributions - before.allocated
    );
}

/// Run every check that only needs the client.
pub fn assert_all(client: &CcDaoClient) {
    assert_conserved(client);
    for id in all_project_ids(client) {
        assert_project_counters(&client.get_project(&id));
    }
}
