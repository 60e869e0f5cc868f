extern crate std;

use soroban_sdk::{
    testutils::{Address as _, Events},
    token, vec, Address, Env, IntoVal, String, Symbol, TryFromVal, TryIntoVal, Val, Vec,
};

use crate::events::{ALLOCATION, FUNDS_RECEIVED, PROJECT_CREDITED, PROJECT_REGISTERED};
use crate::{
    Allocation, BondingCurve, CcDao, CcDaoClient, Error, FundsReceived, ProjectCredited,
    ProjectRegistered,
};

fn setup() -> (Env, CcDaoClient<'static>, token::StellarAssetClient<'static>) {
    let env = Env::default();
    env.mock_all_auths();

    let token_admin = Address::generate(&env);
    let asset = env.register_stellar_asset_contract_v2(token_admin);
    let sac = token::StellarAssetClient::new(&env, &asset.address());

    let curve = BondingCurve {
        base_rate: 5_000,
        slope: 10,
    };
    let contract_id = env.register(
        CcDao,
        (
            String::from_str(&env, "Rhizome"),
            Address::generate(&env),
            asset.address(),
            curve,
        ),
    );
    let client = CcDaoClient::new(&env, &contract_id);
    (env, client, sac)
}

/// Events published by the CcDAO contract whose leading topic is `name`.
fn events_named(env: &Env, contract: &Address, name: &str) -> std::vec::Vec<(Vec<Val>, Val)> {
    let name = Symbol::new(env, name);
    env.events()
        .all()
        .iter()
        .filter(|(address, topics, _)| {
            address == contract
                && topics
                    .get(0)
                    .and_then(|t| Symbol::try_from_val(env, &t).ok())
                    == Some(name.clone())
        })
        .map(|(_, topics, data)| (topics, data))
        .collect()
}

#[test]
fn test_project_registered_event() {
    let (env, client, _) = setup();
    let project_id = Address::generate(&env);

    client.add_project(&project_id, &100_000_000);

    let all_events = env.events().all();
    let last_event = all_events.last().expect("No events found");

    assert_eq!(last_event.0, client.address);
    let expected_topics = vec![
        &env,
        Symbol::new(&env, PROJECT_REGISTERED).into_val(&env),
        project_id.into_val(&env),
    ];
    assert_eq!(last_event.1, expected_topics);

    let event_data: ProjectRegistered = last_event.2.try_into_val(&env).unwrap();
    assert_eq!(
        event_data,
        ProjectRegistered {
            project_id: project_id.clone(),
            target: 100_000_000,
        }
    );
}

#[test]
fn test_funds_received_event() {
    let (env, client, sac) = setup();
    let wallet = Address::generate(&env);
    sac.mint(&wallet, &1_000_000_000);

    client.contribute(&wallet, &1_000_000_000);

    let received = events_named(&env, &client.address, FUNDS_RECEIVED);
    assert_eq!(received.len(), 1);
    let (topics, data) = &received[0];

    let expected_topics: Vec<Val> = vec![
        &env,
        Symbol::new(&env, FUNDS_RECEIVED).into_val(&env),
        wallet.into_val(&env),
    ];
    assert_eq!(topics, &expected_topics);

    let event_data: FundsReceived = data.try_into_val(&env).unwrap();
    assert_eq!(
        event_data,
        FundsReceived {
            depositor: wallet.clone(),
            amount: 1_000_000_000,
        }
    );
}

#[test]
fn test_contribute_to_emits_received_and_credited() {
    let (env, client, sac) = setup();
    let wallet = Address::generate(&env);
    let project_id = Address::generate(&env);
    sac.mint(&wallet, &500);
    client.add_project(&project_id, &100);

    client.contribute_to(&wallet, &project_id, &500);

    assert_eq!(events_named(&env, &client.address, FUNDS_RECEIVED).len(), 1);
    let credited = events_named(&env, &client.address, PROJECT_CREDITED);
    assert_eq!(credited.len(), 1);

    let event_data: ProjectCredited = credited[0].1.try_into_val(&env).unwrap();
    assert_eq!(
        event_data,
        ProjectCredited {
            project_id: project_id.clone(),
            amount: 500,
        }
    );
}

#[test]
fn test_allocation_event() {
    let (env, client, sac) = setup();
    let wallet = Address::generate(&env);
    let project_id = Address::generate(&env);
    sac.mint(&wallet, &1_000_000_000);

    client.add_project(&project_id, &100);
    client.contribute(&wallet, &1_000_000_000);
    let amount = client.allocate(&project_id);

    // Matching the target from the reserve is published before the release.
    let credited = events_named(&env, &client.address, PROJECT_CREDITED);
    assert_eq!(credited.len(), 1);
    let credit: ProjectCredited = credited[0].1.try_into_val(&env).unwrap();
    assert_eq!(credit.amount, 100);

    let all_events = env.events().all();
    let last_event = all_events.last().expect("No events found");

    assert_eq!(last_event.0, client.address);
    let expected_topics = vec![
        &env,
        Symbol::new(&env, ALLOCATION).into_val(&env),
        project_id.into_val(&env),
    ];
    assert_eq!(last_event.1, expected_topics);

    let event_data: Allocation = last_event.2.try_into_val(&env).unwrap();
    assert_eq!(
        event_data,
        Allocation {
            project_id: project_id.clone(),
            amount,
        }
    );
    assert!(amount > 0 && amount <= 100);
}

#[test]
fn test_zero_allocation_publishes_nothing() {
    let (env, client, _) = setup();
    let project_id = Address::generate(&env);
    client.add_project(&project_id, &100);

    assert_eq!(client.allocate(&project_id), 0);
    assert!(events_named(&env, &client.address, ALLOCATION).is_empty());
    assert!(events_named(&env, &client.address, PROJECT_CREDITED).is_empty());
}

#[test]
fn test_rejected_allocation_publishes_nothing() {
    let (env, client, sac) = setup();
    let wallet = Address::generate(&env);
    sac.mint(&wallet, &1_000);
    client.contribute(&wallet, &1_000);

    let unregistered = Address::generate(&env);
    assert_eq!(
        client.try_allocate(&unregistered),
        Err(Ok(Error::UnknownProject))
    );

    assert!(events_named(&env, &client.address, ALLOCATION).is_empty());
    assert!(events_named(&env, &client.address, PROJECT_CREDITED).is_empty());
    assert_eq!(client.aggregate_balance(), 1_000);
}

#[test]
fn test_rejected_contribution_publishes_nothing() {
    let (env, client, sac) = setup();
    let wallet = Address::generate(&env);
    sac.mint(&wallet, &1_000);

    assert_eq!(
        client.try_contribute(&wallet, &0),
        Err(Ok(Error::InvalidAmount))
    );
    assert!(events_named(&env, &client.address, FUNDS_RECEIVED).is_empty());
    assert_eq!(client.aggregate_balance(), 0);
}
