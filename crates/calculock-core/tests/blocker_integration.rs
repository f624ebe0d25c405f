//! Integration tests for the blocker facade.
//!
//! These tests drive a full block lifecycle the way a UI would: select
//! apps, start a block, let time pass, and answer the gate question.

use std::collections::BTreeSet;

use calculock_core::{
    AppCatalog, AppId, BlockError, BlockState, Blocker, CalculusProblem, CategoryError,
    CategoryStore, Config, Event, ProblemBank, UnblockOutcome,
};
use chrono::{DateTime, Duration, TimeZone, Utc};

fn t0() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2026, 10, 19, 21, 30, 0).unwrap()
}

fn ids(names: &[&str]) -> Vec<AppId> {
    names.iter().map(|n| AppId::from(*n)).collect()
}

fn gate(answer: &str) -> ProblemBank {
    ProblemBank::new(
        vec![CalculusProblem::new("Evaluate the limit", answer, "Think small", 0.0)],
        Some(0),
    )
}

#[test]
fn test_block_runs_to_expiry() {
    let mut blocker = Blocker::from_config(&Config::default()).unwrap();
    blocker.select_apps(ids(&["Instagram", "TikTok"]), t0()).unwrap();
    let expiry = blocker.start_block(15, t0()).unwrap();
    assert_eq!(expiry, t0() + Duration::minutes(15));

    let mut now = t0();
    while now < expiry {
        assert!(blocker.tick(now).is_none());
        assert_eq!(blocker.status(now).state(), BlockState::Active);
        now += Duration::seconds(1);
    }
    assert!(matches!(blocker.tick(now), Some(Event::BlockExpired { .. })));
    assert_eq!(blocker.status(now).state(), BlockState::Inactive);
    assert_eq!(
        blocker.status(now).to_string(),
        "2 apps selected for blocking"
    );
}

#[test]
fn test_empty_selection_never_starts() {
    let mut blocker = Blocker::from_config(&Config::default()).unwrap();
    for minutes in [15, 30, 60, 120, 240, 480] {
        assert_eq!(blocker.start_block(minutes, t0()), Err(BlockError::EmptySelection));
    }
    assert_eq!(blocker.session().block_expiry(), None);
}

#[test]
fn test_symbolic_gate_only_accepts_string_match() {
    let mut blocker = Blocker::new(AppCatalog::standard(), CategoryStore::new(), gate("6x"));
    blocker.select_apps(ids(&["YouTube"]), t0()).unwrap();
    blocker.start_block(60, t0()).unwrap();

    for wrong in ["6", "6.0", "x6", "six x"] {
        assert_eq!(blocker.attempt_unblock(wrong, t0()), Ok(UnblockOutcome::Incorrect));
        assert_eq!(blocker.status(t0()).state(), BlockState::Active);
    }
    assert_eq!(blocker.attempt_unblock("6X", t0()), Ok(UnblockOutcome::Unblocked));
    assert_eq!(blocker.status(t0()).state(), BlockState::Inactive);
}

#[test]
fn test_numeric_gate_compares_values() {
    let mut blocker = Blocker::new(AppCatalog::standard(), CategoryStore::new(), gate("0"));
    blocker.select_apps(ids(&["Netflix"]), t0()).unwrap();
    blocker.start_block(30, t0()).unwrap();

    assert_eq!(blocker.attempt_unblock("zero", t0()), Ok(UnblockOutcome::Incorrect));
    assert_eq!(blocker.attempt_unblock("0.0", t0()), Ok(UnblockOutcome::Unblocked));
}

#[test]
fn test_selection_round_trip_while_active() {
    let mut blocker = Blocker::from_config(&Config::default()).unwrap();
    let first = ids(&["Safari", "Chrome", "Games"]);
    blocker.select_apps(first.clone(), t0()).unwrap();
    blocker.start_block(120, t0()).unwrap();

    let second = ids(&["Discord"]);
    blocker.select_apps(second.clone(), t0()).unwrap();
    let expected: BTreeSet<AppId> = second.into_iter().collect();
    assert_eq!(blocker.session().selected_apps(), &expected);
    assert_eq!(blocker.status(t0()).state(), BlockState::Active);
}

#[test]
fn test_category_rules() {
    let mut config = Config::default();
    config.categories.seed_defaults = false;
    let mut blocker = Blocker::from_config(&config).unwrap();

    blocker.create_category("Social", t0()).unwrap();
    assert_eq!(
        blocker.create_category("Social", t0()),
        Err(CategoryError::DuplicateName("Social".into()))
    );
    assert_eq!(blocker.create_category("  ", t0()), Err(CategoryError::EmptyName));

    blocker.add_app("Social", AppId::from("TikTok"), t0()).unwrap();
    assert!(matches!(
        blocker.add_app("Social", AppId::from("TikTok"), t0()),
        Err(CategoryError::AlreadyMember { .. })
    ));

    blocker.create_category("B", t0()).unwrap();
    blocker.create_category("A", t0()).unwrap();
    assert_eq!(blocker.list_categories(), vec!["A", "B", "Social"]);
}

#[test]
fn test_category_drives_selection() {
    let mut blocker = Blocker::from_config(&Config::default()).unwrap();
    assert_eq!(blocker.select_category("Entertainment", t0()).unwrap(), 3);
    let expiry = blocker.start_block(60, t0()).unwrap();

    // Editing the category afterwards leaves the running block alone.
    assert!(blocker.remove_app("Entertainment", &AppId::from("Netflix"), t0()));
    assert_eq!(blocker.session().selected_apps().len(), 3);
    assert_eq!(blocker.session().block_expiry(), Some(expiry));
}

#[test]
fn test_observer_sees_full_lifecycle() {
    let mut blocker = Blocker::new(AppCatalog::standard(), CategoryStore::new(), gate("1"));
    let mut rx = blocker.subscribe();

    blocker.select_apps(ids(&["Reddit"]), t0()).unwrap();
    blocker.start_block(15, t0()).unwrap();
    blocker.attempt_unblock("2", t0()).unwrap();
    blocker.attempt_unblock("1", t0()).unwrap();

    let kinds: Vec<&'static str> = std::iter::from_fn(|| rx.try_recv().ok())
        .map(|event| match event {
            Event::AppsSelected { .. } => "selected",
            Event::BlockStarted { .. } => "started",
            Event::UnblockRejected { .. } => "rejected",
            Event::Unblocked { .. } => "unblocked",
            Event::ProblemIssued { .. } => "problem",
            Event::BlockExpired { .. } => "expired",
            Event::CategoryChanged { .. } => "category",
        })
        .collect();
    assert_eq!(
        kinds,
        vec!["selected", "started", "rejected", "unblocked", "problem"]
    );
}
