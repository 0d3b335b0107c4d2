//! Property-based invariant tests for the tour runtime.
//!
//! ## Invariants
//!
//! 1. Index bounds: while active, `current_step_index < step_count`.
//! 2. Progress range: `progress` is always within `0..=100`.
//! 3. Completion monotonicity: once completed, a tour stays completed.
//! 4. Skips and stops never add completions.
//! 5. Step completion matches the current index while active.
//! 6. Unknown ids never change state.

use std::collections::BTreeSet;

use proptest::prelude::*;
use wayfinder_runtime::{TourCatalog, TourEvent, TourRuntime};

#[derive(Debug, Clone)]
enum Op {
    Start(usize),
    StartUnknown,
    Next,
    Previous,
    GoTo(usize),
    Stop,
    Skip,
}

// ── Strategies ────────────────────────────────────────────────────────────

fn arb_op() -> impl Strategy<Value = Op> {
    prop_oneof![
        (0usize..4).prop_map(Op::Start),
        Just(Op::StartUnknown),
        Just(Op::Next),
        Just(Op::Next),
        Just(Op::Next),
        Just(Op::Previous),
        (0usize..8).prop_map(Op::GoTo),
        Just(Op::Stop),
        Just(Op::Skip),
    ]
}

fn arb_ops() -> impl Strategy<Value = Vec<Op>> {
    prop::collection::vec(arb_op(), 0..60)
}

fn tour_ids() -> Vec<String> {
    TourCatalog::builtin()
        .list()
        .iter()
        .map(|t| t.id().to_string())
        .collect()
}

fn apply(rt: &mut TourRuntime, ids: &[String], op: &Op) -> Option<TourEvent> {
    match op {
        Op::Start(i) => rt.start(&ids[*i % ids.len()]),
        Op::StartUnknown => rt.start("no-such-tour"),
        Op::Next => rt.next(),
        Op::Previous => rt.previous(),
        Op::GoTo(i) => rt.go_to_step(*i),
        Op::Stop => rt.stop(),
        Op::Skip => rt.skip(),
    }
}

fn check_state(rt: &TourRuntime, ids: &[String]) -> Result<(), TestCaseError> {
    if let Some(tour) = rt.active_tour() {
        let idx = rt.current_step_index().expect("index while active");
        prop_assert!(idx < tour.step_count(), "index {idx} out of bounds");
        for k in 0..tour.step_count() {
            let expected = rt.is_tour_completed(tour.id()) || k < idx;
            prop_assert_eq!(rt.is_step_completed(tour.id(), k), expected);
        }
    } else {
        prop_assert!(rt.current_step_index().is_none());
    }
    for id in ids {
        prop_assert!(rt.progress(id) <= 100);
        if rt.is_tour_completed(id) {
            prop_assert_eq!(rt.progress(id), 100);
        }
    }
    Ok(())
}

// ── 1, 2, 5. Bounds and step completion ───────────────────────────────────

proptest! {
    #![proptest_config(ProptestConfig::with_cases(256))]

    #[test]
    fn state_stays_consistent(ops in arb_ops()) {
        let ids = tour_ids();
        let mut rt = TourRuntime::default();
        for op in &ops {
            apply(&mut rt, &ids, op);
            check_state(&rt, &ids)?;
        }
    }
}

// ── 3, 4. Completion bookkeeping ──────────────────────────────────────────

proptest! {
    #![proptest_config(ProptestConfig::with_cases(256))]

    #[test]
    fn completions_only_grow_and_only_via_next(ops in arb_ops()) {
        let ids = tour_ids();
        let mut rt = TourRuntime::default();
        let mut before: BTreeSet<String> = BTreeSet::new();
        for op in &ops {
            let event = apply(&mut rt, &ids, op);
            let after = rt.completed_tours().clone();
            prop_assert!(before.is_subset(&after));
            if after.len() > before.len() {
                prop_assert!(matches!(op, Op::Next));
                prop_assert!(
                    matches!(event, Some(TourEvent::Completed { .. })),
                    "expected Completed event, got {:?}",
                    event
                );
            }
            if matches!(op, Op::Skip | Op::Stop) {
                prop_assert_eq!(&before, &after);
                prop_assert!(!rt.is_active());
            }
            before = after;
        }
    }
}

// ── 6. Unknown ids are inert ──────────────────────────────────────────────

proptest! {
    #![proptest_config(ProptestConfig::with_cases(128))]

    #[test]
    fn unknown_start_is_inert(ops in arb_ops()) {
        let ids = tour_ids();
        let mut rt = TourRuntime::default();
        for op in &ops {
            apply(&mut rt, &ids, op);
        }
        let active = rt.active_tour().map(|t| t.id().to_string());
        let index = rt.current_step_index();
        let completed = rt.completed_tours().clone();

        prop_assert!(rt.start("no-such-tour").is_none());
        prop_assert_eq!(rt.active_tour().map(|t| t.id().to_string()), active);
        prop_assert_eq!(rt.current_step_index(), index);
        prop_assert_eq!(rt.completed_tours(), &completed);
    }
}

// ── Scenario: next() step_count times completes every tour ────────────────

#[test]
fn step_count_nexts_complete_each_builtin_tour() {
    let catalog = TourCatalog::builtin();
    for tour in catalog.list() {
        let mut rt = TourRuntime::default();
        rt.start(tour.id());
        for _ in 0..tour.step_count() - 1 {
            rt.next();
        }
        assert!(rt.is_active(), "{} ended early", tour.id());
        assert!(!rt.is_tour_completed(tour.id()));
        rt.next();
        assert!(!rt.is_active());
        assert!(rt.is_tour_completed(tour.id()));
    }
}

#[test]
fn every_builtin_tour_is_non_empty() {
    assert!(
        TourCatalog::builtin()
            .list()
            .iter()
            .all(|t| !t.steps().is_empty())
    );
}
