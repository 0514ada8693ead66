//! Tests for the invalidation state machine: active → inactive → purged.

mod common;

use common::{seed_open_opportunity, seed_student, setup};

#[test]
fn test_invalidate_opportunity_across_users() {
    let op = setup();
    let ia = op.interest_add("IA", None).unwrap();
    let alice = seed_student(&op, "alice", &[ia]);
    let bob = seed_student(&op, "bob", &[ia]);
    let opp_a = seed_open_opportunity(&op, "Vaga A", &[ia]);
    let opp_b = seed_open_opportunity(&op, "Vaga B", &[ia]);

    op.refresh_user(alice).unwrap();
    op.refresh_user(bob).unwrap();
    let before = op.stats().unwrap();
    assert_eq!(before.total_active_recommendations, 4);

    let flipped = op.invalidate_opportunity(opp_a).unwrap();
    // One combined plus one common_interests row per user.
    assert_eq!(flipped, 4);

    let after = op.stats().unwrap();
    assert_eq!(
        before.total_active_recommendations - after.total_active_recommendations,
        2,
        "Exactly the two active combined rows for the opportunity"
    );

    for user in [alice, bob] {
        let recs = op.recommendations(user, 10).unwrap();
        assert!(recs.iter().all(|r| r.opportunity_id != opp_a));
        assert!(recs.iter().any(|r| r.opportunity_id == opp_b));
    }
}

#[test]
fn test_invalidate_opportunity_is_idempotent() {
    let op = setup();
    let ia = op.interest_add("IA", None).unwrap();
    let alice = seed_student(&op, "alice", &[ia]);
    let opp = seed_open_opportunity(&op, "Vaga", &[ia]);
    op.refresh_user(alice).unwrap();

    assert_eq!(op.invalidate_opportunity(opp).unwrap(), 2);
    assert_eq!(
        op.invalidate_opportunity(opp).unwrap(),
        0,
        "Already-inactive rows are not flipped again"
    );
}

#[test]
fn test_invalidate_user_empties_feed() {
    let op = setup();
    let ia = op.interest_add("IA", None).unwrap();
    let alice = seed_student(&op, "alice", &[ia]);
    let bob = seed_student(&op, "bob", &[ia]);
    seed_open_opportunity(&op, "Vaga", &[ia]);

    op.refresh_user(alice).unwrap();
    op.refresh_user(bob).unwrap();

    let flipped = op.invalidate_user(alice).unwrap();
    assert_eq!(flipped, 2);
    assert!(op.recommendations(alice, 10).unwrap().is_empty());
    assert_eq!(
        op.recommendations(bob, 10).unwrap().len(),
        1,
        "Other users untouched"
    );
}

#[test]
fn test_refresh_restores_invalidated_user() {
    let op = setup();
    let ia = op.interest_add("IA", None).unwrap();
    let alice = seed_student(&op, "alice", &[ia]);
    seed_open_opportunity(&op, "Vaga", &[ia]);

    op.refresh_user(alice).unwrap();
    op.invalidate_user(alice).unwrap();
    op.refresh_user(alice).unwrap();

    assert_eq!(op.recommendations(alice, 10).unwrap().len(), 1);
}

#[test]
fn test_purge_removes_only_long_inactive_rows() {
    let op = setup();
    let ia = op.interest_add("IA", None).unwrap();
    let alice = seed_student(&op, "alice", &[ia]);
    let opp_a = seed_open_opportunity(&op, "Vaga A", &[ia]);
    seed_open_opportunity(&op, "Vaga B", &[ia]);

    op.refresh_user(alice).unwrap();
    op.invalidate_opportunity(opp_a).unwrap();

    // Rows were deactivated moments ago; the retention window keeps them.
    assert_eq!(op.purge(30).unwrap(), 0);

    // A zero-day window makes everything inactive eligible.
    assert_eq!(op.purge(0).unwrap(), 2);

    // Active rows are never purged.
    let stats = op.stats().unwrap();
    assert_eq!(stats.total_active_recommendations, 1);
}
