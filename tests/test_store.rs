//! Tests for the SQLite recommendation store: replace-set atomicity, the
//! one-active-row invariant, and staleness queries.

use chrono::{Duration, Utc};
use oportuna::domain::entities::recommendation::Recommendation;
use oportuna::domain::ports::recommendation_store::RecommendationStore;
use oportuna::domain::values::score::Score;
use oportuna::infrastructure::sqlite::migrations::run_migrations;
use oportuna::infrastructure::sqlite::recommendation_repo::SqliteRecommendationStore;
use rusqlite::Connection;

fn setup_store() -> SqliteRecommendationStore {
    let conn = Connection::open_in_memory().unwrap();
    run_migrations(&conn).unwrap();
    SqliteRecommendationStore::new(conn)
}

fn row(user_id: i64, opportunity_id: i64, strategy: &str, score: f64) -> Recommendation {
    Recommendation::new(
        user_id,
        opportunity_id,
        strategy.to_string(),
        Score::new(score).unwrap(),
        format!("Explicação para {opportunity_id}"),
    )
}

#[test]
fn test_replace_for_user_swaps_the_whole_set() {
    let store = setup_store();
    store
        .replace_for_user(1, &[row(1, 10, "combined", 0.9), row(1, 20, "combined", 0.4)])
        .unwrap();

    store
        .replace_for_user(1, &[row(1, 30, "combined", 0.5)])
        .unwrap();

    let active = store.active_combined(1, 10).unwrap();
    assert_eq!(active.len(), 1);
    assert_eq!(active[0].opportunity_id, 30);
}

#[test]
fn test_replace_failure_rolls_back_and_preserves_prior_rows() {
    let store = setup_store();
    store
        .replace_for_user(1, &[row(1, 10, "combined", 0.9)])
        .unwrap();

    // Two active rows for the same (user, opportunity, strategy) violate
    // the partial unique index on the second insert; the whole replace must
    // roll back.
    let result = store.replace_for_user(
        1,
        &[
            row(1, 20, "combined", 0.8),
            row(1, 20, "combined", 0.7),
        ],
    );
    assert!(result.is_err());

    let active = store.active_combined(1, 10).unwrap();
    assert_eq!(active.len(), 1, "Prior active rows survive the failed write");
    assert_eq!(active[0].opportunity_id, 10);
    assert!((active[0].score.value() - 0.9).abs() < 1e-9);
}

#[test]
fn test_replace_strategy_touches_only_its_rows() {
    let store = setup_store();
    store
        .replace_for_user(
            1,
            &[
                row(1, 10, "common_interests", 1.0),
                row(1, 10, "popular", 0.5),
                row(1, 10, "combined", 0.85),
            ],
        )
        .unwrap();

    store
        .replace_strategy_for_user(
            1,
            "common_interests",
            &[
                row(1, 10, "common_interests", 0.5),
                row(1, 10, "combined", 0.5),
            ],
        )
        .unwrap();

    let rows = store.active_for_pair(1, 10).unwrap();
    assert_eq!(rows.len(), 3);
    let popular = rows.iter().find(|r| r.strategy == "popular").unwrap();
    assert!((popular.score.value() - 0.5).abs() < 1e-9, "Untouched");
    let ci = rows
        .iter()
        .find(|r| r.strategy == "common_interests")
        .unwrap();
    assert!((ci.score.value() - 0.5).abs() < 1e-9, "Replaced");
}

#[test]
fn test_active_combined_orders_by_score_then_id() {
    let store = setup_store();
    store
        .replace_for_user(
            1,
            &[
                row(1, 30, "combined", 0.5),
                row(1, 10, "combined", 0.5),
                row(1, 20, "combined", 0.9),
            ],
        )
        .unwrap();

    let active = store.active_combined(1, 10).unwrap();
    let ids: Vec<i64> = active.iter().map(|r| r.opportunity_id).collect();
    assert_eq!(ids, vec![20, 10, 30]);
}

#[test]
fn test_active_rows_exclude_other_users() {
    let store = setup_store();
    store
        .replace_for_user(1, &[row(1, 10, "combined", 0.9)])
        .unwrap();
    store
        .replace_for_user(2, &[row(2, 10, "combined", 0.8)])
        .unwrap();

    assert_eq!(store.active_combined(1, 10).unwrap().len(), 1);
    assert_eq!(store.active_strategy_rows(1).unwrap().len(), 0);
}

#[test]
fn test_deactivation_counts_and_hides_rows() {
    let store = setup_store();
    store
        .replace_for_user(
            1,
            &[row(1, 10, "common_interests", 1.0), row(1, 10, "combined", 0.7)],
        )
        .unwrap();
    store
        .replace_for_user(2, &[row(2, 10, "combined", 0.6)])
        .unwrap();

    assert_eq!(store.deactivate_for_opportunity(10).unwrap(), 3);
    assert!(store.active_combined(1, 10).unwrap().is_empty());
    assert!(store.active_for_pair(2, 10).unwrap().is_empty());
    assert_eq!(store.deactivate_for_opportunity(10).unwrap(), 0);
}

#[test]
fn test_has_fresh_combined_respects_cutoff() {
    let store = setup_store();
    store
        .replace_for_user(1, &[row(1, 10, "combined", 0.9)])
        .unwrap();

    let old_cutoff = Utc::now() - Duration::hours(48);
    assert!(store.has_fresh_combined(1, old_cutoff).unwrap());

    let future_cutoff = Utc::now() + Duration::hours(1);
    assert!(!store.has_fresh_combined(1, future_cutoff).unwrap());

    assert!(!store.has_fresh_combined(2, old_cutoff).unwrap(), "No rows");
}

#[test]
fn test_has_fresh_combined_ignores_inactive_rows() {
    let store = setup_store();
    store
        .replace_for_user(1, &[row(1, 10, "combined", 0.9)])
        .unwrap();
    store.deactivate_for_user(1).unwrap();

    let old_cutoff = Utc::now() - Duration::hours(48);
    assert!(!store.has_fresh_combined(1, old_cutoff).unwrap());
}

#[test]
fn test_purge_leaves_active_rows_alone() {
    let store = setup_store();
    store
        .replace_for_user(
            1,
            &[row(1, 10, "combined", 0.9), row(1, 20, "combined", 0.4)],
        )
        .unwrap();
    store.deactivate_for_opportunity(20).unwrap();

    let purged = store.purge_inactive(Utc::now() + Duration::seconds(1)).unwrap();
    assert_eq!(purged, 1);
    assert_eq!(store.active_combined(1, 10).unwrap().len(), 1);
}

#[test]
fn test_stats_average_rounds_to_two_decimals() {
    let store = setup_store();
    store
        .replace_for_user(
            1,
            &[row(1, 10, "combined", 0.9), row(1, 20, "combined", 0.4)],
        )
        .unwrap();
    store
        .replace_for_user(2, &[row(2, 10, "combined", 0.8)])
        .unwrap();

    let stats = store.stats().unwrap();
    assert_eq!(stats.total_active_recommendations, 3);
    assert_eq!(stats.users_with_recommendations, 2);
    assert!((stats.average_recommendations_per_user - 1.5).abs() < 1e-9);
}

#[test]
fn test_stats_empty_store() {
    let store = setup_store();
    let stats = store.stats().unwrap();
    assert_eq!(stats.total_active_recommendations, 0);
    assert_eq!(stats.users_with_recommendations, 0);
    assert!((stats.average_recommendations_per_user - 0.0).abs() < 1e-9);
}
