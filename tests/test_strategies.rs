//! Tests for both strategy implementations.

mod common;

use common::{make_context, make_snapshot};
use oportuna::application::strategies::common_interests::CommonInterestsStrategy;
use oportuna::application::strategies::popularity::PopularityStrategy;
use oportuna::domain::ports::strategy::RecommendationStrategy;

// ── CommonInterestsStrategy ──────────────────────────────────────────────

#[test]
fn test_common_interests_overlap_ratio() {
    let strategy = CommonInterestsStrategy;
    // User interests {IA, Web}; A tagged {IA, Web, Robótica}, B tagged {IA}.
    let ctx = make_context(
        vec![(1, "IA"), (2, "Web")],
        vec![make_snapshot(10, &[1, 2, 3], 0), make_snapshot(20, &[1], 0)],
        vec![],
    );

    let recs = strategy.recommend(&ctx).unwrap();
    assert_eq!(recs.len(), 2);

    let a = recs.iter().find(|r| r.opportunity_id == 10).unwrap();
    let b = recs.iter().find(|r| r.opportunity_id == 20).unwrap();
    assert!((a.score.value() - 2.0 / 3.0).abs() < 1e-9, "2 of 3 tags matched");
    assert!((b.score.value() - 1.0).abs() < 1e-9, "1 of 1 tags matched");
}

#[test]
fn test_common_interests_skips_untagged_opportunity() {
    let strategy = CommonInterestsStrategy;
    let ctx = make_context(
        vec![(1, "IA")],
        vec![make_snapshot(10, &[], 5)],
        vec![],
    );

    let recs = strategy.recommend(&ctx).unwrap();
    assert!(
        recs.is_empty(),
        "Opportunities without tags have no defined overlap"
    );
}

#[test]
fn test_common_interests_skips_disjoint_opportunity() {
    let strategy = CommonInterestsStrategy;
    let ctx = make_context(
        vec![(1, "IA")],
        vec![make_snapshot(10, &[2, 3], 0)],
        vec![],
    );

    let recs = strategy.recommend(&ctx).unwrap();
    assert!(recs.is_empty(), "No overlap yields no entry, not a zero score");
}

#[test]
fn test_common_interests_skips_applied_opportunity() {
    let strategy = CommonInterestsStrategy;
    let ctx = make_context(
        vec![(1, "IA")],
        vec![make_snapshot(10, &[1], 0), make_snapshot(20, &[1], 0)],
        vec![10],
    );

    let recs = strategy.recommend(&ctx).unwrap();
    assert_eq!(recs.len(), 1);
    assert_eq!(recs[0].opportunity_id, 20);
}

#[test]
fn test_common_interests_no_declared_interests() {
    let strategy = CommonInterestsStrategy;
    let ctx = make_context(vec![], vec![make_snapshot(10, &[1], 0)], vec![]);

    let recs = strategy.recommend(&ctx).unwrap();
    assert!(recs.is_empty());
}

#[test]
fn test_common_interests_explanation_lists_matched_names() {
    let strategy = CommonInterestsStrategy;
    let ctx = make_context(
        vec![(1, "IA"), (2, "Web")],
        vec![make_snapshot(10, &[1, 2], 0)],
        vec![],
    );

    let recs = strategy.recommend(&ctx).unwrap();
    assert_eq!(
        recs[0].explanation,
        "Você tem 2 interesse(s) em comum: IA, Web"
    );
}

#[test]
fn test_common_interests_explanation_overflow_count() {
    let strategy = CommonInterestsStrategy;
    // Five matched interests: three named, two in the overflow.
    let ctx = make_context(
        vec![(1, "IA"), (2, "Web"), (3, "Robótica"), (4, "Dados"), (5, "Games")],
        vec![make_snapshot(10, &[1, 2, 3, 4, 5], 0)],
        vec![],
    );

    let recs = strategy.recommend(&ctx).unwrap();
    assert_eq!(
        recs[0].explanation,
        "Você tem 5 interesse(s) em comum: IA, Web, Robótica e mais 2"
    );
}

#[test]
fn test_common_interests_explanation_stable_across_runs() {
    let strategy = CommonInterestsStrategy;
    let ctx = make_context(
        vec![(3, "Robótica"), (1, "IA"), (2, "Web")],
        vec![make_snapshot(10, &[1, 2, 3], 0)],
        vec![],
    );

    let first = strategy.recommend(&ctx).unwrap();
    let second = strategy.recommend(&ctx).unwrap();
    assert_eq!(first[0].explanation, second[0].explanation);
    // Matched ids sort ascending, so names come out in id order.
    assert_eq!(
        first[0].explanation,
        "Você tem 3 interesse(s) em comum: IA, Web, Robótica"
    );
}

// ── PopularityStrategy ───────────────────────────────────────────────────

#[test]
fn test_popularity_normalizes_against_max() {
    let strategy = PopularityStrategy;
    // Application counts {5, 3, 0, 1} → scores {1.0, 0.6, excluded, 0.2}.
    let ctx = make_context(
        vec![],
        vec![
            make_snapshot(10, &[], 5),
            make_snapshot(20, &[], 3),
            make_snapshot(30, &[], 0),
            make_snapshot(40, &[], 1),
        ],
        vec![],
    );

    let recs = strategy.recommend(&ctx).unwrap();
    assert_eq!(recs.len(), 3, "Zero-count opportunity excluded");

    let score_of = |id: i64| {
        recs.iter()
            .find(|r| r.opportunity_id == id)
            .unwrap()
            .score
            .value()
    };
    assert!((score_of(10) - 1.0).abs() < 1e-9);
    assert!((score_of(20) - 0.6).abs() < 1e-9);
    assert!((score_of(40) - 0.2).abs() < 1e-9);
    assert!(!recs.iter().any(|r| r.opportunity_id == 30));
}

#[test]
fn test_popularity_no_applications_anywhere() {
    let strategy = PopularityStrategy;
    let ctx = make_context(
        vec![],
        vec![make_snapshot(10, &[], 0), make_snapshot(20, &[], 0)],
        vec![],
    );

    let recs = strategy.recommend(&ctx).unwrap();
    assert!(recs.is_empty(), "max = 0 means no popularity signal at all");
}

#[test]
fn test_popularity_skips_applied_opportunity() {
    let strategy = PopularityStrategy;
    let ctx = make_context(
        vec![],
        vec![make_snapshot(10, &[], 4), make_snapshot(20, &[], 2)],
        vec![10],
    );

    let recs = strategy.recommend(&ctx).unwrap();
    assert_eq!(recs.len(), 1);
    assert_eq!(recs[0].opportunity_id, 20);
    // Max still counts the applied opportunity's 4 applications.
    assert!((recs[0].score.value() - 0.5).abs() < 1e-9);
}

#[test]
fn test_popularity_explanation_counts_candidates() {
    let strategy = PopularityStrategy;
    let ctx = make_context(vec![], vec![make_snapshot(10, &[], 7)], vec![]);

    let recs = strategy.recommend(&ctx).unwrap();
    assert_eq!(
        recs[0].explanation,
        "Esta oportunidade já atraiu 7 candidato(s)"
    );
}

// ── Strategy trait basics ────────────────────────────────────────────────

#[test]
fn test_strategy_names_unique() {
    let names = vec![CommonInterestsStrategy.name(), PopularityStrategy.name()];
    let mut unique = names.clone();
    unique.sort();
    unique.dedup();
    assert_eq!(names.len(), unique.len(), "Strategy names must be unique");
}

#[test]
fn test_strategy_weights() {
    assert!((CommonInterestsStrategy.weight() - 0.7).abs() < 1e-9);
    assert!((PopularityStrategy.weight() - 0.3).abs() < 1e-9);
}
