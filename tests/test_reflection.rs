mod common;

use common::{collaborators, hold_json, setup, setup_with, FailingSummarizer};
use std::sync::Arc;
use tradecycle::domain::entities::reflection::ReflectionLevel;
use tradecycle::domain::values::decision::Decision;
use tradecycle::domain::values::regime::MarketRegime;
use tradecycle::infrastructure::feeds::StubFeed;

fn hold() -> Decision {
    Decision::hold("SOL", MarketRegime::Sideways, "Quiet tape".into())
}

#[tokio::test]
async fn test_review_written_after_cycle_length_lessons() {
    let tc = setup();
    for i in 0..2 {
        tc.reflect(&hold(), "Trade not executed: HOLD", "sideways").await.unwrap();
        assert_eq!(tc.maybe_review("sideways").await.unwrap(), None, "cycle {i}");
    }
    tc.reflect(&hold(), "Trade not executed: HOLD", "sideways").await.unwrap();

    let review = tc.maybe_review("sideways").await.unwrap();
    assert_eq!(review.as_deref(), Some("lesson (level 2)"));
    assert_eq!(tc.stats().unwrap().cycles_since_last_review, 0);

    let reviews = tc.recent_reflections(ReflectionLevel::CrossTrial, 10).unwrap();
    assert_eq!(reviews.len(), 1);
    assert_eq!(reviews[0].performance_summary.as_deref(), Some("3 cycles reviewed"));
    assert_eq!(tc.cross_trial_reflections(5).unwrap(), vec!["lesson (level 2)".to_string()]);
}

#[tokio::test]
async fn test_counter_restarts_after_review() {
    let tc = setup();
    for _ in 0..3 {
        tc.reflect(&hold(), "x", "sideways").await.unwrap();
    }
    assert!(tc.maybe_review("sideways").await.unwrap().is_some());

    tc.reflect(&hold(), "x", "sideways").await.unwrap();
    assert_eq!(tc.stats().unwrap().cycles_since_last_review, 1);
    assert_eq!(tc.maybe_review("sideways").await.unwrap(), None);
}

#[tokio::test]
async fn test_lesson_stores_execution_info() {
    let tc = setup();
    let text = tc
        .reflect(&hold(), "Trade executed: BUY 9.9900 @ $100.00", "bull")
        .await
        .unwrap();
    assert_eq!(text, "lesson (level 1)");

    let lessons = tc.recent_reflections(ReflectionLevel::Cycle, 5).unwrap();
    assert_eq!(lessons.len(), 1);
    assert_eq!(lessons[0].regime, "bull");
    assert_eq!(
        lessons[0].performance_summary.as_deref(),
        Some("Trade executed: BUY 9.9900 @ $100.00")
    );
}

#[tokio::test]
async fn test_failed_summarizer_falls_back_to_template() {
    let tc = setup_with(
        collaborators(Arc::new(StubFeed), hold_json()),
        Arc::new(FailingSummarizer),
    );
    let text = tc
        .reflect(&hold(), "Trade not executed: HOLD — no trade needed", "sideways")
        .await
        .unwrap();
    assert_eq!(
        text,
        "[Auto] HOLD decision with confidence 1. Trade not executed: HOLD — no trade needed"
    );

    // Reviews are skipped, not faked, when the summarizer is down.
    for _ in 0..3 {
        tc.reflect(&hold(), "x", "sideways").await.unwrap();
    }
    assert_eq!(tc.maybe_review("sideways").await.unwrap(), None);
    assert!(tc.recent_reflections(ReflectionLevel::CrossTrial, 5).unwrap().is_empty());
    assert_eq!(tc.stats().unwrap().reflections, 4);
}

#[tokio::test]
async fn test_recent_lessons_newest_first() {
    let tc = setup();
    tc.reflect(&hold(), "first", "sideways").await.unwrap();
    tc.reflect(&hold(), "second", "bear").await.unwrap();

    let lessons = tc.recent_reflections(ReflectionLevel::Cycle, 1).unwrap();
    assert_eq!(lessons.len(), 1);
    assert_eq!(lessons[0].performance_summary.as_deref(), Some("second"));
}
