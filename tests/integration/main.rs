//! End-to-end monitor scenarios driven through mock collaborators.


use chrono::{Duration, Utc};
use std::time::Duration as StdDuration;

use tablewatch::codec::RawRound;
use tablewatch::engine::monitor::{Monitor, MonitorTimeouts, TickOutcome};
use tablewatch::engine::tracker::{BetPhase, Settlement};
use tablewatch::history::HistoryStore;
use tablewatch::notify::messages;
use tablewatch::storage::Catalog;
use tablewatch::strategy::timing::TimingGate;
use tablewatch::strategy::{Decision, SignalPlanner};
use tablewatch::types::{Side, Symbol};

use mocks::{in_progress, resolved, MockNotifier, MockSource};

const CATALOG: &str = r#"[
    {"id": "P1", "sequencia": ["🔴", "🔴"], "acao": "Seguir 🔴"}
]"#;

fn monitor_with(catalog_json: &str, capacity: usize) -> (Monitor, MockSource, MockNotifier) {
    let source = MockSource::new();
    let notifier = MockNotifier::new();
    let planner = SignalPlanner::new(Catalog::from_json(catalog_json).unwrap(), TimingGate::new(30, 7));
    let monitor = Monitor::new(
        Box::new(source.clone()),
        Box::new(notifier.clone()),
        planner,
        HistoryStore::new(capacity),
        MonitorTimeouts {
            fetch: StdDuration::from_millis(200),
            notify: StdDuration::from_millis(200),
        },
    );
    (monitor, source, notifier)
}

/// Feed a resolved round observed `elapsed` seconds after it started.
async fn feed(monitor: &mut Monitor, id: &str, outcome: &str, elapsed: i64) -> TickOutcome {
    let now = Utc::now();
    monitor
        .process_round(resolved(id, outcome, now - Duration::seconds(elapsed)), now)
        .await
}

// -- Scenario tests --

#[tokio::test]
async fn test_signal_gale_then_recover() {
    let (mut m, _src, sink) = monitor_with(CATALOG, 100);

    feed(&mut m, "1", "BankerWon", 5).await;
    feed(&mut m, "2", "PlayerWon", 5).await;
    feed(&mut m, "3", "BankerWon", 5).await;
    let outcome = feed(&mut m, "4", "BankerWon", 10).await;
    match outcome {
        TickOutcome::Processed { settlement: None, decision: Decision::Signalled(s) } => {
            assert_eq!(s.pattern_id, "P1");
            assert_eq!(s.side, Side::Banker);
        }
        other => panic!("expected signal, got {other:?}"),
    }
    assert!(matches!(m.tracker().phase(), BetPhase::Pending(_)));
    assert!(sink.texts().iter().any(|t| t.contains("PADRÃO P1 DETECTADO")));

    let outcome = feed(&mut m, "5", "PlayerWon", 5).await;
    assert!(matches!(
        outcome,
        TickOutcome::Processed { settlement: Some(Settlement::GaleEntered { .. }), decision: Decision::Busy }
    ));
    assert!(m.tracker().gale_active());
    assert_eq!(m.tracker().streak(), 0);

    let outcome = feed(&mut m, "6", "BankerWon", 5).await;
    assert!(matches!(
        outcome,
        TickOutcome::Processed { settlement: Some(Settlement::Win { on_gale: true, streak: 1, .. }), .. }
    ));
    assert_eq!(m.tracker().streak(), 1);
    assert!(!m.tracker().gale_active());
}

#[tokio::test]
async fn test_gale_loss_resets_streak() {
    let (mut m, _src, _sink) = monitor_with(CATALOG, 100);

    feed(&mut m, "1", "BankerWon", 5).await;
    feed(&mut m, "2", "BankerWon", 5).await; // signal Banker
    feed(&mut m, "3", "Tie", 5).await; // tie wins, streak 1
    assert_eq!(m.tracker().streak(), 1);
    assert!(!m.tracker().is_busy());

    feed(&mut m, "4", "BankerWon", 5).await; // history ends 🟡🔴, no match
    assert!(!m.tracker().is_busy());
    feed(&mut m, "5", "BankerWon", 5).await; // 🔴🔴, signal Banker
    assert!(m.tracker().is_busy());
    feed(&mut m, "6", "PlayerWon", 5).await; // gale
    let outcome = feed(&mut m, "7", "PlayerWon", 5).await; // gale lost
    assert!(matches!(
        outcome,
        TickOutcome::Processed { settlement: Some(Settlement::GaleLost { .. }), .. }
    ));
    assert_eq!(m.tracker().streak(), 0);
    assert_eq!(*m.tracker().phase(), BetPhase::Idle);
}

#[tokio::test]
async fn test_settles_with_next_round_not_trigger() {
    let (mut m, _src, sink) = monitor_with(
        r#"[{"id": "B", "sequencia": ["🔵"], "acao": "Seguir 🔴"}]"#,
        100,
    );

    // The trigger round is a Player win; the bet is on Banker. It must not
    // be settled as a loss against its own trigger.
    let outcome = feed(&mut m, "1", "PlayerWon", 5).await;
    assert!(matches!(outcome, TickOutcome::Processed { settlement: None, decision: Decision::Signalled(_) }));
    assert_eq!(m.tracker().streak(), 0);
    assert!(!m.tracker().gale_active());

    feed(&mut m, "2", "BankerWon", 5).await;
    assert_eq!(m.tracker().streak(), 1);
    assert!(sink.texts().iter().any(|t| t.contains("Placar de acertos: 1")));
}

#[tokio::test]
async fn test_signal_fires_in_same_tick_as_settlement() {
    let (mut m, _src, sink) = monitor_with(
        r#"[{"id": "T", "sequencia": ["🟡"], "acao": "Seguir 🔵"},
            {"id": "R", "sequencia": ["🔴"], "acao": "Seguir 🔴"}]"#,
        100,
    );

    feed(&mut m, "1", "BankerWon", 5).await; // signal R → Banker
    feed(&mut m, "2", "PlayerWon", 5).await; // gale armed
    let outcome = feed(&mut m, "3", "Tie", 5).await; // gale recovered by tie
    // Settlement happened first, then the tracker was idle and pattern T fired.
    match outcome {
        TickOutcome::Processed { settlement: Some(Settlement::Win { .. }), decision: Decision::Signalled(s) } => {
            assert_eq!(s.pattern_id, "T");
            assert_eq!(s.side, Side::Player);
        }
        other => panic!("unexpected {other:?}"),
    }
    let signals = sink.texts().iter().filter(|t| t.contains("DETECTADO")).count();
    assert_eq!(signals, 2);
}

#[tokio::test]
async fn test_match_while_busy_is_dropped() {
    let (mut m, _src, sink) = monitor_with(
        r#"[{"id": "R", "sequencia": ["🔴"], "acao": "Seguir 🔴"},
            {"id": "P", "sequencia": ["🔵"], "acao": "Seguir 🔵"}]"#,
        100,
    );

    feed(&mut m, "1", "BankerWon", 5).await; // signal R → Banker
    let outcome = feed(&mut m, "2", "PlayerWon", 5).await; // P would match
    assert!(matches!(
        outcome,
        TickOutcome::Processed { settlement: Some(Settlement::GaleEntered { .. }), decision: Decision::Busy }
    ));
    let signals = sink.texts().iter().filter(|t| t.contains("DETECTADO")).count();
    assert_eq!(signals, 1);

    // Not queued: once the gale settles, only the new tail is considered.
    let outcome = feed(&mut m, "3", "Tie", 5).await;
    assert!(matches!(outcome, TickOutcome::Processed { decision: Decision::NoMatch, .. }));
}

// -- Timing tests --

#[tokio::test]
async fn test_late_signal_dropped() {
    let (mut m, _src, sink) = monitor_with(CATALOG, 100);

    feed(&mut m, "1", "BankerWon", 5).await;
    let outcome = feed(&mut m, "2", "BankerWon", 24).await;
    assert!(matches!(
        outcome,
        TickOutcome::Processed { decision: Decision::WindowClosed { .. }, .. }
    ));
    assert!(!m.tracker().is_busy());
    assert!(!sink.texts().iter().any(|t| t.contains("DETECTADO")));
}

// -- Idempotence tests --

#[tokio::test]
async fn test_duplicate_round_ignored() {
    let (mut m, _src, sink) = monitor_with(CATALOG, 100);

    feed(&mut m, "1", "BankerWon", 5).await;
    feed(&mut m, "2", "BankerWon", 5).await;
    let sent_before = sink.sent().len();
    assert_eq!(feed(&mut m, "2", "BankerWon", 5).await, TickOutcome::Duplicate);
    assert_eq!(m.history().len(), 2);
    assert_eq!(sink.sent().len(), sent_before);
    assert!(matches!(m.tracker().phase(), BetPhase::Pending(_)));
}

#[tokio::test]
async fn test_unresolved_round_waits() {
    let (mut m, _src, _sink) = monitor_with(CATALOG, 100);
    let now = Utc::now();

    feed(&mut m, "1", "BankerWon", 5).await;
    feed(&mut m, "2", "BankerWon", 5).await; // signal
    let outcome = m.process_round(in_progress("3", "PlayerWon", now), now).await;
    assert_eq!(outcome, TickOutcome::Awaiting);
    assert!(matches!(m.tracker().phase(), BetPhase::Pending(_)));
    assert_eq!(m.history().len(), 2);

    // Same id, now resolved: processed and settled.
    let outcome = m.process_round(resolved("3", "PlayerWon", now), now).await;
    assert!(matches!(
        outcome,
        TickOutcome::Processed { settlement: Some(Settlement::GaleEntered { .. }), .. }
    ));
}

#[tokio::test]
async fn test_in_progress_round_without_result_waits() {
    let (mut m, _src, sink) = monitor_with(CATALOG, 100);
    let now = Utc::now();

    // What the feed actually publishes mid-round: no result block yet.
    let raw: RawRound = serde_json::from_value(serde_json::json!({
        "id": "9",
        "data": { "startedAt": now.to_rfc3339(), "status": "InProgress" }
    }))
    .unwrap();
    assert_eq!(m.process_round(raw.clone(), now).await, TickOutcome::Awaiting);
    assert_eq!(m.process_round(raw, now).await, TickOutcome::Awaiting);
    assert!(m.history().is_empty());
    assert!(sink.sent().is_empty());

    let outcome = m.process_round(resolved("9", "BankerWon", now), now).await;
    assert!(matches!(outcome, TickOutcome::Processed { .. }));
    assert_eq!(m.history().len(), 1);
}

#[tokio::test]
async fn test_unclassifiable_round_discarded() {
    let (mut m, _src, sink) = monitor_with(CATALOG, 100);
    let now = Utc::now();

    let outcome = m.process_round(resolved("1", "Cancelled", now), now).await;
    assert!(matches!(outcome, TickOutcome::Discarded(_)));
    assert!(m.history().is_empty());
    assert!(sink.sent().is_empty());

    let mut raw = resolved("2", "BankerWon", now);
    raw.data.started_at = None;
    assert!(matches!(m.process_round(raw, now).await, TickOutcome::Discarded(_)));
    assert!(m.history().is_empty());
}

// -- History tests --

#[tokio::test]
async fn test_history_bounded() {
    let (mut m, _src, _sink) = monitor_with("[]", 5);
    for i in 0..20 {
        let outcome = if i % 2 == 0 { "PlayerWon" } else { "Tie" };
        feed(&mut m, &i.to_string(), outcome, 5).await;
        assert!(m.history().len() <= 5);
    }
    let ids: Vec<_> = m.history().iter().map(|r| r.id.clone()).collect();
    assert_eq!(ids, vec!["15", "16", "17", "18", "19"]);
    assert_eq!(m.history().last().unwrap().outcome, Symbol::Tie);
}

// -- Notification tests --

#[tokio::test]
async fn test_status_message_lifecycle() {
    let (mut m, _src, sink) = monitor_with(CATALOG, 100);

    feed(&mut m, "1", "PlayerWon", 5).await;
    assert_eq!(sink.texts(), vec![messages::MONITORING.to_string()]);
    let status_id = m.status().live().unwrap();

    // Still idle, status already live: nothing new.
    feed(&mut m, "2", "BankerWon", 5).await;
    assert_eq!(sink.sent().len(), 1);

    // Signal retracts the status first.
    feed(&mut m, "3", "BankerWon", 5).await;
    assert_eq!(sink.retracted(), vec![status_id]);
    assert!(!m.status().is_occupied());

    // Win settles and the monitor goes back to posting status.
    sink.clear();
    feed(&mut m, "4", "BankerWon", 5).await;
    let texts = sink.texts();
    assert!(texts[0].contains("Placar de acertos: 1"));
    // 🔴🔴 matches again right after settlement, so no status this tick.
    assert!(texts[1].contains("PADRÃO P1 DETECTADO"));
    assert_eq!(texts.len(), 2);
}

#[tokio::test]
async fn test_notifier_failure_does_not_block_state() {
    let (mut m, _src, sink) = monitor_with(CATALOG, 100);
    sink.set_error("Bad Gateway");

    feed(&mut m, "1", "BankerWon", 5).await;
    feed(&mut m, "2", "BankerWon", 5).await;
    assert!(matches!(m.tracker().phase(), BetPhase::Pending(_)));
    feed(&mut m, "3", "BankerWon", 5).await;
    assert_eq!(m.tracker().streak(), 1);
    assert!(sink.sent().is_empty());
    assert!(!m.status().is_occupied());

    // Round 3 re-triggered P1, so the next two losses settle it.
    sink.clear_error();
    feed(&mut m, "4", "PlayerWon", 5).await;
    assert!(!m.status().is_occupied());
    feed(&mut m, "5", "PlayerWon", 5).await;
    assert_eq!(m.tracker().streak(), 0);
    assert!(m.status().is_occupied());
}

// -- Tick tests --

#[tokio::test]
async fn test_tick_fetch_error_is_no_data() {
    let (mut m, _src, sink) = monitor_with(CATALOG, 100);
    assert_eq!(m.tick().await, TickOutcome::NoData);
    assert!(m.history().is_empty());
    assert!(sink.sent().is_empty());
}

#[tokio::test]
async fn test_tick_fetch_timeout_is_no_data() {
    let (mut m, src, _sink) = monitor_with(CATALOG, 100);
    src.push(resolved("1", "BankerWon", Utc::now()));
    src.set_delay(StdDuration::from_secs(2));
    assert_eq!(m.tick().await, TickOutcome::NoData);
    assert!(m.history().is_empty());
}

#[tokio::test]
async fn test_tick_processes_queued_rounds() {
    let (mut m, src, _sink) = monitor_with(CATALOG, 100);
    let now = Utc::now();
    src.push(resolved("1", "BankerWon", now));
    src.push(resolved("1", "BankerWon", now));
    src.push(RawRound::new("2", "BankerWon", now, true));

    assert!(matches!(m.tick().await, TickOutcome::Processed { .. }));
    assert_eq!(m.tick().await, TickOutcome::Duplicate);
    assert!(matches!(
        m.tick().await,
        TickOutcome::Processed { decision: Decision::Signalled(_), .. }
    ));
    assert_eq!(m.history().len(), 2);
}
