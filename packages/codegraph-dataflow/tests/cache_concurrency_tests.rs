//! Concurrency tests for the result cache and analysis sessions
//!
//! Sessions are shared across threads: concurrent requests for one key must
//! compute once, failures and cancellations must not poison the cache, and
//! runs with and without hazard tracking must not share entries.

mod common;

use codegraph_dataflow::features::property_set::PropertySetClient;
use codegraph_dataflow::{AnalysisError, AnalysisSession, CancellationToken, Procedure};
use common::*;
use pretty_assertions::assert_eq;
use std::sync::Arc;
use std::thread;

fn unguarded(graph: u64, name: &str) -> Arc<Procedure> {
    let (procedure, _) = straight_method(graph, name, |p, body| {
        p.create_tracked(body, "s");
        p.call_hazardous(body, "s");
    });
    procedure
}

#[test]
fn test_concurrent_requests_compute_once() {
    let analyzer = Arc::new(analyzer());
    let procedure = unguarded(1, "App.Shared");

    let handles: Vec<_> = (0..8)
        .map(|_| {
            let analyzer = Arc::clone(&analyzer);
            let procedure = Arc::clone(&procedure);
            thread::spawn(move || analyzer.analyze(procedure).map(|r| r.findings.len()))
        })
        .collect();

    for handle in handles {
        assert_eq!(handle.join().unwrap().unwrap(), 1);
    }

    let stats = analyzer.session().cache_stats();
    assert_eq!(stats.misses, 1);
    assert_eq!(stats.hits, 7);
    assert_eq!(stats.entries, 1);
}

#[test]
fn test_concurrent_distinct_procedures() {
    let analyzer = analyzer();
    let procedures: Vec<_> = (0..16)
        .map(|i| unguarded(100 + i, &format!("App.P{i}")))
        .collect();

    let reports = analyzer.analyze_all(&procedures);
    assert_eq!(reports.len(), 16);
    for (report, procedure) in reports.iter().zip(&procedures) {
        let report = report.as_ref().unwrap();
        assert_eq!(&report.procedure, procedure.id());
        assert_eq!(report.findings.len(), 1);
    }
    assert_eq!(analyzer.session().cache_stats().entries, 16);
}

#[test]
fn test_cancelled_run_leaves_no_entry() {
    let analyzer = analyzer();
    let procedure = unguarded(2, "App.Cancelled");

    let cancel = CancellationToken::new();
    cancel.cancel();
    let err = analyzer
        .analyze_with_cancellation(Arc::clone(&procedure), &cancel)
        .unwrap_err();
    assert!(err.is_cancelled());

    let stats = analyzer.session().cache_stats();
    assert_eq!(stats.failures, 1);
    assert_eq!(stats.entries, 0);

    // A later request recomputes
    let report = analyzer.analyze(procedure).unwrap();
    assert_eq!(report.findings.len(), 1);
    assert_eq!(analyzer.session().cache_stats().entries, 1);
}

#[test]
fn test_failed_run_is_retried() {
    let config = balanced().with_max_block_visits(1);
    let analyzer = analyzer_with(config);
    let procedure = unguarded(3, "App.Bounded");

    for _ in 0..2 {
        let err = analyzer.analyze(Arc::clone(&procedure)).unwrap_err();
        assert!(matches!(err, AnalysisError::FixpointNotConverged { limit: 1, .. }));
    }
    let stats = analyzer.session().cache_stats();
    assert_eq!(stats.failures, 2);
    assert_eq!(stats.misses, 0);
}

#[test]
fn test_hazard_flag_separates_entries() {
    let session = AnalysisSession::new(PropertySetClient::new(serializer_rule()), balanced()).unwrap();
    let procedure = unguarded(4, "App.Flags");
    let policy = session.config().policy();
    let cancel = CancellationToken::new();

    let without = session
        .get_or_compute(Arc::clone(&procedure), policy, false, &cancel)
        .unwrap();
    assert!(matches!(without.hazards(), Err(AnalysisError::HazardTrackingDisabled)));

    let with = session
        .get_or_compute(Arc::clone(&procedure), policy, true, &cancel)
        .unwrap();
    assert_eq!(with.hazards().unwrap().len(), 1);
    assert_eq!(session.cache_stats().entries, 2);

    // Same key again is a hit
    let again = session.get_or_compute(procedure, policy, true, &cancel).unwrap();
    assert!(Arc::ptr_eq(&with, &again));
    assert_eq!(session.cache_stats().hits, 1);
}

#[test]
fn test_invalidate_graph_drops_entries() {
    let analyzer = analyzer();
    let first = unguarded(5, "App.First");
    let second = unguarded(6, "App.Second");
    analyzer.analyze(Arc::clone(&first)).unwrap();
    analyzer.analyze(second).unwrap();

    let cache = analyzer.session().cache();
    assert_eq!(cache.invalidate_graph(first.graph.id()), 1);
    assert_eq!(cache.len(), 1);

    analyzer.analyze(first).unwrap();
    assert_eq!(analyzer.session().cache_stats().misses, 3);
}

#[test]
fn test_disabled_cache_always_computes() {
    let analyzer = analyzer_with(balanced().with_cache_enabled(false));
    let procedure = unguarded(7, "App.Uncached");

    let first = analyzer.analyze(Arc::clone(&procedure)).unwrap();
    let second = analyzer.analyze(procedure).unwrap();
    assert!(!Arc::ptr_eq(&first.result, &second.result));

    let stats = analyzer.session().cache_stats();
    assert_eq!(stats.hits, 0);
    assert_eq!(stats.misses, 2);
    assert_eq!(stats.entries, 0);
}

#[test]
fn test_shared_session_across_scoped_threads() {
    let analyzer = analyzer();
    let procedures: Vec<_> = (0..4).map(|i| unguarded(200 + i, &format!("App.S{i}"))).collect();

    thread::scope(|scope| {
        for _ in 0..4 {
            scope.spawn(|| {
                for procedure in &procedures {
                    let report = analyzer.analyze(Arc::clone(procedure)).unwrap();
                    assert!(report.has_findings());
                }
            });
        }
    });

    let stats = analyzer.session().cache_stats();
    assert_eq!(stats.misses, 4);
    assert_eq!(stats.hits, 12);
}
