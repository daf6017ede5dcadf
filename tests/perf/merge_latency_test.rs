use std::time::Instant;

use crate::config::HistorySettings;
use crate::history::HistoryStore;
use crate::model::ResultCandidate;
use crate::provider::BatchReady;
use crate::ranking::ResultRanker;
use crate::registry::{ModuleRegistry, ProviderDescriptor};
use crate::router::QueryRouter;

const PROVIDERS: [&str; 3] = ["Apps Search", "Files", "Terminal Profiles"];

fn p95_ms(samples: &mut [f64]) -> f64 {
    samples.sort_by(|a, b| a.partial_cmp(b).unwrap_or(std::cmp::Ordering::Equal));
    let last = samples.len().saturating_sub(1);
    let idx = ((last as f64) * 0.95).round() as usize;
    samples[idx.min(last)]
}

fn batches(generation: u64) -> Vec<BatchReady> {
    PROVIDERS
        .iter()
        .map(|module_id| BatchReady {
            generation,
            module_id: module_id.to_string(),
            candidates: (0..2_000)
                .map(|i| {
                    ResultCandidate::new(&format!("Document_{i:05}"), "")
                        .with_history_key(&format!("{module_id}_{i}"))
                        .with_score(1.0 + (i % 7) as f64 * 0.25)
                })
                .collect(),
        })
        .collect()
}

#[test]
fn full_merge_cycle_p95_under_50ms() {
    let registry = ModuleRegistry::new(
        PROVIDERS
            .iter()
            .map(|name| ProviderDescriptor::new(name))
            .collect(),
    );
    let mut history = HistoryStore::in_memory(HistorySettings::default());
    for i in (0..2_000).step_by(10) {
        history.record_use(&format!("Apps Search_{i}"));
    }
    let mut router = QueryRouter::new();
    let mut ranker = ResultRanker::new();

    let mut samples = Vec::with_capacity(40);
    for _ in 0..40 {
        let dispatch = router.dispatch(&registry, "doc");
        let pending = batches(dispatch.generation);

        let start = Instant::now();
        ranker.begin_cycle(&dispatch);
        for batch in pending {
            ranker.merge(&registry, &history, batch);
        }
        samples.push(start.elapsed().as_secs_f64() * 1000.0);

        assert_eq!(ranker.len(), 6_000);
    }

    let p95 = p95_ms(&mut samples);
    assert!(p95 <= 50.0, "merge p95 too high: {p95:.3}ms (budget 50.0ms)");
}
