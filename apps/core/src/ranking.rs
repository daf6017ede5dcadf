//! Merges provider batches into one list ordered by
//! `priority * match_score * history_factor`.

use serde::{Deserialize, Serialize};

use crate::history::HistoryStore;
use crate::model::ResultCandidate;
use crate::provider::BatchReady;
use crate::registry::ModuleRegistry;
use crate::router::Dispatch;

#[derive(Debug)]
pub struct RankedResult {
    pub candidate: ResultCandidate,
    pub module_id: String,
    pub provider_priority: f64,
    pub history_factor: f64,
    pub final_score: f64,
    slot: usize,
    position: usize,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ListState {
    /// No query issued; the search box is empty.
    #[default]
    Idle,
    /// Query dispatched, no batch merged yet.
    Pending,
    NoResults,
    Results,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MergeOutcome {
    Merged,
    UnknownProvider,
    Stale,
}

#[derive(Debug, Default)]
pub struct ResultRanker {
    generation: u64,
    state: ListState,
    /// Providers in the order they first contributed this cycle.
    slots: Vec<String>,
    results: Vec<RankedResult>,
}

impl ResultRanker {
    pub fn new() -> Self {
        Self::default()
    }

    /// Drops everything from the previous query and only accepts batches
    /// stamped with `dispatch.generation` from now on.
    pub fn begin_cycle(&mut self, dispatch: &Dispatch) {
        self.generation = dispatch.generation;
        self.slots.clear();
        self.results.clear();
        self.state = if dispatch.empty_input {
            ListState::Idle
        } else if dispatch.routes.is_empty() {
            ListState::NoResults
        } else {
            ListState::Pending
        };
    }

    pub fn merge(
        &mut self,
        registry: &ModuleRegistry,
        history: &HistoryStore,
        batch: BatchReady,
    ) -> MergeOutcome {
        if batch.generation != self.generation || self.state == ListState::Idle {
            return MergeOutcome::Stale;
        }
        let Some(priority) = registry.priority_of(&batch.module_id) else {
            return MergeOutcome::UnknownProvider;
        };

        let slot = match self.slots.iter().position(|id| *id == batch.module_id) {
            Some(slot) => slot,
            None => {
                self.slots.push(batch.module_id.clone());
                self.slots.len() - 1
            }
        };

        self.results.retain(|result| result.module_id != batch.module_id);
        let module_id = batch.module_id;
        self.results.extend(
            batch
                .candidates
                .into_iter()
                .filter(ResultCandidate::is_match)
                .enumerate()
                .map(|(position, candidate)| {
                    let history_factor = history.history_factor(&candidate.history_key);
                    RankedResult {
                        final_score: priority * candidate.match_score * history_factor,
                        candidate,
                        module_id: module_id.clone(),
                        provider_priority: priority,
                        history_factor,
                        slot,
                        position,
                    }
                }),
        );

        self.results.sort_by(|a, b| {
            b.final_score
                .total_cmp(&a.final_score)
                .then_with(|| a.slot.cmp(&b.slot))
                .then_with(|| a.position.cmp(&b.position))
        });

        self.state = if self.results.is_empty() {
            ListState::NoResults
        } else {
            ListState::Results
        };
        MergeOutcome::Merged
    }

    pub fn results(&self) -> &[RankedResult] {
        &self.results
    }

    pub fn get(&self, index: usize) -> Option<&RankedResult> {
        self.results.get(index)
    }

    pub fn len(&self) -> usize {
        self.results.len()
    }

    pub fn is_empty(&self) -> bool {
        self.results.is_empty()
    }

    pub fn state(&self) -> ListState {
        self.state
    }

    pub fn generation(&self) -> u64 {
        self.generation
    }
}
