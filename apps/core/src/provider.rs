use std::fmt::{Display, Formatter};
use std::sync::mpsc::{self, Receiver, Sender};

use crate::config::ModuleConfig;
use crate::model::ResultCandidate;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProviderError {
    message: String,
}

impl ProviderError {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

impl Display for ProviderError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.message)
    }
}

impl std::error::Error for ProviderError {}

/// One provider's answer to one dispatched query.
#[derive(Debug)]
pub struct BatchReady {
    pub generation: u64,
    pub module_id: String,
    pub candidates: Vec<ResultCandidate>,
}

/// Handed to a provider with each query. The provider may answer right away
/// or move the sink to its own worker and answer later; either way the batch
/// lands on the launcher's channel tagged with the query's generation.
#[derive(Debug, Clone)]
pub struct ResultSink {
    sender: Sender<BatchReady>,
    module_id: String,
    generation: u64,
}

impl ResultSink {
    pub fn new(sender: Sender<BatchReady>, module_id: &str, generation: u64) -> Self {
        Self {
            sender,
            module_id: module_id.to_string(),
            generation,
        }
    }

    pub fn module_id(&self) -> &str {
        &self.module_id
    }

    pub fn generation(&self) -> u64 {
        self.generation
    }

    pub fn deliver(&self, candidates: Vec<ResultCandidate>) -> Result<(), ProviderError> {
        self.sender
            .send(BatchReady {
                generation: self.generation,
                module_id: self.module_id.clone(),
                candidates,
            })
            .map_err(|_| ProviderError::new("launcher is no longer receiving results"))
    }
}

pub fn result_channel() -> (Sender<BatchReady>, Receiver<BatchReady>) {
    mpsc::channel()
}

/// Requests an action handler can make of the launcher itself. Drained
/// together with result batches.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LauncherCommand {
    ReloadConfig,
}

pub fn command_channel() -> (Sender<LauncherCommand>, Receiver<LauncherCommand>) {
    mpsc::channel()
}

pub trait Provider {
    /// Stable identity; also the source of the module's config key.
    fn name(&self) -> &str;

    /// Used when the configuration file has no entry for this module.
    fn default_config(&self) -> Option<ModuleConfig> {
        None
    }

    /// Fire-and-forget. Results go through `sink`, at most once per query is
    /// expected; a later delivery replaces the earlier one.
    fn query(&self, text: &str, sink: ResultSink);
}
