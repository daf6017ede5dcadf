//! One launcher session: text in, ranked rows and invocations out.
//!
//! `Launcher` wires the registry, router, ranker, selection and history
//! together and owns the channel providers answer on. It never blocks:
//! `on_input_changed` dispatches and merges whatever is already queued,
//! `pump` merges what arrived since.

use std::sync::mpsc::{Receiver, Sender};

use crate::action_executor;
use crate::config::AppConfig;
use crate::history::HistoryStore;
use crate::keys::{Key, KeyChord};
use crate::logging;
use crate::overlay_state::{HotkeyAction, OverlayState};
use crate::provider::{
    command_channel, result_channel, BatchReady, LauncherCommand, Provider, ResultSink,
};
use crate::ranking::{ListState, MergeOutcome, RankedResult, ResultRanker};
use crate::registry::ModuleRegistry;
use crate::router::QueryRouter;
use crate::selection::{InvokeContext, KeyEvent, KeyOutcome, SelectionController};

pub struct Launcher {
    config: AppConfig,
    providers: Vec<Box<dyn Provider>>,
    registry: ModuleRegistry,
    router: QueryRouter,
    ranker: ResultRanker,
    selection: SelectionController,
    history: HistoryStore,
    overlay: OverlayState,
    sender: Sender<BatchReady>,
    receiver: Receiver<BatchReady>,
    command_sender: Sender<LauncherCommand>,
    command_receiver: Receiver<LauncherCommand>,
    query_text: String,
    reload_requested: bool,
}

impl Launcher {
    pub fn new(config: AppConfig, history: HistoryStore) -> Self {
        let (sender, receiver) = result_channel();
        let (command_sender, command_receiver) = command_channel();
        Self {
            config,
            providers: Vec::new(),
            registry: ModuleRegistry::default(),
            router: QueryRouter::new(),
            ranker: ResultRanker::new(),
            selection: SelectionController::default(),
            history,
            overlay: OverlayState::default(),
            sender,
            receiver,
            command_sender,
            command_receiver,
            query_text: String::new(),
            reload_requested: false,
        }
    }

    pub fn with_providers(mut self, providers: Vec<Box<dyn Provider>>) -> Self {
        self.providers = providers;
        self.rebuild_registry();
        self
    }

    pub fn register(&mut self, provider: Box<dyn Provider>) {
        self.providers.push(provider);
        self.rebuild_registry();
    }

    fn rebuild_registry(&mut self) {
        let registry = ModuleRegistry::from_config(
            &self.config,
            self.providers
                .iter()
                .map(|provider| (provider.name(), provider.default_config())),
        );
        self.registry = registry;
    }

    /// The loaded config with an entry for every registered provider, as
    /// written to disk on first run.
    pub fn resolved_config(&self) -> AppConfig {
        let mut cfg = self.config.clone();
        for provider in &self.providers {
            cfg.ensure_module(provider.name(), provider.default_config().unwrap_or_default());
        }
        cfg
    }

    /// Clone for handlers that post launcher requests such as a reload.
    pub fn command_sender(&self) -> Sender<LauncherCommand> {
        self.command_sender.clone()
    }

    /// Clone for providers that answer from their own worker.
    pub fn result_sender(&self) -> Sender<BatchReady> {
        self.sender.clone()
    }

    /// Starts a new query cycle for `text`. Returns the number of providers
    /// the text was routed to.
    pub fn on_input_changed(&mut self, text: &str) -> usize {
        self.query_text = text.to_string();
        let dispatch = self.router.dispatch(&self.registry, text);
        self.ranker.begin_cycle(&dispatch);
        self.selection.clear();

        for route in &dispatch.routes {
            let Some(provider) = self
                .providers
                .iter()
                .find(|provider| provider.name() == route.module_id)
            else {
                logging::warn(&format!("no provider registered for '{}'", route.module_id));
                continue;
            };
            let sink = ResultSink::new(self.sender.clone(), &route.module_id, dispatch.generation);
            provider.query(&route.query, sink);
        }

        self.pump();
        dispatch.routes.len()
    }

    /// Merges every queued batch, applies queued launcher commands and
    /// collects exited launches. Returns how many batches were merged.
    pub fn pump(&mut self) -> usize {
        let mut merged = 0;
        while let Ok(batch) = self.receiver.try_recv() {
            if self.deliver(batch) == MergeOutcome::Merged {
                merged += 1;
            }
        }
        while let Ok(command) = self.command_receiver.try_recv() {
            match command {
                LauncherCommand::ReloadConfig => self.reload_requested = true,
            }
        }
        action_executor::reaper().reap_finished();
        merged
    }

    pub fn deliver(&mut self, batch: BatchReady) -> MergeOutcome {
        let module_id = batch.module_id.clone();
        let outcome = self.ranker.merge(&self.registry, &self.history, batch);
        match outcome {
            MergeOutcome::Merged => self.selection.on_list_rebuilt(self.visible_len()),
            MergeOutcome::UnknownProvider => {
                logging::warn(&format!("dropped batch from unknown provider '{module_id}'"));
            }
            MergeOutcome::Stale => {}
        }
        outcome
    }

    /// True once after a handler asked for the configuration to be reloaded.
    pub fn take_reload_request(&mut self) -> bool {
        std::mem::take(&mut self.reload_requested)
    }

    pub fn handle_key(&mut self, event: &KeyEvent) -> KeyOutcome {
        if event.chord == KeyChord::plain(Key::Escape) {
            return if self.on_escape() {
                KeyOutcome::Handled
            } else {
                KeyOutcome::Ignored
            };
        }

        let visible = self.visible_len();
        let ctx = InvokeContext {
            results: &self.ranker.results()[..visible],
            history: &mut self.history,
            overlay: &mut self.overlay,
        };
        let outcome = self.selection.handle_key(event, ctx);
        self.after_invocation(&outcome);
        outcome
    }

    pub fn hover(&mut self, hover: Option<(usize, usize)>) {
        self.selection.set_hover(hover);
    }

    pub fn click_row(&mut self, row: usize) -> bool {
        self.selection.select_row(self.visible_len(), row)
    }

    pub fn click_action(&mut self, row: usize, action: usize) -> KeyOutcome {
        let visible = self.visible_len();
        let ctx = InvokeContext {
            results: &self.ranker.results()[..visible],
            history: &mut self.history,
            overlay: &mut self.overlay,
        };
        let outcome = self.selection.click_action(row, action, ctx);
        self.after_invocation(&outcome);
        outcome
    }

    pub fn double_click_row(&mut self, row: usize) -> KeyOutcome {
        self.click_action(row, 0)
    }

    pub fn on_hotkey(&mut self, has_focus: bool) -> HotkeyAction {
        let action = self.overlay.on_hotkey(has_focus);
        if action == HotkeyAction::Hide {
            self.reset_session();
        }
        action
    }

    pub fn on_escape(&mut self) -> bool {
        if !self.overlay.on_escape() {
            return false;
        }
        self.reset_session();
        true
    }

    /// Swaps in a new configuration and re-runs the current text against it.
    pub fn reload_config(&mut self, config: AppConfig) {
        self.config = config;
        self.rebuild_registry();
        logging::info(&format!(
            "configuration reloaded modules={}",
            self.registry.len()
        ));
        if self.query_text.is_empty() {
            return;
        }
        let text = self.query_text.clone();
        self.on_input_changed(&text);
    }

    fn after_invocation(&mut self, outcome: &KeyOutcome) {
        if let KeyOutcome::Invoked(invocation) = outcome {
            logging::info(&format!(
                "invoked row={} action={:?} key='{}'",
                invocation.row, invocation.action, invocation.history_key
            ));
            self.reset_session();
            // Handlers may have queued commands.
            self.pump();
        }
    }

    /// Hidden launchers start from an empty box. Dispatching the empty text
    /// advances the generation so late batches are dropped.
    fn reset_session(&mut self) {
        self.query_text.clear();
        let dispatch = self.router.dispatch(&self.registry, "");
        self.ranker.begin_cycle(&dispatch);
        self.selection.clear();
    }

    pub fn results(&self) -> &[RankedResult] {
        self.ranker.results()
    }

    /// The rows the UI shows. Keyboard and mouse selection never leave them.
    pub fn visible_results(&self) -> &[RankedResult] {
        &self.ranker.results()[..self.visible_len()]
    }

    fn visible_len(&self) -> usize {
        self.ranker
            .len()
            .min(usize::from(self.config.ui.max_visible_results))
    }

    pub fn list_state(&self) -> ListState {
        self.ranker.state()
    }

    pub fn generation(&self) -> u64 {
        self.router.generation()
    }

    pub fn query_text(&self) -> &str {
        &self.query_text
    }

    pub fn config(&self) -> &AppConfig {
        &self.config
    }

    pub fn registry(&self) -> &ModuleRegistry {
        &self.registry
    }

    pub fn selection(&self) -> &SelectionController {
        &self.selection
    }

    pub fn history(&self) -> &HistoryStore {
        &self.history
    }

    pub fn overlay(&self) -> &OverlayState {
        &self.overlay
    }

    pub fn overlay_mut(&mut self) -> &mut OverlayState {
        &mut self.overlay
    }
}
