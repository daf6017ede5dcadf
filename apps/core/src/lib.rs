pub mod action_executor;
pub mod config;
pub mod contract;
pub mod history;
pub mod keys;
pub mod launcher;
pub mod logging;
pub mod model;
pub mod notify;
pub mod overlay_state;
pub mod provider;
pub mod providers;
pub mod ranking;
pub mod registry;
pub mod router;
pub mod runtime;
pub mod selection;
pub mod transport;
