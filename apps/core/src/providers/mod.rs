//! Providers shipped with the launcher.

pub mod apps;
pub mod launcher_commands;
pub mod terminal_profiles;

use std::sync::mpsc::Sender;

use crate::config::{self, AppConfig};
use crate::notify::Notifier;
use crate::provider::{LauncherCommand, Provider};

pub use apps::AppsSearch;
pub use launcher_commands::LauncherCommands;
pub use terminal_profiles::TerminalProfiles;

/// Builds the stock providers in registration order. The apps catalog is
/// read from its module file, which is created by scanning the default
/// roots on first run.
pub fn default_providers(
    cfg: &AppConfig,
    commands: Sender<LauncherCommand>,
    notifier: &dyn Notifier,
) -> Vec<Box<dyn Provider>> {
    let catalog = config::load_module_file(
        cfg,
        apps::MODULE_NAME,
        || apps::discover_apps(&apps::default_roots()),
        notifier,
    );
    let terminal = match terminal_profiles::default_settings_path() {
        Some(path) => TerminalProfiles::from_settings_file(&path),
        None => TerminalProfiles::new(Vec::new()),
    };

    vec![
        Box::new(LauncherCommands::new(cfg.config_dir.clone(), commands)),
        Box::new(AppsSearch::new(catalog)),
        Box::new(terminal),
    ]
}
