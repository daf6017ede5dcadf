use std::path::PathBuf;
use std::sync::mpsc::Sender;

use crate::action_executor::{launch_path, log_failure};
use crate::config::{ModuleConfig, CONFIG_FILE_NAME};
use crate::logging;
use crate::model::{Action, IconRef, ResultCandidate};
use crate::provider::{LauncherCommand, Provider, ResultSink};

pub const MODULE_NAME: &str = "Launcher Commands";

const INFO_GLYPH: char = '\u{e88e}';
const REFRESH_GLYPH: char = '\u{e72c}';
const FOLDER_GLYPH: char = '\u{e838}';

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Command {
    Version,
    Reload,
    OpenConfigFolder,
    OpenLogsFolder,
}

impl Command {
    const ALL: [Command; 4] = [
        Command::Version,
        Command::Reload,
        Command::OpenConfigFolder,
        Command::OpenLogsFolder,
    ];

    fn keyword(self) -> &'static str {
        match self {
            Self::Version => "version",
            Self::Reload => "reload",
            Self::OpenConfigFolder => "config",
            Self::OpenLogsFolder => "logs",
        }
    }
}

/// Commands about the launcher itself, reached with the `>` prefix.
pub struct LauncherCommands {
    config_dir: PathBuf,
    commands: Sender<LauncherCommand>,
}

impl LauncherCommands {
    pub fn new(config_dir: PathBuf, commands: Sender<LauncherCommand>) -> Self {
        Self {
            config_dir,
            commands,
        }
    }

    fn candidate(&self, command: Command) -> ResultCandidate {
        match command {
            Command::Version => ResultCandidate::new(
                &format!("Version: {}", env!("CARGO_PKG_VERSION")),
                env!("CARGO_PKG_NAME"),
            )
            .with_icon(IconRef::Glyph(INFO_GLYPH)),
            Command::Reload => {
                let sender = self.commands.clone();
                ResultCandidate::new("Reload configuration", CONFIG_FILE_NAME)
                    .with_icon(IconRef::Glyph(REFRESH_GLYPH))
                    .with_history_key("launcher_reload")
                    .with_action(Action::new(move || {
                        if sender.send(LauncherCommand::ReloadConfig).is_err() {
                            logging::warn("reload requested after launcher shut down");
                        }
                    }))
            }
            Command::OpenConfigFolder => {
                self.folder_candidate("Open configuration folder", self.config_dir.clone())
            }
            Command::OpenLogsFolder => {
                self.folder_candidate("Open logs folder", logging::logs_dir(&self.config_dir))
            }
        }
    }

    fn folder_candidate(&self, title: &str, folder: PathBuf) -> ResultCandidate {
        let display = folder.to_string_lossy().to_string();
        let target = display.clone();
        ResultCandidate::new(title, &display)
            .with_icon(IconRef::Glyph(FOLDER_GLYPH))
            .with_action(Action::new(move || {
                log_failure("open folder", launch_path(&target));
            }))
    }
}

impl Provider for LauncherCommands {
    fn name(&self) -> &str {
        MODULE_NAME
    }

    fn default_config(&self) -> Option<ModuleConfig> {
        Some(ModuleConfig::new(true, false, 1.0, '>'))
    }

    fn query(&self, text: &str, sink: ResultSink) {
        let needle = text.to_lowercase();
        let results = Command::ALL
            .into_iter()
            .filter(|command| command.keyword().starts_with(&needle))
            .map(|command| self.candidate(command))
            .collect();

        if let Err(error) = sink.deliver(results) {
            logging::warn(&format!("{MODULE_NAME}: {error}"));
        }
    }
}

#[cfg(test)]
mod tests {
    use super::{LauncherCommands, MODULE_NAME};
    use crate::provider::{command_channel, result_channel, LauncherCommand, Provider, ResultSink};

    fn titles(provider: &LauncherCommands, text: &str) -> Vec<String> {
        let (sender, receiver) = result_channel();
        provider.query(text, ResultSink::new(sender, MODULE_NAME, 1));
        receiver
            .try_recv()
            .unwrap()
            .candidates
            .into_iter()
            .map(|candidate| candidate.title)
            .collect()
    }

    #[test]
    fn empty_text_lists_every_command() {
        let (commands, _receiver) = command_channel();
        let provider = LauncherCommands::new(std::env::temp_dir(), commands);
        assert_eq!(titles(&provider, "").len(), 4);
    }

    #[test]
    fn version_has_no_actions_and_no_history_key() {
        let (commands, _receiver) = command_channel();
        let provider = LauncherCommands::new(std::env::temp_dir(), commands);
        let (sender, receiver) = result_channel();
        provider.query("version", ResultSink::new(sender, MODULE_NAME, 1));

        let batch = receiver.try_recv().unwrap();
        assert_eq!(batch.candidates.len(), 1);
        assert!(batch.candidates[0].title.starts_with("Version: "));
        assert!(batch.candidates[0].actions.is_empty());
        assert!(batch.candidates[0].history_key.is_empty());
    }

    #[test]
    fn reload_action_posts_a_command() {
        let (commands, command_receiver) = command_channel();
        let provider = LauncherCommands::new(std::env::temp_dir(), commands);
        let (sender, receiver) = result_channel();
        provider.query("rel", ResultSink::new(sender, MODULE_NAME, 1));

        let batch = receiver.try_recv().unwrap();
        batch.candidates[0].actions[0].invoke();
        assert_eq!(command_receiver.try_recv().unwrap(), LauncherCommand::ReloadConfig);
    }

    #[test]
    fn unknown_command_yields_empty_batch() {
        let (commands, _receiver) = command_channel();
        let provider = LauncherCommands::new(std::env::temp_dir(), commands);
        assert!(titles(&provider, "shutdown").is_empty());
    }
}
