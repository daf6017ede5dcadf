use std::path::{Path, PathBuf};

use serde::Deserialize;

use crate::action_executor::{launch_command, log_failure};
use crate::config::ModuleConfig;
use crate::logging;
use crate::model::{match_quality, normalize_for_search, Action, IconRef, ResultCandidate};
use crate::provider::{Provider, ResultSink};

pub const MODULE_NAME: &str = "Terminal Profiles";

const TERMINAL_GLYPH: char = '\u{eb8e}';

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct TerminalSettings {
    profiles: ProfilesSection,
}

/// Newer settings files nest profiles under `list`; older ones use a bare
/// array.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum ProfilesSection {
    Listed {
        #[serde(default)]
        list: Vec<Profile>,
    },
    Flat(Vec<Profile>),
}

impl Default for ProfilesSection {
    fn default() -> Self {
        Self::Flat(Vec::new())
    }
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct Profile {
    name: String,
    hidden: bool,
}

pub fn default_settings_path() -> Option<PathBuf> {
    dirs::data_local_dir().map(|dir| {
        dir.join("Packages")
            .join("Microsoft.WindowsTerminal_8wekyb3d8bbwe")
            .join("LocalState")
            .join("settings.json")
    })
}

/// Visible profile names, in file order. The settings file allows comments
/// and trailing commas, hence json5.
pub fn parse_profile_names(raw: &str) -> Result<Vec<String>, String> {
    let settings: TerminalSettings = json5::from_str(raw).map_err(|e| e.to_string())?;
    let profiles = match settings.profiles {
        ProfilesSection::Listed { list } => list,
        ProfilesSection::Flat(list) => list,
    };
    Ok(profiles
        .into_iter()
        .filter(|profile| !profile.hidden && !profile.name.trim().is_empty())
        .map(|profile| profile.name)
        .collect())
}

pub struct TerminalProfiles {
    profiles: Vec<String>,
}

impl TerminalProfiles {
    pub fn new(profiles: Vec<String>) -> Self {
        Self { profiles }
    }

    /// A missing or broken settings file leaves the provider empty.
    pub fn from_settings_file(path: &Path) -> Self {
        let raw = match std::fs::read_to_string(path) {
            Ok(raw) => raw,
            Err(error) => {
                logging::info(&format!(
                    "{MODULE_NAME}: no terminal settings at {}: {error}",
                    path.display()
                ));
                return Self::new(Vec::new());
            }
        };

        match parse_profile_names(&raw) {
            Ok(profiles) => Self::new(profiles),
            Err(error) => {
                logging::warn(&format!(
                    "{MODULE_NAME}: failed to parse {}: {error}",
                    path.display()
                ));
                Self::new(Vec::new())
            }
        }
    }

    pub fn profiles(&self) -> &[String] {
        &self.profiles
    }
}

impl Provider for TerminalProfiles {
    fn name(&self) -> &str {
        MODULE_NAME
    }

    fn default_config(&self) -> Option<ModuleConfig> {
        Some(ModuleConfig::new(true, true, 0.8, ' '))
    }

    fn query(&self, text: &str, sink: ResultSink) {
        let needle = normalize_for_search(text);
        let results = self
            .profiles
            .iter()
            .map(|name| (name, match_quality(name, &needle)))
            .filter(|(_, score)| *score > 0.0)
            .map(|(name, score)| {
                let profile = name.clone();
                ResultCandidate::new(name, "Open in Windows Terminal")
                    .with_score(score)
                    .with_icon(IconRef::Glyph(TERMINAL_GLYPH))
                    .with_history_key(&format!("terminal_{name}"))
                    .with_action(Action::new(move || {
                        log_failure("open terminal profile", launch_command("wt", &["-p", &profile]));
                    }))
            })
            .collect();

        if let Err(error) = sink.deliver(results) {
            logging::warn(&format!("{MODULE_NAME}: {error}"));
        }
    }
}

#[cfg(test)]
mod tests {
    use super::{parse_profile_names, TerminalProfiles, MODULE_NAME};
    use crate::provider::{result_channel, Provider, ResultSink};

    #[test]
    fn reads_listed_profiles_with_comments() {
        let raw = r#"{
            // user settings
            "defaultProfile": "{abc}",
            "profiles": {
                "defaults": {},
                "list": [
                    { "name": "PowerShell" },
                    { "name": "Ubuntu", },
                    { "name": "Azure Cloud Shell", "hidden": true },
                ],
            },
        }"#;
        assert_eq!(
            parse_profile_names(raw).unwrap(),
            vec!["PowerShell".to_string(), "Ubuntu".to_string()]
        );
    }

    #[test]
    fn reads_flat_profile_array() {
        let raw = r#"{ "profiles": [ { "name": "cmd" } ] }"#;
        assert_eq!(parse_profile_names(raw).unwrap(), vec!["cmd".to_string()]);
    }

    #[test]
    fn broken_settings_are_an_error() {
        assert!(parse_profile_names("{ profiles: ").is_err());
    }

    #[test]
    fn missing_settings_file_yields_no_profiles() {
        let path = std::env::temp_dir().join("quickrun-no-such-terminal-settings.json");
        assert!(TerminalProfiles::from_settings_file(&path).profiles().is_empty());
    }

    #[test]
    fn query_matches_case_insensitively() {
        let provider = TerminalProfiles::new(vec!["PowerShell".into(), "Ubuntu".into()]);
        let (sender, receiver) = result_channel();
        provider.query("shell", ResultSink::new(sender, MODULE_NAME, 1));

        let batch = receiver.try_recv().unwrap();
        assert_eq!(batch.candidates.len(), 1);
        assert_eq!(batch.candidates[0].history_key, "terminal_PowerShell");
    }

    #[test]
    fn query_grades_matches_and_ignores_blank_text() {
        let provider = TerminalProfiles::new(vec![
            "PowerShell".into(),
            "Windows PowerShell".into(),
            "Ubuntu".into(),
        ]);
        let (sender, receiver) = result_channel();
        provider.query("powershell", ResultSink::new(sender.clone(), MODULE_NAME, 1));
        let batch = receiver.try_recv().unwrap();
        let scores: Vec<(String, f64)> = batch
            .candidates
            .iter()
            .map(|candidate| (candidate.title.clone(), candidate.match_score))
            .collect();
        assert_eq!(
            scores,
            vec![("PowerShell".to_string(), 2.0), ("Windows PowerShell".to_string(), 1.0)]
        );

        provider.query("   ", ResultSink::new(sender, MODULE_NAME, 2));
        assert!(receiver.try_recv().unwrap().candidates.is_empty());
    }
}
