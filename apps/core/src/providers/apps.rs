use std::collections::HashSet;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use walkdir::WalkDir;

use crate::action_executor::{launch_path, log_failure, reveal_in_folder};
use crate::keys::{Key, KeyChord};
use crate::logging;
use crate::model::{match_quality, normalize_for_search, Action, IconRef, ResultCandidate};
use crate::provider::{Provider, ResultSink};

pub const MODULE_NAME: &str = "Apps Search";

const FOLDER_GLYPH: char = '\u{e838}';
const MAX_DISCOVERY_DEPTH: usize = 6;
const LAUNCHABLE_EXTENSIONS: [&str; 5] = ["lnk", "exe", "url", "desktop", "appimage"];

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct AppEntry {
    pub name: String,
    pub path: String,
    pub keywords: Vec<String>,
}

impl AppEntry {
    pub fn new(name: &str, path: &str) -> Self {
        Self {
            name: name.to_string(),
            path: path.to_string(),
            keywords: vec![normalize_for_search(name)],
        }
    }
}

/// Contents of `Modules/Apps Search.json`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct AppsCatalog {
    pub apps: Vec<AppEntry>,
}

/// Start-menu style folders scanned when no catalog exists yet.
pub fn default_roots() -> Vec<PathBuf> {
    let mut roots = Vec::new();
    #[cfg(target_os = "windows")]
    {
        if let Some(data) = dirs::data_dir() {
            roots.push(data.join(r"Microsoft\Windows\Start Menu\Programs"));
        }
        roots.push(PathBuf::from(r"C:\ProgramData\Microsoft\Windows\Start Menu\Programs"));
    }
    #[cfg(not(target_os = "windows"))]
    {
        if let Some(data) = dirs::data_dir() {
            roots.push(data.join("applications"));
        }
        roots.push(PathBuf::from("/usr/share/applications"));
    }
    roots
}

/// Builds a catalog from launchable files under `roots`. Unreadable entries
/// are skipped; a path reachable from two roots is listed once.
pub fn discover_apps(roots: &[PathBuf]) -> AppsCatalog {
    let mut seen = HashSet::new();
    let mut apps = Vec::new();

    for root in roots {
        if !root.exists() {
            continue;
        }
        for entry in WalkDir::new(root)
            .max_depth(MAX_DISCOVERY_DEPTH)
            .into_iter()
            .filter_map(Result::ok)
            .filter(|entry| entry.file_type().is_file())
            .filter(|entry| is_launchable(entry.path()))
        {
            let path = entry.path().to_string_lossy().to_string();
            if !seen.insert(path.clone()) {
                continue;
            }
            let Some(name) = entry.path().file_stem() else {
                continue;
            };
            apps.push(AppEntry::new(&name.to_string_lossy(), &path));
        }
    }

    apps.sort_by(|a, b| a.name.to_lowercase().cmp(&b.name.to_lowercase()));
    logging::info(&format!("{MODULE_NAME}: discovered {} apps", apps.len()));
    AppsCatalog { apps }
}

fn is_launchable(path: &Path) -> bool {
    path.extension()
        .and_then(|ext| ext.to_str())
        .map(|ext| {
            LAUNCHABLE_EXTENSIONS
                .iter()
                .any(|known| ext.eq_ignore_ascii_case(known))
        })
        .unwrap_or(false)
}

/// Keyword match quality: exact 2.0, prefix 1.5, substring 1.0, else 0.
pub fn keyword_score(entry: &AppEntry, query: &str) -> f64 {
    let needle = normalize_for_search(query);
    if needle.is_empty() {
        return 0.0;
    }

    std::iter::once(&entry.name)
        .chain(entry.keywords.iter())
        .map(|keyword| match_quality(keyword, &needle))
        .fold(0.0, f64::max)
}

pub fn history_key(entry: &AppEntry) -> String {
    format!("app_{}", entry.path)
}

pub struct AppsSearch {
    catalog: AppsCatalog,
}

impl AppsSearch {
    pub fn new(catalog: AppsCatalog) -> Self {
        Self { catalog }
    }

    pub fn catalog(&self) -> &AppsCatalog {
        &self.catalog
    }
}

fn candidate(entry: &AppEntry, score: f64) -> ResultCandidate {
    let open_path = entry.path.clone();
    let reveal_path = entry.path.clone();
    ResultCandidate::new(&entry.name, &entry.path)
        .with_icon(IconRef::Thumbnail(PathBuf::from(&entry.path)))
        .with_history_key(&history_key(entry))
        .with_score(score)
        .with_action(Action::new(move || {
            log_failure("open app", launch_path(&open_path));
        }))
        .with_action(
            Action::new(move || {
                log_failure("open app folder", reveal_in_folder(&reveal_path));
            })
            .with_icon(FOLDER_GLYPH)
            .with_shortcut(KeyChord::ctrl(Key::Char('O'))),
        )
}

impl Provider for AppsSearch {
    fn name(&self) -> &str {
        MODULE_NAME
    }

    fn query(&self, text: &str, sink: ResultSink) {
        let results = self
            .catalog
            .apps
            .iter()
            .filter_map(|entry| {
                let score = keyword_score(entry, text);
                (score > 0.0).then(|| candidate(entry, score))
            })
            .collect();

        if let Err(error) = sink.deliver(results) {
            logging::warn(&format!("{MODULE_NAME}: {error}"));
        }
    }
}

#[cfg(test)]
mod tests {
    use std::time::{SystemTime, UNIX_EPOCH};

    use super::{discover_apps, history_key, keyword_score, AppEntry, AppsCatalog, AppsSearch, MODULE_NAME};
    use crate::keys::{Key, KeyChord};
    use crate::provider::{result_channel, Provider, ResultSink};

    fn catalog() -> AppsCatalog {
        AppsCatalog {
            apps: vec![
                AppEntry::new("Visual Studio Code", "/opt/code/code"),
                AppEntry::new("Calculator", "/usr/bin/calc"),
                AppEntry {
                    name: "Terminal".to_string(),
                    path: "/usr/bin/term".to_string(),
                    keywords: vec!["term".to_string(), "shell".to_string()],
                },
            ],
        }
    }

    #[test]
    fn keyword_scores_rank_exact_over_prefix_over_substring() {
        let entry = AppEntry {
            name: "Terminal".to_string(),
            path: String::new(),
            keywords: vec!["shell".to_string()],
        };
        assert_eq!(keyword_score(&entry, "Terminal"), 2.0);
        assert_eq!(keyword_score(&entry, "term"), 1.5);
        assert_eq!(keyword_score(&entry, "hell"), 1.0);
        assert_eq!(keyword_score(&entry, "zzz"), 0.0);
        assert_eq!(keyword_score(&entry, "   "), 0.0);
    }

    #[test]
    fn spaced_keywords_match_spaced_queries() {
        let entry = AppEntry {
            name: "Visual Studio Code".to_string(),
            path: String::new(),
            keywords: vec!["vs code".to_string(), "Editor".to_string()],
        };
        assert_eq!(keyword_score(&entry, "vs code"), 2.0);
        assert_eq!(keyword_score(&entry, "VS-Co"), 1.5);
        assert_eq!(keyword_score(&entry, "editor"), 2.0);
    }

    #[test]
    fn query_returns_matches_with_open_and_reveal_actions() {
        let provider = AppsSearch::new(catalog());
        let (sender, receiver) = result_channel();
        provider.query("code", ResultSink::new(sender, MODULE_NAME, 3));

        let batch = receiver.try_recv().unwrap();
        assert_eq!(batch.candidates.len(), 1);
        let code = &batch.candidates[0];
        assert_eq!(code.title, "Visual Studio Code");
        assert_eq!(code.history_key, "app_/opt/code/code");
        assert_eq!(code.actions.len(), 2);
        assert_eq!(code.find_shortcut(&KeyChord::ctrl(Key::Char('O'))), Some(1));
    }

    #[test]
    fn history_key_is_stable_per_path() {
        let entry = AppEntry::new("Calculator", "/usr/bin/calc");
        assert_eq!(history_key(&entry), "app_/usr/bin/calc");
    }

    #[test]
    fn discovery_walks_roots_and_skips_other_files() {
        let unique = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .expect("clock should be valid")
            .as_nanos();
        let root = std::env::temp_dir().join(format!("quickrun-apps-discovery-{unique}"));
        let nested = root.join("Accessories");
        std::fs::create_dir_all(&nested).unwrap();
        std::fs::write(nested.join("Notepad.lnk"), b"").unwrap();
        std::fs::write(root.join("Editor.desktop"), b"").unwrap();
        std::fs::write(root.join("readme.txt"), b"").unwrap();

        let catalog = discover_apps(&[root.clone(), root.clone(), root.join("missing")]);
        let names: Vec<&str> = catalog.apps.iter().map(|app| app.name.as_str()).collect();
        assert_eq!(names, vec!["Editor", "Notepad"]);
        assert_eq!(catalog.apps[1].keywords, vec!["notepad".to_string()]);

        std::fs::remove_dir_all(root).unwrap();
    }
}
