use std::io::{BufRead, Write};
use std::path::{Path, PathBuf};

use crate::config::{self, ConfigError};
use crate::history::HistoryStore;
use crate::launcher::Launcher;
use crate::logging;
use crate::notify::LogNotifier;
use crate::providers::default_providers;
use crate::transport::{handle_json, view_of};

pub const USAGE: &str = "usage: quickrun-core [--config <dir>] [--query <text>]";

#[derive(Debug)]
pub enum RuntimeError {
    Config(ConfigError),
    Io(std::io::Error),
    Encode(String),
}

impl std::fmt::Display for RuntimeError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Config(error) => write!(f, "config error: {error}"),
            Self::Io(error) => write!(f, "io error: {error}"),
            Self::Encode(error) => write!(f, "encode error: {error}"),
        }
    }
}

impl std::error::Error for RuntimeError {}

impl From<ConfigError> for RuntimeError {
    fn from(value: ConfigError) -> Self {
        Self::Config(value)
    }
}

impl From<std::io::Error> for RuntimeError {
    fn from(value: std::io::Error) -> Self {
        Self::Io(value)
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RuntimeOptions {
    pub config_dir: Option<PathBuf>,
    /// One-shot mode: route this text, print the ranked view and exit.
    pub query: Option<String>,
}

pub fn parse_cli_args(args: &[String]) -> Result<RuntimeOptions, String> {
    let mut options = RuntimeOptions::default();
    let mut iter = args.iter();
    while let Some(arg) = iter.next() {
        match arg.as_str() {
            "--config" => {
                let value = iter
                    .next()
                    .ok_or_else(|| format!("--config needs a directory\n{USAGE}"))?;
                options.config_dir = Some(PathBuf::from(value));
            }
            "--query" => {
                let value = iter
                    .next()
                    .ok_or_else(|| format!("--query needs text\n{USAGE}"))?;
                options.query = Some(value.clone());
            }
            other => {
                if let Some(value) = other.strip_prefix("--config=") {
                    options.config_dir = Some(PathBuf::from(value));
                } else if let Some(value) = other.strip_prefix("--query=") {
                    options.query = Some(value.to_string());
                } else {
                    return Err(format!("unknown argument '{other}'\n{USAGE}"));
                }
            }
        }
    }
    Ok(options)
}

/// Loads config and history from `config_dir` and registers the stock
/// providers. Writes `Launcher.json` with every module's defaults when the
/// file does not exist yet.
pub fn build_launcher(config_dir: &Path) -> Result<Launcher, RuntimeError> {
    let notifier = LogNotifier;
    let cfg = config::load_or_default(Some(config_dir), &notifier);
    let history = HistoryStore::initialize(&cfg.history_path(), cfg.history);
    eprintln!(
        "[quickrun-core] history state={:?} entries={}",
        history.state(),
        history.len()
    );

    let launcher = Launcher::new(cfg, history);
    let providers = default_providers(launcher.config(), launcher.command_sender(), &notifier);
    let launcher = launcher.with_providers(providers);

    let config_path = launcher.config().config_path();
    if !config_path.exists() {
        config::save(&launcher.resolved_config())?;
        eprintln!(
            "[quickrun-core] wrote default config to {}",
            config_path.display()
        );
    }
    Ok(launcher)
}

pub fn run_with_options(options: RuntimeOptions) -> Result<(), RuntimeError> {
    let config_dir = options
        .config_dir
        .unwrap_or_else(config::stable_app_data_dir);
    if let Err(error) = logging::init(&config_dir) {
        eprintln!("[quickrun-core] logging disabled: {error}");
    }
    logging::info(&format!("startup config_dir={}", config_dir.display()));

    // stdout carries protocol responses only.
    let mut launcher = build_launcher(&config_dir)?;
    eprintln!(
        "[quickrun-core] startup modules={} config_path={}",
        launcher.registry().len(),
        launcher.config().config_path().display(),
    );

    if let Some(query) = options.query {
        launcher.overlay_mut().set_visible(true);
        launcher.on_input_changed(&query);
        let encoded = serde_json::to_string_pretty(&view_of(&launcher))
            .map_err(|e| RuntimeError::Encode(e.to_string()))?;
        println!("{encoded}");
        return Ok(());
    }

    let stdin = std::io::stdin();
    let stdout = std::io::stdout();
    let handled = serve_lines(&mut launcher, stdin.lock(), stdout.lock(), &config_dir)?;
    logging::info(&format!("shutdown requests={handled}"));
    Ok(())
}

/// Answers one JSON request per input line until EOF. Returns the number of
/// requests handled.
pub fn serve_lines<R: BufRead, W: Write>(
    launcher: &mut Launcher,
    reader: R,
    mut writer: W,
    config_dir: &Path,
) -> Result<usize, RuntimeError> {
    let mut handled = 0;
    for line in reader.lines() {
        let line = line?;
        let payload = line.trim();
        if payload.is_empty() {
            continue;
        }

        let response = handle_json(launcher, payload);
        writeln!(writer, "{response}")?;
        writer.flush()?;
        handled += 1;

        if launcher.take_reload_request() {
            let cfg = config::load_or_default(Some(config_dir), &LogNotifier);
            launcher.reload_config(cfg);
        }
    }
    Ok(handled)
}
