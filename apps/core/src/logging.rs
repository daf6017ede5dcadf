//! File log for the launcher core, kept under `<config dir>/logs`.
//!
//! The file is rotated whenever it outgrows `MAX_LOG_BYTES`, checked on
//! every write.

use std::fs::{self, File, OpenOptions};
use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::{Mutex, OnceLock};

const LOG_FILE_NAME: &str = "quickrun.log";
const ARCHIVE_PREFIX: &str = "quickrun-";
const MAX_LOG_BYTES: u64 = 1_000_000;
const MAX_ARCHIVES: usize = 5;

static SINK: OnceLock<Mutex<LogSink>> = OnceLock::new();
static PANIC_HOOK_INSTALLED: OnceLock<()> = OnceLock::new();

struct LogSink {
    dir: PathBuf,
    file: File,
    written: u64,
}

impl LogSink {
    fn open(dir: &Path) -> Result<Self, std::io::Error> {
        let path = dir.join(LOG_FILE_NAME);
        let file = OpenOptions::new().create(true).append(true).open(&path)?;
        let written = file.metadata().map(|meta| meta.len()).unwrap_or(0);
        Ok(Self {
            dir: dir.to_path_buf(),
            file,
            written,
        })
    }

    fn append(&mut self, line: &str) {
        if self.written + line.len() as u64 > MAX_LOG_BYTES {
            if let Ok(reopened) = archive_current(&self.dir).and_then(|_| Self::open(&self.dir)) {
                *self = reopened;
            }
        }
        if self.file.write_all(line.as_bytes()).is_ok() {
            self.written += line.len() as u64;
        }
        let _ = self.file.flush();
    }
}

pub fn logs_dir(config_dir: &Path) -> PathBuf {
    config_dir.join("logs")
}

/// Opens the log under `config_dir/logs`. Calls made before `init`, or
/// after it failed, are dropped. Only the first successful call takes
/// effect.
pub fn init(config_dir: &Path) -> Result<(), std::io::Error> {
    let dir = logs_dir(config_dir);
    fs::create_dir_all(&dir)?;
    let sink = LogSink::open(&dir)?;
    let _ = SINK.set(Mutex::new(sink));
    install_panic_hook();
    Ok(())
}

pub fn info(message: &str) {
    write_line("INFO", message);
}

pub fn warn(message: &str) {
    write_line("WARN", message);
}

pub fn error(message: &str) {
    write_line("ERROR", message);
}

fn write_line(level: &str, message: &str) {
    let Some(sink) = SINK.get() else {
        return;
    };
    let Ok(mut sink) = sink.lock() else {
        return;
    };
    let ts = chrono::Local::now().format("%Y-%m-%d %H:%M:%S");
    sink.append(&format!("[{ts}] [{level}] {message}\n"));
}

/// Moves the live log aside as `quickrun-<yyyyMMdd-HHmmss>.log` and prunes
/// old archives.
fn archive_current(dir: &Path) -> Result<(), std::io::Error> {
    let stamp = chrono::Local::now().format("%Y%m%d-%H%M%S");
    let mut archived = dir.join(format!("{ARCHIVE_PREFIX}{stamp}.log"));
    let mut suffix = 1;
    while archived.exists() {
        archived = dir.join(format!("{ARCHIVE_PREFIX}{stamp}-{suffix}.log"));
        suffix += 1;
    }
    fs::rename(dir.join(LOG_FILE_NAME), archived)?;
    prune_old_archives(dir)
}

fn prune_old_archives(dir: &Path) -> Result<(), std::io::Error> {
    let mut archives: Vec<PathBuf> = fs::read_dir(dir)?
        .filter_map(|entry| entry.ok())
        .map(|entry| entry.path())
        .filter(|path| {
            path.file_name()
                .and_then(|name| name.to_str())
                .is_some_and(|name| name.starts_with(ARCHIVE_PREFIX) && name.ends_with(".log"))
        })
        .collect();

    // Timestamped names sort oldest first.
    archives.sort();
    let excess = archives.len().saturating_sub(MAX_ARCHIVES);
    for oldest in &archives[..excess] {
        let _ = fs::remove_file(oldest);
    }
    Ok(())
}

fn install_panic_hook() {
    PANIC_HOOK_INSTALLED.get_or_init(|| {
        let prior = std::panic::take_hook();
        std::panic::set_hook(Box::new(move |panic_info| {
            let location = panic_info
                .location()
                .map(|l| format!("{}:{}", l.file(), l.line()))
                .unwrap_or_else(|| "unknown".to_string());
            let payload = panic_info
                .payload()
                .downcast_ref::<&str>()
                .map(|s| (*s).to_string())
                .or_else(|| panic_info.payload().downcast_ref::<String>().cloned())
                .unwrap_or_else(|| "no message".to_string());
            let thread = std::thread::current();
            error(&format!(
                "launcher core panicked on thread '{}' at {location}: {payload}",
                thread.name().unwrap_or("unnamed")
            ));
            prior(panic_info);
        }));
    });
}
