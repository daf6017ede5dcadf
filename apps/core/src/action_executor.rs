use std::fmt::{Display, Formatter};
use std::path::{Path, PathBuf};
use std::process::{Child, Command, Stdio};
use std::sync::{Mutex, OnceLock, PoisonError};

static REAPER: OnceLock<ChildReaper> = OnceLock::new();

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LaunchError {
    EmptyPath,
    MissingPath(PathBuf),
    LaunchFailed {
        message: String,
        code: Option<i32>,
    },
}

impl Display for LaunchError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::EmptyPath => write!(f, "empty path"),
            Self::MissingPath(path) => write!(f, "path does not exist: {}", path.display()),
            Self::LaunchFailed {
                message,
                code: Some(code),
            } => write!(f, "launch failed ({code}): {message}"),
            Self::LaunchFailed {
                message,
                code: None,
            } => write!(f, "launch failed: {message}"),
        }
    }
}

impl std::error::Error for LaunchError {}

impl From<std::io::Error> for LaunchError {
    fn from(value: std::io::Error) -> Self {
        Self::LaunchFailed {
            message: value.to_string(),
            code: value.raw_os_error(),
        }
    }
}

pub fn validate_launch_path(path: &str) -> Result<PathBuf, LaunchError> {
    let trimmed = path.trim();
    if trimmed.is_empty() {
        return Err(LaunchError::EmptyPath);
    }

    let candidate = Path::new(trimmed);
    if !candidate.exists() {
        return Err(LaunchError::MissingPath(candidate.to_path_buf()));
    }

    Ok(candidate.to_path_buf())
}

/// Opens an existing file, folder or executable with the desktop's default
/// handler.
pub fn launch_path(path: &str) -> Result<(), LaunchError> {
    let target = validate_launch_path(path)?;
    spawn_opener(target.as_os_str())
}

/// Like `launch_path` but also accepts URLs and other targets the shell
/// knows how to open, so nothing is checked on disk.
pub fn launch_open_target(target: &str) -> Result<(), LaunchError> {
    let trimmed = target.trim();
    if trimmed.is_empty() {
        return Err(LaunchError::EmptyPath);
    }
    spawn_opener(trimmed.as_ref())
}

/// Opens the folder containing `path`, or `path` itself when it is a folder.
pub fn reveal_in_folder(path: &str) -> Result<(), LaunchError> {
    let target = validate_launch_path(path)?;
    let folder = if target.is_dir() {
        target
    } else {
        target
            .parent()
            .filter(|parent| !parent.as_os_str().is_empty())
            .map(Path::to_path_buf)
            .unwrap_or_else(|| PathBuf::from("."))
    };
    spawn_opener(folder.as_os_str())
}

pub fn launch_command(program: &str, args: &[&str]) -> Result<(), LaunchError> {
    if program.trim().is_empty() {
        return Err(LaunchError::EmptyPath);
    }
    // stdout carries protocol responses; children must not write to it.
    let child = Command::new(program)
        .args(args)
        .stdout(Stdio::null())
        .spawn()?;
    reaper().track(program, child);
    Ok(())
}

fn spawn_opener(target: &std::ffi::OsStr) -> Result<(), LaunchError> {
    #[cfg(target_os = "windows")]
    let mut command = {
        let mut command = Command::new("cmd");
        command.args(["/C", "start", ""]).arg(target);
        command
    };
    #[cfg(target_os = "macos")]
    let mut command = {
        let mut command = Command::new("open");
        command.arg(target);
        command
    };
    #[cfg(not(any(target_os = "windows", target_os = "macos")))]
    let mut command = {
        let mut command = Command::new("xdg-open");
        command.arg(target);
        command
    };

    let child = command.stdout(Stdio::null()).spawn()?;
    reaper().track(&target.to_string_lossy(), child);
    Ok(())
}

/// Launched children waiting to be collected. Openers and `wt` hand off and
/// exit quickly; polling them keeps exited ones from lingering as zombies.
#[derive(Debug, Default)]
pub struct ChildReaper {
    children: Mutex<Vec<(String, Child)>>,
}

impl ChildReaper {
    pub fn track(&self, label: &str, child: Child) {
        self.children
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push((label.to_string(), child));
    }

    /// Collects every child that has exited. Returns how many were reaped.
    pub fn reap_finished(&self) -> usize {
        let mut children = self.children.lock().unwrap_or_else(PoisonError::into_inner);
        let before = children.len();
        children.retain_mut(|(label, child)| match child.try_wait() {
            Ok(Some(status)) => {
                if !status.success() {
                    crate::logging::warn(&format!(
                        "launch of '{label}' exited with code {:?}",
                        status.code()
                    ));
                }
                false
            }
            Ok(None) => true,
            Err(error) => {
                crate::logging::error(&format!("cannot poll launch of '{label}': {error}"));
                false
            }
        });
        before - children.len()
    }

    pub fn pending(&self) -> usize {
        self.children
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }
}

/// The reaper shared by every launch in this process.
pub fn reaper() -> &'static ChildReaper {
    REAPER.get_or_init(ChildReaper::default)
}

/// Handler-friendly wrapper: handlers cannot return errors, so failures are
/// logged instead.
pub fn log_failure(what: &str, result: Result<(), LaunchError>) {
    if let Err(error) = result {
        crate::logging::error(&format!("{what}: {error}"));
    }
}
