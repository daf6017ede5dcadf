/// Non-blocking channel for errors the user should hear about, such as a
/// broken `Launcher.json`. Implementations must return promptly.
pub trait Notifier {
    fn notify_error(&self, message: &str);
}

/// Writes notifications to the log file and stderr.
#[derive(Debug, Default, Clone, Copy)]
pub struct LogNotifier;

impl Notifier for LogNotifier {
    fn notify_error(&self, message: &str) {
        crate::logging::error(message);
        eprintln!("[quickrun-core] {message}");
    }
}
