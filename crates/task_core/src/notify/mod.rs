use crate::config::NotificationMode;
use crate::error::AppError;
use parking_lot::Mutex;
use std::io::Write;

#[cfg(target_os = "linux")]
mod linux;
#[cfg(target_os = "linux")]
pub use linux::LinuxNotifier;

#[cfg(windows)]
mod windows;
#[cfg(windows)]
pub use windows::WindowsNotifier;

pub const APP_NAME: &str = "taskdeck";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NoticeLevel {
    Success,
    Failure,
}

/// Outcome of a settled mutation, shown transiently to the user.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notice {
    pub level: NoticeLevel,
    pub message: String,
}

impl Notice {
    pub fn success<M: Into<String>>(message: M) -> Self {
        Self {
            level: NoticeLevel::Success,
            message: message.into(),
        }
    }

    pub fn failure<M: Into<String>>(message: M) -> Self {
        Self {
            level: NoticeLevel::Failure,
            message: message.into(),
        }
    }

    pub fn is_success(&self) -> bool {
        self.level == NoticeLevel::Success
    }
}

pub trait Notifier: Send + Sync {
    fn notify(&self, notice: &Notice) -> Result<(), AppError>;
}

pub struct NoopNotifier;

impl Notifier for NoopNotifier {
    fn notify(&self, _notice: &Notice) -> Result<(), AppError> {
        Ok(())
    }
}

/// Writes notices to stderr so stdout stays reserved for command output.
pub struct ConsoleNotifier;

impl Notifier for ConsoleNotifier {
    fn notify(&self, notice: &Notice) -> Result<(), AppError> {
        let line = console_line(notice);
        let mut stderr = std::io::stderr().lock();
        writeln!(stderr, "{line}").map_err(|err| AppError::io(err.to_string()))
    }
}

pub fn console_line(notice: &Notice) -> String {
    match notice.level {
        NoticeLevel::Success => format!("OK: {}", notice.message),
        NoticeLevel::Failure => format!("FAILED: {}", notice.message),
    }
}

/// Keeps every notice in memory.
#[derive(Default)]
pub struct CollectingNotifier {
    notices: Mutex<Vec<Notice>>,
}

impl CollectingNotifier {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn notices(&self) -> Vec<Notice> {
        self.notices.lock().clone()
    }

    pub fn take(&self) -> Vec<Notice> {
        std::mem::take(&mut *self.notices.lock())
    }
}

impl Notifier for CollectingNotifier {
    fn notify(&self, notice: &Notice) -> Result<(), AppError> {
        self.notices.lock().push(notice.clone());
        Ok(())
    }
}

pub fn notifier_for_mode(mode: NotificationMode) -> Box<dyn Notifier> {
    match mode {
        NotificationMode::Off => Box::new(NoopNotifier),
        NotificationMode::Console => Box::new(ConsoleNotifier),
        NotificationMode::Desktop => match platform_notifier() {
            Ok(notifier) => notifier,
            Err(err) => {
                tracing::warn!(error = %err, "desktop notifications unavailable, using console");
                Box::new(ConsoleNotifier)
            }
        },
    }
}

#[cfg(target_os = "linux")]
pub fn platform_notifier() -> Result<Box<dyn Notifier>, AppError> {
    Ok(Box::new(LinuxNotifier))
}

#[cfg(windows)]
pub fn platform_notifier() -> Result<Box<dyn Notifier>, AppError> {
    Ok(Box::new(WindowsNotifier))
}

#[cfg(not(any(target_os = "linux", windows)))]
pub fn platform_notifier() -> Result<Box<dyn Notifier>, AppError> {
    Err(AppError::invalid_data(
        "notifications are not supported on this platform",
    ))
}
