use crate::error::AppError;
use crate::notify::{APP_NAME, Notice, NoticeLevel, Notifier};
use notify_rust::Notification;

pub struct LinuxNotifier;

impl Notifier for LinuxNotifier {
    fn notify(&self, notice: &Notice) -> Result<(), AppError> {
        let icon = match notice.level {
            NoticeLevel::Success => "dialog-information",
            NoticeLevel::Failure => "dialog-error",
        };

        Notification::new()
            .appname(APP_NAME)
            .summary(APP_NAME)
            .body(&notice.message)
            .icon(icon)
            .show()
            .map_err(|err| AppError::io(err.to_string()))?;

        Ok(())
    }
}
