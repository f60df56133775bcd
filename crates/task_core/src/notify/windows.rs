use crate::error::AppError;
use crate::notify::{APP_NAME, Notice, NoticeLevel, Notifier};
use tauri_winrt_notification::Toast;

pub struct WindowsNotifier;

impl Notifier for WindowsNotifier {
    fn notify(&self, notice: &Notice) -> Result<(), AppError> {
        let headline = match notice.level {
            NoticeLevel::Success => "Done",
            NoticeLevel::Failure => "Failed",
        };

        Toast::new(Toast::POWERSHELL_APP_ID)
            .title(APP_NAME)
            .text1(headline)
            .text2(&notice.message)
            .show()
            .map_err(|err| AppError::io(err.to_string()))?;
        Ok(())
    }
}
