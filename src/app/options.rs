use std::time::Duration;

use crate::upload::{LocalUploader, UploadPolicy};

pub(crate) const DEFAULT_HELP: &str = "Tab/↓ next • Shift+Tab/↑ prev • Ctrl+←/→ tabs • Space toggle • ←/→ choose • Ctrl+N add • Ctrl+D remove • Ctrl+U upload • Ctrl+S save • Esc cancel";

#[derive(Debug, Clone)]
pub struct UiOptions {
    pub tick_rate: Duration,
    pub confirm_exit: bool,
    pub show_help: bool,
    pub upload_policy: UploadPolicy,
    pub(crate) uploader: Option<LocalUploader>,
}

impl Default for UiOptions {
    fn default() -> Self {
        Self {
            tick_rate: Duration::from_millis(250),
            confirm_exit: true,
            show_help: true,
            upload_policy: UploadPolicy::default(),
            uploader: None,
        }
    }
}

impl UiOptions {
    pub fn with_help(mut self, show: bool) -> Self {
        self.show_help = show;
        self
    }

    pub fn with_confirm_exit(mut self, confirm: bool) -> Self {
        self.confirm_exit = confirm;
        self
    }

    pub fn with_tick_rate(mut self, tick_rate: Duration) -> Self {
        self.tick_rate = tick_rate;
        self
    }

    /// Enables Ctrl+U on upload fields.
    pub fn with_uploader(mut self, uploader: LocalUploader) -> Self {
        self.uploader = Some(uploader);
        self
    }

    pub fn with_upload_policy(mut self, policy: UploadPolicy) -> Self {
        self.upload_policy = policy;
        self
    }

    pub(crate) fn help_text(&self) -> Option<&'static str> {
        self.show_help.then_some(DEFAULT_HELP)
    }
}
