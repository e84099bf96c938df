use crate::session::Stage;
use crate::ui::output::format_duration;
use indicatif::{MultiProgress, ProgressBar, ProgressStyle};
use std::time::{Duration, Instant};

pub struct ProgressManager {
    multi_progress: MultiProgress,
    enabled: bool,
}

impl ProgressManager {
    pub fn new(enabled: bool) -> Self {
        Self {
            multi_progress: MultiProgress::new(),
            enabled,
        }
    }

    pub fn create_spinner(&self, message: &str) -> ProgressBar {
        if !self.enabled {
            return ProgressBar::hidden();
        }

        let pb = self.multi_progress.add(ProgressBar::new_spinner());
        pb.enable_steady_tick(Duration::from_millis(100));
        pb.set_style(
            ProgressStyle::with_template("{spinner:.green} {msg} ({elapsed})")
                .unwrap_or_else(|_| ProgressStyle::default_spinner())
                .tick_strings(&["⠋", "⠙", "⠹", "⠸", "⠼", "⠴", "⠦", "⠧", "⠇", "⠏"]),
        );
        pb.set_message(message.to_string());
        pb
    }

    pub fn suspend<F, R>(&self, f: F) -> R
    where
        F: FnOnce() -> R,
    {
        if self.enabled {
            self.multi_progress.suspend(f)
        } else {
            f()
        }
    }

    pub fn clear(&self) {
        if self.enabled {
            self.multi_progress.clear().ok();
        }
    }

    pub fn is_enabled(&self) -> bool {
        self.enabled
    }
}

impl Default for ProgressManager {
    fn default() -> Self {
        Self::new(true)
    }
}

/// Busy indicator for one run; the message follows the run's stage.
pub struct RunProgress {
    progress_bar: ProgressBar,
    start_time: Instant,
}

impl RunProgress {
    pub fn new(progress_manager: &ProgressManager, folder_name: &str) -> Self {
        let progress_bar =
            progress_manager.create_spinner(&format!("Processing {}", folder_name));
        Self {
            progress_bar,
            start_time: Instant::now(),
        }
    }

    pub fn set_stage(&self, stage: Stage) {
        self.progress_bar
            .set_message(format!("{}...", stage.description()));
    }

    pub fn finish_success(&self) {
        self.finish_with_message("done");
    }

    pub fn finish_error(&self) {
        self.progress_bar.abandon_with_message(format!(
            "failed ({})",
            format_duration(self.start_time.elapsed())
        ));
    }

    pub fn finish_with_message(&self, message: &str) {
        let final_message = format!(
            "{} ({})",
            message,
            format_duration(self.start_time.elapsed())
        );
        self.progress_bar.finish_and_clear();
        tracing::debug!("{}", final_message);
    }

    pub fn message(&self) -> String {
        self.progress_bar.message()
    }

    pub fn is_hidden(&self) -> bool {
        self.progress_bar.is_hidden()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_progress_manager_creation() {
        let manager = ProgressManager::new(true);
        assert!(manager.is_enabled());

        let disabled_manager = ProgressManager::new(false);
        assert!(!disabled_manager.is_enabled());
    }

    #[test]
    fn test_spinner_creation() {
        let manager = ProgressManager::new(true);
        let spinner = manager.create_spinner("test");
        assert_eq!(spinner.message(), "test");
    }

    #[test]
    fn test_disabled_spinner() {
        let manager = ProgressManager::new(false);
        let spinner = manager.create_spinner("test");
        assert!(spinner.is_hidden());
    }

    #[test]
    fn test_run_progress_follows_stage() {
        let manager = ProgressManager::new(true);
        let progress = RunProgress::new(&manager, "batch");
        assert_eq!(progress.message(), "Processing batch");

        progress.set_stage(Stage::Extracting);
        assert_eq!(progress.message(), "Running extractor...");

        progress.set_stage(Stage::Writing);
        assert_eq!(progress.message(), "Writing CSV...");
        progress.finish_success();
    }

    #[test]
    fn test_suspend_returns_value() {
        let manager = ProgressManager::new(false);
        assert_eq!(manager.suspend(|| 7), 7);
    }
}
