use crate::batch::{BatchEvent, BatchObserver, LogEntry, LogStatus};
use crate::constants::{ERROR_PREFIX, PROGRESS_BAR_TEMPLATE, SUCCESS_PREFIX};
use indicatif::{ProgressBar, ProgressStyle};

/// Drives an `indicatif` bar from batch events and prints one line per finished file.
pub struct ProgressBarObserver {
    bar: ProgressBar,
}

impl ProgressBarObserver {
    pub fn new(hidden: bool) -> Self {
        let bar = if hidden {
            ProgressBar::hidden()
        } else {
            ProgressBar::new(0)
        };
        bar.set_style(
            ProgressStyle::default_bar()
                .template(PROGRESS_BAR_TEMPLATE)
                .unwrap_or_else(|_| ProgressStyle::default_bar())
                .progress_chars("#>-"),
        );
        bar.set_prefix("0");
        Self { bar }
    }

    pub fn bar(&self) -> &ProgressBar {
        &self.bar
    }
}

pub fn log_line(entry: &LogEntry) -> String {
    let marker = match entry.status {
        LogStatus::Success => SUCCESS_PREFIX,
        LogStatus::Error => ERROR_PREFIX,
        LogStatus::Pending => "…",
    };
    format!("{} {} {}", marker, entry.id, entry.message)
}

impl BatchObserver for ProgressBarObserver {
    fn on_event(&self, event: &BatchEvent) {
        match event {
            BatchEvent::Started { total } => {
                self.bar.set_length(*total as u64);
                self.bar.set_position(0);
            }
            BatchEvent::FileStarted(entry) => self.bar.set_message(entry.file_name.clone()),
            BatchEvent::FileFinished(entry) => self.bar.println(log_line(entry)),
            BatchEvent::Progress {
                processed, percent, ..
            } => {
                self.bar.set_position(*processed as u64);
                self.bar.set_prefix(percent.to_string());
            }
            BatchEvent::Finished { succeeded, failed } => {
                self.bar
                    .finish_with_message(format!("{} converted, {} failed", succeeded, failed));
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::batch::LogId;

    fn entry(status: LogStatus, message: &str) -> LogEntry {
        LogEntry {
            id: LogId::new(3),
            file_name: "a.png".to_string(),
            message: message.to_string(),
            status,
            original_size: 10,
            compressed_size: None,
        }
    }

    #[test]
    fn test_log_line_markers() {
        assert_eq!(
            log_line(&entry(LogStatus::Success, "a.png -> a.webp")),
            "✅ #3 a.png -> a.webp"
        );
        assert_eq!(
            log_line(&entry(LogStatus::Error, "Failed to compress a.png")),
            "❌ #3 Failed to compress a.png"
        );
    }

    #[test]
    fn test_observer_tracks_progress() {
        let observer = ProgressBarObserver::new(true);
        observer.on_event(&BatchEvent::Started { total: 3 });
        assert_eq!(observer.bar().length(), Some(3));

        observer.on_event(&BatchEvent::FileStarted(entry(LogStatus::Pending, "")));
        assert_eq!(observer.bar().message(), "a.png");

        observer.on_event(&BatchEvent::Progress {
            processed: 2,
            total: 3,
            percent: 67,
        });
        assert_eq!(observer.bar().position(), 2);
        assert_eq!(observer.bar().prefix(), "67");

        observer.on_event(&BatchEvent::Finished {
            succeeded: 2,
            failed: 1,
        });
        assert!(observer.bar().is_finished());
        assert_eq!(observer.bar().message(), "2 converted, 1 failed");
    }
}
