//! Download progress bars

use indicatif::{ProgressBar, ProgressDrawTarget, ProgressStyle};
use repomirror_types::DownloadProgress;
use std::time::Duration;

const BAR_TEMPLATE: &str =
    "{spinner:.green} {msg:30} [{wide_bar:.cyan/blue}] {bytes}/{total_bytes} ({bytes_per_sec}, {eta})";
const SPINNER_TEMPLATE: &str = "{spinner:.green} {msg:30} {bytes} ({bytes_per_sec})";

/// One byte bar per downloaded file
pub struct BarProgress {
    bar: Option<ProgressBar>,
    quiet: bool,
}

impl BarProgress {
    /// Create the observer; a quiet observer draws nothing
    pub fn new(quiet: bool) -> Self {
        Self { bar: None, quiet }
    }

    fn make_bar(&self, total: Option<u64>) -> ProgressBar {
        let (bar, template) = match total {
            Some(total) => (ProgressBar::new(total), BAR_TEMPLATE),
            None => (ProgressBar::new_spinner(), SPINNER_TEMPLATE),
        };
        if self.quiet {
            bar.set_draw_target(ProgressDrawTarget::hidden());
        }
        let style = ProgressStyle::with_template(template)
            .unwrap_or_else(|_| ProgressStyle::default_bar())
            .progress_chars("█▉▊▋▌▍▎▏  ");
        bar.set_style(style);
        bar
    }
}

impl DownloadProgress for BarProgress {
    fn start(&mut self, name: &str, total: Option<u64>, offset: u64) {
        if let Some(previous) = self.bar.take() {
            previous.finish_and_clear();
        }
        let bar = self.make_bar(total);
        bar.set_message(name.to_string());
        bar.set_position(offset);
        if !self.quiet {
            bar.enable_steady_tick(Duration::from_millis(100));
        }
        self.bar = Some(bar);
    }

    fn advance(&mut self, bytes: u64) {
        if let Some(bar) = &self.bar {
            bar.inc(bytes);
        }
    }

    fn finish(&mut self) {
        if let Some(bar) = self.bar.take() {
            bar.finish_and_clear();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_bar_tracks_resumed_offset() {
        let mut progress = BarProgress::new(true);
        progress.start("a_1.zip", Some(100), 40);
        progress.advance(25);

        let bar = progress.bar.as_ref().unwrap();
        assert_eq!(bar.position(), 65);
        assert_eq!(bar.length(), Some(100));

        progress.finish();
        assert!(progress.bar.is_none());
    }

    #[test]
    fn test_unknown_total_uses_spinner() {
        let mut progress = BarProgress::new(true);
        progress.start("b_1.zip", None, 0);
        progress.advance(10);

        assert_eq!(progress.bar.as_ref().unwrap().position(), 10);
        assert_eq!(progress.bar.as_ref().unwrap().length(), None);
    }

    #[test]
    fn test_advance_without_start_is_ignored() {
        let mut progress = BarProgress::new(true);
        progress.advance(10);
        progress.finish();
        assert!(progress.bar.is_none());
    }
}
