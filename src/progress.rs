//! Progress display for dependency checks
//!
//! Shows a spinner while namespaces are listed and a bar over the charts
//! being checked. Everything is drawn on stderr so reports on stdout stay
//! clean.

use indicatif::{ProgressBar, ProgressDrawTarget, ProgressStyle};
use std::time::Duration;

/// Progress reporter for a check run
pub struct CheckProgress {
    /// Disabled in quiet mode and for machine-readable output
    enabled: bool,
    bar: Option<ProgressBar>,
}

impl CheckProgress {
    pub fn new(enabled: bool) -> Self {
        Self { enabled, bar: None }
    }

    pub fn disabled() -> Self {
        Self::new(false)
    }

    pub fn is_enabled(&self) -> bool {
        self.enabled
    }

    /// Spinner shown while the release directory lists namespaces
    ///
    /// Reuses the chart bar when one is running.
    pub fn listing_namespaces(&mut self, directory: &str) {
        if !self.enabled {
            return;
        }
        if let Some(ref bar) = self.bar {
            bar.set_message(format!("namespaces ({directory})"));
            return;
        }

        let spinner = ProgressBar::with_draw_target(None, ProgressDrawTarget::stderr());
        spinner.set_style(
            ProgressStyle::default_spinner()
                .tick_chars("⠋⠙⠹⠸⠼⠴⠦⠧⠇⠏")
                .template("{spinner:.cyan} {msg}")
                .expect("Invalid template"),
        );
        spinner.set_message(format!("Listing namespaces ({directory})..."));
        spinner.enable_steady_tick(Duration::from_millis(80));
        self.bar = Some(spinner);
    }

    /// Bar over the charts of the run
    pub fn start_charts(&mut self, total: usize) {
        if !self.enabled {
            return;
        }
        self.finish();

        let bar = ProgressBar::with_draw_target(Some(total as u64), ProgressDrawTarget::stderr());
        bar.set_style(
            ProgressStyle::default_bar()
                .template("{spinner:.cyan} Checking {msg} [{bar:30.cyan/blue}] {pos}/{len}")
                .expect("Invalid template")
                .progress_chars("█▓▒░"),
        );
        bar.enable_steady_tick(Duration::from_millis(100));
        self.bar = Some(bar);
    }

    /// Name the chart or dependency currently being checked
    pub fn checking(&self, subject: &str) {
        if let Some(ref bar) = self.bar {
            bar.set_message(subject.to_string());
        }
    }

    /// Mark one chart as done
    pub fn chart_done(&self) {
        if let Some(ref bar) = self.bar {
            bar.inc(1);
        }
    }

    /// Remove whatever is on screen
    pub fn finish(&mut self) {
        if let Some(bar) = self.bar.take() {
            bar.finish_and_clear();
        }
    }
}

impl Default for CheckProgress {
    fn default() -> Self {
        Self::new(true)
    }
}
