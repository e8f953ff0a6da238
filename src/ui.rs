use indicatif::{ProgressBar, ProgressDrawTarget, ProgressStyle};
use std::time::{Duration, Instant};

pub const STATUS_IDLE: &str = "Point the camera at waste...";
pub const STATUS_ANALYZING: &str = "Analyzing...";
pub const STATUS_RETRYING: &str = "An error occurred, retrying...";

#[derive(Clone, Copy, Debug)]
pub enum UiMode {
    Auto,
    Plain,
    Pretty,
}

/// Terminal stand-in for the preview screen: status line, progress
/// indicator and result text.
#[derive(Clone, Debug)]
pub struct Ui {
    mode: UiMode,
    is_tty: bool,
}

impl Ui {
    pub fn new(mode: UiMode, is_tty: bool) -> Self {
        Self { mode, is_tty }
    }

    pub fn from_args(ui_flag: Option<&str>, is_tty: bool) -> Self {
        let mode = match ui_flag {
            Some("plain") => UiMode::Plain,
            Some("pretty") => UiMode::Pretty,
            _ => UiMode::Auto,
        };
        Self::new(mode, is_tty)
    }

    fn use_pretty(&self) -> bool {
        self.is_tty && matches!(self.mode, UiMode::Pretty | UiMode::Auto)
    }

    pub fn status(&self, text: &str) {
        eprintln!("[status] {}", text);
    }

    pub fn result(&self, summary: &str) {
        println!("{}", summary);
    }

    /// Show a progress indicator until the returned guard is dropped.
    pub fn progress(&self, message: &str) -> ProgressGuard {
        if self.use_pretty() {
            let spinner = ProgressBar::new_spinner();
            spinner.set_draw_target(ProgressDrawTarget::stderr());
            spinner.enable_steady_tick(Duration::from_millis(120));
            let style = ProgressStyle::with_template("{spinner} {msg}")
                .unwrap_or_else(|_| ProgressStyle::default_spinner());
            spinner.set_style(style);
            spinner.set_message(message.to_string());
            ProgressGuard::new(message.to_string(), Some(spinner))
        } else {
            eprintln!("==> {}", message);
            ProgressGuard::new(message.to_string(), None)
        }
    }
}

pub struct ProgressGuard {
    message: String,
    start: Instant,
    spinner: Option<ProgressBar>,
}

impl ProgressGuard {
    fn new(message: String, spinner: Option<ProgressBar>) -> Self {
        Self {
            message,
            start: Instant::now(),
            spinner,
        }
    }
}

impl Drop for ProgressGuard {
    fn drop(&mut self) {
        let elapsed = self.start.elapsed();
        let message = format!("{} done ({})", self.message, format_duration(elapsed));
        if let Some(spinner) = &self.spinner {
            spinner.finish_and_clear();
        }
        eprintln!("{message}");
    }
}

fn format_duration(duration: Duration) -> String {
    if duration.as_secs() >= 1 {
        format!("{:.2}s", duration.as_secs_f64())
    } else {
        format!("{}ms", duration.as_millis())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn durations_switch_units_at_one_second() {
        assert_eq!(format_duration(Duration::from_millis(250)), "250ms");
        assert_eq!(format_duration(Duration::from_millis(1500)), "1.50s");
    }

    #[test]
    fn plain_mode_never_uses_spinner() {
        let ui = Ui::from_args(Some("plain"), true);
        assert!(!ui.use_pretty());
        let ui = Ui::from_args(None, false);
        assert!(!ui.use_pretty());
        let ui = Ui::from_args(Some("pretty"), true);
        assert!(ui.use_pretty());
    }
}
