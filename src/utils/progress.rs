//! Progress bar and spinner utilities

use indicatif::{ProgressBar, ProgressStyle};
use std::time::Duration;

/// Create a standard progress bar with consistent styling
pub fn create_progress_bar(total: u64, message: &str) -> ProgressBar {
    let pb = ProgressBar::new(total);
    let style = ProgressStyle::default_bar()
        .template("{msg} [{bar:40.cyan/blue}] {pos:>7}/{len:7} ({eta})")
        .unwrap_or_else(|_| ProgressStyle::default_bar())
        .progress_chars("━━─");
    pb.set_style(style);
    pb.set_message(message.to_string());
    pb.enable_steady_tick(Duration::from_millis(100));
    pb
}

/// Create a spinner with consistent styling
pub fn create_spinner(message: &str) -> ProgressBar {
    let pb = ProgressBar::new_spinner();
    let style = ProgressStyle::default_spinner()
        .template("{spinner:.cyan} {msg}")
        .unwrap_or_else(|_| ProgressStyle::default_spinner());
    pb.set_style(style);
    pb.set_message(message.to_string());
    pb.enable_steady_tick(Duration::from_millis(80));
    pb
}

/// Progress bar, or a hidden one when output is silenced
pub fn progress_bar_or_hidden(total: u64, message: &str, silent: bool) -> ProgressBar {
    if silent {
        ProgressBar::hidden()
    } else {
        create_progress_bar(total, message)
    }
}

/// Spinner, or a hidden bar when output is silenced
pub fn spinner_or_hidden(message: &str, silent: bool) -> ProgressBar {
    if silent {
        ProgressBar::hidden()
    } else {
        create_spinner(message)
    }
}
