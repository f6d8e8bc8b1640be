//! Progress reporting for cache priming

use super::context::UiContext;
use indicatif::{ProgressBar, ProgressStyle};

/// Bar over the scanned identifiers in interactive mode; silent otherwise
pub struct PrimeProgress {
    bar: Option<ProgressBar>,
}

impl PrimeProgress {
    /// Start a bar over `total` identifiers
    pub fn new(ctx: &UiContext, total: u64) -> Self {
        let bar = ctx.use_fancy_output().then(|| {
            let bar = ProgressBar::new(total);
            if let Ok(bar_style) = ProgressStyle::default_bar()
                .template("  {spinner:.cyan} Priming  {bar:20.cyan/dim} {pos}/{len} {msg:.dim}")
            {
                bar.set_style(bar_style.progress_chars("━╸─"));
            }
            bar
        });
        Self { bar }
    }

    /// Mark `identifier` as processed
    pub fn advance(&self, identifier: &str) {
        if let Some(ref bar) = self.bar {
            bar.set_message(identifier.to_string());
            bar.inc(1);
        }
    }

    /// Clear the bar
    pub fn finish(&self) {
        if let Some(ref bar) = self.bar {
            bar.finish_and_clear();
        }
    }
}
