//! Prime command - cache every listed identifier

use crate::cli::commands::build_loader;
use crate::config::Config;
use crate::error::LoaderResult;
use crate::ui::{self, PrimeProgress, UiContext};

/// Execute the prime command
pub fn execute(config: &Config) -> LoaderResult<()> {
    let ctx = UiContext::detect();
    let cli = build_loader(config)?;
    ui::intro(&ctx, "Priming compile cache");

    let total = cli.loader.scan_identifiers()?.len();
    if total == 0 {
        ui::outro_warn(&ctx, "No identifiers found, check resolver.roots");
        return Ok(());
    }

    let progress = PrimeProgress::new(&ctx, total as u64);
    let primed = cli.loader.prime_cache(|id| progress.advance(id));
    progress.finish();
    let primed = primed?;

    ui::outro_success(
        &ctx,
        &format!("Primed {} of {} identifier(s)", primed, total),
    );
    Ok(())
}
