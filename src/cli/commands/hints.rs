//! Hints command - dump hint files

use crate::cli::args::HintsArgs;
use crate::cli::commands::build_loader;
use crate::config::Config;
use crate::error::LoaderResult;
use crate::ui::{self, UiContext};

/// Execute the hints command
pub fn execute(args: HintsArgs, config: &Config) -> LoaderResult<()> {
    let ctx = UiContext::detect();
    let cli = build_loader(config)?;

    let written = cli.loader.dump_hints(&args.target)?;
    if written.is_empty() {
        ui::step_warn(&ctx, "No resolver produced hints");
    } else {
        ui::step_ok_detail(
            &ctx,
            &format!("Wrote {} hint file(s)", written.len()),
            &args.target.display().to_string(),
        );
    }
    Ok(())
}
