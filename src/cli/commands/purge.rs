//! Purge command - remove identifiers and their dependencies from the cache

use crate::cli::args::PurgeArgs;
use crate::cli::commands::build_loader;
use crate::config::Config;
use crate::error::LoaderResult;
use crate::ui::{self, UiContext};

/// Execute the purge command
pub fn execute(args: PurgeArgs, config: &Config) -> LoaderResult<()> {
    let ctx = UiContext::detect();
    let cli = build_loader(config)?;

    for identifier in &args.identifiers {
        cli.loader.clear_specific(&[identifier])?;
        ui::step_ok(&ctx, &format!("Purged {}", identifier));
    }
    Ok(())
}
