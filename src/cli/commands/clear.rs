//! Clear command - remove the cache directory

use crate::cli::args::ClearArgs;
use crate::cli::commands::build_loader;
use crate::config::Config;
use crate::error::{LoaderError, LoaderResult};
use crate::ui::{self, UiContext};

/// Execute the clear command
pub fn execute(args: ClearArgs, config: &Config) -> LoaderResult<()> {
    let ctx = UiContext::detect().with_auto_yes(args.yes);
    let cli = build_loader(config)?;
    let dir = cli
        .loader
        .cache_dir()
        .ok_or(LoaderError::CacheDirMissing)?
        .display()
        .to_string();

    if !ui::confirm(&ctx, &format!("Remove {}?", dir), false)? {
        ui::step_warn_hint(&ctx, "Cache left in place", "pass --yes to skip the prompt");
        return Ok(());
    }

    if cli.loader.clear_cache()? {
        ui::step_ok_detail(&ctx, "Cache cleared", &dir);
    } else {
        ui::step_warn(&ctx, &format!("Nothing to clear at {}", dir));
    }
    Ok(())
}
