//! Load command - resolve, cache and load identifiers

use crate::cli::args::LoadArgs;
use crate::cli::commands::build_loader;
use crate::config::Config;
use crate::error::{LoaderError, LoaderResult};
use crate::loader::LoadOutcome;
use crate::ui::{self, UiContext};

/// Execute the load command
pub fn execute(args: LoadArgs, config: &Config) -> LoaderResult<()> {
    let ctx = UiContext::detect();
    let mut config = config.clone();
    if args.no_cache {
        config.cache.enabled = false;
    }

    let cli = build_loader(&config)?;
    let mut unresolved = Vec::new();

    for identifier in &args.identifiers {
        let outcome = cli.loader.load(identifier)?;
        let reports = cli.files.host().take_reports();

        if outcome == LoadOutcome::Unresolved {
            ui::step_warn_hint(
                &ctx,
                &format!("{} is unresolved", identifier),
                "no resolver knows it, check resolver.roots",
            );
            unresolved.push(identifier.as_str());
            continue;
        }

        ui::step_ok_detail(&ctx, &format!("Loaded {}", identifier), &outcome.to_string());
        for report in reports {
            let origin = report
                .origin
                .map(|p| p.display().to_string())
                .unwrap_or_else(|| "-".to_string());
            ui::remark(
                &ctx,
                &format!("{} as {} ({} bytes)", report.reference, origin, report.size),
            );
        }
    }

    if !unresolved.is_empty() {
        return Err(LoaderError::User(format!(
            "Could not resolve: {}",
            unresolved.join(", ")
        )));
    }
    Ok(())
}
