//! Show command - inspect a cache entry

use crate::cache::EntryStatus;
use crate::cli::args::{OutputFormat, ShowArgs};
use crate::cli::commands::build_loader;
use crate::config::Config;
use crate::error::{LoaderError, LoaderResult};
use crate::ui::{self, UiContext};

/// Execute the show command
pub fn execute(args: ShowArgs, config: &Config) -> LoaderResult<()> {
    let cli = build_loader(config)?;
    let cache = cli.loader.cache().ok_or(LoaderError::CacheDirMissing)?;
    let status = cache.entry(args.identifier.as_str()).status()?;

    match args.format {
        OutputFormat::Table => print_table(&UiContext::detect(), &status),
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&status)?),
    }
    Ok(())
}

fn print_table(ctx: &UiContext, status: &EntryStatus) {
    let display = |path: Option<&std::path::Path>| {
        path.map(|p| p.display().to_string())
            .unwrap_or_else(|| "none".to_string())
    };

    ui::key_value(ctx, "identifier", &status.identifier);
    ui::key_value_status(ctx, "cached", &status.is_cached().to_string(), status.is_cached());
    ui::key_value(ctx, "artifact", &display(status.artifact.as_deref()));
    ui::key_value(ctx, "origin", &display(status.origin.as_deref()));

    match &status.meta {
        Some(meta) => {
            ui::key_value(ctx, "include", &display(meta.include.as_deref()));
            let chain = if meta.dependency_chain.is_empty() {
                "none".to_string()
            } else {
                meta.dependency_chain.join(", ")
            };
            ui::key_value(ctx, "dependencies", &chain);
        }
        None => ui::key_value_status(ctx, "meta", "missing", false),
    }
}
