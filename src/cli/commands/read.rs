//! Read command - print what a source reference serves

use crate::cli::args::{OutputFormat, ReadArgs};
use crate::error::LoaderResult;
use crate::ui::{self, UiContext};
use crate::vfs::{SourceRef, SourceStat, VirtualSourceRegistry};
use serde::Serialize;

#[derive(Serialize)]
struct ReadReport {
    reference: String,
    #[serde(flatten)]
    stat: SourceStat,
    content: String,
}

/// Execute the read command
pub fn execute(args: ReadArgs) -> LoaderResult<()> {
    let reference = SourceRef::parse(&args.reference)?;

    // Fragments live only as long as the process that set them
    let registry = VirtualSourceRegistry::new();
    let mut stream = registry.open(&reference)?;
    let content = stream.read_to_text()?;
    let stat = stream.stat()?.clone();
    stream.close();

    match args.format {
        OutputFormat::Table => {
            let ctx = UiContext::detect();
            let origin = stat
                .origin
                .as_ref()
                .map(|p| p.display().to_string())
                .unwrap_or_else(|| "anonymous".to_string());
            ui::key_value(&ctx, "reference", &reference.to_string());
            ui::key_value(&ctx, "origin", &origin);
            ui::key_value(&ctx, "size", &stat.size.to_string());
            if let Some(modified) = stat.modified {
                ui::key_value(&ctx, "modified", &modified.to_rfc3339());
            }
            println!();
            print!("{}", content);
        }
        OutputFormat::Json => {
            let report = ReadReport {
                reference: reference.to_string(),
                stat,
                content,
            };
            println!("{}", serde_json::to_string_pretty(&report)?);
        }
    }
    Ok(())
}
