//! Confirmation prompts

use super::context::UiContext;
use crate::error::{LoaderError, LoaderResult};

/// Ask for confirmation.
///
/// Auto-yes answers true; a non-interactive context answers `default`
/// without prompting.
pub fn confirm(ctx: &UiContext, message: &str, default: bool) -> LoaderResult<bool> {
    if ctx.auto_yes() {
        println!("  {} (auto-approved)", message);
        return Ok(true);
    }

    if !ctx.is_interactive() {
        return Ok(default);
    }

    cliclack::confirm(message)
        .initial_value(default)
        .interact()
        .map_err(|e| LoaderError::User(format!("Prompt failed: {}", e)))
}
