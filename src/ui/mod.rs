//! Terminal output for the modmap CLI
//!
//! Uses `cliclack` for styled output and prompts in interactive terminals
//! and falls back to plain, greppable lines in CI or when piped.

mod context;
mod output;
mod progress;
mod prompts;

pub use context::UiContext;
pub use output::{
    intro, key_value, key_value_status, outro_success, outro_warn, remark, step_ok,
    step_ok_detail, step_warn, step_warn_hint,
};
pub use progress::PrimeProgress;
pub use prompts::confirm;
