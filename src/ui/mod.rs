//! UI module for consistent CLI output
//!
//! Uses `cliclack` for interactive prompts and spinners with automatic
//! fallback to plain output in CI/non-interactive environments, and
//! `indicatif` for file-count progress during manifest generation.

mod context;
mod output;
mod progress;
mod prompts;

pub use context::UiContext;
pub use output::{intro, key_value, note, outro_error, outro_success, step_ok, step_warn};
pub use progress::{FileProgress, TaskSpinner};
pub use prompts::confirm;
