//! Terminal output for the CLI
//!
//! Styled with `console` on a terminal, plain bracketed prefixes when piped
//! or running in CI. Backend commands are printed unstyled so they can be
//! copied or parsed.

mod context;
mod output;

pub use context::UiContext;
pub use output::{command, intro, key_value, step_info, step_ok, step_ok_detail, step_warn_hint};
