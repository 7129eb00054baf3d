//! TTY-aware color helpers for report and error output.
//!
//! Built on the [`console`] crate, which detects whether the stream is a
//! terminal and respects `NO_COLOR`.

use console::Style;

/// A `Style` targeting **stderr** (auto-detects TTY + NO_COLOR).
fn err() -> Style {
    Style::new().for_stderr()
}

/// Green on stderr – passing steps.
pub fn err_green(text: &str) -> String {
    err().green().apply_to(text).to_string()
}

/// Red on stderr – failing steps.
pub fn err_red(text: &str) -> String {
    err().red().apply_to(text).to_string()
}

/// Bold red on stderr – the `error` prefix.
pub fn err_red_bold(text: &str) -> String {
    err().red().bold().apply_to(text).to_string()
}

/// Bold cyan on stderr – the `hint` prefix.
pub fn err_cyan_bold(text: &str) -> String {
    err().cyan().bold().apply_to(text).to_string()
}

/// Dim on stderr – secondary detail.
pub fn err_dim(text: &str) -> String {
    err().dim().apply_to(text).to_string()
}
