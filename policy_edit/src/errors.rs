//! User-facing error display.
//!
//! Formats anyhow errors with causal chains, colored output, and actionable
//! help hints extracted from the editor's error types.

use std::io::Write;

use abe_policy::{LocateError, SessionError};

use crate::style;

/// Display a user-facing error to stderr.
///
/// Format:
///   error: top-level message
///     caused by: chain item
///
///   hint: actionable suggestion (if available)
///
/// When verbose is true, appends the full Debug representation.
pub fn display_error(err: &anyhow::Error, verbose: bool) {
    let mut stderr = std::io::stderr().lock();

    let _ = writeln!(stderr, "{}: {}", style::err_red_bold("error"), err);

    // Causal chain (skip the root error itself).
    let chain: Vec<_> = err.chain().skip(1).collect();
    if chain.len() == 1 {
        let _ = writeln!(
            stderr,
            "  {}",
            style::err_dim(&format!("caused by: {}", chain[0]))
        );
    } else {
        for (i, cause) in chain.iter().enumerate() {
            let _ = writeln!(
                stderr,
                "  {}",
                style::err_dim(&format!("{}: {}", i + 1, cause))
            );
        }
    }

    if let Some(hint) = hint(err) {
        let _ = writeln!(stderr, "\n  {}: {}", style::err_cyan_bold("hint"), hint);
    }

    if verbose {
        let _ = writeln!(stderr, "\nFull error chain:\n{:?}", err);
    }
}

/// Help text from the first editor error in the chain.
pub fn hint(err: &anyhow::Error) -> Option<String> {
    err.chain().find_map(|cause| {
        if let Some(e) = cause.downcast_ref::<SessionError>() {
            return e.help();
        }
        if let Some(e) = cause.downcast_ref::<LocateError>() {
            return e.help();
        }
        None
    })
}
