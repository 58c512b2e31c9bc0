//! Message formatting subsystem.
//!
//! # Data Flow
//! ```text
//! template + arguments
//!     → argument.rs (coerce each argument once)
//!     → template.rs (copy text, substitute `{...}` placeholders)
//!     → printf.rs   (first `%` hands the remainder to native formatting)
//!     → resolved line, or the untouched template on any error
//!
//! failures
//!     → cause.rs (bounded cause-chain summary)
//! ```
//!
//! # Design Decisions
//! - Formatting never fails: errors are logged at trace level and the template is returned
//! - One linear scan with two modes, no second pass over the output
//! - Truncation is separate so callers decide the length budget

pub mod argument;
pub mod cause;
mod printf;
mod template;

use std::borrow::Cow;

pub use argument::Argument;
pub use cause::{summarize, Failure, MAX_CAUSE_DEPTH};

/// Marker appended to shortened text.
pub const ELLIPSIS: &str = "...";

/// Reasons native formatting can reject a template.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum FormatError {
    #[error("unknown format conversion '{0}'")]
    UnknownConversion(char),
    #[error("incomplete format specifier '{0}'")]
    Incomplete(String),
    #[error("no argument for format specifier '{0}'")]
    MissingArgument(String),
    #[error("conversion '{conversion}' cannot format a {kind} argument")]
    IllegalConversion { conversion: char, kind: &'static str },
    #[error("flags in '{spec}' do not apply to conversion '{conversion}'")]
    FlagsMismatch { spec: String, conversion: char },
    #[error("format specifier '{0}' requires a width")]
    MissingWidth(String),
    #[error("format specifier '{0}' does not accept a precision")]
    IllegalPrecision(String),
    #[error("illegal flag combination in '{0}'")]
    IllegalFlags(String),
    #[error("width or precision in '{0}' is out of range")]
    OutOfRange(String),
}

/// Resolve a template against its arguments.
///
/// Returns the template unchanged when there are no arguments or when native
/// formatting rejects it.
pub fn format(template: &str, args: &[Argument]) -> String {
    if args.is_empty() {
        return template.to_string();
    }
    let values: Vec<_> = args.iter().map(Argument::coerce).collect();
    match template::expand(template, &values) {
        Ok(line) => line,
        Err(e) => {
            tracing::trace!(error = %e, template, "Message template rejected, using it verbatim");
            template.to_string()
        }
    }
}

/// [`format`] for templates that may be absent. `None` means no output.
pub fn format_opt(template: Option<&str>, args: &[Argument]) -> Option<String> {
    template.map(|t| format(t, args))
}

/// Bound a message to `max_length` characters, marking cuts with [`ELLIPSIS`].
///
/// Messages shorter than `max_length` are returned as is. Longer ones keep their
/// first `max_length - 3` characters followed by the marker, so the result never
/// exceeds `max_length`. An absent message renders as `"null"`.
pub fn ellipsis(message: Option<&str>, max_length: usize) -> Cow<'_, str> {
    let Some(message) = message else {
        return Cow::Borrowed("null");
    };
    if message.chars().count() < max_length {
        return Cow::Borrowed(message);
    }
    if max_length < ELLIPSIS.len() {
        return Cow::Borrowed(&ELLIPSIS[..max_length]);
    }
    let keep = max_length - ELLIPSIS.len();
    let mut shortened: String = message.chars().take(keep).collect();
    shortened.push_str(ELLIPSIS);
    Cow::Owned(shortened)
}
