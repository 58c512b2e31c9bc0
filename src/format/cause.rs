//! Failure snapshots and cause-chain summaries.
//!
//! # Responsibilities
//! - Capture a failure (type name, message, cause) independently of the original error value
//! - Render a cause chain to a single bounded line
//!
//! # Design Decisions
//! - Summaries stop after `MAX_CAUSE_DEPTH` levels so long or looping chains stay bounded
//! - A missing message falls back to the failure's type name; an empty one is kept

use std::borrow::Cow;
use std::error::Error;
use std::fmt;

use super::ELLIPSIS;

/// Number of chain levels rendered before the summary is cut with an ellipsis.
pub const MAX_CAUSE_DEPTH: usize = 8;

/// Levels captured when snapshotting an error's `source()` chain.
const MAX_CAPTURE_DEPTH: usize = 64;

/// Owned snapshot of a failure and the failures that caused it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Failure {
    type_name: Cow<'static, str>,
    message: Option<String>,
    cause: Option<Box<Failure>>,
}

impl Failure {
    /// Create a failure with no cause.
    pub fn new(type_name: impl Into<Cow<'static, str>>, message: Option<String>) -> Self {
        Self {
            type_name: type_name.into(),
            message,
            cause: None,
        }
    }

    /// Attach the failure that caused this one.
    pub fn caused_by(mut self, cause: Failure) -> Self {
        self.cause = Some(Box::new(cause));
        self
    }

    /// Snapshot an error whose concrete type is known, including its `source()` chain.
    pub fn from_error<E: Error + 'static>(err: &E) -> Self {
        let mut failure = Self::new(std::any::type_name::<E>(), Some(err.to_string()));
        failure.cause = err.source().map(|source| Box::new(Self::capture(source, 1)));
        failure
    }

    /// Snapshot an error known only as a trait object.
    ///
    /// The type name is recovered from the error's `Debug` output, which names the
    /// struct or variant for derived implementations.
    pub fn from_dyn(err: &(dyn Error + 'static)) -> Self {
        Self::capture(err, 0)
    }

    fn capture(err: &(dyn Error + 'static), depth: usize) -> Self {
        let mut failure = Self::new(debug_type_name(err), Some(err.to_string()));
        if depth < MAX_CAPTURE_DEPTH {
            failure.cause = err
                .source()
                .map(|source| Box::new(Self::capture(source, depth + 1)));
        }
        failure
    }

    pub fn type_name(&self) -> &str {
        &self.type_name
    }

    pub fn message(&self) -> Option<&str> {
        self.message.as_deref()
    }

    pub fn cause_failure(&self) -> Option<&Failure> {
        self.cause.as_deref()
    }

    /// Iterate this failure followed by every nested cause.
    pub fn chain(&self) -> impl Iterator<Item = &Failure> {
        std::iter::successors(Some(self), |&f| f.cause_failure())
    }

    /// The failure's message, or its type name when it has none.
    pub fn short_message(&self) -> &str {
        self.message.as_deref().unwrap_or(self.type_name.as_ref())
    }
}

impl fmt::Display for Failure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.message {
            Some(message) => write!(f, "{}: {}", self.type_name, message),
            None => f.write_str(&self.type_name),
        }
    }
}

impl Error for Failure {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        self.cause.as_deref().map(|c| c as &(dyn Error + 'static))
    }
}

fn debug_type_name(err: &dyn Error) -> String {
    let debug = format!("{err:?}");
    let name: String = debug
        .chars()
        .take_while(|c| c.is_alphanumeric() || *c == '_' || *c == ':')
        .collect();
    if name.is_empty() {
        "Error".to_string()
    } else {
        name
    }
}

/// Render a failure and its causes as one line.
///
/// A failure without a cause renders as its short message. Otherwise every level
/// contributes `"<TypeName>: "` and the innermost level adds its short message,
/// unless the chain is cut at `MAX_CAUSE_DEPTH` levels with `"..."`.
pub fn summarize(failure: &Failure) -> String {
    if failure.cause_failure().is_none() {
        return failure.short_message().to_string();
    }

    let mut summary = String::new();
    let mut depth = 0;
    let mut current = failure;
    loop {
        summary.push_str(current.type_name());
        summary.push_str(": ");
        depth += 1;
        if depth == MAX_CAUSE_DEPTH {
            summary.push_str(ELLIPSIS);
            break;
        }
        match current.cause_failure() {
            Some(next) => current = next,
            None => {
                summary.push_str(current.short_message());
                break;
            }
        }
    }
    summary
}
