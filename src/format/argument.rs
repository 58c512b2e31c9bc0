//! Message arguments and their coercion to printable values.
//!
//! Every argument is coerced exactly once, before placeholder or native
//! substitution, into a [`Value`]. Rich arguments (types, failures, threads,
//! paths, collections) always coerce to strings.

use std::fmt;
use std::path::{Path, PathBuf};
use std::thread::Thread;

use super::cause::Failure;
use super::ELLIPSIS;

/// Elements shown in a collection preview before it is cut.
pub const PREVIEW_ITEMS: usize = 3;

/// A single message argument.
#[derive(Debug, Clone, PartialEq)]
pub enum Argument {
    Null,
    Str(String),
    Int(i64),
    UInt(u64),
    Float(f64),
    Bool(bool),
    Char(char),
    /// Type descriptor, rendered as its fully-qualified name.
    Type(&'static str),
    /// Failure, rendered as its message or type name.
    Failure(Failure),
    /// Thread handle, rendered as `name:id`.
    Thread { name: Option<String>, id: u64 },
    /// Filesystem path, rendered absolute.
    Path(PathBuf),
    /// Ordered collection, rendered as a short preview.
    List(Vec<Argument>),
}

impl Argument {
    /// Descriptor of type `T`.
    pub fn type_of<T: ?Sized>() -> Self {
        Argument::Type(std::any::type_name::<T>())
    }

    /// Snapshot of an error and its sources.
    pub fn failure<E: std::error::Error + 'static>(err: &E) -> Self {
        Argument::Failure(Failure::from_error(err))
    }

    /// Handle of the calling thread.
    pub fn current_thread() -> Self {
        Argument::from(&std::thread::current())
    }

    /// Coerce into the value used for substitution.
    pub(crate) fn coerce(&self) -> Value {
        match self {
            Argument::Null => Value::Null,
            Argument::Str(s) => Value::Str(s.clone()),
            Argument::Int(v) => Value::Int(*v),
            Argument::UInt(v) => Value::UInt(*v),
            Argument::Float(v) => Value::Float(*v),
            Argument::Bool(v) => Value::Bool(*v),
            Argument::Char(v) => Value::Char(*v),
            Argument::Type(name) => Value::Str((*name).to_string()),
            Argument::Failure(failure) => Value::Str(failure.short_message().to_string()),
            Argument::Thread { name, id } => {
                Value::Str(format!("{}:{}", name.as_deref().unwrap_or("<unnamed>"), id))
            }
            Argument::Path(path) => Value::Str(absolute(path)),
            Argument::List(items) => Value::Str(preview(items)),
        }
    }
}

fn absolute(path: &Path) -> String {
    std::path::absolute(path)
        .unwrap_or_else(|_| path.to_path_buf())
        .display()
        .to_string()
}

/// `[a,b,c]` preview of a collection. Null and empty elements are skipped; a fourth
/// element is replaced by the ellipsis marker.
fn preview(items: &[Argument]) -> String {
    let mut out = String::from("[");
    let mut shown = 0;
    for item in items {
        let value = item.coerce();
        if value.is_null() {
            continue;
        }
        let text = value.to_string();
        if text.is_empty() {
            continue;
        }
        if shown > 0 {
            out.push(',');
        }
        if shown == PREVIEW_ITEMS {
            out.push_str(ELLIPSIS);
            break;
        }
        out.push_str(&text);
        shown += 1;
    }
    out.push(']');
    out
}

/// Numeric part of a `ThreadId`, which only exposes it through `Debug`.
fn thread_number(thread: &Thread) -> u64 {
    let debug = format!("{:?}", thread.id());
    debug
        .chars()
        .filter(char::is_ascii_digit)
        .collect::<String>()
        .parse()
        .unwrap_or(0)
}

/// A coerced argument.
#[derive(Debug, Clone, PartialEq)]
pub(crate) enum Value {
    Null,
    Str(String),
    Int(i64),
    UInt(u64),
    Float(f64),
    Bool(bool),
    Char(char),
}

impl Value {
    pub(crate) fn is_null(&self) -> bool {
        matches!(self, Value::Null)
    }

    pub(crate) fn kind(&self) -> &'static str {
        match self {
            Value::Null => "null",
            Value::Str(_) => "string",
            Value::Int(_) | Value::UInt(_) => "integer",
            Value::Float(_) => "float",
            Value::Bool(_) => "bool",
            Value::Char(_) => "char",
        }
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Null => f.write_str("null"),
            Value::Str(s) => f.write_str(s),
            Value::Int(v) => write!(f, "{v}"),
            Value::UInt(v) => write!(f, "{v}"),
            Value::Float(v) if v.is_infinite() => {
                f.write_str(if *v > 0.0 { "Infinity" } else { "-Infinity" })
            }
            Value::Float(v) => write!(f, "{v:?}"),
            Value::Bool(v) => write!(f, "{v}"),
            Value::Char(v) => write!(f, "{v}"),
        }
    }
}

impl From<&str> for Argument {
    fn from(value: &str) -> Self {
        Argument::Str(value.to_string())
    }
}

impl From<String> for Argument {
    fn from(value: String) -> Self {
        Argument::Str(value)
    }
}

impl From<&String> for Argument {
    fn from(value: &String) -> Self {
        Argument::Str(value.clone())
    }
}

macro_rules! signed_argument {
    ($($ty:ty),*) => {
        $(impl From<$ty> for Argument {
            fn from(value: $ty) -> Self {
                Argument::Int(value as i64)
            }
        })*
    };
}

macro_rules! unsigned_argument {
    ($($ty:ty),*) => {
        $(impl From<$ty> for Argument {
            fn from(value: $ty) -> Self {
                Argument::UInt(value as u64)
            }
        })*
    };
}

signed_argument!(i8, i16, i32, i64, isize);
unsigned_argument!(u8, u16, u32, u64, usize);

impl From<f64> for Argument {
    fn from(value: f64) -> Self {
        Argument::Float(value)
    }
}

impl From<f32> for Argument {
    fn from(value: f32) -> Self {
        // Going through the shortest decimal form keeps 1.23f32 printing as 1.23.
        Argument::Float(value.to_string().parse().unwrap_or(f64::from(value)))
    }
}

impl From<bool> for Argument {
    fn from(value: bool) -> Self {
        Argument::Bool(value)
    }
}

impl From<char> for Argument {
    fn from(value: char) -> Self {
        Argument::Char(value)
    }
}

impl From<Failure> for Argument {
    fn from(value: Failure) -> Self {
        Argument::Failure(value)
    }
}

impl From<&Thread> for Argument {
    fn from(thread: &Thread) -> Self {
        Argument::Thread {
            name: thread.name().map(str::to_string),
            id: thread_number(thread),
        }
    }
}

impl From<&Path> for Argument {
    fn from(value: &Path) -> Self {
        Argument::Path(value.to_path_buf())
    }
}

impl From<PathBuf> for Argument {
    fn from(value: PathBuf) -> Self {
        Argument::Path(value)
    }
}

impl From<&PathBuf> for Argument {
    fn from(value: &PathBuf) -> Self {
        Argument::Path(value.clone())
    }
}

impl<T: Into<Argument>> From<Option<T>> for Argument {
    fn from(value: Option<T>) -> Self {
        value.map_or(Argument::Null, Into::into)
    }
}

impl<T: Into<Argument>> From<Vec<T>> for Argument {
    fn from(values: Vec<T>) -> Self {
        Argument::List(values.into_iter().map(Into::into).collect())
    }
}

impl<T: Clone + Into<Argument>> From<&[T]> for Argument {
    fn from(values: &[T]) -> Self {
        Argument::List(values.iter().cloned().map(Into::into).collect())
    }
}

impl<T: Into<Argument>, const N: usize> From<[T; N]> for Argument {
    fn from(values: [T; N]) -> Self {
        Argument::List(values.into_iter().map(Into::into).collect())
    }
}

/// Build an argument array from heterogeneous values.
///
/// ```
/// use log_relay::args;
/// let arguments = args!["phone", 42, vec!["a", "b"]];
/// assert_eq!(arguments.len(), 3);
/// ```
#[macro_export]
macro_rules! args {
    () => {{
        let empty: [$crate::format::Argument; 0] = [];
        empty
    }};
    ($($arg:expr),+ $(,)?) => {
        [$($crate::format::Argument::from($arg)),+]
    };
}

#[cfg(test)]
mod tests {
    use super::*;

    fn coerced(arg: impl Into<Argument>) -> String {
        arg.into().coerce().to_string()
    }

    #[test]
    fn type_descriptor_uses_full_name() {
        assert!(Argument::type_of::<String>().coerce().to_string().ends_with("string::String"));
    }

    #[test]
    fn failure_uses_message_then_type_name() {
        let with_message = Failure::new("app::Error", Some("boom".into()));
        assert_eq!(coerced(with_message), "boom");

        let without_message = Failure::new("app::Error", None);
        assert_eq!(coerced(without_message), "app::Error");
    }

    #[test]
    fn thread_renders_name_and_id() {
        let thread = Argument::Thread { name: Some("worker".into()), id: 7 };
        assert_eq!(thread.coerce().to_string(), "worker:7");

        let unnamed = Argument::Thread { name: None, id: 3 };
        assert_eq!(unnamed.coerce().to_string(), "<unnamed>:3");
    }

    #[test]
    fn current_thread_has_numeric_id() {
        let text = Argument::current_thread().coerce().to_string();
        let (_, id) = text.rsplit_once(':').unwrap();
        assert!(id.parse::<u64>().unwrap() > 0);
    }

    #[test]
    fn path_is_made_absolute() {
        let text = coerced(Path::new("logs/app.log"));
        assert!(Path::new(&text).is_absolute());
        assert!(text.ends_with("app.log"));
    }

    #[test]
    fn preview_shows_three_items() {
        assert_eq!(coerced(vec!["a", "b", "c"]), "[a,b,c]");
        assert_eq!(coerced(vec!["a", "b", "c", "d", "e"]), "[a,b,c,...]");
    }

    #[test]
    fn preview_skips_null_and_empty_items() {
        let items = vec![Some("a"), None, Some(""), Some("b")];
        assert_eq!(coerced(items), "[a,b]");
        assert_eq!(coerced(Vec::<&str>::new()), "[]");
    }

    #[test]
    fn floats_print_like_decimal_literals() {
        assert_eq!(coerced(1.23f32), "1.23");
        assert_eq!(coerced(2.0f64), "2.0");
        assert_eq!(coerced(f64::NEG_INFINITY), "-Infinity");
    }

    #[test]
    fn args_macro_converts_each_value() {
        let arguments = args!["x", 1u8, -2, true, None::<&str>];
        assert_eq!(
            arguments,
            [
                Argument::Str("x".into()),
                Argument::UInt(1),
                Argument::Int(-2),
                Argument::Bool(true),
                Argument::Null,
            ]
        );
    }
}
