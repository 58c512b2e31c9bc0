//! Single-pass template scanner.
//!
//! The scanner copies text and substitutes `{...}` placeholders positionally
//! until it meets the first `%`. From there the remainder of the template is
//! handed to the native formatter together with the complete argument array.

use std::fmt::Write;

use super::argument::Value;
use super::{printf, FormatError};

enum Scan {
    Outside,
    /// Inside `{...}`; `substituted` records whether an argument replaced it.
    Inside { substituted: bool },
}

pub(crate) fn expand(template: &str, values: &[Value]) -> Result<String, FormatError> {
    let mut out = String::with_capacity(template.len() + 32);
    let mut state = Scan::Outside;
    let mut position = 0;

    for (offset, c) in template.char_indices() {
        if c == '%' {
            out.push_str(&printf::format(&template[offset..], values)?);
            return Ok(out);
        }

        match state {
            Scan::Inside { substituted } => {
                if c == '}' {
                    if !substituted {
                        out.push('}');
                    }
                    state = Scan::Outside;
                }
            }
            Scan::Outside if c == '{' => {
                let value = values.get(position).filter(|v| !v.is_null());
                position += 1;
                match value {
                    Some(value) => {
                        let _ = write!(out, "{value}");
                    }
                    None => out.push('{'),
                }
                state = Scan::Inside { substituted: value.is_some() };
            }
            Scan::Outside => out.push(c),
        }
    }
    Ok(out)
}
