//! Native `%` conversion formatting.
//!
//! Supports `%[index$][flags][width][.precision]conversion` with the flags
//! `- # + space 0 , (` and the relative index `<`. Conversions: `b B s S c C d o
//! x X e E f g G % n`. Anything else is reported as a [`FormatError`]; callers
//! fall back to the unformatted template.

use std::iter::Peekable;
use std::str::Chars;

use super::argument::Value;
use super::FormatError;

/// Largest width or precision a specifier may ask for.
const MAX_FIELD: usize = 10_000;

#[derive(Debug, Default, Clone, Copy)]
struct Flags {
    left: bool,
    alternate: bool,
    plus: bool,
    space: bool,
    zero: bool,
    group: bool,
    paren: bool,
}

impl Flags {
    fn set(&mut self, flag: char) -> bool {
        let slot = match flag {
            '-' => &mut self.left,
            '#' => &mut self.alternate,
            '+' => &mut self.plus,
            ' ' => &mut self.space,
            '0' => &mut self.zero,
            ',' => &mut self.group,
            '(' => &mut self.paren,
            _ => return false,
        };
        let fresh = !*slot;
        *slot = true;
        fresh
    }

    /// True when any flag outside `allowed` is set.
    fn any_except(&self, allowed: &str) -> bool {
        [
            ('-', self.left),
            ('#', self.alternate),
            ('+', self.plus),
            (' ', self.space),
            ('0', self.zero),
            (',', self.group),
            ('(', self.paren),
        ]
        .iter()
        .any(|(flag, set)| *set && !allowed.contains(*flag))
    }
}

#[derive(Debug, Clone, Copy)]
enum Index {
    Ordinary,
    Explicit(usize),
    Relative,
}

#[derive(Debug, Clone)]
struct Spec {
    text: String,
    index: Index,
    flags: Flags,
    width: Option<usize>,
    precision: Option<usize>,
    conversion: char,
}

impl Spec {
    fn mismatch(&self) -> FormatError {
        FormatError::FlagsMismatch {
            spec: self.text.clone(),
            conversion: self.conversion,
        }
    }

    fn illegal(&self, value: &Value) -> FormatError {
        FormatError::IllegalConversion {
            conversion: self.conversion,
            kind: value.kind(),
        }
    }

    fn uppercase(&self) -> bool {
        self.conversion.is_ascii_uppercase()
    }
}

/// Resolves argument references in order of appearance.
struct Cursor<'v> {
    values: &'v [Value],
    ordinary: usize,
    last: Option<usize>,
}

impl<'v> Cursor<'v> {
    fn take(&mut self, spec: &Spec) -> Result<&'v Value, FormatError> {
        let position = match spec.index {
            Index::Explicit(n) => n - 1,
            Index::Relative => self
                .last
                .ok_or_else(|| FormatError::MissingArgument(spec.text.clone()))?,
            Index::Ordinary => {
                self.ordinary += 1;
                self.ordinary - 1
            }
        };
        self.last = Some(position);
        self.values
            .get(position)
            .ok_or_else(|| FormatError::MissingArgument(spec.text.clone()))
    }
}

/// Format `template` against already-coerced values.
pub(crate) fn format(template: &str, values: &[Value]) -> Result<String, FormatError> {
    let mut out = String::with_capacity(template.len() + 16);
    let mut cursor = Cursor { values, ordinary: 0, last: None };
    let mut chars = template.chars().peekable();

    while let Some(c) = chars.next() {
        if c != '%' {
            out.push(c);
            continue;
        }
        let spec = parse_spec(&mut chars)?;
        render(&mut out, &spec, &mut cursor)?;
    }
    Ok(out)
}

fn digits(chars: &mut Peekable<Chars<'_>>, text: &mut String) -> Option<usize> {
    let mut number = String::new();
    while let Some(d) = chars.peek().copied().filter(char::is_ascii_digit) {
        number.push(d);
        text.push(d);
        chars.next();
    }
    if number.is_empty() {
        None
    } else {
        Some(number.parse().unwrap_or(usize::MAX))
    }
}

fn parse_spec(chars: &mut Peekable<Chars<'_>>) -> Result<Spec, FormatError> {
    let mut text = String::from("%");
    let mut index = Index::Ordinary;
    let mut flags = Flags::default();

    // An explicit `n$` index looks like a width until the `$` shows up.
    let mut lookahead = chars.clone();
    let mut scratch = String::new();
    if let Some(n) = digits(&mut lookahead, &mut scratch) {
        if lookahead.peek() == Some(&'$') && !scratch.starts_with('0') {
            lookahead.next();
            *chars = lookahead;
            text.push_str(&scratch);
            text.push('$');
            index = Index::Explicit(n);
        }
    }

    while let Some(&flag) = chars.peek() {
        if flag == '<' {
            index = Index::Relative;
        } else if "-#+ 0,(".contains(flag) {
            if !flags.set(flag) {
                text.push(flag);
                return Err(FormatError::IllegalFlags(text));
            }
        } else {
            break;
        }
        text.push(flag);
        chars.next();
    }

    let width = digits(chars, &mut text);

    let precision = if chars.peek() == Some(&'.') {
        chars.next();
        text.push('.');
        Some(digits(chars, &mut text).ok_or_else(|| FormatError::Incomplete(text.clone()))?)
    } else {
        None
    };

    let conversion = chars.next().ok_or_else(|| FormatError::Incomplete(text.clone()))?;
    text.push(conversion);
    if width.into_iter().chain(precision).any(|n| n > MAX_FIELD) {
        return Err(FormatError::OutOfRange(text));
    }

    let spec = Spec { text, index, flags, width, precision, conversion };
    validate(&spec)?;
    Ok(spec)
}

fn validate(spec: &Spec) -> Result<(), FormatError> {
    let flags = spec.flags;
    if (flags.left || flags.zero) && spec.width.is_none() {
        return Err(FormatError::MissingWidth(spec.text.clone()));
    }
    if (flags.left && flags.zero) || (flags.plus && flags.space) {
        return Err(FormatError::IllegalFlags(spec.text.clone()));
    }
    Ok(())
}

fn render(out: &mut String, spec: &Spec, cursor: &mut Cursor<'_>) -> Result<(), FormatError> {
    match spec.conversion {
        '%' => {
            if spec.precision.is_some() {
                return Err(FormatError::IllegalPrecision(spec.text.clone()));
            }
            if spec.flags.any_except("-") {
                return Err(spec.mismatch());
            }
            justify(out, "%", spec);
        }
        'n' => {
            if spec.precision.is_some() {
                return Err(FormatError::IllegalPrecision(spec.text.clone()));
            }
            if spec.width.is_some() || spec.flags.any_except("") {
                return Err(spec.mismatch());
            }
            out.push('\n');
        }
        'b' | 'B' | 's' | 'S' => {
            if spec.flags.any_except("-") {
                return Err(spec.mismatch());
            }
            let value = cursor.take(spec)?;
            let text = match (spec.conversion.to_ascii_lowercase(), value) {
                ('b', Value::Null) => "false".to_string(),
                ('b', Value::Bool(b)) => b.to_string(),
                ('b', _) => "true".to_string(),
                _ => value.to_string(),
            };
            let text = truncate(&text, spec.precision);
            justify(out, &cased(text, spec), spec);
        }
        'c' | 'C' => {
            if spec.precision.is_some() {
                return Err(FormatError::IllegalPrecision(spec.text.clone()));
            }
            if spec.flags.any_except("-") {
                return Err(spec.mismatch());
            }
            let value = cursor.take(spec)?;
            let text = match value {
                Value::Null => "null".to_string(),
                Value::Char(c) => c.to_string(),
                Value::Int(code) => code_point(u64::try_from(*code).ok(), spec, value)?,
                Value::UInt(code) => code_point(Some(*code), spec, value)?,
                other => return Err(spec.illegal(other)),
            };
            justify(out, &cased(text, spec), spec);
        }
        'd' => {
            if spec.precision.is_some() {
                return Err(FormatError::IllegalPrecision(spec.text.clone()));
            }
            if spec.flags.alternate {
                return Err(spec.mismatch());
            }
            let value = cursor.take(spec)?;
            let (negative, magnitude) = match value {
                Value::Null => return Ok(justify(out, "null", spec)),
                Value::Int(v) => (*v < 0, v.unsigned_abs().to_string()),
                Value::UInt(v) => (false, v.to_string()),
                other => return Err(spec.illegal(other)),
            };
            let magnitude = if spec.flags.group { group(&magnitude) } else { magnitude };
            justify(out, &signed(negative, "", &magnitude, spec), spec);
        }
        'o' | 'x' | 'X' => {
            if spec.precision.is_some() {
                return Err(FormatError::IllegalPrecision(spec.text.clone()));
            }
            if spec.flags.any_except("-#0") {
                return Err(spec.mismatch());
            }
            let value = cursor.take(spec)?;
            let bits = match value {
                Value::Null => return Ok(justify(out, "null", spec)),
                Value::Int(v) => *v as u64,
                Value::UInt(v) => *v,
                other => return Err(spec.illegal(other)),
            };
            let (digits, prefix) = match spec.conversion {
                'o' => (format!("{bits:o}"), "0"),
                'x' => (format!("{bits:x}"), "0x"),
                _ => (format!("{bits:X}"), "0X"),
            };
            let prefix = if spec.flags.alternate { prefix } else { "" };
            justify(out, &signed(false, prefix, &digits, spec), spec);
        }
        'e' | 'E' | 'f' | 'g' | 'G' => {
            let allowed = match spec.conversion {
                'f' => "-#+ 0,(",
                'e' | 'E' => "-#+ 0(",
                _ => "-+ 0,(",
            };
            if spec.flags.any_except(allowed) {
                return Err(spec.mismatch());
            }
            let value = cursor.take(spec)?;
            let v = match value {
                Value::Null => return Ok(justify(out, "null", spec)),
                Value::Float(v) => *v,
                other => return Err(spec.illegal(other)),
            };
            justify(out, &cased(float(v, spec), spec), spec);
        }
        other => return Err(FormatError::UnknownConversion(other)),
    }
    Ok(())
}

fn code_point(code: Option<u64>, spec: &Spec, value: &Value) -> Result<String, FormatError> {
    code.and_then(|c| u32::try_from(c).ok())
        .and_then(char::from_u32)
        .map(String::from)
        .ok_or_else(|| spec.illegal(value))
}

fn float(v: f64, spec: &Spec) -> String {
    if v.is_nan() {
        return "NaN".to_string();
    }
    let negative = v.is_sign_negative() && v != 0.0;
    let magnitude = v.abs();
    if magnitude.is_infinite() {
        let mut unpadded = spec.clone();
        unpadded.flags.zero = false;
        return signed(negative, "", "Infinity", &unpadded);
    }

    let precision = spec.precision.unwrap_or(6);
    let body = match spec.conversion {
        'f' => fixed(magnitude, precision, spec.flags.group),
        'e' | 'E' => scientific(magnitude, precision),
        _ => general(magnitude, precision, spec.flags.group),
    };
    signed(negative, "", &body, spec)
}

fn fixed(magnitude: f64, precision: usize, grouped: bool) -> String {
    let text = format!("{magnitude:.precision$}");
    if !grouped {
        return text;
    }
    match text.split_once('.') {
        Some((int, frac)) => format!("{}.{}", group(int), frac),
        None => group(&text),
    }
}

/// Scientific notation with a signed exponent of at least two digits.
fn scientific(magnitude: f64, precision: usize) -> String {
    let text = format!("{magnitude:.precision$e}");
    let (mantissa, exponent) = text.split_once('e').unwrap_or((&text, "0"));
    let exponent: i32 = exponent.parse().unwrap_or(0);
    let sign = if exponent < 0 { '-' } else { '+' };
    format!("{mantissa}e{sign}{:02}", exponent.unsigned_abs())
}

fn general(magnitude: f64, precision: usize, grouped: bool) -> String {
    let precision = precision.max(1);
    if magnitude == 0.0 {
        return fixed(0.0, precision - 1, grouped);
    }
    // Decide on the exponent after rounding to the requested significant digits.
    let rounded = format!("{magnitude:.prec$e}", prec = precision - 1);
    let exponent: i64 = rounded
        .split_once('e')
        .and_then(|(_, e)| e.parse().ok())
        .unwrap_or(0);
    if exponent >= -4 && exponent < precision as i64 {
        let fraction = (precision as i64 - 1 - exponent).max(0) as usize;
        fixed(magnitude, fraction, grouped)
    } else {
        scientific(magnitude, precision - 1)
    }
}

fn group(digits: &str) -> String {
    let mut grouped = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, d) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(d);
    }
    grouped
}

/// Apply sign flags, radix prefix and zero padding to a magnitude.
fn signed(negative: bool, prefix: &str, magnitude: &str, spec: &Spec) -> String {
    let flags = spec.flags;
    let (lead, trail) = if negative {
        if flags.paren {
            ("(", ")")
        } else {
            ("-", "")
        }
    } else if flags.plus {
        ("+", "")
    } else if flags.space {
        (" ", "")
    } else {
        ("", "")
    };

    let mut text = String::from(lead);
    text.push_str(prefix);
    if flags.zero {
        let used = lead.len() + prefix.len() + magnitude.chars().count() + trail.len();
        let width = spec.width.unwrap_or(0);
        text.extend(std::iter::repeat('0').take(width.saturating_sub(used)));
    }
    text.push_str(magnitude);
    text.push_str(trail);
    text
}

fn truncate(text: &str, precision: Option<usize>) -> String {
    match precision {
        Some(p) => text.chars().take(p).collect(),
        None => text.to_string(),
    }
}

fn cased(text: String, spec: &Spec) -> String {
    if spec.uppercase() {
        text.to_uppercase()
    } else {
        text
    }
}

fn justify(out: &mut String, text: &str, spec: &Spec) {
    let pad = spec
        .width
        .map_or(0, |w| w.saturating_sub(text.chars().count()));
    if spec.flags.left {
        out.push_str(text);
        out.extend(std::iter::repeat(' ').take(pad));
    } else {
        out.extend(std::iter::repeat(' ').take(pad));
        out.push_str(text);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn fmt(template: &str, values: &[Value]) -> Result<String, FormatError> {
        format(template, values)
    }

    fn s(v: &str) -> Value {
        Value::Str(v.to_string())
    }

    #[test]
    fn strings_and_padding() {
        assert_eq!(fmt("Phone %s.", &[s("770 555-666")]).unwrap(), "Phone 770 555-666.");
        assert_eq!(fmt("[%5s]", &[s("ab")]).unwrap(), "[   ab]");
        assert_eq!(fmt("[%-5s]", &[s("ab")]).unwrap(), "[ab   ]");
        assert_eq!(fmt("[%.2s]", &[s("abcdef")]).unwrap(), "[ab]");
        assert_eq!(fmt("%S", &[s("quiet")]).unwrap(), "QUIET");
        assert_eq!(fmt("%s", &[Value::Null]).unwrap(), "null");
    }

    #[test]
    fn integers() {
        assert_eq!(fmt("%d", &[Value::Int(-42)]).unwrap(), "-42");
        assert_eq!(fmt("%05d", &[Value::Int(-42)]).unwrap(), "-0042");
        assert_eq!(fmt("%+d", &[Value::UInt(7)]).unwrap(), "+7");
        assert_eq!(fmt("%,d", &[Value::Int(1234567)]).unwrap(), "1,234,567");
        assert_eq!(fmt("%(d", &[Value::Int(-5)]).unwrap(), "(5)");
        assert_eq!(fmt("%x", &[Value::Int(255)]).unwrap(), "ff");
        assert_eq!(fmt("%#X", &[Value::Int(255)]).unwrap(), "0XFF");
        assert_eq!(fmt("%#010x", &[Value::Int(255)]).unwrap(), "0x000000ff");
        assert_eq!(fmt("%o", &[Value::Int(8)]).unwrap(), "10");
        assert_eq!(fmt("%x", &[Value::Int(-1)]).unwrap(), "ffffffffffffffff");
    }

    #[test]
    fn floats() {
        assert_eq!(fmt("%.2f", &[Value::Float(3.14159)]).unwrap(), "3.14");
        assert_eq!(fmt("%f", &[Value::Float(1.5)]).unwrap(), "1.500000");
        assert_eq!(fmt("%,.1f", &[Value::Float(12345.27)]).unwrap(), "12,345.3");
        assert_eq!(fmt("%e", &[Value::Float(12.3456)]).unwrap(), "1.234560e+01");
        assert_eq!(fmt("%.1E", &[Value::Float(0.00015)]).unwrap(), "1.5E-04");
        assert_eq!(fmt("%g", &[Value::Float(12.5)]).unwrap(), "12.5000");
        assert_eq!(fmt("%g", &[Value::Float(0.00001)]).unwrap(), "1.00000e-05");
        assert_eq!(fmt("%08.2f", &[Value::Float(-3.5)]).unwrap(), "-0003.50");
        assert_eq!(fmt("%f", &[Value::Float(f64::NAN)]).unwrap(), "NaN");
        assert_eq!(fmt("%010f", &[Value::Float(f64::NEG_INFINITY)]).unwrap(), " -Infinity");
    }

    #[test]
    fn booleans_and_chars() {
        assert_eq!(fmt("%b", &[Value::Null]).unwrap(), "false");
        assert_eq!(fmt("%b", &[Value::Bool(false)]).unwrap(), "false");
        assert_eq!(fmt("%B", &[s("anything")]).unwrap(), "TRUE");
        assert_eq!(fmt("%c", &[Value::Char('z')]).unwrap(), "z");
        assert_eq!(fmt("%C", &[Value::UInt(97)]).unwrap(), "A");
    }

    #[test]
    fn indexes() {
        let values = [s("a"), s("b")];
        assert_eq!(fmt("%2$s %1$s", &values).unwrap(), "b a");
        assert_eq!(fmt("%s %<s %s", &values).unwrap(), "a a b");
        assert_eq!(fmt("%2$s %s", &values).unwrap(), "b a");
    }

    #[test]
    fn literals() {
        assert_eq!(fmt("100%% done%n", &[s("unused")]).unwrap(), "100% done\n");
    }

    #[test]
    fn failures() {
        assert!(matches!(fmt("%s %d", &[s("x")]), Err(FormatError::MissingArgument(_))));
        assert!(matches!(fmt("%d", &[s("x")]), Err(FormatError::IllegalConversion { .. })));
        assert!(matches!(fmt("%q", &[s("x")]), Err(FormatError::UnknownConversion('q'))));
        assert!(matches!(fmt("50%", &[s("x")]), Err(FormatError::Incomplete(_))));
        assert!(matches!(fmt("%-s", &[s("x")]), Err(FormatError::MissingWidth(_))));
        assert!(matches!(fmt("%.2d", &[Value::Int(1)]), Err(FormatError::IllegalPrecision(_))));
        assert!(matches!(fmt("%#s", &[s("x")]), Err(FormatError::FlagsMismatch { .. })));
        assert!(matches!(fmt("%--5s", &[s("x")]), Err(FormatError::IllegalFlags(_))));
        assert!(matches!(fmt("%<s", &[s("x")]), Err(FormatError::MissingArgument(_))));
        assert!(matches!(fmt("%tY", &[s("x")]), Err(FormatError::UnknownConversion('t'))));
    }

    #[test]
    fn oversized_fields_are_rejected() {
        let huge = "%99999999999999999999s";
        assert_eq!(fmt(huge, &[s("x")]), Err(FormatError::OutOfRange(huge.to_string())));
        assert!(matches!(fmt("%.70000f", &[Value::Float(1.5)]), Err(FormatError::OutOfRange(_))));
        assert!(matches!(
            fmt("%.99999999999999999999f", &[Value::Float(1.5)]),
            Err(FormatError::OutOfRange(_))
        ));
        assert!(matches!(fmt("%10001s", &[s("x")]), Err(FormatError::OutOfRange(_))));
        assert_eq!(fmt("%.10000g", &[Value::Float(1.5)]).unwrap().len(), 10_001);
        assert_eq!(fmt("%10000s", &[s("x")]).unwrap().len(), MAX_FIELD);
    }
}
