//! Printf-style message formatting over loosely typed arguments.
//!
//! [`format`] recognizes `%s` (string coercion), `%d` (numeric coercion),
//! `%j` (JSON), `%o`/`%O` (structural inspection), and `%%` (literal
//! percent). A directive with no remaining argument is left verbatim, and
//! arguments left over after the last directive are appended
//! space-separated. Formatting never fails: unserializable values degrade
//! to `[Circular]` and non-numeric input to `%d` renders as `NaN`.

use serde::Serialize;
use serde_json::Value;
use std::error::Error;
use std::fmt::Write;

// Structures nested past this depth are cut off the way cyclic structures
// would be.
const MAX_JSON_DEPTH: usize = 128;

// Inspection stops descending past this depth and summarizes the rest.
const MAX_INSPECT_DEPTH: usize = 4;

/// A loosely typed format argument.
///
/// `From` conversions cover the common primitives, strings, and
/// [`serde_json::Value`] for structured data; [`Arg::error`] captures an
/// error with its source chain. The [`dbug!`] macro applies these
/// conversions automatically.
///
/// [`dbug!`]: crate::dbug
#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(untagged)]
pub enum Arg {
    /// Plain text. As the leading argument, this is the format string.
    Str(String),
    /// A signed integer.
    Int(i64),
    /// A floating-point number.
    Float(f64),
    /// A boolean.
    Bool(bool),
    /// An absent value, rendered as `null`.
    Null,
    /// A structured value, rendered by `%j`, `%o`, and `%O`.
    Json(Value),
    /// A rendered error description: the message plus its source chain.
    Error(String),
}

impl Arg {
    /// Captures an error as its full description. The message comes first,
    /// followed by one `caused by` line per source in the chain.
    pub fn error(err: &(dyn Error + 'static)) -> Self {
        let mut text = err.to_string();
        let mut source = err.source();
        while let Some(cause) = source {
            let _ = write!(text, "\n    caused by: {}", cause);
            source = cause.source();
        }
        Arg::Error(text)
    }

    /// `%s` string coercion.
    pub(crate) fn coerce_str(&self) -> String {
        match self {
            Arg::Str(text) | Arg::Error(text) => text.clone(),
            Arg::Int(n) => n.to_string(),
            Arg::Float(n) => fmt_number(*n),
            Arg::Bool(b) => b.to_string(),
            Arg::Null => "null".to_owned(),
            Arg::Json(value) => inspect(value),
        }
    }

    /// `%d` numeric coercion. Integral values print without a fraction;
    /// non-numeric input renders as `NaN`.
    pub(crate) fn coerce_num(&self) -> String {
        let n = match self {
            Arg::Int(n) => return n.to_string(),
            Arg::Float(n) => *n,
            Arg::Str(text) => text.trim().parse().unwrap_or(f64::NAN),
            Arg::Bool(true) => 1.0,
            Arg::Bool(false) | Arg::Null => 0.0,
            Arg::Json(_) | Arg::Error(_) => f64::NAN,
        };
        fmt_number(n)
    }
}

impl From<&str> for Arg {
    fn from(text: &str) -> Self {
        Arg::Str(text.to_owned())
    }
}

impl From<String> for Arg {
    fn from(text: String) -> Self {
        Arg::Str(text)
    }
}

impl From<bool> for Arg {
    fn from(b: bool) -> Self {
        Arg::Bool(b)
    }
}

impl From<()> for Arg {
    fn from(_: ()) -> Self {
        Arg::Null
    }
}

impl From<Value> for Arg {
    fn from(value: Value) -> Self {
        Arg::Json(value)
    }
}

macro_rules! arg_from_int {
    ($($int:ty),*) => {
        $(
            impl From<$int> for Arg {
                fn from(n: $int) -> Self {
                    Arg::Int(i64::from(n))
                }
            }
        )*
    }
}

arg_from_int!(i8, i16, i32, i64, u8, u16, u32);

impl From<f32> for Arg {
    fn from(n: f32) -> Self {
        Arg::Float(f64::from(n))
    }
}

impl From<f64> for Arg {
    fn from(n: f64) -> Self {
        Arg::Float(n)
    }
}

/// Applies `%s`, `%d`, `%j`, `%o`, `%O`, and `%%` directives in `fmt` to
/// `args` in order.
///
/// ```
/// use dbug::{format, Arg};
///
/// assert_eq!(format("%d", &[Arg::from(42.0)]), "42");
/// assert_eq!(format("%%s%s", &[Arg::from("foo")]), "%sfoo");
/// assert_eq!(format("%s:%s", &[Arg::from("foo")]), "foo:%s");
/// ```
pub fn format(fmt: &str, args: &[Arg]) -> String {
    let mut out = String::with_capacity(fmt.len());
    let mut index = 0;
    let mut chars = fmt.chars().peekable();

    while let Some(c) = chars.next() {
        if c != '%' {
            out.push(c);
            continue;
        }

        match chars.peek().copied() {
            Some('%') => {
                chars.next();
                out.push('%');
            }
            Some(directive @ ('s' | 'd' | 'j' | 'o' | 'O')) => {
                chars.next();
                match args.get(index) {
                    Some(arg) => {
                        index += 1;
                        match directive {
                            's' => out.push_str(&arg.coerce_str()),
                            'd' => out.push_str(&arg.coerce_num()),
                            'j' => out.push_str(&coerce_json(arg)),
                            _ => out.push_str(&inspect_arg(arg)),
                        }
                    }
                    // Out of arguments: the directive stays verbatim.
                    None => {
                        out.push('%');
                        out.push(directive);
                    }
                }
            }
            _ => out.push('%'),
        }
    }

    for arg in &args[index..] {
        out.push(' ');
        match arg {
            Arg::Json(value) => out.push_str(&inspect(value)),
            other => out.push_str(&other.coerce_str()),
        }
    }

    out
}

/// `%j` coercion via serde; failure degrades to `[Circular]`.
pub(crate) fn coerce_json(arg: &Arg) -> String {
    if let Arg::Json(value) = arg {
        if exceeds_depth(value, MAX_JSON_DEPTH) {
            return "[Circular]".to_owned();
        }
    }
    serde_json::to_string(arg).unwrap_or_else(|_| "[Circular]".to_owned())
}

fn exceeds_depth(value: &Value, depth: usize) -> bool {
    if depth == 0 {
        return true;
    }
    match value {
        Value::Array(items) => items.iter().any(|item| exceeds_depth(item, depth - 1)),
        Value::Object(map) => map.values().any(|item| exceeds_depth(item, depth - 1)),
        _ => false,
    }
}

/// `%o`/`%O` coercion.
pub(crate) fn inspect_arg(arg: &Arg) -> String {
    match arg {
        Arg::Str(text) => format!("{:?}", text),
        Arg::Json(value) => inspect(value),
        Arg::Error(text) => text.clone(),
        other => other.coerce_str(),
    }
}

/// Structural inspection: JSON-ish with bare keys where possible, e.g.
/// `{ pool: 4, host: "db-1" }`.
pub(crate) fn inspect(value: &Value) -> String {
    let mut out = String::new();
    inspect_into(value, MAX_INSPECT_DEPTH, &mut out);
    out
}

fn inspect_into(value: &Value, depth: usize, out: &mut String) {
    match value {
        Value::Null => out.push_str("null"),
        Value::Bool(b) => {
            let _ = write!(out, "{}", b);
        }
        Value::Number(n) => {
            let _ = write!(out, "{}", n);
        }
        Value::String(text) => {
            let _ = write!(out, "{:?}", text);
        }
        Value::Array(items) => {
            if depth == 0 {
                out.push_str("[Array]");
                return;
            }
            out.push('[');
            for (i, item) in items.iter().enumerate() {
                if i > 0 {
                    out.push_str(", ");
                }
                inspect_into(item, depth - 1, out);
            }
            out.push(']');
        }
        Value::Object(map) => {
            if depth == 0 {
                out.push_str("[Object]");
                return;
            }
            if map.is_empty() {
                out.push_str("{}");
                return;
            }
            out.push_str("{ ");
            for (i, (key, item)) in map.iter().enumerate() {
                if i > 0 {
                    out.push_str(", ");
                }
                if is_bare_key(key) {
                    out.push_str(key);
                } else {
                    let _ = write!(out, "{:?}", key);
                }
                out.push_str(": ");
                inspect_into(item, depth - 1, out);
            }
            out.push_str(" }");
        }
    }
}

fn is_bare_key(key: &str) -> bool {
    let mut chars = key.chars();
    chars
        .next()
        .is_some_and(|c| c.is_ascii_alphabetic() || c == '_' || c == '$')
        && chars.all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '$')
}

fn fmt_number(n: f64) -> String {
    if n.is_nan() {
        "NaN".to_owned()
    } else if n.is_infinite() {
        if n > 0.0 { "Infinity" } else { "-Infinity" }.to_owned()
    } else if n.fract() == 0.0 && n.abs() < 1e15 {
        format!("{}", n as i64)
    } else {
        n.to_string()
    }
}
