//! SQL values and literal encoding.
//!
//! Statements are assembled as plain text, so every value that reaches a
//! statement goes through [`encode`]: numeric-looking values are emitted
//! bare, empty values become `NULL`, and everything else is escaped and
//! wrapped in single quotes.

use serde::{Deserialize, Serialize};

/// A SQL value as supplied by the caller or read back from the backend.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum SqlValue {
    /// NULL value.
    Null,
    /// Boolean value.
    Bool(bool),
    /// Integer value.
    Int(i64),
    /// Float value.
    Float(f64),
    /// Text value.
    Text(String),
    /// Binary blob value.
    Blob(Vec<u8>),
}

impl SqlValue {
    /// Returns the value coerced to its textual form.
    ///
    /// `NULL` coerces to the empty string, booleans to `1` / `0`.
    #[must_use]
    pub fn coerce_text(&self) -> String {
        match self {
            Self::Null => String::new(),
            Self::Bool(b) => String::from(if *b { "1" } else { "0" }),
            Self::Int(n) => n.to_string(),
            Self::Float(f) => f.to_string(),
            Self::Text(s) => s.clone(),
            Self::Blob(b) => String::from_utf8_lossy(b).into_owned(),
        }
    }

    /// Returns true for `NULL` and for values that coerce to an empty string.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        match self {
            Self::Null => true,
            Self::Text(s) => s.is_empty(),
            Self::Blob(b) => b.is_empty(),
            _ => false,
        }
    }
}

impl std::fmt::Display for SqlValue {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Null => f.write_str("NULL"),
            other => f.write_str(&other.coerce_text()),
        }
    }
}

/// Trait for types that can be converted to SQL values.
pub trait ToSqlValue {
    /// Converts the value to a `SqlValue`.
    fn to_sql_value(self) -> SqlValue;
}

impl ToSqlValue for SqlValue {
    fn to_sql_value(self) -> SqlValue {
        self
    }
}

impl ToSqlValue for bool {
    fn to_sql_value(self) -> SqlValue {
        SqlValue::Bool(self)
    }
}

impl ToSqlValue for i64 {
    fn to_sql_value(self) -> SqlValue {
        SqlValue::Int(self)
    }
}

impl ToSqlValue for i32 {
    fn to_sql_value(self) -> SqlValue {
        SqlValue::Int(i64::from(self))
    }
}

impl ToSqlValue for u32 {
    fn to_sql_value(self) -> SqlValue {
        SqlValue::Int(i64::from(self))
    }
}

impl ToSqlValue for f64 {
    fn to_sql_value(self) -> SqlValue {
        SqlValue::Float(self)
    }
}

impl ToSqlValue for String {
    fn to_sql_value(self) -> SqlValue {
        SqlValue::Text(self)
    }
}

impl ToSqlValue for &str {
    fn to_sql_value(self) -> SqlValue {
        SqlValue::Text(String::from(self))
    }
}

impl ToSqlValue for &String {
    fn to_sql_value(self) -> SqlValue {
        SqlValue::Text(self.clone())
    }
}

impl<T: ToSqlValue> ToSqlValue for Option<T> {
    fn to_sql_value(self) -> SqlValue {
        match self {
            Some(v) => v.to_sql_value(),
            None => SqlValue::Null,
        }
    }
}

impl ToSqlValue for Vec<u8> {
    fn to_sql_value(self) -> SqlValue {
        SqlValue::Blob(self)
    }
}

impl<T: ToSqlValue> From<T> for FieldValue {
    fn from(value: T) -> Self {
        Self::Literal(value.to_sql_value())
    }
}

/// A value assigned to a column by UPDATE or INSERT.
#[derive(Debug, Clone, PartialEq)]
pub enum FieldValue {
    /// A value that is encoded into a literal.
    Literal(SqlValue),
    /// A SQL expression emitted verbatim, e.g. `NOW()`.
    Raw(String),
}

impl FieldValue {
    /// Creates a raw SQL expression value.
    #[must_use]
    pub fn raw(expr: impl Into<String>) -> Self {
        Self::Raw(expr.into())
    }
}

impl<'de> Deserialize<'de> for FieldValue {
    /// A one-element array holding a string is a raw expression
    /// (`["NOW()"]`); any other JSON value is a literal.
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        #[derive(Deserialize)]
        #[serde(untagged)]
        enum Repr {
            Raw([String; 1]),
            Literal(SqlValue),
        }

        Ok(match Repr::deserialize(deserializer)? {
            Repr::Raw([expr]) => Self::Raw(expr),
            Repr::Literal(value) => Self::Literal(value),
        })
    }
}

/// Encodes a value as a SQL literal.
///
/// - numeric text that does not start with `+` is emitted bare (`42`, `-1.5`)
/// - empty values and `NULL` become `NULL`
/// - booleans are `1` / `0`, blobs are hex literals (`X'DEAD'`)
/// - anything else is sanitized and single-quoted
#[must_use]
pub fn encode(value: &SqlValue) -> String {
    match value {
        SqlValue::Null => String::from("NULL"),
        SqlValue::Int(n) => n.to_string(),
        SqlValue::Bool(b) => encode_bool(*b),
        SqlValue::Blob(bytes) => encode_blob(bytes),
        other => {
            let text = other.coerce_text();
            if is_numeric(&text) && !text.starts_with('+') {
                return String::from(text.trim());
            }
            quote_text(&text)
        }
    }
}

/// Encodes a value without the numeric heuristic: text is always quoted.
///
/// Typed integers, floats, booleans and blobs are encoded as by [`encode`],
/// empty values become `NULL`.
#[must_use]
pub fn encode_quoted(value: &SqlValue) -> String {
    match value {
        SqlValue::Int(n) => n.to_string(),
        SqlValue::Float(f) => f.to_string(),
        SqlValue::Bool(b) => encode_bool(*b),
        SqlValue::Blob(bytes) => encode_blob(bytes),
        other => quote_text(&other.coerce_text()),
    }
}

fn encode_bool(b: bool) -> String {
    String::from(if b { "1" } else { "0" })
}

fn encode_blob(bytes: &[u8]) -> String {
    let hex: String = bytes.iter().map(|byte| format!("{byte:02X}")).collect();
    format!("X'{hex}'")
}

/// Encodes each element of a list with [`encode`].
#[must_use]
pub fn encode_list(values: &[SqlValue]) -> Vec<String> {
    values.iter().map(encode).collect()
}

fn quote_text(text: &str) -> String {
    if text.is_empty() {
        return String::from("NULL");
    }
    format!("'{}'", sanitize(text))
}

/// Makes text safe for interpolation between single quotes.
///
/// Slashes and tags are stripped and the result trimmed, then backslash,
/// NUL, newline, carriage return, double quote and SUB are backslash-escaped
/// and `&`, `'`, `<`, `>` are converted to HTML entities.
#[must_use]
pub fn sanitize(text: &str) -> String {
    let stripped = strip_tags(&strip_slashes(text));
    let trimmed = stripped.trim_matches(|c: char| c.is_whitespace() || c == '\0' || c == '\x0b');

    let mut out = String::with_capacity(trimmed.len());
    for c in trimmed.chars() {
        match c {
            '\\' => out.push_str("\\\\"),
            '\0' => out.push_str("\\0"),
            '\n' => out.push_str("\\n"),
            '\r' => out.push_str("\\r"),
            '"' => out.push_str("\\\""),
            '\x1a' => out.push_str("\\Z"),
            '&' => out.push_str("&amp;"),
            '\'' => out.push_str("&#039;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            c => out.push(c),
        }
    }
    out
}

/// Removes backslash escapes: `\x` becomes `x`, `\\` becomes `\`.
fn strip_slashes(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    let mut chars = text.chars();
    while let Some(c) = chars.next() {
        if c == '\\' {
            match chars.next() {
                Some('0') => out.push('\0'),
                Some(next) => out.push(next),
                None => {}
            }
        } else {
            out.push(c);
        }
    }
    out
}

/// Removes `<tag ...>` sequences. A `<` not followed by a tag start is kept.
fn strip_tags(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    let mut chars = text.chars().peekable();
    while let Some(c) = chars.next() {
        let opens_tag = c == '<'
            && chars
                .peek()
                .is_some_and(|n| n.is_ascii_alphabetic() || matches!(n, '/' | '!' | '?'));
        if opens_tag {
            for inner in chars.by_ref() {
                if inner == '>' {
                    break;
                }
            }
        } else {
            out.push(c);
        }
    }
    out
}

/// Returns true if the text is a decimal number: optional surrounding
/// whitespace, optional sign, digits with an optional fraction, and an
/// optional exponent.
#[must_use]
pub fn is_numeric(text: &str) -> bool {
    let bytes = text.trim().as_bytes();
    let mut pos = 0;

    if matches!(bytes.first(), Some(b'+' | b'-')) {
        pos += 1;
    }

    let int_start = pos;
    while pos < bytes.len() && bytes[pos].is_ascii_digit() {
        pos += 1;
    }
    let mut digits = pos - int_start;

    if pos < bytes.len() && bytes[pos] == b'.' {
        pos += 1;
        let frac_start = pos;
        while pos < bytes.len() && bytes[pos].is_ascii_digit() {
            pos += 1;
        }
        digits += pos - frac_start;
    }

    if digits == 0 {
        return false;
    }

    if pos < bytes.len() && matches!(bytes[pos], b'e' | b'E') {
        pos += 1;
        if matches!(bytes.get(pos), Some(b'+' | b'-')) {
            pos += 1;
        }
        let exp_start = pos;
        while pos < bytes.len() && bytes[pos].is_ascii_digit() {
            pos += 1;
        }
        if pos == exp_start {
            return false;
        }
    }

    pos == bytes.len()
}
