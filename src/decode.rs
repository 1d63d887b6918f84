// Typed decoder: turn a raw cell into a value according to its column kind.

use crate::core::{Cell, Dialect, TextChar};
use crate::error::{Position, Result, TableError};
use crate::schema::{ColumnDescriptor, ColumnKind, IntWidth, RealWidth};
use std::any::Any;
use std::borrow::Cow;
use std::fmt;

/// A decoded cell
pub enum Value<'a, C: TextChar = u8> {
    Raw(&'a [C]),
    Owned(String),
    /// Already narrowed to the declared width
    Unsigned(u64),
    /// Already narrowed to the declared width
    Signed(i64),
    Real(f64),
    Custom(Box<dyn Any + Send>),
    Ignored,
}

impl<C: TextChar> Value<'_, C> {
    pub fn kind_name(&self) -> &'static str {
        match self {
            Value::Raw(_) => "raw string",
            Value::Owned(_) => "string",
            Value::Unsigned(_) => "unsigned integer",
            Value::Signed(_) => "signed integer",
            Value::Real(_) => "real",
            Value::Custom(_) => "custom",
            Value::Ignored => "ignored",
        }
    }
}

impl<C: TextChar> fmt::Debug for Value<'_, C> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Raw(span) => f.debug_tuple("Raw").field(span).finish(),
            Value::Owned(s) => f.debug_tuple("Owned").field(s).finish(),
            Value::Unsigned(v) => f.debug_tuple("Unsigned").field(v).finish(),
            Value::Signed(v) => f.debug_tuple("Signed").field(v).finish(),
            Value::Real(v) => f.debug_tuple("Real").field(v).finish(),
            Value::Custom(_) => f.write_str("Custom(..)"),
            Value::Ignored => f.write_str("Ignored"),
        }
    }
}

/// Custom values never compare equal; they are opaque.
impl<C: TextChar> PartialEq for Value<'_, C> {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Value::Raw(a), Value::Raw(b)) => a == b,
            (Value::Owned(a), Value::Owned(b)) => a == b,
            (Value::Unsigned(a), Value::Unsigned(b)) => a == b,
            (Value::Signed(a), Value::Signed(b)) => a == b,
            (Value::Real(a), Value::Real(b)) => a == b,
            (Value::Ignored, Value::Ignored) => true,
            _ => false,
        }
    }
}

// ============================================================================
// Integers
// ============================================================================

fn unsigned_target(width: IntWidth) -> &'static str {
    match width {
        IntWidth::W8 => "u8",
        IntWidth::W16 => "u16",
        IntWidth::W32 => "u32",
        IntWidth::W64 => "u64",
    }
}

fn signed_target(width: IntWidth) -> &'static str {
    match width {
        IntWidth::W8 => "i8",
        IntWidth::W16 => "i16",
        IntWidth::W32 => "i32",
        IntWidth::W64 => "i64",
    }
}

/// Accumulate leading decimal digits. Stops at the first non-digit; an
/// empty or non-numeric span is 0. Returns `None` on accumulator overflow
/// when `checked`, wraps otherwise.
#[inline]
fn accumulate<C: TextChar>(digits: &[C], checked: bool) -> Option<u64> {
    let mut result: u64 = 0;
    for &c in digits {
        let Some(d) = c.digit() else { break };
        result = if checked {
            result.checked_mul(10)?.checked_add(d as u64)?
        } else {
            result.wrapping_mul(10).wrapping_add(d as u64)
        };
    }
    Some(result)
}

/// Decode an unsigned integer of `width` bits.
///
/// Without range checking the value is truncated to the width, matching a
/// plain narrowing cast.
pub fn parse_unsigned<C: TextChar>(
    span: &[C],
    width: IntWidth,
    range_check: bool,
    at: Position,
) -> Result<u64> {
    let overflow = || TableError::NumericOverflow {
        at,
        target: unsigned_target(width),
    };
    let value = accumulate(span, range_check).ok_or_else(overflow)?;
    let bits = width.bits();
    if bits == 64 {
        return Ok(value);
    }
    let max = (1u64 << bits) - 1;
    if value > max {
        if range_check {
            return Err(overflow());
        }
        return Ok(value & max);
    }
    Ok(value)
}

/// Decode a signed integer of `width` bits with an optional `+`/`-` sign.
pub fn parse_signed<C: TextChar>(
    span: &[C],
    width: IntWidth,
    range_check: bool,
    at: Position,
) -> Result<i64> {
    let overflow = || TableError::NumericOverflow {
        at,
        target: signed_target(width),
    };
    let (negative, digits) = match span.first() {
        Some(&c) if c.eq_ascii(b'-') => (true, &span[1..]),
        Some(&c) if c.eq_ascii(b'+') => (false, &span[1..]),
        _ => (false, span),
    };
    let magnitude = accumulate(digits, range_check).ok_or_else(overflow)?;
    let bits = width.bits();

    if range_check {
        // |MIN| is one more than MAX
        let limit = 1u64 << (bits - 1);
        if negative {
            if magnitude > limit {
                return Err(overflow());
            }
            return Ok((magnitude as i64).wrapping_neg());
        }
        if magnitude >= limit {
            return Err(overflow());
        }
        return Ok(magnitude as i64);
    }

    let value = if negative {
        (magnitude as i64).wrapping_neg()
    } else {
        magnitude as i64
    };
    // Sign-extend from the declared width
    let shift = 64 - bits;
    Ok((value << shift) >> shift)
}

// ============================================================================
// Reals
// ============================================================================

fn is_infinity_literal(text: &str) -> bool {
    let t = text.trim_start_matches(['+', '-']);
    t.eq_ignore_ascii_case("inf") || t.eq_ignore_ascii_case("infinity")
}

#[inline]
fn is_sign<C: TextChar>(c: &C) -> bool {
    c.eq_ascii(b'+') || c.eq_ascii(b'-')
}

fn starts_with_word<C: TextChar>(span: &[C], word: &[u8]) -> bool {
    span.len() >= word.len()
        && span
            .iter()
            .zip(word)
            .all(|(&c, &w)| c.eq_ascii(w) || c.eq_ascii(w.to_ascii_uppercase()))
}

/// Length of the longest prefix of `span` that reads as a real number:
/// sign, digits, fraction and exponent, or an `inf`/`infinity`/`nan` word.
/// 0 when no prefix does.
fn real_prefix_len<C: TextChar>(span: &[C]) -> usize {
    let digits_from = |from: usize| {
        span.get(from..)
            .map_or(0, |rest| rest.iter().take_while(|c| c.digit().is_some()).count())
    };

    let mut n = usize::from(span.first().is_some_and(is_sign));
    for word in [&b"infinity"[..], b"inf", b"nan"] {
        if starts_with_word(&span[n..], word) {
            return n + word.len();
        }
    }

    let int = digits_from(n);
    n += int;
    let mut frac = 0;
    if span.get(n).is_some_and(|c| c.eq_ascii(b'.')) {
        frac = digits_from(n + 1);
        if int + frac > 0 {
            n += 1 + frac;
        }
    }
    if int + frac == 0 {
        return 0;
    }

    // An exponent only counts when it has digits: "2.5e" reads as 2.5
    if span.get(n).is_some_and(|c| c.eq_ascii(b'e') || c.eq_ascii(b'E')) {
        let mut e = n + 1;
        if span.get(e).is_some_and(is_sign) {
            e += 1;
        }
        let exp = digits_from(e);
        if exp > 0 {
            n = e + exp;
        }
    }
    n
}

/// Decode the longest real-number prefix of the cell with the standard
/// library's float parser. Trailing text is ignored.
pub fn parse_real<C: TextChar>(span: &[C], width: RealWidth, at: Position) -> Result<f64> {
    let len = real_prefix_len(span);
    if len == 0 {
        return Err(TableError::InvalidNumber { at });
    }
    let text = C::to_text(&span[..len]).ok_or(TableError::InvalidNumber { at })?;
    let value = match width {
        RealWidth::F32 => text.parse::<f32>().map(f64::from),
        RealWidth::F64 => text.parse::<f64>(),
    }
    .map_err(|_| TableError::InvalidNumber { at })?;
    if value.is_infinite() && !is_infinity_literal(&text) {
        return Err(TableError::NumberOutOfRange { at });
    }
    Ok(value)
}

// ============================================================================
// Dispatch
// ============================================================================

/// Decode one cell for `column`. `at` is only used for error reporting.
pub fn decode<'a, C: TextChar>(
    column: &ColumnDescriptor<C>,
    cell: Cell<'a, C>,
    dialect: &Dialect<C>,
    at: Position,
) -> Result<Value<'a, C>> {
    Ok(match &column.kind {
        ColumnKind::RawString => Value::Raw(cell.span),
        ColumnKind::OwnedString => {
            let text = cell.text(dialect);
            match C::to_text(&text) {
                Some(s) => Value::Owned(s.into_owned()),
                None => return Err(TableError::InvalidText { at }),
            }
        }
        ColumnKind::Unsigned(width) => {
            Value::Unsigned(parse_unsigned(cell.span, *width, column.range_check, at)?)
        }
        ColumnKind::Signed(width) => {
            Value::Signed(parse_signed(cell.span, *width, column.range_check, at)?)
        }
        ColumnKind::Real(width) => Value::Real(parse_real(cell.span, *width, at)?),
        ColumnKind::Custom(converter) => Value::Custom(converter.from_cell(&cell.text(dialect))?),
        ColumnKind::Ignored => Value::Ignored,
    })
}

// ============================================================================
// Typed extraction
// ============================================================================

/// Conversion from a decoded value into a record field type
pub trait FromValue<'a, C: TextChar = u8>: Sized {
    fn from_value(value: Value<'a, C>) -> Result<Self>;
}

fn mismatch<T>(expected: &'static str, value: &Value<'_, impl TextChar>) -> Result<T> {
    Err(TableError::TypeMismatch {
        expected,
        found: value.kind_name(),
    })
}

impl<'a, C: TextChar> FromValue<'a, C> for Value<'a, C> {
    fn from_value(value: Value<'a, C>) -> Result<Self> {
        Ok(value)
    }
}

impl<'a, C: TextChar> FromValue<'a, C> for &'a [C] {
    fn from_value(value: Value<'a, C>) -> Result<Self> {
        match value {
            Value::Raw(span) => Ok(span),
            other => mismatch("raw string", &other),
        }
    }
}

/// Zero-copy text from a narrow buffer; the span must be valid UTF-8.
impl<'a> FromValue<'a, u8> for &'a str {
    fn from_value(value: Value<'a, u8>) -> Result<Self> {
        match value {
            Value::Raw(span) => std::str::from_utf8(span).map_err(|_| TableError::TypeMismatch {
                expected: "UTF-8 text",
                found: "invalid UTF-8",
            }),
            other => mismatch("raw string", &other),
        }
    }
}

impl<'a, C: TextChar> FromValue<'a, C> for Cow<'a, str> {
    fn from_value(value: Value<'a, C>) -> Result<Self> {
        match value {
            Value::Owned(s) => Ok(Cow::Owned(s)),
            Value::Raw(span) => match C::to_text(span) {
                Some(text) => Ok(text),
                None => Err(TableError::TypeMismatch {
                    expected: "text",
                    found: "invalid text",
                }),
            },
            other => mismatch("string", &other),
        }
    }
}

impl<'a, C: TextChar> FromValue<'a, C> for String {
    fn from_value(value: Value<'a, C>) -> Result<Self> {
        Cow::<'a, str>::from_value(value).map(Cow::into_owned)
    }
}

macro_rules! from_integer_value {
    ($variant:ident, $expected:literal: $($t:ty),*) => {
        $(
            impl<'a, C: TextChar> FromValue<'a, C> for $t {
                fn from_value(value: Value<'a, C>) -> Result<Self> {
                    match value {
                        Value::$variant(v) => <$t>::try_from(v).map_err(|_| {
                            TableError::TypeMismatch {
                                expected: stringify!($t),
                                found: "a wider declared column",
                            }
                        }),
                        other => mismatch($expected, &other),
                    }
                }
            }
        )*
    };
}

from_integer_value!(Unsigned, "unsigned integer": u8, u16, u32, u64, usize);
from_integer_value!(Signed, "signed integer": i8, i16, i32, i64, isize);

impl<'a, C: TextChar> FromValue<'a, C> for f64 {
    fn from_value(value: Value<'a, C>) -> Result<Self> {
        match value {
            Value::Real(v) => Ok(v),
            other => mismatch("real", &other),
        }
    }
}

impl<'a, C: TextChar> FromValue<'a, C> for f32 {
    fn from_value(value: Value<'a, C>) -> Result<Self> {
        match value {
            Value::Real(v) => Ok(v as f32),
            other => mismatch("real", &other),
        }
    }
}

impl<'a, C: TextChar> FromValue<'a, C> for () {
    fn from_value(_value: Value<'a, C>) -> Result<Self> {
        Ok(())
    }
}

/// Field produced by a custom converter
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct Custom<T>(pub T);

impl<'a, C: TextChar, T: Any> FromValue<'a, C> for Custom<T> {
    fn from_value(value: Value<'a, C>) -> Result<Self> {
        match value {
            Value::Custom(boxed) => match (boxed as Box<dyn Any>).downcast::<T>() {
                Ok(v) => Ok(Custom(*v)),
                Err(_) => Err(TableError::TypeMismatch {
                    expected: std::any::type_name::<T>(),
                    found: "another custom type",
                }),
            },
            other => mismatch("custom", &other),
        }
    }
}
