// Character abstraction: narrow (UTF-8 byte) and wide (UTF-16 unit) buffers.

use std::borrow::Cow;
use std::fmt::Debug;

/// A code unit a table buffer can be made of.
///
/// Structural characters are ASCII, so every implementation can express them
/// as a single unit.
pub trait TextChar: Copy + Eq + Debug + Send + Sync + 'static {
    const COMMA: Self;
    const QUOTE: Self;
    const BACKSLASH: Self;
    const NEWLINE: Self;

    /// Value of an ASCII decimal digit, or `None`
    fn digit(self) -> Option<u8>;

    /// Unicode whitespace, newline included. Callers that must stop at the
    /// row terminator check for it first.
    fn is_whitespace(self) -> bool;

    /// Interpret a span as text. `None` when the span is not valid in the
    /// buffer's encoding.
    fn to_text(span: &[Self]) -> Option<Cow<'_, str>>;

    /// True when the unit is exactly the ASCII byte `b`
    fn eq_ascii(self, b: u8) -> bool;
}

impl TextChar for u8 {
    const COMMA: u8 = b',';
    const QUOTE: u8 = b'"';
    const BACKSLASH: u8 = b'\\';
    const NEWLINE: u8 = b'\n';

    #[inline]
    fn digit(self) -> Option<u8> {
        let d = self.wrapping_sub(b'0');
        (d < 10).then_some(d)
    }

    #[inline]
    fn is_whitespace(self) -> bool {
        matches!(self, b' ' | b'\t' | b'\r' | b'\n' | 0x0B | 0x0C)
    }

    #[inline]
    fn to_text(span: &[u8]) -> Option<Cow<'_, str>> {
        std::str::from_utf8(span).ok().map(Cow::Borrowed)
    }

    #[inline]
    fn eq_ascii(self, b: u8) -> bool {
        self == b
    }
}

impl TextChar for u16 {
    const COMMA: u16 = b',' as u16;
    const QUOTE: u16 = b'"' as u16;
    const BACKSLASH: u16 = b'\\' as u16;
    const NEWLINE: u16 = b'\n' as u16;

    #[inline]
    fn digit(self) -> Option<u8> {
        let d = self.wrapping_sub(b'0' as u16);
        (d < 10).then_some(d as u8)
    }

    #[inline]
    fn is_whitespace(self) -> bool {
        char::from_u32(self as u32).is_some_and(char::is_whitespace)
    }

    fn to_text(span: &[u16]) -> Option<Cow<'_, str>> {
        String::from_utf16(span).ok().map(Cow::Owned)
    }

    #[inline]
    fn eq_ascii(self, b: u8) -> bool {
        self == b as u16
    }
}

/// Encode a `&str` as wide units. Handy for building `u16` buffers.
pub fn wide(text: &str) -> Vec<u16> {
    text.encode_utf16().collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_digits() {
        assert_eq!(b'7'.digit(), Some(7));
        assert_eq!(b'a'.digit(), None);
        assert_eq!(b'/'.digit(), None);
        assert_eq!((b'0' as u16).digit(), Some(0));
        assert_eq!(0x0660u16.digit(), None); // Arabic-Indic zero is not ASCII
    }

    #[test]
    fn test_whitespace() {
        assert!(b' '.is_whitespace());
        assert!(!b'x'.is_whitespace());
        assert!(0x3000u16.is_whitespace()); // ideographic space
        assert!(!0xD800u16.is_whitespace()); // lone surrogate
    }

    #[test]
    fn test_to_text() {
        assert_eq!(u8::to_text(b"abc").as_deref(), Some("abc"));
        assert!(u8::to_text(&[0xff, 0xfe]).is_none());
        assert_eq!(u16::to_text(&wide("héllo")).as_deref(), Some("héllo"));
        assert!(u16::to_text(&[0xD800]).is_none());
    }
}
