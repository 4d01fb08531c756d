//! Balanced `{{ ... }}` delimiter scanning.
//!
//! The scanner is string-literal aware: doubled braces inside `"..."`,
//! `'...'` or `` `...` `` never count toward nesting, and a backslash inside
//! a literal skips the following character whichever quote opened it.
//!
//! Doubled braces outside a literal always nest, even when they were not
//! meant as markers. `{{ a {{ b }}` therefore has no match: the inner `{{`
//! raises the depth and the lone `}}` only brings it back to one.

/// Opening marker.
pub const OPEN: &str = "{{";
/// Closing marker.
pub const CLOSE: &str = "}}";

/// Find the `}}` matching an already-consumed `{{`.
///
/// `start` is the byte offset just past the opening marker. Returns the byte
/// offset of the first `}` of the matching close, or `None` when the text
/// ends first.
pub fn find_matching_close(text: &str, start: usize) -> Option<usize> {
    let bytes = text.as_bytes();
    let mut depth = 1usize;
    let mut quote: Option<u8> = None;
    let mut i = start;

    while i < bytes.len() {
        let b = bytes[i];

        if let Some(q) = quote {
            if b == b'\\' && i + 1 < bytes.len() {
                i += 2;
                continue;
            }
            if b == q {
                quote = None;
            }
            i += 1;
            continue;
        }

        match b {
            b'"' | b'\'' | b'`' => {
                quote = Some(b);
                i += 1;
            }
            b'{' if bytes.get(i + 1) == Some(&b'{') => {
                depth += 1;
                i += 2;
            }
            b'}' if bytes.get(i + 1) == Some(&b'}') => {
                depth -= 1;
                if depth == 0 {
                    return Some(i);
                }
                i += 2;
            }
            _ => i += 1,
        }
    }

    None
}
