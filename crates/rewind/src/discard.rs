//! Skippers that drop input while it matches a class and report how many
//! bytes they dropped.
//!
//! All of them stop early when the source carries an error, so a skipper
//! that runs into the end of input leaves the benign end-of-input behind.

use bstr::ByteSlice;

use crate::Source;

/// ASCII whitespace: tab, line feed, vertical tab, form feed, carriage return,
/// and space.
pub(crate) const ASCII_SPACE: &[u8] = b"\t\n\x0B\x0C\r ";

/// Skips ASCII whitespace.
pub fn space(src: &mut Source<'_>) -> usize {
    let mut count = 0;
    while src.error().is_none() {
        let window = src.peek();
        match window.find_not_byteset(ASCII_SPACE) {
            Some(i) => {
                src.consume_n(i);
                return count + i;
            }
            None => {
                count += window.len();
                src.consume();
            }
        }
    }
    count
}

/// Skips code points for which [`char::is_whitespace`] holds.
pub fn unicode_space(src: &mut Source<'_>) -> usize {
    unicode_range(src, char::is_whitespace)
}

/// Skips code points while `oracle` holds.
pub fn unicode_range(src: &mut Source<'_>, oracle: impl Fn(char) -> bool) -> usize {
    let mut count = 0;
    while src.error().is_none() {
        let (ch, len) = src.peek_rune();
        if len == 0 || !oracle(ch) {
            break;
        }
        src.consume_n(len);
        count += len;
    }
    count
}

/// Skips code points that match none of `excludes` and, unless `includes` is
/// empty, at least one of `includes`.
pub fn unicode_ranges(
    src: &mut Source<'_>,
    includes: &[&dyn Fn(char) -> bool],
    excludes: &[&dyn Fn(char) -> bool],
) -> usize {
    unicode_range(src, |ch| accepts(includes, excludes, ch))
}

pub(crate) fn accepts(
    includes: &[&dyn Fn(char) -> bool],
    excludes: &[&dyn Fn(char) -> bool],
    ch: char,
) -> bool {
    !excludes.iter().any(|oracle| oracle(ch))
        && (includes.is_empty() || includes.iter().any(|oracle| oracle(ch)))
}
