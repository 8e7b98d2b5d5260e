//! Readers that append matching input to a caller-owned buffer.
//!
//! The buffer is appended to, never cleared, so one allocation can collect a
//! token that spans several calls. Each reader returns how much it appended.

use bstr::ByteSlice;

use crate::{Source, SourceError, discard, rune};

/// Appends bytes up to, not including, the first `b1`.
pub fn any_except1(src: &mut Source<'_>, space: &mut Vec<u8>, b1: u8) -> usize {
    until(src, space, |window| window.find_byte(b1))
}

/// Appends bytes up to, not including, the first `b1` or `b2`.
pub fn any_except2(src: &mut Source<'_>, space: &mut Vec<u8>, b1: u8, b2: u8) -> usize {
    until(src, space, |window| window.find_byteset([b1, b2]))
}

fn until(
    src: &mut Source<'_>,
    space: &mut Vec<u8>,
    find: impl Fn(&[u8]) -> Option<usize>,
) -> usize {
    let mut count = 0;
    while src.error().is_none() {
        let window = src.peek();
        let stop = find(window);
        let take = stop.unwrap_or(window.len());
        space.extend_from_slice(&window[..take]);
        count += take;
        if stop.is_some() {
            src.consume_n(take);
            break;
        }
        src.consume();
    }
    count
}

/// Appends the UTF-8 bytes of code points while `oracle` holds.
pub fn unicode_range(
    src: &mut Source<'_>,
    space: &mut Vec<u8>,
    oracle: impl Fn(char) -> bool,
) -> usize {
    let mut count = 0;
    while src.error().is_none() {
        let utf8 = src.peek_utf8();
        let (ch, len) = rune::decode(utf8);
        if len == 0 || !oracle(ch) {
            break;
        }
        space.extend_from_slice(&utf8[..len]);
        src.consume_n(len);
        count += len;
    }
    count
}

/// Appends code points that match none of `excludes` and, unless `includes`
/// is empty, at least one of `includes`. Returns the number of code points
/// appended.
pub fn unicode_ranges(
    src: &mut Source<'_>,
    space: &mut Vec<char>,
    includes: &[&dyn Fn(char) -> bool],
    excludes: &[&dyn Fn(char) -> bool],
) -> usize {
    let mut count = 0;
    while src.error().is_none() {
        let (ch, len) = src.peek_rune();
        if len == 0 || !discard::accepts(includes, excludes, ch) {
            break;
        }
        src.consume_n(len);
        space.push(ch);
        count += 1;
    }
    count
}

/// Reads an unsigned decimal integer.
///
/// Reports a syntax error and returns `0` if no digit is present or the value
/// does not fit in a `u64`. Digits consumed before an overflow stay consumed.
pub fn uint64(src: &mut Source<'_>) -> u64 {
    let mut value = 0_u64;
    let mut digits = 0;
    while src.error().is_none() {
        let window = src.peek();
        let run = window
            .find_not_byteset(b"0123456789")
            .unwrap_or(window.len());
        let more = run == window.len();
        let mut next = Some(value);
        for &b in &window[..run] {
            next = next
                .and_then(|v| v.checked_mul(10))
                .and_then(|v| v.checked_add(u64::from(b - b'0')));
        }
        let Some(next) = next else {
            src.report_error(SourceError::syntax("uint64 overflow"));
            return 0;
        };
        value = next;
        digits += run;
        src.consume_n(run);
        if !more {
            break;
        }
    }
    if digits == 0 {
        src.report_error(SourceError::syntax("expect digit"));
        return 0;
    }
    value
}

#[cfg(test)]
mod tests {
    use rstest::rstest;

    use super::*;

    #[rstest]
    #[case::first_chunk("ab,cd", b"ab", b",c")]
    #[case::later_chunk("abcde,", b"abcde", b",")]
    #[case::immediately(",ab", b"", b",a")]
    fn any_except1_stops_before_the_byte(
        #[case] input: &'static str,
        #[case] read: &[u8],
        #[case] window: &[u8],
    ) {
        let mut src = Source::from_reader(input.as_bytes(), 2).unwrap();
        let mut space = Vec::new();
        assert_eq!(any_except1(&mut src, &mut space, b','), read.len());
        assert_eq!(space, read);
        assert_eq!(src.peek(), window);
    }

    #[test]
    fn any_except_runs_to_the_end() {
        let mut src = Source::from_reader(&b"abcde"[..], 2).unwrap();
        let mut space = b">".to_vec();
        assert_eq!(any_except2(&mut src, &mut space, b',', b';'), 5);
        assert_eq!(space, b">abcde");
        assert_eq!(src.error(), Some(&SourceError::EndOfInput));
    }

    #[test]
    fn any_except2_stops_at_either_byte() {
        let mut src = Source::try_from("ab;cd,").unwrap();
        let mut space = Vec::new();
        any_except2(&mut src, &mut space, b',', b';');
        assert_eq!(space, b"ab");
        assert_eq!(src.peek1(), b';');
    }

    #[test]
    fn unicode_range_copies_raw_bytes() {
        let mut src = Source::from_reader("中文c,".as_bytes(), 1).unwrap();
        let mut space = Vec::new();
        assert_eq!(unicode_range(&mut src, &mut space, |ch| !ch.is_ascii()), 6);
        assert_eq!(space, "中文".as_bytes());
        assert_eq!(src.peek1(), b'c');
    }

    #[test]
    fn unicode_ranges_collects_identifier() {
        let mut src = Source::try_from("ab中文c,").unwrap();
        let mut id = Vec::new();
        let punctuation = |ch: char| ch.is_ascii_punctuation();
        let excludes: [&dyn Fn(char) -> bool; 2] = [&punctuation, &char::is_whitespace];
        let count = unicode_ranges(&mut src, &mut id, &[], &excludes);
        assert_eq!(count, 5);
        assert_eq!(id.iter().collect::<String>(), "ab中文c");
        assert_eq!(src.peek(), b",");
    }

    #[rstest]
    #[case("1", 1)]
    #[case("12", 12)]
    #[case("123", 123)]
    #[case("1234", 1234)]
    #[case("12345", 12345)]
    fn uint64_from_string_and_stream(#[case] input: &'static str, #[case] expected: u64) {
        let mut src = Source::try_from(input).unwrap();
        assert_eq!(uint64(&mut src), expected);

        let mut src = Source::from_reader(input.as_bytes(), 2).unwrap();
        assert_eq!(uint64(&mut src), expected);
        assert_eq!(src.error(), Some(&SourceError::EndOfInput));
    }

    #[test]
    fn uint64_overflow() {
        let mut src = Source::try_from("18446744073709551615").unwrap();
        assert_eq!(uint64(&mut src), u64::MAX);
        assert_eq!(src.error(), Some(&SourceError::EndOfInput));

        let mut src = Source::try_from("18446744073709551616").unwrap();
        assert_eq!(uint64(&mut src), 0);
        assert!(src.fatal_error().is_some());
    }

    #[test]
    fn uint64_stops_at_non_digit() {
        let mut src = Source::from_reader(&b"42x"[..], 1).unwrap();
        assert_eq!(uint64(&mut src), 42);
        assert_eq!(src.peek(), b"x");
        assert_eq!(src.error(), None);

        let mut src = Source::try_from("x").unwrap();
        assert_eq!(uint64(&mut src), 0);
        assert_eq!(src.error(), Some(&SourceError::syntax("expect digit")));
    }
}
