//! Text-delta codec.
//!
//! `encode`/`decode_apply` are the only two operations the rest of the
//! crate depends on; everything else here is the concrete encoding. The
//! wire format is a tab-separated token stream:
//!
//! - `=N`  retain the next `N` chars of `prev`
//! - `-N`  drop the next `N` chars of `prev`
//! - `+T`  insert literal text `T`, percent-encoded so the delta stays
//!         ASCII and tab/newline-free regardless of `T`'s content
//!
//! This mirrors the delta shape `original_source`'s Go implementation
//! produced with `diffmatchpatch`, but is generated here from
//! [`similar`]'s char-level diff rather than linked against that library.

use percent_encoding::{percent_decode_str, utf8_percent_encode, AsciiSet, CONTROLS};
use similar::{ChangeTag, TextDiff};
use thiserror::Error;

/// Encode set: keep the delta strictly ASCII and free of tabs/newlines so
/// tokenizing on `\t` is never ambiguous.
const DELTA_ENCODE_SET: &AsciiSet = &CONTROLS.add(b'\t').add(b'\n').add(b'\r').add(b'%');

#[derive(Debug, Error, PartialEq, Eq)]
pub enum DeltaError {
    #[error("malformed delta token: {0:?}")]
    Malformed(String),
    #[error("delta consumed {consumed} chars of prev text but prev has {available}")]
    PreconditionMismatch { consumed: usize, available: usize },
}

/// Deterministic, compact textual diff from `prev` to `next`.
pub fn encode(prev: &str, next: &str) -> String {
    let diff = TextDiff::from_chars(prev, next);
    let mut tokens = Vec::new();

    for change in diff.iter_all_changes() {
        match change.tag() {
            ChangeTag::Equal => {
                let n = change.value().chars().count();
                push_retain(&mut tokens, n);
            }
            ChangeTag::Delete => {
                let n = change.value().chars().count();
                push_delete(&mut tokens, n);
            }
            ChangeTag::Insert => {
                tokens.push(format!(
                    "+{}",
                    utf8_percent_encode(change.value(), DELTA_ENCODE_SET)
                ));
            }
        }
    }

    tokens.join("\t")
}

fn push_retain(tokens: &mut Vec<String>, n: usize) {
    if n == 0 {
        return;
    }
    if let Some(last) = tokens.last_mut() {
        if let Some(rest) = last.strip_prefix('=') {
            if let Ok(prev_n) = rest.parse::<usize>() {
                *last = format!("={}", prev_n + n);
                return;
            }
        }
    }
    tokens.push(format!("={n}"));
}

fn push_delete(tokens: &mut Vec<String>, n: usize) {
    if n == 0 {
        return;
    }
    if let Some(last) = tokens.last_mut() {
        if let Some(rest) = last.strip_prefix('-') {
            if let Ok(prev_n) = rest.parse::<usize>() {
                *last = format!("-{}", prev_n + n);
                return;
            }
        }
    }
    tokens.push(format!("-{n}"));
}

/// Reconstruct `next` by applying `delta` to `prev`. Fails if the delta's
/// implicit precondition on `prev` (its total retain+delete count must
/// equal `prev`'s length) is violated — this is how the target dispatcher
/// detects that its cached `prev` has diverged from the source's (§7).
pub fn decode_apply(prev: &str, delta: &str) -> Result<String, DeltaError> {
    let prev_chars: Vec<char> = prev.chars().collect();
    let mut cursor = 0usize;
    let mut out = String::new();

    if delta.is_empty() {
        return if prev_chars.is_empty() {
            Ok(String::new())
        } else {
            Err(DeltaError::PreconditionMismatch {
                consumed: 0,
                available: prev_chars.len(),
            })
        };
    }

    for token in delta.split('\t') {
        if let Some(rest) = token.strip_prefix('=') {
            let n = rest
                .parse::<usize>()
                .map_err(|_| DeltaError::Malformed(token.to_string()))?;
            let end = cursor.checked_add(n).ok_or_else(|| DeltaError::Malformed(token.to_string()))?;
            if end > prev_chars.len() {
                return Err(DeltaError::PreconditionMismatch {
                    consumed: end,
                    available: prev_chars.len(),
                });
            }
            out.extend(&prev_chars[cursor..end]);
            cursor = end;
        } else if let Some(rest) = token.strip_prefix('-') {
            let n = rest
                .parse::<usize>()
                .map_err(|_| DeltaError::Malformed(token.to_string()))?;
            let end = cursor.checked_add(n).ok_or_else(|| DeltaError::Malformed(token.to_string()))?;
            if end > prev_chars.len() {
                return Err(DeltaError::PreconditionMismatch {
                    consumed: end,
                    available: prev_chars.len(),
                });
            }
            cursor = end;
        } else if let Some(rest) = token.strip_prefix('+') {
            let decoded = percent_decode_str(rest)
                .decode_utf8()
                .map_err(|_| DeltaError::Malformed(token.to_string()))?;
            out.push_str(&decoded);
        } else {
            return Err(DeltaError::Malformed(token.to_string()));
        }
    }

    if cursor != prev_chars.len() {
        return Err(DeltaError::PreconditionMismatch {
            consumed: cursor,
            available: prev_chars.len(),
        });
    }

    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn round_trip_simple_edit() {
        let prev = "test 1";
        let next = "test 2\n";
        let delta = encode(prev, next);
        assert_eq!(decode_apply(prev, &delta).unwrap(), next);
    }

    #[test]
    fn round_trip_empty_to_content() {
        let delta = encode("", "hello");
        assert_eq!(decode_apply("", &delta).unwrap(), "hello");
    }

    #[test]
    fn round_trip_content_to_empty() {
        let delta = encode("hello", "");
        assert_eq!(decode_apply("hello", &delta).unwrap(), "");
    }

    #[test]
    fn round_trip_identical_text_is_a_single_retain() {
        let delta = encode("same content", "same content");
        assert_eq!(decode_apply("same content", &delta).unwrap(), "same content");
    }

    #[test]
    fn round_trip_unicode_insert() {
        let delta = encode("caf", "café \t tab");
        assert_eq!(decode_apply("caf", &delta).unwrap(), "café \t tab");
    }

    #[test]
    fn delta_is_ascii_and_has_no_raw_tabs_or_newlines_in_insert_payload() {
        let delta = encode("a", "a\tb\nc");
        // every '+' token's payload must be percent-encoded, so the raw
        // delta string must not contain a literal tab/newline inside it
        // outside of our own '\t' token separators.
        for token in delta.split('\t') {
            assert!(token.is_ascii());
            if let Some(payload) = token.strip_prefix('+') {
                assert!(!payload.contains('\t'));
                assert!(!payload.contains('\n'));
            }
        }
    }

    #[test]
    fn mismatched_prev_is_rejected() {
        let delta = encode("test 1", "test 2");
        let err = decode_apply("different cached text", &delta).unwrap_err();
        assert!(matches!(err, DeltaError::PreconditionMismatch { .. }));
    }

    #[test]
    fn malformed_token_is_rejected() {
        let err = decode_apply("abc", "=nope").unwrap_err();
        assert!(matches!(err, DeltaError::Malformed(_)));
    }

    #[test]
    fn unknown_token_prefix_is_rejected() {
        let err = decode_apply("abc", "?3").unwrap_err();
        assert!(matches!(err, DeltaError::Malformed(_)));
    }

    proptest::proptest! {
        #[test]
        fn round_trip_law_holds_for_arbitrary_text(
            prev in ".{0,64}",
            next in ".{0,64}",
        ) {
            let delta = encode(&prev, &next);
            let applied = decode_apply(&prev, &delta).unwrap();
            proptest::prop_assert_eq!(applied, next);
        }
    }
}
