//! CRC-64/ECMA content checksums, used only for reconciliation equality
//! checks — never as a content-integrity guarantee.

use std::collections::HashMap;

/// Checksum a piece of text. Matches CRC-64/ECMA of the UTF-8 bytes.
pub fn checksum(text: &str) -> u64 {
    let mut digest = crc64fast::Digest::new();
    digest.write(text.as_bytes());
    digest.sum64()
}

/// Snapshot of a peer's cache: relative path → checksum.
pub type ChecksumIndex = HashMap<String, u64>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn checksum_is_deterministic() {
        assert_eq!(checksum("hello"), checksum("hello"));
    }

    #[test]
    fn checksum_distinguishes_content() {
        assert_ne!(checksum("hello"), checksum("goodbye"));
    }

    #[test]
    fn empty_text_checksum_is_stable() {
        assert_eq!(checksum(""), checksum(""));
    }
}
