//! Generated record identifiers.
//!
//! Generated IDs are the base-36 spelling (`0-9a-z`) of a counter. The
//! allocator probes `0, 1, 2, ...` and hands out the first spelling nobody
//! uses, so short IDs are reused once their records are deleted.

use std::collections::HashSet;

const DIGITS: &[u8; 36] = b"0123456789abcdefghijklmnopqrstuvwxyz";

/// Spells `n` in lower-case base 36.
#[must_use]
pub fn encode_base36(mut n: u64) -> String {
    if n == 0 {
        return "0".to_string();
    }
    let mut digits = Vec::new();
    while n > 0 {
        digits.push(DIGITS[(n % 36) as usize]);
        n /= 36;
    }
    digits.reverse();
    String::from_utf8(digits).unwrap_or_default()
}

/// Returns the first base-36 candidate below `bound` not present in `in_use`.
#[must_use]
pub fn first_unused(in_use: &HashSet<String>, bound: u32) -> Option<String> {
    (0..u64::from(bound))
        .map(encode_base36)
        .find(|candidate| !in_use.contains(candidate))
}
