// Leading-zero-bit counting, the difficulty predicate, per-object and
// cumulative work accounting, and human-readable work formatting. The
// cumulative-work walk is iterative and memoizes per-digest work for the
// duration of one call so a shared ancestor is only priced once.

use crate::error::PowError;
use crate::hash::Digest;
use std::collections::HashMap;

/// Hard floor applied to every policy-derived difficulty value.
pub const MIN_DIFFICULTY: u32 = 20;
/// `1 << MIN_DIFFICULTY`.
pub const MIN_WORK: u64 = 1 << MIN_DIFFICULTY;

/// Count leading zero bits in a digest's byte representation.
pub fn leading_zero_bits_bytes(digest: &Digest) -> u32 {
    let mut bits = 0u32;
    for &b in digest.as_bytes() {
        if b == 0 {
            bits += 8;
            continue;
        }
        bits += b.leading_zeros();
        break;
    }
    bits
}

/// Count leading zero bits by walking the hex nibble representation.
/// Equivalent to [`leading_zero_bits_bytes`]; kept as an independent
/// implementation so the two can be cross-checked in tests.
pub fn leading_zero_bits_hex(hex: &str) -> u32 {
    let mut bits = 0u32;
    for c in hex.chars() {
        match c.to_ascii_lowercase() {
            '0' => bits += 4,
            '1' => {
                bits += 3;
                break;
            }
            '2' | '3' => {
                bits += 2;
                break;
            }
            '4'..='7' => {
                bits += 1;
                break;
            }
            _ => break,
        }
    }
    bits
}

pub fn leading_zero_bits(digest: &Digest) -> u32 {
    leading_zero_bits_bytes(digest)
}

/// Does `digest` meet the required number of leading zero bits?
pub fn meets_difficulty(digest: &Digest, required_bits: u32) -> bool {
    leading_zero_bits(digest) >= required_bits
}

/// Per-object work: `1 << leading_zero_bits(digest)`, floored at 1.
pub fn work(digest: &Digest) -> u64 {
    let bits = leading_zero_bits(digest);
    if bits == 0 {
        1
    } else {
        1u64 << bits
    }
}

/// Collaborator surface this module needs from the commit store: given a
/// commit's digest, return its first parent, if any. Only the narrow
/// lookup PoW accounting requires is modeled here; the full object store
/// lives outside this crate's scope.
pub trait CommitLookup {
    /// Returns `Ok(Some(parent))`, `Ok(None)` for a root commit, or
    /// `Err` if `digest` is not a known commit.
    fn first_parent(&self, digest: &Digest) -> Result<Option<Digest>, PowError>;
}

/// Sum `work(digest)` along first-parent ancestry back to a root.
/// Iterative to avoid stack overflow on deep histories; memoizes
/// per-digest work across the call so a shared ancestor is only hashed
/// for work once.
pub fn cumulative_work(
    start: &Digest,
    lookup: &impl CommitLookup,
) -> Result<u64, PowError> {
    let mut memo: HashMap<Digest, u64> = HashMap::new();
    let mut total = 0u64;
    let mut current = *start;

    loop {
        let this_work = *memo
            .entry(current)
            .or_insert_with(|| work(&current));
        total += this_work;

        match lookup.first_parent(&current)? {
            Some(parent) => current = parent,
            None => break,
        }
    }

    Ok(total)
}

/// Format a work value using K/M/B/T suffixes with one decimal place.
pub fn format_work(w: u64) -> String {
    const K: f64 = 1_000.0;
    const M: f64 = 1_000_000.0;
    const B: f64 = 1_000_000_000.0;
    const T: f64 = 1_000_000_000_000.0;

    if w < 1_000 {
        w.to_string()
    } else if w < 1_000_000 {
        format!("{:.1}K", w as f64 / K)
    } else if w < 1_000_000_000 {
        format!("{:.1}M", w as f64 / M)
    } else if w < 1_000_000_000_000 {
        format!("{:.1}B", w as f64 / B)
    } else {
        format!("{:.1}T", w as f64 / T)
    }
}
