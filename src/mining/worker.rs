// Per-worker nonce search. Each worker owns a contiguous slice of the
// 64-bit nonce space and, for every candidate, clones a hasher context
// precomputed over the template's invariant prefix instead of re-hashing
// it from scratch. No allocation occurs once the scratch buffer below is
// warmed up.

use crate::difficulty::meets_difficulty;
use crate::hash::{Digest, HashCtx};
use crate::mining::{CancellationToken, SAMPLE_INTERVAL};
use std::fmt::Write as _;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Mutex;

#[derive(Clone, Copy)]
pub struct SearchRange {
    pub start: u64,
    pub end: u64,
}

/// Search `range` (inclusive) for a nonce whose digest meets
/// `required_difficulty`. On a hit, attempts to claim the shared result
/// slot; the first worker to do so wins, and the decision is final even
/// though other workers may also hold valid nonces at that moment — any
/// valid nonce is acceptable, so the winner is non-deterministic across
/// runs.
#[allow(clippy::too_many_arguments)]
pub fn search_range(
    base_ctx: &HashCtx,
    suffix: &[u8],
    range: SearchRange,
    required_difficulty: u32,
    found: &AtomicBool,
    cancel: &CancellationToken,
    result: &Mutex<Option<(u64, Digest)>>,
    verbose: bool,
    worker_id: usize,
) {
    let mut nonce = range.start;
    let mut since_check: u64 = 0;
    let mut scratch = String::with_capacity(20);

    loop {
        if since_check >= SAMPLE_INTERVAL {
            since_check = 0;
            if found.load(Ordering::Acquire) || cancel.is_cancelled() {
                return;
            }
            if verbose {
                log::debug!("worker {worker_id} mining checkpoint at nonce {nonce}");
            }
        }

        scratch.clear();
        let _ = write!(scratch, "{nonce}");

        let mut ctx = base_ctx.clone();
        ctx.update(scratch.as_bytes());
        ctx.update(suffix);
        let digest = ctx.finalize();

        if meets_difficulty(&digest, required_difficulty) && !found.swap(true, Ordering::AcqRel) {
            *result.lock().unwrap() = Some((nonce, digest));
            return;
        }

        if nonce == range.end {
            return;
        }
        nonce += 1;
        since_check += 1;
    }
}
