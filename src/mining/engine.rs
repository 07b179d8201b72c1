// Coordinates a mining call: resolves parent cumulative work, lays out the
// template, partitions the nonce space across a worker pool, and on
// success writes the winning object through the store collaborator.

use crate::difficulty::{self, cumulative_work, CommitLookup, MIN_DIFFICULTY};
use crate::error::PowError;
use crate::hash::{Digest, HashCtx};
use crate::mining::worker::{self, SearchRange};
use crate::mining::{default_worker_count, CancellationToken, ObjectStore};
use crate::object::{self, CommitTemplate, ObjectKind, TagTemplate};
use std::sync::atomic::AtomicBool;
use std::sync::Mutex;

/// Result of a successful mine: the winning nonce, the difficulty that was
/// actually achieved (always >= required), the work it represents, and
/// the cumulative work of the chain it extends.
#[derive(Debug, Clone)]
pub struct PowOutcome {
    pub nonce: u64,
    pub required_difficulty: u32,
    pub achieved_difficulty: u32,
    pub work: u64,
    pub cumulative_work: u64,
    pub digest: Digest,
}

pub struct MiningEngine {
    worker_count: usize,
    verbose: bool,
}

impl MiningEngine {
    pub fn new(worker_count: usize) -> Self {
        MiningEngine {
            worker_count: worker_count.max(1),
            verbose: false,
        }
    }

    pub fn with_default_workers() -> Self {
        Self::new(default_worker_count())
    }

    pub fn with_verbose(mut self, verbose: bool) -> Self {
        self.verbose = verbose;
        self
    }

    /// Mine a commit template at `required_difficulty` (raised to the
    /// floor if lower) and write it through `store` on success.
    pub fn mine_commit(
        &self,
        store: &impl ObjectStore,
        lookup: &impl CommitLookup,
        template: &CommitTemplate,
        required_difficulty: u32,
        cancel: &CancellationToken,
    ) -> Result<PowOutcome, PowError> {
        let required = required_difficulty.max(MIN_DIFFICULTY);

        let parent_cumulative_work = match template.parent {
            Some(parent) => cumulative_work(&parent, lookup)?,
            None => 0,
        };

        let serialized = object::serialize_commit(template, required, parent_cumulative_work)?;
        let (nonce, digest) = self.search(&serialized, required, cancel)?;

        let final_bytes = serialized.with_nonce(nonce);
        store.write_object(ObjectKind::Commit, &final_bytes)?;

        let achieved_difficulty = difficulty::leading_zero_bits(&digest);
        let this_work = difficulty::work(&digest);

        Ok(PowOutcome {
            nonce,
            required_difficulty: required,
            achieved_difficulty,
            work: this_work,
            cumulative_work: parent_cumulative_work + this_work,
            digest,
        })
    }

    /// Mine a tag template at `required_difficulty` (raised to the floor
    /// if lower) and write it through `store` on success. Tags have no
    /// ancestry, so cumulative work is simply the tag's own work.
    pub fn mine_tag(
        &self,
        store: &impl ObjectStore,
        template: &TagTemplate,
        required_difficulty: u32,
        cancel: &CancellationToken,
    ) -> Result<PowOutcome, PowError> {
        let required = required_difficulty.max(MIN_DIFFICULTY);

        let serialized = object::serialize_tag(template)?;
        let (nonce, digest) = self.search(&serialized, required, cancel)?;

        let final_bytes = serialized.with_nonce(nonce);
        store.write_object(ObjectKind::Tag, &final_bytes)?;

        let achieved_difficulty = difficulty::leading_zero_bits(&digest);
        let this_work = difficulty::work(&digest);

        Ok(PowOutcome {
            nonce,
            required_difficulty: required,
            achieved_difficulty,
            work: this_work,
            cumulative_work: this_work,
            digest,
        })
    }

    /// Partition the 64-bit nonce space into contiguous, equal-sized
    /// ranges (the last absorbs any remainder) and search them in
    /// parallel until one worker claims a valid nonce, the caller
    /// cancels, or the space is exhausted.
    fn search(
        &self,
        serialized: &object::SerializedObject,
        required_difficulty: u32,
        cancel: &CancellationToken,
    ) -> Result<(u64, Digest), PowError> {
        let mut base_ctx = HashCtx::new();
        base_ctx.update(&serialized.bytes[..serialized.nonce_offset]);
        let suffix = &serialized.bytes[serialized.suffix_offset..];

        let found = AtomicBool::new(false);
        let result: Mutex<Option<(u64, Digest)>> = Mutex::new(None);
        let verbose = self.verbose;

        let worker_count = self.worker_count as u64;
        let chunk = (u64::MAX / worker_count).max(1);

        std::thread::scope(|scope| {
            for worker_id in 0..self.worker_count {
                let start = chunk.saturating_mul(worker_id as u64);
                let end = if worker_id as u64 + 1 == worker_count {
                    u64::MAX
                } else {
                    start.saturating_add(chunk).saturating_sub(1)
                };

                let base_ctx_ref = &base_ctx;
                let found_ref = &found;
                let result_ref = &result;

                scope.spawn(move || {
                    worker::search_range(
                        base_ctx_ref,
                        suffix,
                        SearchRange { start, end },
                        required_difficulty,
                        found_ref,
                        cancel,
                        result_ref,
                        verbose,
                        worker_id,
                    );
                });
            }
        });

        let claimed = result.into_inner().unwrap();
        match claimed {
            Some(hit) => Ok(hit),
            None if cancel.is_cancelled() => Err(PowError::Cancelled),
            None => Err(PowError::Exhausted),
        }
    }
}
