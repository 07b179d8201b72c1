// The parallel nonce search that turns a commit or tag template into a
// proof-of-work object. Declares the collaborator traits the engine
// consumes (object storage, parent lookup) and re-exports the public
// mining surface.

pub mod engine;
pub mod worker;

pub use engine::{MiningEngine, PowOutcome};

use crate::error::PowError;
use crate::object::ObjectKind;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

/// Narrow store surface the mining engine needs: persist the winning
/// object's exact bytes and hand back the digest storage assigned it.
/// The general object store (opening/writing loose objects in the wider
/// system) lives outside this crate.
pub trait ObjectStore {
    fn write_object(&self, kind: ObjectKind, bytes: &[u8]) -> Result<(), PowError>;
}

/// A cooperative cancellation flag shared between the caller and every
/// mining worker. Modeled as a first-class token rather than a process
/// signal read directly by the core: the CLI front-end owns signal
/// installation and translates SIGINT into a call to `cancel()`.
#[derive(Clone, Default)]
pub struct CancellationToken(Arc<AtomicBool>);

impl CancellationToken {
    pub fn new() -> Self {
        CancellationToken(Arc::new(AtomicBool::new(false)))
    }

    pub fn cancel(&self) {
        self.0.store(true, Ordering::Release);
    }

    pub fn is_cancelled(&self) -> bool {
        self.0.load(Ordering::Acquire)
    }
}

/// How often (in nonces per worker) the hot loop checks the cancel and
/// found flags.
pub const SAMPLE_INTERVAL: u64 = 100_000;

/// Default worker count when the caller does not override it: at most 4,
/// bounded by the host's available parallelism.
pub fn default_worker_count() -> usize {
    num_cpus::get().min(4).max(1)
}
