// git3-pow - proof-of-work subsystem for a SHA3-256 content-addressed VCS.

pub mod difficulty;
pub mod error;
pub mod hash;
pub mod mining;
pub mod object;
pub mod policy;

pub use crate::difficulty::{cumulative_work, meets_difficulty, CommitLookup, MIN_DIFFICULTY};
pub use crate::error::PowError;
pub use crate::hash::{Digest, HashCtx};
pub use crate::mining::{CancellationToken, MiningEngine, ObjectStore, PowOutcome};
pub use crate::object::{CommitKind, CommitTemplate, ObjectKind, TagTemplate};
pub use crate::policy::{ConfigStore, CurrentBranch, PolicyAdmin, PolicyResolver};

pub type Result<T> = std::result::Result<T, PowError>;
