// Error kinds raised or propagated by the proof-of-work core.

use crate::hash::Digest;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum PowError {
    #[error("difficulty {requested} bits is outside the allowed range [{min}, {max}]")]
    InvalidDifficulty {
        requested: u32,
        min: u32,
        max: u32,
    },

    #[error("malformed template: {reason}")]
    MalformedTemplate { reason: String },

    #[error("mining cancelled before a valid nonce was found")]
    Cancelled,

    #[error("exhausted the full 64-bit nonce range without finding a valid nonce")]
    Exhausted,

    #[error("store rejected the mined object: {message}")]
    Io { message: String },

    #[error("parent commit {digest} referenced during cumulative-work walk is missing")]
    LookupFailed { digest: Digest },
}
