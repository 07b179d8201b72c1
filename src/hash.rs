// SHA3-256 primitive used to hash candidate objects and to derive every
// content-addressed identifier in the system.

use sha3::{Digest as _, Sha3_256};
use std::fmt;

/// Block size of the SHA3-256 sponge absorption rate, in bytes.
pub const RATE: usize = 136;
/// Length of a SHA3-256 digest, in bytes.
pub const DIGEST_LEN: usize = 32;
/// Length of a digest's lowercase hex form, in characters.
pub const HEX_LEN: usize = DIGEST_LEN * 2;
/// Domain separation byte appended by FIPS-202 SHA3 before final padding.
pub const DOMAIN_SEPARATOR: u8 = 0x06;

/// A 32-byte SHA3-256 digest. Immutable once constructed, byte-equal.
#[derive(Clone, Copy, PartialEq, Eq, Hash)]
pub struct Digest([u8; DIGEST_LEN]);

impl Digest {
    /// The all-zeros digest.
    pub const NULL: Digest = Digest([0u8; DIGEST_LEN]);

    pub fn from_bytes(bytes: [u8; DIGEST_LEN]) -> Self {
        Digest(bytes)
    }

    pub fn as_bytes(&self) -> &[u8; DIGEST_LEN] {
        &self.0
    }

    /// Lowercase, 64-character hex form with no prefix.
    pub fn to_hex(&self) -> String {
        hex::encode(self.0)
    }

    pub fn from_hex(s: &str) -> Result<Self, hex::FromHexError> {
        let bytes = hex::decode(s)?;
        let arr: [u8; DIGEST_LEN] = bytes
            .try_into()
            .map_err(|_| hex::FromHexError::InvalidStringLength)?;
        Ok(Digest(arr))
    }

    pub fn is_null(&self) -> bool {
        self.0 == [0u8; DIGEST_LEN]
    }
}

impl fmt::Debug for Digest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Digest({})", self.to_hex())
    }
}

impl fmt::Display for Digest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.to_hex())
    }
}

/// Incremental SHA3-256 context. Cheap to clone: the underlying sponge
/// state and buffered tail bytes are copied in full, which is what lets
/// the mining engine precompute a context over an invariant prefix once
/// and clone it per nonce instead of re-absorbing the whole template.
#[derive(Clone)]
pub struct HashCtx(Sha3_256);

impl HashCtx {
    pub fn new() -> Self {
        HashCtx(Sha3_256::new())
    }

    pub fn update(&mut self, bytes: &[u8]) {
        self.0.update(bytes);
    }

    pub fn finalize(self) -> Digest {
        let out = self.0.finalize();
        let mut bytes = [0u8; DIGEST_LEN];
        bytes.copy_from_slice(&out);
        Digest(bytes)
    }
}

impl Default for HashCtx {
    fn default() -> Self {
        Self::new()
    }
}

/// Hash `bytes` in one call.
pub fn oneshot(bytes: &[u8]) -> Digest {
    let mut ctx = HashCtx::new();
    ctx.update(bytes);
    ctx.finalize()
}

/// SHA3-256 of the fixed string `"tree 0\0"`, the canonical empty tree.
pub const EMPTY_TREE_DIGEST: Digest = Digest([
    0x30, 0x21, 0x1e, 0xd4, 0x85, 0xc9, 0x12, 0xe5, 0xbc, 0x28, 0x5b, 0xd0, 0xbd, 0x89, 0x59,
    0xdd, 0xbf, 0xb5, 0x87, 0x5c, 0xaf, 0xb0, 0xae, 0x28, 0xe0, 0xab, 0xfa, 0x10, 0x77, 0xb2,
    0xb2, 0x14,
]);

/// SHA3-256 of the empty string, the canonical empty blob.
pub const EMPTY_BLOB_DIGEST: Digest = Digest([
    0xa7, 0xff, 0xc6, 0xf8, 0xbf, 0x1e, 0xd7, 0x66, 0x51, 0xc1, 0x47, 0x56, 0xa0, 0x61, 0xd6,
    0x62, 0xf5, 0x80, 0xff, 0x4d, 0xe4, 0x3b, 0x49, 0xfa, 0x82, 0xd8, 0x0a, 0x4b, 0x80, 0xf8,
    0x43, 0x4a,
]);

/// Probe for an AVX2-class fast path. The portable RustCrypto `sha3`
/// backend is the only implementation registered today; this seam exists
/// so a future bit-identical AVX2 backend can be swapped in transparently
/// (see DESIGN.md). The result is cached for the life of the process.
pub fn avx2_available() -> bool {
    static PROBE: std::sync::OnceLock<bool> = std::sync::OnceLock::new();
    *PROBE.get_or_init(|| {
        #[cfg(target_arch = "x86_64")]
        {
            is_x86_feature_detected!("avx2")
        }
        #[cfg(not(target_arch = "x86_64"))]
        {
            false
        }
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn oneshot_empty_string() {
        let d = oneshot(b"");
        assert_eq!(
            d.to_hex(),
            "a7ffc6f8bf1ed76651c14756a061d662f580ff4de43b49fa82d80a4b80f8434"
        );
    }

    #[test]
    fn oneshot_abc() {
        let d = oneshot(b"abc");
        assert_eq!(
            d.to_hex(),
            "3a985da74fe225b2045c172d6bd390bd855f086e3e9d525b46bfe24511431532"
        );
    }

    #[test]
    fn hex_round_trip() {
        let d = oneshot(b"round-trip");
        let hex = d.to_hex();
        assert_eq!(hex.len(), HEX_LEN);
        let back = Digest::from_hex(&hex).unwrap();
        assert_eq!(d, back);
    }

    #[test]
    fn clone_matches_full_hash() {
        let prefix = b"invariant prefix bytes";
        let suffix = b" variable suffix";

        let mut prefix_ctx = HashCtx::new();
        prefix_ctx.update(prefix);

        let mut cloned = prefix_ctx.clone();
        cloned.update(suffix);
        let via_clone = cloned.finalize();

        let mut full = Vec::new();
        full.extend_from_slice(prefix);
        full.extend_from_slice(suffix);
        let via_oneshot = oneshot(&full);

        assert_eq!(via_clone, via_oneshot);
    }

    #[test]
    fn null_digest_is_all_zero() {
        assert!(Digest::NULL.is_null());
        assert_eq!(Digest::NULL.to_hex(), "0".repeat(HEX_LEN));
    }
}
