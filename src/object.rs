// Commit and tag templates, and the canonical byte serialization used both
// to hash candidate objects and to write the winning object to storage.
// The nonce insertion point is tracked as an explicit offset so the mining
// engine can rewrite only the nonce span between mining attempts.

use crate::error::PowError;
use crate::hash::Digest;

/// Which kind of object is being mined. Trees and blobs exist in the
/// larger system but never participate in proof-of-work mining.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ObjectKind {
    Commit,
    Tag,
}

/// Literal message prefix applied for non-NORMAL commits.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum CommitKind {
    #[default]
    Normal,
    Freeze,
    Clean,
}

impl CommitKind {
    fn prefix(self) -> &'static str {
        match self {
            CommitKind::Normal => "",
            CommitKind::Freeze => "[FREEZE] ",
            CommitKind::Clean => "[CLEAN] ",
        }
    }
}

/// Input to commit mining. Caller-owned, consumed once per mine.
#[derive(Debug, Clone)]
pub struct CommitTemplate {
    pub tree: Digest,
    pub parent: Option<Digest>,
    pub author: String,
    pub committer: String,
    pub message: String,
    pub kind: CommitKind,
}

/// Input to tag mining. `tag_category` of `None` or `Some("normal")` omits
/// the `tagtype` header; any other value emits it.
#[derive(Debug, Clone)]
pub struct TagTemplate {
    pub target: Digest,
    pub target_type: String,
    pub tag_name: String,
    pub tagger: Option<String>,
    pub message: String,
    pub tag_category: Option<String>,
}

fn reject_newline(field: &str, value: &str) -> Result<(), PowError> {
    if value.contains('\n') {
        return Err(PowError::MalformedTemplate {
            reason: format!("field '{field}' may not contain a newline"),
        });
    }
    Ok(())
}

impl CommitTemplate {
    fn validate(&self) -> Result<(), PowError> {
        reject_newline("author", &self.author)?;
        reject_newline("committer", &self.committer)?;
        Ok(())
    }
}

impl TagTemplate {
    fn validate(&self) -> Result<(), PowError> {
        reject_newline("target_type", &self.target_type)?;
        reject_newline("tag_name", &self.tag_name)?;
        if let Some(ref tagger) = self.tagger {
            reject_newline("tagger", tagger)?;
        }
        Ok(())
    }
}

/// A fully laid-out object ready for mining: bytes with nonce = 0, plus the
/// byte offsets the engine needs to rewrite the nonce span per attempt.
///
/// `nonce_offset` is the position immediately after `PoW-Nonce: `.
/// `suffix_offset` is the position of the `\n` that begins the line
/// following the nonce (commit) or the end of the buffer (tag, which has
/// no trailing data after the nonce).
pub struct SerializedObject {
    pub kind: ObjectKind,
    pub bytes: Vec<u8>,
    pub nonce_offset: usize,
    pub suffix_offset: usize,
}

const NONCE_PLACEHOLDER: &[u8] = b"0";

/// Serialize a commit template with nonce 0 and the given difficulty /
/// parent cumulative work. The nonce is rewritten by the mining engine at
/// `nonce_offset` on each attempt.
pub fn serialize_commit(
    template: &CommitTemplate,
    difficulty: u32,
    parent_cumulative_work: u64,
) -> Result<SerializedObject, PowError> {
    template.validate()?;

    let mut bytes = Vec::with_capacity(256 + template.message.len());
    bytes.extend_from_slice(format!("tree {}\n", template.tree.to_hex()).as_bytes());
    if let Some(parent) = template.parent {
        bytes.extend_from_slice(format!("parent {}\n", parent.to_hex()).as_bytes());
    }
    bytes.extend_from_slice(format!("author {}\n", template.author).as_bytes());
    bytes.extend_from_slice(format!("committer {}\n", template.committer).as_bytes());
    bytes.push(b'\n');
    bytes.extend_from_slice(template.kind.prefix().as_bytes());
    bytes.extend_from_slice(template.message.as_bytes());
    bytes.extend_from_slice(b"\n\nPoW-Nonce: ");

    let nonce_offset = bytes.len();
    bytes.extend_from_slice(NONCE_PLACEHOLDER);
    let suffix_offset = bytes.len();
    bytes.extend_from_slice(
        format!("\nPoW-Difficulty: {difficulty}\nPoW-Parent-Work: {parent_cumulative_work}")
            .as_bytes(),
    );

    Ok(SerializedObject {
        kind: ObjectKind::Commit,
        bytes,
        nonce_offset,
        suffix_offset,
    })
}

/// Serialize a tag template with nonce 0 and the given difficulty. Tags
/// carry no `PoW-Parent-Work` field; cumulative work for a tag is simply
/// its own work (tags have no ancestry).
pub fn serialize_tag(template: &TagTemplate) -> Result<SerializedObject, PowError> {
    template.validate()?;

    let mut bytes = Vec::with_capacity(256 + template.message.len());
    bytes.extend_from_slice(format!("object {}\n", template.target.to_hex()).as_bytes());
    bytes.extend_from_slice(format!("type {}\n", template.target_type).as_bytes());
    bytes.extend_from_slice(format!("tag {}\n", template.tag_name).as_bytes());
    if let Some(ref tagger) = template.tagger {
        bytes.extend_from_slice(format!("tagger {tagger}\n").as_bytes());
    }
    if let Some(ref category) = template.tag_category {
        if category != "normal" {
            bytes.extend_from_slice(format!("tagtype {category}\n").as_bytes());
        }
    }
    bytes.push(b'\n');
    bytes.extend_from_slice(template.message.as_bytes());
    bytes.extend_from_slice(b"\n\nPoW-Nonce: ");

    let nonce_offset = bytes.len();
    bytes.extend_from_slice(NONCE_PLACEHOLDER);
    let suffix_offset = bytes.len();

    Ok(SerializedObject {
        kind: ObjectKind::Tag,
        bytes,
        nonce_offset,
        suffix_offset,
    })
}

impl SerializedObject {
    /// Rebuild the final bytes with `nonce` written in decimal ASCII at
    /// `nonce_offset`, keeping the invariant prefix and suffix untouched.
    pub fn with_nonce(&self, nonce: u64) -> Vec<u8> {
        let mut out = Vec::with_capacity(self.bytes.len() + 20);
        out.extend_from_slice(&self.bytes[..self.nonce_offset]);
        out.extend_from_slice(nonce.to_string().as_bytes());
        out.extend_from_slice(&self.bytes[self.suffix_offset..]);
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_commit() -> CommitTemplate {
        CommitTemplate {
            tree: crate::hash::EMPTY_TREE_DIGEST,
            parent: None,
            author: "A <a@example.com> 0 +0000".to_string(),
            committer: "A <a@example.com> 0 +0000".to_string(),
            message: "hello".to_string(),
            kind: CommitKind::Normal,
        }
    }

    #[test]
    fn commit_layout_matches_spec() {
        let template = sample_commit();
        let obj = serialize_commit(&template, 20, 0).unwrap();
        let text = String::from_utf8(obj.with_nonce(42)).unwrap();
        assert!(text.starts_with(&format!("tree {}\n", template.tree.to_hex())));
        assert!(text.contains("author A <a@example.com> 0 +0000\n"));
        assert!(text.contains("\n\nPoW-Nonce: 42\nPoW-Difficulty: 20\nPoW-Parent-Work: 0"));
        assert!(!text.ends_with('\n'));
    }

    #[test]
    fn commit_kind_prefix_applied() {
        let mut template = sample_commit();
        template.kind = CommitKind::Freeze;
        let obj = serialize_commit(&template, 20, 0).unwrap();
        let text = String::from_utf8(obj.with_nonce(0)).unwrap();
        assert!(text.contains("\n\n[FREEZE] hello\n\nPoW-Nonce:"));
    }

    #[test]
    fn commit_rejects_newline_in_author() {
        let mut template = sample_commit();
        template.author = "A\n <a@example.com>".to_string();
        assert!(serialize_commit(&template, 20, 0).is_err());
    }

    #[test]
    fn tag_with_category_header() {
        let template = TagTemplate {
            target: crate::hash::EMPTY_BLOB_DIGEST,
            target_type: "commit".to_string(),
            tag_name: "v1.0".to_string(),
            tagger: Some("A <a@example.com> 0 +0000".to_string()),
            message: "release".to_string(),
            tag_category: Some("release".to_string()),
        };
        let obj = serialize_tag(&template).unwrap();
        let text = String::from_utf8(obj.with_nonce(7)).unwrap();
        assert!(text.contains("tagtype release\n"));
        assert!(text.ends_with("PoW-Nonce: 7"));
    }

    #[test]
    fn tag_normal_category_omits_header() {
        let template = TagTemplate {
            target: crate::hash::EMPTY_BLOB_DIGEST,
            target_type: "commit".to_string(),
            tag_name: "v1.0".to_string(),
            tagger: None,
            message: "release".to_string(),
            tag_category: Some("normal".to_string()),
        };
        let obj = serialize_tag(&template).unwrap();
        let text = String::from_utf8(obj.with_nonce(0)).unwrap();
        assert!(!text.contains("tagtype"));
    }

    #[test]
    fn with_nonce_equals_direct_hash_for_any_nonce() {
        let template = sample_commit();
        let obj = serialize_commit(&template, 20, 0).unwrap();
        for nonce in [0u64, 1, 99, 123456, u64::MAX] {
            let bytes = obj.with_nonce(nonce);
            let digest_direct = crate::hash::oneshot(&bytes);

            let mut ctx = crate::hash::HashCtx::new();
            ctx.update(&obj.bytes[..obj.nonce_offset]);
            ctx.update(nonce.to_string().as_bytes());
            ctx.update(&obj.bytes[obj.suffix_offset..]);
            let digest_incremental = ctx.finalize();

            assert_eq!(digest_direct, digest_incremental);
        }
    }
}
