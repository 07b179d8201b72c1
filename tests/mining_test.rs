// Integration tests for the mining engine against in-memory collaborators.

use git3_pow::difficulty::{meets_difficulty, CommitLookup};
use git3_pow::hash::{Digest, EMPTY_TREE_DIGEST};
use git3_pow::mining::{CancellationToken, MiningEngine, ObjectStore};
use git3_pow::object::{CommitKind, CommitTemplate, ObjectKind, TagTemplate};
use git3_pow::PowError;
use std::collections::HashMap;
use std::sync::Mutex;

#[derive(Default)]
struct RecordingStore {
    written: Mutex<Vec<Vec<u8>>>,
    parents: Mutex<HashMap<Digest, Option<Digest>>>,
}

impl ObjectStore for RecordingStore {
    fn write_object(&self, _kind: ObjectKind, bytes: &[u8]) -> Result<(), PowError> {
        self.written.lock().unwrap().push(bytes.to_vec());
        Ok(())
    }
}

impl CommitLookup for RecordingStore {
    fn first_parent(&self, digest: &Digest) -> Result<Option<Digest>, PowError> {
        self.parents
            .lock()
            .unwrap()
            .get(digest)
            .copied()
            .ok_or(PowError::LookupFailed { digest: *digest })
    }
}

fn root_template() -> CommitTemplate {
    CommitTemplate {
        tree: EMPTY_TREE_DIGEST,
        parent: None,
        author: "t <t@example.com> 0 +0000".to_string(),
        committer: "t <t@example.com> 0 +0000".to_string(),
        message: "root".to_string(),
        kind: CommitKind::Normal,
    }
}

#[test]
fn mines_root_commit_at_floor_difficulty() {
    let store = RecordingStore::default();
    let engine = MiningEngine::new(2);
    let cancel = CancellationToken::new();

    let outcome = engine
        .mine_commit(&store, &store, &root_template(), 20, &cancel)
        .expect("mining at the floor difficulty must succeed quickly");

    assert!(meets_difficulty(&outcome.digest, 20));
    assert_eq!(outcome.required_difficulty, 20);
    assert_eq!(outcome.cumulative_work, outcome.work);
    assert_eq!(store.written.lock().unwrap().len(), 1);
}

#[test]
fn sub_floor_request_is_raised_to_the_floor() {
    let store = RecordingStore::default();
    let engine = MiningEngine::new(2);
    let cancel = CancellationToken::new();

    let outcome = engine
        .mine_commit(&store, &store, &root_template(), 1, &cancel)
        .unwrap();

    assert_eq!(outcome.required_difficulty, 20);
    assert!(outcome.achieved_difficulty >= 20);
}

#[test]
fn cumulative_work_chains_across_parent() {
    let store = RecordingStore::default();
    let engine = MiningEngine::new(2);
    let cancel = CancellationToken::new();

    let root = engine
        .mine_commit(&store, &store, &root_template(), 20, &cancel)
        .unwrap();
    store.parents.lock().unwrap().insert(root.digest, None);

    let mut child_template = root_template();
    child_template.parent = Some(root.digest);
    child_template.message = "child".to_string();

    let child = engine
        .mine_commit(&store, &store, &child_template, 20, &cancel)
        .unwrap();

    assert_eq!(child.cumulative_work, root.work + child.work);
}

#[test]
fn cancelling_before_mining_yields_cancelled_and_no_write() {
    let store = RecordingStore::default();
    let engine = MiningEngine::new(2);
    let cancel = CancellationToken::new();
    cancel.cancel();

    let result = engine.mine_commit(&store, &store, &root_template(), 20, &cancel);

    assert!(matches!(result, Err(PowError::Cancelled)));
    assert!(store.written.lock().unwrap().is_empty());
}

#[test]
fn mines_tag_without_parent_chain() {
    let store = RecordingStore::default();
    let engine = MiningEngine::new(2);
    let cancel = CancellationToken::new();

    let template = TagTemplate {
        target: EMPTY_TREE_DIGEST,
        target_type: "commit".to_string(),
        tag_name: "v1.0".to_string(),
        tagger: Some("t <t@example.com> 0 +0000".to_string()),
        message: "release".to_string(),
        tag_category: Some("release".to_string()),
    };

    let outcome = engine
        .mine_tag(&store, &template, 20, &cancel)
        .expect("tag mining at the floor difficulty must succeed quickly");

    assert_eq!(outcome.cumulative_work, outcome.work);
    assert!(meets_difficulty(&outcome.digest, 20));
}
