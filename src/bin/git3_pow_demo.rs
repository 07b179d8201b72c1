// End-to-end demonstration of the mining engine against in-memory
// collaborators: resolves a branch's required difficulty, mines a root
// commit, then mines a child commit on top of it, printing the work
// accounting at each step. Holds a CancellationToken so a long-running
// mine could be interrupted by a front-end that wires up a signal
// handler; none is wired up here since no signal crate is in the
// dependency graph.

use clap::Parser;
use git3_pow::difficulty::{format_work, CommitLookup};
use git3_pow::hash::{Digest, EMPTY_TREE_DIGEST};
use git3_pow::mining::{CancellationToken, MiningEngine, ObjectStore};
use git3_pow::object::{CommitKind, CommitTemplate, ObjectKind};
use git3_pow::policy::{InMemoryConfigStore, PolicyAdmin, PolicyResolver};
use git3_pow::PowError;
use std::collections::HashMap;
use std::sync::Mutex;

#[derive(Parser)]
#[command(name = "git3-pow-demo", about = "Mine a small demo commit chain")]
struct Cli {
    /// Branch name to resolve a difficulty policy for.
    #[arg(long, default_value = "main")]
    branch: String,

    /// Worker thread count; defaults to the host's available parallelism.
    #[arg(long)]
    workers: Option<usize>,
}

/// Keeps mined commits in memory and answers the mining engine's lookups.
#[derive(Default)]
struct MemoryStore {
    parents: Mutex<HashMap<Digest, Option<Digest>>>,
}

impl ObjectStore for MemoryStore {
    fn write_object(&self, _kind: ObjectKind, bytes: &[u8]) -> Result<(), PowError> {
        log::info!("wrote mined object ({} bytes)", bytes.len());
        Ok(())
    }
}

impl CommitLookup for MemoryStore {
    fn first_parent(&self, digest: &Digest) -> Result<Option<Digest>, PowError> {
        self.parents
            .lock()
            .unwrap()
            .get(digest)
            .copied()
            .ok_or(PowError::LookupFailed { digest: *digest })
    }
}

impl MemoryStore {
    fn record(&self, digest: Digest, parent: Option<Digest>) {
        self.parents.lock().unwrap().insert(digest, parent);
    }
}

fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();
    let cli = Cli::parse();

    let mut config = InMemoryConfigStore::new();
    PolicyAdmin::new(&mut config)
        .set_pattern("main", 20)
        .expect("built-in default is in range");
    let required = PolicyResolver::new(&config).required_difficulty_for_branch(&cli.branch);

    let engine = match cli.workers {
        Some(n) => MiningEngine::new(n),
        None => MiningEngine::with_default_workers(),
    }
    .with_verbose(true);

    let cancel = CancellationToken::new();
    let store = MemoryStore::default();

    let root = CommitTemplate {
        tree: EMPTY_TREE_DIGEST,
        parent: None,
        author: "demo <demo@example.com> 0 +0000".to_string(),
        committer: "demo <demo@example.com> 0 +0000".to_string(),
        message: "root commit".to_string(),
        kind: CommitKind::Normal,
    };

    let outcome = engine
        .mine_commit(&store, &store, &root, required, &cancel)
        .expect("root mine failed");
    store.record(outcome.digest, None);
    println!(
        "root   nonce={} difficulty={} work={}",
        outcome.nonce,
        outcome.achieved_difficulty,
        format_work(outcome.work)
    );

    let child = CommitTemplate {
        tree: EMPTY_TREE_DIGEST,
        parent: Some(outcome.digest),
        author: "demo <demo@example.com> 1 +0000".to_string(),
        committer: "demo <demo@example.com> 1 +0000".to_string(),
        message: "child commit".to_string(),
        kind: CommitKind::Normal,
    };

    let child_outcome = engine
        .mine_commit(&store, &store, &child, required, &cancel)
        .expect("child mine failed");
    store.record(child_outcome.digest, Some(outcome.digest));
    println!(
        "child  nonce={} difficulty={} cumulative_work={}",
        child_outcome.nonce,
        child_outcome.achieved_difficulty,
        format_work(child_outcome.cumulative_work)
    );
}
