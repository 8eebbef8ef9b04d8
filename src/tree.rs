//! The mutable façade over a current root node (spec.md §6). `Mst` is a
//! thin, cheaply-cloneable handle: every mutation returns a new root and
//! leaves prior handles (and anything built from them) valid.

use crate::codec;
use crate::diff::{self, TreeDiff};
use crate::ipld;
use crate::key;
use crate::node::Node;
use crate::storage::BlockStore;
use anyhow::Result;
use cid::Cid;
use std::collections::BTreeMap;
use std::sync::Arc;
use tracing::instrument;

/// A handle over one version of a tree. Cloning an `Mst` is cheap and
/// shares the underlying node/pointer cache with the original; it does
/// not share mutations — `add`/`update`/`delete` return a new `Mst`.
#[derive(Clone)]
pub struct Mst {
    root: Node,
}

impl Mst {
    /// A fresh, empty tree backed by `store`.
    pub fn create(store: Arc<dyn BlockStore>) -> Self {
        Mst { root: Node::empty_root(store) }
    }

    /// A handle over a tree already known to exist at `root` in `store`.
    pub fn load(store: Arc<dyn BlockStore>, root: Cid) -> Self {
        Mst { root: Node::load(store, root, None) }
    }

    /// Builds a tree from `entries`, inserted one at a time in the given
    /// order. Order does not affect the resulting tree shape or CID
    /// (spec.md §8, P1) — this is plain sequential construction, not a
    /// bulk-optimized bottom-up build.
    pub async fn from_entries(store: Arc<dyn BlockStore>, entries: Vec<(String, Cid)>) -> Result<Self> {
        let mut mst = Self::create(store);
        for (key, value) in entries {
            mst = mst.add(&key, value).await?;
        }
        Ok(mst)
    }

    #[instrument(skip(self, value))]
    pub async fn add(&self, key: &str, value: Cid) -> Result<Self> {
        key::validate_key(key)?;
        let new_root = self.root.add(key, value, None).await?;
        Ok(Mst { root: new_root })
    }

    pub async fn update(&self, key: &str, value: Cid) -> Result<Self> {
        key::validate_key(key)?;
        let new_root = self.root.update(key, value).await?;
        Ok(Mst { root: new_root })
    }

    #[instrument(skip(self))]
    pub async fn delete(&self, key: &str) -> Result<Self> {
        let new_root = self.root.delete(key).await?;
        Ok(Mst { root: new_root })
    }

    pub async fn get(&self, key: &str) -> Result<Option<Cid>> {
        self.root.get(key).await
    }

    pub async fn has(&self, key: &str) -> Result<bool> {
        Ok(self.get(key).await?.is_some())
    }

    /// Resolves and persists the root's CID, writing any outdated nodes
    /// bottom-up.
    pub async fn get_pointer(&self) -> Result<Cid> {
        self.root.get_pointer().await
    }

    pub async fn is_empty(&self) -> Result<bool> {
        self.root.is_empty().await
    }

    pub async fn get_layer(&self) -> Result<u32> {
        self.root.get_layer().await
    }

    pub async fn count(&self) -> Result<usize> {
        self.root.leaf_count().await
    }

    pub async fn keys(&self) -> Result<Vec<String>> {
        Ok(self.root.leaves().await?.into_iter().map(|l| l.key).collect())
    }

    pub async fn values(&self) -> Result<Vec<Cid>> {
        Ok(self.root.leaves().await?.into_iter().map(|l| l.value).collect())
    }

    pub async fn entries(&self) -> Result<Vec<(String, Cid)>> {
        Ok(self.root.leaves().await?.into_iter().map(|l| (l.key, l.value)).collect())
    }

    pub async fn to_map(&self) -> Result<BTreeMap<String, Cid>> {
        self.root.to_map().await
    }

    /// Diffs `self` against `prior`. When `prior` is `None`, every entry
    /// of `self` is reported as added.
    pub async fn diff(&self, prior: Option<&Mst>) -> Result<TreeDiff> {
        diff::diff(&self.root, prior.map(|p| &p.root)).await
    }

    /// Root CID of an empty tree, matching the root's own (empty) CBOR
    /// encoding — exposed so callers can sanity-check a store against the
    /// canonical constant without constructing a tree.
    pub fn empty_root_cid() -> Result<Cid> {
        let data = codec::NodeData { l: None, e: Vec::new() };
        let bytes = ipld::struct_to_cbor(&data)?;
        Ok(ipld::cid_for_bytes(&bytes))
    }
}

impl std::fmt::Debug for Mst {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Mst").field("root", &self.root).finish()
    }
}

impl std::fmt::Display for Mst {
    /// An indented tree of every leaf and subtree reachable from the
    /// current root, for test failure output and manual debugging.
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.root)
    }
}

// Re-exported so callers constructing leaves for bulk import don't need to
// reach into `crate::node`.
pub use crate::node::Leaf as TreeLeaf;
