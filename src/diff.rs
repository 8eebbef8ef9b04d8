//! Tree-shaped diff between two trees sharing structure (spec.md §4.9,
//! §6). Descends both trees with a pair of [`MstWalker`] cursors,
//! short-circuiting into a `step_over` whenever both cursors point at
//! subtrees with equal CIDs.

use crate::block_map::BlockMap;
use crate::cid_set::CidSet;
use crate::node::{Node, NodeEntry};
use crate::walker::{MstWalker, WalkerStatus};
use anyhow::{bail, Result};
use cid::Cid;
use std::collections::HashMap;

#[derive(Debug, Clone, PartialEq)]
pub struct KeyAdd {
    pub key: String,
    pub cid: Cid,
}

#[derive(Debug, Clone, PartialEq)]
pub struct KeyUpdate {
    pub key: String,
    pub prev: Cid,
    pub cid: Cid,
}

#[derive(Debug, Clone, PartialEq)]
pub struct KeyDelete {
    pub key: String,
    pub cid: Cid,
}

/// The set-of-changes view of a diff between two trees: which keys were
/// added, updated, or removed, plus the block-level bookkeeping
/// (`new_mst_blocks`/`new_leaf_cids`/`removed_cids`) a caller needs to
/// persist or garbage-collect the result.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct TreeDiff {
    pub adds: HashMap<String, KeyAdd>,
    pub updates: HashMap<String, KeyUpdate>,
    pub deletes: HashMap<String, KeyDelete>,

    pub new_mst_blocks: BlockMap,
    pub new_leaf_cids: CidSet,
    pub removed_cids: CidSet,
}

impl TreeDiff {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn adds(&self) -> Vec<KeyAdd> {
        self.adds.values().cloned().collect()
    }

    pub fn updates(&self) -> Vec<KeyUpdate> {
        self.updates.values().cloned().collect()
    }

    pub fn deletes(&self) -> Vec<KeyDelete> {
        self.deletes.values().cloned().collect()
    }

    /// Every CID newly introduced by the later tree: new leaf values and
    /// new MST blocks.
    pub fn new_cids(&self) -> CidSet {
        let mut set = self.new_leaf_cids.clone();
        for cid in self.new_mst_blocks.entries().map(|(cid, _)| cid) {
            set.add(cid);
        }
        set
    }

    async fn node_add(&mut self, node: NodeEntry) -> Result<()> {
        match node {
            NodeEntry::Leaf(l) => self.leaf_add(l.key, l.value),
            NodeEntry::Node(n) => {
                let (cid, bytes) = n.serialize().await?;
                self.tree_add(cid, bytes);
            }
        }
        Ok(())
    }

    async fn node_delete(&mut self, node: NodeEntry) -> Result<()> {
        match node {
            NodeEntry::Leaf(l) => self.leaf_delete(l.key, l.value),
            NodeEntry::Node(n) => self.tree_delete(n.get_pointer().await?),
        }
        Ok(())
    }

    fn leaf_add(&mut self, key: String, cid: Cid) {
        self.adds.insert(key.clone(), KeyAdd { key, cid });
        if self.removed_cids.has(cid) {
            self.removed_cids.delete(cid);
        } else {
            self.new_leaf_cids.add(cid);
        }
    }

    fn leaf_update(&mut self, key: &str, prev: Cid, cid: Cid) {
        if prev == cid {
            return;
        }
        self.updates.insert(
            key.to_string(),
            KeyUpdate { key: key.to_string(), prev, cid },
        );
        self.removed_cids.add(prev);
        self.new_leaf_cids.add(cid);
    }

    fn leaf_delete(&mut self, key: String, cid: Cid) {
        self.deletes.insert(key.clone(), KeyDelete { key, cid });
        if self.new_leaf_cids.has(cid) {
            self.new_leaf_cids.delete(cid);
        } else {
            self.removed_cids.add(cid);
        }
    }

    fn tree_add(&mut self, cid: Cid, bytes: Vec<u8>) {
        if self.removed_cids.has(cid) {
            self.removed_cids.delete(cid);
        } else {
            let _ = self.new_mst_blocks.set(cid, bytes);
        }
    }

    fn tree_delete(&mut self, cid: Cid) {
        if self.new_mst_blocks.has(cid) {
            self.new_mst_blocks.delete(cid);
        } else {
            self.removed_cids.add(cid);
        }
    }
}

/// A diff that treats every leaf in `tree` as newly added — used when
/// there is no prior version to compare against.
pub async fn null_diff(tree: &Node) -> Result<TreeDiff> {
    use futures::StreamExt;
    let mut diff = TreeDiff::new();
    let stream = tree.walk();
    futures::pin_mut!(stream);
    while let Some(entry) = stream.next().await {
        diff.node_add(entry?).await?;
    }
    Ok(diff)
}

/// Computes the diff from `prev` to `curr`. When `prev` is `None`, every
/// entry in `curr` is reported as added (see [`null_diff`]).
pub async fn diff(curr: &Node, prev: Option<&Node>) -> Result<TreeDiff> {
    curr.get_pointer().await?;
    let prev = match prev {
        Some(p) => p,
        None => return null_diff(curr).await,
    };
    prev.get_pointer().await?;

    let mut out = TreeDiff::new();
    let mut left = MstWalker::new(prev.clone());
    let mut right = MstWalker::new(curr.clone());

    while !left.is_done() || !right.is_done() {
        match (&left.status, &right.status) {
            (WalkerStatus::Done, WalkerStatus::Progress(r)) => {
                out.node_add(r.curr.clone()).await?;
                right.advance().await?;
                continue;
            }
            (WalkerStatus::Progress(l), WalkerStatus::Done) => {
                out.node_delete(l.curr.clone()).await?;
                left.advance().await?;
                continue;
            }
            (WalkerStatus::Done, WalkerStatus::Done) => break,
            (WalkerStatus::Progress(l), WalkerStatus::Progress(r)) => {
                let (l, r) = (l.curr.clone(), r.curr.clone());

                if let (NodeEntry::Leaf(lf), NodeEntry::Leaf(rf)) = (&l, &r) {
                    if lf.key == rf.key {
                        if lf.value != rf.value {
                            out.leaf_update(&lf.key, lf.value, rf.value);
                        }
                        left.advance().await?;
                        right.advance().await?;
                    } else if lf.key < rf.key {
                        out.leaf_delete(lf.key.clone(), lf.value);
                        left.advance().await?;
                    } else {
                        out.leaf_add(rf.key.clone(), rf.value);
                        right.advance().await?;
                    }
                    continue;
                }

                let left_layer = left.layer().await?;
                let right_layer = right.layer().await?;
                if left_layer > right_layer {
                    if l.is_leaf() {
                        out.node_add(r).await?;
                        right.advance().await?;
                    } else {
                        out.node_delete(l).await?;
                        left.step_into().await?;
                    }
                    continue;
                } else if left_layer < right_layer {
                    if r.is_leaf() {
                        out.node_delete(l).await?;
                        left.advance().await?;
                    } else {
                        out.node_add(r).await?;
                        right.step_into().await?;
                    }
                    continue;
                }

                if let (NodeEntry::Node(lt), NodeEntry::Node(rt)) = (&l, &r) {
                    if lt.get_pointer().await? == rt.get_pointer().await? {
                        left.step_over().await?;
                        right.step_over().await?;
                    } else {
                        out.node_add(r).await?;
                        out.node_delete(l).await?;
                        left.step_into().await?;
                        right.step_into().await?;
                    }
                    continue;
                }

                if let (NodeEntry::Leaf(_), NodeEntry::Node(_)) = (&l, &r) {
                    out.node_add(r).await?;
                    right.step_into().await?;
                    continue;
                }
                if let (NodeEntry::Node(_), NodeEntry::Leaf(_)) = (&l, &r) {
                    out.node_delete(l).await?;
                    left.step_into().await?;
                    continue;
                }

                bail!("unreachable diff walk state");
            }
        }
    }

    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ipld;
    use crate::storage::memory::MemoryBlockStore;
    use std::sync::Arc;

    fn store() -> Arc<dyn crate::storage::BlockStore> {
        Arc::new(MemoryBlockStore::new())
    }

    fn cid(seed: &str) -> Cid {
        ipld::cid_for_bytes(seed.as_bytes())
    }

    #[tokio::test]
    async fn null_diff_reports_every_leaf_as_added() -> Result<()> {
        let root = Node::empty_root(store());
        let mut root = root;
        for key in ["a/1", "a/2"] {
            root = root.add(key, cid("v"), Some(0)).await?;
        }
        let d = null_diff(&root).await?;
        assert_eq!(d.adds().len(), 2);
        assert!(d.updates().is_empty());
        assert!(d.deletes().is_empty());
        Ok(())
    }

    #[tokio::test]
    async fn diff_of_identical_trees_is_empty() -> Result<()> {
        let root = Node::empty_root(store());
        let mut root = root;
        for key in ["a/1", "a/2", "a/3"] {
            root = root.add(key, cid("v"), Some(0)).await?;
        }
        let d = diff(&root, Some(&root)).await?;
        assert!(d.adds().is_empty());
        assert!(d.updates().is_empty());
        assert!(d.deletes().is_empty());
        Ok(())
    }

    #[tokio::test]
    async fn diff_detects_add_update_and_delete() -> Result<()> {
        let base = Node::empty_root(store());
        let base = base.add("a/1", cid("v1"), Some(0)).await?;
        let base = base.add("a/2", cid("v1"), Some(0)).await?;

        let next = base.update("a/1", cid("v2")).await?;
        let next = next.add("a/3", cid("v1"), Some(0)).await?;
        let next = next.delete("a/2").await?;

        let d = diff(&next, Some(&base)).await?;
        assert_eq!(d.adds().len(), 1);
        assert_eq!(d.adds()[0].key, "a/3");
        assert_eq!(d.updates().len(), 1);
        assert_eq!(d.updates()[0].key, "a/1");
        assert_eq!(d.deletes().len(), 1);
        assert_eq!(d.deletes()[0].key, "a/2");
        Ok(())
    }

    #[tokio::test]
    async fn diff_short_circuits_on_equal_subtree_cids() -> Result<()> {
        // A layer-2 key forces a_1/a_2 into a shared, untouched subtree;
        // only the added key's own path should contribute new blocks.
        let base = Node::empty_root(store());
        let base = base.add("a/1", cid("v"), Some(0)).await?;
        let base = base.add("a/2", cid("v"), Some(0)).await?;
        base.get_pointer().await?;

        let next = base.add("a/9", cid("v"), Some(2)).await?;
        let d = diff(&next, Some(&base)).await?;
        assert_eq!(d.adds().len(), 1);
        assert_eq!(d.adds()[0].key, "a/9");
        Ok(())
    }

    #[tokio::test]
    async fn applying_a_diff_to_base_reproduces_the_target_root() -> Result<()> {
        let base = Node::empty_root(store());
        let base = base.add("a/1", cid("v1"), Some(0)).await?;
        let base = base.add("a/2", cid("v1"), Some(0)).await?;

        let target = base.update("a/1", cid("v2")).await?;
        let target = target.add("a/3", cid("v1"), Some(0)).await?;
        let target = target.delete("a/2").await?;
        let target_root = target.get_pointer().await?;

        let d = diff(&target, Some(&base)).await?;
        let mut applied = base.clone();
        for add in d.adds() {
            applied = applied.add(&add.key, add.cid, None).await?;
        }
        for update in d.updates() {
            applied = applied.update(&update.key, update.cid).await?;
        }
        for delete in d.deletes() {
            applied = applied.delete(&delete.key).await?;
        }

        assert_eq!(applied.get_pointer().await?, target_root);
        Ok(())
    }
}
