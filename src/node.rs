//! The persistent MST node (spec.md §4.4-§4.8). Every mutating method
//! returns a new [`Node`]; the receiver, and every node reachable through
//! it, stays valid and usable after the call.

use crate::block_map::BlockMap;
use crate::cid_set::CidSet;
use crate::codec;
use crate::error::MstError;
use crate::ipld;
use crate::key;
use crate::storage::BlockStore;
use anyhow::{anyhow, Result};
use async_recursion::async_recursion;
use async_stream::try_stream;
use cid::Cid;
use futures::Stream;
use std::collections::BTreeMap;
use std::fmt;
use std::sync::Arc;
use tokio::sync::RwLock;
use tracing::{instrument, trace};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Leaf {
    pub key: String,
    pub value: Cid,
}

/// One slot in a node's entry sequence: either a leaf or a pointer to a
/// subtree covering the key range between its neighboring leaves.
#[derive(Clone)]
pub enum NodeEntry {
    Leaf(Leaf),
    Node(Node),
}

impl NodeEntry {
    pub fn is_leaf(&self) -> bool {
        matches!(self, NodeEntry::Leaf(_))
    }

    pub fn is_tree(&self) -> bool {
        matches!(self, NodeEntry::Node(_))
    }

    pub async fn get_layer(&self) -> Result<u32> {
        match self {
            NodeEntry::Leaf(_) => Err(anyhow!("leaves have no layer of their own")),
            NodeEntry::Node(n) => n.get_layer().await,
        }
    }
}

impl fmt::Debug for NodeEntry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            NodeEntry::Leaf(l) => f.debug_tuple("Leaf").field(&l.key).finish(),
            NodeEntry::Node(n) => f.debug_tuple("Node").field(&n.pointer_hint()).finish(),
        }
    }
}

/// A node in the tree. Cheap to clone: every field is behind an `Arc`, so
/// clones share hydration state and pointer cache with the original.
#[derive(Clone)]
pub struct Node {
    entries: Arc<RwLock<Option<Vec<NodeEntry>>>>,
    layer: Arc<RwLock<Option<u32>>>,
    pointer: Arc<RwLock<Cid>>,
    outdated: Arc<RwLock<bool>>,
    store: Arc<dyn BlockStore>,
}

impl Node {
    /// Builds a node from already-known entries. The pointer is computed
    /// lazily on first [`Node::get_pointer`] call.
    pub fn create(store: Arc<dyn BlockStore>, entries: Vec<NodeEntry>, layer: Option<u32>) -> Self {
        let layer = layer.or_else(|| codec::layer_for_entries(&entries));
        Self {
            entries: Arc::new(RwLock::new(Some(entries))),
            layer: Arc::new(RwLock::new(layer)),
            pointer: Arc::new(RwLock::new(Cid::default())),
            outdated: Arc::new(RwLock::new(true)),
            store,
        }
    }

    /// Builds an unhydrated handle over a block already known to exist at
    /// `pointer`. Entries are fetched from the store on first access.
    pub fn load(store: Arc<dyn BlockStore>, pointer: Cid, layer: Option<u32>) -> Self {
        Self {
            entries: Arc::new(RwLock::new(None)),
            layer: Arc::new(RwLock::new(layer)),
            pointer: Arc::new(RwLock::new(pointer)),
            outdated: Arc::new(RwLock::new(false)),
            store,
        }
    }

    pub fn empty_root(store: Arc<dyn BlockStore>) -> Self {
        Self::create(store, vec![], Some(0))
    }

    fn pointer_hint(&self) -> String {
        self.pointer
            .try_read()
            .map(|p| p.to_string())
            .unwrap_or_else(|_| "<locked>".to_string())
    }

    async fn hydrate(&self) -> Result<()> {
        if self.entries.read().await.is_some() {
            return Ok(());
        }
        let pointer = *self.pointer.read().await;
        let bytes = self
            .store
            .get(&pointer)
            .await?
            .ok_or(MstError::MissingBlock(pointer))?;
        let data: codec::NodeData = codec::cbor_decode_node_data(&bytes, pointer)?;
        let layer = *self.layer.read().await;
        let entries = codec::deserialize_node_data(self.store.clone(), &data, layer, pointer)?;
        if layer.is_none() {
            *self.layer.write().await = codec::layer_for_entries(&entries);
        }
        *self.entries.write().await = Some(entries);
        Ok(())
    }

    pub async fn get_entries(&self) -> Result<Vec<NodeEntry>> {
        self.hydrate().await?;
        Ok(self.entries.read().await.clone().expect("hydrated above"))
    }

    #[instrument(skip(self), level = "trace")]
    pub async fn get_layer(&self) -> Result<u32> {
        if let Some(l) = *self.layer.read().await {
            return Ok(l);
        }
        self.hydrate().await?;
        Ok(self.layer.read().await.unwrap_or(0))
    }

    /// Computes this node's own canonical block (CID and bytes) without
    /// persisting it. Resolves any outdated subtree pointers along the
    /// way by calling [`Node::get_pointer`] on them, which does persist —
    /// a node's own bytes can't be addressed until its children's CIDs
    /// are known.
    pub async fn serialize(&self) -> Result<(Cid, Vec<u8>)> {
        let entries = self.get_entries().await?;
        let data = serialize_entries(&entries).await?;
        let bytes = ipld::struct_to_cbor(&data)?;
        let cid = ipld::cid_for_bytes(&bytes);
        Ok((cid, bytes))
    }

    /// Resolves this node's CID, serializing and persisting it (and any
    /// outdated descendants, bottom-up) if it hasn't been yet.
    #[async_recursion(Sync)]
    pub async fn get_pointer(&self) -> Result<Cid> {
        if !*self.outdated.read().await {
            return Ok(*self.pointer.read().await);
        }
        let (cid, bytes) = self.serialize().await?;
        self.store.put(cid, bytes).await?;
        *self.pointer.write().await = cid;
        *self.outdated.write().await = false;
        trace!(%cid, "persisted node");
        Ok(cid)
    }

    /// Every block reachable from this node that the store doesn't already
    /// have, without writing any of them. Used by callers who want to batch
    /// a whole tree's worth of new blocks into one store transaction.
    #[async_recursion(Sync)]
    pub async fn unstored_blocks(&self) -> Result<BlockMap> {
        let mut blocks = BlockMap::new();
        if !*self.outdated.read().await {
            return Ok(blocks);
        }
        let entries = self.get_entries().await?;
        for entry in &entries {
            if let NodeEntry::Node(child) = entry {
                blocks.extend(child.unstored_blocks().await?)?;
            }
        }
        let data = serialize_entries(&entries).await?;
        let bytes = ipld::struct_to_cbor(&data)?;
        let cid = ipld::cid_for_bytes(&bytes);
        blocks.set(cid, bytes)?;
        Ok(blocks)
    }

    #[async_recursion(Sync)]
    pub async fn get(&self, key: &str) -> Result<Option<Cid>> {
        let index = self.find_gt_or_equal_leaf_index(key).await?;
        let entries = self.get_entries().await?;
        if let Some(NodeEntry::Leaf(l)) = entries.get(index) {
            if l.key == key {
                return Ok(Some(l.value));
            }
        }
        if index == 0 {
            return Ok(None);
        }
        match entries.get(index - 1) {
            Some(NodeEntry::Node(n)) => n.get(key).await,
            _ => Ok(None),
        }
    }

    /// Inserts `key` -> `value`. Errors if `key` already exists; callers
    /// wanting upsert semantics should call [`Node::update`] instead after
    /// checking presence, matching spec.md's distinct add/update ops.
    #[async_recursion(Sync)]
    pub async fn add(&self, key: &str, value: Cid, known_layer: Option<u32>) -> Result<Self> {
        key::validate_key(key)?;
        let key_layer = known_layer.unwrap_or_else(|| key::layer(key));
        let layer = self.get_layer().await?;

        if key_layer == layer {
            let index = self.find_gt_or_equal_leaf_index(key).await?;
            let entries = self.get_entries().await?;
            if let Some(NodeEntry::Leaf(l)) = entries.get(index) {
                if l.key == key {
                    return Err(anyhow!("key `{key}` already exists"));
                }
            }
            let (left, right) = self.split_around(key).await?;
            let mut new = match left {
                Some(l) => l,
                None => Node::create(self.store.clone(), vec![], Some(layer)),
            };
            new = new.append(NodeEntry::Leaf(Leaf { key: key.to_string(), value })).await?;
            if let Some(r) = right {
                new = new.append_merge(r).await?;
            }
            return Ok(new);
        }

        if key_layer < layer {
            let index = self.find_gt_or_equal_leaf_index(key).await?;
            let entries = self.get_entries().await?;
            let prev = if index == 0 { None } else { entries.get(index - 1) };
            return match prev {
                Some(NodeEntry::Node(child)) => {
                    let updated = child.add(key, value, Some(key_layer)).await?;
                    self.update_entry(index - 1, NodeEntry::Node(updated)).await
                }
                _ => {
                    let child = self.create_child().await?.add(key, value, Some(key_layer)).await?;
                    self.splice_in(NodeEntry::Node(child), index).await
                }
            };
        }

        // key_layer > layer: the new key belongs above every layer this
        // node currently spans. Split around it, then wrap each half in
        // single-child parents one layer at a time until both sides reach
        // key_layer - 1, the layer directly below the new root.
        let (mut left, mut right) = self.split_around(key).await?;
        for _ in 1..(key_layer - layer) {
            if let Some(l) = left {
                left = Some(l.create_parent().await?);
            }
            if let Some(r) = right {
                right = Some(r.create_parent().await?);
            }
        }
        let mut entries = Vec::new();
        if let Some(l) = left {
            entries.push(NodeEntry::Node(l));
        }
        entries.push(NodeEntry::Leaf(Leaf { key: key.to_string(), value }));
        if let Some(r) = right {
            entries.push(NodeEntry::Node(r));
        }
        Ok(Node::create(self.store.clone(), entries, Some(key_layer)))
    }

    /// Wraps `self` as the sole child of a new node one layer up. Used
    /// when an inserted key's layer is more than one layer above an
    /// existing subtree's.
    async fn create_parent(&self) -> Result<Self> {
        let layer = self.get_layer().await?;
        Ok(Node::create(self.store.clone(), vec![NodeEntry::Node(self.clone())], Some(layer + 1)))
    }

    /// An empty node one layer below `self`, ready to receive a single
    /// key whose layer falls strictly between `self`'s and the next
    /// existing subtree down.
    async fn create_child(&self) -> Result<Self> {
        let layer = self.get_layer().await?;
        Ok(Node::create(self.store.clone(), vec![], Some(layer.saturating_sub(1))))
    }

    pub async fn update(&self, key: &str, value: Cid) -> Result<Self> {
        let index = self.find_gt_or_equal_leaf_index(key).await?;
        let entries = self.get_entries().await?;
        match entries.get(index) {
            Some(NodeEntry::Leaf(l)) if l.key == key => {
                self.update_entry(index, NodeEntry::Leaf(Leaf { key: key.to_string(), value })).await
            }
            _ => {
                if index == 0 {
                    return Err(anyhow!("key `{key}` not found"));
                }
                match entries.get(index - 1) {
                    Some(NodeEntry::Node(child)) => {
                        let updated = child.update(key, value).await?;
                        self.update_entry(index - 1, NodeEntry::Node(updated)).await
                    }
                    _ => Err(anyhow!("key `{key}` not found")),
                }
            }
        }
    }

    pub async fn delete(&self, key: &str) -> Result<Self> {
        let deleted = self.delete_recurse(key).await?;
        deleted.trim_top().await
    }

    #[async_recursion(Sync)]
    async fn delete_recurse(&self, key: &str) -> Result<Self> {
        let index = self.find_gt_or_equal_leaf_index(key).await?;
        let entries = self.get_entries().await?;
        if let Some(NodeEntry::Leaf(l)) = entries.get(index) {
            if l.key == key {
                let prev = if index == 0 { None } else { entries.get(index - 1).cloned() };
                let next = entries.get(index + 1).cloned();
                return match (prev, next) {
                    (Some(NodeEntry::Node(l)), Some(NodeEntry::Node(r))) => {
                        let merged = l.append_merge(r).await?;
                        let mut new = entries[..index - 1].to_vec();
                        new.push(NodeEntry::Node(merged));
                        new.extend(entries[index + 2..].to_vec());
                        Ok(Node::create(self.store.clone(), new, Some(self.get_layer().await?)))
                    }
                    _ => self.remove_entry(index).await,
                };
            }
        }
        if index == 0 {
            return Err(anyhow!("key `{key}` not found"));
        }
        match entries.get(index - 1) {
            Some(NodeEntry::Node(child)) => {
                let updated = child.delete_recurse(key).await?;
                self.update_entry(index - 1, NodeEntry::Node(updated)).await
            }
            _ => Err(anyhow!("key `{key}` not found")),
        }
    }

    async fn update_entry(&self, index: usize, entry: NodeEntry) -> Result<Self> {
        let mut entries = self.get_entries().await?;
        entries[index] = entry;
        Ok(Node::create(self.store.clone(), entries, Some(self.get_layer().await?)))
    }

    async fn remove_entry(&self, index: usize) -> Result<Self> {
        let mut entries = self.get_entries().await?;
        entries.remove(index);
        Ok(Node::create(self.store.clone(), entries, Some(self.get_layer().await?)))
    }

    async fn splice_in(&self, entry: NodeEntry, index: usize) -> Result<Self> {
        let mut entries = self.get_entries().await?;
        entries.insert(index, entry);
        Ok(Node::create(self.store.clone(), entries, Some(self.get_layer().await?)))
    }

    async fn append(&self, entry: NodeEntry) -> Result<Self> {
        let mut entries = self.get_entries().await?;
        entries.push(entry);
        Ok(Node::create(self.store.clone(), entries, Some(self.get_layer().await?)))
    }

    /// Joins two nodes at the same layer into one, concatenating their
    /// entries. Errors if the layers disagree — callers only merge
    /// siblings produced by the same split.
    #[async_recursion(Sync)]
    async fn append_merge(&self, other: Node) -> Result<Self> {
        let my_layer = self.get_layer().await?;
        let other_layer = other.get_layer().await?;
        if my_layer != other_layer {
            return Err(anyhow!(
                "cannot merge nodes at different layers ({my_layer} vs {other_layer})"
            ));
        }
        let mut entries = self.get_entries().await?;
        let other_entries = other.get_entries().await?;
        match (entries.last().cloned(), other_entries.first().cloned()) {
            (Some(NodeEntry::Node(l)), Some(NodeEntry::Node(r))) => {
                entries.pop();
                let merged = l.append_merge(r).await?;
                entries.push(NodeEntry::Node(merged));
                entries.extend(other_entries[1..].to_vec());
            }
            _ => entries.extend(other_entries),
        }
        Ok(Node::create(self.store.clone(), entries, Some(my_layer)))
    }

    /// Splits this subtree so that every leaf less than `key` ends up in
    /// the left result and every leaf greater ends up in the right,
    /// neither result containing `key` itself.
    #[async_recursion(Sync)]
    async fn split_around(&self, key: &str) -> Result<(Option<Node>, Option<Node>)> {
        let index = self.find_gt_or_equal_leaf_index(key).await?;
        let entries = self.get_entries().await?;
        let mut left_entries = entries[..index].to_vec();
        let mut right_entries = entries[index..].to_vec();

        // The entry just left of the split may itself be a subtree whose
        // range straddles `key`; split it too and donate its right half to
        // the right-hand result as a leading subtree pointer.
        if let Some(NodeEntry::Node(n)) = left_entries.last().cloned() {
            left_entries.pop();
            let (l, r) = n.split_around(key).await?;
            if let Some(l) = l {
                left_entries.push(NodeEntry::Node(l));
            }
            if let Some(r) = r {
                right_entries.insert(0, NodeEntry::Node(r));
            }
        }

        let layer = Some(self.get_layer().await?);
        let left = if left_entries.is_empty() {
            None
        } else {
            Some(Node::create(self.store.clone(), left_entries, layer))
        };
        let right = if right_entries.is_empty() {
            None
        } else {
            Some(Node::create(self.store.clone(), right_entries, layer))
        };

        Ok((left, right))
    }

    /// Drops empty root layers left behind by deletion, per the
    /// root-only trimming rule: a node with exactly one child subtree and
    /// no leaves of its own is replaced by that subtree.
    #[async_recursion(Sync)]
    pub async fn trim_top(&self) -> Result<Self> {
        let entries = self.get_entries().await?;
        if entries.len() == 1 {
            if let NodeEntry::Node(only) = &entries[0] {
                return only.trim_top().await;
            }
        }
        Ok(self.clone())
    }

    pub async fn at_index(&self, index: usize) -> Result<Option<NodeEntry>> {
        Ok(self.get_entries().await?.get(index).cloned())
    }

    async fn find_gt_or_equal_leaf_index(&self, key: &str) -> Result<usize> {
        let entries = self.get_entries().await?;
        for (i, entry) in entries.iter().enumerate() {
            if let NodeEntry::Leaf(l) = entry {
                if key::compare_keys(&l.key, key) != std::cmp::Ordering::Less {
                    return Ok(i);
                }
            }
        }
        Ok(entries.len())
    }

    /// Depth-first, left-to-right stream of every leaf and subtree pointer
    /// boundary, descending into child nodes as it goes.
    pub fn walk(&self) -> impl Stream<Item = Result<NodeEntry>> + '_ {
        try_stream! {
            let entries = self.get_entries().await?;
            for entry in entries {
                match &entry {
                    NodeEntry::Node(child) => {
                        let inner = child.walk();
                        futures::pin_mut!(inner);
                        while let Some(item) = futures::StreamExt::next(&mut inner).await {
                            yield item?;
                        }
                    }
                    NodeEntry::Leaf(_) => yield entry,
                }
            }
        }
    }

    pub async fn leaves(&self) -> Result<Vec<Leaf>> {
        use futures::StreamExt;
        let stream = self.walk();
        futures::pin_mut!(stream);
        let mut out = Vec::new();
        while let Some(entry) = stream.next().await {
            if let NodeEntry::Leaf(l) = entry? {
                out.push(l);
            }
        }
        Ok(out)
    }

    pub async fn leaf_count(&self) -> Result<usize> {
        Ok(self.leaves().await?.len())
    }

    pub async fn is_empty(&self) -> Result<bool> {
        Ok(self.leaf_count().await? == 0)
    }

    pub async fn to_map(&self) -> Result<BTreeMap<String, Cid>> {
        Ok(self
            .leaves()
            .await?
            .into_iter()
            .map(|l| (l.key, l.value))
            .collect())
    }

    /// Every CID reachable from this node: its own pointer, every subtree
    /// pointer, and every leaf value pointer.
    #[async_recursion(Sync)]
    pub async fn all_cids(&self) -> Result<CidSet> {
        let mut set = CidSet::new();
        set.add(self.get_pointer().await?);
        for entry in self.get_entries().await? {
            match entry {
                NodeEntry::Leaf(l) => set.add(l.value),
                NodeEntry::Node(n) => {
                    let child = n.all_cids().await?;
                    for cid in child.to_list() {
                        set.add(cid);
                    }
                }
            }
        }
        Ok(set)
    }
}

async fn serialize_entries(entries: &[NodeEntry]) -> Result<codec::NodeData> {
    let mut resolved = Vec::with_capacity(entries.len());
    for entry in entries {
        match entry {
            NodeEntry::Leaf(l) => resolved.push(codec::ResolvedEntry::Leaf(l.clone())),
            NodeEntry::Node(n) => resolved.push(codec::ResolvedEntry::Subtree(n.get_pointer().await?)),
        }
    }
    codec::build_node_data(&resolved)
}

impl fmt::Debug for Node {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Node").field("pointer", &self.pointer_hint()).finish()
    }
}

fn short_cid(cid: &Cid) -> String {
    let s = cid.to_string();
    let tail = &s[s.len().saturating_sub(8)..];
    format!("*({tail})")
}

impl fmt::Display for Node {
    /// Renders an indented tree of this node and everything reachable from
    /// it, one line per leaf/subtree, for test failure output and manual
    /// debugging.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fn fmt_node(node: &Node, f: &mut fmt::Formatter<'_>, prefix: &str, is_last: bool) -> fmt::Result {
            let pointer = node.pointer.try_read().map(|p| short_cid(&p)).unwrap_or_else(|_| "<locked>".into());
            writeln!(f, "{prefix}{}── {pointer}", if is_last { "└" } else { "├" })?;

            let child_prefix = format!("{prefix}{}", if is_last { "   " } else { "│  " });
            let entries = match node.entries.try_read() {
                Ok(guard) => guard.clone(),
                Err(_) => None,
            };
            let entries = match entries {
                Some(e) => e,
                None => return writeln!(f, "{child_prefix}(unhydrated)"),
            };

            for (i, entry) in entries.iter().enumerate() {
                let last_child = i == entries.len() - 1;
                match entry {
                    NodeEntry::Leaf(l) => {
                        writeln!(
                            f,
                            "{child_prefix}{}── {} -> {}",
                            if last_child { "└" } else { "├" },
                            l.key,
                            short_cid(&l.value),
                        )?;
                    }
                    NodeEntry::Node(child) => fmt_node(child, f, &child_prefix, last_child)?,
                }
            }
            Ok(())
        }

        fmt_node(self, f, "", true)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::memory::MemoryBlockStore;

    fn store() -> Arc<dyn BlockStore> {
        Arc::new(MemoryBlockStore::new())
    }

    fn cid(seed: &str) -> Cid {
        ipld::cid_for_bytes(seed.as_bytes())
    }

    #[tokio::test]
    async fn empty_root_has_no_leaves() -> Result<()> {
        let root = Node::empty_root(store());
        assert_eq!(root.leaf_count().await?, 0);
        assert!(root.is_empty().await?);
        assert_eq!(root.get_layer().await?, 0);
        Ok(())
    }

    #[tokio::test]
    async fn add_then_get_round_trips() -> Result<()> {
        let root = Node::empty_root(store());
        let value = cid("value");
        let root = root.add("a/1", value, Some(0)).await?;
        assert_eq!(root.get("a/1").await?, Some(value));
        assert_eq!(root.get("a/2").await?, None);
        Ok(())
    }

    #[tokio::test]
    async fn add_duplicate_key_errors() -> Result<()> {
        let root = Node::empty_root(store());
        let root = root.add("a/1", cid("value"), Some(0)).await?;
        assert!(root.add("a/1", cid("other"), Some(0)).await.is_err());
        Ok(())
    }

    #[tokio::test]
    async fn update_missing_key_errors() -> Result<()> {
        let root = Node::empty_root(store());
        assert!(root.update("a/1", cid("value")).await.is_err());
        Ok(())
    }

    #[tokio::test]
    async fn delete_missing_key_errors() -> Result<()> {
        let root = Node::empty_root(store());
        assert!(root.delete("a/1").await.is_err());
        Ok(())
    }

    #[tokio::test]
    async fn split_around_excludes_the_pivot_key() -> Result<()> {
        let root = Node::empty_root(store());
        let mut root = root;
        for key in ["a/1", "a/2", "a/3", "a/4"] {
            root = root.add(key, cid("value"), Some(0)).await?;
        }
        let (left, right) = root.split_around("a/3").await?;
        let left_keys: Vec<_> = left.expect("left half").leaves().await?.into_iter().map(|l| l.key).collect();
        let right_keys: Vec<_> = right.expect("right half").leaves().await?.into_iter().map(|l| l.key).collect();
        assert_eq!(left_keys, vec!["a/1", "a/2"]);
        assert_eq!(right_keys, vec!["a/4"]);
        Ok(())
    }

    #[tokio::test]
    async fn trim_top_collapses_single_child_spine() -> Result<()> {
        let leaf_layer = Node::create(store(), vec![], Some(0));
        let spine = leaf_layer.create_parent().await?;
        assert_eq!(spine.get_layer().await?, 1);
        let trimmed = spine.trim_top().await?;
        assert_eq!(trimmed.get_layer().await?, 0);
        Ok(())
    }

    #[tokio::test]
    async fn get_pointer_is_stable_across_calls() -> Result<()> {
        let root = Node::empty_root(store());
        let root = root.add("a/1", cid("value"), Some(0)).await?;
        let first = root.get_pointer().await?;
        let second = root.get_pointer().await?;
        assert_eq!(first, second);
        Ok(())
    }

    #[tokio::test]
    async fn all_cids_includes_leaf_values_and_own_pointer() -> Result<()> {
        let value = cid("value");
        let root = Node::empty_root(store());
        let root = root.add("a/1", value, Some(0)).await?;
        let pointer = root.get_pointer().await?;
        let cids = root.all_cids().await?;
        assert!(cids.has(pointer));
        assert!(cids.has(value));
        Ok(())
    }
}
