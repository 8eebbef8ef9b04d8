//! Canonical block encoding with prefix compression (spec.md §4.3).
//!
//! Each node encodes to a CBOR map with exactly two fields (`l`, `e`); each
//! entry is a CBOR map with four fields (`p`, `k`, `v`, `t`). Field naming
//! and order match the canonical ATProto MST block layout byte-for-byte.

use crate::error::MstError;
use crate::ipld;
use crate::key;
use crate::node::{Leaf, Node, NodeEntry};
use crate::storage::BlockStore;
use anyhow::{anyhow, Result};
use cid::Cid;
use serde::{Deserialize, Serialize};
use std::sync::Arc;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TreeEntry {
    /// Count of leading bytes shared with the previous entry's full key.
    pub p: u64,
    /// The suffix of this entry's key, after the shared prefix.
    #[serde(with = "serde_bytes")]
    pub k: Vec<u8>,
    /// Value pointer.
    pub v: Cid,
    /// Subtree covering keys strictly between this entry's key and the next.
    pub t: Option<Cid>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NodeData {
    /// Subtree covering keys strictly less than the first entry's key.
    pub l: Option<Cid>,
    pub e: Vec<TreeEntry>,
}

/// An entry whose subtree pointer (if any) has already been resolved to a
/// concrete CID, ready for canonical encoding.
#[derive(Debug, Clone)]
pub enum ResolvedEntry {
    Leaf(Leaf),
    Subtree(Cid),
}

/// Turns a node's entry sequence into its canonical wire form. Callers
/// resolve subtree pointers (persisting outdated descendants bottom-up)
/// before calling this; see [`Node::get_pointer`].
pub fn build_node_data(entries: &[ResolvedEntry]) -> Result<NodeData> {
    let mut data = NodeData { l: None, e: Vec::new() };
    let mut i = 0;
    if let Some(ResolvedEntry::Subtree(cid)) = entries.get(0) {
        data.l = Some(*cid);
        i += 1;
    }
    let mut last_key = String::new();
    while i < entries.len() {
        let leaf = match &entries[i] {
            ResolvedEntry::Leaf(l) => l,
            ResolvedEntry::Subtree(_) => {
                return Err(anyhow!("invalid node: two subtrees adjacent with no leaf between them"))
            }
        };
        i += 1;
        let subtree = match entries.get(i) {
            Some(ResolvedEntry::Subtree(cid)) => {
                i += 1;
                Some(*cid)
            }
            _ => None,
        };
        let prefix_len = key::common_prefix_length(&last_key, &leaf.key);
        data.e.push(TreeEntry {
            p: prefix_len as u64,
            k: leaf.key.as_bytes()[prefix_len..].to_vec(),
            v: leaf.value,
            t: subtree,
        });
        last_key = leaf.key.clone();
    }
    Ok(data)
}

/// Reconstructs a node's entry sequence from its canonical wire form,
/// lazily loading (not fetching) any referenced subtrees. Verifies that
/// reconstructed keys are strictly increasing, per spec.md §4.3.
pub fn deserialize_node_data(
    store: Arc<dyn BlockStore>,
    data: &NodeData,
    layer: Option<u32>,
    self_cid: Cid,
) -> Result<Vec<NodeEntry>> {
    let child_layer = layer.map(|l| l.saturating_sub(1));
    let mut entries = Vec::with_capacity(data.e.len() * 2 + 1);
    if let Some(l) = data.l {
        entries.push(NodeEntry::Node(Node::load(store.clone(), l, child_layer)));
    }
    let mut last_key = String::new();
    for entry in &data.e {
        let p = entry.p as usize;
        if p > last_key.len() {
            return Err(anyhow!(MstError::CorruptBlock(
                self_cid,
                format!("prefix length {} exceeds previous key length {}", p, last_key.len())
            )));
        }
        let suffix = std::str::from_utf8(&entry.k)
            .map_err(|e| MstError::CorruptBlock(self_cid, e.to_string()))?;
        let full_key = format!("{}{}", &last_key[..p], suffix);
        key::validate_key(&full_key)
            .map_err(|_| MstError::CorruptBlock(self_cid, format!("invalid key `{full_key}`")))?;
        if key::compare_keys(&full_key, &last_key) != std::cmp::Ordering::Greater && !last_key.is_empty() {
            return Err(anyhow!(MstError::CorruptBlock(
                self_cid,
                format!("keys not strictly increasing at `{full_key}`")
            )));
        }
        entries.push(NodeEntry::Leaf(Leaf {
            key: full_key.clone(),
            value: entry.v,
        }));
        last_key = full_key;
        if let Some(t) = entry.t {
            entries.push(NodeEntry::Node(Node::load(store.clone(), t, child_layer)));
        }
    }
    Ok(entries)
}

/// The layer a node must be at, inferred from its first leaf (entries may
/// start with a subtree pointer, which carries no layer information of its
/// own).
pub fn layer_for_entries(entries: &[NodeEntry]) -> Option<u32> {
    entries.iter().find_map(|e| match e {
        NodeEntry::Leaf(l) => Some(key::layer(&l.key)),
        NodeEntry::Node(_) => None,
    })
}

pub fn cbor_decode_node_data(bytes: &[u8], cid: Cid) -> Result<NodeData> {
    ipld::cbor_to_struct(bytes).map_err(|e| anyhow!(MstError::CorruptBlock(cid, e.to_string())))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::memory::MemoryBlockStore;

    fn cid_of(n: u8) -> Cid {
        ipld::cid_for_bytes(&[n])
    }

    #[test]
    fn encode_decode_roundtrip() -> Result<()> {
        let entries = vec![
            ResolvedEntry::Leaf(Leaf { key: "a/1".into(), value: cid_of(1) }),
            ResolvedEntry::Leaf(Leaf { key: "a/11".into(), value: cid_of(2) }),
            ResolvedEntry::Leaf(Leaf { key: "a/2".into(), value: cid_of(3) }),
        ];
        let data = build_node_data(&entries)?;
        assert_eq!(data.e[0].p, 0);
        assert_eq!(data.e[1].p, 3); // "a/1" shared with "a/11"
        assert_eq!(data.e[2].p, 2); // "a/" shared with "a/2"

        let bytes = ipld::struct_to_cbor(&data)?;
        let decoded: NodeData = ipld::cbor_to_struct(&bytes)?;
        assert_eq!(decoded, data);

        let store: Arc<dyn BlockStore> = Arc::new(MemoryBlockStore::new());
        let self_cid = ipld::cid_for_bytes(&bytes);
        let round_tripped = deserialize_node_data(store, &decoded, Some(0), self_cid)?;
        let keys: Vec<_> = round_tripped
            .iter()
            .filter_map(|e| match e {
                NodeEntry::Leaf(l) => Some(l.key.clone()),
                NodeEntry::Node(_) => None,
            })
            .collect();
        assert_eq!(keys, vec!["a/1", "a/11", "a/2"]);
        Ok(())
    }

    #[test]
    fn rejects_non_increasing_keys() {
        let bad = NodeData {
            l: None,
            e: vec![
                TreeEntry { p: 0, k: b"b".to_vec(), v: cid_of(1), t: None },
                TreeEntry { p: 0, k: b"a".to_vec(), v: cid_of(2), t: None },
            ],
        };
        let store: Arc<dyn BlockStore> = Arc::new(MemoryBlockStore::new());
        let result = deserialize_node_data(store, &bad, Some(0), cid_of(9));
        assert!(result.is_err());
    }

    #[test]
    fn rejects_oversized_prefix() {
        let bad = NodeData {
            l: None,
            e: vec![TreeEntry { p: 5, k: b"x".to_vec(), v: cid_of(1), t: None }],
        };
        let store: Arc<dyn BlockStore> = Arc::new(MemoryBlockStore::new());
        let result = deserialize_node_data(store, &bad, Some(0), cid_of(9));
        assert!(result.is_err());
    }
}
