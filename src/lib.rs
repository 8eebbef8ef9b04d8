//! Merkle Search Tree: a content-addressed, deterministic key-value map.
//!
//! An MST maps UTF-8 keys to [`cid::Cid`] values. Every mutation produces a
//! new, independently addressable tree; prior versions remain valid and
//! structurally shared with the new one. Two trees holding the same
//! key-value pairs are always bit-identical on the wire, regardless of the
//! order their entries were inserted in — this is what makes the tree
//! useful as a sync primitive: two replicas can compare root CIDs to know
//! whether they hold the same data, and diff two versions' trees to find
//! exactly what changed.
//!
//! See [`tree::Mst`] for the primary entry point, [`storage::BlockStore`]
//! for the persistence contract, and [`diff::diff`] for comparing two
//! versions of a tree.

pub mod block_map;
pub mod cid_set;
pub mod codec;
pub mod diff;
pub mod error;
pub mod ipld;
pub mod key;
pub mod node;
pub mod storage;
pub mod tree;
pub mod walker;

pub use cid::Cid;
pub use diff::TreeDiff;
pub use error::MstError;
pub use node::{Leaf, Node, NodeEntry};
pub use storage::BlockStore;
pub use tree::Mst;
