//! Paired cursor used to descend two trees in lockstep (spec.md §4.9). A
//! single walker tracks one cursor's position; [`crate::diff::diff`] drives
//! two of them side by side.

use crate::node::{Node, NodeEntry};
use anyhow::{bail, Result};

#[derive(Clone)]
pub struct WalkerProgress {
    pub curr: NodeEntry,
    /// The node currently being walked. `None` when `curr` is the root.
    pub walking: Option<Node>,
    pub index: usize,
}

#[derive(Clone)]
pub enum WalkerStatus {
    Done,
    Progress(WalkerProgress),
}

#[derive(Clone)]
pub struct MstWalker {
    stack: Vec<WalkerProgress>,
    pub status: WalkerStatus,
}

impl MstWalker {
    pub fn new(root: Node) -> Self {
        MstWalker {
            stack: Vec::new(),
            status: WalkerStatus::Progress(WalkerProgress {
                curr: NodeEntry::Node(root),
                walking: None,
                index: 0,
            }),
        }
    }

    pub fn is_done(&self) -> bool {
        matches!(self.status, WalkerStatus::Done)
    }

    /// The layer of the node currently being walked.
    pub async fn layer(&self) -> Result<u32> {
        match &self.status {
            WalkerStatus::Done => bail!("walk is already done"),
            WalkerStatus::Progress(p) => {
                if let Some(node) = &p.walking {
                    Ok(node.get_layer().await?)
                } else if let NodeEntry::Node(node) = &p.curr {
                    Ok(node.get_layer().await? + 1)
                } else {
                    bail!("cannot determine layer: root cursor points at a leaf")
                }
            }
        }
    }

    /// Moves to the next entry in the current subtree, skipping over
    /// whatever `curr` points at (subtree or leaf) without descending.
    #[async_recursion::async_recursion]
    pub async fn step_over(&mut self) -> Result<()> {
        let (next_progress, pop) = match &self.status {
            WalkerStatus::Done => return Ok(()),
            WalkerStatus::Progress(p) => {
                if let Some(node) = &p.walking {
                    let mut p = p.clone();
                    p.index += 1;
                    match node.at_index(p.index).await? {
                        Some(entry) => {
                            p.curr = entry;
                            (Some(p), false)
                        }
                        None => (None, true),
                    }
                } else {
                    (None, false)
                }
            }
        };
        if let Some(p) = next_progress {
            self.status = WalkerStatus::Progress(p);
            return Ok(());
        }
        if pop {
            match self.stack.pop() {
                Some(popped) => {
                    self.status = WalkerStatus::Progress(popped);
                    return self.step_over().await;
                }
                None => {
                    self.status = WalkerStatus::Done;
                    return Ok(());
                }
            }
        }
        self.status = WalkerStatus::Done;
        Ok(())
    }

    /// Descends into the subtree `curr` points at. Errors if `curr` is a
    /// leaf.
    pub async fn step_into(&mut self) -> Result<()> {
        let p = match &self.status {
            WalkerStatus::Done => return Ok(()),
            WalkerStatus::Progress(p) => p.clone(),
        };

        let node = match (&p.walking, &p.curr) {
            (Some(_), NodeEntry::Node(n)) => n.clone(),
            (Some(_), NodeEntry::Leaf(_)) => bail!("cannot step into a leaf"),
            (None, NodeEntry::Node(n)) => n.clone(),
            (None, NodeEntry::Leaf(_)) => bail!("root of a walk cannot be a leaf"),
        };

        match node.at_index(0).await? {
            Some(first) => {
                if p.walking.is_some() {
                    self.stack.push(p.clone());
                }
                self.status = WalkerStatus::Progress(WalkerProgress {
                    curr: first,
                    walking: Some(node),
                    index: 0,
                });
            }
            None => bail!("tried to step into a node with no entries"),
        }
        Ok(())
    }

    /// Advances the cursor: steps into `curr` if it's a subtree, otherwise
    /// steps over it.
    pub async fn advance(&mut self) -> Result<()> {
        let is_leaf = match &self.status {
            WalkerStatus::Done => return Ok(()),
            WalkerStatus::Progress(p) => p.curr.is_leaf(),
        };
        if is_leaf {
            self.step_over().await
        } else {
            self.step_into().await
        }
    }
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

    fn cid(seed: &str) -> cid::Cid {
        ipld::cid_for_bytes(seed.as_bytes())
    }

    #[tokio::test]
    async fn root_layer_is_one_above_the_node_it_wraps() -> Result<()> {
        let root = Node::empty_root(store());
        let root = root.add("a/1", cid("v"), Some(0)).await?;
        let walker = MstWalker::new(root);
        assert_eq!(walker.layer().await?, 1);
        Ok(())
    }

    #[tokio::test]
    async fn advance_visits_every_leaf_in_order_then_finishes() -> Result<()> {
        let root = Node::empty_root(store());
        let mut root = root;
        for key in ["a/1", "a/2", "a/3"] {
            root = root.add(key, cid("v"), Some(0)).await?;
        }
        let mut walker = MstWalker::new(root);
        let mut seen = Vec::new();
        while !walker.is_done() {
            if let WalkerStatus::Progress(p) = &walker.status {
                if let NodeEntry::Leaf(l) = &p.curr {
                    seen.push(l.key.clone());
                }
            }
            walker.advance().await?;
        }
        assert_eq!(seen, vec!["a/1", "a/2", "a/3"]);
        Ok(())
    }

    #[tokio::test]
    async fn step_into_a_leaf_is_an_error() -> Result<()> {
        let root = Node::empty_root(store());
        let root = root.add("a/1", cid("v"), Some(0)).await?;
        let mut walker = MstWalker::new(root);
        walker.step_into().await?; // descend into the root's single leaf entry
        assert!(walker.step_into().await.is_err());
        Ok(())
    }

    #[tokio::test]
    async fn advance_through_a_subtree_reaches_every_leaf() -> Result<()> {
        // a/2 is two layers above a/1, forcing a/1 into a child subtree.
        let root = Node::empty_root(store());
        let root = root.add("a/1", cid("v"), Some(0)).await?;
        let root = root.add("a/2", cid("v"), Some(2)).await?;
        let mut walker = MstWalker::new(root);
        let mut seen = Vec::new();
        while !walker.is_done() {
            if let WalkerStatus::Progress(p) = &walker.status {
                if let NodeEntry::Leaf(l) = &p.curr {
                    seen.push(l.key.clone());
                }
            }
            walker.advance().await?;
        }
        seen.sort();
        assert_eq!(seen, vec!["a/1", "a/2"]);
        Ok(())
    }
}
