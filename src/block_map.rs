use crate::error::MstError;
use anyhow::Result;
use cid::Cid;
use std::collections::BTreeMap;
use std::str::FromStr;

/// An unordered collection of content-addressed blocks, keyed by CID.
/// Serves as the staging area returned by [`crate::node::Node::unstored_blocks`]
/// before it is handed to a [`crate::storage::BlockStore`].
#[derive(Debug, Clone, Default, PartialEq)]
pub struct BlockMap {
    map: BTreeMap<String, Vec<u8>>,
}

pub struct BlocksAndMissing {
    pub blocks: BlockMap,
    pub missing: Vec<Cid>,
}

impl BlockMap {
    pub fn new() -> Self {
        Self::default()
    }

    /// Inserts `bytes` at `cid`. Idempotent when the same bytes are already
    /// present; a different payload at an existing CID is a programmer
    /// error (spec.md §4.2) and is rejected rather than silently
    /// overwritten.
    pub fn set(&mut self, cid: Cid, bytes: Vec<u8>) -> Result<()> {
        if let Some(existing) = self.map.get(&cid.to_string()) {
            if existing != &bytes {
                return Err(MstError::StoreConflict(cid).into());
            }
            return Ok(());
        }
        self.map.insert(cid.to_string(), bytes);
        Ok(())
    }

    pub fn get(&self, cid: &Cid) -> Option<&[u8]> {
        self.map.get(&cid.to_string()).map(Vec::as_slice)
    }

    pub fn has(&self, cid: &Cid) -> bool {
        self.map.contains_key(&cid.to_string())
    }

    pub fn delete(&mut self, cid: &Cid) {
        self.map.remove(&cid.to_string());
    }

    pub fn size(&self) -> usize {
        self.map.len()
    }

    pub fn get_many(&self, cids: &[Cid]) -> BlocksAndMissing {
        let mut missing = Vec::new();
        let mut blocks = BlockMap::new();
        for cid in cids {
            match self.get(cid) {
                Some(bytes) => {
                    blocks.set(*cid, bytes.to_vec()).expect("fresh map, no conflict");
                }
                None => missing.push(*cid),
            }
        }
        BlocksAndMissing { blocks, missing }
    }

    pub fn entries(&self) -> impl Iterator<Item = (Cid, &[u8])> {
        self.map
            .iter()
            .map(|(cid, bytes)| (Cid::from_str(cid).expect("valid CID key"), bytes.as_slice()))
    }

    /// Merges `other` into `self`, per the same conflict rule as `set`.
    pub fn extend(&mut self, other: BlockMap) -> Result<()> {
        for (cid, bytes) in other.map.into_iter() {
            let cid = Cid::from_str(&cid).expect("valid CID key");
            self.set(cid, bytes)?;
        }
        Ok(())
    }
}
