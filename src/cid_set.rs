use cid::Cid;
use std::collections::HashSet;
use std::str::FromStr;

/// A set of CIDs, keyed by their string form — used to collect the value
/// CIDs touched by a diff (spec.md §4.9) without depending on `Cid`'s
/// internal hash impl.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CidSet {
    set: HashSet<String>,
}

impl CidSet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add(&mut self, cid: Cid) {
        self.set.insert(cid.to_string());
    }

    pub fn delete(&mut self, cid: Cid) {
        self.set.remove(&cid.to_string());
    }

    pub fn has(&self, cid: Cid) -> bool {
        self.set.contains(&cid.to_string())
    }

    pub fn size(&self) -> usize {
        self.set.len()
    }

    pub fn to_list(&self) -> Vec<Cid> {
        self.set
            .iter()
            .filter_map(|s| Cid::from_str(s).ok())
            .collect()
    }

    /// The set as strings, for callers (like `diff::new_cids`) that want a
    /// serialization-stable form rather than depending on `Cid` ordering.
    pub fn to_string_set(&self) -> HashSet<String> {
        self.set.clone()
    }
}
