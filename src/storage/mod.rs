//! Block store interface (spec.md §4.2, §6). The core never assumes
//! atomicity across multiple `put`s; callers wanting transactional commit
//! must batch externally.

pub mod memory;

use crate::block_map::BlocksAndMissing;
use anyhow::Result;
use cid::Cid;
use std::fmt::Debug;
use std::future::Future;
use std::pin::Pin;

/// The capability contract an MST needs from a backing store. Written as
/// hand-rolled boxed futures (rather than `#[async_trait]`) so that
/// `Arc<dyn BlockStore>` stays usable as a trait object shared across every
/// clone of an [`crate::tree::Mst`] handle.
pub trait BlockStore: Send + Sync + Debug {
    fn get<'a>(
        &'a self,
        cid: &'a Cid,
    ) -> Pin<Box<dyn Future<Output = Result<Option<Vec<u8>>>> + Send + Sync + 'a>>;

    fn put<'a>(
        &'a self,
        cid: Cid,
        bytes: Vec<u8>,
    ) -> Pin<Box<dyn Future<Output = Result<()>> + Send + Sync + 'a>>;

    fn has<'a>(&'a self, cid: &'a Cid) -> Pin<Box<dyn Future<Output = Result<bool>> + Send + Sync + 'a>>;

    /// Batched `get`, used by block-level traversals (diff, serialization)
    /// that want to resolve several pointers per round trip.
    fn get_many<'a>(
        &'a self,
        cids: Vec<Cid>,
    ) -> Pin<Box<dyn Future<Output = Result<BlocksAndMissing>> + Send + Sync + 'a>>;
}
