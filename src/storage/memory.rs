use crate::block_map::{BlockMap, BlocksAndMissing};
use crate::error::MstError;
use crate::storage::BlockStore;
use anyhow::Result;
use cid::Cid;
use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;
use tokio::sync::RwLock;

/// In-memory reference [`BlockStore`], required by spec.md §4.2/§6 for
/// tests and small programs. Not a production store: nothing here ever
/// touches disk or network, by design (those are external collaborators).
#[derive(Clone, Debug, Default)]
pub struct MemoryBlockStore {
    blocks: Arc<RwLock<BlockMap>>,
}

impl MemoryBlockStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn len(&self) -> usize {
        self.blocks.read().await.size()
    }

    pub async fn is_empty(&self) -> bool {
        self.len().await == 0
    }
}

impl BlockStore for MemoryBlockStore {
    fn get<'a>(
        &'a self,
        cid: &'a Cid,
    ) -> Pin<Box<dyn Future<Output = Result<Option<Vec<u8>>>> + Send + Sync + 'a>> {
        Box::pin(async move {
            let blocks = self.blocks.read().await;
            Ok(blocks.get(cid).map(|b| b.to_vec()))
        })
    }

    fn put<'a>(
        &'a self,
        cid: Cid,
        bytes: Vec<u8>,
    ) -> Pin<Box<dyn Future<Output = Result<()>> + Send + Sync + 'a>> {
        Box::pin(async move {
            let mut blocks = self.blocks.write().await;
            blocks.set(cid, bytes).map_err(|_| MstError::StoreConflict(cid).into())
        })
    }

    fn has<'a>(&'a self, cid: &'a Cid) -> Pin<Box<dyn Future<Output = Result<bool>> + Send + Sync + 'a>> {
        Box::pin(async move {
            let blocks = self.blocks.read().await;
            Ok(blocks.has(cid))
        })
    }

    fn get_many<'a>(
        &'a self,
        cids: Vec<Cid>,
    ) -> Pin<Box<dyn Future<Output = Result<BlocksAndMissing>> + Send + Sync + 'a>> {
        Box::pin(async move {
            let blocks = self.blocks.read().await;
            Ok(blocks.get_many(&cids))
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn put_is_idempotent_for_same_bytes() -> Result<()> {
        let store = MemoryBlockStore::new();
        let bytes = b"hello".to_vec();
        let cid = crate::ipld::cid_for_bytes(&bytes);
        store.put(cid, bytes.clone()).await?;
        store.put(cid, bytes.clone()).await?;
        assert_eq!(store.len().await, 1);
        Ok(())
    }

    #[tokio::test]
    async fn put_rejects_conflicting_bytes_at_same_cid() -> Result<()> {
        let store = MemoryBlockStore::new();
        let cid = crate::ipld::cid_for_bytes(b"hello");
        store.put(cid, b"hello".to_vec()).await?;
        let result = store.put(cid, b"goodbye".to_vec()).await;
        assert!(result.is_err());
        Ok(())
    }

    #[tokio::test]
    async fn has_and_get_roundtrip() -> Result<()> {
        let store = MemoryBlockStore::new();
        let bytes = b"payload".to_vec();
        let cid = crate::ipld::cid_for_bytes(&bytes);
        assert!(!store.has(&cid).await?);
        store.put(cid, bytes.clone()).await?;
        assert!(store.has(&cid).await?);
        assert_eq!(store.get(&cid).await?, Some(bytes));
        Ok(())
    }
}
