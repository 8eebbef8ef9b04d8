use anyhow::Result;
use cid::Cid;
use mst::storage::memory::MemoryBlockStore;
use mst::Mst;
use std::sync::Arc;

fn value_cid() -> Cid {
    Cid::try_from("bafyreie5cvv4h45feadgeuwhbcutmh6t2ceseocckahdoe6uat64zmz454").unwrap()
}

fn store() -> Arc<dyn mst::BlockStore> {
    Arc::new(MemoryBlockStore::new())
}

#[tokio::test]
async fn empty_and_trivial_tree_known_cids() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter("info,mst=trace")
        .with_test_writer()
        .try_init()
        .ok();

    tracing::info!("checking empty tree root CID");
    let mst = Mst::create(store());
    assert_eq!(
        mst.get_pointer().await?.to_string(),
        "bafyreie5737gdxlw5i64vzichcalba3z2v5n6icifvx5xytvske7mr3hpm"
    );

    tracing::info!("checking trivial single-entry tree root CID");
    let mst = mst.add("com.example.record/3jqfcqzm3fo2j", value_cid()).await?;
    assert_eq!(
        mst.get_pointer().await?.to_string(),
        "bafyreibj4lsc3aqnrvphp5xmrnfoorvru4wynt6lwidqbm2623a6tatzdu"
    );
    Ok(())
}
