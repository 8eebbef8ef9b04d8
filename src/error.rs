use cid::Cid;
use thiserror::Error;

/// Failure modes surfaced by the MST core, per the error taxonomy: caller
/// input errors, store/tree referential-integrity errors, and corrupt
/// blocks. None of these are retried internally; every failure propagates
/// to the caller.
#[derive(Error, Debug)]
pub enum MstError {
    #[error("invalid MST key `{0}`")]
    InvalidKey(String),

    #[error("missing block `{0}`")]
    MissingBlock(Cid),

    #[error("missing blocks: `{0:?}`")]
    MissingBlocks(Vec<Cid>),

    #[error("block `{0}` failed to decode: {1}")]
    CorruptBlock(Cid, String),

    #[error("store already holds a different payload at `{0}`")]
    StoreConflict(Cid),
}
