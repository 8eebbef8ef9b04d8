//! Thin wrappers around the hash/encoding primitives this crate consumes
//! rather than reimplements: canonical dag-cbor via `serde_ipld_dagcbor`,
//! and CID-v1 derivation via `cid` + `multihash`.

use anyhow::Result;
use cid::Cid;
use multihash::Multihash;
use serde::de::DeserializeOwned;
use serde::Serialize;
use sha2::{Digest, Sha256};

const SHA2_256: u64 = 0x12;
const DAG_CBOR: u64 = 0x71;

/// Serializes `obj` to its canonical dag-cbor bytes.
pub fn struct_to_cbor<T: Serialize>(obj: &T) -> Result<Vec<u8>> {
    Ok(serde_ipld_dagcbor::to_vec(obj)?)
}

/// Deserializes canonical dag-cbor bytes into `T`.
pub fn cbor_to_struct<T: DeserializeOwned>(bytes: &[u8]) -> Result<T> {
    Ok(serde_ipld_dagcbor::from_slice(bytes)?)
}

/// Computes the CID-v1 (dag-cbor, sha2-256) of `data`'s canonical encoding.
pub fn cid_for_cbor<T: Serialize>(data: &T) -> Result<Cid> {
    let bytes = struct_to_cbor(data)?;
    Ok(cid_for_bytes(&bytes))
}

/// Computes the CID-v1 (dag-cbor, sha2-256) of already-encoded bytes.
pub fn cid_for_bytes(bytes: &[u8]) -> Cid {
    let hash = Sha256::digest(bytes);
    let mh = Multihash::<64>::wrap(SHA2_256, hash.as_slice())
        .expect("sha2-256 digest always fits a 64-byte multihash");
    Cid::new_v1(DAG_CBOR, mh)
}
