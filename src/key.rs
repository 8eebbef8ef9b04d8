//! Key validation, ordering, and the layer-assignment function that gives
//! the tree its shape (spec.md §3, §4.1).

use crate::error::MstError;
use anyhow::{anyhow, Result};
use lazy_static::lazy_static;
use regex::Regex;
use sha2::{Digest, Sha256};

const MAX_KEY_LEN: usize = 1024;

lazy_static! {
    static ref VALID_CHARS: Regex = Regex::new(r"^[a-zA-Z0-9_\-:./]+$").unwrap();
}

/// Validates a key per spec.md §3: non-empty, at most 1024 bytes, and
/// restricted to `[A-Za-z0-9_\-:.\/]`.
pub fn validate_key(key: &str) -> Result<()> {
    if key.is_empty() || key.len() > MAX_KEY_LEN || !VALID_CHARS.is_match(key) {
        return Err(anyhow!(MstError::InvalidKey(key.to_string())));
    }
    Ok(())
}

/// Byte-wise comparison of UTF-8 encoded keys; this is the order the tree
/// is sorted by.
pub fn compare_keys(a: &str, b: &str) -> std::cmp::Ordering {
    a.as_bytes().cmp(b.as_bytes())
}

/// Length, in bytes, of the longest shared prefix of `a` and `b`.
pub fn common_prefix_length(a: &str, b: &str) -> usize {
    let a = a.as_bytes();
    let b = b.as_bytes();
    let mut i = 0;
    while i < a.len() && i < b.len() && a[i] == b[i] {
        i += 1;
    }
    i
}

/// `layer(key) = floor(leading_zero_bits(SHA256(key)) / 2)`.
///
/// Walks the digest byte by byte, since each full zero byte contributes
/// exactly 4 to the layer (8 zero bits / 2) and a partially-zero byte
/// contributes the matching fraction before the walk stops.
pub fn layer(key: &str) -> u32 {
    leading_zeros_on_hash(key.as_bytes())
}

pub(crate) fn leading_zeros_on_hash(key: &[u8]) -> u32 {
    let digest = Sha256::digest(key);
    let mut leading_zeros = 0u32;
    for byte in digest.iter() {
        if *byte < 64 {
            leading_zeros += 1;
        }
        if *byte < 16 {
            leading_zeros += 1;
        }
        if *byte < 4 {
            leading_zeros += 1;
        }
        if *byte == 0 {
            leading_zeros += 1;
        } else {
            break;
        }
    }
    leading_zeros
}
