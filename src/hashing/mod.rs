//! BLAKE3 fingerprints of memoized call arguments.
//!
//! Every variable-length field is length-prefixed before hashing so that
//! `("ab", "c")` and `("a", "bc")` never produce the same key.

use blake3::Hasher;

use crate::paper::Paper;

#[inline]
fn update_field(hasher: &mut Hasher, field: &[u8]) {
    hasher.update(&(field.len() as u64).to_le_bytes());
    hasher.update(field);
}

/// Fingerprint of a `(topic, max_results)` fetch.
#[inline]
pub fn hash_fetch_args(topic: &str, max_results: usize) -> [u8; 32] {
    let mut hasher = Hasher::new();
    update_field(&mut hasher, topic.as_bytes());
    hasher.update(&(max_results as u64).to_le_bytes());
    *hasher.finalize().as_bytes()
}

/// Fingerprint of a `(query, paper batch)` ranking.
///
/// Covers every field of every paper plus batch order, since ranking output
/// depends on positions (ties keep fetch order).
pub fn hash_rank_args(query: &str, papers: &[Paper]) -> [u8; 32] {
    let mut hasher = Hasher::new();
    update_field(&mut hasher, query.as_bytes());
    hasher.update(&(papers.len() as u64).to_le_bytes());
    for paper in papers {
        update_field(&mut hasher, paper.title.as_bytes());
        update_field(&mut hasher, paper.summary.as_bytes());
        update_field(&mut hasher, paper.url.as_bytes());
        update_field(&mut hasher, paper.published.as_bytes());
    }
    *hasher.finalize().as_bytes()
}

/// Computes a 64-bit hash of the input data using BLAKE3, truncated from 256 bits.
///
/// Used for log correlation and stub embedding buckets; cache keys keep the full 32 bytes.
#[inline]
pub fn hash_to_u64(data: &[u8]) -> u64 {
    let hash = blake3::hash(data);
    let bytes: [u8; 8] = hash.as_bytes()[0..8]
        .try_into()
        .expect("BLAKE3 always produces at least 8 bytes");
    u64::from_le_bytes(bytes)
}
