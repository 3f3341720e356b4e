//! Explicit time-boxed memoization.
//!
//! A [`TtlCache`] maps `(function identity, argument fingerprint)` to a result and
//! forgets it once the time-to-live elapses. Callers check before recomputing; there is
//! no decorator magic and no cross-process persistence.

pub mod ttl;
pub mod types;

#[cfg(test)]
mod ttl_tests;

pub use ttl::{CacheKey, TtlCache};
pub use types::{
    CacheStatus, PAPERLENS_CACHE_HEADER, PAPERLENS_STATUS_ERROR, PAPERLENS_STATUS_HEADER,
    PAPERLENS_STATUS_HEALTHY, PAPERLENS_STATUS_NOT_READY, PAPERLENS_STATUS_READY,
};
