pub const PAPERLENS_CACHE_HEADER: &str = "X-Paperlens-Cache";
pub const PAPERLENS_STATUS_HEADER: &str = "X-Paperlens-Status";
pub const PAPERLENS_STATUS_HEALTHY: &str = "healthy";
pub const PAPERLENS_STATUS_READY: &str = "ready";
pub const PAPERLENS_STATUS_NOT_READY: &str = "not_ready";
pub const PAPERLENS_STATUS_ERROR: &str = "error";

/// Whether a memoized call was served from cache.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CacheStatus {
    Hit,
    Miss,
    /// The call is never memoized (answer generation).
    Bypass,
}

impl CacheStatus {
    #[inline]
    pub fn as_header_value(&self) -> &'static str {
        match self {
            CacheStatus::Hit => "HIT",
            CacheStatus::Miss => "MISS",
            CacheStatus::Bypass => "BYPASS",
        }
    }

    #[inline]
    pub fn is_hit(&self) -> bool {
        matches!(self, CacheStatus::Hit)
    }

    /// Folds two statuses of one request: a hit only if both were hits.
    #[inline]
    pub fn combine(self, other: CacheStatus) -> CacheStatus {
        match (self, other) {
            (CacheStatus::Hit, CacheStatus::Hit) => CacheStatus::Hit,
            (CacheStatus::Bypass, CacheStatus::Bypass) => CacheStatus::Bypass,
            _ => CacheStatus::Miss,
        }
    }
}

impl std::fmt::Display for CacheStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_header_value())
    }
}
