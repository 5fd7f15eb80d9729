/// Classification for error recovery.
///
/// Used by the listing source and the cache to decide what to do next.
///
/// # Behavior Summary
///
/// | Class | Effect | Acted on by |
/// |-------|--------|-------------|
/// | `NextProvider` | Try the next provider for the universe; the universe is empty if none is left | `ListingSource` |
/// | `KeepCurrent` | Stop the fallback walk and keep serving the snapshot already held | `ListingSource`, `ListingCache` |
/// | `Rebuild` | Discard the persisted file and rebuild from the providers | `ListingCache::open` |
/// | `SkipRow` | Drop the offending row, keep the rest of the batch | `ListingSource::fetch_all` |
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum Recovery {
    /// Provider-level failure. Another provider, or the other universe,
    /// may still produce rows.
    NextProvider,

    /// Refresh-level failure. The current snapshot stays published.
    KeepCurrent,

    /// Persisted cache is unusable. Behaves as if no cache existed.
    Rebuild,

    /// A single listing row is malformed.
    SkipRow,
}
