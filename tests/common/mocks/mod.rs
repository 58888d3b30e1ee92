//! Mock implementations of the host cache and the secondary prefetcher.
