//! Hash map used for tick records and the tick index.
//!
//! The backend is picked by cargo feature. `std-hash` always wins, then
//! `ahash`, then `rustc-hash`; with none of them enabled the std map is used.

#[cfg(all(feature = "rustc-hash", not(feature = "ahash"), not(feature = "std-hash")))]
pub type FastMap<K, V> = rustc_hash::FxHashMap<K, V>;

#[cfg(all(feature = "ahash", not(feature = "std-hash")))]
pub type FastMap<K, V> = ahash::AHashMap<K, V>;

#[cfg(any(
    feature = "std-hash",
    all(not(feature = "rustc-hash"), not(feature = "ahash"))
))]
pub type FastMap<K, V> = std::collections::HashMap<K, V>;

/// Creates an empty [`FastMap`] with room for `capacity` entries.
#[inline]
pub fn fast_map_with_capacity<K, V>(capacity: usize) -> FastMap<K, V> {
    FastMap::with_capacity_and_hasher(capacity, Default::default())
}
