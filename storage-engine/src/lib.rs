//! In-process cache backends for the listing cache

pub mod moka_cache;

pub use moka_cache::MokaCacheStore;
