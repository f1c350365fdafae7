//! Page-level pieces of the fibo blog client: the post fetcher and the views
//! built on top of it.

pub mod fetch;
pub mod views;

pub use fetch::CachedFetcher;
