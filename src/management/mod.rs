mod cache;

pub use cache::DEFAULT_CACHE_FILE;
pub use cache::TokenCache;
