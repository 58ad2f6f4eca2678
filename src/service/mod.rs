pub mod listing_cache;
pub mod session;
