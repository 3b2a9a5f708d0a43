pub mod collaborators;
pub mod market_feed;
pub mod reflection_repository;
pub mod signal_extractor;
pub mod signal_repository;
pub mod trade_repository;
