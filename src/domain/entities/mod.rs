pub mod reflection;
pub mod signal;
pub mod trade;
