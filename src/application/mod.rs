pub mod accuracy_report;
pub mod cycle;
pub mod evaluate_signals;
pub mod extractors;
pub mod reflection;
pub mod signal_log;
pub mod stats;
pub mod trade;
