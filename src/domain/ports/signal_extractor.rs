//! Signal extractor port.
//!
//! Defines the [`SignalExtractor`] trait: one implementation per data source
//! (technical indicators, on-chain metrics, sentiment, macro/regime, the
//! decision itself). Each extractor reads its slice of the
//! [`CycleContext`] and emits zero or more directional [`Signal`]s.
//!
//! # Overview
//!
//! - Extraction is pure and infallible. A missing or stub-marked input
//!   simply yields no signals for that source.
//! - Signal names are stable identifiers; accuracy is tracked per name, so
//!   renaming a signal starts its history over.
//!
//! # Example
//!
//! ```ignore
//! struct VolumeSpike;
//!
//! impl SignalExtractor for VolumeSpike {
//!     fn name(&self) -> &'static str { "volume_spike" }
//!
//!     fn extract(&self, ctx: &CycleContext) -> Vec<Signal> {
//!         // Inspect ctx.market, return signals
//!         vec![]
//!     }
//! }
//! ```

use crate::domain::entities::signal::Signal;
use crate::domain::values::cycle_context::CycleContext;

pub trait SignalExtractor: Send + Sync {
    /// Unique name for this extractor.
    fn name(&self) -> &'static str;

    /// Derive signals from the context.
    fn extract(&self, ctx: &CycleContext) -> Vec<Signal>;
}
