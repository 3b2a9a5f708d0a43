pub mod confidence;
pub mod cycle_context;
pub mod data_source;
pub mod decision;
pub mod direction;
pub mod execution;
pub mod market;
pub mod portfolio;
pub mod regime;
pub mod risk;
pub mod signal_source;
pub mod timeframe;
pub mod trade_action;
