//! PriceLab Core: price series fetch, aggregation and returns.
//!
//! This crate contains the data pipeline:
//! - Providers (Yahoo Finance, synthetic random walk) behind one trait
//! - Per-symbol fetch outcomes folded into an outer-joined price table
//! - Calendar resampling keeping the last observation per bucket
//! - Simple and cumulative returns, pairwise Pearson correlation
//! - Delimiter-separated export and TOML configuration

pub mod analysis;
pub mod config;
pub mod data;
pub mod export;

pub use analysis::{CorrelationMatrix, Returns};
pub use config::{ConfigError, PipelineConfig};
pub use data::{Aggregation, Aggregator, FailureList, Period, PriceField, PriceTable};
