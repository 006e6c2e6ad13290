//! # Equity Analytics Engine
//!
//! This crate turns daily equity price series into return, drawdown,
//! volatility and cross-symbol statistics.
//!
//! ## Architectural Principles
//!
//! - **Layer 1 Logic:** This is a pure logic crate. It has no knowledge of external systems.
//!   It depends only on `core-types` (Layer 0) and reads prices through the
//!   `PriceSeriesProvider` trait.
//! - **Stateless Calculation:** Every operation is a pure function of its inputs. Per-symbol
//!   work is independent and is fanned out across threads in the multi-symbol operations,
//!   while each symbol's own computation stays sequential.
//!
//! ## Layers
//!
//! 1. `provider`: the price series contract and an in-memory implementation.
//! 2. `returns` / `drawdown`: daily log returns, the running peak/drawdown trace and the
//!    worst drawdown episode.
//! 3. `volatility`: first-full-window rolling volatility at increasing horizons.
//! 4. `aggregate` / `engine`: multi-symbol results, correlation and distribution statistics.

// Declare the modules that constitute this crate.
pub mod aggregate;
pub mod drawdown;
pub mod engine;
pub mod error;
pub mod params;
pub mod provider;
pub mod report;
pub mod returns;
pub mod stats;
pub mod volatility;

// Re-export the key components to create a clean, public-facing API.
pub use aggregate::{
    CorrelationMatrix, Exclusion, ReturnQuantiles, ReturnStats, SymbolOutcome, SymbolResult,
    SymbolResults,
};
pub use drawdown::{compute_drawdown, find_worst_episode, DrawdownRecord, DrawdownTrace, MddEpisode};
pub use engine::AnalyticsEngine;
pub use error::AnalyticsError;
pub use params::AnalyticsParams;
pub use provider::{normalize_symbols, InMemoryProvider, PriceSeriesProvider};
pub use report::{AdjustedReturnReport, AdjustedReturnRow};
pub use returns::{compute_returns, summarize, AdjustedReturnSummary, ReturnRecord, ReturnSeries};
pub use volatility::{annualize, check_period, rolling_volatility, VolatilityProfile, WindowVolatility};
