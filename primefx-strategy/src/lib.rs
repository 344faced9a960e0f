//! C8 — Strategy Dispatcher.
//!
//! The strategy capability set, risk sizing, and the dispatcher that turns
//! [`DispatchEvent`](primefx_dispatch::DispatchEvent)s into callback
//! invocations and resolves the signals those callbacks raise into orders
//! (spec.md §4.8/§4.9).

pub mod config;
pub mod dispatcher;
pub mod error;
pub mod indicators;
pub mod order_client;
pub mod risk;
pub mod strategy;

pub use config::StrategyConfig;
pub use dispatcher::StrategyDispatcher;
pub use error::StrategyError;
pub use order_client::OrderClient;
pub use strategy::{PositionStatus, Strategy, StrategyContext, StrategySignal};
