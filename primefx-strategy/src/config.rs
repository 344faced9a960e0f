use rust_decimal::Decimal;
use serde::Deserialize;

/// Strategy-level configuration (spec.md §6.2), shared by every strategy the
/// dispatcher drives — risk caps are enforced uniformly, each strategy
/// narrows the symbol universe via [`crate::strategy::Strategy::symbols`].
#[derive(Debug, Clone, Deserialize)]
pub struct StrategyConfig {
    /// Maximum number of concurrently open short positions per symbol.
    pub max_short_pos: u32,
    /// Maximum number of concurrently open long positions per symbol.
    pub max_long_pos: u32,
    /// Stop-loss distance, in pips, used by both sizing and bracket orders.
    pub max_pip_risk: Decimal,
    /// Risk-per-trade, as a percentage of free margin.
    pub max_risk: Decimal,
    /// Absolute cap on sized order quantity, in units.
    pub max_qty: Decimal,
    /// Reject entries when the current spread exceeds this many points.
    pub max_spread: Decimal,
    /// Renko brick size, in points of the instrument's point size.
    pub renko_size: Decimal,
    /// Simple-moving-average window length.
    pub sma_size: usize,
    /// Minimum number of closed bricks before a bar is forwarded to strategies.
    pub wait_bricks: u32,
    pub symbols: Vec<String>,
}
