use primefx_instrument::Side;
use primefx_renko::{Direction, RenkoBrick};
use primefx_strategy::{Strategy, StrategyContext};
use smol_str::SmolStr;

/// Reference strategy shipped with the binary: enters in the direction of
/// every closed brick, closing out the opposite side first. Demonstrates
/// the [`Strategy`] capability set against a real Renko feed; not a
/// recommendation of this as a trading approach.
pub struct RenkoBreakoutStrategy {
    symbols: Vec<SmolStr>,
}

impl RenkoBreakoutStrategy {
    pub fn new(symbols: Vec<SmolStr>) -> Self {
        Self { symbols }
    }
}

impl Strategy for RenkoBreakoutStrategy {
    fn symbols(&self) -> &[SmolStr] {
        &self.symbols
    }

    fn on_bar(&mut self, ctx: &mut StrategyContext, brick: &RenkoBrick) {
        let side = match brick.direction {
            Direction::Up => Side::Buy,
            Direction::Down => Side::Sell,
        };
        let symbol = ctx.symbol().to_string();
        ctx.close_all_signal(symbol, Some(side.close_side()));
        ctx.entry_signal(side);
    }
}
