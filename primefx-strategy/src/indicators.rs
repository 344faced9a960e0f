use rust_decimal::Decimal;
use std::collections::VecDeque;

/// A fixed-window simple moving average. Mirrors the bounded ring used by
/// `primefx_instrument::Instrument`'s recent-tick buffer: push, evict past
/// capacity, only yield a value once the window is full.
pub struct SimpleMovingAverage {
    window: VecDeque<Decimal>,
    capacity: usize,
    sum: Decimal,
}

impl SimpleMovingAverage {
    pub fn new(capacity: usize) -> Self {
        let capacity = capacity.max(1);
        Self { window: VecDeque::with_capacity(capacity), capacity, sum: Decimal::ZERO }
    }

    /// Push a new sample, returning the current average once the window is full.
    pub fn push(&mut self, value: Decimal) -> Option<Decimal> {
        self.window.push_back(value);
        self.sum += value;
        if self.window.len() > self.capacity {
            if let Some(oldest) = self.window.pop_front() {
                self.sum -= oldest;
            }
        }

        if self.window.len() == self.capacity {
            Some(self.sum / Decimal::from(self.capacity))
        } else {
            None
        }
    }

    pub fn is_full(&self) -> bool {
        self.window.len() == self.capacity
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn no_average_until_the_window_fills() {
        let mut sma = SimpleMovingAverage::new(3);
        assert_eq!(sma.push(dec!(1)), None);
        assert_eq!(sma.push(dec!(2)), None);
        assert_eq!(sma.push(dec!(3)), Some(dec!(2)));
    }

    #[test]
    fn slides_the_window_once_full() {
        let mut sma = SimpleMovingAverage::new(2);
        sma.push(dec!(10));
        sma.push(dec!(20));
        assert_eq!(sma.push(dec!(30)), Some(dec!(25)));
        assert!(sma.is_full());
    }
}
