use derive_more::Display;
use serde::{Deserialize, Serialize};

/// Direction of a [`crate::Position`](crate) or order.
#[derive(
    Debug, Copy, Clone, Eq, PartialEq, Ord, PartialOrd, Hash, Deserialize, Serialize, Display,
)]
pub enum Side {
    Buy,
    Sell,
}

impl Side {
    /// The side that would close a position opened on `self`.
    pub fn close_side(&self) -> Self {
        match self {
            Side::Buy => Side::Sell,
            Side::Sell => Side::Buy,
        }
    }
}
