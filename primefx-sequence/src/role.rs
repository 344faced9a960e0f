use derive_more::Display;

/// Which of the two logical FIX sessions a sequence counter belongs to.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash, Display)]
pub enum SessionRole {
    Market,
    Order,
}
