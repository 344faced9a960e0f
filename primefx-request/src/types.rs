use derive_more::Display;
use primefx_codec::FieldValue;
use primefx_instrument::Side;

/// FIX `SubscriptionRequestType(263)`.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Display)]
pub enum SubscriptionRequestType {
    Snapshot,
    SnapshotPlusUpdates,
    Disable,
}

impl FieldValue for SubscriptionRequestType {
    fn to_field(&self) -> String {
        match self {
            Self::Snapshot => "0",
            Self::SnapshotPlusUpdates => "1",
            Self::Disable => "2",
        }
        .to_string()
    }
}

/// FIX `OrdType(40)`.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Display)]
pub enum OrdType {
    Market,
    Limit,
    Stop,
}

impl FieldValue for OrdType {
    fn to_field(&self) -> String {
        match self {
            Self::Market => "1",
            Self::Limit => "2",
            Self::Stop => "3",
        }
        .to_string()
    }
}

/// FIX `TimeInForce(59)`.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Display)]
pub enum TimeInForce {
    Day,
    Gtc,
    Fok,
}

impl FieldValue for TimeInForce {
    fn to_field(&self) -> String {
        match self {
            Self::Day => "0",
            Self::Gtc => "1",
            Self::Fok => "4",
        }
        .to_string()
    }
}

/// FIX `PosReqType(724)`.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Display)]
pub enum PosReqType {
    Positions,
    Trades,
}

impl FieldValue for PosReqType {
    fn to_field(&self) -> String {
        match self {
            Self::Positions => "0",
            Self::Trades => "1",
        }
        .to_string()
    }
}

pub(crate) fn side_code(side: Side) -> &'static str {
    match side {
        Side::Buy => "1",
        Side::Sell => "2",
    }
}
