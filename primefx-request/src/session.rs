use crate::types::SubscriptionRequestType;
use primefx_codec::{tags, Message};

/// Trading session status request (spec.md §4.4). `TradingSessionID` is
/// always `"FXCM"` — the broker's single logical trading session.
pub fn trading_session_status_request(trad_ses_req_id: impl Into<String>) -> Message {
    Message::builder(tags::msg_type::TRADING_SESSION_STATUS_REQUEST)
        .field(tags::TRAD_SES_REQ_ID, trad_ses_req_id.into())
        .field(tags::TRADING_SESSION_ID, "FXCM")
        .field(tags::SUBSCRIPTION_REQUEST_TYPE, SubscriptionRequestType::Snapshot)
        .build()
}

/// Collateral inquiry (spec.md §4.4).
pub fn collateral_inquiry(coll_inquiry_id: impl Into<String>) -> Message {
    Message::builder(tags::msg_type::COLLATERAL_INQUIRY)
        .field(tags::COLL_INQUIRY_ID, coll_inquiry_id.into())
        .field(tags::TRADING_SESSION_ID, "FXCM")
        .field(tags::SUBSCRIPTION_REQUEST_TYPE, SubscriptionRequestType::Snapshot)
        .build()
}
