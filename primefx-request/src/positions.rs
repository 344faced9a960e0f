use crate::{
    error::RequestError,
    types::{PosReqType, SubscriptionRequestType},
};
use primefx_codec::{tags, Message};

/// FIX `AccountType(581)` value for a cross-margined customer account.
const ACCOUNT_TYPE_CROSS_MARGINED: &str = "3";
const PARTY_ID_SOURCE_PROPRIETARY: &str = "D";
const PARTY_ROLE_CLIENT_ID: i64 = 3;
const PARTY_SUB_ID_TYPE_SECURITIES_ACCOUNT: &str = "2";

/// Request for positions (spec.md §4.4): identifies the requester with the
/// broker's fixed `PartyID='FXCM ID'` and attaches the account's
/// securities-account number as a sub-id.
pub fn request_for_positions(
    pos_req_id: impl Into<String>,
    pos_req_type: PosReqType,
    account: &str,
    securities_account_id: &str,
) -> Result<Message, RequestError> {
    if account.is_empty() {
        return Err(RequestError::missing("account"));
    }
    if securities_account_id.is_empty() {
        return Err(RequestError::missing("securities_account_id"));
    }

    let msg = Message::builder(tags::msg_type::REQUEST_FOR_POSITIONS)
        .field(tags::POS_REQ_ID, pos_req_id.into())
        .field(tags::POS_REQ_TYPE, pos_req_type)
        .field(tags::ACCOUNT, account)
        .field(tags::SUBSCRIPTION_REQUEST_TYPE, SubscriptionRequestType::Snapshot)
        .field(tags::ACCOUNT_TYPE, ACCOUNT_TYPE_CROSS_MARGINED)
        .group_counter(tags::NO_PARTY_IDS, 1)
        .field(tags::PARTY_ID, "FXCM ID")
        .field(tags::PARTY_ID_SOURCE, PARTY_ID_SOURCE_PROPRIETARY)
        .field(tags::PARTY_ROLE, PARTY_ROLE_CLIENT_ID)
        .group_counter(tags::NO_PARTY_SUB_IDS, 1)
        .field(tags::PARTY_SUB_ID_TYPE, PARTY_SUB_ID_TYPE_SECURITIES_ACCOUNT)
        .field(tags::PARTY_SUB_ID, securities_account_id)
        .build();

    Ok(msg)
}

/// Order status request for a single order (spec.md §4.4).
pub fn order_status_request(
    ord_status_req_id: impl Into<String>,
    cl_ord_id: &str,
    account: &str,
    symbol: &str,
) -> Result<Message, RequestError> {
    if cl_ord_id.is_empty() {
        return Err(RequestError::missing("cl_ord_id"));
    }

    let msg = Message::builder(tags::msg_type::ORDER_STATUS_REQUEST)
        .field(tags::ORD_STATUS_REQ_ID, ord_status_req_id.into())
        .field(tags::CL_ORD_ID, cl_ord_id)
        .field(tags::ACCOUNT, account)
        .field(tags::SYMBOL, symbol)
        .build();

    Ok(msg)
}

/// FIX `MassStatusReqType(585)` value requesting status for every order on
/// the account — used to backfill linked SL/TP children after a
/// `PositionReport` (spec.md §4.5).
const MASS_STATUS_REQ_TYPE_ALL_ORDERS: i64 = 7;

/// Order mass status request (spec.md §4.4).
pub fn order_mass_status_request(
    mass_status_req_id: impl Into<String>,
    account: &str,
) -> Result<Message, RequestError> {
    if account.is_empty() {
        return Err(RequestError::missing("account"));
    }

    let msg = Message::builder(tags::msg_type::ORDER_MASS_STATUS_REQUEST)
        .field(tags::MASS_STATUS_REQ_ID, mass_status_req_id.into())
        .field(tags::MASS_STATUS_REQ_TYPE, MASS_STATUS_REQ_TYPE_ALL_ORDERS)
        .field(tags::ACCOUNT, account)
        .build();

    Ok(msg)
}
