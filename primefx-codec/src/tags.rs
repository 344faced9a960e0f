//! Standard FIX 4.4 tags the core depends on, plus the broker's custom tag
//! extensions (spec.md §6.1). The codec does not interpret semantics; these
//! constants exist purely so callers don't sprinkle magic numbers around.

// Standard header / trailer
pub const BEGIN_STRING: u32 = 8;
pub const BODY_LENGTH: u32 = 9;
pub const MSG_TYPE: u32 = 35;
pub const SENDER_COMP_ID: u32 = 49;
pub const TARGET_COMP_ID: u32 = 56;
pub const TARGET_SUB_ID: u32 = 57;
pub const MSG_SEQ_NUM: u32 = 34;
pub const SENDING_TIME: u32 = 52;
pub const CHECK_SUM: u32 = 10;
pub const POSS_DUP_FLAG: u32 = 43;

// Logon / Logout / Heartbeat / admin
pub const ENCRYPT_METHOD: u32 = 98;
pub const HEART_BT_INT: u32 = 108;
pub const RESET_SEQ_NUM_FLAG: u32 = 141;
pub const USERNAME: u32 = 553;
pub const PASSWORD: u32 = 554;
pub const TEST_REQ_ID: u32 = 112;
pub const BEGIN_SEQ_NO: u32 = 7;
pub const END_SEQ_NO: u32 = 16;
pub const NEW_SEQ_NO: u32 = 36;
pub const GAP_FILL_FLAG: u32 = 123;
pub const REF_SEQ_NUM: u32 = 45;

// Reject / BusinessMessageReject
pub const TEXT: u32 = 58;
pub const REF_TAG_ID: u32 = 371;
pub const REF_MSG_TYPE: u32 = 372;
pub const SESSION_REJECT_REASON: u32 = 373;
pub const BUSINESS_REJECT_REASON: u32 = 380;
pub const BUSINESS_REJECT_REF_ID: u32 = 379;

// Security list / instrument definition
pub const ROUND_LOT: u32 = 561;
pub const CONTRACT_MULTIPLIER: u32 = 231;

// Market data
pub const MD_REQ_ID: u32 = 262;
pub const SUBSCRIPTION_REQUEST_TYPE: u32 = 263;
pub const MARKET_DEPTH: u32 = 264;
pub const NO_RELATED_SYM: u32 = 146;
pub const SYMBOL: u32 = 55;
pub const NO_MD_ENTRY_TYPES: u32 = 267;
pub const MD_ENTRY_TYPE: u32 = 269;
pub const NO_MD_ENTRIES: u32 = 268;
pub const MD_ENTRY_PX: u32 = 270;

// Orders / executions
pub const ACCOUNT: u32 = 1;
pub const CL_ORD_ID: u32 = 11;
pub const ORIG_CL_ORD_ID: u32 = 41;
pub const ORDER_ID: u32 = 37;
pub const EXEC_ID: u32 = 17;
pub const EXEC_TYPE: u32 = 150;
pub const ORD_STATUS: u32 = 39;
pub const ORD_TYPE: u32 = 40;
pub const SIDE: u32 = 54;
pub const ORDER_QTY: u32 = 38;
pub const TIME_IN_FORCE: u32 = 59;
pub const PRICE: u32 = 44;
pub const STOP_PX: u32 = 99;
pub const TRANSACT_TIME: u32 = 60;
pub const LEAVES_QTY: u32 = 151;
pub const CUM_QTY: u32 = 14;
pub const LAST_PX: u32 = 31;
pub const LAST_QTY: u32 = 32;
pub const CL_ORD_LINK_ID: u32 = 583;
pub const CONTINGENCY_TYPE: u32 = 1385;
pub const LIST_ID: u32 = 66;
pub const NO_ORDERS: u32 = 73;
pub const POSITION_EFFECT: u32 = 77;
pub const MASS_STATUS_REQ_ID: u32 = 584;
pub const MASS_STATUS_REQ_TYPE: u32 = 585;
pub const ORD_STATUS_REQ_ID: u32 = 790;

// Trading session
pub const TRAD_SES_REQ_ID: u32 = 335;
pub const TRADING_SESSION_ID: u32 = 336;
pub const TRAD_SES_STATUS: u32 = 340;

// Collateral / positions
pub const CASH_OUTSTANDING: u32 = 901;
pub const COLL_INQUIRY_ID: u32 = 909;
pub const POS_REQ_ID: u32 = 710;
pub const POS_REQ_TYPE: u32 = 724;
pub const POS_REQ_RESULT: u32 = 728;
pub const POS_REQ_STATUS: u32 = 729;
pub const LONG_QTY: u32 = 704;
pub const SHORT_QTY: u32 = 705;
pub const SETTL_PRICE: u32 = 730;
pub const ACCOUNT_TYPE: u32 = 581;
pub const NO_PARTY_IDS: u32 = 453;
pub const PARTY_ID: u32 = 448;
pub const PARTY_ID_SOURCE: u32 = 447;
pub const PARTY_ROLE: u32 = 452;
pub const NO_PARTY_SUB_IDS: u32 = 802;
pub const PARTY_SUB_ID: u32 = 523;
pub const PARTY_SUB_ID_TYPE: u32 = 803;

/// FIX `MDEntryType(269)` values the core subscribes to (spec.md §4.4/§4.5).
pub mod md_entry_type {
    pub const BID: &str = "0";
    pub const OFFER: &str = "1";
    pub const SESSION_HIGH: &str = "7";
    pub const SESSION_LOW: &str = "8";
}

/// FXCM's custom tag extensions (spec.md §6.1).
pub mod fxcm {
    pub const SYM_ID: u32 = 9000;
    pub const SYM_PRECISION: u32 = 9001;
    pub const SYM_POINT_SIZE: u32 = 9002;
    pub const SYM_INTEREST_BUY: u32 = 9003;
    pub const SYM_INTEREST_SELL: u32 = 9004;
    pub const SYM_SORT_ORDER: u32 = 9005;
    pub const NO_PARAMS: u32 = 9016;
    pub const PARAM_NAME: u32 = 9017;
    pub const PARAM_VALUE: u32 = 9018;
    pub const REQUEST_REJECT_REASON: u32 = 9025;
    pub const ERROR_DETAILS: u32 = 9029;
    pub const USED_MARGIN: u32 = 9038;
    pub const POS_ID: u32 = 9041;
    pub const POS_OPEN_TIME: u32 = 9042;
    pub const CLOSE_SETTLE_PRICE: u32 = 9043;
    pub const POS_CLOSE_TIME: u32 = 9044;
    pub const CLOSE_PNL: u32 = 9052;
    pub const POS_COMMISSION: u32 = 9053;
    pub const CLOSE_ORDER_ID: u32 = 9054;
    pub const SUBSCRIPTION_STATUS: u32 = 9076;
    pub const FIELD_PRODUCT_ID: u32 = 9080;
    pub const COND_DIST_STOP: u32 = 9090;
    pub const COND_DIST_LIMIT: u32 = 9091;
    pub const COND_DIST_ENTRY_STOP: u32 = 9092;
    pub const COND_DIST_ENTRY_LIMIT: u32 = 9093;
    pub const MAX_QUANTITY: u32 = 9094;
    pub const MIN_QUANTITY: u32 = 9095;
    pub const TRADING_STATUS: u32 = 9096;
    /// FXCM_POS_ID used as the close-by-id tag on a close order.
    pub const POS_ID_FOR_CLOSE: u32 = POS_ID;
}

/// Well-known FIX 4.4 `MsgType(35)` values the core sends or receives.
///
/// Values follow the standard FIX 4.4 dictionary (matching the original
/// QuickFIX-based `idefix` source in `examples/original_source/`), not the
/// apparent typo in the distilled prose spec that wrote `CollateralReport`
/// and `PositionReport` as sharing the code `AP` — see `DESIGN.md`.
pub mod msg_type {
    pub const LOGON: &str = "A";
    pub const LOGOUT: &str = "5";
    pub const HEARTBEAT: &str = "0";
    pub const TEST_REQUEST: &str = "1";
    pub const RESEND_REQUEST: &str = "2";
    pub const REJECT: &str = "3";
    pub const SEQUENCE_RESET: &str = "4";
    pub const BUSINESS_MESSAGE_REJECT: &str = "j";
    pub const NEW_ORDER_SINGLE: &str = "D";
    pub const NEW_ORDER_LIST: &str = "E";
    pub const EXECUTION_REPORT: &str = "8";
    pub const ORDER_STATUS_REQUEST: &str = "H";
    pub const ORDER_MASS_STATUS_REQUEST: &str = "AF";
    pub const MARKET_DATA_REQUEST: &str = "V";
    pub const MARKET_DATA_SNAPSHOT_FULL_REFRESH: &str = "W";
    pub const MARKET_DATA_REQUEST_REJECT: &str = "Y";
    pub const TRADING_SESSION_STATUS_REQUEST: &str = "g";
    pub const TRADING_SESSION_STATUS: &str = "h";
    pub const COLLATERAL_INQUIRY: &str = "BB";
    pub const COLLATERAL_REPORT: &str = "BA";
    pub const COLLATERAL_INQUIRY_ACK: &str = "BG";
    pub const REQUEST_FOR_POSITIONS: &str = "AN";
    pub const REQUEST_FOR_POSITIONS_ACK: &str = "AO";
    pub const POSITION_REPORT: &str = "AP";
}
