//! C4 — Request Factory.
//!
//! Pure constructors for every outbound message shape PrimeFX sends. None of
//! these functions touch the network, the cache, or a sequence store beyond
//! accepting already-allocated ids as arguments — callers (C8, C5) are
//! responsible for drawing ids from `primefx_sequence::SequenceStore` and for
//! handing the built [`primefx_codec::Message`] to C3 for framing and send.

pub mod error;
pub mod market_data;
pub mod order;
pub mod positions;
pub mod session;
pub mod types;

pub use error::RequestError;
pub use market_data::{market_data_request, subscribe_with_counter_pair};
pub use order::{close_by_id_order, els_bracket, new_order_single};
pub use positions::{order_mass_status_request, order_status_request, request_for_positions};
pub use session::{collateral_inquiry, trading_session_status_request};
pub use types::{OrdType, PosReqType, SubscriptionRequestType, TimeInForce};
