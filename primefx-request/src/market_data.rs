use crate::types::SubscriptionRequestType;
use primefx_codec::{tags, tags::md_entry_type, Message};

/// Market data request for a single symbol (spec.md §4.4). `MDReqID` is
/// `"Request_<symbol>"`, `MarketDepth=0` (top of book), and the entry types
/// requested are always bid/offer/session-high/session-low.
pub fn market_data_request(symbol: &str, subscription: SubscriptionRequestType) -> Message {
    Message::builder(tags::msg_type::MARKET_DATA_REQUEST)
        .field(tags::MD_REQ_ID, format!("Request_{symbol}"))
        .field(tags::SUBSCRIPTION_REQUEST_TYPE, subscription)
        .field(tags::MARKET_DEPTH, 0_i64)
        .group_counter(tags::NO_RELATED_SYM, 1)
        .field(tags::SYMBOL, symbol)
        .group_counter(tags::NO_MD_ENTRY_TYPES, 4)
        .field(tags::MD_ENTRY_TYPE, md_entry_type::BID)
        .field(tags::MD_ENTRY_TYPE, md_entry_type::OFFER)
        .field(tags::MD_ENTRY_TYPE, md_entry_type::SESSION_HIGH)
        .field(tags::MD_ENTRY_TYPE, md_entry_type::SESSION_LOW)
        .build()
}

/// Subscribe to `symbol` and, if its counter pair (spec.md §4.4 mapping
/// table) is not already subscribed, emit a second request for it too
/// (S4). Returns one or two messages; the caller is responsible for marking
/// both symbols subscribed in the cache once sent.
pub fn subscribe_with_counter_pair(
    symbol: &str,
    account_currency: &str,
    counter_pair_already_subscribed: bool,
) -> Vec<Message> {
    let mut requests = vec![market_data_request(symbol, SubscriptionRequestType::SnapshotPlusUpdates)];

    if let Some(counter_pair) = primefx_instrument::counter_pair(symbol, account_currency) {
        if !counter_pair_already_subscribed {
            requests.push(market_data_request(
                counter_pair.as_str(),
                SubscriptionRequestType::SnapshotPlusUpdates,
            ));
        }
    }

    requests
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn market_data_request_carries_symbol_and_entry_types() {
        let msg = market_data_request("EUR/USD", SubscriptionRequestType::SnapshotPlusUpdates);
        assert_eq!(msg.get_str(tags::MD_REQ_ID), Some("Request_EUR/USD"));
        let group = msg.group(tags::NO_MD_ENTRY_TYPES, tags::MD_ENTRY_TYPE).unwrap();
        assert_eq!(group.len(), 4);
    }

    /// S4 — Counter-pair subscription.
    #[test]
    fn s4_counter_pair_subscription_emits_two_requests() {
        let requests = subscribe_with_counter_pair("USD/JPY", "EUR", false);
        assert_eq!(requests.len(), 2);
        assert_eq!(requests[0].get_str(tags::MD_REQ_ID), Some("Request_USD/JPY"));
        assert_eq!(requests[1].get_str(tags::MD_REQ_ID), Some("Request_EUR/JPY"));
    }

    #[test]
    fn counter_pair_subscription_skipped_when_already_subscribed() {
        let requests = subscribe_with_counter_pair("USD/JPY", "EUR", true);
        assert_eq!(requests.len(), 1);
    }

    #[test]
    fn no_counter_pair_means_single_request() {
        let requests = subscribe_with_counter_pair("EUR/USD", "EUR", false);
        assert_eq!(requests.len(), 1);
    }
}
