use crate::{
    error::RequestError,
    types::{side_code, OrdType, TimeInForce},
};
use chrono::{DateTime, Utc};
use primefx_codec::{tags, Message};
use primefx_instrument::Side;
use rust_decimal::Decimal;

fn require_non_empty<'a>(value: &'a str, field: &'static str) -> Result<&'a str, RequestError> {
    if value.is_empty() {
        Err(RequestError::missing(field))
    } else {
        Ok(value)
    }
}

fn require_positive(value: Decimal, field: &'static str) -> Result<Decimal, RequestError> {
    if value <= Decimal::ZERO {
        Err(RequestError::invalid(field, "must be positive"))
    } else {
        Ok(value)
    }
}

/// New single order (spec.md §4.4). Stop orders flip to the close side and
/// carry `PositionEffect=close`, matching the OCO-style close semantics the
/// broker expects for a protective stop.
#[allow(clippy::too_many_arguments)]
pub fn new_order_single(
    cl_ord_id: impl Into<String>,
    account: &str,
    symbol: &str,
    transact_time: DateTime<Utc>,
    order_qty: Decimal,
    side: Side,
    ord_type: OrdType,
    time_in_force: TimeInForce,
    price: Option<Decimal>,
    stop_px: Option<Decimal>,
) -> Result<Message, RequestError> {
    require_non_empty(account, "account")?;
    require_non_empty(symbol, "symbol")?;
    require_positive(order_qty, "order_qty")?;

    match ord_type {
        OrdType::Limit if price.is_none() => return Err(RequestError::missing("price")),
        OrdType::Stop if stop_px.is_none() => return Err(RequestError::missing("stop_px")),
        _ => {}
    }

    let (effective_side, position_effect_close) = match ord_type {
        OrdType::Stop => (side.close_side(), true),
        _ => (side, false),
    };

    let builder = Message::builder(tags::msg_type::NEW_ORDER_SINGLE)
        .field(tags::CL_ORD_ID, cl_ord_id.into())
        .field(tags::ACCOUNT, account)
        .field(tags::SYMBOL, symbol)
        .field(tags::TRANSACT_TIME, transact_time)
        .field(tags::ORDER_QTY, order_qty)
        .field(tags::SIDE, side_code(effective_side))
        .field(tags::ORD_TYPE, ord_type)
        .field(tags::TIME_IN_FORCE, time_in_force)
        .field_opt(tags::PRICE, price)
        .field_opt(tags::STOP_PX, stop_px);

    let builder = if position_effect_close {
        builder.field(tags::POSITION_EFFECT, "C")
    } else {
        builder
    };

    Ok(builder.build())
}

/// Close-by-id order (spec.md §4.4): closes `position_id` by submitting the
/// opposite side with the broker's `FXCM_POS_ID` custom tag set.
#[allow(clippy::too_many_arguments)]
pub fn close_by_id_order(
    cl_ord_id: impl Into<String>,
    account: &str,
    symbol: &str,
    transact_time: DateTime<Utc>,
    order_qty: Decimal,
    position_side: Side,
    position_id: &str,
) -> Result<Message, RequestError> {
    require_non_empty(account, "account")?;
    require_non_empty(symbol, "symbol")?;
    require_non_empty(position_id, "position_id")?;
    require_positive(order_qty, "order_qty")?;

    let msg = Message::builder(tags::msg_type::NEW_ORDER_SINGLE)
        .field(tags::CL_ORD_ID, cl_ord_id.into())
        .field(tags::ACCOUNT, account)
        .field(tags::SYMBOL, symbol)
        .field(tags::TRANSACT_TIME, transact_time)
        .field(tags::ORDER_QTY, order_qty)
        .field(tags::SIDE, side_code(position_side.close_side()))
        .field(tags::ORD_TYPE, OrdType::Market)
        .field(tags::TIME_IN_FORCE, TimeInForce::Fok)
        .field(tags::fxcm::POS_ID_FOR_CLOSE, position_id)
        .build();

    Ok(msg)
}

/// ELS bracket order: entry + stop [+ limit] (spec.md §4.4). `cl_ord_ids`
/// must supply one id per leg (entry first, then stop, then optional
/// limit) — callers draw these from `primefx_sequence::SequenceStore`. Every
/// child leg's `ClOrdLinkID` is the entry leg's `ClOrdID`
/// (`original_source/src/FIXFactory.h`).
pub fn els_bracket(
    list_id: impl Into<String>,
    cl_ord_ids: &[String],
    account: &str,
    symbol: &str,
    transact_time: DateTime<Utc>,
    order_qty: Decimal,
    side: Side,
    stop_px: Decimal,
    limit_px: Option<Decimal>,
) -> Result<Message, RequestError> {
    require_non_empty(account, "account")?;
    require_non_empty(symbol, "symbol")?;
    require_positive(order_qty, "order_qty")?;

    let leg_count = if limit_px.is_some() { 3 } else { 2 };
    if cl_ord_ids.len() != leg_count {
        return Err(RequestError::invalid("cl_ord_ids", "must supply exactly one id per leg"));
    }

    let entry_id = &cl_ord_ids[0];
    let stop_id = &cl_ord_ids[1];

    let mut builder = Message::builder(tags::msg_type::NEW_ORDER_LIST)
        .field(tags::LIST_ID, list_id.into())
        .field(tags::CONTINGENCY_TYPE, 101_i64)
        .field(tags::ACCOUNT, account)
        .field(tags::SYMBOL, symbol)
        .group_counter(tags::NO_ORDERS, leg_count)
        // entry leg
        .field(tags::CL_ORD_ID, entry_id.clone())
        .field(tags::SIDE, side_code(side))
        .field(tags::ORD_TYPE, OrdType::Market)
        .field(tags::ORDER_QTY, order_qty)
        .field(tags::TRANSACT_TIME, transact_time)
        // stop leg
        .field(tags::CL_ORD_ID, stop_id.clone())
        .field(tags::CL_ORD_LINK_ID, entry_id.clone())
        .field(tags::SIDE, side_code(side.close_side()))
        .field(tags::ORD_TYPE, OrdType::Stop)
        .field(tags::ORDER_QTY, order_qty)
        .field(tags::STOP_PX, stop_px)
        .field(tags::POSITION_EFFECT, "C")
        .field(tags::TRANSACT_TIME, transact_time);

    if let Some(limit_px) = limit_px {
        let limit_id = &cl_ord_ids[2];
        builder = builder
            .field(tags::CL_ORD_ID, limit_id.clone())
            .field(tags::CL_ORD_LINK_ID, entry_id.clone())
            .field(tags::SIDE, side_code(side.close_side()))
            .field(tags::ORD_TYPE, OrdType::Limit)
            .field(tags::ORDER_QTY, order_qty)
            .field(tags::PRICE, limit_px)
            .field(tags::POSITION_EFFECT, "C")
            .field(tags::TRANSACT_TIME, transact_time);
    }

    Ok(builder.build())
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use rust_decimal_macros::dec;

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2018, 8, 5, 21, 3, 56).unwrap()
    }

    #[test]
    fn market_order_leaves_side_untouched() {
        let msg = new_order_single(
            "1", "ACC1", "EUR/USD", now(), dec!(10000), Side::Buy,
            OrdType::Market, TimeInForce::Fok, None, None,
        )
        .unwrap();
        assert_eq!(msg.get_str(tags::SIDE), Some("1"));
        assert_eq!(msg.get_str(tags::POSITION_EFFECT), None);
    }

    #[test]
    fn stop_order_flips_side_and_sets_position_effect_close() {
        let msg = new_order_single(
            "1", "ACC1", "EUR/USD", now(), dec!(10000), Side::Buy,
            OrdType::Stop, TimeInForce::Gtc, None, Some(dec!(1.17116)),
        )
        .unwrap();
        assert_eq!(msg.get_str(tags::SIDE), Some("2"));
        assert_eq!(msg.get_str(tags::POSITION_EFFECT), Some("C"));
    }

    #[test]
    fn missing_account_is_argument_error() {
        let err = new_order_single(
            "1", "", "EUR/USD", now(), dec!(10000), Side::Buy,
            OrdType::Market, TimeInForce::Fok, None, None,
        )
        .unwrap_err();
        assert_eq!(err, RequestError::missing("account"));
    }

    #[test]
    fn stop_order_without_stop_px_is_rejected() {
        let err = new_order_single(
            "1", "ACC1", "EUR/USD", now(), dec!(10000), Side::Buy,
            OrdType::Stop, TimeInForce::Gtc, None, None,
        )
        .unwrap_err();
        assert_eq!(err, RequestError::missing("stop_px"));
    }

    #[test]
    fn close_by_id_flips_side_and_sets_fxcm_pos_id() {
        let msg = close_by_id_order("2", "ACC1", "EUR/USD", now(), dec!(10000), Side::Buy, "P1").unwrap();
        assert_eq!(msg.get_str(tags::SIDE), Some("2"));
        assert_eq!(msg.get_str(tags::fxcm::POS_ID), Some("P1"));
    }

    #[test]
    fn els_bracket_links_children_to_entry_id() {
        let ids = vec!["10".to_string(), "11".to_string(), "12".to_string()];
        let msg = els_bracket(
            "L1", &ids, "ACC1", "EUR/USD", now(), dec!(10000), Side::Buy,
            dec!(1.17116), Some(dec!(1.17416)),
        )
        .unwrap();

        assert_eq!(msg.get_int(tags::CONTINGENCY_TYPE).unwrap(), Some(101));
        let legs = msg.group(tags::NO_ORDERS, tags::CL_ORD_ID).unwrap();
        assert_eq!(legs.len(), 3);
        assert_eq!(legs[0].get_str(tags::CL_ORD_ID), Some("10"));
        assert_eq!(legs[1].get_str(tags::CL_ORD_LINK_ID), Some("10"));
        assert_eq!(legs[2].get_str(tags::CL_ORD_LINK_ID), Some("10"));
    }

    #[test]
    fn els_bracket_wrong_id_count_is_rejected() {
        let ids = vec!["10".to_string(), "11".to_string()];
        let err = els_bracket(
            "L1", &ids, "ACC1", "EUR/USD", now(), dec!(10000), Side::Buy,
            dec!(1.17116), Some(dec!(1.17416)),
        )
        .unwrap_err();
        assert_eq!(err, RequestError::invalid("cl_ord_ids", "must supply exactly one id per leg"));
    }
}
