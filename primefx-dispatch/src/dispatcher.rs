use crate::{
    error::DispatchError,
    events::{DispatchEvent, DispatchOutcome},
    pending::{PendingEvents, PendingUpdate},
};
use chrono::Utc;
use primefx_cache::{Account, Position, StateCache};
use primefx_codec::{tags, Message};
use primefx_instrument::{Instrument, ProductClass, Side, Tick};
use primefx_sequence::SequenceStore;
use rust_decimal::Decimal;
use smol_str::SmolStr;

const POS_REQ_STATUS_REJECTED: &str = "2";
const POS_REQ_RESULT_NO_POSITIONS: &str = "2";
const POS_REQ_TYPE_POSITIONS: &str = "0";

const PARTY_SUB_ID_HEDGING: i64 = 4000;
const PARTY_SUB_ID_SECURITIES_ACCOUNT: i64 = 2;
const PARTY_SUB_ID_USER_NAME: i64 = 22;

const EXEC_TYPE_ORDER_STATUS: &str = "I";
const EXEC_TYPE_TRADE: &str = "F";
const EXEC_TYPE_CANCELED: &str = "4";
const EXEC_TYPE_REJECTED: &str = "8";
const ORD_STATUS_NEW: &str = "0";
const ORD_STATUS_FILLED: &str = "2";
const ORD_STATUS_CANCELED: &str = "4";
const ORD_STATUS_REJECTED: &str = "8";
const ORD_TYPE_MARKET: &str = "1";
const ORD_TYPE_LIMIT: &str = "2";
const ORD_TYPE_STOP: &str = "3";
const SIDE_BUY: &str = "1";

/// Account-level fields the wire never actually carries (spec.md §6.1's tag
/// list has no entry for contract size or minimum trade size); supplied at
/// construction instead of guessed from a non-existent tag, per DESIGN.md.
#[derive(Debug, Clone, Copy)]
pub struct AccountDefaults {
    pub contract_size: Decimal,
    pub min_trade_size: Decimal,
}

impl Default for AccountDefaults {
    fn default() -> Self {
        Self { contract_size: Decimal::new(100_000, 0), min_trade_size: Decimal::ONE }
    }
}

/// C5 — Inbound Dispatcher. Cracks a decoded [`Message`] by `MsgType` and
/// applies it to the [`StateCache`], producing the strategy-facing events
/// and any outbound messages triggered as a side effect (spec.md §4.5).
pub struct InboundDispatcher<'a> {
    cache: &'a StateCache,
    sequence: &'a SequenceStore,
    pending: &'a PendingEvents,
    account_defaults: AccountDefaults,
}

impl<'a> InboundDispatcher<'a> {
    pub fn new(
        cache: &'a StateCache,
        sequence: &'a SequenceStore,
        pending: &'a PendingEvents,
        account_defaults: AccountDefaults,
    ) -> Self {
        Self { cache, sequence, pending, account_defaults }
    }

    pub fn dispatch(&self, msg: &Message) -> Result<DispatchOutcome, DispatchError> {
        let msg_type = msg.require_str(tags::MSG_TYPE)?;
        match msg_type {
            tags::msg_type::TRADING_SESSION_STATUS => self.trading_session_status(msg),
            tags::msg_type::COLLATERAL_REPORT => self.collateral_report(msg),
            tags::msg_type::REQUEST_FOR_POSITIONS_ACK => self.request_for_positions_ack(msg),
            tags::msg_type::POSITION_REPORT => self.position_report(msg),
            tags::msg_type::EXECUTION_REPORT => self.execution_report(msg),
            tags::msg_type::MARKET_DATA_SNAPSHOT_FULL_REFRESH => self.market_data_snapshot(msg),
            tags::msg_type::MARKET_DATA_REQUEST_REJECT => {
                Ok(self.text_ack(msg, "MarketDataRequestReject"))
            }
            tags::msg_type::COLLATERAL_INQUIRY_ACK => Ok(self.text_ack(msg, "CollateralInquiryAck")),
            other => Err(DispatchError::UnknownMsgType(other.to_string())),
        }
    }

    fn text_ack(&self, msg: &Message, kind: &str) -> DispatchOutcome {
        let text = msg.get_str(tags::TEXT).unwrap_or_default();
        DispatchOutcome::with_event(DispatchEvent::RequestAck {
            kind: SmolStr::new(kind),
            text: SmolStr::new(text),
        })
    }

    /// `TradingSessionStatus(h)` (spec.md §4.5).
    fn trading_session_status(&self, msg: &Message) -> Result<DispatchOutcome, DispatchError> {
        let mut outcome = DispatchOutcome::default();

        let status_open = msg.get_str(tags::TRAD_SES_STATUS) == Some("3");
        self.cache.set_trading_desk_open(status_open);
        outcome.push_event(DispatchEvent::TradingDeskOpen(status_open));

        for entry in msg.group(tags::NO_RELATED_SYM, tags::SYMBOL)? {
            if let Some(instrument) = instrument_from_security_entry(&entry)? {
                self.cache.insert_instrument(instrument.clone());
                outcome.push_event(DispatchEvent::InstrumentDefined(instrument));
            }
        }

        for param in msg.group(tags::fxcm::NO_PARAMS, tags::fxcm::PARAM_NAME)? {
            let name = param.get_str(tags::fxcm::PARAM_NAME).unwrap_or_default();
            let value = param.get_str(tags::fxcm::PARAM_VALUE).unwrap_or_default();
            self.cache.set_parameter(name, value);
        }

        let coll_inquiry_id = self.sequence.next_request_id();
        outcome.push_outbound(primefx_request::collateral_inquiry(coll_inquiry_id));

        Ok(outcome)
    }

    /// `CollateralReport(BA)` (spec.md §4.5).
    fn collateral_report(&self, msg: &Message) -> Result<DispatchOutcome, DispatchError> {
        let account_id = msg.require_str(tags::ACCOUNT)?;
        let balance = msg.require_decimal(tags::CASH_OUTSTANDING)?;
        let used_margin = msg.get_decimal(tags::fxcm::USED_MARGIN)?.unwrap_or(Decimal::ZERO);

        let mut securities_account_id = None;
        let mut hedging = false;

        for party in msg.group(tags::NO_PARTY_IDS, tags::PARTY_ID)? {
            for sub_id in party.group(tags::NO_PARTY_SUB_IDS, tags::PARTY_SUB_ID_TYPE)? {
                let Some(sub_type) = sub_id.get_int(tags::PARTY_SUB_ID_TYPE)? else { continue };
                let value = sub_id.get_str(tags::PARTY_SUB_ID).unwrap_or_default();
                match sub_type {
                    PARTY_SUB_ID_HEDGING => hedging = value == "Y",
                    PARTY_SUB_ID_SECURITIES_ACCOUNT => {
                        securities_account_id = Some(SmolStr::new(value));
                    }
                    PARTY_SUB_ID_USER_NAME => {}
                    _ => {}
                }
            }
        }

        let base_currency = self
            .cache
            .parameter("BASE_CRNCY")
            .map(SmolStr::new)
            .unwrap_or_else(|| SmolStr::new("USD"));

        let previously_known = self.cache.account(account_id).is_some();
        let equity = balance;
        let free_margin = equity - used_margin;

        let account = Account::new(
            SmolStr::new(account_id),
            securities_account_id,
            base_currency,
            balance,
            used_margin,
            Decimal::ZERO,
            self.account_defaults.contract_size,
            hedging,
            self.account_defaults.min_trade_size,
            equity,
            free_margin,
        );
        self.cache.upsert_account(account.clone());

        let event = if previously_known {
            DispatchEvent::AccountChanged(account)
        } else {
            DispatchEvent::AccountReady(account)
        };
        Ok(DispatchOutcome::with_event(event))
    }

    /// `RequestForPositionsAck(AO)` (spec.md §4.5).
    fn request_for_positions_ack(&self, msg: &Message) -> Result<DispatchOutcome, DispatchError> {
        let mut outcome = DispatchOutcome::default();

        let rejected = msg.get_str(tags::POS_REQ_STATUS) == Some(POS_REQ_STATUS_REJECTED)
            && msg.get_str(tags::POS_REQ_RESULT) == Some(POS_REQ_RESULT_NO_POSITIONS);

        if rejected {
            if let Some(account_id) = msg.get_str(tags::ACCOUNT) {
                self.cache.clear_positions_for_account(account_id);
            }
            if let Some(text) = msg.get_str(tags::TEXT) {
                outcome.push_event(DispatchEvent::RequestAck {
                    kind: SmolStr::new("RequestForPositionsAck"),
                    text: SmolStr::new(text),
                });
            }
        }

        Ok(outcome)
    }

    /// `PositionReport(AP)` (spec.md §4.5).
    fn position_report(&self, msg: &Message) -> Result<DispatchOutcome, DispatchError> {
        let mut outcome = DispatchOutcome::default();

        if msg.get_str(tags::POS_REQ_TYPE) != Some(POS_REQ_TYPE_POSITIONS) {
            return Ok(outcome);
        }

        let position_id = msg.require_str(tags::fxcm::POS_ID)?;
        if self.cache.position(position_id).is_some() {
            return Ok(outcome);
        }

        let long_qty = msg.get_decimal(tags::LONG_QTY)?;
        let short_qty = msg.get_decimal(tags::SHORT_QTY)?;
        let (side, quantity) = match (long_qty, short_qty) {
            (Some(qty), _) if !qty.is_zero() => (Side::Buy, qty),
            (_, Some(qty)) if !qty.is_zero() => (Side::Sell, qty),
            _ => return Ok(outcome),
        };

        let account_id = msg.require_str(tags::ACCOUNT)?;
        let symbol = msg.require_str(tags::SYMBOL)?;
        let entry_price = msg.require_decimal(tags::SETTL_PRICE)?;
        let time_exchange = msg
            .get_utc_timestamp(tags::fxcm::POS_OPEN_TIME)?
            .unwrap_or_else(Utc::now);

        let mut position = Position::new(
            SmolStr::new(position_id),
            SmolStr::new(""),
            None,
            SmolStr::new(account_id),
            SmolStr::new(symbol),
            side,
            quantity,
            entry_price,
            None,
            None,
            None,
            Decimal::ZERO,
            time_exchange,
            None,
        );

        for update in self.pending.take_ready(position_id) {
            match update {
                PendingUpdate::StopPrice(price) => position.stop_price = Some(price),
                PendingUpdate::TakeProfitPrice(price) => position.take_profit_price = Some(price),
            }
        }

        self.cache.insert_position(position.clone())?;
        outcome.push_event(DispatchEvent::PositionNew(position));

        let mass_status_req_id = self.sequence.next_request_id();
        outcome.push_outbound(primefx_request::order_mass_status_request(mass_status_req_id, account_id)?);

        Ok(outcome)
    }

    /// `ExecutionReport(8)` (spec.md §4.5 decision table, + S5's Rejected
    /// case which the table's prose omits but the seed scenario requires).
    fn execution_report(&self, msg: &Message) -> Result<DispatchOutcome, DispatchError> {
        let mut outcome = DispatchOutcome::default();

        let exec_type = msg.get_str(tags::EXEC_TYPE).unwrap_or_default();
        let ord_status = msg.get_str(tags::ORD_STATUS).unwrap_or_default();
        let ord_type = msg.get_str(tags::ORD_TYPE).unwrap_or_default();

        if ord_status == ORD_STATUS_REJECTED || exec_type == EXEC_TYPE_REJECTED {
            let text = msg.get_str(tags::TEXT).unwrap_or_default();
            outcome.push_event(DispatchEvent::RequestAck {
                kind: SmolStr::new("ExecutionReport:Reject"),
                text: SmolStr::new(text),
            });
            return Ok(outcome);
        }

        match (exec_type, ord_status, ord_type) {
            (EXEC_TYPE_ORDER_STATUS, ORD_STATUS_NEW, ORD_TYPE_LIMIT) => {
                self.attach_child_price(msg, &mut outcome, true)?;
            }
            (EXEC_TYPE_ORDER_STATUS, ORD_STATUS_NEW, ORD_TYPE_STOP) => {
                self.attach_child_price(msg, &mut outcome, false)?;
            }
            (EXEC_TYPE_TRADE, ORD_STATUS_FILLED, ORD_TYPE_MARKET) => {
                self.open_position_from_fill(msg, &mut outcome)?;
            }
            (EXEC_TYPE_TRADE, ORD_STATUS_FILLED, ORD_TYPE_LIMIT)
            | (EXEC_TYPE_TRADE, ORD_STATUS_FILLED, ORD_TYPE_STOP) => {
                self.remove_position(msg, &mut outcome)?;
            }
            (EXEC_TYPE_CANCELED, ORD_STATUS_CANCELED, _) => {
                self.remove_position(msg, &mut outcome)?;
            }
            _ => {}
        }

        Ok(outcome)
    }

    fn attach_child_price(
        &self,
        msg: &Message,
        outcome: &mut DispatchOutcome,
        is_take_profit: bool,
    ) -> Result<(), DispatchError> {
        let Some(position_id) = msg.get_str(tags::fxcm::POS_ID) else { return Ok(()) };
        let Some(price) = msg.get_decimal(tags::PRICE)? else { return Ok(()) };

        let update = if is_take_profit {
            PendingUpdate::TakeProfitPrice(price)
        } else {
            PendingUpdate::StopPrice(price)
        };

        if self.cache.position(position_id).is_none() {
            self.pending.defer(SmolStr::new(position_id), update, Utc::now());
            return Ok(());
        }

        self.cache.update_position(position_id, |p| match update {
            PendingUpdate::StopPrice(price) => p.stop_price = Some(price),
            PendingUpdate::TakeProfitPrice(price) => p.take_profit_price = Some(price),
        })?;

        if let Some(position) = self.cache.position(position_id) {
            outcome.push_event(DispatchEvent::PositionUpdate(position));
        }
        Ok(())
    }

    fn open_position_from_fill(
        &self,
        msg: &Message,
        outcome: &mut DispatchOutcome,
    ) -> Result<(), DispatchError> {
        let Some(position_id) = msg.get_str(tags::fxcm::POS_ID) else { return Ok(()) };
        if self.cache.position(position_id).is_some() {
            return Ok(());
        }

        let account_id = msg.require_str(tags::ACCOUNT)?;
        let symbol = msg.require_str(tags::SYMBOL)?;
        let cl_ord_id = msg.get_str(tags::CL_ORD_ID).unwrap_or_default();
        let side = if msg.get_str(tags::SIDE) == Some(SIDE_BUY) { Side::Buy } else { Side::Sell };
        let quantity = msg.require_decimal(tags::LAST_QTY)?;
        let entry_price = msg.require_decimal(tags::LAST_PX)?;
        let time_exchange = msg.get_utc_timestamp(tags::TRANSACT_TIME)?.unwrap_or_else(Utc::now);

        let mut position = Position::new(
            SmolStr::new(position_id),
            SmolStr::new(cl_ord_id),
            None,
            SmolStr::new(account_id),
            SmolStr::new(symbol),
            side,
            quantity,
            entry_price,
            None,
            None,
            None,
            Decimal::ZERO,
            time_exchange,
            None,
        );

        for update in self.pending.take_ready(position_id) {
            match update {
                PendingUpdate::StopPrice(price) => position.stop_price = Some(price),
                PendingUpdate::TakeProfitPrice(price) => position.take_profit_price = Some(price),
            }
        }

        self.cache.insert_position(position.clone())?;
        tracing::info!(target: "tradelog", position_id, account_id, symbol, %side, %quantity, %entry_price, "position opened");
        outcome.push_event(DispatchEvent::PositionNew(position));
        Ok(())
    }

    fn remove_position(&self, msg: &Message, outcome: &mut DispatchOutcome) -> Result<(), DispatchError> {
        let Some(position_id) = msg.get_str(tags::fxcm::POS_ID) else { return Ok(()) };
        if self.cache.remove_position(position_id).is_some() {
            outcome.push_event(DispatchEvent::PositionRemoved(SmolStr::new(position_id)));
        }
        Ok(())
    }

    /// `MarketDataSnapshotFullRefresh(W)` plus the post-tick P&L recompute
    /// (spec.md §4.5's numbered steps after the dispatch table).
    fn market_data_snapshot(&self, msg: &Message) -> Result<DispatchOutcome, DispatchError> {
        let mut outcome = DispatchOutcome::default();

        let symbol = msg.require_str(tags::SYMBOL)?;
        let time_exchange = msg.get_utc_timestamp(tags::SENDING_TIME)?.unwrap_or_else(Utc::now);

        let mut bid = None;
        let mut ask = None;
        let mut session_high = None;
        let mut session_low = None;
        for entry in msg.group(tags::NO_MD_ENTRIES, tags::MD_ENTRY_TYPE)? {
            let Some(entry_type) = entry.get_str(tags::MD_ENTRY_TYPE) else { continue };
            let Some(px) = entry.get_decimal(tags::MD_ENTRY_PX)? else { continue };
            match entry_type {
                tags::md_entry_type::BID => bid = Some(px),
                tags::md_entry_type::OFFER => ask = Some(px),
                tags::md_entry_type::SESSION_HIGH => session_high = Some(px),
                tags::md_entry_type::SESSION_LOW => session_low = Some(px),
                _ => {}
            }
        }

        let (Some(bid), Some(ask)) = (bid, ask) else {
            return Ok(outcome);
        };
        let session_high = session_high.unwrap_or(ask);
        let session_low = session_low.unwrap_or(bid);

        let tick = Tick::new(SmolStr::new(symbol), time_exchange, bid, ask, session_high, session_low);
        self.cache.record_tick(tick.clone());
        outcome.push_event(DispatchEvent::Tick(tick));

        self.recompute_symbol_positions(symbol, bid, ask, &mut outcome)?;

        Ok(outcome)
    }

    fn recompute_symbol_positions(
        &self,
        symbol: &str,
        bid: Decimal,
        ask: Decimal,
        outcome: &mut DispatchOutcome,
    ) -> Result<(), DispatchError> {
        let Some(instrument) = self.cache.instrument(symbol) else { return Ok(()) };

        let mut touched_accounts: Vec<SmolStr> = Vec::new();

        for position in self.cache.positions_for_symbol(symbol) {
            let Some(account) = self.cache.account(&position.account_id) else { continue };
            let conversion_rate = if account.base_currency == instrument.quote_currency {
                None
            } else {
                primefx_instrument::counter_pair(symbol, &account.base_currency)
                    .and_then(|pair| self.cache.latest_tick(pair.as_str()))
                    .map(|t| t.bid)
            };

            let pnl = crate::pnl::recompute_position_pnl(&position, instrument.point_size, bid, ask, conversion_rate);
            self.cache.update_position(&position.position_id, |p| p.pnl = pnl)?;

            if let Some(updated) = self.cache.position(&position.position_id) {
                outcome.push_event(DispatchEvent::PositionUpdate(updated));
            }
            if !touched_accounts.contains(&position.account_id) {
                touched_accounts.push(position.account_id.clone());
            }
        }

        for account_id in touched_accounts {
            self.cache.refresh_account_derived(&account_id)?;
            if let Some(account) = self.cache.account(&account_id) {
                outcome.push_event(DispatchEvent::AccountChanged(account));
            }
        }

        Ok(())
    }
}

fn instrument_from_security_entry(entry: &Message) -> Result<Option<Instrument>, DispatchError> {
    let Some(symbol) = entry.get_str(tags::SYMBOL) else { return Ok(None) };
    let precision = entry.get_int(tags::fxcm::SYM_PRECISION)?.unwrap_or(5) as u8;
    let Some(point_size) = entry.get_decimal(tags::fxcm::SYM_POINT_SIZE)? else { return Ok(None) };
    let round_lot = entry.get_decimal(tags::ROUND_LOT)?.unwrap_or(Decimal::ONE);
    let min_qty = entry.get_decimal(tags::fxcm::MIN_QUANTITY)?.unwrap_or(Decimal::ONE);
    let max_qty = entry.get_decimal(tags::fxcm::MAX_QUANTITY)?.unwrap_or_else(|| Decimal::new(100_000_000, 0));
    let contract_multiplier = entry.get_decimal(tags::CONTRACT_MULTIPLIER)?.unwrap_or(Decimal::ONE);
    let product_class = match entry.get_int(tags::fxcm::FIELD_PRODUCT_ID)? {
        Some(2) => ProductClass::Index,
        Some(4) => ProductClass::Commodity,
        _ => ProductClass::Currency,
    };

    let instrument = Instrument::new(
        symbol,
        precision,
        point_size,
        round_lot,
        min_qty,
        max_qty,
        contract_multiplier,
        product_class,
    )
    .map_err(|_| DispatchError::MalformedSecurityListEntry(symbol.to_string()))?;

    Ok(Some(instrument))
}
