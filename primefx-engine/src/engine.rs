use crate::config::EngineConfig;
use crate::order_client::SessionOrderClient;
use primefx_cache::{Account, StateCache};
use primefx_codec::{tags, Message};
use primefx_dispatch::{DispatchEvent, InboundDispatcher, PendingEvents};
use primefx_request::PosReqType;
use primefx_sequence::{SequenceStore, SessionRole};
use primefx_session::SessionReject;
use primefx_strategy::{Strategy, StrategyDispatcher};
use std::sync::Arc;
use tokio::sync::mpsc;

/// Wires the two FIX sessions, the state cache, the inbound dispatcher and
/// the strategy dispatcher together and runs the engine until a shutdown
/// signal arrives (spec.md §4.9's "single inbound-processing thread of each
/// session" generalized to one select loop over both sessions' channels).
pub async fn run(config: EngineConfig, strategies: Vec<Box<dyn Strategy>>) -> Result<(), primefx_session::SessionError> {
    let sequence = Arc::new(match &config.order_id_path {
        Some(path) => SequenceStore::open(path.clone()),
        None => SequenceStore::in_memory(),
    });
    let cache = StateCache::new();
    let pending = PendingEvents::new();

    let mut market = primefx_session::spawn(config.market_session.clone(), SessionRole::Market, Arc::clone(&sequence));
    let mut order = primefx_session::spawn(config.order_session.clone(), SessionRole::Order, Arc::clone(&sequence));

    let order_client = SessionOrderClient::new(order.outbound.clone());
    let inbound_dispatcher = InboundDispatcher::new(&cache, &sequence, &pending, config.account_defaults());
    let mut strategy_dispatcher = StrategyDispatcher::new(config.strategy.clone(), &cache, &sequence, &order_client);
    for strategy in strategies {
        strategy_dispatcher.register(strategy);
    }

    // S1: the broker pushes TradingSessionStatus on session start, but we
    // also proactively request it — whichever arrives kicks off the
    // TradingSessionStatus -> CollateralInquiry (C5 side effect) ->
    // CollateralReport -> AccountReady chain.
    let initial_status_request =
        primefx_request::trading_session_status_request(sequence.next_request_id());
    if let Err(error) = order.outbound.send(initial_status_request).await {
        tracing::warn!(%error, "failed to send initial trading session status request");
    }

    let symbols: Vec<String> = config.strategy.symbols.clone();
    let mut subscribed_market_data = false;

    loop {
        tokio::select! {
            Some(msg) = market.inbound.recv() => {
                handle_inbound(
                    &inbound_dispatcher,
                    &mut strategy_dispatcher,
                    &cache,
                    &sequence,
                    &market.outbound,
                    &order.outbound,
                    &symbols,
                    &mut subscribed_market_data,
                    &msg,
                ).await;
            }
            Some(msg) = order.inbound.recv() => {
                handle_inbound(
                    &inbound_dispatcher,
                    &mut strategy_dispatcher,
                    &cache,
                    &sequence,
                    &market.outbound,
                    &order.outbound,
                    &symbols,
                    &mut subscribed_market_data,
                    &msg,
                ).await;
            }
            Some(reject) = market.rejects.recv() => handle_reject(&mut strategy_dispatcher, reject),
            Some(reject) = order.rejects.recv() => handle_reject(&mut strategy_dispatcher, reject),
            _ = tokio::signal::ctrl_c() => {
                tracing::info!("shutdown requested");
                break;
            }
            else => break,
        }
    }

    strategy_dispatcher.shutdown();
    order.stop().await;
    market.stop().await;
    Ok(())
}

async fn handle_inbound(
    inbound_dispatcher: &InboundDispatcher<'_>,
    strategy_dispatcher: &mut StrategyDispatcher<'_>,
    cache: &StateCache,
    sequence: &SequenceStore,
    market_out: &mpsc::Sender<Message>,
    order_out: &mpsc::Sender<Message>,
    symbols: &[String],
    subscribed_market_data: &mut bool,
    msg: &Message,
) {
    let outcome = match inbound_dispatcher.dispatch(msg) {
        Ok(outcome) => outcome,
        Err(error) => {
            tracing::warn!(%error, "failed to dispatch inbound message");
            return;
        }
    };

    for outbound in outcome.outbound {
        send_outbound(market_out, order_out, outbound).await;
    }

    for event in &outcome.events {
        if !*subscribed_market_data {
            if let Some(account) = account_ready(event) {
                *subscribed_market_data = true;
                subscribe_market_data(cache, market_out, symbols, &account.base_currency).await;
                request_positions(order_out, sequence, account).await;
            }
        }
        strategy_dispatcher.handle_event(event);
    }
}

fn handle_reject(strategy_dispatcher: &mut StrategyDispatcher<'_>, reject: SessionReject) {
    strategy_dispatcher.handle_event(&DispatchEvent::RequestAck {
        kind: "Reject".into(),
        text: reject.text.into(),
    });
}

fn account_ready(event: &DispatchEvent) -> Option<&Account> {
    match event {
        DispatchEvent::AccountReady(account) => Some(account),
        _ => None,
    }
}

/// Administrative and position requests go over the order session (FXCM
/// convention: trading-desk state lives on the order-routing connection);
/// market data requests go over the market-data session.
async fn send_outbound(market_out: &mpsc::Sender<Message>, order_out: &mpsc::Sender<Message>, message: Message) {
    let target = match message.msg_type() {
        Some(tags::msg_type::MARKET_DATA_REQUEST) => market_out,
        _ => order_out,
    };
    if let Err(error) = target.send(message).await {
        tracing::warn!(%error, "failed to forward outbound message");
    }
}

async fn subscribe_market_data(cache: &StateCache, market_out: &mpsc::Sender<Message>, symbols: &[String], account_currency: &str) {
    for symbol in symbols {
        if cache.is_subscribed(symbol) {
            continue;
        }
        let counter_pair_already_subscribed = primefx_instrument::counter_pair(symbol, account_currency)
            .map(|pair| cache.is_subscribed(pair.as_str()))
            .unwrap_or(true);
        let requests = primefx_request::subscribe_with_counter_pair(symbol, account_currency, counter_pair_already_subscribed);
        for request in requests {
            if let Err(error) = market_out.send(request).await {
                tracing::warn!(%error, "failed to send market data subscription");
            }
        }
        cache.subscribe(symbol);
        if let Some(pair) = primefx_instrument::counter_pair(symbol, account_currency) {
            cache.subscribe(pair.as_str());
        }
    }
}

async fn request_positions(order_out: &mpsc::Sender<Message>, sequence: &SequenceStore, account: &Account) {
    let pos_req_id = sequence.next_request_id();
    let securities_account_id = account.securities_account_id.as_deref().unwrap_or(account.account_id.as_str());
    match primefx_request::request_for_positions(pos_req_id, PosReqType::Positions, account.account_id.as_str(), securities_account_id) {
        Ok(message) => {
            if let Err(error) = order_out.send(message).await {
                tracing::warn!(%error, "failed to send request for positions");
            }
        }
        Err(error) => tracing::warn!(%error, "failed to build request for positions"),
    }
}
