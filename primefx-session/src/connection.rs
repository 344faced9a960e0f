use crate::{
    config::SessionConfig,
    error::SessionError,
    machine::{OutboundFrame, SessionAction, SessionMachine},
    state::SessionState,
};
use chrono::Utc;
use primefx_codec::{wire, Message};
use primefx_sequence::{SessionRole, SequenceStore};
use std::sync::Arc;
use tokio::{
    io::{AsyncReadExt, AsyncWriteExt},
    net::TcpStream,
    sync::mpsc,
    task::JoinHandle,
};

const SOH: u8 = 0x01;

/// `Reject(3)` / `BusinessMessageReject(j)`, surfaced to the host so it can
/// forward to the strategy's `on_request_ack` (spec.md §7).
#[derive(Debug, Clone)]
pub struct SessionReject {
    pub ref_msg_type: Option<String>,
    pub ref_tag_id: Option<String>,
    pub text: String,
}

/// Channels and background task for one live FIX session. Dropping every
/// clone of `outbound` and the handle itself lets the task exit on its own;
/// call [`SessionHandle::stop`] for a clean Logout-then-disconnect.
pub struct SessionHandle {
    pub inbound: mpsc::Receiver<Message>,
    pub outbound: mpsc::Sender<Message>,
    pub rejects: mpsc::Receiver<SessionReject>,
    stop: mpsc::Sender<()>,
    task: JoinHandle<()>,
}

impl SessionHandle {
    /// Request a graceful Logout and wait for the background task to exit.
    pub async fn stop(self) {
        let _ = self.stop.send(()).await;
        let _ = self.task.await;
    }
}

/// Spawn a session's background task: connects, logs on, and runs the
/// read/write/heartbeat loop, reconnecting with backoff on any transport or
/// heartbeat failure (spec.md §4.3, §7).
pub fn spawn(config: SessionConfig, role: SessionRole, sequence: Arc<SequenceStore>) -> SessionHandle {
    let (inbound_tx, inbound_rx) = mpsc::channel(256);
    let (outbound_tx, outbound_rx) = mpsc::channel(256);
    let (reject_tx, reject_rx) = mpsc::channel(64);
    let (stop_tx, stop_rx) = mpsc::channel(1);

    let task = tokio::spawn(run(config, role, sequence, inbound_tx, outbound_rx, reject_tx, stop_rx));

    SessionHandle { inbound: inbound_rx, outbound: outbound_tx, rejects: reject_rx, stop: stop_tx, task }
}

async fn run(
    config: SessionConfig,
    role: SessionRole,
    sequence: Arc<SequenceStore>,
    inbound_tx: mpsc::Sender<Message>,
    mut outbound_rx: mpsc::Receiver<Message>,
    reject_tx: mpsc::Sender<SessionReject>,
    mut stop_rx: mpsc::Receiver<()>,
) {
    let mut backoff = crate::backoff::ReconnectBackoff::standard();

    loop {
        match connect_and_serve(&config, role, &sequence, &inbound_tx, &mut outbound_rx, &reject_tx, &mut stop_rx).await
        {
            Ok(()) => {
                tracing::info!(role = %role, "session stopped cleanly");
                break;
            }
            Err(error) => {
                tracing::warn!(role = %role, %error, "session disconnected, reconnecting");
                let delay = backoff.next_delay(&mut rand::rng());
                tokio::time::sleep(delay).await;
            }
        }
    }
}

async fn connect_and_serve(
    config: &SessionConfig,
    role: SessionRole,
    sequence: &Arc<SequenceStore>,
    inbound_tx: &mpsc::Sender<Message>,
    outbound_rx: &mut mpsc::Receiver<Message>,
    reject_tx: &mpsc::Sender<SessionReject>,
    stop_rx: &mut mpsc::Receiver<()>,
) -> Result<(), SessionError> {
    let stream = TcpStream::connect((config.host.as_str(), config.port)).await?;
    let (mut reader, mut writer) = stream.into_split();

    let mut machine = SessionMachine::new(sequence, role, config.heartbeat_interval_secs, config.reset_seq_num_on_logon, Utc::now());
    machine.start()?;
    let logon = machine.on_transport_up(&config.username, &config.password, config.heartbeat_interval_secs, Utc::now())?;
    write_frame(&mut writer, config, logon).await?;

    let mut read_buf: Vec<u8> = Vec::with_capacity(4096);
    let mut chunk = [0_u8; 4096];
    let mut ticker = tokio::time::interval(tokio::time::Duration::from_secs(1));

    loop {
        tokio::select! {
            read_result = reader.read(&mut chunk) => {
                let n = read_result?;
                if n == 0 {
                    return Err(SessionError::Transport(std::io::Error::new(
                        std::io::ErrorKind::UnexpectedEof,
                        "counterparty closed the connection",
                    )));
                }
                read_buf.extend_from_slice(&chunk[..n]);
                while let Some(raw) = extract_frame(&mut read_buf) {
                    match wire::decode(&raw) {
                        Ok(msg) => {
                            let action = machine.on_inbound(&msg, Utc::now())?;
                            handle_action(action, &mut writer, config, inbound_tx, reject_tx).await?;
                            if machine.state() == SessionState::Disconnected {
                                return Ok(());
                            }
                        }
                        Err(error) => {
                            // spec.md §7: malformed frames log and drop; session continues.
                            tracing::warn!(%error, "dropping malformed inbound frame");
                        }
                    }
                }
            }
            _ = ticker.tick() => {
                if let Some(frame) = machine.heartbeat_tick(Utc::now())? {
                    write_frame(&mut writer, config, frame).await?;
                }
            }
            Some(outbound) = outbound_rx.recv() => {
                match machine.send_application_message(outbound, Utc::now()) {
                    Ok(frame) => write_frame(&mut writer, config, frame).await?,
                    Err(error) => tracing::warn!(%error, "dropped outbound message, session not logged on"),
                }
            }
            _ = stop_rx.recv() => {
                let frame = machine.request_stop(Utc::now())?;
                write_frame(&mut writer, config, frame).await?;
                return Ok(());
            }
        }
    }
}

async fn handle_action(
    action: SessionAction,
    writer: &mut tokio::net::tcp::OwnedWriteHalf,
    config: &SessionConfig,
    inbound_tx: &mpsc::Sender<Message>,
    reject_tx: &mpsc::Sender<SessionReject>,
) -> Result<(), SessionError> {
    match action {
        SessionAction::LoggedOn | SessionAction::Ignore => {}
        SessionAction::Deliver(msg) => {
            let _ = inbound_tx.send(msg).await;
        }
        SessionAction::Reply(frame) | SessionAction::ResendRequest(frame) => {
            write_frame(writer, config, frame).await?;
        }
        SessionAction::Rejected { ref_msg_type, ref_tag_id, text } => {
            let _ = reject_tx.send(SessionReject { ref_msg_type, ref_tag_id, text }).await;
        }
        SessionAction::Disconnect => {}
    }
    Ok(())
}

async fn write_frame(
    writer: &mut tokio::net::tcp::OwnedWriteHalf,
    config: &SessionConfig,
    frame: OutboundFrame,
) -> Result<(), SessionError> {
    let header = wire::Header {
        sender_comp_id: &config.sender_comp_id,
        target_comp_id: &config.target_comp_id,
        target_sub_id: &config.target_sub_id,
        msg_seq_num: frame.seq_num,
        sending_time: Utc::now(),
    };
    let bytes = wire::encode(&header, &frame.message);
    writer.write_all(&bytes).await?;
    Ok(())
}

/// Scan `buf` for a complete FIX frame (ending in the `10=XXX\x01` checksum
/// trailer) and, if found, drain and return it.
fn extract_frame(buf: &mut Vec<u8>) -> Option<Vec<u8>> {
    let needle = [SOH, b'1', b'0', b'='];
    let trailer_start = buf.windows(needle.len()).position(|w| w == needle)?;
    let value_start = trailer_start + needle.len();
    let soh_offset = buf[value_start..].iter().position(|&b| b == SOH)?;
    let frame_end = value_start + soh_offset + 1;
    Some(buf.drain(..frame_end).collect())
}
