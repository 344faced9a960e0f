use crate::{
    admin,
    error::SessionError,
    heartbeat::{HeartbeatAction, HeartbeatMonitor},
    sequence_discipline::{self, SequenceAction},
    state::SessionState,
};
use chrono::{DateTime, Utc};
use primefx_codec::{tags, Message};
use primefx_sequence::{SessionRole, SequenceStore};

/// A `Message` paired with the outbound `MsgSeqNum` it was assigned at
/// dequeue-and-send time (spec.md §5: "assigned at dequeue-and-send time,
/// not at enqueue time").
#[derive(Debug, Clone)]
pub struct OutboundFrame {
    pub seq_num: u32,
    pub message: Message,
}

/// What the caller should do in response to one inbound message or timer
/// tick, decided by [`SessionMachine`].
#[derive(Debug, Clone)]
pub enum SessionAction {
    /// Session reached `LoggedOn`.
    LoggedOn,
    /// An application message to hand up to `primefx-dispatch`.
    Deliver(Message),
    /// An admin reply the machine wants sent immediately (e.g. a `Heartbeat`
    /// echoing a `TestRequest`'s `TestReqID`).
    Reply(OutboundFrame),
    /// `Reject(3)` or `BusinessMessageReject(j)` (spec.md §4.3 "Rejects").
    Rejected { ref_msg_type: Option<String>, ref_tag_id: Option<String>, text: String },
    /// A sequence gap was detected; ask for a resend.
    ResendRequest(OutboundFrame),
    /// Counterparty logged out, or the session's own logout completed.
    Disconnect,
    /// Nothing actionable (e.g. a duplicate already seen via `PossDupFlag`).
    Ignore,
}

/// The per-session finite state machine described in spec.md §4.3. Holds no
/// transport; callers drive it with decoded inbound messages and timer
/// ticks, and are responsible for actually writing the bytes of any
/// message it hands back.
pub struct SessionMachine<'a> {
    sequence: &'a SequenceStore,
    role: SessionRole,
    state: SessionState,
    heartbeat: HeartbeatMonitor,
    reset_seq_num_on_logon: bool,
}

impl<'a> SessionMachine<'a> {
    pub fn new(
        sequence: &'a SequenceStore,
        role: SessionRole,
        heartbeat_interval_secs: u32,
        reset_seq_num_on_logon: bool,
        now: DateTime<Utc>,
    ) -> Self {
        Self {
            sequence,
            role,
            state: SessionState::Disconnected,
            heartbeat: HeartbeatMonitor::new(heartbeat_interval_secs, now),
            reset_seq_num_on_logon,
        }
    }

    pub fn state(&self) -> SessionState {
        self.state
    }

    /// Host requested the session start connecting.
    pub fn start(&mut self) -> Result<(), SessionError> {
        self.require_state(SessionState::Disconnected, "Connecting")?;
        self.state = SessionState::Connecting;
        Ok(())
    }

    /// The transport is up; build and account for the `Logon(A)`.
    pub fn on_transport_up(
        &mut self,
        username: &str,
        password: &str,
        heartbeat_interval_secs: u32,
        now: DateTime<Utc>,
    ) -> Result<OutboundFrame, SessionError> {
        self.require_state(SessionState::Connecting, "LoggingOn")?;
        if self.reset_seq_num_on_logon {
            self.sequence.reset_outbound(self.role);
            self.sequence.reset_inbound(self.role, 1);
        }
        let frame = self.stamp(admin::logon(username, password, heartbeat_interval_secs, self.reset_seq_num_on_logon));
        self.heartbeat.record_outbound(now);
        self.state = SessionState::LoggingOn;
        Ok(frame)
    }

    /// The transport dropped, from any state. Resets to `Disconnected` so
    /// the caller can back off and retry.
    pub fn on_transport_down(&mut self) {
        self.state = SessionState::Disconnected;
    }

    /// Host requested a graceful shutdown.
    pub fn request_stop(&mut self, now: DateTime<Utc>) -> Result<OutboundFrame, SessionError> {
        self.require_state(SessionState::LoggedOn, "LoggingOut")?;
        let frame = self.stamp(admin::logout(None));
        self.heartbeat.record_outbound(now);
        self.state = SessionState::LoggingOut;
        Ok(frame)
    }

    /// Route one decoded inbound message through the state machine.
    pub fn on_inbound(&mut self, msg: &Message, now: DateTime<Utc>) -> Result<SessionAction, SessionError> {
        self.heartbeat.record_inbound(now);

        let msg_type = msg.require_str(tags::MSG_TYPE)?;
        match msg_type {
            tags::msg_type::LOGON if self.state == SessionState::LoggingOn => {
                let seq = msg.require_int(tags::MSG_SEQ_NUM)? as u32;
                self.sequence.advance_inbound(self.role, seq);
                self.state = SessionState::LoggedOn;
                Ok(SessionAction::LoggedOn)
            }
            tags::msg_type::LOGOUT => {
                self.state = SessionState::Disconnected;
                Ok(SessionAction::Disconnect)
            }
            tags::msg_type::HEARTBEAT => Ok(SessionAction::Ignore),
            tags::msg_type::TEST_REQUEST => {
                let test_req_id = msg.require_str(tags::TEST_REQ_ID)?;
                let frame = self.stamp(admin::heartbeat(Some(test_req_id)));
                self.heartbeat.record_outbound(now);
                Ok(SessionAction::Reply(frame))
            }
            tags::msg_type::RESEND_REQUEST => {
                let new_seq_no = self.sequence.outbound_last(self.role) + 1;
                let frame = self.stamp(admin::gap_fill(new_seq_no));
                self.heartbeat.record_outbound(now);
                Ok(SessionAction::Reply(frame))
            }
            tags::msg_type::REJECT | tags::msg_type::BUSINESS_MESSAGE_REJECT => Ok(SessionAction::Rejected {
                ref_msg_type: msg.get_str(tags::REF_MSG_TYPE).map(str::to_string),
                ref_tag_id: msg.get_str(tags::REF_TAG_ID).map(str::to_string),
                text: msg.get_str(tags::TEXT).unwrap_or_default().to_string(),
            }),
            _ => self.dispatch_application_message(msg),
        }
    }

    fn dispatch_application_message(&mut self, msg: &Message) -> Result<SessionAction, SessionError> {
        let received = msg.require_int(tags::MSG_SEQ_NUM)? as u32;
        let expected = self.sequence.inbound_expected(self.role);

        match sequence_discipline::check_inbound(expected, received) {
            SequenceAction::Deliver => {
                self.sequence.advance_inbound(self.role, received);
                Ok(SessionAction::Deliver(msg.clone()))
            }
            SequenceAction::ResendRequest { begin_seq_no, end_seq_no } => {
                let frame = self.stamp(admin::resend_request(begin_seq_no, end_seq_no));
                Ok(SessionAction::ResendRequest(frame))
            }
            SequenceAction::SequenceResetCandidate => Ok(SessionAction::Ignore),
        }
    }

    /// Assign the next outbound sequence number to an application message
    /// built by `primefx-request`, ready to write to the wire. Rejects the
    /// call outside `LoggedOn` (spec.md §4.3: the session only accepts
    /// business traffic once logged on).
    pub fn send_application_message(&mut self, message: Message, now: DateTime<Utc>) -> Result<OutboundFrame, SessionError> {
        self.require_state(SessionState::LoggedOn, "LoggedOn")?;
        let frame = self.stamp(message);
        self.heartbeat.record_outbound(now);
        Ok(frame)
    }

    /// Poll the heartbeat monitor; returns an outbound frame if one is due.
    pub fn heartbeat_tick(&mut self, now: DateTime<Utc>) -> Result<Option<OutboundFrame>, SessionError> {
        if self.state != SessionState::LoggedOn {
            return Ok(None);
        }
        match self.heartbeat.poll(now) {
            HeartbeatAction::NoAction => Ok(None),
            HeartbeatAction::SendHeartbeat => {
                let frame = self.stamp(admin::heartbeat(None));
                self.heartbeat.record_outbound(now);
                Ok(Some(frame))
            }
            HeartbeatAction::SendTestRequest => {
                let frame = self.stamp(admin::test_request("TEST"));
                self.heartbeat.record_outbound(now);
                Ok(Some(frame))
            }
            HeartbeatAction::ForceDisconnect => {
                self.state = SessionState::Disconnected;
                Err(SessionError::HeartbeatTimedOut)
            }
        }
    }

    fn stamp(&self, message: Message) -> OutboundFrame {
        OutboundFrame { seq_num: self.sequence.bump_outbound(self.role), message }
    }

    fn require_state(&self, expected: SessionState, to: &'static str) -> Result<(), SessionError> {
        if self.state == expected {
            Ok(())
        } else {
            Err(SessionError::InvalidTransition { from: self.state, to })
        }
    }
}
