use chrono::{DateTime, Utc};

/// What the heartbeat monitor wants the session to do, polled once per timer
/// tick (spec.md §4.3 "Heartbeats").
#[derive(Debug, Clone, Copy, Eq, PartialEq)]
pub enum HeartbeatAction {
    /// `heartbeat_interval` seconds of outbound silence elapsed; send
    /// `Heartbeat(0)`.
    SendHeartbeat,
    /// No inbound traffic for `1.25 × heartbeat_interval`; send
    /// `TestRequest(1)`.
    SendTestRequest,
    /// No response to the outstanding `TestRequest` within a further
    /// `0.5 × heartbeat_interval`; force disconnect.
    ForceDisconnect,
    NoAction,
}

/// Tracks inbound/outbound traffic timestamps to decide when to heartbeat,
/// probe, or give up on a session (spec.md §4.3/§5).
#[derive(Debug, Clone)]
pub struct HeartbeatMonitor {
    interval_secs: i64,
    last_inbound: DateTime<Utc>,
    last_outbound: DateTime<Utc>,
    test_request_sent_at: Option<DateTime<Utc>>,
}

impl HeartbeatMonitor {
    pub fn new(interval_secs: u32, now: DateTime<Utc>) -> Self {
        Self {
            interval_secs: interval_secs.max(1) as i64,
            last_inbound: now,
            last_outbound: now,
            test_request_sent_at: None,
        }
    }

    pub fn record_inbound(&mut self, now: DateTime<Utc>) {
        self.last_inbound = now;
        self.test_request_sent_at = None;
    }

    pub fn record_outbound(&mut self, now: DateTime<Utc>) {
        self.last_outbound = now;
    }

    pub fn poll(&mut self, now: DateTime<Utc>) -> HeartbeatAction {
        // Scaled by 4 so the 1.25x/0.5x thresholds stay exact integer math.
        let since_inbound_x4 = (now - self.last_inbound).num_milliseconds() * 4;
        let since_outbound = (now - self.last_outbound).num_milliseconds();
        let interval_ms = self.interval_secs * 1000;

        if let Some(sent_at) = self.test_request_sent_at {
            let since_probe = (now - sent_at).num_milliseconds();
            if since_probe * 2 >= interval_ms {
                return HeartbeatAction::ForceDisconnect;
            }
        }

        if since_inbound_x4 >= interval_ms * 5 && self.test_request_sent_at.is_none() {
            self.test_request_sent_at = Some(now);
            return HeartbeatAction::SendTestRequest;
        }

        if since_outbound >= interval_ms && self.test_request_sent_at.is_none() {
            return HeartbeatAction::SendHeartbeat;
        }

        HeartbeatAction::NoAction
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn t(secs: i64) -> DateTime<Utc> {
        Utc.timestamp_opt(1_700_000_000 + secs, 0).unwrap()
    }

    #[test]
    fn sends_heartbeat_after_interval_of_outbound_silence() {
        let mut monitor = HeartbeatMonitor::new(30, t(0));
        assert_eq!(monitor.poll(t(29)), HeartbeatAction::NoAction);
        assert_eq!(monitor.poll(t(30)), HeartbeatAction::SendHeartbeat);
    }

    #[test]
    fn sends_test_request_after_one_and_a_quarter_interval_of_silence() {
        let mut monitor = HeartbeatMonitor::new(30, t(0));
        monitor.record_outbound(t(0));
        assert_eq!(monitor.poll(t(38)), HeartbeatAction::SendTestRequest);
    }

    #[test]
    fn inbound_traffic_clears_the_test_request_state() {
        let mut monitor = HeartbeatMonitor::new(30, t(0));
        monitor.record_outbound(t(0));
        assert_eq!(monitor.poll(t(38)), HeartbeatAction::SendTestRequest);
        monitor.record_inbound(t(39));
        monitor.record_outbound(t(39));
        assert_eq!(monitor.poll(t(41)), HeartbeatAction::NoAction);
    }

    #[test]
    fn forces_disconnect_when_test_request_goes_unanswered() {
        let mut monitor = HeartbeatMonitor::new(30, t(0));
        monitor.record_outbound(t(0));
        assert_eq!(monitor.poll(t(38)), HeartbeatAction::SendTestRequest);
        assert_eq!(monitor.poll(t(54)), HeartbeatAction::ForceDisconnect);
    }
}
