/// Outcome of comparing an inbound `MsgSeqNum(34)` against the session's
/// expected-next counter (spec.md §4.3 "Sequence discipline").
#[derive(Debug, Clone, Copy, Eq, PartialEq)]
pub enum SequenceAction {
    /// `n == expected`: deliver and advance.
    Deliver,
    /// `n > expected`: a gap. Buffer the message and request a resend of
    /// `[expected, n - 1]`.
    ResendRequest { begin_seq_no: u32, end_seq_no: u32 },
    /// `n < expected`: treat as a sequence-reset candidate per standard FIX
    /// rules (ignore unless `PossDupFlag` is absent, in which case it is a
    /// protocol violation the session should log and disconnect on).
    SequenceResetCandidate,
}

/// Classify an inbound message's sequence number against what the session
/// expects next.
pub fn check_inbound(expected: u32, received: u32) -> SequenceAction {
    if received == expected {
        SequenceAction::Deliver
    } else if received > expected {
        SequenceAction::ResendRequest {
            begin_seq_no: expected,
            end_seq_no: received - 1,
        }
    } else {
        SequenceAction::SequenceResetCandidate
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn matching_sequence_is_delivered() {
        assert_eq!(check_inbound(5, 5), SequenceAction::Deliver);
    }

    #[test]
    fn gap_requests_the_missing_range() {
        assert_eq!(
            check_inbound(5, 9),
            SequenceAction::ResendRequest { begin_seq_no: 5, end_seq_no: 8 }
        );
    }

    #[test]
    fn stale_sequence_is_a_reset_candidate() {
        assert_eq!(check_inbound(5, 3), SequenceAction::SequenceResetCandidate);
    }
}
