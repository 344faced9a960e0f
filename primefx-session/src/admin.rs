use primefx_codec::{tags, Message};

/// Pure constructors for session-level (admin) FIX messages. Unlike the
/// business-level Request Factory (`primefx-request`), these never fail —
/// every field they need is already in hand at the call site.

pub fn logon(username: &str, password: &str, heartbeat_interval_secs: u32, reset_seq_num: bool) -> Message {
    Message::builder(tags::msg_type::LOGON)
        .field(tags::ENCRYPT_METHOD, 0_i64)
        .field(tags::HEART_BT_INT, heartbeat_interval_secs as i64)
        .field(tags::USERNAME, username)
        .field(tags::PASSWORD, password)
        .field(tags::RESET_SEQ_NUM_FLAG, reset_seq_num)
        .build()
}

pub fn logout(text: Option<&str>) -> Message {
    Message::builder(tags::msg_type::LOGOUT)
        .field_opt(tags::TEXT, text)
        .build()
}

pub fn heartbeat(test_req_id: Option<&str>) -> Message {
    Message::builder(tags::msg_type::HEARTBEAT)
        .field_opt(tags::TEST_REQ_ID, test_req_id)
        .build()
}

pub fn test_request(test_req_id: &str) -> Message {
    Message::builder(tags::msg_type::TEST_REQUEST)
        .field(tags::TEST_REQ_ID, test_req_id)
        .build()
}

pub fn resend_request(begin_seq_no: u32, end_seq_no: u32) -> Message {
    Message::builder(tags::msg_type::RESEND_REQUEST)
        .field(tags::BEGIN_SEQ_NO, begin_seq_no as i64)
        .field(tags::END_SEQ_NO, end_seq_no as i64)
        .build()
}

/// `GapFill` sequence reset, the standard reply to a counterparty
/// `ResendRequest` for a range the session chooses not to replay verbatim.
pub fn gap_fill(new_seq_no: u32) -> Message {
    Message::builder(tags::msg_type::SEQUENCE_RESET)
        .field(tags::GAP_FILL_FLAG, true)
        .field(tags::NEW_SEQ_NO, new_seq_no as i64)
        .build()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn logon_carries_credentials_and_reset_flag() {
        let msg = logon("user", "pass", 30, true);
        assert_eq!(msg.msg_type(), Some(tags::msg_type::LOGON));
        assert_eq!(msg.get_str(tags::USERNAME), Some("user"));
        assert_eq!(msg.get_str(tags::PASSWORD), Some("pass"));
        assert_eq!(msg.require_int(tags::HEART_BT_INT).unwrap(), 30);
        assert_eq!(msg.get_str(tags::RESET_SEQ_NUM_FLAG), Some("Y"));
    }

    #[test]
    fn heartbeat_carries_test_req_id_only_when_replying_to_a_probe() {
        assert_eq!(heartbeat(None).get_str(tags::TEST_REQ_ID), None);
        assert_eq!(heartbeat(Some("T1")).get_str(tags::TEST_REQ_ID), Some("T1"));
    }

    #[test]
    fn resend_request_spans_the_missing_range() {
        let msg = resend_request(5, 8);
        assert_eq!(msg.require_int(tags::BEGIN_SEQ_NO).unwrap(), 5);
        assert_eq!(msg.require_int(tags::END_SEQ_NO).unwrap(), 8);
    }
}
