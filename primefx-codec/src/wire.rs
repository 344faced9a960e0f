use crate::{error::CodecError, message::Message, tags};
use chrono::{DateTime, Utc};

const SOH: u8 = 0x01;

/// Session-level header fields stamped onto every outbound message.
///
/// `target_sub_id` is always stamped, per spec.md §4.3 "Admin injection" —
/// a known quirk of this broker's dialect, applied to business messages as
/// well as admin ones.
pub struct Header<'a> {
    pub sender_comp_id: &'a str,
    pub target_comp_id: &'a str,
    pub target_sub_id: &'a str,
    pub msg_seq_num: u32,
    pub sending_time: DateTime<Utc>,
}

/// Encode `body` (as produced by a `primefx-request` factory function) into
/// FIX 4.4 wire bytes, framed with `BeginString`/`BodyLength`/`CheckSum`.
pub fn encode(header: &Header<'_>, body: &Message) -> Vec<u8> {
    let mut fields = body.fields().to_vec();
    // `fields[0]` is always MsgType(35), pushed first by `MessageBuilder::new`.
    let msg_type = fields.remove(0);

    let mut payload: Vec<(u32, String)> = vec![
        msg_type,
        (tags::SENDER_COMP_ID, header.sender_comp_id.to_string()),
        (tags::TARGET_COMP_ID, header.target_comp_id.to_string()),
        (tags::TARGET_SUB_ID, header.target_sub_id.to_string()),
        (tags::MSG_SEQ_NUM, header.msg_seq_num.to_string()),
        (
            tags::SENDING_TIME,
            header.sending_time.format("%Y%m%d-%H:%M:%S%.3f").to_string(),
        ),
    ];
    payload.extend(fields);

    let mut body_bytes = Vec::new();
    for (tag, value) in &payload {
        body_bytes.extend_from_slice(format!("{tag}={value}").as_bytes());
        body_bytes.push(SOH);
    }

    let mut out = Vec::new();
    out.extend_from_slice(b"8=FIX.4.4");
    out.push(SOH);
    out.extend_from_slice(format!("9={}", body_bytes.len()).as_bytes());
    out.push(SOH);
    out.extend_from_slice(&body_bytes);

    let checksum: u32 = out.iter().map(|&b| b as u32).sum::<u32>() % 256;
    out.extend_from_slice(format!("10={checksum:03}").as_bytes());
    out.push(SOH);

    out
}

/// Decode a raw FIX 4.4 message, validating framing and checksum.
pub fn decode(raw: &[u8]) -> Result<Message, CodecError> {
    if raw.is_empty() {
        return Err(CodecError::Truncated);
    }

    let fields = parse_fields(raw)?;
    if fields.len() < 3 {
        return Err(CodecError::Truncated);
    }

    let (begin_tag, _) = &fields[0];
    let (len_tag, len_value) = &fields[1];
    let (checksum_tag, checksum_value) = fields.last().unwrap();

    if *begin_tag != tags::BEGIN_STRING || *len_tag != tags::BODY_LENGTH {
        return Err(CodecError::MalformedField(
            "message must start with BeginString(8) then BodyLength(9)".to_string(),
        ));
    }
    if *checksum_tag != tags::CHECK_SUM {
        return Err(CodecError::MalformedField(
            "message must end with CheckSum(10)".to_string(),
        ));
    }

    let declared_len: usize = len_value
        .parse()
        .map_err(|_| CodecError::MalformedField(format!("BodyLength(9) not numeric: {len_value}")))?;

    let body_start = find_nth_soh(raw, 1) + 1;
    let checksum_field_start = find_last_field_start(raw);
    let actual_len = checksum_field_start - body_start;
    if actual_len != declared_len {
        return Err(CodecError::BodyLengthMismatch {
            declared: declared_len,
            actual: actual_len,
        });
    }

    let expected_checksum: u32 = raw[..checksum_field_start].iter().map(|&b| b as u32).sum::<u32>() % 256;
    let actual_checksum: u8 = checksum_value
        .parse()
        .map_err(|_| CodecError::MalformedField(format!("CheckSum(10) not numeric: {checksum_value}")))?;
    if expected_checksum as u8 != actual_checksum {
        return Err(CodecError::ChecksumMismatch {
            expected: expected_checksum as u8,
            actual: checksum_value.clone(),
        });
    }

    Ok(Message::from_fields(fields))
}

fn parse_fields(raw: &[u8]) -> Result<Vec<(u32, String)>, CodecError> {
    let text = std::str::from_utf8(raw)
        .map_err(|_| CodecError::MalformedField("message is not valid UTF-8".to_string()))?;

    text.split(SOH as char)
        .filter(|chunk| !chunk.is_empty())
        .map(|chunk| {
            let (tag, value) = chunk
                .split_once('=')
                .ok_or_else(|| CodecError::MalformedField(chunk.to_string()))?;
            let tag: u32 = tag
                .parse()
                .map_err(|_| CodecError::MalformedField(chunk.to_string()))?;
            Ok((tag, value.to_string()))
        })
        .collect()
}

fn find_nth_soh(raw: &[u8], n: usize) -> usize {
    raw.iter()
        .enumerate()
        .filter(|(_, &b)| b == SOH)
        .nth(n)
        .map(|(idx, _)| idx)
        .unwrap_or(raw.len())
}

/// Byte offset of the start of the trailing `10=...` field.
fn find_last_field_start(raw: &[u8]) -> usize {
    let mut boundaries = vec![0];
    for (idx, &b) in raw.iter().enumerate() {
        if b == SOH && idx + 1 < raw.len() {
            boundaries.push(idx + 1);
        }
    }
    *boundaries.last().unwrap_or(&0)
}
