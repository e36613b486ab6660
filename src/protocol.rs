/// JSON alert message broadcast over UDP.
///
/// One datagram per alert, a flat object with exactly five keys:
///
/// ```json
/// {"type":"FIRE_ALERT","smoke_level":450,"threshold":400,"sensor_id":"ROOM_301_SENSOR","ip":"192.168.1.101"}
/// ```
///
/// Uses `heapless` types for no_std/no-alloc operation. The worst-case
/// encoding is checked against the buffer size at compile time, and encoding
/// into a short buffer is an error, never a truncated datagram.
use core::fmt::Write;
use core::net::Ipv4Addr;

use heapless::{String, Vec};
use serde::{Deserialize, Serialize};

use crate::sensor::Reading;

/// Message kind carried in the `type` key
pub const ALERT_KIND: &str = "FIRE_ALERT";

/// Number of keys in an alert object
pub const FIELD_COUNT: usize = 5;

/// Longest accepted sensor identifier, in bytes
pub const MAX_SENSOR_ID_LEN: usize = 32;

/// "255.255.255.255"
pub const MAX_IP_LEN: usize = 15;

/// Maximum size of a serialized alert datagram
pub const MAX_MSG_LEN: usize = 192;

pub type KindString = String<16>;
pub type SensorIdString = String<MAX_SENSOR_ID_LEN>;
pub type IpString = String<MAX_IP_LEN>;

/// Buffer type for serialized alert messages
pub type MsgBuffer = Vec<u8, MAX_MSG_LEN>;

/// Worst-case encoded size: longest id and address, `u16::MAX` in both
/// integer fields. Sensor ids never need escaping (see [`validate_sensor_id`]).
pub const MAX_ENCODED_LEN: usize = {
    const U16_DIGITS: usize = 5;
    let braces = 2;
    let separators = FIELD_COUNT - 1;
    braces
        + separators
        + key_len("type") + quoted_len(ALERT_KIND.len())
        + key_len("smoke_level") + U16_DIGITS
        + key_len("threshold") + U16_DIGITS
        + key_len("sensor_id") + quoted_len(MAX_SENSOR_ID_LEN)
        + key_len("ip") + quoted_len(MAX_IP_LEN)
};

/// `"key":`
const fn key_len(key: &str) -> usize {
    quoted_len(key.len()) + 1
}

const fn quoted_len(n: usize) -> usize {
    n + 2
}

const _: () = assert!(MAX_ENCODED_LEN <= MAX_MSG_LEN, "alert message can outgrow MAX_MSG_LEN");

/// An alert ready for transmission. Every field is populated at
/// construction; there is no way to build a partial payload.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct AlertPayload {
    #[serde(rename = "type")]
    kind: KindString,
    smoke_level: u16,
    threshold: u16,
    sensor_id: SensorIdString,
    ip: IpString,
}

impl AlertPayload {
    pub fn new(
        reading: Reading,
        threshold: u16,
        sensor_id: &str,
        ip: Ipv4Addr,
    ) -> Result<Self, ProtocolError> {
        validate_sensor_id(sensor_id)?;

        let mut kind = KindString::new();
        kind.push_str(ALERT_KIND)
            .map_err(|_| ProtocolError::BufferTooSmall)?;

        let mut id = SensorIdString::new();
        id.push_str(sensor_id)
            .map_err(|_| ProtocolError::SensorIdTooLong { len: sensor_id.len() })?;

        let mut ip_str = IpString::new();
        write!(ip_str, "{}", ip).map_err(|_| ProtocolError::BufferTooSmall)?;

        Ok(Self {
            kind,
            smoke_level: reading.0,
            threshold,
            sensor_id: id,
            ip: ip_str,
        })
    }

    pub fn kind(&self) -> &str {
        &self.kind
    }

    pub fn smoke_level(&self) -> Reading {
        Reading(self.smoke_level)
    }

    pub fn threshold(&self) -> u16 {
        self.threshold
    }

    pub fn sensor_id(&self) -> &str {
        &self.sensor_id
    }

    pub fn ip(&self) -> &str {
        &self.ip
    }

    /// The sender address, if the `ip` field is dotted-decimal IPv4.
    pub fn ip_addr(&self) -> Option<Ipv4Addr> {
        self.ip.parse().ok()
    }

    /// Serialize into `buf`, returning the number of bytes written.
    pub fn encode(&self, buf: &mut [u8]) -> Result<usize, ProtocolError> {
        serde_json_core::to_slice(self, buf).map_err(|_| ProtocolError::BufferTooSmall)
    }

    /// Serialize into a fixed-capacity buffer sized for any alert.
    pub fn encode_to_vec(&self) -> Result<MsgBuffer, ProtocolError> {
        let mut buf = [0u8; MAX_MSG_LEN];
        let len = self.encode(&mut buf)?;
        MsgBuffer::from_slice(&buf[..len]).map_err(|_| ProtocolError::BufferTooSmall)
    }
}

/// Sensor ids go on the wire verbatim: 1..=32 bytes of printable ASCII
/// without `"` or `\`, so they never need JSON escaping.
pub fn validate_sensor_id(id: &str) -> Result<(), ProtocolError> {
    if id.is_empty() {
        return Err(ProtocolError::EmptySensorId);
    }
    if id.len() > MAX_SENSOR_ID_LEN {
        return Err(ProtocolError::SensorIdTooLong { len: id.len() });
    }
    if let Some(bad) = id
        .bytes()
        .find(|&b| !(b.is_ascii_graphic() || b == b' ') || b == b'"' || b == b'\\')
    {
        return Err(ProtocolError::SensorIdCharacter { byte: bad });
    }
    Ok(())
}

/// Decode a received alert datagram.
///
/// Trailing whitespace (e.g. a newline from a line-oriented sender) is
/// ignored. Messages whose `type` is not [`ALERT_KIND`] are rejected.
pub fn parse_alert(data: &[u8]) -> Result<AlertPayload, ProtocolError> {
    let trimmed = trim_trailing_whitespace(data);
    if trimmed.is_empty() {
        return Err(ProtocolError::Malformed);
    }
    let (payload, _) = serde_json_core::from_slice::<AlertPayload>(trimmed)
        .map_err(|_| ProtocolError::Malformed)?;
    if payload.kind.as_str() != ALERT_KIND {
        return Err(ProtocolError::UnexpectedKind);
    }
    Ok(payload)
}

fn trim_trailing_whitespace(data: &[u8]) -> &[u8] {
    let mut end = data.len();
    while end > 0 && data[end - 1].is_ascii_whitespace() {
        end -= 1;
    }
    &data[..end]
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum ProtocolError {
    #[error("sensor id is empty")]
    EmptySensorId,

    #[error("sensor id is {len} bytes, limit is 32")]
    SensorIdTooLong { len: usize },

    #[error("sensor id contains byte {byte:#04x} that would need escaping")]
    SensorIdCharacter { byte: u8 },

    #[error("alert does not fit the message buffer")]
    BufferTooSmall,

    #[error("malformed alert message")]
    Malformed,

    #[error("message is not a fire alert")]
    UnexpectedKind,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_payload() -> AlertPayload {
        AlertPayload::new(
            Reading(450),
            400,
            "ROOM_301_SENSOR",
            Ipv4Addr::new(192, 168, 1, 101),
        )
        .unwrap()
    }

    fn encode_str(payload: &AlertPayload, buf: &mut [u8]) -> usize {
        payload.encode(buf).unwrap()
    }

    // ── Encoding ────────────────────────────────────────────────────

    #[test]
    fn encodes_exact_wire_format() {
        let mut buf = [0u8; MAX_MSG_LEN];
        let len = encode_str(&sample_payload(), &mut buf);
        let json = core::str::from_utf8(&buf[..len]).unwrap();
        assert_eq!(
            json,
            r#"{"type":"FIRE_ALERT","smoke_level":450,"threshold":400,"sensor_id":"ROOM_301_SENSOR","ip":"192.168.1.101"}"#
        );
    }

    #[test]
    fn encoding_is_deterministic() {
        let p = sample_payload();
        assert_eq!(p.encode_to_vec().unwrap(), p.encode_to_vec().unwrap());
    }

    #[test]
    fn worst_case_payload_fits_buffer() {
        let id = "ABCDEFGHIJKLMNOPQRSTUVWXYZ012345";
        assert_eq!(id.len(), MAX_SENSOR_ID_LEN);
        let p = AlertPayload::new(
            Reading(u16::MAX),
            u16::MAX,
            id,
            Ipv4Addr::new(255, 255, 255, 255),
        )
        .unwrap();
        let encoded = p.encode_to_vec().unwrap();
        assert_eq!(encoded.len(), MAX_ENCODED_LEN);
    }

    #[test]
    fn short_buffer_is_an_error_not_a_truncation() {
        let mut buf = [0u8; 40];
        assert_eq!(
            sample_payload().encode(&mut buf),
            Err(ProtocolError::BufferTooSmall)
        );
    }

    // ── Construction ────────────────────────────────────────────────

    #[test]
    fn accessors_expose_fields() {
        let p = sample_payload();
        assert_eq!(p.kind(), ALERT_KIND);
        assert_eq!(p.smoke_level(), Reading(450));
        assert_eq!(p.threshold(), 400);
        assert_eq!(p.sensor_id(), "ROOM_301_SENSOR");
        assert_eq!(p.ip(), "192.168.1.101");
        assert_eq!(p.ip_addr(), Some(Ipv4Addr::new(192, 168, 1, 101)));
    }

    #[test]
    fn sensor_id_validation() {
        assert_eq!(validate_sensor_id(""), Err(ProtocolError::EmptySensorId));
        assert_eq!(
            validate_sensor_id("0123456789012345678901234567890123"),
            Err(ProtocolError::SensorIdTooLong { len: 34 })
        );
        assert_eq!(
            validate_sensor_id("ROOM\"1"),
            Err(ProtocolError::SensorIdCharacter { byte: b'"' })
        );
        assert_eq!(
            validate_sensor_id("ROOM\n1"),
            Err(ProtocolError::SensorIdCharacter { byte: b'\n' })
        );
        assert_eq!(validate_sensor_id("Lab 2 - east"), Ok(()));
    }

    #[test]
    fn invalid_sensor_id_blocks_construction() {
        let err = AlertPayload::new(Reading(500), 400, "a\\b", Ipv4Addr::UNSPECIFIED);
        assert!(matches!(err, Err(ProtocolError::SensorIdCharacter { .. })));
    }

    // ── Decoding ────────────────────────────────────────────────────

    #[test]
    fn round_trip_recovers_all_five_fields() {
        let p = sample_payload();
        let encoded = p.encode_to_vec().unwrap();
        let decoded = parse_alert(&encoded).unwrap();
        assert_eq!(decoded, p);
    }

    #[test]
    fn encoded_object_has_exactly_the_wire_keys() {
        let encoded = sample_payload().encode_to_vec().unwrap();
        let json = core::str::from_utf8(&encoded).unwrap();
        let keys = ["\"type\":", "\"smoke_level\":", "\"threshold\":", "\"sensor_id\":", "\"ip\":"];
        for key in keys {
            assert_eq!(json.matches(key).count(), 1, "{key} should appear once");
        }
        assert_eq!(json.matches("\":").count(), FIELD_COUNT);
    }

    #[test]
    fn parse_accepts_trailing_newline() {
        let msg = b"{\"type\":\"FIRE_ALERT\",\"smoke_level\":512,\"threshold\":400,\"sensor_id\":\"KITCHEN\",\"ip\":\"10.0.0.7\"}\r\n";
        let p = parse_alert(msg).unwrap();
        assert_eq!(p.smoke_level(), Reading(512));
        assert_eq!(p.sensor_id(), "KITCHEN");
        assert_eq!(p.ip_addr(), Some(Ipv4Addr::new(10, 0, 0, 7)));
    }

    #[test]
    fn parse_rejects_other_kinds() {
        let msg = br#"{"type":"USER_MESSAGE","smoke_level":0,"threshold":400,"sensor_id":"X","ip":"10.0.0.7"}"#;
        assert_eq!(parse_alert(msg), Err(ProtocolError::UnexpectedKind));
    }

    #[test]
    fn parse_rejects_missing_and_extra_keys() {
        let missing = br#"{"type":"FIRE_ALERT","smoke_level":450,"threshold":400,"sensor_id":"X"}"#;
        assert_eq!(parse_alert(missing), Err(ProtocolError::Malformed));

        let extra = br#"{"type":"FIRE_ALERT","smoke_level":450,"threshold":400,"sensor_id":"X","ip":"1.2.3.4","room":"301"}"#;
        assert_eq!(parse_alert(extra), Err(ProtocolError::Malformed));
    }

    #[test]
    fn parse_rejects_garbage() {
        assert_eq!(parse_alert(b""), Err(ProtocolError::Malformed));
        assert_eq!(parse_alert(b"  \n"), Err(ProtocolError::Malformed));
        assert_eq!(parse_alert(b"not json"), Err(ProtocolError::Malformed));
    }
}
