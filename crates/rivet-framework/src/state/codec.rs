//! Component state codec.
//!
//! State travels inside the component identifier so the server never has to
//! remember it. An encoded identifier looks like:
//!
//! ```text
//! prefix ":" base64url-no-pad( payload )
//!
//! payload = version(1) count(1) { tag(1) value }* checksum(4)
//! checksum = SHA-256(prefix ‖ version ‖ count ‖ fields)[..4]
//! ```
//!
//! | tag | type      | value encoding             |
//! |-----|-----------|----------------------------|
//! | 1   | bool      | one byte, 0 or 1           |
//! | 2   | int       | zig-zag LEB128 varint      |
//! | 3   | uint      | LEB128 varint              |
//! | 4   | float     | f64 big-endian             |
//! | 5   | string    | varint length, UTF-8 bytes |
//! | 6   | snowflake | LEB128 varint              |
//!
//! Encoding never truncates: an identifier longer than
//! [`MAX_CUSTOM_ID_LEN`] is an error. Decoding is all-or-nothing.

use base64::Engine;
use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use rivet_core::Snowflake;
use sha2::{Digest, Sha256};

use super::schema::{ComponentState, FieldType, StateSchema, StateValue};
use crate::error::{CodecError, CodecResult};

/// The platform's limit on `custom_id` length.
pub const MAX_CUSTOM_ID_LEN: usize = 100;

/// Current payload version.
pub const STATE_VERSION: u8 = 1;

const SEPARATOR: char = ':';
const CHECKSUM_LEN: usize = 4;
const MAX_VARINT_LEN: usize = 10;

// =============================================================================
// Public API
// =============================================================================

/// Encodes `values` under `prefix`.
pub fn encode(prefix: &str, schema: &StateSchema, values: &[StateValue]) -> CodecResult<String> {
    if !schema.matches(values) {
        return Err(CodecError::SchemaMismatch);
    }
    let count = u8::try_from(values.len()).map_err(|_| CodecError::SchemaMismatch)?;

    let mut body = Vec::with_capacity(2 + values.len() * 4);
    body.push(STATE_VERSION);
    body.push(count);
    for value in values {
        body.push(value.field_type().tag());
        write_value(&mut body, value);
    }
    body.extend_from_slice(&checksum(prefix, &body));

    let token = format!("{prefix}{SEPARATOR}{}", URL_SAFE_NO_PAD.encode(&body));
    if token.len() > MAX_CUSTOM_ID_LEN {
        return Err(CodecError::TooLong {
            len: token.len(),
            max: MAX_CUSTOM_ID_LEN,
        });
    }
    Ok(token)
}

/// Decodes a `custom_id` produced by [`encode`] with the same prefix.
///
/// A bare prefix (no separator, no payload) decodes to the empty state when
/// `schema` is empty, so stateless components may use static identifiers.
pub fn decode(prefix: &str, schema: &StateSchema, custom_id: &str) -> CodecResult<Vec<StateValue>> {
    let rest = custom_id
        .strip_prefix(prefix)
        .ok_or(CodecError::PrefixMismatch)?;
    if rest.is_empty() && schema.is_empty() {
        return Ok(Vec::new());
    }
    let encoded = rest
        .strip_prefix(SEPARATOR)
        .ok_or(CodecError::PrefixMismatch)?;

    let payload = URL_SAFE_NO_PAD
        .decode(encoded)
        .map_err(|_| CodecError::Base64)?;
    if payload.len() < 2 + CHECKSUM_LEN {
        return Err(CodecError::Truncated);
    }

    let (body, sum) = payload.split_at(payload.len() - CHECKSUM_LEN);
    if checksum(prefix, body).as_slice() != sum {
        return Err(CodecError::Checksum);
    }

    let mut reader = Reader::new(body);
    let version = reader.byte()?;
    if version != STATE_VERSION {
        return Err(CodecError::Version(version));
    }
    let count = usize::from(reader.byte()?);
    if count != schema.len() {
        return Err(CodecError::FieldCount {
            expected: schema.len(),
            got: count,
        });
    }

    let mut values = Vec::with_capacity(count);
    for (index, expected) in schema.fields().iter().enumerate() {
        let tag = reader.byte()?;
        if tag != expected.tag() {
            return Err(CodecError::TagMismatch {
                index,
                expected: *expected,
                got: tag,
            });
        }
        values.push(reader.value(index, *expected)?);
    }

    match reader.remaining() {
        0 => Ok(values),
        n => Err(CodecError::TrailingBytes(n)),
    }
}

/// Encodes a typed state.
pub fn encode_state<S: ComponentState>(prefix: &str, state: S) -> CodecResult<String> {
    encode(prefix, &S::schema(), &state.into_values())
}

/// Decodes a typed state.
pub fn decode_state<S: ComponentState>(prefix: &str, custom_id: &str) -> CodecResult<S> {
    S::from_values(decode(prefix, &S::schema(), custom_id)?)
}

// =============================================================================
// Encoding
// =============================================================================

fn checksum(prefix: &str, body: &[u8]) -> [u8; CHECKSUM_LEN] {
    let mut hasher = Sha256::new();
    hasher.update(prefix.as_bytes());
    hasher.update(body);
    let digest = hasher.finalize();
    let mut out = [0u8; CHECKSUM_LEN];
    out.copy_from_slice(&digest[..CHECKSUM_LEN]);
    out
}

fn zigzag(n: i64) -> u64 {
    ((n << 1) ^ (n >> 63)) as u64
}

fn unzigzag(n: u64) -> i64 {
    ((n >> 1) as i64) ^ -((n & 1) as i64)
}

fn write_varint(buf: &mut Vec<u8>, mut n: u64) {
    while n >= 0x80 {
        buf.push((n as u8) | 0x80);
        n >>= 7;
    }
    buf.push(n as u8);
}

fn write_value(buf: &mut Vec<u8>, value: &StateValue) {
    match value {
        StateValue::Bool(b) => buf.push(u8::from(*b)),
        StateValue::Int(i) => write_varint(buf, zigzag(*i)),
        StateValue::Uint(u) => write_varint(buf, *u),
        StateValue::Float(f) => buf.extend_from_slice(&f.to_be_bytes()),
        StateValue::String(s) => {
            write_varint(buf, s.len() as u64);
            buf.extend_from_slice(s.as_bytes());
        }
        StateValue::Snowflake(id) => write_varint(buf, id.get()),
    }
}

// =============================================================================
// Decoding
// =============================================================================

struct Reader<'a> {
    buf: &'a [u8],
    pos: usize,
}

impl<'a> Reader<'a> {
    fn new(buf: &'a [u8]) -> Self {
        Self { buf, pos: 0 }
    }

    fn remaining(&self) -> usize {
        self.buf.len() - self.pos
    }

    fn take(&mut self, n: usize) -> CodecResult<&'a [u8]> {
        if self.remaining() < n {
            return Err(CodecError::Truncated);
        }
        let slice = &self.buf[self.pos..self.pos + n];
        self.pos += n;
        Ok(slice)
    }

    fn byte(&mut self) -> CodecResult<u8> {
        Ok(self.take(1)?[0])
    }

    fn varint(&mut self) -> CodecResult<u64> {
        let mut result = 0u64;
        for i in 0..MAX_VARINT_LEN {
            let byte = self.byte()?;
            let bits = u64::from(byte & 0x7f);
            // The tenth byte may only contribute the top bit of a u64.
            if i == MAX_VARINT_LEN - 1 && bits > 1 {
                return Err(CodecError::VarintOverflow);
            }
            result |= bits << (7 * i);
            if byte & 0x80 == 0 {
                return Ok(result);
            }
        }
        Err(CodecError::VarintOverflow)
    }

    fn value(&mut self, index: usize, ty: FieldType) -> CodecResult<StateValue> {
        Ok(match ty {
            FieldType::Bool => match self.byte()? {
                0 => StateValue::Bool(false),
                1 => StateValue::Bool(true),
                _ => return Err(CodecError::OutOfRange { index }),
            },
            FieldType::Int => StateValue::Int(unzigzag(self.varint()?)),
            FieldType::Uint => StateValue::Uint(self.varint()?),
            FieldType::Float => {
                let mut raw = [0u8; 8];
                raw.copy_from_slice(self.take(8)?);
                StateValue::Float(f64::from_be_bytes(raw))
            }
            FieldType::String => {
                let len = usize::try_from(self.varint()?).map_err(|_| CodecError::Truncated)?;
                let bytes = self.take(len)?;
                let s = std::str::from_utf8(bytes).map_err(|_| CodecError::Utf8)?;
                StateValue::String(s.to_owned())
            }
            FieldType::Snowflake => StateValue::Snowflake(Snowflake::new(self.varint()?)),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn schema_of<S: ComponentState>() -> StateSchema {
        StateSchema::of::<S>()
    }

    /// Re-encodes a raw body with a valid checksum so structural errors can be
    /// tested past the integrity check.
    fn forge(prefix: &str, body: &[u8]) -> String {
        let mut payload = body.to_vec();
        payload.extend_from_slice(&checksum(prefix, body));
        format!("{prefix}:{}", URL_SAFE_NO_PAD.encode(payload))
    }

    #[test]
    fn test_counter_state() {
        let token = encode_state("ctr", (5_i64,)).unwrap();
        assert!(token.starts_with("ctr:"));
        let (count,) = decode_state::<(i64,)>("ctr", &token).unwrap();
        assert_eq!(count, 5);
    }

    #[test]
    fn test_all_field_types() {
        let state = (
            true,
            -42_i64,
            u64::MAX,
            1.5_f64,
            "héllo".to_string(),
            Snowflake::new(80351110224678912),
        );
        let token = encode_state("all", state.clone()).unwrap();
        assert!(token.len() <= MAX_CUSTOM_ID_LEN);
        assert!(
            token[4..]
                .chars()
                .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_')
        );
        assert_eq!(decode_state::<(bool, i64, u64, f64, String, Snowflake)>("all", &token), Ok(state));
    }

    #[test]
    fn test_empty_state() {
        let token = encode_state("noop", ()).unwrap();
        assert_eq!(decode_state::<()>("noop", &token), Ok(()));
        assert_eq!(decode_state::<()>("noop", "noop"), Ok(()));
        assert_eq!(
            decode_state::<(i64,)>("noop", "noop"),
            Err(CodecError::PrefixMismatch)
        );
    }

    #[test]
    fn test_too_long() {
        let long = "x".repeat(90);
        let err = encode_state("p", (long,)).unwrap_err();
        assert!(matches!(err, CodecError::TooLong { max: 100, .. }));
    }

    #[test]
    fn test_flipped_byte_rejected() {
        let token = encode_state("ctr", (5_i64, "abc".to_string())).unwrap();
        let (prefix, encoded) = token.split_once(':').unwrap();
        let mut payload = URL_SAFE_NO_PAD.decode(encoded).unwrap();
        for i in 0..payload.len() {
            payload[i] ^= 0x01;
            let tampered = format!("{prefix}:{}", URL_SAFE_NO_PAD.encode(&payload));
            assert!(
                decode_state::<(i64, String)>("ctr", &tampered).is_err(),
                "flip at byte {i} was accepted"
            );
            payload[i] ^= 0x01;
        }
    }

    #[test]
    fn test_foreign_prefix_rejected() {
        let token = encode_state("aaa", (1_i64,)).unwrap();
        let grafted = token.replacen("aaa", "bbb", 1);
        assert_eq!(
            decode_state::<(i64,)>("bbb", &grafted),
            Err(CodecError::Checksum)
        );
    }

    #[test]
    fn test_schema_mismatch_on_decode() {
        let token = encode_state("s", (1_i64,)).unwrap();
        assert!(matches!(
            decode("s", &schema_of::<(bool,)>(), &token),
            Err(CodecError::TagMismatch { index: 0, .. })
        ));
        assert!(matches!(
            decode("s", &schema_of::<(i64, i64)>(), &token),
            Err(CodecError::FieldCount { expected: 2, got: 1 })
        ));
    }

    #[test]
    fn test_structural_errors() {
        let schema = schema_of::<(i64,)>();

        assert_eq!(decode("s", &schema, "s:!!!"), Err(CodecError::Base64));
        assert_eq!(decode("s", &schema, "sAQ"), Err(CodecError::PrefixMismatch));
        assert_eq!(decode("s", &schema, "t:AQ"), Err(CodecError::PrefixMismatch));
        assert_eq!(decode("s", &schema, "s:AQ"), Err(CodecError::Truncated));

        assert_eq!(
            decode("s", &schema, &forge("s", &[2, 1, 2, 0])),
            Err(CodecError::Version(2))
        );
        assert_eq!(
            decode("s", &schema, &forge("s", &[1, 1, 2, 0, 0])),
            Err(CodecError::TrailingBytes(1))
        );
        assert_eq!(
            decode("s", &schema, &forge("s", &[1, 1, 2])),
            Err(CodecError::Truncated)
        );
        assert_eq!(
            decode("s", &schema, &forge("s", &[1, 1, 2, 0xff, 0xff, 0xff, 0xff, 0xff, 0xff, 0xff, 0xff, 0xff, 0x7f])),
            Err(CodecError::VarintOverflow)
        );
        assert_eq!(
            decode("s", &schema_of::<(String,)>(), &forge("s", &[1, 1, 5, 2, 0xc3, 0x28])),
            Err(CodecError::Utf8)
        );
    }

    #[test]
    fn test_narrow_type_overflow_on_decode() {
        let token = encode_state("n", (1_000_i64,)).unwrap();
        assert_eq!(
            decode_state::<(i8,)>("n", &token),
            Err(CodecError::OutOfRange { index: 0 })
        );
    }

    #[test]
    fn test_varint_edges() {
        for n in [0u64, 1, 127, 128, 16_383, 16_384, u64::MAX] {
            let mut buf = Vec::new();
            write_varint(&mut buf, n);
            assert_eq!(Reader::new(&buf).varint(), Ok(n));
        }
        for n in [0i64, -1, 1, i64::MIN, i64::MAX] {
            assert_eq!(unzigzag(zigzag(n)), n);
        }
    }
}
