//! Schema-less decoding.
//!
//! Reads a payload purely from its wire tags. Length-delimited values are kept
//! as raw bytes here; [`try_parse_nested`] is the probe the text renderer uses
//! to decide whether such bytes look like an embedded message.

use pb_decoder_types::{DecoderError, Result, UnknownFieldSet, UnknownValue, WireType};
use protobuf::CodedInputStream;

/// Maximum nesting of groups and embedded messages that is interpreted.
pub const MAX_NESTING_DEPTH: usize = 64;

/// Parse `bytes` as a flat sequence of (field number, wire value) pairs.
///
/// Fails with `Decode` when bytes run out mid-field or a tag is invalid.
pub fn parse_unknown(bytes: &[u8]) -> Result<UnknownFieldSet> {
    let mut input = CodedInputStream::from_bytes(bytes);
    read_fields(&mut input, None, 0)
}

/// Interpret length-delimited bytes as an embedded message.
///
/// Returns `None` for empty input and for anything that does not parse
/// completely, in which case the caller should treat the bytes as opaque.
pub fn try_parse_nested(bytes: &[u8], depth: usize) -> Option<UnknownFieldSet> {
    if bytes.is_empty() || depth >= MAX_NESTING_DEPTH {
        return None;
    }
    let mut input = CodedInputStream::from_bytes(bytes);
    read_fields(&mut input, None, depth).ok()
}

fn read_fields(
    input: &mut CodedInputStream,
    group: Option<u32>,
    depth: usize,
) -> Result<UnknownFieldSet> {
    let mut set = UnknownFieldSet::new();

    loop {
        if input.eof()? {
            return match group {
                None => Ok(set),
                Some(number) => Err(DecoderError::Decode(format!(
                    "group {number} is not terminated"
                ))),
            };
        }

        let tag = input.read_raw_varint32()?;
        let number = tag >> 3;
        if number == 0 {
            return Err(DecoderError::Decode("invalid field number 0".to_string()));
        }
        let wire_type = WireType::from_bits(tag & 0x7).ok_or_else(|| {
            DecoderError::Decode(format!(
                "invalid wire type {} for field {number}",
                tag & 0x7
            ))
        })?;

        let value = match wire_type {
            WireType::Varint => UnknownValue::Varint(input.read_raw_varint64()?),
            WireType::Fixed64 => UnknownValue::Fixed64(input.read_raw_little_endian64()?),
            WireType::Fixed32 => UnknownValue::Fixed32(input.read_raw_little_endian32()?),
            WireType::LengthDelimited => {
                let len = input.read_raw_varint32()?;
                UnknownValue::LengthDelimited(input.read_raw_bytes(len)?)
            }
            WireType::StartGroup => {
                if depth + 1 >= MAX_NESTING_DEPTH {
                    return Err(DecoderError::Decode(format!(
                        "groups nested deeper than {MAX_NESTING_DEPTH}"
                    )));
                }
                UnknownValue::Group(read_fields(input, Some(number), depth + 1)?)
            }
            WireType::EndGroup => {
                if group == Some(number) {
                    return Ok(set);
                }
                return Err(DecoderError::Decode(format!(
                    "unexpected end of group {number}"
                )));
            }
        };

        set.push(number, value);
    }
}
