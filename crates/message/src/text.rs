//! Text dump of unknown fields.
//!
//! Output follows the classic protobuf text printer for unknown fields:
//!
//! ```text
//! 1: "hello"
//! 2 {
//!   1: 53
//!   2: "red"
//! }
//! ```

use crate::unknown::try_parse_nested;
use pb_decoder_types::{UnknownFieldSet, UnknownValue};

/// Render an unknown-field set, one field per line, in wire order.
pub fn render_text(set: &UnknownFieldSet) -> String {
    let mut out = String::new();
    write_fields(&mut out, set, 0);
    out
}

fn write_fields(out: &mut String, set: &UnknownFieldSet, depth: usize) {
    for field in &set.fields {
        let indent = "  ".repeat(depth);
        match &field.value {
            UnknownValue::Varint(v) => {
                out.push_str(&format!("{indent}{}: {v}\n", field.number));
            }
            UnknownValue::Fixed32(v) => {
                out.push_str(&format!("{indent}{}: 0x{v:08x}\n", field.number));
            }
            UnknownValue::Fixed64(v) => {
                out.push_str(&format!("{indent}{}: 0x{v:016x}\n", field.number));
            }
            UnknownValue::LengthDelimited(bytes) => match try_parse_nested(bytes, depth + 1) {
                Some(nested) => write_block(out, field.number, &nested, depth),
                None => {
                    out.push_str(&format!(
                        "{indent}{}: \"{}\"\n",
                        field.number,
                        escape_bytes(bytes)
                    ));
                }
            },
            UnknownValue::Group(group) => write_block(out, field.number, group, depth),
        }
    }
}

fn write_block(out: &mut String, number: u32, set: &UnknownFieldSet, depth: usize) {
    let indent = "  ".repeat(depth);
    out.push_str(&format!("{indent}{number} {{\n"));
    write_fields(out, set, depth + 1);
    out.push_str(&format!("{indent}}}\n"));
}

/// C-style escaping: printable ASCII as-is, common escapes, octal otherwise.
pub fn escape_bytes(bytes: &[u8]) -> String {
    let mut out = String::with_capacity(bytes.len());
    for &b in bytes {
        match b {
            0x07 => out.push_str("\\a"),
            0x08 => out.push_str("\\b"),
            0x0c => out.push_str("\\f"),
            b'\n' => out.push_str("\\n"),
            b'\r' => out.push_str("\\r"),
            b'\t' => out.push_str("\\t"),
            0x0b => out.push_str("\\v"),
            b'\\' => out.push_str("\\\\"),
            b'\'' => out.push_str("\\'"),
            b'"' => out.push_str("\\\""),
            0x20..=0x7e => out.push(b as char),
            _ => out.push_str(&format!("\\{b:03o}")),
        }
    }
    out
}
