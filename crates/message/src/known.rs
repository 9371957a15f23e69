//! Schema-aware decoding.
//!
//! Parses bytes into a dynamic message using a runtime `MessageDescriptor`,
//! then walks it through protobuf reflection into a [`DecodedMessage`] tree.

use pb_decoder_types::{DecodedField, DecodedMessage, FieldValue, Result};
use protobuf::reflect::{FieldDescriptor, MessageDescriptor, ReflectFieldRef, ReflectValueRef};
use protobuf::MessageDyn;

/// Decode `bytes` as an instance of `descriptor`.
///
/// Fails with `Decode` on truncated input or wire data that contradicts the
/// schema.
pub fn decode_message(bytes: &[u8], descriptor: &MessageDescriptor) -> Result<DecodedMessage> {
    let message = descriptor.parse_from_bytes(bytes)?;
    Ok(reflect_message(&*message))
}

/// Convert a reflected message into a decoded tree.
///
/// Fields with implicit presence (proto3 singular scalars outside a oneof)
/// are left out when they hold their default value, so they render the same
/// way an absent field does.
pub fn reflect_message(message: &dyn MessageDyn) -> DecodedMessage {
    let descriptor = message.descriptor_dyn();
    let proto3 = descriptor.file_descriptor().proto().syntax() == "proto3";
    let mut decoded = DecodedMessage::new(descriptor.full_name());

    for field in descriptor.fields() {
        let value = match field.get_reflect(message) {
            ReflectFieldRef::Optional(optional) => match optional.value() {
                Some(v) if proto3 && !has_explicit_presence(&field) && is_default(&v) => None,
                Some(v) => Some(reflect_value(v)),
                None => None,
            },
            ReflectFieldRef::Repeated(repeated) => {
                if repeated.is_empty() {
                    None
                } else {
                    let items = (0..repeated.len())
                        .map(|i| reflect_value(repeated.get(i)))
                        .collect();
                    Some(FieldValue::Repeated(items))
                }
            }
            ReflectFieldRef::Map(map) => {
                if map.is_empty() {
                    None
                } else {
                    let mut entries = Vec::with_capacity(map.len());
                    for (key, value) in &map {
                        entries.push((reflect_value(key), reflect_value(value)));
                    }
                    Some(FieldValue::Map(entries))
                }
            }
        };

        if let Some(value) = value {
            decoded.fields.push(DecodedField {
                name: field.name().to_string(),
                json_name: json_name(&field),
                number: field.number() as u32,
                value,
            });
        }
    }

    decoded
}

fn reflect_value(value: ReflectValueRef) -> FieldValue {
    match value {
        ReflectValueRef::U32(v) => FieldValue::Uint32(v),
        ReflectValueRef::U64(v) => FieldValue::Uint64(v),
        ReflectValueRef::I32(v) => FieldValue::Int32(v),
        ReflectValueRef::I64(v) => FieldValue::Int64(v),
        ReflectValueRef::F32(v) => FieldValue::Float(v),
        ReflectValueRef::F64(v) => FieldValue::Double(v),
        ReflectValueRef::Bool(v) => FieldValue::Bool(v),
        ReflectValueRef::String(v) => FieldValue::String(v.to_string()),
        ReflectValueRef::Bytes(v) => FieldValue::Bytes(v.to_vec()),
        ReflectValueRef::Enum(descriptor, number) => FieldValue::Enum {
            number,
            name: descriptor
                .value_by_number(number)
                .map(|v| v.name().to_string()),
        },
        ReflectValueRef::Message(m) => FieldValue::Message(Box::new(reflect_message(&*m))),
    }
}

/// Members of a oneof (including synthetic oneofs of proto3 `optional`) track presence.
fn has_explicit_presence(field: &FieldDescriptor) -> bool {
    field.proto().has_oneof_index() || field.proto().proto3_optional()
}

fn is_default(value: &ReflectValueRef) -> bool {
    match value {
        ReflectValueRef::U32(v) => *v == 0,
        ReflectValueRef::U64(v) => *v == 0,
        ReflectValueRef::I32(v) => *v == 0,
        ReflectValueRef::I64(v) => *v == 0,
        ReflectValueRef::F32(v) => *v == 0.0,
        ReflectValueRef::F64(v) => *v == 0.0,
        ReflectValueRef::Bool(v) => !*v,
        ReflectValueRef::String(v) => v.is_empty(),
        ReflectValueRef::Bytes(v) => v.is_empty(),
        ReflectValueRef::Enum(_, number) => *number == 0,
        ReflectValueRef::Message(_) => false,
    }
}

fn json_name(field: &FieldDescriptor) -> String {
    let declared = field.json_name();
    if !declared.is_empty() {
        return declared.to_string();
    }

    let mut out = String::with_capacity(field.name().len());
    let mut upper_next = false;
    for c in field.name().chars() {
        if c == '_' {
            upper_next = true;
        } else if upper_next {
            out.extend(c.to_uppercase());
            upper_next = false;
        } else {
            out.push(c);
        }
    }
    out
}
