//! Canonical JSON rendering of decoded messages.
//!
//! Follows the proto3 JSON mapping:
//! - 64-bit integers as strings, 32-bit integers and floats as numbers
//! - bytes as standard base64
//! - enums by value name (numbers when the value is not declared)
//! - maps as objects keyed by the stringified key
//! - well-known types (Timestamp, Duration, wrappers, Struct, FieldMask) in
//!   their special forms

use base64::Engine;
use chrono::{DateTime, SecondsFormat};
use pb_decoder_types::{DecodedMessage, DecoderError, FieldValue, Result};
use serde_json::{Map, Number, Value};

/// Rendering options.
#[derive(Debug, Clone)]
pub struct JsonOptions {
    /// Two-space indented output instead of a single line.
    pub pretty: bool,
    /// Use field names as declared in the .proto file instead of lowerCamelCase.
    pub preserve_proto_field_names: bool,
}

impl Default for JsonOptions {
    fn default() -> Self {
        Self {
            pretty: true,
            preserve_proto_field_names: false,
        }
    }
}

/// Render a decoded message as JSON text.
pub fn render_json(message: &DecodedMessage, options: &JsonOptions) -> Result<String> {
    let value = message_to_json(message, options);
    let rendered = if options.pretty {
        serde_json::to_string_pretty(&value)
    } else {
        serde_json::to_string(&value)
    };
    rendered.map_err(|e| DecoderError::Decode(format!("failed to render JSON: {e}")))
}

/// Convert a decoded message to a JSON value.
pub fn message_to_json(message: &DecodedMessage, options: &JsonOptions) -> Value {
    if let Some(value) = well_known_to_json(message, options) {
        return value;
    }

    let mut map = Map::new();
    for field in &message.fields {
        let key = if options.preserve_proto_field_names {
            &field.name
        } else {
            &field.json_name
        };
        map.insert(key.clone(), value_to_json(&field.value, options));
    }
    Value::Object(map)
}

fn value_to_json(value: &FieldValue, options: &JsonOptions) -> Value {
    match value {
        FieldValue::Double(f) => float_to_json(*f),
        // Go through the shortest f32 representation so 0.1f32 prints as 0.1.
        FieldValue::Float(f) => float_to_json(f.to_string().parse().unwrap_or(f64::from(*f))),
        FieldValue::Int32(i) => Value::Number(Number::from(*i)),
        FieldValue::Uint32(u) => Value::Number(Number::from(*u)),
        FieldValue::Int64(i) => Value::String(i.to_string()),
        FieldValue::Uint64(u) => Value::String(u.to_string()),
        FieldValue::Bool(b) => Value::Bool(*b),
        FieldValue::String(s) => Value::String(s.clone()),
        FieldValue::Bytes(b) => {
            Value::String(base64::engine::general_purpose::STANDARD.encode(b))
        }
        FieldValue::Enum { name: Some(name), .. } if name == "NULL_VALUE" => Value::Null,
        FieldValue::Enum { name: Some(name), .. } => Value::String(name.clone()),
        FieldValue::Enum { number, name: None } => Value::Number(Number::from(*number)),
        FieldValue::Message(m) => message_to_json(m, options),
        FieldValue::Repeated(items) => Value::Array(
            items
                .iter()
                .map(|item| value_to_json(item, options))
                .collect(),
        ),
        FieldValue::Map(entries) => {
            let mut map = Map::new();
            for (key, value) in entries {
                map.insert(map_key(key), value_to_json(value, options));
            }
            Value::Object(map)
        }
    }
}

fn float_to_json(f: f64) -> Value {
    if f.is_nan() {
        Value::String("NaN".to_string())
    } else if f.is_infinite() {
        let s = if f > 0.0 { "Infinity" } else { "-Infinity" };
        Value::String(s.to_string())
    } else {
        Number::from_f64(f).map(Value::Number).unwrap_or(Value::Null)
    }
}

fn map_key(key: &FieldValue) -> String {
    match key {
        FieldValue::String(s) => s.clone(),
        FieldValue::Bool(b) => b.to_string(),
        FieldValue::Int32(i) => i.to_string(),
        FieldValue::Int64(i) => i.to_string(),
        FieldValue::Uint32(u) => u.to_string(),
        FieldValue::Uint64(u) => u.to_string(),
        // Not a legal map key kind.
        other => format!("<{}>", other.kind_name()),
    }
}

fn well_known_to_json(message: &DecodedMessage, options: &JsonOptions) -> Option<Value> {
    let wrapped = || message.get("value");

    match message.message_type.as_str() {
        "google.protobuf.Timestamp" => {
            let seconds = int64_field(message, "seconds");
            let nanos = int32_field(message, "nanos");
            let ts = DateTime::from_timestamp(seconds, u32::try_from(nanos).ok()?)?;
            Some(Value::String(ts.to_rfc3339_opts(SecondsFormat::AutoSi, true)))
        }
        "google.protobuf.Duration" => Some(Value::String(format_duration(
            int64_field(message, "seconds"),
            int32_field(message, "nanos"),
        ))),
        "google.protobuf.DoubleValue"
        | "google.protobuf.FloatValue"
        | "google.protobuf.Int32Value"
        | "google.protobuf.UInt32Value" => Some(
            wrapped()
                .map(|v| value_to_json(v, options))
                .unwrap_or_else(|| Value::Number(Number::from(0))),
        ),
        "google.protobuf.Int64Value" | "google.protobuf.UInt64Value" => Some(
            wrapped()
                .map(|v| value_to_json(v, options))
                .unwrap_or_else(|| Value::String("0".to_string())),
        ),
        "google.protobuf.BoolValue" => Some(
            wrapped()
                .map(|v| value_to_json(v, options))
                .unwrap_or(Value::Bool(false)),
        ),
        "google.protobuf.StringValue" | "google.protobuf.BytesValue" => Some(
            wrapped()
                .map(|v| value_to_json(v, options))
                .unwrap_or_else(|| Value::String(String::new())),
        ),
        "google.protobuf.Struct" => Some(
            message
                .get("fields")
                .map(|v| value_to_json(v, options))
                .unwrap_or_else(|| Value::Object(Map::new())),
        ),
        "google.protobuf.ListValue" => Some(
            message
                .get("values")
                .map(|v| value_to_json(v, options))
                .unwrap_or_else(|| Value::Array(Vec::new())),
        ),
        // `kind` is a oneof, so at most one field is present.
        "google.protobuf.Value" => Some(
            message
                .fields
                .first()
                .map(|f| value_to_json(&f.value, options))
                .unwrap_or(Value::Null),
        ),
        "google.protobuf.FieldMask" => {
            let paths = match message.get("paths") {
                Some(FieldValue::Repeated(items)) => items
                    .iter()
                    .filter_map(|item| match item {
                        FieldValue::String(path) => Some(lower_camel_path(path)),
                        _ => None,
                    })
                    .collect::<Vec<_>>(),
                _ => Vec::new(),
            };
            Some(Value::String(paths.join(",")))
        }
        _ => None,
    }
}

fn int64_field(message: &DecodedMessage, name: &str) -> i64 {
    match message.get(name) {
        Some(FieldValue::Int64(v)) => *v,
        _ => 0,
    }
}

fn int32_field(message: &DecodedMessage, name: &str) -> i32 {
    match message.get(name) {
        Some(FieldValue::Int32(v)) => *v,
        _ => 0,
    }
}

/// Format a duration as seconds with 0, 3, 6 or 9 fractional digits.
pub fn format_duration(seconds: i64, nanos: i32) -> String {
    let sign = if seconds < 0 || nanos < 0 { "-" } else { "" };
    let secs = seconds.unsigned_abs();
    let nanos = nanos.unsigned_abs();

    let fraction = if nanos == 0 {
        String::new()
    } else if nanos % 1_000_000 == 0 {
        format!(".{:03}", nanos / 1_000_000)
    } else if nanos % 1_000 == 0 {
        format!(".{:06}", nanos / 1_000)
    } else {
        format!(".{nanos:09}")
    };

    format!("{sign}{secs}{fraction}s")
}

fn lower_camel_path(path: &str) -> String {
    path.split('.')
        .map(|segment| {
            let mut out = String::with_capacity(segment.len());
            let mut upper_next = false;
            for c in segment.chars() {
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
        })
        .collect::<Vec<_>>()
        .join(".")
}

#[cfg(test)]
mod tests {
    use super::*;
    use pb_decoder_types::DecodedField;
    use serde_json::json;

    fn field(name: &str, json_name: &str, number: u32, value: FieldValue) -> DecodedField {
        DecodedField {
            name: name.to_string(),
            json_name: json_name.to_string(),
            number,
            value,
        }
    }

    fn message(message_type: &str, fields: Vec<DecodedField>) -> DecodedMessage {
        DecodedMessage {
            message_type: message_type.to_string(),
            fields,
        }
    }

    fn timestamp(seconds: i64, nanos: i32) -> FieldValue {
        FieldValue::Message(Box::new(message(
            "google.protobuf.Timestamp",
            vec![
                field("seconds", "seconds", 1, FieldValue::Int64(seconds)),
                field("nanos", "nanos", 2, FieldValue::Int32(nanos)),
            ],
        )))
    }

    #[test]
    fn test_scalar_mapping() {
        let msg = message(
            "demo.Scalars",
            vec![
                field("count", "count", 1, FieldValue::Int32(-7)),
                field("big", "big", 2, FieldValue::Int64(9_007_199_254_740_993)),
                field("ubig", "ubig", 3, FieldValue::Uint64(u64::MAX)),
                field("ratio", "ratio", 4, FieldValue::Float(0.1)),
                field("blob", "blob", 5, FieldValue::Bytes(vec![1, 2, 3])),
                field("ok", "ok", 6, FieldValue::Bool(true)),
                field("nan", "nan", 7, FieldValue::Double(f64::NAN)),
                field("neg_inf", "negInf", 8, FieldValue::Double(f64::NEG_INFINITY)),
            ],
        );

        assert_eq!(
            message_to_json(&msg, &JsonOptions::default()),
            json!({
                "count": -7,
                "big": "9007199254740993",
                "ubig": "18446744073709551615",
                "ratio": 0.1,
                "blob": "AQID",
                "ok": true,
                "nan": "NaN",
                "negInf": "-Infinity"
            })
        );
    }

    #[test]
    fn test_enum_mapping() {
        let msg = message(
            "demo.Enums",
            vec![
                field(
                    "known",
                    "known",
                    1,
                    FieldValue::Enum {
                        number: 2,
                        name: Some("RETIRED".to_string()),
                    },
                ),
                field(
                    "unknown",
                    "unknown",
                    2,
                    FieldValue::Enum {
                        number: 42,
                        name: None,
                    },
                ),
            ],
        );
        assert_eq!(
            message_to_json(&msg, &JsonOptions::default()),
            json!({"known": "RETIRED", "unknown": 42})
        );
    }

    #[test]
    fn test_field_name_styles() {
        let msg = message(
            "demo.Names",
            vec![field("display_name", "displayName", 1, FieldValue::String("x".to_string()))],
        );
        assert_eq!(
            message_to_json(&msg, &JsonOptions::default()),
            json!({"displayName": "x"})
        );

        let options = JsonOptions {
            preserve_proto_field_names: true,
            ..JsonOptions::default()
        };
        assert_eq!(message_to_json(&msg, &options), json!({"display_name": "x"}));
    }

    #[test]
    fn test_map_and_repeated() {
        let msg = message(
            "demo.Collections",
            vec![
                field(
                    "tags",
                    "tags",
                    1,
                    FieldValue::Repeated(vec![
                        FieldValue::String("a".to_string()),
                        FieldValue::String("b".to_string()),
                    ]),
                ),
                field(
                    "by_id",
                    "byId",
                    2,
                    FieldValue::Map(vec![
                        (FieldValue::Int64(10), FieldValue::Bool(true)),
                        (FieldValue::Int64(-1), FieldValue::Bool(false)),
                    ]),
                ),
            ],
        );
        assert_eq!(
            message_to_json(&msg, &JsonOptions::default()),
            json!({"tags": ["a", "b"], "byId": {"10": true, "-1": false}})
        );
    }

    #[test]
    fn test_timestamp() {
        let msg = message(
            "demo.Event",
            vec![
                field("at", "at", 1, timestamp(1_718_454_645, 0)),
                field("precise", "precise", 2, timestamp(0, 21_000_000)),
            ],
        );
        assert_eq!(
            message_to_json(&msg, &JsonOptions::default()),
            json!({"at": "2024-06-15T12:30:45Z", "precise": "1970-01-01T00:00:00.021Z"})
        );
    }

    #[test]
    fn test_duration_format() {
        assert_eq!(format_duration(1, 500_000_000), "1.500s");
        assert_eq!(format_duration(3, 0), "3s");
        assert_eq!(format_duration(0, 1_000), "0.000001s");
        assert_eq!(format_duration(0, 7), "0.000000007s");
        assert_eq!(format_duration(-2, -250_000_000), "-2.250s");
    }

    #[test]
    fn test_wrappers_unwrap() {
        let wrapped = |t: &str, v: Option<FieldValue>| {
            let fields = v
                .map(|v| vec![field("value", "value", 1, v)])
                .unwrap_or_default();
            FieldValue::Message(Box::new(message(t, fields)))
        };
        let msg = message(
            "demo.Wrappers",
            vec![
                field(
                    "name",
                    "name",
                    1,
                    wrapped(
                        "google.protobuf.StringValue",
                        Some(FieldValue::String("n".to_string())),
                    ),
                ),
                field(
                    "total",
                    "total",
                    2,
                    wrapped("google.protobuf.Int64Value", Some(FieldValue::Int64(5))),
                ),
                field(
                    "enabled",
                    "enabled",
                    3,
                    wrapped("google.protobuf.BoolValue", None),
                ),
            ],
        );
        assert_eq!(
            message_to_json(&msg, &JsonOptions::default()),
            json!({"name": "n", "total": "5", "enabled": false})
        );
    }

    #[test]
    fn test_struct_value_and_list() {
        let value = |f: DecodedField| {
            FieldValue::Message(Box::new(message("google.protobuf.Value", vec![f])))
        };
        let list = FieldValue::Message(Box::new(message(
            "google.protobuf.ListValue",
            vec![field(
                "values",
                "values",
                1,
                FieldValue::Repeated(vec![
                    value(field("number_value", "numberValue", 2, FieldValue::Double(1.5))),
                    value(field(
                        "null_value",
                        "nullValue",
                        1,
                        FieldValue::Enum {
                            number: 0,
                            name: Some("NULL_VALUE".to_string()),
                        },
                    )),
                ]),
            )],
        )));
        let st = message(
            "google.protobuf.Struct",
            vec![field(
                "fields",
                "fields",
                1,
                FieldValue::Map(vec![
                    (
                        FieldValue::String("name".to_string()),
                        value(field(
                            "string_value",
                            "stringValue",
                            3,
                            FieldValue::String("lamp".to_string()),
                        )),
                    ),
                    (
                        FieldValue::String("dims".to_string()),
                        value(field("list_value", "listValue", 6, list)),
                    ),
                ]),
            )],
        );

        assert_eq!(
            message_to_json(&st, &JsonOptions::default()),
            json!({"name": "lamp", "dims": [1.5, null]})
        );
    }

    #[test]
    fn test_field_mask() {
        let msg = message(
            "google.protobuf.FieldMask",
            vec![field(
                "paths",
                "paths",
                1,
                FieldValue::Repeated(vec![
                    FieldValue::String("user.display_name".to_string()),
                    FieldValue::String("photo".to_string()),
                ]),
            )],
        );
        assert_eq!(
            message_to_json(&msg, &JsonOptions::default()),
            json!("user.displayName,photo")
        );
    }

    #[test]
    fn test_render_compact_and_pretty() {
        let msg = message("demo.One", vec![field("a", "a", 1, FieldValue::Int32(1))]);
        let compact = JsonOptions {
            pretty: false,
            ..JsonOptions::default()
        };
        assert_eq!(render_json(&msg, &compact).unwrap(), "{\"a\":1}");
        assert_eq!(
            render_json(&msg, &JsonOptions::default()).unwrap(),
            "{\n  \"a\": 1\n}"
        );
        assert_eq!(
            render_json(&DecodedMessage::new("demo.Empty"), &JsonOptions::default()).unwrap(),
            "{}"
        );
    }
}
