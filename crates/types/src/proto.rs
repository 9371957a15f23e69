//! Decoded message tree for payloads with a known schema.
//!
//! These types are the runtime representation of a protobuf message after it
//! has been parsed against a descriptor. The decoder in `pb-decoder-message`
//! produces them and the JSON renderer consumes them. Fields keep the order in
//! which the descriptor declares them, so rendering is deterministic.

/// Represents a field value in a decoded protobuf message.
#[derive(Debug, Clone, PartialEq)]
pub enum FieldValue {
    Double(f64),
    Float(f32),
    Int32(i32),
    Int64(i64),
    Uint32(u32),
    Uint64(u64),
    Bool(bool),
    String(String),
    Bytes(Vec<u8>),
    /// Enum value; `name` is `None` when the number is not declared by the enum.
    Enum {
        number: i32,
        name: Option<String>,
    },
    Message(Box<DecodedMessage>),
    Repeated(Vec<FieldValue>),
    /// Map entries in wire order, as (key, value) pairs.
    Map(Vec<(FieldValue, FieldValue)>),
}

impl FieldValue {
    /// Human-readable kind, used in diagnostics.
    pub fn kind_name(&self) -> &'static str {
        match self {
            FieldValue::Double(_) => "double",
            FieldValue::Float(_) => "float",
            FieldValue::Int32(_) => "int32",
            FieldValue::Int64(_) => "int64",
            FieldValue::Uint32(_) => "uint32",
            FieldValue::Uint64(_) => "uint64",
            FieldValue::Bool(_) => "bool",
            FieldValue::String(_) => "string",
            FieldValue::Bytes(_) => "bytes",
            FieldValue::Enum { .. } => "enum",
            FieldValue::Message(_) => "message",
            FieldValue::Repeated(_) => "repeated",
            FieldValue::Map(_) => "map",
        }
    }
}

/// A single present field of a decoded message.
#[derive(Debug, Clone, PartialEq)]
pub struct DecodedField {
    /// Field name as declared in the .proto file
    pub name: String,
    /// lowerCamelCase JSON name from the descriptor
    pub json_name: String,
    /// Field number (tag)
    pub number: u32,
    pub value: FieldValue,
}

/// A message decoded against its descriptor.
#[derive(Debug, Clone, PartialEq)]
pub struct DecodedMessage {
    /// Fully qualified message name (e.g., "mypackage.MyMessage")
    pub message_type: String,
    /// Present fields in declaration order
    pub fields: Vec<DecodedField>,
}

impl DecodedMessage {
    pub fn new(message_type: impl Into<String>) -> Self {
        Self {
            message_type: message_type.into(),
            fields: Vec::new(),
        }
    }

    /// Get a field value by its declared name.
    pub fn get(&self, name: &str) -> Option<&FieldValue> {
        self.fields
            .iter()
            .find(|f| f.name == name)
            .map(|f| &f.value)
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }
}
