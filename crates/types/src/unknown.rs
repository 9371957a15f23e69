//! Wire-level field model for payloads decoded without a schema.

/// Protobuf wire types.
///
/// Tag = (field_number << 3) | wire_type
/// Wire types: 0=varint, 1=64-bit, 2=length-delimited, 3/4=group start/end, 5=32-bit
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WireType {
    Varint,
    Fixed64,
    LengthDelimited,
    StartGroup,
    EndGroup,
    Fixed32,
}

impl WireType {
    pub fn from_bits(bits: u32) -> Option<Self> {
        match bits {
            0 => Some(WireType::Varint),
            1 => Some(WireType::Fixed64),
            2 => Some(WireType::LengthDelimited),
            3 => Some(WireType::StartGroup),
            4 => Some(WireType::EndGroup),
            5 => Some(WireType::Fixed32),
            _ => None,
        }
    }
}

/// Raw value of an unknown field, tagged by its wire type.
#[derive(Debug, Clone, PartialEq)]
pub enum UnknownValue {
    Varint(u64),
    Fixed64(u64),
    Fixed32(u32),
    LengthDelimited(Vec<u8>),
    Group(UnknownFieldSet),
}

#[derive(Debug, Clone, PartialEq)]
pub struct UnknownField {
    pub number: u32,
    pub value: UnknownValue,
}

/// Flat sequence of fields in wire order.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct UnknownFieldSet {
    pub fields: Vec<UnknownField>,
}

impl UnknownFieldSet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, number: u32, value: UnknownValue) {
        self.fields.push(UnknownField { number, value });
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    /// Field numbers in wire order, duplicates included.
    pub fn numbers(&self) -> Vec<u32> {
        self.fields.iter().map(|f| f.number).collect()
    }
}
