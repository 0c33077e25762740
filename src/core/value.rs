//! Payloads carried by tags.
//!
//! Each variant corresponds to exactly one payload-bearing [`TagKind`], so a tag
//! can never hold a payload that disagrees with its kind.

use crate::core::kind::TagKind;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// The payload of a tag whose kind carries data.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum TagValue {
    Blob(Vec<u8>),
    Bool(bool),
    Char(char),
    Byte(u8),
    Short(i16),
    Int(i32),
    Long(i64),
    Float(f32),
    Double(f64),
    String(String),
    Decimal(Decimal),
    UShort(u16),
    UInt(u32),
    ULong(u64),
    SByte(i8),
    BoolArray(Vec<bool>),
    CharArray(Vec<char>),
    ByteArray(Vec<u8>),
    ShortArray(Vec<i16>),
    IntArray(Vec<i32>),
    LongArray(Vec<i64>),
    FloatArray(Vec<f32>),
    DoubleArray(Vec<f64>),
    StringArray(Vec<String>),
    DecimalArray(Vec<Decimal>),
    UShortArray(Vec<u16>),
    UIntArray(Vec<u32>),
    ULongArray(Vec<u64>),
    SByteArray(Vec<i8>),
}

impl TagValue {
    /// Kind implied by this payload
    pub fn kind(&self) -> TagKind {
        match self {
            TagValue::Blob(_) => TagKind::Blob,
            TagValue::Bool(_) => TagKind::Bool,
            TagValue::Char(_) => TagKind::Char,
            TagValue::Byte(_) => TagKind::Byte,
            TagValue::Short(_) => TagKind::Short,
            TagValue::Int(_) => TagKind::Int,
            TagValue::Long(_) => TagKind::Long,
            TagValue::Float(_) => TagKind::Float,
            TagValue::Double(_) => TagKind::Double,
            TagValue::String(_) => TagKind::String,
            TagValue::Decimal(_) => TagKind::Decimal,
            TagValue::UShort(_) => TagKind::UShort,
            TagValue::UInt(_) => TagKind::UInt,
            TagValue::ULong(_) => TagKind::ULong,
            TagValue::SByte(_) => TagKind::SByte,
            TagValue::BoolArray(_) => TagKind::BoolArray,
            TagValue::CharArray(_) => TagKind::CharArray,
            TagValue::ByteArray(_) => TagKind::ByteArray,
            TagValue::ShortArray(_) => TagKind::ShortArray,
            TagValue::IntArray(_) => TagKind::IntArray,
            TagValue::LongArray(_) => TagKind::LongArray,
            TagValue::FloatArray(_) => TagKind::FloatArray,
            TagValue::DoubleArray(_) => TagKind::DoubleArray,
            TagValue::StringArray(_) => TagKind::StringArray,
            TagValue::DecimalArray(_) => TagKind::DecimalArray,
            TagValue::UShortArray(_) => TagKind::UShortArray,
            TagValue::UIntArray(_) => TagKind::UIntArray,
            TagValue::ULongArray(_) => TagKind::ULongArray,
            TagValue::SByteArray(_) => TagKind::SByteArray,
        }
    }

    /// Element count for array and blob payloads
    pub fn array_len(&self) -> Option<usize> {
        Some(match self {
            TagValue::Blob(v) | TagValue::ByteArray(v) => v.len(),
            TagValue::BoolArray(v) => v.len(),
            TagValue::CharArray(v) => v.len(),
            TagValue::ShortArray(v) => v.len(),
            TagValue::IntArray(v) => v.len(),
            TagValue::LongArray(v) => v.len(),
            TagValue::FloatArray(v) => v.len(),
            TagValue::DoubleArray(v) => v.len(),
            TagValue::StringArray(v) => v.len(),
            TagValue::DecimalArray(v) => v.len(),
            TagValue::UShortArray(v) => v.len(),
            TagValue::UIntArray(v) => v.len(),
            TagValue::ULongArray(v) => v.len(),
            TagValue::SByteArray(v) => v.len(),
            _ => return None,
        })
    }
}

macro_rules! impl_from_payload {
    ($($ty:ty => $variant:ident),* $(,)?) => {
        $(
            impl From<$ty> for TagValue {
                fn from(value: $ty) -> Self {
                    TagValue::$variant(value)
                }
            }
        )*
    };
}

impl_from_payload! {
    bool => Bool,
    char => Char,
    u8 => Byte,
    i16 => Short,
    i32 => Int,
    i64 => Long,
    f32 => Float,
    f64 => Double,
    String => String,
    Decimal => Decimal,
    u16 => UShort,
    u32 => UInt,
    u64 => ULong,
    i8 => SByte,
    Vec<bool> => BoolArray,
    Vec<char> => CharArray,
    Vec<u8> => ByteArray,
    Vec<i16> => ShortArray,
    Vec<i32> => IntArray,
    Vec<i64> => LongArray,
    Vec<f32> => FloatArray,
    Vec<f64> => DoubleArray,
    Vec<String> => StringArray,
    Vec<Decimal> => DecimalArray,
    Vec<u16> => UShortArray,
    Vec<u32> => UIntArray,
    Vec<u64> => ULongArray,
    Vec<i8> => SByteArray,
}

impl From<&str> for TagValue {
    fn from(value: &str) -> Self {
        TagValue::String(value.to_owned())
    }
}
