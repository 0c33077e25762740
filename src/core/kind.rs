//! The closed set of tag kinds and their wire ordinals.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Identifies the payload shape of a [`Tag`](crate::core::tag::Tag).
///
/// The discriminants are the ordinals written to the wire and must never change.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[repr(i32)]
pub enum TagKind {
    /// No payload; exists to own children.
    Container = 0,
    /// The absent/null value.
    Absent = 1,
    /// Opaque byte blob.
    Blob = 2,
    Bool = 3,
    Char = 4,
    Byte = 5,
    Short = 6,
    Int = 7,
    Long = 8,
    Float = 9,
    Double = 10,
    String = 11,
    Decimal = 12,
    UShort = 13,
    UInt = 14,
    ULong = 15,
    SByte = 16,
    BoolArray = 17,
    CharArray = 18,
    ByteArray = 19,
    ShortArray = 20,
    IntArray = 21,
    LongArray = 22,
    FloatArray = 23,
    DoubleArray = 24,
    StringArray = 25,
    DecimalArray = 26,
    UShortArray = 27,
    UIntArray = 28,
    ULongArray = 29,
    SByteArray = 30,
}

impl TagKind {
    /// Every kind, in ordinal order
    pub const ALL: [TagKind; 31] = [
        TagKind::Container,
        TagKind::Absent,
        TagKind::Blob,
        TagKind::Bool,
        TagKind::Char,
        TagKind::Byte,
        TagKind::Short,
        TagKind::Int,
        TagKind::Long,
        TagKind::Float,
        TagKind::Double,
        TagKind::String,
        TagKind::Decimal,
        TagKind::UShort,
        TagKind::UInt,
        TagKind::ULong,
        TagKind::SByte,
        TagKind::BoolArray,
        TagKind::CharArray,
        TagKind::ByteArray,
        TagKind::ShortArray,
        TagKind::IntArray,
        TagKind::LongArray,
        TagKind::FloatArray,
        TagKind::DoubleArray,
        TagKind::StringArray,
        TagKind::DecimalArray,
        TagKind::UShortArray,
        TagKind::UIntArray,
        TagKind::ULongArray,
        TagKind::SByteArray,
    ];

    /// Wire ordinal of this kind
    #[inline]
    pub fn ordinal(self) -> i32 {
        self as i32
    }

    /// Look up a kind by its wire ordinal
    pub fn from_ordinal(ordinal: i32) -> Option<Self> {
        usize::try_from(ordinal)
            .ok()
            .and_then(|index| Self::ALL.get(index).copied())
    }

    /// True for the payload-less marker kinds
    pub fn is_marker(self) -> bool {
        matches!(self, TagKind::Container | TagKind::Absent)
    }

    /// True for the 14 single-value kinds
    pub fn is_scalar(self) -> bool {
        (TagKind::Bool.ordinal()..=TagKind::SByte.ordinal()).contains(&self.ordinal())
    }

    /// True for the 14 homogeneous-array kinds
    pub fn is_array(self) -> bool {
        self.ordinal() >= TagKind::BoolArray.ordinal()
    }

    /// Scalar kind of the elements of an array kind
    pub fn element_kind(self) -> Option<TagKind> {
        match self {
            TagKind::BoolArray => Some(TagKind::Bool),
            TagKind::CharArray => Some(TagKind::Char),
            TagKind::ByteArray => Some(TagKind::Byte),
            TagKind::ShortArray => Some(TagKind::Short),
            TagKind::IntArray => Some(TagKind::Int),
            TagKind::LongArray => Some(TagKind::Long),
            TagKind::FloatArray => Some(TagKind::Float),
            TagKind::DoubleArray => Some(TagKind::Double),
            TagKind::StringArray => Some(TagKind::String),
            TagKind::DecimalArray => Some(TagKind::Decimal),
            TagKind::UShortArray => Some(TagKind::UShort),
            TagKind::UIntArray => Some(TagKind::UInt),
            TagKind::ULongArray => Some(TagKind::ULong),
            TagKind::SByteArray => Some(TagKind::SByte),
            _ => None,
        }
    }

    /// Human-readable name
    pub fn name(self) -> &'static str {
        match self {
            TagKind::Container => "Container",
            TagKind::Absent => "Absent",
            TagKind::Blob => "Blob",
            TagKind::Bool => "Bool",
            TagKind::Char => "Char",
            TagKind::Byte => "Byte",
            TagKind::Short => "Short",
            TagKind::Int => "Int",
            TagKind::Long => "Long",
            TagKind::Float => "Float",
            TagKind::Double => "Double",
            TagKind::String => "String",
            TagKind::Decimal => "Decimal",
            TagKind::UShort => "UShort",
            TagKind::UInt => "UInt",
            TagKind::ULong => "ULong",
            TagKind::SByte => "SByte",
            TagKind::BoolArray => "BoolArray",
            TagKind::CharArray => "CharArray",
            TagKind::ByteArray => "ByteArray",
            TagKind::ShortArray => "ShortArray",
            TagKind::IntArray => "IntArray",
            TagKind::LongArray => "LongArray",
            TagKind::FloatArray => "FloatArray",
            TagKind::DoubleArray => "DoubleArray",
            TagKind::StringArray => "StringArray",
            TagKind::DecimalArray => "DecimalArray",
            TagKind::UShortArray => "UShortArray",
            TagKind::UIntArray => "UIntArray",
            TagKind::ULongArray => "ULongArray",
            TagKind::SByteArray => "SByteArray",
        }
    }
}

impl fmt::Display for TagKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ordinals_match_position() {
        for (index, kind) in TagKind::ALL.iter().enumerate() {
            assert_eq!(kind.ordinal(), index as i32);
            assert_eq!(TagKind::from_ordinal(index as i32), Some(*kind));
        }
    }

    #[test]
    fn test_unknown_ordinals() {
        assert_eq!(TagKind::from_ordinal(-1), None);
        assert_eq!(TagKind::from_ordinal(31), None);
        assert_eq!(TagKind::from_ordinal(i32::MAX), None);
    }

    #[test]
    fn test_groups_partition_kinds() {
        let markers = TagKind::ALL.iter().filter(|k| k.is_marker()).count();
        let scalars = TagKind::ALL.iter().filter(|k| k.is_scalar()).count();
        let arrays = TagKind::ALL.iter().filter(|k| k.is_array()).count();
        assert_eq!(markers, 2);
        assert_eq!(scalars, 14);
        assert_eq!(arrays, 14);
        assert!(!TagKind::Blob.is_scalar() && !TagKind::Blob.is_array());
    }

    #[test]
    fn test_element_kinds_are_scalars() {
        for kind in TagKind::ALL.iter().filter(|k| k.is_array()) {
            let element = kind.element_kind();
            assert!(element.is_some_and(TagKind::is_scalar), "{kind}");
        }
        assert_eq!(TagKind::Int.element_kind(), None);
    }
}
