//! # Tag Tree
//!
//! The recursive tagged-value node. A tag has a kind, an optional payload whose
//! shape is fixed by the kind, and an ordered list of child tags ("entities").
//!
//! Trees are owned top-down: each child belongs to exactly one parent, and
//! `Clone` produces a fully independent deep copy.
//!
//! ```rust
//! use hyper_tag::{Tag, TagKind};
//!
//! let person = Tag::container()
//!     .with_entity(Tag::named("Number", Tag::from(42i32)))
//!     .with_entity(Tag::named("Text", Tag::from("Hello")));
//!
//! assert_eq!(person.kind(), TagKind::Container);
//! assert_eq!(person.entities()[1].first_entity().and_then(Tag::as_str), Some("Hello"));
//! ```

use crate::core::kind::TagKind;
use crate::core::value::TagValue;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// A node in the tag tree.
#[derive(Debug, Serialize, Deserialize)]
#[serde(try_from = "TagRepr")]
pub struct Tag {
    #[serde(rename = "Type")]
    kind: TagKind,
    #[serde(rename = "Value")]
    value: Option<TagValue>,
    #[serde(rename = "Entities")]
    entities: Vec<Tag>,
}

impl Tag {
    /// A leaf carrying `value`; the kind is taken from the payload
    pub fn new(value: impl Into<TagValue>) -> Self {
        let value = value.into();
        Self {
            kind: value.kind(),
            value: Some(value),
            entities: Vec::new(),
        }
    }

    /// A payload-less container
    pub fn container() -> Self {
        Self::without_value(TagKind::Container)
    }

    /// The absent/null value
    pub fn absent() -> Self {
        Self::without_value(TagKind::Absent)
    }

    /// A tag of `kind` whose payload is the absent sentinel
    pub fn without_value(kind: TagKind) -> Self {
        Self {
            kind,
            value: None,
            entities: Vec::new(),
        }
    }

    /// A blob tag holding opaque bytes
    pub fn blob(bytes: impl Into<Vec<u8>>) -> Self {
        Self::new(TagValue::Blob(bytes.into()))
    }

    /// The aggregate member convention: a string tag holding `name`
    /// that owns exactly one child, the member's value tag
    pub fn named(name: impl Into<String>, value: Tag) -> Self {
        Self::new(TagValue::String(name.into())).with_entity(value)
    }

    /// Try to build a tag from an explicit kind and payload
    ///
    /// Returns `None` when the payload does not belong to `kind`, or when a
    /// marker kind is given a payload.
    pub fn try_with_kind(kind: TagKind, value: Option<TagValue>) -> Option<Self> {
        match &value {
            Some(v) if v.kind() != kind => None,
            _ => Some(Self {
                kind,
                value,
                entities: Vec::new(),
            }),
        }
    }

    #[inline]
    pub fn kind(&self) -> TagKind {
        self.kind
    }

    #[inline]
    pub fn value(&self) -> Option<&TagValue> {
        self.value.as_ref()
    }

    /// Take the payload out of the tag, dropping its children
    pub fn into_value(mut self) -> Option<TagValue> {
        self.value.take()
    }

    /// Replace the payload, updating the kind to match
    pub fn set_value(&mut self, value: TagValue) {
        self.kind = value.kind();
        self.value = Some(value);
    }

    #[inline]
    pub fn entities(&self) -> &[Tag] {
        &self.entities
    }

    #[inline]
    pub fn entities_mut(&mut self) -> &mut Vec<Tag> {
        &mut self.entities
    }

    pub fn into_entities(mut self) -> Vec<Tag> {
        std::mem::take(&mut self.entities)
    }

    /// Number of direct children
    #[inline]
    pub fn len(&self) -> usize {
        self.entities.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.entities.is_empty()
    }

    pub fn first_entity(&self) -> Option<&Tag> {
        self.entities.first()
    }

    /// Append a child
    pub fn push(&mut self, entity: Tag) {
        self.entities.push(entity);
    }

    /// Builder-style `push`
    pub fn with_entity(mut self, entity: Tag) -> Self {
        self.entities.push(entity);
        self
    }

    /// Builder-style bulk append
    pub fn with_entities(mut self, entities: impl IntoIterator<Item = Tag>) -> Self {
        self.entities.extend(entities);
        self
    }

    #[inline]
    pub fn is_absent(&self) -> bool {
        self.kind == TagKind::Absent
    }

    #[inline]
    pub fn is_container(&self) -> bool {
        self.kind == TagKind::Container
    }

    /// True when the payload is the absent sentinel
    #[inline]
    pub fn has_value(&self) -> bool {
        self.value.is_some()
    }

    /// Number of levels in the tree; a leaf has depth 1
    pub fn depth(&self) -> usize {
        let mut deepest = 0;
        let mut stack = vec![(self, 1usize)];
        while let Some((tag, level)) = stack.pop() {
            deepest = deepest.max(level);
            stack.extend(tag.entities.iter().map(|child| (child, level + 1)));
        }
        deepest
    }

    /// Total number of nodes in the tree
    pub fn node_count(&self) -> usize {
        let mut count = 0;
        let mut stack = vec![self];
        while let Some(tag) = stack.pop() {
            count += 1;
            stack.extend(tag.entities.iter());
        }
        count
    }

    pub fn as_str(&self) -> Option<&str> {
        match &self.value {
            Some(TagValue::String(s)) => Some(s),
            _ => None,
        }
    }

    pub fn as_blob(&self) -> Option<&[u8]> {
        match &self.value {
            Some(TagValue::Blob(bytes)) => Some(bytes),
            _ => None,
        }
    }
}

macro_rules! scalar_accessors {
    ($($name:ident => $variant:ident: $ty:ty),* $(,)?) => {
        impl Tag {
            $(
                pub fn $name(&self) -> Option<$ty> {
                    match &self.value {
                        Some(TagValue::$variant(v)) => Some(*v),
                        _ => None,
                    }
                }
            )*
        }
    };
}

scalar_accessors! {
    as_bool => Bool: bool,
    as_char => Char: char,
    as_u8 => Byte: u8,
    as_i16 => Short: i16,
    as_i32 => Int: i32,
    as_i64 => Long: i64,
    as_f32 => Float: f32,
    as_f64 => Double: f64,
    as_decimal => Decimal: Decimal,
    as_u16 => UShort: u16,
    as_u32 => UInt: u32,
    as_u64 => ULong: u64,
    as_i8 => SByte: i8,
}

macro_rules! impl_tag_from {
    ($($ty:ty),* $(,)?) => {
        $(
            impl From<$ty> for Tag {
                fn from(value: $ty) -> Self {
                    Tag::new(value)
                }
            }
        )*
    };
}

impl_tag_from! {
    TagValue, bool, char, u8, i16, i32, i64, f32, f64, String, &str, Decimal, u16, u32, u64, i8,
    Vec<bool>, Vec<char>, Vec<u8>, Vec<i16>, Vec<i32>, Vec<i64>, Vec<f32>, Vec<f64>,
    Vec<String>, Vec<Decimal>, Vec<u16>, Vec<u32>, Vec<u64>, Vec<i8>,
}

// Decoded trees may be thousands of levels deep; unlink them iteratively
impl Drop for Tag {
    fn drop(&mut self) {
        if self.entities.iter().all(|child| child.entities.is_empty()) {
            return;
        }
        let mut pending = std::mem::take(&mut self.entities);
        while let Some(mut tag) = pending.pop() {
            pending.append(&mut tag.entities);
        }
    }
}

impl Clone for Tag {
    fn clone(&self) -> Self {
        // Each frame holds a source node and the copies of its children made so far
        let mut stack: Vec<(&Tag, Vec<Tag>)> = vec![(self, Vec::with_capacity(self.entities.len()))];
        loop {
            let top = stack.len() - 1;
            let source = stack[top].0;
            if let Some(child) = source.entities.get(stack[top].1.len()) {
                stack.push((child, Vec::with_capacity(child.entities.len())));
                continue;
            }

            let entities = std::mem::take(&mut stack[top].1);
            stack.pop();
            let copy = Tag {
                kind: source.kind,
                value: source.value.clone(),
                entities,
            };
            match stack.last_mut() {
                Some((_, siblings)) => siblings.push(copy),
                None => return copy,
            }
        }
    }
}

impl PartialEq for Tag {
    fn eq(&self, other: &Self) -> bool {
        let mut pending = vec![(self, other)];
        while let Some((left, right)) = pending.pop() {
            if left.kind != right.kind
                || left.value != right.value
                || left.entities.len() != right.entities.len()
            {
                return false;
            }
            pending.extend(left.entities.iter().zip(&right.entities));
        }
        true
    }
}

impl Default for Tag {
    fn default() -> Self {
        Tag::container()
    }
}

/// Unvalidated serde shape of a tag; checked on the way in.
#[derive(Deserialize)]
struct TagRepr {
    #[serde(rename = "Type")]
    kind: TagKind,
    #[serde(rename = "Value", default)]
    value: Option<TagValue>,
    #[serde(rename = "Entities", default)]
    entities: Vec<Tag>,
}

impl TryFrom<TagRepr> for Tag {
    type Error = String;

    fn try_from(repr: TagRepr) -> Result<Self, Self::Error> {
        let mut tag = Tag::try_with_kind(repr.kind, repr.value).ok_or_else(|| {
            format!("payload does not match tag kind {}", repr.kind)
        })?;
        tag.entities = repr.entities;
        Ok(tag)
    }
}
