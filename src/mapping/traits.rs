//! Capabilities a type can have towards the mapping engine.

use crate::core::kind::TagKind;
use crate::core::tag::Tag;
use crate::error::Result;
use crate::mapping::handlers::list::{list_from_tag, list_to_tag};
use crate::mapping::context::MappingContext;

/// A type the mapping engine can convert to and from tags.
///
/// Implemented for scalars, strings, arrays, `Option`, `Box`, the standard
/// collection and date/time types, and by `#[derive(TagMapped)]`.
pub trait TagMapped: Sized + 'static {
    /// Kind a value maps to directly, bypassing dispatch and nesting
    const DIRECT_KIND: Option<TagKind> = None;

    /// Homogeneous array kind used when the type is the element of a `Vec`
    const ARRAY_KIND: Option<TagKind> = None;

    fn to_tag(&self, ctx: &MappingContext<'_>) -> Result<Tag>;

    fn from_tag(tag: &Tag, ctx: &MappingContext<'_>) -> Result<Self>;

    /// Map a sequence of values; a Container of per-element tags unless overridden
    fn seq_to_tag(items: &[Self], ctx: &MappingContext<'_>) -> Result<Tag> {
        list_to_tag(items, ctx)
    }

    fn seq_from_tag(tag: &Tag, ctx: &MappingContext<'_>) -> Result<Vec<Self>> {
        list_from_tag(tag, ctx)
    }
}

/// The self-describing capability: a type that builds and reads its own tag.
pub trait TagStruct {
    fn write_tag(&self) -> Result<Tag>;

    fn read_tag(&mut self, tag: &Tag) -> Result<()>;
}

/// A marked aggregate whose named members map to name/value pairs.
///
/// Normally generated by `#[derive(TagMapped)]`.
pub trait TagAggregate: Default + 'static {
    /// Wire names of the mapped members, in declaration order
    const MEMBER_NAMES: &'static [&'static str];

    /// Append one name/value pair per member to `out`
    fn write_members(&self, out: &mut Tag, ctx: &MappingContext<'_>) -> Result<()>;

    /// Populate the member called `name`; false when no member has that name
    fn read_member(&mut self, name: &str, value: &Tag, ctx: &MappingContext<'_>) -> Result<bool>;
}
