//! Unique identifiers as a 16-byte Blob in mixed-endian GUID byte order.

use crate::core::kind::TagKind;
use crate::core::tag::Tag;
use crate::error::{Result, TagError};
use crate::mapping::context::MappingContext;
use crate::mapping::engine::{dispatch_from_tag, dispatch_to_tag, kind_mismatch};
use crate::mapping::registry::TagConverter;
use crate::mapping::traits::TagMapped;
use uuid::Uuid;

#[derive(Debug, Clone, Copy, Default)]
pub struct UuidHandler;

impl TagConverter<Uuid> for UuidHandler {
    fn to_tag(&self, value: &Uuid, _ctx: &MappingContext<'_>) -> Result<Tag> {
        Ok(Tag::blob(value.to_bytes_le()))
    }

    fn from_tag(&self, tag: &Tag, _ctx: &MappingContext<'_>) -> Result<Uuid> {
        let bytes = tag.as_blob().ok_or_else(|| kind_mismatch(TagKind::Blob, tag))?;
        let bytes: [u8; 16] = bytes.try_into().map_err(|_| {
            TagError::Mapping(format!("A UUID needs 16 bytes, found {}", bytes.len()))
        })?;
        Ok(Uuid::from_bytes_le(bytes))
    }
}

impl TagMapped for Uuid {
    fn to_tag(&self, ctx: &MappingContext<'_>) -> Result<Tag> {
        dispatch_to_tag(self, ctx, &UuidHandler)
    }

    fn from_tag(tag: &Tag, ctx: &MappingContext<'_>) -> Result<Self> {
        dispatch_from_tag(tag, ctx, &UuidHandler)
    }
}
