//! A `Tag` held as a member value is stored as a Blob of its encoded stream.

use crate::config::{MappingOptions, DEFAULT_MAX_DEPTH};
use crate::core::codec::{decode, encode};
use crate::core::kind::TagKind;
use crate::core::tag::Tag;
use crate::error::Result;
use crate::mapping::context::MappingContext;
use crate::mapping::engine::{dispatch_from_tag, dispatch_to_tag, kind_mismatch};
use crate::mapping::registry::TagConverter;
use crate::mapping::traits::TagMapped;

#[derive(Debug, Clone, Copy, Default)]
pub struct TagBlobHandler;

// A held tree is opaque to the mapper, so it gets at least the codec's own limit
fn blob_depth(options: &MappingOptions) -> usize {
    options.tree_depth().max(DEFAULT_MAX_DEPTH)
}

impl TagConverter<Tag> for TagBlobHandler {
    fn to_tag(&self, value: &Tag, ctx: &MappingContext<'_>) -> Result<Tag> {
        Ok(Tag::blob(encode(value, blob_depth(ctx.options()))?))
    }

    fn from_tag(&self, tag: &Tag, ctx: &MappingContext<'_>) -> Result<Tag> {
        let bytes = tag.as_blob().ok_or_else(|| kind_mismatch(TagKind::Blob, tag))?;
        decode(bytes, blob_depth(ctx.options()))
    }
}

impl TagMapped for Tag {
    fn to_tag(&self, ctx: &MappingContext<'_>) -> Result<Tag> {
        dispatch_to_tag(self, ctx, &TagBlobHandler)
    }

    fn from_tag(tag: &Tag, ctx: &MappingContext<'_>) -> Result<Self> {
        dispatch_from_tag(tag, ctx, &TagBlobHandler)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::MappingOptions;
    use crate::mapping::registry::TypeRegistry;

    #[test]
    #[allow(clippy::unwrap_used)]
    fn test_tag_member_is_blob() {
        let registry = TypeRegistry::new();
        let options = MappingOptions::raising();
        let ctx = MappingContext::new(&registry, &options);
        let inner = Tag::container().with_entity(Tag::from(vec![true, false]));

        let tag = ctx.value_to_tag(&inner).unwrap();
        assert_eq!(tag.kind(), TagKind::Blob);
        assert_eq!(ctx.value_from_tag::<Tag>(&tag).unwrap(), inner);
    }

    #[test]
    #[allow(clippy::unwrap_used)]
    fn test_held_tree_deeper_than_mapping_limit() {
        let registry = TypeRegistry::new();
        let options = MappingOptions::raising().with_max_depth(4);
        let ctx = MappingContext::new(&registry, &options);
        let mut inner = Tag::from(1i32);
        for _ in 0..100 {
            inner = Tag::container().with_entity(inner);
        }

        let tag = ctx.value_to_tag(&inner).unwrap();
        assert_eq!(ctx.value_from_tag::<Tag>(&tag).unwrap().depth(), 101);
    }

    #[test]
    fn test_wrong_kind_rejected() {
        let registry = TypeRegistry::new();
        let options = MappingOptions::raising();
        let ctx = MappingContext::new(&registry, &options);
        assert!(ctx
            .value_from_tag::<Tag>(&Tag::from(3i32))
            .is_err_and(|e| e.is_mapping()));
    }
}
