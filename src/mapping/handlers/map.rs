//! Maps as a Container of two-child entry Containers: key tag, then value tag.
//!
//! Keys must map directly to a scalar or array kind. That is checked once, when
//! the handler is built, so a bad key type fails before any value is mapped.
//! Values follow the same dispatch and nesting rules as aggregate members.

use crate::core::tag::Tag;
use crate::error::constants::ERR_NON_SCALAR_KEY;
use crate::error::{Result, TagError};
use crate::mapping::context::MappingContext;
use crate::mapping::engine::{dispatch_from_tag, dispatch_to_tag, expect_container};
use crate::mapping::registry::TagConverter;
use crate::mapping::traits::TagMapped;
use std::any::type_name;
use std::collections::{BTreeMap, HashMap};
use std::hash::Hash;
use std::marker::PhantomData;

/// Converter for `HashMap<K, V>` and `BTreeMap<K, V>`.
pub struct MapHandler<K, V> {
    _entry: PhantomData<fn() -> (K, V)>,
}

impl<K: TagMapped, V: TagMapped> MapHandler<K, V> {
    /// Build a handler, rejecting key types without a direct kind
    ///
    /// # Errors
    /// `TagError::Configuration` when `K` is not a scalar, string or array type
    pub fn new() -> Result<Self> {
        if K::DIRECT_KIND.is_none() {
            return Err(TagError::Configuration(format!(
                "{ERR_NON_SCALAR_KEY}: {}",
                type_name::<K>()
            )));
        }
        Ok(Self {
            _entry: PhantomData,
        })
    }

    fn write_entries<'m, I>(&self, entries: I, ctx: &MappingContext<'_>) -> Result<Tag>
    where
        I: Iterator<Item = (&'m K, &'m V)>,
    {
        let mut out = Tag::container();
        for (key, value) in entries {
            out.push(
                Tag::container()
                    .with_entity(key.to_tag(ctx)?)
                    .with_entity(ctx.value_to_tag(value)?),
            );
        }
        Ok(out)
    }

    fn read_entries<C>(&self, tag: &Tag, ctx: &MappingContext<'_>) -> Result<C>
    where
        C: FromIterator<(K, V)>,
    {
        expect_container(tag)?
            .iter()
            .map(|entry| match expect_container(entry)? {
                [key, value] => Ok((K::from_tag(key, ctx)?, ctx.value_from_tag::<V>(value)?)),
                other => Err(TagError::Mapping(format!(
                    "Map entry must have exactly 2 children, found {}",
                    other.len()
                ))),
            })
            .collect()
    }
}

impl<K, V> TagConverter<HashMap<K, V>> for MapHandler<K, V>
where
    K: TagMapped + Eq + Hash,
    V: TagMapped,
{
    fn to_tag(&self, value: &HashMap<K, V>, ctx: &MappingContext<'_>) -> Result<Tag> {
        self.write_entries(value.iter(), ctx)
    }

    fn from_tag(&self, tag: &Tag, ctx: &MappingContext<'_>) -> Result<HashMap<K, V>> {
        self.read_entries(tag, ctx)
    }
}

impl<K, V> TagConverter<BTreeMap<K, V>> for MapHandler<K, V>
where
    K: TagMapped + Ord,
    V: TagMapped,
{
    fn to_tag(&self, value: &BTreeMap<K, V>, ctx: &MappingContext<'_>) -> Result<Tag> {
        self.write_entries(value.iter(), ctx)
    }

    fn from_tag(&self, tag: &Tag, ctx: &MappingContext<'_>) -> Result<BTreeMap<K, V>> {
        self.read_entries(tag, ctx)
    }
}

impl<K, V> TagMapped for HashMap<K, V>
where
    K: TagMapped + Eq + Hash,
    V: TagMapped,
{
    fn to_tag(&self, ctx: &MappingContext<'_>) -> Result<Tag> {
        dispatch_to_tag(self, ctx, &MapHandler::<K, V>::new()?)
    }

    fn from_tag(tag: &Tag, ctx: &MappingContext<'_>) -> Result<Self> {
        dispatch_from_tag(tag, ctx, &MapHandler::<K, V>::new()?)
    }
}

impl<K, V> TagMapped for BTreeMap<K, V>
where
    K: TagMapped + Ord,
    V: TagMapped,
{
    fn to_tag(&self, ctx: &MappingContext<'_>) -> Result<Tag> {
        dispatch_to_tag(self, ctx, &MapHandler::<K, V>::new()?)
    }

    fn from_tag(tag: &Tag, ctx: &MappingContext<'_>) -> Result<Self> {
        dispatch_from_tag(tag, ctx, &MapHandler::<K, V>::new()?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{MappingOptions, Nesting};
    use crate::core::kind::TagKind;
    use crate::mapping::registry::TypeRegistry;

    #[test]
    fn test_non_scalar_key_rejected_at_construction() {
        let err = MapHandler::<Option<Box<Vec<Vec<String>>>>, i32>::new();
        assert!(matches!(err, Err(TagError::Configuration(_))));
        assert!(MapHandler::<Vec<u8>, Vec<Vec<u8>>>::new().is_ok());
    }

    #[test]
    #[allow(clippy::unwrap_used)]
    fn test_entry_shape() {
        let registry = TypeRegistry::new();
        let options = MappingOptions::raising();
        let ctx = MappingContext::new(&registry, &options);
        let map: BTreeMap<String, i64> = [("a".to_string(), 1), ("b".to_string(), 2)].into();

        let tag = ctx.value_to_tag(&map).unwrap();
        assert_eq!(tag.len(), 2);
        let first = &tag.entities()[0];
        assert!(first.is_container());
        assert_eq!(first.entities()[0].as_str(), Some("a"));
        assert_eq!(first.entities()[1].as_i64(), Some(1));
        assert_eq!(ctx.value_from_tag::<BTreeMap<String, i64>>(&tag).unwrap(), map);
    }

    #[test]
    #[allow(clippy::unwrap_used)]
    fn test_boxed_values_keep_plain_keys() {
        let registry = TypeRegistry::new();
        let options = MappingOptions::raising().with_nesting(Nesting::Boxed);
        let ctx = MappingContext::new(&registry, &options);
        let mut map = HashMap::new();
        map.insert(7u32, vec![Some(1i32), None]);

        let tag = ctx.value_to_tag(&map).unwrap();
        // The map itself is a composite, so it arrives boxed
        assert_eq!(tag.kind(), TagKind::Blob);
        let inner = ctx.unnest(&tag).unwrap();
        let entry = &inner.entities()[0];
        assert_eq!(entry.entities()[0].as_u32(), Some(7));
        assert_eq!(entry.entities()[1].kind(), TagKind::Blob);
        assert_eq!(
            ctx.value_from_tag::<HashMap<u32, Vec<Option<i32>>>>(&tag).unwrap(),
            map
        );
    }

    #[test]
    fn test_entry_arity_checked() {
        let registry = TypeRegistry::new();
        let options = MappingOptions::raising();
        let ctx = MappingContext::new(&registry, &options);
        let tag = Tag::container().with_entity(Tag::container().with_entity(Tag::from(1i32)));
        let result = ctx.value_from_tag::<HashMap<i32, i32>>(&tag);
        assert!(matches!(result, Err(TagError::Mapping(_))));
    }
}
