//! Lists as a Container of positional element tags.
//!
//! Every element goes through the dispatch rules and the nesting mode. A missing
//! element is an *Absent* tag in its slot, so indices survive the round trip.

use crate::core::tag::Tag;
use crate::error::Result;
use crate::mapping::context::MappingContext;
use crate::mapping::engine::{dispatch_from_tag, dispatch_to_tag, expect_container};
use crate::mapping::registry::TagConverter;
use crate::mapping::traits::TagMapped;
use std::collections::VecDeque;
use std::marker::PhantomData;

/// Map a sequence of elements to a Container
pub fn list_to_tag<'v, T, I>(items: I, ctx: &MappingContext<'_>) -> Result<Tag>
where
    T: TagMapped,
    I: IntoIterator<Item = &'v T>,
{
    let mut out = Tag::container();
    for item in items {
        out.push(ctx.value_to_tag(item)?);
    }
    Ok(out)
}

/// Map a Container back to any collection of elements
pub fn list_from_tag<T, C>(tag: &Tag, ctx: &MappingContext<'_>) -> Result<C>
where
    T: TagMapped,
    C: FromIterator<T>,
{
    expect_container(tag)?
        .iter()
        .map(|element| ctx.value_from_tag::<T>(element))
        .collect()
}

/// Converter for `Vec<T>` and `VecDeque<T>` that always produces a Container,
/// even for scalar elements.
pub struct ListHandler<T> {
    _element: PhantomData<fn() -> T>,
}

impl<T> ListHandler<T> {
    pub fn new() -> Self {
        Self {
            _element: PhantomData,
        }
    }
}

impl<T> Default for ListHandler<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T: TagMapped> TagConverter<Vec<T>> for ListHandler<T> {
    fn to_tag(&self, value: &Vec<T>, ctx: &MappingContext<'_>) -> Result<Tag> {
        list_to_tag(value, ctx)
    }

    fn from_tag(&self, tag: &Tag, ctx: &MappingContext<'_>) -> Result<Vec<T>> {
        list_from_tag(tag, ctx)
    }
}

impl<T: TagMapped> TagConverter<VecDeque<T>> for ListHandler<T> {
    fn to_tag(&self, value: &VecDeque<T>, ctx: &MappingContext<'_>) -> Result<Tag> {
        list_to_tag(value, ctx)
    }

    fn from_tag(&self, tag: &Tag, ctx: &MappingContext<'_>) -> Result<VecDeque<T>> {
        list_from_tag(tag, ctx)
    }
}

impl<T: TagMapped> TagMapped for VecDeque<T> {
    fn to_tag(&self, ctx: &MappingContext<'_>) -> Result<Tag> {
        dispatch_to_tag(self, ctx, &ListHandler::<T>::new())
    }

    fn from_tag(tag: &Tag, ctx: &MappingContext<'_>) -> Result<Self> {
        dispatch_from_tag(tag, ctx, &ListHandler::<T>::new())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::MappingOptions;
    use crate::core::kind::TagKind;
    use crate::mapping::registry::TypeRegistry;

    #[test]
    #[allow(clippy::unwrap_used)]
    fn test_registered_list_handler_overrides_arrays_only_for_composites() {
        let registry = TypeRegistry::new();
        registry.register::<Vec<Option<i32>>, _>(ListHandler::<Option<i32>>::new());
        let options = MappingOptions::raising();
        let ctx = MappingContext::new(&registry, &options);

        let tag = ctx.value_to_tag(&vec![Some(1i32), None]).unwrap();
        assert_eq!(tag.kind(), TagKind::Container);
        assert_eq!(tag.entities()[0].as_i32(), Some(1));
        assert!(tag.entities()[1].is_absent());

        // Scalar vectors never consult the registry
        let tag = ctx.value_to_tag(&vec![1i32, 2]).unwrap();
        assert_eq!(tag.kind(), TagKind::IntArray);
    }

    #[test]
    #[allow(clippy::unwrap_used)]
    fn test_handler_forces_container_for_scalars() {
        let registry = TypeRegistry::new();
        let options = MappingOptions::raising();
        let ctx = MappingContext::new(&registry, &options);
        let handler = ListHandler::<u16>::new();

        let tag = TagConverter::<Vec<u16>>::to_tag(&handler, &vec![7, 8], &ctx).unwrap();
        assert!(tag.is_container());
        assert_eq!(tag.entities()[1].as_u16(), Some(8));
        let back = TagConverter::<Vec<u16>>::from_tag(&handler, &tag, &ctx).unwrap();
        assert_eq!(back, vec![7, 8]);
    }

    #[test]
    #[allow(clippy::unwrap_used)]
    fn test_deque_roundtrip() {
        let registry = TypeRegistry::new();
        let options = MappingOptions::raising();
        let ctx = MappingContext::new(&registry, &options);
        let queue: VecDeque<String> = ["x", "y"].iter().map(|s| s.to_string()).collect();

        let tag = ctx.value_to_tag(&queue).unwrap();
        assert_eq!(tag.len(), 2);
        assert_eq!(ctx.value_from_tag::<VecDeque<String>>(&tag).unwrap(), queue);
    }

    #[test]
    fn test_non_container_rejected() {
        let registry = TypeRegistry::new();
        let options = MappingOptions::raising();
        let ctx = MappingContext::new(&registry, &options);
        let result = ctx.value_from_tag::<VecDeque<i32>>(&Tag::from(1i32));
        assert!(matches!(result, Err(e) if e.is_mapping()));
    }
}
