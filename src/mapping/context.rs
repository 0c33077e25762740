//! Per-call mapping state: the active registry, the options and the depth counter.

use crate::config::{MappingOptions, Nesting};
use crate::core::codec::{decode, encode};
use crate::core::tag::Tag;
use crate::error::constants::ERR_EXPECTED_BLOB;
use crate::error::{Result, TagError};
use crate::mapping::registry::TypeRegistry;
use crate::mapping::traits::TagMapped;
use std::borrow::Cow;
use std::cell::Cell;

/// State threaded through one serialize or deserialize call.
pub struct MappingContext<'a> {
    registry: &'a TypeRegistry,
    options: &'a MappingOptions,
    depth: Cell<usize>,
}

/// Restores the depth counter when a nested value is finished.
#[derive(Debug)]
pub(crate) struct DepthGuard<'c> {
    depth: &'c Cell<usize>,
}

impl Drop for DepthGuard<'_> {
    fn drop(&mut self) {
        self.depth.set(self.depth.get().saturating_sub(1));
    }
}

impl<'a> MappingContext<'a> {
    pub fn new(registry: &'a TypeRegistry, options: &'a MappingOptions) -> Self {
        Self {
            registry,
            options,
            depth: Cell::new(0),
        }
    }

    #[inline]
    pub fn registry(&self) -> &'a TypeRegistry {
        self.registry
    }

    #[inline]
    pub fn options(&self) -> &'a MappingOptions {
        self.options
    }

    /// Number of composite values currently being mapped
    #[inline]
    pub fn depth(&self) -> usize {
        self.depth.get()
    }

    pub(crate) fn enter(&self) -> Result<DepthGuard<'_>> {
        let depth = self.depth.get();
        if depth >= self.options.max_depth {
            return Err(TagError::Recursion {
                depth,
                max_depth: self.options.max_depth,
            });
        }
        self.depth.set(depth + 1);
        Ok(DepthGuard { depth: &self.depth })
    }

    /// Map a member, element or entry value through the dispatch rules
    ///
    /// Scalars and arrays map straight to their kind. Everything else is
    /// depth-checked and then embedded or boxed according to the options.
    pub fn value_to_tag<T: TagMapped>(&self, value: &T) -> Result<Tag> {
        if T::DIRECT_KIND.is_some() {
            return value.to_tag(self);
        }
        let _guard = self.enter()?;
        let tag = value.to_tag(self)?;
        self.nest(tag)
    }

    /// Inverse of [`value_to_tag`](Self::value_to_tag)
    pub fn value_from_tag<T: TagMapped>(&self, tag: &Tag) -> Result<T> {
        if T::DIRECT_KIND.is_some() {
            return T::from_tag(tag, self);
        }
        let _guard = self.enter()?;
        let tag = self.unnest(tag)?;
        T::from_tag(&tag, self)
    }

    /// The aggregate member pair: a string tag holding `name` with the value as its only child
    pub fn member_to_tag<T: TagMapped>(&self, name: &str, value: &T) -> Result<Tag> {
        Ok(Tag::named(name, self.value_to_tag(value)?))
    }

    /// Apply the nesting mode to a composite result
    pub fn nest(&self, tag: Tag) -> Result<Tag> {
        match self.options.nesting {
            Nesting::Boxed if !tag.is_absent() => {
                Ok(Tag::blob(encode(&tag, self.options.tree_depth())?))
            }
            _ => Ok(tag),
        }
    }

    /// Undo [`nest`](Self::nest)
    pub fn unnest<'t>(&self, tag: &'t Tag) -> Result<Cow<'t, Tag>> {
        match self.options.nesting {
            Nesting::Boxed if !tag.is_absent() => {
                let bytes = tag.as_blob().ok_or_else(|| {
                    TagError::Mapping(format!("{ERR_EXPECTED_BLOB}, found {}", tag.kind()))
                })?;
                Ok(Cow::Owned(decode(bytes, self.options.tree_depth())?))
            }
            _ => Ok(Cow::Borrowed(tag)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::kind::TagKind;

    #[test]
    #[allow(clippy::unwrap_used)]
    fn test_depth_guard_restores() {
        let registry = TypeRegistry::new();
        let options = MappingOptions::default().with_max_depth(2);
        let ctx = MappingContext::new(&registry, &options);
        {
            let _a = ctx.enter().unwrap();
            let _b = ctx.enter().unwrap();
            assert_eq!(ctx.depth(), 2);
            assert!(ctx.enter().unwrap_err().is_recursion());
        }
        assert_eq!(ctx.depth(), 0);
    }

    #[test]
    #[allow(clippy::unwrap_used)]
    fn test_boxed_nesting_roundtrip() {
        let registry = TypeRegistry::new();
        let options = MappingOptions::default().with_nesting(Nesting::Boxed);
        let ctx = MappingContext::new(&registry, &options);
        let inner = Tag::container().with_entity(Tag::named("A", Tag::from(1i32)));

        let boxed = ctx.nest(inner.clone()).unwrap();
        assert_eq!(boxed.kind(), TagKind::Blob);
        assert_eq!(ctx.unnest(&boxed).unwrap().into_owned(), inner);
    }

    #[test]
    #[allow(clippy::unwrap_used)]
    fn test_absent_never_boxed() {
        let registry = TypeRegistry::new();
        let options = MappingOptions::default().with_nesting(Nesting::Boxed);
        let ctx = MappingContext::new(&registry, &options);
        assert!(ctx.nest(Tag::absent()).unwrap().is_absent());
        assert!(ctx.unnest(&Tag::absent()).unwrap().is_absent());
        assert!(ctx.unnest(&Tag::from(5i32)).unwrap_err().is_mapping());
    }

    #[test]
    #[allow(clippy::unwrap_used)]
    fn test_embedded_passes_through() {
        let registry = TypeRegistry::new();
        let options = MappingOptions::default();
        let ctx = MappingContext::new(&registry, &options);
        let tag = Tag::container();
        assert_eq!(ctx.nest(tag.clone()).unwrap(), tag);
        assert!(matches!(ctx.unnest(&tag).unwrap(), Cow::Borrowed(_)));
    }
}
