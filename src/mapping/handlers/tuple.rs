//! Tuples of arity 1 to 7 as a Container of positional element tags.

use crate::core::tag::Tag;
use crate::error::{Result, TagError};
use crate::mapping::context::MappingContext;
use crate::mapping::engine::{dispatch_from_tag, dispatch_to_tag, expect_container};
use crate::mapping::registry::TagConverter;
use crate::mapping::traits::TagMapped;

/// Converter for tuples; a child count other than the arity is a mapping error.
#[derive(Debug, Clone, Copy, Default)]
pub struct TupleHandler;

macro_rules! tuple_mapped {
    ($arity:literal => $($element:ident $index:tt),+) => {
        impl<$($element: TagMapped),+> TagConverter<($($element,)+)> for TupleHandler {
            fn to_tag(&self, value: &($($element,)+), ctx: &MappingContext<'_>) -> Result<Tag> {
                let mut out = Tag::container();
                $( out.push(ctx.value_to_tag(&value.$index)?); )+
                Ok(out)
            }

            fn from_tag(&self, tag: &Tag, ctx: &MappingContext<'_>) -> Result<($($element,)+)> {
                let items = expect_container(tag)?;
                if items.len() != $arity {
                    return Err(TagError::Mapping(format!(
                        "Tuple of {} elements cannot be read from {} children",
                        $arity,
                        items.len()
                    )));
                }
                Ok(($(ctx.value_from_tag::<$element>(&items[$index])?,)+))
            }
        }

        impl<$($element: TagMapped),+> TagMapped for ($($element,)+) {
            fn to_tag(&self, ctx: &MappingContext<'_>) -> Result<Tag> {
                dispatch_to_tag(self, ctx, &TupleHandler)
            }

            fn from_tag(tag: &Tag, ctx: &MappingContext<'_>) -> Result<Self> {
                dispatch_from_tag(tag, ctx, &TupleHandler)
            }
        }
    };
}

tuple_mapped!(1 => A 0);
tuple_mapped!(2 => A 0, B 1);
tuple_mapped!(3 => A 0, B 1, C 2);
tuple_mapped!(4 => A 0, B 1, C 2, D 3);
tuple_mapped!(5 => A 0, B 1, C 2, D 3, E 4);
tuple_mapped!(6 => A 0, B 1, C 2, D 3, E 4, F 5);
tuple_mapped!(7 => A 0, B 1, C 2, D 3, E 4, F 5, G 6);
