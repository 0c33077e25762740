//! # Auto-Mapping Engine
//!
//! Converts Rust values to tag trees and back.
//!
//! ## Dispatch Order
//! For every value that is not a scalar, string or homogeneous array:
//! 1. a converter registered for the exact type in the active registry
//! 2. the self-describing capability ([`TagStruct`])
//! 3. the aggregate member walk ([`TagAggregate`])
//! 4. otherwise a `TagError::Mapping`
//!
//! Scalars and arrays bypass dispatch and map straight to their kind. An
//! *Absent* tag is never handed to a converter.
//!
//! ## Error Mode
//! [`TagMapper`] entry points resolve failures with the configured
//! [`ErrorMode`](crate::error::ErrorMode): raise, or log and return `None`.

use crate::config::{MappingOptions, TagConfig};
use crate::core::codec::{decode, encode};
use crate::core::kind::TagKind;
use crate::core::tag::Tag;
use crate::core::value::TagValue;
use crate::error::constants::{ERR_ABSENT_VALUE, ERR_EXPECTED_CONTAINER, ERR_NO_DISPATCH_RULE};
use crate::error::{Result, TagError};
use crate::mapping::context::MappingContext;
use crate::mapping::handlers::list::ListHandler;
use crate::mapping::registry::{TagConverter, TypeRegistry};
use crate::mapping::traits::{TagAggregate, TagMapped, TagStruct};
use crate::utils::metrics::global_metrics;
use rust_decimal::Decimal;
use std::any::type_name;
use std::sync::Arc;
use tracing::{instrument, trace};

/// Error for a tag whose kind is not the one a type maps to
pub fn kind_mismatch(expected: TagKind, tag: &Tag) -> TagError {
    if tag.is_absent() {
        return TagError::Mapping(format!("{ERR_ABSENT_VALUE} ({expected})"));
    }
    TagError::Mapping(format!("Expected a {expected} tag, found {}", tag.kind()))
}

/// The children of a Container tag
pub fn expect_container(tag: &Tag) -> Result<&[Tag]> {
    if !tag.is_container() {
        return Err(TagError::Mapping(format!(
            "{ERR_EXPECTED_CONTAINER}, found {}",
            tag.kind()
        )));
    }
    Ok(tag.entities())
}

/// Serialize through a registered converter, falling back to `rule`
pub fn dispatch_to_tag<T, R>(value: &T, ctx: &MappingContext<'_>, rule: &R) -> Result<Tag>
where
    T: 'static,
    R: TagConverter<T>,
{
    match ctx.registry().get::<T>() {
        Some(converter) => converter.to_tag(value, ctx),
        None => rule.to_tag(value, ctx),
    }
}

/// Deserialize through a registered converter, falling back to `rule`
pub fn dispatch_from_tag<T, R>(tag: &Tag, ctx: &MappingContext<'_>, rule: &R) -> Result<T>
where
    T: 'static,
    R: TagConverter<T>,
{
    if tag.is_absent() {
        return Err(TagError::Mapping(format!(
            "{ERR_ABSENT_VALUE}: {}",
            type_name::<T>()
        )));
    }
    match ctx.registry().get::<T>() {
        Some(converter) => converter.from_tag(tag, ctx),
        None => rule.from_tag(tag, ctx),
    }
}

/// Member walk for marked aggregates
#[derive(Debug, Clone, Copy, Default)]
pub struct AggregateRule;

impl<T: TagAggregate> TagConverter<T> for AggregateRule {
    fn to_tag(&self, value: &T, ctx: &MappingContext<'_>) -> Result<Tag> {
        let mut out = Tag::container();
        out.entities_mut().reserve(T::MEMBER_NAMES.len());
        value.write_members(&mut out, ctx)?;
        Ok(out)
    }

    fn from_tag(&self, tag: &Tag, ctx: &MappingContext<'_>) -> Result<T> {
        let mut target = T::default();
        for pair in expect_container(tag)? {
            // Anything that is not a name with a value is skipped
            let (Some(name), Some(value)) = (pair.as_str(), pair.first_entity()) else {
                continue;
            };
            if !target.read_member(name, value, ctx)? {
                trace!(member = name, aggregate = type_name::<T>(), "Ignoring unknown member");
            }
        }
        Ok(target)
    }
}

/// Delegation to the self-describing capability
#[derive(Debug, Clone, Copy, Default)]
pub struct SelfDescribingRule;

impl<T: TagStruct + Default + 'static> TagConverter<T> for SelfDescribingRule {
    fn to_tag(&self, value: &T, _ctx: &MappingContext<'_>) -> Result<Tag> {
        value.write_tag()
    }

    fn from_tag(&self, tag: &Tag, _ctx: &MappingContext<'_>) -> Result<T> {
        let mut target = T::default();
        target.read_tag(tag)?;
        Ok(target)
    }
}

/// Terminal rule for types that only map through a registered converter
#[derive(Debug, Clone, Copy, Default)]
pub struct NoRule;

impl<T> TagConverter<T> for NoRule {
    fn to_tag(&self, _value: &T, _ctx: &MappingContext<'_>) -> Result<Tag> {
        Err(TagError::Mapping(format!(
            "{ERR_NO_DISPATCH_RULE}: {}",
            type_name::<T>()
        )))
    }

    fn from_tag(&self, _tag: &Tag, _ctx: &MappingContext<'_>) -> Result<T> {
        Err(TagError::Mapping(format!(
            "{ERR_NO_DISPATCH_RULE}: {}",
            type_name::<T>()
        )))
    }
}

macro_rules! scalar_mapped {
    ($($ty:ty => $kind:ident, $array:ident, $accessor:ident);* $(;)?) => {
        $(
            impl TagMapped for $ty {
                const DIRECT_KIND: Option<TagKind> = Some(TagKind::$kind);
                const ARRAY_KIND: Option<TagKind> = Some(TagKind::$array);

                fn to_tag(&self, _ctx: &MappingContext<'_>) -> Result<Tag> {
                    Ok(Tag::from(*self))
                }

                fn from_tag(tag: &Tag, _ctx: &MappingContext<'_>) -> Result<Self> {
                    tag.$accessor().ok_or_else(|| kind_mismatch(TagKind::$kind, tag))
                }

                fn seq_to_tag(items: &[Self], _ctx: &MappingContext<'_>) -> Result<Tag> {
                    Ok(Tag::from(items.to_vec()))
                }

                fn seq_from_tag(tag: &Tag, _ctx: &MappingContext<'_>) -> Result<Vec<Self>> {
                    match tag.value() {
                        Some(TagValue::$array(items)) => Ok(items.clone()),
                        _ => Err(kind_mismatch(TagKind::$array, tag)),
                    }
                }
            }
        )*
    };
}

scalar_mapped! {
    bool => Bool, BoolArray, as_bool;
    char => Char, CharArray, as_char;
    u8 => Byte, ByteArray, as_u8;
    i16 => Short, ShortArray, as_i16;
    i32 => Int, IntArray, as_i32;
    i64 => Long, LongArray, as_i64;
    f32 => Float, FloatArray, as_f32;
    f64 => Double, DoubleArray, as_f64;
    Decimal => Decimal, DecimalArray, as_decimal;
    u16 => UShort, UShortArray, as_u16;
    u32 => UInt, UIntArray, as_u32;
    u64 => ULong, ULongArray, as_u64;
    i8 => SByte, SByteArray, as_i8;
}

impl TagMapped for String {
    const DIRECT_KIND: Option<TagKind> = Some(TagKind::String);
    const ARRAY_KIND: Option<TagKind> = Some(TagKind::StringArray);

    fn to_tag(&self, _ctx: &MappingContext<'_>) -> Result<Tag> {
        Ok(Tag::from(self.as_str()))
    }

    fn from_tag(tag: &Tag, _ctx: &MappingContext<'_>) -> Result<Self> {
        tag.as_str()
            .map(str::to_owned)
            .ok_or_else(|| kind_mismatch(TagKind::String, tag))
    }

    fn seq_to_tag(items: &[Self], _ctx: &MappingContext<'_>) -> Result<Tag> {
        Ok(Tag::from(items.to_vec()))
    }

    fn seq_from_tag(tag: &Tag, _ctx: &MappingContext<'_>) -> Result<Vec<Self>> {
        match tag.value() {
            Some(TagValue::StringArray(items)) => Ok(items.clone()),
            _ => Err(kind_mismatch(TagKind::StringArray, tag)),
        }
    }
}

impl<T: TagMapped> TagMapped for Option<T> {
    const DIRECT_KIND: Option<TagKind> = T::DIRECT_KIND;

    fn to_tag(&self, ctx: &MappingContext<'_>) -> Result<Tag> {
        match self {
            Some(value) => value.to_tag(ctx),
            None => Ok(Tag::absent()),
        }
    }

    fn from_tag(tag: &Tag, ctx: &MappingContext<'_>) -> Result<Self> {
        // A typed tag with no payload is also a missing value
        if tag.is_absent() || (!tag.has_value() && T::DIRECT_KIND == Some(tag.kind())) {
            return Ok(None);
        }
        T::from_tag(tag, ctx).map(Some)
    }
}

impl<T: TagMapped> TagMapped for Box<T> {
    const DIRECT_KIND: Option<TagKind> = T::DIRECT_KIND;

    fn to_tag(&self, ctx: &MappingContext<'_>) -> Result<Tag> {
        (**self).to_tag(ctx)
    }

    fn from_tag(tag: &Tag, ctx: &MappingContext<'_>) -> Result<Self> {
        T::from_tag(tag, ctx).map(Box::new)
    }
}

impl<T: TagMapped> TagMapped for Vec<T> {
    const DIRECT_KIND: Option<TagKind> = T::ARRAY_KIND;

    fn to_tag(&self, ctx: &MappingContext<'_>) -> Result<Tag> {
        if T::ARRAY_KIND.is_some() {
            return T::seq_to_tag(self, ctx);
        }
        dispatch_to_tag(self, ctx, &ListHandler::<T>::new())
    }

    fn from_tag(tag: &Tag, ctx: &MappingContext<'_>) -> Result<Self> {
        if T::ARRAY_KIND.is_some() {
            return T::seq_from_tag(tag, ctx);
        }
        dispatch_from_tag(tag, ctx, &ListHandler::<T>::new())
    }
}

fn root_to_tag<T: TagMapped>(value: &T, ctx: &MappingContext<'_>) -> Result<Tag> {
    if T::DIRECT_KIND.is_some() {
        return value.to_tag(ctx);
    }
    let _guard = ctx.enter()?;
    value.to_tag(ctx)
}

fn root_from_tag<T: TagMapped>(tag: &Tag, ctx: &MappingContext<'_>) -> Result<T> {
    if T::DIRECT_KIND.is_some() {
        return T::from_tag(tag, ctx);
    }
    let _guard = ctx.enter()?;
    T::from_tag(tag, ctx)
}

/// Entry point of the mapping engine: a registry plus options.
///
/// ```rust
/// use hyper_tag::{TagMapped, TagMapper};
///
/// #[derive(TagMapped, Default, Debug, PartialEq)]
/// struct Person {
///     #[tag(rename = "Number")]
///     number: i32,
///     text: String,
/// }
///
/// let mapper = TagMapper::new();
/// let person = Person { number: 42, text: "Hello".into() };
/// let tag = mapper.serialize(&person).unwrap().unwrap();
/// assert_eq!(tag.entities()[0].as_str(), Some("Number"));
/// assert_eq!(mapper.deserialize::<Person>(&tag).unwrap(), Some(person));
/// ```
#[derive(Debug, Clone)]
pub struct TagMapper {
    registry: Arc<TypeRegistry>,
    options: MappingOptions,
}

impl Default for TagMapper {
    fn default() -> Self {
        Self::new()
    }
}

impl TagMapper {
    /// A mapper over the global registry with default options
    pub fn new() -> Self {
        Self::with_registry(TypeRegistry::global())
    }

    /// A mapper over a specific registry with default options
    pub fn with_registry(registry: Arc<TypeRegistry>) -> Self {
        Self {
            registry,
            options: MappingOptions::default(),
        }
    }

    /// A mapper over the global registry using the mapping section of `config`
    pub fn from_config(config: &TagConfig) -> Self {
        Self::new().with_options(config.mapping.clone())
    }

    /// Builder-style options override
    pub fn with_options(mut self, options: MappingOptions) -> Self {
        self.options = options;
        self
    }

    pub fn registry(&self) -> &Arc<TypeRegistry> {
        &self.registry
    }

    pub fn options(&self) -> &MappingOptions {
        &self.options
    }

    /// Map a value to a tag tree
    #[instrument(level = "debug", skip_all, fields(type_name = type_name::<T>()))]
    pub fn serialize<T: TagMapped>(&self, value: &T) -> Result<Option<Tag>> {
        self.run(true, |ctx| root_to_tag(value, ctx))
    }

    /// Map a tag tree back to a value
    #[instrument(level = "debug", skip_all, fields(type_name = type_name::<T>()))]
    pub fn deserialize<T: TagMapped>(&self, tag: &Tag) -> Result<Option<T>> {
        self.run(false, |ctx| root_from_tag(tag, ctx))
    }

    /// Map a value and encode the tree
    ///
    /// The codec limit is [`MappingOptions::tree_depth`], so any value the
    /// mapper accepts also encodes.
    pub fn serialize_to_bytes<T: TagMapped>(&self, value: &T) -> Result<Option<Vec<u8>>> {
        self.run(true, |ctx| {
            let tag = root_to_tag(value, ctx)?;
            encode(&tag, self.options.tree_depth())
        })
    }

    /// Decode a stream and map the tree back to a value
    pub fn deserialize_from_bytes<T: TagMapped>(&self, bytes: &[u8]) -> Result<Option<T>> {
        self.run(false, |ctx| {
            let tag = decode(bytes, self.options.tree_depth())?;
            root_from_tag(&tag, ctx)
        })
    }

    fn run<R>(
        &self,
        outbound: bool,
        op: impl FnOnce(&MappingContext<'_>) -> Result<R>,
    ) -> Result<Option<R>> {
        let metrics = global_metrics();
        let ctx = MappingContext::new(&self.registry, &self.options);
        let outcome = op(&ctx);
        match (&outcome, outbound) {
            (Ok(_), true) => metrics.value_mapped(),
            (Ok(_), false) => metrics.value_unmapped(),
            (Err(_), _) => metrics.mapping_error(),
        }
        self.options.error_mode.apply(outcome)
    }
}

/// Map a value with the global registry and default options
pub fn to_tag<T: TagMapped>(value: &T) -> Result<Option<Tag>> {
    TagMapper::new().serialize(value)
}

/// Map a tag back with the global registry and default options
pub fn from_tag<T: TagMapped>(tag: &Tag) -> Result<Option<T>> {
    TagMapper::new().deserialize(tag)
}
