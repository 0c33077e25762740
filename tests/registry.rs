//! Integration tests for the type registry

#![allow(clippy::expect_used, clippy::unwrap_used)]

use hyper_tag::mapping::{MappingContext, TagConverter};
use hyper_tag::{
    register_standard_handlers, MappingOptions, Result, Tag, TagError, TagMapped, TagMapper,
    TypeRegistry,
};
use std::any::TypeId;
use std::sync::Arc;
use uuid::Uuid;

#[derive(TagMapped, Default, Debug, PartialEq)]
struct Version {
    major: u16,
    minor: u16,
}

struct VersionAsString;

impl TagConverter<Version> for VersionAsString {
    fn to_tag(&self, value: &Version, _ctx: &MappingContext<'_>) -> Result<Tag> {
        Ok(Tag::from(format!("{}.{}", value.major, value.minor)))
    }

    fn from_tag(&self, tag: &Tag, _ctx: &MappingContext<'_>) -> Result<Version> {
        let (major, minor) = tag
            .as_str()
            .and_then(|s| s.split_once('.'))
            .ok_or_else(|| TagError::mapping("Not a version"))?;
        Ok(Version {
            major: major.parse().map_err(|_| TagError::mapping("Bad major"))?,
            minor: minor.parse().map_err(|_| TagError::mapping("Bad minor"))?,
        })
    }
}

#[test]
fn test_global_registry_is_shared() {
    let first = TypeRegistry::global();
    let second = TypeRegistry::global();
    assert!(Arc::ptr_eq(&first, &second));
    assert!(Arc::ptr_eq(TagMapper::new().registry(), &first));
}

#[test]
fn test_standard_handlers_in_global_registry() {
    register_standard_handlers(&TypeRegistry::global());
    assert!(TypeRegistry::global().has::<Uuid>());
    assert!(TypeRegistry::global().has::<Tag>());

    let id = Uuid::from_u128(42);
    let mapper = TagMapper::new().with_options(MappingOptions::raising());
    let tag = mapper.serialize(&id).unwrap().unwrap();
    assert_eq!(mapper.deserialize::<Uuid>(&tag).unwrap(), Some(id));
}

#[test]
fn test_independent_registries_share_nothing() {
    let left = Arc::new(TypeRegistry::new());
    let right = Arc::new(TypeRegistry::new());
    left.register::<Version, _>(VersionAsString);

    assert!(left.has::<Version>());
    assert!(!right.has::<Version>());
    assert!(!TypeRegistry::global().has::<Version>());

    let version = Version { major: 1, minor: 2 };
    let via_left = TagMapper::with_registry(left)
        .with_options(MappingOptions::raising())
        .serialize(&version)
        .unwrap()
        .unwrap();
    let via_right = TagMapper::with_registry(right)
        .with_options(MappingOptions::raising())
        .serialize(&version)
        .unwrap()
        .unwrap();
    assert_eq!(via_left.as_str(), Some("1.2"));
    assert!(via_right.is_container());
}

#[test]
fn test_register_replace_and_unregister() {
    let registry = TypeRegistry::new();
    assert!(!registry.register::<Version, _>(VersionAsString));
    assert!(registry.register::<Version, _>(VersionAsString));
    assert_eq!(registry.count(), 1);
    assert_eq!(registry.registered_type_names().len(), 1);
    assert!(registry.registered_type_names()[0].ends_with("Version"));

    assert!(registry.has_type(TypeId::of::<Version>()));
    assert!(registry.unregister::<Version>());
    assert!(!registry.unregister::<Version>());
    assert!(registry.get::<Version>().is_none());
}

#[test]
fn test_clear_removes_everything() {
    let registry = TypeRegistry::new();
    register_standard_handlers(&registry);
    registry.register::<Version, _>(VersionAsString);
    assert_eq!(registry.count(), 9);

    registry.clear();
    assert_eq!(registry.count(), 0);
    assert!(registry.registered_type_names().is_empty());
}

#[test]
fn test_shared_converter_instance() {
    let registry = TypeRegistry::new();
    let converter: Arc<dyn TagConverter<Version>> = Arc::new(VersionAsString);
    registry.register_arc::<Version>(Arc::clone(&converter));
    assert_eq!(Arc::strong_count(&converter), 2);

    let found = registry.get::<Version>().unwrap();
    let options = MappingOptions::raising();
    let ctx = MappingContext::new(&registry, &options);
    let tag = found.to_tag(&Version { major: 3, minor: 0 }, &ctx).unwrap();
    assert_eq!(tag.as_str(), Some("3.0"));
}
