//! # Object Mapping
//!
//! Conversion between Rust values and tag trees.
//!
//! ## Components
//! - **Traits**: [`TagMapped`], [`TagStruct`] and [`TagAggregate`]
//! - **Registry**: per-type converter overrides ([`TypeRegistry`])
//! - **Context**: depth tracking and nesting for one mapping call
//! - **Engine**: dispatch rules and the [`TagMapper`] entry point
//! - **Handlers**: standard converters for collections, tuples, ids and dates

pub mod context;
pub mod engine;
pub mod handlers;
pub mod registry;
pub mod traits;

pub use context::MappingContext;
pub use engine::{
    dispatch_from_tag, dispatch_to_tag, expect_container, from_tag, kind_mismatch, to_tag,
    AggregateRule, NoRule, SelfDescribingRule, TagMapper,
};
pub use handlers::register_standard_handlers;
pub use registry::{TagConverter, TypeRegistry};
pub use traits::{TagAggregate, TagMapped, TagStruct};
