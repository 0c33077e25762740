//! # HyperTAG
//!
//! A self-describing tagged-value tree, its compressed binary wire format and
//! an object mapper that converts Rust values to and from tag trees.
//!
//! ## Modules
//! - [`core`]: tag kinds, payloads, the tag tree and the wire codec
//! - [`mapping`]: dispatch rules, the type registry and standard handlers
//! - [`config`]: codec, mapping and logging settings
//! - [`error`]: the error type and the raise/suppress error mode
//! - [`utils`]: compression, logging and metrics
//!
//! ## Quick Start
//! ```rust
//! use hyper_tag::{decode, encode, Tag, DEFAULT_MAX_DEPTH};
//!
//! let tag = Tag::container()
//!     .with_entity(Tag::named("Number", Tag::from(42i32)))
//!     .with_entity(Tag::named("Text", Tag::from("Hello")));
//!
//! let bytes = encode(&tag, DEFAULT_MAX_DEPTH).unwrap();
//! assert_eq!(decode(&bytes, DEFAULT_MAX_DEPTH).unwrap(), tag);
//! ```
//!
//! ## Object Mapping
//! ```rust
//! use hyper_tag::{TagMapped, TagMapper};
//!
//! #[derive(TagMapped, Default, Debug, PartialEq)]
//! struct Point {
//!     x: i32,
//!     y: i32,
//!     #[tag(skip)]
//!     cached_length: f64,
//! }
//!
//! let mapper = TagMapper::new();
//! let bytes = mapper.serialize_to_bytes(&Point { x: 3, y: 4, cached_length: 5.0 }).unwrap().unwrap();
//! let point: Point = mapper.deserialize_from_bytes(&bytes).unwrap().unwrap();
//! assert_eq!((point.x, point.y, point.cached_length), (3, 4, 0.0));
//! ```

#![deny(clippy::unwrap_used, clippy::expect_used)]

// Lets derive output name `::hyper_tag` from inside this crate
extern crate self as hyper_tag;

pub mod config;
pub mod core;
pub mod error;
pub mod mapping;
pub mod utils;

pub use config::{
    CodecConfig, MappingOptions, Nesting, TagConfig, DEFAULT_MAPPING_DEPTH, DEFAULT_MAX_DEPTH,
    FORMAT_STRING, MAGIC_STRING,
};
pub use crate::core::{decode, decode_with, encode, encode_with, Tag, TagKind, TagValue};
pub use error::{ErrorMode, Result, TagError};
pub use mapping::{
    register_standard_handlers, MappingContext, TagAggregate, TagConverter, TagMapped,
    TagMapper, TagStruct, TypeRegistry,
};

pub use hyper_tag_derive::TagMapped;
