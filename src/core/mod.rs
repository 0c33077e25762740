//! # Core Tag Components
//!
//! The tagged-value tree and its binary wire codec.
//!
//! ## Components
//! - **Kind**: the closed set of 31 tag kinds and their wire ordinals
//! - **Value**: payloads, one variant per payload-bearing kind
//! - **Tag**: the recursive node (kind, optional payload, ordered children)
//! - **Wire**: little-endian primitives, 7-bit length prefixes, UTF-8 chars, decimals
//! - **Codec**: header, raw DEFLATE and recursive node encoding
//!
//! ## Wire Format
//! ```text
//! [Str "@HYPER"] [Str "%TAG"] [Length(8)] [Deflate(N)]
//! ```
//!
//! ## Security
//! - Recursion depth limit on encode and decode (default 8192)
//! - Decompressed size limit (prevents decompression bombs)
//! - Length validation before allocation

pub mod codec;
pub mod kind;
pub mod tag;
pub mod value;
pub mod wire;

pub use codec::{decode, decode_with, encode, encode_with};
pub use kind::TagKind;
pub use tag::Tag;
pub use value::TagValue;
