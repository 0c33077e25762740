//! # Wire Codec
//!
//! Encodes a [`Tag`] tree to the compressed binary stream and back.
//!
//! ## Stream Layout
//! ```text
//! "@HYPER"   length-prefixed string
//! "%TAG"     length-prefixed string
//! i64        length of the compressed payload
//! [u8]       raw DEFLATE payload
//! ```
//!
//! Inside the payload every node is written depth-first, pre-order:
//! `i32 kind`, `u8 is-absent`, the kind's payload when the flag is clear, then
//! `i32 child count` followed by the children.
//!
//! ## Limits
//! The root sits at depth 0 and a node at depth `d` is rejected when
//! `d >= max_depth`, so a tree with `D` levels needs `max_depth >= D`. Both
//! directions walk the tree with an explicit stack, so the limit bounds heap use
//! rather than call-stack frames.

use crate::config::{CodecConfig, FORMAT_STRING, MAGIC_STRING};
use crate::core::kind::TagKind;
use crate::core::tag::Tag;
use crate::core::value::TagValue;
use crate::core::wire::{WireReader, WireWriter, MAX_PREALLOCATION};
use crate::error::constants::{
    ERR_BAD_FORMAT, ERR_BAD_MAGIC, ERR_NEGATIVE_LENGTH, ERR_TRUNCATED_PAYLOAD,
};
use crate::error::{ErrorMode, Result, TagError};
use crate::utils::compression::{compress, decompress};
use crate::utils::metrics::{global_metrics, Timer};
use bytes::BufMut;
use tracing::{debug, instrument, warn};

/// Encode `tag` with the default codec settings and a custom depth limit
///
/// # Errors
/// `TagError::Recursion` when a branch reaches `max_depth`
pub fn encode(tag: &Tag, max_depth: usize) -> Result<Vec<u8>> {
    encode_configured(tag, &CodecConfig::with_max_depth(max_depth))
}

/// Decode a stream with the default codec settings and a custom depth limit
///
/// # Errors
/// - `TagError::Format` for bad header tokens, truncated or corrupt input
/// - `TagError::Recursion` when a branch reaches `max_depth`
pub fn decode(bytes: &[u8], max_depth: usize) -> Result<Tag> {
    decode_configured(bytes, &CodecConfig::with_max_depth(max_depth))
}

/// Encode under an explicit configuration and error mode
pub fn encode_with(tag: &Tag, config: &CodecConfig, mode: ErrorMode) -> Result<Option<Vec<u8>>> {
    mode.apply(encode_configured(tag, config))
}

/// Decode under an explicit configuration and error mode
pub fn decode_with(bytes: &[u8], config: &CodecConfig, mode: ErrorMode) -> Result<Option<Tag>> {
    mode.apply(decode_configured(bytes, config))
}

impl Tag {
    /// Encode this tree with the default configuration
    pub fn to_bytes(&self) -> Result<Vec<u8>> {
        encode_configured(self, &CodecConfig::default())
    }

    /// Decode a tree with the default configuration
    pub fn from_bytes(bytes: &[u8]) -> Result<Tag> {
        decode_configured(bytes, &CodecConfig::default())
    }
}

#[instrument(level = "debug", skip_all, fields(max_depth = config.max_depth))]
fn encode_configured(tag: &Tag, config: &CodecConfig) -> Result<Vec<u8>> {
    let _timer = Timer::start("tag_encode");
    let metrics = global_metrics();

    let mut body = WireWriter::new(Vec::with_capacity(256));
    if let Err(e) = write_tree(&mut body, tag, config.max_depth) {
        if e.is_recursion() {
            metrics.recursion_error();
        }
        warn!(error = %e, "Tag encode rejected");
        return Err(e);
    }
    let body = body.into_inner();
    let payload = compress(&body, config.compression_level)?;

    let mut out = WireWriter::new(Vec::with_capacity(payload.len() + 24));
    out.write_str(MAGIC_STRING)?;
    out.write_str(FORMAT_STRING)?;
    out.write_i64(payload.len() as i64);
    out.write_bytes(&payload);
    let out = out.into_inner();

    metrics.tag_encoded(out.len() as u64);
    debug!(
        raw_bytes = body.len(),
        encoded_bytes = out.len(),
        "Tag encoded"
    );
    Ok(out)
}

#[instrument(level = "debug", skip_all, fields(len = bytes.len(), max_depth = config.max_depth))]
fn decode_configured(bytes: &[u8], config: &CodecConfig) -> Result<Tag> {
    let _timer = Timer::start("tag_decode");
    let metrics = global_metrics();

    match read_stream(bytes, config) {
        Ok(tag) => {
            metrics.tag_decoded(bytes.len() as u64);
            debug!(nodes = tag.node_count(), "Tag decoded");
            Ok(tag)
        }
        Err(e) => {
            if e.is_recursion() {
                metrics.recursion_error();
            } else {
                metrics.format_error();
            }
            warn!(error = %e, "Tag decode rejected");
            Err(e)
        }
    }
}

fn read_stream(bytes: &[u8], config: &CodecConfig) -> Result<Tag> {
    let mut header = WireReader::new(bytes);

    match header.read_string() {
        Ok(magic) if magic == MAGIC_STRING => {}
        _ => return Err(TagError::format(ERR_BAD_MAGIC)),
    }
    match header.read_string() {
        Ok(format) if format == FORMAT_STRING => {}
        _ => return Err(TagError::format(ERR_BAD_FORMAT)),
    }

    let declared = header.read_i64()?;
    let declared = usize::try_from(declared)
        .map_err(|_| TagError::Format(format!("{ERR_NEGATIVE_LENGTH}: {declared}")))?;
    if declared > header.remaining() {
        return Err(TagError::Format(format!(
            "{ERR_TRUNCATED_PAYLOAD}: declared {declared}, found {}",
            header.remaining()
        )));
    }
    // Bytes after the declared payload are ignored
    let payload = header.read_bytes(declared)?;

    // Decompression and tree decoding fail as one outcome; only depth
    // violations keep their own variant
    let body = decompress(payload, config.max_decompressed_size)
        .map_err(|e| TagError::Format(e.to_string()))?;
    read_tree(&mut WireReader::new(&body), config.max_depth)
}

fn check_depth(depth: usize, max_depth: usize) -> Result<()> {
    if depth >= max_depth {
        return Err(TagError::Recursion { depth, max_depth });
    }
    Ok(())
}

fn write_tree<B: BufMut>(writer: &mut WireWriter<B>, root: &Tag, max_depth: usize) -> Result<()> {
    let mut stack = vec![(root, 0usize)];
    while let Some((tag, depth)) = stack.pop() {
        check_depth(depth, max_depth)?;

        writer.write_i32(tag.kind().ordinal());
        match tag.value() {
            None => writer.write_bool(true),
            Some(value) => {
                writer.write_bool(false);
                write_payload(writer, value)?;
            }
        }

        let children = tag.entities();
        writer.write_len(children.len())?;
        stack.extend(children.iter().rev().map(|child| (child, depth + 1)));
    }
    Ok(())
}

fn write_payload<B: BufMut>(writer: &mut WireWriter<B>, value: &TagValue) -> Result<()> {
    macro_rules! write_array {
        ($items:expr, $write:ident) => {{
            writer.write_len($items.len())?;
            for item in $items {
                writer.$write(*item);
            }
        }};
    }

    match value {
        TagValue::Blob(bytes) | TagValue::ByteArray(bytes) => {
            writer.write_len(bytes.len())?;
            writer.write_bytes(bytes);
        }
        TagValue::Bool(v) => writer.write_bool(*v),
        TagValue::Char(v) => writer.write_char(*v),
        TagValue::Byte(v) => writer.write_u8(*v),
        TagValue::Short(v) => writer.write_i16(*v),
        TagValue::Int(v) => writer.write_i32(*v),
        TagValue::Long(v) => writer.write_i64(*v),
        TagValue::Float(v) => writer.write_f32(*v),
        TagValue::Double(v) => writer.write_f64(*v),
        TagValue::String(v) => writer.write_str(v)?,
        TagValue::Decimal(v) => writer.write_decimal(v),
        TagValue::UShort(v) => writer.write_u16(*v),
        TagValue::UInt(v) => writer.write_u32(*v),
        TagValue::ULong(v) => writer.write_u64(*v),
        TagValue::SByte(v) => writer.write_i8(*v),
        TagValue::BoolArray(items) => write_array!(items, write_bool),
        TagValue::CharArray(items) => write_array!(items, write_char),
        TagValue::ShortArray(items) => write_array!(items, write_i16),
        TagValue::IntArray(items) => write_array!(items, write_i32),
        TagValue::LongArray(items) => write_array!(items, write_i64),
        TagValue::FloatArray(items) => write_array!(items, write_f32),
        TagValue::DoubleArray(items) => write_array!(items, write_f64),
        TagValue::UShortArray(items) => write_array!(items, write_u16),
        TagValue::UIntArray(items) => write_array!(items, write_u32),
        TagValue::ULongArray(items) => write_array!(items, write_u64),
        TagValue::SByteArray(items) => write_array!(items, write_i8),
        TagValue::StringArray(items) => {
            writer.write_len(items.len())?;
            for item in items {
                writer.write_str(item)?;
            }
        }
        TagValue::DecimalArray(items) => {
            writer.write_len(items.len())?;
            for item in items {
                writer.write_decimal(item);
            }
        }
    }
    Ok(())
}

fn read_tree(reader: &mut WireReader<'_>, max_depth: usize) -> Result<Tag> {
    check_depth(0, max_depth)?;
    let root = read_node(reader)?;

    // Each frame is a node still waiting for `remaining` children
    let mut stack: Vec<(Tag, usize)> = vec![root];
    loop {
        let Some((_, remaining)) = stack.last_mut() else {
            return Err(TagError::format(ERR_BAD_FORMAT));
        };

        if *remaining == 0 {
            let Some((done, _)) = stack.pop() else {
                return Err(TagError::format(ERR_BAD_FORMAT));
            };
            match stack.last_mut() {
                Some((parent, _)) => parent.push(done),
                None => return Ok(done),
            }
            continue;
        }

        *remaining -= 1;
        check_depth(stack.len(), max_depth)?;
        stack.push(read_node(reader)?);
    }
}

/// Read one node header and payload, returning it with its pending child count
fn read_node(reader: &mut WireReader<'_>) -> Result<(Tag, usize)> {
    let ordinal = reader.read_i32()?;
    let kind = TagKind::from_ordinal(ordinal)
        .ok_or_else(|| TagError::Format(format!("Unknown tag kind ordinal {ordinal}")))?;
    let is_absent = reader.read_bool()?;

    let mut tag = if is_absent || kind.is_marker() {
        Tag::without_value(kind)
    } else {
        Tag::new(read_payload(reader, kind)?)
    };

    let children = reader.read_len()?;
    tag.entities_mut().reserve(children.min(MAX_PREALLOCATION));
    Ok((tag, children))
}

fn read_payload(reader: &mut WireReader<'_>, kind: TagKind) -> Result<TagValue> {
    macro_rules! read_array {
        ($read:ident) => {{
            let len = reader.read_len()?;
            let mut items = Vec::with_capacity(len.min(MAX_PREALLOCATION));
            for _ in 0..len {
                items.push(reader.$read()?);
            }
            items
        }};
    }

    Ok(match kind {
        TagKind::Blob => {
            let len = reader.read_len()?;
            TagValue::Blob(reader.read_bytes(len)?.to_vec())
        }
        TagKind::ByteArray => {
            let len = reader.read_len()?;
            TagValue::ByteArray(reader.read_bytes(len)?.to_vec())
        }
        TagKind::Bool => TagValue::Bool(reader.read_bool()?),
        TagKind::Char => TagValue::Char(reader.read_char()?),
        TagKind::Byte => TagValue::Byte(reader.read_u8()?),
        TagKind::Short => TagValue::Short(reader.read_i16()?),
        TagKind::Int => TagValue::Int(reader.read_i32()?),
        TagKind::Long => TagValue::Long(reader.read_i64()?),
        TagKind::Float => TagValue::Float(reader.read_f32()?),
        TagKind::Double => TagValue::Double(reader.read_f64()?),
        TagKind::String => TagValue::String(reader.read_string()?),
        TagKind::Decimal => TagValue::Decimal(reader.read_decimal()?),
        TagKind::UShort => TagValue::UShort(reader.read_u16()?),
        TagKind::UInt => TagValue::UInt(reader.read_u32()?),
        TagKind::ULong => TagValue::ULong(reader.read_u64()?),
        TagKind::SByte => TagValue::SByte(reader.read_i8()?),
        TagKind::BoolArray => TagValue::BoolArray(read_array!(read_bool)),
        TagKind::CharArray => TagValue::CharArray(read_array!(read_char)),
        TagKind::ShortArray => TagValue::ShortArray(read_array!(read_i16)),
        TagKind::IntArray => TagValue::IntArray(read_array!(read_i32)),
        TagKind::LongArray => TagValue::LongArray(read_array!(read_i64)),
        TagKind::FloatArray => TagValue::FloatArray(read_array!(read_f32)),
        TagKind::DoubleArray => TagValue::DoubleArray(read_array!(read_f64)),
        TagKind::StringArray => TagValue::StringArray(read_array!(read_string)),
        TagKind::DecimalArray => TagValue::DecimalArray(read_array!(read_decimal)),
        TagKind::UShortArray => TagValue::UShortArray(read_array!(read_u16)),
        TagKind::UIntArray => TagValue::UIntArray(read_array!(read_u32)),
        TagKind::ULongArray => TagValue::ULongArray(read_array!(read_u64)),
        TagKind::SByteArray => TagValue::SByteArray(read_array!(read_i8)),
        TagKind::Container | TagKind::Absent => {
            return Err(TagError::Format(format!("Kind {kind} carries no payload")))
        }
    })
}
