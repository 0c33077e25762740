//! Example: Mapping Rust values to HyperTAG streams
//!
//! Shows the derive macro, boxed nesting, registered converters and the
//! raise/suppress error modes.
//!
//! Run with: `cargo run --example object_mapping`

#![allow(clippy::uninlined_format_args)]

use chrono::{DateTime, Utc};
use hyper_tag::config::LoggingConfig;
use hyper_tag::mapping::{MappingContext, TagConverter};
use hyper_tag::utils::{global_metrics, init_logging};
use hyper_tag::{
    register_standard_handlers, ErrorMode, MappingOptions, Nesting, Tag, TagError, TagMapped,
    TagMapper, TypeRegistry,
};
use std::sync::Arc;
use tracing::Level;
use uuid::Uuid;

#[derive(TagMapped, Default, Debug, PartialEq)]
struct Person {
    #[tag(rename = "Number")]
    number: i32,
    #[tag(rename = "Text")]
    text: String,
}

#[derive(TagMapped, Default, Debug, PartialEq)]
struct Ticket {
    id: Uuid,
    owner: Person,
    opened: Option<DateTime<Utc>>,
    labels: Vec<String>,
    priority: Priority,
}

#[derive(TagMapped, Default, Debug, PartialEq, Clone, Copy)]
#[tag(registered)]
enum Priority {
    #[default]
    Low,
    High,
}

struct PriorityAsByte;

impl TagConverter<Priority> for PriorityAsByte {
    fn to_tag(&self, value: &Priority, _ctx: &MappingContext<'_>) -> hyper_tag::Result<Tag> {
        Ok(Tag::from(*value as u8))
    }

    fn from_tag(&self, tag: &Tag, _ctx: &MappingContext<'_>) -> hyper_tag::Result<Priority> {
        match tag.as_u8() {
            Some(0) => Ok(Priority::Low),
            Some(1) => Ok(Priority::High),
            _ => Err(TagError::mapping("Unknown priority")),
        }
    }
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    init_logging(&LoggingConfig {
        log_level: Level::DEBUG,
        ..LoggingConfig::default()
    })?;

    println!("=== HyperTAG Object Mapping Demo ===\n");

    let registry = Arc::new(TypeRegistry::new());
    register_standard_handlers(&registry);
    registry.register::<Priority, _>(PriorityAsByte);

    let ticket = Ticket {
        id: Uuid::from_u128(0x1234),
        owner: Person {
            number: 42,
            text: "Hello".into(),
        },
        opened: Some(Utc::now()),
        labels: vec!["bug".into(), "ui".into()],
        priority: Priority::High,
    };

    for nesting in [Nesting::Embedded, Nesting::Boxed] {
        let mapper = TagMapper::with_registry(Arc::clone(&registry))
            .with_options(MappingOptions::raising().with_nesting(nesting));

        let tag = mapper.serialize(&ticket)?.ok_or("nothing mapped")?;
        let bytes = mapper.serialize_to_bytes(&ticket)?.ok_or("nothing encoded")?;
        println!(
            "{:?}: {} nodes, depth {}, {} bytes on the wire",
            nesting,
            tag.node_count(),
            tag.depth(),
            bytes.len()
        );

        let back: Ticket = mapper
            .deserialize_from_bytes(&bytes)?
            .ok_or("nothing decoded")?;
        assert_eq!(back, ticket);
    }

    // A Text member holding an Int cannot populate a String field
    let raising = TagMapper::with_registry(Arc::clone(&registry)).with_options(MappingOptions::raising());
    let mut tag = raising.serialize(&ticket.owner)?.ok_or("nothing mapped")?;
    tag.entities_mut()[1].entities_mut()[0] = Tag::from(7i32);
    match raising.deserialize::<Person>(&tag) {
        Err(e) => println!("\nRaise mode:    {}", e),
        Ok(p) => println!("\nRaise mode:    unexpectedly mapped {:?}", p),
    }

    let suppressing = raising.with_options(MappingOptions::default().with_error_mode(ErrorMode::Suppress));
    println!("Suppress mode: {:?}", suppressing.deserialize::<Person>(&tag)?);

    global_metrics().log_metrics();
    println!("\n{:#?}", global_metrics().snapshot());
    Ok(())
}
