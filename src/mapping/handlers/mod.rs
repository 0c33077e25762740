//! # Standard Handlers
//!
//! Built-in converters for collections, tuples, identifiers, dates and nested
//! tag trees. Each is also the fallback rule for its types, so none of them has
//! to be registered. [`register_standard_handlers`] installs the ones that
//! stand for a single concrete type into a registry, where they can be looked
//! up, listed or replaced.

pub mod datetime;
pub mod list;
pub mod map;
pub mod tag_blob;
pub mod tuple;
pub mod unique_id;

pub use datetime::ChronoHandler;
pub use list::ListHandler;
pub use map::MapHandler;
pub use tag_blob::TagBlobHandler;
pub use tuple::TupleHandler;
pub use unique_id::UuidHandler;

use crate::core::tag::Tag;
use crate::mapping::registry::TypeRegistry;
use chrono::{DateTime, FixedOffset, NaiveDate, NaiveDateTime, NaiveTime, TimeDelta, Utc};
use tracing::debug;
use uuid::Uuid;

/// Register the converters for `Uuid`, the `chrono` types and `Tag`
///
/// Returns the number of converters that replaced an earlier registration.
pub fn register_standard_handlers(registry: &TypeRegistry) -> usize {
    let replaced = [
        registry.register::<Uuid, _>(UuidHandler),
        registry.register::<TimeDelta, _>(ChronoHandler),
        registry.register::<NaiveTime, _>(ChronoHandler),
        registry.register::<NaiveDate, _>(ChronoHandler),
        registry.register::<NaiveDateTime, _>(ChronoHandler),
        registry.register::<DateTime<Utc>, _>(ChronoHandler),
        registry.register::<DateTime<FixedOffset>, _>(ChronoHandler),
        registry.register::<Tag, _>(TagBlobHandler),
    ]
    .into_iter()
    .filter(|replaced| *replaced)
    .count();
    debug!(total = registry.count(), replaced, "Standard handlers registered");
    replaced
}
