//! Dates, times and durations in 100-nanosecond ticks.
//!
//! | Type                    | Tag                                                 |
//! |-------------------------|-----------------------------------------------------|
//! | `TimeDelta`             | Long ticks                                          |
//! | `NaiveTime`             | Long ticks since midnight                           |
//! | `NaiveDate`             | Int days since 0001-01-01                           |
//! | `NaiveDateTime`         | Long ticks since 0001-01-01T00:00:00                |
//! | `DateTime<Utc>`         | Long ticks with the UTC kind bit (62) set           |
//! | `DateTime<FixedOffset>` | Container: `"Ticks"` local ticks, `"Offset"` ticks  |

use crate::core::kind::TagKind;
use crate::core::tag::Tag;
use crate::error::{Result, TagError};
use crate::mapping::context::MappingContext;
use crate::mapping::engine::{dispatch_from_tag, dispatch_to_tag, expect_container, kind_mismatch};
use crate::mapping::registry::TagConverter;
use crate::mapping::traits::TagMapped;
use chrono::{
    DateTime, Datelike, FixedOffset, NaiveDate, NaiveDateTime, NaiveTime, TimeDelta, TimeZone,
    Timelike, Utc,
};

pub const TICKS_PER_SECOND: i64 = 10_000_000;
const NANOS_PER_TICK: i64 = 100;
const TICKS_PER_DAY: i64 = 86_400 * TICKS_PER_SECOND;

/// Seconds from 0001-01-01 to the Unix epoch
const UNIX_EPOCH_SECONDS: i64 = 62_135_596_800;

/// Largest tick count of a valid date (9999-12-31T23:59:59.9999999)
const MAX_TICKS: i64 = 3_155_378_975_999_999_999;

const KIND_UTC: i64 = 0x4000_0000_0000_0000;
const TICKS_MASK: i64 = 0x3FFF_FFFF_FFFF_FFFF;
const TICKS_CEILING: i64 = 0x4000_0000_0000_0000;

const TICKS_MEMBER: &str = "Ticks";
const OFFSET_MEMBER: &str = "Offset";

fn out_of_range(what: &str) -> TagError {
    TagError::Mapping(format!("{what} is outside the representable tick range"))
}

fn delta_to_ticks(delta: TimeDelta) -> Result<i64> {
    delta
        .num_seconds()
        .checked_mul(TICKS_PER_SECOND)
        .and_then(|ticks| ticks.checked_add(i64::from(delta.subsec_nanos()) / NANOS_PER_TICK))
        .ok_or_else(|| out_of_range("Duration"))
}

fn ticks_to_delta(ticks: i64) -> TimeDelta {
    TimeDelta::seconds(ticks.div_euclid(TICKS_PER_SECOND))
        + TimeDelta::nanoseconds(ticks.rem_euclid(TICKS_PER_SECOND) * NANOS_PER_TICK)
}

fn naive_to_ticks(value: &NaiveDateTime) -> Result<i64> {
    let utc = value.and_utc();
    let nanos = i64::from(utc.timestamp_subsec_nanos().min(999_999_999));
    utc.timestamp()
        .checked_add(UNIX_EPOCH_SECONDS)
        .and_then(|secs| secs.checked_mul(TICKS_PER_SECOND))
        .and_then(|ticks| ticks.checked_add(nanos / NANOS_PER_TICK))
        .ok_or_else(|| out_of_range("Date-time"))
}

fn ticks_to_naive(ticks: i64) -> Result<NaiveDateTime> {
    let secs = ticks.div_euclid(TICKS_PER_SECOND) - UNIX_EPOCH_SECONDS;
    let nanos = ticks.rem_euclid(TICKS_PER_SECOND) * NANOS_PER_TICK;
    DateTime::from_timestamp(secs, nanos as u32)
        .map(|utc| utc.naive_utc())
        .ok_or_else(|| out_of_range("Date-time"))
}

/// Tick count of a binary date-time; local-kind values already hold UTC ticks
fn binary_to_ticks(raw: i64) -> i64 {
    let ticks = raw & TICKS_MASK;
    if raw < 0 && ticks > MAX_TICKS {
        ticks - TICKS_CEILING
    } else {
        ticks
    }
}

fn expect_long(tag: &Tag) -> Result<i64> {
    tag.as_i64().ok_or_else(|| kind_mismatch(TagKind::Long, tag))
}

fn named_long(tag: &Tag, name: &str) -> Result<i64> {
    expect_container(tag)?
        .iter()
        .find(|pair| pair.as_str() == Some(name))
        .and_then(Tag::first_entity)
        .ok_or_else(|| TagError::Mapping(format!("Missing member \"{name}\"")))
        .and_then(expect_long)
}

/// Converter for the `chrono` date and time types.
#[derive(Debug, Clone, Copy, Default)]
pub struct ChronoHandler;

impl TagConverter<TimeDelta> for ChronoHandler {
    fn to_tag(&self, value: &TimeDelta, _ctx: &MappingContext<'_>) -> Result<Tag> {
        Ok(Tag::from(delta_to_ticks(*value)?))
    }

    fn from_tag(&self, tag: &Tag, _ctx: &MappingContext<'_>) -> Result<TimeDelta> {
        expect_long(tag).map(ticks_to_delta)
    }
}

impl TagConverter<NaiveTime> for ChronoHandler {
    fn to_tag(&self, value: &NaiveTime, _ctx: &MappingContext<'_>) -> Result<Tag> {
        let nanos = i64::from(value.nanosecond().min(999_999_999));
        let ticks =
            i64::from(value.num_seconds_from_midnight()) * TICKS_PER_SECOND + nanos / NANOS_PER_TICK;
        Ok(Tag::from(ticks))
    }

    fn from_tag(&self, tag: &Tag, _ctx: &MappingContext<'_>) -> Result<NaiveTime> {
        let ticks = expect_long(tag)?;
        if !(0..TICKS_PER_DAY).contains(&ticks) {
            return Err(out_of_range("Time of day"));
        }
        let secs = (ticks / TICKS_PER_SECOND) as u32;
        let nanos = ((ticks % TICKS_PER_SECOND) * NANOS_PER_TICK) as u32;
        NaiveTime::from_num_seconds_from_midnight_opt(secs, nanos)
            .ok_or_else(|| out_of_range("Time of day"))
    }
}

impl TagConverter<NaiveDate> for ChronoHandler {
    fn to_tag(&self, value: &NaiveDate, _ctx: &MappingContext<'_>) -> Result<Tag> {
        Ok(Tag::from(value.num_days_from_ce() - 1))
    }

    fn from_tag(&self, tag: &Tag, _ctx: &MappingContext<'_>) -> Result<NaiveDate> {
        let day = tag.as_i32().ok_or_else(|| kind_mismatch(TagKind::Int, tag))?;
        day.checked_add(1)
            .and_then(NaiveDate::from_num_days_from_ce_opt)
            .ok_or_else(|| out_of_range("Date"))
    }
}

impl TagConverter<NaiveDateTime> for ChronoHandler {
    fn to_tag(&self, value: &NaiveDateTime, _ctx: &MappingContext<'_>) -> Result<Tag> {
        Ok(Tag::from(naive_to_ticks(value)?))
    }

    fn from_tag(&self, tag: &Tag, _ctx: &MappingContext<'_>) -> Result<NaiveDateTime> {
        ticks_to_naive(binary_to_ticks(expect_long(tag)?))
    }
}

impl TagConverter<DateTime<Utc>> for ChronoHandler {
    fn to_tag(&self, value: &DateTime<Utc>, _ctx: &MappingContext<'_>) -> Result<Tag> {
        let ticks = naive_to_ticks(&value.naive_utc())?;
        if !(0..=MAX_TICKS).contains(&ticks) {
            return Err(out_of_range("UTC date-time"));
        }
        Ok(Tag::from(ticks | KIND_UTC))
    }

    fn from_tag(&self, tag: &Tag, _ctx: &MappingContext<'_>) -> Result<DateTime<Utc>> {
        let naive = ticks_to_naive(binary_to_ticks(expect_long(tag)?))?;
        Ok(Utc.from_utc_datetime(&naive))
    }
}

impl TagConverter<DateTime<FixedOffset>> for ChronoHandler {
    fn to_tag(&self, value: &DateTime<FixedOffset>, _ctx: &MappingContext<'_>) -> Result<Tag> {
        let ticks = naive_to_ticks(&value.naive_local())?;
        let offset = i64::from(value.offset().local_minus_utc()) * TICKS_PER_SECOND;
        Ok(Tag::container()
            .with_entity(Tag::named(TICKS_MEMBER, Tag::from(ticks)))
            .with_entity(Tag::named(OFFSET_MEMBER, Tag::from(offset))))
    }

    fn from_tag(&self, tag: &Tag, _ctx: &MappingContext<'_>) -> Result<DateTime<FixedOffset>> {
        let local = ticks_to_naive(named_long(tag, TICKS_MEMBER)?)?;
        let offset = named_long(tag, OFFSET_MEMBER)? / TICKS_PER_SECOND;
        i32::try_from(offset)
            .ok()
            .and_then(FixedOffset::east_opt)
            .and_then(|offset| offset.from_local_datetime(&local).single())
            .ok_or_else(|| TagError::Mapping(format!("Invalid UTC offset of {offset} seconds")))
    }
}

macro_rules! chrono_mapped {
    ($($ty:ty),* $(,)?) => {
        $(
            impl TagMapped for $ty {
                fn to_tag(&self, ctx: &MappingContext<'_>) -> Result<Tag> {
                    dispatch_to_tag(self, ctx, &ChronoHandler)
                }

                fn from_tag(tag: &Tag, ctx: &MappingContext<'_>) -> Result<Self> {
                    dispatch_from_tag(tag, ctx, &ChronoHandler)
                }
            }
        )*
    };
}

chrono_mapped!(
    TimeDelta,
    NaiveTime,
    NaiveDate,
    NaiveDateTime,
    DateTime<Utc>,
    DateTime<FixedOffset>,
);

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::MappingOptions;
    use crate::mapping::registry::TypeRegistry;

    fn with_ctx(f: impl FnOnce(&MappingContext<'_>)) {
        let registry = TypeRegistry::new();
        let options = MappingOptions::raising();
        f(&MappingContext::new(&registry, &options));
    }

    #[test]
    #[allow(clippy::unwrap_used)]
    fn test_unix_epoch_ticks() {
        with_ctx(|ctx| {
            let epoch = DateTime::from_timestamp(0, 0).unwrap().naive_utc();
            let tag = ctx.value_to_tag(&epoch).unwrap();
            assert_eq!(tag.as_i64(), Some(621_355_968_000_000_000));
            assert_eq!(ctx.value_from_tag::<NaiveDateTime>(&tag).unwrap(), epoch);
        });
    }

    #[test]
    #[allow(clippy::unwrap_used)]
    fn test_utc_kind_bit() {
        with_ctx(|ctx| {
            let now = Utc.with_ymd_and_hms(2024, 2, 29, 12, 30, 15).unwrap();
            let tag = ctx.value_to_tag(&now).unwrap();
            let raw = tag.as_i64().unwrap();
            assert_eq!(raw & KIND_UTC, KIND_UTC);
            assert_eq!(ctx.value_from_tag::<DateTime<Utc>>(&tag).unwrap(), now);
        });
    }

    #[test]
    #[allow(clippy::unwrap_used)]
    fn test_local_kind_binary_reads_as_utc() {
        with_ctx(|ctx| {
            // Local kind sets bit 63 over UTC ticks
            let ticks = 621_355_968_000_000_000i64;
            let raw = ticks | i64::MIN;
            let value = ctx.value_from_tag::<DateTime<Utc>>(&Tag::from(raw)).unwrap();
            assert_eq!(value.timestamp(), 0);
        });
    }

    #[test]
    #[allow(clippy::unwrap_used)]
    fn test_date_day_number() {
        with_ctx(|ctx| {
            let first = NaiveDate::from_ymd_opt(1, 1, 1).unwrap();
            assert_eq!(ctx.value_to_tag(&first).unwrap().as_i32(), Some(0));
            let date = NaiveDate::from_ymd_opt(2000, 1, 1).unwrap();
            let tag = ctx.value_to_tag(&date).unwrap();
            assert_eq!(tag.as_i32(), Some(730_119));
            assert_eq!(ctx.value_from_tag::<NaiveDate>(&tag).unwrap(), date);
        });
    }

    #[test]
    #[allow(clippy::unwrap_used)]
    fn test_time_and_duration_ticks() {
        with_ctx(|ctx| {
            let time = NaiveTime::from_hms_micro_opt(1, 2, 3, 456_789).unwrap();
            let tag = ctx.value_to_tag(&time).unwrap();
            assert_eq!(tag.as_i64(), Some(3_723 * TICKS_PER_SECOND + 4_567_890));
            assert_eq!(ctx.value_from_tag::<NaiveTime>(&tag).unwrap(), time);

            let delta = TimeDelta::milliseconds(-1_500);
            let tag = ctx.value_to_tag(&delta).unwrap();
            assert_eq!(tag.as_i64(), Some(-15_000_000));
            assert_eq!(ctx.value_from_tag::<TimeDelta>(&tag).unwrap(), delta);

            assert!(ctx.value_from_tag::<NaiveTime>(&Tag::from(TICKS_PER_DAY)).is_err());
        });
    }

    #[test]
    #[allow(clippy::unwrap_used)]
    fn test_offset_members() {
        with_ctx(|ctx| {
            let offset = FixedOffset::east_opt(5 * 3600 + 1800).unwrap();
            let value = offset.with_ymd_and_hms(2021, 6, 1, 8, 0, 0).unwrap();
            let tag = ctx.value_to_tag(&value).unwrap();
            assert!(tag.is_container());
            assert_eq!(tag.entities()[0].as_str(), Some("Ticks"));
            assert_eq!(
                tag.entities()[1].first_entity().and_then(Tag::as_i64),
                Some(19_800 * TICKS_PER_SECOND)
            );
            assert_eq!(ctx.value_from_tag::<DateTime<FixedOffset>>(&tag).unwrap(), value);
        });
    }
}
