use crate::error::Error;
use chrono::{DateTime, FixedOffset};
use serde::{Deserialize, Serialize};

/// A timezone-aware instant with its local display labels.
///
/// `instant` is the single source of truth; `day` and `clock` are derived at
/// construction in the timestamp's own embedded offset (local airport time),
/// never UTC. Two legs' `day` labels therefore compare directly to decide
/// whether an arrival slides to the next calendar day.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct TimePoint {
    pub day: String,
    pub clock: String,
    pub instant: DateTime<FixedOffset>,
}

impl TimePoint {
    /// Parses a timezone-aware ISO-8601 datetime. `Z` counts as an explicit
    /// zero offset; upstream also emits minute-precision timestamps without
    /// seconds. Failure is hard: callers must abandon the record.
    pub fn parse(text: &str) -> Result<TimePoint, Error> {
        let instant = DateTime::parse_from_rfc3339(text)
            .or_else(|_| DateTime::parse_from_str(text, "%Y-%m-%dT%H:%M%:z"))
            .map_err(|_| Error::MalformedTimestamp {
                text: text.to_string(),
            })?;
        Ok(TimePoint::from_instant(instant))
    }

    pub fn from_instant(instant: DateTime<FixedOffset>) -> TimePoint {
        TimePoint {
            day: instant.format("%a %d %b").to_string(),
            clock: instant.format("%H:%M").to_string(),
            instant,
        }
    }

    /// True when `arrival` falls on a different calendar day than `self`,
    /// each in its own local offset.
    pub fn day_offset(&self, arrival: &TimePoint) -> bool {
        self.day != arrival.day
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_with_offset() {
        let tp = TimePoint::parse("2025-08-14T10:30:00+02:00").unwrap();
        assert_eq!(tp.day, "Thu 14 Aug");
        assert_eq!(tp.clock, "10:30");
    }

    #[test]
    fn test_parse_utc_designator() {
        let tp = TimePoint::parse("2025-08-14T23:45:00Z").unwrap();
        assert_eq!(tp.day, "Thu 14 Aug");
        assert_eq!(tp.clock, "23:45");
    }

    #[test]
    fn test_parse_minute_precision() {
        let tp = TimePoint::parse("2025-08-14T10:40+02:00").unwrap();
        assert_eq!(tp.clock, "10:40");
    }

    #[test]
    fn test_labels_use_embedded_offset_not_utc() {
        // 23:30 local is already the 15th in UTC; the label must stay local.
        let tp = TimePoint::parse("2025-08-14T23:30:00-03:00").unwrap();
        assert_eq!(tp.day, "Thu 14 Aug");
        assert_eq!(tp.clock, "23:30");
    }

    #[test]
    fn test_parse_rejects_junk() {
        assert!(matches!(
            TimePoint::parse("not-a-time"),
            Err(Error::MalformedTimestamp { .. })
        ));
    }

    #[test]
    fn test_parse_rejects_bare_date() {
        assert!(TimePoint::parse("2025-08-14").is_err());
    }

    #[test]
    fn test_day_offset() {
        let dep = TimePoint::parse("2025-08-14T22:10:00+02:00").unwrap();
        let same_day = TimePoint::parse("2025-08-14T23:55:00+02:00").unwrap();
        let next_day = TimePoint::parse("2025-08-15T06:20:00+08:00").unwrap();
        assert!(!dep.day_offset(&same_day));
        assert!(dep.day_offset(&next_day));
    }
}
