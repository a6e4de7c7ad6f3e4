use regex::Regex;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::LazyLock;

// Sign markers are stripped before matching; upstream emits both "-PT21M"
// and "PT-21M".
static GRAMMAR: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^PT(?:(\d+)H)?(?:(\d+)M)?$").expect("duration grammar"));

/// A signed duration in minutes together with its display label.
///
/// Parsing is best-effort by contract: text outside the grammar keeps the
/// original token as the label with zero minutes, so every duration can be
/// displayed as-is. Negative values mean "earlier than scheduled".
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct FlightDuration {
    pub minutes: i64,
    label: String,
}

impl FlightDuration {
    pub fn from_minutes(minutes: i64) -> FlightDuration {
        FlightDuration {
            minutes,
            label: format_minutes(minutes),
        }
    }

    /// Parses an ISO-8601-like duration token (`PT8H10M`, `PT2H`, `PT-21M`).
    /// Never fails: empty input becomes "N/A", anything else outside the
    /// grammar becomes `(original text, 0)`.
    pub fn parse(text: &str) -> FlightDuration {
        if text.is_empty() {
            return FlightDuration {
                minutes: 0,
                label: "N/A".to_string(),
            };
        }
        let negative = text.contains('-');
        let unsigned: String = text.chars().filter(|c| *c != '-').collect();
        match GRAMMAR.captures(&unsigned) {
            Some(caps) if caps.get(1).is_some() || caps.get(2).is_some() => {
                let hours: i64 = caps
                    .get(1)
                    .map(|m| m.as_str().parse().unwrap_or(0))
                    .unwrap_or(0);
                let mins: i64 = caps
                    .get(2)
                    .map(|m| m.as_str().parse().unwrap_or(0))
                    .unwrap_or(0);
                let total = hours * 60 + mins;
                FlightDuration::from_minutes(if negative { -total } else { total })
            }
            _ => FlightDuration {
                minutes: 0,
                label: text.to_string(),
            },
        }
    }

    pub fn label(&self) -> &str {
        &self.label
    }
}

fn format_minutes(minutes: i64) -> String {
    let hours = minutes.abs() / 60;
    let mins = minutes.abs() % 60;
    let body = if hours > 0 && mins > 0 {
        format!("{hours}h{mins:02}")
    } else if hours > 0 {
        format!("{hours}h")
    } else {
        format!("{mins} min")
    };
    if minutes < 0 {
        format!("-{body}")
    } else {
        body
    }
}

impl fmt::Display for FlightDuration {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.label)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_parse_hours_and_minutes() {
        let d = FlightDuration::parse("PT8H10M");
        assert_eq!(d.minutes, 490);
        assert_eq!(d.label(), "8h10");
    }

    #[test]
    fn test_parse_hours_only() {
        let d = FlightDuration::parse("PT2H");
        assert_eq!(d.minutes, 120);
        assert_eq!(d.label(), "2h");
    }

    #[test]
    fn test_parse_minutes_only() {
        let d = FlightDuration::parse("PT45M");
        assert_eq!(d.minutes, 45);
        assert_eq!(d.label(), "45 min");
    }

    #[test]
    fn test_parse_negative_delay() {
        let d = FlightDuration::parse("PT-21M");
        assert_eq!(d.minutes, -21);
        assert_eq!(d.label(), "-21 min");
    }

    #[test]
    fn test_parse_leading_sign_marker() {
        let d = FlightDuration::parse("-PT1H30M");
        assert_eq!(d.minutes, -90);
        assert_eq!(d.label(), "-1h30");
    }

    #[test]
    fn test_parse_empty_is_not_available() {
        let d = FlightDuration::parse("");
        assert_eq!(d.minutes, 0);
        assert_eq!(d.label(), "N/A");
    }

    #[test]
    fn test_unparseable_keeps_original_text() {
        let d = FlightDuration::parse("1h30");
        assert_eq!(d.minutes, 0);
        assert_eq!(d.label(), "1h30");
    }

    #[test]
    fn test_bare_prefix_keeps_original_text() {
        // "PT" matches the grammar shape but carries no fields at all.
        let d = FlightDuration::parse("PT");
        assert_eq!(d.minutes, 0);
        assert_eq!(d.label(), "PT");
    }

    #[test]
    fn test_format_zero() {
        assert_eq!(FlightDuration::from_minutes(0).label(), "0 min");
    }

    #[test]
    fn test_format_exact_hours() {
        assert_eq!(FlightDuration::from_minutes(180).label(), "3h");
    }

    #[test]
    fn test_format_pads_minutes() {
        assert_eq!(FlightDuration::from_minutes(65).label(), "1h05");
    }

    proptest! {
        #[test]
        fn test_parse_is_total(text in ".*") {
            // Soft contract: no input may raise.
            let _ = FlightDuration::parse(&text);
        }

        #[test]
        fn test_well_formed_tokens_round_trip(h in 0u32..100, m in 1u32..60) {
            let d = FlightDuration::parse(&format!("PT{h}H{m}M"));
            prop_assert_eq!(d.minutes, i64::from(h) * 60 + i64::from(m));
            let reparsed = FlightDuration::from_minutes(d.minutes);
            prop_assert_eq!(d, reparsed);
        }
    }
}
