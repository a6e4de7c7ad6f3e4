use crate::duration::FlightDuration;
use crate::error::Error;
use crate::timepoint::TimePoint;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Position of a leg endpoint within an itinerary.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum Role {
    Origin,
    Stopover,
    Destination,
}

impl Role {
    pub(crate) fn for_index(index: usize, count: usize) -> Role {
        if index == 0 {
            Role::Origin
        } else if index + 1 == count {
            Role::Destination
        } else {
            Role::Stopover
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Role::Origin => write!(f, "origin"),
            Role::Stopover => write!(f, "stopover"),
            Role::Destination => write!(f, "destination"),
        }
    }
}

/// One direct flight segment between two airports.
#[derive(Clone, Debug, PartialEq)]
pub struct Leg {
    pub origin: String,
    pub destination: String,
    pub departure: TimePoint,
    pub arrival: TimePoint,
    pub scheduled: FlightDuration,
    pub delay: Option<FlightDuration>,
    pub role: Role,
    pub departure_terminal: Option<String>,
    pub departure_gate: Option<String>,
    pub arrival_terminal: Option<String>,
}

impl Leg {
    /// "On Time" when no delay entry was present; otherwise the delay label,
    /// which may be negative (early).
    pub fn delay_text(&self) -> String {
        match &self.delay {
            Some(delay) => delay.to_string(),
            None => "On Time".to_string(),
        }
    }

    /// True when the arrival slides to the next calendar day.
    pub fn day_offset(&self) -> bool {
        self.departure.day_offset(&self.arrival)
    }
}

/// One flight's normalized schedule record, built from a single status
/// response and immutable afterwards.
#[derive(Clone, Debug, PartialEq)]
pub struct FlightStatus {
    pub designator: String,
    pub legs: Vec<Leg>,
    pub aircraft_type: Option<String>,
    pub operating_carrier: Option<String>,
}

// Boundary types for the raw schedule payload. Every consumed field is
// explicit; absent values are Options, never silent lookup misses.

#[derive(Deserialize)]
struct RawScheduleResponse {
    #[serde(default)]
    data: Vec<RawFlight>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawFlight {
    flight_designator: RawDesignator,
    #[serde(default)]
    flight_points: Vec<RawFlightPoint>,
    #[serde(default)]
    segments: Vec<RawSegment>,
    #[serde(default)]
    legs: Vec<RawLeg>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawDesignator {
    carrier_code: String,
    flight_number: u32,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawFlightPoint {
    iata_code: String,
    departure: Option<RawPointTimings>,
    arrival: Option<RawPointTimings>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawPointTimings {
    #[serde(default)]
    timings: Vec<RawTiming>,
    terminal: Option<RawTerminal>,
    gate: Option<RawGate>,
}

impl RawPointTimings {
    fn first_timing(&self) -> Option<&RawTiming> {
        self.timings.first()
    }
}

#[derive(Deserialize)]
struct RawTiming {
    value: String,
    #[serde(default)]
    delays: Vec<RawDelay>,
}

#[derive(Deserialize)]
struct RawDelay {
    duration: Option<String>,
}

#[derive(Deserialize)]
struct RawTerminal {
    code: Option<String>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawGate {
    main_gate: Option<String>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawSegment {
    scheduled_segment_duration: Option<String>,
    partnership: Option<RawPartnership>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawPartnership {
    operating_flight: Option<RawOperatingFlight>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawOperatingFlight {
    carrier_code: String,
    flight_number: u32,
}

impl FlightStatus {
    /// Normalizes the first flight record of a raw status payload. The
    /// payload must carry at least two flight points with usable timings;
    /// timestamps that fail to parse abandon the whole record.
    pub fn from_json(json: &str) -> Result<FlightStatus, Error> {
        let raw: RawScheduleResponse = serde_json::from_str(json)?;
        let flight = raw
            .data
            .into_iter()
            .next()
            .ok_or(Error::MalformedPayload("no flight data"))?;
        FlightStatus::from_raw(flight)
    }

    fn from_raw(flight: RawFlight) -> Result<FlightStatus, Error> {
        if flight.flight_points.len() < 2 {
            return Err(Error::MalformedPayload("fewer than two flight points"));
        }
        let leg_count = flight.flight_points.len() - 1;
        let mut legs = Vec::with_capacity(leg_count);
        for (i, pair) in flight.flight_points.windows(2).enumerate() {
            let dep_point = &pair[0];
            let arr_point = &pair[1];
            let dep = dep_point
                .departure
                .as_ref()
                .and_then(RawPointTimings::first_timing)
                .ok_or(Error::MalformedPayload("flight point without departure timing"))?;
            let arr = arr_point
                .arrival
                .as_ref()
                .and_then(RawPointTimings::first_timing)
                .ok_or(Error::MalformedPayload("flight point without arrival timing"))?;
            // Empty delay tokens count as "no delay reported", not zero.
            let delay = arr
                .delays
                .first()
                .and_then(|d| d.duration.as_deref())
                .filter(|d| !d.is_empty())
                .map(FlightDuration::parse);
            let scheduled = flight
                .segments
                .get(i)
                .and_then(|s| s.scheduled_segment_duration.as_deref())
                .map(FlightDuration::parse)
                .unwrap_or_else(|| FlightDuration::parse(""));
            legs.push(Leg {
                origin: dep_point.iata_code.clone(),
                destination: arr_point.iata_code.clone(),
                departure: TimePoint::parse(&dep.value)?,
                arrival: TimePoint::parse(&arr.value)?,
                scheduled,
                delay,
                role: Role::for_index(i, leg_count),
                departure_terminal: dep_point
                    .departure
                    .as_ref()
                    .and_then(|d| d.terminal.as_ref())
                    .and_then(|t| t.code.clone()),
                departure_gate: dep_point
                    .departure
                    .as_ref()
                    .and_then(|d| d.gate.as_ref())
                    .and_then(|g| g.main_gate.clone()),
                arrival_terminal: arr_point
                    .arrival
                    .as_ref()
                    .and_then(|a| a.terminal.as_ref())
                    .and_then(|t| t.code.clone()),
            });
        }
        let designator = format!(
            "{}{}",
            flight.flight_designator.carrier_code, flight.flight_designator.flight_number
        );
        let aircraft_type = flight
            .legs
            .first()
            .and_then(|l| l.aircraft_equipment.as_ref())
            .and_then(|e| e.aircraft_type.clone());
        let operating_carrier = flight
            .segments
            .first()
            .and_then(|s| s.partnership.as_ref())
            .and_then(|p| p.operating_flight.as_ref())
            .map(|op| format!("{}{}", op.carrier_code, op.flight_number));
        Ok(FlightStatus {
            designator,
            legs,
            aircraft_type,
            operating_carrier,
        })
    }
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawLeg {
    aircraft_equipment: Option<RawEquipment>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawEquipment {
    aircraft_type: Option<String>,
}
