use crate::airport::AirportDirectory;
use crate::error::Error;
use crate::status::Role;
use serde::Deserialize;
use std::collections::HashMap;

/// One offer-search response: priced offers plus the auxiliary dictionaries
/// resolving carrier/aircraft codes to display names.
#[derive(Deserialize)]
pub struct OfferResponse {
    #[serde(default)]
    pub data: Vec<Offer>,
    #[serde(default)]
    pub dictionaries: Dictionaries,
}

impl OfferResponse {
    /// An empty result list is a legitimate search outcome, not an error.
    pub fn from_json(json: &str) -> Result<OfferResponse, Error> {
        Ok(serde_json::from_str(json)?)
    }
}

#[derive(Default, Deserialize)]
pub struct Dictionaries {
    #[serde(default)]
    carriers: HashMap<String, String>,
    #[serde(default)]
    aircraft: HashMap<String, String>,
}

impl Dictionaries {
    pub fn carrier_name<'a>(&'a self, code: &'a str) -> &'a str {
        self.carriers.get(code).map(String::as_str).unwrap_or(code)
    }

    pub fn aircraft_name<'a>(&'a self, code: &'a str) -> &'a str {
        self.aircraft.get(code).map(String::as_str).unwrap_or(code)
    }
}

/// A priced, bookable combination of itineraries.
#[derive(Clone, Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Offer {
    pub id: String,
    pub price: Price,
    #[serde(default)]
    pub itineraries: Vec<Itinerary>,
    #[serde(default)]
    pub traveler_pricings: Vec<TravelerPricing>,
}

#[derive(Clone, Debug, Deserialize)]
pub struct Price {
    pub total: String,
    #[serde(default)]
    pub currency: String,
}

impl Price {
    /// Numeric value for ranking; an unparseable total sorts last.
    pub fn amount(&self) -> f64 {
        self.total.parse().unwrap_or(f64::INFINITY)
    }
}

/// One direction of travel: an ordered sequence of legs.
#[derive(Clone, Debug, Deserialize)]
pub struct Itinerary {
    pub duration: Option<String>,
    #[serde(default)]
    pub segments: Vec<Segment>,
}

#[derive(Clone, Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Segment {
    pub departure: Endpoint,
    pub arrival: Endpoint,
    pub carrier_code: String,
    pub number: String,
    pub aircraft: Option<AircraftCode>,
    pub operating: Option<OperatingCarrier>,
    pub duration: Option<String>,
}

#[derive(Clone, Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Endpoint {
    pub iata_code: String,
    pub terminal: Option<String>,
    pub at: String,
}

#[derive(Clone, Debug, Deserialize)]
pub struct AircraftCode {
    pub code: String,
}

#[derive(Clone, Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OperatingCarrier {
    pub carrier_code: Option<String>,
}

#[derive(Clone, Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TravelerPricing {
    pub traveler_type: Option<String>,
}

/// One grouped, map-friendly endpoint of an itinerary.
#[derive(Clone, Debug, PartialEq)]
pub struct RoutePoint {
    pub code: String,
    pub latitude: f64,
    pub longitude: f64,
    pub role: Role,
}

/// Stable ascending sort by total price: two offers at an identical price
/// keep their original relative order between repeated searches. The input
/// set is never reordered in place.
pub fn rank_by_price(offers: &[Offer]) -> Vec<Offer> {
    let mut ranked = offers.to_vec();
    ranked.sort_by(|a, b| a.price.amount().total_cmp(&b.price.amount()));
    ranked
}

/// Flattens an itinerary into tagged endpoint pairs: every leg contributes
/// its departure and arrival, the very first point is the origin, the very
/// last the destination, everything between a stopover. Roles come from the
/// leg's position in the itinerary; legs missing coordinates for either
/// endpoint are then dropped whole, never rendered half-way.
pub fn group_route(itinerary: &Itinerary, directory: &AirportDirectory) -> Vec<RoutePoint> {
    let count = itinerary.segments.len();
    let mut points = Vec::with_capacity(count * 2);
    for (i, segment) in itinerary.segments.iter().enumerate() {
        let dep = directory.resolve(&segment.departure.iata_code);
        let arr = directory.resolve(&segment.arrival.iata_code);
        let (Some(dep_coords), Some(arr_coords)) = (dep.coords(), arr.coords()) else {
            continue;
        };
        points.push(RoutePoint {
            code: dep.iata,
            latitude: dep_coords.0,
            longitude: dep_coords.1,
            role: if i == 0 { Role::Origin } else { Role::Stopover },
        });
        points.push(RoutePoint {
            code: arr.iata,
            latitude: arr_coords.0,
            longitude: arr_coords.1,
            role: if i + 1 == count {
                Role::Destination
            } else {
                Role::Stopover
            },
        });
    }
    points
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::airport::AirportRecord;
    use proptest::prelude::*;

    fn offer(id: &str, total: &str) -> Offer {
        Offer {
            id: id.to_string(),
            price: Price {
                total: total.to_string(),
                currency: "EUR".to_string(),
            },
            itineraries: vec![],
            traveler_pricings: vec![],
        }
    }

    fn airport(iata: &str, lat: f64, lon: f64) -> AirportRecord {
        AirportRecord {
            iata: iata.to_string(),
            icao: None,
            city: iata.to_string(),
            name: iata.to_string(),
            country: String::new(),
            latitude: Some(lat),
            longitude: Some(lon),
        }
    }

    fn segment(from: &str, to: &str) -> Segment {
        Segment {
            departure: Endpoint {
                iata_code: from.to_string(),
                terminal: None,
                at: "2025-08-14T10:30:00+02:00".to_string(),
            },
            arrival: Endpoint {
                iata_code: to.to_string(),
                terminal: None,
                at: "2025-08-14T12:30:00+02:00".to_string(),
            },
            carrier_code: "AF".to_string(),
            number: "1234".to_string(),
            aircraft: None,
            operating: None,
            duration: Some("PT2H".to_string()),
        }
    }

    #[test]
    fn test_ranking_is_stable_on_price_ties() {
        let offers = vec![offer("1", "200.00"), offer("2", "150.00"), offer("3", "150.00")];
        let ranked = rank_by_price(&offers);
        let ids: Vec<&str> = ranked.iter().map(|o| o.id.as_str()).collect();
        assert_eq!(ids, ["2", "3", "1"]);
    }

    #[test]
    fn test_unparseable_price_sorts_last() {
        let offers = vec![offer("1", "oops"), offer("2", "99.10")];
        let ranked = rank_by_price(&offers);
        assert_eq!(ranked[0].id, "2");
        assert_eq!(ranked[1].id, "1");
    }

    #[test]
    fn test_two_leg_itinerary_groups_to_four_points() {
        let directory = AirportDirectory::new([
            airport("AAA", 0.0, 0.0),
            airport("BBB", 5.0, 5.0),
            airport("CCC", 10.0, 10.0),
        ]);
        let itinerary = Itinerary {
            duration: None,
            segments: vec![segment("AAA", "BBB"), segment("BBB", "CCC")],
        };
        let points = group_route(&itinerary, &directory);
        let tagged: Vec<(&str, Role)> =
            points.iter().map(|p| (p.code.as_str(), p.role)).collect();
        assert_eq!(
            tagged,
            [
                ("AAA", Role::Origin),
                ("BBB", Role::Stopover),
                ("BBB", Role::Stopover),
                ("CCC", Role::Destination),
            ]
        );
    }

    #[test]
    fn test_three_leg_itinerary_yields_four_stopovers() {
        let directory = AirportDirectory::new([
            airport("AAA", 0.0, 0.0),
            airport("BBB", 1.0, 1.0),
            airport("CCC", 2.0, 2.0),
            airport("DDD", 3.0, 3.0),
        ]);
        let itinerary = Itinerary {
            duration: None,
            segments: vec![
                segment("AAA", "BBB"),
                segment("BBB", "CCC"),
                segment("CCC", "DDD"),
            ],
        };
        let points = group_route(&itinerary, &directory);
        assert_eq!(points.len(), 6);
        let stopovers = points.iter().filter(|p| p.role == Role::Stopover).count();
        assert_eq!(stopovers, 4);
        assert_eq!(points[0].role, Role::Origin);
        assert_eq!(points[5].role, Role::Destination);
    }

    #[test]
    fn test_leg_without_coordinates_is_dropped_whole() {
        // DDD is absent from the directory, so the last leg loses both its
        // points; the earlier legs keep their role tags.
        let directory = AirportDirectory::new([
            airport("AAA", 0.0, 0.0),
            airport("BBB", 1.0, 1.0),
            airport("CCC", 2.0, 2.0),
        ]);
        let itinerary = Itinerary {
            duration: None,
            segments: vec![
                segment("AAA", "BBB"),
                segment("BBB", "CCC"),
                segment("CCC", "DDD"),
            ],
        };
        let points = group_route(&itinerary, &directory);
        let tagged: Vec<(&str, Role)> =
            points.iter().map(|p| (p.code.as_str(), p.role)).collect();
        assert_eq!(
            tagged,
            [
                ("AAA", Role::Origin),
                ("BBB", Role::Stopover),
                ("BBB", Role::Stopover),
                ("CCC", Role::Stopover),
            ]
        );
    }

    #[test]
    fn test_parses_offer_payload_with_dictionaries() {
        let json = r#"{
            "data": [{
                "id": "7",
                "price": {"total": "412.30", "currency": "EUR"},
                "itineraries": [{
                    "duration": "PT4H15M",
                    "segments": [{
                        "departure": {"iataCode": "CDG", "terminal": "2F", "at": "2025-09-01T07:25:00+02:00"},
                        "arrival": {"iataCode": "FCO", "at": "2025-09-01T09:30:00+02:00"},
                        "carrierCode": "AF",
                        "number": "1204",
                        "aircraft": {"code": "320"},
                        "duration": "PT2H5M"
                    }]
                }],
                "travelerPricings": [{"travelerType": "ADULT", "fareOption": "STANDARD"}]
            }],
            "dictionaries": {
                "carriers": {"AF": "AIR FRANCE"},
                "aircraft": {"320": "AIRBUS A320"}
            }
        }"#;
        let response = OfferResponse::from_json(json).unwrap();
        assert_eq!(response.data.len(), 1);
        let offer = &response.data[0];
        assert_eq!(offer.price.amount(), 412.30);
        assert_eq!(offer.itineraries[0].segments[0].departure.iata_code, "CDG");
        assert_eq!(offer.traveler_pricings.len(), 1);
        assert_eq!(response.dictionaries.carrier_name("AF"), "AIR FRANCE");
        assert_eq!(response.dictionaries.aircraft_name("320"), "AIRBUS A320");
        assert_eq!(response.dictionaries.carrier_name("U2"), "U2");
    }

    proptest! {
        #[test]
        fn test_ranked_prices_are_non_decreasing(totals in prop::collection::vec(0u32..100_000, 0..40)) {
            let offers: Vec<Offer> = totals
                .iter()
                .enumerate()
                .map(|(i, cents)| offer(&i.to_string(), &format!("{}.{:02}", cents / 100, cents % 100)))
                .collect();
            let ranked = rank_by_price(&offers);
            for pair in ranked.windows(2) {
                prop_assert!(pair[0].price.amount() <= pair[1].price.amount());
            }
            prop_assert_eq!(ranked.len(), offers.len());
        }
    }
}
