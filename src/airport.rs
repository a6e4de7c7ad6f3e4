use crate::error::Error;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use tabled::Tabled;

fn na(value: &Option<String>) -> String {
    value.clone().unwrap_or_else(|| "N/A".to_string())
}

fn coord(value: &Option<f64>) -> String {
    value.map(|v| format!("{v:.4}")).unwrap_or_else(|| "?".to_string())
}

/// Immutable reference data for one airport. Coordinates may be absent.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize, Tabled)]
pub struct AirportRecord {
    pub iata: String,
    #[tabled(display("na"))]
    pub icao: Option<String>,
    pub city: String,
    pub name: String,
    pub country: String,
    #[tabled(display("coord"))]
    pub latitude: Option<f64>,
    #[tabled(display("coord"))]
    pub longitude: Option<f64>,
}

impl AirportRecord {
    fn placeholder(code: &str) -> AirportRecord {
        AirportRecord {
            iata: code.to_string(),
            icao: None,
            city: code.to_string(),
            name: code.to_string(),
            country: String::new(),
            latitude: None,
            longitude: None,
        }
    }

    pub fn coords(&self) -> Option<(f64, f64)> {
        self.latitude.zip(self.longitude)
    }
}

/// Read-only airport reference set, loaded once per process and passed by
/// reference to every consumer. Indexed by upper-cased IATA code.
pub struct AirportDirectory {
    by_iata: HashMap<String, AirportRecord>,
}

impl AirportDirectory {
    pub fn new(records: impl IntoIterator<Item = AirportRecord>) -> AirportDirectory {
        let by_iata = records
            .into_iter()
            .map(|r| (r.iata.to_uppercase(), r))
            .collect();
        AirportDirectory { by_iata }
    }

    /// Loads the upstream reference file, a JSON map keyed by ICAO code.
    /// Entries without an IATA code are skipped.
    pub fn load_from_file(path: &str) -> Result<AirportDirectory, Error> {
        let data = std::fs::read_to_string(path)?;
        #[derive(Deserialize)]
        struct RawAirport {
            #[serde(default)]
            iata: String,
            #[serde(default)]
            city: String,
            #[serde(default)]
            name: String,
            #[serde(default)]
            country: String,
            lat: Option<f64>,
            lon: Option<f64>,
        }
        let raw: HashMap<String, RawAirport> = serde_json::from_str(&data)?;
        let records = raw
            .into_iter()
            .filter(|(_, a)| !a.iata.is_empty())
            .map(|(icao, a)| AirportRecord {
                iata: a.iata.to_uppercase(),
                icao: Some(icao.to_uppercase()),
                city: a.city,
                name: a.name,
                country: a.country,
                latitude: a.lat,
                longitude: a.lon,
            });
        Ok(AirportDirectory::new(records))
    }

    /// Exact case-insensitive lookup. Unknown codes degrade to a placeholder
    /// carrying the code as both city and display name with no coordinates;
    /// upstream flight data routinely references airports missing from the
    /// static set, and the caller must still have something to show.
    pub fn resolve(&self, code: &str) -> AirportRecord {
        let key = code.to_uppercase();
        self.by_iata
            .get(&key)
            .cloned()
            .unwrap_or_else(|| AirportRecord::placeholder(&key))
    }

    pub fn len(&self) -> usize {
        self.by_iata.len()
    }

    pub fn is_empty(&self) -> bool {
        self.by_iata.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn directory() -> AirportDirectory {
        AirportDirectory::new([
            AirportRecord {
                iata: "LHR".to_string(),
                icao: Some("EGLL".to_string()),
                city: "London".to_string(),
                name: "Heathrow".to_string(),
                country: "United Kingdom".to_string(),
                latitude: Some(51.4706),
                longitude: Some(-0.4619),
            },
            AirportRecord {
                iata: "SAW".to_string(),
                icao: Some("LTFJ".to_string()),
                city: "Istanbul".to_string(),
                name: "Sabiha Gokcen".to_string(),
                country: "Turkey".to_string(),
                latitude: None,
                longitude: None,
            },
        ])
    }

    #[test]
    fn test_resolve_is_case_insensitive() {
        let dir = directory();
        assert_eq!(dir.resolve("lhr").city, "London");
        assert_eq!(dir.resolve("Lhr").name, "Heathrow");
    }

    #[test]
    fn test_resolve_unknown_yields_placeholder() {
        let rec = directory().resolve("ZZZ");
        assert_eq!(rec.city, "ZZZ");
        assert_eq!(rec.name, "ZZZ");
        assert_eq!(rec.latitude, None);
        assert_eq!(rec.longitude, None);
    }

    #[test]
    fn test_known_airport_may_still_lack_coords() {
        let rec = directory().resolve("SAW");
        assert_eq!(rec.city, "Istanbul");
        assert_eq!(rec.coords(), None);
    }

    #[test]
    fn test_coords_need_both_halves() {
        let mut rec = directory().resolve("LHR");
        assert!(rec.coords().is_some());
        rec.longitude = None;
        assert_eq!(rec.coords(), None);
    }
}
