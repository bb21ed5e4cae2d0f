use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;
use std::str::FromStr;

/// A flight as read from the flight source. Never mutated by the search engine.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Flight {
    pub id: String,
    pub airline: String,
    #[serde(default)]
    pub airline_code: String,
    #[serde(default)]
    pub airline_logo: String,
    pub flight_number: String,
    pub departure_airport: String,
    pub arrival_airport: String,
    #[serde(default)]
    pub departure_date: String,
    /// `HH:MM`; empty when unknown.
    #[serde(default)]
    pub departure_time: String,
    #[serde(default)]
    pub arrival_time: String,
    #[serde(default)]
    pub duration: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub duration_minutes: Option<u32>,
    pub stops: u32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub stop_locations: Option<Vec<String>>,
    pub price: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub destination: Option<String>,
}

impl Flight {
    /// `stop_locations`, when present, must list exactly one code per stop.
    pub fn has_consistent_stops(&self) -> bool {
        match &self.stop_locations {
            Some(locations) => locations.len() == self.stops as usize,
            None => true,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum CabinClass {
    Economy,
    Business,
    FirstClass,
    /// Any value a client sends that is not one of the recognised classes.
    Other(String),
}

impl CabinClass {
    pub fn as_str(&self) -> &str {
        match self {
            CabinClass::Economy => "Economy",
            CabinClass::Business => "Business",
            CabinClass::FirstClass => "FirstClass",
            CabinClass::Other(value) => value,
        }
    }
}

impl From<String> for CabinClass {
    fn from(value: String) -> Self {
        match value.as_str() {
            "Economy" => CabinClass::Economy,
            "Business" => CabinClass::Business,
            "FirstClass" => CabinClass::FirstClass,
            _ => CabinClass::Other(value),
        }
    }
}

impl From<CabinClass> for String {
    fn from(value: CabinClass) -> Self {
        value.as_str().to_string()
    }
}

impl fmt::Display for CabinClass {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum TripType {
    OneWay,
    RoundTrip,
    Other(String),
}

impl TripType {
    pub fn as_str(&self) -> &str {
        match self {
            TripType::OneWay => "OneWay",
            TripType::RoundTrip => "RoundTrip",
            TripType::Other(value) => value,
        }
    }
}

impl From<String> for TripType {
    fn from(value: String) -> Self {
        match value.as_str() {
            "OneWay" => TripType::OneWay,
            "RoundTrip" => TripType::RoundTrip,
            _ => TripType::Other(value),
        }
    }
}

impl From<TripType> for String {
    fn from(value: TripType) -> Self {
        value.as_str().to_string()
    }
}

impl fmt::Display for TripType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SortOption {
    PriceLowToHigh,
    PriceHighToLow,
    DurationShortToLong,
    DurationLongToShort,
    DepartureSoonToLate,
    DepartureLateToSoon,
}

impl FromStr for SortOption {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "PriceLowToHigh" => Ok(SortOption::PriceLowToHigh),
            "PriceHighToLow" => Ok(SortOption::PriceHighToLow),
            "DurationShortToLong" => Ok(SortOption::DurationShortToLong),
            "DurationLongToShort" => Ok(SortOption::DurationLongToShort),
            "DepartureSoonToLate" => Ok(SortOption::DepartureSoonToLate),
            "DepartureLateToSoon" => Ok(SortOption::DepartureLateToSoon),
            other => Err(format!("unknown sort option: {}", other)),
        }
    }
}

/// `{direct, oneStop, multiStop}` stop selection.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct StopSelection {
    pub direct: bool,
    pub one_stop: bool,
    pub multi_stop: bool,
}

/// `{morning, afternoon, evening}` departure window selection.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct TimeOfDaySelection {
    pub morning: bool,
    pub afternoon: bool,
    pub evening: bool,
}

/// Raw search input as sent by any of the frontend revisions.
///
/// Every field is optional and lenient: a value of the wrong shape is read as
/// absent rather than failing the whole request.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FlightSearchRequest {
    #[serde(default, deserialize_with = "lenient::string", skip_serializing_if = "Option::is_none")]
    pub from: Option<String>,
    #[serde(default, deserialize_with = "lenient::string", skip_serializing_if = "Option::is_none")]
    pub to: Option<String>,
    #[serde(default, deserialize_with = "lenient::string", skip_serializing_if = "Option::is_none")]
    pub departure_date: Option<String>,
    #[serde(default, deserialize_with = "lenient::string", skip_serializing_if = "Option::is_none")]
    pub return_date: Option<String>,
    #[serde(default, deserialize_with = "lenient::string", skip_serializing_if = "Option::is_none")]
    pub passengers: Option<String>,
    #[serde(default, deserialize_with = "lenient::any", skip_serializing_if = "Option::is_none")]
    pub cabin_class: Option<CabinClass>,
    #[serde(default, deserialize_with = "lenient::any", skip_serializing_if = "Option::is_none")]
    pub trip_type: Option<TripType>,

    #[serde(default, deserialize_with = "lenient::any", skip_serializing_if = "Option::is_none")]
    pub price_range: Option<(f64, f64)>,
    #[serde(default, deserialize_with = "lenient::number", skip_serializing_if = "Option::is_none")]
    pub min_price: Option<f64>,
    #[serde(default, deserialize_with = "lenient::number", skip_serializing_if = "Option::is_none")]
    pub max_price: Option<f64>,

    #[serde(default, deserialize_with = "lenient::flag_map", skip_serializing_if = "Option::is_none")]
    pub airlines: Option<HashMap<String, bool>>,
    #[serde(default, deserialize_with = "lenient::string_list", skip_serializing_if = "Option::is_none")]
    pub airline_list: Option<Vec<String>>,

    #[serde(default, deserialize_with = "lenient::object", skip_serializing_if = "Option::is_none")]
    pub stops: Option<StopSelection>,
    #[serde(default, deserialize_with = "lenient::boolean", skip_serializing_if = "Option::is_none")]
    pub direct_only: Option<bool>,
    #[serde(default, deserialize_with = "lenient::integer", skip_serializing_if = "Option::is_none")]
    pub max_stops: Option<i64>,

    #[serde(default, deserialize_with = "lenient::object", skip_serializing_if = "Option::is_none")]
    pub departure_time: Option<TimeOfDaySelection>,

    #[serde(default, deserialize_with = "lenient::sort_option", skip_serializing_if = "Option::is_none")]
    pub sort_by: Option<SortOption>,

    /// When `false`, origin and destination are not pushed down to the flight source.
    #[serde(default, deserialize_with = "lenient::boolean", skip_serializing_if = "Option::is_none")]
    pub use_filter: Option<bool>,
}

impl FlightSearchRequest {
    pub fn passenger_count(&self) -> Option<u32> {
        self.passengers.as_deref().and_then(|p| p.trim().parse().ok())
    }

    pub fn applies_route_filter(&self) -> bool {
        self.use_filter != Some(false)
    }
}

/// Field deserializers that map any malformed value to `None`.
mod lenient {
    use super::SortOption;
    use serde::de::DeserializeOwned;
    use serde::{Deserialize, Deserializer};
    use serde_json::Value;
    use std::collections::HashMap;

    pub fn any<'de, D, T>(deserializer: D) -> Result<Option<T>, D::Error>
    where
        D: Deserializer<'de>,
        T: DeserializeOwned,
    {
        let value = Value::deserialize(deserializer)?;
        Ok(serde_json::from_value(value).ok())
    }

    /// Like [`any`], but only a JSON object qualifies; derived structs would
    /// otherwise also accept a positional array.
    pub fn object<'de, D, T>(deserializer: D) -> Result<Option<T>, D::Error>
    where
        D: Deserializer<'de>,
        T: DeserializeOwned,
    {
        match Value::deserialize(deserializer)? {
            value @ Value::Object(_) => Ok(serde_json::from_value(value).ok()),
            _ => Ok(None),
        }
    }

    pub fn string<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
    where
        D: Deserializer<'de>,
    {
        Ok(match Value::deserialize(deserializer)? {
            Value::String(s) => Some(s),
            Value::Number(n) => Some(n.to_string()),
            Value::Bool(b) => Some(b.to_string()),
            _ => None,
        })
    }

    pub fn number<'de, D>(deserializer: D) -> Result<Option<f64>, D::Error>
    where
        D: Deserializer<'de>,
    {
        Ok(match Value::deserialize(deserializer)? {
            Value::Number(n) => n.as_f64(),
            Value::String(s) => s.trim().parse::<f64>().ok().filter(|f| f.is_finite()),
            _ => None,
        })
    }

    pub fn integer<'de, D>(deserializer: D) -> Result<Option<i64>, D::Error>
    where
        D: Deserializer<'de>,
    {
        Ok(match Value::deserialize(deserializer)? {
            Value::Number(n) => n.as_i64().or_else(|| n.as_f64().map(|f| f.floor() as i64)),
            Value::String(s) => s.trim().parse::<i64>().ok(),
            _ => None,
        })
    }

    pub fn boolean<'de, D>(deserializer: D) -> Result<Option<bool>, D::Error>
    where
        D: Deserializer<'de>,
    {
        Ok(match Value::deserialize(deserializer)? {
            Value::Bool(b) => Some(b),
            Value::String(s) => match s.as_str() {
                "true" => Some(true),
                "false" => Some(false),
                _ => None,
            },
            _ => None,
        })
    }

    /// A bare string is a one-element list, so a single `airlineList=X`
    /// query parameter still filters.
    pub fn string_list<'de, D>(deserializer: D) -> Result<Option<Vec<String>>, D::Error>
    where
        D: Deserializer<'de>,
    {
        Ok(match Value::deserialize(deserializer)? {
            Value::String(s) => Some(vec![s]),
            value @ Value::Array(_) => serde_json::from_value(value).ok(),
            _ => None,
        })
    }

    /// Only JSON objects qualify; non-boolean entries are dropped.
    pub fn flag_map<'de, D>(deserializer: D) -> Result<Option<HashMap<String, bool>>, D::Error>
    where
        D: Deserializer<'de>,
    {
        Ok(match Value::deserialize(deserializer)? {
            Value::Object(map) => Some(
                map.into_iter()
                    .filter_map(|(key, value)| value.as_bool().map(|flag| (key, flag)))
                    .collect(),
            ),
            _ => None,
        })
    }

    pub fn sort_option<'de, D>(deserializer: D) -> Result<Option<SortOption>, D::Error>
    where
        D: Deserializer<'de>,
    {
        Ok(match Value::deserialize(deserializer)? {
            Value::String(s) => s.parse().ok(),
            _ => None,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_flight_deserialization() {
        let json = r#"
            {
                "id": "3",
                "airline": "Vistara",
                "airlineCode": "UK",
                "airlineLogo": "vistara-logo.png",
                "flightNumber": "UK789",
                "departureAirport": "DEL",
                "arrivalAirport": "MAA",
                "departureTime": "13:45",
                "arrivalTime": "16:30",
                "departureDate": "2023-12-20",
                "duration": "2h 45m",
                "durationMinutes": 165,
                "stops": 1,
                "stopLocations": ["HYD"],
                "price": 7800
            }
        "#;
        let flight: Flight = serde_json::from_str(json).expect("Failed to deserialize");
        assert_eq!(flight.flight_number, "UK789");
        assert_eq!(flight.duration_minutes, Some(165));
        assert_eq!(flight.price, 7800.0);
        assert!(flight.has_consistent_stops());
    }

    #[test]
    fn test_inconsistent_stop_locations() {
        let mut flight: Flight = serde_json::from_value(json!({
            "id": "x", "airline": "Delta", "flightNumber": "DE1000",
            "departureAirport": "JFK", "arrivalAirport": "LAX",
            "stops": 2, "stopLocations": ["ATL"], "price": 300
        }))
        .unwrap();
        assert!(!flight.has_consistent_stops());

        flight.stop_locations = None;
        assert!(flight.has_consistent_stops());
    }

    #[test]
    fn test_request_full_shape() {
        let req: FlightSearchRequest = serde_json::from_value(json!({
            "from": "DEL",
            "to": "BOM",
            "passengers": "2",
            "cabinClass": "Business",
            "tripType": "Whatever",
            "priceRange": [5000, 7000],
            "airlines": { "airIndia": true, "indigo": false },
            "stops": { "direct": true, "oneStop": false, "multiStop": false },
            "departureTime": { "morning": true, "afternoon": false, "evening": true },
            "sortBy": "PriceLowToHigh"
        }))
        .unwrap();

        assert_eq!(req.passenger_count(), Some(2));
        assert_eq!(req.cabin_class, Some(CabinClass::Business));
        assert_eq!(req.trip_type, Some(TripType::Other("Whatever".to_string())));
        assert_eq!(req.price_range, Some((5000.0, 7000.0)));
        assert_eq!(req.airlines.as_ref().and_then(|m| m.get("indigo")), Some(&false));
        assert_eq!(
            req.stops,
            Some(StopSelection { direct: true, one_stop: false, multi_stop: false })
        );
        assert_eq!(req.sort_by, Some(SortOption::PriceLowToHigh));
        assert!(req.applies_route_filter());
    }

    #[test]
    fn test_malformed_fields_read_as_absent() {
        let req: FlightSearchRequest = serde_json::from_value(json!({
            "priceRange": [100, 200, 300],
            "minPrice": "abc",
            "maxPrice": "900",
            "airlines": ["Delta"],
            "airlineList": [1, 2],
            "stops": "direct",
            "directOnly": 1,
            "maxStops": "two",
            "departureTime": [true, false, true],
            "sortBy": "Cheapest",
            "useFilter": "false"
        }))
        .expect("malformed fields must not reject the request");

        assert_eq!(req.price_range, None);
        assert_eq!(req.min_price, None);
        assert_eq!(req.max_price, Some(900.0));
        assert_eq!(req.airlines, None);
        assert_eq!(req.airline_list, None);
        assert_eq!(req.stops, None);
        assert_eq!(req.direct_only, None);
        assert_eq!(req.max_stops, None);
        assert_eq!(req.departure_time, None);
        assert_eq!(req.sort_by, None);
        assert!(!req.applies_route_filter());
    }

    #[test]
    fn test_single_airline_reads_as_list() {
        let req: FlightSearchRequest = serde_json::from_value(json!({ "airlineList": "Vistara" })).unwrap();
        assert_eq!(req.airline_list, Some(vec!["Vistara".to_string()]));

        let req: FlightSearchRequest =
            serde_json::from_value(json!({ "airlineList": ["Vistara", "IndiGo"] })).unwrap();
        assert_eq!(req.airline_list.map(|l| l.len()), Some(2));
    }

    #[test]
    fn test_cabin_class_round_trips_as_plain_string() {
        assert_eq!(serde_json::to_value(CabinClass::FirstClass).unwrap(), json!("FirstClass"));
        assert_eq!(
            serde_json::to_value(CabinClass::Other("Premium".into())).unwrap(),
            json!("Premium")
        );
    }
}
