//! Seed data for the in-memory store and the demo endpoints.

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use skyfare_core::booking::City;
use skyfare_core::Flight;

const DEMO_AIRLINES: [(&str, &str); 5] = [
    ("Delta", "https://placehold.co/30x30?text=DL"),
    ("United", "https://placehold.co/30x30?text=UA"),
    ("American", "https://placehold.co/30x30?text=AA"),
    ("Spirit", "https://placehold.co/30x30?text=NK"),
    ("JetBlue", "https://placehold.co/30x30?text=B6"),
];

const STOP_LOCATIONS: [&str; 10] = ["ATL", "ORD", "DFW", "DEN", "LAX", "JFK", "MIA", "SFO", "CLT", "LAS"];

#[allow(clippy::too_many_arguments)]
fn flight(
    id: &str,
    destination: &str,
    price: f64,
    airline: (&str, &str, &str),
    flight_number: &str,
    route: (&str, &str),
    times: (&str, &str, &str),
    duration_minutes: u32,
    stop_locations: Vec<&str>,
) -> Flight {
    let (name, code, logo) = airline;
    let (departure_date, departure_time, arrival_time) = times;
    Flight {
        id: id.to_string(),
        airline: name.to_string(),
        airline_code: code.to_string(),
        airline_logo: logo.to_string(),
        flight_number: flight_number.to_string(),
        departure_airport: route.0.to_string(),
        arrival_airport: route.1.to_string(),
        departure_date: departure_date.to_string(),
        departure_time: departure_time.to_string(),
        arrival_time: arrival_time.to_string(),
        duration: format_duration(duration_minutes),
        duration_minutes: Some(duration_minutes),
        stops: stop_locations.len() as u32,
        stop_locations: if stop_locations.is_empty() {
            None
        } else {
            Some(stop_locations.into_iter().map(String::from).collect())
        },
        price,
        destination: Some(destination.to_string()),
    }
}

/// Flights served without authentication.
pub fn public_flights() -> Vec<Flight> {
    vec![
        flight(
            "1",
            "Mumbai",
            5500.0,
            ("Air India", "AI", "air-india-logo.png"),
            "AI202",
            ("DEL", "BOM"),
            ("2023-12-01", "08:00", "10:15"),
            135,
            vec![],
        ),
        flight(
            "2",
            "Bengaluru",
            6200.0,
            ("IndiGo", "6E", "indigo-logo.png"),
            "6E345",
            ("DEL", "BLR"),
            ("2023-12-15", "19:00", "21:45"),
            165,
            vec![],
        ),
        flight(
            "3",
            "Chennai",
            7800.0,
            ("Vistara", "UK", "vistara-logo.png"),
            "UK789",
            ("DEL", "MAA"),
            ("2023-12-20", "13:45", "16:30"),
            165,
            vec!["HYD"],
        ),
    ]
}

pub fn indian_cities() -> Vec<City> {
    [
        ("DEL", "New Delhi", "Indira Gandhi International Airport"),
        ("BOM", "Mumbai", "Chhatrapati Shivaji Maharaj International Airport"),
        ("MAA", "Chennai", "Chennai International Airport"),
        ("BLR", "Bengaluru", "Kempegowda International Airport"),
        ("CCU", "Kolkata", "Netaji Subhas Chandra Bose International Airport"),
        ("HYD", "Hyderabad", "Rajiv Gandhi International Airport"),
        ("COK", "Kochi", "Cochin International Airport"),
        ("GOI", "Goa", "Dabolim Airport"),
        ("JAI", "Jaipur", "Jaipur International Airport"),
        ("AMD", "Ahmedabad", "Sardar Vallabhbhai Patel International Airport"),
    ]
    .into_iter()
    .map(|(code, name, airport)| City {
        code: code.to_string(),
        name: name.to_string(),
        airport: airport.to_string(),
    })
    .collect()
}

/// `2h 15m`
pub fn format_duration(minutes: u32) -> String {
    format!("{}h {}m", minutes / 60, minutes % 60)
}

/// Deterministic demo flights for a route.
///
/// Same seed, same flights. Ids are `flight-<route>-<n>` so several routes can
/// share one store.
pub fn generate_flights(from: &str, to: &str, date: &str, count: usize, rng: &mut StdRng) -> Vec<Flight> {
    (0..count)
        .map(|i| {
            let (name, logo) = DEMO_AIRLINES[rng.gen_range(0..DEMO_AIRLINES.len())];
            let airline_code: String = name.chars().take(2).collect::<String>().to_uppercase();
            let flight_number = format!("{}{}", airline_code, rng.gen_range(1000..2000));

            let duration_minutes: u32 = rng.gen_range(60..300);
            let (hours, minutes) = (duration_minutes / 60, duration_minutes % 60);

            let departure_hour: u32 = rng.gen_range(4..24);
            let departure_minute: u32 = rng.gen_range(0..60);
            let carry = u32::from(departure_minute + minutes >= 60);
            let arrival_hour = (departure_hour + hours + carry) % 24;
            let arrival_minute = (departure_minute + minutes) % 60;

            let stops: usize = rng.gen_range(0..3);
            let price = f64::from(rng.gen_range(200u32..800));

            Flight {
                id: format!("flight-{}{}-{}", from, to, i),
                airline: name.to_string(),
                airline_code: airline_code.clone(),
                airline_logo: logo.to_string(),
                flight_number,
                departure_airport: from.to_string(),
                arrival_airport: to.to_string(),
                departure_date: date.to_string(),
                departure_time: format!("{:02}:{:02}", departure_hour, departure_minute),
                arrival_time: format!("{:02}:{:02}", arrival_hour, arrival_minute),
                duration: format_duration(duration_minutes),
                duration_minutes: Some(duration_minutes),
                stops: stops as u32,
                stop_locations: Some(STOP_LOCATIONS[..stops].iter().map(|s| s.to_string()).collect()),
                price,
                destination: Some(to.to_string()),
            }
        })
        .collect()
}

pub fn seeded_rng(seed: u64) -> StdRng {
    StdRng::seed_from_u64(seed)
}
