use async_trait::async_trait;
use sqlx::PgPool;

use skyfare_core::booking::City;
use skyfare_core::repository::{CityRepository, FlightSource};
use skyfare_core::{CoreResult, Flight};

use crate::database::storage_error;

const FLIGHT_COLUMNS: &str = r#"
    id, airline, airline_code, airline_logo, flight_number,
    departure_airport, arrival_airport, departure_date, departure_time, arrival_time,
    duration, duration_minutes, stops, stop_locations, price, destination
"#;

#[derive(sqlx::FromRow)]
struct FlightRow {
    id: String,
    airline: String,
    airline_code: Option<String>,
    airline_logo: Option<String>,
    flight_number: String,
    departure_airport: String,
    arrival_airport: String,
    departure_date: Option<String>,
    departure_time: Option<String>,
    arrival_time: Option<String>,
    duration: Option<String>,
    duration_minutes: Option<i32>,
    stops: i32,
    stop_locations: Option<Vec<String>>,
    price: f64,
    destination: Option<String>,
}

impl From<FlightRow> for Flight {
    fn from(row: FlightRow) -> Self {
        Flight {
            id: row.id,
            airline: row.airline,
            airline_code: row.airline_code.unwrap_or_default(),
            airline_logo: row.airline_logo.unwrap_or_default(),
            flight_number: row.flight_number,
            departure_airport: row.departure_airport,
            arrival_airport: row.arrival_airport,
            departure_date: row.departure_date.unwrap_or_default(),
            departure_time: row.departure_time.unwrap_or_default(),
            arrival_time: row.arrival_time.unwrap_or_default(),
            duration: row.duration.unwrap_or_default(),
            duration_minutes: row.duration_minutes.and_then(|m| u32::try_from(m).ok()),
            stops: u32::try_from(row.stops).unwrap_or(0),
            stop_locations: row.stop_locations,
            price: row.price,
            destination: row.destination,
        }
    }
}

pub struct PostgresFlightRepository {
    pool: PgPool,
}

impl PostgresFlightRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl FlightSource for PostgresFlightRepository {
    async fn fetch_flights(
        &self,
        origin: Option<&str>,
        destination: Option<&str>,
    ) -> CoreResult<Vec<Flight>> {
        let sql = format!(
            "SELECT {} FROM flights \
             WHERE ($1::text IS NULL OR departure_airport = $1) \
               AND ($2::text IS NULL OR arrival_airport = $2) \
             ORDER BY id",
            FLIGHT_COLUMNS
        );
        let rows = sqlx::query_as::<_, FlightRow>(&sql)
            .bind(origin)
            .bind(destination)
            .fetch_all(&self.pool)
            .await
            .map_err(storage_error)?;

        Ok(rows.into_iter().map(Flight::from).collect())
    }

    async fn get_flight(&self, id: &str) -> CoreResult<Option<Flight>> {
        let sql = format!("SELECT {} FROM flights WHERE id = $1", FLIGHT_COLUMNS);
        let row = sqlx::query_as::<_, FlightRow>(&sql)
            .bind(id)
            .fetch_optional(&self.pool)
            .await
            .map_err(storage_error)?;

        Ok(row.map(Flight::from))
    }

    async fn find_return_flight(&self, from: &str, to: &str) -> CoreResult<Option<Flight>> {
        let sql = format!(
            "SELECT {} FROM flights WHERE departure_airport = $1 AND arrival_airport = $2 ORDER BY id LIMIT 1",
            FLIGHT_COLUMNS
        );
        let row = sqlx::query_as::<_, FlightRow>(&sql)
            .bind(from)
            .bind(to)
            .fetch_optional(&self.pool)
            .await
            .map_err(storage_error)?;

        Ok(row.map(Flight::from))
    }
}

#[derive(sqlx::FromRow)]
struct CityRow {
    code: String,
    name: String,
    airport: String,
}

pub struct PostgresCityRepository {
    pool: PgPool,
}

impl PostgresCityRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl CityRepository for PostgresCityRepository {
    async fn list_cities(&self) -> CoreResult<Vec<City>> {
        let rows = sqlx::query_as::<_, CityRow>("SELECT code, name, airport FROM cities ORDER BY position, code")
            .fetch_all(&self.pool)
            .await
            .map_err(storage_error)?;

        Ok(rows
            .into_iter()
            .map(|row| City { code: row.code, name: row.name, airport: row.airport })
            .collect())
    }
}
