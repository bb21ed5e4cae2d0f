use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::types::Json;
use sqlx::PgPool;

use skyfare_core::booking::{Booking, BookingStatus, PassengerDetails, StoredPayment};
use skyfare_core::repository::BookingRepository;
use skyfare_core::{CabinClass, CoreError, CoreResult, Flight, TripType};

use crate::database::storage_error;

const BOOKING_COLUMNS: &str = r#"
    id, booking_id, user_id, flight_id, booking_date, departure_date, total_price, price,
    from_airport, to_airport, departure_time, arrival_time, duration, stops, airline,
    flight_number, cabin_class, trip_type, passengers, status, passenger_details,
    payment_details, flight_details, return_flight_id, return_departure_date,
    return_departure_time, return_arrival_time, created_at
"#;

// Internal row type for type-safe querying
#[derive(sqlx::FromRow)]
struct BookingRow {
    id: String,
    booking_id: String,
    user_id: String,
    flight_id: String,
    booking_date: DateTime<Utc>,
    departure_date: String,
    total_price: f64,
    price: f64,
    from_airport: String,
    to_airport: String,
    departure_time: String,
    arrival_time: String,
    duration: String,
    stops: i32,
    airline: String,
    flight_number: String,
    cabin_class: String,
    trip_type: String,
    passengers: i32,
    status: String,
    passenger_details: Json<Vec<PassengerDetails>>,
    payment_details: Option<Json<StoredPayment>>,
    flight_details: Json<Flight>,
    return_flight_id: Option<String>,
    return_departure_date: Option<String>,
    return_departure_time: Option<String>,
    return_arrival_time: Option<String>,
    created_at: DateTime<Utc>,
}

impl TryFrom<BookingRow> for Booking {
    type Error = CoreError;

    fn try_from(row: BookingRow) -> Result<Self, Self::Error> {
        let passengers = u32::try_from(row.passengers)
            .map_err(|_| CoreError::StorageError(format!("negative passenger count on {}", row.booking_id)))?;
        let status = row.status.parse::<BookingStatus>()?;

        Ok(Booking {
            id: row.id,
            booking_id: row.booking_id,
            user_id: row.user_id,
            flight_id: row.flight_id,
            booking_date: row.booking_date,
            departure_date: row.departure_date,
            total_price: row.total_price,
            price: row.price,
            from: row.from_airport,
            to: row.to_airport,
            departure_time: row.departure_time,
            arrival_time: row.arrival_time,
            duration: row.duration,
            stops: u32::try_from(row.stops).unwrap_or(0),
            airline: row.airline,
            flight_number: row.flight_number,
            cabin_class: CabinClass::from(row.cabin_class),
            trip_type: TripType::from(row.trip_type),
            passengers,
            status,
            passenger_details: row.passenger_details.0,
            payment_details: row.payment_details.map(|p| p.0),
            flight_details: row.flight_details.0,
            return_flight_id: row.return_flight_id,
            return_departure_date: row.return_departure_date,
            return_departure_time: row.return_departure_time,
            return_arrival_time: row.return_arrival_time,
            created_at: row.created_at,
        })
    }
}

pub struct PostgresBookingRepository {
    pool: PgPool,
}

impl PostgresBookingRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl BookingRepository for PostgresBookingRepository {
    async fn next_sequence(&self) -> CoreResult<u32> {
        let value: i64 = sqlx::query_scalar("SELECT nextval('booking_sequence')")
            .fetch_one(&self.pool)
            .await
            .map_err(storage_error)?;

        u32::try_from(value).map_err(|_| CoreError::StorageError("booking sequence exhausted".to_string()))
    }

    async fn create_booking(&self, booking: &Booking) -> CoreResult<Booking> {
        let sql = format!(
            "INSERT INTO bookings ({columns}) VALUES \
             ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13, $14, \
              $15, $16, $17, $18, $19, $20, $21, $22, $23, $24, $25, $26, $27, $28) \
             RETURNING {columns}",
            columns = BOOKING_COLUMNS
        );

        let row = sqlx::query_as::<_, BookingRow>(&sql)
            .bind(&booking.id)
            .bind(&booking.booking_id)
            .bind(&booking.user_id)
            .bind(&booking.flight_id)
            .bind(booking.booking_date)
            .bind(&booking.departure_date)
            .bind(booking.total_price)
            .bind(booking.price)
            .bind(&booking.from)
            .bind(&booking.to)
            .bind(&booking.departure_time)
            .bind(&booking.arrival_time)
            .bind(&booking.duration)
            .bind(booking.stops as i32)
            .bind(&booking.airline)
            .bind(&booking.flight_number)
            .bind(booking.cabin_class.as_str())
            .bind(booking.trip_type.as_str())
            .bind(booking.passengers as i32)
            .bind(booking.status.as_str())
            .bind(Json(&booking.passenger_details))
            .bind(booking.payment_details.as_ref().map(Json))
            .bind(Json(&booking.flight_details))
            .bind(&booking.return_flight_id)
            .bind(&booking.return_departure_date)
            .bind(&booking.return_departure_time)
            .bind(&booking.return_arrival_time)
            .bind(booking.created_at)
            .fetch_one(&self.pool)
            .await
            .map_err(storage_error)?;

        Booking::try_from(row)
    }

    async fn find_user_bookings(&self, user_id: &str) -> CoreResult<Vec<Booking>> {
        let sql = format!(
            "SELECT {} FROM bookings WHERE user_id = $1 ORDER BY created_at DESC",
            BOOKING_COLUMNS
        );
        let rows = sqlx::query_as::<_, BookingRow>(&sql)
            .bind(user_id)
            .fetch_all(&self.pool)
            .await
            .map_err(storage_error)?;

        rows.into_iter().map(Booking::try_from).collect()
    }

    async fn find_booking_by_id(
        &self,
        booking_id: &str,
        user_id: &str,
    ) -> CoreResult<Option<Booking>> {
        let sql = format!(
            "SELECT {} FROM bookings WHERE booking_id = $1 AND user_id = $2",
            BOOKING_COLUMNS
        );
        let row = sqlx::query_as::<_, BookingRow>(&sql)
            .bind(booking_id)
            .bind(user_id)
            .fetch_optional(&self.pool)
            .await
            .map_err(storage_error)?;

        row.map(Booking::try_from).transpose()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fixtures;

    fn row(passengers: i32) -> BookingRow {
        let flight = fixtures::public_flights().remove(0);
        let now = Utc::now();
        BookingRow {
            id: "b1".into(),
            booking_id: "FLT-20231201-0001".into(),
            user_id: "u1".into(),
            flight_id: flight.id.clone(),
            booking_date: now,
            departure_date: "2023-12-01".into(),
            total_price: 11000.0,
            price: 5500.0,
            from_airport: "DEL".into(),
            to_airport: "BOM".into(),
            departure_time: flight.departure_time.clone(),
            arrival_time: flight.arrival_time.clone(),
            duration: flight.duration.clone(),
            stops: 0,
            airline: flight.airline.clone(),
            flight_number: flight.flight_number.clone(),
            cabin_class: "Economy".into(),
            trip_type: "OneWay".into(),
            passengers,
            status: "Confirmed".into(),
            passenger_details: Json(Vec::new()),
            payment_details: None,
            flight_details: Json(flight),
            return_flight_id: None,
            return_departure_date: None,
            return_departure_time: None,
            return_arrival_time: None,
            created_at: now,
        }
    }

    #[test]
    fn test_row_converts_to_booking() {
        let booking = Booking::try_from(row(2)).unwrap();
        assert_eq!(booking.booking_id, "FLT-20231201-0001");
        assert_eq!(booking.passengers, 2);
        assert_eq!(booking.status, BookingStatus::Confirmed);
        assert_eq!(booking.from, "DEL");
    }

    #[test]
    fn test_negative_passenger_count_names_the_booking() {
        match Booking::try_from(row(-1)) {
            Err(CoreError::StorageError(msg)) => assert!(msg.contains("FLT-20231201-0001")),
            other => panic!("unexpected result: {:?}", other.map(|b| b.booking_id)),
        }
    }
}
