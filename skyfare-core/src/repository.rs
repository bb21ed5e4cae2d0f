use async_trait::async_trait;

use crate::booking::{Booking, City};
use crate::identity::{CreateUser, UpdateUser, User};
use crate::search::Flight;
use crate::CoreResult;

/// Source of flight records for search and booking
#[async_trait]
pub trait FlightSource: Send + Sync {
    /// Flights, optionally restricted to an exact origin and/or destination code.
    async fn fetch_flights(
        &self,
        origin: Option<&str>,
        destination: Option<&str>,
    ) -> CoreResult<Vec<Flight>>;

    async fn get_flight(&self, id: &str) -> CoreResult<Option<Flight>>;

    /// Any flight flying `from` -> `to`; used to price the return leg of a round trip.
    async fn find_return_flight(&self, from: &str, to: &str) -> CoreResult<Option<Flight>>;
}

/// Repository trait for booking records
#[async_trait]
pub trait BookingRepository: Send + Sync {
    /// Monotonic counter feeding the `FLT-YYYYMMDD-NNNN` reference.
    async fn next_sequence(&self) -> CoreResult<u32>;

    async fn create_booking(&self, booking: &Booking) -> CoreResult<Booking>;

    async fn find_user_bookings(&self, user_id: &str) -> CoreResult<Vec<Booking>>;

    async fn find_booking_by_id(
        &self,
        booking_id: &str,
        user_id: &str,
    ) -> CoreResult<Option<Booking>>;
}

#[async_trait]
pub trait CityRepository: Send + Sync {
    async fn list_cities(&self) -> CoreResult<Vec<City>>;
}

/// Repository trait for user profiles
#[async_trait]
pub trait UserRepository: Send + Sync {
    async fn find_all(&self) -> CoreResult<Vec<User>>;

    async fn find_by_id(&self, id: &str) -> CoreResult<Option<User>>;

    async fn find_by_email(&self, email: &str) -> CoreResult<Option<User>>;

    async fn create(&self, user: &CreateUser) -> CoreResult<User>;

    async fn update(&self, id: &str, changes: &UpdateUser) -> CoreResult<Option<User>>;

    /// `false` when no such user existed.
    async fn delete(&self, id: &str) -> CoreResult<bool>;
}
