//! In-process repositories used when no database is configured.

use async_trait::async_trait;
use chrono::Utc;
use std::sync::atomic::{AtomicU32, Ordering};
use tokio::sync::RwLock;
use uuid::Uuid;

use skyfare_core::booking::{Booking, City};
use skyfare_core::identity::{CreateUser, UpdateUser, User};
use skyfare_core::repository::{BookingRepository, CityRepository, FlightSource, UserRepository};
use skyfare_core::{CoreResult, Flight};

pub struct InMemoryFlights {
    flights: RwLock<Vec<Flight>>,
}

impl InMemoryFlights {
    pub fn new(flights: Vec<Flight>) -> Self {
        Self { flights: RwLock::new(flights) }
    }
}

#[async_trait]
impl FlightSource for InMemoryFlights {
    async fn fetch_flights(
        &self,
        origin: Option<&str>,
        destination: Option<&str>,
    ) -> CoreResult<Vec<Flight>> {
        let flights = self.flights.read().await;
        Ok(flights
            .iter()
            .filter(|f| origin.map_or(true, |o| f.departure_airport == o))
            .filter(|f| destination.map_or(true, |d| f.arrival_airport == d))
            .cloned()
            .collect())
    }

    async fn get_flight(&self, id: &str) -> CoreResult<Option<Flight>> {
        Ok(self.flights.read().await.iter().find(|f| f.id == id).cloned())
    }

    async fn find_return_flight(&self, from: &str, to: &str) -> CoreResult<Option<Flight>> {
        Ok(self
            .flights
            .read()
            .await
            .iter()
            .find(|f| f.departure_airport == from && f.arrival_airport == to)
            .cloned())
    }
}

#[derive(Default)]
pub struct InMemoryBookings {
    bookings: RwLock<Vec<Booking>>,
    sequence: AtomicU32,
}

#[async_trait]
impl BookingRepository for InMemoryBookings {
    async fn next_sequence(&self) -> CoreResult<u32> {
        Ok(self.sequence.fetch_add(1, Ordering::SeqCst) + 1)
    }

    async fn create_booking(&self, booking: &Booking) -> CoreResult<Booking> {
        self.bookings.write().await.push(booking.clone());
        Ok(booking.clone())
    }

    async fn find_user_bookings(&self, user_id: &str) -> CoreResult<Vec<Booking>> {
        let bookings = self.bookings.read().await;
        let mut found: Vec<Booking> = bookings.iter().filter(|b| b.user_id == user_id).cloned().collect();
        found.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(found)
    }

    async fn find_booking_by_id(&self, booking_id: &str, user_id: &str) -> CoreResult<Option<Booking>> {
        Ok(self
            .bookings
            .read()
            .await
            .iter()
            .find(|b| b.booking_id == booking_id && b.user_id == user_id)
            .cloned())
    }
}

pub struct InMemoryCities {
    cities: Vec<City>,
}

impl InMemoryCities {
    pub fn new(cities: Vec<City>) -> Self {
        Self { cities }
    }
}

#[async_trait]
impl CityRepository for InMemoryCities {
    async fn list_cities(&self) -> CoreResult<Vec<City>> {
        Ok(self.cities.clone())
    }
}

#[derive(Default)]
pub struct InMemoryUsers {
    users: RwLock<Vec<User>>,
}

#[async_trait]
impl UserRepository for InMemoryUsers {
    async fn find_all(&self) -> CoreResult<Vec<User>> {
        Ok(self.users.read().await.clone())
    }

    async fn find_by_id(&self, id: &str) -> CoreResult<Option<User>> {
        Ok(self.users.read().await.iter().find(|u| u.id == id).cloned())
    }

    async fn find_by_email(&self, email: &str) -> CoreResult<Option<User>> {
        Ok(self
            .users
            .read()
            .await
            .iter()
            .find(|u| u.email.eq_ignore_ascii_case(email))
            .cloned())
    }

    async fn create(&self, user: &CreateUser) -> CoreResult<User> {
        let now = Utc::now();
        let created = User {
            id: Uuid::new_v4().to_string(),
            email: user.email.clone(),
            first_name: user.first_name.clone(),
            last_name: user.last_name.clone(),
            role: user.role.unwrap_or_default(),
            created_at: now,
            updated_at: now,
        };
        self.users.write().await.push(created.clone());
        Ok(created)
    }

    async fn update(&self, id: &str, changes: &UpdateUser) -> CoreResult<Option<User>> {
        let mut users = self.users.write().await;
        let Some(user) = users.iter_mut().find(|u| u.id == id) else {
            return Ok(None);
        };
        if let Some(first_name) = &changes.first_name {
            user.first_name = first_name.clone();
        }
        if let Some(last_name) = &changes.last_name {
            user.last_name = last_name.clone();
        }
        if let Some(role) = changes.role {
            user.role = role;
        }
        user.updated_at = Utc::now();
        Ok(Some(user.clone()))
    }

    async fn delete(&self, id: &str) -> CoreResult<bool> {
        let mut users = self.users.write().await;
        let before = users.len();
        users.retain(|u| u.id != id);
        Ok(users.len() != before)
    }
}
