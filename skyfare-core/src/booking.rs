use std::sync::Arc;

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use skyfare_shared::pii::{mask_card_number, Masked};
use uuid::Uuid;

use crate::identity::AuthenticatedUser;
use crate::repository::{BookingRepository, FlightSource};
use crate::search::{CabinClass, Flight, TripType};
use crate::{CoreError, CoreResult};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct City {
    pub code: String,
    pub name: String,
    pub airport: String,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum BookingStatus {
    #[default]
    Confirmed,
    Pending,
    Cancelled,
}

impl BookingStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            BookingStatus::Confirmed => "Confirmed",
            BookingStatus::Pending => "Pending",
            BookingStatus::Cancelled => "Cancelled",
        }
    }
}

impl std::str::FromStr for BookingStatus {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "Confirmed" => Ok(BookingStatus::Confirmed),
            "Pending" => Ok(BookingStatus::Pending),
            "Cancelled" => Ok(BookingStatus::Cancelled),
            other => Err(CoreError::InternalError(format!("unknown booking status: {}", other))),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PassengerDetails {
    pub full_name: String,
    pub phone_number: Masked<String>,
    pub id_number: Masked<String>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PaymentDetails {
    pub card_number: Masked<String>,
    pub expiry_date: String,
    pub cvv: Masked<String>,
    pub name_on_card: String,
}

/// Payment data as it is kept on a booking: card number reduced to its last
/// four digits and the CVV replaced by its SHA-256 digest.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StoredPayment {
    pub card_number: String,
    pub expiry_date: String,
    pub cvv_hash: String,
    pub name_on_card: String,
}

impl From<&PaymentDetails> for StoredPayment {
    fn from(payment: &PaymentDetails) -> Self {
        Self {
            card_number: mask_card_number(payment.card_number.inner()),
            expiry_date: payment.expiry_date.clone(),
            cvv_hash: hash_sensitive_data(payment.cvv.inner()),
            name_on_card: payment.name_on_card.clone(),
        }
    }
}

/// Hex-encoded SHA-256 digest.
pub fn hash_sensitive_data(data: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(data.as_bytes());
    format!("{:x}", hasher.finalize())
}

/// Body of a booking request.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BookingRequest {
    pub departure_date: String,
    #[serde(default)]
    pub return_date: Option<String>,
    pub from: String,
    pub to: String,
    pub passengers: u32,
    #[serde(default)]
    pub cabin_class: Option<CabinClass>,
    #[serde(default)]
    pub trip_type: Option<TripType>,
    pub flight_id: String,
    #[serde(default)]
    pub passenger_details: Vec<PassengerDetails>,
    #[serde(default)]
    pub payment_details: Option<PaymentDetails>,
}

impl BookingRequest {
    pub fn validate(&self) -> CoreResult<()> {
        if self.flight_id.trim().is_empty() {
            return Err(CoreError::ValidationError("flightId is required".to_string()));
        }
        if self.from.trim().is_empty() || self.to.trim().is_empty() {
            return Err(CoreError::ValidationError("from and to are required".to_string()));
        }
        if self.passengers == 0 {
            return Err(CoreError::ValidationError("passengers must be at least 1".to_string()));
        }
        if !is_date_string(&self.departure_date) {
            return Err(CoreError::ValidationError(format!(
                "departureDate is not a valid date: {}",
                self.departure_date
            )));
        }
        if let Some(date) = &self.return_date {
            if !is_date_string(date) {
                return Err(CoreError::ValidationError(format!(
                    "returnDate is not a valid date: {}",
                    date
                )));
            }
        }
        if let Some(CabinClass::Other(value)) = &self.cabin_class {
            return Err(CoreError::ValidationError(format!("Invalid cabin class: {}", value)));
        }
        if let Some(TripType::Other(value)) = &self.trip_type {
            return Err(CoreError::ValidationError(format!("Invalid trip type: {}", value)));
        }
        Ok(())
    }

    pub fn is_round_trip(&self) -> bool {
        self.trip_type == Some(TripType::RoundTrip) && self.return_date.is_some()
    }
}

fn is_date_string(value: &str) -> bool {
    NaiveDate::parse_from_str(value, "%Y-%m-%d").is_ok() || DateTime::parse_from_rfc3339(value).is_ok()
}

/// `FLT-YYYYMMDD-NNNN`
pub fn booking_reference(date: NaiveDate, sequence: u32) -> String {
    format!("FLT-{}-{:04}", date.format("%Y%m%d"), sequence)
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Booking {
    pub id: String,
    pub booking_id: String,
    pub user_id: String,
    pub flight_id: String,
    pub booking_date: DateTime<Utc>,
    pub departure_date: String,
    pub total_price: f64,
    pub price: f64,
    pub from: String,
    pub to: String,
    pub departure_time: String,
    pub arrival_time: String,
    pub duration: String,
    pub stops: u32,
    pub airline: String,
    pub flight_number: String,
    pub cabin_class: CabinClass,
    pub trip_type: TripType,
    pub passengers: u32,
    pub status: BookingStatus,
    pub passenger_details: Vec<PassengerDetails>,
    pub payment_details: Option<StoredPayment>,
    pub flight_details: Flight,
    pub return_flight_id: Option<String>,
    pub return_departure_date: Option<String>,
    pub return_departure_time: Option<String>,
    pub return_arrival_time: Option<String>,
    pub created_at: DateTime<Utc>,
}

impl Booking {
    /// Build the booking record for `request` against the resolved flights.
    pub fn assemble(
        request: &BookingRequest,
        user_id: &str,
        outbound: &Flight,
        return_flight: Option<&Flight>,
        booking_id: String,
        now: DateTime<Utc>,
    ) -> Self {
        let return_price = return_flight.map(|f| f.price).unwrap_or(0.0);
        let total_price = (outbound.price + return_price) * f64::from(request.passengers);

        Self {
            id: Uuid::new_v4().to_string(),
            booking_id,
            user_id: user_id.to_string(),
            flight_id: outbound.id.clone(),
            booking_date: now,
            departure_date: request.departure_date.clone(),
            total_price,
            price: outbound.price,
            from: request.from.clone(),
            to: request.to.clone(),
            departure_time: outbound.departure_time.clone(),
            arrival_time: outbound.arrival_time.clone(),
            duration: outbound.duration.clone(),
            stops: outbound.stops,
            airline: outbound.airline.clone(),
            flight_number: outbound.flight_number.clone(),
            cabin_class: request.cabin_class.clone().unwrap_or(CabinClass::Economy),
            trip_type: request.trip_type.clone().unwrap_or(TripType::OneWay),
            passengers: request.passengers,
            status: BookingStatus::Confirmed,
            passenger_details: request.passenger_details.clone(),
            payment_details: request.payment_details.as_ref().map(StoredPayment::from),
            flight_details: outbound.clone(),
            return_flight_id: return_flight.map(|f| f.id.clone()),
            return_departure_date: request.return_date.clone(),
            return_departure_time: return_flight.map(|f| f.departure_time.clone()),
            return_arrival_time: return_flight.map(|f| f.arrival_time.clone()),
            created_at: now,
        }
    }
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TicketFlightDetails {
    pub airline: String,
    pub flight_number: String,
    pub from: String,
    pub to: String,
    pub departure_date: String,
    pub departure_time: String,
    pub arrival_time: String,
    pub cabin: CabinClass,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BoardingInstructions {
    pub check_in_time: String,
    pub boarding_gate: String,
    pub baggage_allowance: String,
    pub boarding_time: String,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TicketDetails {
    pub ticket_number: String,
    pub booking_id: String,
    pub booking_date: DateTime<Utc>,
    pub passenger_details: Vec<PassengerDetails>,
    pub flight_details: TicketFlightDetails,
    pub boarding_instructions: BoardingInstructions,
    pub qr_code: String,
    pub status: BookingStatus,
}

impl TicketDetails {
    pub fn from_booking(booking: &Booking) -> Self {
        let baggage = if booking.cabin_class == CabinClass::Economy { "15kg" } else { "30kg" };

        Self {
            ticket_number: format!("TKT-{}", booking.booking_id),
            booking_id: booking.booking_id.clone(),
            booking_date: booking.booking_date,
            passenger_details: booking.passenger_details.clone(),
            flight_details: TicketFlightDetails {
                airline: booking.airline.clone(),
                flight_number: booking.flight_number.clone(),
                from: booking.from.clone(),
                to: booking.to.clone(),
                departure_date: booking.departure_date.clone(),
                departure_time: booking.departure_time.clone(),
                arrival_time: booking.arrival_time.clone(),
                cabin: booking.cabin_class.clone(),
            },
            boarding_instructions: BoardingInstructions {
                check_in_time: "2 hours before departure".to_string(),
                boarding_gate: "To be announced".to_string(),
                baggage_allowance: baggage.to_string(),
                boarding_time: "30 minutes before departure".to_string(),
            },
            qr_code: format!(
                "https://api.qrserver.com/v1/create-qr-code/?size=150x150&data={}",
                booking.booking_id
            ),
            status: booking.status,
        }
    }
}

/// Booking creation and lookup on behalf of an authenticated caller.
#[derive(Clone)]
pub struct BookingService {
    flights: Arc<dyn FlightSource>,
    bookings: Arc<dyn BookingRepository>,
}

impl BookingService {
    pub fn new(flights: Arc<dyn FlightSource>, bookings: Arc<dyn BookingRepository>) -> Self {
        Self { flights, bookings }
    }

    pub async fn book(&self, request: BookingRequest, caller: &AuthenticatedUser) -> CoreResult<Booking> {
        request.validate()?;

        let outbound = self
            .flights
            .get_flight(&request.flight_id)
            .await?
            .ok_or_else(|| CoreError::NotFound(format!("Flight {} not found", request.flight_id)))?;

        let return_flight = if request.is_round_trip() {
            // a missing or failing return lookup books the outbound leg only
            match self.flights.find_return_flight(&request.to, &request.from).await {
                Ok(flight) => flight,
                Err(e) => {
                    tracing::warn!("Return flight lookup failed: {}", e);
                    None
                }
            }
        } else {
            None
        };

        let now = Utc::now();
        let sequence = self.bookings.next_sequence().await?;
        let reference = booking_reference(now.date_naive(), sequence);
        let booking = Booking::assemble(&request, &caller.id, &outbound, return_flight.as_ref(), reference, now);

        let saved = self.bookings.create_booking(&booking).await?;
        tracing::info!(
            booking_id = %saved.booking_id,
            user_id = %caller.id,
            email = %Masked(&caller.email),
            flight_id = %saved.flight_id,
            total_price = saved.total_price,
            "booking confirmed"
        );
        Ok(saved)
    }

    /// Bookings of `target` (the caller when `None`); other users need admin.
    pub async fn user_bookings(
        &self,
        caller: &AuthenticatedUser,
        target: Option<&str>,
    ) -> CoreResult<Vec<Booking>> {
        let user_id = target.unwrap_or(&caller.id);
        if !caller.can_access(user_id) {
            return Err(CoreError::Forbidden("You can only view your own bookings".to_string()));
        }
        self.bookings.find_user_bookings(user_id).await
    }

    pub async fn booking(&self, caller: &AuthenticatedUser, booking_id: &str) -> CoreResult<Booking> {
        self.bookings
            .find_booking_by_id(booking_id, &caller.id)
            .await?
            .ok_or_else(|| CoreError::NotFound("Booking not found".to_string()))
    }

    pub async fn ticket(&self, caller: &AuthenticatedUser, booking_id: &str) -> CoreResult<TicketDetails> {
        let booking = self.booking(caller, booking_id).await?;
        Ok(TicketDetails::from_booking(&booking))
    }
}
