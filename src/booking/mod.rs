//! Booking validation and scheduling.
//!
//! Every booking channel (walk-in, customer, admin) funnels into the same
//! engine: a fixed sequence of business-rule checks followed by a single
//! write transaction that reserves the slot and records the appointment
//! with its category details.

pub mod identity;
pub mod slots;
pub mod validate;

use chrono::NaiveDate;
use thiserror::Error;

use crate::error::AppError;

pub use validate::{book, is_valid_contact_number, verify_ownership};

/// Why a booking request was rejected. Each variant carries a distinct
/// user-facing message; store failures are logged and surfaced generically.
#[derive(Debug, Error)]
pub enum BookingError {
    #[error("invalid contact number")]
    InvalidContact,
    #[error("appointment date must be in the future")]
    PastDate,
    #[error("appointment time must be within business hours (07:00-17:30)")]
    OutsideBusinessHours,
    #[error("invalid time slot selected")]
    InvalidSlot,
    #[error("bookings cannot be made on public holidays")]
    PublicHoliday,
    #[error("this time slot and location is already at full capacity")]
    CapacityExceeded,
    #[error("vehicle is not registered in the system")]
    VehicleNotFound,
    #[error("this vehicle is not registered to you")]
    VehicleNotOwned,
    #[error("select at least one service, and each service at most once")]
    InvalidCategory,
    #[error(transparent)]
    Persistence(#[from] diesel::result::Error),
    #[error(transparent)]
    Internal(#[from] anyhow::Error),
}

impl From<BookingError> for AppError {
    fn from(value: BookingError) -> Self {
        let message = value.to_string();
        match value {
            BookingError::InvalidContact
            | BookingError::PastDate
            | BookingError::OutsideBusinessHours
            | BookingError::InvalidSlot
            | BookingError::PublicHoliday
            | BookingError::InvalidCategory => AppError::bad_request(message),
            BookingError::CapacityExceeded => AppError::conflict(message),
            BookingError::VehicleNotFound => AppError::not_found(),
            BookingError::VehicleNotOwned => AppError::forbidden(message),
            BookingError::Persistence(err) => AppError::internal(err),
            BookingError::Internal(err) => AppError::internal(err),
        }
    }
}

/// How a booking reached us. Walk-ins carry raw contact details and may
/// provision a new customer; the other channels name an existing user.
#[derive(Debug, Clone)]
pub enum BookingIdentity {
    Existing { user_id: i32 },
    WalkIn(WalkInIdentity),
}

#[derive(Debug, Clone)]
pub struct WalkInIdentity {
    pub first_name: String,
    pub last_name: String,
    pub contact_number: String,
    pub email: String,
}

/// One requested service category with its category-specific fields.
#[derive(Debug, Clone)]
pub enum CategoryRequest {
    Clean {
        clean_type: String,
    },
    Repair {
        repair_type: String,
        description: Option<String>,
    },
    Service {
        service_type: String,
        specific_service: String,
        odometer_km: i32,
        logbook_interval: i32,
    },
}

impl CategoryRequest {
    pub fn label(&self) -> &'static str {
        match self {
            CategoryRequest::Clean { .. } => "CLEAN",
            CategoryRequest::Repair { .. } => "REPAIR",
            CategoryRequest::Service { .. } => "SERVICE",
        }
    }
}

#[derive(Debug, Clone)]
pub struct BookingRequest {
    pub identity: BookingIdentity,
    pub registration: String,
    pub date: NaiveDate,
    pub slot: String,
    pub location: String,
    pub categories: Vec<CategoryRequest>,
}

/// Per-channel knobs for the shared validator.
#[derive(Debug, Clone, Copy)]
pub struct ChannelPolicy {
    /// Max appointments sharing one (date, slot, location) tuple.
    pub capacity: i64,
}

/// What the engine hands back after committing, enough for the caller to
/// respond and to send the confirmation email.
#[derive(Debug, Clone)]
pub struct BookingConfirmation {
    pub appointment_id: i32,
    pub user_id: i32,
    pub customer_first_name: String,
    pub customer_email: String,
}
