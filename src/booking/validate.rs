use std::collections::HashSet;

use chrono::NaiveDate;
use diesel::prelude::*;
use diesel::sqlite::SqliteConnection;
use once_cell::sync::Lazy;
use regex::Regex;

use crate::models::{
    Appointment, NewAppointment, NewCleanDetail, NewRepairDetail, NewServiceDetail, User, Vehicle,
};
use crate::schema::{appointments, clean_details, repair_details, service_details, users, vehicles};

use super::{
    identity, slots, BookingConfirmation, BookingError, BookingIdentity, BookingRequest,
    CategoryRequest, ChannelPolicy,
};

pub const STATUS_SCHEDULED: &str = "SCHEDULED";

static CONTACT_NUMBER: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[+]?[\d\s\-]{7,15}$").expect("contact number pattern"));

/// Shared with signup and admin user creation; the same pattern gates every
/// place a raw phone number enters the system.
pub fn is_valid_contact_number(value: &str) -> bool {
    CONTACT_NUMBER.is_match(value)
}

/// Pure business-rule checks, applied in a fixed order so a request always
/// fails with the same reason. `today` is the booking date normalized to
/// midnight; the comparison is date-only.
pub fn check_request(
    request: &BookingRequest,
    today: NaiveDate,
    holidays: &HashSet<NaiveDate>,
) -> Result<(), BookingError> {
    if let BookingIdentity::WalkIn(identity) = &request.identity {
        if !is_valid_contact_number(&identity.contact_number) {
            return Err(BookingError::InvalidContact);
        }
    }

    if request.date < today {
        return Err(BookingError::PastDate);
    }

    let (hour, minute) =
        slots::parse_time(&request.slot).ok_or(BookingError::OutsideBusinessHours)?;
    if !slots::within_business_hours(hour, minute) {
        return Err(BookingError::OutsideBusinessHours);
    }

    if !slots::is_listed_slot(&request.slot) {
        return Err(BookingError::InvalidSlot);
    }

    if holidays.contains(&request.date) {
        return Err(BookingError::PublicHoliday);
    }

    check_categories(&request.categories)?;

    Ok(())
}

/// A booking must name at least one category and each category at most once.
fn check_categories(categories: &[CategoryRequest]) -> Result<(), BookingError> {
    if categories.is_empty() {
        return Err(BookingError::InvalidCategory);
    }
    let mut seen = HashSet::new();
    for category in categories {
        if !seen.insert(category.label()) {
            return Err(BookingError::InvalidCategory);
        }
    }
    Ok(())
}

/// The vehicle must already exist and belong to the resolved user. A booking
/// never creates a vehicle.
pub fn verify_ownership(
    conn: &mut SqliteConnection,
    registration: &str,
    user_id: i32,
) -> Result<Vehicle, BookingError> {
    let vehicle = vehicles::table
        .find(registration)
        .first::<Vehicle>(conn)
        .optional()?
        .ok_or(BookingError::VehicleNotFound)?;

    if vehicle.user_id != user_id {
        return Err(BookingError::VehicleNotOwned);
    }
    Ok(vehicle)
}

/// Validates and persists one booking.
///
/// The capacity check, the appointment insert and the detail inserts all run
/// inside one immediate transaction: the write lock taken up front makes
/// check-and-reserve atomic under concurrent bookings for the same slot, and
/// a failed detail insert rolls the appointment back instead of leaving it
/// dangling. Capacity is counted before identity and ownership are resolved,
/// so a full slot always reports CapacityExceeded regardless of what else is
/// wrong with the request.
pub fn book(
    conn: &mut SqliteConnection,
    policy: &ChannelPolicy,
    today: NaiveDate,
    holidays: &HashSet<NaiveDate>,
    request: &BookingRequest,
) -> Result<BookingConfirmation, BookingError> {
    check_request(request, today, holidays)?;

    let confirmation = conn.immediate_transaction::<_, BookingError, _>(|conn| {
        let booked: i64 = appointments::table
            .filter(appointments::appointment_date.eq(request.date))
            .filter(appointments::time_slot.eq(&request.slot))
            .filter(appointments::location.eq(&request.location))
            .count()
            .get_result(conn)?;
        if booked >= policy.capacity {
            return Err(BookingError::CapacityExceeded);
        }

        let user_id = match &request.identity {
            BookingIdentity::Existing { user_id } => *user_id,
            BookingIdentity::WalkIn(identity) => identity::resolve_or_create(conn, identity)?,
        };

        verify_ownership(conn, &request.registration, user_id)?;

        let appointment = diesel::insert_into(appointments::table)
            .values(NewAppointment {
                user_id,
                registration: request.registration.clone(),
                appointment_date: request.date,
                time_slot: request.slot.clone(),
                location: request.location.clone(),
                status: STATUS_SCHEDULED.to_string(),
            })
            .get_result::<Appointment>(conn)?;

        for category in &request.categories {
            insert_detail(conn, appointment.id, &request.registration, category)?;
        }

        let customer: User = users::table.find(user_id).first(conn)?;

        Ok(BookingConfirmation {
            appointment_id: appointment.id,
            user_id,
            customer_first_name: customer.first_name,
            customer_email: customer.email,
        })
    })?;

    tracing::info!(
        appointment_id = confirmation.appointment_id,
        user_id = confirmation.user_id,
        date = %request.date,
        slot = %request.slot,
        location = %request.location,
        "appointment scheduled"
    );

    Ok(confirmation)
}

fn insert_detail(
    conn: &mut SqliteConnection,
    appointment_id: i32,
    registration: &str,
    category: &CategoryRequest,
) -> Result<(), BookingError> {
    match category {
        CategoryRequest::Clean { clean_type } => {
            diesel::insert_into(clean_details::table)
                .values(NewCleanDetail {
                    appointment_id,
                    registration: registration.to_string(),
                    clean_type: clean_type.clone(),
                })
                .execute(conn)?;
        }
        CategoryRequest::Repair {
            repair_type,
            description,
        } => {
            diesel::insert_into(repair_details::table)
                .values(NewRepairDetail {
                    appointment_id,
                    registration: registration.to_string(),
                    repair_type: repair_type.clone(),
                    description: description.clone(),
                })
                .execute(conn)?;
        }
        CategoryRequest::Service {
            service_type,
            specific_service,
            odometer_km,
            logbook_interval,
        } => {
            diesel::insert_into(service_details::table)
                .values(NewServiceDetail {
                    appointment_id,
                    registration: registration.to_string(),
                    odometer_km: *odometer_km,
                    logbook_interval: *logbook_interval,
                    service_type: service_type.clone(),
                    specific_service: specific_service.clone(),
                })
                .execute(conn)?;
        }
    }
    Ok(())
}
