use axum::{extract::State, http::StatusCode, Json};
use chrono::{Local, NaiveDate};
use serde::{Deserialize, Serialize};

use crate::{
    auth::{require_role, AuthenticatedUser},
    booking::{
        self, BookingIdentity, BookingRequest, CategoryRequest, ChannelPolicy, WalkInIdentity,
    },
    error::{AppError, AppResult},
    notify::{self, EmailMessage},
    state::AppState,
};

#[derive(Deserialize)]
pub struct CleanFields {
    pub clean_type: String,
}

#[derive(Deserialize)]
pub struct RepairFields {
    pub repair_type: String,
    pub description: Option<String>,
}

#[derive(Deserialize)]
pub struct ServiceFields {
    pub service_type: String,
    #[serde(default)]
    pub specific_service: String,
    pub odometer_km: i32,
    pub logbook_interval: i32,
}

/// The slot/vehicle/category part of a booking, shared by every channel.
#[derive(Deserialize)]
pub struct BookingFields {
    pub registration: String,
    pub appointment_date: NaiveDate,
    pub time_slot: String,
    pub location: String,
    pub clean: Option<CleanFields>,
    pub repair: Option<RepairFields>,
    pub service: Option<ServiceFields>,
}

#[derive(Deserialize)]
pub struct WalkInBookingPayload {
    pub first_name: String,
    pub last_name: String,
    pub contact_number: String,
    pub email: String,
    #[serde(flatten)]
    pub booking: BookingFields,
}

#[derive(Deserialize)]
pub struct AdminBookingPayload {
    pub customer_id: i32,
    #[serde(flatten)]
    pub booking: BookingFields,
}

#[derive(Serialize)]
pub struct BookingResponse {
    pub appointment_id: i32,
}

fn categories(fields: &BookingFields) -> Vec<CategoryRequest> {
    let mut categories = Vec::new();
    if let Some(clean) = &fields.clean {
        categories.push(CategoryRequest::Clean {
            clean_type: clean.clean_type.clone(),
        });
    }
    if let Some(repair) = &fields.repair {
        categories.push(CategoryRequest::Repair {
            repair_type: repair.repair_type.clone(),
            description: repair.description.clone(),
        });
    }
    if let Some(service) = &fields.service {
        categories.push(CategoryRequest::Service {
            service_type: service.service_type.clone(),
            specific_service: service.specific_service.clone(),
            odometer_km: service.odometer_km,
            logbook_interval: service.logbook_interval,
        });
    }
    categories
}

fn place_booking(
    state: &AppState,
    policy: ChannelPolicy,
    identity: BookingIdentity,
    fields: &BookingFields,
) -> AppResult<BookingResponse> {
    let request = BookingRequest {
        identity,
        registration: fields.registration.trim().to_string(),
        date: fields.appointment_date,
        slot: fields.time_slot.clone(),
        location: fields.location.clone(),
        categories: categories(fields),
    };

    let mut conn = state.db()?;
    let today = Local::now().date_naive();
    let confirmation = booking::book(
        &mut conn,
        &policy,
        today,
        &state.config.public_holidays,
        &request,
    )
    .map_err(AppError::from)?;

    // The booking is committed; email delivery must not affect the outcome.
    notify::send_in_background(
        state.notifier.clone(),
        confirmation_email(&confirmation.customer_first_name, &confirmation.customer_email, &request),
    );

    Ok(BookingResponse {
        appointment_id: confirmation.appointment_id,
    })
}

fn confirmation_email(first_name: &str, email: &str, request: &BookingRequest) -> EmailMessage {
    let services: Vec<&str> = request.categories.iter().map(|c| c.label()).collect();
    EmailMessage {
        to: email.to_string(),
        subject: "AMW Appointment Confirmation".to_string(),
        body: format!(
            "Hi {first_name},\n\n\
             Your appointment has been confirmed with the following details:\n\n\
             - Date: {date}\n\
             - Time: {slot}\n\
             - Location: {location}\n\
             - Vehicle: {registration}\n\
             - Services: {services}\n\n\
             Thank you for booking with AMW!\n\nRegards,\nAMW Team",
            date = request.date,
            slot = request.slot,
            location = request.location,
            registration = request.registration,
            services = services.join(", "),
        ),
    }
}

/// Walk-in channel: no session, raw contact details, tighter capacity cap.
pub async fn walk_in_booking(
    State(state): State<AppState>,
    Json(payload): Json<WalkInBookingPayload>,
) -> AppResult<(StatusCode, Json<BookingResponse>)> {
    let identity = BookingIdentity::WalkIn(WalkInIdentity {
        first_name: payload.first_name,
        last_name: payload.last_name,
        contact_number: payload.contact_number,
        email: payload.email,
    });
    let response = place_booking(&state, state.walk_in_policy(), identity, &payload.booking)?;
    Ok((StatusCode::CREATED, Json(response)))
}

/// Customer channel: identity comes from the session token.
pub async fn customer_booking(
    State(state): State<AppState>,
    user: AuthenticatedUser,
    Json(payload): Json<BookingFields>,
) -> AppResult<(StatusCode, Json<BookingResponse>)> {
    require_role(&user, &[crate::models::Role::Customer])?;
    let identity = BookingIdentity::Existing {
        user_id: user.user_id,
    };
    let response = place_booking(&state, state.authenticated_policy(), identity, &payload)?;
    Ok((StatusCode::CREATED, Json(response)))
}

/// Admin channel: books on behalf of a named customer.
pub async fn admin_booking(
    State(state): State<AppState>,
    user: AuthenticatedUser,
    Json(payload): Json<AdminBookingPayload>,
) -> AppResult<(StatusCode, Json<BookingResponse>)> {
    require_role(&user, &[crate::models::Role::Admin])?;
    let identity = BookingIdentity::Existing {
        user_id: payload.customer_id,
    };
    let response = place_booking(&state, state.authenticated_policy(), identity, &payload.booking)?;
    Ok((StatusCode::CREATED, Json(response)))
}
