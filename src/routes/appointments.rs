use std::collections::HashMap;

use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use diesel::prelude::*;
use serde::{Deserialize, Serialize};

use crate::{
    auth::{require_role, AuthenticatedUser},
    error::{AppError, AppResult},
    lifecycle::{self, AppointmentStatus, LifecycleNotice},
    models::{Appointment, CleanDetail, RepairDetail, Role, ServiceDetail},
    notify::{self, EmailMessage},
    schema::{appointments, clean_details, repair_details, service_details},
    state::AppState,
};

#[derive(Serialize)]
pub struct AppointmentView {
    pub id: i32,
    pub user_id: i32,
    pub registration: String,
    pub appointment_date: chrono::NaiveDate,
    pub time_slot: String,
    pub location: String,
    pub status: String,
    pub mechanic_id: Option<i32>,
    pub clean: Option<CleanDetail>,
    pub repair: Option<RepairDetail>,
    pub service: Option<ServiceDetail>,
}

/// Customers see their own appointments; staff roles see the whole book.
pub async fn list_appointments(
    State(state): State<AppState>,
    user: AuthenticatedUser,
) -> AppResult<Json<Vec<AppointmentView>>> {
    let privileged = matches!(
        user.role(),
        Some(Role::Admin) | Some(Role::Mechanic) | Some(Role::Supervisor)
    );

    let mut conn = state.db()?;
    let mut query = appointments::table
        .order((
            appointments::appointment_date.asc(),
            appointments::time_slot.asc(),
        ))
        .into_boxed();
    if !privileged {
        query = query.filter(appointments::user_id.eq(user.user_id));
    }
    let rows: Vec<Appointment> = query.load(&mut conn)?;

    let ids: Vec<i32> = rows.iter().map(|appointment| appointment.id).collect();
    let mut cleans: HashMap<i32, CleanDetail> = clean_details::table
        .filter(clean_details::appointment_id.eq_any(&ids))
        .load::<CleanDetail>(&mut conn)?
        .into_iter()
        .map(|detail| (detail.appointment_id, detail))
        .collect();
    let mut repairs: HashMap<i32, RepairDetail> = repair_details::table
        .filter(repair_details::appointment_id.eq_any(&ids))
        .load::<RepairDetail>(&mut conn)?
        .into_iter()
        .map(|detail| (detail.appointment_id, detail))
        .collect();
    let mut services: HashMap<i32, ServiceDetail> = service_details::table
        .filter(service_details::appointment_id.eq_any(&ids))
        .load::<ServiceDetail>(&mut conn)?
        .into_iter()
        .map(|detail| (detail.appointment_id, detail))
        .collect();

    let views = rows
        .into_iter()
        .map(|appointment| AppointmentView {
            clean: cleans.remove(&appointment.id),
            repair: repairs.remove(&appointment.id),
            service: services.remove(&appointment.id),
            id: appointment.id,
            user_id: appointment.user_id,
            registration: appointment.registration,
            appointment_date: appointment.appointment_date,
            time_slot: appointment.time_slot,
            location: appointment.location,
            status: appointment.status,
            mechanic_id: appointment.mechanic_id,
        })
        .collect();

    Ok(Json(views))
}

pub async fn cancel_appointment(
    State(state): State<AppState>,
    user: AuthenticatedUser,
    Path(appointment_id): Path<i32>,
) -> AppResult<StatusCode> {
    require_role(&user, &[Role::Supervisor, Role::Admin])?;

    let mut conn = state.db()?;
    let notice = lifecycle::cancel(&mut conn, appointment_id)?;

    notify::send_in_background(state.notifier.clone(), cancellation_email(&notice));
    Ok(StatusCode::NO_CONTENT)
}

#[derive(Deserialize)]
pub struct UpdateStatusRequest {
    pub status: String,
}

pub async fn update_status(
    State(state): State<AppState>,
    user: AuthenticatedUser,
    Path(appointment_id): Path<i32>,
    Json(payload): Json<UpdateStatusRequest>,
) -> AppResult<StatusCode> {
    require_role(&user, &[Role::Mechanic])?;

    let target = AppointmentStatus::parse(&payload.status)
        .ok_or_else(|| AppError::bad_request("unknown appointment status"))?;

    let mut conn = state.db()?;
    let notice = lifecycle::update_status(&mut conn, appointment_id, user.user_id, target)?;

    notify::send_in_background(state.notifier.clone(), status_email(&notice));
    Ok(StatusCode::NO_CONTENT)
}

#[derive(Deserialize)]
pub struct AssignMechanicRequest {
    pub mechanic_id: i32,
}

pub async fn assign_mechanic(
    State(state): State<AppState>,
    user: AuthenticatedUser,
    Path(appointment_id): Path<i32>,
    Json(payload): Json<AssignMechanicRequest>,
) -> AppResult<StatusCode> {
    require_role(&user, &[Role::Supervisor])?;

    let mut conn = state.db()?;
    lifecycle::assign_mechanic(&mut conn, appointment_id, payload.mechanic_id)?;
    Ok(StatusCode::NO_CONTENT)
}

fn cancellation_email(notice: &LifecycleNotice) -> EmailMessage {
    EmailMessage {
        to: notice.customer_email.clone(),
        subject: "Your AMW Appointment Has Been Cancelled".to_string(),
        body: format!(
            "Hi {},\n\nYour appointment on {} at {} has been cancelled.\n\n\
             If this was a mistake, please contact us or rebook.\n\nRegards,\nAMW Team",
            notice.customer_first_name, notice.appointment_date, notice.time_slot,
        ),
    }
}

fn status_email(notice: &LifecycleNotice) -> EmailMessage {
    EmailMessage {
        to: notice.customer_email.clone(),
        subject: format!(
            "Update on Your AMW Appointment (Appointment ID: {})",
            notice.appointment_id
        ),
        body: format!(
            "Hi {},\n\nYour appointment on {} at {} has been updated to status: {}.\n\n\
             Thank you for choosing AMW.\n\nRegards,\nAMW Team",
            notice.customer_first_name,
            notice.appointment_date,
            notice.time_slot,
            notice.new_status.as_str(),
        ),
    }
}
