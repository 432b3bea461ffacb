//! Appointment lifecycle state machine.
//!
//! SCHEDULED -> Cancelled (supervisor/admin, terminal)
//! SCHEDULED -> INPROGRESS -> COMPLETE (assigned mechanic only)
//!
//! Mechanic assignment is a side attribute, settable in any state, and is
//! not itself a transition.

use diesel::prelude::*;
use diesel::sqlite::SqliteConnection;

use crate::error::{AppError, AppResult};
use crate::models::{Appointment, Role, User};
use crate::schema::{appointments, users};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AppointmentStatus {
    Scheduled,
    InProgress,
    Complete,
    Cancelled,
}

impl AppointmentStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            AppointmentStatus::Scheduled => "SCHEDULED",
            AppointmentStatus::InProgress => "INPROGRESS",
            AppointmentStatus::Complete => "COMPLETE",
            AppointmentStatus::Cancelled => "Cancelled",
        }
    }

    pub fn parse(value: &str) -> Option<AppointmentStatus> {
        match value {
            "SCHEDULED" => Some(AppointmentStatus::Scheduled),
            "INPROGRESS" => Some(AppointmentStatus::InProgress),
            "COMPLETE" => Some(AppointmentStatus::Complete),
            "Cancelled" => Some(AppointmentStatus::Cancelled),
            _ => None,
        }
    }
}

/// Transitions a mechanic may drive on an appointment assigned to them.
pub fn mechanic_transition_allowed(from: AppointmentStatus, to: AppointmentStatus) -> bool {
    matches!(
        (from, to),
        (AppointmentStatus::Scheduled, AppointmentStatus::InProgress)
            | (AppointmentStatus::InProgress, AppointmentStatus::Complete)
    )
}

/// Cancellation is only reachable from SCHEDULED.
pub fn cancellation_allowed(from: AppointmentStatus) -> bool {
    from == AppointmentStatus::Scheduled
}

/// Everything the caller needs to notify the customer after a lifecycle
/// change has committed.
#[derive(Debug, Clone)]
pub struct LifecycleNotice {
    pub appointment_id: i32,
    pub customer_first_name: String,
    pub customer_email: String,
    pub appointment_date: chrono::NaiveDate,
    pub time_slot: String,
    pub new_status: AppointmentStatus,
}

fn load_with_customer(
    conn: &mut SqliteConnection,
    appointment_id: i32,
) -> AppResult<(Appointment, User)> {
    let appointment = appointments::table
        .find(appointment_id)
        .first::<Appointment>(conn)
        .optional()?
        .ok_or_else(AppError::not_found)?;
    let customer = users::table
        .find(appointment.user_id)
        .first::<User>(conn)?;
    Ok((appointment, customer))
}

pub fn cancel(conn: &mut SqliteConnection, appointment_id: i32) -> AppResult<LifecycleNotice> {
    conn.immediate_transaction(|conn| {
        let (appointment, customer) = load_with_customer(conn, appointment_id)?;
        let status = AppointmentStatus::parse(&appointment.status)
            .ok_or_else(|| AppError::internal(format!("bad status: {}", appointment.status)))?;

        if !cancellation_allowed(status) {
            return Err(AppError::conflict(
                "cannot cancel an appointment that is no longer scheduled",
            ));
        }

        diesel::update(appointments::table.find(appointment_id))
            .set(appointments::status.eq(AppointmentStatus::Cancelled.as_str()))
            .execute(conn)?;

        Ok(LifecycleNotice {
            appointment_id,
            customer_first_name: customer.first_name,
            customer_email: customer.email,
            appointment_date: appointment.appointment_date,
            time_slot: appointment.time_slot,
            new_status: AppointmentStatus::Cancelled,
        })
    })
}

/// Mechanic-driven progress. The actor must be the assigned mechanic and
/// the move must follow SCHEDULED -> INPROGRESS -> COMPLETE.
pub fn update_status(
    conn: &mut SqliteConnection,
    appointment_id: i32,
    actor_id: i32,
    target: AppointmentStatus,
) -> AppResult<LifecycleNotice> {
    conn.immediate_transaction(|conn| {
        let (appointment, customer) = load_with_customer(conn, appointment_id)?;

        if appointment.mechanic_id != Some(actor_id) {
            return Err(AppError::forbidden(
                "you are not assigned to this appointment",
            ));
        }

        let status = AppointmentStatus::parse(&appointment.status)
            .ok_or_else(|| AppError::internal(format!("bad status: {}", appointment.status)))?;
        if !mechanic_transition_allowed(status, target) {
            return Err(AppError::conflict("invalid status change"));
        }

        diesel::update(appointments::table.find(appointment_id))
            .set(appointments::status.eq(target.as_str()))
            .execute(conn)?;

        Ok(LifecycleNotice {
            appointment_id,
            customer_first_name: customer.first_name,
            customer_email: customer.email,
            appointment_date: appointment.appointment_date,
            time_slot: appointment.time_slot,
            new_status: target,
        })
    })
}

/// Supervisor-driven assignment. The target user must exist and hold the
/// MECHANIC role; on failure the appointment is left untouched.
pub fn assign_mechanic(
    conn: &mut SqliteConnection,
    appointment_id: i32,
    mechanic_id: i32,
) -> AppResult<()> {
    conn.immediate_transaction(|conn| {
        let mechanic = users::table
            .find(mechanic_id)
            .first::<User>(conn)
            .optional()?;
        let is_mechanic = mechanic
            .map(|user| Role::parse(&user.role) == Some(Role::Mechanic))
            .unwrap_or(false);
        if !is_mechanic {
            return Err(AppError::not_found());
        }

        let updated = diesel::update(appointments::table.find(appointment_id))
            .set(appointments::mechanic_id.eq(Some(mechanic_id)))
            .execute(conn)?;
        if updated == 0 {
            return Err(AppError::not_found());
        }

        tracing::info!(appointment_id, mechanic_id, "mechanic assigned");
        Ok(())
    })
}
