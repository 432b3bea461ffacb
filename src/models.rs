use chrono::{NaiveDate, NaiveDateTime};
use diesel::prelude::*;
use serde::Serialize;

use crate::schema::*;

/// Roles a user account can hold. Stored as text in the `users` table.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Role {
    Customer,
    Mechanic,
    Supervisor,
    Admin,
}

impl Role {
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::Customer => "CUSTOMER",
            Role::Mechanic => "MECHANIC",
            Role::Supervisor => "SUPERVISOR",
            Role::Admin => "ADMIN",
        }
    }

    pub fn parse(value: &str) -> Option<Role> {
        match value {
            "CUSTOMER" => Some(Role::Customer),
            "MECHANIC" => Some(Role::Mechanic),
            "SUPERVISOR" => Some(Role::Supervisor),
            "ADMIN" => Some(Role::Admin),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Queryable, Identifiable)]
#[diesel(table_name = users)]
pub struct User {
    pub id: i32,
    pub first_name: String,
    pub last_name: String,
    pub phone: String,
    pub email: String,
    pub password_hash: String,
    pub role: String,
    pub created_at: NaiveDateTime,
}

#[derive(Debug, Insertable)]
#[diesel(table_name = users)]
pub struct NewUser {
    pub first_name: String,
    pub last_name: String,
    pub phone: String,
    pub email: String,
    pub password_hash: String,
    pub role: String,
}

#[derive(Debug, Clone, Queryable, Identifiable, Serialize)]
#[diesel(table_name = vehicles)]
#[diesel(primary_key(registration))]
pub struct Vehicle {
    pub registration: String,
    pub user_id: i32,
    pub make: String,
    pub model: String,
    pub year: i32,
    pub colour: String,
    pub last_service_date: NaiveDate,
}

#[derive(Debug, Insertable)]
#[diesel(table_name = vehicles)]
pub struct NewVehicle {
    pub registration: String,
    pub user_id: i32,
    pub make: String,
    pub model: String,
    pub year: i32,
    pub colour: String,
    pub last_service_date: NaiveDate,
}

#[derive(Debug, Clone, Queryable, Identifiable, Serialize)]
#[diesel(table_name = appointments)]
pub struct Appointment {
    pub id: i32,
    pub user_id: i32,
    pub registration: String,
    pub appointment_date: NaiveDate,
    pub time_slot: String,
    pub location: String,
    pub status: String,
    pub mechanic_id: Option<i32>,
    pub created_at: NaiveDateTime,
}

#[derive(Debug, Insertable)]
#[diesel(table_name = appointments)]
pub struct NewAppointment {
    pub user_id: i32,
    pub registration: String,
    pub appointment_date: NaiveDate,
    pub time_slot: String,
    pub location: String,
    pub status: String,
}

#[derive(Debug, Clone, Queryable, Identifiable, Associations, Serialize)]
#[diesel(table_name = clean_details)]
#[diesel(belongs_to(Appointment))]
pub struct CleanDetail {
    pub id: i32,
    pub appointment_id: i32,
    pub registration: String,
    pub clean_type: String,
}

#[derive(Debug, Insertable)]
#[diesel(table_name = clean_details)]
pub struct NewCleanDetail {
    pub appointment_id: i32,
    pub registration: String,
    pub clean_type: String,
}

#[derive(Debug, Clone, Queryable, Identifiable, Associations, Serialize)]
#[diesel(table_name = repair_details)]
#[diesel(belongs_to(Appointment))]
pub struct RepairDetail {
    pub id: i32,
    pub appointment_id: i32,
    pub registration: String,
    pub repair_type: String,
    pub description: Option<String>,
}

#[derive(Debug, Insertable)]
#[diesel(table_name = repair_details)]
pub struct NewRepairDetail {
    pub appointment_id: i32,
    pub registration: String,
    pub repair_type: String,
    pub description: Option<String>,
}

#[derive(Debug, Clone, Queryable, Identifiable, Associations, Serialize)]
#[diesel(table_name = service_details)]
#[diesel(belongs_to(Appointment))]
pub struct ServiceDetail {
    pub id: i32,
    pub appointment_id: i32,
    pub registration: String,
    pub odometer_km: i32,
    pub logbook_interval: i32,
    pub service_type: String,
    pub specific_service: String,
}

#[derive(Debug, Insertable)]
#[diesel(table_name = service_details)]
pub struct NewServiceDetail {
    pub appointment_id: i32,
    pub registration: String,
    pub odometer_km: i32,
    pub logbook_interval: i32,
    pub service_type: String,
    pub specific_service: String,
}
