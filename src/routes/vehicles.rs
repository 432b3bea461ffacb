use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use chrono::NaiveDate;
use diesel::prelude::*;
use serde::Deserialize;

use crate::{
    auth::{require_role, AuthenticatedUser},
    booking,
    error::{AppError, AppResult},
    models::{NewVehicle, Role, Vehicle},
    schema::vehicles,
    state::AppState,
};

#[derive(Deserialize)]
pub struct AddVehicleRequest {
    pub registration: String,
    pub make: String,
    pub model: String,
    pub year: i32,
    pub colour: String,
    pub last_service_date: NaiveDate,
}

pub async fn list_vehicles(
    State(state): State<AppState>,
    user: AuthenticatedUser,
) -> AppResult<Json<Vec<Vehicle>>> {
    let mut conn = state.db()?;
    let owned: Vec<Vehicle> = vehicles::table
        .filter(vehicles::user_id.eq(user.user_id))
        .order(vehicles::registration.asc())
        .load(&mut conn)?;
    Ok(Json(owned))
}

pub async fn add_vehicle(
    State(state): State<AppState>,
    user: AuthenticatedUser,
    Json(payload): Json<AddVehicleRequest>,
) -> AppResult<StatusCode> {
    require_role(&user, &[Role::Customer])?;

    let registration = payload.registration.trim().to_string();
    if registration.is_empty() {
        return Err(AppError::bad_request("registration must not be empty"));
    }

    let mut conn = state.db()?;
    let new_vehicle = NewVehicle {
        registration,
        user_id: user.user_id,
        make: payload.make,
        model: payload.model,
        year: payload.year,
        colour: payload.colour,
        last_service_date: payload.last_service_date,
    };

    match diesel::insert_into(vehicles::table)
        .values(&new_vehicle)
        .execute(&mut conn)
    {
        Ok(_) => Ok(StatusCode::CREATED),
        Err(diesel::result::Error::DatabaseError(
            diesel::result::DatabaseErrorKind::UniqueViolation,
            _,
        )) => Err(AppError::conflict("vehicle registration already in use")),
        Err(err) => Err(AppError::from(err)),
    }
}

#[derive(Deserialize)]
pub struct UpdateVehicleRequest {
    pub make: String,
    pub model: String,
    pub year: i32,
    pub colour: String,
    pub last_service_date: NaiveDate,
}

/// Registration is the key and cannot change; everything else is editable
/// by the owner.
pub async fn update_vehicle(
    State(state): State<AppState>,
    user: AuthenticatedUser,
    Path(registration): Path<String>,
    Json(payload): Json<UpdateVehicleRequest>,
) -> AppResult<StatusCode> {
    require_role(&user, &[Role::Customer])?;

    let mut conn = state.db()?;
    booking::verify_ownership(&mut conn, &registration, user.user_id)?;

    diesel::update(vehicles::table.find(&registration))
        .set((
            vehicles::make.eq(payload.make),
            vehicles::model.eq(payload.model),
            vehicles::year.eq(payload.year),
            vehicles::colour.eq(payload.colour),
            vehicles::last_service_date.eq(payload.last_service_date),
        ))
        .execute(&mut conn)?;
    Ok(StatusCode::NO_CONTENT)
}

/// Removing a vehicle cascades to its appointments and their details.
pub async fn delete_vehicle(
    State(state): State<AppState>,
    user: AuthenticatedUser,
    Path(registration): Path<String>,
) -> AppResult<StatusCode> {
    require_role(&user, &[Role::Customer])?;

    let mut conn = state.db()?;
    booking::verify_ownership(&mut conn, &registration, user.user_id)?;

    diesel::delete(vehicles::table.find(&registration)).execute(&mut conn)?;
    tracing::info!(registration = %registration, user_id = user.user_id, "vehicle removed");
    Ok(StatusCode::NO_CONTENT)
}
