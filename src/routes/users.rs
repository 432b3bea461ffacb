use std::collections::HashMap;

use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use diesel::prelude::*;
use serde::{Deserialize, Serialize};

use crate::{
    auth::{password, require_role, AuthenticatedUser},
    booking,
    error::{AppError, AppResult},
    models::{NewUser, Role, User, Vehicle},
    schema::{users, vehicles},
    state::AppState,
};

/// UserID 1 is the seeded root account and can never be removed.
const ROOT_USER_ID: i32 = 1;

#[derive(Deserialize)]
pub struct SignupRequest {
    pub first_name: String,
    pub last_name: String,
    pub phone: String,
    pub email: String,
    pub password: String,
}

#[derive(Serialize)]
pub struct UserSummary {
    pub id: i32,
    pub first_name: String,
    pub last_name: String,
    pub phone: String,
    pub email: String,
}

/// Field checks and insert shared by self-signup and admin-created accounts.
fn create_account(
    conn: &mut diesel::sqlite::SqliteConnection,
    payload: SignupRequest,
    role: Role,
) -> AppResult<()> {
    if payload.first_name.trim().is_empty()
        || payload.last_name.trim().is_empty()
        || payload.password.is_empty()
    {
        return Err(AppError::bad_request("please fill all fields correctly"));
    }
    if !booking::is_valid_contact_number(&payload.phone) {
        return Err(AppError::bad_request("invalid phone number format"));
    }

    let existing = users::table
        .filter(
            users::email
                .eq(&payload.email)
                .or(users::phone.eq(&payload.phone)),
        )
        .first::<User>(conn)
        .optional()?;
    if existing.is_some() {
        return Err(AppError::bad_request(
            "email or phone number already in use",
        ));
    }

    let password_hash = password::hash_password(&payload.password)?;
    let new_user = NewUser {
        first_name: payload.first_name.trim().to_string(),
        last_name: payload.last_name.trim().to_string(),
        phone: payload.phone,
        email: payload.email,
        password_hash,
        role: role.as_str().to_string(),
    };

    match diesel::insert_into(users::table)
        .values(&new_user)
        .execute(conn)
    {
        Ok(_) => Ok(()),
        Err(diesel::result::Error::DatabaseError(
            diesel::result::DatabaseErrorKind::UniqueViolation,
            _,
        )) => Err(AppError::bad_request(
            "email or phone number already in use",
        )),
        Err(err) => Err(AppError::from(err)),
    }
}

pub async fn signup(
    State(state): State<AppState>,
    Json(payload): Json<SignupRequest>,
) -> AppResult<StatusCode> {
    let mut conn = state.db()?;
    create_account(&mut conn, payload, Role::Customer)?;
    Ok(StatusCode::CREATED)
}

#[derive(Deserialize)]
pub struct CreateUserRequest {
    #[serde(flatten)]
    pub account: SignupRequest,
    pub role: String,
}

/// Admin-created account with a chosen role, for staff onboarding.
pub async fn create_user(
    State(state): State<AppState>,
    user: AuthenticatedUser,
    Json(payload): Json<CreateUserRequest>,
) -> AppResult<StatusCode> {
    require_role(&user, &[Role::Admin])?;

    let role = Role::parse(&payload.role).ok_or_else(|| AppError::bad_request("unknown role"))?;

    let mut conn = state.db()?;
    create_account(&mut conn, payload.account, role)?;
    tracing::info!(role = role.as_str(), actor_id = user.user_id, "user created");
    Ok(StatusCode::CREATED)
}

/// Assignment picklist for supervisors; also lists staff for admin pages.
pub async fn list_mechanics(
    State(state): State<AppState>,
    user: AuthenticatedUser,
) -> AppResult<Json<Vec<UserSummary>>> {
    require_role(&user, &[Role::Admin, Role::Mechanic, Role::Supervisor])?;

    let mut conn = state.db()?;
    let mechanics: Vec<User> = users::table
        .filter(users::role.eq(Role::Mechanic.as_str()))
        .order(users::last_name.asc())
        .load(&mut conn)?;

    Ok(Json(
        mechanics
            .into_iter()
            .map(|user| UserSummary {
                id: user.id,
                first_name: user.first_name,
                last_name: user.last_name,
                phone: user.phone,
                email: user.email,
            })
            .collect(),
    ))
}

#[derive(Serialize)]
pub struct CustomerView {
    pub id: i32,
    pub first_name: String,
    pub last_name: String,
    pub phone: String,
    pub email: String,
    pub vehicles: Vec<Vehicle>,
}

/// Staff-facing customer directory, each customer with their vehicles.
pub async fn list_customers(
    State(state): State<AppState>,
    user: AuthenticatedUser,
) -> AppResult<Json<Vec<CustomerView>>> {
    require_role(&user, &[Role::Admin, Role::Mechanic, Role::Supervisor])?;

    let mut conn = state.db()?;
    let customers: Vec<User> = users::table
        .filter(users::role.eq(Role::Customer.as_str()))
        .order(users::last_name.asc())
        .load(&mut conn)?;

    let ids: Vec<i32> = customers.iter().map(|customer| customer.id).collect();
    let mut owned: HashMap<i32, Vec<Vehicle>> = HashMap::new();
    for vehicle in vehicles::table
        .filter(vehicles::user_id.eq_any(&ids))
        .load::<Vehicle>(&mut conn)?
    {
        owned.entry(vehicle.user_id).or_default().push(vehicle);
    }

    Ok(Json(
        customers
            .into_iter()
            .map(|customer| CustomerView {
                vehicles: owned.remove(&customer.id).unwrap_or_default(),
                id: customer.id,
                first_name: customer.first_name,
                last_name: customer.last_name,
                phone: customer.phone,
                email: customer.email,
            })
            .collect(),
    ))
}

pub async fn delete_user(
    State(state): State<AppState>,
    user: AuthenticatedUser,
    Path(user_id): Path<i32>,
) -> AppResult<StatusCode> {
    require_role(&user, &[Role::Admin])?;

    if user_id == user.user_id {
        return Err(AppError::forbidden("cannot delete current user"));
    }
    if user_id == ROOT_USER_ID {
        return Err(AppError::forbidden("cannot delete root user"));
    }

    let mut conn = state.db()?;
    let deleted = diesel::delete(users::table.find(user_id)).execute(&mut conn)?;
    if deleted == 0 {
        return Err(AppError::not_found());
    }

    tracing::info!(deleted_user_id = user_id, actor_id = user.user_id, "user deleted");
    Ok(StatusCode::NO_CONTENT)
}
