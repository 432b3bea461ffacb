use diesel::prelude::*;
use diesel::sqlite::SqliteConnection;
use rand::{rngs::OsRng, RngCore};

use crate::auth::password;
use crate::models::{NewUser, Role, User};
use crate::schema::users;

use super::{BookingError, WalkInIdentity};

/// Finds the user a walk-in booking belongs to, matching on email OR phone,
/// and provisions a CUSTOMER account when neither matches.
///
/// New accounts get a random credential that is hashed and discarded; the
/// customer has to go through a password reset before logging in. Duplicate
/// creation under concurrent requests is prevented by the unique constraints
/// on phone and email: a lost race surfaces as a unique violation and we
/// re-fetch the winner's row.
pub fn resolve_or_create(
    conn: &mut SqliteConnection,
    identity: &WalkInIdentity,
) -> Result<i32, BookingError> {
    if let Some(existing) = find_by_contact(conn, identity)? {
        return Ok(existing.id);
    }

    let new_user = NewUser {
        first_name: identity.first_name.clone(),
        last_name: identity.last_name.clone(),
        phone: identity.contact_number.clone(),
        email: identity.email.clone(),
        password_hash: generated_credential_hash()?,
        role: Role::Customer.as_str().to_string(),
    };

    let inserted = diesel::insert_into(users::table)
        .values(&new_user)
        .get_result::<User>(conn);

    match inserted {
        Ok(user) => {
            tracing::info!(user_id = user.id, "provisioned walk-in customer");
            Ok(user.id)
        }
        Err(diesel::result::Error::DatabaseError(
            diesel::result::DatabaseErrorKind::UniqueViolation,
            _,
        )) => find_by_contact(conn, identity)?
            .map(|user| user.id)
            .ok_or(BookingError::Persistence(diesel::result::Error::NotFound)),
        Err(err) => Err(err.into()),
    }
}

fn find_by_contact(
    conn: &mut SqliteConnection,
    identity: &WalkInIdentity,
) -> Result<Option<User>, BookingError> {
    let user = users::table
        .filter(
            users::email
                .eq(&identity.email)
                .or(users::phone.eq(&identity.contact_number)),
        )
        .first::<User>(conn)
        .optional()?;
    Ok(user)
}

fn generated_credential_hash() -> Result<String, BookingError> {
    let mut bytes = [0u8; 32];
    OsRng.fill_bytes(&mut bytes);
    Ok(password::hash_password(&hex::encode(bytes))?)
}
