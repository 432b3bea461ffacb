mod common;

use anyhow::Result;
use axum::http::StatusCode;
use common::{body_to_vec, TestApp};
use serde_json::json;

#[tokio::test]
async fn signup_then_login_then_me() -> Result<()> {
    let app = TestApp::new()?;

    let signup = app
        .post_json(
            "/api/signup",
            &json!({
                "first_name": "Nina",
                "last_name": "Park",
                "phone": "0400 111 222",
                "email": "nina@example.com",
                "password": "hunter2"
            }),
            None,
        )
        .await?;
    assert_eq!(signup.status(), StatusCode::CREATED);

    let token = app.login_token("nina@example.com", "hunter2").await?;
    let me = app.get("/api/auth/me", Some(&token)).await?;
    assert_eq!(me.status(), StatusCode::OK);
    let body = body_to_vec(me.into_body()).await?;
    let parsed: serde_json::Value = serde_json::from_slice(&body)?;
    assert_eq!(parsed["role"], "CUSTOMER");
    assert_eq!(parsed["name"], "Nina");
    Ok(())
}

#[tokio::test]
async fn duplicate_contact_details_are_rejected_at_signup() -> Result<()> {
    let app = TestApp::new()?;
    app.insert_user("Nina", "0400 111 222", "nina@example.com", "pw", "CUSTOMER")?;

    let same_email = app
        .post_json(
            "/api/signup",
            &json!({
                "first_name": "Other",
                "last_name": "Person",
                "phone": "0400 999 999",
                "email": "nina@example.com",
                "password": "pw"
            }),
            None,
        )
        .await?;
    assert_eq!(same_email.status(), StatusCode::BAD_REQUEST);

    let same_phone = app
        .post_json(
            "/api/signup",
            &json!({
                "first_name": "Other",
                "last_name": "Person",
                "phone": "0400 111 222",
                "email": "other@example.com",
                "password": "pw"
            }),
            None,
        )
        .await?;
    assert_eq!(same_phone.status(), StatusCode::BAD_REQUEST);
    Ok(())
}

#[tokio::test]
async fn bad_phone_format_is_rejected_at_signup() -> Result<()> {
    let app = TestApp::new()?;
    let response = app
        .post_json(
            "/api/signup",
            &json!({
                "first_name": "Nina",
                "last_name": "Park",
                "phone": "phone-me-maybe!",
                "email": "nina@example.com",
                "password": "pw"
            }),
            None,
        )
        .await?;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    Ok(())
}

#[tokio::test]
async fn wrong_password_and_missing_token_are_unauthorized() -> Result<()> {
    let app = TestApp::new()?;
    app.insert_user("Nina", "0400 111 222", "nina@example.com", "pw", "CUSTOMER")?;

    let login = app
        .post_json(
            "/api/auth/login",
            &json!({ "email": "nina@example.com", "password": "wrong" }),
            None,
        )
        .await?;
    assert_eq!(login.status(), StatusCode::UNAUTHORIZED);

    let me = app.get("/api/auth/me", None).await?;
    assert_eq!(me.status(), StatusCode::UNAUTHORIZED);
    Ok(())
}

#[tokio::test]
async fn vehicles_are_listed_per_owner_and_registrations_are_unique() -> Result<()> {
    let app = TestApp::new()?;
    app.insert_user("Nina", "0400 111 222", "nina@example.com", "pw", "CUSTOMER")?;
    let token = app.login_token("nina@example.com", "pw").await?;

    let add = app
        .post_json(
            "/api/vehicles",
            &json!({
                "registration": "ABC123",
                "make": "Toyota",
                "model": "Corolla",
                "year": 2019,
                "colour": "Blue",
                "last_service_date": "2025-01-15"
            }),
            Some(&token),
        )
        .await?;
    assert_eq!(add.status(), StatusCode::CREATED);

    let duplicate = app
        .post_json(
            "/api/vehicles",
            &json!({
                "registration": "ABC123",
                "make": "Mazda",
                "model": "3",
                "year": 2021,
                "colour": "Red",
                "last_service_date": "2025-02-01"
            }),
            Some(&token),
        )
        .await?;
    assert_eq!(duplicate.status(), StatusCode::CONFLICT);

    let list = app.get("/api/vehicles", Some(&token)).await?;
    assert_eq!(list.status(), StatusCode::OK);
    let body = body_to_vec(list.into_body()).await?;
    let vehicles: Vec<serde_json::Value> = serde_json::from_slice(&body)?;
    assert_eq!(vehicles.len(), 1);
    assert_eq!(vehicles[0]["registration"], "ABC123");
    Ok(())
}

#[tokio::test]
async fn owners_edit_and_remove_their_vehicles_but_nobody_elses() -> Result<()> {
    let app = TestApp::new()?;
    let owner = app.insert_user("Ada", "0400 111 222", "ada@example.com", "pw", "CUSTOMER")?;
    app.insert_user("Eve", "0400 333 444", "eve@example.com", "pw", "CUSTOMER")?;
    app.insert_vehicle("ABC123", owner)?;

    let update = json!({
        "make": "Toyota",
        "model": "Corolla",
        "year": 2019,
        "colour": "Green",
        "last_service_date": "2025-06-01"
    });

    let stranger_token = app.login_token("eve@example.com", "pw").await?;
    let denied = app
        .put_json("/api/vehicles/ABC123", &update, Some(&stranger_token))
        .await?;
    assert_eq!(denied.status(), StatusCode::FORBIDDEN);

    let owner_token = app.login_token("ada@example.com", "pw").await?;
    let updated = app
        .put_json("/api/vehicles/ABC123", &update, Some(&owner_token))
        .await?;
    assert_eq!(updated.status(), StatusCode::NO_CONTENT);

    let list = app.get("/api/vehicles", Some(&owner_token)).await?;
    let body = body_to_vec(list.into_body()).await?;
    let vehicles: Vec<serde_json::Value> = serde_json::from_slice(&body)?;
    assert_eq!(vehicles[0]["colour"], "Green");

    let removed = app.delete("/api/vehicles/ABC123", Some(&owner_token)).await?;
    assert_eq!(removed.status(), StatusCode::NO_CONTENT);

    let gone = app.delete("/api/vehicles/ABC123", Some(&owner_token)).await?;
    assert_eq!(gone.status(), StatusCode::NOT_FOUND);

    let list = app.get("/api/vehicles", Some(&owner_token)).await?;
    let body = body_to_vec(list.into_body()).await?;
    let vehicles: Vec<serde_json::Value> = serde_json::from_slice(&body)?;
    assert!(vehicles.is_empty());
    Ok(())
}

#[tokio::test]
async fn admin_creates_accounts_with_a_chosen_role() -> Result<()> {
    let app = TestApp::new()?;
    app.insert_user("Root", "0400 000 001", "admin@example.com", "pw", "ADMIN")?;
    app.insert_user("Nina", "0400 111 222", "nina@example.com", "pw", "CUSTOMER")?;
    let admin_token = app.login_token("admin@example.com", "pw").await?;

    let created = app
        .post_json(
            "/api/users",
            &json!({
                "first_name": "Max",
                "last_name": "Spanner",
                "phone": "0400 333 444",
                "email": "mech@example.com",
                "password": "pw",
                "role": "MECHANIC"
            }),
            Some(&admin_token),
        )
        .await?;
    assert_eq!(created.status(), StatusCode::CREATED);

    let picklist = app.get("/api/users/mechanics", Some(&admin_token)).await?;
    let body = body_to_vec(picklist.into_body()).await?;
    let mechanics: Vec<serde_json::Value> = serde_json::from_slice(&body)?;
    assert_eq!(mechanics.len(), 1);
    assert_eq!(mechanics[0]["email"], "mech@example.com");

    let bad_role = app
        .post_json(
            "/api/users",
            &json!({
                "first_name": "Sue",
                "last_name": "Chief",
                "phone": "0400 555 666",
                "email": "sue@example.com",
                "password": "pw",
                "role": "OVERLORD"
            }),
            Some(&admin_token),
        )
        .await?;
    assert_eq!(bad_role.status(), StatusCode::BAD_REQUEST);

    let customer_token = app.login_token("nina@example.com", "pw").await?;
    let denied = app
        .post_json(
            "/api/users",
            &json!({
                "first_name": "Sly",
                "last_name": "Fox",
                "phone": "0400 777 888",
                "email": "sly@example.com",
                "password": "pw",
                "role": "ADMIN"
            }),
            Some(&customer_token),
        )
        .await?;
    assert_eq!(denied.status(), StatusCode::FORBIDDEN);
    Ok(())
}

#[tokio::test]
async fn customer_directory_lists_vehicles_and_is_staff_only() -> Result<()> {
    let app = TestApp::new()?;
    let customer = app.insert_user("Nina", "0400 111 222", "nina@example.com", "pw", "CUSTOMER")?;
    app.insert_vehicle("ABC123", customer)?;
    app.insert_user("Max", "0400 333 444", "mech@example.com", "pw", "MECHANIC")?;

    let customer_token = app.login_token("nina@example.com", "pw").await?;
    let denied = app.get("/api/users/customers", Some(&customer_token)).await?;
    assert_eq!(denied.status(), StatusCode::FORBIDDEN);

    let mechanic_token = app.login_token("mech@example.com", "pw").await?;
    let allowed = app.get("/api/users/customers", Some(&mechanic_token)).await?;
    assert_eq!(allowed.status(), StatusCode::OK);
    let body = body_to_vec(allowed.into_body()).await?;
    let customers: Vec<serde_json::Value> = serde_json::from_slice(&body)?;
    assert_eq!(customers.len(), 1);
    assert_eq!(customers[0]["email"], "nina@example.com");
    assert_eq!(customers[0]["vehicles"][0]["registration"], "ABC123");
    Ok(())
}

#[tokio::test]
async fn admins_delete_users_but_never_themselves_or_root() -> Result<()> {
    let app = TestApp::new()?;
    // First insert takes id 1 and doubles as the protected root account.
    let root = app.insert_user("Root", "0400 000 001", "root@example.com", "pw", "ADMIN")?;
    let admin = app.insert_user("Admin", "0400 000 002", "admin@example.com", "pw", "ADMIN")?;
    let customer = app.insert_user("Nina", "0400 111 222", "nina@example.com", "pw", "CUSTOMER")?;
    assert_eq!(root, 1);

    let token = app.login_token("admin@example.com", "pw").await?;

    let delete_root = app.delete(&format!("/api/users/{root}"), Some(&token)).await?;
    assert_eq!(delete_root.status(), StatusCode::FORBIDDEN);

    let delete_self = app.delete(&format!("/api/users/{admin}"), Some(&token)).await?;
    assert_eq!(delete_self.status(), StatusCode::FORBIDDEN);

    let delete_customer = app
        .delete(&format!("/api/users/{customer}"), Some(&token))
        .await?;
    assert_eq!(delete_customer.status(), StatusCode::NO_CONTENT);

    let delete_again = app
        .delete(&format!("/api/users/{customer}"), Some(&token))
        .await?;
    assert_eq!(delete_again.status(), StatusCode::NOT_FOUND);
    Ok(())
}

#[tokio::test]
async fn mechanic_picklist_is_staff_only() -> Result<()> {
    let app = TestApp::new()?;
    app.insert_user("Nina", "0400 111 222", "nina@example.com", "pw", "CUSTOMER")?;
    app.insert_user("Max", "0400 333 444", "mech@example.com", "pw", "MECHANIC")?;
    app.insert_user("Sue", "0400 555 666", "super@example.com", "pw", "SUPERVISOR")?;

    let customer_token = app.login_token("nina@example.com", "pw").await?;
    let denied = app.get("/api/users/mechanics", Some(&customer_token)).await?;
    assert_eq!(denied.status(), StatusCode::FORBIDDEN);

    let supervisor_token = app.login_token("super@example.com", "pw").await?;
    let allowed = app.get("/api/users/mechanics", Some(&supervisor_token)).await?;
    assert_eq!(allowed.status(), StatusCode::OK);
    let body = body_to_vec(allowed.into_body()).await?;
    let mechanics: Vec<serde_json::Value> = serde_json::from_slice(&body)?;
    assert_eq!(mechanics.len(), 1);
    assert_eq!(mechanics[0]["email"], "mech@example.com");
    Ok(())
}
