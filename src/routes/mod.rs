use axum::{
    middleware,
    routing::{delete, get, post, put},
    Router,
};
use tower_http::cors::{AllowOrigin, CorsLayer};

use crate::{auth::AuthenticatedUser, state::AppState};

pub mod appointments;
pub mod auth;
pub mod bookings;
pub mod health;
pub mod users;
pub mod vehicles;

pub fn create_router(state: AppState) -> Router<()> {
    let cors = CorsLayer::new()
        .allow_origin(AllowOrigin::mirror_request())
        .allow_methods(tower_http::cors::AllowMethods::mirror_request())
        .allow_headers(tower_http::cors::AllowHeaders::mirror_request())
        .allow_credentials(true);

    let appointments_routes = Router::new()
        .route("/", get(appointments::list_appointments))
        .route("/:id/cancel", post(appointments::cancel_appointment))
        .route("/:id/status", post(appointments::update_status))
        .route("/:id/mechanic", post(appointments::assign_mechanic));

    let vehicles_routes = Router::new()
        .route(
            "/",
            get(vehicles::list_vehicles).post(vehicles::add_vehicle),
        )
        .route(
            "/:registration",
            put(vehicles::update_vehicle).delete(vehicles::delete_vehicle),
        );

    let users_routes = Router::new()
        .route("/", post(users::create_user))
        .route("/mechanics", get(users::list_mechanics))
        .route("/customers", get(users::list_customers))
        .route("/:id", delete(users::delete_user));

    let protected_state = state.clone();
    let protected_routes = Router::new()
        .route("/api/auth/me", get(auth::me))
        .route("/api/bookings", post(bookings::customer_booking))
        .route("/api/admin/bookings", post(bookings::admin_booking))
        .nest("/api/appointments", appointments_routes)
        .nest("/api/vehicles", vehicles_routes)
        .nest("/api/users", users_routes)
        .layer(middleware::from_extractor_with_state::<AuthenticatedUser, _>(protected_state));

    Router::new()
        .merge(protected_routes)
        .route("/api/auth/login", post(auth::login))
        .route("/api/signup", post(users::signup))
        .route("/api/bookings/walk-in", post(bookings::walk_in_booking))
        .route("/api/health", get(health::health_check))
        .with_state(state)
        .layer(cors)
}
