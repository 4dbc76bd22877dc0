use axum::{
    http::Method,
    routing::{get, post, put},
    Json, Router,
};
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

pub mod admin;
pub mod bookings;
pub mod checkin;
pub mod error;
pub mod flights;
pub mod middleware;
pub mod payments;
pub mod profile;
pub mod state;

pub use state::AppState;

pub fn app(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(tower_http::cors::Any)
        .allow_methods([Method::GET, Method::POST, Method::PUT, Method::OPTIONS])
        .allow_headers([
            axum::http::header::AUTHORIZATION,
            axum::http::header::CONTENT_TYPE,
        ]);

    let passenger_routes = Router::new()
        .route("/flights/search", get(flights::search_flights))
        .route("/flights/{flight_id}", get(flights::flight_details))
        .route("/flights/{flight_id}/seat-map", get(flights::seat_map))
        .route("/bookings", post(bookings::create_booking))
        .route("/bookings/upcoming", get(bookings::upcoming_bookings))
        .route("/bookings/past", get(bookings::past_bookings))
        .route("/bookings/{booking_id}/cancel", post(bookings::cancel_booking))
        .route("/payments", post(payments::process_payment))
        .route("/check-in/{ticket_id}", post(checkin::check_in))
        .route("/announcements", get(flights::announcements))
        .route(
            "/profile",
            post(profile::upsert_profile).get(profile::get_profile),
        )
        .layer(axum::middleware::from_fn_with_state(
            state.clone(),
            middleware::auth::passenger_auth,
        ));

    let staff_routes = Router::new()
        .route(
            "/airplanes",
            post(admin::create_airplane).get(admin::list_airplanes),
        )
        .route("/flights", post(admin::create_flight).get(admin::list_flights))
        .route(
            "/flights/{flight_id}",
            get(admin::get_flight).put(admin::update_flight),
        )
        .route("/announcements", post(admin::create_announcement))
        .route("/bookings", get(admin::list_bookings))
        .route("/bookings/{booking_id}/cancel", post(admin::cancel_booking))
        .route(
            "/bookings/{booking_id}/reassign-seat",
            put(admin::reassign_seat),
        )
        .layer(axum::middleware::from_fn_with_state(
            state.clone(),
            middleware::auth::staff_auth,
        ));

    Router::new()
        .route("/health", get(health))
        .nest("/api/v1/passenger", passenger_routes)
        .nest("/api/v1/staff", staff_routes)
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

async fn health() -> Json<serde_json::Value> {
    Json(serde_json::json!({ "status": "healthy" }))
}
