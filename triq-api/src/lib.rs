use axum::{
    extract::State,
    http::Method,
    response::IntoResponse,
    routing::{get, post, put},
    Router,
};
use std::net::SocketAddr;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

pub mod auth;
pub mod bookings;
pub mod error;
pub mod middleware;
pub mod payments;
pub mod profile;
pub mod ratings;
pub mod reports;
pub mod rides;
pub mod state;
pub mod vehicles;
pub mod worker;

#[cfg(test)]
mod payments_tests;

pub use state::AppState;

pub fn app(state: AppState) -> Router {
    // CORS Middleware
    let cors = CorsLayer::new()
        .allow_origin(tower_http::cors::Any)
        .allow_methods([
            Method::GET,
            Method::POST,
            Method::PUT,
            Method::DELETE,
            Method::OPTIONS,
        ])
        .allow_headers([
            axum::http::header::AUTHORIZATION,
            axum::http::header::CONTENT_TYPE,
            axum::http::header::USER_AGENT,
        ]);

    // Ride search, city autocomplete and received ratings are public; the
    // rest of the surface requires a token.
    let public = Router::new()
        .merge(auth::routes())
        .route("/v1/rides", get(rides::list_rides))
        .route("/v1/cities", get(rides::list_cities))
        .route("/v1/users/{id}/ratings", get(ratings::list_ratings));

    let protected = Router::new()
        .route("/v1/rides", post(rides::create_ride))
        .route("/v1/rides/quote", get(rides::quote_ride))
        .route("/v1/rides/mine", get(rides::list_my_rides))
        .route(
            "/v1/rides/{id}",
            get(rides::get_ride).delete(rides::delete_ride),
        )
        .route("/v1/rides/{id}/publish", post(rides::publish_ride))
        .route("/v1/rides/{id}/start", post(rides::start_ride))
        .route("/v1/rides/{id}/complete", post(rides::complete_ride))
        .route("/v1/rides/{id}/seats/stream", get(rides::seat_stream))
        .route("/v1/rides/{id}/bookings", post(bookings::create_booking))
        .route("/v1/rides/{id}/reports", post(reports::create_report))
        .route("/v1/bookings", get(bookings::list_bookings))
        .route("/v1/bookings/{id}/confirm", post(bookings::confirm_booking))
        .route("/v1/bookings/{id}/reject", post(bookings::reject_booking))
        .route("/v1/bookings/{id}/cancel", post(bookings::cancel_booking))
        .route("/v1/bookings/{id}/payment", post(payments::initiate_payment))
        .route(
            "/v1/bookings/{id}/payment/validate",
            post(payments::validate_payment),
        )
        .route("/v1/bookings/{id}/ratings", post(ratings::create_rating))
        .route("/v1/reports", get(reports::list_reports))
        .route(
            "/v1/vehicles",
            get(vehicles::list_vehicles).post(vehicles::create_vehicle),
        )
        .route(
            "/v1/vehicles/{id}",
            put(vehicles::update_vehicle).delete(vehicles::delete_vehicle),
        )
        .route(
            "/v1/profile",
            get(profile::get_profile).put(profile::update_profile),
        )
        .route_layer(axum::middleware::from_fn_with_state(
            state.clone(),
            middleware::auth::auth_middleware,
        ));

    Router::new()
        .merge(public)
        .merge(protected)
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .layer(axum::middleware::from_fn_with_state(
            state.clone(),
            rate_limit_middleware,
        ))
        .with_state(state)
}

async fn rate_limit_middleware(
    State(state): State<AppState>,
    axum::extract::ConnectInfo(addr): axum::extract::ConnectInfo<SocketAddr>,
    req: axum::extract::Request,
    next: axum::middleware::Next,
) -> Result<impl IntoResponse, impl IntoResponse> {
    let ip = addr.ip().to_string();
    let key = format!("ratelimit:{}", ip);

    match state
        .redis
        .check_rate_limit(&key, state.business_rules.rate_limit_per_minute, 60)
        .await
    {
        Ok(true) => Ok(next.run(req).await),
        Ok(false) => Err((
            axum::http::StatusCode::TOO_MANY_REQUESTS,
            "Rate limit exceeded",
        )),
        Err(_) => Ok(next.run(req).await), // Fail open
    }
}
