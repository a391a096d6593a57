use axum::{http::Method, routing::get, Json, Router};
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

pub mod auth;
pub mod error;
pub mod flights;
pub mod hotels;
pub mod middleware;
pub mod state;
pub mod support;
pub mod users;
pub mod visas;

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

    let public = Router::new()
        .merge(auth::routes())
        .merge(flights::public_routes())
        .merge(hotels::public_routes());

    let protected = Router::new()
        .merge(auth::session_routes())
        .merge(users::routes())
        .merge(flights::booking_routes())
        .merge(hotels::booking_routes())
        .merge(visas::routes())
        .merge(support::routes())
        .layer(axum::middleware::from_fn_with_state(
            state.clone(),
            middleware::require_auth,
        ));

    let admin = Router::new()
        .merge(users::admin_routes())
        .merge(flights::admin_routes())
        .merge(hotels::admin_routes())
        .merge(visas::admin_routes())
        .merge(support::admin_routes())
        .layer(axum::middleware::from_fn_with_state(
            state.clone(),
            middleware::require_admin,
        ));

    let v1 = public.merge(protected).nest("/admin", admin);

    Router::new()
        .nest("/api/v1", v1)
        .route("/health", get(health))
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

async fn health() -> Json<serde_json::Value> {
    Json(serde_json::json!({
        "status": "ok",
        "time": chrono::Utc::now(),
    }))
}
