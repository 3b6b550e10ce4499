use crate::handlers::{
    create_transaction, get_balance, health_check, list_transactions, metrics_handler,
};
use crate::metrics::track_http;
use crate::AppState;
use axum::{middleware, routing::get, Router};
use tower_http::{
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};

pub const API_BASE_PATH: &str = "/api/v1";

pub const TRANSACTION_ROUTE: &str = "/transaction";
pub const ACCOUNT_ROUTE: &str = "/account";
pub const HEALTH_ROUTE: &str = "/health";
pub const METRICS_ROUTE: &str = "/metrics";

/// Full application router with tracing, CORS and HTTP metrics
pub fn build_router(state: AppState) -> Router {
    let api = |route: &str| format!("{API_BASE_PATH}{route}");

    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        .route(
            &api(TRANSACTION_ROUTE),
            get(list_transactions).post(create_transaction),
        )
        .route(&api(ACCOUNT_ROUTE), get(get_balance))
        .route(&api(HEALTH_ROUTE), get(health_check))
        .route(METRICS_ROUTE, get(metrics_handler))
        .route_layer(middleware::from_fn_with_state(state.clone(), track_http))
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
