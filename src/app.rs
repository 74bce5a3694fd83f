use std::time::Duration;

use axum::{
    http::{header, HeaderValue, Method},
    routing::{delete, get, post},
    Router,
};
use tower::ServiceBuilder;
use tower_http::{
    catch_panic::CatchPanicLayer,
    cors::{AllowOrigin, CorsLayer},
    request_id::{MakeRequestUuid, PropagateRequestIdLayer, SetRequestIdLayer},
    timeout::TimeoutLayer,
    trace::TraceLayer,
};

use crate::config::{AppConfig, SecurityConfig};
use crate::error::ApiError;
use crate::handlers::{contact, guestbook, health, posts, stats};
use crate::middleware::recovery;
use crate::state::AppState;

const CORS_MAX_AGE: Duration = Duration::from_secs(86_400);

/// Build the full router: every resource plus the global middleware stack.
pub fn app(state: AppState) -> Router {
    let config = state.config.clone();
    with_middleware(routes().with_state(state), &config)
}

/// Every resource route and the JSON 404 fallback, before state is attached.
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/api/health", get(health::health))
        .merge(post_routes())
        .merge(guestbook_routes())
        .merge(contact_routes())
        .merge(stats_routes())
        .fallback(not_found)
}

/// Wrap a router in the global stack: panic recovery, request ids, tracing,
/// CORS and the request timeout.
pub fn with_middleware(router: Router, config: &AppConfig) -> Router {
    let timeout = Duration::from_secs(config.server.request_timeout_secs);

    router.layer(
        ServiceBuilder::new()
            .layer(CatchPanicLayer::custom(recovery::handle_panic))
            .layer(SetRequestIdLayer::x_request_id(MakeRequestUuid))
            .layer(TraceLayer::new_for_http())
            .layer(PropagateRequestIdLayer::x_request_id())
            .layer(cors_layer(&config.security))
            .layer(TimeoutLayer::new(timeout)),
    )
}

fn post_routes() -> Router<AppState> {
    Router::new()
        .route("/api/posts", get(posts::list_posts).post(posts::create_post))
        // GET addresses a post by slug; PUT and DELETE by id
        .route(
            "/api/posts/:key",
            get(posts::get_post)
                .put(posts::update_post)
                .delete(posts::delete_post),
        )
}

fn guestbook_routes() -> Router<AppState> {
    Router::new()
        .route(
            "/api/guestbook",
            get(guestbook::list_entries).post(guestbook::submit_entry),
        )
        .route("/api/guestbook/pending", get(guestbook::list_pending))
        .route("/api/guestbook/:id", delete(guestbook::delete_entry))
        .route("/api/guestbook/:id/approve", post(guestbook::approve_entry))
}

fn contact_routes() -> Router<AppState> {
    Router::new()
        .route(
            "/api/contact",
            get(contact::list_submissions).post(contact::submit_contact),
        )
        .route("/api/contact/:id", axum::routing::patch(contact::update_status))
}

fn stats_routes() -> Router<AppState> {
    Router::new()
        .route("/api/stats", get(stats::list_stats).post(stats::record_stat))
        .route("/api/stats/page/:page_path", get(stats::list_stats_by_page))
        .route("/api/stats/:id", get(stats::get_stat).put(stats::update_stat))
}

async fn not_found() -> ApiError {
    ApiError::not_found("not found")
}

fn cors_layer(security: &SecurityConfig) -> CorsLayer {
    let base = CorsLayer::new()
        .allow_methods([
            Method::GET,
            Method::POST,
            Method::PUT,
            Method::DELETE,
            Method::PATCH,
            Method::OPTIONS,
        ])
        .allow_headers([
            header::CONTENT_TYPE,
            header::AUTHORIZATION,
            header::HeaderName::from_static("x-requested-with"),
        ])
        .max_age(CORS_MAX_AGE);

    // Credentials cannot be combined with a wildcard origin
    if security.cors_origins.iter().any(|o| o == "*") {
        return base.allow_origin(AllowOrigin::any());
    }

    let origins: Vec<HeaderValue> = security
        .cors_origins
        .iter()
        .filter_map(|origin| match HeaderValue::from_str(origin) {
            Ok(value) => Some(value),
            Err(_) => {
                tracing::warn!(origin = %origin, "ignoring invalid CORS origin");
                None
            }
        })
        .collect();

    base.allow_origin(AllowOrigin::list(origins))
        .allow_credentials(true)
}
