use std::any::Any;
use std::future::Future;

use axum::{
    extract::DefaultBodyLimit,
    http::{header, HeaderValue, Method},
    middleware::from_fn_with_state,
    response::{IntoResponse, Response},
    routing::{delete, get, post},
    Router,
};
use tokio::net::TcpListener;
use tower::ServiceBuilder;
use tower_http::{
    catch_panic::CatchPanicLayer,
    cors::{AllowOrigin, Any as AnyOrigin, CorsLayer},
    trace::{DefaultOnResponse, TraceLayer},
};
use tracing::Level;

use crate::config::SecurityConfig;
use crate::error::ApiError;
use crate::handlers::{protected, public};
use crate::middleware::jwt_auth_middleware;
use crate::state::AppState;

/// Build the full router: public routes, gated routes and global layers
pub fn app(state: AppState) -> Router {
    let response_level = if state.config.api.enable_request_logging {
        Level::INFO
    } else {
        Level::DEBUG
    };

    Router::new()
        .merge(public_routes())
        .merge(protected_routes(state.clone()))
        .fallback(|| async { ApiError::not_found("Route not found") })
        // Global middleware, outermost first
        .layer(
            ServiceBuilder::new()
                .layer(TraceLayer::new_for_http().on_response(DefaultOnResponse::new().level(response_level)))
                .layer(cors_layer(&state.config.security))
                .layer(CatchPanicLayer::custom(handle_panic))
                .layer(DefaultBodyLimit::max(state.config.api.max_request_size_bytes)),
        )
        .with_state(state)
}

fn public_routes() -> Router<AppState> {
    use public::{todo, user};

    Router::new()
        .route("/health", get(public::health))
        .route("/user", post(user::register))
        .route("/user/login", post(user::login))
        .route("/users", get(user::list))
        .route("/todo", get(todo::list))
}

/// Routes behind the auth gate. Paths shared with the public tier (`/user`,
/// `/todo`) merge per method, so only the methods listed here are gated.
/// The gate is a method-level route layer, leaving the 405 fallback of
/// shared paths ungated.
fn protected_routes(state: AppState) -> Router<AppState> {
    use protected::{todo, user};

    let gate = from_fn_with_state(state, jwt_auth_middleware);

    Router::new()
        .route(
            "/user",
            get(user::get)
                .put(user::update)
                .delete(user::delete)
                .route_layer(gate.clone()),
        )
        .route("/user/todo", get(user::todos).route_layer(gate.clone()))
        .route("/todo", post(todo::create).route_layer(gate.clone()))
        .route("/todo/:id", delete(todo::delete).route_layer(gate))
}

fn cors_layer(security: &SecurityConfig) -> CorsLayer {
    if !security.enable_cors {
        return CorsLayer::new();
    }

    let base = CorsLayer::new()
        .allow_methods([Method::GET, Method::POST, Method::PUT, Method::DELETE])
        .allow_headers([header::AUTHORIZATION, header::CONTENT_TYPE]);

    if security.cors_origins.iter().any(|o| o == "*") {
        return base.allow_origin(AnyOrigin);
    }

    let origins: Vec<HeaderValue> = security
        .cors_origins
        .iter()
        .filter_map(|origin| match origin.parse() {
            Ok(value) => Some(value),
            Err(_) => {
                tracing::warn!("Ignoring invalid CORS origin: {}", origin);
                None
            }
        })
        .collect();

    base.allow_origin(AllowOrigin::list(origins))
}

fn handle_panic(err: Box<dyn Any + Send + 'static>) -> Response {
    let detail = if let Some(s) = err.downcast_ref::<String>() {
        s.as_str()
    } else if let Some(s) = err.downcast_ref::<&str>() {
        s
    } else {
        "unknown panic payload"
    };

    tracing::error!("Handler panicked: {}", detail);
    ApiError::internal_server_error("An unexpected error occurred").into_response()
}

/// Serve `app(state)` on `listener` until `shutdown` resolves
pub async fn serve<F>(listener: TcpListener, state: AppState, shutdown: F) -> std::io::Result<()>
where
    F: Future<Output = ()> + Send + 'static,
{
    axum::serve(listener, app(state))
        .with_graceful_shutdown(shutdown)
        .await
}

/// Resolves on Ctrl-C, or SIGTERM on unix
pub async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!("Failed to listen for Ctrl-C: {}", e);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => {
                tracing::error!("Failed to listen for SIGTERM: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }

    tracing::info!("Shutdown signal received");
}
