use std::net::SocketAddr;
use std::sync::Arc;

use anyhow::{Context, Result};
use axum::extract::{Form, Query, State};
use axum::http::{StatusCode, header};
use axum::response::{Html, IntoResponse, Response};
use axum::routing::get;
use axum::{Json, Router};
use serde_json::Value;
use tokio::net::TcpListener;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;
use tracing::info;

use crate::admin;
use crate::config::ServerConfig;
use crate::live::Unavailable;
use crate::rpc::{self, Params, RpcOutcome};
use crate::store::Store;
use crate::types::StateSnapshot;

/// Path prefix under which every route is also served.
pub const ROUTE_PREFIX: &str = "/pmf";

/// Shared state for axum handlers.
#[derive(Clone)]
pub struct AppState {
    pub store: Arc<Store>,
    pub version: Arc<str>,
}

impl AppState {
    pub fn new(store: Arc<Store>, version: &str) -> Self {
        Self {
            store,
            version: Arc::from(version),
        }
    }
}

/// Build the full router, with CORS and request tracing.
pub fn router(state: AppState) -> Router {
    let mut app = Router::new().route(ROUTE_PREFIX, get(admin_page));
    for prefix in ["", ROUTE_PREFIX] {
        app = app
            .route(&format!("{prefix}/"), get(admin_page))
            .route(&format!("{prefix}/favicon.ico"), get(favicon))
            .route(&format!("{prefix}/__version"), get(version))
            .route(&format!("{prefix}/api/state"), get(api_state))
            .route(&format!("{prefix}/api/events"), get(api_events))
            .route(&format!("{prefix}/rpc"), get(rpc_query).post(rpc_form))
            .route(&format!("{prefix}/live"), get(live_redirect));
    }

    app.layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(state)
}

/// Bind the configured address and serve until Ctrl+C.
pub async fn serve(config: &ServerConfig, state: AppState) -> Result<()> {
    let addr: SocketAddr = format!("{}:{}", config.host, config.port)
        .parse()
        .with_context(|| format!("invalid listen address {}:{}", config.host, config.port))?;
    let listener = TcpListener::bind(addr)
        .await
        .with_context(|| format!("failed to bind {addr}"))?;

    info!("Mirror console listening on http://{addr} (build: {})", state.version);

    axum::serve(listener, router(state))
        .with_graceful_shutdown(async {
            if tokio::signal::ctrl_c().await.is_ok() {
                info!("Shutdown signal received");
            }
        })
        .await
        .context("server error")?;
    Ok(())
}

async fn admin_page(State(state): State<AppState>) -> Html<String> {
    Html(admin::render(&state.version))
}

async fn favicon() -> StatusCode {
    StatusCode::NO_CONTENT
}

async fn version(State(state): State<AppState>) -> String {
    state.version.to_string()
}

async fn api_state(State(state): State<AppState>) -> Json<StateSnapshot> {
    Json(state.store.snapshot())
}

/// Placeholder event feed; the console has no mirroring engine to report.
async fn api_events() -> Json<Vec<Value>> {
    Json(Vec::new())
}

async fn rpc_query(State(state): State<AppState>, Query(params): Query<Params>) -> Response {
    rpc_response(rpc::execute_params(&state.store, &params))
}

async fn rpc_form(State(state): State<AppState>, Form(params): Form<Params>) -> Response {
    rpc_response(rpc::execute_params(&state.store, &params))
}

fn rpc_response(outcome: RpcOutcome) -> Response {
    let status =
        StatusCode::from_u16(outcome.status_code()).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
    (status, Json(outcome.into_body())).into_response()
}

async fn live_redirect(State(state): State<AppState>) -> Response {
    match state.store.fetch_live() {
        Ok(link) => (StatusCode::FOUND, [(header::LOCATION, link.url)]).into_response(),
        Err(Unavailable::NeverPublished) => (
            StatusCode::SERVICE_UNAVAILABLE,
            "Live link not published yet",
        )
            .into_response(),
        Err(Unavailable::Stale { age_secs }) => (
            StatusCode::SERVICE_UNAVAILABLE,
            format!(
                "Live link is stale (age {age_secs}s > {}s)",
                state.store.live_stale_after_secs()
            ),
        )
            .into_response(),
    }
}
