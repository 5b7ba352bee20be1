//! HTTP routes for the statistic feeds.

use crate::app::handlers::{Endpoint, HandlerSet};
use crate::core::respond::HandlerResponse;
use crate::core::Query;
use axum::extract::{RawQuery, State};
use axum::http::header::{CACHE_CONTROL, CONTENT_TYPE};
use axum::http::HeaderValue;
use axum::response::{IntoResponse, Response};
use axum::routing::get;
use axum::{Json, Router};
use serde::Serialize;
use std::net::SocketAddr;
use tokio::net::TcpListener;

impl IntoResponse for HandlerResponse {
    fn into_response(self) -> Response {
        let content_type = self.content_type();
        let mut response = (self.status, [(CONTENT_TYPE, content_type)], self.body).into_response();
        if let Some(value) = self
            .cache_control
            .and_then(|cc| HeaderValue::from_str(&cc).ok())
        {
            response.headers_mut().insert(CACHE_CONTROL, value);
        }
        response
    }
}

#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
}

async fn health() -> Json<HealthResponse> {
    Json(HealthResponse { status: "ok" })
}

/// 寬鬆解析查詢字串，無法解碼的部分直接略過
fn parse_query(raw: Option<String>) -> Query {
    raw.map(|q| {
        url::form_urlencoded::parse(q.as_bytes())
            .into_owned()
            .collect()
    })
    .unwrap_or_default()
}

async fn dispatch(handlers: &HandlerSet, endpoint: Endpoint, query: Query) -> HandlerResponse {
    tracing::debug!("Handling {} with {} query params", endpoint, query.len());
    handlers.get(endpoint).handle(&query).await
}

async fn ofgem_cap(State(handlers): State<HandlerSet>) -> HandlerResponse {
    dispatch(&handlers, Endpoint::OfgemCap, Query::new()).await
}

async fn house_price(State(handlers): State<HandlerSet>) -> HandlerResponse {
    dispatch(&handlers, Endpoint::HousePrice, Query::new()).await
}

async fn forex_rates(
    State(handlers): State<HandlerSet>,
    RawQuery(raw): RawQuery,
) -> HandlerResponse {
    dispatch(&handlers, Endpoint::ForexRates, parse_query(raw)).await
}

pub fn create_router(handlers: HandlerSet) -> Router {
    Router::new()
        .route("/health", get(health))
        .route(Endpoint::OfgemCap.route(), get(ofgem_cap))
        .route(Endpoint::HousePrice.route(), get(house_price))
        .route(Endpoint::ForexRates.route(), get(forex_rates))
        .with_state(handlers)
}

pub async fn serve(bind: SocketAddr, handlers: HandlerSet) -> std::io::Result<()> {
    let listener = TcpListener::bind(bind).await?;
    tracing::info!("🚀 Serving statistic feeds on http://{}", bind);
    for endpoint in Endpoint::ALL {
        tracing::info!("   GET {}", endpoint.route());
    }

    axum::serve(listener, create_router(handlers))
        .with_graceful_shutdown(shutdown_signal())
        .await
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!("Failed to listen for shutdown signal: {}", e);
        std::future::pending::<()>().await;
    }
    tracing::info!("Shutdown signal received");
}
