//! The conversion proxy: one stateless route that shields the upstream
//! API credential from client-reachable code.

use crate::config::AppConfig;
use crate::core::cache::Cache;
use crate::core::rates::PairRateProvider;
use crate::providers::exchange_rate_api::ExchangeRateApiProvider;
use anyhow::Result;
use axum::{
    Json, Router,
    extract::{Query, State},
    http::{StatusCode, header},
    response::{IntoResponse, Response},
    routing::get,
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use std::time::Duration;
use tokio::net::TcpListener;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;
use tracing::{error, info, warn};

/// Matches the upstream fetch cache; the header additionally allows a stale
/// copy to be served for two more hours while revalidating.
const UPSTREAM_CACHE_TTL: Duration = Duration::from_secs(3600);
const CACHE_CONTROL_VALUE: &str = "public, s-maxage=3600, stale-while-revalidate=7200";

/// Shared state for the convert route. `rates` is `None` when the upstream
/// credential is absent; requests then fail soft with a 500.
pub struct AppState {
    pub rates: Option<Arc<dyn PairRateProvider>>,
}

impl AppState {
    pub fn from_config(config: &AppConfig) -> Self {
        let rates = config.api_key.as_ref().map(|key| {
            let cache = Arc::new(Cache::new(UPSTREAM_CACHE_TTL));
            Arc::new(ExchangeRateApiProvider::new(
                &config.upstream.base_url,
                key,
                cache,
            )) as Arc<dyn PairRateProvider>
        });

        if rates.is_none() {
            warn!("EXCHANGE_API_KEY is not set; conversion requests will be rejected");
        }

        AppState { rates }
    }
}

/// Build the Axum application router.
pub fn build_router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/api/convert", get(convert))
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// Start the conversion proxy.
pub async fn run(config: &AppConfig) -> Result<()> {
    let state = Arc::new(AppState::from_config(config));
    let app = build_router(state);

    let listener = TcpListener::bind(&config.server.bind).await?;
    info!("Conversion proxy listening on {}", config.server.bind);
    axum::serve(listener, app).await?;
    Ok(())
}

#[derive(Deserialize)]
struct ConvertParams {
    from: Option<String>,
    to: Option<String>,
    amount: Option<String>,
}

#[derive(Serialize)]
struct ConvertResponse {
    conversion_rate: f64,
    conversion_result: f64,
}

#[derive(Serialize)]
struct ErrorBody {
    error: String,
}

async fn convert(
    State(state): State<Arc<AppState>>,
    Query(params): Query<ConvertParams>,
) -> Response {
    let (Some(from), Some(to), Some(amount)) = (params.from, params.to, params.amount) else {
        return error_response(
            StatusCode::BAD_REQUEST,
            "Missing required parameters: from, to, amount",
        );
    };

    let amount = match amount.parse::<f64>() {
        Ok(amount) if amount.is_finite() && amount > 0.0 => amount,
        _ => {
            return error_response(StatusCode::BAD_REQUEST, "Amount must be a positive number");
        }
    };

    let Some(rates) = &state.rates else {
        return error_response(StatusCode::INTERNAL_SERVER_ERROR, "API key not configured");
    };

    match rates.convert_pair(&from, &to, amount).await {
        Ok(conversion) => (
            StatusCode::OK,
            [(header::CACHE_CONTROL, CACHE_CONTROL_VALUE)],
            // Only the pair data; the full upstream payload stays server-side
            Json(ConvertResponse {
                conversion_rate: conversion.rate,
                conversion_result: conversion.converted,
            }),
        )
            .into_response(),
        Err(e) => {
            // Detail stays in the logs; the client gets one generic message
            error!(error = %e, from = %from, to = %to, "Currency conversion failed");
            error_response(StatusCode::INTERNAL_SERVER_ERROR, "Failed to convert currency")
        }
    }
}

fn error_response(status: StatusCode, message: &str) -> Response {
    (
        status,
        Json(ErrorBody {
            error: message.to_string(),
        }),
    )
        .into_response()
}
