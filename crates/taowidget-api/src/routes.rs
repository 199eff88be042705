//! HTTP routes under `/api/v1`.
//!
//! Every request gets its own [`ConnectionManager`], which is closed before
//! the response is sent.

use axum::extract::{Path, Query, State};
use axum::http::header::CONTENT_TYPE;
use axum::http::HeaderName;
use axum::response::{IntoResponse, Response};
use axum::routing::get;
use axum::{Json, Router, middleware};
use chrono::Utc;
use futures::FutureExt;
use futures::future::BoxFuture;
use serde::Deserialize;
use taowidget_chain::{BlockSampler, ChainError, ConnectionManager, Connector, parse_coldkey};
use taowidget_core::DEFAULT_LOOKBACK_DAYS;
use tower_http::trace::TraceLayer;

use crate::chart::render_chart;
use crate::error::ApiError;
use crate::timing::process_time;

pub const API_PREFIX: &str = "/api/v1";

/// Number of sampled heights dropped from the series.
pub const SKIPPED_BLOCKS_HEADER: HeaderName = HeaderName::from_static("x-skipped-blocks");

/// Lookback window query parameter.
#[derive(Debug, Clone, Copy, Deserialize)]
pub struct HistoryQuery {
    #[serde(default = "default_days")]
    pub days: u32,
}

fn default_days() -> u32 {
    DEFAULT_LOOKBACK_DAYS
}

/// Shared handler state.
#[derive(Clone)]
pub struct AppState<K> {
    connector: K,
}

impl<K: Connector + Clone> AppState<K> {
    pub fn new(connector: K) -> Self {
        Self { connector }
    }

    /// Run `op` on a connection owned by this request.
    async fn with_chain<T, F>(&self, op: F) -> Result<T, ChainError>
    where
        F: for<'c> FnOnce(&'c K::Connection) -> BoxFuture<'c, Result<T, ChainError>>,
    {
        let mut manager = ConnectionManager::new(self.connector.clone());
        let outcome = manager.acquire(op).await;
        manager.close().await;
        outcome
    }
}

/// Build the application router.
pub fn router<K>(connector: K) -> Router
where
    K: Connector + Clone + 'static,
{
    let api = Router::new()
        .route("/balance/{coldkey}", get(balance::<K>))
        .route("/stake/{coldkey}", get(stake::<K>))
        .route("/balance-history/{coldkey}", get(balance_history::<K>))
        .route("/chart/{coldkey}", get(chart::<K>))
        .with_state(AppState::new(connector));

    Router::new()
        .nest(API_PREFIX, api)
        .layer(middleware::from_fn(process_time))
        .layer(TraceLayer::new_for_http())
}

fn with_skipped(skipped: usize, body: impl IntoResponse) -> Response {
    ([(SKIPPED_BLOCKS_HEADER, skipped.to_string())], body).into_response()
}

async fn balance<K: Connector + Clone + 'static>(
    State(state): State<AppState<K>>,
    Path(coldkey): Path<String>,
    Query(query): Query<HistoryQuery>,
) -> Result<Response, ApiError> {
    let account = parse_coldkey(&coldkey)?;
    let sampler = BlockSampler::new(query.days);
    let report = state
        .with_chain(move |conn| {
            async move { sampler.balance_history(conn, &account).await }.boxed()
        })
        .await?;
    Ok(with_skipped(report.skipped.len(), Json(report.samples)))
}

async fn stake<K: Connector + Clone + 'static>(
    State(state): State<AppState<K>>,
    Path(coldkey): Path<String>,
    Query(query): Query<HistoryQuery>,
) -> Result<Response, ApiError> {
    let account = parse_coldkey(&coldkey)?;
    let sampler = BlockSampler::new(query.days);
    let report = state
        .with_chain(move |conn| {
            async move { sampler.stake_history(conn, &account).await }.boxed()
        })
        .await?;
    Ok(with_skipped(report.skipped.len(), Json(report.samples)))
}

async fn balance_history<K: Connector + Clone + 'static>(
    State(state): State<AppState<K>>,
    Path(coldkey): Path<String>,
    Query(query): Query<HistoryQuery>,
) -> Result<Response, ApiError> {
    let account = parse_coldkey(&coldkey)?;
    let sampler = BlockSampler::new(query.days);
    let report = state
        .with_chain(move |conn| {
            async move { sampler.daily_history(conn, &account).await }.boxed()
        })
        .await?;
    Ok(with_skipped(report.skipped, Json(report.days)))
}

async fn chart<K: Connector + Clone + 'static>(
    State(state): State<AppState<K>>,
    Path(coldkey): Path<String>,
    Query(query): Query<HistoryQuery>,
) -> Result<Response, ApiError> {
    let account = parse_coldkey(&coldkey)?;
    let sampler = BlockSampler::new(query.days);
    let report = state
        .with_chain(move |conn| {
            async move { sampler.daily_history(conn, &account).await }.boxed()
        })
        .await?;

    let days = report.days;
    let png = tokio::task::spawn_blocking(move || render_chart(&coldkey, &days, Utc::now()))
        .await??;
    Ok(with_skipped(report.skipped, ([(CONTENT_TYPE, "image/png")], png)))
}
