// HTTP render host for the dashboard

use crate::chart::ChartDescriptor;
use crate::dashboard::Dashboard;
use anyhow::{Context, Result};
use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::{Html, IntoResponse, Json, Response},
    routing::get,
    Router,
};
use std::sync::Arc;

/// Rendered once at startup, shared read-only between requests
pub struct AppState {
    pub dashboard: Dashboard,
    pub page: String,
}

impl AppState {
    pub fn new(dashboard: Dashboard) -> Result<Self> {
        let page = dashboard
            .render_html()
            .context("Failed to render dashboard page")?;
        Ok(Self { dashboard, page })
    }
}

pub fn router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/", get(index))
        .route("/api/charts", get(list_charts))
        .route("/api/charts/:id", get(get_chart))
        .route("/healthz", get(|| async { "ok" }))
        .with_state(state)
}

async fn index(State(state): State<Arc<AppState>>) -> Html<String> {
    Html(state.page.clone())
}

async fn list_charts(State(state): State<Arc<AppState>>) -> Json<Vec<ChartDescriptor>> {
    Json(state.dashboard.charts.clone())
}

async fn get_chart(State(state): State<Arc<AppState>>, Path(id): Path<String>) -> Response {
    match state.dashboard.chart(&id) {
        Some(chart) => Json(chart.clone()).into_response(),
        None => (StatusCode::NOT_FOUND, format!("no chart '{}'", id)).into_response(),
    }
}

/// Bind and serve until the process is stopped
pub async fn serve(host: &str, port: u16, dashboard: Dashboard) -> Result<()> {
    let chart_count = dashboard.charts.len();
    let state = Arc::new(AppState::new(dashboard)?);
    let app = router(state);

    let addr = format!("{}:{}", host, port);
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .with_context(|| format!("Failed to bind {}", addr))?;

    tracing::info!(charts = chart_count, "Dashboard running on http://{}/", addr);

    axum::serve(listener, app).await.context("Server error")?;
    Ok(())
}
