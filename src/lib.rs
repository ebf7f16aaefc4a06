// Library exports for dashplot

pub mod args;
pub mod chart;
pub mod dashboard;
pub mod data;
pub mod error;
pub mod export;
pub mod request;
pub mod server;

use anyhow::{Context, Result};
use chart::build_all;
use dashboard::Dashboard;
use data::DataTable;
use request::{assemble, PlotOptions};

/// Turn plot flags and a loaded table into the dashboard to serve.
/// Configuration errors are reported before any column is read.
pub fn build_dashboard(options: PlotOptions, table: &DataTable, title: &str) -> Result<Dashboard> {
    let requests = assemble(options).context("Invalid plot configuration")?;
    if requests.is_empty() {
        tracing::warn!("no plots requested; use --hist or --scatter with -x/-y");
    }

    let charts = build_all(&requests, table).context("Failed to build charts")?;
    Ok(Dashboard::new(title, charts))
}
