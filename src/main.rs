use anyhow::{Context, Result};
use dashplot::args::Args;
use dashplot::data::DataTable;
use dashplot::{build_dashboard, export, server};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse_grouped();

    let default_level = if args.debug { "debug" } else { "info" };
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level)),
        )
        .with_writer(std::io::stderr)
        .init();

    let table = DataTable::from_path(&args.csv, args.delimiter)
        .with_context(|| format!("Failed to load {}", args.csv.display()))?;
    tracing::info!(
        path = %args.csv.display(),
        rows = table.len(),
        columns = table.headers.len(),
        "loaded table"
    );
    if table.is_empty() {
        tracing::warn!(path = %args.csv.display(), "table has no data rows, charts will be empty");
    }

    let dashboard = build_dashboard(args.plot_options(), &table, &args.title)?;

    if let Some(dir) = &args.export {
        let written = export::export_all(&dashboard.charts, dir)?;
        tracing::info!(count = written.len(), dir = %dir.display(), "export finished");
        return Ok(());
    }

    server::serve(&args.host, args.port, dashboard).await
}
