use crate::chart::{ChartDescriptor, SeriesType};
use anyhow::{Context, Result};
use image::ImageEncoder;
use plotters::prelude::*;
use serde_json::Value;
use std::fs;
use std::ops::Range;
use std::path::{Path, PathBuf};

pub const EXPORT_WIDTH: u32 = 800;
pub const EXPORT_HEIGHT: u32 = 600;

/// Series of a chart reduced to the numeric values plotters can draw
struct NumericSeries {
    name: String,
    x: Vec<f64>,
    y: Vec<f64>,
}

/// Canvas for rasterising one chart descriptor
pub struct Canvas {
    buffer: Vec<u8>,
    width: u32,
    height: u32,
}

impl Canvas {
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            buffer: vec![0u8; (width * height * 3) as usize],
            width,
            height,
        }
    }

    /// Draw a histogram chart: every series binned on a shared set of bins, overlaid
    pub fn draw_histogram(&mut self, chart: &ChartDescriptor) -> Result<()> {
        let series = numeric_series(chart);
        let all: Vec<f64> = series.iter().flat_map(|s| s.x.iter().copied()).collect();
        if all.is_empty() {
            anyhow::bail!("Chart '{}' has no numeric data", chart.id);
        }

        let edges = bin_edges(&all)?;
        let binned: Vec<Vec<usize>> = series.iter().map(|s| bin_counts(&s.x, &edges)).collect();
        let max_count = binned.iter().flatten().copied().max().unwrap_or(0).max(1);

        let x_range = edges[0]..edges[edges.len() - 1];
        let y_range = 0.0..(max_count as f64 * 1.05);

        let root = BitMapBackend::with_buffer(&mut self.buffer, (self.width, self.height))
            .into_drawing_area();
        root.fill(&WHITE).context("Failed to fill background")?;

        let mut plot = ChartBuilder::on(&root)
            .margin(10)
            .caption(chart.layout.title.as_deref().unwrap_or(""), ("sans-serif", 20))
            .x_label_area_size(40)
            .y_label_area_size(50)
            .build_cartesian_2d(x_range, y_range)
            .context("Failed to build chart")?;

        plot.configure_mesh()
            .y_desc(chart.y_title().unwrap_or(""))
            .x_desc(chart.x_title().unwrap_or(""))
            .draw()
            .context("Failed to draw mesh")?;

        for (idx, (s, counts)) in series.iter().zip(&binned).enumerate() {
            let color = Palette99::pick(idx).to_rgba();
            let fill = color.mix(0.5).filled();
            let bars = counts.iter().enumerate().map(|(bin, &count)| {
                Rectangle::new([(edges[bin], 0.0), (edges[bin + 1], count as f64)], fill)
            });
            plot.draw_series(bars)
                .context("Failed to draw histogram bars")?
                .label(s.name.clone())
                .legend(move |(x, y)| Rectangle::new([(x, y - 5), (x + 10, y + 5)], color.filled()));
        }

        if chart.layout.showlegend {
            plot.configure_series_labels()
                .background_style(WHITE.mix(0.8))
                .border_style(BLACK)
                .draw()
                .context("Failed to draw legend")?;
        }

        root.present().context("Failed to present drawing")?;
        Ok(())
    }

    /// Draw a scatter chart: one marker series per (x, y) pair
    pub fn draw_scatter(&mut self, chart: &ChartDescriptor) -> Result<()> {
        let series = numeric_series(chart);
        let xs: Vec<f64> = series.iter().flat_map(|s| s.x.iter().copied()).collect();
        let ys: Vec<f64> = series.iter().flat_map(|s| s.y.iter().copied()).collect();
        if xs.is_empty() {
            anyhow::bail!("Chart '{}' has no numeric data", chart.id);
        }

        let root = BitMapBackend::with_buffer(&mut self.buffer, (self.width, self.height))
            .into_drawing_area();
        root.fill(&WHITE).context("Failed to fill background")?;

        let mut plot = ChartBuilder::on(&root)
            .margin(10)
            .caption(chart.layout.title.as_deref().unwrap_or(""), ("sans-serif", 20))
            .x_label_area_size(40)
            .y_label_area_size(50)
            .build_cartesian_2d(padded_range(&xs)?, padded_range(&ys)?)
            .context("Failed to build chart")?;

        plot.configure_mesh()
            .x_desc(chart.x_title().unwrap_or(""))
            .y_desc(chart.y_title().unwrap_or(""))
            .draw()
            .context("Failed to draw mesh")?;

        for (idx, s) in series.iter().enumerate() {
            let color = Palette99::pick(idx).to_rgba();
            let points = s.x.iter().zip(&s.y).map(|(&x, &y)| Circle::new((x, y), 3, color.filled()));
            plot.draw_series(points)
                .context("Failed to draw point series")?
                .label(s.name.clone())
                .legend(move |(x, y)| Circle::new((x + 5, y), 3, color.filled()));
        }

        if chart.layout.showlegend {
            plot.configure_series_labels()
                .background_style(WHITE.mix(0.8))
                .border_style(BLACK)
                .draw()
                .context("Failed to draw legend")?;
        }

        root.present().context("Failed to present drawing")?;
        Ok(())
    }

    /// Finalize and encode the canvas as PNG
    pub fn render(self) -> Result<Vec<u8>> {
        let mut png_bytes = Vec::new();
        {
            let encoder = image::codecs::png::PngEncoder::new(&mut png_bytes);
            encoder
                .write_image(&self.buffer, self.width, self.height, image::ColorType::Rgb8)
                .context("Failed to encode PNG")?;
        }
        Ok(png_bytes)
    }
}

/// Render one chart descriptor to PNG bytes
pub fn render_png(chart: &ChartDescriptor, width: u32, height: u32) -> Result<Vec<u8>> {
    let mut canvas = Canvas::new(width, height);
    let is_histogram = chart
        .data
        .iter()
        .all(|s| s.series_type == SeriesType::Histogram);

    if is_histogram {
        canvas.draw_histogram(chart)?;
    } else {
        canvas.draw_scatter(chart)?;
    }
    canvas.render()
}

/// Write `<id>.png` for every chart into `dir`. Charts without numeric data are skipped.
pub fn export_all(charts: &[ChartDescriptor], dir: &Path) -> Result<Vec<PathBuf>> {
    fs::create_dir_all(dir)
        .with_context(|| format!("Failed to create export directory {}", dir.display()))?;

    let mut written = Vec::new();
    for chart in charts {
        if numeric_series(chart).iter().all(|s| s.x.is_empty()) {
            tracing::warn!(chart = %chart.id, "no numeric data, skipping export");
            continue;
        }

        let png = render_png(chart, EXPORT_WIDTH, EXPORT_HEIGHT)
            .with_context(|| format!("Failed to render chart '{}'", chart.id))?;
        let path = dir.join(format!("{}.png", chart.id));
        fs::write(&path, png).with_context(|| format!("Failed to write {}", path.display()))?;

        tracing::info!(path = %path.display(), "exported chart");
        written.push(path);
    }
    Ok(written)
}

fn numeric_series(chart: &ChartDescriptor) -> Vec<NumericSeries> {
    chart
        .data
        .iter()
        .map(|s| match &s.y {
            // Scatter points need both coordinates
            Some(y) => {
                let (x, y) = s
                    .x
                    .iter()
                    .zip(y)
                    .filter_map(|(x, y)| Some((x.as_f64()?, y.as_f64()?)))
                    .unzip();
                NumericSeries { name: s.name.clone(), x, y }
            }
            None => NumericSeries {
                name: s.name.clone(),
                x: s.x.iter().filter_map(Value::as_f64).collect(),
                y: Vec::new(),
            },
        })
        .collect()
}

/// Min and max of the data. Fails when the span does not fit in an f64.
fn data_range(values: &[f64]) -> Result<(f64, f64)> {
    let min = values.iter().copied().fold(f64::INFINITY, f64::min);
    let max = values.iter().copied().fold(f64::NEG_INFINITY, f64::max);

    if !(max - min).is_finite() {
        anyhow::bail!("Data range {}..{} is too wide to plot", min, max);
    }
    Ok((min, max))
}

/// Bin edges over the data range, bin count by Sturges' rule
fn bin_edges(values: &[f64]) -> Result<Vec<f64>> {
    let (min, max) = data_range(values)?;

    if min == max {
        return Ok(vec![min - 0.5, max + 0.5]);
    }

    let bins = ((values.len() as f64).log2().ceil() as usize + 1).max(1);
    let width = (max - min) / bins as f64;
    Ok((0..=bins).map(|i| min + width * i as f64).collect())
}

fn bin_counts(values: &[f64], edges: &[f64]) -> Vec<usize> {
    let bins = edges.len() - 1;
    let min = edges[0];
    let width = (edges[bins] - min) / bins as f64;

    let mut counts = vec![0usize; bins];
    for &v in values {
        // Max value lands in the last bin, not past it
        let idx = (((v - min) / width).floor() as usize).min(bins - 1);
        counts[idx] += 1;
    }
    counts
}

fn padded_range(values: &[f64]) -> Result<Range<f64>> {
    let (min, max) = data_range(values)?;

    let range = if min == max {
        (min - 1.0)..(max + 1.0)
    } else {
        let padding = (max - min) * 0.05;
        (min - padding)..(max + padding)
    };

    if !(range.start.is_finite() && range.end.is_finite()) {
        anyhow::bail!("Data range {}..{} is too wide to plot", min, max);
    }
    Ok(range)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::chart::build_all;
    use crate::data::DataTable;
    use crate::request::{HistogramRequest, PlotRequest, ScatterRequest};

    fn is_valid_png(bytes: &[u8]) -> bool {
        bytes.len() > 8 && bytes[0..8] == [137, 80, 78, 71, 13, 10, 26, 10]
    }

    fn make_charts() -> Vec<ChartDescriptor> {
        let csv = "name,age,height\nann,31,1.72\nbob,45,1.80\ncid,38,1.65\ndan,,1.90\n";
        let table = DataTable::from_reader(csv.as_bytes(), b',').unwrap();
        let requests = vec![
            PlotRequest::Histogram(HistogramRequest { fields: vec!["age".into(), "height".into()] }),
            PlotRequest::Scatter(
                ScatterRequest::new(0, vec!["age".into()], vec!["height".into()], Some(vec!["name".into()]))
                    .unwrap(),
            ),
            PlotRequest::Histogram(HistogramRequest { fields: vec!["name".into()] }),
        ];
        build_all(&requests, &table).unwrap()
    }

    #[test]
    fn test_bin_edges_sturges() {
        let edges = bin_edges(&[0.0, 1.0, 2.0, 3.0, 4.0, 5.0, 6.0, 8.0]).unwrap();
        // 8 values: log2(8) + 1 = 4 bins
        assert_eq!(edges, vec![0.0, 2.0, 4.0, 6.0, 8.0]);
    }

    #[test]
    fn test_bin_edges_single_value() {
        assert_eq!(bin_edges(&[3.0, 3.0]).unwrap(), vec![2.5, 3.5]);
    }

    #[test]
    fn test_bin_counts_include_max() {
        let edges = vec![0.0, 2.0, 4.0];
        assert_eq!(bin_counts(&[0.0, 1.0, 2.5, 4.0], &edges), vec![2, 2]);
    }

    #[test]
    fn test_numeric_series_drops_incomplete_points() {
        let charts = make_charts();
        let scatter = numeric_series(&charts[1]);
        assert_eq!(scatter[0].x, vec![31.0, 45.0, 38.0]);
        assert_eq!(scatter[0].y, vec![1.72, 1.80, 1.65]);
    }

    #[test]
    fn test_padded_range() {
        assert_eq!(padded_range(&[1.0, 1.0]).unwrap(), 0.0..2.0);
        let r = padded_range(&[0.0, 10.0]).unwrap();
        assert!((r.start + 0.5).abs() < 1e-9);
        assert!((r.end - 10.5).abs() < 1e-9);
    }

    #[test]
    fn test_ranges_wider_than_f64_rejected() {
        assert!(bin_edges(&[-1e308, 1e308]).is_err());
        assert!(padded_range(&[-1e308, 1e308]).is_err());
        // Span fits, padding overflows
        assert!(padded_range(&[0.0, 1.79e308]).is_err());
    }

    #[test]
    fn test_render_extreme_range_fails() {
        let table = DataTable::from_reader("v,w\n-1e308,1\n1e308,2\n".as_bytes(), b',').unwrap();
        let requests = vec![
            PlotRequest::Histogram(HistogramRequest { fields: vec!["v".into()] }),
            PlotRequest::Scatter(ScatterRequest::new(0, vec!["v".into()], vec!["w".into()], None).unwrap()),
        ];
        let charts = build_all(&requests, &table).unwrap();

        let err = render_png(&charts[0], 400, 300).unwrap_err();
        assert!(err.to_string().contains("too wide"));
        assert!(render_png(&charts[1], 400, 300).is_err());
    }

    #[test]
    fn test_render_histogram_png() {
        let charts = make_charts();
        let png = render_png(&charts[0], 400, 300).unwrap();
        assert!(is_valid_png(&png));
    }

    #[test]
    fn test_render_scatter_png() {
        let charts = make_charts();
        let png = render_png(&charts[1], 400, 300).unwrap();
        assert!(is_valid_png(&png));
    }

    #[test]
    fn test_render_non_numeric_fails() {
        let charts = make_charts();
        assert!(render_png(&charts[2], 400, 300).is_err());
    }
}
