// Dashboard page: one plotly graph per chart descriptor

use crate::chart::ChartDescriptor;
use anyhow::{Context, Result};
use std::fmt::Write as FmtWrite;

pub const PLOTLY_CDN: &str = "https://cdn.plot.ly/plotly-2.35.2.min.js";
pub const STYLESHEET: &str = "https://codepen.io/chriddyp/pen/bWLwgP.css";

/// The charts to present, in display order
#[derive(Debug, Clone)]
pub struct Dashboard {
    pub title: String,
    pub charts: Vec<ChartDescriptor>,
}

impl Dashboard {
    pub fn new(title: impl Into<String>, charts: Vec<ChartDescriptor>) -> Self {
        Self {
            title: title.into(),
            charts,
        }
    }

    pub fn chart(&self, id: &str) -> Option<&ChartDescriptor> {
        self.charts.iter().find(|c| c.id == id)
    }

    /// Render the full HTML document
    pub fn render_html(&self) -> Result<String> {
        let mut html = String::with_capacity(64 * 1024);

        writeln!(html, "<!DOCTYPE html>")?;
        writeln!(html, "<html lang=\"en\">")?;
        writeln!(html, "<head>")?;
        writeln!(html, "<meta charset=\"utf-8\"/>")?;
        writeln!(html, "<title>{}</title>", escape_html(&self.title))?;
        writeln!(html, "<link rel=\"stylesheet\" href=\"{}\"/>", STYLESHEET)?;
        writeln!(html, "<script src=\"{}\"></script>", PLOTLY_CDN)?;
        writeln!(html, "</head>")?;
        writeln!(html, "<body>")?;
        writeln!(html, "<div id=\"dashboard\">")?;

        if self.charts.is_empty() {
            writeln!(html, "<p>No plots requested.</p>")?;
        }

        for chart in &self.charts {
            let id = escape_html(&chart.id);
            let data = script_json(&chart.data)
                .with_context(|| format!("Failed to serialize data of '{}'", chart.id))?;
            let layout = script_json(&chart.layout)
                .with_context(|| format!("Failed to serialize layout of '{}'", chart.id))?;

            writeln!(html, "<div id=\"{}\" class=\"graph\"></div>", id)?;
            writeln!(
                html,
                "<script>Plotly.newPlot(\"{}\", {}, {});</script>",
                id, data, layout
            )?;
        }

        writeln!(html, "</div>")?;
        writeln!(html, "</body>")?;
        writeln!(html, "</html>")?;

        Ok(html)
    }
}

/// Serialize for embedding in an inline script; `</` would close the script tag early
fn script_json<T: serde::Serialize>(value: &T) -> serde_json::Result<String> {
    Ok(serde_json::to_string(value)?.replace("</", "<\\/"))
}

fn escape_html(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    for c in s.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(c),
        }
    }
    out
}
