// Chart descriptors: declarative plotly figures built from plot requests

use crate::data::DataTable;
use crate::error::DataError;
use crate::request::{HistogramRequest, PlotRequest, ScatterRequest};
use serde::Serialize;
use serde_json::Value;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum SeriesType {
    Histogram,
    Scatter,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum SeriesMode {
    Markers,
}

/// One named data series (a plotly trace)
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Series {
    #[serde(rename = "type")]
    pub series_type: SeriesType,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub mode: Option<SeriesMode>,
    pub name: String,
    pub x: Vec<Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub y: Option<Vec<Value>>,
    /// Per-point hover text
    #[serde(skip_serializing_if = "Option::is_none")]
    pub text: Option<Vec<Value>>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AxisTitle {
    pub text: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Axis {
    pub title: AxisTitle,
}

impl Axis {
    pub fn titled(text: impl Into<String>) -> Self {
        Self {
            title: AxisTitle { text: text.into() },
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Layout {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    pub showlegend: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub xaxis: Option<Axis>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub yaxis: Option<Axis>,
}

/// A renderable plot: identifier, series and layout
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ChartDescriptor {
    pub id: String,
    pub data: Vec<Series>,
    pub layout: Layout,
}

impl ChartDescriptor {
    /// Build the descriptor for one request. Missing columns surface from the table.
    pub fn build(request: &PlotRequest, id: impl Into<String>, table: &DataTable) -> Result<Self, DataError> {
        match request {
            PlotRequest::Histogram(hist) => histogram(hist, id.into(), table),
            PlotRequest::Scatter(scatter) => scatter_plot(scatter, id.into(), table),
        }
    }

    pub fn x_title(&self) -> Option<&str> {
        self.layout.xaxis.as_ref().map(|a| a.title.text.as_str())
    }

    pub fn y_title(&self) -> Option<&str> {
        self.layout.yaxis.as_ref().map(|a| a.title.text.as_str())
    }
}

/// Build descriptors for all requests, numbering ids per plot kind (`hist_0`, `scatter_0`, ...)
pub fn build_all(requests: &[PlotRequest], table: &DataTable) -> Result<Vec<ChartDescriptor>, DataError> {
    let mut hist_count = 0;
    let mut scatter_count = 0;
    let mut charts = Vec::with_capacity(requests.len());

    for request in requests {
        let id = match request {
            PlotRequest::Histogram(_) => {
                hist_count += 1;
                format!("hist_{}", hist_count - 1)
            }
            PlotRequest::Scatter(_) => {
                scatter_count += 1;
                format!("scatter_{}", scatter_count - 1)
            }
        };
        charts.push(ChartDescriptor::build(request, id, table)?);
    }

    Ok(charts)
}

fn histogram(request: &HistogramRequest, id: String, table: &DataTable) -> Result<ChartDescriptor, DataError> {
    let data = request
        .fields
        .iter()
        .map(|field| {
            Ok(Series {
                series_type: SeriesType::Histogram,
                mode: None,
                name: field.clone(),
                x: table.column(field)?,
                y: None,
                text: None,
            })
        })
        .collect::<Result<Vec<_>, DataError>>()?;

    Ok(ChartDescriptor {
        id,
        data,
        layout: Layout {
            title: Some("Histogram".to_string()),
            showlegend: true,
            xaxis: None,
            yaxis: Some(Axis::titled("Count")),
        },
    })
}

fn scatter_plot(request: &ScatterRequest, id: String, table: &DataTable) -> Result<ChartDescriptor, DataError> {
    let mut data = Vec::with_capacity(request.y_fields().len());
    for pair in request.pairs() {
        let text = pair.label.map(|label| table.column(label)).transpose()?;
        data.push(Series {
            series_type: SeriesType::Scatter,
            mode: Some(SeriesMode::Markers),
            name: pair.y.to_string(),
            x: table.column(pair.x)?,
            y: Some(table.column(pair.y)?),
            text,
        });
    }

    // One shared x title only when every pair plots against the same field
    let xaxis = match request.x_fields() {
        [first, rest @ ..] if rest.iter().all(|x| x == first) => Some(Axis::titled(first.clone())),
        _ => None,
    };

    Ok(ChartDescriptor {
        id,
        data,
        layout: Layout {
            title: None,
            showlegend: true,
            xaxis,
            yaxis: Some(Axis::titled("y")),
        },
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn make_table() -> DataTable {
        let csv = "\
id1,id2,age,height,weight,shoe
a,p,31,1.72,70,42
b,q,45,1.80,82,44
";
        DataTable::from_reader(csv.as_bytes(), b',').unwrap()
    }

    fn owned(fields: &[&str]) -> Vec<String> {
        fields.iter().map(|f| f.to_string()).collect()
    }

    /// Empty `labels` means no --labels group
    fn scatter_request(x: &[&str], y: &[&str], labels: &[&str]) -> PlotRequest {
        let labels = (!labels.is_empty()).then(|| owned(labels));
        PlotRequest::Scatter(ScatterRequest::new(0, owned(x), owned(y), labels).unwrap())
    }

    #[test]
    fn test_histogram_series() {
        let request = PlotRequest::Histogram(HistogramRequest {
            fields: vec!["age".into(), "height".into()],
        });
        let chart = ChartDescriptor::build(&request, "hist_0", &make_table()).unwrap();

        assert_eq!(chart.id, "hist_0");
        assert_eq!(chart.data.len(), 2);
        assert!(chart.data.iter().all(|s| s.series_type == SeriesType::Histogram));
        assert_eq!(chart.data[0].name, "age");
        assert_eq!(chart.data[1].name, "height");
        assert_eq!(chart.data[0].x, vec![json!(31), json!(45)]);
        assert!(chart.layout.showlegend);
        assert_eq!(chart.y_title(), Some("Count"));
    }

    #[test]
    fn test_scatter_series_without_labels() {
        let request = scatter_request(&["age", "age"], &["height", "weight"], &[]);
        let chart = ChartDescriptor::build(&request, "scatter_0", &make_table()).unwrap();

        assert_eq!(chart.data.len(), 2);
        let series = &chart.data[1];
        assert_eq!(series.series_type, SeriesType::Scatter);
        assert_eq!(series.mode, Some(SeriesMode::Markers));
        assert_eq!(series.name, "weight");
        assert_eq!(series.x, vec![json!(31), json!(45)]);
        assert_eq!(series.y, Some(vec![json!(70), json!(82)]));
        assert!(chart.data.iter().all(|s| s.text.is_none()));
        assert_eq!(chart.y_title(), Some("y"));
    }

    #[test]
    fn test_scatter_hover_labels() {
        let request = scatter_request(&["age", "height"], &["weight", "shoe"], &["id1", "id2"]);
        let chart = ChartDescriptor::build(&request, "scatter_0", &make_table()).unwrap();

        assert_eq!(chart.data[0].text, Some(vec![json!("a"), json!("b")]));
        assert_eq!(chart.data[1].text, Some(vec![json!("p"), json!("q")]));
    }

    #[test]
    fn test_scatter_shared_x_title() {
        let request = scatter_request(&["age", "age"], &["height", "weight"], &[]);
        let chart = ChartDescriptor::build(&request, "scatter_0", &make_table()).unwrap();
        assert_eq!(chart.x_title(), Some("age"));
    }

    #[test]
    fn test_scatter_mixed_x_has_no_title() {
        let request = scatter_request(&["age", "height"], &["weight", "shoe"], &[]);
        let chart = ChartDescriptor::build(&request, "scatter_0", &make_table()).unwrap();
        assert_eq!(chart.x_title(), None);
    }

    #[test]
    fn test_missing_column() {
        let request = PlotRequest::Histogram(HistogramRequest {
            fields: vec!["age".into(), "nope".into()],
        });
        let err = ChartDescriptor::build(&request, "hist_0", &make_table()).unwrap_err();
        assert!(matches!(err, DataError::ColumnNotFound { ref column } if column == "nope"));

        let request = scatter_request(&["age"], &["weight"], &["missing_label"]);
        assert!(ChartDescriptor::build(&request, "scatter_0", &make_table()).is_err());
    }

    #[test]
    fn test_build_all_ids() {
        let requests = vec![
            PlotRequest::Histogram(HistogramRequest { fields: vec!["age".into()] }),
            scatter_request(&["age"], &["weight"], &[]),
            PlotRequest::Histogram(HistogramRequest { fields: vec!["shoe".into()] }),
        ];
        let charts = build_all(&requests, &make_table()).unwrap();
        let ids: Vec<_> = charts.iter().map(|c| c.id.as_str()).collect();
        assert_eq!(ids, vec!["hist_0", "scatter_0", "hist_1"]);
    }

    #[test]
    fn test_serialized_shape() {
        let request = scatter_request(&["age"], &["weight"], &["id1"]);
        let chart = ChartDescriptor::build(&request, "scatter_0", &make_table()).unwrap();
        let value = serde_json::to_value(&chart).unwrap();

        assert_eq!(
            value,
            json!({
                "id": "scatter_0",
                "data": [{
                    "type": "scatter",
                    "mode": "markers",
                    "name": "weight",
                    "x": [31, 45],
                    "y": [70, 82],
                    "text": ["a", "b"],
                }],
                "layout": {
                    "showlegend": true,
                    "xaxis": {"title": {"text": "age"}},
                    "yaxis": {"title": {"text": "y"}},
                },
            })
        );
    }
}
