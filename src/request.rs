// Plot requests assembled from normalized field groups

use crate::args::RawArgs;
use crate::error::ConfigError;

/// Field groups for every plot flag, before normalization
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PlotOptions {
    pub hist: Option<RawArgs>,
    pub scatter: bool,
    pub x: Option<RawArgs>,
    pub y: Option<RawArgs>,
    pub labels: Option<RawArgs>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PlotRequest {
    Histogram(HistogramRequest),
    Scatter(ScatterRequest),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HistogramRequest {
    pub fields: Vec<String>,
}

/// One scatter plot. Pairs `x_fields[i]` with `y_fields[i]` and `labels[i]`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScatterRequest {
    x_fields: Vec<String>,
    y_fields: Vec<String>,
    labels: Vec<Option<String>>,
}

/// One (x, y, label) triple of a scatter request
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ScatterPair<'a> {
    pub x: &'a str,
    pub y: &'a str,
    pub label: Option<&'a str>,
}

impl ScatterRequest {
    /// Build a request for scatter group `group`. Without labels every pair gets none.
    pub fn new(
        group: usize,
        x_fields: Vec<String>,
        y_fields: Vec<String>,
        labels: Option<Vec<String>>,
    ) -> Result<Self, ConfigError> {
        if y_fields.len() != x_fields.len() {
            return Err(ConfigError::GroupLengthMismatch {
                flag: "-y",
                group,
                expected: x_fields.len(),
                found: y_fields.len(),
            });
        }

        let labels = match labels {
            Some(labels) if labels.len() != y_fields.len() => {
                return Err(ConfigError::GroupLengthMismatch {
                    flag: "--labels",
                    group,
                    expected: y_fields.len(),
                    found: labels.len(),
                });
            }
            Some(labels) => labels.into_iter().map(Some).collect(),
            None => vec![None; y_fields.len()],
        };

        Ok(Self {
            x_fields,
            y_fields,
            labels,
        })
    }

    pub fn x_fields(&self) -> &[String] {
        &self.x_fields
    }

    pub fn y_fields(&self) -> &[String] {
        &self.y_fields
    }

    pub fn labels(&self) -> &[Option<String>] {
        &self.labels
    }

    pub fn pairs(&self) -> impl Iterator<Item = ScatterPair<'_>> {
        self.x_fields
            .iter()
            .zip(&self.y_fields)
            .zip(&self.labels)
            .map(|((x, y), label)| ScatterPair {
                x,
                y,
                label: label.as_deref(),
            })
    }
}

/// Assemble one request per field group, histograms first, preserving flag order
pub fn assemble(options: PlotOptions) -> Result<Vec<PlotRequest>, ConfigError> {
    let mut requests = Vec::new();

    if let Some(hist) = options.hist {
        for (i, fields) in hist.normalize("--hist")?.into_iter().enumerate() {
            tracing::info!(group = i, ?fields, "histogram");
            requests.push(PlotRequest::Histogram(HistogramRequest { fields }));
        }
    }

    if !options.scatter {
        if options.x.is_some() || options.y.is_some() || options.labels.is_some() {
            tracing::warn!("-x/-y/--labels given without --scatter; ignoring them");
        }
        return Ok(requests);
    }

    let (x, y) = match (options.x, options.y) {
        (Some(x), Some(y)) => (x.normalize("-x")?, y.normalize("-y")?),
        _ => return Err(ConfigError::MissingScatterFields),
    };

    if y.len() != x.len() {
        return Err(ConfigError::GroupCountMismatch {
            flag: "-y",
            expected: x.len(),
            found: y.len(),
        });
    }

    let labels: Vec<Option<Vec<String>>> = match options.labels {
        Some(labels) => {
            let labels = labels.normalize("--labels")?;
            if labels.len() != x.len() {
                return Err(ConfigError::GroupCountMismatch {
                    flag: "--labels",
                    expected: x.len(),
                    found: labels.len(),
                });
            }
            labels.into_iter().map(Some).collect()
        }
        None => vec![None; x.len()],
    };

    for (i, ((x_fields, y_fields), labels)) in x.into_iter().zip(y).zip(labels).enumerate() {
        tracing::info!(group = i, ?x_fields, ?y_fields, ?labels, "scatter");
        requests.push(PlotRequest::Scatter(ScatterRequest::new(
            i, x_fields, y_fields, labels,
        )?));
    }

    Ok(requests)
}
