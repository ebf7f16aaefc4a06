// Command-line surface and field-group normalization

use crate::error::ConfigError;
use crate::request::PlotOptions;
use clap::{ArgAction, ArgMatches, CommandFactory, FromArgMatches, Parser};
use std::ffi::OsString;
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(name = "dashplot")]
#[command(about = "Plot CSV columns as histograms and scatter plots in a browser dashboard", long_about = None)]
pub struct Args {
    /// CSV file with the data
    #[arg(long, value_name = "PATH")]
    pub csv: PathBuf,

    /// Plot a histogram of the given fields (repeat for more plots)
    #[arg(long, num_args = 1.., action = ArgAction::Append, value_name = "FIELD")]
    pub hist: Vec<String>,

    /// Plot scatter plots of -y fields against -x fields
    #[arg(long)]
    pub scatter: bool,

    /// x fields of one scatter plot (repeat for more plots)
    #[arg(short = 'x', long = "x-fields", num_args = 1.., action = ArgAction::Append, value_name = "FIELD")]
    pub x: Vec<String>,

    /// y fields of one scatter plot (repeat for more plots)
    #[arg(short = 'y', long = "y-fields", num_args = 1.., action = ArgAction::Append, value_name = "FIELD")]
    pub y: Vec<String>,

    /// Hover label fields of one scatter plot (repeat for more plots)
    #[arg(long, num_args = 1.., action = ArgAction::Append, value_name = "FIELD")]
    pub labels: Vec<String>,

    /// Address to bind the dashboard server to
    #[arg(long, env = "DASHPLOT_HOST", default_value = "127.0.0.1")]
    pub host: String,

    /// Port to serve the dashboard on
    #[arg(long, env = "DASHPLOT_PORT", default_value_t = 8050)]
    pub port: u16,

    /// Page title
    #[arg(long, default_value = "dashplot")]
    pub title: String,

    /// CSV field delimiter
    #[arg(long, default_value = ",", value_parser = parse_delimiter)]
    pub delimiter: u8,

    /// Write one PNG per chart into this directory and exit instead of serving
    #[arg(long, value_name = "DIR")]
    pub export: Option<PathBuf>,

    /// Enable debug logging
    #[arg(long)]
    pub debug: bool,

    #[arg(skip)]
    pub groups: FieldGroups,
}

/// Values of the repeatable field flags, one group per repetition.
/// `None` when the flag was not given.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FieldGroups {
    pub hist: Option<Vec<Vec<String>>>,
    pub x: Option<Vec<Vec<String>>>,
    pub y: Option<Vec<Vec<String>>>,
    pub labels: Option<Vec<Vec<String>>>,
}

impl FieldGroups {
    fn from_matches(matches: &ArgMatches) -> Self {
        Self {
            hist: occurrences(matches, "hist"),
            x: occurrences(matches, "x"),
            y: occurrences(matches, "y"),
            labels: occurrences(matches, "labels"),
        }
    }
}

fn occurrences(matches: &ArgMatches, id: &str) -> Option<Vec<Vec<String>>> {
    matches
        .get_occurrences::<String>(id)
        .map(|occurrences| occurrences.map(|values| values.cloned().collect()).collect())
}

impl Args {
    /// Parse the process arguments, keeping field flags grouped by repetition.
    /// Exits with clap's usage error on failure.
    pub fn parse_grouped() -> Self {
        let matches = Self::command().get_matches();
        Self::from_grouped_matches(&matches).unwrap_or_else(|e| e.exit())
    }

    pub fn try_parse_grouped_from<I, T>(itr: I) -> Result<Self, clap::Error>
    where
        I: IntoIterator<Item = T>,
        T: Into<OsString> + Clone,
    {
        let matches = Self::command().try_get_matches_from(itr)?;
        Self::from_grouped_matches(&matches)
    }

    fn from_grouped_matches(matches: &ArgMatches) -> Result<Self, clap::Error> {
        let mut args = Self::from_arg_matches(matches)?;
        args.groups = FieldGroups::from_matches(matches);
        Ok(args)
    }

    /// Field groups as the plot request assembler expects them
    pub fn plot_options(&self) -> PlotOptions {
        PlotOptions {
            hist: self.groups.hist.clone().map(RawArgs::Nested),
            scatter: self.scatter,
            x: self.groups.x.clone().map(RawArgs::Nested),
            y: self.groups.y.clone().map(RawArgs::Nested),
            labels: self.groups.labels.clone().map(RawArgs::Nested),
        }
    }
}

fn parse_delimiter(s: &str) -> Result<u8, String> {
    match s.as_bytes() {
        [b] if b.is_ascii() => Ok(*b),
        _ if s == "\\t" => Ok(b'\t'),
        _ => Err(format!("delimiter must be a single ASCII character, got '{}'", s)),
    }
}

/// Values of a repeatable field flag, either one group or one group per repetition
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RawArgs {
    Flat(Vec<String>),
    Nested(Vec<Vec<String>>),
}

impl RawArgs {
    /// Always return a sequence of groups.
    /// `flag` names the option in errors.
    pub fn normalize(self, flag: &'static str) -> Result<Vec<Vec<String>>, ConfigError> {
        let groups = match self {
            RawArgs::Flat(fields) => vec![fields],
            RawArgs::Nested(groups) => groups,
        };
        if groups.is_empty() || groups.iter().any(Vec::is_empty) {
            return Err(ConfigError::EmptyFieldGroup { flag });
        }
        Ok(groups)
    }
}
