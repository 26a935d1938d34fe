//! SensorLog CLI - inspect and maintain sensor log files

use anyhow::{bail, Context};
use clap::{Parser, Subcommand, ValueEnum};
use sensorlog_core::{DataPoint, DataSeries, Edge, Schema, Store, Timestamp, Value};
use std::path::{Path, PathBuf};
use tracing_subscriber::EnvFilter;

#[derive(Debug, Parser)]
#[command(name = "sensorlog-cli", version, about = "SensorLog command line tool")]
struct Cli {
    /// Sensor log file
    #[arg(long, short, env = "SENSORLOG_DATA_FILE", default_value = sensorlog_core::config::DEFAULT_DATA_FILE)]
    file: PathBuf,

    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Create a log file (no-op if it already exists)
    Init {
        /// Data columns, comma separated; defaults to every registered column
        #[arg(long, value_delimiter = ',')]
        columns: Vec<String>,
    },
    /// Append one reading
    Insert {
        /// Unix timestamp in seconds; defaults to now
        #[arg(long, conflicts_with = "embedded")]
        timestamp: Option<Timestamp>,
        /// Timestamp in seconds since 2000-01-01 (device RTC)
        #[arg(long)]
        embedded: Option<i64>,
        /// Column values as name=value
        #[arg(long = "set", value_name = "NAME=VALUE", required = true)]
        values: Vec<String>,
    },
    /// Print readings in a timestamp range (inclusive)
    Read {
        #[arg(long, allow_hyphen_values = true)]
        from: Option<Timestamp>,
        #[arg(long, allow_hyphen_values = true)]
        to: Option<Timestamp>,
        #[arg(long, value_enum, default_value_t = Format::Csv)]
        format: Format,
    },
    /// Print the byte offset a timestamp resolves to
    Locate {
        #[arg(long, allow_hyphen_values = true)]
        timestamp: Timestamp,
        #[arg(long, value_enum, default_value_t = EdgeArg::Lower)]
        edge: EdgeArg,
    },
    /// Print file layout and record statistics
    Info,
}

#[derive(Debug, Clone, Copy, ValueEnum)]
enum Format {
    Csv,
    Pretty,
    Json,
}

#[derive(Debug, Clone, Copy, ValueEnum)]
enum EdgeArg {
    Lower,
    Upper,
}

impl From<EdgeArg> for Edge {
    fn from(edge: EdgeArg) -> Self {
        match edge {
            EdgeArg::Lower => Edge::Lower,
            EdgeArg::Upper => Edge::Upper,
        }
    }
}

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();

    let cli = Cli::parse();
    let output = run(&cli.file, cli.command)?;
    print!("{}", output);
    Ok(())
}

fn run(file: &Path, command: Command) -> anyhow::Result<String> {
    match command {
        Command::Init { columns } => {
            let schema = if columns.is_empty() {
                Schema::full()
            } else {
                let mut names = vec!["timestamp".to_string()];
                names.extend(columns.into_iter().filter(|c| c != "timestamp"));
                Schema::from_names(names)?
            };
            let store = Store::open_with_schema(file, schema)?;
            Ok(format!(
                "{}: columns [{}], record length {} bytes\n",
                store.path().display(),
                store.schema(),
                store.record_len()
            ))
        }
        Command::Insert {
            timestamp,
            embedded,
            values,
        } => {
            let timestamp = match (timestamp, embedded) {
                (Some(ts), _) => ts,
                (None, Some(secs)) => Timestamp::try_from_embedded(secs)?,
                (None, None) => Timestamp::now(),
            };
            let values = values
                .iter()
                .map(|v| parse_assignment(v))
                .collect::<anyhow::Result<Vec<_>>>()?;
            let point = DataPoint::from_values(timestamp, values)?;

            let store = Store::open(file)?;
            store
                .insert(&point)
                .with_context(|| format!("inserting into {}", file.display()))?;
            Ok(format!("{}\n", point))
        }
        Command::Read { from, to, format } => {
            let store = Store::open_existing(file)?;
            let series = store.read(from, to)?;
            render(&series, format)
        }
        Command::Locate { timestamp, edge } => {
            let store = Store::open_existing(file)?;
            let offset = store.locate(timestamp, edge.into())?;
            let index = (offset - store.header_len()) / store.record_len();
            Ok(format!("offset {} (record {})\n", offset, index))
        }
        Command::Info => {
            let stats = Store::open_existing(file)?.stats()?;
            let mut out = String::new();
            out.push_str(&format!("file:        {}\n", stats.path.display()));
            out.push_str(&format!("columns:     {}\n", stats.columns.join(",")));
            out.push_str(&format!("header:      {} bytes\n", stats.header_len));
            out.push_str(&format!("record:      {} bytes\n", stats.record_len));
            out.push_str(&format!("records:     {}\n", stats.records));
            out.push_str(&format!("size:        {} bytes\n", stats.file_size));
            if let (Some(first), Some(last)) = (stats.first, stats.last) {
                out.push_str(&format!("first:       {} ({})\n", first, first.to_rfc3339()));
                out.push_str(&format!("last:        {} ({})\n", last, last.to_rfc3339()));
            }
            Ok(out)
        }
    }
}

fn render(series: &DataSeries, format: Format) -> anyhow::Result<String> {
    match format {
        Format::Csv => Ok(series.to_text()?),
        Format::Pretty => Ok(series.iter().map(|p| format!("{}\n", p)).collect()),
        Format::Json => Ok(serde_json::to_string_pretty(series)? + "\n"),
    }
}

/// Parse `name=value`; integers stay integers so the column type check applies
fn parse_assignment(text: &str) -> anyhow::Result<(String, Value)> {
    let Some((name, raw)) = text.split_once('=') else {
        bail!("expected NAME=VALUE, got {:?}", text);
    };
    let raw = raw.trim();

    let value = if let Ok(v) = raw.parse::<i64>() {
        Value::Integer(v)
    } else if let Ok(v) = raw.parse::<f64>() {
        Value::Float(v)
    } else {
        bail!("value for {} is not a number: {:?}", name, raw);
    };

    Ok((name.trim().to_string(), value))
}
