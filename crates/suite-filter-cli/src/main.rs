//! suite-filter - compile and apply test-selection filters from the shell.
//!
//! ```text
//! suite-filter compile smoke.yaml
//! suite-filter select smoke.yaml discovered-tests.json --full-names
//! suite-filter check '<filter><cat>fast</cat></filter>'
//! ```
//!
//! Definitions and test listings are read as JSON or YAML depending on the
//! file extension. Set `RUST_LOG` (or pass `-v`) for diagnostics on stderr.

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand};
use serde::de::DeserializeOwned;
use suite_filter::{FilterDefinition, FilterParser, TestCase, XmlFilterParser};
use tracing::{debug, info};
use tracing_subscriber::EnvFilter;

/// Compile and apply test-selection filters.
#[derive(Debug, Parser)]
#[command(name = "suite-filter", version, about)]
struct Cli {
    /// More diagnostics on stderr (-v info, -vv debug).
    #[arg(short, long, global = true, action = clap::ArgAction::Count)]
    verbose: u8,

    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Print the XML for a filter definition.
    Compile {
        /// Filter definition (.json, .yaml or .yml).
        definition: PathBuf,
    },
    /// Print the tests a filter definition selects from a listing.
    Select {
        /// Filter definition (.json, .yaml or .yml).
        definition: PathBuf,
        /// Test listing: a list of test cases (.json, .yaml or .yml).
        tests: PathBuf,
        /// Print full names instead of ids.
        #[arg(long)]
        full_names: bool,
    },
    /// Check that a filter XML string is well formed.
    Check {
        /// The filter XML.
        xml: String,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Format {
    Json,
    Yaml,
}

impl Format {
    fn from_path(path: &Path) -> Result<Format> {
        match path.extension().and_then(|ext| ext.to_str()) {
            Some("json") => Ok(Format::Json),
            Some("yaml") | Some("yml") => Ok(Format::Yaml),
            _ => bail!(
                "cannot tell the format of {}: expected .json, .yaml or .yml",
                path.display()
            ),
        }
    }
}

fn load<T: DeserializeOwned>(path: &Path) -> Result<T> {
    let format = Format::from_path(path)?;
    let text =
        fs::read_to_string(path).with_context(|| format!("failed to read {}", path.display()))?;
    debug!(path = %path.display(), ?format, "loading");
    let value = match format {
        Format::Json => serde_json::from_str(&text)
            .with_context(|| format!("invalid JSON in {}", path.display()))?,
        Format::Yaml => serde_yaml::from_str(&text)
            .with_context(|| format!("invalid YAML in {}", path.display()))?,
    };
    Ok(value)
}

fn init_tracing(verbose: u8) {
    let default = match verbose {
        0 => "warn",
        1 => "info",
        _ => "debug",
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn run(cli: Cli) -> Result<Vec<String>> {
    match cli.command {
        Command::Compile { definition } => {
            let definition: FilterDefinition = load(&definition)?;
            let filter = definition.build().context("failed to compile filter")?;
            Ok(vec![filter.into_xml()])
        }
        Command::Select {
            definition,
            tests,
            full_names,
        } => {
            let definition: FilterDefinition = load(&definition)?;
            let tests: Vec<TestCase> = load(&tests)?;
            let filter = definition.build().context("failed to compile filter")?;
            let selected = filter
                .select(&tests)
                .context("compiled filter could not be parsed")?;
            info!(selected = selected.len(), total = tests.len(), "selected tests");
            Ok(selected
                .into_iter()
                .map(|test| {
                    if full_names {
                        test.full_name.clone()
                    } else {
                        test.id.clone()
                    }
                })
                .collect())
        }
        Command::Check { xml } => {
            let parsed = XmlFilterParser::new()
                .parse_filter(&xml)
                .context("filter is not valid")?;
            debug!(?parsed, "parsed filter");
            Ok(vec!["ok".to_string()])
        }
    }
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);
    for line in run(cli)? {
        println!("{line}");
    }
    Ok(())
}
