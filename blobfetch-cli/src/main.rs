// Copyright 2025 Sushanth (https://github.com/sushanthpy)
//
// This program is free software: you can redistribute it and/or modify
// it under the terms of the GNU Affero General Public License as published by
// the Free Software Foundation, either version 3 of the License, or
// (at your option) any later version.
//
// This program is distributed in the hope that it will be useful,
// but WITHOUT ANY WARRANTY; without even the implied warranty of
// MERCHANTABILITY or FITNESS FOR A PARTICULAR PURPOSE. See the
// GNU Affero General Public License for more details.
//
// You should have received a copy of the GNU Affero General Public License
// along with this program. If not, see <https://www.gnu.org/licenses/>.

//! Blobfetch CLI
//!
//! Commit the content of stdin, a file or a URL as a new version of a dataset.

use anyhow::{bail, Context, Result};
use blobfetch_core::{CommitMode, FetchConfig, IngestOutcome, Ingestor, Origin};
use blobfetch_storage::{open_or_create_dataset, DatasetLocator};
use clap::Parser;
use serde_json::json;
use std::path::PathBuf;
use tracing::{info, Level};

const UNCHANGED_MESSAGE: &str = "Content unchanged since last fetch, no commit made";

const USAGE: &str = "blobfetch [OPTIONS] <SOURCE> <DATASET>
       blobfetch --stdin [OPTIONS] <DATASET>";

#[derive(Parser, Debug)]
#[command(name = "blobfetch")]
#[command(about = "Blobfetch - commit stdin, file or URL content into a dataset")]
#[command(long_about = None)]
#[command(override_usage = USAGE)]
struct Cli {
    /// Read the content from standard input
    #[arg(long)]
    stdin: bool,

    /// Write the blob without moving the dataset head
    #[arg(long)]
    no_commit: bool,

    /// TOML fetch configuration
    #[arg(long, value_name = "FILE")]
    config: Option<PathBuf>,

    /// Output as JSON (machine-readable)
    #[arg(long)]
    json: bool,

    /// Verbose mode
    #[arg(short, long)]
    verbose: bool,

    /// File path or http(s) URL, then <store-path>::<dataset-name>
    #[arg(value_name = "ARGS", required = true, num_args = 1..=2)]
    args: Vec<String>,
}

#[derive(Debug)]
struct Invocation {
    origin: Origin,
    locator: DatasetLocator,
    mode: CommitMode,
}

impl Cli {
    /// Validate the arguments without touching the filesystem or network
    fn invocation(&self) -> Result<Invocation> {
        let (source, dataset) = match self.args.as_slice() {
            [dataset] => (None, dataset),
            [source, dataset] => (Some(source.as_str()), dataset),
            _ => bail!("expected <SOURCE> <DATASET>, or --stdin <DATASET>"),
        };

        let origin = Origin::resolve(source, self.stdin)?;
        let locator = DatasetLocator::parse(dataset)
            .with_context(|| format!("Invalid dataset {:?}", dataset))?;
        let mode = if self.no_commit {
            CommitMode::WriteOnly
        } else {
            CommitMode::Commit
        };

        Ok(Invocation {
            origin,
            locator,
            mode,
        })
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Setup logging
    let level = if cli.verbose {
        Level::DEBUG
    } else {
        Level::INFO
    };
    tracing_subscriber::fmt()
        .with_max_level(level)
        .with_writer(std::io::stderr)
        .init();

    let invocation = cli.invocation()?;

    let config = match &cli.config {
        Some(path) => FetchConfig::from_file(path)
            .with_context(|| format!("Failed to load config {:?}", path))?,
        None => FetchConfig::default(),
    };

    let dataset = open_or_create_dataset(&invocation.locator)
        .with_context(|| format!("Failed to open dataset {}", invocation.locator))?;
    let ingestor = Ingestor::new(&config).context("Failed to set up fetcher")?;

    info!(
        source = %invocation.origin,
        dataset = %invocation.locator,
        "Ingesting"
    );
    let outcome = ingestor
        .ingest(
            &invocation.origin,
            &dataset,
            tokio::io::stdin(),
            invocation.mode,
        )
        .await
        .with_context(|| format!("Failed to ingest {}", invocation.origin))?;

    if cli.json {
        println!("{}", serde_json::to_string_pretty(&outcome_json(&outcome))?);
    } else {
        println!("{}", outcome_message(&outcome));
    }
    Ok(())
}

fn outcome_message(outcome: &IngestOutcome) -> String {
    match outcome {
        IngestOutcome::Unchanged { .. } => UNCHANGED_MESSAGE.to_string(),
        IngestOutcome::Committed(info) => {
            format!("Done - Ref: {} (height {})", info.commit, info.height)
        }
        IngestOutcome::Written { value } => format!("Done - Ref: {}", value),
    }
}

fn outcome_json(outcome: &IngestOutcome) -> serde_json::Value {
    match outcome {
        IngestOutcome::Unchanged { height } => json!({
            "status": "unchanged",
            "height": height,
        }),
        IngestOutcome::Committed(info) => json!({
            "status": "committed",
            "commit": info.commit.to_hex(),
            "value": info.value.to_hex(),
            "height": info.height,
        }),
        IngestOutcome::Written { value } => json!({
            "status": "written",
            "value": value.to_hex(),
        }),
    }
}
