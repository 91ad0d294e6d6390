// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! CLI tool: place openings where ducts of the mechanical model cross walls
//!
//! Reads a session (the set of open documents) from JSON, runs the
//! placement command against it and prints a summary of what was placed
//! and skipped.
//!
//! Usage:
//!   duct-openings <session.json> [options]

use std::env;
use std::fs;
use std::path::PathBuf;

use anyhow::{bail, Context, Result};
use duct_openings_processing::{Config, Session};

struct Args {
    session: PathBuf,
    output: Option<PathBuf>,
    report: Option<PathBuf>,
}

fn main() {
    let args: Vec<String> = env::args().collect();

    if args.len() < 2 || args[1] == "--help" || args[1] == "-h" {
        print_usage();
        return;
    }

    tracing_subscriber::fmt()
        .with_env_filter(
            env::var("RUST_LOG").unwrap_or_else(|_| "info,duct_openings_processing=debug".into()),
        )
        .with_writer(std::io::stderr)
        .init();

    let parsed = match parse_args(&args) {
        Ok(parsed) => parsed,
        Err(err) => {
            eprintln!("{}", err);
            print_usage();
            std::process::exit(2);
        }
    };

    if let Err(err) = run(&parsed) {
        eprintln!("Error: {:#}", err);
        std::process::exit(1);
    }
}

fn parse_args(args: &[String]) -> Result<Args> {
    let mut parsed = Args {
        session: PathBuf::from(&args[1]),
        output: None,
        report: None,
    };

    let mut i = 2;
    while i < args.len() {
        match args[i].as_str() {
            "--output" | "-o" => {
                i += 1;
                let Some(path) = args.get(i) else {
                    bail!("--output needs a path");
                };
                parsed.output = Some(PathBuf::from(path));
            }
            "--report" => {
                i += 1;
                let Some(path) = args.get(i) else {
                    bail!("--report needs a path");
                };
                parsed.report = Some(PathBuf::from(path));
            }
            other => bail!("Unknown option: {}", other),
        }
        i += 1;
    }

    Ok(parsed)
}

fn run(args: &Args) -> Result<()> {
    let json = fs::read_to_string(&args.session)
        .with_context(|| format!("reading session {}", args.session.display()))?;
    let mut session = Session::from_json(&json)
        .with_context(|| format!("parsing session {}", args.session.display()))?;

    let config = Config::from_env();
    tracing::info!(
        documents = session.documents.len(),
        marker = %config.mechanical_model_marker,
        family = %config.opening_family_name,
        "Loaded session"
    );

    let report = session.run(&config).context("placing openings")?;

    println!("{}", report.summary());

    if let Some(path) = &args.output {
        fs::write(path, session.to_json_pretty()?)
            .with_context(|| format!("writing session {}", path.display()))?;
        tracing::info!(path = %path.display(), "Wrote updated session");
    }

    if let Some(path) = &args.report {
        let json = serde_json::to_string_pretty(&report).context("serializing report")?;
        fs::write(path, json).with_context(|| format!("writing report {}", path.display()))?;
        tracing::info!(path = %path.display(), "Wrote run report");
    }

    Ok(())
}

fn print_usage() {
    println!("duct-openings - place openings where ducts cross walls");
    println!();
    println!("Usage: duct-openings <session.json> [options]");
    println!();
    println!("Options:");
    println!("  -o, --output <path>   Write the updated session as JSON");
    println!("      --report <path>   Write the run report as JSON");
    println!("  -h, --help            Show this help");
    println!();
    println!("Environment:");
    println!("  MECHANICAL_MODEL_MARKER   Title marker of the mechanical model (default: ОВ)");
    println!("  OPENING_FAMILY_NAME       Opening family to insert (default: Отверстия)");
    println!("  OPENING_CATEGORY          Category of the opening family (default: GenericModel)");
    println!("  OPENING_WIDTH_PARAM       Width parameter name (default: Ширина)");
    println!("  OPENING_HEIGHT_PARAM      Height parameter name (default: Высота)");
    println!("  RUST_LOG                  Log filter (default: info,duct_openings_processing=debug)");
}
