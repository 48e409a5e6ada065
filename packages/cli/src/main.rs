#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! Command-line front end for gang design recommendation.
//!
//! Looks up kelurahan flood risk, recommends a design module for a
//! surveyed gang, and estimates paving and drain cleaning cost.

mod config;

use std::collections::BTreeSet;
use std::path::PathBuf;
use std::sync::Arc;

use bedah_gang_design::{RuleResolver, RuleSource, RuleTable, catalog};
use bedah_gang_design_models::{DesignRequest, Surface};
use bedah_gang_estimate::estimate;
use bedah_gang_estimate_models::EstimationInput;
use bedah_gang_location::LocationRepository;
use bedah_gang_location_models::{RiskLookup, is_high_flood_risk};
use clap::{Args, Parser, Subcommand};

use crate::config::Config;

#[derive(Parser)]
#[command(
    name = "bedah_gang",
    about = "Gang design recommendation and cost estimation"
)]
struct Cli {
    /// Path to a TOML config file
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Load the data and report how many locations and rules are available
    Health,
    /// Show the flood risk of a kelurahan
    Risk {
        /// Kelurahan name (case and spacing are ignored)
        kelurahan: String,
    },
    /// List kelurahan names containing QUERY, or all names
    Search {
        query: Option<String>,
    },
    /// Recommend a design module for a gang
    Recommend(RecommendArgs),
    /// Estimate paving and drain cleaning cost and duration
    Estimate(EstimateArgs),
    /// List the design module catalog
    Modules,
}

#[derive(Args)]
struct RecommendArgs {
    /// Gang width in meters
    #[arg(long)]
    width: f64,

    /// Existing surface (rigid_paved/beton, asphalt/aspal, unpaved_earth/tanah)
    #[arg(long, value_parser = parse_surface)]
    surface: Surface,

    /// The gang already has drainage
    #[arg(long)]
    drainage: bool,

    /// Whether the location has high flood risk
    #[arg(long, conflicts_with = "kelurahan")]
    high_flood_risk: Option<bool>,

    /// Derive the flood risk flag from this kelurahan's score
    #[arg(long)]
    kelurahan: Option<String>,

    /// Activity tag observed in the gang (repeatable)
    #[arg(long = "activity")]
    activities: Vec<String>,
}

#[derive(Args)]
struct EstimateArgs {
    /// Gang width in meters
    #[arg(long)]
    width: f64,

    /// Gang length in meters
    #[arg(long)]
    length: f64,

    /// Flood risk score (1-5)
    #[arg(long, conflicts_with = "kelurahan", allow_negative_numbers = true)]
    risk_score: Option<i64>,

    /// Take the risk score from this kelurahan
    #[arg(long)]
    kelurahan: Option<String>,

    /// Cost parameter override as KEY=VALUE (repeatable)
    #[arg(long = "set", value_parser = parse_override)]
    overrides: Vec<(String, f64)>,
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    pretty_env_logger::init_custom_env("RUST_LOG");
    let cli = Cli::parse();
    let config = Config::load(cli.config.as_deref())?;

    match cli.command {
        Commands::Health => health(&config)?,
        Commands::Risk { kelurahan } => {
            let lookup = find_location(&open_locations(&config)?, &kelurahan)?;
            println!("{}", serde_json::to_string_pretty(&lookup)?);
        }
        Commands::Search { query } => {
            for name in open_locations(&config)?.search(query.as_deref()) {
                println!("{name}");
            }
        }
        Commands::Recommend(args) => recommend(&config, args)?,
        Commands::Estimate(args) => run_estimate(&config, args)?,
        Commands::Modules => {
            println!("{}", serde_json::to_string_pretty(&catalog::all_modules())?);
        }
    }

    Ok(())
}

fn open_locations(config: &Config) -> Result<LocationRepository, Box<dyn std::error::Error>> {
    Ok(LocationRepository::open(
        &config.data.locations,
        config.fields.clone(),
    )?)
}

fn open_rules(config: &Config) -> Result<RuleTable, Box<dyn std::error::Error>> {
    let source = config
        .data
        .rules
        .clone()
        .map_or(RuleSource::Embedded, RuleSource::File);
    Ok(RuleTable::load(source)?)
}

fn find_location(
    repo: &LocationRepository,
    kelurahan: &str,
) -> Result<RiskLookup, Box<dyn std::error::Error>> {
    repo.lookup_risk(kelurahan)
        .ok_or_else(|| format!("Kelurahan '{kelurahan}' not found").into())
}

fn health(config: &Config) -> Result<(), Box<dyn std::error::Error>> {
    let locations = open_locations(config)?;
    let rules = open_rules(config)?;

    let report = serde_json::json!({
        "status": "ok",
        "features": locations.index().feature_count(),
        "locations": locations.index().len(),
        "rules": rules.rules().len(),
        "rulesSource": rules.source().to_string(),
    });
    println!("{}", serde_json::to_string_pretty(&report)?);
    Ok(())
}

fn recommend(config: &Config, args: RecommendArgs) -> Result<(), Box<dyn std::error::Error>> {
    let high_flood_risk = match &args.kelurahan {
        Some(kelurahan) => {
            let lookup = find_location(&open_locations(config)?, kelurahan)?;
            if lookup.score.is_none() {
                log::warn!("Kelurahan '{}' has no risk score", lookup.kelurahan);
            }
            lookup.score.map(is_high_flood_risk)
        }
        None => args.high_flood_risk,
    };

    let request = DesignRequest {
        width: args.width,
        surface: args.surface,
        drainage: args.drainage,
        high_flood_risk,
        activities: args.activities.into_iter().collect::<BTreeSet<_>>(),
    };

    let mut resolver = RuleResolver::new(Arc::new(open_rules(config)?));
    if let Some(tolerance) = config.resolver.width_tolerance {
        resolver = resolver.with_width_tolerance(tolerance);
    }

    let output = recommendation(&resolver, &request)?;
    println!("{}", serde_json::to_string_pretty(&output)?);
    Ok(())
}

/// Resolves `request` and attaches the module's catalog entry.
///
/// A rule pointing at a module missing from the catalog is an error.
fn recommendation(
    resolver: &RuleResolver,
    request: &DesignRequest,
) -> Result<serde_json::Value, Box<dyn std::error::Error>> {
    let resolution = resolver.resolve(request);
    let module = catalog::module(resolution.design_module())?;

    Ok(serde_json::json!({
        "request": request,
        "resolution": resolution,
        "module": module,
    }))
}

fn run_estimate(config: &Config, args: EstimateArgs) -> Result<(), Box<dyn std::error::Error>> {
    let risk_score = match &args.kelurahan {
        Some(kelurahan) => find_location(&open_locations(config)?, kelurahan)?.score,
        None => args.risk_score,
    };

    let mut overrides = config.estimate_overrides();
    for (key, value) in args.overrides {
        overrides.insert(key, Some(value));
    }

    let input = EstimationInput {
        width: args.width,
        length: args.length,
        risk_score,
        overrides,
    };

    let result = estimate(&input)?;
    println!("{}", serde_json::to_string_pretty(&result)?);
    Ok(())
}

fn parse_surface(raw: &str) -> Result<Surface, String> {
    raw.parse()
        .map_err(|_| format!("unknown surface '{raw}'"))
}

/// Parses a `KEY=VALUE` cost parameter override.
fn parse_override(raw: &str) -> Result<(String, f64), String> {
    let (key, value) = raw
        .split_once('=')
        .ok_or_else(|| format!("expected KEY=VALUE, got '{raw}'"))?;
    let value = value
        .trim()
        .parse::<f64>()
        .map_err(|e| format!("invalid value for '{}': {e}", key.trim()))?;
    Ok((key.trim().to_string(), value))
}
