mod render;

use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::{Context, Result, bail};
use bazi_core::{
    BirthInput, Chart, ChartError, Engine, EngineConfig, Gender, ReferenceData, RuleSet,
    annual_overlay,
};
use bazi_time::{CITIES, Location, TermTable, generate_term_table};
use chrono::{Datelike, Local};
use clap::{Args, Parser, Subcommand, ValueEnum};
use tracing::{debug, info};
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "bazi", about = "Four-pillar chart calculator")]
struct Cli {
    /// Engine configuration (TOML)
    #[arg(long, global = true)]
    config: Option<PathBuf>,
    /// Solar-term table (JSON list of {term, instant}); generated when absent
    #[arg(long, global = true)]
    terms: Option<PathBuf>,
    /// Shen-sha rule set (JSON or TOML); built-in set when absent
    #[arg(long, global = true)]
    rules: Option<PathBuf>,
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Full chart for a birth
    Chart {
        #[command(flatten)]
        birth: BirthArgs,
        /// Print JSON instead of text
        #[arg(long)]
        json: bool,
    },
    /// Four pillars only
    Pillars {
        #[command(flatten)]
        birth: BirthArgs,
    },
    /// The 24 solar terms of a year
    Terms {
        /// Gregorian year
        year: i32,
        /// Print times at this UTC offset in minutes
        #[arg(long, default_value = "480", allow_hyphen_values = true)]
        offset: i32,
        /// Print JSON instead of text
        #[arg(long)]
        json: bool,
    },
    /// A year's pillar laid over a natal chart
    Annual {
        #[command(flatten)]
        birth: BirthArgs,
        /// Year to overlay (default: current year)
        #[arg(long)]
        year: Option<i32>,
        /// Print JSON instead of text
        #[arg(long)]
        json: bool,
    },
    /// Built-in city longitudes
    Cities,
}

#[derive(Args)]
struct BirthArgs {
    /// Civil birth time: YYYY-MM-DDThh:mm[:ss], or RFC 3339 with an offset
    datetime: String,
    #[arg(long, value_enum, default_value = "male")]
    gender: GenderArg,
    /// Longitude in degrees east
    #[arg(long, allow_hyphen_values = true, conflicts_with = "city")]
    longitude: Option<f64>,
    /// City name from the built-in table
    #[arg(long)]
    city: Option<String>,
}

#[derive(Clone, Copy, ValueEnum)]
enum GenderArg {
    Male,
    Female,
}

impl From<GenderArg> for Gender {
    fn from(g: GenderArg) -> Self {
        match g {
            GenderArg::Male => Gender::Male,
            GenderArg::Female => Gender::Female,
        }
    }
}

impl BirthArgs {
    fn to_input(&self) -> Result<BirthInput> {
        let location = match (&self.longitude, &self.city) {
            (Some(lon), _) => Location::Longitude(*lon),
            (None, Some(city)) => Location::Named(city.clone()),
            (None, None) => Location::Unspecified,
        };
        BirthInput::parse(&self.datetime, self.gender.into(), location)
            .with_context(|| format!("cannot read birth time {:?}", self.datetime))
    }
}

fn read_file(path: &Path) -> Result<String> {
    fs::read_to_string(path).with_context(|| format!("cannot read {}", path.display()))
}

fn load_config(path: Option<&Path>) -> Result<EngineConfig> {
    let Some(path) = path else {
        return Ok(EngineConfig::default());
    };
    let config: EngineConfig = toml::from_str(&read_file(path)?)
        .with_context(|| format!("invalid config in {}", path.display()))?;
    config.validate()?;
    Ok(config)
}

fn load_rules(path: Option<&Path>) -> Result<RuleSet> {
    let Some(path) = path else {
        return Ok(RuleSet::standard());
    };
    let text = read_file(path)?;
    let rules: RuleSet = if path.extension().is_some_and(|e| e == "toml") {
        toml::from_str(&text).with_context(|| format!("invalid rules in {}", path.display()))?
    } else {
        serde_json::from_str(&text)
            .with_context(|| format!("invalid rules in {}", path.display()))?
    };
    info!(
        activation = rules.activation.len(),
        interaction = rules.interaction.len(),
        "rules loaded from {}",
        path.display()
    );
    Ok(rules)
}

/// Terms from a file, or generated for the years around `year`.
fn load_terms(path: Option<&Path>, year: i32) -> Result<TermTable> {
    match path {
        Some(path) => {
            let table: TermTable = serde_json::from_str(&read_file(path)?)
                .with_context(|| format!("invalid term table in {}", path.display()))?;
            info!(events = table.len(), "terms loaded from {}", path.display());
            Ok(table)
        }
        None => {
            debug!(year, "generating terms");
            Ok(generate_term_table(year - 1..=year + 1)?)
        }
    }
}

fn build_engine(cli: &Cli, year: i32) -> Result<Engine> {
    let config = load_config(cli.config.as_deref())?;
    let terms = load_terms(cli.terms.as_deref(), year)?;
    let rules = load_rules(cli.rules.as_deref())?;
    let label = match &cli.terms {
        Some(p) => p.display().to_string(),
        None => format!("generated {}..={}", year - 1, year + 1),
    };
    let data = ReferenceData::new(Arc::new(terms), Arc::new(rules), label);
    Ok(Engine::new(config, data)?)
}

fn compute(cli: &Cli, birth: &BirthArgs) -> Result<Chart> {
    let input = birth.to_input()?;
    let engine = build_engine(cli, input.civil.year())?;
    engine.compute_chart(&input).map_err(|e| {
        let context = failure_context(&e);
        anyhow::Error::new(e).context(context)
    })
}

fn failure_context(e: &ChartError) -> &'static str {
    if e.is_caller_error() {
        "cannot compute a chart for this birth"
    } else {
        "chart computation failed unexpectedly; please report this"
    }
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    match &cli.command {
        Commands::Chart { birth, json } => {
            let chart = compute(&cli, birth)?;
            if *json {
                println!("{}", serde_json::to_string_pretty(&chart)?);
            } else {
                print!("{}", render::chart(&chart));
            }
        }

        Commands::Pillars { birth } => {
            let chart = compute(&cli, birth)?;
            println!("{}", chart.pillars());
        }

        Commands::Terms { year, offset, json } => {
            let table = load_terms(cli.terms.as_deref(), *year)?;
            let events: Vec<_> = table
                .events()
                .iter()
                .filter(|e| e.instant.year() == *year)
                .copied()
                .collect();
            if events.is_empty() {
                bail!("no solar terms for {year}");
            }
            if *json {
                println!("{}", serde_json::to_string_pretty(&events)?);
            } else {
                print!("{}", render::terms(&events, *offset));
            }
        }

        Commands::Annual { birth, year, json } => {
            let chart = compute(&cli, birth)?;
            let year = year.unwrap_or_else(|| Local::now().year());
            let overlay = annual_overlay(&chart, year);
            if *json {
                println!("{}", serde_json::to_string_pretty(&overlay)?);
            } else {
                print!("{}", render::annual(&chart, &overlay));
            }
        }

        Commands::Cities => {
            for city in CITIES.iter() {
                println!("{:<12} {:<4} {:>9.4}", city.name, city.hanzi, city.longitude);
            }
        }
    }
    Ok(())
}
