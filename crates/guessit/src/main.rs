//! guessit command line tool
//!
//! Prints one JSON object per guessed name.

use std::collections::BTreeMap;
use std::io::{self, BufRead, Write};
use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{Parser, ValueEnum};
use guessit::{Guessit, MediaType, Options, Value};
use tracing::debug;

#[derive(Debug, Clone, Copy, ValueEnum)]
enum TypeArg {
    Movie,
    Episode,
}

impl From<TypeArg> for MediaType {
    fn from(arg: TypeArg) -> Self {
        match arg {
            TypeArg::Movie => MediaType::Movie,
            TypeArg::Episode => MediaType::Episode,
        }
    }
}

/// CLI arguments
#[derive(Parser)]
#[command(name = "guessit")]
#[command(about = "Extract metadata from video release names")]
#[command(version)]
struct Cli {
    /// Names to guess. Reads stdin lines when empty.
    names: Vec<String>,

    /// Media type hint
    #[arg(short = 't', long = "type", value_enum)]
    media_type: Option<TypeArg>,

    /// Treat the input as a bare name, not a path
    #[arg(short, long)]
    name_only: bool,

    /// Read ambiguous dates year first
    #[arg(short = 'Y', long)]
    date_year_first: bool,

    /// Read ambiguous dates day first
    #[arg(short = 'D', long)]
    date_day_first: bool,

    /// Allowed language codes
    #[arg(short = 'L', long = "allowed-languages", value_delimiter = ',')]
    allowed_languages: Vec<String>,

    /// Allowed country codes
    #[arg(short = 'C', long = "allowed-countries", value_delimiter = ',')]
    allowed_countries: Vec<String>,

    /// Read three digit numbers as episodes
    #[arg(short = 'E', long)]
    episode_prefer_number: bool,

    /// Expected title (prefix with `re:` for a regex)
    #[arg(short = 'T', long)]
    expected_title: Vec<String>,

    /// Expected release group (prefix with `re:` for a regex)
    #[arg(short = 'G', long)]
    expected_group: Vec<String>,

    /// Properties to leave out
    #[arg(long, value_delimiter = ',')]
    excludes: Vec<String>,

    /// Only produce these properties
    #[arg(long, value_delimiter = ',')]
    includes: Vec<String>,

    /// Report raw text, offsets and tags of each value
    #[arg(short, long)]
    advanced: bool,

    /// Keep only the first value of each property
    #[arg(short, long)]
    single_value: bool,

    /// Always output lists
    #[arg(short = 'l', long)]
    enforce_list: bool,

    /// JSON options file, overridden by flags
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Print the properties and their known values, then exit
    #[arg(short, long)]
    properties: bool,
}

impl Cli {
    fn options(&self) -> Result<Options> {
        let base = match &self.config {
            Some(path) => {
                let json = std::fs::read_to_string(path)
                    .with_context(|| format!("failed to read {}", path.display()))?;
                Options::from_json(&json)
                    .with_context(|| format!("invalid options file {}", path.display()))?
            }
            None => Options::default(),
        };
        let flags = Options {
            media_type: self.media_type.map(MediaType::from),
            name_only: self.name_only,
            date_year_first: self.date_year_first,
            date_day_first: self.date_day_first,
            allowed_languages: (!self.allowed_languages.is_empty())
                .then(|| self.allowed_languages.clone()),
            allowed_countries: (!self.allowed_countries.is_empty())
                .then(|| self.allowed_countries.clone()),
            episode_prefer_number: self.episode_prefer_number,
            expected_title: self.expected_title.clone(),
            expected_group: self.expected_group.clone(),
            excludes: self.excludes.clone(),
            includes: self.includes.clone(),
            advanced: self.advanced,
            single_value: self.single_value,
            enforce_list: self.enforce_list,
        };
        Ok(base.merge(flags))
    }
}

fn print_properties(properties: &BTreeMap<String, Vec<Value>>, out: &mut impl Write) -> Result<()> {
    for (name, values) in properties {
        let values: Vec<String> = values.iter().map(ToString::to_string).collect();
        writeln!(out, "{name}: {}", values.join(", "))?;
    }
    Ok(())
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_writer(io::stderr)
        .init();

    let cli = Cli::parse();
    let options = cli.options()?;
    debug!(?options, "options");

    let guessit = Guessit::new().context("failed to build the guessit pipeline")?;
    let stdout = io::stdout();
    let mut out = stdout.lock();

    if cli.properties {
        return print_properties(&guessit.properties(&options), &mut out);
    }

    let names: Vec<String> = if cli.names.is_empty() {
        io::stdin()
            .lock()
            .lines()
            .collect::<io::Result<Vec<_>>>()
            .context("failed to read stdin")?
    } else {
        cli.names.clone()
    };

    for name in names.iter().map(|n| n.trim()).filter(|n| !n.is_empty()) {
        let guess = guessit
            .guess(name, &options)
            .with_context(|| format!("failed to guess {name:?}"))?;
        writeln!(out, "{}", serde_json::to_string(&guess)?)?;
    }
    Ok(())
}
