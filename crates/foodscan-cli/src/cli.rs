//! Command-line arguments for the `foodscan` binary.

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand, ValueEnum};
use clap_verbosity_flag::{Verbosity, WarnLevel};
use colorchoice_clap::Color;

#[derive(Parser)]
#[command(
    name = "foodscan",
    version,
    about = "Scan a product barcode and show its Open Food Facts data",
    long_about = "Scan a product barcode and show its Open Food Facts data.\n\n\
                  Barcodes come from an image file (zbarimg), a live camera \
                  scan (zbarcam) or the command line. Products missing from \
                  the database can be contributed."
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,

    /// Adjust log verbosity (-v info, -vv debug, -vvv trace, -q errors only).
    #[command(flatten)]
    pub verbosity: Verbosity<WarnLevel>,

    /// Control ANSI color output (auto, always, never).
    #[command(flatten)]
    pub color: Color,

    /// Explicit log level (overrides -v/-q flags).
    #[arg(long = "log-level", value_enum, global = true)]
    pub log_level: Option<LogLevelArg>,

    /// Log output format.
    #[arg(
        long = "log-format",
        value_enum,
        default_value = "pretty",
        global = true
    )]
    pub log_format: LogFormatArg,

    /// Write logs to a file instead of stderr.
    #[arg(long = "log-file", value_name = "PATH", global = true)]
    pub log_file: Option<PathBuf>,

    /// Settings file (default: platform config dir/settings.toml).
    #[arg(long = "config", value_name = "PATH", global = true)]
    pub config: Option<PathBuf>,

    /// Override the product database host.
    #[arg(long = "base-url", value_name = "URL", global = true)]
    pub base_url: Option<String>,

    /// Print JSON instead of tables.
    #[arg(long = "json", global = true)]
    pub json: bool,
}

#[derive(Subcommand)]
pub enum Command {
    /// Look up a barcode typed on the command line.
    Lookup {
        /// Barcode digits.
        #[arg(value_name = "BARCODE")]
        barcode: String,
    },

    /// Decode a barcode from an image file and look it up.
    Scan {
        #[arg(value_name = "IMAGE")]
        image: PathBuf,
    },

    /// Scan with the camera until a barcode is detected, then look it up.
    Live(LiveArgs),

    /// Contribute a product missing from the database.
    Contribute(ContributeArgs),

    /// List supported barcode symbologies.
    Symbologies,

    /// Print the installation identifier sent with contributions.
    InstallationId,

    /// Write a settings file with the default values.
    InitConfig {
        /// Overwrite an existing file.
        #[arg(long = "force")]
        force: bool,
    },
}

#[derive(Args)]
pub struct LiveArgs {
    /// Video device (overrides the settings file).
    #[arg(long = "device", value_name = "PATH")]
    pub device: Option<PathBuf>,

    /// Seconds to wait for a detection (overrides the settings file).
    #[arg(long = "timeout", value_name = "SECS")]
    pub timeout: Option<u64>,
}

#[derive(Args, Debug, Default)]
pub struct ContributeArgs {
    /// Barcode of the product.
    #[arg(value_name = "BARCODE")]
    pub barcode: String,

    /// Product name.
    #[arg(long = "name", default_value = "")]
    pub name: String,

    /// Contributor name.
    #[arg(long = "creator", default_value = "")]
    pub creator: String,

    #[arg(long = "brand", value_name = "TEXT")]
    pub brands: Vec<String>,

    #[arg(long = "category", value_name = "TEXT")]
    pub categories: Vec<String>,

    #[arg(long = "label", value_name = "TEXT")]
    pub labels: Vec<String>,

    #[arg(long = "allergen", value_name = "TEXT")]
    pub allergens: Vec<String>,

    #[arg(long = "ingredient", value_name = "TEXT")]
    pub ingredients: Vec<String>,

    #[arg(long = "data-source", value_name = "TEXT")]
    pub data_sources: Vec<String>,

    /// Nutri-Score input, e.g. `sugars=10.6` (repeatable).
    #[arg(long = "nutrient", value_name = "KEY=VALUE", value_parser = parse_nutrient)]
    pub nutrients: Vec<(String, f64)>,

    #[arg(long = "beverage")]
    pub beverage: bool,

    #[arg(long = "cheese")]
    pub cheese: bool,

    #[arg(long = "fat")]
    pub fat: bool,

    #[arg(long = "water")]
    pub water: bool,

    /// Nutri-Score letter (a-e).
    #[arg(long = "grade", value_name = "LETTER")]
    pub grade: Option<String>,

    /// Nutri-Score points.
    #[arg(long = "score", value_name = "POINTS", default_value_t = 0.0)]
    pub score: f64,

    /// Product photo (repeatable).
    #[arg(long = "image", value_name = "PATH")]
    pub images: Vec<PathBuf>,

    /// Send the contribution. Without it only the form is printed.
    #[arg(long = "submit")]
    pub submit: bool,
}

/// Parse `key=value` into a nutrient input.
pub fn parse_nutrient(raw: &str) -> Result<(String, f64), String> {
    let (key, value) = raw
        .split_once('=')
        .ok_or_else(|| format!("expected KEY=VALUE, got `{raw}`"))?;
    let value = value
        .trim()
        .parse::<f64>()
        .map_err(|err| format!("invalid value for {}: {err}", key.trim()))?;
    Ok((key.trim().to_string(), value))
}

#[derive(Clone, Copy, ValueEnum)]
pub enum LogLevelArg {
    Error,
    Warn,
    Info,
    Debug,
    Trace,
}

#[derive(Clone, Copy, ValueEnum)]
pub enum LogFormatArg {
    Pretty,
    Compact,
    Json,
}
