//! Map Tools - binary map payload inspection

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};
use map_core::coord::{MAP_MAX_HEIGHT, MAP_MAX_WIDTH};
use map_tools::commands::{convert_file, info_file, validate_file, zone_file};
use map_tools::report::render;
use map_tools::{LoadOptions, OutputFormat, Result};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Parser)]
#[command(name = "map-tools")]
#[command(about = "Inspect, validate and convert binary map payloads")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Args)]
struct PayloadArgs {
    /// Path to the payload file
    file: PathBuf,
    /// Scenario format tag
    #[arg(long, default_value_t = 3)]
    format: u8,
    /// Binary version tag (only consulted for format 0)
    #[arg(long, default_value_t = 1)]
    binary_version: u8,
    /// Grid width in cells
    #[arg(long, default_value_t = MAP_MAX_WIDTH)]
    width: u16,
    /// Grid height in cells
    #[arg(long, default_value_t = MAP_MAX_HEIGHT)]
    height: u16,
    /// RON template catalog to use instead of the built-in one
    #[arg(long)]
    templates: Option<PathBuf>,
}

impl PayloadArgs {
    fn options(&self) -> Result<LoadOptions> {
        let options = LoadOptions::new(self.format, self.binary_version, self.width, self.height)?;
        Ok(match &self.templates {
            Some(path) => options.with_templates(path),
            None => options,
        })
    }
}

#[derive(Args)]
struct OutputArgs {
    /// Print the report as JSON
    #[arg(long, conflicts_with = "ron")]
    json: bool,
    /// Print the report as RON
    #[arg(long)]
    ron: bool,
}

impl OutputArgs {
    fn format(&self) -> OutputFormat {
        if self.json {
            OutputFormat::Json
        } else if self.ron {
            OutputFormat::Ron
        } else {
            OutputFormat::Text
        }
    }
}

#[derive(Subcommand)]
enum Commands {
    /// Load a payload and check every cell against the template catalog
    Validate {
        #[command(flatten)]
        payload: PayloadArgs,
        #[command(flatten)]
        output: OutputArgs,
    },
    /// Re-encode a payload in the current packed layout
    Convert {
        #[command(flatten)]
        payload: PayloadArgs,
        /// Where to write the packed payload
        out: PathBuf,
    },
    /// Recompute movement zones and report zone counts
    Zones {
        #[command(flatten)]
        payload: PayloadArgs,
        #[command(flatten)]
        output: OutputArgs,
    },
    /// Summarise template and land usage
    Info {
        #[command(flatten)]
        payload: PayloadArgs,
        #[command(flatten)]
        output: OutputArgs,
    },
}

/// Run a command; `Ok(false)` means it ran but the payload failed a check.
fn run(command: Commands) -> Result<bool> {
    match command {
        Commands::Validate { payload, output } => {
            tracing::info!("Validating {}", payload.file.display());
            let report = validate_file(&payload.file, &payload.options()?)?;
            println!("{}", render(&report, output.format())?);
            Ok(report.valid)
        }
        Commands::Convert { payload, out } => {
            let report = convert_file(&payload.file, &out, &payload.options()?)?;
            println!("{report}");
            Ok(true)
        }
        Commands::Zones { payload, output } => {
            let report = zone_file(&payload.file, &payload.options()?)?;
            println!("{}", render(&report, output.format())?);
            Ok(true)
        }
        Commands::Info { payload, output } => {
            let report = info_file(&payload.file, &payload.options()?)?;
            println!("{}", render(&report, output.format())?);
            Ok(true)
        }
    }
}

fn main() {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .with(tracing_subscriber::EnvFilter::from_default_env())
        .init();

    let cli = Cli::parse();

    match run(cli.command) {
        Ok(true) => {}
        Ok(false) => {
            tracing::error!("Validation failed");
            std::process::exit(1);
        }
        Err(e) => {
            tracing::error!("{e}");
            std::process::exit(1);
        }
    }
}
