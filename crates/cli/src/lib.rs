pub mod commands;

use std::path::PathBuf;
use std::process::ExitCode;

use clap::{Args, Parser, Subcommand};
use tireguide_core::config::{AppConfig, ConfigOverrides, LoadOptions, LogFormat};

#[derive(Debug, Parser)]
#[command(
    name = "tireguide",
    about = "Race-aware gravel tire recommendations",
    long_about = "Recommend gravel tires, pressures and setup for races, enrich race files, and inspect the catalog and configuration.",
    after_help = "Examples:\n  tireguide recommend unbound-200\n  tireguide enrich --dry-run\n  tireguide doctor --json"
)]
pub struct Cli {
    #[command(flatten)]
    global: GlobalArgs,
    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Args)]
struct GlobalArgs {
    #[arg(long, global = true, help = "Path to a tireguide.toml config file")]
    config: Option<PathBuf>,
    #[arg(long, global = true, help = "Directory of tire catalog JSON files")]
    tire_dir: Option<PathBuf>,
    #[arg(long, global = true, help = "Directory of race JSON files")]
    race_dir: Option<PathBuf>,
    #[arg(long, global = true, help = "Directory of weather JSON files")]
    weather_dir: Option<PathBuf>,
    #[arg(long, global = true, help = "Number of ranked picks per race")]
    top_n: Option<usize>,
    #[arg(long, global = true, help = "Process races in parallel")]
    parallel: bool,
}

impl GlobalArgs {
    fn load_options(&self) -> LoadOptions {
        LoadOptions {
            config_path: self.config.clone(),
            require_file: self.config.is_some(),
            overrides: ConfigOverrides {
                tire_dir: self.tire_dir.clone(),
                race_dir: self.race_dir.clone(),
                weather_dir: self.weather_dir.clone(),
                output_dir: None,
                top_n: self.top_n,
                parallel: self.parallel.then_some(true),
                log_level: None,
            },
        }
    }
}

#[derive(Debug, Subcommand)]
enum Command {
    #[command(about = "Recommend tires, pressures and setup for one or more races")]
    Recommend {
        #[arg(help = "Race slugs (file stems in the race directory)")]
        slugs: Vec<String>,
        #[arg(long, conflicts_with = "slugs", help = "Recommend for every race file")]
        all: bool,
        #[arg(long, help = "Write each result to the output directory instead of stdout")]
        write: bool,
    },
    #[command(about = "Write tire_recommendations back into race files")]
    Enrich {
        #[arg(long = "slug", help = "Only enrich these races (repeatable)")]
        slugs: Vec<String>,
        #[arg(long, help = "Preview the top pick without writing")]
        dry_run: bool,
        #[arg(long, help = "Re-enrich races that already carry recommendations")]
        force: bool,
    },
    #[command(about = "Load and validate the tire catalog")]
    Catalog,
    #[command(about = "Inspect effective configuration values with source attribution")]
    Config,
    #[command(about = "Validate config, tire catalog and race data readiness")]
    Doctor {
        #[arg(long, help = "Emit machine-readable JSON output")]
        json: bool,
    },
}

fn init_logging(options: &LoadOptions) -> anyhow::Result<()> {
    use tracing::Level;

    let (level, format) = match AppConfig::load(options.clone()) {
        Ok(config) => (config.logging.level, config.logging.format),
        Err(_) => ("warn".to_string(), LogFormat::Compact),
    };
    let log_level = level.parse::<Level>().unwrap_or(Level::INFO);
    let builder = tracing_subscriber::fmt()
        .with_target(false)
        .with_max_level(log_level)
        .with_writer(std::io::stderr);

    let initialized = match format {
        LogFormat::Compact => builder.compact().try_init(),
        LogFormat::Pretty => builder.pretty().try_init(),
        LogFormat::Json => builder.json().try_init(),
    };
    initialized.map_err(|error| anyhow::anyhow!("failed to initialize logging: {error}"))
}

pub fn run() -> ExitCode {
    let cli = Cli::parse();
    let options = cli.global.load_options();
    if let Err(error) = init_logging(&options) {
        eprintln!("{error:#}");
    }

    let result = match cli.command {
        Command::Recommend { slugs, all, write } => {
            commands::recommend::run(options, slugs, all, write)
        }
        Command::Enrich { slugs, dry_run, force } => {
            commands::enrich::run(options, slugs, dry_run, force)
        }
        Command::Catalog => commands::catalog::run(options),
        Command::Config => commands::config::run(options),
        Command::Doctor { json } => commands::doctor::run(options, json),
    };

    println!("{}", result.output);
    ExitCode::from(result.exit_code)
}
