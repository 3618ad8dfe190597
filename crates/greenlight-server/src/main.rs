//! Greenlight API server entry point.

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::Context;
use tracing::{info, warn};

use greenlight_config::{ConfigLoader, LogFormat, Overrides, ENV_PREFIX};
use greenlight_data::InMemoryMovieStore;
use greenlight_server::{Application, Server};
use greenlight_telemetry::{init_logging, LogConfig};

const DEFAULT_CONFIG_FILE: &str = "greenlight.toml";

/// Command-line arguments.
#[derive(Debug, Default)]
struct Args {
    config: Option<PathBuf>,
    overrides: Overrides,
}

impl Args {
    fn parse() -> Self {
        let mut args = std::env::args().skip(1);
        let mut parsed = Self::default();

        while let Some(arg) = args.next() {
            match arg.as_str() {
                "--config" | "-c" => parsed.config = Some(PathBuf::from(value(&arg, args.next()))),
                "--port" | "-p" => {
                    let raw = value(&arg, args.next());
                    match raw.parse::<u16>() {
                        Ok(port) => parsed.overrides.port = Some(port),
                        Err(_) => usage_error(&format!("invalid port: {raw}")),
                    }
                }
                "--env" | "-e" => parsed.overrides.env = Some(value(&arg, args.next())),
                "--db-dsn" => parsed.overrides.db_dsn = Some(value(&arg, args.next())),
                "--help" | "-h" => {
                    print_help();
                    std::process::exit(0);
                }
                "--version" | "-v" => {
                    println!("greenlight {}", greenlight_server::VERSION);
                    std::process::exit(0);
                }
                other => usage_error(&format!("unknown argument: {other}")),
            }
        }

        parsed
    }
}

fn value(flag: &str, next: Option<String>) -> String {
    next.unwrap_or_else(|| usage_error(&format!("{flag} requires a value")))
}

fn usage_error(message: &str) -> ! {
    eprintln!("{message}");
    eprintln!("Use --help for usage information");
    std::process::exit(2);
}

fn print_help() {
    println!(
        r"Greenlight - JSON API for a movie catalogue

USAGE:
    greenlight [OPTIONS]

OPTIONS:
    -c, --config <PATH>    Configuration file, TOML or JSON (default: greenlight.toml if present)
    -p, --port <PORT>      API server port (default: 4000)
    -e, --env <ENV>        Environment: development, staging or production
        --db-dsn <DSN>     Database connection string
    -h, --help             Print help information
    -v, --version          Print version information

ENVIRONMENT VARIABLES:
    GREENLIGHT_DB_DSN                       Database connection string
    GREENLIGHT__SERVER__PORT                API server port
    GREENLIGHT__SERVER__ENV                 Environment name
    GREENLIGHT__SERVER__READ_TIMEOUT_SECS   Request body read timeout
    GREENLIGHT__SERVER__WRITE_TIMEOUT_SECS  Handler timeout
    GREENLIGHT__LOGGING__LEVEL              Log filter directive
    GREENLIGHT__LOGGING__FORMAT             json or pretty

Variables may also be placed in a .env file in the working directory.
"
    );
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = Args::parse();

    let loader = match &args.config {
        Some(path) => ConfigLoader::new()
            .with_file(path)
            .with_context(|| format!("failed to load {}", path.display()))?,
        None => ConfigLoader::new().with_optional_file(DEFAULT_CONFIG_FILE)?,
    };
    let config = loader
        .with_dotenv()?
        .with_env_prefix(ENV_PREFIX)
        .with_overrides(args.overrides)
        .load()
        .context("invalid configuration")?;

    let log_config = LogConfig::for_environment(&config.server.env)
        .with_level(config.logging.level.clone())
        .with_json(config.logging.format == LogFormat::Json);
    init_logging(&log_config).context("failed to initialize logging")?;

    if config.db.dsn.is_empty() {
        info!("no database configured, using in-memory movie store");
    } else {
        warn!("database DSN is set but only the in-memory movie store is available");
    }

    let server_config = config.server.clone();
    let app = Application::new(config, Arc::new(InMemoryMovieStore::new()));

    Server::new(app, server_config)
        .run()
        .await
        .context("server error")?;

    Ok(())
}
