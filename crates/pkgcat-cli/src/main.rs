//! pkgcat - package catalog and installer
//!
//! Usage:
//!   pkgcat update              # Refresh the local cache from all sources
//!   pkgcat search <query>      # Search cached package indexes
//!   pkgcat describe <name>     # Show package metadata and versions
//!   pkgcat install <name>      # Install the latest version of a package

mod marathon;

use std::path::{Path, PathBuf};
use std::process::ExitCode;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand, ValueEnum};
use serde_json::{Map, Value};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use pkgcat_core::cache::TracingObserver;
use pkgcat_core::catalog::PackageCatalog;
use pkgcat_core::config::{TomlConfig, parse_config_file};
use pkgcat_core::install::{InstallPlanner, list_installed_packages, uninstall_package};
use pkgcat_core::registry::{LayoutValidator, ScriptValidator};

use crate::marathon::MarathonClient;

/// Environment variable naming the configuration file.
const CONFIG_ENV: &str = "PKGCAT_CONFIG";

#[derive(Parser)]
#[command(name = "pkgcat")]
#[command(about = "Install and manage cluster software packages", long_about = None)]
struct Cli {
    /// Configuration file (defaults to $PKGCAT_CONFIG, then the user config dir)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Show the latest version's metadata and all available versions
    Describe {
        /// Package name
        name: String,
    },

    /// Print a short description of this tool
    Info,

    /// Install the latest version of a package
    Install {
        /// Package name
        name: String,
        /// JSON file with option values
        #[arg(long)]
        options: Option<PathBuf>,
        /// Print the rendered descriptor instead of submitting it
        #[arg(long)]
        dry_run: bool,
    },

    /// List installed packages
    List,

    /// Search cached package indexes
    Search {
        /// Search term, matched against names, tags and descriptions
        query: String,
    },

    /// List configured package sources
    Sources,

    /// Remove every app installed from a package
    #[command(alias = "rm")]
    Uninstall {
        /// Package name
        name: String,
    },

    /// Refresh the local package cache from all sources
    Update {
        /// How fetched trees are checked before they replace the cache
        #[arg(long, default_value = "script")]
        validator: ValidatorKind,
    },
}

#[derive(Clone, Copy, ValueEnum, Default)]
enum ValidatorKind {
    /// Run the validation script shipped in each tree
    #[default]
    Script,
    /// Check the index and package directory layout
    Layout,
}

fn main() -> ExitCode {
    // Logs go to stderr so command output stays machine-readable
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "pkgcat=info,warn".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let cli = Cli::parse();

    match run_cli(cli) {
        Ok(code) => code,
        Err(err) => {
            eprintln!("{err:#}");
            ExitCode::FAILURE
        }
    }
}

fn run_cli(cli: Cli) -> Result<ExitCode> {
    if let Commands::Info = cli.command {
        println!("Install and manage cluster software packages");
        return Ok(ExitCode::SUCCESS);
    }

    let config = load_config(cli.config.as_deref())?;
    // Only commands touching sources or the cache need `package.*` settings
    let catalog = || PackageCatalog::from_config(&config);

    match cli.command {
        Commands::Info => Ok(ExitCode::SUCCESS),
        Commands::Describe { name } => run_describe(&catalog()?, &name),
        Commands::Install {
            name,
            options,
            dry_run,
        } => run_install(&catalog()?, &config, &name, options.as_deref(), dry_run),
        Commands::List => run_list(&config),
        Commands::Search { query } => run_search(&catalog()?, &query),
        Commands::Sources => run_sources(&catalog()?),
        Commands::Uninstall { name } => run_uninstall(&config, &name),
        Commands::Update { validator } => run_update(&catalog()?, validator),
    }
}

fn config_path(explicit: Option<&Path>) -> Result<PathBuf> {
    if let Some(path) = explicit {
        return Ok(path.to_path_buf());
    }
    if let Some(path) = std::env::var_os(CONFIG_ENV) {
        return Ok(PathBuf::from(path));
    }
    let dir = dirs::config_dir().context("Could not determine the user config directory")?;
    Ok(dir.join("pkgcat").join("config.toml"))
}

fn load_config(explicit: Option<&Path>) -> Result<TomlConfig> {
    let path = config_path(explicit)?;
    tracing::debug!(path = %path.display(), "loading config");
    Ok(parse_config_file(&path)?)
}

fn run_sources(catalog: &PackageCatalog) -> Result<ExitCode> {
    let (sources, errors) = catalog.list_sources();
    if !errors.is_empty() {
        for err in &errors {
            eprintln!("{}", err);
        }
        return Ok(ExitCode::FAILURE);
    }

    for source in &sources {
        println!("{} {}", source.cache_key(), source.uri());
    }
    Ok(ExitCode::SUCCESS)
}

fn run_update(catalog: &PackageCatalog, validator: ValidatorKind) -> Result<ExitCode> {
    let report = match validator {
        ValidatorKind::Script => catalog.update(ScriptValidator::default(), TracingObserver)?,
        ValidatorKind::Layout => catalog.update(LayoutValidator, TracingObserver)?,
    };

    if report.is_success() {
        return Ok(ExitCode::SUCCESS);
    }
    for err in &report.errors {
        eprintln!("{}", err);
    }
    Ok(ExitCode::FAILURE)
}

fn run_describe(catalog: &PackageCatalog, name: &str) -> Result<ExitCode> {
    let pkg = catalog.resolve_package(name)?;
    let version = pkg.latest_version()?;
    let metadata = pkg.metadata(&version)?;

    let rendered =
        toml::to_string(&without_nulls(metadata)).context("Failed to render package metadata")?;
    println!("{}", rendered);
    println!("Available versions:");
    for (_, software_version) in pkg.software_versions()? {
        println!("{}", software_version);
    }
    Ok(ExitCode::SUCCESS)
}

/// Drop `null` members and items, which TOML cannot represent.
fn without_nulls(value: Value) -> Value {
    match value {
        Value::Object(map) => Value::Object(
            map.into_iter()
                .filter(|(_, v)| !v.is_null())
                .map(|(k, v)| (k, without_nulls(v)))
                .collect(),
        ),
        Value::Array(items) => Value::Array(
            items
                .into_iter()
                .filter(|v| !v.is_null())
                .map(without_nulls)
                .collect(),
        ),
        other => other,
    }
}

fn run_search(catalog: &PackageCatalog, query: &str) -> Result<ExitCode> {
    let results = catalog.search(query)?;
    println!("{}", serde_json::to_string_pretty(&results)?);
    Ok(ExitCode::SUCCESS)
}

fn read_options(path: &Path) -> Result<Map<String, Value>> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Unable to open file [{}]", path.display()))?;
    let value: Value = serde_json::from_str(&content)
        .with_context(|| format!("Unable to parse options file [{}]", path.display()))?;
    match value {
        Value::Object(map) => Ok(map),
        _ => anyhow::bail!("Options file [{}] must contain a JSON object", path.display()),
    }
}

fn run_install(
    catalog: &PackageCatalog,
    config: &TomlConfig,
    name: &str,
    options: Option<&Path>,
    dry_run: bool,
) -> Result<ExitCode> {
    let pkg = catalog.resolve_package(name)?;
    let user_options = match options {
        Some(path) => read_options(path)?,
        None => Map::new(),
    };
    let version = pkg.latest_version()?;
    let planner = InstallPlanner::new();

    if dry_run {
        let descriptor = planner.plan(&pkg, &version, &user_options)?;
        println!("{}", serde_json::to_string_pretty(&descriptor)?);
        return Ok(ExitCode::SUCCESS);
    }

    let client = MarathonClient::from_config(config)?;
    planner.install(&pkg, &version, &user_options, &client)?;
    tracing::info!(package = %name, version = %version, "Installed package");
    Ok(ExitCode::SUCCESS)
}

fn run_list(config: &TomlConfig) -> Result<ExitCode> {
    let client = MarathonClient::from_config(config)?;
    for installed in list_installed_packages(&client)? {
        println!("{} [{}]", installed.name, installed.version);
    }
    Ok(ExitCode::SUCCESS)
}

fn run_uninstall(config: &TomlConfig, name: &str) -> Result<ExitCode> {
    let client = MarathonClient::from_config(config)?;
    for app_id in uninstall_package(&client, name)? {
        tracing::info!(package = %name, app = %app_id, "Removed app");
    }
    Ok(ExitCode::SUCCESS)
}
