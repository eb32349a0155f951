//! aurpack CLI

use clap::{Parser, Subcommand};
use colored::Colorize;
use std::io::Read;
use std::path::{Path, PathBuf};
use std::sync::LazyLock;
use tracing::{error, info, Level};
use tracing_subscriber::FmtSubscriber;

use aurpack::{
    check_recipe, deps::resolve_install_order, display::wrap_join, find_recipe, gate_recipe,
    lint::filter_lint_output, scan_recipes, Config, Error, RegistryClient, Result,
};
use aurpack_meta::BuildMetadata;

static CHECK_MARK: LazyLock<colored::ColoredString> = LazyLock::new(|| "✔".bright_green().bold());
static CROSS_MARK: LazyLock<colored::ColoredString> = LazyLock::new(|| "〤".bright_red().bold());

#[derive(Parser)]
#[command(name = "aurpack")]
#[command(about = "Version checks and publish gating for AUR recipes", long_about = None)]
#[command(version)]
struct Cli {
    /// Log level (error, warn, info, debug, trace)
    #[arg(long, default_value = "info")]
    log_level: String,

    /// Directory holding one sub-directory per recipe
    #[arg(long, env = "AURPACK_PACKAGES_DIR", default_value = "packages")]
    packages_dir: PathBuf,

    /// GitHub token for release lookups
    #[arg(long, env = "GITHUB_TOKEN", hide_env_values = true)]
    github_token: Option<String>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// List every recipe
    List,

    /// Check recipes against their .SRCINFO, upstream and the AUR
    Check {
        /// Recipes to check
        names: Vec<String>,

        /// Check every recipe
        #[arg(long, conflicts_with = "names")]
        all: bool,
    },

    /// Check that a recipe may be published on top of the AUR version
    Gate {
        name: String,
    },

    /// Parse a .SRCINFO file and print it as JSON
    Srcinfo {
        file: PathBuf,
    },

    /// Print the AUR dependency install order of a package
    Deps {
        name: String,
    },

    /// Filter linter output against a recipe's exclusions
    Lint {
        name: String,

        /// Linter output (stdin when omitted)
        file: Option<PathBuf>,
    },
}

fn setup_logging(level: &str) {
    let level = match level.to_lowercase().as_str() {
        "error" => Level::ERROR,
        "warn" => Level::WARN,
        "info" => Level::INFO,
        "debug" => Level::DEBUG,
        "trace" => Level::TRACE,
        _ => Level::INFO,
    };

    let subscriber = FmtSubscriber::builder()
        .with_max_level(level)
        .with_target(false)
        .compact()
        .finish();

    tracing::subscriber::set_global_default(subscriber).expect("Failed to set tracing subscriber");
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    setup_logging(&cli.log_level);

    let mut config = Config::default().with_packages_dir(cli.packages_dir);
    config.github_token = cli.github_token;

    let ok = match cli.command {
        Commands::List => cmd_list(&config)?,
        Commands::Check { names, all } => cmd_check(&config, names, all).await?,
        Commands::Gate { name } => cmd_gate(&config, &name).await?,
        Commands::Srcinfo { file } => cmd_srcinfo(&file)?,
        Commands::Deps { name } => cmd_deps(&config, &name).await?,
        Commands::Lint { name, file } => cmd_lint(&config, &name, file)?,
    };

    if !ok {
        std::process::exit(1);
    }
    Ok(())
}

fn cmd_list(config: &Config) -> Result<bool> {
    let recipes = scan_recipes(&config.packages_dir)?;
    let names: Vec<&str> = recipes.iter().map(|r| r.name.as_str()).collect();

    println!("{} package(s)", names.len());
    for line in wrap_join(&names, 2, config.line_width) {
        println!("{}", line);
    }
    Ok(true)
}

async fn cmd_check(config: &Config, names: Vec<String>, all: bool) -> Result<bool> {
    let recipes = scan_recipes(&config.packages_dir)?;
    let selected = if all || names.is_empty() {
        recipes.iter().collect::<Vec<_>>()
    } else {
        names
            .iter()
            .map(|name| find_recipe(&recipes, name))
            .collect::<Result<Vec<_>>>()?
    };

    let client = RegistryClient::new(config);
    let mut failed = 0;

    for recipe in &selected {
        match check_recipe(&client, recipe).await {
            Ok(report) if report.publish_pending => {
                println!("{} {} {} (publish pending)", *CHECK_MARK, report.name, report.local);
            }
            Ok(report) => println!("{} {} {}", *CHECK_MARK, report.name, report.local),
            Err(e) => {
                failed += 1;
                println!("{} {}: {}", *CROSS_MARK, recipe.name, e);
            }
        }
    }

    if failed > 0 {
        error!("{} of {} package(s) failed", failed, selected.len());
    } else {
        info!("All {} package(s) passed", selected.len());
    }
    Ok(failed == 0)
}

async fn cmd_gate(config: &Config, name: &str) -> Result<bool> {
    let recipes = scan_recipes(&config.packages_dir)?;
    let recipe = find_recipe(&recipes, name)?;
    let client = RegistryClient::new(config);

    match gate_recipe(&client, recipe).await {
        Ok(report) => {
            println!("{} {} {}", *CHECK_MARK, report.name, report.local);
            Ok(true)
        }
        Err(e) => {
            println!("{} {}: {}", *CROSS_MARK, name, e);
            Ok(false)
        }
    }
}

fn cmd_srcinfo(file: &Path) -> Result<bool> {
    let content = std::fs::read_to_string(file)?;
    let metadata = BuildMetadata::parse(&content)?;
    println!("{}", serde_json::to_string_pretty(&metadata)?);
    Ok(true)
}

async fn cmd_deps(config: &Config, name: &str) -> Result<bool> {
    let client = RegistryClient::new(config);
    for package in resolve_install_order(&client, name).await? {
        println!("{}", package);
    }
    Ok(true)
}

fn cmd_lint(config: &Config, name: &str, file: Option<PathBuf>) -> Result<bool> {
    let recipes = scan_recipes(&config.packages_dir)?;
    let recipe = find_recipe(&recipes, name)?;

    let output = match file {
        Some(path) => std::fs::read_to_string(path)?,
        None => {
            let mut buf = String::new();
            std::io::stdin().read_to_string(&mut buf)?;
            buf
        }
    };

    let remaining = filter_lint_output(&output, &recipe.lint_exclusions);
    if remaining.is_empty() {
        println!("{} {}", *CHECK_MARK, name);
        return Ok(true);
    }

    for line in &remaining {
        println!("{} {}", *CROSS_MARK, line);
    }
    let err = Error::Lint(remaining.len());
    error!("{}: {}", name, err);
    Ok(false)
}
