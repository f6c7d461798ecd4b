//! CLI binary for stubgen: generate Go RPC client stubs from interfaces.

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use std::path::{Path, PathBuf};
use stubgen_core::GenConfig;
use stubgen_gen::Driver;

#[derive(Parser)]
#[command(name = "stubgen", about = "Go RPC client stub generator")]
struct Cli {
    /// Source directory to scan (defaults to current directory)
    #[arg(short, long, global = true)]
    source: Option<PathBuf>,

    /// Enable verbose diagnostics (per-file progress, shape violations)
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Generate a client stub file for every interface found
    Gen {
        /// Output directory for generated files
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Failure handling: halt (stop at first) or collect (report all)
        #[arg(long)]
        on_error: Option<String>,
    },

    /// List discovered services and their accepted methods without generating
    List,
}

fn get_source_root(cli: &Cli) -> Result<PathBuf> {
    match &cli.source {
        Some(p) => Ok(p.clone()),
        None => std::env::current_dir().context("failed to get current directory"),
    }
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_env("STUBGEN_LOG").unwrap_or_else(|_| {
                tracing_subscriber::EnvFilter::new(if cli.verbose { "debug" } else { "info" })
            }),
        )
        .with_writer(std::io::stderr)
        .init();

    let source_root = get_source_root(&cli)?;

    match cli.command {
        Commands::Gen { output, on_error } => cmd_gen(&source_root, output, on_error),
        Commands::List => cmd_list(&source_root),
    }
}

fn cmd_gen(
    source_root: &Path,
    output: Option<PathBuf>,
    on_error: Option<String>,
) -> Result<()> {
    let mut config = GenConfig::load(source_root)?;
    if let Some(dir) = output {
        config.output_dir = dir;
    }
    if let Some(policy) = on_error {
        config.error_policy = policy.parse()?;
    }

    let driver = Driver::new(config)?;
    let summary = driver
        .run(source_root)
        .context("stub generation failed")?;

    println!(
        "Scanned {} file(s), found {} service(s), wrote {} stub(s) ({} method(s) skipped)",
        summary.files_scanned,
        summary.services_found,
        summary.stubs_written,
        summary.methods_rejected,
    );
    Ok(())
}

fn cmd_list(source_root: &Path) -> Result<()> {
    let driver = Driver::new(GenConfig::load(source_root)?)?;
    let services = driver.discover(source_root)?;

    if services.is_empty() {
        println!("No services found under {}", source_root.display());
        return Ok(());
    }

    for service in &services {
        println!(
            "{}.{} -> {}",
            service.package,
            service.name,
            service.output_file_name()
        );
        for method in &service.methods {
            println!(
                "  {}(request {}) (*{}, error)",
                method.name, method.request_type, method.response_type
            );
        }
    }
    Ok(())
}
