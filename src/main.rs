use std::process;
use std::path::{Path, PathBuf};
use clap::{Parser, Subcommand};
use anyhow::{Result, Context};
use colored::*;
use log::{info, error};
use simple_logger::SimpleLogger;

use tmpl_harness::core::config::HarnessConfig;
use tmpl_harness::core::runner::{SuiteRecord, SuiteReplayer};
use tmpl_harness::reporters::console::ConsoleTestReporter;
use tmpl_harness::resolver::DirectiveResolvers;


#[derive(Parser)]
#[command(author, version, about, long_about = None)]
struct Cli {

    #[arg(short, long)]
    verbose: bool,


    #[arg(short, long)]
    config: Option<PathBuf>,


    #[command(subcommand)]
    command: Commands,
}


#[derive(Subcommand)]
enum Commands {

    /// Replay a recorded suite through the console reporter
    Report {

        file: PathBuf,


        #[arg(short, long)]
        name: Option<String>,
    },


    /// Resolve a single directive with the standard resolvers
    Resolve {

        #[arg(long)]
        execution_id: String,


        #[arg(long)]
        document: String,


        #[arg(long)]
        directive: String,


        #[arg(long)]
        value: String,
    },
}

fn main() -> Result<()> {

    let cli = Cli::parse();


    let log_level = if cli.verbose {
        log::LevelFilter::Debug
    } else {
        log::LevelFilter::Info
    };

    SimpleLogger::new()
        .with_level(log_level)
        .init()
        .context("Failed to initialize logger")?;

    info!("tmpl-harness v{}", env!("CARGO_PKG_VERSION"));


    let config = match &cli.config {
        Some(path) => HarnessConfig::from_file(path)
            .with_context(|| format!("Failed to load config {}", path.display()))?,
        None => HarnessConfig::default(),
    };

    match cli.command {
        Commands::Report { file, name } => report(config, &file, name),
        Commands::Resolve { execution_id, document, directive, value } => {
            resolve(&execution_id, &document, &directive, &value)
        }
    }
}


fn report(config: HarnessConfig, file: &Path, name: Option<String>) -> Result<()> {
    let config = match name {
        Some(name) => config.with_report_name(name),
        None => config,
    };

    let suite = SuiteRecord::from_file(file)
        .with_context(|| format!("Failed to load suite {}", file.display()))?;

    let reporter = ConsoleTestReporter::new(config.report_name.as_str())
        .context("Failed to create reporter")?;

    let summary = SuiteReplayer::new(&reporter).replay(&suite);
    info!(
        "Replayed {} sequences, {} tests ({} failed, {} late tests, {} late sequences)",
        summary.sequences, summary.tests, summary.failed_tests, summary.late_tests, summary.late_sequences
    );

    if !summary.is_success() {
        process::exit(1);
    }

    Ok(())
}


fn resolve(execution_id: &str, document: &str, directive: &str, value: &str) -> Result<()> {
    let resolvers = DirectiveResolvers::standard();

    match resolvers.resolve(execution_id, document, directive, value) {
        Ok(resolved) => {
            let json = serde_json::to_string_pretty(&resolved)
                .context("Failed to serialize resolved value")?;
            println!("{}", json);
            Ok(())
        }
        Err(e) => {
            error!("Directive resolution failed: {}", e);
            eprintln!("{}: {}", "RESOLVE FAILED".red().bold(), e);
            process::exit(2);
        }
    }
}
