use anyhow::Result;
use clap::Parser;
use colored::Colorize;
use std::path::{Path, PathBuf};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use tablecheck_cli::{load_tables, write_distinct, write_messages};
use tablecheck_core::{Config, Level, Message, Report};
use tablecheck_engine::{validate_all, ConfigError, FunctionLibrary, Registry};
use tablecheck_expr::ExprParser;

/// tablecheck - validate tables against datatype, field and rule tables
#[derive(Parser)]
#[command(name = "tablecheck")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Input directories and/or CSV/TSV files
    #[arg(required = true)]
    paths: Vec<PathBuf>,

    /// Collect each distinct message and write the rows carrying them to
    /// `<table>_distinct` tables in this directory
    #[arg(short, long)]
    distinct: Option<PathBuf>,

    /// Sheet row number of the first data row
    #[arg(short, long)]
    row_start: Option<usize>,

    /// CSV or TSV file to write messages to
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// JSON report file
    #[arg(long)]
    report: Option<PathBuf>,

    /// Lowest level that fails the run (ERROR, WARN or INFO)
    #[arg(long)]
    fail_on: Option<Level>,

    /// Path to config file (default: tablecheck.toml)
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Enable verbose output
    #[arg(short, long)]
    verbose: bool,
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let default_filter = if cli.verbose { "debug" } else { "info" };
    tracing_subscriber::registry()
        .with(fmt::layer().with_writer(std::io::stderr))
        .with(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_filter)),
        )
        .init();

    let config = load_config(&cli)?;
    if cli.verbose {
        eprintln!("{} row {}", "First data row:".cyan(), config.row_start);
    }

    let tables = load_tables(&cli.paths, config.row_start)?;
    let table_count = tables.data_tables().count();

    let registry = match Registry::build(tables, FunctionLibrary::new(), &ExprParser::new()) {
        Ok(registry) => registry,
        Err(ConfigError::Invalid(messages)) => {
            eprintln!("{}", "Configuration tables are invalid".red().bold());
            let report = Report::from_messages(messages, 0);
            finish(&config, &report)?;
            std::process::exit(1);
        }
        Err(err) => {
            eprintln!("{} {}", "Configuration error:".red().bold(), err);
            std::process::exit(1);
        }
    };

    let mut messages: Vec<Message> = Vec::new();
    for outcome in validate_all(&registry) {
        match &config.distinct {
            Some(dir) => {
                let dir = config.resolve(dir);
                messages.extend(write_distinct(
                    &dir,
                    registry.tables(),
                    &outcome.table,
                    &outcome.messages,
                )?);
            }
            None => messages.extend(outcome.messages),
        }
    }

    let report = Report::from_messages(messages, table_count);
    finish(&config, &report)?;

    if report.fails_at(config.fail_on) {
        std::process::exit(1);
    }

    Ok(())
}

/// Read `tablecheck.toml` (or `--config`) and apply command-line overrides
fn load_config(cli: &Cli) -> Result<Config> {
    let mut config = if let Some(config_path) = &cli.config {
        Config::from_file(config_path)?
    } else if Path::new("tablecheck.toml").exists() {
        Config::from_file(Path::new("tablecheck.toml"))?
    } else {
        if cli.verbose {
            eprintln!("{}", "No config file found, using defaults".yellow());
        }
        Config::default()
    };

    if let Some(row_start) = cli.row_start {
        anyhow::ensure!(row_start >= 2, "--row-start must be at least 2, got {}", row_start);
        config.row_start = row_start;
    }
    // Flags are relative to the working directory, not the config file.
    let cwd = std::env::current_dir()?;
    if let Some(distinct) = &cli.distinct {
        config.distinct = Some(cwd.join(distinct));
    }
    if let Some(output) = &cli.output {
        config.output = Some(cwd.join(output));
    }
    if let Some(report) = &cli.report {
        config.report = Some(cwd.join(report));
    }
    if let Some(level) = cli.fail_on {
        config.fail_on = level;
    }
    Ok(config)
}

/// Write the configured outputs and print the summary
fn finish(config: &Config, report: &Report) -> Result<()> {
    if let Some(output) = &config.output {
        let output = config.resolve(output);
        write_messages(&output, &report.messages)?;
        eprintln!("{} {}", "Messages saved to:".green(), output.display());
    }
    if let Some(path) = &config.report {
        let path = config.resolve(path);
        report.save_to_file(&path)?;
        eprintln!("{} {}", "Report saved to:".green(), path.display());
    }
    print_report_summary(report);
    Ok(())
}

fn print_report_summary(report: &Report) {
    println!("\n{}", "=".repeat(60).bright_blue());
    println!("{}", "Table Validation Report".bold().bright_blue());
    println!("{}", "=".repeat(60).bright_blue());
    println!();

    println!("{}", "Summary:".bold());
    println!("  Tables checked: {}", report.summary.tables_checked);
    println!("  Total messages: {}", report.summary.total);

    if report.summary.errors > 0 {
        println!("  Errors:   {}", format!("{}", report.summary.errors).red().bold());
    } else {
        println!("  Errors:   {}", format!("{}", report.summary.errors).green());
    }

    if report.summary.warnings > 0 {
        println!("  Warnings: {}", format!("{}", report.summary.warnings).yellow());
    } else {
        println!("  Warnings: {}", format!("{}", report.summary.warnings).green());
    }

    println!("  Info:     {}", report.summary.info);
    println!();

    if report.messages.is_empty() {
        println!("{}", "✓ No issues found!".green().bold());
        return;
    }

    println!("{}", "Messages:".bold());
    for msg in &report.messages {
        let level = match msg.level {
            Level::Error => "ERROR".red().bold(),
            Level::Warn => "WARN".yellow().bold(),
            Level::Info => "INFO".cyan(),
        };
        let location = match msg.cell {
            Some(cell) => format!("{}:{}", msg.table, cell),
            None => msg.table.clone(),
        };
        println!("  [{}] {}: {}", level, location, msg.message);
        if let Some(rule_id) = &msg.rule_id {
            print!("    from {}", rule_id);
            if let Some(rule) = &msg.rule {
                print!(" ({})", rule);
            }
            println!();
        }
        if let Some(suggestion) = &msg.suggestion {
            println!("    Suggestion: {}", suggestion);
        }
    }
}
