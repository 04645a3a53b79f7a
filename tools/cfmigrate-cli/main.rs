use cfmigrate::prelude::*;
use clap::{ArgAction, Parser, ValueEnum};
use std::path::PathBuf;

/// Define a CLI-specific enum for clap to parse.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum KindCli {
    Auto,
    Config,
    State,
}

/// Rewrites Cloudflare Terraform configuration and state from the v4 provider schema to v5
#[derive(Parser, Debug)]
#[command(version, about, long_about = None)]
struct Cli {
    /// Configuration (.tf) and state (.tfstate, .json) files to migrate
    #[arg(required = true)]
    paths: Vec<PathBuf>,

    /// Document kind; `auto` decides by file extension
    #[arg(short, long, value_enum, default_value = "auto")]
    kind: KindCli,

    /// Report what would change without writing any file
    #[arg(short = 'n', long)]
    dry_run: bool,

    /// Also expand the include/exclude/require lists of access groups in state
    #[arg(long)]
    expand_access_groups: bool,

    /// Print one JSON report per file instead of a summary
    #[arg(long)]
    json: bool,

    /// Increase log verbosity (-v info, -vv debug); RUST_LOG takes precedence
    #[arg(short, long, action = ArgAction::Count)]
    verbose: u8,
}

fn main() {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    let migrator = Migrator::builder()
        .expand_access_groups(cli.expand_access_groups)
        .build();
    let kind = match cli.kind {
        KindCli::Auto => None,
        KindCli::Config => Some(DocumentKind::Config),
        KindCli::State => Some(DocumentKind::State),
    };
    let mode = if cli.dry_run {
        WriteMode::DryRun
    } else {
        WriteMode::InPlace
    };

    let mut failed = 0usize;
    let mut changed = 0usize;
    for path in &cli.paths {
        match migrator.migrate_file(path, kind, mode) {
            Ok(outcome) => {
                if outcome.changed {
                    changed += 1;
                }
                if cli.json {
                    print_json(&outcome);
                } else {
                    print_summary(&outcome, cli.dry_run);
                }
            }
            Err(e) => {
                failed += 1;
                eprintln!("Error: {}", e);
            }
        }
    }

    if !cli.json {
        let verb = if cli.dry_run { "would change" } else { "changed" };
        println!(
            "\n{} file(s) processed, {} {}, {} failed",
            cli.paths.len(),
            changed,
            verb,
            failed
        );
    }

    if failed > 0 {
        std::process::exit(1);
    }
}

fn init_logging(verbose: u8) {
    let level = match verbose {
        0 => log::LevelFilter::Warn,
        1 => log::LevelFilter::Info,
        _ => log::LevelFilter::Debug,
    };
    env_logger::Builder::new()
        .filter_level(level)
        .parse_default_env()
        .init();
}

fn print_json(outcome: &FileOutcome) {
    match serde_json::to_string(outcome) {
        Ok(line) => println!("{}", line),
        Err(e) => exit_with_error(&format!("Failed to serialize report: {}", e)),
    }
}

fn print_summary(outcome: &FileOutcome, dry_run: bool) {
    let status = match (outcome.changed, dry_run) {
        (false, _) => "unchanged",
        (true, true) => "would migrate",
        (true, false) => "migrated",
    };
    println!("{}: {}", outcome.path.display(), status);

    match &outcome.report {
        DocumentReport::Config(report) => {
            if report.resources_renamed > 0 {
                println!("  -> Renamed resource types: {}", report.resources_renamed);
            }
            if report.references_renamed > 0 {
                println!("  -> Renamed references: {}", report.references_renamed);
            }
            if report.attributes_rewritten > 0 {
                println!(
                    "  -> Expanded condition attributes: {}",
                    report.attributes_rewritten
                );
            }
            for diagnostic in &report.diagnostics {
                println!("  -> Warning: {}", diagnostic);
            }
        }
        DocumentReport::State(report) => {
            println!(
                "  -> Resources: {}, instances rewritten: {}, deferred: {}, unchanged: {}",
                report.resources, report.rewritten, report.deferred, report.unchanged
            );
            for relabel in &report.relabelled {
                println!("  -> {} is now {}", relabel.address, relabel.to);
            }
            for diagnostic in &report.diagnostics {
                println!("  -> Warning: {}", diagnostic);
            }
        }
    }
}

fn exit_with_error(message: &str) -> ! {
    eprintln!("\nError: {}", message);
    std::process::exit(1);
}
