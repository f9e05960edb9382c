//! Command line front end: scans an input file with a pattern set and prints every match.

use std::path::PathBuf;
use std::sync::Arc;

use clap::Parser;

use descan::{load_patterns, Pattern, PatternId, Result, Scanner, ScannerCtxt};

/// Scan a text file for pattern matches.
#[derive(Parser, Debug)]
#[command(version, about)]
struct Cli {
    /// The file to scan.
    input: PathBuf,

    /// A pattern definition file (JSON). Without it a small built-in demo set is used.
    #[arg(short, long)]
    patterns: Option<PathBuf>,
}

/// The demo pattern set used when no pattern file is given.
fn default_patterns() -> Vec<Pattern> {
    vec![
        Pattern::new(
            PatternId::new(1, 0),
            "ssn",
            "[[:digit:]]{3}[ -][[:digit:]]{2}[ -][[:digit:]]{4}",
        ),
        Pattern::new(
            PatternId::new(2, 0),
            "visa",
            "4[[:digit:]]{3}([ -]?[[:digit:]]{4}){3}",
        ),
    ]
}

fn main() -> Result<()> {
    env_logger::init();
    let cli = Cli::parse();
    let patterns = match &cli.patterns {
        Some(path) => load_patterns(path)?,
        None => default_patterns(),
    };
    let ctxt = Arc::new(ScannerCtxt::new(patterns));
    let input = std::fs::read_to_string(&cli.input)?;
    let mut scanner = Scanner::new(ctxt);
    let mut matches = scanner.update(&input);
    matches.extend(scanner.complete());
    for m in &matches {
        println!(
            "{} {} {} '{}'",
            m.id(),
            m.name(),
            m.pos(),
            m.text().escape_default()
        );
    }
    Ok(())
}
