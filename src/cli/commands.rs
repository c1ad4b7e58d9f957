//! Command implementations for the Tessera CLI.

use std::fs;
use std::io::Read;
use std::path::Path;

use anyhow::{Context, Result};
use rand::SeedableRng;
use rand::rngs::StdRng;

use crate::analysis::SegmentTokenizer;
use crate::cli::args::*;
use crate::pipeline::BalancePipeline;
use crate::report::{self, BalanceReport};
use crate::stats::LengthStats;

/// Execute a CLI command.
pub fn execute_command(args: TesseraArgs) -> Result<()> {
    match &args.command {
        Command::Balance(balance_args) => run_balance(balance_args.clone(), &args),
        Command::Tokenize(tokenize_args) => run_tokenize(tokenize_args.clone(), &args),
        Command::Stats(stats_args) => run_stats(stats_args.clone(), &args),
    }
}

/// Resolve the input text: inline argument, then file, then stdin.
fn read_input(text: Option<String>, input: Option<&Path>) -> Result<String> {
    if let Some(text) = text {
        return Ok(text);
    }
    if let Some(path) = input {
        return fs::read_to_string(path)
            .with_context(|| format!("failed to read {}", path.display()));
    }

    let mut buffer = String::new();
    std::io::stdin()
        .read_to_string(&mut buffer)
        .context("failed to read stdin")?;
    Ok(buffer)
}

/// Run the full balancing pipeline and print the result.
fn run_balance(args: BalanceArgs, cli_args: &TesseraArgs) -> Result<()> {
    let text = read_input(args.text, args.input.as_deref())?;
    let pipeline = BalancePipeline::new()?;
    let segments = pipeline.run(&text);

    match cli_args.output_format {
        OutputFormat::Json => {
            let result = BalanceReport::new(segments);
            println!("{}", report::to_json(&result, cli_args.pretty)?);
        }
        OutputFormat::Human => {
            let labels = match args.seed {
                Some(seed) => {
                    report::assign_labels(segments.len(), &mut StdRng::seed_from_u64(seed))
                }
                None => report::assign_labels(segments.len(), &mut rand::rng()),
            };
            println!("{}", report::render_labeled(&segments, &labels));

            if cli_args.verbosity() > 1
                && let Some(stats) = LengthStats::from_segments(&segments)
            {
                println!();
                println!("Final Statistics:");
                print!("{}", report::render_stats(&stats));
            }
        }
    }

    Ok(())
}

/// Tokenize and classify text, printing one segment per line.
fn run_tokenize(args: TokenizeArgs, cli_args: &TesseraArgs) -> Result<()> {
    let text = read_input(args.text, args.input.as_deref())?;
    let tokenizer = SegmentTokenizer::new()?;
    let segments = tokenizer.tokenize(&text);

    match cli_args.output_format {
        OutputFormat::Json => {
            println!("{}", report::to_json(&segments, cli_args.pretty)?);
        }
        OutputFormat::Human => {
            if cli_args.verbosity() > 1 {
                println!("{:<6} {:>5}  {}", "KIND", "LEN", "TEXT");
            }
            for segment in &segments {
                println!("{:<6} {:>5}  {}", segment.kind, segment.length, segment.text);
            }
        }
    }

    Ok(())
}

/// Tokenize text and print the length statistics summary.
fn run_stats(args: StatsArgs, cli_args: &TesseraArgs) -> Result<()> {
    let text = read_input(args.text, args.input.as_deref())?;
    let tokenizer = SegmentTokenizer::new()?;
    let segments = tokenizer.tokenize(&text);
    let stats = LengthStats::from_segments(&segments);

    match cli_args.output_format {
        OutputFormat::Json => {
            println!("{}", report::to_json(&stats, cli_args.pretty)?);
        }
        OutputFormat::Human => match stats {
            Some(stats) => print!("{}", report::render_stats(&stats)),
            None => println!("No segments to analyze."),
        },
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    #[test]
    fn test_read_input_prefers_inline_text() {
        let text = read_input(Some("hello".to_string()), None).unwrap();
        assert_eq!(text, "hello");
    }

    #[test]
    fn test_read_input_from_file() {
        let mut file = NamedTempFile::new().unwrap();
        write!(file, "hello from a file").unwrap();

        let text = read_input(None, Some(file.path())).unwrap();
        assert_eq!(text, "hello from a file");
    }

    #[test]
    fn test_read_input_missing_file() {
        let result = read_input(None, Some(Path::new("/nonexistent/input.txt")));
        assert!(result.is_err());
    }
}
