//! pln CLI: evaluate truth-value formulas and inspect configuration.

use std::path::PathBuf;

use clap::{Parser, Subcommand};
use miette::Result;

use pln_core::config::PlnConfig;
use pln_core::error::PlnResult;
use pln_core::formula::{Arity, Evaluation, Evaluator, Formula};
use pln_core::truth::{SimpleTruthValue, TruthValue};

#[derive(Parser)]
#[command(name = "pln", version, about = "Probabilistic logic network inference core")]
struct Cli {
    /// TOML configuration file (defaults apply when omitted).
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Evaluate a formula over truth values written as `strength:count`.
    Eval {
        /// Formula name, e.g. `deduction` (see `pln formulas`).
        formula: String,

        /// Input truth values in the formula's order.
        #[arg(required = true, allow_hyphen_values = true)]
        inputs: Vec<String>,

        /// Print the result as JSON.
        #[arg(long)]
        json: bool,
    },

    /// List formulas and the number of inputs they take.
    Formulas,

    /// Print the effective configuration as TOML.
    Config,
}

fn main() -> Result<()> {
    miette::set_hook(Box::new(|_| {
        Box::new(
            miette::MietteHandlerOpts::new()
                .terminal_links(true)
                .unicode(true)
                .context_lines(3)
                .build(),
        )
    }))
    .ok(); // Ignore error if hook already set (e.g., in tests)

    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    run(Cli::parse())?;
    Ok(())
}

fn run(cli: Cli) -> PlnResult<()> {
    let config = match &cli.config {
        Some(path) => PlnConfig::from_file(path)?,
        None => PlnConfig::default(),
    };

    match cli.command {
        Commands::Eval {
            formula,
            inputs,
            json,
        } => {
            let formula = Formula::from_name(&formula)?;
            let tvs = inputs
                .iter()
                .map(|s| s.parse::<SimpleTruthValue>().map(TruthValue::from))
                .collect::<Result<Vec<_>, _>>()?;

            let evaluator = Evaluator::new(config.formulas);
            let evaluation = evaluator.compute(formula, &tvs)?;

            if json {
                let value = match evaluation {
                    Evaluation::Value(tv) => serde_json::json!({
                        "formula": formula.name(),
                        "strength": tv.strength,
                        "count": tv.count,
                        "confidence": tv.confidence(),
                    }),
                    Evaluation::NotComputed { .. } => serde_json::json!({
                        "formula": formula.name(),
                        "computed": false,
                    }),
                };
                println!("{value:#}");
            } else {
                match evaluation {
                    Evaluation::Value(tv) => println!("{formula}: {tv}"),
                    Evaluation::NotComputed { .. } => println!("{formula}: not computed"),
                }
            }
        }

        Commands::Formulas => {
            for formula in Formula::ALL {
                let arity = match formula.arity() {
                    Arity::Exactly(n) => n.to_string(),
                    Arity::AtLeast(n) => format!("{n}+"),
                    Arity::Even => "even".to_string(),
                };
                println!("{:<28} {arity}", formula.name());
            }
        }

        Commands::Config => {
            print!("{}", config.to_toml_string()?);
        }
    }

    Ok(())
}
