// ============================================================
// Layer 1 — CLI / Presentation Layer
// ============================================================
// Entry point for all user interaction, built on `clap`.
// All business logic is delegated to Layer 2 (application).
//
// Three commands are supported:
//   1. `run`      — train and evaluate one configuration
//   2. `suite`    — run one of the ablation suites
//   3. `evaluate` — re-score a saved checkpoint
//
// Reference: Rust Book §7 (Modules), §12 (CLI programs)

pub mod commands;

use anyhow::Result;
use clap::Parser;
use commands::{Commands, EvaluateArgs, RunArgs, SuiteArgs};

use crate::data::loader::TsFileLoader;
use crate::infra::results::ResultStore;

#[derive(Parser, Debug)]
#[command(
    name = "shapelet-ablation",
    version,
    about = "Train generalised shapelet classifiers on the UEA archive and run ablation studies."
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

impl Cli {
    /// Dispatch to the matching use case. The CLI layer only routes.
    pub fn run(self) -> Result<()> {
        match self.command {
            Commands::Run(args)      => run_experiment(args),
            Commands::Suite(args)    => run_suite(args),
            Commands::Evaluate(args) => run_evaluate(args),
        }
    }
}

fn run_experiment(args: RunArgs) -> Result<()> {
    use crate::application::run_use_case::RunUseCase;

    tracing::info!("Starting run on {}", args.dataset);
    let record = RunUseCase::new(args.into()).execute()?;

    println!(
        "\n{}: train accuracy {:.3}, val accuracy {:.3}, test accuracy {:.3}",
        record.dataset,
        record.train_metrics.accuracy,
        record.val_metrics.accuracy,
        record.test_metrics.accuracy,
    );
    Ok(())
}

fn run_suite(args: SuiteArgs) -> Result<()> {
    use crate::application::suites::SuiteRunner;

    let suite  = args.suite;
    let runner = SuiteRunner::new(suite, args.into());
    let base   = runner.base();
    let source = TsFileLoader::new(&base.data_dir);
    let sink   = ResultStore::new(&base.results_dir);

    let executed = runner.execute(&source, &sink)?;
    println!("Suite {suite:?} finished: {executed} runs executed.");
    Ok(())
}

fn run_evaluate(args: EvaluateArgs) -> Result<()> {
    use crate::application::evaluate_use_case::EvaluateUseCase;

    let eval = EvaluateUseCase::new(&args.checkpoint_dir, args.data_dir)?.execute()?;
    for (split, m) in [("train", eval.train), ("val", eval.val), ("test", eval.test)] {
        println!("{split:>5}: loss {:.4}  accuracy {:.3}", m.loss, m.accuracy);
    }
    Ok(())
}
