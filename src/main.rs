use std::{fs::read_to_string, path::PathBuf, process::exit, time::Instant};

use banyan::{
    context::compile,
    display_error,
    eval::evaluator::EvalMode,
};
use clap::{Parser, ValueEnum};
use tracing::{error, info};

#[derive(Parser)]
#[command(
    name = "banyan",
    version = env!("CARGO_PKG_VERSION"),
    about = "Compiles a source file and prints the values of its top-level declarations"
)]
struct Cli {
    /// Source file to compile
    file: PathBuf,

    /// Evaluation mode used for the printed values
    #[arg(short, long, value_enum, default_value = "fold")]
    mode: Mode,

    /// Enable verbose logging (use multiple times for increased verbosity)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    /// Suppress everything but errors
    #[arg(short, long)]
    quiet: bool,
}

#[derive(Clone, Copy, ValueEnum)]
enum Mode {
    Fold,
    Eval,
    Potential,
}

impl From<Mode> for EvalMode {
    fn from(mode: Mode) -> Self {
        match mode {
            Mode::Fold => EvalMode::ConstantFold,
            Mode::Eval => EvalMode::ConstantEval,
            Mode::Potential => EvalMode::PotentialEval,
        }
    }
}

fn setup_logging(verbose: u8, quiet: bool) {
    use tracing_subscriber::EnvFilter;

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        EnvFilter::new(match (quiet, verbose) {
            (true, _) => "error",
            (false, 0) => "info",
            (false, 1) => "debug",
            (false, _) => "trace",
        })
    });

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();
}

fn main() {
    let cli = Cli::parse();
    setup_logging(cli.verbose, cli.quiet);

    let file_name = cli
        .file
        .file_name()
        .map(|name| name.to_string_lossy().to_string())
        .unwrap_or_else(|| cli.file.to_string_lossy().to_string());

    let source = match read_to_string(&cli.file) {
        Ok(source) => source,
        Err(err) => {
            error!("failed to read {}: {}", cli.file.display(), err);
            exit(1);
        }
    };

    let start = Instant::now();
    let (mut cx, unit) = match compile(source.clone(), Some(file_name)) {
        Ok(compiled) => compiled,
        Err(err) => {
            display_error(&err, &source);
            exit(1);
        }
    };
    info!("compiled in {:?}", start.elapsed());

    if cli.quiet {
        return;
    }

    let members = cx.members(unit).to_vec();
    for decl in members {
        if !cx.ast.has_static_storage(decl) {
            continue;
        }

        let name = cx.name(decl).to_string();
        let mut evaluator = cx.evaluator(cli.mode.into());
        match evaluator.read(decl) {
            Ok(Some(value)) => println!("{} = {}", name, value),
            Ok(None) => println!("{} is not a constant", name),
            Err(err) => {
                display_error(&err, &source);
                exit(1);
            }
        }
    }
}
