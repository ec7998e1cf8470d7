use std::fs;
use std::path::PathBuf;
use std::process::ExitCode;

use clap::Parser;
use log::{error, info};

use tinyvm::{RunState, VmContext};
use tinyvm_asm::{LineReader, Scanner, TokenAggregator};

/// Scan and echo TinyVM assembly's token stream, or run the built-in demo program.
#[derive(Parser, Debug)]
#[command(version, about)]
struct Cli {
    /// Assembly source file. When omitted, runs the built-in GCD demo instead.
    source: Option<PathBuf>,
}

fn main() -> ExitCode {
    env_logger::init();

    let cli = Cli::parse();
    match cli.source {
        Some(path) => run_file(&path),
        None => run_demo(),
    }
}

/// Echoes each line's token stream for diagnostics (spec.md §6). A
/// malformed line's aggregation failure is reported but does not itself
/// fail the process — only a file-open error or a VM fault does that.
fn run_file(path: &PathBuf) -> ExitCode {
    let source = match fs::read_to_string(path) {
        Ok(source) => source,
        Err(err) => {
            error!("reading {}: {err}", path.display());
            return ExitCode::FAILURE;
        }
    };

    let mut aggregator = TokenAggregator::new(Scanner::new(source.as_bytes()));
    let mut reader = LineReader::new(&mut aggregator);
    let mut line_no = 1;

    loop {
        match reader.read_line() {
            Ok(Some(buffer)) => {
                println!("{line_no}: {buffer:?}", buffer = buffer.as_ref());
                line_no += 1;
            }
            Ok(None) => break,
            Err(err) => {
                error!("{}:{line_no}: {err}", path.display());
                line_no += 1;
            }
        }
    }

    ExitCode::SUCCESS
}

fn run_demo() -> ExitCode {
    let mut ctx = VmContext::new();
    ctx.init_stack(tinyvm::demo::STACK_BASE);
    ctx.set_program_base(tinyvm::demo::PROGRAM_BASE);

    if let Err(fault) = ctx.load_program(&tinyvm::demo::euclid_program()) {
        error!("loading demo program: {fault}");
        return ExitCode::FAILURE;
    }

    info!("running built-in gcd(1071, 462) demo");
    match tinyvm::run(&mut ctx) {
        Ok(()) => {
            println!(
                "gcd = {}, state = {:?}",
                ctx.register(tinyvm::RegisterId::R0),
                ctx.state()
            );
            ExitCode::SUCCESS
        }
        Err(fault) => {
            error!("vm fault: {fault}");
            debug_assert_eq!(ctx.state(), RunState::Faulted);
            ExitCode::FAILURE
        }
    }
}
