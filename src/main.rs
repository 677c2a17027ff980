mod cli;
mod pipe;
mod report;
mod simulate;

use anyhow::Result;
use clap::{CommandFactory, Parser};
use crossbeam_channel as channel;
use tracing::warn;
use tracing_subscriber::EnvFilter;

use crate::cli::{Cli, Commands};
use crate::pipe::run_pipe;
use crate::simulate::{run_simulate, SimulateError};

fn main() {
    // stdout is reserved for piped data
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_target(false)
        .with_writer(std::io::stderr)
        .try_init()
        .ok();

    // The sender is kept alive here so a missing handler never reads as Ctrl-C
    let (interrupt_tx, interrupt_rx) = channel::bounded::<()>(1);
    {
        let tx = interrupt_tx.clone();
        if let Err(e) = ctrlc::set_handler(move || {
            let _ = tx.try_send(());
        }) {
            warn!(?e, "Could not install Ctrl-C handler");
        }
    }

    let cli = Cli::parse();
    let result: Result<()> = match cli.command {
        Some(Commands::Pipe(pipe)) => run_pipe(pipe, interrupt_rx),
        Some(Commands::Simulate(sim)) => run_simulate(sim, interrupt_rx),
        None => {
            Cli::command().print_help().ok();
            println!();
            Ok(())
        }
    };
    drop(interrupt_tx);

    if let Err(err) = result {
        let code = exit_code_for_error(&err);
        eprintln!("error: {err:?}");
        std::process::exit(code);
    }
}

pub(crate) fn exit_code_for_error(err: &anyhow::Error) -> i32 {
    // 2: invalid argument, 3: I/O failure, 1: other
    for cause in err.chain() {
        if cause.is::<SimulateError>() || cause.is::<ratemeter::MeterError>() {
            return 2;
        }
        if cause.is::<std::io::Error>() {
            return 3;
        }
    }
    1
}
