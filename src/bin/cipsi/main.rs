use std::process::ExitCode;

use clap::Parser;

mod errors;
use errors::Error;

mod args;
use args::Cli;

mod command;

fn main() -> ExitCode {
    env_logger::init();

    log::debug!("parsing command line arguments");
    let cli = Cli::parse();

    if cli.verbose {
        log::info!("--verbose flag set");
    }

    match main_exec(&cli) {
        Ok(()) => {
            log::info!("exit (0)");
            ExitCode::from(0)
        }
        Err(err) => {
            log::error!("{err}");
            log::error!("exit ({})", u8::from(&err));
            ExitCode::from(u8::from(&err))
        }
    }
}

fn main_exec(cli: &Cli) -> Result<(), Error> {
    command::dispatch(cli)
}
