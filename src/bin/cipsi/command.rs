use crate::{
    args::{
        Cli,
        Commands,
        Run,
    },
    errors::Error,
};

mod run;

pub fn run(
    args: &Run,
    _cli: &Cli,
) -> Result<(), Error> {
    run::run(args)
}

pub fn dispatch(
    cli: &Cli,
) -> Result<(), Error> {
    match &cli.command {
        Commands::Run(args) => run(args, cli),
    }
}
