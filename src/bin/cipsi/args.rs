use clap::{
    Args,
    Parser,
    Subcommand,
    ValueEnum,
};

/// Selected configuration interaction (CIPSI), one cycle
#[derive(Debug, Parser)]
#[command(name = "cipsi")]
pub struct Cli {
    #[arg(long, short, default_value = "false")]
    pub verbose: bool,
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Diagonalize the current basis and score the PT2 external space
    #[command(arg_required_else_help = true)]
    #[command(short_flag = 'R')]
    Run(Run),
}

#[derive(Debug, Args)]
pub struct Run {
    /// FCIDUMP integral file, optionally .gz-compressed
    #[arg(long)]
    pub integrals: String,
    /// Wavefunction file (coef det_alpha det_beta triples), optionally
    /// .gz-compressed
    #[arg(long)]
    pub wavefunction: String,
    /// Number of alpha electrons (defaults to the occupation count of the
    /// first determinant in the wavefunction file)
    #[arg(long)]
    pub n_alpha: Option<u32>,
    /// Run configuration (Davidson parameters, worker count, selection
    /// size). STDOUT default values if not specified
    #[arg(long)]
    pub config_file: Option<String>,
    #[arg(long, default_value = "json")]
    pub config_format: Format,
    #[arg(long, default_value = "determinant")]
    pub driver: Driver,
    /// Skip PT2 scoring and report only the variational energy
    #[arg(long, default_value = "false")]
    pub no_pt2: bool,
    #[arg(long, default_value = "json")]
    pub output_format: Format,
    /// Pretty print the output if possible
    #[arg(short, long, default_value = "false")]
    pub pretty_print: bool,
    /// STDOUT, if not specified
    #[arg(long, short)]
    pub output_file: Option<String>,
}

#[derive(ValueEnum, Copy, Clone, Debug, PartialEq, Eq)]
pub enum Driver {
    Determinant,
    Integral,
}

impl std::fmt::Display for Driver {
    fn fmt(
        &self,
        f: &mut std::fmt::Formatter<'_>,
    ) -> std::fmt::Result {
        self.to_possible_value()
            .expect("no values are skipped")
            .get_name()
            .fmt(f)
    }
}

#[derive(ValueEnum, Copy, Clone, Debug, PartialEq, Eq)]
pub enum Format {
    Json,
    Yaml,
    Toml,
}

impl std::fmt::Display for Format {
    fn fmt(
        &self,
        f: &mut std::fmt::Formatter<'_>,
    ) -> std::fmt::Result {
        self.to_possible_value()
            .expect("no values are skipped")
            .get_name()
            .fmt(f)
    }
}
