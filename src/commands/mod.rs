pub mod fit;
pub mod infer;
pub mod inspect;
pub mod shared;

use crate::cli::{Cli, Command};
use anyhow::Result;

pub fn run(cli: Cli) -> Result<()> {
    match cli.command {
        Command::Fit(args) => fit::run(args),
        Command::FitSeeded(args) => fit::run_seeded(args),
        Command::Terms(args) => inspect::terms(args),
        Command::Topics(args) => inspect::topics(args),
        Command::Summary(args) => inspect::summary(args),
        Command::Infer(args) => infer::run(args),
    }
}
