use clap::Subcommand;

use super::rank::RankArgs;
use super::run::RunArgs;

#[derive(Subcommand, Clone)]
pub enum Commands {
    /// Run the navigation core against a recorded site
    Run(RunArgs),

    /// Rank a page's links against a goal
    Rank(RankArgs),
}
