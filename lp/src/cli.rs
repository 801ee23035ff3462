//! CLI argument definitions

use clap::Parser;
use std::path::PathBuf;
use tracing::debug;

const AFTER_HELP: &str = "Examples:
  lp \"Python programming\"
  lp \"machine learning\"
  lp \"Docker\" --verbose
  lp \"Redis\" --save
  lp                      # interactive prompt";

/// lp - generate a 1-week learning plan with a Generator and a Critic agent
#[derive(Debug, Parser)]
#[command(
    name = "lp",
    about = "Generate a 1-week learning plan for any topic using Claude",
    version = env!("GIT_DESCRIBE"),
    after_help = AFTER_HELP
)]
pub struct Cli {
    /// The topic you want to learn (wrap multi-word topics in quotes)
    pub topic: Option<String>,

    /// Save the refined plan to learning-plan-<topic>-<date>.md
    #[arg(short, long)]
    pub save: bool,

    /// Show the Generator's original plan and the Critic's feedback before the refined plan
    #[arg(short, long)]
    pub verbose: bool,

    /// Familiarity level (1 = Novice, 2 = A little familiar, 3 = Quite familiar); asked interactively if omitted
    #[arg(short, long, value_parser = clap::value_parser!(u8).range(1..=3))]
    pub familiarity: Option<u8>,

    /// Directory for saved plans (overrides plan.output-dir)
    #[arg(short, long)]
    pub output_dir: Option<PathBuf>,

    /// Path to config file
    #[arg(short, long)]
    pub config: Option<PathBuf>,

    /// Log level (TRACE, DEBUG, INFO, WARN, ERROR)
    #[arg(short = 'l', long = "log-level")]
    pub log_level: Option<String>,
}

/// Path of the log file written by the binary
pub fn get_log_path() -> PathBuf {
    debug!("get_log_path: called");
    dirs::data_local_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("learnplan")
        .join("logs")
        .join("learnplan.log")
}
