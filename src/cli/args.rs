//! CLI argument definitions using clap derive

use clap::{Parser, Subcommand, ValueEnum};
use std::path::PathBuf;

use crate::cli::commands::{
    calc::CalcArgs, completions::CompletionsArgs, dashboard::DashboardArgs, import::ImportArgs,
    init::InitArgs, proc::ProcCommands, project::ProjectCommands, sub::SubCommands,
};

#[derive(Parser)]
#[command(name = "sitetrack")]
#[command(author, version, about = "Construction project tracking")]
#[command(long_about = "Track construction projects, procurement logs and submittal logs, and flag materials ordered too late to arrive on site.")]
#[command(propagate_version = true)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    #[command(flatten)]
    pub global: GlobalOpts,
}

#[derive(clap::Args, Clone, Debug)]
pub struct GlobalOpts {
    /// Output format
    #[arg(long, short = 'f', global = true, default_value = "auto")]
    pub format: OutputFormat,

    /// Suppress non-essential output
    #[arg(long, short = 'q', global = true)]
    pub quiet: bool,

    /// Enable verbose output (debug logging on stderr)
    #[arg(long, short = 'v', global = true)]
    pub verbose: bool,

    /// Workspace root (default: auto-detect by finding .sitetrack/)
    #[arg(long, global = true)]
    pub workspace: Option<PathBuf>,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Initialize a new sitetrack workspace
    Init(InitArgs),

    /// Project management (team, documents, active project)
    #[command(subcommand)]
    Project(ProjectCommands),

    /// Procurement log (lead times, drop-dead dates, delivery status)
    #[command(subcommand)]
    Proc(ProcCommands),

    /// Submittal log (design review workflow)
    #[command(subcommand)]
    Sub(SubCommands),

    /// Show the project dashboard
    Dashboard(DashboardArgs),

    /// Import a material list CSV into the procurement and submittal logs
    Import(ImportArgs),

    /// Date-risk calculator
    Calc(CalcArgs),

    /// Generate shell completions
    Completions(CompletionsArgs),
}

#[derive(ValueEnum, Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum OutputFormat {
    /// Automatically detect based on context (text for show, tsv for list)
    #[default]
    Auto,
    /// YAML format (full fidelity)
    Yaml,
    /// Tab-separated values (for piping)
    Tsv,
    /// JSON format (for programming)
    Json,
    /// CSV format (for spreadsheets)
    Csv,
    /// Markdown tables
    Md,
    /// Just IDs, one per line
    Id,
}
