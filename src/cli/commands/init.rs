//! `sitetrack init` command - Initialize a new workspace

use console::style;
use miette::{IntoDiagnostic, Result};
use std::path::Path;

use crate::cli::GlobalOpts;
use crate::core::{Workspace, WorkspaceError};

#[derive(clap::Args, Debug)]
pub struct InitArgs {
    /// Directory to initialize (default: current directory)
    #[arg(default_value = ".")]
    pub path: std::path::PathBuf,

    /// Initialize even if .sitetrack/ already exists (stored data is kept)
    #[arg(long)]
    pub force: bool,
}

pub fn run(args: InitArgs, global: &GlobalOpts) -> Result<()> {
    let path = if args.path.as_os_str() == "." {
        std::env::current_dir().into_diagnostic()?
    } else {
        args.path.clone()
    };

    if !path.exists() {
        std::fs::create_dir_all(&path).into_diagnostic()?;
        if !global.quiet {
            println!(
                "{} Created directory {}",
                style("✓").green(),
                style(path.display()).cyan()
            );
        }
    }

    let workspace = if args.force {
        Workspace::init_force(&path)
    } else {
        Workspace::init(&path)
    };

    match workspace {
        Ok(workspace) => {
            if global.quiet {
                return Ok(());
            }
            println!(
                "{} Initialized sitetrack workspace at {}",
                style("✓").green(),
                style(workspace.root().display()).cyan()
            );
            println!();
            println!("Created workspace structure:");
            print_structure(workspace.root());
            println!();
            println!("Next steps:");
            println!(
                "  {} Create your first project",
                style("sitetrack project new \"Harbor Tower\" --budget 2500000 --end-date 2027-06-30").yellow()
            );
            println!(
                "  {} Load a material list",
                style("sitetrack import materials.csv").yellow()
            );
            println!(
                "  {} Review delayed orders",
                style("sitetrack dashboard").yellow()
            );
            Ok(())
        }
        Err(WorkspaceError::AlreadyExists(path)) => {
            println!(
                "{} sitetrack workspace already exists at {}",
                style("!").yellow(),
                style(path.display()).cyan()
            );
            println!();
            println!(
                "Use {} to reinitialize",
                style("sitetrack init --force").yellow()
            );
            Ok(())
        }
        Err(e) => Err(miette::miette!("{}", e)),
    }
}

fn print_structure(root: &Path) {
    let entries = [".sitetrack/", ".sitetrack/config.yaml", ".sitetrack/data/"];

    for entry in entries {
        let full_path = root.join(entry);
        if full_path.exists() {
            let prefix = if entry.ends_with('/') { "📁" } else { "📄" };
            println!("  {} {}", prefix, style(entry).dim());
        }
    }
}
