use clap::Parser;
use miette::Result;
use sitetrack::cli::{logging, Cli, Commands};

fn main() -> Result<()> {
    // Reset SIGPIPE to default behavior (terminate silently) for proper Unix piping.
    // Without this, piping to `head`, `grep -q`, etc. causes a panic on broken pipe.
    #[cfg(unix)]
    {
        unsafe {
            libc::signal(libc::SIGPIPE, libc::SIG_DFL);
        }
    }
    miette::set_hook(Box::new(|_| {
        Box::new(
            miette::MietteHandlerOpts::new()
                .terminal_links(true)
                .unicode(true)
                .context_lines(2)
                .tab_width(4)
                .build(),
        )
    }))?;

    let cli = Cli::parse();
    let global = cli.global;
    logging::init(global.verbose);

    match cli.command {
        Commands::Init(args) => sitetrack::cli::commands::init::run(args, &global),
        Commands::Project(cmd) => sitetrack::cli::commands::project::run(cmd, &global),
        Commands::Proc(cmd) => sitetrack::cli::commands::proc::run(cmd, &global),
        Commands::Sub(cmd) => sitetrack::cli::commands::sub::run(cmd, &global),
        Commands::Dashboard(args) => sitetrack::cli::commands::dashboard::run(args, &global),
        Commands::Import(args) => sitetrack::cli::commands::import::run(args, &global),
        Commands::Calc(args) => sitetrack::cli::commands::calc::run(args, &global),
        Commands::Completions(args) => sitetrack::cli::commands::completions::run(args),
    }
}
