use std::io::{self, IsTerminal};

use anyhow::{Context, Result};
use chrono::Utc;
use clap::Parser;
use tracing_subscriber::EnvFilter;

use ct_cli::commands::pause::Transition;
use ct_cli::commands::{
    add, auth, copy, delete, edit, list, pause, profile, show, stats, theme, watch,
};
use ct_cli::{AppContext, Cli, Commands, Config};

/// Load config and open the database and client state.
fn open_context(cli: &Cli) -> Result<AppContext> {
    let config = Config::load_from(cli.config.as_deref()).context("failed to load configuration")?;
    tracing::debug!(?config, "loaded configuration");
    Ok(AppContext::open(config)?.with_terminal_colors())
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    // Initialize tracing with verbose flag support
    let filter = if cli.verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::from_default_env()
    };
    // Use try_init to avoid panic if tracing is already initialized (e.g., in tests)
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .try_init();

    let Some(command) = &cli.command else {
        // No subcommand, show help
        use clap::CommandFactory;
        Cli::command().print_help()?;
        println!();
        return Ok(());
    };

    let mut ctx = open_context(&cli)?;
    let stdout = io::stdout();
    let mut out = stdout.lock();
    let stdin = io::stdin();
    let mut input = stdin.lock();
    let now = Utc::now();

    match command {
        Commands::Signup(args) => auth::signup(&mut out, &mut input, &mut ctx, args, now)?,
        Commands::Login(args) => auth::login(&mut out, &mut input, &mut ctx, args, now)?,
        Commands::Logout => auth::logout(&mut out, &mut ctx)?,
        Commands::Profile(args) => profile::run(&mut out, &mut ctx, args)?,
        Commands::Add(args) => add::run(&mut out, &mut ctx, args, now)?,
        Commands::Edit(args) => edit::run(&mut out, &mut ctx, args, now)?,
        Commands::Copy(args) => copy::run(&mut out, &mut ctx, args, now)?,
        Commands::Delete(args) => delete::run(&mut out, &mut input, &mut ctx, args)?,
        Commands::Pause(args) => pause::run(&mut out, &mut ctx, args, Transition::Pause, now)?,
        Commands::Resume(args) => pause::run(&mut out, &mut ctx, args, Transition::Resume, now)?,
        Commands::Toggle(args) => pause::run(&mut out, &mut ctx, args, Transition::Toggle, now)?,
        Commands::List(args) => list::run(&mut out, &ctx, args, now)?,
        Commands::Show(args) => show::run(&mut out, &ctx, args, now)?,
        Commands::Stats(args) => stats::run(&mut out, &ctx, args, now)?,
        Commands::Watch(args) => {
            let interactive = io::stdout().is_terminal();
            watch::run(&mut out, &mut ctx, args, interactive)?;
        }
        Commands::Theme(args) => theme::run(&mut out, &mut ctx, args)?,
    }

    Ok(())
}
