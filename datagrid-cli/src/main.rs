//! datagrid command-line front end

mod args;
mod error;
mod render;

use std::fs::File;
use std::path::Path;
use std::process::ExitCode;

use clap::Parser;
use datagrid_lib::Grid;
use datagrid_lib::grid::GridAction;
use datagrid_lib::grid::PaginationMode;
use simplelog::ColorChoice;
use simplelog::Config;
use simplelog::LevelFilter;
use simplelog::TermLogger;
use simplelog::TerminalMode;
use simplelog::WriteLogger;

use crate::args::Args;
use crate::error::CliError;

#[tokio::main]
async fn main() -> ExitCode {
    let args = Args::parse();

    if let Err(e) = init_logging(args.verbose, args.log_file.as_deref()) {
        eprintln!("Error: {}", e);
        return ExitCode::FAILURE;
    }

    match run(args).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            log::error!("{}", e);
            eprintln!("Error: {}", e);
            ExitCode::FAILURE
        }
    }
}

fn init_logging(verbose: u8, log_file: Option<&Path>) -> Result<(), CliError> {
    let level = match verbose {
        0 => LevelFilter::Warn,
        1 => LevelFilter::Info,
        2 => LevelFilter::Debug,
        _ => LevelFilter::Trace,
    };

    match log_file {
        Some(path) => WriteLogger::init(level, Config::default(), File::create(path)?)?,
        None => TermLogger::init(level, Config::default(), TerminalMode::Stderr, ColorChoice::Auto)?,
    }
    Ok(())
}

async fn run(args: Args) -> Result<(), CliError> {
    let config = args.grid_config()?;
    let mut grid = Grid::new(config)?;
    let server = grid.mode() == PaginationMode::ServerCursor;

    // Queue every query change, then fetch once.
    let mut needs_load = server;
    for action in args.query_actions() {
        needs_load |= grid.dispatch(action).needs_load();
    }
    if needs_load {
        grid.load().await;
    }
    check(&grid)?;

    if let Some(page) = args.page {
        grid.apply(GridAction::GoToPage(page)).await;
    }
    for _ in 0..args.next {
        if !grid.pagination().has_next {
            log::info!("No more pages after page {}", grid.state().current_page);
            break;
        }
        grid.apply(GridAction::NavigateNext).await;
        check(&grid)?;
    }

    let stdout = std::io::stdout();
    render::render(&grid, &mut stdout.lock())?;
    Ok(())
}

fn check(grid: &Grid) -> Result<(), CliError> {
    match grid.error() {
        Some(message) => Err(CliError::Load(message.to_string())),
        None => Ok(()),
    }
}
