// Only compile UI module when TUI feature is enabled
#[cfg(feature = "tui")]
mod ui;

use anyhow::Result;
use clap::Parser;
use std::io;
use tracing::info;

use console_bank::{AccountDirectory, Config, Shell};

fn main() -> Result<()> {
    let config = Config::parse();
    config.init_tracing()?;

    let directory = AccountDirectory::with_policy(config.number_policy());
    info!(
        version = console_bank::VERSION,
        policy = ?directory.policy(),
        "starting session"
    );

    let directory = if config.plain {
        run_plain(directory)?
    } else {
        run_ui_mode(directory)?
    };

    info!(
        accounts = directory.len(),
        total_balance = %directory.total_balance(),
        "session ended"
    );

    if config.dump_json {
        println!("{}", serde_json::to_string_pretty(&directory)?);
    }

    Ok(())
}

fn run_plain(directory: AccountDirectory) -> Result<AccountDirectory> {
    let stdin = io::stdin();
    let mut shell = Shell::new(stdin.lock(), io::stdout(), directory);
    shell.run()?;
    Ok(shell.into_directory())
}

#[cfg(feature = "tui")]
fn run_ui_mode(directory: AccountDirectory) -> Result<AccountDirectory> {
    let mut app = ui::App::new(directory);
    ui::run_ui(&mut app)?;
    Ok(app.into_directory())
}

#[cfg(not(feature = "tui"))]
fn run_ui_mode(directory: AccountDirectory) -> Result<AccountDirectory> {
    eprintln!("TUI mode not available, falling back to the text menu.");
    eprintln!("   Rebuild with: cargo build --features tui");
    run_plain(directory)
}
