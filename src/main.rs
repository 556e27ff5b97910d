mod cli;
mod config;
mod db;
mod error;
mod guidance;
mod http;
mod location;
mod logging;
mod models;
mod prayer_times;
mod qibla;
mod session;
mod tui;
mod utils;

#[cfg(test)]
mod testing;

use anyhow::{Context, Result};
use clap::Parser;
use rusqlite::Connection;

use cli::args::{Cli, Commands};
use cli::handlers::{self, SettingsUpdate};
use config::AppConfig;
use db::migrations::run_migrations;
use session::Session;

fn main() -> Result<()> {
    let cli = Cli::parse();
    let config = AppConfig::load().context("Loading config")?;

    // Ensure data directory exists and open DB
    AppConfig::ensure_data_dir()?;
    if cli.command.is_none() {
        logging::init_to_file(&AppConfig::log_path()?)?;
    } else {
        logging::init();
    }

    let db_path = AppConfig::db_path()?;
    let conn = Connection::open(&db_path)
        .with_context(|| format!("Opening database at {:?}", db_path))?;
    conn.execute_batch("PRAGMA journal_mode=WAL;")?;
    run_migrations(&conn)?;

    let mut session = Session::open(conn)?;
    let rt = tokio::runtime::Runtime::new().context("Starting async runtime")?;

    match cli.command {
        Some(Commands::Times) => {
            handlers::handle_times(&rt, &mut session, &config)?;
        }
        Some(Commands::Mark { prayer, date }) => {
            handlers::handle_mark(&mut session, &prayer, date.as_deref())?;
        }
        Some(Commands::History { days }) => {
            handlers::handle_history(&session, days)?;
        }
        Some(Commands::Qibla { heading }) => {
            handlers::handle_qibla(&rt, &mut session, &config, heading)?;
        }
        Some(Commands::Guide) => {
            handlers::handle_guide(&rt, &mut session, &config)?;
        }
        Some(Commands::Settings {
            name,
            method,
            school,
            notifications,
            reset,
        }) => {
            handlers::handle_settings(
                &mut session,
                SettingsUpdate {
                    name: name.as_deref(),
                    method,
                    school: school.as_deref(),
                    notifications: notifications.as_deref(),
                    reset,
                },
            )?;
        }
        Some(Commands::Methods) => {
            handlers::handle_methods(&session)?;
        }
        Some(Commands::Config { init }) => {
            handlers::handle_config(&config, init)?;
        }

        // No subcommand → launch TUI
        None => {
            tui::app::run(session, config, rt.handle().clone())?;
        }
    }

    Ok(())
}
