mod db;
mod import;
mod models;
mod run;
mod ui;

use anyhow::{Context, Result};
use std::path::{Path, PathBuf};

fn main() -> Result<()> {
    let args: Vec<String> = std::env::args().collect();
    let data_dir = get_data_dir()?;
    init_logging(&data_dir, args.len() == 1)?;

    let db_path = get_db_path(&data_dir);
    log::debug!("Using database {}", db_path.display());
    let mut db = db::Database::open(&db_path)?;
    ensure_default_account(&db)?;

    match args.len() {
        1 => run::as_tui(&mut db),
        _ => run::as_cli(&args, &mut db),
    }
}

/// Logs go to stderr for the CLI. The TUI owns the terminal, so there they go
/// to `ledgerly.log` in the data directory instead.
fn init_logging(data_dir: &Path, tui: bool) -> Result<()> {
    let env = env_logger::Env::default().filter_or("LEDGERLY_LOG", "warn");
    let mut builder = env_logger::Builder::from_env(env);
    if tui {
        let log_path = data_dir.join("ledgerly.log");
        let file = std::fs::OpenOptions::new()
            .create(true)
            .append(true)
            .open(&log_path)
            .with_context(|| format!("Failed to open log file: {}", log_path.display()))?;
        builder.target(env_logger::Target::Pipe(Box::new(file)));
    }
    builder.init();
    Ok(())
}

fn ensure_default_account(db: &db::Database) -> Result<()> {
    if db.get_accounts()?.is_empty() {
        let account = models::Account::new("Default".into(), models::AccountType::Checking);
        db.insert_account(&account)?;
    }
    Ok(())
}

fn get_data_dir() -> Result<PathBuf> {
    let proj_dirs = directories::ProjectDirs::from("com", "ledgerly", "Ledgerly")
        .ok_or_else(|| anyhow::anyhow!("Could not determine data directory"))?;
    let data_dir = proj_dirs.data_dir();
    std::fs::create_dir_all(data_dir)
        .with_context(|| format!("Failed to create data directory: {}", data_dir.display()))?;
    Ok(data_dir.to_path_buf())
}

fn get_db_path(data_dir: &Path) -> PathBuf {
    match std::env::var_os("LEDGERLY_DB") {
        Some(path) if !path.is_empty() => PathBuf::from(path),
        _ => data_dir.join("ledgerly.db"),
    }
}
