use std::collections::HashMap;
use std::path::Path;
use std::sync::LazyLock;

use chrono::NaiveDate;

use super::app::{App, ImportStep, InputMode, PendingAction, Screen};
use crate::db::Database;
use crate::models::{Account, AccountType, Category, Payee};

pub(crate) struct Command {
    pub(crate) description: &'static str,
    pub(crate) run: fn(&str, &mut App, &mut Database) -> anyhow::Result<()>,
}

macro_rules! register_command {
    ($name:expr, $desc:expr, $func:expr, $registry:expr) => {{
        $registry.insert(
            $name,
            Command {
                description: $desc,
                run: $func,
            },
        );
    }};
}

pub(crate) static COMMANDS: LazyLock<HashMap<&str, Command>> = LazyLock::new(|| {
    let mut r: HashMap<&str, Command> = HashMap::new();

    register_command!("q", "Quit Ledgerly", cmd_quit, r);
    register_command!("quit", "Quit Ledgerly", cmd_quit, r);
    register_command!("i", "Import a CSV (e.g. :i ~/extrato.csv)", cmd_import, r);
    register_command!("import", "Import a CSV (e.g. :i ~/extrato.csv)", cmd_import, r);
    register_command!(
        "r",
        "Review a window (e.g. :review 2024-03-01 2024-03-31)",
        cmd_review,
        r
    );
    register_command!(
        "review",
        "Review a window (e.g. :review 2024-03-01 2024-03-31)",
        cmd_review,
        r
    );
    register_command!("help", "Show available commands", cmd_help, r);
    register_command!("h", "Show available commands", cmd_help, r);
    register_command!("profile", "Apply a saved profile (e.g. :profile itau)", cmd_profile, r);
    register_command!(
        "save-profile",
        "Save current mapping and format (e.g. :save-profile itau)",
        cmd_save_profile,
        r
    );
    register_command!(
        "delete-profile",
        "Delete a saved profile",
        cmd_delete_profile,
        r
    );
    register_command!(
        "account",
        "Create account (e.g. :account Nubank credit)",
        cmd_account,
        r
    );
    register_command!(
        "category",
        "Create category (e.g. :category Pets)",
        cmd_category,
        r
    );
    register_command!("payee", "Create payee (e.g. :payee Padaria Central)", cmd_payee, r);
    register_command!(
        "export",
        "Export the review window to CSV (e.g. :export ~/march.csv)",
        cmd_export,
        r
    );

    r
});

pub(crate) fn handle_command(input: &str, app: &mut App, db: &mut Database) -> anyhow::Result<()> {
    let trimmed = input.trim();
    let mut parts = trimmed.splitn(2, ' ');
    let cmd_name = parts.next().unwrap_or("");
    let args = parts.next().unwrap_or("").trim();

    if let Some(cmd) = COMMANDS.get(cmd_name) {
        (cmd.run)(args, app, db)?;
    } else {
        let suggestion = find_closest(cmd_name);
        app.set_status(format!(
            "Unknown command: :{cmd_name}. Did you mean :{suggestion}?"
        ));
    }

    Ok(())
}

fn find_closest(input: &str) -> String {
    COMMANDS
        .keys()
        .filter(|k| k.len() > 1)
        .min_by_key(|k| (levenshtein(input, k), **k))
        .unwrap_or(&"help")
        .to_string()
}

fn levenshtein(a: &str, b: &str) -> usize {
    let (a, b) = (a.as_bytes(), b.as_bytes());
    let mut prev: Vec<usize> = (0..=b.len()).collect();
    let mut curr = vec![0; b.len() + 1];

    for i in 1..=a.len() {
        curr[0] = i;
        for j in 1..=b.len() {
            let cost = if a[i - 1] == b[j - 1] { 0 } else { 1 };
            curr[j] = (prev[j] + 1).min(curr[j - 1] + 1).min(prev[j - 1] + cost);
        }
        std::mem::swap(&mut prev, &mut curr);
    }

    prev[b.len()]
}

// ── Command implementations ──────────────────────────────────

fn cmd_quit(_args: &str, app: &mut App, _db: &mut Database) -> anyhow::Result<()> {
    app.running = false;
    Ok(())
}

fn cmd_help(_args: &str, app: &mut App, _db: &mut Database) -> anyhow::Result<()> {
    app.show_help = true;
    Ok(())
}

fn cmd_import(args: &str, app: &mut App, _db: &mut Database) -> anyhow::Result<()> {
    app.screen = Screen::Import;
    if args.is_empty() {
        app.reset_import();
        return Ok(());
    }
    let path = crate::run::shellexpand(args);
    if let Err(e) = app.load_import_file(Path::new(&path)) {
        app.set_status(format!("Error loading file: {e:#}"));
    }
    Ok(())
}

fn cmd_review(args: &str, app: &mut App, db: &mut Database) -> anyhow::Result<()> {
    app.screen = Screen::Review;
    if !args.is_empty() {
        let dates: Vec<&str> = args.split_whitespace().collect();
        let parsed: Option<Vec<NaiveDate>> = dates
            .iter()
            .map(|d| NaiveDate::parse_from_str(d, "%Y-%m-%d").ok())
            .collect();
        match parsed.as_deref() {
            Some([from, to]) if from <= to => {
                app.review_from = Some(*from);
                app.review_to = Some(*to);
                app.review_index = 0;
                app.review_scroll = 0;
            }
            _ => {
                app.set_status("Usage: :review <YYYY-MM-DD> <YYYY-MM-DD>");
                return Ok(());
            }
        }
    }
    app.refresh_review(db)?;
    Ok(())
}

fn cmd_profile(args: &str, app: &mut App, _db: &mut Database) -> anyhow::Result<()> {
    if app.import_step != ImportStep::Configure {
        app.set_status("Open a file first, then apply a profile");
        return Ok(());
    }
    if args.is_empty() {
        let names: Vec<&str> = app.profiles.iter().map(|p| p.name.as_str()).collect();
        app.set_status(format!("Profiles: {}", names.join(", ")));
        return Ok(());
    }
    match app.profiles.iter().find(|p| p.name == args).cloned() {
        Some(profile) => {
            app.apply_profile(&profile);
            app.set_status(format!("Applied profile '{args}'"));
        }
        None => app.set_status(format!("Profile '{args}' not found")),
    }
    Ok(())
}

fn cmd_save_profile(args: &str, app: &mut App, db: &mut Database) -> anyhow::Result<()> {
    if args.is_empty() {
        app.set_status("Usage: :save-profile <name>");
        return Ok(());
    }
    if app.import_step == ImportStep::SelectFile {
        app.set_status("Open a file first, then save its settings");
        return Ok(());
    }
    db.save_profile(&app.current_profile(args))?;
    app.refresh_reference_data(db)?;
    app.set_status(format!("Saved profile '{args}'"));
    Ok(())
}

fn cmd_delete_profile(args: &str, app: &mut App, _db: &mut Database) -> anyhow::Result<()> {
    if !app.profiles.iter().any(|p| p.name == args) {
        app.set_status(format!("Profile '{args}' not found"));
        return Ok(());
    }
    app.confirm_message = format!("Delete profile '{args}'?");
    app.pending_action = Some(PendingAction::DeleteProfile {
        name: args.to_string(),
    });
    app.input_mode = InputMode::Confirm;
    Ok(())
}

fn cmd_account(args: &str, app: &mut App, db: &mut Database) -> anyhow::Result<()> {
    if args.is_empty() {
        let types: Vec<&str> = AccountType::all().iter().map(|t| t.as_str()).collect();
        app.set_status(format!(
            "Usage: :account <name> [type]. Types: {}",
            types.join(", ")
        ));
        return Ok(());
    }

    let (name, account_type) = match args.rsplit_once(' ') {
        Some((name, last)) if AccountType::parse(last) != AccountType::Other => {
            (name.trim().to_string(), AccountType::parse(last))
        }
        _ => (args.to_string(), AccountType::Checking),
    };

    db.insert_account(&Account::new(name.clone(), account_type))?;
    refresh_after_entity_change(app, db)?;
    app.set_status(format!("Created account: {name}"));
    Ok(())
}

fn cmd_category(args: &str, app: &mut App, db: &mut Database) -> anyhow::Result<()> {
    if args.is_empty() {
        app.set_status("Usage: :category <name>");
        return Ok(());
    }
    db.insert_category(&Category::new(args.to_string()))?;
    refresh_after_entity_change(app, db)?;
    app.set_status(format!("Created category: {args}"));
    Ok(())
}

fn cmd_payee(args: &str, app: &mut App, db: &mut Database) -> anyhow::Result<()> {
    if args.is_empty() {
        app.set_status("Usage: :payee <name>");
        return Ok(());
    }
    db.insert_payee(&Payee::new(args.to_string()))?;
    refresh_after_entity_change(app, db)?;
    app.set_status(format!("Created payee: {args}"));
    Ok(())
}

/// New names can change how a loaded statement resolves.
fn refresh_after_entity_change(app: &mut App, db: &Database) -> anyhow::Result<()> {
    app.refresh_reference_data(db)?;
    if app.import_step == ImportStep::Configure {
        app.rebuild_preview();
    }
    Ok(())
}

fn cmd_export(args: &str, app: &mut App, db: &mut Database) -> anyhow::Result<()> {
    let (Some(from), Some(to)) = (app.review_from, app.review_to) else {
        app.set_status("Nothing to export. Import a file or set :review <from> <to>");
        return Ok(());
    };
    let path = if args.is_empty() {
        let home = std::env::var("HOME").unwrap_or_else(|_| ".".into());
        format!("{home}/ledgerly-export-{from}-{to}.csv")
    } else {
        crate::run::shellexpand(args)
    };

    let count = db.export_window_to_csv(Path::new(&path), from, to, app.review_account)?;
    if count == 0 {
        app.set_status("No transactions to export");
    } else {
        app.set_status(format!("Exported {count} transactions to {path}"));
    }
    Ok(())
}

#[cfg(test)]
#[path = "commands_tests.rs"]
mod tests;
