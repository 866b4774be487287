use anyhow::{Context, Result};
use chrono::NaiveDate;
use std::path::Path;

use crate::db::Database;
use crate::import::{
    self, AmountStyle, ColumnMapping, DateOrder, DelimiterMode, Field, FormatConfig,
    ImportProfile, Lookups, NormalizedBatch, ParsedFile, TypeRule,
};
use crate::models::{Account, AccountType, Category, Payee, Transaction};
use crate::ui::util::{format_amount, truncate};

pub(crate) fn as_cli(args: &[String], db: &mut Database) -> Result<()> {
    match args[1].as_str() {
        "import" | "i" => cli_import(&args[2..], db, false),
        "preview" | "p" => cli_import(&args[2..], db, true),
        "review" | "r" => cli_review(&args[2..], db),
        "export" => cli_export(&args[2..], db),
        "accounts" => cli_accounts(db),
        "account" => cli_account(&args[2..], db),
        "categories" => cli_categories(db),
        "category" => cli_category(&args[2..], db),
        "payees" => cli_payees(db),
        "payee" => cli_payee(&args[2..], db),
        "profiles" => cli_profiles(db),
        "profile" => cli_profile(&args[2..], db),
        "--help" | "-h" | "help" => {
            print_usage();
            Ok(())
        }
        "--version" | "-V" | "version" => {
            println!("ledgerly {}", env!("CARGO_PKG_VERSION"));
            Ok(())
        }
        other => {
            print_usage();
            anyhow::bail!("Unknown command: {other}");
        }
    }
}

fn print_usage() {
    println!("Ledgerly - local personal finance ledger");
    println!();
    println!("Usage: ledgerly [command]");
    println!();
    println!("Commands:");
    println!("  (none)                        Launch interactive TUI");
    println!("  import <file.csv>             Import a CSV statement");
    println!("    --map <field>=<header>      Map a column (repeatable; empty header unmaps)");
    println!("    --delimiter <mode>          auto | comma | semicolon");
    println!("    --date-order <order>        Y-M-D | D-M-Y | M-D-Y");
    println!("    --amount-style <style>      auto | comma-decimal | dot-decimal");
    println!("    --type-rule <rule>          by-sign | force-income | force-expense");
    println!("    --account <name|id>         Default account for rows without one");
    println!("    --profile <name>            Start from a saved profile");
    println!("    --save-profile <name>       Save the final settings as a profile");
    println!("    --dry-run                   Show what would be imported, write nothing");
    println!("  preview <file.csv> [flags]    Same as import --dry-run");
    println!("  review --from <date> --to <date> [--account <name|id>]");
    println!("                                List transactions in a date window");
    println!("  export <path> --from <date> --to <date> [--account <name|id>]");
    println!("                                Export a date window to CSV");
    println!("  accounts                      List accounts");
    println!("  account add <name> [type]     Create an account");
    println!("  categories                    List categories");
    println!("  category add <name>           Create a category");
    println!("  payees                        List payees");
    println!("  payee add <name>              Create a payee");
    println!("  profiles                      List saved import profiles");
    println!("  profile delete <name>         Delete an import profile");
    println!("  --help, -h                    Show this help");
    println!("  --version, -V                 Show version");
    println!();
    println!("Fields: {}", field_keys());
    println!("Logging: set LEDGERLY_LOG (e.g. LEDGERLY_LOG=debug). Database: LEDGERLY_DB.");
}

fn field_keys() -> String {
    Field::all()
        .iter()
        .map(|f| f.key())
        .collect::<Vec<_>>()
        .join(", ")
}

// ── Import ───────────────────────────────────────────────────

/// Flags accepted by `import` and `preview`.
#[derive(Debug, Default, PartialEq)]
struct ImportArgs {
    file: String,
    maps: Vec<(Field, String)>,
    delimiter: Option<DelimiterMode>,
    date_order: Option<DateOrder>,
    amount_style: Option<AmountStyle>,
    type_rule: Option<TypeRule>,
    account: Option<String>,
    profile: Option<String>,
    save_profile: Option<String>,
    dry_run: bool,
}

fn parse_choice<T: Copy + std::fmt::Display>(
    flag: &str,
    value: &str,
    parse: fn(&str) -> Option<T>,
    all: &[T],
) -> Result<T> {
    parse(value).ok_or_else(|| {
        let choices: Vec<String> = all.iter().map(|c| c.to_string()).collect();
        anyhow::anyhow!(
            "Invalid {flag} '{value}'. Expected one of: {}",
            choices.join(", ")
        )
    })
}

fn parse_map(value: &str) -> Result<(Field, String)> {
    let (key, header) = value
        .split_once('=')
        .ok_or_else(|| anyhow::anyhow!("Invalid --map '{value}'. Use <field>=<header>"))?;
    let field = Field::parse(key).ok_or_else(|| {
        anyhow::anyhow!("Unknown field '{key}'. Fields: {}", field_keys())
    })?;
    Ok((field, header.trim().to_string()))
}

fn parse_import_args(args: &[String]) -> Result<ImportArgs> {
    let mut parsed = ImportArgs::default();
    let mut file = None;
    let mut iter = args.iter();

    while let Some(arg) = iter.next() {
        let mut value = |flag: &str| {
            iter.next()
                .cloned()
                .ok_or_else(|| anyhow::anyhow!("{flag} needs a value"))
        };
        match arg.as_str() {
            "--map" | "-m" => parsed.maps.push(parse_map(&value("--map")?)?),
            "--delimiter" => {
                parsed.delimiter = Some(parse_choice(
                    "--delimiter",
                    &value("--delimiter")?,
                    DelimiterMode::parse,
                    DelimiterMode::all(),
                )?);
            }
            "--date-order" => {
                parsed.date_order = Some(parse_choice(
                    "--date-order",
                    &value("--date-order")?,
                    DateOrder::parse,
                    DateOrder::all(),
                )?);
            }
            "--amount-style" => {
                parsed.amount_style = Some(parse_choice(
                    "--amount-style",
                    &value("--amount-style")?,
                    AmountStyle::parse,
                    AmountStyle::all(),
                )?);
            }
            "--type-rule" => {
                parsed.type_rule = Some(parse_choice(
                    "--type-rule",
                    &value("--type-rule")?,
                    TypeRule::parse,
                    TypeRule::all(),
                )?);
            }
            "--account" | "-a" => parsed.account = Some(value("--account")?),
            "--profile" => parsed.profile = Some(value("--profile")?),
            "--save-profile" => parsed.save_profile = Some(value("--save-profile")?),
            "--dry-run" | "-n" => parsed.dry_run = true,
            flag if flag.starts_with('-') => anyhow::bail!("Unknown flag: {flag}"),
            path => {
                if file.replace(path.to_string()).is_some() {
                    anyhow::bail!("Only one file can be imported at a time");
                }
            }
        }
    }

    parsed.file = file.ok_or_else(|| {
        anyhow::anyhow!("Usage: ledgerly import <file.csv> [--map field=Header ...]")
    })?;
    Ok(parsed)
}

/// Combine a saved profile (or guesses from the file) with command-line overrides.
fn resolve_settings(
    args: &ImportArgs,
    file: &ParsedFile,
    profile: Option<&ImportProfile>,
    lookups: &Lookups,
) -> Result<(ColumnMapping, FormatConfig)> {
    let (mut mapping, mut config) = match profile {
        Some(p) => (p.mapping.clone(), p.config.clone()),
        None => {
            let mapping = import::suggest_mapping(&file.headers);
            let date_order =
                import::suggest_date_order(file.column_values(&mapping, Field::Date))
                    .unwrap_or_default();
            let config = FormatConfig {
                date_order,
                ..FormatConfig::default()
            };
            (mapping, config)
        }
    };

    for (field, header) in &args.maps {
        mapping.set(*field, header.clone());
    }
    if let Some(d) = args.delimiter {
        config.delimiter = d;
    }
    if let Some(o) = args.date_order {
        config.date_order = o;
    }
    if let Some(s) = args.amount_style {
        config.amount_style = s;
    }
    if let Some(r) = args.type_rule {
        config.type_rule = r;
    }
    if let Some(ref name) = args.account {
        let id = lookups
            .accounts
            .resolve_ref(name)
            .ok_or_else(|| anyhow::anyhow!("Account '{name}' not found"))?;
        config.default_account_id = Some(id);
    }

    if !mapping.is_mapped(Field::Date) {
        anyhow::bail!(
            "No date column found in [{}]. Use --map date=<header>",
            file.headers.join(", ")
        );
    }
    Ok((mapping, config))
}

fn cli_import(args: &[String], db: &mut Database, preview_only: bool) -> Result<()> {
    let args = parse_import_args(args)?;
    let dry_run = preview_only || args.dry_run;

    let path_str = shellexpand(&args.file);
    let path = Path::new(&path_str);
    if !path.exists() {
        anyhow::bail!("File not found: {path_str}");
    }

    let profile = match args.profile {
        Some(ref name) => Some(
            db.get_profile(name)?
                .ok_or_else(|| anyhow::anyhow!("Profile '{name}' not found"))?,
        ),
        None => None,
    };

    let text = import::read_statement(path)?;
    let delimiter = args
        .delimiter
        .or(profile.as_ref().map(|p| p.config.delimiter))
        .unwrap_or_default();
    let file = import::parse_text(&text, delimiter);
    if file.headers.is_empty() {
        anyhow::bail!("{path_str} is empty");
    }

    let lookups = db.lookups()?;
    let (mapping, mut config) = resolve_settings(&args, &file, profile.as_ref(), &lookups)?;

    if config.default_account_id.is_none() && !mapping.is_mapped(Field::AccountId) {
        let accounts = db.get_accounts()?;
        if let [only] = accounts.as_slice() {
            config.default_account_id = only.id;
        } else {
            let names: Vec<String> = accounts
                .iter()
                .map(|a| format!("  --account \"{}\"  ({})", a.name, a.account_type))
                .collect();
            anyhow::bail!(
                "No account column mapped and several accounts exist. Use --account <name>:\n{}",
                names.join("\n")
            );
        }
    }

    print_settings(&file, &mapping, &config, &lookups);

    if let Some(ref name) = args.save_profile {
        db.save_profile(&ImportProfile {
            name: name.clone(),
            mapping: mapping.clone(),
            config: config.clone(),
        })?;
        println!("Saved profile '{name}'");
    }

    if dry_run {
        let batch = import::normalize(&file, &mapping, &config, &lookups);
        print_batch(&batch, &lookups);
        println!();
        println!("Dry run: nothing was written");
        return Ok(());
    }

    let result = import::run_import(&text, &mapping, &config, &lookups, db)?;
    println!(
        "Imported {} transactions ({} skipped, {} dropped)",
        result.inserted, result.skipped, result.dropped
    );
    log::debug!("Ledger now holds {} transactions", db.get_transaction_count()?);

    if let (Some(from), Some(to)) = (result.min_date, result.max_date) {
        let account = if mapping.is_mapped(Field::AccountId) {
            None
        } else {
            config.default_account_id
        };
        let txns = db.get_transactions_in_window(from, to, account)?;
        println!();
        println!("Review {from} .. {to}");
        print_transactions(&txns, &lookups);
    }
    Ok(())
}

fn print_settings(file: &ParsedFile, mapping: &ColumnMapping, config: &FormatConfig, lookups: &Lookups) {
    println!(
        "Delimiter: {:?}  Columns: {}",
        file.delimiter,
        file.headers.join(", ")
    );
    let mapped: Vec<String> = mapping
        .iter()
        .map(|(field, header)| format!("{} <- {header}", field.key()))
        .collect();
    if mapping.is_empty() {
        println!("Mapping: no columns recognised");
    } else {
        println!("Mapping: {}", mapped.join(", "));
    }
    let account = config
        .default_account_id
        .map(|id| lookups.accounts.name_of(id).unwrap_or("?").to_string())
        .unwrap_or_else(|| "none".into());
    println!(
        "Format: dates {}, amounts {}, type rule {}, default account {account}",
        config.date_order, config.amount_style, config.type_rule
    );
    println!("{} data rows", file.rows.len());
}

fn print_batch(batch: &NormalizedBatch, lookups: &Lookups) {
    println!();
    println!(
        "{:<12} {:<8} {:>14} {:<16} Description",
        "Date", "Type", "Amount", "Account"
    );
    println!("{}", "─".repeat(72));
    for txn in &batch.transactions {
        let account = txn
            .account_id
            .map(|id| lookups.accounts.name_of(id).unwrap_or("?").to_string())
            .unwrap_or_else(|| "-".into());
        println!(
            "{:<12} {:<8} {:>14} {:<16} {}",
            txn.date.to_string(),
            txn.txn_type.as_str(),
            format_amount(txn.amount),
            truncate(&account, 16),
            truncate(&txn.description, 40),
        );
    }
    for t in &batch.transfers {
        println!(
            "{:<12} {:<8} {:>14} {:<16} {}",
            t.date.to_string(),
            "TRANSFER",
            format_amount(t.amount),
            truncate(&format!("{} -> {}", t.from_account_ref, t.to_account_ref), 16),
            truncate(&t.description, 40),
        );
    }
    println!();
    println!(
        "{} transactions, {} transfers, {} rows dropped",
        batch.transactions.len(),
        batch.transfers.len(),
        batch.dropped
    );
    if let (Some(from), Some(to)) = (batch.min_date, batch.max_date) {
        println!("Window: {from} .. {to}");
    }
}

fn print_transactions(txns: &[Transaction], lookups: &Lookups) {
    if txns.is_empty() {
        println!("No transactions");
        return;
    }
    println!(
        "{:<12} {:<16} {:<8} {:>14} {:<16} Description",
        "Date", "Account", "Type", "Amount", "Category"
    );
    println!("{}", "─".repeat(88));
    for txn in txns {
        let account = lookups.accounts.name_of(txn.account_id).unwrap_or("?");
        let category = txn
            .category_id
            .and_then(|id| lookups.categories.name_of(id))
            .unwrap_or("");
        let marker = if txn.is_transfer() { " ⇄" } else { "" };
        println!(
            "{:<12} {:<16} {:<8} {:>14} {:<16} {}{marker}",
            txn.date,
            truncate(account, 16),
            txn.txn_type.as_str(),
            format_amount(txn.signed_amount()),
            truncate(category, 16),
            truncate(&txn.description, 40),
        );
    }
}

// ── Review & export ──────────────────────────────────────────

fn flag_value<'a>(args: &'a [String], flag: &str) -> Option<&'a str> {
    args.windows(2)
        .find(|w| w[0] == flag)
        .map(|w| w[1].as_str())
}

fn parse_date_flag(args: &[String], flag: &str) -> Result<NaiveDate> {
    let raw = flag_value(args, flag).ok_or_else(|| anyhow::anyhow!("Missing {flag} <YYYY-MM-DD>"))?;
    NaiveDate::parse_from_str(raw, "%Y-%m-%d")
        .with_context(|| format!("Invalid {flag} date '{raw}'. Use YYYY-MM-DD"))
}

/// Parse `--from`, `--to` and the optional `--account` of a window command.
fn parse_window(args: &[String], lookups: &Lookups) -> Result<(NaiveDate, NaiveDate, Option<i64>)> {
    let from = parse_date_flag(args, "--from")?;
    let to = parse_date_flag(args, "--to")?;
    if from > to {
        anyhow::bail!("--from {from} is after --to {to}");
    }
    let account = match flag_value(args, "--account") {
        Some(name) => Some(
            lookups
                .accounts
                .resolve_ref(name)
                .ok_or_else(|| anyhow::anyhow!("Account '{name}' not found"))?,
        ),
        None => None,
    };
    Ok((from, to, account))
}

fn cli_review(args: &[String], db: &mut Database) -> Result<()> {
    let lookups = db.lookups()?;
    let (from, to, account) = parse_window(args, &lookups)?;
    let txns = db.get_transactions_in_window(from, to, account)?;
    let scope = match account {
        Some(id) => db
            .get_account_by_id(id)?
            .map(|a| a.name)
            .unwrap_or_else(|| format!("account {id}")),
        None => "all accounts".into(),
    };
    println!("Review {from} .. {to} ({scope})");
    print_transactions(&txns, &lookups);
    Ok(())
}

fn cli_export(args: &[String], db: &mut Database) -> Result<()> {
    let output_path = args
        .first()
        .filter(|a| !a.starts_with('-'))
        .map(|a| shellexpand(a))
        .ok_or_else(|| {
            anyhow::anyhow!("Usage: ledgerly export <path> --from <date> --to <date>")
        })?;
    let lookups = db.lookups()?;
    let (from, to, account) = parse_window(&args[1..], &lookups)?;

    let count = db.export_window_to_csv(Path::new(&output_path), from, to, account)?;
    if count == 0 {
        println!("No transactions between {from} and {to}");
    } else {
        println!("Exported {count} transactions to {output_path}");
    }
    Ok(())
}

// ── Entities ─────────────────────────────────────────────────

fn cli_accounts(db: &mut Database) -> Result<()> {
    let accounts = db.get_accounts()?;
    if accounts.is_empty() {
        println!("No accounts");
        return Ok(());
    }

    println!("{:<4} {:<20} {:<15} Currency", "ID", "Name", "Type");
    println!("{}", "─".repeat(50));
    for acct in &accounts {
        println!(
            "{:<4} {:<20} {:<15} {}",
            acct.id.unwrap_or(0),
            acct.name,
            acct.account_type.as_str(),
            acct.currency,
        );
    }
    Ok(())
}

/// Split `add <name words...> [type]`; the last word is a type only if it names one.
fn split_name_and_type(words: &[String]) -> (String, AccountType) {
    if let [name @ .., last] = words {
        let account_type = AccountType::parse(last);
        if !name.is_empty()
            && (account_type != AccountType::Other || last.eq_ignore_ascii_case("other"))
        {
            return (name.join(" "), account_type);
        }
    }
    (words.join(" "), AccountType::Checking)
}

fn add_args<'a>(args: &'a [String], usage: &str) -> Result<&'a [String]> {
    match args {
        [cmd, rest @ ..] if cmd == "add" && !rest.is_empty() => Ok(rest),
        _ => anyhow::bail!("Usage: {usage}"),
    }
}

fn cli_account(args: &[String], db: &mut Database) -> Result<()> {
    let rest = add_args(args, "ledgerly account add <name> [type]")?;
    let (name, account_type) = split_name_and_type(rest);
    let account = Account::new(name.clone(), account_type);
    let id = db.insert_account(&account)?;
    println!("Created account {id}: {name} ({})", account.account_type);
    Ok(())
}

fn cli_categories(db: &mut Database) -> Result<()> {
    for cat in db.get_categories()? {
        println!("{:<4} {}", cat.id.unwrap_or(0), cat.name);
    }
    Ok(())
}

fn cli_category(args: &[String], db: &mut Database) -> Result<()> {
    let name = add_args(args, "ledgerly category add <name>")?.join(" ");
    let id = db.insert_category(&Category::new(name.clone()))?;
    println!("Created category {id}: {name}");
    Ok(())
}

fn cli_payees(db: &mut Database) -> Result<()> {
    let payees = db.get_payees()?;
    if payees.is_empty() {
        println!("No payees");
    }
    for payee in payees {
        println!("{:<4} {}", payee.id.unwrap_or(0), payee.name);
    }
    Ok(())
}

fn cli_payee(args: &[String], db: &mut Database) -> Result<()> {
    let name = add_args(args, "ledgerly payee add <name>")?.join(" ");
    let id = db.insert_payee(&Payee::new(name.clone()))?;
    println!("Created payee {id}: {name}");
    Ok(())
}

fn cli_profiles(db: &mut Database) -> Result<()> {
    let profiles = db.get_profiles()?;
    if profiles.is_empty() {
        println!("No saved profiles. Create one with import --save-profile <name>");
        return Ok(());
    }
    for p in &profiles {
        let mapped: Vec<String> = p
            .mapping
            .iter()
            .map(|(field, header)| format!("{}={header}", field.key()))
            .collect();
        println!(
            "{:<16} {} {} {} {} | {}",
            p.name,
            p.config.delimiter,
            p.config.date_order,
            p.config.amount_style,
            p.config.type_rule,
            mapped.join(", ")
        );
    }
    Ok(())
}

fn cli_profile(args: &[String], db: &mut Database) -> Result<()> {
    let name = match args {
        [cmd, rest @ ..] if cmd == "delete" && !rest.is_empty() => rest.join(" "),
        _ => anyhow::bail!("Usage: ledgerly profile delete <name>"),
    };
    if db.delete_profile(&name)? {
        println!("Deleted profile '{name}'");
        Ok(())
    } else {
        anyhow::bail!("Profile '{name}' not found")
    }
}

pub(crate) fn shellexpand(path: &str) -> String {
    if let Some(rest) = path.strip_prefix("~/") {
        let home = std::env::var("HOME").unwrap_or_else(|_| ".".into());
        format!("{home}/{rest}")
    } else {
        path.to_string()
    }
}

#[cfg(test)]
#[path = "cli_tests.rs"]
mod tests;
