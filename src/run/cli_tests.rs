#![allow(clippy::unwrap_used)]

use super::*;

fn args(list: &[&str]) -> Vec<String> {
    list.iter().map(|s| s.to_string()).collect()
}

fn lookups() -> Lookups {
    let mut checking = Account::new("Checking".into(), AccountType::Checking);
    checking.id = Some(1);
    let mut savings = Account::new("Savings".into(), AccountType::Savings);
    savings.id = Some(2);
    Lookups::from_parts(&[checking, savings], &[], &[])
}

// ── parse_import_args ─────────────────────────────────────────

#[test]
fn test_parse_import_args_full() {
    let parsed = parse_import_args(&args(&[
        "stmt.csv",
        "--map",
        "date=Data",
        "-m",
        "desc=Histórico",
        "--delimiter",
        "semicolon",
        "--date-order",
        "d-m-y",
        "--amount-style",
        "comma-decimal",
        "--type-rule",
        "force-expense",
        "--account",
        "Checking",
        "--save-profile",
        "itau",
        "--dry-run",
    ]))
    .unwrap();

    assert_eq!(parsed.file, "stmt.csv");
    assert_eq!(
        parsed.maps,
        vec![
            (Field::Date, "Data".to_string()),
            (Field::Description, "Histórico".to_string())
        ]
    );
    assert_eq!(parsed.delimiter, Some(DelimiterMode::Semicolon));
    assert_eq!(parsed.date_order, Some(DateOrder::Dmy));
    assert_eq!(parsed.amount_style, Some(AmountStyle::CommaDecimal));
    assert_eq!(parsed.type_rule, Some(TypeRule::ForceExpense));
    assert_eq!(parsed.account.as_deref(), Some("Checking"));
    assert_eq!(parsed.save_profile.as_deref(), Some("itau"));
    assert!(parsed.dry_run);
}

#[test]
fn test_parse_import_args_errors() {
    assert!(parse_import_args(&args(&[])).is_err());
    assert!(parse_import_args(&args(&["a.csv", "b.csv"])).is_err());
    assert!(parse_import_args(&args(&["a.csv", "--delimiter"])).is_err());
    assert!(parse_import_args(&args(&["a.csv", "--delimiter", "tab"])).is_err());
    assert!(parse_import_args(&args(&["a.csv", "--map", "nonsense"])).is_err());
    assert!(parse_import_args(&args(&["a.csv", "--map", "colour=Red"])).is_err());
    assert!(parse_import_args(&args(&["a.csv", "--frobnicate"])).is_err());
}

#[test]
fn test_parse_choice_lists_options() {
    let err = parse_choice("--type-rule", "sideways", TypeRule::parse, TypeRule::all()).unwrap_err();
    let msg = err.to_string();
    assert!(msg.contains("sideways"));
    assert!(msg.contains("by-sign, force-income, force-expense"));
}

// ── resolve_settings ──────────────────────────────────────────

#[test]
fn test_resolve_settings_guesses_from_file() {
    let file = import::parse_text(
        "Data;Histórico;Valor\n25/03/2024;Padaria;-12,50\n",
        DelimiterMode::Auto,
    );
    let parsed = parse_import_args(&args(&["x.csv", "--account", "savings"])).unwrap();
    let (mapping, config) = resolve_settings(&parsed, &file, None, &lookups()).unwrap();
    assert_eq!(mapping.get(Field::Date), Some("Data"));
    assert_eq!(mapping.get(Field::Amount), Some("Valor"));
    assert_eq!(config.date_order, DateOrder::Dmy);
    assert_eq!(config.default_account_id, Some(2));
}

#[test]
fn test_resolve_settings_flags_override_profile() {
    let file = import::parse_text("When,What,How much\n2024-03-01,Rent,-10\n", DelimiterMode::Auto);
    let mut mapping = ColumnMapping::default();
    mapping.set(Field::Date, "When");
    mapping.set(Field::Description, "What");
    mapping.set(Field::Amount, "How much");
    let profile = ImportProfile {
        name: "custom".into(),
        mapping,
        config: FormatConfig {
            type_rule: TypeRule::ForceExpense,
            default_account_id: Some(1),
            ..FormatConfig::default()
        },
    };
    let parsed = parse_import_args(&args(&[
        "x.csv",
        "--map",
        "description=",
        "--type-rule",
        "by-sign",
    ]))
    .unwrap();
    let (mapping, config) = resolve_settings(&parsed, &file, Some(&profile), &lookups()).unwrap();
    assert!(!mapping.is_mapped(Field::Description));
    assert_eq!(mapping.get(Field::Amount), Some("How much"));
    assert_eq!(config.type_rule, TypeRule::BySign);
    assert_eq!(config.default_account_id, Some(1));
}

#[test]
fn test_resolve_settings_requires_date_and_known_account() {
    let file = import::parse_text("Foo,Bar\n1,2\n", DelimiterMode::Auto);
    let parsed = parse_import_args(&args(&["x.csv"])).unwrap();
    let err = resolve_settings(&parsed, &file, None, &lookups()).unwrap_err();
    assert!(err.to_string().contains("--map date="));

    let file = import::parse_text("date,amount\n2024-01-01,1\n", DelimiterMode::Auto);
    let parsed = parse_import_args(&args(&["x.csv", "--account", "Brokerage"])).unwrap();
    assert!(resolve_settings(&parsed, &file, None, &lookups()).is_err());
}

// ── Window & entity helpers ───────────────────────────────────

#[test]
fn test_parse_window() {
    let (from, to, account) = parse_window(
        &args(&["--from", "2024-03-01", "--to", "2024-03-31", "--account", "2"]),
        &lookups(),
    )
    .unwrap();
    assert_eq!(from.to_string(), "2024-03-01");
    assert_eq!(to.to_string(), "2024-03-31");
    assert_eq!(account, Some(2));

    assert!(parse_window(&args(&["--from", "2024-03-01"]), &lookups()).is_err());
    assert!(parse_window(&args(&["--from", "01/03/2024", "--to", "2024-03-31"]), &lookups()).is_err());
    assert!(parse_window(&args(&["--from", "2024-04-01", "--to", "2024-03-31"]), &lookups()).is_err());
}

#[test]
fn test_split_name_and_type() {
    let (name, t) = split_name_and_type(&args(&["Nubank", "Credit"]));
    assert_eq!(name, "Nubank");
    assert_eq!(t, AccountType::CreditCard);

    let (name, t) = split_name_and_type(&args(&["Joint", "Account"]));
    assert_eq!(name, "Joint Account");
    assert_eq!(t, AccountType::Checking);

    // A lone word is always the name
    let (name, t) = split_name_and_type(&args(&["Savings"]));
    assert_eq!(name, "Savings");
    assert_eq!(t, AccountType::Checking);
}

#[test]
fn test_add_args() {
    assert_eq!(add_args(&args(&["add", "Pets"]), "usage").unwrap(), &args(&["Pets"])[..]);
    assert!(add_args(&args(&["add"]), "usage").is_err());
    assert!(add_args(&args(&["remove", "Pets"]), "usage").is_err());
}

#[test]
fn test_shellexpand() {
    let home = std::env::var("HOME").unwrap_or_else(|_| ".".into());
    assert_eq!(
        shellexpand("~/statements/a.csv"),
        format!("{home}/statements/a.csv")
    );
    assert_eq!(shellexpand("/tmp/a.csv"), "/tmp/a.csv");
}
