#![allow(clippy::unwrap_used)]

use super::*;
use crate::import::{
    run_import, AmountStyle, ColumnMapping, DateOrder, DelimiterMode, Field, FormatConfig,
    ImportProfile, TypeRule,
};
use rust_decimal_macros::dec;

fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

fn db_with_accounts() -> (Database, i64, i64) {
    let db = Database::open_in_memory().unwrap();
    let checking = db
        .insert_account(&Account::new("Checking".into(), AccountType::Checking))
        .unwrap();
    let savings = db
        .insert_account(&Account::new("Savings".into(), AccountType::Savings))
        .unwrap();
    (db, checking, savings)
}

fn txn(account_id: Option<i64>, day: u32, desc: &str, amount: Decimal) -> NormalizedTransaction {
    NormalizedTransaction {
        date: date(2024, 3, day),
        description: desc.into(),
        txn_type: TxnType::Expense,
        amount,
        account_id,
        category_id: None,
        payee_id: None,
        status: "CLEARED".into(),
    }
}

fn transfer(from: i64, to: i64, amount: Decimal) -> TransferRequest {
    TransferRequest {
        description: "Move to savings".into(),
        date: date(2024, 3, 10),
        amount,
        from_account_id: from,
        to_account_id: to,
    }
}

// ── Default data ──────────────────────────────────────────────

#[test]
fn test_default_categories_seeded() {
    let db = Database::open_in_memory().unwrap();
    let cats = db.get_categories().unwrap();
    assert!(cats.iter().any(|c| c.name == "Income"));
    assert!(cats.iter().any(|c| c.name == "Uncategorized"));
}

#[test]
fn test_default_categories_not_reseeded() {
    let mut db = Database::open_in_memory().unwrap();
    let count_before = db.get_categories().unwrap().len();
    db.seed_default_categories().unwrap();
    assert_eq!(db.get_categories().unwrap().len(), count_before);
}

#[test]
fn test_reopen_file_database() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("ledger.db");
    {
        let db = Database::open(&path).unwrap();
        db.insert_account(&Account::new("Wallet".into(), AccountType::Cash))
            .unwrap();
    }
    let db = Database::open(&path).unwrap();
    let accounts = db.get_accounts().unwrap();
    assert_eq!(accounts.len(), 1);
    assert_eq!(accounts[0].account_type, AccountType::Cash);
}

// ── Entities ──────────────────────────────────────────────────

#[test]
fn test_account_crud() {
    let (db, checking, _) = db_with_accounts();
    let fetched = db.get_account_by_id(checking).unwrap().unwrap();
    assert_eq!(fetched.name, "Checking");
    assert_eq!(fetched.currency, "BRL");
    assert!(db.get_account_by_id(99999).unwrap().is_none());
    // Ordered by name
    let names: Vec<_> = db.get_accounts().unwrap().into_iter().map(|a| a.name).collect();
    assert_eq!(names, vec!["Checking", "Savings"]);
}

#[test]
fn test_category_and_payee_names_unique() {
    let db = Database::open_in_memory().unwrap();
    db.insert_category(&Category::new("Pets".into())).unwrap();
    assert!(db.insert_category(&Category::new("Pets".into())).is_err());

    let id = db.insert_payee(&Payee::new("Padaria Central".into())).unwrap();
    assert!(db.insert_payee(&Payee::new("Padaria Central".into())).is_err());
    let payees = db.get_payees().unwrap();
    assert_eq!(payees.len(), 1);
    assert_eq!(payees[0].id, Some(id));
}

#[test]
fn test_lookups_snapshot() {
    let (db, _, savings) = db_with_accounts();
    let lookups = db.lookups().unwrap();
    assert_eq!(lookups.accounts.find_by_name("savings"), Some(savings));
    assert!(lookups.categories.find_by_name("Groceries").is_some());
}

// ── Batch insert ──────────────────────────────────────────────

#[test]
fn test_batch_insert_and_dedup() {
    let (mut db, checking, _) = db_with_accounts();
    let batch = vec![
        txn(Some(checking), 1, "Coffee", dec!(5)),
        txn(Some(checking), 2, "Lunch", dec!(30.50)),
    ];
    let first = db.insert_transactions_batch(&batch).unwrap();
    assert_eq!(first, BatchOutcome { inserted: 2, skipped: 0 });

    // 30.5 and 30.50 are the same amount
    let again = vec![txn(Some(checking), 2, "Lunch", dec!(30.5))];
    let second = db.insert_transactions_batch(&again).unwrap();
    assert_eq!(second, BatchOutcome { inserted: 0, skipped: 1 });
    assert_eq!(db.get_transaction_count().unwrap(), 2);
}

#[test]
fn test_batch_skips_missing_or_unknown_account() {
    let (mut db, checking, _) = db_with_accounts();
    let batch = vec![
        txn(None, 1, "No account", dec!(1)),
        txn(Some(4242), 1, "Ghost account", dec!(1)),
        txn(Some(checking), 1, "Real", dec!(1)),
    ];
    let outcome = db.insert_transactions_batch(&batch).unwrap();
    assert_eq!(outcome, BatchOutcome { inserted: 1, skipped: 2 });
}

#[test]
fn test_batch_clears_unknown_category_and_payee() {
    let (mut db, checking, _) = db_with_accounts();
    let groceries = db
        .get_categories()
        .unwrap()
        .into_iter()
        .find(|c| c.name == "Groceries")
        .and_then(|c| c.id)
        .unwrap();
    let mut known = txn(Some(checking), 3, "Market", dec!(80));
    known.category_id = Some(groceries);
    let mut unknown = txn(Some(checking), 4, "Kiosk", dec!(3));
    unknown.category_id = Some(9999);
    unknown.payee_id = Some(9999);
    db.insert_transactions_batch(&[known, unknown]).unwrap();

    let txns = db
        .get_transactions_in_window(date(2024, 3, 1), date(2024, 3, 31), None)
        .unwrap();
    assert_eq!(txns[0].category_id, Some(groceries));
    assert_eq!(txns[1].category_id, None);
    assert_eq!(txns[1].payee_id, None);
}

// ── Transfers ─────────────────────────────────────────────────

#[test]
fn test_transfer_writes_two_linked_legs() {
    let (mut db, checking, savings) = db_with_accounts();
    let transfer_id = db.create_transfer(&transfer(checking, savings, dec!(100))).unwrap();

    let txns = db
        .get_transactions_in_window(date(2024, 3, 10), date(2024, 3, 10), None)
        .unwrap();
    assert_eq!(txns.len(), 2);
    let out = txns.iter().find(|t| t.account_id == checking).unwrap();
    let inc = txns.iter().find(|t| t.account_id == savings).unwrap();
    assert_eq!(out.txn_type, TxnType::Expense);
    assert_eq!(inc.txn_type, TxnType::Income);
    assert_eq!(out.amount, dec!(100));
    assert_eq!(out.transfer_id, Some(transfer_id));
    assert_eq!(inc.transfer_id, Some(transfer_id));
}

#[test]
fn test_transfer_validation() {
    let (mut db, checking, savings) = db_with_accounts();
    let cases = [
        (transfer(checking, checking, dec!(10)), TransferError::SameAccount),
        (transfer(checking, savings, dec!(0)), TransferError::NonPositiveAmount),
        (transfer(checking, 777, dec!(10)), TransferError::UnknownAccount(777)),
    ];
    for (req, expected) in cases {
        let err = db.create_transfer(&req).unwrap_err();
        assert_eq!(err.downcast_ref::<TransferError>(), Some(&expected));
    }
    assert_eq!(db.get_transaction_count().unwrap(), 0);
}

#[test]
fn test_transfer_duplicate_rejected() {
    let (mut db, checking, savings) = db_with_accounts();
    db.create_transfer(&transfer(checking, savings, dec!(100))).unwrap();
    let err = db
        .create_transfer(&transfer(checking, savings, dec!(100.00)))
        .unwrap_err();
    assert_eq!(err.downcast_ref::<TransferError>(), Some(&TransferError::Duplicate));
    assert_eq!(db.get_transaction_count().unwrap(), 2);
}

// ── Import through the store ──────────────────────────────────

const STATEMENT: &str = "\
date,description,type,amount,account_id,to_account_id
2024-03-10,Move to savings,transfer,100,Checking,Savings
2024-03-01,Salary,income,5000,Checking,
2024-03-15,Rent,expense,1500,Checking,
";

fn canonical_mapping() -> ColumnMapping {
    let mut m = ColumnMapping::default();
    for field in [
        Field::Date,
        Field::Description,
        Field::Type,
        Field::Amount,
        Field::AccountId,
        Field::ToAccountId,
    ] {
        m.set(field, field.key());
    }
    m
}

#[test]
fn test_import_is_idempotent() {
    let (mut db, _, _) = db_with_accounts();
    let lookups = db.lookups().unwrap();
    let config = FormatConfig::default();

    let first = run_import(STATEMENT, &canonical_mapping(), &config, &lookups, &mut db).unwrap();
    assert_eq!(first.inserted, 4);
    assert_eq!(first.skipped, 0);

    let second = run_import(STATEMENT, &canonical_mapping(), &config, &lookups, &mut db).unwrap();
    assert_eq!(second.inserted, 0);
    assert_eq!(second.skipped, 3);
    assert_eq!(db.get_transaction_count().unwrap(), 4);
}

#[test]
fn test_window_filters_by_account_and_exports() {
    let (mut db, checking, savings) = db_with_accounts();
    let lookups = db.lookups().unwrap();
    let result = run_import(
        STATEMENT,
        &canonical_mapping(),
        &FormatConfig::default(),
        &lookups,
        &mut db,
    )
    .unwrap();
    let (from, to) = (result.min_date.unwrap(), result.max_date.unwrap());

    let all = db.get_transactions_in_window(from, to, None).unwrap();
    let dates: Vec<_> = all.iter().map(|t| t.date.as_str()).collect();
    assert_eq!(dates, vec!["2024-03-01", "2024-03-10", "2024-03-10", "2024-03-15"]);
    let only_savings = db.get_transactions_in_window(from, to, Some(savings)).unwrap();
    assert_eq!(only_savings.len(), 1);
    assert!(only_savings[0].is_transfer());

    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("out.csv");
    let written = db.export_window_to_csv(&path, from, to, Some(checking)).unwrap();
    assert_eq!(written, 3);
    let content = std::fs::read_to_string(&path).unwrap();
    let mut lines = content.lines();
    assert_eq!(
        lines.next(),
        Some("Date,Account,Type,Amount,Description,Category,Payee,Status,Transfer")
    );
    assert_eq!(
        lines.next(),
        Some("2024-03-01,Checking,INCOME,5000,Salary,,,CLEARED,")
    );
}

// ── Profiles ──────────────────────────────────────────────────

#[test]
fn test_profile_roundtrip_and_overwrite() {
    let (mut db, checking, _) = db_with_accounts();
    let mut mapping = ColumnMapping::default();
    mapping.set(Field::Date, "Data");
    mapping.set(Field::Amount, "Valor");
    let mut profile = ImportProfile {
        name: "itau".into(),
        mapping,
        config: FormatConfig {
            delimiter: DelimiterMode::Semicolon,
            date_order: DateOrder::Dmy,
            amount_style: AmountStyle::CommaDecimal,
            type_rule: TypeRule::BySign,
            default_account_id: Some(checking),
        },
    };
    db.save_profile(&profile).unwrap();
    assert_eq!(db.get_profile("itau").unwrap(), Some(profile.clone()));

    profile.mapping.clear(Field::Amount);
    profile.config.type_rule = TypeRule::ForceExpense;
    db.save_profile(&profile).unwrap();
    let stored = db.get_profile("itau").unwrap().unwrap();
    assert!(!stored.mapping.is_mapped(Field::Amount));
    assert_eq!(stored.config.type_rule, TypeRule::ForceExpense);
    assert_eq!(db.get_profiles().unwrap().len(), 1);
}

#[test]
fn test_profile_delete_and_missing() {
    let mut db = Database::open_in_memory().unwrap();
    assert!(db.get_profile("nope").unwrap().is_none());
    assert!(!db.delete_profile("nope").unwrap());

    let profile = ImportProfile {
        name: "nubank".into(),
        mapping: ColumnMapping::default(),
        config: FormatConfig::default(),
    };
    db.save_profile(&profile).unwrap();
    assert!(db.delete_profile("nubank").unwrap());
    assert!(db.get_profiles().unwrap().is_empty());
}

#[test]
fn test_profile_requires_name() {
    let mut db = Database::open_in_memory().unwrap();
    let profile = ImportProfile {
        name: "  ".into(),
        mapping: ColumnMapping::default(),
        config: FormatConfig::default(),
    };
    assert!(db.save_profile(&profile).is_err());
}
