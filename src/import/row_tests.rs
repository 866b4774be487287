#![allow(clippy::unwrap_used, clippy::panic)]

use super::*;
use crate::import::config::{AmountStyle, DateOrder, TypeRule};
use crate::import::lookup::EntityIndex;
use rust_decimal_macros::dec;

fn h(names: &[&str]) -> Vec<String> {
    names.iter().map(|s| s.to_string()).collect()
}

fn lookups() -> Lookups {
    Lookups {
        accounts: EntityIndex::new([(1, "Checking".to_string()), (2, "Savings".to_string())]),
        categories: EntityIndex::new([(10, "Groceries".to_string())]),
        payees: EntityIndex::new([(20, "Padaria Real".to_string())]),
    }
}

fn full_mapping() -> ColumnMapping {
    let mut m = ColumnMapping::default();
    for field in Field::all() {
        m.set(*field, field.key());
    }
    m
}

fn full_headers() -> Vec<String> {
    Field::all().iter().map(|f| f.key().to_string()).collect()
}

/// Row in `Field::all()` order.
fn row(values: [&str; 10]) -> Vec<String> {
    values.iter().map(|s| s.to_string()).collect()
}

fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

// ── Transactions ──────────────────────────────────────────────

#[test]
fn test_maps_expense_by_sign() {
    let config = FormatConfig::default();
    let lk = lookups();
    let mapper = RowMapper::new(&full_headers(), &full_mapping(), &config, &lk);
    let outcome = mapper.map(&row([
        "2024-03-05", "Mercado", "", "", "-12.50", "Checking", "", "Groceries", "Padaria Real", "",
    ]));
    let RowOutcome::Transaction(txn) = outcome else {
        panic!("expected a transaction");
    };
    assert_eq!(txn.date, date(2024, 3, 5));
    assert_eq!(txn.description, "Mercado");
    assert_eq!(txn.txn_type, TxnType::Expense);
    assert_eq!(txn.amount, dec!(12.50));
    assert_eq!(txn.account_id, Some(1));
    assert_eq!(txn.category_id, Some(10));
    assert_eq!(txn.payee_id, Some(20));
    assert_eq!(txn.status, "CLEARED");
}

#[test]
fn test_amount_is_always_positive() {
    let config = FormatConfig {
        type_rule: TypeRule::ForceIncome,
        ..FormatConfig::default()
    };
    let lk = lookups();
    let mapper = RowMapper::new(&full_headers(), &full_mapping(), &config, &lk);
    let RowOutcome::Transaction(txn) = mapper.map(&row([
        "2024-03-05", "Refund", "", "", "(30.00)", "1", "", "", "", "",
    ])) else {
        panic!("expected a transaction");
    };
    assert_eq!(txn.txn_type, TxnType::Income);
    assert_eq!(txn.amount, dec!(30.00));
}

#[test]
fn test_extra_description_is_joined() {
    let config = FormatConfig::default();
    let lk = lookups();
    let mapper = RowMapper::new(&full_headers(), &full_mapping(), &config, &lk);
    let RowOutcome::Transaction(txn) = mapper.map(&row([
        "2024-03-05", "PIX", "Maria", "", "10", "", "", "", "", "",
    ])) else {
        panic!("expected a transaction");
    };
    assert_eq!(txn.description, "PIX - Maria");
}

#[test]
fn test_extra_description_blank_keeps_base() {
    let config = FormatConfig::default();
    let lk = lookups();
    let mapper = RowMapper::new(&full_headers(), &full_mapping(), &config, &lk);
    let RowOutcome::Transaction(txn) = mapper.map(&row([
        "2024-03-05", "PIX", " ", "", "10", "", "", "", "", "",
    ])) else {
        panic!("expected a transaction");
    };
    assert_eq!(txn.description, "PIX");
}

#[test]
fn test_integer_account_is_passed_through() {
    let config = FormatConfig::default();
    let lk = lookups();
    let mapper = RowMapper::new(&full_headers(), &full_mapping(), &config, &lk);
    let RowOutcome::Transaction(txn) = mapper.map(&row([
        "2024-03-05", "x", "", "", "1", "99", "", "42", "", "",
    ])) else {
        panic!("expected a transaction");
    };
    // Ids are not checked against the snapshot here; the store decides
    assert_eq!(txn.account_id, Some(99));
    assert_eq!(txn.category_id, Some(42));
}

#[test]
fn test_unknown_account_falls_back_to_default() {
    let config = FormatConfig {
        default_account_id: Some(2),
        ..FormatConfig::default()
    };
    let lk = lookups();
    let mapper = RowMapper::new(&full_headers(), &full_mapping(), &config, &lk);
    let RowOutcome::Transaction(txn) = mapper.map(&row([
        "2024-03-05", "x", "", "", "1", "Brokerage", "", "Unknown Cat", "Nobody", "",
    ])) else {
        panic!("expected a transaction");
    };
    assert_eq!(txn.account_id, Some(2));
    assert_eq!(txn.category_id, None);
    assert_eq!(txn.payee_id, None);
}

#[test]
fn test_account_name_match_is_case_insensitive() {
    let config = FormatConfig::default();
    let lk = lookups();
    let mapper = RowMapper::new(&full_headers(), &full_mapping(), &config, &lk);
    let RowOutcome::Transaction(txn) = mapper.map(&row([
        "2024-03-05", "x", "", "", "1", "  SAVINGS ", "", "", "", "",
    ])) else {
        panic!("expected a transaction");
    };
    assert_eq!(txn.account_id, Some(2));
}

#[test]
fn test_status_is_uppercased() {
    let config = FormatConfig::default();
    let lk = lookups();
    let mapper = RowMapper::new(&full_headers(), &full_mapping(), &config, &lk);
    let RowOutcome::Transaction(txn) = mapper.map(&row([
        "2024-03-05", "x", "", "", "1", "", "", "", "", "pending",
    ])) else {
        panic!("expected a transaction");
    };
    assert_eq!(txn.status, "PENDING");
}

#[test]
fn test_unknown_type_label_uses_type_rule() {
    let config = FormatConfig::default();
    let lk = lookups();
    let mapper = RowMapper::new(&full_headers(), &full_mapping(), &config, &lk);
    let RowOutcome::Transaction(txn) = mapper.map(&row([
        "2024-03-05", "x", "", "estorno", "-7", "", "", "", "", "",
    ])) else {
        panic!("expected a transaction");
    };
    assert_eq!(txn.txn_type, TxnType::Expense);
    assert_eq!(txn.amount, dec!(7));
}

#[test]
fn test_format_options_are_applied() {
    let config = FormatConfig {
        date_order: DateOrder::Mdy,
        amount_style: AmountStyle::DotDecimal,
        ..FormatConfig::default()
    };
    let lk = lookups();
    let mapper = RowMapper::new(&full_headers(), &full_mapping(), &config, &lk);
    let outcome = mapper.map(&row([
        "12-31-2023", "x", "", "", "1,500.25", "", "", "", "", "",
    ]));
    let RowOutcome::Transaction(txn) = outcome else {
        panic!("expected a transaction");
    };
    assert_eq!(txn.date, date(2023, 12, 31));
    assert_eq!(txn.amount, dec!(1500.25));
}

// ── Transfers ─────────────────────────────────────────────────

#[test]
fn test_transfer_row_yields_descriptor() {
    let config = FormatConfig::default();
    let lk = lookups();
    let mapper = RowMapper::new(&full_headers(), &full_mapping(), &config, &lk);
    let outcome = mapper.map(&row([
        "05/03/2024", "Move", "", "transfer", "100", "Checking", "Savings", "", "", "",
    ]));
    assert_eq!(
        outcome,
        RowOutcome::Transfer(TransferDescriptor {
            date: date(2024, 3, 5),
            amount: dec!(100),
            from_account_ref: "1".into(),
            to_account_ref: "Savings".into(),
            description: "Move".into(),
        })
    );
}

#[test]
fn test_transfer_with_unresolved_source_keeps_raw_ref() {
    let config = FormatConfig::default();
    let lk = lookups();
    let mapper = RowMapper::new(&full_headers(), &full_mapping(), &config, &lk);
    let RowOutcome::Transfer(t) = mapper.map(&row([
        "2024-03-05", "Move", "", "Transferência", "-100", "Wallet", "2", "", "", "",
    ])) else {
        panic!("expected a transfer");
    };
    assert_eq!(t.from_account_ref, "Wallet");
    assert_eq!(t.to_account_ref, "2");
    assert_eq!(t.amount, dec!(100));
}

// ── Dropped rows & partial mappings ───────────────────────────

#[test]
fn test_bad_date_drops_row() {
    let config = FormatConfig::default();
    let lk = lookups();
    let mapper = RowMapper::new(&full_headers(), &full_mapping(), &config, &lk);
    let outcome = mapper.map(&row([
        "not a date", "x", "", "", "1", "", "", "", "", "",
    ]));
    assert_eq!(
        outcome,
        RowOutcome::Dropped {
            raw_date: "not a date".into()
        }
    );
    assert!(outcome.date().is_none());
}

#[test]
fn test_unmapped_fields_are_empty() {
    let mut mapping = ColumnMapping::default();
    mapping.set(Field::Date, "Data");
    mapping.set(Field::Amount, "Valor");
    let headers = h(&["Data", "Histórico", "Valor"]);
    let config = FormatConfig::default();
    let lk = lookups();
    let mapper = RowMapper::new(&headers, &mapping, &config, &lk);
    let RowOutcome::Transaction(txn) = mapper.map(&h(&["05/03/2024", "ignored", "-1.234,56"])) else {
        panic!("expected a transaction");
    };
    assert_eq!(txn.description, "");
    assert_eq!(txn.amount, dec!(1234.56));
    assert_eq!(txn.txn_type, TxnType::Expense);
    assert_eq!(txn.account_id, None);
}

#[test]
fn test_mapping_to_missing_header_is_absent() {
    let mut mapping = ColumnMapping::default();
    mapping.set(Field::Date, "date");
    mapping.set(Field::Description, "Nope");
    let headers = h(&["date", "memo"]);
    let config = FormatConfig::default();
    let lk = lookups();
    let mapper = RowMapper::new(&headers, &mapping, &config, &lk);
    let RowOutcome::Transaction(txn) = mapper.map(&h(&["2024-01-01", "coffee"])) else {
        panic!("expected a transaction");
    };
    assert_eq!(txn.description, "");
}

#[test]
fn test_short_row_reads_missing_cells_as_empty() {
    let config = FormatConfig::default();
    let lk = lookups();
    let mapper = RowMapper::new(&full_headers(), &full_mapping(), &config, &lk);
    let RowOutcome::Transaction(txn) = mapper.map(&h(&["2024-01-01", "coffee"])) else {
        panic!("expected a transaction");
    };
    assert_eq!(txn.amount, Decimal::ZERO);
    assert_eq!(txn.status, DEFAULT_STATUS);
}
