#![allow(clippy::unwrap_used)]

use rust_decimal::Decimal;
use rust_decimal_macros::dec;

use super::*;

// ── Transaction ───────────────────────────────────────────────

fn make_txn(txn_type: TxnType, amount: Decimal) -> Transaction {
    Transaction {
        id: None,
        account_id: 1,
        date: "2024-01-15".into(),
        description: "Test".into(),
        txn_type,
        amount,
        category_id: None,
        payee_id: None,
        status: "CLEARED".into(),
        transfer_id: None,
        import_hash: String::new(),
        created_at: String::new(),
    }
}

#[test]
fn test_income() {
    let txn = make_txn(TxnType::Income, dec!(100.00));
    assert_eq!(txn.txn_type.as_str(), "INCOME");
    assert_eq!(txn.signed_amount(), dec!(100.00));
}

#[test]
fn test_expense_signed_amount() {
    let txn = make_txn(TxnType::Expense, dec!(50.00));
    assert_eq!(txn.signed_amount(), dec!(-50.00));
}

#[test]
fn test_transfer_flag() {
    let mut txn = make_txn(TxnType::Expense, dec!(10));
    assert!(!txn.is_transfer());
    txn.transfer_id = Some(7);
    assert!(txn.is_transfer());
}

// ── TxnType ───────────────────────────────────────────────────

#[test]
fn test_txn_type_parse() {
    assert_eq!(TxnType::parse("income"), Some(TxnType::Income));
    assert_eq!(TxnType::parse(" EXPENSE "), Some(TxnType::Expense));
    assert_eq!(TxnType::parse("transfer"), None);
    assert_eq!(TxnType::parse(""), None);
}

#[test]
fn test_txn_type_roundtrip() {
    for t in [TxnType::Income, TxnType::Expense] {
        assert_eq!(TxnType::parse(t.as_str()), Some(t));
    }
}

// ── AccountType ───────────────────────────────────────────────

#[test]
fn test_account_type_parse() {
    assert_eq!(AccountType::parse("checking"), AccountType::Checking);
    assert_eq!(AccountType::parse("CHECKING"), AccountType::Checking);
    assert_eq!(AccountType::parse("poupança"), AccountType::Savings);
    assert_eq!(AccountType::parse("credit"), AccountType::CreditCard);
    assert_eq!(AccountType::parse("cash"), AccountType::Cash);
    assert_eq!(AccountType::parse("unknown"), AccountType::Other);
}

#[test]
fn test_account_type_roundtrip() {
    for t in AccountType::all() {
        let s = t.as_str();
        let back = AccountType::parse(s);
        assert_eq!(*t, back, "Roundtrip failed for {s}");
    }
}

#[test]
fn test_account_new_defaults() {
    let account = Account::new("Checking".into(), AccountType::Checking);
    assert!(account.id.is_none());
    assert_eq!(account.name, "Checking");
    assert_eq!(account.currency, "BRL");
    assert!(!account.created_at.is_empty());
}

// ── Category / Payee ──────────────────────────────────────────

#[test]
fn test_category_display() {
    let cat = Category::new("Groceries".into());
    assert!(cat.id.is_none());
    assert_eq!(format!("{cat}"), "Groceries");
}

#[test]
fn test_payee_display() {
    let payee = Payee::new("Padaria".into());
    assert_eq!(payee.to_string(), "Padaria");
}
