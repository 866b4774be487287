use chrono::NaiveDate;
use regex::{Captures, Regex};
use rust_decimal::Decimal;
use std::str::FromStr;
use std::sync::LazyLock;

use super::config::{AmountStyle, DateOrder, TypeRule};
use crate::models::TxnType;

static ISO_DATE: LazyLock<Option<Regex>> =
    LazyLock::new(|| Regex::new(r"^(\d{4})-(\d{1,2})-(\d{1,2})$").ok());
static SLASH_DATE: LazyLock<Option<Regex>> =
    LazyLock::new(|| Regex::new(r"^(\d{1,2})/(\d{1,2})/(\d{4}|\d{2})$").ok());
static GENERIC_DATE: LazyLock<Option<Regex>> =
    LazyLock::new(|| Regex::new(r"^(\d{1,4})[-/](\d{1,2})[-/](\d{1,4})$").ok());
static GROUPED_COMMA_DECIMAL: LazyLock<Option<Regex>> =
    LazyLock::new(|| Regex::new(r"^\d{1,3}(\.\d{3})*,\d{1,2}$").ok());

const CURRENCY_PREFIXES: &[&str] = &["R$", "US$", "$", "€", "£"];

fn captures<'a>(re: &LazyLock<Option<Regex>>, s: &'a str) -> Option<Captures<'a>> {
    re.as_ref().and_then(|re| re.captures(s))
}

fn group<'a>(caps: &Captures<'a>, i: usize) -> &'a str {
    caps.get(i).map(|m| m.as_str()).unwrap_or("")
}

fn expand_year(y: &str) -> String {
    if y.len() == 2 {
        format!("20{y}")
    } else {
        y.to_string()
    }
}

fn iso(year: &str, month: &str, day: &str) -> String {
    format!("{}-{:0>2}-{:0>2}", expand_year(year), month, day)
}

/// Rewrite a statement date as `YYYY-MM-DD`.
///
/// ISO input is zero-padded. Slash-separated input is always read day-first.
/// Any other `#-#-#` / `#/#/#` shape follows `order`. Anything else is returned
/// unchanged; use [`parse_iso_date`] to tell whether the result is usable.
pub(crate) fn normalize_date(raw: &str, order: DateOrder) -> String {
    let s = raw.trim();
    if let Some(c) = captures(&ISO_DATE, s) {
        return iso(group(&c, 1), group(&c, 2), group(&c, 3));
    }
    if let Some(c) = captures(&SLASH_DATE, s) {
        return iso(group(&c, 3), group(&c, 2), group(&c, 1));
    }
    if let Some(c) = captures(&GENERIC_DATE, s) {
        let (a, b, c) = (group(&c, 1), group(&c, 2), group(&c, 3));
        return match order {
            DateOrder::Ymd => iso(a, b, c),
            DateOrder::Dmy => iso(c, b, a),
            DateOrder::Mdy => iso(c, a, b),
        };
    }
    s.to_string()
}

/// Parse a normalized date; `None` for anything that is not a real calendar day.
pub(crate) fn parse_iso_date(s: &str) -> Option<NaiveDate> {
    if s.len() != 10 {
        return None;
    }
    NaiveDate::parse_from_str(s, "%Y-%m-%d").ok()
}

fn strip_currency(s: &str) -> &str {
    CURRENCY_PREFIXES
        .iter()
        .find_map(|p| s.strip_prefix(p))
        .map(str::trim)
        .unwrap_or(s)
}

/// Parse a statement amount into a signed decimal. Never fails: unreadable
/// input becomes zero.
///
/// A leading `-` or full parenthesis wrapping marks a negative value. Comma is
/// taken as the decimal separator when `style` says so, or in `Auto` mode when
/// the value looks like `1.234,56` or has a comma and no dot.
pub(crate) fn parse_amount(raw: &str, style: AmountStyle) -> Decimal {
    let mut s = strip_currency(raw.trim());
    let mut negative = false;
    if let Some(rest) = s.strip_prefix('-') {
        negative = true;
        s = rest.trim();
    } else if let Some(inner) = s.strip_prefix('(').and_then(|v| v.strip_suffix(')')) {
        negative = true;
        s = inner.trim();
    }
    let s = strip_currency(s);

    let comma_decimal = match style {
        AmountStyle::CommaDecimal => true,
        AmountStyle::DotDecimal => false,
        AmountStyle::Auto => {
            captures(&GROUPED_COMMA_DECIMAL, s).is_some() || (s.contains(',') && !s.contains('.'))
        }
    };
    let cleaned = if comma_decimal {
        s.replace('.', "").replace(',', ".")
    } else {
        s.replace(',', "")
    };

    let value = Decimal::from_str(&cleaned).unwrap_or(Decimal::ZERO);
    if negative && !value.is_zero() {
        -value
    } else {
        value
    }
}

/// What a row turned out to be once its type column and sign were considered.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum EntryKind {
    Entry(TxnType),
    Transfer,
    /// A non-empty type label we have no synonym for, upper-cased.
    Other(String),
}

/// Recognise a type label in English or Portuguese. `None` when blank.
pub(crate) fn type_label(raw: &str) -> Option<EntryKind> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return None;
    }
    let kind = match trimmed.to_lowercase().as_str() {
        "income" | "receita" | "entrada" => EntryKind::Entry(TxnType::Income),
        "expense" | "despesa" | "saida" | "saída" => EntryKind::Entry(TxnType::Expense),
        "transfer" | "transferencia" | "transferência" => EntryKind::Transfer,
        _ => EntryKind::Other(trimmed.to_uppercase()),
    };
    Some(kind)
}

impl TypeRule {
    pub(crate) fn apply(&self, signed_amount: Decimal) -> TxnType {
        match self {
            Self::BySign if signed_amount < Decimal::ZERO => TxnType::Expense,
            Self::BySign => TxnType::Income,
            Self::ForceIncome => TxnType::Income,
            Self::ForceExpense => TxnType::Expense,
        }
    }
}

/// Classify a row: an explicit label wins, otherwise `rule` decides from the sign.
pub(crate) fn classify_type(raw: &str, signed_amount: Decimal, rule: TypeRule) -> EntryKind {
    type_label(raw).unwrap_or_else(|| EntryKind::Entry(rule.apply(signed_amount)))
}

#[cfg(test)]
#[path = "normalize_tests.rs"]
mod tests;
