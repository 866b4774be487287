use chrono::NaiveDate;
use rust_decimal::Decimal;

use super::config::{ColumnMapping, Field, FormatConfig, ResolvedColumns};
use super::lookup::Lookups;
use super::normalize::{classify_type, normalize_date, parse_amount, parse_iso_date, EntryKind};
use crate::models::TxnType;

pub(crate) const DEFAULT_STATUS: &str = "CLEARED";

/// One statement line, ready for the store. `amount` is never negative.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct NormalizedTransaction {
    pub(crate) date: NaiveDate,
    pub(crate) description: String,
    pub(crate) txn_type: TxnType,
    pub(crate) amount: Decimal,
    pub(crate) account_id: Option<i64>,
    pub(crate) category_id: Option<i64>,
    pub(crate) payee_id: Option<i64>,
    pub(crate) status: String,
}

/// A movement between two accounts, still referring to them by id or name.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct TransferDescriptor {
    pub(crate) date: NaiveDate,
    pub(crate) amount: Decimal,
    pub(crate) from_account_ref: String,
    pub(crate) to_account_ref: String,
    pub(crate) description: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum RowOutcome {
    Transaction(NormalizedTransaction),
    Transfer(TransferDescriptor),
    /// The date column held nothing we could read as a calendar date.
    Dropped { raw_date: String },
}

impl RowOutcome {
    pub(crate) fn date(&self) -> Option<NaiveDate> {
        match self {
            Self::Transaction(t) => Some(t.date),
            Self::Transfer(t) => Some(t.date),
            Self::Dropped { .. } => None,
        }
    }
}

/// Turns raw rows into transactions or transfers for one header/mapping pair.
pub(crate) struct RowMapper<'a> {
    columns: ResolvedColumns,
    config: &'a FormatConfig,
    lookups: &'a Lookups,
}

impl<'a> RowMapper<'a> {
    pub(crate) fn new(
        headers: &[String],
        mapping: &ColumnMapping,
        config: &'a FormatConfig,
        lookups: &'a Lookups,
    ) -> Self {
        Self {
            columns: mapping.resolve(headers),
            config,
            lookups,
        }
    }

    fn field<'r>(&self, row: &'r [String], field: Field) -> &'r str {
        self.columns
            .position(field)
            .and_then(|idx| row.get(idx))
            .map(|s| s.trim())
            .unwrap_or("")
    }

    fn description(&self, row: &[String]) -> String {
        let base = self.field(row, Field::Description);
        if !self.columns.is_mapped(Field::DescriptionExtra) {
            return base.to_string();
        }
        let extra = self.field(row, Field::DescriptionExtra);
        [base, extra]
            .iter()
            .filter(|s| !s.is_empty())
            .copied()
            .collect::<Vec<_>>()
            .join(" - ")
    }

    pub(crate) fn map(&self, row: &[String]) -> RowOutcome {
        let raw_date = self.field(row, Field::Date);
        let Some(date) = parse_iso_date(&normalize_date(raw_date, self.config.date_order)) else {
            return RowOutcome::Dropped {
                raw_date: raw_date.to_string(),
            };
        };

        let description = self.description(row);
        let signed = parse_amount(self.field(row, Field::Amount), self.config.amount_style);
        let amount = signed.abs();

        let raw_account = self.field(row, Field::AccountId);
        let account_id = self
            .lookups
            .accounts
            .resolve_field(raw_account)
            .or(self.config.default_account_id);

        let txn_type = match classify_type(self.field(row, Field::Type), signed, self.config.type_rule) {
            EntryKind::Entry(t) => t,
            EntryKind::Transfer => {
                let from_account_ref = account_id
                    .map(|id| id.to_string())
                    .unwrap_or_else(|| raw_account.to_string());
                return RowOutcome::Transfer(TransferDescriptor {
                    date,
                    amount,
                    from_account_ref,
                    to_account_ref: self.field(row, Field::ToAccountId).to_string(),
                    description,
                });
            }
            EntryKind::Other(label) => {
                let fallback = self.config.type_rule.apply(signed);
                log::debug!("Unrecognised type '{label}', classifying as {fallback}");
                fallback
            }
        };

        let status = match self.field(row, Field::Status) {
            "" => DEFAULT_STATUS.to_string(),
            s => s.to_uppercase(),
        };

        RowOutcome::Transaction(NormalizedTransaction {
            date,
            description,
            txn_type,
            amount,
            account_id,
            category_id: self
                .lookups
                .categories
                .resolve_field(self.field(row, Field::CategoryId)),
            payee_id: self
                .lookups
                .payees
                .resolve_field(self.field(row, Field::PayeeId)),
            status,
        })
    }
}

#[cfg(test)]
#[path = "row_tests.rs"]
mod tests;
