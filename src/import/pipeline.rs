use anyhow::{Context, Result};
use chrono::NaiveDate;
use rust_decimal::Decimal;
use std::path::Path;
use thiserror::Error;

use super::config::{ColumnMapping, DelimiterMode, Field, FormatConfig};
use super::lookup::Lookups;
use super::row::{NormalizedTransaction, RowMapper, RowOutcome, TransferDescriptor};
use super::tokenize::{detect_delimiter, split_fields, strip_bom};

/// A statement split into header and data rows.
#[derive(Debug, Clone, Default)]
pub(crate) struct ParsedFile {
    pub(crate) delimiter: char,
    pub(crate) headers: Vec<String>,
    pub(crate) rows: Vec<Vec<String>>,
}

impl ParsedFile {
    /// Values of one mapped column, skipping rows too short to have it.
    pub(crate) fn column_values(&self, mapping: &ColumnMapping, field: Field) -> Vec<&str> {
        let Some(idx) = mapping.resolve(&self.headers).position(field) else {
            return Vec::new();
        };
        self.rows
            .iter()
            .filter_map(|row| row.get(idx))
            .map(String::as_str)
            .collect()
    }
}

/// Read a statement from disk. Bytes that are not UTF-8 (Latin-1 exports are
/// common) are replaced rather than rejected.
pub(crate) fn read_statement(path: &Path) -> Result<String> {
    let bytes = std::fs::read(path)
        .with_context(|| format!("Failed to read statement: {}", path.display()))?;
    Ok(String::from_utf8_lossy(&bytes).into_owned())
}

/// Split statement text into header and rows. Blank lines are ignored.
pub(crate) fn parse_text(text: &str, mode: DelimiterMode) -> ParsedFile {
    let mut lines = text.lines().filter(|l| !l.trim().is_empty());
    let Some(first) = lines.next() else {
        return ParsedFile {
            delimiter: detect_delimiter("", mode),
            ..ParsedFile::default()
        };
    };

    let header_line = strip_bom(first);
    let delimiter = detect_delimiter(header_line, mode);
    log::debug!("Using delimiter {delimiter:?} ({mode})");

    ParsedFile {
        delimiter,
        headers: split_fields(header_line, delimiter),
        rows: lines.map(|l| split_fields(l, delimiter)).collect(),
    }
}

/// Everything the mapper produced for one file, before anything is persisted.
#[derive(Debug, Clone, Default)]
pub(crate) struct NormalizedBatch {
    pub(crate) transactions: Vec<NormalizedTransaction>,
    pub(crate) transfers: Vec<TransferDescriptor>,
    pub(crate) dropped: usize,
    pub(crate) min_date: Option<NaiveDate>,
    pub(crate) max_date: Option<NaiveDate>,
}

impl NormalizedBatch {
    fn track_date(&mut self, date: NaiveDate) {
        self.min_date = Some(self.min_date.map_or(date, |d| d.min(date)));
        self.max_date = Some(self.max_date.map_or(date, |d| d.max(date)));
    }
}

pub(crate) fn normalize(
    file: &ParsedFile,
    mapping: &ColumnMapping,
    config: &FormatConfig,
    lookups: &Lookups,
) -> NormalizedBatch {
    let mapper = RowMapper::new(&file.headers, mapping, config, lookups);
    let mut batch = NormalizedBatch::default();

    for (i, row) in file.rows.iter().enumerate() {
        let outcome = mapper.map(row);
        if let Some(date) = outcome.date() {
            batch.track_date(date);
        }
        match outcome {
            RowOutcome::Transaction(txn) => batch.transactions.push(txn),
            RowOutcome::Transfer(t) => batch.transfers.push(t),
            RowOutcome::Dropped { raw_date } => {
                // Row numbers are 1-based and count the header
                log::warn!("Row {}: unreadable date '{raw_date}', row dropped", i + 2);
                batch.dropped += 1;
            }
        }
    }

    batch
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub(crate) struct BatchOutcome {
    pub(crate) inserted: usize,
    pub(crate) skipped: usize,
}

/// A transfer whose endpoints have been resolved to account ids.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct TransferRequest {
    pub(crate) description: String,
    pub(crate) date: NaiveDate,
    pub(crate) amount: Decimal,
    pub(crate) from_account_id: i64,
    pub(crate) to_account_id: i64,
}

/// The store an import writes into. It owns duplicate detection.
pub(crate) trait TransactionSink {
    /// Persist one batch atomically. An error aborts the whole import.
    fn submit_batch(&mut self, txns: &[NormalizedTransaction]) -> Result<BatchOutcome>;

    /// Persist both legs of a transfer, or nothing.
    fn submit_transfer(&mut self, transfer: &TransferRequest) -> Result<()>;
}

#[derive(Debug, Error)]
pub(crate) enum TransferSkip {
    #[error("source account '{0}' not found")]
    UnknownSource(String),
    #[error("destination account '{0}' not found")]
    UnknownDestination(String),
    #[error("transfer rejected by the ledger: {0:#}")]
    Rejected(anyhow::Error),
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub(crate) struct ImportResult {
    pub(crate) inserted: usize,
    pub(crate) skipped: usize,
    /// Rows discarded for an unreadable date. Not part of `skipped`.
    pub(crate) dropped: usize,
    pub(crate) min_date: Option<NaiveDate>,
    pub(crate) max_date: Option<NaiveDate>,
}

fn resolve_transfer(t: &TransferDescriptor, lookups: &Lookups) -> Result<TransferRequest, TransferSkip> {
    let from_account_id = lookups
        .accounts
        .resolve_ref(&t.from_account_ref)
        .ok_or_else(|| TransferSkip::UnknownSource(t.from_account_ref.clone()))?;
    let to_account_id = lookups
        .accounts
        .resolve_ref(&t.to_account_ref)
        .ok_or_else(|| TransferSkip::UnknownDestination(t.to_account_ref.clone()))?;
    Ok(TransferRequest {
        description: t.description.clone(),
        date: t.date,
        amount: t.amount,
        from_account_id,
        to_account_id,
    })
}

/// Submit a normalized batch: all transactions in one call, then each transfer
/// on its own. A failed transfer is counted as skipped; a failed batch is fatal.
pub(crate) fn execute<S: TransactionSink + ?Sized>(
    batch: &NormalizedBatch,
    lookups: &Lookups,
    sink: &mut S,
) -> Result<ImportResult> {
    let mut result = ImportResult {
        dropped: batch.dropped,
        min_date: batch.min_date,
        max_date: batch.max_date,
        ..ImportResult::default()
    };

    if !batch.transactions.is_empty() {
        let outcome = sink
            .submit_batch(&batch.transactions)
            .context("Failed to save imported transactions")?;
        result.inserted += outcome.inserted;
        result.skipped += outcome.skipped;
    }

    for t in &batch.transfers {
        let submitted = resolve_transfer(t, lookups).and_then(|req| {
            sink.submit_transfer(&req).map_err(TransferSkip::Rejected)
        });
        match submitted {
            Ok(()) => result.inserted += 2,
            Err(e) => {
                log::warn!("Skipping transfer '{}' on {}: {e}", t.description, t.date);
                result.skipped += 1;
            }
        }
    }

    log::debug!(
        "Import finished: {} inserted, {} skipped, {} dropped",
        result.inserted,
        result.skipped,
        result.dropped
    );
    Ok(result)
}

/// Parse, normalize and persist a statement in one go.
pub(crate) fn run_import<S: TransactionSink + ?Sized>(
    text: &str,
    mapping: &ColumnMapping,
    config: &FormatConfig,
    lookups: &Lookups,
    sink: &mut S,
) -> Result<ImportResult> {
    let file = parse_text(text, config.delimiter);
    let batch = normalize(&file, mapping, config, lookups);
    execute(&batch, lookups, sink)
}

#[cfg(test)]
#[path = "pipeline_tests.rs"]
mod tests;
