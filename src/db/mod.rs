mod profiles;
mod schema;

use anyhow::{Context, Result};
use chrono::NaiveDate;
use rusqlite::{params, Connection, OptionalExtension, Row};
use rust_decimal::Decimal;
use std::path::Path;
use std::str::FromStr;
use thiserror::Error;

use crate::import::{
    BatchOutcome, Lookups, NormalizedTransaction, TransactionSink, TransferRequest,
};
use crate::models::*;

/// Reasons the ledger refuses to record a transfer.
#[derive(Debug, Error, PartialEq, Eq)]
pub(crate) enum TransferError {
    #[error("account {0} does not exist")]
    UnknownAccount(i64),
    #[error("source and destination are the same account")]
    SameAccount,
    #[error("transfer amount must be positive")]
    NonPositiveAmount,
    #[error("this transfer was already imported")]
    Duplicate,
}

pub(crate) struct Database {
    conn: Connection,
}

const TXN_COLUMNS: &str = "t.id, t.account_id, t.date, t.description, t.txn_type, t.amount,
     t.category_id, t.payee_id, t.status, t.transfer_id, t.import_hash, t.created_at";

fn row_to_transaction(row: &Row) -> rusqlite::Result<Transaction> {
    let type_str: String = row.get(4)?;
    let amount_str: String = row.get(5)?;
    Ok(Transaction {
        id: Some(row.get(0)?),
        account_id: row.get(1)?,
        date: row.get(2)?,
        description: row.get(3)?,
        txn_type: TxnType::parse(&type_str).unwrap_or(TxnType::Expense),
        amount: Decimal::from_str(&amount_str).unwrap_or_default(),
        category_id: row.get(6)?,
        payee_id: row.get(7)?,
        status: row.get(8)?,
        transfer_id: row.get(9)?,
        import_hash: row.get(10)?,
        created_at: row.get(11)?,
    })
}

impl Database {
    pub(crate) fn open(path: &Path) -> Result<Self> {
        let conn = Connection::open(path)
            .with_context(|| format!("Failed to open database: {}", path.display()))?;
        conn.execute_batch("PRAGMA journal_mode=WAL; PRAGMA foreign_keys=ON;")
            .context("Failed to set database pragmas")?;
        let mut db = Self { conn };
        db.migrate().context("Database migration failed")?;
        db.seed_default_categories()?;
        Ok(db)
    }

    #[cfg(test)]
    pub(crate) fn open_in_memory() -> Result<Self> {
        let conn = Connection::open_in_memory()?;
        conn.execute_batch("PRAGMA foreign_keys=ON;")?;
        let mut db = Self { conn };
        db.migrate()?;
        db.seed_default_categories()?;
        Ok(db)
    }

    fn migrate(&mut self) -> Result<()> {
        let has_version_table: bool = self.conn.query_row(
            "SELECT EXISTS(SELECT 1 FROM sqlite_master WHERE type='table' AND name='schema_version')",
            [],
            |row| row.get(0),
        )?;

        if !has_version_table {
            self.conn.execute_batch(schema::SCHEMA_V1)?;
            self.conn.execute(
                "INSERT INTO schema_version (version) VALUES (?1)",
                params![schema::CURRENT_VERSION],
            )?;
            return Ok(());
        }

        let current: i32 = self
            .conn
            .query_row("SELECT version FROM schema_version LIMIT 1", [], |row| {
                row.get(0)
            })
            .unwrap_or(0);

        for &(from_version, sql) in schema::MIGRATIONS {
            if current <= from_version {
                self.conn.execute_batch(sql)?;
            }
        }

        if current < schema::CURRENT_VERSION {
            self.conn.execute(
                "UPDATE schema_version SET version = ?1",
                params![schema::CURRENT_VERSION],
            )?;
        }

        Ok(())
    }

    fn seed_default_categories(&mut self) -> Result<()> {
        let count: i64 = self
            .conn
            .query_row("SELECT COUNT(*) FROM categories", [], |row| row.get(0))?;
        if count > 0 {
            return Ok(());
        }

        let defaults = [
            "Groceries",
            "Housing",
            "Income",
            "Restaurants",
            "Salary",
            "Transportation",
            "Uncategorized",
            "Utilities",
        ];

        let tx = self.conn.transaction()?;
        for name in &defaults {
            tx.execute(
                "INSERT OR IGNORE INTO categories (name) VALUES (?1)",
                params![name],
            )?;
        }
        tx.commit()?;
        Ok(())
    }

    // ── Accounts ──────────────────────────────────────────────

    pub(crate) fn insert_account(&self, account: &Account) -> Result<i64> {
        self.conn.execute(
            "INSERT INTO accounts (name, account_type, currency, created_at)
             VALUES (?1, ?2, ?3, ?4)",
            params![
                account.name,
                account.account_type.as_str(),
                account.currency,
                account.created_at,
            ],
        )?;
        Ok(self.conn.last_insert_rowid())
    }

    pub(crate) fn get_accounts(&self) -> Result<Vec<Account>> {
        let mut stmt = self.conn.prepare(
            "SELECT id, name, account_type, currency, created_at FROM accounts ORDER BY name",
        )?;
        let rows = stmt.query_map([], |row| {
            Ok(Account {
                id: Some(row.get(0)?),
                name: row.get(1)?,
                account_type: AccountType::parse(&row.get::<_, String>(2)?),
                currency: row.get(3)?,
                created_at: row.get(4)?,
            })
        })?;
        Ok(rows.collect::<std::result::Result<Vec<_>, _>>()?)
    }

    pub(crate) fn get_account_by_id(&self, id: i64) -> Result<Option<Account>> {
        let account = self
            .conn
            .query_row(
                "SELECT id, name, account_type, currency, created_at FROM accounts WHERE id = ?1",
                params![id],
                |row| {
                    Ok(Account {
                        id: Some(row.get(0)?),
                        name: row.get(1)?,
                        account_type: AccountType::parse(&row.get::<_, String>(2)?),
                        currency: row.get(3)?,
                        created_at: row.get(4)?,
                    })
                },
            )
            .optional()?;
        Ok(account)
    }

    fn account_exists(&self, id: i64) -> Result<bool> {
        Ok(self.conn.query_row(
            "SELECT EXISTS(SELECT 1 FROM accounts WHERE id = ?1)",
            params![id],
            |row| row.get(0),
        )?)
    }

    // ── Categories & payees ───────────────────────────────────

    pub(crate) fn get_categories(&self) -> Result<Vec<Category>> {
        let mut stmt = self
            .conn
            .prepare("SELECT id, name FROM categories ORDER BY name")?;
        let rows = stmt.query_map([], |row| {
            Ok(Category {
                id: Some(row.get(0)?),
                name: row.get(1)?,
            })
        })?;
        Ok(rows.collect::<std::result::Result<Vec<_>, _>>()?)
    }

    pub(crate) fn insert_category(&self, cat: &Category) -> Result<i64> {
        self.conn
            .execute("INSERT INTO categories (name) VALUES (?1)", params![cat.name])
            .with_context(|| format!("Failed to add category '{}'", cat.name))?;
        Ok(self.conn.last_insert_rowid())
    }

    pub(crate) fn get_payees(&self) -> Result<Vec<Payee>> {
        let mut stmt = self
            .conn
            .prepare("SELECT id, name FROM payees ORDER BY name")?;
        let rows = stmt.query_map([], |row| {
            Ok(Payee {
                id: Some(row.get(0)?),
                name: row.get(1)?,
            })
        })?;
        Ok(rows.collect::<std::result::Result<Vec<_>, _>>()?)
    }

    pub(crate) fn insert_payee(&self, payee: &Payee) -> Result<i64> {
        self.conn
            .execute("INSERT INTO payees (name) VALUES (?1)", params![payee.name])
            .with_context(|| format!("Failed to add payee '{}'", payee.name))?;
        Ok(self.conn.last_insert_rowid())
    }

    /// Snapshot of every name an import may refer to.
    pub(crate) fn lookups(&self) -> Result<Lookups> {
        Ok(Lookups::from_parts(
            &self.get_accounts()?,
            &self.get_categories()?,
            &self.get_payees()?,
        ))
    }

    // ── Transactions ──────────────────────────────────────────

    /// Insert imported rows in one SQLite transaction. Rows without a known
    /// account, and rows already imported, are skipped. Unknown category or
    /// payee ids are cleared rather than rejected.
    pub(crate) fn insert_transactions_batch(
        &mut self,
        txns: &[NormalizedTransaction],
    ) -> Result<BatchOutcome> {
        let now = chrono::Utc::now().to_rfc3339();
        let tx = self.conn.transaction()?;
        let mut outcome = BatchOutcome::default();
        {
            let mut account_exists =
                tx.prepare_cached("SELECT EXISTS(SELECT 1 FROM accounts WHERE id = ?1)")?;
            let mut category_exists =
                tx.prepare_cached("SELECT EXISTS(SELECT 1 FROM categories WHERE id = ?1)")?;
            let mut payee_exists =
                tx.prepare_cached("SELECT EXISTS(SELECT 1 FROM payees WHERE id = ?1)")?;
            let mut hash_exists =
                tx.prepare_cached("SELECT EXISTS(SELECT 1 FROM transactions WHERE import_hash = ?1)")?;
            let mut insert = tx.prepare_cached(
                "INSERT INTO transactions (account_id, date, description, txn_type, amount, category_id, payee_id, status, transfer_id, import_hash, created_at)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, NULL, ?9, ?10)",
            )?;

            for txn in txns {
                let Some(account_id) = txn.account_id else {
                    outcome.skipped += 1;
                    continue;
                };
                if !account_exists.query_row(params![account_id], |row| row.get::<_, bool>(0))? {
                    log::debug!("Skipping '{}': unknown account {account_id}", txn.description);
                    outcome.skipped += 1;
                    continue;
                }

                let date = txn.date.format("%Y-%m-%d").to_string();
                let hash = compute_hash(
                    account_id,
                    &date,
                    &txn.description,
                    &txn.amount,
                    txn.txn_type.as_str(),
                );
                if hash_exists.query_row(params![hash], |row| row.get::<_, bool>(0))? {
                    outcome.skipped += 1;
                    continue;
                }

                let category_id = match txn.category_id {
                    Some(id) if category_exists.query_row(params![id], |row| row.get::<_, bool>(0))? => Some(id),
                    _ => None,
                };
                let payee_id = match txn.payee_id {
                    Some(id) if payee_exists.query_row(params![id], |row| row.get::<_, bool>(0))? => Some(id),
                    _ => None,
                };

                insert.execute(params![
                    account_id,
                    date,
                    txn.description,
                    txn.txn_type.as_str(),
                    txn.amount.to_string(),
                    category_id,
                    payee_id,
                    txn.status,
                    hash,
                    now,
                ])?;
                outcome.inserted += 1;
            }
        }
        tx.commit()?;
        log::info!(
            "Saved {} imported transactions ({} skipped)",
            outcome.inserted,
            outcome.skipped
        );
        Ok(outcome)
    }

    /// Record a transfer as an EXPENSE on the source and an INCOME on the
    /// destination, sharing one transfer id. Both legs or neither are written.
    pub(crate) fn create_transfer(&mut self, req: &TransferRequest) -> Result<i64> {
        if req.from_account_id == req.to_account_id {
            return Err(TransferError::SameAccount.into());
        }
        if req.amount <= Decimal::ZERO {
            return Err(TransferError::NonPositiveAmount.into());
        }
        for id in [req.from_account_id, req.to_account_id] {
            if !self.account_exists(id)? {
                return Err(TransferError::UnknownAccount(id).into());
            }
        }

        let date = req.date.format("%Y-%m-%d").to_string();
        let out_hash = compute_hash(
            req.from_account_id,
            &date,
            &req.description,
            &req.amount,
            "TRANSFER_OUT",
        );
        let in_hash = compute_hash(
            req.to_account_id,
            &date,
            &req.description,
            &req.amount,
            "TRANSFER_IN",
        );

        let now = chrono::Utc::now().to_rfc3339();
        let tx = self.conn.transaction()?;
        let duplicate: bool = tx.query_row(
            "SELECT EXISTS(SELECT 1 FROM transactions WHERE import_hash IN (?1, ?2))",
            params![out_hash, in_hash],
            |row| row.get(0),
        )?;
        if duplicate {
            return Err(TransferError::Duplicate.into());
        }

        tx.execute("INSERT INTO transfers (created_at) VALUES (?1)", params![now])?;
        let transfer_id = tx.last_insert_rowid();
        let legs = [
            (req.from_account_id, TxnType::Expense, &out_hash),
            (req.to_account_id, TxnType::Income, &in_hash),
        ];
        for (account_id, txn_type, hash) in legs {
            tx.execute(
                "INSERT INTO transactions (account_id, date, description, txn_type, amount, category_id, payee_id, status, transfer_id, import_hash, created_at)
                 VALUES (?1, ?2, ?3, ?4, ?5, NULL, NULL, 'CLEARED', ?6, ?7, ?8)",
                params![
                    account_id,
                    date,
                    req.description,
                    txn_type.as_str(),
                    req.amount.to_string(),
                    transfer_id,
                    hash,
                    now,
                ],
            )?;
        }
        tx.commit()?;
        log::info!(
            "Recorded transfer {transfer_id}: {} from account {} to {}",
            req.amount,
            req.from_account_id,
            req.to_account_id
        );
        Ok(transfer_id)
    }

    /// Transactions dated within `[from, to]`, oldest first, optionally for one account.
    pub(crate) fn get_transactions_in_window(
        &self,
        from: NaiveDate,
        to: NaiveDate,
        account_id: Option<i64>,
    ) -> Result<Vec<Transaction>> {
        let sql = format!(
            "SELECT {TXN_COLUMNS} FROM transactions t
             WHERE t.date BETWEEN ?1 AND ?2 AND (?3 IS NULL OR t.account_id = ?3)
             ORDER BY t.date, t.id"
        );
        let mut stmt = self.conn.prepare(&sql)?;
        let rows = stmt.query_map(
            params![
                from.format("%Y-%m-%d").to_string(),
                to.format("%Y-%m-%d").to_string(),
                account_id
            ],
            row_to_transaction,
        )?;
        Ok(rows.collect::<std::result::Result<Vec<_>, _>>()?)
    }

    pub(crate) fn get_transaction_count(&self) -> Result<i64> {
        Ok(self
            .conn
            .query_row("SELECT COUNT(*) FROM transactions", [], |row| row.get(0))?)
    }

    /// Write the transactions of a review window to CSV. Returns the row count.
    pub(crate) fn export_window_to_csv(
        &self,
        path: &Path,
        from: NaiveDate,
        to: NaiveDate,
        account_id: Option<i64>,
    ) -> Result<usize> {
        let mut stmt = self.conn.prepare(
            "SELECT t.date, a.name, t.txn_type, t.amount, t.description,
                    COALESCE(c.name, ''), COALESCE(p.name, ''), t.status,
                    COALESCE(CAST(t.transfer_id AS TEXT), '')
             FROM transactions t
             JOIN accounts a ON t.account_id = a.id
             LEFT JOIN categories c ON t.category_id = c.id
             LEFT JOIN payees p ON t.payee_id = p.id
             WHERE t.date BETWEEN ?1 AND ?2 AND (?3 IS NULL OR t.account_id = ?3)
             ORDER BY t.date, t.id",
        )?;
        let rows = stmt.query_map(
            params![
                from.format("%Y-%m-%d").to_string(),
                to.format("%Y-%m-%d").to_string(),
                account_id
            ],
            |row| {
                let mut record = Vec::with_capacity(9);
                for i in 0..9 {
                    record.push(row.get::<_, String>(i)?);
                }
                Ok(record)
            },
        )?;

        let mut writer = csv::Writer::from_path(path)
            .with_context(|| format!("Failed to create {}", path.display()))?;
        writer.write_record([
            "Date",
            "Account",
            "Type",
            "Amount",
            "Description",
            "Category",
            "Payee",
            "Status",
            "Transfer",
        ])?;
        let mut count = 0;
        for record in rows {
            writer.write_record(&record?)?;
            count += 1;
        }
        writer.flush()?;
        Ok(count)
    }
}

impl TransactionSink for Database {
    fn submit_batch(&mut self, txns: &[NormalizedTransaction]) -> Result<BatchOutcome> {
        self.insert_transactions_batch(txns)
    }

    fn submit_transfer(&mut self, transfer: &TransferRequest) -> Result<()> {
        self.create_transfer(transfer).map(|_| ())
    }
}

/// Stable dedup key for an imported row. Amounts are normalized so `100` and
/// `100.00` hash alike.
fn compute_hash(
    account_id: i64,
    date: &str,
    description: &str,
    amount: &Decimal,
    kind: &str,
) -> String {
    let input = format!(
        "{account_id}|{date}|{}|{}|{kind}",
        description.trim().to_lowercase(),
        amount.normalize()
    );
    let hash = fnv1a(input.as_bytes());
    format!("{hash:016x}")
}

/// FNV-1a (64-bit): stable across Rust releases, unlike `DefaultHasher`.
fn fnv1a(data: &[u8]) -> u64 {
    let mut hash: u64 = 0xcbf29ce484222325;
    for &byte in data {
        hash ^= byte as u64;
        hash = hash.wrapping_mul(0x100000001b3);
    }
    hash
}

#[cfg(test)]
mod tests;
