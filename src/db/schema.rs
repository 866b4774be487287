pub(crate) const SCHEMA_V1: &str = r#"
CREATE TABLE IF NOT EXISTS schema_version (
    version INTEGER NOT NULL
);

CREATE TABLE IF NOT EXISTS accounts (
    id           INTEGER PRIMARY KEY AUTOINCREMENT,
    name         TEXT NOT NULL,
    account_type TEXT NOT NULL DEFAULT 'Checking',
    currency     TEXT NOT NULL DEFAULT 'BRL',
    created_at   TEXT NOT NULL
);

CREATE TABLE IF NOT EXISTS categories (
    id   INTEGER PRIMARY KEY AUTOINCREMENT,
    name TEXT NOT NULL UNIQUE
);

CREATE TABLE IF NOT EXISTS payees (
    id   INTEGER PRIMARY KEY AUTOINCREMENT,
    name TEXT NOT NULL UNIQUE
);

CREATE TABLE IF NOT EXISTS transfers (
    id         INTEGER PRIMARY KEY AUTOINCREMENT,
    created_at TEXT NOT NULL
);

CREATE TABLE IF NOT EXISTS transactions (
    id          INTEGER PRIMARY KEY AUTOINCREMENT,
    account_id  INTEGER NOT NULL REFERENCES accounts(id),
    date        TEXT NOT NULL,
    description TEXT NOT NULL,
    txn_type    TEXT NOT NULL CHECK (txn_type IN ('INCOME', 'EXPENSE')),
    amount      TEXT NOT NULL,
    category_id INTEGER REFERENCES categories(id),
    payee_id    INTEGER REFERENCES payees(id),
    status      TEXT NOT NULL DEFAULT 'CLEARED',
    transfer_id INTEGER REFERENCES transfers(id),
    import_hash TEXT NOT NULL DEFAULT '',
    created_at  TEXT NOT NULL
);

CREATE INDEX IF NOT EXISTS idx_transactions_date ON transactions(date);
CREATE INDEX IF NOT EXISTS idx_transactions_account ON transactions(account_id);
CREATE INDEX IF NOT EXISTS idx_transactions_transfer ON transactions(transfer_id);
CREATE UNIQUE INDEX IF NOT EXISTS idx_transactions_hash_unique ON transactions(import_hash) WHERE import_hash != '';

CREATE TABLE IF NOT EXISTS import_profiles (
    name               TEXT PRIMARY KEY,
    delimiter          TEXT NOT NULL DEFAULT 'auto',
    date_order         TEXT NOT NULL DEFAULT 'Y-M-D',
    amount_style       TEXT NOT NULL DEFAULT 'auto',
    type_rule          TEXT NOT NULL DEFAULT 'by-sign',
    default_account_id INTEGER REFERENCES accounts(id) ON DELETE SET NULL
);

CREATE TABLE IF NOT EXISTS import_profile_columns (
    profile_name TEXT NOT NULL REFERENCES import_profiles(name) ON DELETE CASCADE,
    field        TEXT NOT NULL,
    header       TEXT NOT NULL,
    PRIMARY KEY (profile_name, field)
);
"#;

pub(crate) const CURRENT_VERSION: i32 = 1;

/// Migrations from version N to N+1.
/// Each entry is (from_version, sql).
pub(crate) const MIGRATIONS: &[(i32, &str)] = &[];
