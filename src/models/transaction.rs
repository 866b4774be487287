use rust_decimal::Decimal;

/// Direction of a ledger entry. Amounts are stored unsigned; the sign lives here.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TxnType {
    Income,
    Expense,
}

impl TxnType {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Income => "INCOME",
            Self::Expense => "EXPENSE",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s.trim().to_uppercase().as_str() {
            "INCOME" => Some(Self::Income),
            "EXPENSE" => Some(Self::Expense),
            _ => None,
        }
    }
}

impl std::fmt::Display for TxnType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

#[derive(Debug, Clone)]
pub struct Transaction {
    pub id: Option<i64>,
    pub account_id: i64,
    pub date: String,
    pub description: String,
    pub txn_type: TxnType,
    pub amount: Decimal,
    pub category_id: Option<i64>,
    pub payee_id: Option<i64>,
    pub status: String,
    /// Shared by both legs of a transfer.
    pub transfer_id: Option<i64>,
    pub import_hash: String,
    pub created_at: String,
}

impl Transaction {
    pub fn is_transfer(&self) -> bool {
        self.transfer_id.is_some()
    }

    /// Amount with the direction applied: expenses come back negative.
    pub fn signed_amount(&self) -> Decimal {
        match self.txn_type {
            TxnType::Income => self.amount,
            TxnType::Expense => -self.amount,
        }
    }
}
