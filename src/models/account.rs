#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AccountType {
    Checking,
    Savings,
    CreditCard,
    Investment,
    Cash,
    Other,
}

impl AccountType {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Checking => "Checking",
            Self::Savings => "Savings",
            Self::CreditCard => "Credit Card",
            Self::Investment => "Investment",
            Self::Cash => "Cash",
            Self::Other => "Other",
        }
    }

    pub fn parse(s: &str) -> Self {
        match s.trim().to_lowercase().as_str() {
            "checking" | "corrente" => Self::Checking,
            "savings" | "poupanca" | "poupança" => Self::Savings,
            "credit card" | "creditcard" | "credit" | "cartao" | "cartão" => Self::CreditCard,
            "investment" => Self::Investment,
            "cash" | "wallet" => Self::Cash,
            _ => Self::Other,
        }
    }

    pub fn all() -> &'static [AccountType] {
        &[
            Self::Checking,
            Self::Savings,
            Self::CreditCard,
            Self::Investment,
            Self::Cash,
            Self::Other,
        ]
    }
}

impl std::fmt::Display for AccountType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

#[derive(Debug, Clone)]
pub struct Account {
    pub id: Option<i64>,
    pub name: String,
    pub account_type: AccountType,
    pub currency: String,
    pub created_at: String,
}

impl Account {
    pub fn new(name: String, account_type: AccountType) -> Self {
        Self {
            id: None,
            name,
            account_type,
            currency: "BRL".to_string(),
            created_at: chrono::Utc::now().to_rfc3339(),
        }
    }
}
