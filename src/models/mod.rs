mod account;
mod category;
mod transaction;

pub use account::{Account, AccountType};
pub use category::{Category, Payee};
pub use transaction::{Transaction, TxnType};

#[cfg(test)]
mod tests;
