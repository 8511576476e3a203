//! Ledger data model.
//!
//! Entries and customers each belong to exactly one user. Amounts are exact
//! decimals and always positive; the direction lives in `TransactionType`.

pub mod date;
pub mod types;

pub use date::BsDate;
pub use types::{
    ConnectionReport, Customer, CustomerUpdate, DeletionReport, NewCustomer, NewTransactionEntry,
    TransactionEntry, TransactionType, TransactionUpdate, UserProfile,
};
