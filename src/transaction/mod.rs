//! Transactions: individual incomes and expenses, each referring to one category.

mod db;
mod domain;
mod endpoints;

pub use db::{
    create_transaction, create_transaction_table, delete_transaction,
    get_all_resolved_transactions, get_resolved_transaction, get_transaction, update_transaction,
};
pub(crate) use db::{TRANSACTION_COLUMNS, map_transaction_row};
pub use domain::{
    CategoryRef, NewTransactionRequest, ResolvedTransaction, Transaction, TransactionBuilder,
    TransactionPatch, TransactionPayload,
};
pub use endpoints::{
    TransactionState, create_transaction_endpoint, delete_transaction_endpoint,
    get_transaction_endpoint, list_transactions_endpoint, update_transaction_endpoint,
};
