//! Folds transactions into income and expense totals.

use serde::{Deserialize, Serialize};

use crate::{entry_type::EntryType, transaction::Transaction};

/// Income and expense totals over a set of transactions.
#[derive(Debug, Default, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Summary {
    /// The sum of the amounts of income transactions.
    pub total_income: f64,
    /// The sum of the amounts of expense transactions.
    pub total_expenses: f64,
    /// `total_income - total_expenses`.
    pub balance: f64,
}

/// Sum the amounts of income and expense transactions.
///
/// Amounts are added as they are, e.g. a negative income amount reduces the
/// income total. Returns all zeros for an empty slice.
pub fn summarize(transactions: &[Transaction]) -> Summary {
    let (total_income, total_expenses) =
        transactions
            .iter()
            .fold((0.0, 0.0), |(income, expenses), transaction| {
                match transaction.kind {
                    EntryType::Income => (income + transaction.amount, expenses),
                    EntryType::Expense => (income, expenses + transaction.amount),
                }
            });

    Summary {
        total_income,
        total_expenses,
        balance: total_income - total_expenses,
    }
}
