//! Income, expense and balance totals over a filtered set of transactions.

mod aggregation;
mod endpoint;
mod query;

pub use aggregation::{Summary, summarize};
pub use endpoint::get_summary_endpoint;
pub use query::{SummaryQuery, TransactionFilter, get_matching_transactions};
