//! Query string parsing and database filtering for the summary endpoint.

use rusqlite::Connection;
use serde::{Deserialize, Serialize};
use time::OffsetDateTime;

use crate::{
    Error,
    database_id::{CategoryId, parse_id},
    timestamp::{parse_timestamp, to_millis},
    transaction::{TRANSACTION_COLUMNS, Transaction, map_transaction_row},
};

/// The raw summary query string, e.g. `?startDate=2024-01-01&endDate=2024-01-31&category=3`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SummaryQuery {
    pub start_date: Option<String>,
    pub end_date: Option<String>,
    pub category: Option<String>,
}

/// An inclusive date range.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DateRange {
    pub start: OffsetDateTime,
    pub end: OffsetDateTime,
}

/// Which transactions to include in a summary. `None` means no filtering on that field.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TransactionFilter {
    pub date_range: Option<DateRange>,
    pub category: Option<CategoryId>,
}

impl TryFrom<SummaryQuery> for TransactionFilter {
    type Error = Error;

    /// Parse the query string parameters.
    ///
    /// The date range is only used when both `startDate` and `endDate` are
    /// given. A lone bound is ignored and is not parsed. Empty parameters are
    /// treated as absent.
    ///
    /// # Errors
    /// Returns [Error::InvalidDate] for a date that cannot be parsed, or
    /// [Error::MalformedId] for a category that is not an integer.
    fn try_from(query: SummaryQuery) -> Result<Self, Self::Error> {
        let non_empty = |value: Option<String>| value.filter(|value| !value.is_empty());

        let date_range = match (non_empty(query.start_date), non_empty(query.end_date)) {
            (Some(start), Some(end)) => Some(DateRange {
                start: parse_query_date(&start)?,
                end: parse_query_date(&end)?,
            }),
            _ => None,
        };

        let category = non_empty(query.category)
            .map(|category| parse_id(&category))
            .transpose()?;

        Ok(Self {
            date_range,
            category,
        })
    }
}

fn parse_query_date(text: &str) -> Result<OffsetDateTime, Error> {
    parse_timestamp(text).ok_or_else(|| Error::InvalidDate(text.to_owned()))
}

/// Get the transactions matching every filter that is set.
///
/// # Errors
/// Returns [Error::SqlError] if the query fails.
pub fn get_matching_transactions(
    filter: &TransactionFilter,
    connection: &Connection,
) -> Result<Vec<Transaction>, Error> {
    let (start, end) = match filter.date_range {
        Some(range) => (Some(to_millis(range.start)), Some(to_millis(range.end))),
        None => (None, None),
    };

    connection
        .prepare(&format!(
            "SELECT {TRANSACTION_COLUMNS} FROM \"transaction\" \
            WHERE (?1 IS NULL OR date BETWEEN ?1 AND ?2) \
            AND (?3 IS NULL OR category_id = ?3)"
        ))?
        .query_map((start, end, filter.category), map_transaction_row)?
        .map(|transaction_result| transaction_result.map_err(Error::from))
        .collect()
}
