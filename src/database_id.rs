//! Database ID type definitions.

use crate::Error;

/// Alias for the integer type used for mapping to database IDs.
pub type DatabaseId = i64;
/// Database identifier for a category.
pub type CategoryId = DatabaseId;
/// Database identifier for a transaction.
pub type TransactionId = DatabaseId;

/// Parse an ID taken from a URL path or query string.
///
/// # Errors
/// Returns [Error::MalformedId] if `raw_id` is not an integer.
pub fn parse_id(raw_id: &str) -> Result<DatabaseId, Error> {
    raw_id
        .parse()
        .map_err(|_| Error::MalformedId(raw_id.to_owned()))
}
