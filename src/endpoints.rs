//! The API endpoint URIs.
//!
//! For endpoints that take a parameter, e.g., '/api/categories/{category_id}', use [format_endpoint].

/// The route to list and create categories.
pub const CATEGORIES: &str = "/api/categories";
/// The route to get, update and delete a single category.
pub const CATEGORY: &str = "/api/categories/{category_id}";
/// The route to list and create transactions.
pub const TRANSACTIONS: &str = "/api/transactions";
/// The route to get, update and delete a single transaction.
pub const TRANSACTION: &str = "/api/transactions/{transaction_id}";
/// The route for the income/expense summary over all matching transactions.
pub const TRANSACTION_SUMMARY: &str = "/api/transactions/summary/all";

/// Replace the first parameter in `endpoint_path` with `id`.
///
/// ```
/// use ledger_api::endpoints::{CATEGORY, format_endpoint};
///
/// assert_eq!(format_endpoint(CATEGORY, 42), "/api/categories/42");
/// ```
pub fn format_endpoint(endpoint_path: &str, id: impl std::fmt::Display) -> String {
    let param_start = match endpoint_path.find('{') {
        Some(start) => start,
        None => return endpoint_path.to_string(),
    };

    let param_end = endpoint_path[param_start..]
        .find('}')
        .map(|end| param_start + end + 1)
        .unwrap_or(endpoint_path.len());

    format!(
        "{}{}{}",
        &endpoint_path[..param_start],
        id,
        &endpoint_path[param_end..]
    )
}
