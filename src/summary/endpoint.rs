//! The summary endpoint.

use axum::{
    Json,
    extract::State,
    response::{IntoResponse, Response},
};

use crate::{
    Error,
    app_state::lock_connection,
    extract::ApiQuery,
    summary::{SummaryQuery, TransactionFilter, get_matching_transactions, summarize},
    transaction::TransactionState,
};

/// The state needed for the summary endpoint.
pub type SummaryState = TransactionState;

/// Respond with the income, expense and balance totals of the transactions
/// matching the optional `startDate`/`endDate` range and `category`.
pub async fn get_summary_endpoint(
    State(state): State<SummaryState>,
    ApiQuery(query): ApiQuery<SummaryQuery>,
) -> Result<Response, Error> {
    let filter = TransactionFilter::try_from(query)?;
    let connection = lock_connection(&state.db_connection)?;

    let transactions = get_matching_transactions(&filter, &connection)?;
    let summary = summarize(&transactions);
    tracing::debug!(
        "Summarised {} transactions with {filter:?}: {summary:?}",
        transactions.len()
    );

    Ok(Json(summary).into_response())
}
