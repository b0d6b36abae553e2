//! Transaction CRUD endpoints.

use std::sync::{Arc, Mutex};

use axum::{
    Json,
    extract::{FromRef, Path, State},
    http::StatusCode,
    response::{IntoResponse, Response},
};
use rusqlite::Connection;
use serde_json::json;

use crate::{
    AppState, Error,
    app_state::lock_connection,
    category::{create_category, update_category},
    database_id::parse_id,
    extract::ApiJson,
    transaction::{
        NewTransactionRequest, Transaction, TransactionPatch, TransactionPayload,
        create_transaction, delete_transaction, get_all_resolved_transactions,
        get_resolved_transaction, get_transaction, update_transaction,
    },
};

/// The state needed for the transaction endpoints.
#[derive(Debug, Clone)]
pub struct TransactionState {
    pub db_connection: Arc<Mutex<Connection>>,
}

impl FromRef<AppState> for TransactionState {
    fn from_ref(state: &AppState) -> Self {
        Self {
            db_connection: state.db_connection.clone(),
        }
    }
}

/// List all transactions with their categories as `{"transactions": [...]}`.
pub async fn list_transactions_endpoint(
    State(state): State<TransactionState>,
) -> Result<Response, Error> {
    let connection = lock_connection(&state.db_connection)?;

    let transactions = get_all_resolved_transactions(&connection)?;

    Ok(Json(json!({ "transactions": transactions })).into_response())
}

/// Create a transaction and a new category for it from the embedded category fields.
///
/// A new category is created on every call, existing categories with the same
/// name and type are not reused. The two inserts are not atomic: if the
/// transaction insert fails the new category is left behind.
pub async fn create_transaction_endpoint(
    State(state): State<TransactionState>,
    ApiJson(payload): ApiJson<TransactionPayload>,
) -> Result<Response, Error> {
    let request = NewTransactionRequest::try_from(payload)?;
    let connection = lock_connection(&state.db_connection)?;

    let category = create_category(request.category, &connection)?;
    let builder = Transaction::build(
        request.kind,
        category.id,
        request.amount,
        &request.description,
    )
    .date(request.date);

    let transaction = create_transaction(builder, &connection).inspect_err(|error| {
        tracing::error!(
            "Could not create transaction, category {} was created without a transaction: {error}",
            category.id
        )
    })?;

    Ok((
        StatusCode::CREATED,
        Json(json!({ "createdTransaction": transaction })),
    )
        .into_response())
}

/// Get a single transaction with its category.
pub async fn get_transaction_endpoint(
    Path(transaction_id): Path<String>,
    State(state): State<TransactionState>,
) -> Result<Response, Error> {
    let transaction_id = parse_id(&transaction_id)?;
    let connection = lock_connection(&state.db_connection)?;

    let transaction = get_resolved_transaction(transaction_id, &connection)?;

    Ok(Json(transaction).into_response())
}

/// Update a transaction and, if category fields are given, the category it
/// already refers to.
///
/// Responds with the updated transaction and its category.
pub async fn update_transaction_endpoint(
    Path(transaction_id): Path<String>,
    State(state): State<TransactionState>,
    ApiJson(payload): ApiJson<TransactionPayload>,
) -> Result<Response, Error> {
    let transaction_id = parse_id(&transaction_id)?;
    let patch = TransactionPatch::try_from(payload)?;
    let connection = lock_connection(&state.db_connection)?;

    let transaction = get_transaction(transaction_id, &connection)?;

    if let Some(category_patch) = patch.category.clone() {
        update_category(transaction.category, category_patch, &connection)?;
    }

    update_transaction(transaction_id, &patch, &connection)?;
    let updated = get_resolved_transaction(transaction_id, &connection)?;

    Ok(Json(updated).into_response())
}

/// Delete a transaction. Its category is kept.
pub async fn delete_transaction_endpoint(
    Path(transaction_id): Path<String>,
    State(state): State<TransactionState>,
) -> Result<Response, Error> {
    let transaction_id = parse_id(&transaction_id)?;
    let connection = lock_connection(&state.db_connection)?;

    delete_transaction(transaction_id, &connection)?;
    tracing::info!("Deleted transaction {transaction_id}");

    Ok(Json(json!({ "message": "Transaction deleted successfully" })).into_response())
}
