//! Database queries for transactions.

use rusqlite::{Connection, Row, types::Type};
use time::OffsetDateTime;

use crate::{
    Error,
    category::{Category, CategoryName},
    database_id::TransactionId,
    timestamp::{from_millis, now_millis, to_millis},
    transaction::{CategoryRef, ResolvedTransaction, Transaction, TransactionBuilder, TransactionPatch},
};

/// The transaction columns in the order expected by [map_transaction_row].
pub(crate) const TRANSACTION_COLUMNS: &str = "\"transaction\".id, \"transaction\".type, \
    \"transaction\".category_id, \"transaction\".amount, \"transaction\".description, \
    \"transaction\".date, \"transaction\".created_at, \"transaction\".updated_at";

/// Create a new transaction in the database from a builder.
///
/// The transaction is dated now unless the builder has a date. The category
/// ID is stored as is, it is not checked against the category table.
///
/// # Errors
/// This function will return a [Error::SqlError] if there is an SQL error.
pub fn create_transaction(
    builder: TransactionBuilder,
    connection: &Connection,
) -> Result<Transaction, Error> {
    let now = now_millis();
    let date = builder.date.unwrap_or(now);

    let transaction = connection
        .prepare(&format!(
            "INSERT INTO \"transaction\" (type, category_id, amount, description, date, created_at, updated_at)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?6)
             RETURNING {TRANSACTION_COLUMNS}"
        ))?
        .query_row(
            (
                builder.kind,
                builder.category,
                builder.amount,
                builder.description,
                to_millis(date),
                to_millis(now),
            ),
            map_transaction_row,
        )?;

    Ok(transaction)
}

/// Retrieve a transaction from the database by its `id`, without looking up its category.
///
/// # Errors
/// This function will return a:
/// - [Error::MissingTransaction] if `id` does not refer to a valid transaction,
/// - or [Error::SqlError] there is some other SQL error.
pub fn get_transaction(id: TransactionId, connection: &Connection) -> Result<Transaction, Error> {
    connection
        .prepare(&format!(
            "SELECT {TRANSACTION_COLUMNS} FROM \"transaction\" WHERE id = :id"
        ))?
        .query_row(&[(":id", &id)], map_transaction_row)
        .map_err(|error| missing_transaction_or(id, error))
}

/// Retrieve a transaction together with its category.
///
/// # Errors
/// This function will return a:
/// - [Error::MissingTransaction] if `id` does not refer to a valid transaction,
/// - or [Error::SqlError] there is some other SQL error.
pub fn get_resolved_transaction(
    id: TransactionId,
    connection: &Connection,
) -> Result<ResolvedTransaction, Error> {
    connection
        .prepare(&format!(
            "SELECT {TRANSACTION_COLUMNS}, category.id, category.name, category.type \
            FROM \"transaction\" \
            LEFT JOIN category ON \"transaction\".category_id = category.id \
            WHERE \"transaction\".id = :id"
        ))?
        .query_row(&[(":id", &id)], map_resolved_transaction_row)
        .map_err(|error| missing_transaction_or(id, error))
}

/// Retrieve all transactions together with their categories, ordered by ID.
pub fn get_all_resolved_transactions(
    connection: &Connection,
) -> Result<Vec<ResolvedTransaction>, Error> {
    connection
        .prepare(&format!(
            "SELECT {TRANSACTION_COLUMNS}, category.id, category.name, category.type \
            FROM \"transaction\" \
            LEFT JOIN category ON \"transaction\".category_id = category.id \
            ORDER BY \"transaction\".id ASC"
        ))?
        .query_map([], map_resolved_transaction_row)?
        .map(|maybe_transaction| maybe_transaction.map_err(|error| error.into()))
        .collect()
}

/// Update the type, amount, description and date of a transaction where they
/// are set in `patch`, and bump its `updated_at` time.
///
/// Category changes in `patch` are ignored, use
/// [update_category](crate::category::update_category) for those.
///
/// # Errors
/// This function will return a:
/// - [Error::MissingTransaction] if `id` does not refer to a valid transaction,
/// - or [Error::SqlError] there is some other SQL error.
pub fn update_transaction(
    id: TransactionId,
    patch: &TransactionPatch,
    connection: &Connection,
) -> Result<(), Error> {
    let rows_affected = connection.execute(
        "UPDATE \"transaction\" SET
            type = COALESCE(?1, type),
            amount = COALESCE(?2, amount),
            description = COALESCE(?3, description),
            date = COALESCE(?4, date),
            updated_at = ?5
        WHERE id = ?6",
        (
            patch.kind,
            patch.amount,
            patch.description.as_deref(),
            patch.date.map(to_millis),
            to_millis(now_millis()),
            id,
        ),
    )?;

    if rows_affected == 0 {
        return Err(Error::MissingTransaction(id));
    }

    Ok(())
}

/// Delete a transaction. Its category is left in place.
///
/// # Errors
/// This function will return a:
/// - [Error::MissingTransaction] if `id` does not refer to a valid transaction,
/// - or [Error::SqlError] there is some other SQL error.
pub fn delete_transaction(id: TransactionId, connection: &Connection) -> Result<(), Error> {
    let rows_affected = connection.execute("DELETE FROM \"transaction\" WHERE id = ?1", [id])?;

    if rows_affected == 0 {
        return Err(Error::MissingTransaction(id));
    }

    Ok(())
}

/// Create the transaction table in the database.
///
/// There is no foreign key on `category_id`, so deleting a category
/// leaves its transactions in place.
///
/// # Errors
/// Returns an error if the table cannot be created or if there is an SQL error.
pub fn create_transaction_table(connection: &Connection) -> Result<(), rusqlite::Error> {
    connection.execute(
        "CREATE TABLE IF NOT EXISTS \"transaction\" (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                type TEXT NOT NULL CHECK (type IN ('income', 'expense')),
                category_id INTEGER NOT NULL,
                amount REAL NOT NULL,
                description TEXT NOT NULL,
                date INTEGER NOT NULL,
                created_at INTEGER NOT NULL,
                updated_at INTEGER NOT NULL
                )",
        (),
    )?;

    // Index used by the summary filters.
    connection.execute(
        "CREATE INDEX IF NOT EXISTS idx_transaction_date_category ON \"transaction\"(date, category_id);",
        (),
    )?;

    Ok(())
}

/// Map a database row to a Transaction.
pub(crate) fn map_transaction_row(row: &Row) -> Result<Transaction, rusqlite::Error> {
    let id = row.get(0)?;
    let kind = row.get(1)?;
    let category = row.get(2)?;
    let amount = row.get(3)?;
    let description = row.get(4)?;
    let date = get_timestamp(row, 5)?;
    let created_at = get_timestamp(row, 6)?;
    let updated_at = get_timestamp(row, 7)?;

    Ok(Transaction {
        id,
        kind,
        category,
        amount,
        description,
        date,
        created_at,
        updated_at,
    })
}

fn map_resolved_transaction_row(row: &Row) -> Result<ResolvedTransaction, rusqlite::Error> {
    let transaction = map_transaction_row(row)?;

    let category = match row.get::<usize, Option<i64>>(8)? {
        Some(category_id) => {
            let raw_name: String = row.get(9)?;

            CategoryRef::Resolved(Category {
                id: category_id,
                name: CategoryName::new_unchecked(&raw_name),
                kind: row.get(10)?,
            })
        }
        None => {
            tracing::warn!(
                "Transaction {} refers to category {} which does not exist",
                transaction.id,
                transaction.category
            );
            CategoryRef::missing(transaction.category)
        }
    };

    Ok(ResolvedTransaction {
        id: transaction.id,
        kind: transaction.kind,
        category,
        amount: transaction.amount,
        description: transaction.description,
        date: transaction.date,
        created_at: transaction.created_at,
        updated_at: transaction.updated_at,
    })
}

fn get_timestamp(row: &Row, index: usize) -> Result<OffsetDateTime, rusqlite::Error> {
    let millis: i64 = row.get(index)?;

    from_millis(millis).map_err(|error| {
        rusqlite::Error::FromSqlConversionFailure(index, Type::Integer, Box::new(error))
    })
}

fn missing_transaction_or(id: TransactionId, error: rusqlite::Error) -> Error {
    match Error::from(error) {
        Error::NotFound => Error::MissingTransaction(id),
        error => error,
    }
}

#[cfg(test)]
mod database_tests {
    use rusqlite::Connection;
    use time::macros::datetime;

    use crate::{
        Error,
        category::{CategoryName, CategoryPatch, NewCategory, create_category, delete_category},
        db::initialize,
        entry_type::EntryType,
        transaction::{
            CategoryRef, Transaction, TransactionPatch, create_transaction, delete_transaction,
            get_all_resolved_transactions, get_resolved_transaction, get_transaction,
            update_transaction,
        },
    };

    fn get_test_connection() -> Connection {
        let conn = Connection::open_in_memory().unwrap();
        initialize(&conn).unwrap();
        conn
    }

    fn create_test_category(conn: &Connection) -> crate::category::Category {
        create_category(
            NewCategory {
                name: CategoryName::new_unchecked("Job"),
                kind: EntryType::Income,
            },
            conn,
        )
        .expect("Could not create category")
    }

    #[test]
    fn create_succeeds() {
        let conn = get_test_connection();
        let category = create_test_category(&conn);
        let date = datetime!(2024-01-15 09:00 UTC);

        let transaction = create_transaction(
            Transaction::build(EntryType::Income, category.id, 500.0, "salary").date(Some(date)),
            &conn,
        )
        .expect("Could not create transaction");

        assert!(transaction.id > 0);
        assert_eq!(transaction.kind, EntryType::Income);
        assert_eq!(transaction.category, category.id);
        assert_eq!(transaction.amount, 500.0);
        assert_eq!(transaction.description, "salary");
        assert_eq!(transaction.date, date);
        assert_eq!(transaction.created_at, transaction.updated_at);
    }

    #[test]
    fn create_defaults_date_to_now() {
        let conn = get_test_connection();
        let category = create_test_category(&conn);

        let transaction = create_transaction(
            Transaction::build(EntryType::Income, category.id, 1.0, "tip"),
            &conn,
        )
        .expect("Could not create transaction");

        assert_eq!(transaction.date, transaction.created_at);
    }

    #[test]
    fn get_transaction_succeeds() {
        let conn = get_test_connection();
        let category = create_test_category(&conn);
        let inserted = create_transaction(
            Transaction::build(EntryType::Expense, category.id, 12.3, "lunch"),
            &conn,
        )
        .expect("Could not create transaction");

        let selected = get_transaction(inserted.id, &conn);

        assert_eq!(selected, Ok(inserted));
    }

    #[test]
    fn get_missing_transaction() {
        let conn = get_test_connection();

        assert_eq!(get_transaction(42, &conn), Err(Error::MissingTransaction(42)));
        assert_eq!(
            get_resolved_transaction(42, &conn),
            Err(Error::MissingTransaction(42))
        );
    }

    #[test]
    fn resolved_transaction_includes_category() {
        let conn = get_test_connection();
        let category = create_test_category(&conn);
        let transaction = create_transaction(
            Transaction::build(EntryType::Income, category.id, 500.0, "salary"),
            &conn,
        )
        .expect("Could not create transaction");

        let resolved =
            get_resolved_transaction(transaction.id, &conn).expect("Could not get transaction");

        assert_eq!(resolved.category, CategoryRef::Resolved(category));
        assert_eq!(resolved.amount, transaction.amount);
    }

    #[test]
    fn deleted_category_is_reported_as_missing() {
        let conn = get_test_connection();
        let category = create_test_category(&conn);
        let transaction = create_transaction(
            Transaction::build(EntryType::Income, category.id, 500.0, "salary"),
            &conn,
        )
        .expect("Could not create transaction");
        delete_category(category.id, &conn).expect("Could not delete category");

        let resolved =
            get_resolved_transaction(transaction.id, &conn).expect("Could not get transaction");

        assert_eq!(resolved.category, CategoryRef::missing(category.id));
    }

    #[test]
    fn get_all_resolved_transactions_succeeds() {
        let conn = get_test_connection();
        let category = create_test_category(&conn);
        for i in 1..=3 {
            create_transaction(
                Transaction::build(EntryType::Income, category.id, i as f64, "pay"),
                &conn,
            )
            .expect("Could not create transaction");
        }

        let transactions = get_all_resolved_transactions(&conn).expect("Could not get transactions");

        let amounts: Vec<f64> = transactions.iter().map(|t| t.amount).collect();
        assert_eq!(amounts, vec![1.0, 2.0, 3.0]);
    }

    #[test]
    fn update_changes_only_given_fields() {
        let conn = get_test_connection();
        let category = create_test_category(&conn);
        let transaction = create_transaction(
            Transaction::build(EntryType::Income, category.id, 500.0, "salary")
                .date(Some(datetime!(2024-01-15 00:00 UTC))),
            &conn,
        )
        .expect("Could not create transaction");

        update_transaction(
            transaction.id,
            &TransactionPatch {
                amount: Some(650.0),
                date: Some(datetime!(2024-02-15 00:00 UTC)),
                ..Default::default()
            },
            &conn,
        )
        .expect("Could not update transaction");

        let updated = get_transaction(transaction.id, &conn).expect("Could not get transaction");
        assert_eq!(updated.amount, 650.0);
        assert_eq!(updated.date, datetime!(2024-02-15 00:00 UTC));
        assert_eq!(updated.kind, transaction.kind);
        assert_eq!(updated.description, transaction.description);
        assert_eq!(updated.created_at, transaction.created_at);
        assert!(updated.updated_at >= transaction.updated_at);
    }

    #[test]
    fn update_ignores_category_changes() {
        let conn = get_test_connection();
        let category = create_test_category(&conn);
        let transaction = create_transaction(
            Transaction::build(EntryType::Income, category.id, 500.0, "salary"),
            &conn,
        )
        .expect("Could not create transaction");

        update_transaction(
            transaction.id,
            &TransactionPatch {
                category: Some(CategoryPatch {
                    name: Some(CategoryName::new_unchecked("Other")),
                    kind: None,
                }),
                ..Default::default()
            },
            &conn,
        )
        .expect("Could not update transaction");

        let resolved =
            get_resolved_transaction(transaction.id, &conn).expect("Could not get transaction");
        assert_eq!(resolved.category, CategoryRef::Resolved(category));
    }

    #[test]
    fn update_missing_transaction() {
        let conn = get_test_connection();

        let result = update_transaction(7, &TransactionPatch::default(), &conn);

        assert_eq!(result, Err(Error::MissingTransaction(7)));
    }

    #[test]
    fn delete_keeps_category() {
        let conn = get_test_connection();
        let category = create_test_category(&conn);
        let transaction = create_transaction(
            Transaction::build(EntryType::Income, category.id, 500.0, "salary"),
            &conn,
        )
        .expect("Could not create transaction");

        delete_transaction(transaction.id, &conn).expect("Could not delete transaction");

        assert_eq!(
            get_transaction(transaction.id, &conn),
            Err(Error::MissingTransaction(transaction.id))
        );
        assert_eq!(crate::category::get_category(category.id, &conn), Ok(category));
    }

    #[test]
    fn delete_missing_transaction() {
        let conn = get_test_connection();

        assert_eq!(
            delete_transaction(7, &conn),
            Err(Error::MissingTransaction(7))
        );
    }
}
