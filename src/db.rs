//! Opening, initialising and closing the application's SQLite database.

use std::sync::{Arc, Mutex};

use rusqlite::{Connection, Transaction as SqlTransaction};

use crate::{Error, category::create_category_table, transaction::create_transaction_table};

/// Open the database at `database_url`, or an in-memory database if no URL was configured.
///
/// # Errors
/// Returns an error if the database file cannot be opened.
pub fn open(database_url: Option<&str>) -> Result<Connection, Error> {
    let connection = match database_url {
        Some(url) => Connection::open(url)?,
        None => {
            tracing::error!(
                "No database URL was configured, falling back to an in-memory database. \
                Data will be lost when the server stops."
            );
            Connection::open_in_memory()?
        }
    };

    Ok(connection)
}

/// Create the tables for the domain models.
///
/// The tables are created inside a single exclusive transaction so that a
/// partially initialised database is never left behind.
///
/// # Errors
/// Returns an error if there is an SQL error.
pub fn initialize(connection: &Connection) -> Result<(), Error> {
    let transaction =
        SqlTransaction::new_unchecked(connection, rusqlite::TransactionBehavior::Exclusive)?;

    create_category_table(&transaction)?;
    create_transaction_table(&transaction)?;

    transaction.commit()?;

    Ok(())
}

/// Close the shared database connection once the server has stopped.
///
/// If another handle to the connection is still alive, the connection is left
/// open and will be closed when the last handle is dropped.
///
/// # Errors
/// Returns an error if SQLite reports an error while closing.
pub fn close(db_connection: Arc<Mutex<Connection>>) -> Result<(), Error> {
    let connection = match Arc::try_unwrap(db_connection) {
        Ok(mutex) => mutex.into_inner().map_err(|_| Error::DatabaseLockError)?,
        Err(_) => {
            tracing::warn!("The database connection is still in use and was not closed explicitly.");
            return Ok(());
        }
    };

    connection.close().map_err(|(_, error)| error.into())
}
