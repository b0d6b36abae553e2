//! A REST API for personal bookkeeping.
//!
//! Incomes and expenses are recorded as transactions, each belonging to a
//! category, and can be summarised into total income, total expenses and the
//! resulting balance. Data is stored in a SQLite database.

#![warn(missing_docs)]

use std::{net::SocketAddr, time::Duration};

use axum_server::Handle;
use tokio::signal;

mod app_state;
mod category;
mod database_id;
mod db;
pub mod endpoints;
mod entry_type;
mod error;
mod extract;
mod logging;
mod routing;
mod summary;
mod timestamp;
mod transaction;

pub use app_state::AppState;
pub use category::{Category, CategoryName};
pub use database_id::{CategoryId, DatabaseId, TransactionId};
pub use db::{close as close_db, initialize as initialize_db, open as open_db};
pub use entry_type::EntryType;
pub use error::Error;
pub use logging::{LOG_BODY_LENGTH_LIMIT, logging_middleware};
pub use routing::build_router;
pub use summary::Summary;
pub use transaction::{CategoryRef, ResolvedTransaction, Transaction};

/// An async task that waits for either the ctrl+c or terminate signal, whichever comes first, and
/// then signals the server to shut down gracefully.
///
/// `handle` is a handle to an Axum `Server`.
pub async fn graceful_shutdown(handle: Handle<SocketAddr>) {
    let ctrl_c = async {
        if let Err(error) = signal::ctrl_c().await {
            tracing::error!("Failed to install Ctrl+C handler: {error}");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut terminate) => {
                terminate.recv().await;
            }
            Err(error) => {
                tracing::error!("Failed to install terminate signal handler: {error}");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            tracing::debug!("Received ctrl+c signal.");
            handle.graceful_shutdown(Some(Duration::from_secs(1)));
        },
        _ = terminate => {
            tracing::debug!("Received terminate signal.");
            handle.graceful_shutdown(Some(Duration::from_secs(1)));
        },
    }
}
