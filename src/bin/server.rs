use std::{fs::OpenOptions, net::SocketAddr, sync::Arc};

use axum::{
    Router,
    extract::{MatchedPath, Request},
    middleware,
};
use axum_server::Handle;
use clap::Parser;
use tower_http::trace::TraceLayer;
use tracing_subscriber::{EnvFilter, Layer, filter, layer::SubscriberExt, util::SubscriberInitExt};

use ledger_api::{AppState, build_router, close_db, graceful_shutdown, logging_middleware, open_db};

/// The REST API server for ledger_api.
#[derive(Parser, Debug)]
#[command(version, about, long_about = None)]
struct Args {
    /// Path to the application SQLite database. An in-memory database is used if omitted.
    #[arg(long, env = "DATABASE_URL")]
    database_url: Option<String>,

    /// The port to serve the API from.
    #[arg(short, long, env = "PORT", default_value_t = 3000)]
    port: u16,
}

#[tokio::main]
async fn main() {
    // Loaded first so `RUST_LOG` can also come from the file.
    let env_file = dotenvy::dotenv();
    setup_logging();

    match env_file {
        Ok(path) => tracing::info!("Loaded environment from {}", path.display()),
        Err(error) if error.not_found() => tracing::debug!("No .env file found."),
        Err(error) => tracing::warn!("Could not load .env file: {error}"),
    }

    let args = Args::parse();

    let addr = SocketAddr::from(([0, 0, 0, 0], args.port));

    let connection =
        open_db(args.database_url.as_deref()).expect("Could not open the database.");
    let state = AppState::new(connection).expect("Could not initialize the database.");
    let db_connection = state.db_connection.clone();

    let handle = Handle::new();
    tokio::spawn(graceful_shutdown(handle.clone()));

    let router = add_tracing_layer(
        build_router(state).layer(middleware::from_fn(logging_middleware)),
    );

    tracing::info!("HTTP server listening on {}", addr);
    let result = axum_server::bind(addr)
        .handle(handle)
        .serve(router.into_make_service())
        .await;

    if let Err(error) = result {
        tracing::error!("Server stopped with an error: {error}");
    }

    match close_db(db_connection) {
        Ok(()) => tracing::info!("Closed the database connection."),
        Err(error) => tracing::error!("Could not close the database connection: {error}"),
    }
}

fn setup_logging() {
    let stdout_log = tracing_subscriber::fmt::layer()
        .pretty()
        .with_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")));

    let log_file = OpenOptions::new()
        .create(true)
        .append(true)
        .open("debug.log")
        .expect("Could not create log file");

    let debug_log = tracing_subscriber::fmt::layer()
        .pretty()
        .with_writer(Arc::new(log_file))
        .with_filter(filter::LevelFilter::DEBUG);

    tracing_subscriber::registry()
        .with(stdout_log)
        .with(debug_log)
        .init();
}

fn add_tracing_layer(router: Router) -> Router {
    let tracing_layer = TraceLayer::new_for_http()
        .make_span_with(|req: &Request| {
            let method = req.method();
            let uri = req.uri();

            let matched_path = req
                .extensions()
                .get::<MatchedPath>()
                .map(|matched_path| matched_path.as_str());

            tracing::debug_span!("request", %method, %uri, matched_path)
        })
        // Errors are logged where they are converted into responses.
        .on_failure(());

    router.layer(tracing_layer)
}

#[cfg(test)]
mod tests {
    use std::fs;

    use clap::Parser;

    use super::Args;

    #[test]
    fn args_are_read_from_env_file() {
        let dir = std::env::temp_dir().join(format!("ledger_api_env_{}", std::process::id()));
        fs::create_dir_all(&dir).unwrap();
        let path = dir.join(".env");
        fs::write(&path, "DATABASE_URL=ledger.db\nPORT=4321\n").unwrap();

        dotenvy::from_path_override(&path).unwrap();
        let args = Args::try_parse_from(["server"]).unwrap();

        assert_eq!(args.database_url.as_deref(), Some("ledger.db"));
        assert_eq!(args.port, 4321);
        fs::remove_dir_all(&dir).unwrap();
    }
}
