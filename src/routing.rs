//! Application router configuration.

use axum::{
    Json, Router,
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::get,
};
use serde_json::json;
use tower_http::cors::CorsLayer;

use crate::{
    AppState,
    category::{
        create_category_endpoint, delete_category_endpoint, get_category_endpoint,
        list_categories_endpoint, update_category_endpoint,
    },
    endpoints,
    summary::get_summary_endpoint,
    transaction::{
        create_transaction_endpoint, delete_transaction_endpoint, get_transaction_endpoint,
        list_transactions_endpoint, update_transaction_endpoint,
    },
};

/// Return a router with all the app's routes.
///
/// Any origin may call the API.
pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route(
            endpoints::CATEGORIES,
            get(list_categories_endpoint).post(create_category_endpoint),
        )
        .route(
            endpoints::CATEGORY,
            get(get_category_endpoint)
                .put(update_category_endpoint)
                .delete(delete_category_endpoint),
        )
        .route(
            endpoints::TRANSACTIONS,
            get(list_transactions_endpoint).post(create_transaction_endpoint),
        )
        // Registered as a static path, which axum matches before the `{transaction_id}` capture.
        .route(endpoints::TRANSACTION_SUMMARY, get(get_summary_endpoint))
        .route(
            endpoints::TRANSACTION,
            get(get_transaction_endpoint)
                .put(update_transaction_endpoint)
                .delete(delete_transaction_endpoint),
        )
        .fallback(get_404_not_found)
        .method_not_allowed_fallback(get_405_method_not_allowed)
        .layer(CorsLayer::permissive())
        .with_state(state)
}

async fn get_404_not_found() -> Response {
    (
        StatusCode::NOT_FOUND,
        Json(json!({ "message": "Route not found" })),
    )
        .into_response()
}

async fn get_405_method_not_allowed() -> Response {
    (
        StatusCode::METHOD_NOT_ALLOWED,
        Json(json!({ "message": "Method not allowed" })),
    )
        .into_response()
}

#[cfg(test)]
mod routing_tests {
    use axum::http::{HeaderValue, StatusCode, header};
    use axum_test::TestServer;
    use rusqlite::Connection;
    use serde_json::{Value, json};

    use crate::{AppState, endpoints};

    use super::build_router;

    fn get_test_server() -> TestServer {
        let connection =
            Connection::open_in_memory().expect("Could not open in-memory SQLite database");
        let state = AppState::new(connection).expect("Could not create app state");

        TestServer::try_new(build_router(state)).expect("Could not create test server.")
    }

    #[tokio::test]
    async fn unknown_route_returns_json_404() {
        let server = get_test_server();

        let response = server.get("/api/budgets").await;

        response.assert_status_not_found();
        assert_eq!(
            response.json::<Value>(),
            json!({ "message": "Route not found" })
        );
    }

    #[tokio::test]
    async fn wrong_method_returns_json_405() {
        let server = get_test_server();

        let response = server.patch(endpoints::CATEGORIES).await;

        response.assert_status(StatusCode::METHOD_NOT_ALLOWED);
        assert_eq!(
            response.json::<Value>(),
            json!({ "message": "Method not allowed" })
        );
    }

    #[tokio::test]
    async fn responses_allow_any_origin() {
        let server = get_test_server();

        let response = server
            .get(endpoints::CATEGORIES)
            .add_header(header::ORIGIN, HeaderValue::from_static("http://localhost:5173"))
            .await;

        response.assert_status_ok();
        assert_eq!(
            response.header(header::ACCESS_CONTROL_ALLOW_ORIGIN),
            HeaderValue::from_static("*")
        );
    }
}
