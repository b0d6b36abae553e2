//! Category CRUD endpoints.

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
    category::{
        CategoryPatch, CategoryPayload, NewCategory, create_category, delete_category,
        get_all_categories, get_category, update_category,
    },
    database_id::parse_id,
    extract::ApiJson,
};

/// The state needed for the category endpoints.
#[derive(Debug, Clone)]
pub struct CategoryState {
    pub db_connection: Arc<Mutex<Connection>>,
}

impl FromRef<AppState> for CategoryState {
    fn from_ref(state: &AppState) -> Self {
        Self {
            db_connection: state.db_connection.clone(),
        }
    }
}

/// Create a category from a `{name, type}` body and respond with 201 and the new category.
pub async fn create_category_endpoint(
    State(state): State<CategoryState>,
    ApiJson(payload): ApiJson<CategoryPayload>,
) -> Result<Response, Error> {
    let new_category = NewCategory::try_from(payload)?;
    let connection = lock_connection(&state.db_connection)?;

    let category = create_category(new_category, &connection)?;

    Ok((StatusCode::CREATED, Json(category)).into_response())
}

/// List all categories.
pub async fn list_categories_endpoint(State(state): State<CategoryState>) -> Result<Response, Error> {
    let connection = lock_connection(&state.db_connection)?;

    let categories = get_all_categories(&connection)?;

    Ok(Json(categories).into_response())
}

/// Get a single category.
pub async fn get_category_endpoint(
    Path(category_id): Path<String>,
    State(state): State<CategoryState>,
) -> Result<Response, Error> {
    let category_id = parse_id(&category_id)?;
    let connection = lock_connection(&state.db_connection)?;

    let category = get_category(category_id, &connection)?;

    Ok(Json(category).into_response())
}

/// Update the fields given in the body and respond with the updated category.
pub async fn update_category_endpoint(
    Path(category_id): Path<String>,
    State(state): State<CategoryState>,
    ApiJson(payload): ApiJson<CategoryPayload>,
) -> Result<Response, Error> {
    let category_id = parse_id(&category_id)?;
    let patch = CategoryPatch::try_from(payload)?;
    let connection = lock_connection(&state.db_connection)?;

    let category = update_category(category_id, patch, &connection)?;

    Ok(Json(category).into_response())
}

/// Delete a category. Transactions referring to it are not touched.
pub async fn delete_category_endpoint(
    Path(category_id): Path<String>,
    State(state): State<CategoryState>,
) -> Result<Response, Error> {
    let category_id = parse_id(&category_id)?;
    let connection = lock_connection(&state.db_connection)?;

    delete_category(category_id, &connection)?;
    tracing::info!("Deleted category {category_id}");

    Ok(Json(json!({ "message": "Category deleted" })).into_response())
}
