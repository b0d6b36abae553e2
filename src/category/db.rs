//! Database operations for categories.

use rusqlite::{Connection, Row};

use crate::{
    Error,
    category::{Category, CategoryName, CategoryPatch, NewCategory},
    database_id::CategoryId,
};

/// Create a category and return it with its generated ID.
///
/// A new row is always inserted, even if a category with the same name and
/// type already exists.
pub fn create_category(new_category: NewCategory, connection: &Connection) -> Result<Category, Error> {
    connection
        .prepare("INSERT INTO category (name, type) VALUES (?1, ?2) RETURNING id, name, type;")?
        .query_row(
            (new_category.name.as_ref(), new_category.kind),
            map_category_row,
        )
        .map_err(|error| error.into())
}

/// Retrieve a single category by ID.
///
/// # Errors
/// Returns [Error::MissingCategory] if `category_id` does not refer to a category.
pub fn get_category(category_id: CategoryId, connection: &Connection) -> Result<Category, Error> {
    connection
        .prepare("SELECT id, name, type FROM category WHERE id = :id;")?
        .query_row(&[(":id", &category_id)], map_category_row)
        .map_err(|error| missing_category_or(category_id, error))
}

/// Retrieve all categories ordered by ID.
pub fn get_all_categories(connection: &Connection) -> Result<Vec<Category>, Error> {
    connection
        .prepare("SELECT id, name, type FROM category ORDER BY id ASC;")?
        .query_map([], map_category_row)?
        .map(|maybe_category| maybe_category.map_err(|error| error.into()))
        .collect()
}

/// Apply the fields set in `patch` to a category and return the updated category.
///
/// An empty patch leaves the category unchanged.
///
/// # Errors
/// Returns [Error::MissingCategory] if `category_id` does not refer to a category.
pub fn update_category(
    category_id: CategoryId,
    patch: CategoryPatch,
    connection: &Connection,
) -> Result<Category, Error> {
    connection
        .prepare(
            "UPDATE category SET name = COALESCE(?1, name), type = COALESCE(?2, type)
             WHERE id = ?3
             RETURNING id, name, type;",
        )?
        .query_row(
            (
                patch.name.as_ref().map(|name| name.as_ref()),
                patch.kind,
                category_id,
            ),
            map_category_row,
        )
        .map_err(|error| missing_category_or(category_id, error))
}

/// Delete a category by ID.
///
/// Transactions that reference the category are left untouched and will point
/// to a category that no longer exists.
///
/// # Errors
/// Returns [Error::MissingCategory] if `category_id` does not refer to a category.
pub fn delete_category(category_id: CategoryId, connection: &Connection) -> Result<(), Error> {
    let rows_affected = connection.execute("DELETE FROM category WHERE id = ?1", [category_id])?;

    if rows_affected == 0 {
        return Err(Error::MissingCategory(category_id));
    }

    Ok(())
}

/// Initialize the category table.
pub fn create_category_table(connection: &Connection) -> Result<(), rusqlite::Error> {
    // AUTOINCREMENT so that the IDs of deleted categories are never handed out again.
    connection.execute_batch(
        "CREATE TABLE IF NOT EXISTS category (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            name TEXT NOT NULL,
            type TEXT NOT NULL CHECK (type IN ('income', 'expense'))
        );",
    )?;

    Ok(())
}

fn map_category_row(row: &Row) -> Result<Category, rusqlite::Error> {
    let id = row.get(0)?;
    let raw_name: String = row.get(1)?;
    let name = CategoryName::new_unchecked(&raw_name);
    let kind = row.get(2)?;

    Ok(Category { id, name, kind })
}

fn missing_category_or(category_id: CategoryId, error: rusqlite::Error) -> Error {
    match Error::from(error) {
        Error::NotFound => Error::MissingCategory(category_id),
        error => error,
    }
}
