//! Core category domain types.

use std::{fmt::Display, str::FromStr};

use serde::{Deserialize, Serialize};

use crate::{Error, database_id::CategoryId, entry_type::EntryType};

/// A validated, non-empty category name.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize, Hash)]
pub struct CategoryName(String);

impl CategoryName {
    /// Create a category name.
    ///
    /// # Errors
    ///
    /// This function will return an [Error::Validation] if `name` is empty or just whitespace.
    pub fn new(name: &str) -> Result<Self, Error> {
        if name.trim().is_empty() {
            Err(Error::Validation("category name cannot be empty".to_owned()))
        } else {
            Ok(Self(name.to_string()))
        }
    }

    /// Create a category name without validation.
    ///
    /// The caller should ensure that the string is not empty.
    pub fn new_unchecked(name: &str) -> Self {
        Self(name.to_string())
    }
}

impl AsRef<str> for CategoryName {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl FromStr for CategoryName {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        CategoryName::new(s)
    }
}

impl Display for CategoryName {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// A label for grouping transactions, e.g. 'Groceries' (expense) or 'Job' (income).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Hash)]
pub struct Category {
    /// The ID of the category.
    pub id: CategoryId,
    /// The display name of the category.
    pub name: CategoryName,
    /// Whether the category is for incomes or expenses.
    #[serde(rename = "type")]
    pub kind: EntryType,
}

/// The JSON body for creating or updating a category.
///
/// Every field is optional at this stage so that missing fields can be
/// reported as validation errors instead of JSON parse errors.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CategoryPayload {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(rename = "type", default, skip_serializing_if = "Option::is_none")]
    pub kind: Option<String>,
}

/// A validated category that is ready to be inserted.
#[derive(Debug, Clone, PartialEq)]
pub struct NewCategory {
    pub name: CategoryName,
    pub kind: EntryType,
}

impl TryFrom<CategoryPayload> for NewCategory {
    type Error = Error;

    fn try_from(payload: CategoryPayload) -> Result<Self, Self::Error> {
        let name = payload
            .name
            .ok_or_else(|| Error::Validation("category name is required".to_owned()))?;
        let kind = payload
            .kind
            .ok_or_else(|| Error::Validation("category type is required".to_owned()))?;

        Ok(Self {
            name: CategoryName::new(&name)?,
            kind: kind.parse()?,
        })
    }
}

/// The validated fields of a partial category update. `None` leaves a field unchanged.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CategoryPatch {
    pub name: Option<CategoryName>,
    pub kind: Option<EntryType>,
}

impl TryFrom<CategoryPayload> for CategoryPatch {
    type Error = Error;

    fn try_from(payload: CategoryPayload) -> Result<Self, Self::Error> {
        Ok(Self {
            name: payload.name.as_deref().map(CategoryName::new).transpose()?,
            kind: payload.kind.as_deref().map(str::parse::<EntryType>).transpose()?,
        })
    }
}
