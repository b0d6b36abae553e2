//! Defines the core data models for transactions and the request payloads used to create and
//! update them.

use serde::{Deserialize, Deserializer, Serialize, de::Error as _};
use time::OffsetDateTime;

use crate::{
    Error,
    category::{Category, CategoryPatch, CategoryPayload, NewCategory},
    database_id::{CategoryId, TransactionId},
    entry_type::EntryType,
    timestamp::parse_timestamp,
};

// ============================================================================
// MODELS
// ============================================================================

/// An expense or income, i.e. an event where money was either spent or earned.
///
/// To create a new `Transaction`, use [Transaction::build].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Transaction {
    /// The ID of the transaction.
    pub id: TransactionId,
    /// Whether the money was earned or spent.
    #[serde(rename = "type")]
    pub kind: EntryType,
    /// The ID of the category the transaction belongs to.
    ///
    /// The category may have been deleted since the transaction was created.
    pub category: CategoryId,
    /// The amount of money spent or earned in this transaction.
    ///
    /// The sign is not checked against `kind`.
    pub amount: f64,
    /// A text description of what the transaction was for.
    pub description: String,
    /// When the transaction happened.
    #[serde(with = "time::serde::rfc3339")]
    pub date: OffsetDateTime,
    /// When the transaction was first stored.
    #[serde(with = "time::serde::rfc3339")]
    pub created_at: OffsetDateTime,
    /// When the transaction was last changed.
    #[serde(with = "time::serde::rfc3339")]
    pub updated_at: OffsetDateTime,
}

impl Transaction {
    /// Create a new transaction.
    ///
    /// Shortcut for [TransactionBuilder] for discoverability.
    pub fn build(
        kind: EntryType,
        category: CategoryId,
        amount: f64,
        description: &str,
    ) -> TransactionBuilder {
        TransactionBuilder {
            kind,
            category,
            amount,
            description: description.to_owned(),
            date: None,
        }
    }
}

/// A builder for creating [Transaction] instances.
///
/// Pass the builder to [create_transaction](crate::transaction::create_transaction) to store it.
#[derive(Debug, PartialEq, Clone)]
pub struct TransactionBuilder {
    pub kind: EntryType,
    pub category: CategoryId,
    pub amount: f64,
    pub description: String,
    /// When the transaction happened. Defaults to the time the transaction is stored.
    pub date: Option<OffsetDateTime>,
}

impl TransactionBuilder {
    /// Set the date for the transaction.
    pub fn date(mut self, date: Option<OffsetDateTime>) -> Self {
        self.date = date;
        self
    }
}

/// The category of a transaction as seen by clients.
///
/// Deleting a category does not delete the transactions that use it, so a
/// transaction's category may no longer exist. That case is reported as
/// `{"id": <id>, "missing": true}` rather than hidden behind a null.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum CategoryRef {
    /// The category exists.
    Resolved(Category),
    /// The transaction refers to a category that has been deleted.
    Missing {
        /// The ID of the deleted category.
        id: CategoryId,
        /// Always `true`.
        missing: bool,
    },
}

impl CategoryRef {
    /// A reference to a category that no longer exists.
    pub fn missing(id: CategoryId) -> Self {
        CategoryRef::Missing { id, missing: true }
    }
}

/// A transaction with its category looked up.
///
/// The fields are the same as [Transaction], except that `category` holds the
/// category itself instead of its ID.
#[allow(missing_docs)]
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ResolvedTransaction {
    pub id: TransactionId,
    #[serde(rename = "type")]
    pub kind: EntryType,
    pub category: CategoryRef,
    pub amount: f64,
    pub description: String,
    #[serde(with = "time::serde::rfc3339")]
    pub date: OffsetDateTime,
    #[serde(with = "time::serde::rfc3339")]
    pub created_at: OffsetDateTime,
    #[serde(with = "time::serde::rfc3339")]
    pub updated_at: OffsetDateTime,
}

// ============================================================================
// REQUEST PAYLOADS
// ============================================================================

/// The JSON body for creating or updating a transaction.
///
/// All fields are optional so that missing fields can be reported as
/// validation errors. `amount` also accepts numeric strings, e.g. `"12.50"`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TransactionPayload {
    #[serde(rename = "type", default, skip_serializing_if = "Option::is_none")]
    pub kind: Option<String>,
    #[serde(
        default,
        deserialize_with = "deserialize_amount",
        skip_serializing_if = "Option::is_none"
    )]
    pub amount: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub date: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub category: Option<CategoryPayload>,
}

/// A validated request to create a transaction together with its own new category.
#[derive(Debug, Clone, PartialEq)]
pub struct NewTransactionRequest {
    pub kind: EntryType,
    pub amount: f64,
    pub description: String,
    pub date: Option<OffsetDateTime>,
    pub category: NewCategory,
}

impl TryFrom<TransactionPayload> for NewTransactionRequest {
    type Error = Error;

    fn try_from(payload: TransactionPayload) -> Result<Self, Self::Error> {
        let kind = payload
            .kind
            .ok_or_else(|| Error::Validation("transaction type is required".to_owned()))?
            .parse::<EntryType>()?;
        let amount = payload
            .amount
            .ok_or_else(|| Error::Validation("transaction amount is required".to_owned()))?;
        let description = payload
            .description
            .ok_or_else(|| Error::Validation("transaction description is required".to_owned()))
            .and_then(validate_description)?;
        let date = payload.date.as_deref().map(parse_date).transpose()?;
        let category = payload
            .category
            .ok_or_else(|| Error::Validation("transaction category is required".to_owned()))
            .and_then(NewCategory::try_from)?;

        Ok(Self {
            kind,
            amount,
            description,
            date,
            category,
        })
    }
}

/// The validated fields of a partial transaction update. `None` leaves a field unchanged.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TransactionPatch {
    pub kind: Option<EntryType>,
    pub amount: Option<f64>,
    pub description: Option<String>,
    pub date: Option<OffsetDateTime>,
    /// Changes to apply to the transaction's existing category.
    pub category: Option<CategoryPatch>,
}

impl TryFrom<TransactionPayload> for TransactionPatch {
    type Error = Error;

    fn try_from(payload: TransactionPayload) -> Result<Self, Self::Error> {
        Ok(Self {
            kind: payload
                .kind
                .as_deref()
                .map(str::parse::<EntryType>)
                .transpose()?,
            amount: payload.amount,
            description: payload.description.map(validate_description).transpose()?,
            date: payload.date.as_deref().map(parse_date).transpose()?,
            category: payload.category.map(CategoryPatch::try_from).transpose()?,
        })
    }
}

fn validate_description(description: String) -> Result<String, Error> {
    if description.trim().is_empty() {
        Err(Error::Validation(
            "transaction description cannot be empty".to_owned(),
        ))
    } else {
        Ok(description)
    }
}

fn parse_date(text: &str) -> Result<OffsetDateTime, Error> {
    parse_timestamp(text)
        .ok_or_else(|| Error::Validation(format!("\"{text}\" is not a valid date")))
}

fn deserialize_amount<'de, D>(deserializer: D) -> Result<Option<f64>, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum RawAmount {
        Number(f64),
        Text(String),
    }

    let amount = match Option::<RawAmount>::deserialize(deserializer)? {
        None => return Ok(None),
        Some(RawAmount::Number(amount)) => amount,
        Some(RawAmount::Text(text)) => text
            .trim()
            .parse::<f64>()
            .map_err(|_| D::Error::custom(format!("\"{text}\" is not a valid amount")))?,
    };

    if amount.is_finite() {
        Ok(Some(amount))
    } else {
        Err(D::Error::custom("amount must be a finite number"))
    }
}

#[cfg(test)]
mod payload_tests {
    use serde_json::json;
    use time::macros::datetime;

    use crate::{
        Error,
        category::{CategoryName, CategoryPatch, NewCategory},
        entry_type::EntryType,
    };

    use super::{NewTransactionRequest, TransactionPatch, TransactionPayload};

    fn parse_payload(value: serde_json::Value) -> TransactionPayload {
        serde_json::from_value(value).expect("Could not deserialize payload")
    }

    #[test]
    fn new_transaction_from_complete_payload() {
        let payload = parse_payload(json!({
            "type": "income",
            "amount": 500,
            "description": "salary",
            "date": "2024-01-15",
            "category": { "name": "Job", "type": "income" }
        }));

        let got = NewTransactionRequest::try_from(payload);

        assert_eq!(
            got,
            Ok(NewTransactionRequest {
                kind: EntryType::Income,
                amount: 500.0,
                description: "salary".to_owned(),
                date: Some(datetime!(2024-01-15 00:00 UTC)),
                category: NewCategory {
                    name: CategoryName::new_unchecked("Job"),
                    kind: EntryType::Income,
                },
            })
        );
    }

    #[test]
    fn date_is_optional() {
        let payload = parse_payload(json!({
            "type": "expense",
            "amount": 3.5,
            "description": "coffee",
            "category": { "name": "Food", "type": "expense" }
        }));

        let got = NewTransactionRequest::try_from(payload).expect("Could not validate payload");

        assert_eq!(got.date, None);
    }

    #[test]
    fn amount_accepts_numeric_string() {
        let payload = parse_payload(json!({ "amount": " 12.50 " }));

        assert_eq!(payload.amount, Some(12.5));
    }

    #[test]
    fn amount_rejects_non_numeric_string() {
        let result = serde_json::from_value::<TransactionPayload>(json!({ "amount": "lots" }));

        assert!(result.is_err());
    }

    #[test]
    fn new_transaction_requires_category() {
        let payload = parse_payload(json!({
            "type": "expense",
            "amount": 3.5,
            "description": "coffee"
        }));

        let got = NewTransactionRequest::try_from(payload);

        assert_eq!(
            got,
            Err(Error::Validation(
                "transaction category is required".to_owned()
            ))
        );
    }

    #[test]
    fn new_transaction_rejects_invalid_date() {
        let payload = parse_payload(json!({
            "type": "expense",
            "amount": 3.5,
            "description": "coffee",
            "date": "soon",
            "category": { "name": "Food", "type": "expense" }
        }));

        let got = NewTransactionRequest::try_from(payload);

        assert!(matches!(got, Err(Error::Validation(_))), "got {got:?}");
    }

    #[test]
    fn new_transaction_rejects_empty_description() {
        let payload = parse_payload(json!({
            "type": "expense",
            "amount": 3.5,
            "description": "  ",
            "category": { "name": "Food", "type": "expense" }
        }));

        let got = NewTransactionRequest::try_from(payload);

        assert!(matches!(got, Err(Error::Validation(_))), "got {got:?}");
    }

    #[test]
    fn patch_with_only_category_fields() {
        let payload = parse_payload(json!({ "category": { "name": "Side job" } }));

        let got = TransactionPatch::try_from(payload);

        assert_eq!(
            got,
            Ok(TransactionPatch {
                category: Some(CategoryPatch {
                    name: Some(CategoryName::new_unchecked("Side job")),
                    kind: None,
                }),
                ..Default::default()
            })
        );
    }

    #[test]
    fn patch_rejects_unknown_type() {
        let payload = parse_payload(json!({ "type": "gift" }));

        let got = TransactionPatch::try_from(payload);

        assert!(matches!(got, Err(Error::Validation(_))), "got {got:?}");
    }
}
