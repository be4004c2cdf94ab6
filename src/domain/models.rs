use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use uuid::Uuid;

/// An account holder. Passkey-only users carry no password hash.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct User {
    // ---
    pub id: Uuid,
    pub email: String,
    #[serde(skip_serializing)]
    pub password_hash: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl User {
    // ---
    /// Builds a user descriptor that has not been persisted yet.
    pub fn new(email: String, password_hash: Option<String>) -> Self {
        // ---
        let now = Utc::now();
        Self {
            id: Uuid::new_v4(),
            email,
            password_hash,
            created_at: now,
            updated_at: now,
        }
    }
}

/// Whether a category or operation records money going out or coming in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EntryKind {
    // ---
    Expense,
    Income,
}

impl EntryKind {
    // ---
    pub fn as_str(&self) -> &'static str {
        // ---
        match self {
            EntryKind::Expense => "expense",
            EntryKind::Income => "income",
        }
    }
}

impl fmt::Display for EntryKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for EntryKind {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        // ---
        match s {
            "expense" => Ok(EntryKind::Expense),
            "income" => Ok(EntryKind::Income),
            other => Err(anyhow::anyhow!("unknown entry kind: {other}")),
        }
    }
}

/// A user-defined bucket for operations.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Category {
    // ---
    pub id: Uuid,
    pub user_id: Uuid,
    pub name: String,
    #[serde(rename = "type")]
    pub kind: EntryKind,
    pub color: Option<String>,
    pub icon: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Client-supplied category fields, used for both create and update.
#[derive(Debug, Clone, Deserialize)]
pub struct CategoryInput {
    // ---
    pub name: String,
    #[serde(rename = "type")]
    pub kind: EntryKind,
    #[serde(default)]
    pub color: Option<String>,
    #[serde(default)]
    pub icon: Option<String>,
}

impl Category {
    // ---
    pub fn new(user_id: Uuid, input: CategoryInput) -> Self {
        // ---
        let now = Utc::now();
        Self {
            id: Uuid::new_v4(),
            user_id,
            name: input.name,
            kind: input.kind,
            color: input.color,
            icon: input.icon,
            created_at: now,
            updated_at: now,
        }
    }
}

/// A single expense or income record.
///
/// `amount` is kept in minor currency units (cents).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Operation {
    // ---
    pub id: Uuid,
    pub user_id: Uuid,
    pub category_id: Uuid,
    pub amount: i64,
    pub currency: String,
    pub name: String,
    pub comment: Option<String>,
    #[serde(rename = "type")]
    pub kind: EntryKind,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Client-supplied operation fields, used for both create and update.
#[derive(Debug, Clone, Deserialize)]
pub struct OperationInput {
    // ---
    pub category_id: Uuid,
    pub amount: i64,
    pub currency: String,
    pub name: String,
    #[serde(default)]
    pub comment: Option<String>,
    #[serde(rename = "type")]
    pub kind: EntryKind,
}

impl Operation {
    // ---
    pub fn new(user_id: Uuid, input: OperationInput) -> Self {
        // ---
        let now = Utc::now();
        Self {
            id: Uuid::new_v4(),
            user_id,
            category_id: input.category_id,
            amount: input.amount,
            currency: input.currency,
            name: input.name,
            comment: input.comment,
            kind: input.kind,
            created_at: now,
            updated_at: now,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn entry_kind_round_trips_through_str() {
        assert_eq!("income".parse::<EntryKind>().unwrap(), EntryKind::Income);
        assert_eq!(EntryKind::Expense.to_string(), "expense");
        assert!("refund".parse::<EntryKind>().is_err());
    }

    #[test]
    fn password_hash_is_never_serialized() {
        let user = User::new("a@example.com".to_string(), Some("secret-hash".to_string()));
        let json = serde_json::to_string(&user).unwrap();
        assert!(!json.contains("secret-hash"));
        assert!(json.contains("a@example.com"));
    }

    #[test]
    fn category_input_reads_type_field() {
        let input: CategoryInput =
            serde_json::from_str(r#"{"name":"Food","type":"expense"}"#).unwrap();
        assert_eq!(input.kind, EntryKind::Expense);
        assert!(input.color.is_none());
    }
}
